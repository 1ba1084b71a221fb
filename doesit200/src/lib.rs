pub mod handlers;

pub use handlers::{
    handle_crawl, handle_prompt, handle_run, init_tracing, prompt_config, prompt_selection,
    write_run_header,
};
