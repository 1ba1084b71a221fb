pub mod config;
pub mod crawl;
pub mod report;

use colored::Colorize;
use std::io::{self, Write};

pub use config::{ConfigEntry, ConfigError};
pub use crawl::{CrawlOptions, crawl_with_engine, execute_crawl, extract_url_path, finalize};
pub use report::{NonSuccessReport, ReportFormat, RunReport};

const BANNER: &str = r#"
     _                 _ _   ____   ___   ___
  __| | ___   ___  ___(_) |_|___ \ / _ \ / _ \
 / _` |/ _ \ / _ \/ __| | __| __) | | | | | | |
| (_| | (_) |  __/\__ \ | |_ / __/| |_| | |_| |
 \__,_|\___/ \___||___/_|\__|_____|\___/ \___/
"#;

/// The binary writes this to stderr so stdout only ever carries the report.
pub fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", BANNER.bright_green().bold())?;
    writeln!(
        out,
        "  {} {}\n",
        "does it 200?".bright_white().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    )
}
