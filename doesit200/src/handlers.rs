use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use doesit200_core::config::{
    ConfigEntry, DEFAULT_CONFIG_PATH, DEFAULT_MAX_DEPTH, DEFAULT_SLEEP_SECONDS, describe_entries,
    load_entries, select_entry,
};
use doesit200_core::crawl::{CrawlOptions, execute_crawl};
use doesit200_core::report::{ReportFormat, render};
use doesit200_scanner::{CrawlConfig, EngineOptions, Shutdown};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// level; logs go to stderr so reports on stdout stay clean.
pub fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    msg: &str,
) -> Result<Option<String>> {
    write!(output, "{} ", msg)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for a URL, sleep and depth. The URL is asked again until it is not
/// blank; a blank or unparsable sleep or depth falls back to its default.
pub fn prompt_config<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<ConfigEntry> {
    let url = loop {
        match read_answer(input, output, "Enter the URL to check:")? {
            None => bail!("no URL to crawl was provided"),
            Some(url) if url.is_empty() => writeln!(output, "A URL is required.")?,
            Some(url) => break url,
        }
    };

    let sleep = read_answer(
        input,
        output,
        &format!(
            "Enter sleep time between requests in seconds (default {}):",
            DEFAULT_SLEEP_SECONDS
        ),
    )?
    .and_then(|s| s.parse::<u16>().ok())
    .unwrap_or(DEFAULT_SLEEP_SECONDS);

    let depth = read_answer(
        input,
        output,
        &format!("Enter crawl depth (default {}):", DEFAULT_MAX_DEPTH),
    )?
    .and_then(|s| s.parse::<u8>().ok())
    .unwrap_or(DEFAULT_MAX_DEPTH);

    let mut entry = ConfigEntry::new(url);
    entry.sleep = sleep;
    entry.depth = depth;
    Ok(entry)
}

/// List the entries and read a 1-based selection.
pub fn prompt_selection<R: BufRead, W: Write>(
    entries: &[ConfigEntry],
    input: &mut R,
    output: &mut W,
) -> Result<ConfigEntry> {
    writeln!(output, "Available configurations:")?;
    for line in describe_entries(entries) {
        writeln!(output, "{}", line)?;
    }

    let answer = read_answer(input, output, "Enter the number of the configuration to use:")?
        .context("no configuration was selected")?;
    let choice: usize = answer
        .parse()
        .with_context(|| format!("'{}' is not a configuration number", answer))?;
    Ok(select_entry(entries, choice)?)
}

/// Describe the crawl about to start. Goes to stderr in the CLI so that a
/// JSON report on stdout stays parseable.
pub fn write_run_header<W: Write>(config: &CrawlConfig, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "\n{} Crawling {}",
        "→".blue().bold(),
        config.root_url().as_str().bright_white()
    )?;
    writeln!(out, "Sleep: {}s", config.sleep().as_secs())?;
    writeln!(out, "Max depth: {}", config.max_depth())?;
    writeln!(out, "Domain scope: {:?}\n", config.scope())
}

fn engine_options(args: &ArgMatches) -> EngineOptions {
    EngineOptions {
        headless: !args.get_flag("headful"),
        chrome_executable: args.get_one::<PathBuf>("chrome").cloned(),
        ..EngineOptions::default()
    }
}

/// Crawl one entry and print its report.
async fn run_entry(entry: ConfigEntry, args: &ArgMatches, quiet: bool) -> Result<()> {
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&60);
    let format_name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format = ReportFormat::from_str(format_name)
        .with_context(|| format!("unsupported report format '{}'", format_name))?;
    let no_color = args.get_flag("no-color");
    if no_color {
        colored::control::set_override(false);
    }

    let url = entry.url.clone();
    let config = entry
        .into_crawl_config()
        .with_context(|| format!("invalid crawl configuration for '{}'", url))?
        .with_navigation_timeout(Duration::from_secs(timeout));

    if !quiet {
        write_run_header(&config, &mut io::stderr())?;
    }

    let shutdown = Shutdown::new();
    let signal_shutdown = Arc::clone(&shutdown);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing up...");
            signal_shutdown.trigger();
        }
    });

    let options = CrawlOptions {
        config,
        engine: engine_options(args),
        show_progress_bars: !quiet,
    };
    let result = execute_crawl(options, shutdown).await;
    signal_task.abort();

    let report = result.context("crawl failed")?;
    info!(
        "Finished crawl of {}: {} non-200 responses",
        report.root_url,
        report.non_success.len()
    );

    print!("{}", render(&report, &format, !no_color));
    if format == ReportFormat::Json {
        println!();
    }
    Ok(())
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<()> {
    let url = args
        .get_one::<String>("url")
        .context("--url is required")?;
    let mut entry = ConfigEntry::new(url.clone());
    if let Some(sleep) = args.get_one::<u16>("sleep") {
        entry.sleep = *sleep;
    }
    if let Some(depth) = args.get_one::<u8>("depth") {
        entry.depth = *depth;
    }
    entry.include_domain_wildcards = args
        .get_many::<String>("include-domain")
        .map(|patterns| patterns.cloned().collect())
        .unwrap_or_default();
    entry.enforce_domain_wildcards = args.get_flag("enforce-domains");

    run_entry(entry, args, quiet).await
}

pub async fn handle_run(args: &ArgMatches, quiet: bool) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let entries = load_entries(&path)
        .with_context(|| format!("could not load configurations from {}", path.display()))?;

    let entry = match args.get_one::<usize>("entry") {
        Some(choice) => select_entry(&entries, *choice)?,
        None => {
            let stdin = io::stdin();
            prompt_selection(&entries, &mut stdin.lock(), &mut io::stderr())?
        }
    };

    run_entry(entry, args, quiet).await
}

pub async fn handle_prompt(args: &ArgMatches, quiet: bool) -> Result<()> {
    let entry = {
        let stdin = io::stdin();
        prompt_config(&mut stdin.lock(), &mut io::stderr())?
    };
    run_entry(entry, args, quiet).await
}
