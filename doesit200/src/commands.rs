use crate::CLAP_STYLING;
use clap::{arg, command};
use doesit200_core::config::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

/// Arguments shared by every subcommand that runs a crawl.
fn with_run_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-t --"timeout" <SECONDS>)
            .required(false)
            .help("Navigation timeout per page in seconds")
            .value_parser(clap::value_parser!(u64).range(1..))
            .default_value("60"),
    )
    .arg(
        arg!(-f --"format" <FORMAT>)
            .required(false)
            .help("Report format: text, json")
            .value_parser(["text", "json"])
            .default_value("text"),
    )
    .arg(
        arg!(--"no-color")
            .required(false)
            .help("Disable colored report output")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"headful")
            .required(false)
            .help("Show the browser window instead of running headless")
            .action(clap::ArgAction::SetTrue),
    )
    .arg(
        arg!(--"chrome" <PATH>)
            .required(false)
            .help("Path to the Chrome/Chromium executable (default: auto-detect)")
            .value_parser(clap::value_parser!(PathBuf)),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("doesit200")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("doesit200")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(true)
        .subcommand(with_run_args(
            command!("crawl")
                .about(
                    "Crawl a site in a real browser and report every response that was not \
                a 200.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The root URL to crawl (bare hosts get https://)"),
                )
                .arg(
                    arg!(-s --"sleep" <SECONDS>)
                        .required(false)
                        .help("Seconds to wait after each page load")
                        .value_parser(clap::value_parser!(u16))
                        .default_value("15"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("How many links away from the root to navigate")
                        .value_parser(clap::value_parser!(u8))
                        .default_value("1"),
                )
                .arg(
                    arg!(-i --"include-domain" <PATTERN>)
                        .required(false)
                        .help("Domain wildcard to stay within, e.g. *.example.com (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"enforce-domains")
                        .required(false)
                        .help(
                            "Only follow links whose host matches an --include-domain pattern \
                        (default: follow every link)",
                        )
                        .action(clap::ArgAction::SetTrue),
                ),
        ))
        .subcommand(with_run_args(
            command!("run")
                .about("Run one of the crawl configurations stored in a JSON config file")
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to the config file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .default_value(DEFAULT_CONFIG_PATH),
                )
                .arg(
                    arg!(-e --"entry" <NUM>)
                        .required(false)
                        .help("1-based entry to run (default: choose interactively)")
                        .value_parser(clap::value_parser!(usize)),
                ),
        ))
        .subcommand(with_run_args(
            command!("prompt").about("Enter the URL, sleep and depth interactively"),
        ))
}
