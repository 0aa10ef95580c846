use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitescribe")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitescribe")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Raise log verbosity (-v debug, -vv trace)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl every page under the seed URL's host and path and write their text \
                to a single document.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The seed URL (prompted for when omitted)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the document (prompted for when omitted)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Document format: text, latin1, markdown, json")
                        .value_parser(["text", "latin1", "markdown", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-w --"workers" <NUM_WORKERS>)
                        .required(false)
                        .help("Concurrent fetch workers. 1 keeps strict breadth-first order.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"interval" <SECONDS>)
                        .required(false)
                        .help("Minimum delay between requests in seconds")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.5"),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("Override the User-Agent header"),
                )
                .arg(
                    arg!(--"literal-prefix")
                        .required(false)
                        .help("Match the base path as a plain string prefix (/docs also admits /docs-archive)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"discard-on-interrupt")
                        .required(false)
                        .help("Write nothing when the crawl is interrupted with Ctrl-C")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
