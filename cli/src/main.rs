//! # The Noty Command Line Utility
//!
//! A command-line tool that reports how many hours each observed user has
//! logged in Jira since the start of the current business day, and posts a
//! Slack reminder to those below the configured threshold.
//!
//! ## Configuration
//! Noty reads a TOML file from the platform preference directory:
//! ```toml
//! [jira]
//! url = "https://yourcompany.atlassian.net"
//! user = "bot@yourcompany.com"
//! token = "YOUR_API_TOKEN"
//!
//! [slack]
//! token = "xoxb-..."
//! channel = "#timelog"
//!
//! [tracking]
//! emails = "a@yourcompany.com,b@yourcompany.com"
//! threshold_hours = 2
//! timezone = "Europe/Moscow"
//! ```
//!
//! ## Usage Examples
//!
//! Show today's hours per observed user:
//! ```bash
//! noty status
//! ```
//!
//! Post the Slack reminder:
//! ```bash
//! noty notify
//! ```
//!
use clap::Parser;
use cli::{Command, LogLevel, Opts};
use env_logger::Env;
use log::debug;
use std::env;
use std::fs::File;
use std::process::exit;

use worklog::{error::WorklogError, ApplicationRuntime, Operation, OperationResult};

mod cli;

#[tokio::main]
async fn main() -> Result<(), WorklogError> {
    let opts: Opts = Opts::parse();

    configure_logging(&opts); // Handles the -v option

    match opts.cmd {
        Command::Status => {
            let operation_result = get_runtime().execute(Operation::Status).await?;
            match operation_result {
                OperationResult::Status(users) => {
                    for user in users {
                        println!("{} - {:.2} hours", user.email, user.hours());
                    }
                }
                OperationResult::Notified { .. } => unreachable!(),
            }
        }

        Command::Notify => {
            let runtime = get_runtime();
            let operation_result = runtime.execute(Operation::Notify).await?;
            match operation_result {
                OperationResult::Notified { reminded: 0 } => {
                    println!(
                        "Everyone has logged at least {} hours, no reminder sent",
                        runtime.config().tracking.threshold_hours
                    );
                }
                OperationResult::Notified { reminded } => {
                    println!(
                        "Reminder posted to {} for {} user(s)",
                        runtime.config().slack.channel, reminded
                    );
                }
                OperationResult::Status(_) => unreachable!(),
            }
        }
    }

    Ok(())
}

/// Builds the application runtime, translating a missing configuration file
/// into a friendly message instead of a stack trace
fn get_runtime() -> ApplicationRuntime {
    match ApplicationRuntime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            match err {
                WorklogError::ApplicationConfig { ref path, .. } => {
                    eprintln!(
                        "Configuration file {} not found or not readable",
                        path.display()
                    );
                }
                _ => {
                    eprintln!("Failed to create runtime: '{err}'");
                }
            }

            exit(1);
        }
    }
}

fn configure_logging(opts: &Opts) {
    let mut tmp_dir = env::temp_dir();
    tmp_dir.push("noty.log");

    if opts.verbosity.is_some() {
        println!("Logging to {}", &tmp_dir.to_string_lossy());
    }

    let target = Box::new(File::create(tmp_dir).expect("Can't create file"));

    // If nothing else was specified in RUST_LOG, use 'warn'
    env_logger::Builder::from_env(Env::default().default_filter_or(opts.verbosity.map_or(
        "warn",
        |lvl| match lvl {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        },
    )))
    .target(env_logger::Target::Pipe(target))
    .init();
    debug!("Logging started");
}
