//! # zkscan CLI
//!
//! Prints exactly one JSON line on stdout and exits 0 on success, 1 on
//! timeout, SDK failure or usage error. Diagnostics go to stderr
//! (`RUST_LOG=info` for progress).
//!
//! ```bash
//! zkscan test
//! zkscan capture 15
//! zkscan capture --no-image
//! zkscan connect 192.168.1.201 4370
//! zkscan version
//! ```

use clap::{error::ErrorKind, Parser, Subcommand};
use zkscan::commands::{self, CaptureOptions};
use zkscan::report::Report;
use zkscan::{AttemptBudget, CancelToken, Config, ZkemLibrary, ZkfpLibrary};

/// zkscan - ZKTeco fingerprint scanner CLI
#[derive(Parser, Debug)]
#[command(name = "zkscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialise the USB SDK and count attached scanners
    Test {
        /// Accepted for a uniform `<command> [timeout_seconds]` form; unused
        #[arg(allow_hyphen_values = true, hide = true)]
        timeout_seconds: Option<String>,
    },

    /// Wait for a finger and print its template
    Capture {
        /// Seconds to wait (1-120); anything else uses the default
        #[arg(allow_hyphen_values = true)]
        timeout_seconds: Option<String>,

        /// Leave the raw image out of the result
        #[arg(long)]
        no_image: bool,
    },

    /// Print the terminal firmware version
    Version,

    /// Print the terminal serial number
    Serial,

    /// Connect to a networked terminal
    Connect {
        host: String,
        port: u16,
    },

    /// Disconnect from the networked terminal
    Disconnect,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let report = match Cli::try_parse() {
        Ok(cli) => run(cli, &Config::from_env()),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => Report::usage(usage_message(&e)),
    };

    println!("{}", report.to_line());
    std::process::exit(report.exit_code());
}

/// First line of a clap error, without the `error: ` prefix.
fn usage_message(e: &clap::Error) -> String {
    if e.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand {
        return "missing command".to_string();
    }
    let text = e.to_string();
    let first = text.lines().next().unwrap_or("invalid arguments");
    first.trim_start_matches("error: ").to_string()
}

fn run(cli: Cli, config: &Config) -> Report {
    match cli.command {
        Commands::Test { .. } => match ZkfpLibrary::load(&config.zkfp_library) {
            Ok(sdk) => commands::test(&sdk),
            Err(e) => Report::from(e),
        },
        Commands::Capture {
            timeout_seconds,
            no_image,
        } => {
            let options = CaptureOptions {
                budget: AttemptBudget::parse(timeout_seconds.as_deref(), config.default_budget),
                device_index: config.device_index,
                include_image: !no_image,
            };
            log::debug!("Timeout: {} seconds", options.budget.get());
            match ZkfpLibrary::load(&config.zkfp_library) {
                Ok(sdk) => commands::capture(&sdk, &options, CancelToken::never()),
                Err(e) => Report::from(e),
            }
        }
        Commands::Version => with_terminal(config, commands::version),
        Commands::Serial => with_terminal(config, commands::serial),
        Commands::Connect { host, port } => {
            with_terminal(config, |sdk| commands::connect(sdk, &host, port))
        }
        Commands::Disconnect => with_terminal(config, commands::disconnect),
    }
}

fn with_terminal<F>(config: &Config, f: F) -> Report
where
    F: FnOnce(&ZkemLibrary) -> Report,
{
    match ZkemLibrary::load(&config.zkem_library) {
        Ok(sdk) => f(&sdk),
        Err(e) => Report::from(e),
    }
}
