#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use covmail_config::Environment;
use std::path::PathBuf;

mod command;
mod logging;
mod mailbox;
mod output;

use command::{
    ClassifyInput, ClassifyStrategy, CommandStrategy, InitStrategy, RunInput, RunStrategy,
    TemplatesStrategy, VersionStrategy,
};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "covmail")]
#[command(about = "Turn test notification emails into a tabular report", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write a debug-level execution log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from every configured site
    Run {
        /// Use the dev site list instead of the prod one
        #[arg(long)]
        dev: bool,

        /// Site list to use instead of the one in ~/covmail
        #[arg(long)]
        sites: Option<PathBuf>,

        /// Root directory of the exported mailboxes
        #[arg(short, long)]
        mailbox: PathBuf,

        /// Where to write the results
        #[arg(short, long, default_value = "dumped_results.csv")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Skip date parsing, week numbers and column labels
        #[arg(long)]
        raw: bool,
    },
    /// Classify and extract a single message file
    Classify {
        /// Message JSON with subject, body and received_at
        file: PathBuf,

        /// Context label to attach to an extracted record
        #[arg(long)]
        site: Option<String>,
    },
    /// List the known templates
    Templates,
    /// Create a template site list
    Init {
        #[arg(long)]
        dev: bool,
    },
    /// Show version
    Version,
}

const fn environment(dev: bool) -> Environment {
    if dev { Environment::Dev } else { Environment::Prod }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            dev,
            sites,
            mailbox,
            output,
            format,
            raw,
        } => {
            RunStrategy
                .execute(RunInput {
                    env: environment(dev),
                    sites,
                    mailbox,
                    output,
                    format,
                    raw,
                })
                .await
        }
        Commands::Classify { file, site } => {
            ClassifyStrategy
                .execute(ClassifyInput { file, site })
                .await
        }
        Commands::Templates => TemplatesStrategy.execute(()).await,
        Commands::Init { dev } => InitStrategy.execute(environment(dev)).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
