//! gridbill CLI - billable asset filtering against live group membership.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gridbill")]
#[command(about = "Asset-group billing filter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter an inventory file down to the billable assets of a group formula
    Filter {
        /// JSON array of asset records
        #[arg(long)]
        inventory: PathBuf,
        /// Primary group id (omit to bill the whole inventory)
        #[arg(long)]
        primary: Option<String>,
        /// Group the assets must also belong to
        #[arg(long = "and")]
        and_group: Option<String>,
        /// Group whose assets are excluded
        #[arg(long = "not")]
        not_group: Option<String>,
        /// Price per MW in cents; adds the amount due to the output
        #[arg(long)]
        rate_cents: Option<u64>,
        /// Exit with an error when membership cannot be resolved instead of
        /// reporting an empty billable set
        #[arg(long)]
        strict: bool,
    },

    /// Report whether a contract has asset-group filtering configured
    Check {
        /// Contract JSON file
        #[arg(long)]
        contract: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    gridbill_observability::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Filter {
            inventory,
            primary,
            and_group,
            not_group,
            rate_cents,
            strict,
        } => {
            commands::filter(commands::FilterArgs {
                inventory,
                primary,
                and_group,
                not_group,
                rate_cents,
                strict,
            })
            .await
        }
        Commands::Check { contract } => commands::check(&contract),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
