mod logging;

use std::collections::BTreeSet;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use drive_ownership::hub::HubClient;
use drive_ownership::model::format_size;
use drive_ownership::{AppConfig, Tree, Workflow};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "drive-ownership")]
#[command(about = "Transfer ownership of Google Drive trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every item under a Drive URL together with its owner
    List {
        url: String,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Transfer items owned by the managed owner to another user
    Transfer {
        url: String,
        /// Email address of the new owner
        #[arg(long)]
        to: String,
        /// Transfer every eligible item
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        all: bool,
        /// Transfer only these items (repeatable)
        #[arg(long)]
        id: Vec<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logger();

    let args = Cli::parse();
    let Some(command) = args.command else {
        Cli::command().print_long_help()?;
        return Ok(());
    };

    let config = drive_ownership::config::load_configuration()
        .context("Error loading configuration")?;

    let result = match command {
        Commands::List { url, json } => run_list(&config, &url, json).await,
        Commands::Transfer {
            url,
            to,
            all,
            id,
            json,
        } => run_transfer(&config, &url, &to, all, &id, json).await,
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    };

    if let Err(err) = result {
        match err.downcast_ref::<drive_ownership::Error>() {
            Some(drive_err) => error!("{} ({})", drive_err.user_message(), drive_err),
            None => error!("{:#}", err),
        }
        process::exit(1);
    }
    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<Workflow> {
    let client = HubClient::from_env(config.subject.as_deref()).await?;
    Ok(Workflow::new(Arc::new(client), config))
}

async fn run_list(config: &AppConfig, url: &str, json: bool) -> anyhow::Result<()> {
    let mut workflow = connect(config).await?;
    workflow.explore(url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(workflow.tree())?);
    } else {
        print_tree(&workflow);
    }
    Ok(())
}

async fn run_transfer(
    config: &AppConfig,
    url: &str,
    to: &str,
    all: bool,
    ids: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let mut workflow = connect(config).await?;
    workflow.explore(url).await?;

    let selected = if all {
        workflow.select_all()
    } else {
        let requested = unique_ids(ids);
        let selected = workflow.set_selection(requested.iter().copied());
        if selected < requested.len() {
            warn!(
                "{} of the requested items are not owned by {} and were skipped",
                requested.len() - selected,
                config.managed_owner
            );
        }
        selected
    };
    info!("Transfer Ownership ({} selected)", selected);

    let outcome = workflow.transfer(to).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for id in &outcome.report.succeeded {
            println!("transferred  {}", id);
        }
        for failed in &outcome.report.failed {
            println!("failed       {}  {}", failed.id, failed.reason);
        }
        if outcome.refreshed {
            print_tree(&workflow);
        }
    }

    if !outcome.report.is_complete() {
        bail!(
            "{} of {} ownership transfers failed",
            outcome.report.failed.len(),
            outcome.report.total()
        );
    }
    info!("Ownership transferred successfully!");
    Ok(())
}

fn print_tree(workflow: &Workflow) {
    let tree: &Tree = workflow.tree();
    for item in tree.iter() {
        let mark = if workflow.policy().is_eligible(item) {
            "*"
        } else {
            " "
        };
        let kind = if item.is_folder() { "dir " } else { "file" };
        println!(
            "{} {}  {:<40}  {:<33}  {:>10}  {}",
            mark,
            kind,
            item.name,
            item.id,
            format_size(item.size),
            item.owner_label()
        );
    }
    println!("Total {} items", tree.len());

    for folder in tree.truncated_folders() {
        warn!("Listing of folder {} was truncated", folder);
    }
}

/// Requested `--id` values with repeats removed.
fn unique_ids(ids: &[String]) -> BTreeSet<&str> {
    ids.iter().map(String::as_str).collect()
}
