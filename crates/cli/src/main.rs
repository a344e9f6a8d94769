// SPDX-License-Identifier: MIT

//! `cairn`: the operator-facing CLI for talking to a running `cairnd`.
//!
//! Every subcommand opens one connection to the daemon's Unix socket,
//! sends one request, prints the response, and exits — no subcommand
//! holds the connection open across calls.

mod client;
mod color;
mod exit_error;
mod output;

use cairn_core::{AgentId, Priority};
use cairn_daemon::Config;
use clap::{Parser, Subcommand, ValueEnum};
use client::{ClientError, DaemonClient};
use exit_error::ExitError;
use output::OutputFormat;

/// Mirrors [`Priority`] for clap's `ValueEnum` derive, which domain types in
/// `cairn-core` don't carry so that crate stays free of a CLI dependency.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum PriorityArg {
    Low,
    Normal,
    High,
    Urgent,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::High => Priority::High,
            PriorityArg::Urgent => Priority::Urgent,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cairn", about = "Spawn, review, and accept or reject agentlet changes", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format for anything this command prints.
    #[arg(long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Queue a new agentlet with the given task description.
    Spawn {
        /// What the agentlet should do.
        task_text: String,

        /// Admission priority.
        #[arg(long, value_enum, default_value = "normal")]
        priority: PriorityArg,
    },

    /// Merge an agentlet's overlay into the stable namespace.
    Accept {
        /// The agent id returned by `spawn`.
        agent_id: String,
    },

    /// Discard an agentlet's overlay without merging it.
    Reject {
        /// The agent id returned by `spawn`.
        agent_id: String,
    },

    /// Show one agent's lifecycle record.
    Status {
        /// The agent id returned by `spawn`.
        agent_id: String,
    },

    /// List every known agent's lifecycle record.
    List,
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let config = Config::from_env();
    let client = DaemonClient::new(config.socket_path());

    match cli.command {
        Command::Spawn { task_text, priority } => {
            let agent_id = client.spawn(task_text, priority.into()).await.map_err(to_exit_error)?;
            output::print_spawned(&agent_id, cli.format).map_err(|e| ExitError::new(1, e.to_string()))?;
        }
        Command::Accept { agent_id } => {
            client.accept(AgentId::from_string(agent_id)).await.map_err(to_exit_error)?;
            println!("accepted");
        }
        Command::Reject { agent_id } => {
            client.reject(AgentId::from_string(agent_id)).await.map_err(to_exit_error)?;
            println!("rejected");
        }
        Command::Status { agent_id } => {
            let record = client.get_lifecycle(AgentId::from_string(agent_id.clone())).await.map_err(to_exit_error)?;
            match record {
                Some(record) => output::print_lifecycle(&record, cli.format).map_err(|e| ExitError::new(1, e.to_string()))?,
                None => return Err(ExitError::new(1, format!("no such agent: {agent_id}"))),
            }
        }
        Command::List => {
            let records = client.list_lifecycles().await.map_err(to_exit_error)?;
            output::print_lifecycles(&records, cli.format).map_err(|e| ExitError::new(1, e.to_string()))?;
        }
    }

    Ok(())
}

fn to_exit_error(e: ClientError) -> ExitError {
    match &e {
        ClientError::Connect { .. } => ExitError::new(2, format!("{e} (is cairnd running?)")),
        _ => ExitError::new(1, e.to_string()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("cairn: {e}");
        std::process::exit(e.code);
    }
}
