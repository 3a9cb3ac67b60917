//! gptchat - Terminal LLM chat with usage accounting
//!
//! ## Usage
//!
//! ```bash
//! # Start an interactive chat session
//! gptchat chat
//!
//! # Pin the model and skip the interactive prompts
//! gptchat chat --model gpt-4o --no-markdown
//!
//! # Estimate spend over the last 30 days
//! gptchat costs
//!
//! # Estimate spend over an explicit window
//! gptchat costs --from 2024-01-01 --to 2024-01-31
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gptchat_chat::ChatArgs;
use gptchat_core::init_logging;
use gptchat_cost::{Aggregator, CostError, Spend, parse_end_bound, parse_start_bound};
use tracing::{error, info};

/// gptchat - terminal chat against OpenAI-compatible APIs
///
/// Chats stream to the terminal and each completed request appends one
/// line to the token usage log, which the `costs` subcommand turns into
/// a spend estimate.
#[derive(Parser, Debug)]
#[command(name = "gptchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.gptchat/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive chat session (the default)
    Chat {
        /// Model to chat with (skips the model prompt)
        #[arg(long)]
        model: Option<String>,

        /// Fence assistant replies for markdown transcripts
        #[arg(long, conflicts_with = "no_markdown")]
        markdown: bool,

        /// Plain-text transcripts (skips the markdown prompt)
        #[arg(long)]
        no_markdown: bool,

        /// Open the saved-chat menu before starting
        #[arg(long)]
        load: bool,
    },

    /// Estimate spend from the token usage log
    Costs {
        /// Inclusive start, YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS" (default: 30 days ago)
        #[arg(long)]
        from: Option<String>,

        /// Inclusive end, YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS" (default: now)
        #[arg(long)]
        to: Option<String>,

        /// Usage log path (default: ~/.gptchat/token_usage.log)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.log_dir.clone(), cli.verbose > 0) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    info!("starting gptchat");

    let command = cli.command.unwrap_or(Command::Chat {
        model: None,
        markdown: false,
        no_markdown: false,
        load: false,
    });

    let result = match command {
        Command::Chat {
            model,
            markdown,
            no_markdown,
            load,
        } => run_chat(model, markdown, no_markdown, load).await,
        Command::Costs { from, to, log_file } => run_costs(from, to, log_file),
    };

    match result {
        Ok(()) => {
            info!("gptchat exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "gptchat failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Run the interactive chat subcommand.
async fn run_chat(
    model: Option<String>,
    markdown: bool,
    no_markdown: bool,
    load: bool,
) -> anyhow::Result<()> {
    let markdown = if markdown {
        Some(true)
    } else if no_markdown {
        Some(false)
    } else {
        None
    };

    gptchat_chat::repl::run_chat(ChatArgs {
        model,
        markdown,
        load,
    })
    .await?;
    Ok(())
}

/// Run the costs subcommand.
///
/// A missing log file and an empty window are both clean notices with a
/// zero exit code; only real failures (unreadable file, bad date flags)
/// exit nonzero.
fn run_costs(
    from: Option<String>,
    to: Option<String>,
    log_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = from.as_deref().map(parse_start_bound).transpose()?;
    let end = to.as_deref().map(parse_end_bound).transpose()?;

    let log_path = match log_file {
        Some(path) => path,
        None => gptchat_core::usage_log_path()?,
    };

    let aggregator = Aggregator::new(&log_path);
    match aggregator.calculate_spent(start, end) {
        Ok(Spend::Report(report)) => {
            print!("{}", report.render());
            Ok(())
        }
        Ok(Spend::NoData { start, end }) => {
            println!(
                "No token usage found from {} to {}.",
                start.date(),
                end.date()
            );
            Ok(())
        }
        Err(e @ CostError::LogNotFound { .. }) => {
            println!("{}", e.friendly_message());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
