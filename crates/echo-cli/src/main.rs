//! Echo Agent CLI - queue and run unattended dev tasks.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use echo_agents::{AgentConfig, ChatClient, CommandVerifier, GitPublisher, LlmEditor, LlmPlanner};
use echo_pipeline::{reconcile, Pipeline, Runner};
use echo_queue::{Intake, QueueStore};

/// Echo Agent - queue dev tasks and run them through the automation pipeline
#[derive(Parser)]
#[command(name = "echo-agent")]
#[command(about = "Queue dev tasks and drain them through plan/edit/verify/publish", long_about = None)]
struct Cli {
    /// Path to the queue file
    #[arg(short, long, default_value = "tasks/queue.json")]
    queue: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a new task
    Add {
        /// Task description
        description: String,
    },

    /// List queued tasks and their statuses
    List,

    /// Cancel a pending task by its list position
    Cancel {
        /// 1-based task number as shown by `list`
        number: usize,
    },

    /// Run every pending task through the pipeline
    Run,

    /// Reset tasks left running by a crashed run back to pending
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = Arc::new(QueueStore::new(&cli.queue));
    let intake = Intake::new(store.clone());

    match cli.command {
        Commands::Add { description } => {
            let record = intake.submit(&description).await?;
            println!("Task queued: {}", record.description);
        }
        Commands::List => {
            list_tasks(&intake).await?;
        }
        Commands::Cancel { number } => {
            let index = number
                .checked_sub(1)
                .ok_or("task numbers start at 1")?;
            let record = intake.cancel(index).await?;
            println!("Task cancelled: {}", record.description);
        }
        Commands::Run => {
            run_queue(store).await?;
        }
        Commands::Reconcile => {
            let reset = reconcile(&store).await?;
            println!("Reset {reset} stale running task(s) to pending");
        }
    }

    Ok(())
}

async fn list_tasks(intake: &Intake) -> Result<(), Box<dyn std::error::Error>> {
    let records = intake.list().await?;
    if records.is_empty() {
        println!("No tasks in the queue.");
        return Ok(());
    }

    println!("Tasks ({}):", records.len());
    println!("{:<4}  {:<10}  {:<20}  {}", "#", "STATUS", "SUBMITTED", "DESCRIPTION");
    println!("{}", "-".repeat(80));

    for (index, record) in records.iter().enumerate() {
        println!(
            "{:<4}  {:<10}  {:<20}  {}",
            index + 1,
            record.status.to_string(),
            record.submitted_at.format("%Y-%m-%d %H:%M:%S"),
            record.description
        );
    }

    Ok(())
}

async fn run_queue(store: Arc<QueueStore>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AgentConfig::from_env();
    let chat = ChatClient::new(&config);

    let pipeline = Pipeline::new(
        Arc::new(LlmPlanner::new(chat.clone(), &config.workdir)),
        Arc::new(LlmEditor::new(chat.clone(), &config.workdir)),
        Arc::new(CommandVerifier::from_command(&config.test_command, &config.workdir)?),
        Arc::new(GitPublisher::new(&config, chat)),
    );

    let runner = Runner::new(store, pipeline);
    let summary = runner.drain().await?;

    println!(
        "Processed {} task(s): {} succeeded, {} failed, {} skipped",
        summary.processed, summary.succeeded, summary.failed, summary.skipped
    );

    Ok(())
}
