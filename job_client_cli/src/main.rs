use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use job_client_cli::{utils, ClientError, JobClient, JobStatus, Submission};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit and track pipeline jobs", long_about = None)]
struct Args {
    /// Base URL of the job service
    #[arg(long, env = "JOB_API_URL", default_value = "http://127.0.0.1:8000")]
    api_url: String,

    /// Also write the JSON result to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Give up retrying unreachable or failing servers after this many seconds
    #[arg(long, default_value_t = 30)]
    retry_budget: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a new job
    Submit {
        /// Pipeline name, e.g. gatk_variant_calling
        pipeline: String,

        /// Pipeline parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        research_group: Option<String>,

        /// Block until the job finishes
        #[arg(short, long)]
        wait: bool,

        /// Seconds between status polls when waiting
        #[arg(long, default_value_t = 2)]
        poll_interval: u64,

        /// Seconds to wait before giving up
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Show one job
    Get { id: Uuid },

    /// List jobs, newest first
    List {
        #[arg(short, long)]
        research_group: Option<String>,

        #[arg(short, long, value_enum)]
        status: Option<JobStatus>,
    },

    /// Wait for an existing job to finish
    Wait {
        id: Uuid,

        #[arg(long, default_value_t = 2)]
        poll_interval: u64,

        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },

    /// Show available pipelines, or one pipeline's schema
    Pipelines { name: Option<String> },

    /// Show the orchestrator backend and its pipelines
    Status,

    /// Submit every entry of a JSON array of submissions
    Batch {
        file: PathBuf,

        /// Number of concurrent requests
        #[arg(short, long, default_value_t = 5)]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = JobClient::new(&args.api_url)?.with_retry_budget(Duration::from_secs(args.retry_budget));

    let output = match run(&client, args.command).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    utils::print_json(&output)?;
    if let Some(path) = args.output {
        utils::save_json(&output, &path)?;
    }
    Ok(())
}

async fn run(client: &JobClient, command: Command) -> Result<Value, ClientError> {
    let value = match command {
        Command::Submit {
            pipeline,
            params,
            description,
            research_group,
            wait,
            poll_interval,
            timeout,
        } => {
            let mut submission = Submission::new(pipeline, serde_json::from_str(&params)?);
            submission.description = description;
            submission.research_group = research_group;

            let job = client.submit(&submission).await?;
            eprintln!("📤 Submitted job {}", job.id);
            let job = if wait {
                client
                    .wait_for_completion(
                        job.id,
                        Duration::from_secs(poll_interval),
                        Duration::from_secs(timeout),
                    )
                    .await?
            } else {
                job
            };
            serde_json::to_value(job)?
        }
        Command::Get { id } => serde_json::to_value(client.get(id).await?)?,
        Command::List {
            research_group,
            status,
        } => serde_json::to_value(client.list(research_group.as_deref(), status).await?)?,
        Command::Wait {
            id,
            poll_interval,
            timeout,
        } => {
            let job = client
                .wait_for_completion(id, Duration::from_secs(poll_interval), Duration::from_secs(timeout))
                .await?;
            serde_json::to_value(job)?
        }
        Command::Pipelines { name } => client.pipelines(name.as_deref()).await?,
        Command::Status => client.orchestrator_status().await?,
        Command::Batch { file, concurrent } => {
            let submissions: Vec<Submission> = serde_json::from_slice(&std::fs::read(file)?)?;
            let results = client.submit_batch(submissions, concurrent).await;

            let mut submitted = Vec::new();
            let mut failed = Vec::new();
            for (index, result) in results.into_iter().enumerate() {
                match result {
                    Ok(job) => submitted.push(serde_json::to_value(job)?),
                    Err(e) => failed.push(serde_json::json!({ "index": index, "error": e.to_string() })),
                }
            }
            eprintln!("📦 {} submitted, {} failed", submitted.len(), failed.len());
            serde_json::json!({ "submitted": submitted, "failed": failed })
        }
    };
    Ok(value)
}
