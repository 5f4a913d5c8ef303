use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use etl_output_cleanup::{CleanupConfig, CleanupJob, DataCleanupError, LogCompletion, s3::{s3_client::S3Client, s3_client_config::S3ClientConfig}};

/// Deletes the previous run's output under an S3 prefix before a new ETL run.
#[derive(Debug, Parser)]
#[command(name = "etl-cleanup", version)]
struct Args {
    #[arg(long = "glue_output_bucket")]
    bucket: String,

    #[arg(long = "glue_output_s3_key_prefix")]
    prefix: String,

    #[arg(long = "solution_id", default_value = "")]
    solution_id: String,

    #[arg(long = "solution_version", default_value = "")]
    solution_version: String,

    /// Custom S3 endpoint, e.g. a local MinIO.
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long)]
    region: Option<String>,

    #[arg(long = "force_path_style")]
    force_path_style: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<DataCleanupError>() {
                Some(cleanup) => tracing::error!(code = cleanup.error_code(), "{}", cleanup),
                None => tracing::error!("{:#}", err),
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut client_config = S3ClientConfig::builder()
        .force_path_style(args.force_path_style)
        .solution(&args.solution_id, &args.solution_version);

    if let Some(endpoint) = &args.endpoint {
        client_config = client_config.endpoint(endpoint);
    }

    if let Some(region) = &args.region {
        client_config = client_config.region(region);
    }

    let client = S3Client::connect(client_config.build()?).await?;
    let config = CleanupConfig::builder()
        .bucket(&args.bucket)
        .prefix(&args.prefix)
        .build()?;

    CleanupJob::new(config, Arc::new(client))
        .run_and_commit(&mut LogCompletion)
        .await?;

    Ok(())
}
