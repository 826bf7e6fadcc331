//! `vshot` command line client.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vshot_client::{ClientConfig, ScreenshotClient};
use vshot_controller::{ControllerConfig, JobController, JobOutcome, Presenter, SubmitOutcome};
use vshot_models::validation::parse_interval;
use vshot_models::{JobEvent, JobRequest, VideoFile};

/// Upload a video and extract screenshots at a fixed interval.
#[derive(Debug, Parser)]
#[command(name = "vshot", version, about)]
struct Args {
    /// Video file to upload
    video: PathBuf,

    /// Seconds between screenshots
    #[arg(short, long)]
    interval: String,

    /// Screenshot service base URL
    #[arg(long, env = "VSHOT_SERVER_URL")]
    server: Option<String>,

    /// Download the finished archive into this directory
    #[arg(short, long)]
    download: Option<PathBuf>,

    /// Give up after this many consecutive failed status checks
    #[arg(long)]
    max_poll_failures: Option<u32>,

    /// Milliseconds between status checks
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

/// Prints events to the terminal.
struct ConsolePresenter {
    client: Arc<ScreenshotClient>,
    progress_shown: bool,
}

impl Presenter for ConsolePresenter {
    fn present(&mut self, event: &JobEvent) {
        match event {
            JobEvent::JobStarted { job_id, .. } => {
                println!("{} (job {})", event.message(), job_id);
            }
            // Repeated progress reports carry nothing new.
            JobEvent::JobProgress { .. } => {
                if !self.progress_shown {
                    self.progress_shown = true;
                    println!("{}", event.message());
                }
            }
            JobEvent::JobCompleted { download_ref, .. } => {
                println!("{}", event.message());
                println!("Download: {}", self.client.download_url(download_ref));
            }
            _ => eprintln!("Error: {}", event.message()),
        }
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vshot=warn,vshot_controller=warn,vshot_client=warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut client_config = ClientConfig::from_env();
    if let Some(server) = args.server {
        client_config = client_config.with_base_url(server);
    }
    let client = Arc::new(ScreenshotClient::new(client_config).context("invalid server configuration")?);

    let mut config = ControllerConfig::from_env();
    if let Some(max) = args.max_poll_failures {
        config = config.with_max_poll_failures(Some(max));
    }
    if let Some(ms) = args.poll_interval_ms.filter(|ms| *ms > 0) {
        config = config.with_poll_interval(Duration::from_millis(ms));
    }
    info!(server = %client.config().base_url, ?config, "Starting vshot");

    // A missing or unreadable path is reported by validation as "no file".
    let file = VideoFile::from_path(&args.video).ok();
    let interval_seconds = parse_interval(&args.interval);
    if let Some(file) = &file {
        match interval_seconds {
            Some(_) => println!(
                "{} ({}), estimated processing time: {}",
                file.name,
                file.formatted_size(),
                file.estimated_processing_time()
            ),
            None => println!("{} ({})", file.name, file.formatted_size()),
        }
    }
    let request = JobRequest {
        file,
        interval_seconds,
    };

    let presenter = ConsolePresenter {
        client: Arc::clone(&client),
        progress_shown: false,
    };
    let mut controller = JobController::with_client(Arc::clone(&client), presenter, config);

    match controller.submit(&request).await? {
        SubmitOutcome::Started(_) => {}
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed(_) => return Ok(ExitCode::FAILURE),
    }

    let finished = tokio::select! {
        outcome = controller.run_until_idle() => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    let Some(outcome) = finished else {
        warn!("Interrupted while a job was running");
        eprintln!("Video processing is in progress. The job keeps running on the server.");
        controller.shutdown();
        return Ok(ExitCode::FAILURE);
    };

    match outcome {
        Some(JobOutcome::Completed(result)) => {
            if let Some(dir) = args.download {
                let path = client
                    .download(&result.archive_ref, &dir)
                    .await
                    .with_context(|| format!("failed to download {}", result.archive_ref))?;
                println!("Saved {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(JobOutcome::Failed(_)) | None => Ok(ExitCode::FAILURE),
    }
}
