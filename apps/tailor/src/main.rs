mod cli;
mod config;
mod errors;
mod layout;
mod models;
mod normalize;
mod remote_client;
mod render;
mod workflow;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands, InputArgs};
use crate::config::Config;
use crate::layout::PageGeometry;
use crate::remote_client::{JobMetadata, RemoteClient, ResumeFile};
use crate::workflow::{
    format_score, Coordinator, Notification, Presenter, ScoreBand, ServiceHealth, Severity,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.api_base.clone(), cli.timeout_secs);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        api_base = %config.api_base,
        timeout_secs = config.timeout_secs,
        "Starting tailor v{}",
        env!("CARGO_PKG_VERSION")
    );

    match cli.command {
        Commands::Ping => ping(&build_coordinator(&config)?).await,
        Commands::Score(input) => {
            let coordinator = build_coordinator(&config)?;
            prepare(&coordinator, input).await?;
            coordinator.fetch_score().await?;
            print_summary(&coordinator);
            Ok(())
        }
        Commands::Run {
            input,
            out,
            no_export,
            layout,
        } => {
            let coordinator = build_coordinator(&config)?;
            prepare(&coordinator, input).await?;
            coordinator.fetch_score().await?;
            let tailored = coordinator.tailor().await?;
            print_summary(&coordinator);
            if no_export {
                return Ok(());
            }
            let path = out.unwrap_or_else(|| PathBuf::from(&config.export_filename));
            export(&tailored.tailored_text, &layout.geometry(), &path).await
        }
        Commands::Export { input, out, layout } => {
            let text = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let path = out.unwrap_or_else(|| PathBuf::from(&config.export_filename));
            export(&text, &layout.geometry(), &path).await
        }
    }
}

fn build_coordinator(config: &Config) -> Result<Coordinator> {
    let client = RemoteClient::new(
        config.api_base.clone(),
        Duration::from_secs(config.timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    info!(base_url = client.base_url(), "Remote client initialized");
    Ok(Coordinator::new(Arc::new(client), Arc::new(CliPresenter)))
}

async fn ping(coordinator: &Coordinator) -> Result<()> {
    let health = coordinator.check_health().await;
    println!("AI service: {}", health.label());
    match health {
        ServiceHealth::Ok => Ok(()),
        ServiceHealth::Degraded(status) => bail!("AI service is not healthy ({status})"),
    }
}

/// Uploads the resume and saves the job description concurrently.
async fn prepare(coordinator: &Coordinator, input: InputArgs) -> Result<()> {
    let file = ResumeFile::from_path(&input.resume)
        .await
        .with_context(|| format!("Failed to load resume {}", input.resume.display()))?;
    let description = read_job_description(&input.job).await?;
    let metadata: JobMetadata = input.metadata.into();

    let (resume, job) = tokio::join!(
        coordinator.upload_resume(&file),
        coordinator.save_job(&description, &metadata),
    );
    resume?;
    job?;
    Ok(())
}

async fn read_job_description(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read job description from stdin")?;
        return Ok(text);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read job description {}", path.display()))
}

async fn export(text: &str, geometry: &PageGeometry, path: &Path) -> Result<()> {
    let pages = render::export_pdf(text, geometry, path)
        .await
        .with_context(|| format!("Failed to export {}", path.display()))?;
    println!("Wrote {} ({} page{})", path.display(), pages, if pages == 1 { "" } else { "s" });
    Ok(())
}

fn print_summary(coordinator: &Coordinator) {
    let session = coordinator.session();
    if !session.is_ready() {
        return;
    }
    if let (Some(resume), Some(job)) = (session.resume_id(), session.job_id()) {
        println!("Resume #{resume} / Job #{job}");
    }
    if let Some(score) = session.ats_score() {
        println!(
            "ATS score: {} ({})",
            format_score(score),
            ScoreBand::from_score(score).label()
        );
    }
    if !session.tailored_text().is_empty() {
        println!("Tailored text: {} chars", session.tailored_text().chars().count());
    }
}

/// Prints notifications to the terminal; the tailored text goes to stdout.
struct CliPresenter;

impl Presenter for CliPresenter {
    fn notify(&self, notification: &Notification) {
        match notification.severity {
            Severity::Warning | Severity::Error => {
                eprintln!("[{}] {}", notification.severity, notification.message)
            }
            Severity::Success => {
                println!("[{}] {}", notification.severity, notification.message)
            }
        }
    }

    fn show_tailored(&self, text: &str) {
        println!("──── Tailored resume ────");
        println!("{text}");
        println!("─────────────────────────");
    }
}
