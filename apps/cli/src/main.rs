mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cvscan_api::analysis::KeywordAnalyzer;
use cvscan_api::analysis_client::{AnalysisClient, HttpAnalysisClient, LocalAnalysisClient};
use cvscan_api::models::Document;
use cvscan_api::session::{RefinementSession, SessionError};

#[derive(Parser)]
#[command(name = "cvscan")]
#[command(about = "Score a résumé against a job description and refine the rewrite", long_about = None)]
#[command(version)]
struct Cli {
    /// Résumé file (.pdf, .docx, .txt or .md)
    #[arg(long)]
    resume: PathBuf,

    /// Job description as a text file
    #[arg(long)]
    job: PathBuf,

    /// Base URL of a running cvscan-api
    #[arg(long, env = "CVSCAN_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Analyze in-process with the keyword analyzer; ignores --server
    #[arg(long)]
    offline: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("cvscan={}", cli.log_level))),
        )
        .with_writer(std::io::stderr)
        .init();

    let client: Arc<dyn AnalysisClient> = if cli.offline {
        Arc::new(LocalAnalysisClient::new(Arc::new(KeywordAnalyzer)))
    } else {
        Arc::new(HttpAnalysisClient::new(cli.server.clone())?)
    };
    let color = !cli.no_color;

    let document = read_document(&cli.resume)?;
    let job_description = std::fs::read_to_string(&cli.job)
        .with_context(|| format!("Failed to read job description {}", cli.job.display()))?;

    let session = RefinementSession::new(client);
    debug!("Session {}", session.snapshot().session_id);

    println!("Analyzing {} ...", cli.resume.display());
    session.analyze(document, &job_description).await?;
    print_state(&session, color);

    println!("\nEnter feedback to refine the rewrite (empty line to quit):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let feedback = line.trim();
        if feedback.is_empty() {
            break;
        }
        match session.refine(feedback).await {
            Ok(refinement) => {
                println!("\nRevision {}:", refinement.revision);
                print_panes(&session, color);
            }
            Err(SessionError::Client(err)) => {
                let message = format!("Refinement failed: {err}");
                if color {
                    eprintln!("{}", message.red());
                } else {
                    eprintln!("{message}");
                }
                eprintln!("The previous rewrite is kept.");
            }
            Err(err) => return Err(err.into()),
        }
        println!("\nMore feedback (empty line to quit):");
    }

    Ok(())
}

fn read_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read résumé {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Document::new(file_name, bytes))
}

fn print_state<C: AnalysisClient>(session: &RefinementSession<C>, color: bool) {
    let state = session.snapshot();
    if let Some(analysis) = &state.analysis {
        println!("{}", render::render_report(analysis, color));
    }
    print_panes(session, color);
}

fn print_panes<C: AnalysisClient>(session: &RefinementSession<C>, color: bool) {
    let state = session.snapshot();
    if let Some((original, rewritten)) = state.diff_inputs() {
        println!("{}", render::render_panes(original, rewritten, color));
    }
}
