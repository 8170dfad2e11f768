//! The snapshot run: fetch → parse → write.
//!
//! Stages run strictly in order on the caller's task. The output file is
//! touched only after a non-empty article list exists, so every failure
//! leaves the previous snapshot in place.
use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::feed::{
    build_client, fetch_feed, parse_feed, ClientBuildError, FeedKind, ParseError, ParseResult,
    TransportError,
};
use crate::output::{to_path_records, write_envelope, Envelope, OutputVariant, WriteError};

/// Why a run produced no snapshot.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The HTTP client could not be configured.
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    /// Primary and fallback URLs both failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The body was not well-formed XML.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Parsing succeeded but no entry had both a title and a URL.
    #[error("The RSS feed did not contain any articles.")]
    Empty,
    /// The snapshot could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// What a successful run wrote.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub kind: FeedKind,
    pub articles: usize,
    pub skipped: usize,
    pub output_path: PathBuf,
}

/// Runs the pipeline with a client built from `config`.
pub async fn run(config: &Config) -> Result<RunSummary, PipelineError> {
    let client = build_client(config)?;
    run_with_client(config, &client).await
}

/// Runs the pipeline with a caller-supplied client.
///
/// # Errors
///
/// - [`PipelineError::Transport`] - Every source URL failed
/// - [`PipelineError::Parse`] - Malformed XML
/// - [`PipelineError::Empty`] - Zero qualifying articles
/// - [`PipelineError::Write`] - Snapshot could not be written
pub async fn run_with_client(
    config: &Config,
    client: &reqwest::Client,
) -> Result<RunSummary, PipelineError> {
    let bytes = fetch_feed(client, &config.sources(), config.timeout()).await?;

    let ParseResult {
        kind,
        articles,
        skipped,
    } = parse_feed(&bytes, &config.parse_options())?;

    if skipped > 0 {
        tracing::warn!(
            skipped = skipped,
            "Entries without a title or URL skipped"
        );
    }

    if articles.is_empty() {
        return Err(PipelineError::Empty);
    }

    let count = articles.len();
    tracing::debug!(kind = ?kind, articles = count, "Parsed feed");

    match config.variant {
        OutputVariant::Tagged => {
            write_envelope(&config.output_path, &Envelope::now(articles))?;
        }
        OutputVariant::Path => {
            let records =
                to_path_records(articles, &config.site_origin, &config.placeholder_emoji);
            write_envelope(&config.output_path, &Envelope::now(records))?;
        }
    }

    Ok(RunSummary {
        kind,
        articles: count,
        skipped,
        output_path: config.output_path.clone(),
    })
}
