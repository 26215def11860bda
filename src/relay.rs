//! The upload relay pipeline.
//!
//! One invocation moves one Telegram attachment to the hosting service:
//! extract a filename, stage the bytes locally, run the cosmetic progress
//! sweep, select an upload server, stream the staged file, and interpret
//! the result. Steps are strictly sequential; a failure at any step aborts
//! the invocation and the staged file is removed on every exit path.

use crate::bot::media::InboundFile;
use crate::config::{Settings, UPLOAD_INITIAL_BACKOFF_MS, UPLOAD_MAX_BACKOFF_MS};
use crate::gofile::GofileClient;
use crate::progress;
use crate::transient::StagedFile;
use std::sync::Arc;
use std::time::Duration;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can occur while relaying one file
#[derive(Debug, Error)]
pub enum RelayError {
    /// The message carried no supported attachment kind
    #[error("unsupported attachment type")]
    UnsupportedFileType,
    /// Fetching the bytes from Telegram failed
    #[error("download error: {0}")]
    Download(String),
    /// The server-discovery call failed or returned a malformed body
    #[error("server selection error: {0}")]
    ServerSelection(String),
    /// The upload transport failed or returned a non-success HTTP status
    #[error("upload error: {0}")]
    Upload(String),
    /// The hosting service itself refused the file
    #[error("hosting service rejected the file: status {0}")]
    RemoteRejected(String),
    /// Local staging I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Any other unexpected error
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Synthesize the upload filename for an attachment.
///
/// The declared name wins; attachments without one (photos, stripped
/// documents) fall back to `<unique-id>.bin`. No extension sniffing.
#[must_use]
pub fn relay_filename(declared: Option<&str>, unique_id: &str) -> String {
    declared.map_or_else(|| format!("{unique_id}.bin"), ToString::to_string)
}

/// Orchestrates download → select server → upload for one attachment.
pub struct UploadRelay {
    client: GofileClient,
    settings: Arc<Settings>,
}

impl UploadRelay {
    /// Create a relay over a hosting client.
    #[must_use]
    pub fn new(client: GofileClient, settings: Arc<Settings>) -> Self {
        Self { client, settings }
    }

    /// Relay one attachment and return the public download-page link.
    ///
    /// The staged file is removed when this returns, on every path.
    ///
    /// # Errors
    ///
    /// Returns the step-specific [`RelayError`]; the caller maps it to the
    /// single generic user-facing failure message.
    pub async fn run(
        &self,
        bot: &Bot,
        chat_id: ChatId,
        inbound: &InboundFile,
    ) -> Result<String, RelayError> {
        let filename = relay_filename(inbound.file_name.as_deref(), &inbound.unique_id);
        info!(chat_id = %chat_id, filename = %filename, size = inbound.size, "Relay started");

        let staged = StagedFile::create()?;
        self.download_to(bot, inbound, &staged).await?;

        // Cosmetic sweep over its own status message; canceled on any exit
        // path once the real exchange is done.
        let token = CancellationToken::new();
        let _sweep_guard = token.clone().drop_guard();
        match crate::bot::resilient::send_message_resilient(
            bot,
            chat_id,
            progress::get_progress_bar(0),
            None,
        )
        .await
        {
            Ok(msg) => {
                let _ = progress::spawn_sweep(bot.clone(), chat_id, msg.id, token);
            }
            Err(e) => warn!(error = %e, "Progress message could not be sent; continuing"),
        }

        let link = self.hosting_exchange(&staged, &filename).await?;
        info!(chat_id = %chat_id, link = %link, "Relay finished");
        Ok(link)
    }

    /// Materialize the attachment bytes into the staged file.
    async fn download_to(
        &self,
        bot: &Bot,
        inbound: &InboundFile,
        staged: &StagedFile,
    ) -> Result<(), RelayError> {
        crate::utils::retry_telegram_operation(|| async {
            let file = bot.get_file(inbound.file_id.clone()).await?;
            // Recreate the sink each attempt so a retry starts from a
            // truncated file instead of appending to a partial download.
            let mut dst = tokio::fs::File::create(staged.path()).await?;
            bot.download_file(&file.path, &mut dst).await?;
            dst.flush().await?;
            Ok(())
        })
        .await
        .map_err(|e| RelayError::Download(format!("{e:#}")))
    }

    /// Select a server and upload, with the configurable retry extension.
    ///
    /// `upload_retries = 0` preserves the fail-fast default. Service-level
    /// rejections are never retried; resubmitting a refused file cannot
    /// succeed.
    async fn hosting_exchange(
        &self,
        staged: &StagedFile,
        filename: &str,
    ) -> Result<String, RelayError> {
        let retries = self.settings.upload_retries;
        if retries == 0 {
            return self.exchange_once(staged, filename).await;
        }

        let strategy = ExponentialBackoff::from_millis(UPLOAD_INITIAL_BACKOFF_MS)
            .max_delay(Duration::from_millis(UPLOAD_MAX_BACKOFF_MS))
            .map(jitter)
            .take(retries);

        RetryIf::spawn(
            strategy,
            || self.exchange_once(staged, filename),
            |e: &RelayError| !matches!(e, RelayError::RemoteRejected(_)),
        )
        .await
    }

    async fn exchange_once(
        &self,
        staged: &StagedFile,
        filename: &str,
    ) -> Result<String, RelayError> {
        let server = self.client.best_server().await?;
        self.client.upload(&server, staged.path(), filename).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_filename_wins() {
        assert_eq!(
            relay_filename(Some("report.pdf"), "AQADAbc123"),
            "report.pdf"
        );
    }

    #[test]
    fn missing_filename_synthesizes_from_unique_id() {
        assert_eq!(relay_filename(None, "AQADAbc123"), "AQADAbc123.bin");
    }

    #[test]
    fn error_messages_carry_step_detail() {
        let e = RelayError::ServerSelection("getServer returned HTTP 503".to_string());
        assert_eq!(
            e.to_string(),
            "server selection error: getServer returned HTTP 503"
        );

        let e = RelayError::RemoteRejected("error".to_string());
        assert!(e.to_string().contains("status error"));
    }
}
