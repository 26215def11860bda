//! Command and message handlers.
//!
//! The file handler drives one relay invocation end to end and finishes
//! with exactly one outcome message: the link (with an inline open button)
//! on success, a distinct reply for unsupported attachments, and a single
//! generic failure message for everything else. Error detail goes to the
//! log, never to the user.

use crate::bot::media;
use crate::relay::{RelayError, UploadRelay};
use anyhow::Result;
use reqwest::Url;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// Liveness check
    #[command(description = "Health check.")]
    Healthcheck,
}

/// Handle `/start`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let text = "👋 Welcome to <b>Gofile Uploader Bot</b>!\n\n\
                📤 Just send me any file and I'll upload it to Gofile.io for you.\n\
                You'll get a permanent sharable link.\n\n\
                ⚡ Fast, Free, and Simple.";

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Handle `/healthcheck`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn healthcheck(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, "OK").await?;
    Ok(())
}

/// Handle a message carrying an attachment: relay it and report the outcome.
///
/// # Errors
///
/// Returns an error only if the outcome message itself cannot be sent;
/// relay failures are reported to the user and logged, not propagated.
pub async fn handle_file(bot: Bot, msg: Message, relay: Arc<UploadRelay>) -> Result<()> {
    let Some(inbound) = media::extract_attachment(&msg) else {
        return notify_outcome(&bot, msg.chat.id, Err(RelayError::UnsupportedFileType)).await;
    };

    info!(
        chat_id = %msg.chat.id,
        kind = inbound.kind.as_str(),
        size = inbound.size,
        "Accepted attachment"
    );

    if let Err(e) = crate::bot::resilient::send_message_resilient(
        &bot,
        msg.chat.id,
        "⬇️ Downloading your file from Telegram...",
        None,
    )
    .await
    {
        warn!(error = %e, "Status message could not be sent; continuing");
    }

    let outcome = relay.run(&bot, msg.chat.id, &inbound).await;
    notify_outcome(&bot, msg.chat.id, outcome).await
}

/// Handle any message without a supported attachment.
///
/// Commands are routed before this point, so everything landing here gets
/// the unsupported-type reply. No network calls beyond the reply itself.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn handle_unsupported(bot: Bot, msg: Message) -> Result<()> {
    notify_outcome(&bot, msg.chat.id, Err(RelayError::UnsupportedFileType)).await
}

/// Send the single final outcome message for one relay invocation.
///
/// # Errors
///
/// Returns an error if the message cannot be sent.
pub async fn notify_outcome(
    bot: &Bot,
    chat_id: ChatId,
    outcome: Result<String, RelayError>,
) -> Result<()> {
    match outcome {
        Ok(link) => {
            let text = format!(
                "✅ <b>File uploaded successfully!</b>\n\n🔗 <b>Link:</b> {}",
                html_escape::encode_text(&link)
            );
            let req = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
            match Url::parse(&link) {
                Ok(url) => {
                    let keyboard = InlineKeyboardMarkup::new(vec![vec![
                        InlineKeyboardButton::url("✅ Open File Link", url),
                    ]]);
                    req.reply_markup(keyboard).await?;
                }
                Err(e) => {
                    // Still report the raw link; only the button needs a
                    // parseable URL.
                    warn!(link = %link, error = %e, "Download page link is not a valid URL");
                    req.await?;
                }
            }
        }
        Err(RelayError::UnsupportedFileType) => {
            bot.send_message(chat_id, "❌ Unsupported file type.").await?;
        }
        Err(e) => {
            error!(error = %e, "Relay failed");
            bot.send_message(chat_id, "⚠️ Something went wrong. Please try again later.")
                .await?;
        }
    }

    Ok(())
}
