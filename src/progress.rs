//! Progress bar rendering and the simulated upload sweep.
//!
//! The sweep is cosmetic: it is not tied to real byte counts and exists only
//! to keep the status message alive while the hosting exchange runs. It is
//! spawned as a background task and canceled as soon as the real transfer
//! finishes or fails.

use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Number of segments in the rendered bar.
const BAR_SEGMENTS: u8 = 10;
/// Pause between simulated 10% steps.
pub const STEP_DELAY: Duration = Duration::from_millis(250);

/// Render a ten-segment star bar for a percentage.
///
/// Values above 100 clamp to a full bar.
///
/// # Examples
///
/// ```
/// use gofile_relay::progress::get_progress_bar;
///
/// assert_eq!(get_progress_bar(30), "[★★★✩✩✩✩✩✩✩] 30%");
/// ```
#[must_use]
pub fn get_progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100) / 10);
    let empty = usize::from(BAR_SEGMENTS) - filled;
    format!("[{}{}] {percent}%", "★".repeat(filled), "✩".repeat(empty))
}

/// Spawn the simulated 10%→100% sweep over an existing status message.
///
/// Each step waits [`STEP_DELAY`], then edits the message in place. Edits
/// degrade gracefully: a failed edit stops the sweep instead of retrying
/// forever against a deleted message. Cancel the token to stop the sweep
/// early once the real transfer has finished.
pub fn spawn_sweep(
    bot: Bot,
    chat_id: ChatId,
    msg_id: MessageId,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        for percent in (10..=100u8).step_by(10) {
            tokio::select! {
                () = token.cancelled() => return,
                () = tokio::time::sleep(STEP_DELAY) => {}
            }
            let bar = get_progress_bar(percent);
            if !crate::bot::resilient::edit_message_safe_resilient(&bot, chat_id, msg_id, &bar)
                .await
            {
                return;
            }
        }
    })
}
