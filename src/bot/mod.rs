/// Command and message handlers
pub mod handlers;
/// Attachment extraction from Telegram messages
pub mod media;
/// Resilient send/edit wrappers for the Telegram API
pub mod resilient;
