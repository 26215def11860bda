#![deny(missing_docs)]
//! Gofile Relay Bot
//!
//! A Telegram bot that relays user file attachments to the Gofile hosting
//! API and replies with a shareable download-page link.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// Gofile hosting API client
pub mod gofile;
/// Progress bar rendering and the simulated upload sweep
pub mod progress;
/// The upload relay pipeline and its error taxonomy
pub mod relay;
/// Scoped temporary files for staging transfers
pub mod transient;
pub mod utils;
