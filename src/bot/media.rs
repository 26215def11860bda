//! Attachment extraction from Telegram messages.
//!
//! Maps the supported attachment kinds (document, video, audio, photo) to an
//! [`InboundFile`] the relay can transfer. Photos pick the largest size
//! variant. Anything else is unsupported.

use teloxide::types::{FileId, Message};

/// Supported attachment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A generic document attachment
    Document,
    /// A video attachment
    Video,
    /// An audio attachment
    Audio,
    /// A photo attachment (largest size variant)
    Photo,
}

impl AttachmentKind {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Photo => "photo",
        }
    }
}

/// Borrowed reference to one inbound attachment, valid for one transfer.
#[derive(Debug, Clone)]
pub struct InboundFile {
    /// Telegram file identifier used to fetch the bytes
    pub file_id: FileId,
    /// Stable unique identifier, used to synthesize a fallback filename
    pub unique_id: String,
    /// Declared filename, if the attachment kind carries one
    pub file_name: Option<String>,
    /// Declared size in bytes
    pub size: u32,
    /// Which attachment kind the message carried
    pub kind: AttachmentKind,
}

/// Whether a message carries a supported attachment.
#[must_use]
pub fn has_attachment(msg: &Message) -> bool {
    msg.document().is_some()
        || msg.video().is_some()
        || msg.audio().is_some()
        || msg.photo().is_some()
}

/// Extract the attachment from a message, if it carries a supported kind.
#[must_use]
pub fn extract_attachment(msg: &Message) -> Option<InboundFile> {
    if let Some(doc) = msg.document() {
        return Some(InboundFile {
            file_id: doc.file.id.clone(),
            unique_id: doc.file.unique_id.to_string(),
            file_name: doc.file_name.clone(),
            size: doc.file.size,
            kind: AttachmentKind::Document,
        });
    }

    if let Some(video) = msg.video() {
        return Some(InboundFile {
            file_id: video.file.id.clone(),
            unique_id: video.file.unique_id.to_string(),
            file_name: video.file_name.clone(),
            size: video.file.size,
            kind: AttachmentKind::Video,
        });
    }

    if let Some(audio) = msg.audio() {
        return Some(InboundFile {
            file_id: audio.file.id.clone(),
            unique_id: audio.file.unique_id.to_string(),
            file_name: audio.file_name.clone(),
            size: audio.file.size,
            kind: AttachmentKind::Audio,
        });
    }

    // Photos come as a size ladder; the last entry is the largest.
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(InboundFile {
            file_id: photo.file.id.clone(),
            unique_id: photo.file.unique_id.to_string(),
            file_name: None,
            size: photo.file.size,
            kind: AttachmentKind::Photo,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(AttachmentKind::Document.as_str(), "document");
        assert_eq!(AttachmentKind::Video.as_str(), "video");
        assert_eq!(AttachmentKind::Audio.as_str(), "audio");
        assert_eq!(AttachmentKind::Photo.as_str(), "photo");
    }
}
