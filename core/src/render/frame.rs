use serde::Serialize;

use super::markup::Markup;
use crate::dispatch::Notification;

/// Narrow update for high-frequency text: replace the text content of one
/// node without touching the surrounding subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPatch {
    pub target_id: String,
    pub text: String,
}

impl TextPatch {
    pub fn new(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            text: text.into(),
        }
    }
}

/// One change a shell applies to its surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Replace the content of `target` wholesale.
    Replace { target: String, markup: Markup },
    /// Append `markup` to the end of `target`.
    Append {
        target: String,
        markup: Markup,
        has_more: bool,
    },
    Patch(TextPatch),
    Toast(Notification),
}

impl Frame {
    pub fn target(&self) -> Option<&str> {
        match self {
            Frame::Replace { target, .. } | Frame::Append { target, .. } => Some(target),
            Frame::Patch(patch) => Some(&patch.target_id),
            Frame::Toast(_) => None,
        }
    }
}
