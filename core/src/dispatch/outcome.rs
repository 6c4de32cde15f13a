use serde::Serialize;

use crate::render::TextPatch;
use crate::state::FetchTicket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Follow-up work requested by a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<K: Ord> {
    Render,
    AppendPage { previous_page: u32 },
    Fetch(FetchTicket<K>),
    Lookup { id: String },
    Patch(TextPatch),
}

/// Warning shown when a change stayed in memory but missed storage.
pub const SAVE_FAILED: &str = "Changes could not be saved";

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<K: Ord> {
    pub effects: Vec<Effect<K>>,
    pub notifications: Vec<Notification>,
}

impl<K: Ord> Default for Outcome<K> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

impl<K: Ord> Outcome<K> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn render() -> Self {
        Self::none().with(Effect::Render)
    }

    pub fn with(mut self, effect: Effect<K>) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn notify(mut self, level: NoticeLevel, message: impl Into<String>) -> Self {
        self.notifications.push(Notification::new(level, message));
        self
    }

    /// Warns when the mutation behind this outcome could not be written.
    pub fn saved(self, persisted: bool) -> Self {
        if persisted {
            self
        } else {
            self.notify(NoticeLevel::Warning, SAVE_FAILED)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.notifications.is_empty()
    }
}
