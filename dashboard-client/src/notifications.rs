//! Dismissible toast messages in a fixed-position container.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::dom::{Document, El, NodeId};

pub const CONTAINER_ID: &str = "notification-container";
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

const CONTAINER_STYLE: [(&str, &str); 6] = [
    ("position", "fixed"),
    ("top", "80px"),
    ("right", "20px"),
    ("z-index", "1050"),
    ("width", "350px"),
    ("max-width", "calc(100% - 20px)"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }
}

/// A message waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    #[serde(default)]
    pub level: Level,
}

impl Notice {
    pub fn new(message: impl Into<String>, level: Level) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub node: NodeId,
    pub close: NodeId,
    pub expires_at: Option<Instant>,
}

#[derive(Debug)]
pub struct Notifications {
    default_duration: Duration,
    toasts: Vec<Toast>,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl Notifications {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            default_duration,
            toasts: Vec::new(),
        }
    }

    /// Appends a toast. `duration` falls back to the configured default; a
    /// zero duration keeps the toast until it is dismissed.
    pub fn show(
        &mut self,
        doc: &mut Document,
        notice: &Notice,
        duration: Option<Duration>,
        now: Instant,
    ) -> Uuid {
        let container = self.container(doc);
        let node = doc.append(
            container,
            El::new("div").class(&format!(
                "alert alert-{} alert-dismissible fade show",
                notice.level.as_str()
            )),
        );
        doc.append(node, El::new("span").text(&notice.message));
        let close = doc.append(
            node,
            El::new("button")
                .attr("type", "button")
                .attr("data-bs-dismiss", "alert")
                .class("btn-close"),
        );

        let duration = duration.unwrap_or(self.default_duration);
        let id = Uuid::new_v4();
        debug!(%id, level = notice.level.as_str(), "toast shown");
        self.toasts.push(Toast {
            id,
            node,
            close,
            expires_at: (!duration.is_zero()).then(|| now + duration),
        });
        id
    }

    fn container(&self, doc: &mut Document) -> NodeId {
        if let Some(existing) = doc.get_element_by_id(CONTAINER_ID) {
            return existing;
        }
        let mut el = El::new("div").id(CONTAINER_ID);
        for (prop, value) in CONTAINER_STYLE {
            el = el.style(prop, value);
        }
        let body = doc.body();
        doc.append(body, el)
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// The toast whose close button is `node`.
    pub fn by_close_button(&self, node: NodeId) -> Option<Uuid> {
        self.toasts.iter().find(|t| t.close == node).map(|t| t.id)
    }

    pub fn dismiss(&mut self, doc: &mut Document, id: Uuid) -> bool {
        let Some(pos) = self.toasts.iter().position(|t| t.id == id) else {
            return false;
        };
        let toast = self.toasts.remove(pos);
        doc.remove(toast.node);
        true
    }

    /// Removes every toast whose deadline has passed; returns how many.
    pub fn expire(&mut self, doc: &mut Document, now: Instant) -> usize {
        let (expired, kept): (Vec<Toast>, Vec<Toast>) = self
            .toasts
            .drain(..)
            .partition(|t| t.expires_at.is_some_and(|at| at <= now));
        self.toasts = kept;
        for toast in &expired {
            doc.remove(toast.node);
        }
        expired.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.toasts.iter().filter_map(|t| t.expires_at).min()
    }
}
