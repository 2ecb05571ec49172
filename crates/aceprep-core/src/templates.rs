//! Bounded store of saved custom-test configurations.
//!
//! Most recent first, at most [`MAX_TEMPLATES`] entries. Persistence is best
//! effort: a list that cannot be read starts the store empty, and a failed
//! write is logged while the in-memory list stays authoritative for the rest
//! of the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ExamLevel;
use crate::persist::Persist;
use crate::selection::Selection;

/// Maximum number of templates kept.
pub const MAX_TEMPLATES: usize = 10;

/// A named snapshot of a custom test configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTemplate {
    pub id: String,
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub exam_level: ExamLevel,
    pub count: u32,
    pub saved_at: DateTime<Utc>,
}

/// The configuration a template restores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTemplate {
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub exam_level: ExamLevel,
    pub count: u32,
}

/// Saved templates backed by a [`Persist`] implementation.
pub struct TemplateStore {
    templates: Vec<SavedTemplate>,
    backend: Box<dyn Persist<Vec<SavedTemplate>>>,
}

impl TemplateStore {
    /// Load the persisted list. Unreadable data yields an empty store.
    pub fn open(backend: impl Persist<Vec<SavedTemplate>> + 'static) -> Self {
        let mut templates = match backend.load() {
            Ok(Some(list)) => list,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("failed to load saved templates, starting empty: {e:#}");
                Vec::new()
            }
        };
        templates.truncate(MAX_TEMPLATES);
        Self {
            templates,
            backend: Box::new(backend),
        }
    }

    /// Most recent first.
    pub fn list(&self) -> &[SavedTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SavedTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Save a new template at the front, evicting the oldest beyond the cap.
    pub fn save(&mut self, selection: &Selection, exam_level: ExamLevel, count: u32) -> &SavedTemplate {
        let template = SavedTemplate {
            id: Uuid::new_v4().to_string(),
            subjects: selection.subjects().to_vec(),
            topics: selection.topics().to_vec(),
            exam_level,
            count,
            saved_at: Utc::now(),
        };
        tracing::debug!(id = %template.id, "saving template");
        self.templates.insert(0, template);
        if self.templates.len() > MAX_TEMPLATES {
            let evicted = self.templates.split_off(MAX_TEMPLATES);
            tracing::debug!(count = evicted.len(), "evicted oldest templates");
        }
        self.flush();
        &self.templates[0]
    }

    /// Delete the template with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        let removed = self.templates.len() != before;
        if removed {
            self.flush();
        }
        removed
    }

    /// The stored configuration of `id`, exactly as saved.
    pub fn apply(&self, id: &str) -> Option<AppliedTemplate> {
        self.get(id).map(|t| AppliedTemplate {
            subjects: t.subjects.clone(),
            topics: t.topics.clone(),
            exam_level: t.exam_level,
            count: t.count,
        })
    }

    fn flush(&self) {
        if let Err(e) = self.backend.save(&self.templates) {
            tracing::warn!("failed to persist saved templates: {e:#}");
        }
    }
}
