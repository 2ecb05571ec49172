//! Subject/topic selection bookkeeping.
//!
//! Invariant: after every operation, each selected topic belongs to the
//! chapter list of at least one selected subject. Insertion order is kept
//! because it is the order the subjects and topics appear in prompts.
//!
//! Toggling all chapters of a subject twice in a row restores the topics
//! selected before the first toggle. Any other mutation in between forgets
//! the earlier state.

use serde::{Deserialize, Serialize};

use crate::catalog::SubjectCatalog;

/// Selected subjects and topics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    subjects: Vec<String>,
    topics: Vec<String>,
    /// Topics before the last fill by `toggle_all_in_subject`, keyed by
    /// subject.
    #[serde(skip)]
    before_fill: Option<(String, Vec<String>)>,
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.subjects == other.subjects && self.topics == other.topics
    }
}

impl Eq for Selection {}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from raw parts, dropping anything the catalog does
    /// not support so the invariant holds.
    pub fn restore(catalog: &SubjectCatalog, subjects: &[String], topics: &[String]) -> Self {
        let mut selection = Self::new();
        for subject in subjects {
            if catalog.contains_subject(subject) && !selection.has_subject(subject) {
                selection.subjects.push(subject.clone());
            }
        }
        for topic in topics {
            selection.add_topic(catalog, topic);
        }
        selection
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn has_subject(&self, name: &str) -> bool {
        self.subjects.iter().any(|s| s == name)
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.iter().any(|t| t == name)
    }

    /// Add `name` to the subject set, or remove it together with every topic
    /// no longer covered by a remaining subject.
    ///
    /// Returns `true` if the subject is selected afterwards. Unknown subjects
    /// are ignored.
    pub fn toggle_subject(&mut self, catalog: &SubjectCatalog, name: &str) -> bool {
        self.before_fill = None;
        if self.has_subject(name) {
            self.subjects.retain(|s| s != name);
            let subjects = &self.subjects;
            self.topics.retain(|t| {
                subjects
                    .iter()
                    .any(|s| catalog.subject_has_topic(s, t))
            });
            false
        } else if catalog.contains_subject(name) {
            self.subjects.push(name.to_string());
            true
        } else {
            false
        }
    }

    /// Insert `name` if a selected subject lists it. Idempotent.
    ///
    /// Returns `true` if the topic was inserted by this call.
    pub fn add_topic(&mut self, catalog: &SubjectCatalog, name: &str) -> bool {
        self.before_fill = None;
        if name.is_empty() || self.has_topic(name) || !self.covers(catalog, name) {
            return false;
        }
        self.topics.push(name.to_string());
        true
    }

    /// Remove `name` if present. Idempotent.
    pub fn remove_topic(&mut self, name: &str) -> bool {
        self.before_fill = None;
        let before = self.topics.len();
        self.topics.retain(|t| t != name);
        self.topics.len() != before
    }

    /// Select every chapter of `subject`, or deselect all of them when each
    /// one is already selected.
    ///
    /// The "all selected" test is exact: every chapter of the subject must be
    /// present. Chapters of other subjects that happen to be selected play no
    /// part. When the previous mutation was a fill of the same subject, the
    /// topics from before that fill come back instead. No-op for a subject
    /// that is not selected.
    pub fn toggle_all_in_subject(&mut self, catalog: &SubjectCatalog, subject: &str) {
        let before_fill = self.before_fill.take();
        if !self.has_subject(subject) {
            return;
        }
        let chapters = catalog.topics(subject);
        if chapters.is_empty() {
            return;
        }
        if self.all_selected_in(catalog, subject) {
            match before_fill {
                Some((filled, topics)) if filled == subject => self.topics = topics,
                _ => self.topics.retain(|t| !chapters.contains(t)),
            }
        } else {
            self.before_fill = Some((subject.to_string(), self.topics.clone()));
            for chapter in chapters {
                if !self.has_topic(chapter) {
                    self.topics.push(chapter.clone());
                }
            }
        }
    }

    /// Whether every chapter of `subject` is selected.
    pub fn all_selected_in(&self, catalog: &SubjectCatalog, subject: &str) -> bool {
        let chapters = catalog.topics(subject);
        !chapters.is_empty() && chapters.iter().all(|c| self.has_topic(c))
    }

    /// Selected topics that belong to `subject`.
    pub fn topics_in<'a>(
        &'a self,
        catalog: &'a SubjectCatalog,
        subject: &'a str,
    ) -> impl Iterator<Item = &'a String> {
        self.topics
            .iter()
            .filter(move |t| catalog.subject_has_topic(subject, t))
    }

    /// Whether the topic invariant holds against `catalog`.
    pub fn is_consistent(&self, catalog: &SubjectCatalog) -> bool {
        self.topics.iter().all(|t| self.covers(catalog, t))
    }

    pub fn clear(&mut self) {
        self.before_fill = None;
        self.subjects.clear();
        self.topics.clear();
    }

    fn covers(&self, catalog: &SubjectCatalog, topic: &str) -> bool {
        self.subjects
            .iter()
            .any(|s| catalog.subject_has_topic(s, topic))
    }
}
