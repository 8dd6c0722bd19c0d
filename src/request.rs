//! URL path construction and payload types for the tracking endpoints.

use serde::Serialize;

use crate::response::{Dialogue, Panel, RevisionMeta, SequenceRevision};

/// Addresses one sequence revision, optionally through an episode.
#[derive(Debug, Clone)]
pub struct RevisionLocator {
    pub show_id: i64,
    pub sequence_id: i64,
    pub episode_id: Option<i64>,
    pub revision_id: i64,
}

impl RevisionLocator {
    pub fn new(show_id: i64, sequence_id: i64, revision_id: i64) -> Self {
        Self {
            show_id,
            sequence_id,
            episode_id: None,
            revision_id,
        }
    }

    /// Addresses the revision through an episode.
    pub fn with_episode(mut self, episode_id: i64) -> Self {
        self.episode_id = Some(episode_id);
        self
    }

    pub(crate) fn path(&self) -> String {
        match self.episode_id {
            Some(episode_id) => format!(
                "/show/{}/episode/{}/sequence/{}/revision/{}",
                self.show_id, episode_id, self.sequence_id, self.revision_id
            ),
            None => format!(
                "/show/{}/sequence/{}/revision/{}",
                self.show_id, self.sequence_id, self.revision_id
            ),
        }
    }

    pub(crate) fn panels_path(&self) -> String {
        format!("{}/panels", self.path())
    }

    pub(crate) fn dialogues_path(&self) -> String {
        format!("{}/dialogues", self.path())
    }
}

/// Addresses one panel, optionally through an episode.
#[derive(Debug, Clone)]
pub struct PanelLocator {
    pub show_id: i64,
    pub sequence_id: i64,
    pub episode_id: Option<i64>,
    pub panel_id: i64,
}

impl PanelLocator {
    pub fn new(show_id: i64, sequence_id: i64, panel_id: i64) -> Self {
        Self {
            show_id,
            sequence_id,
            episode_id: None,
            panel_id,
        }
    }

    pub fn with_episode(mut self, episode_id: i64) -> Self {
        self.episode_id = Some(episode_id);
        self
    }

    pub(crate) fn dialogues_path(&self) -> String {
        match self.episode_id {
            Some(episode_id) => format!(
                "/show/{}/episode/{}/sequence/{}/panel/{}/dialogues",
                self.show_id, episode_id, self.sequence_id, self.panel_id
            ),
            None => format!(
                "/show/{}/sequence/{}/panel/{}/dialogues",
                self.show_id, self.sequence_id, self.panel_id
            ),
        }
    }
}

/// A panel reference as a new revision expects it.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionedPanel {
    pub dialogue: Option<Dialogue>,
    pub duration: Option<i64>,
    pub id: i64,
    pub revision_number: i64,
}

impl RevisionedPanel {
    /// Formats fetched panels as revisioned-panel references, attaching
    /// the same dialogue to every panel.
    pub fn from_panels(panels: &[Panel], dialogue: Option<&Dialogue>) -> Vec<RevisionedPanel> {
        panels
            .iter()
            .map(|panel| RevisionedPanel {
                dialogue: dialogue.cloned(),
                duration: panel.duration,
                id: panel.panel_id,
                revision_number: panel.revision_number,
            })
            .collect()
    }
}

/// Body of a create-revision POST.
#[derive(Debug, Clone, Serialize)]
pub struct NewSequenceRevision {
    pub comment: String,
    pub imported: bool,
    pub meta_data: RevisionMeta,
    pub revisioned_panels: Vec<RevisionedPanel>,
}

impl NewSequenceRevision {
    /// Builds a creation payload from a fetched revision, carrying over
    /// its annotation/audio-timing/highlight/marker metadata and zeroing
    /// the movie and audio asset references.
    pub fn from_revision(
        revision: &SequenceRevision,
        revisioned_panels: Vec<RevisionedPanel>,
        comment: impl Into<String>,
    ) -> Self {
        let meta = revision.meta_data.clone().unwrap_or_default();
        Self {
            comment: comment.into(),
            imported: false,
            meta_data: RevisionMeta {
                movie_asset_id: 0,
                audio_asset_id: 0,
                annotations: meta.annotations,
                audio_timings: meta.audio_timings,
                highlights: meta.highlights,
                markers: meta.markers,
            },
            revisioned_panels,
        }
    }
}
