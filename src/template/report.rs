//! What a rendering pass did to each placeholder.

use serde::Serialize;

/// Result of resolving one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Text token replaced inside its own run
    Substituted,
    /// Text token replaced after its paragraph was collapsed into one run
    Collapsed,
    ListExpanded { items: usize },
    PictureInserted,
    TableInserted,
    /// A marker was written instead of the data
    Marker { text: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// 1-based slide number
    pub slide: usize,
    /// Name of the shape that held the placeholder
    pub shape: String,
    pub placeholder: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Summary of a rendering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub slides: usize,
    pub shapes_removed: usize,
    pub entries: Vec<ReportEntry>,
}

impl RenderReport {
    pub(crate) fn push(&mut self, slide: usize, shape: &str, placeholder: &str, outcome: Outcome) {
        self.entries.push(ReportEntry {
            slide,
            shape: shape.to_string(),
            placeholder: placeholder.to_string(),
            outcome,
        });
    }

    /// Entries where a marker replaced the data.
    pub fn markers(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Marker { .. }))
    }

    /// Whether every placeholder was resolved from data.
    pub fn is_clean(&self) -> bool {
        self.markers().next().is_none()
    }
}
