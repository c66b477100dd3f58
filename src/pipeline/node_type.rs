//! Element kind enumeration.
//!
//! The closed set of element kinds a stream graph is made of. Collaborators
//! that render or generate metadata for a pipeline branch on this tag rather
//! than on concrete types.

use serde::{Deserialize, Serialize};

/// Kinds of pipeline elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Originates frames.
    Source,
    /// Mutates or replaces a frame.
    Transformer,
    /// Filters frames with a fatal, drop or divert policy.
    Gate,
    /// Terminally consumes frames.
    Sink,
    /// Source that combines several named streams.
    Barrier,
    /// Passthrough that mirrors frames into a derived stream.
    Split,
}

impl ElementKind {
    /// Get the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            ElementKind::Source => "Source",
            ElementKind::Transformer => "Transformer",
            ElementKind::Gate => "Gate",
            ElementKind::Sink => "Sink",
            ElementKind::Barrier => "Barrier",
            ElementKind::Split => "Split",
        }
    }

    /// Get all element kinds.
    pub fn all() -> &'static [ElementKind] {
        &[
            ElementKind::Source,
            ElementKind::Transformer,
            ElementKind::Gate,
            ElementKind::Sink,
            ElementKind::Barrier,
            ElementKind::Split,
        ]
    }

    /// Kinds that can sit at the head of a stream.
    pub fn is_pullable(&self) -> bool {
        matches!(self, ElementKind::Source | ElementKind::Barrier)
    }

    /// Kinds that can sit between a stream's source and its sink.
    pub fn is_stage(&self) -> bool {
        matches!(
            self,
            ElementKind::Transformer | ElementKind::Gate | ElementKind::Split
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            ElementKind::Source => {
                "Produces frames.\n\
                 Batch sources materialize a collection on first pull.\n\
                 On-demand sources produce one frame per pull until closed."
            }
            ElementKind::Transformer => {
                "Transforms each frame.\n\
                 May return no frame to end the current tick."
            }
            ElementKind::Gate => {
                "Checks a predicate on each frame.\n\
                 Fatal gates abort the stream, others drop\n\
                 or divert frames that fail."
            }
            ElementKind::Sink => "Consumes frames at the end of a stream.",
            ElementKind::Barrier => {
                "Pulls one frame from each named stream and\n\
                 releases combined frames when its window opens."
            }
            ElementKind::Split => {
                "Mirrors every frame into a derived stream\n\
                 that is drained independently."
            }
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
