//! Read-only snapshots of a stream graph.
//!
//! Diagram and metadata generators work from these snapshots instead of the
//! live elements. A snapshot never contains frames.
//!
//! ```text
//! StreamTopology
//! ├── source: NodeSnapshot ── upstream: [BranchSnapshot] (barriers only)
//! ├── stages: [NodeSnapshot] ── derived_stream: ElementId (splits, diverting gates)
//! └── sink:   NodeSnapshot
//! ```

use crate::pipeline::args::{ArgDescriptor, ElementConfig};
use crate::pipeline::id::ElementId;
use crate::pipeline::node_type::ElementKind;
use serde::Serialize;

/// Snapshot of a single element.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: Option<String>,
    pub args: Vec<ArgDescriptor>,
    /// Stream fed by this element (split taps and diverting gates). The
    /// derived stream is snapshotted separately; its `StreamTopology::id`
    /// equals this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived_stream: Option<ElementId>,
    /// Streams this element pulls from (barriers).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upstream: Vec<BranchSnapshot>,
}

impl NodeSnapshot {
    pub fn new(id: ElementId, kind: ElementKind, config: &ElementConfig) -> Self {
        Self {
            id,
            kind,
            name: config.name().map(str::to_string),
            args: config.describe(),
            derived_stream: None,
            upstream: Vec::new(),
        }
    }

    /// Snapshot of an element without a user configuration.
    pub fn bare(id: ElementId, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: Some(name.into()),
            args: Vec::new(),
            derived_stream: None,
            upstream: Vec::new(),
        }
    }

    pub fn with_derived_stream(mut self, stream: ElementId) -> Self {
        self.derived_stream = Some(stream);
        self
    }

    pub fn with_upstream(mut self, upstream: Vec<BranchSnapshot>) -> Self {
        self.upstream = upstream;
        self
    }
}

/// A named upstream stream of a barrier.
#[derive(Debug, Clone, Serialize)]
pub struct BranchSnapshot {
    pub name: String,
    pub stream: StreamTopology,
}

/// Snapshot of a whole stream, recursing into barrier inputs.
#[derive(Debug, Clone, Serialize)]
pub struct StreamTopology {
    pub id: ElementId,
    pub name: Option<String>,
    pub source: NodeSnapshot,
    pub stages: Vec<NodeSnapshot>,
    pub sink: Option<NodeSnapshot>,
}

impl StreamTopology {
    /// Visit every node, including nodes of upstream streams, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a NodeSnapshot)) {
        for branch in &self.source.upstream {
            branch.stream.walk(visit);
        }
        visit(&self.source);
        for stage in &self.stages {
            visit(stage);
        }
        if let Some(sink) = &self.sink {
            visit(sink);
        }
    }

    /// Number of nodes of the given kind in the whole graph.
    pub fn count(&self, kind: ElementKind) -> usize {
        let mut n = 0;
        self.walk(&mut |node| {
            if node.kind == kind {
                n += 1;
            }
        });
        n
    }

    /// Find a node by id anywhere in the graph.
    pub fn find(&self, id: ElementId) -> Option<&NodeSnapshot> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.id == id {
                found = Some(node);
            }
        });
        found
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
