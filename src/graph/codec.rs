use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vector::Vec2;

use super::model::{Graph, GraphFlags, NodeId};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed graph document: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("invalid graph document: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Encode(#[from] CodecError),
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphDocument {
    #[serde(flatten)]
    flags: GraphFlags,
    #[serde(default)]
    root: Option<u64>,
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
    position: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    source: u64,
    target: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

pub fn to_text(graph: &Graph) -> Result<String, CodecError> {
    let document = GraphDocument {
        flags: graph.flags(),
        root: graph.root().map(NodeId::get),
        nodes: graph
            .nodes()
            .map(|node| NodeRecord {
                id: node.id().get(),
                label: node.label().to_owned(),
                position: node.position().to_array().to_vec(),
            })
            .collect(),
        edges: graph
            .edges()
            .iter()
            .map(|edge| EdgeRecord {
                source: edge.source().get(),
                target: edge.target().get(),
                weight: edge.weight(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn from_text(text: &str) -> Result<Graph, CodecError> {
    let document: GraphDocument = serde_json::from_str(text)?;
    let mut graph = Graph::with_flags(document.flags);
    let mut ids = HashMap::with_capacity(document.nodes.len());

    for record in document.nodes {
        let position = Vec2::from_slice(&record.position)
            .map_err(|error| CodecError::Invalid(format!("node {}: {error}", record.id)))?;
        if !position.is_finite() {
            return Err(CodecError::Invalid(format!(
                "node {} has a non-finite position",
                record.id
            )));
        }
        graph
            .restore_node(record.id, position, record.label)
            .map_err(|error| CodecError::Invalid(format!("node {}: {error}", record.id)))?;
    }

    for node in graph.nodes() {
        ids.insert(node.id().get(), node.id());
    }
    let lookup = |raw: u64| {
        ids.get(&raw)
            .copied()
            .ok_or_else(|| CodecError::Invalid(format!("edge references unknown node {raw}")))
    };

    for record in document.edges {
        let source = lookup(record.source)?;
        let target = lookup(record.target)?;
        graph
            .add_edge(source, target, record.weight)
            .map_err(|error| CodecError::Invalid(error.to_string()))?;
    }

    if let Some(raw) = document.root {
        let root = ids
            .get(&raw)
            .copied()
            .ok_or_else(|| CodecError::Invalid(format!("root references unknown node {raw}")))?;
        graph
            .set_root(Some(root))
            .map_err(|error| CodecError::Invalid(error.to_string()))?;
    }

    Ok(graph)
}

pub fn import_from_path(path: &Path) -> Result<Graph, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_text(&text)?)
}

/// Writes the graph to `path`. A file left half-written by a failed write is
/// removed before the error is returned.
pub fn export_to_path(graph: &Graph, path: &Path) -> Result<(), ExportError> {
    let text = to_text(graph)?;
    let write_error = |source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::create(path).map_err(write_error)?;
    let written = file
        .write_all(text.as_bytes())
        .and_then(|()| file.sync_all());

    if let Err(source) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %cleanup, "failed to remove partial export");
        }
        return Err(write_error(source));
    }

    Ok(())
}
