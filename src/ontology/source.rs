use std::path::PathBuf;
use crate::core::error::Result;
use crate::ontology::node::OntologyNode;

/// Backing resource of an already-parsed term graph.
pub trait OntologySource: Send + Sync {
    fn load(&self) -> Result<Vec<OntologyNode>>;
}

/// Nodes handed over in memory by whatever loaded the ontology.
#[derive(Debug, Clone, Default)]
pub struct StaticOntologySource {
    nodes: Vec<OntologyNode>,
}

impl StaticOntologySource {
    pub fn new(nodes: Vec<OntologyNode>) -> Self {
        StaticOntologySource { nodes }
    }
}

impl OntologySource for StaticOntologySource {
    fn load(&self) -> Result<Vec<OntologyNode>> {
        Ok(self.nodes.clone())
    }
}

/// JSON array of nodes written by an external ontology loader.
#[derive(Debug, Clone)]
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSnapshotSource { path: path.into() }
    }
}

impl OntologySource for JsonSnapshotSource {
    fn load(&self) -> Result<Vec<OntologyNode>> {
        let file = std::fs::File::open(&self.path)?;
        let nodes = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(nodes)
    }
}
