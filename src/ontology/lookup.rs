use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};
use crate::core::types::SetMultimap;
use crate::ontology::node::OntologyNode;
use crate::ontology::source::OntologySource;

/// Immutable `id -> node` snapshot of the term graph.
#[derive(Debug, Default)]
pub struct OntologyGraph {
    nodes: HashMap<String, OntologyNode>,
}

impl OntologyGraph {
    pub fn new(nodes: Vec<OntologyNode>) -> Self {
        OntologyGraph {
            nodes: nodes.into_iter().map(|node| (node.id.clone(), node)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&OntologyNode> {
        self.nodes.get(id)
    }

    /// All transitive parents of `ids`, deduplicated.
    ///
    /// BFS over parent edges with a visited set, so a cyclic source graph
    /// still terminates. Unknown ids contribute nothing. An input id shows
    /// up in the result only when it is an ancestor of some input.
    pub fn get_all_parents<I, S>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for id in ids {
            if let Some(node) = self.nodes.get(id.as_ref()) {
                for parent in &node.parent_ids {
                    if visited.insert(parent.as_str()) {
                        queue.push_back(parent.as_str());
                    }
                }
            }
        }

        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.nodes.get(current) {
                for parent in &node.parent_ids {
                    if visited.insert(parent.as_str()) {
                        queue.push_back(parent.as_str());
                    }
                }
            }
        }

        visited.into_iter().map(str::to_string).collect()
    }

    /// Labels of the ids present in the graph; unlabeled and unknown ids are
    /// dropped.
    pub fn get_labels<I, S>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter()
            .filter_map(|id| self.nodes.get(id.as_ref()))
            .filter_map(|node| node.label.clone())
            .collect()
    }

    /// Per assay: its own term ids plus all their transitive parents.
    pub fn expand_ontology_terms(&self, ids_by_assay: &SetMultimap) -> SetMultimap {
        ids_by_assay
            .iter()
            .map(|(assay, ids)| {
                let mut closed = ids.clone();
                closed.extend(self.get_all_parents(ids));
                (assay.clone(), closed)
            })
            .collect()
    }
}

/// Lazily loads the term graph once and serves closures and labels from it.
///
/// The first caller of [`graph`](Self::graph) loads the source; concurrent
/// first callers wait for that single load and share its result. An
/// unreadable source degrades to an empty graph for the lifetime of this
/// handle. Reloading means building a new `OntologyLookup`.
pub struct OntologyLookup {
    source: Box<dyn OntologySource>,
    graph: OnceLock<Arc<OntologyGraph>>,
    load_attempts: AtomicUsize,
}

impl OntologyLookup {
    pub fn new(source: impl OntologySource + 'static) -> Self {
        OntologyLookup {
            source: Box::new(source),
            graph: OnceLock::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Snapshot handle, loading the graph on first access.
    pub fn graph(&self) -> Arc<OntologyGraph> {
        self.graph.get_or_init(|| self.load()).clone()
    }

    pub fn load_count(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    fn load(&self) -> Arc<OntologyGraph> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        match self.source.load() {
            Ok(nodes) => {
                let graph = OntologyGraph::new(nodes);
                info!(terms = graph.len(), "ontology loaded");
                Arc::new(graph)
            }
            Err(err) => {
                error!(error = %err, "ontology unavailable, continuing without term expansion");
                Arc::new(OntologyGraph::default())
            }
        }
    }

    pub fn get_all_parents<I, S>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.graph().get_all_parents(ids)
    }

    pub fn get_labels<I, S>(&self, ids: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.graph().get_labels(ids)
    }

    pub fn expand_ontology_terms(&self, ids_by_assay: &SetMultimap) -> SetMultimap {
        self.graph().expand_ontology_terms(ids_by_assay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{Error, Result};
    use crate::ontology::source::StaticOntologySource;

    fn chain() -> OntologyGraph {
        OntologyGraph::new(vec![
            OntologyNode::new("A", Some("a")).with_parent("B"),
            OntologyNode::new("B", Some("b")).with_parent("C"),
            OntologyNode::new("C", None),
            OntologyNode::new("D", Some("d")).with_parent("C"),
        ])
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn closure_follows_the_chain() {
        assert_eq!(chain().get_all_parents(["A"]), set(&["B", "C"]));
    }

    #[test]
    fn shared_ancestors_appear_once() {
        assert_eq!(chain().get_all_parents(["A", "D"]), set(&["B", "C"]));
    }

    #[test]
    fn unknown_ids_contribute_nothing() {
        assert!(chain().get_all_parents(["EFO:9999999"]).is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let graph = OntologyGraph::new(vec![
            OntologyNode::new("X", None).with_parent("Y"),
            OntologyNode::new("Y", None).with_parent("X"),
        ]);
        assert_eq!(graph.get_all_parents(["X"]), set(&["X", "Y"]));
    }

    #[test]
    fn unlabeled_terms_have_no_label() {
        assert_eq!(chain().get_labels(["A", "C", "missing"]), set(&["a"]));
    }

    #[test]
    fn expansion_keeps_raw_ids() {
        let by_assay: SetMultimap = [("assay1".to_string(), set(&["A"]))].into_iter().collect();
        let expanded = chain().expand_ontology_terms(&by_assay);
        assert_eq!(expanded["assay1"], set(&["A", "B", "C"]));
    }

    struct Unreadable;

    impl OntologySource for Unreadable {
        fn load(&self) -> Result<Vec<OntologyNode>> {
            Err(Error::io("ontology resource missing"))
        }
    }

    #[test]
    fn unreadable_source_degrades_to_empty_and_loads_once() {
        let lookup = OntologyLookup::new(Unreadable);
        assert!(lookup.get_all_parents(["A"]).is_empty());
        assert!(lookup.get_labels(["A"]).is_empty());
        assert_eq!(lookup.load_count(), 1);
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let source = StaticOntologySource::new(vec![OntologyNode::new("A", Some("a")).with_parent("B")]);
        let lookup = Arc::new(OntologyLookup::new(source));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lookup = lookup.clone();
                std::thread::spawn(move || lookup.get_all_parents(["A"]))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), set(&["B"]));
        }
        assert_eq!(lookup.load_count(), 1);
    }
}
