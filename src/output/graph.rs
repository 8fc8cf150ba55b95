//! Internal link graph
//!
//! Nodes are normalized page keys; a directed edge `a -> b` means page `a`
//! links to page `b` on the same site. The graph renders as Graphviz DOT.

use crate::crawler::VisitedSet;
use crate::output::OutputResult;
use crate::url::normalize_url;
use std::collections::BTreeSet;
use std::path::Path;

/// Directed graph of internal links between crawled pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    nodes: BTreeSet<String>,
    edges: BTreeSet<(String, String)>,
}

impl LinkGraph {
    /// Builds the graph from every recorded page and its internal links
    ///
    /// Link targets that were never crawled still appear as nodes. Repeated
    /// links between the same two pages collapse into one edge.
    pub fn from_visited(visited: &VisitedSet) -> Self {
        let mut graph = Self::default();

        for (key, page) in visited.records() {
            let source = key.to_string();
            graph.nodes.insert(source.clone());

            for link in &page.internal_links {
                match normalize_url(link) {
                    Ok(target) => {
                        let target = target.to_string();
                        graph.nodes.insert(target.clone());
                        graph.edges.insert((source.clone(), target));
                    }
                    Err(e) => tracing::debug!("Skipping graph edge to {}: {}", link, e),
                }
            }
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    /// Renders the graph as Graphviz DOT text
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph site {\n");
        dot.push_str("    node [shape=box, style=filled, fillcolor=\"#4C72B0\", fontcolor=white, fontsize=7];\n");
        dot.push_str("    edge [color=\"#555555\", arrowsize=0.7];\n");

        for node in &self.nodes {
            dot.push_str(&format!("    \"{}\";\n", escape(node)));
        }
        for (from, to) in &self.edges {
            dot.push_str(&format!("    \"{}\" -> \"{}\";\n", escape(from), escape(to)));
        }

        dot.push_str("}\n");
        dot
    }

    /// Writes the DOT rendering to `path`
    pub fn write_dot(&self, path: &Path) -> OutputResult<()> {
        std::fs::write(path, self.to_dot())?;
        Ok(())
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
