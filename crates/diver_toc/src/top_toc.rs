use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::TocError;

/// XML namespace for the repository-wide top-ToC document (spec.md §6).
pub const TOP_TOC_XML_NAMESPACE: &str = "urn:com:helger:diver:repotoptoc:v1.0";

#[derive(Debug, Clone, Default)]
struct GroupNode {
    children: BTreeMap<String, GroupNode>,
    artifacts: BTreeSet<String>,
}

impl GroupNode {
    fn child_mut(&mut self, segment: &str) -> &mut GroupNode {
        self.children.entry(segment.to_string()).or_default()
    }

    fn find(&self, segments: &[&str]) -> Option<&GroupNode> {
        let mut node = self;
        for segment in segments {
            node = node.children.get(*segment)?;
        }
        Some(node)
    }
}

/// The repository-wide tree of known `(group, subgroup*, artifact)` paths,
/// maintained so a client can browse groups without scanning every backend
/// (spec.md §4.G).
#[derive(Debug, Clone, Default)]
pub struct TopToc {
    root: GroupNode,
}

fn segments(group_id: &str) -> Vec<&str> {
    group_id.split('.').filter(|s| !s.is_empty()).collect()
}

impl TopToc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `artifact_id` under `group_id`, creating any missing
    /// group/subgroup nodes along the way.
    pub fn register_group_and_artifact(&mut self, group_id: &str, artifact_id: &str) {
        let mut node = &mut self.root;
        for segment in segments(group_id) {
            node = node.child_mut(segment);
        }
        node.artifacts.insert(artifact_id.to_string());
    }

    pub fn contains_group_and_artifact(&self, group_id: &str, artifact_id: &str) -> bool {
        self.root
            .find(&segments(group_id))
            .map(|node| node.artifacts.contains(artifact_id))
            .unwrap_or(false)
    }

    /// Removes `artifact_id` from `group_id`. The (possibly now-empty) group
    /// node is left in place; spec.md does not require pruning it.
    pub fn remove_artifact(&mut self, group_id: &str, artifact_id: &str) {
        let segments = segments(group_id);
        let mut node = &mut self.root;
        for segment in &segments {
            match node.children.get_mut(*segment) {
                Some(child) => node = child,
                None => return,
            }
        }
        node.artifacts.remove(artifact_id);
    }

    pub fn iterate_all_top_level_group_names(&self) -> Vec<String> {
        self.root.children.keys().cloned().collect()
    }

    /// Direct (or, if `recursive`, all transitive) subgroup names beneath
    /// `group_id`.
    pub fn iterate_all_subgroups(&self, group_id: &str, recursive: bool) -> Vec<String> {
        let Some(node) = self.root.find(&segments(group_id)) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        collect_subgroups(node, recursive, &mut out);
        out
    }

    pub fn iterate_all_artifacts(&self, group_id: &str) -> Vec<String> {
        self.root
            .find(&segments(group_id))
            .map(|node| node.artifacts.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && self.root.artifacts.is_empty()
    }
}

fn collect_subgroups(node: &GroupNode, recursive: bool, out: &mut Vec<String>) {
    for (name, child) in &node.children {
        out.push(name.clone());
        if recursive {
            collect_subgroups(child, true, out);
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GroupElement {
    name: String,
    #[serde(rename = "group", default)]
    groups: Vec<GroupElement>,
    #[serde(rename = "artifact", default)]
    artifacts: Vec<ArtifactElement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactElement {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "repotoptoc")]
struct TopTocDocument {
    xmlns: String,
    #[serde(rename = "group", default)]
    groups: Vec<GroupElement>,
}

fn node_to_element(name: &str, node: &GroupNode) -> GroupElement {
    GroupElement {
        name: name.to_string(),
        groups: node
            .children
            .iter()
            .map(|(n, c)| node_to_element(n, c))
            .collect(),
        artifacts: node
            .artifacts
            .iter()
            .map(|a| ArtifactElement { name: a.clone() })
            .collect(),
    }
}

fn element_to_node(element: GroupElement) -> (String, GroupNode) {
    let mut node = GroupNode::default();
    for group in element.groups {
        let (name, child) = element_to_node(group);
        node.children.insert(name, child);
    }
    for artifact in element.artifacts {
        node.artifacts.insert(artifact.name);
    }
    (element.name, node)
}

impl TopToc {
    pub fn to_xml(&self) -> Result<String, TocError> {
        let doc = TopTocDocument {
            xmlns: TOP_TOC_XML_NAMESPACE.to_string(),
            groups: self
                .root
                .children
                .iter()
                .map(|(n, c)| node_to_element(n, c))
                .collect(),
        };
        serde_xml_rs::to_string(&doc).map_err(|err| TocError::Malformed {
            key: "toptoc".to_string(),
            message: err.to_string(),
        })
    }

    pub fn from_xml(xml: &str) -> Result<Self, TocError> {
        let doc: TopTocDocument = serde_xml_rs::from_str(xml).map_err(|err| TocError::Malformed {
            key: "toptoc".to_string(),
            message: err.to_string(),
        })?;
        let mut root = GroupNode::default();
        for group in doc.groups {
            let (name, node) = element_to_node(group);
            root.children.insert(name, node);
        }
        Ok(TopToc { root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_contains() {
        let mut toc = TopToc::new();
        toc.register_group_and_artifact("com.ecosio", "test-artefact");
        assert!(toc.contains_group_and_artifact("com.ecosio", "test-artefact"));
        assert!(!toc.contains_group_and_artifact("com.ecosio", "other"));
        assert!(!toc.contains_group_and_artifact("com.other", "test-artefact"));
    }

    #[test]
    fn top_level_and_subgroup_iteration() {
        let mut toc = TopToc::new();
        toc.register_group_and_artifact("com.ecosio.tools", "a");
        toc.register_group_and_artifact("com.ecosio", "b");
        toc.register_group_and_artifact("org.example", "c");

        assert_eq!(toc.iterate_all_top_level_group_names(), vec!["com", "org"]);
        assert_eq!(toc.iterate_all_subgroups("com", false), vec!["ecosio"]);
        assert_eq!(
            toc.iterate_all_subgroups("com", true),
            vec!["ecosio", "tools"]
        );
        assert_eq!(toc.iterate_all_artifacts("com.ecosio"), vec!["b"]);
    }

    #[test]
    fn remove_artifact_leaves_empty_group_in_place() {
        let mut toc = TopToc::new();
        toc.register_group_and_artifact("com.ecosio", "a");
        toc.remove_artifact("com.ecosio", "a");
        assert!(!toc.contains_group_and_artifact("com.ecosio", "a"));
        assert!(toc.iterate_all_subgroups("com", false).contains(&"ecosio".to_string()));
    }

    #[test]
    fn xml_round_trips() {
        let mut toc = TopToc::new();
        toc.register_group_and_artifact("com.ecosio.tools", "a");
        toc.register_group_and_artifact("com.ecosio", "b");
        let xml = toc.to_xml().unwrap();
        assert!(xml.contains(TOP_TOC_XML_NAMESPACE));
        let parsed = TopToc::from_xml(&xml).unwrap();
        assert!(parsed.contains_group_and_artifact("com.ecosio.tools", "a"));
        assert!(parsed.contains_group_and_artifact("com.ecosio", "b"));
    }
}
