pub mod builder;
pub mod loader;

use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};

pub type NodeTemplateId = String;

/// 拓扑模型 (Topology)
/// 节点模板以 id 为键，键唯一，顺序无语义
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node_templates: BTreeMap<NodeTemplateId, NodeTemplate>,
    #[serde(default)]
    pub node_types: BTreeMap<String, NodeType>,
    #[serde(default)]
    pub relationship_types: BTreeMap<String, RelationshipType>,
    #[serde(default)]
    pub capability_types: BTreeMap<String, CapabilityType>,
    #[serde(default)]
    pub dependencies: Vec<CsarDependency>,
}

impl Topology {
    pub fn node_template(&self, id: &str) -> Option<&NodeTemplate> {
        self.node_templates.get(id)
    }

    /// Declared type of the capability `capability_id` on node template `template_id`.
    pub fn capability_type(&self, template_id: &str, capability_id: &str) -> Option<&str> {
        self.node_templates
            .get(template_id)
            .and_then(|t| t.capabilities.get(capability_id))
            .map(|c| c.capability_type.as_str())
    }

    pub fn incoming_relationship_count(&self, template_id: &str, capability_id: &str) -> usize {
        incoming_relationship_count(&self.node_templates, template_id, capability_id)
    }
}

/// True if `candidate` is `expected` or one of its descendants.
/// Ancestors are followed through `capability_types`, so each type may list only its direct parent.
pub fn capability_type_matches(capability_types: &BTreeMap<String, CapabilityType>, candidate: &str, expected: &str) -> bool {
    let mut pending = vec![candidate];
    let mut visited = HashSet::new();

    while let Some(current) = pending.pop() {
        if current == expected {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(ct) = capability_types.get(current) {
            pending.extend(ct.derived_from.iter().map(|parent| parent.as_str()));
        }
    }
    false
}

/// Relationships across `node_templates` targeting `template_id`'s `capability_id`.
pub fn incoming_relationship_count(node_templates: &BTreeMap<NodeTemplateId, NodeTemplate>, template_id: &str, capability_id: &str) -> usize {
    node_templates
        .values()
        .flat_map(|t| t.relationships.values())
        .filter(|r| r.target == template_id && r.targeted_capability_name.as_deref() == Some(capability_id))
        .count()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTemplate {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub capabilities: BTreeMap<String, Capability>,
    #[serde(default)]
    pub requirements: BTreeMap<String, Requirement>,
    #[serde(default)]
    pub relationships: BTreeMap<String, RelationshipTemplate>,
}

impl NodeTemplate {
    /// Relationships of this template fulfilling `requirement_name`.
    pub fn relationships_for(&self, requirement_name: &str) -> usize {
        self.relationships
            .values()
            .filter(|r| r.requirement_name == requirement_name)
            .count()
    }
}

/// A typed feature exposed by a node template that a relationship can target.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    #[serde(rename = "type")]
    pub capability_type: String,
    /// Maximum number of incoming relationships, unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<usize>,
}

/// A typed need of a node template, paired with a target's capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Capability type a target must expose
    #[serde(rename = "type")]
    pub capability_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipTemplate {
    #[serde(rename = "type")]
    pub relationship_type: String,
    pub target: NodeTemplateId,
    pub requirement_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeted_capability_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    pub element_id: String,
    #[serde(default)]
    pub derived_from: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
}

/// Dot-scoped identifier classifying a connection, e.g. `tosca.relationships.HostedOn`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipType {
    pub element_id: String,
    /// Capability types this relationship may target
    #[serde(default)]
    pub valid_targets: Vec<String>,
    #[serde(default)]
    pub derived_from: Vec<String>,
}

impl RelationshipType {
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityType {
    pub element_id: String,
    /// Parent types. Listing the direct parent is enough: ancestors are followed transitively.
    #[serde(default)]
    pub derived_from: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CsarDependency {
    pub name: String,
    pub version: String,
}
