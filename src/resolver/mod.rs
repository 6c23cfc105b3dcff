use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use anyhow::Result;
use crate::model::{
    Topology, NodeTemplate, NodeType, Requirement, RelationshipType, CapabilityType, CsarDependency,
};

pub mod topology;
pub mod http;

// --- Interfaces ---

/// 目标解析服务接口
/// 根据源节点与需求计算合法的关系目标
#[async_trait]
pub trait TargetResolutionService: Send + Sync {
    async fn get_targets(&self, query: &TargetQuery) -> Result<ResolvedTargets>;
}

/// Everything the resolver needs to compute relationship targets for one requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetQuery {
    pub source_element_name: String,
    pub requirement: Requirement,
    pub requirement_name: String,
    pub node_templates: BTreeMap<String, NodeTemplate>,
    pub node_types: BTreeMap<String, NodeType>,
    pub relationship_types: BTreeMap<String, RelationshipType>,
    pub capability_types: BTreeMap<String, CapabilityType>,
    pub dependencies: Vec<CsarDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preselected_target_name: Option<String>,
}

impl TargetQuery {
    pub fn new(scope: &RelationshipScope, topology: &Topology) -> Self {
        Self {
            source_element_name: scope.source_element_name.clone(),
            requirement: scope.requirement.clone(),
            requirement_name: scope.requirement_name.clone(),
            node_templates: topology.node_templates.clone(),
            node_types: topology.node_types.clone(),
            relationship_types: topology.relationship_types.clone(),
            capability_types: topology.capability_types.clone(),
            dependencies: topology.dependencies.clone(),
            preselected_target_name: scope.target_node_template_name.clone(),
        }
    }
}

/// Source side of the relationship being created.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipScope {
    pub source_element_name: String,
    pub requirement_name: String,
    pub requirement: Requirement,
    /// Preselection hint for the target node template
    pub target_node_template_name: Option<String>,
}

impl RelationshipScope {
    /// Scope for requirement `requirement_name` declared on node template `source`.
    pub fn for_requirement(topology: &Topology, source: &str, requirement_name: &str) -> Result<Self> {
        let template = topology.node_template(source)
            .ok_or_else(|| anyhow::anyhow!("Node template not found: {}", source))?;
        let requirement = template.requirements.get(requirement_name)
            .ok_or_else(|| anyhow::anyhow!("Requirement {} not found on {}", requirement_name, source))?;

        Ok(Self {
            source_element_name: source.to_string(),
            requirement_name: requirement_name.to_string(),
            requirement: requirement.clone(),
            target_node_template_name: None,
        })
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target_node_template_name = target;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTargets {
    #[serde(default)]
    pub targets: Vec<TargetMatch>,
    #[serde(default)]
    pub relationship_type: Option<RelationshipType>,
    #[serde(default, alias = "preferedMatch")]
    pub preferred_match: Option<TargetMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetMatch {
    pub template: TargetTemplate,
    pub capabilities: Vec<MatchedCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetTemplate {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedCapability {
    pub id: String,
    #[serde(rename = "type")]
    pub capability_type: String,
}
