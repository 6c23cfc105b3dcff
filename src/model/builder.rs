use crate::model::{
    Topology, NodeTemplate, NodeType, Capability, CapabilityType, Requirement,
    RelationshipTemplate, RelationshipType, CsarDependency,
};

pub struct TopologyBuilder {
    topology: Topology,
}

impl TopologyBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            topology: Topology {
                id: id.to_string(),
                name: id.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.topology.name = name.to_string();
        self
    }

    pub fn dependency(mut self, name: &str, version: &str) -> Self {
        self.topology.dependencies.push(CsarDependency {
            name: name.to_string(),
            version: version.to_string(),
        });
        self
    }

    pub fn node_type(mut self, element_id: &str) -> Self {
        self.topology.node_types.insert(element_id.to_string(), NodeType {
            element_id: element_id.to_string(),
            ..Default::default()
        });
        self
    }

    pub fn capability_type(mut self, element_id: &str, derived_from: &[&str]) -> Self {
        self.topology.capability_types.insert(element_id.to_string(), CapabilityType {
            element_id: element_id.to_string(),
            derived_from: derived_from.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn relationship_type(mut self, element_id: &str, valid_targets: &[&str]) -> Self {
        self.topology.relationship_types.insert(element_id.to_string(), RelationshipType {
            element_id: element_id.to_string(),
            valid_targets: valid_targets.iter().map(|s| s.to_string()).collect(),
            derived_from: Vec::new(),
        });
        self
    }

    pub fn node(self, id: &str, node_type: &str) -> NodeTemplateBuilder {
        NodeTemplateBuilder {
            topology_builder: self,
            id: id.to_string(),
            template: NodeTemplate {
                node_type: node_type.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn build(self) -> Topology {
        self.topology
    }
}

pub struct NodeTemplateBuilder {
    topology_builder: TopologyBuilder,
    id: String,
    template: NodeTemplate,
}

impl NodeTemplateBuilder {
    pub fn capability(mut self, id: &str, capability_type: &str) -> Self {
        self.template.capabilities.insert(id.to_string(), Capability {
            capability_type: capability_type.to_string(),
            upper_bound: None,
        });
        self
    }

    pub fn bounded_capability(mut self, id: &str, capability_type: &str, upper_bound: usize) -> Self {
        self.template.capabilities.insert(id.to_string(), Capability {
            capability_type: capability_type.to_string(),
            upper_bound: Some(upper_bound),
        });
        self
    }

    pub fn requirement(mut self, name: &str, capability_type: &str, relationship_type: Option<&str>) -> Self {
        self.template.requirements.insert(name.to_string(), Requirement {
            capability_type: capability_type.to_string(),
            relationship_type: relationship_type.map(|s| s.to_string()),
            upper_bound: None,
        });
        self
    }

    /// Existing relationship `name` from this node to `target`.
    pub fn relationship(mut self, name: &str, relationship_type: &str, target: &str, requirement_name: &str, capability: &str) -> Self {
        self.template.relationships.insert(name.to_string(), RelationshipTemplate {
            relationship_type: relationship_type.to_string(),
            target: target.to_string(),
            requirement_name: requirement_name.to_string(),
            targeted_capability_name: Some(capability.to_string()),
        });
        self
    }

    pub fn build(mut self) -> TopologyBuilder {
        self.topology_builder.topology.node_templates.insert(self.id, self.template);
        self.topology_builder
    }
}
