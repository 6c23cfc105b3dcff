use anyhow::{Result, Context as AnyhowContext, bail};
use std::fs;
use crate::model::Topology;

/// Reads a topology document and checks that every existing relationship points at a
/// node template and capability of the same topology.
pub fn load_topology_from_yaml(file_path: &str) -> Result<Topology> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read topology file {}", file_path))?;

    let topology: Topology = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Invalid topology document in {}", file_path))?;

    check_relationships(&topology)
        .with_context(|| format!("Topology {} loaded from {} is inconsistent", topology.id, file_path))?;

    Ok(topology)
}

fn check_relationships(topology: &Topology) -> Result<()> {
    for (source, template) in &topology.node_templates {
        for (name, relationship) in &template.relationships {
            let Some(target) = topology.node_template(&relationship.target) else {
                bail!("Relationship {}.{} targets unknown node template {}", source, name, relationship.target);
            };
            if let Some(capability) = &relationship.targeted_capability_name {
                if !target.capabilities.contains_key(capability) {
                    bail!("Relationship {}.{} targets unknown capability {}.{}", source, name, relationship.target, capability);
                }
            }
        }
    }
    Ok(())
}
