use async_trait::async_trait;
use anyhow::Result;
use tracing::debug;
use crate::model::{capability_type_matches, incoming_relationship_count, RelationshipType};
use crate::resolver::{
    TargetResolutionService, TargetQuery, ResolvedTargets, TargetMatch, TargetTemplate, MatchedCapability,
};

/// In-process resolver computing targets straight from the query's topology snapshot.
#[derive(Debug, Default)]
pub struct TopologyTargetResolver;

impl TopologyTargetResolver {
    pub fn new() -> Self {
        Self
    }

    fn requirement_saturated(query: &TargetQuery) -> bool {
        let Some(upper_bound) = query.requirement.upper_bound else {
            return false;
        };
        query.node_templates
            .get(&query.source_element_name)
            .map(|source| source.relationships_for(&query.requirement_name) >= upper_bound)
            .unwrap_or(false)
    }

    fn matching_targets(query: &TargetQuery) -> Vec<TargetMatch> {
        let expected = &query.requirement.capability_type;
        let mut targets = Vec::new();

        for (name, template) in &query.node_templates {
            if *name == query.source_element_name {
                continue;
            }

            let capabilities: Vec<MatchedCapability> = template.capabilities.iter()
                .filter(|(_, cap)| capability_type_matches(&query.capability_types, &cap.capability_type, expected))
                .filter(|(id, cap)| match cap.upper_bound {
                    Some(bound) => incoming_relationship_count(&query.node_templates, name, id) < bound,
                    None => true,
                })
                .map(|(id, cap)| MatchedCapability {
                    id: id.clone(),
                    capability_type: cap.capability_type.clone(),
                })
                .collect();

            if !capabilities.is_empty() {
                targets.push(TargetMatch {
                    template: TargetTemplate { name: name.clone() },
                    capabilities,
                });
            }
        }

        targets
    }

    fn default_relationship_type(query: &TargetQuery) -> Option<RelationshipType> {
        let id = query.requirement.relationship_type.as_ref()?;
        Some(query.relationship_types.get(id).cloned().unwrap_or_else(|| RelationshipType::new(id.clone())))
    }
}

#[async_trait]
impl TargetResolutionService for TopologyTargetResolver {
    async fn get_targets(&self, query: &TargetQuery) -> Result<ResolvedTargets> {
        let relationship_type = Self::default_relationship_type(query);

        if Self::requirement_saturated(query) {
            debug!(source = %query.source_element_name, requirement = %query.requirement_name, "Requirement upper bound reached");
            return Ok(ResolvedTargets {
                targets: Vec::new(),
                relationship_type,
                preferred_match: None,
            });
        }

        let targets = Self::matching_targets(query);
        let preferred_match = query.preselected_target_name.as_ref()
            .and_then(|wanted| targets.iter().find(|t| &t.template.name == wanted))
            .cloned();

        debug!(
            source = %query.source_element_name,
            requirement = %query.requirement_name,
            targets = targets.len(),
            dependencies = query.dependencies.len(),
            "Resolved relationship targets"
        );

        Ok(ResolvedTargets {
            targets,
            relationship_type,
            preferred_match,
        })
    }
}
