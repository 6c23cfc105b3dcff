use topology_wizard::model::builder::TopologyBuilder;
use topology_wizard::model::Topology;
use topology_wizard::resolver::{RelationshipScope, ResolvedTargets, TargetQuery, TargetResolutionService};
use topology_wizard::resolver::topology::TopologyTargetResolver;

fn sample_topology() -> Topology {
    TopologyBuilder::new("resolver-test")
        .capability_type("tosca.capabilities.Container", &[])
        .capability_type("alien.capabilities.WebContainer", &["tosca.capabilities.Container"])
        .relationship_type("tosca.relationships.HostedOn", &["tosca.capabilities.Container"])
        .node("server", "tosca.nodes.Compute")
            .capability("host", "tosca.capabilities.Container")
            .build()
        .node("small_vm", "tosca.nodes.Compute")
            .bounded_capability("host", "tosca.capabilities.Container", 1)
            .build()
        .node("tomcat", "alien.nodes.Tomcat")
            .capability("war_host", "alien.capabilities.WebContainer")
            .requirement("host", "tosca.capabilities.Container", Some("tosca.relationships.HostedOn"))
            .build()
        .node("agent", "alien.nodes.Agent")
            .requirement("host", "tosca.capabilities.Container", Some("tosca.relationships.HostedOn"))
            .relationship("hostedOnSmallVm", "tosca.relationships.HostedOn", "small_vm", "host", "host")
            .build()
        .build()
}

async fn resolve(topology: &Topology, source: &str, requirement: &str, target: Option<&str>) -> ResolvedTargets {
    let scope = RelationshipScope::for_requirement(topology, source, requirement)
        .expect("Unknown requirement")
        .with_target(target.map(|t| t.to_string()));
    TopologyTargetResolver::new()
        .get_targets(&TargetQuery::new(&scope, topology))
        .await
        .expect("Resolution failed")
}

fn target_names(resolved: &ResolvedTargets) -> Vec<&str> {
    resolved.targets.iter().map(|t| t.template.name.as_str()).collect()
}

#[tokio::test]
async fn test_targets_match_capability_type_and_descendants() {
    let topology = sample_topology();
    let resolved = resolve(&topology, "agent", "host", None).await;

    // small_vm is full, agent itself is never a target
    assert_eq!(target_names(&resolved), vec!["server", "tomcat"]);

    let tomcat = &resolved.targets[1];
    assert_eq!(tomcat.capabilities.len(), 1);
    assert_eq!(tomcat.capabilities[0].id, "war_host");
    assert_eq!(tomcat.capabilities[0].capability_type, "alien.capabilities.WebContainer");

    let relationship = resolved.relationship_type.expect("Missing default relationship");
    assert_eq!(relationship.element_id, "tosca.relationships.HostedOn");
    assert_eq!(relationship.valid_targets, vec!["tosca.capabilities.Container".to_string()]);
    assert!(resolved.preferred_match.is_none());
}

#[tokio::test]
async fn test_bounded_capability_counts_existing_relationships() {
    let topology = sample_topology();
    let resolved = resolve(&topology, "tomcat", "host", None).await;
    assert_eq!(target_names(&resolved), vec!["server"]);

    assert_eq!(topology.incoming_relationship_count("small_vm", "host"), 1);
}

#[tokio::test]
async fn test_preferred_match_uses_preselected_target() {
    let topology = sample_topology();
    let resolved = resolve(&topology, "tomcat", "host", Some("server")).await;
    let preferred = resolved.preferred_match.expect("Missing preferred match");
    assert_eq!(preferred.template.name, "server");

    // A hint that is not a valid target gives no preference
    let resolved = resolve(&topology, "tomcat", "host", Some("small_vm")).await;
    assert!(resolved.preferred_match.is_none());
}

#[tokio::test]
async fn test_saturated_requirement_has_no_targets() {
    let topology = sample_topology();
    let mut scope = RelationshipScope::for_requirement(&topology, "agent", "host").unwrap();
    scope.requirement.upper_bound = Some(1);

    let resolved = TopologyTargetResolver::new()
        .get_targets(&TargetQuery::new(&scope, &topology))
        .await
        .unwrap();

    assert!(resolved.targets.is_empty());
    assert!(resolved.relationship_type.is_some());
}

#[tokio::test]
async fn test_unknown_relationship_type_falls_back_to_id() {
    let topology = TopologyBuilder::new("fallback")
        .node("db", "tosca.nodes.Database")
            .capability("endpoint", "tosca.capabilities.Endpoint")
            .build()
        .node("app", "alien.nodes.War")
            .requirement("database", "tosca.capabilities.Endpoint", Some("custom.relationships.UsesDb"))
            .build()
        .build();

    let resolved = resolve(&topology, "app", "database", None).await;
    assert_eq!(target_names(&resolved), vec!["db"]);
    let relationship = resolved.relationship_type.unwrap();
    assert_eq!(relationship.element_id, "custom.relationships.UsesDb");
    assert!(relationship.valid_targets.is_empty());
}

#[test]
fn test_scope_requires_known_requirement() {
    let topology = sample_topology();
    assert!(RelationshipScope::for_requirement(&topology, "server", "host").is_err());
    assert!(RelationshipScope::for_requirement(&topology, "missing", "host").is_err());
}

#[test]
fn test_resolved_targets_accepts_legacy_field_name() {
    let json = r#"{
        "targets": [
            { "template": { "name": "server" }, "capabilities": [ { "id": "host", "type": "tosca.capabilities.Container" } ] }
        ],
        "relationshipType": null,
        "preferedMatch": { "template": { "name": "server" }, "capabilities": [ { "id": "host", "type": "tosca.capabilities.Container" } ] }
    }"#;

    let resolved: ResolvedTargets = serde_json::from_str(json).expect("Failed to decode targets");
    assert_eq!(resolved.targets.len(), 1);
    assert!(resolved.relationship_type.is_none());
    assert_eq!(resolved.preferred_match.unwrap().capabilities[0].id, "host");
}

#[tokio::test]
async fn test_capability_inheritance_is_transitive() {
    // Each type only names its direct parent
    let topology = TopologyBuilder::new("inheritance")
        .capability_type("tosca.capabilities.Container", &[])
        .capability_type("alien.capabilities.WebContainer", &["tosca.capabilities.Container"])
        .capability_type("alien.capabilities.ServletContainer", &["alien.capabilities.WebContainer"])
        .node("jetty", "alien.nodes.Jetty")
            .capability("servlets", "alien.capabilities.ServletContainer")
            .build()
        .node("agent", "alien.nodes.Agent")
            .requirement("host", "tosca.capabilities.Container", None)
            .build()
        .build();

    let resolved = resolve(&topology, "agent", "host", None).await;
    assert_eq!(target_names(&resolved), vec!["jetty"]);
    assert_eq!(resolved.targets[0].capabilities[0].id, "servlets");
}
