use clap::{Parser, Subcommand};
use topology_wizard::flows::{DialogOutcome, OutcomeSlot};
use topology_wizard::flows::relationship::{RelationshipWizard, RelationshipDescriptor};
use topology_wizard::flows::state_selection::{LifecycleState, StateSelection, StateSelectionFlow};
use topology_wizard::model::{RelationshipType, Topology};
use topology_wizard::model::loader::load_topology_from_yaml;
use topology_wizard::resolver::{RelationshipScope, TargetQuery, TargetResolutionService};
use topology_wizard::resolver::http::HttpTargetResolver;
use topology_wizard::resolver::topology::TopologyTargetResolver;
use std::sync::Arc;
use std::path::PathBuf;
use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the valid relationship targets for a requirement
    Targets {
        /// Path to the topology YAML file
        #[arg(long, short)]
        topology: PathBuf,

        /// Source node template
        #[arg(long, short)]
        source: String,

        /// Requirement of the source node template
        #[arg(long, short)]
        requirement: String,

        /// Preferred target node template
        #[arg(long)]
        target: Option<String>,

        /// Remote target resolution endpoint (in-process resolution when absent)
        #[arg(long)]
        resolver_url: Option<String>,
    },

    /// Run the relationship creation wizard
    Relationship {
        #[arg(long, short)]
        topology: PathBuf,

        #[arg(long, short)]
        source: String,

        #[arg(long, short)]
        requirement: String,

        /// Target node template
        #[arg(long)]
        target: Option<String>,

        /// Capability of the target node template
        #[arg(long)]
        capability: Option<String>,

        /// Relationship type id (defaults to the requirement's)
        #[arg(long = "type")]
        relationship_type: Option<String>,

        /// Override the generated relationship name
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        resolver_url: Option<String>,
    },

    /// Select a workflow state of a node template
    State {
        #[arg(long, short)]
        topology: PathBuf,

        /// Node template
        #[arg(long, short)]
        node: String,

        /// Lifecycle state (initial, creating, ... deleted)
        #[arg(long)]
        state: LifecycleState,
    },
}

fn build_resolver(resolver_url: Option<String>) -> Arc<dyn TargetResolutionService> {
    match resolver_url {
        Some(url) => {
            info!("Resolving targets remotely: {}", url);
            Arc::new(HttpTargetResolver::new(&url))
        }
        None => Arc::new(TopologyTargetResolver::new()),
    }
}

fn load_topology(path: &PathBuf) -> Result<Topology> {
    let topology = load_topology_from_yaml(&path.to_string_lossy())?;
    info!("Loaded topology {} with {} node templates", topology.id, topology.node_templates.len());
    Ok(topology)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Targets { topology, source, requirement, target, resolver_url } => {
            let topology = load_topology(&topology)?;
            let scope = RelationshipScope::for_requirement(&topology, &source, &requirement)?
                .with_target(target);

            let resolver = build_resolver(resolver_url);
            let resolved = resolver.get_targets(&TargetQuery::new(&scope, &topology)).await?;
            info!("Found {} targets for {}.{}", resolved.targets.len(), source, requirement);
            print_json(&resolved)?;
        }

        Commands::Relationship { topology, source, requirement, target, capability, relationship_type, name, resolver_url } => {
            let topology = Arc::new(load_topology(&topology)?);
            let scope = RelationshipScope::for_requirement(&topology, &source, &requirement)?
                .with_target(target.clone());

            let mut wizard = RelationshipWizard::open(scope, topology.clone(), build_resolver(resolver_url))?;
            if let Err(e) = wizard.resolve().await {
                warn!("Continuing without targets: {}", e);
            }
            info!(step = wizard.step(), targets = wizard.targets().len(), "Targets resolved");

            if let Some(type_id) = relationship_type {
                let relationship = topology.relationship_types.get(&type_id)
                    .cloned()
                    .unwrap_or_else(|| RelationshipType::new(type_id));
                wizard.on_selected_relationship(relationship)?;
            }

            if let Some(target) = target {
                let already_selected = wizard.data().target.as_deref() == Some(target.as_str())
                    && (capability.is_none() || wizard.data().targeted_capability_name == capability);
                if !already_selected {
                    wizard.on_selected_target(&target, capability.as_deref())?;
                }
            }

            if let Some(name) = name {
                wizard.set_name(&name)?;
            }

            let mut modal: OutcomeSlot<RelationshipDescriptor> = OutcomeSlot::new();
            if wizard.must_disable_finish() {
                warn!("Relationship is incomplete (type, target and name are required)");
                wizard.cancel(&mut modal);
            } else {
                wizard.finish(&mut modal)?;
            }

            let outcome = modal.take().ok_or_else(|| anyhow!("Wizard ended without an outcome"))?;
            print_json(&outcome)?;
            if let DialogOutcome::Dismissed(_) = outcome {
                std::process::exit(2);
            }
        }

        Commands::State { topology, node, state } => {
            let topology = load_topology(&topology)?;
            if topology.node_template(&node).is_none() {
                return Err(anyhow!("Node template not found: {}", node));
            }

            let mut flow = StateSelectionFlow::new(&topology);
            flow.select_node_template(&node);
            flow.select_state(state);

            let mut modal: OutcomeSlot<StateSelection> = OutcomeSlot::new();
            flow.submit(&mut modal)?;
            if let Some(outcome) = modal.take() {
                print_json(&outcome)?;
            }
        }
    }

    Ok(())
}
