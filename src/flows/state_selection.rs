use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};
use uuid::Uuid;
use crate::error::WizardError;
use crate::flows::{ModalInstance, CANCEL_REASON};
use crate::model::{Topology, NodeTemplateId};

/// Workflow lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Initial,
    Creating,
    Created,
    Configuring,
    Configured,
    Starting,
    Started,
    Stopping,
    Stopped,
    Deleting,
    Deleted,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 11] = [
        LifecycleState::Initial,
        LifecycleState::Creating,
        LifecycleState::Created,
        LifecycleState::Configuring,
        LifecycleState::Configured,
        LifecycleState::Starting,
        LifecycleState::Started,
        LifecycleState::Stopping,
        LifecycleState::Stopped,
        LifecycleState::Deleting,
        LifecycleState::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Initial => "initial",
            LifecycleState::Creating => "creating",
            LifecycleState::Created => "created",
            LifecycleState::Configuring => "configuring",
            LifecycleState::Configured => "configured",
            LifecycleState::Starting => "starting",
            LifecycleState::Started => "started",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Deleting => "deleting",
            LifecycleState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleState::ALL.iter()
            .find(|state| state.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown lifecycle state: {}", s))
    }
}

/// Result handed to the host on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSelection {
    pub node: NodeTemplateId,
    pub state: LifecycleState,
}

/// Pick a node template, then one of its lifecycle states.
#[derive(Debug)]
pub struct StateSelectionFlow {
    id: Uuid,
    node_template_items: Vec<NodeTemplateId>,
    selected_node_template: Option<NodeTemplateId>,
    state_items: Vec<LifecycleState>,
    selected_state: Option<LifecycleState>,
    closed: bool,
}

impl StateSelectionFlow {
    pub fn new(topology: &Topology) -> Self {
        let id = Uuid::new_v4();
        let node_template_items: Vec<NodeTemplateId> = topology.node_templates.keys().cloned().collect();
        debug!(flow_id = %id, nodes = node_template_items.len(), "State selection opened");

        Self {
            id,
            node_template_items,
            selected_node_template: None,
            state_items: Vec::new(),
            selected_state: None,
            closed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn node_template_items(&self) -> &[NodeTemplateId] {
        &self.node_template_items
    }

    pub fn state_items(&self) -> &[LifecycleState] {
        &self.state_items
    }

    pub fn selected_node_template(&self) -> Option<&str> {
        self.selected_node_template.as_deref()
    }

    pub fn selected_state(&self) -> Option<LifecycleState> {
        self.selected_state
    }

    pub fn select_node_template(&mut self, node_id: &str) {
        self.selected_node_template = Some(node_id.to_string());
        self.selected_state = None;
        // Static for now, independent of the node's type.
        self.state_items = LifecycleState::ALL.to_vec();
    }

    pub fn select_state(&mut self, state: LifecycleState) {
        self.selected_state = Some(state);
    }

    pub fn can_submit(&self) -> bool {
        !self.closed && self.selected_node_template.is_some() && self.selected_state.is_some()
    }

    pub fn submit(&mut self, modal: &mut dyn ModalInstance<StateSelection>) -> Result<(), WizardError> {
        if self.closed {
            return Err(WizardError::FlowClosed(self.id));
        }
        let node = self.selected_node_template.clone()
            .ok_or(WizardError::IncompleteSelection("no node template selected"))?;
        let state = self.selected_state
            .ok_or(WizardError::IncompleteSelection("no state selected"))?;

        info!(flow_id = %self.id, node = %node, state = %state, "State selected");
        self.closed = true;
        modal.close(StateSelection { node, state });
        Ok(())
    }

    pub fn cancel(&mut self, modal: &mut dyn ModalInstance<StateSelection>) {
        if self.closed {
            return;
        }
        self.closed = true;
        modal.dismiss(CANCEL_REASON);
    }
}
