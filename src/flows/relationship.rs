use std::sync::Arc;
use serde::{Serialize, Deserialize};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::error::WizardError;
use crate::flows::{ModalInstance, CANCEL_REASON};
use crate::model::{Topology, RelationshipType};
use crate::naming::default_name;
use crate::resolver::{TargetResolutionService, TargetQuery, RelationshipScope, ResolvedTargets, TargetMatch};

pub const TOTAL_STEPS: usize = 3;

/// Filter term restricting relationship types to those accepting a capability type.
pub const VALID_TARGETS_TERM: &str = "validTargets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    ChooseRelationship,
    ChooseTarget,
    Confirm,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Open,
    Finished,
    Cancelled,
}

/// Selection being edited by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipModalData {
    pub relationship: Option<RelationshipType>,
    pub target: Option<String>,
    pub targeted_capability_name: Option<String>,
    pub name: Option<String>,
}

/// Relationship handed to the host on finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipDescriptor {
    pub relationship_type: RelationshipType,
    pub target_node_id: String,
    pub targeted_capability_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenFilter {
    pub term: String,
    pub facet: Vec<String>,
}

struct PendingResolution {
    handle: JoinHandle<()>,
    receiver: oneshot::Receiver<anyhow::Result<ResolvedTargets>>,
}

/// 关系创建向导
/// 三步：选择关系类型 -> 选择目标节点与能力 -> 确认名称
pub struct RelationshipWizard {
    id: Uuid,
    topology: Arc<Topology>,
    scope: RelationshipScope,
    step: usize,
    data: RelationshipModalData,
    targets: Vec<TargetMatch>,
    hidden_filters: Vec<HiddenFilter>,
    status: Status,
    pending: Option<PendingResolution>,
    resolution_error: Option<String>,
}

impl RelationshipWizard {
    /// Wizard with no resolution in flight. Feed one through `apply_resolution`.
    pub fn new(scope: RelationshipScope, topology: Arc<Topology>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topology,
            scope,
            step: 1,
            data: RelationshipModalData::default(),
            targets: Vec::new(),
            hidden_filters: Vec::new(),
            status: Status::Open,
            pending: None,
            resolution_error: None,
        }
    }

    /// Opens the wizard and starts resolving targets on the current tokio runtime.
    pub fn open(scope: RelationshipScope, topology: Arc<Topology>, service: Arc<dyn TargetResolutionService>) -> Result<Self, WizardError> {
        let runtime = Handle::try_current().map_err(|_| WizardError::NoRuntime)?;
        let mut wizard = Self::new(scope, topology);
        let query = TargetQuery::new(&wizard.scope, &wizard.topology);
        let (tx, rx) = oneshot::channel();

        let handle = runtime.spawn(async move {
            let result = service.get_targets(&query).await;
            // Receiver is gone once the wizard is closed.
            let _ = tx.send(result);
        });

        info!(
            flow_id = %wizard.id,
            source = %wizard.scope.source_element_name,
            requirement = %wizard.scope.requirement_name,
            "Relationship wizard opened"
        );
        wizard.pending = Some(PendingResolution { handle, receiver: rx });
        Ok(wizard)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scope(&self) -> &RelationshipScope {
        &self.scope
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        TOTAL_STEPS
    }

    pub fn phase(&self) -> WizardPhase {
        match self.status {
            Status::Finished => WizardPhase::Finished,
            Status::Cancelled => WizardPhase::Cancelled,
            Status::Open => match self.step {
                0 | 1 => WizardPhase::ChooseRelationship,
                2 => WizardPhase::ChooseTarget,
                _ => WizardPhase::Confirm,
            },
        }
    }

    pub fn data(&self) -> &RelationshipModalData {
        &self.data
    }

    pub fn targets(&self) -> &[TargetMatch] {
        &self.targets
    }

    pub fn hidden_filters(&self) -> &[HiddenFilter] {
        &self.hidden_filters
    }

    pub fn resolution_error(&self) -> Option<&str> {
        self.resolution_error.as_deref()
    }

    pub fn is_resolving(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.status != Status::Open
    }

    /// Waits for the in-flight resolution, if any, and applies it.
    pub async fn resolve(&mut self) -> Result<(), WizardError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let result = pending.receiver.await.map_err(|_| WizardError::ResolutionDropped)?;
        self.apply_resolution(result)
    }

    /// Applies the resolution only if it has already arrived. Returns true when applied.
    pub fn try_apply_resolution(&mut self) -> Result<bool, WizardError> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(false);
        };
        match pending.receiver.try_recv() {
            Ok(result) => {
                self.pending = None;
                self.apply_resolution(result)?;
                Ok(true)
            }
            Err(oneshot::error::TryRecvError::Empty) => Ok(false),
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                Err(WizardError::ResolutionDropped)
            }
        }
    }

    /// A failed resolution leaves the wizard usable with an empty target list.
    pub fn apply_resolution(&mut self, result: anyhow::Result<ResolvedTargets>) -> Result<(), WizardError> {
        if self.is_closed() {
            debug!(flow_id = %self.id, "Discarding target resolution for closed wizard");
            return Ok(());
        }

        let resolved = match result {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(flow_id = %self.id, error = ?e, "Target resolution failed");
                let message = format!("{:#}", e);
                self.resolution_error = Some(message.clone());
                return Err(WizardError::ResolutionFailed(message));
            }
        };

        self.resolution_error = None;
        self.targets = resolved.targets;
        if let Some(relationship) = resolved.relationship_type {
            self.data.relationship = Some(relationship);
        }

        if let Some(preferred) = resolved.preferred_match {
            if let [capability] = preferred.capabilities.as_slice() {
                if let Err(e) = self.on_selected_target(&preferred.template.name, Some(&capability.id)) {
                    warn!(flow_id = %self.id, error = %e, "Could not preselect preferred target");
                }
            }
        }
        Ok(())
    }

    pub fn on_selected_relationship(&mut self, relationship: RelationshipType) -> Result<(), WizardError> {
        self.ensure_open()?;
        debug!(flow_id = %self.id, relationship = %relationship.element_id, "Relationship type selected");
        self.data.relationship = Some(relationship);
        self.refresh_name();
        self.advance();
        Ok(())
    }

    pub fn on_selected_target(&mut self, target: &str, capability: Option<&str>) -> Result<(), WizardError> {
        self.ensure_open()?;

        if let Some(capability_id) = capability {
            let capability_type = self.lookup_capability_type(target, capability_id)?;
            self.hidden_filters = vec![HiddenFilter {
                term: VALID_TARGETS_TERM.to_string(),
                facet: vec![capability_type],
            }];
        }

        debug!(flow_id = %self.id, target = %target, capability = ?capability, "Target selected");
        self.data.target = Some(target.to_string());
        self.data.targeted_capability_name = capability.map(|c| c.to_string());
        self.advance();

        // Relationship already known: skip its selection.
        if self.data.relationship.is_some() {
            self.advance();
            self.refresh_name();
        }
        Ok(())
    }

    /// Relationship types of the topology accepted by the current hidden filters.
    pub fn relationship_candidates(&self) -> Vec<&RelationshipType> {
        self.topology.relationship_types.values()
            .filter(|relationship| self.hidden_filters.iter().all(|f| f.accepts(relationship)))
            .collect()
    }

    /// User edit of the name. Selecting a type or a target derives it again.
    pub fn set_name(&mut self, name: &str) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.data.name = if name.is_empty() || self.data.relationship.is_none() || self.data.target.is_none() {
            None
        } else {
            Some(name.to_string())
        };
        Ok(())
    }

    pub fn next(&mut self) {
        if self.step < TOTAL_STEPS {
            self.step += 1;
        }
    }

    pub fn back(&mut self) {
        if self.step > 1 {
            self.step -= 1;
        }
    }

    pub fn must_disable_finish(&self) -> bool {
        self.data.relationship.is_none() || self.data.target.is_none() || self.data.name.is_none()
    }

    pub fn descriptor(&self) -> Option<RelationshipDescriptor> {
        Some(RelationshipDescriptor {
            relationship_type: self.data.relationship.clone()?,
            target_node_id: self.data.target.clone()?,
            targeted_capability_id: self.data.targeted_capability_name.clone(),
            name: self.data.name.clone()?,
        })
    }

    pub fn finish(&mut self, modal: &mut dyn ModalInstance<RelationshipDescriptor>) -> Result<(), WizardError> {
        self.ensure_open()?;
        let descriptor = self.descriptor()
            .ok_or(WizardError::IncompleteSelection("relationship type, target and name are required"))?;

        info!(
            flow_id = %self.id,
            name = %descriptor.name,
            relationship = %descriptor.relationship_type.element_id,
            target = %descriptor.target_node_id,
            "Relationship created"
        );
        self.close(Status::Finished);
        modal.close(descriptor);
        Ok(())
    }

    pub fn cancel(&mut self, modal: &mut dyn ModalInstance<RelationshipDescriptor>) {
        if self.is_closed() {
            return;
        }
        info!(flow_id = %self.id, "Relationship wizard cancelled");
        self.close(Status::Cancelled);
        modal.dismiss(CANCEL_REASON);
    }

    fn close(&mut self, status: Status) {
        self.status = status;
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.is_closed() {
            return Err(WizardError::FlowClosed(self.id));
        }
        Ok(())
    }

    // Unbounded: the relationship skip may go past TOTAL_STEPS.
    fn advance(&mut self) {
        self.step += 1;
    }

    fn refresh_name(&mut self) {
        self.data.name = match (&self.data.relationship, &self.data.target) {
            (Some(relationship), Some(target)) => Some(default_name(relationship, target)),
            _ => None,
        };
    }

    fn lookup_capability_type(&self, target: &str, capability_id: &str) -> Result<String, WizardError> {
        let template = self.topology.node_template(target)
            .ok_or_else(|| WizardError::UnknownNodeTemplate(target.to_string()))?;
        template.capabilities.get(capability_id)
            .map(|c| c.capability_type.clone())
            .ok_or_else(|| WizardError::UnknownCapability {
                node: target.to_string(),
                capability: capability_id.to_string(),
            })
    }

}

impl HiddenFilter {
    /// Exact match: the relationship must list one of the facet's capability types.
    pub fn accepts(&self, relationship: &RelationshipType) -> bool {
        if self.term != VALID_TARGETS_TERM {
            return true;
        }
        self.facet.iter().any(|facet| relationship.valid_targets.contains(facet))
    }
}

impl Drop for RelationshipWizard {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
