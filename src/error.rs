use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Selection is incomplete: {0}")]
    IncompleteSelection(&'static str),

    #[error("Flow {0} is already closed")]
    FlowClosed(uuid::Uuid),

    #[error("Node template not found: {0}")]
    UnknownNodeTemplate(String),

    #[error("Capability {capability} not found on node template {node}")]
    UnknownCapability { node: String, capability: String },

    #[error("Target resolution failed: {0}")]
    ResolutionFailed(String),

    #[error("No tokio runtime available to resolve targets")]
    NoRuntime,

    #[error("Target resolution task was dropped before completing")]
    ResolutionDropped,
}
