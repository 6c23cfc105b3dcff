pub mod error;
pub mod flows;
pub mod model;
pub mod naming;
pub mod resolver;

pub use error::WizardError;
pub use flows::{DialogOutcome, ModalInstance, OutcomeSlot, CANCEL_REASON};
pub use flows::relationship::{RelationshipDescriptor, RelationshipWizard, WizardPhase};
pub use flows::state_selection::{LifecycleState, StateSelection, StateSelectionFlow};
pub use model::Topology;
pub use resolver::{RelationshipScope, TargetResolutionService};
