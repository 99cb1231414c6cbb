mod action;
mod observation;
mod receipt;

pub use action::{ActionPayload, ActionPlan, ActionType, Constraints, PayloadError};
pub use observation::{ChangeRecord, ObservationEvent};
pub use receipt::{Receipt, ReceiptStatus, VerificationStatus, VerifiedActionPlan};
