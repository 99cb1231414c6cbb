#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod events;
pub mod executor;
pub mod gate;
pub mod memory;
pub mod observability;
pub mod reasoner;
pub mod types;

pub use config::Config;
pub use cycle::{ControlLoop, CycleReport};
pub use error::{AiosError, Result};
pub use executor::{ActionExecutor, Effector};
pub use gate::SafetyGate;
pub use memory::ChangeDetector;
