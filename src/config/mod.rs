pub mod schema;

pub use schema::{
    Config, EventsConfig, ExecutorConfig, GateConfig, MemoryConfig, ObservabilityConfig,
    ReasonerConfig,
};
