//! PromptLab application services
//!
//! - Scenario autogeneration: asks a chat model to propose a new test scenario
//!   for an experiment, seeded with the experiment's existing scenarios
//! - Organization settings: rename the selected organization and announce it

pub mod ai_client;
pub mod autogen;
pub mod config;
pub mod errors;
pub mod events;
pub mod org_editor;
pub mod store;
pub mod telemetry;

pub use ai_client::{ChatCompletionClient, CompletionError, CompletionErrorKind, OpenAIClient};
pub use autogen::{AutogenConfig, ScenarioAutogenerator};
pub use config::AppConfig;
pub use errors::{ErrorResponse, PromptLabError, PromptLabResult};
pub use events::{EntityChanged, InvalidationBus};
pub use org_editor::{handled_async, OrgNameEditor, SaveOutcome};
pub use store::{ExperimentStore, MemoryStore, OrganizationStore, StoreSnapshot};
