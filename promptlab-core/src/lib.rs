pub mod chat;
pub mod models;
pub mod org_settings;
pub mod scenario_prompt;

pub use chat::{
    ChatChoice, ChatCompletion, ChatCompletionRequest, ChatMessage, ChatRole, FunctionCall,
    FunctionCallDirective, FunctionDefinition,
};
pub use models::{
    Experiment, GeneratedScenario, Organization, OrganizationUpdate, OrganizationUpdates,
    PromptVariant, TemplateVariable, TestScenario, VariableValues,
};
pub use org_settings::{Breadcrumb, OrgNameDraft, OrgSettingsView};
pub use scenario_prompt::{
    build_request, parse_generated_values, ScenarioContext, ADD_SCENARIO_FUNCTION, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, MAX_EXAMPLE_SCENARIOS,
};
