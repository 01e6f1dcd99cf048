//! Scenario Autogeneration
//!
//! Reads an experiment's variables, recent scenarios and leading prompt
//! variant, asks the model for one more `add_scenario` call, and returns the
//! generated values.
//!
//! Store failures propagate. Model and parse failures are logged and yield an
//! empty scenario, so callers cannot tell them apart from "nothing to generate".

use crate::ai_client::ChatCompletionClient;
use crate::errors::PromptLabResult;
use crate::store::ExperimentStore;
use promptlab_core::{
    build_request, parse_generated_values, GeneratedScenario, ScenarioContext, DEFAULT_MODEL,
    MAX_EXAMPLE_SCENARIOS,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AutogenConfig {
    pub model: String,
    /// Capped at `MAX_EXAMPLE_SCENARIOS`
    pub max_example_scenarios: usize,
}

impl Default for AutogenConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_example_scenarios: MAX_EXAMPLE_SCENARIOS,
        }
    }
}

pub struct ScenarioAutogenerator {
    store: Arc<dyn ExperimentStore>,
    client: Arc<dyn ChatCompletionClient>,
    config: AutogenConfig,
}

impl ScenarioAutogenerator {
    pub fn new(store: Arc<dyn ExperimentStore>, client: Arc<dyn ChatCompletionClient>) -> Self {
        Self {
            store,
            client,
            config: AutogenConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AutogenConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AutogenConfig {
        &self.config
    }

    pub async fn generate(&self, experiment_id: &str) -> PromptLabResult<GeneratedScenario> {
        let example_limit = self.config.max_example_scenarios.min(MAX_EXAMPLE_SCENARIOS);
        let (experiment, variables, scenarios, prompt) = tokio::try_join!(
            self.store.find_experiment(experiment_id),
            self.store.list_variables(experiment_id),
            self.store.list_visible_scenarios(experiment_id, example_limit),
            self.store.first_visible_prompt_variant(experiment_id),
        )?;

        let prompt = match (experiment, prompt) {
            (Some(_), Some(prompt)) if !variables.is_empty() => prompt,
            _ => {
                debug!(experiment_id, "nothing to generate from");
                return Ok(GeneratedScenario::new());
            }
        };

        let context = ScenarioContext {
            variables: &variables,
            scenarios: &scenarios,
            prompt: &prompt,
        };
        let request = build_request(&context, &self.config.model);
        debug!(
            experiment_id,
            model = %request.model,
            messages = request.messages.len(),
            request = %serde_json::to_string(&request).unwrap_or_default(),
            "requesting scenario"
        );

        let completion = match self.client.create_chat_completion(&request).await {
            Ok(completion) => completion,
            Err(err) => {
                error!(experiment_id, kind = err.kind.as_str(), "scenario generation failed: {}", err.message);
                return Ok(GeneratedScenario::new());
            }
        };

        let arguments = completion.function_call_arguments();
        if arguments.is_none() {
            warn!(experiment_id, "model returned no function call");
        }

        match parse_generated_values(arguments, &variables) {
            Ok(generated) => {
                info!(experiment_id, values = generated.len(), "generated scenario");
                Ok(generated)
            }
            Err(err) => {
                error!(experiment_id, kind = "parse", "scenario arguments were not valid JSON: {}", err);
                Ok(GeneratedScenario::new())
            }
        }
    }
}
