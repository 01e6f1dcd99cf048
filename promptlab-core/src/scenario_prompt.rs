//! Scenario Prompt Assembly
//!
//! Builds the chat request that asks a model to invent one more test scenario
//! for an experiment, and reads the generated values back out of the reply.
//!
//! Prior scenarios are replayed as assistant turns that already called
//! `add_scenario`, so the model continues the pattern with a new call.

use crate::chat::{ChatCompletionRequest, ChatMessage, FunctionCallDirective, FunctionDefinition};
use crate::models::{
    scalar_text, GeneratedScenario, PromptVariant, TemplateVariable, TestScenario, VariableValues,
};
use serde_json::{json, Map, Value};

pub const ADD_SCENARIO_FUNCTION: &str = "add_scenario";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;
pub const MAX_EXAMPLE_SCENARIOS: usize = 10;

const SYSTEM_PROMPT: &str = "The user is testing multiple scenarios against the same prompt. \
Attempt to generate a new scenario that is different from the others.";

/// Everything the request builder reads from the store
#[derive(Debug, Clone)]
pub struct ScenarioContext<'a> {
    pub variables: &'a [TemplateVariable],
    pub scenarios: &'a [TestScenario],
    pub prompt: &'a PromptVariant,
}

/// Whether `prompt_text` contains the literal `{{label}}` token
pub fn prompt_has_variable(prompt_text: &str, variable: &TemplateVariable) -> bool {
    prompt_text.contains(&variable.placeholder())
}

/// Keep only the values whose key is a declared variable label
pub fn project_values(values: &VariableValues, variables: &[TemplateVariable]) -> VariableValues {
    variables
        .iter()
        .filter_map(|variable| {
            values
                .get(&variable.label)
                .map(|value| (variable.label.clone(), value.clone()))
        })
        .collect()
}

/// Projections of the existing scenarios, in order, skipping empty ones
pub fn example_values(
    scenarios: &[TestScenario],
    variables: &[TemplateVariable],
) -> Vec<VariableValues> {
    scenarios
        .iter()
        .map(|scenario| project_values(&scenario.variable_values, variables))
        .filter(|values| !values.is_empty())
        .collect()
}

pub fn build_messages(context: &ScenarioContext<'_>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];

    let prompt_text = context.prompt.config.to_string();
    if context
        .variables
        .iter()
        .any(|variable| prompt_has_variable(&prompt_text, variable))
    {
        messages.push(ChatMessage::user(&format!(
            "Prompt template:\n---\n{}",
            prompt_text
        )));
    }

    for values in example_values(context.scenarios, context.variables) {
        // BTreeMap<String, String> always serializes.
        let arguments = serde_json::to_string(&values).unwrap_or_else(|_| "{}".to_string());
        messages.push(ChatMessage::assistant_call(ADD_SCENARIO_FUNCTION, arguments));
    }

    messages
}

/// `add_scenario` declaration with one string property per variable
pub fn scenario_function(variables: &[TemplateVariable]) -> FunctionDefinition {
    let properties: Map<String, Value> = variables
        .iter()
        .map(|variable| (variable.label.clone(), json!({ "type": "string" })))
        .collect();

    FunctionDefinition {
        name: ADD_SCENARIO_FUNCTION.to_string(),
        parameters: json!({
            "type": "object",
            "properties": properties,
        }),
    }
}

/// Sampling is pinned to `DEFAULT_TEMPERATURE`.
pub fn build_request(context: &ScenarioContext<'_>, model: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: build_messages(context),
        functions: vec![scenario_function(context.variables)],
        function_call: FunctionCallDirective {
            name: ADD_SCENARIO_FUNCTION.to_string(),
        },
        temperature: DEFAULT_TEMPERATURE,
    }
}

/// Parse `add_scenario` arguments. A missing call counts as `{}`.
///
/// The payload must be a JSON object. String values are kept, numbers and
/// booleans are kept as their JSON text, anything else is dropped. Keys that
/// are not declared variables are dropped too.
pub fn parse_generated_values(
    arguments: Option<&str>,
    variables: &[TemplateVariable],
) -> Result<GeneratedScenario, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_str(arguments.unwrap_or("{}"))?;

    let generated = object
        .into_iter()
        .filter(|(key, _)| variables.iter().any(|variable| &variable.label == key))
        .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text)))
        .collect();

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatRole;

    fn variable(label: &str) -> TemplateVariable {
        TemplateVariable {
            experiment_id: "exp".to_string(),
            label: label.to_string(),
        }
    }

    fn scenario(sort_index: i32, values: &[(&str, &str)]) -> TestScenario {
        TestScenario {
            experiment_id: "exp".to_string(),
            visible: true,
            sort_index,
            variable_values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn prompt(config: Value) -> PromptVariant {
        PromptVariant {
            experiment_id: "exp".to_string(),
            visible: true,
            sort_index: 0,
            config,
        }
    }

    #[test]
    fn projection_drops_undeclared_keys() {
        let variables = vec![variable("A"), variable("B")];
        let source = scenario(0, &[("A", "x"), ("C", "y")]);
        let projected = project_values(&source.variable_values, &variables);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected["A"], "x");
    }

    #[test]
    fn scenario_without_matching_keys_is_skipped() {
        let variables = vec![variable("A")];
        let scenarios = vec![scenario(0, &[("Z", "1")]), scenario(1, &[("A", "2")])];
        let examples = example_values(&scenarios, &variables);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0]["A"], "2");
    }

    #[test]
    fn template_message_added_once_when_referenced() {
        let variables = vec![variable("city"), variable("country")];
        let prompt = prompt(json!({
            "model": "gpt-4",
            "messages": [{"role": "user", "content": "Weather in {{city}}, {{country}}?"}]
        }));
        let context = ScenarioContext {
            variables: &variables,
            scenarios: &[],
            prompt: &prompt,
        };

        let messages = build_messages(&context);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        let content = messages[1].content.as_deref().unwrap();
        assert!(content.starts_with("Prompt template:\n---\n"));
        assert!(content.contains("{{city}}"));
    }

    #[test]
    fn template_text_keeps_source_key_order() {
        let raw = r#"{"model":"m","messages":[{"role":"user","content":"{{A}}"}],"temperature":1}"#;
        let prompt = prompt(serde_json::from_str(raw).unwrap());
        let variables = vec![variable("A")];
        let context = ScenarioContext {
            variables: &variables,
            scenarios: &[],
            prompt: &prompt,
        };

        let messages = build_messages(&context);
        assert_eq!(
            messages[1].content.as_deref(),
            Some(format!("Prompt template:\n---\n{}", raw).as_str())
        );
    }

    #[test]
    fn template_message_omitted_when_unreferenced() {
        let variables = vec![variable("city")];
        let prompt = prompt(json!({"messages": [{"role": "user", "content": "Say hi"}]}));
        let context = ScenarioContext {
            variables: &variables,
            scenarios: &[],
            prompt: &prompt,
        };
        assert_eq!(build_messages(&context).len(), 1);
    }

    #[test]
    fn examples_become_assistant_calls_in_order() {
        let variables = vec![variable("A"), variable("B")];
        let scenarios = vec![
            scenario(0, &[("A", "x"), ("C", "y")]),
            scenario(1, &[("C", "only-undeclared")]),
            scenario(2, &[("A", "p"), ("B", "q")]),
        ];
        let prompt = prompt(json!({}));
        let context = ScenarioContext {
            variables: &variables,
            scenarios: &scenarios,
            prompt: &prompt,
        };

        let messages = build_messages(&context);
        let calls: Vec<_> = messages
            .iter()
            .filter_map(|m| m.function_call.as_ref())
            .collect();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.name == ADD_SCENARIO_FUNCTION));
        assert_eq!(calls[0].arguments, r#"{"A":"x"}"#);
        assert_eq!(calls[1].arguments, r#"{"A":"p","B":"q"}"#);
        assert!(messages[1..].iter().all(|m| m.content.is_none()));
    }

    #[test]
    fn schema_properties_match_declared_labels() {
        let variables = vec![variable("A"), variable("B"), variable("C")];
        let function = scenario_function(&variables);
        assert_eq!(function.name, "add_scenario");
        assert_eq!(function.parameters["type"], "object");

        let properties = function.parameters["properties"].as_object().unwrap();
        let mut keys: Vec<_> = properties.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["A", "B", "C"]);
        assert!(properties.values().all(|p| p == &json!({"type": "string"})));
    }

    #[test]
    fn request_forces_function_call() {
        let variables = vec![variable("A")];
        let prompt = prompt(json!({}));
        let context = ScenarioContext {
            variables: &variables,
            scenarios: &[],
            prompt: &prompt,
        };
        let request = build_request(&context, DEFAULT_MODEL);

        assert_eq!(request.model, "gpt-3.5-turbo-0613");
        assert_eq!(request.function_call.name, ADD_SCENARIO_FUNCTION);
        assert_eq!(request.functions.len(), 1);
        assert!((request.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_generated_values() {
        let variables = vec![variable("A"), variable("B")];
        let parsed =
            parse_generated_values(Some(r#"{"A": "x", "B": 3, "extra": "no"}"#), &variables)
                .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["A"], "x");
        assert_eq!(parsed["B"], "3");
    }

    #[test]
    fn missing_arguments_parse_as_empty() {
        let parsed = parse_generated_values(None, &[variable("A")]).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn malformed_arguments_are_an_error() {
        assert!(parse_generated_values(Some("{\"A\": "), &[variable("A")]).is_err());
        assert!(parse_generated_values(Some("[1, 2]"), &[variable("A")]).is_err());
    }
}
