//! Chat completion wire types (OpenAI function-calling dialect)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A function invocation carried by an assistant message.
/// `arguments` is a JSON document encoded as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    // Always serialized: assistant function calls must send an explicit null.
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: ChatRole::System,
            content: Some(content.to_string()),
            function_call: None,
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: ChatRole::User,
            content: Some(content.to_string()),
            function_call: None,
        }
    }

    /// An assistant turn that called `name` with the given JSON arguments
    pub fn assistant_call(name: &str, arguments: String) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: None,
            function_call: Some(FunctionCall {
                name: name.to_string(),
                arguments,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    /// JSON-Schema object describing the arguments
    pub parameters: serde_json::Value,
}

/// Forces the model to call one named function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallDirective {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub functions: Vec<FunctionDefinition>,
    pub function_call: FunctionCallDirective,
    pub temperature: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatCompletion {
    /// Arguments of the first choice's function call, if the model made one
    pub fn function_call_arguments(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.function_call.as_ref())
            .map(|call| call.arguments.as_str())
    }
}
