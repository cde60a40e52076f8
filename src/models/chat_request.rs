use serde::{Deserialize, Serialize};

use super::Message;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub update_interval: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<String>,
}

impl ChatRequest {
    pub fn new(model: String, messages: Vec<Message>) -> Self {
        ChatRequest {
            model,
            messages,
            stream: false,
            update_interval: 0,
            function_call: None,
        }
    }

    /// Lets the Provider decide whether to call one of its built-in functions,
    /// which is how image generation gets triggered.
    pub fn with_auto_function_call(mut self) -> Self {
        self.function_call = Some("auto".to_string());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
