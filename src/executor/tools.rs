use serde::{Deserialize, Serialize};

use crate::errors::{GridTapError, GridTapResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub def_type: String,
    pub function: FunctionDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool invocation as emitted by an OpenAI-compatible chat model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object; may be empty for argument-less tools.
    #[serde(default)]
    pub arguments: String,
}

/// Loads the tool definitions from prompts/tools/gridtap.json.
/// The JSON is embedded at compile time via include_str!.
pub fn load_builtin_tools() -> GridTapResult<Vec<ToolDef>> {
    let json = include_str!("../../prompts/tools/gridtap.json");
    serde_json::from_str(json)
        .map_err(|e| GridTapError::Config(format!("Failed to parse builtin tools: {e}")))
}
