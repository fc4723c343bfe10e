//! Messages exchanged with the browser over the WebSocket.

use serde::{Deserialize, Serialize};
use walker_core::ModelConfig;
use walker_world::GridFrame;

/// Browser to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    GetParams,
    Reset,
    /// Advance exactly one step; `step` is the browser's counter and is
    /// only logged, never used to seek
    GetStep {
        #[serde(default)]
        step: u64,
    },
    SubmitParams {
        param: String,
        value: serde_json::Value,
    },
}

/// Server to browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ModelParams { params: ModelConfig },
    VizState { step: u64, data: Vec<GridFrame> },
    /// The model stopped running; further steps are refused
    End,
    /// A parameter update was accepted
    ParamsUpdated { params: ModelConfig },
    Error { message: String },
}
