use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct StageResponse {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub accepted: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: Vec<&'a ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
