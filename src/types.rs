use serde::{Deserialize, Serialize};

/// Decoded verdict of one analysis stage.
#[derive(Clone, Debug, PartialEq)]
pub struct StageVerdict {
    /// Name of the stage that produced this verdict.
    pub stage: String,
    /// Class label chosen by the classifier.
    pub label: String,
    /// Confidence in `label`, within `[0, 1]`.
    pub confidence: f64,
    /// Whether later stages may run.
    pub accepted: bool,
    /// Optional human-readable note from the backend.
    pub message: Option<String>,
    /// Per-label scores, sorted by label.
    pub scores: Vec<(String, f64)>,
}

/// Result of running every analysis stage over one image.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisOutcome {
    /// Every stage accepted the image.
    Completed(Vec<StageVerdict>),
    /// A stage rejected the image; later stages did not run.
    Rejected {
        verdict: StageVerdict,
        /// Verdicts of the stages that ran before the rejecting one.
        completed: Vec<StageVerdict>,
    },
}

impl AnalysisOutcome {
    /// Verdict of the last stage that ran.
    pub fn final_verdict(&self) -> Option<&StageVerdict> {
        match self {
            Self::Completed(verdicts) => verdicts.last(),
            Self::Rejected { verdict, .. } => Some(verdict),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a chat conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Decoded chat endpoint reply.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChatReply {
    pub message: ChatMessage,
    /// Follow-up prompts suggested by the backend.
    pub suggestions: Vec<String>,
}
