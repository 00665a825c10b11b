use serde::{Deserialize, Serialize};

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

/// The problem a per-problem analysis is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFocus {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub difficulty: Option<String>,
}

impl ProblemFocus {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    pub fn difficulty(&self) -> &str {
        self.difficulty.as_deref().unwrap_or("unknown")
    }
}
