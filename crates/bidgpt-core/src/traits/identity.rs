//! Assistant identity (name + persona) used by the prompt composer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default = "default_name")]
    pub name: String,
    /// Persona sentence placed after "You are {name}." in the system prompt.
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_name() -> String {
    "BidGPT".into()
}

fn default_persona() -> String {
    "Always be concise. You are an expert in tender and bid related queries. Be professional."
        .into()
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: default_name(),
            persona: default_persona(),
        }
    }
}
