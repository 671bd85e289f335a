//! Prompt composition for chat answers and translations.

use bidgpt_core::traits::identity::Identity;
use bidgpt_core::types::Message;

pub const TRANSLATION_SYSTEM_PROMPT: &str = "You are a translation assistant.";

/// System instruction for a chat answer. `context` may be empty.
pub fn compose_system_prompt(identity: &Identity, context: &str, question: &str) -> String {
    format!(
        "You are {}. {}Use the following knowledge base.\nKnowledge base: {}\nUser question: {}",
        identity.name, identity.persona, context, question
    )
}

/// `[system, user]` pair for a chat answer.
pub fn chat_messages(identity: &Identity, context: &str, question: &str) -> Vec<Message> {
    vec![
        Message::system(compose_system_prompt(identity, context, question)),
        Message::user(question),
    ]
}

/// `[system, user]` pair for a translation request.
pub fn translation_messages(text: &str, target_lang: &str) -> Vec<Message> {
    vec![
        Message::system(TRANSLATION_SYSTEM_PROMPT),
        Message::user(format!(
            "Translate the following text to {target_lang}: {text}"
        )),
    ]
}
