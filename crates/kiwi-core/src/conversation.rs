//! UI-agnostic conversation types
//!
//! The conversation is an append-only log: entries are never edited, removed
//! or reordered once pushed, so an index into it stays valid for the whole
//! session.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of a deployable application, as listed by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The role of a conversation entry's author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn in the chat log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: ChatRole,
    pub text: String,
    /// Pretty-printed JSON shown as a code block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Options this entry offers to deploy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_options: Option<Value>,
}

impl ConversationEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            code: None,
            deploy_options: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            code: None,
            deploy_options: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_deploy_options(mut self, options: Value) -> Self {
        self.deploy_options = Some(options);
        self
    }
}

/// Append-only, insertion-ordered sequence of entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its index
    pub fn push(&mut self, entry: ConversationEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ConversationEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ConversationEntry;
    type IntoIter = std::slice::Iter<'a, ConversationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Render a JSON payload the way code blocks show it (two-space indent)
pub fn pretty_print(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_returns_index_in_insertion_order() {
        let mut conversation = Conversation::new();
        assert_eq!(conversation.push(ConversationEntry::assistant("hi")), 0);
        assert_eq!(conversation.push(ConversationEntry::user("hello")), 1);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.get(1).map(|e| e.role), Some(ChatRole::User));
    }

    #[test]
    fn test_pretty_print_uses_two_space_indent() {
        assert_eq!(pretty_print(&json!({"replicas": 2})), "{\n  \"replicas\": 2\n}");
    }

    #[test]
    fn test_entry_serializes_without_empty_optionals() {
        let value = serde_json::to_value(ConversationEntry::user("deploy it")).unwrap();
        assert_eq!(value, json!({"role": "user", "text": "deploy it"}));
    }

    #[test]
    fn test_app_id_is_a_plain_string_on_the_wire() {
        let apps: Vec<AppId> = serde_json::from_value(json!(["blog", "wiki"])).unwrap();
        assert_eq!(apps, vec![AppId::from("blog"), AppId::from("wiki")]);
        assert_eq!(apps[0].to_string(), "blog");
    }
}
