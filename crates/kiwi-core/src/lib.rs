pub mod config;
pub mod conversation;
pub mod flow;
pub mod gateway;
pub mod logging;
pub mod selector;

// Re-export main types for convenience
pub use config::Config;
pub use conversation::{AppId, ChatRole, Conversation, ConversationEntry};
pub use flow::{reduce, Action, Effect, Phase, Session};
pub use gateway::{DeployResponse, DetectResponse, GatewayClient};
pub use selector::AppSelector;
