pub mod chat;
pub mod content;
pub mod message;

pub use chat::{ChatRequest, ChatResponse};
pub use content::{ContentBlock, HistoryContent, HistoryEntry, ImageSource, Role};
pub use message::{ContentPart, ImageUrl, Message, MessageContent};
