pub mod chat;
pub mod health;
pub mod metrics;

pub use self::chat::chat;
pub use self::health::health_check;
pub use self::metrics::metrics;
