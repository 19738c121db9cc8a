pub mod assembler;
pub mod intent;
pub mod metrics;
pub mod providers;
pub mod relay;

pub use relay::ChatRelay;
