pub mod message_release;

pub use message_release::MessageReleaseWorker;
