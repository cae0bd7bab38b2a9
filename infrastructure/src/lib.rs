//! Infrastructure layer for roundtable
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileBackendConfig, FileConfig, FileDriverConfig, FileLoggingConfig,
    FileOpenAiConfig, FileOutputConfig, FileOutputFormat, FileProvidersConfig,
    FileSchedulerConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{
    EchoBackend, OpenAiBackend, OpenAiError, OpenAiSettings, ProviderKind, build_backend,
};
