//! Error types for the bot binary.

/// Top-level error for the bot binary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Settings could not be loaded.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: haxton_core::settings::ConfigError,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
