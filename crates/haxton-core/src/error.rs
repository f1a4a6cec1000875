//! Error types shared by the collaborator traits and the bot loops.

/// Failure reported by a collaborator (map, navigation, fort, encounter,
/// or inventory client).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The backing service could not be reached.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The server refused the request.
    #[error("request rejected: {message}")]
    Rejected {
        /// Description of the rejection.
        message: String,
    },

    /// The referenced entity does not exist.
    #[error("{what} not found")]
    NotFound {
        /// What was being looked up.
        what: String,
    },

    /// The call did not complete in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout in milliseconds.
        timeout_ms: u64,
    },
}

/// Error that ends a bot loop iteration or a spawned unit of work.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A collaborator call failed.
    #[error("client error: {source}")]
    Client {
        /// The underlying collaborator error.
        #[from]
        source: ClientError,
    },

    /// The nearby-sighting fetch inside a walk step exceeded its bound.
    #[error("nearby sighting fetch timed out after {timeout_ms}ms")]
    NearbyTimeout {
        /// The configured bound in milliseconds.
        timeout_ms: u64,
    },

    /// A supervised task panicked.
    #[error("task panicked: {message}")]
    Panicked {
        /// Panic description from the runtime.
        message: String,
    },
}
