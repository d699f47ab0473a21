//! Error types for the bridge
use thiserror::Error;

/// Errors raised while setting up or tearing down a player session
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A player was opened before the process-wide runtime was initialized
    #[error("BlueTune runtime is not initialized")]
    NotInitialized,

    /// The runtime loader failed
    #[error("Failed to load engine library {library}: {reason}")]
    LoadFailed {
        /// Library the loader was asked for
        library: String,
        /// Loader error text
        reason: String,
    },

    /// The pump or dispatch thread could not be started
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The pump thread panicked
    #[error("Message pump thread panicked")]
    PumpPanicked,
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
