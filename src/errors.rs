//! Error Types
//!
//! This module defines the error type shared by the viewer core.
//!
//! # Overview
//!
//! [`ViewerError`] covers the failures that are reported to callers:
//! - Asset loading and lookup errors
//! - Registry preconditions (objects must live under the product root)
//! - XR reference-space and hit-test negotiation failures
//! - Persistence, I/O and configuration errors
//!
//! Hit-test misses and releases without an active session are not errors;
//! they surface as `None` or [`InputResponse::Ignored`](crate::input::InputResponse).

use thiserror::Error;

/// The main error type for the viewer core.
#[derive(Error, Debug)]
pub enum ViewerError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The loader failed to fetch or parse an asset.
    #[error("Failed to load asset '{name}': {reason}")]
    AssetLoad {
        /// Name the asset was going to be registered under
        name: String,
        /// Loader-provided description of the failure
        reason: String,
    },

    /// The requested asset or registered part was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // ========================================================================
    // Scene & Registry Errors
    // ========================================================================
    /// A node was registered that is not parented under the product root.
    #[error("Node '{0}' is not parented under the product root")]
    NotUnderProductRoot(String),

    /// A node handle no longer refers to a live node.
    #[error("Invalid or stale node handle")]
    InvalidNode,

    // ========================================================================
    // XR Errors
    // ========================================================================
    /// No reference space of any supported kind could be obtained.
    #[error("No XR reference space available")]
    ReferenceSpaceUnavailable,

    /// The XR host refused to create a hit-test source.
    #[error("Hit-test source unavailable: {0}")]
    HitTestUnavailable(String),

    // ========================================================================
    // Persistence, I/O & Config Errors
    // ========================================================================
    /// The persistence store rejected a read or write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Alias for `Result<T, ViewerError>`.
pub type Result<T> = std::result::Result<T, ViewerError>;
