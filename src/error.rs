//! Error Types
//!
//! Local validation failures, backend failures, and the union of both
//! returned by the mutation operations.

use thiserror::Error;

/// Rejected before any network call is made
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Bitte eine Kurzbezeichnung eingeben.")]
    MissingName,
    #[error("Bitte eine Abrechnungsart wählen.")]
    MissingBillingType,
    #[error("Keine Elemente ausgewählt.")]
    EmptySelection,
    #[error("Keine Änderung zum Übernehmen gewählt.")]
    NothingToApply,
    #[error("Der Umsatz von Element {0} wird berechnet und kann nicht bearbeitet werden.")]
    ReadOnlyRevenue(u32),
    #[error("Element {0} existiert nicht.")]
    UnknownNode(u32),
    #[error("Element {0} wird bereits gespeichert.")]
    SaveInProgress(u32),
    #[error("Element {node} kann nicht unter sein eigenes Unterelement {target} verschoben werden.")]
    MoveIntoDescendant { node: u32, target: u32 },
}

/// Failure talking to the backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Netzwerkfehler: {0}")]
    Network(String),
    /// Non-2xx response; `message` is the backend's text or a generic fallback
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// Delete refused because other records still reference the node
    #[error("{0}")]
    BlockedByReferences(String),
    #[error("Unerwartete Antwort vom Server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Generic message for responses without a usable error body
    pub fn fallback(status: u16) -> Self {
        ApiError::Backend {
            status,
            message: format!("Die Anfrage ist fehlgeschlagen (HTTP {}).", status),
        }
    }
}

/// Error of a single mutation operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
