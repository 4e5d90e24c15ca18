//! Change payloads carried from a scheduling thread to the thread that applies them.

use std::sync::Arc;

/// The new value requested for a parameter.
///
/// Exactly one variant is active per change. [`Parameter::apply`](crate::Parameter::apply)
/// matches on it exhaustively; variants a parameter kind cannot hold are ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Value in the parameter's own range (e.g. Hz, dB).
    Plain(f64),
    /// Host-facing value in \[0.0, 1.0\], mapped through the descriptor's scale.
    Normalized(f64),
    /// Boolean state, stored as `1.0` / `0.0`.
    Boolean(bool),
    /// Byte buffer for text and blob parameters.
    Data(Arc<Vec<u8>>),
}

impl Payload {
    /// Builds a data payload from a byte slice, or `None` for an empty slice.
    pub fn data(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self::Data(Arc::new(bytes.to_vec())))
        }
    }

    /// Whether this payload carries bytes rather than a scalar.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}
