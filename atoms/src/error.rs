use std::error::Error as StdError;

/// Boxed cause carried through from the underlying store client.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure of a call against the remote document store.
///
/// The gateway never recovers from either variant; it logs once and hands
/// the error back to its caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store client failed the call (network, auth, throttling, rejected write).
    #[error("{operation} error: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// A stored document could not be turned into a domain value.
    #[error("document {id} could not be decoded: {reason}")]
    Decode { id: String, reason: String },
}

impl StoreError {
    pub fn remote<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Remote {
            operation,
            source: source.into(),
        }
    }

    pub fn decode<I: Into<String>, R: Into<String>>(id: I, reason: R) -> Self {
        Self::Decode {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
