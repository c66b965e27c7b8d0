//! Unified error type for all dictionary operations.

/// Things that can go wrong when using the dictionary.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The word isn't in the dictionary.
    #[error("word not found: {0:?}")]
    NotFound(String),
    /// Strict add of a word that's already defined.
    #[error("word already exists: {0:?}")]
    AlreadyExists(String),
    /// The backing file isn't a JSON object of `{word: {"definition": ...}}`.
    #[error("corrupt dictionary document: {0}")]
    CorruptDocument(#[source] serde_json::Error),
    /// File system problem (open, read, write, rename).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The store was shut down and no longer takes mutations.
    #[error("dictionary is shut down")]
    Closed,
}

impl Error {
    /// `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::CorruptDocument(err)
        }
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn syntax_errors_map_to_corrupt() {
        let err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err = Error::from(err);
        assert!(matches!(err, Error::CorruptDocument(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_errors_keep_their_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from(io);
        assert!(err.to_string().contains("denied"));
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("unexpected {other:?}"),
        }
    }
}
