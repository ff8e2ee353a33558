//! Error types for the Arbor runtime.
//!
//! A single error enum covers the class registry, node collections, node
//! construction, the lifecycle phases and definition loading. Fan-out phases
//! bundle the failures of their independent units of work into an
//! [`AggregateError`].

use std::fmt;

use thiserror::Error;

/// Root error type for the Arbor system.
#[derive(Debug, Error)]
pub enum Error {
    /// No class is registered under the URI
    #[error("Class {uri} not found")]
    ClassNotFound { uri: String },

    /// A class is already registered under the (case-insensitive) URI
    #[error("Class already registered under URI {uri}")]
    DuplicateClass { uri: String },

    /// A node with the given name does not exist in the collection
    #[error("Node {name} not found{}", .parent.as_ref().map(|p| format!(" in parent {p}")).unwrap_or_default())]
    NodeNotFound {
        /// Path of the parent node that was searched, when known
        parent: Option<String>,

        /// Name of the node that was sought
        name: String,
    },

    /// A signed index fell outside of a collection
    #[error("cannot get index {index} of collection with length {length}")]
    IndexOutOfRange { index: isize, length: usize },

    /// The stored node under a name is not the instance that was given
    #[error("node with name {name} exists ({actual}) but is a different instance than {expected}")]
    IdentityMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// A node with the same name is already in the collection
    #[error("node with name {name} already exists")]
    DuplicateName { name: String },

    /// Schema attributes are permanent and cannot be removed
    #[error("cannot remove type attribute {name}")]
    SchemaAttribute { name: String },

    /// An initializer was handed a node of the wrong shape
    #[error("cannot initialize node {node}: expected a {expected}")]
    TypeMismatch { expected: &'static str, node: String },

    /// The node has no child collection to attach children into
    #[error("node {name} cannot have child nodes")]
    ChildrenUnsupported { name: String },

    /// Allocation, class initialization or post-children initialization failed
    #[error("failed to initialize node {node}: {cause}")]
    InitializationFailure {
        node: String,
        #[source]
        cause: Box<Error>,
    },

    /// Failures collected from one concurrent fan-out level
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// A class URI could not be parsed
    #[error("invalid class URI {uri}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// No loader accepted the URI
    #[error("no definition loader loaded {uri}")]
    NoLoader { uri: String },

    /// A loader failed; earlier failures for the same URI are chained
    #[error("failed to load URI {uri} with loader {loader}: {source}{}", .previous.as_ref().map(|p| format!("\n\tafter: {p}")).unwrap_or_default())]
    LoadFailed {
        uri: String,
        loader: String,
        #[source]
        source: Box<Error>,
        previous: Option<Box<Error>>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// General runtime errors raised by node implementations
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Wrap `cause` as the initialization failure of the named node.
    pub fn initialization(node: impl Into<String>, cause: Error) -> Self {
        Error::InitializationFailure {
            node: node.into(),
            cause: Box::new(cause),
        }
    }

    /// Whether this is a [`Error::ClassNotFound`].
    pub fn is_class_not_found(&self) -> bool {
        matches!(self, Error::ClassNotFound { .. })
    }
}

/// A non-empty, ordered collection of errors produced by independent units
/// of work that ran concurrently.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    /// Bundle `errors`. Returns `None` when there is nothing to report.
    pub fn from_errors(errors: Vec<Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// The bundled errors in collection order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Number of bundled errors (always at least one)
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the aggregate, returning the bundled errors
    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.errors.len())?;
        for (i, err) in self.errors.iter().enumerate() {
            write!(f, "\n\t{:>3}:\t{}", i + 1, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type used throughout the Arbor system.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_is_never_built() {
        assert!(AggregateError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn test_aggregate_display_numbers_entries() {
        let aggregate = AggregateError::from_errors(vec![
            Error::Runtime("first".to_string()),
            Error::ClassNotFound {
                uri: "import:nodes#Missing".to_string(),
            },
        ])
        .unwrap();

        let display = aggregate.to_string();
        assert!(display.starts_with("2 errors occurred:"));
        assert!(display.contains("  1:\tRuntime error: first"));
        assert!(display.contains("  2:\tClass import:nodes#Missing not found"));
    }

    #[test]
    fn test_node_not_found_mentions_parent() {
        let err = Error::NodeNotFound {
            parent: Some("root.config".to_string()),
            name: "port".to_string(),
        };
        assert_eq!(err.to_string(), "Node port not found in parent root.config");

        let err = Error::NodeNotFound {
            parent: None,
            name: "port".to_string(),
        };
        assert_eq!(err.to_string(), "Node port not found");
    }

    #[test]
    fn test_initialization_failure_keeps_cause() {
        use std::error::Error as _;

        let err = Error::initialization("root", Error::Runtime("boom".to_string()));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Runtime error: boom");
    }

    #[test]
    fn test_aggregate_converts_into_error() {
        let aggregate =
            AggregateError::from_errors(vec![Error::Runtime("x".to_string())]).unwrap();
        let error: Error = aggregate.into();
        assert!(matches!(error, Error::Aggregate(_)));
    }
}
