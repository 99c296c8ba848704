//! Unified error types for api-tools.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-friendly messages.
//!
//! Most "failures" in API analysis are not errors at all: an unresolved
//! reference is `Ok(None)`, malformed filter entries are skipped. The types
//! here cover what is left: I/O, snapshot loading, comparator and lookup
//! failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for api-tools operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiToolsError {
    /// Errors while loading snapshots, filter files or class files
    #[error("Failed to load: {context}")]
    Load {
        context: String,
        #[source]
        source: LoadErrorKind,
    },

    /// Errors raised by a structural comparator
    #[error("Comparison failed: {context}")]
    Compare {
        context: String,
        #[source]
        source: CompareErrorKind,
    },

    /// Errors raised while looking up types during reference resolution
    #[error("Resolution failed: {context}")]
    Resolve {
        context: String,
        #[source]
        source: ResolveErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Specific load error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LoadErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Invalid class file: {0}")]
    InvalidClassFile(String),
}

/// Specific comparison error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CompareErrorKind {
    #[error("Type not found: {0}")]
    TypeNotFound(String),
}

/// Specific resolution error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ResolveErrorKind {
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Type lookup failed for {type_name}: {reason}")]
    LookupFailed { type_name: String, reason: String },
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for api-tools operations
pub type Result<T> = std::result::Result<T, ApiToolsError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl ApiToolsError {
    /// Create a load error with context
    pub fn load(context: impl Into<String>, source: LoadErrorKind) -> Self {
        Self::Load {
            context: context.into(),
            source,
        }
    }

    /// Create a comparison error with context
    pub fn compare(context: impl Into<String>, source: CompareErrorKind) -> Self {
        Self::Compare {
            context: context.into(),
            source,
        }
    }

    /// Create a resolution error with context
    pub fn resolve(context: impl Into<String>, source: ResolveErrorKind) -> Self {
        Self::Resolve {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Whether this error came from an I/O failure
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ApiToolsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ApiToolsError {
    fn from(err: serde_json::Error) -> Self {
        Self::load(
            "JSON deserialization",
            LoadErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
///
/// ```ignore
/// use api_tools::error::ErrorContext;
///
/// let profile = load_profile(path)
///     .with_context(|| format!("loading baseline {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ApiToolsError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: ApiToolsError, new_ctx: &str) -> ApiToolsError {
    match err {
        ApiToolsError::Load {
            context: existing,
            source,
        } => ApiToolsError::Load {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiToolsError::Compare {
            context: existing,
            source,
        } => ApiToolsError::Compare {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiToolsError::Resolve {
            context: existing,
            source,
        } => ApiToolsError::Resolve {
            context: chain_context(new_ctx, &existing),
            source,
        },
        ApiToolsError::Io {
            path,
            message,
            source,
        } => ApiToolsError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiToolsError::load(
            "opening core.jar",
            LoadErrorKind::InvalidArchive("invalid Zip archive".to_string()),
        );
        assert!(err.to_string().contains("opening core.jar"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = ApiToolsError::io(
            "/tmp/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        match err {
            ApiToolsError::Io { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/missing.json")));
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_context_chaining() {
        fn inner() -> Result<()> {
            Err(ApiToolsError::compare(
                "base",
                CompareErrorKind::TypeNotFound("a.Gone".to_string()),
            ))
        }

        fn outer() -> Result<()> {
            inner().context("middle").context("outer")
        }

        match outer() {
            Err(ApiToolsError::Compare { context, .. }) => {
                assert_eq!(context, "outer: middle: base");
            }
            _ => panic!("Expected Compare error"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;
        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
