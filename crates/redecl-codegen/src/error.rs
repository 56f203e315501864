//! Generator errors
//!
//! Every variant here aborts the dump. Recoverable problems are recorded as
//! [`Diagnostic`](crate::context::Diagnostic)s instead.

use redecl_reflect::ReflectError;
use thiserror::Error;

/// Fatal errors raised while generating declarations
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A field kind the mapper or serializer cannot express
    #[error("Unsupported field kind '{kind}' for member '{member}' of '{object}'")]
    UnsupportedFieldKind {
        object: String,
        member: String,
        kind: String,
    },

    /// A delegate signature without the delegate function flag
    #[error("Delegate signature '{object}' is missing the delegate flag")]
    MissingDelegateFlag { object: String },

    /// Aggregate-typed member with no aggregate
    #[error("Member '{member}' of '{object}' references a null struct type")]
    NullStructType { object: String, member: String },

    /// Enum-typed member with no enumeration
    #[error("Member '{member}' of '{object}' references a null enum type")]
    NullEnumType { object: String, member: String },

    /// Delegate signatures support at most nine parameters
    #[error("Delegate '{object}' has {count} parameters, at most 9 are supported")]
    TooManyDelegateParameters { object: String, count: usize },

    /// `meta` was added to the plain annotation bucket
    #[error("Annotation key '{key}' is reserved for the meta bucket")]
    ReservedFlagKey { key: String },

    /// Object kind that has no declaration form
    #[error("Object '{object}' of kind '{kind}' cannot be declared")]
    UnsupportedObject { object: String, kind: String },

    /// Forward declarations exist only for classes, interfaces and aggregates
    #[error("Cannot forward declare '{object}'")]
    UnsupportedPreDeclaration { object: String },

    /// Graph lookup or instance read failed
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// Writing output files failed
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for generator operations
pub type CodegenResult<T> = Result<T, CodegenError>;
