//! Error types for pattern parsing and route registration.

use http::Method;
use thiserror::Error;

/// A route pattern could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `{` without a matching `}` or vice versa.
    #[error("pattern `{pattern}` has unbalanced braces")]
    UnbalancedBrace {
        /// The offending pattern.
        pattern: String,
    },

    /// `{}` or `{:regex}`.
    #[error("pattern `{pattern}` has a parameter with an empty name")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The regular expression attached to a parameter does not compile.
    #[error("pattern `{pattern}` has an invalid constraint on `{param}`: {reason}")]
    InvalidConstraint {
        /// The offending pattern.
        pattern: String,
        /// The constrained parameter.
        param: String,
        /// The regex compiler's message.
        reason: String,
    },

    /// The same name is bound twice within one pattern.
    #[error("pattern `{pattern}` binds `{param}` more than once")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated parameter name.
        param: String,
    },

    /// A `*` segment followed by further segments.
    #[error("pattern `{pattern}` has a wildcard before its last segment")]
    WildcardNotLast {
        /// The offending pattern.
        pattern: String,
    },
}

/// A route or prefix could not be inserted into a matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// The pattern itself is malformed.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The same method and pattern were registered before.
    #[error("route {method} {pattern} is already registered")]
    DuplicateRoute {
        /// The repeated method.
        method: Method,
        /// The repeated pattern.
        pattern: String,
    },

    /// A route for the same method matches exactly the same paths under
    /// different parameter names, so the new one could never be reached.
    #[error("route {method} {pattern} is shadowed by {existing}")]
    ShadowedRoute {
        /// The method of both routes.
        method: Method,
        /// The rejected pattern.
        pattern: String,
        /// The pattern registered first.
        existing: String,
    },

    /// The same prefix was registered before.
    #[error("prefix `{prefix}` is already registered")]
    DuplicatePrefix {
        /// The repeated prefix.
        prefix: String,
    },

    /// Prefixes match leading segments only, so they cannot end in `*`.
    #[error("prefix `{prefix}` cannot contain a wildcard")]
    WildcardPrefix {
        /// The offending prefix.
        prefix: String,
    },
}
