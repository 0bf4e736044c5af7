//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g. `E0301`) with the first
//! digit block indicating the compiler phase. Used for documentation
//! lookups and for matching on diagnostics in tests.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the leading digits indicate the phase:
/// - E03xx: Semantic analysis errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Semantic analysis (E03xx)
    /// Unbound identifier: no environment in the chain resolves the name.
    E0301,
    /// Illegal assignment scope: the target resolves to a binding, but only
    /// beyond the permitted horizon, or to a binding that is not an
    /// assignable local at all.
    E0302,
    /// Not an operation: a phrase without run-time effect in a position
    /// that requires one.
    E0303,
    /// Illegal assignment target: the left side of `:=` is not an
    /// identifier.
    E0304,
    /// Nested evaluation failure: compile-time constant evaluation failed.
    E0305,
    /// Duplicate definition within one binding form.
    E0306,
}

impl ErrorCode {
    /// The code as it appears in output, e.g. `"E0301"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0301 => "E0301",
            ErrorCode::E0302 => "E0302",
            ErrorCode::E0303 => "E0303",
            ErrorCode::E0304 => "E0304",
            ErrorCode::E0305 => "E0305",
            ErrorCode::E0306 => "E0306",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
