//! Run-level error type.
//!
//! All fatal paths in the pipeline converge here: each error carries a kind
//! (which fixes the process exit code) and a human-actionable message that is
//! printed exactly once, by `main`. The only non-fatal failure in the whole
//! program is the CPI lookup, which degrades to a sentinel instead of
//! constructing an `AppError` (see `data::cpi`).

/// Failure category for a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing/extra/malformed source files or columns.
    DataSource,
    /// The two series do not start and end on the same dates.
    DateRangeMismatch,
    /// The overlapping window spans less than one year.
    InsufficientHistory,
    /// Failed to write an export file.
    Export,
    /// Zero/missing price or zero total invested reached the simulator.
    DivisionByZero,
    /// The regression solve could not converge (degenerate input).
    NumericInstability,
}

impl ErrorKind {
    /// Process exit code for this kind.
    ///
    /// Input/configuration problems exit 2, numeric degeneracy in otherwise
    /// valid data exits 3 or 4 so scripts can tell the two apart.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::DataSource
            | ErrorKind::DateRangeMismatch
            | ErrorKind::InsufficientHistory
            | ErrorKind::Export => 2,
            ErrorKind::DivisionByZero => 3,
            ErrorKind::NumericInstability => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_kind() {
        assert_eq!(ErrorKind::DataSource.exit_code(), 2);
        assert_eq!(ErrorKind::DateRangeMismatch.exit_code(), 2);
        assert_eq!(ErrorKind::DivisionByZero.exit_code(), 3);
        assert_eq!(ErrorKind::NumericInstability.exit_code(), 4);
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::new(ErrorKind::DataSource, "no matching file for 'btc'");
        assert_eq!(format!("{err}"), "error: no matching file for 'btc'");
    }
}
