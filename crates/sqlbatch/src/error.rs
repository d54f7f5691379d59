//! The failure taxonomy for a `process` call.

use alloc::string::String;
use core::{error::Error, fmt};

use thiserror::Error;

/// Identifies a preprocessor directive in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// The `:r` file-inclusion directive.
    Include,
    /// The `:setvar` variable-definition directive.
    Setvar,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Include => ":r",
            Self::Setvar => ":setvar",
        })
    }
}

/// An error aborting the in-progress batch sequence.
///
/// All failures are fatal to the current [`process`] call: batches already
/// yielded remain valid, no partial batch is yielded, and the iterator is
/// fused afterwards. `E` is the error type of the [`ScriptLoader`] in use.
///
/// [`process`]: crate::Preprocessor::process
/// [`ScriptLoader`]: crate::ScriptLoader
#[derive(Error, Debug, PartialEq)]
pub enum PreprocessError<E: Error + 'static> {
    /// A `$(name)` reference named a variable absent from the table.
    #[error("variable \"{name}\" is not defined")]
    UndefinedVariable {
        /// The referenced name, verbatim from the script.
        name: String,
    },
    /// A directive line was recognized but its arguments did not parse.
    #[error("{directive} directive is missing or has malformed arguments")]
    DirectiveSyntax {
        /// Which directive failed.
        directive: DirectiveKind,
    },
    /// The text-loading collaborator failed to produce an include target.
    #[error("failed to include \"{path}\"")]
    Include {
        /// The path as written in the `:r` directive.
        path: String,
        /// The loader's error, surfaced as-is.
        #[source]
        source: E,
    },
}
