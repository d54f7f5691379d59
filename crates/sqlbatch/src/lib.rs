//! A single-pass, zero-copy preprocessor for the `GO` / `$(name)` / `:r` /
//! `:setvar` SQL scripting dialect.
//!
//! A script is expanded into a lazy sequence of executable batches. The
//! scanner walks the input once, recognizing comments, quoted strings and
//! identifiers, variable references, directives, and `GO` batch separators,
//! and decides per batch whether it can be yielded as a borrowed slice of
//! the input or must be materialized through a reusable scratch buffer.
//!
//! ```
//! use sqlbatch::{Preprocessor, PreprocessorOptions};
//!
//! let mut pre = Preprocessor::new(PreprocessorOptions::default());
//! pre.variables_mut().set("Schema", "dbo");
//!
//! let script = "SELECT * FROM $(Schema).Users;\nGO\nSELECT 1;\n";
//! let batches: Vec<_> = pre
//!     .process(script)
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(batches, ["SELECT * FROM dbo.Users;\n", "SELECT 1;\n"]);
//! ```
//!
//! `GO` must stand alone on its line; `GO` inside comments, strings, or
//! bracketed identifiers never splits a batch. `:r <path>` splices another
//! script in place through a [`ScriptLoader`], and `:setvar name value`
//! defines variables for later `$(name)` references.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod directive;
mod error;
mod loader;
mod matcher;
mod options;
mod preprocessor;
mod scratch;
mod variables;

#[cfg(test)]
mod tests;

pub use error::{DirectiveKind, PreprocessError};
pub use loader::ScriptLoader;
#[cfg(feature = "std")]
pub use loader::{Encoding, FileLoader, LoadError};
pub use options::PreprocessorOptions;
pub use preprocessor::{Batches, Preprocessor};
pub use variables::VariableTable;
