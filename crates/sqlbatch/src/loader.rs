//! The text-loading collaborator consulted by the `:r` directive.

use alloc::string::String;
use core::error::Error;

/// Supplies decoded script text for `:r` include targets.
///
/// The scanner hands the path exactly as written in the directive and splices
/// the returned text into the in-progress scan. Recursive inclusion is not
/// cycle-detected by the scanner; bounding runaway recursion is the loader's
/// concern.
pub trait ScriptLoader {
    /// Error returned when a target cannot be loaded or decoded.
    type Error: Error + 'static;

    /// Returns the decoded contents of `path`.
    fn load(&mut self, path: &str) -> Result<String, Self::Error>;
}

#[cfg(feature = "std")]
mod fs {
    use std::string::ToString;

    use thiserror::Error;

    use super::ScriptLoader;
    use alloc::string::String;

    /// Text encodings supported by [`FileLoader`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum Encoding {
        /// Strict UTF-8; invalid sequences are rejected and a leading
        /// byte-order mark is treated as content. This is the default.
        #[default]
        Utf8,
        /// Strict UTF-8 with one leading U+FEFF stripped when present.
        Utf8Bom,
        /// Little-endian UTF-16; a leading BOM is stripped, unpaired
        /// surrogates are rejected.
        Utf16Le,
        /// Big-endian UTF-16; a leading BOM is stripped, unpaired surrogates
        /// are rejected.
        Utf16Be,
    }

    /// Failure to read or decode an include target.
    #[derive(Error, Debug)]
    pub enum LoadError {
        /// The file could not be read.
        #[error(transparent)]
        Io(#[from] std::io::Error),
        /// The file's bytes are not valid in the configured encoding.
        #[error("\"{path}\" is not valid {encoding:?}")]
        Decode {
            /// The path that failed to decode.
            path: String,
            /// The encoding that rejected it.
            encoding: Encoding,
        },
    }

    /// A [`ScriptLoader`] reading include targets from the filesystem.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FileLoader {
        /// Encoding used to decode loaded files.
        pub encoding: Encoding,
    }

    impl FileLoader {
        /// Creates a loader decoding files with `encoding`.
        #[must_use]
        pub fn new(encoding: Encoding) -> Self {
            Self { encoding }
        }
    }

    impl ScriptLoader for FileLoader {
        type Error = LoadError;

        fn load(&mut self, path: &str) -> Result<String, LoadError> {
            let bytes = std::fs::read(path)?;
            decode(&bytes, self.encoding).ok_or_else(|| LoadError::Decode {
                path: path.to_string(),
                encoding: self.encoding,
            })
        }
    }

    fn decode(bytes: &[u8], encoding: Encoding) -> Option<String> {
        match encoding {
            Encoding::Utf8 => core::str::from_utf8(bytes).ok().map(String::from),
            Encoding::Utf8Bom => {
                let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
                core::str::from_utf8(bytes).ok().map(String::from)
            }
            Encoding::Utf16Le => decode_utf16(bytes, [0xFF, 0xFE], u16::from_le_bytes),
            Encoding::Utf16Be => decode_utf16(bytes, [0xFE, 0xFF], u16::from_be_bytes),
        }
    }

    fn decode_utf16(bytes: &[u8], bom: [u8; 2], read: fn([u8; 2]) -> u16) -> Option<String> {
        let bytes = bytes.strip_prefix(&bom).unwrap_or(bytes);
        if bytes.len() % 2 != 0 {
            return None;
        }
        let units: alloc::vec::Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| read([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    }

}

#[cfg(feature = "std")]
pub use fs::{Encoding, FileLoader, LoadError};
