//! Error types that can be emitted from this library

use std::path::PathBuf;

use derive_more::Display;
use miette::Diagnostic;
use thiserror::Error;

use crate::read::FileKind;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`std::string::FromUtf16Error`]
    #[error(transparent)]
    UTF16Error(#[from] std::string::FromUtf16Error),

    /// Wrapper for [`xmltree::ParseError`]
    #[error("metadata document is not valid markup: {0}")]
    InvalidMetadata(#[from] xmltree::ParseError),

    /// path does not carry the `.lif` extension
    #[error("{} is not a lif file", .0.display())]
    #[diagnostic(help("only single file containers with a `.lif` extension can be read"))]
    InvalidExtension(PathBuf),

    /// path names a leica file kind other than a lif container
    #[error("{} is a {kind}, not a lif file", .path.display())]
    UnsupportedVariant {
        /// The rejected path
        path: PathBuf,
        /// The kind of file the extension names
        kind: FileKind,
    },

    /// a structural marker does not hold its fixed value
    #[error("invalid {structure} identifier at offset {offset}: expected {expected:#04x}, found {found}")]
    InvalidMagic {
        /// The header that failed validation
        structure: &'static str,
        /// The value the header must hold
        expected: u32,
        /// Debug rendering of the value that was read
        found: String,
        /// Offset of the marker in the container
        offset: u64,
    },

    /// end of file reached before a structure could be fully read
    #[error("container is truncated at offset {offset}: {needed} more bytes expected")]
    Truncated {
        /// Offset at which the read started
        offset: u64,
        /// Number of bytes the structure needs from `offset`
        needed: u64,
    },

    /// unable to find requested block
    #[error("unable to find requested block")]
    BlockNotFound(#[from] BlockNotFoundError),

    /// more than one block carries the identifier
    #[error("identifier {identifier} is shared by {matches} blocks")]
    AmbiguousIdentifier {
        /// The requested identifier
        identifier: String,
        /// How many blocks carry it
        matches: usize,
    },

    /// element lacks a required attribute
    #[error("<{element}> has no attribute {attribute}")]
    MissingAttribute {
        /// Tag name of the element
        element: String,
        /// Name of the missing attribute
        attribute: String,
    },

    /// attribute could not be parsed as the requested type
    #[error("<{element}> attribute {attribute}=\"{value}\" is not a valid {expected}")]
    InvalidAttribute {
        /// Tag name of the element
        element: String,
        /// Name of the attribute
        attribute: String,
        /// Raw attribute text
        value: String,
        /// Name of the requested type
        expected: &'static str,
    },
}

/// Error type to provide further information when a block has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested block")]
pub enum BlockNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by identifier {0}
    #[error("by identifier {0}")]
    Identifier(String),
}

/// Broad category of an [`Error`]
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a valid instance of the container format
    #[display("format")]
    Format,
    /// The container ended before a structure was complete
    #[display("truncation")]
    Truncation,
    /// A requested block does not exist or is not unique
    #[display("lookup")]
    Lookup,
    /// Text or markup could not be decoded
    #[display("decode")]
    Decode,
    /// Any other I/O failure
    #[display("io")]
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidExtension(_)
            | Error::UnsupportedVariant { .. }
            | Error::InvalidMagic { .. } => ErrorKind::Format,
            Error::Truncated { .. } => ErrorKind::Truncation,
            Error::BlockNotFound(_) | Error::AmbiguousIdentifier { .. } => ErrorKind::Lookup,
            Error::UTF16Error(_)
            | Error::InvalidMetadata(_)
            | Error::MissingAttribute { .. }
            | Error::InvalidAttribute { .. } => ErrorKind::Decode,
            Error::IOError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                ErrorKind::Truncation
            }
            Error::IOError(_) => ErrorKind::Io,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
