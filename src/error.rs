use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised while building the model from a parsed XML tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A `property` node is missing its name or its value does not match its declared type.
    #[error("malformed property: {message}")]
    MalformedProperty {
        /// What went wrong.
        message: String,
        /// Underlying failure, if any.
        #[source]
        source: Option<Box<ParseError>>,
    },
    /// An `object` node is missing or has an unparsable `id`, `x` or `y`.
    #[error("malformed object: {message}")]
    MalformedObject {
        /// What went wrong.
        message: String,
        /// Underlying failure, if any.
        #[source]
        source: Option<Box<ParseError>>,
    },
    /// A layer or group is missing a required attribute or its tile data is invalid.
    #[error("malformed layer: {message}")]
    MalformedLayer {
        /// What went wrong.
        message: String,
        /// Underlying failure, if any.
        #[source]
        source: Option<Box<ParseError>>,
    },
    /// Tile data uses an encoding or compression this crate cannot decode.
    #[error("unsupported tile data encoding: {0}")]
    UnsupportedEncoding(String),
    /// A required attribute is absent.
    #[error("<{tag}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Element the attribute belongs to.
        tag: String,
        /// Attribute name.
        attribute: String,
    },
    /// A value is present but cannot be parsed as its required type.
    #[error("invalid value '{value}' for {what}")]
    InvalidNumberFormat {
        /// Where the value came from, e.g. `<layer> attribute 'width'`.
        what: String,
        /// The offending text.
        value: String,
    },
    /// Base64 tile payload could not be decoded.
    #[error("invalid base64 tile data")]
    Base64(#[from] base64::DecodeError),
    /// Compressed tile payload could not be inflated.
    #[error("failed to decompress tile data")]
    Decompress(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn property(message: impl Into<String>, source: Option<ParseError>) -> Self {
        ParseError::MalformedProperty {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub(crate) fn object(message: impl Into<String>, source: Option<ParseError>) -> Self {
        ParseError::MalformedObject {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub(crate) fn layer(message: impl Into<String>, source: Option<ParseError>) -> Self {
        ParseError::MalformedLayer {
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}

/// Kind of document a [`MapError::Parse`] was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    /// A `.tmx` map.
    Map,
    /// A `.tsx` tileset.
    Tileset,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Document::Map => write!(f, "map"),
            Document::Tileset => write!(f, "tileset"),
        }
    }
}

/// Error type returned by every document-level entry point.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("I/O error reading {}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// File extension does not match the expected document kind
    #[error("unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Text is not well-formed XML
    #[error("invalid XML")]
    Xml(#[from] roxmltree::Error),
    /// Root element is not the one the entry point expects
    #[error("expected a <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        /// `map` or `tileset`.
        expected: &'static str,
        /// Tag actually found.
        found: String,
    },
    /// XML is well-formed but does not describe a valid document
    #[error("unable to parse {document}, make sure the data represents a valid Tiled {document}")]
    Parse {
        /// What was being parsed.
        document: Document,
        /// First failure encountered.
        #[source]
        source: ParseError,
    },
}
