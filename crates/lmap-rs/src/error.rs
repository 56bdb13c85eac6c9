// crates/lmap-rs/src/error.rs

use crate::map::MAX_DEPTH;
use crate::path::RegisterPath;
use crate::types::{Field, TargetType};
use alloc::fmt;
use alloc::string::String;
use core::str::Utf8Error;
use quick_xml::Error as XmlError;
use quick_xml::errors::serialize::DeError;
use quick_xml::errors::serialize::SeError;

/// Errors that can occur while editing, parsing or serializing a logical name map.
///
/// Every operation that returns one of these leaves the map unchanged.
#[derive(Debug)]
pub enum LmapError {
    /// A sibling with the same name already exists under `parent`.
    NameConflict { parent: RegisterPath, name: String },

    /// A name is empty or contains the path separator.
    InvalidName { name: String },

    /// The field does not apply to the entry's current target type.
    InvalidField {
        field: Field,
        target_type: TargetType,
    },

    /// The value is of the wrong kind for the field (e.g. text for `targetChannel`).
    InvalidValue { field: Field },

    /// A field name that is not part of the format.
    UnknownField { name: String },

    /// A node cannot be moved into itself or one of its descendants.
    CycleError {
        node: RegisterPath,
        new_parent: RegisterPath,
    },

    /// The edit would nest modules deeper than [`MAX_DEPTH`] at `path`.
    TooDeep { path: RegisterPath },

    /// No node exists at the given path.
    NodeNotFound { path: RegisterPath },

    /// The path names an entry where a module is required.
    NotAModule { path: RegisterPath },

    /// The path names a module where an entry is required.
    NotAnEntry { path: RegisterPath },

    /// An element tag that is neither `module` nor a known target type.
    UnknownTargetType { tag: String },

    /// The input is not a well-formed logical name map.
    MalformedDocument(Malformed),

    /// An error from the underlying `quick-xml` serializer.
    XmlSerializing(SeError),

    /// An error occurred during string formatting.
    FmtError(fmt::Error),

    /// `save()` was called on a session that has never been given a file path.
    NoFilePath,

    /// Reading or writing the map file failed.
    #[cfg(feature = "std")]
    Io(std::io::Error),
}

/// The reason a document was rejected as malformed.
#[derive(Debug)]
pub enum Malformed {
    /// The XML itself is not well-formed (mismatched tags, bad syntax, ...).
    Syntax(XmlError),

    /// The XML is well-formed but does not fit the schema
    /// (missing `name` attribute, missing mandatory field, non-numeric value, ...).
    Schema(DeError),

    /// The input bytes are not valid UTF-8.
    Encoding(Utf8Error),

    /// The input contains no root element.
    MissingRoot,

    /// The root element is not `logicalNameMap`.
    UnexpectedRoot { tag: String },

    /// A second element follows the closed root element.
    TrailingElement { tag: String },

    /// The input ended inside an open element.
    UnexpectedEof,

    /// A constant or variable declares a value type other than `integer`.
    UnsupportedValueType { name: String, value_type: String },

    /// Modules or elements are nested deeper than [`MAX_DEPTH`] allows.
    TooDeep,
}

impl From<Malformed> for LmapError {
    fn from(m: Malformed) -> Self {
        LmapError::MalformedDocument(m)
    }
}

impl From<DeError> for LmapError {
    fn from(e: DeError) -> Self {
        LmapError::MalformedDocument(Malformed::Schema(e))
    }
}

impl From<XmlError> for LmapError {
    fn from(e: XmlError) -> Self {
        LmapError::MalformedDocument(Malformed::Syntax(e))
    }
}

impl From<Utf8Error> for LmapError {
    fn from(e: Utf8Error) -> Self {
        LmapError::MalformedDocument(Malformed::Encoding(e))
    }
}

impl From<SeError> for LmapError {
    fn from(e: SeError) -> Self {
        LmapError::XmlSerializing(e)
    }
}

impl From<fmt::Error> for LmapError {
    fn from(e: fmt::Error) -> Self {
        LmapError::FmtError(e)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for LmapError {
    fn from(e: std::io::Error) -> Self {
        LmapError::Io(e)
    }
}

impl fmt::Display for LmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LmapError::NameConflict { parent, name } => {
                write!(f, "A node named '{}' already exists in {}", name, parent)
            }
            LmapError::InvalidName { name } => write!(f, "Invalid node name: '{}'", name),
            LmapError::InvalidField { field, target_type } => write!(
                f,
                "Field '{}' does not apply to target type '{}'",
                field, target_type
            ),
            LmapError::InvalidValue { field } => {
                write!(f, "Invalid value for field '{}'", field)
            }
            LmapError::UnknownField { name } => write!(f, "Unknown field: '{}'", name),
            LmapError::CycleError { node, new_parent } => write!(
                f,
                "Cannot move {} into {}: the target lies inside the moved node",
                node, new_parent
            ),
            LmapError::TooDeep { path } => write!(
                f,
                "Cannot place a module at {}: modules may be nested at most {} levels deep",
                path, MAX_DEPTH
            ),
            LmapError::NodeNotFound { path } => write!(f, "No node at {}", path),
            LmapError::NotAModule { path } => write!(f, "{} is not a module", path),
            LmapError::NotAnEntry { path } => write!(f, "{} is not an entry", path),
            LmapError::UnknownTargetType { tag } => {
                write!(f, "Unknown logical register type: '{}'", tag)
            }
            LmapError::MalformedDocument(m) => write!(f, "Malformed document: {}", m),
            LmapError::XmlSerializing(e) => write!(f, "XML serializing error: {}", e),
            LmapError::FmtError(e) => write!(f, "Formatting error: {}", e),
            LmapError::NoFilePath => write!(f, "No file name has been chosen yet"),
            #[cfg(feature = "std")]
            LmapError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformed::Syntax(e) => write!(f, "XML syntax error: {}", e),
            Malformed::Schema(e) => write!(f, "{}", e),
            Malformed::Encoding(e) => write!(f, "input is not UTF-8: {}", e),
            Malformed::MissingRoot => write!(f, "no root element"),
            Malformed::UnexpectedRoot { tag } => {
                write!(f, "expected 'logicalNameMap' tag instead of: {}", tag)
            }
            Malformed::TrailingElement { tag } => {
                write!(f, "element '{}' after the end of the root element", tag)
            }
            Malformed::UnexpectedEof => write!(f, "unexpected end of input"),
            Malformed::TooDeep => {
                write!(f, "modules are nested more than {} levels deep", MAX_DEPTH)
            }
            Malformed::UnsupportedValueType { name, value_type } => write!(
                f,
                "type '{}' of '{}' is not supported, only 'integer' is",
                value_type, name
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LmapError {}
