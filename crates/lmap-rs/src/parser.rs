// crates/lmap-rs/src/parser.rs

use crate::error::{LmapError, Malformed};
use crate::map::{LogicalNameMap, MAX_DEPTH};
use crate::model;
use crate::resolver;
use crate::types::TargetType;
use alloc::string::String;
use alloc::vec::Vec;
use log::trace;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Name of the root element of every logical name map.
pub const ROOT_TAG: &str = "logicalNameMap";

/// Name of the container element.
pub const MODULE_TAG: &str = "module";

/// Element nesting allowed in total, leaving room for entries and their
/// contents (e.g. `<plugin>` sections) below the deepest module.
const MAX_ELEMENT_DEPTH: usize = 2 * MAX_DEPTH;

/// Parses a logical name map (xlmap) from a string slice.
///
/// The root must be `<logicalNameMap>`; its children (and the children of every
/// `<module>`) are dispatched by tag name. Comments and the XML declaration
/// are ignored, as are unknown elements inside an entry (e.g. `<plugin>`).
///
/// # Errors
/// * `UnknownTargetType` for an element that is neither a module nor an entry.
/// * `MalformedDocument` for syntax errors, a wrong root, missing names or
///   fields, values that are not numbers, a value type other than `integer`,
///   or modules nested deeper than [`MAX_DEPTH`].
/// * `NameConflict` / `InvalidName` if the file violates the naming rules.
///
/// No partial map is returned on failure.
pub fn load_lmap_from_str(xml_content: &str) -> Result<LogicalNameMap, LmapError> {
    // 1. Check the element structure and dispatch tag names.
    scan_structure(xml_content)?;

    // 2. Deserialize into the raw schema model.
    let raw: model::LogicalNameMap = quick_xml::de::from_str(xml_content)?;
    trace!("Deserialized {} top-level elements", raw.children.len());

    // 3. Resolve into the public document model.
    resolver::resolve_map(raw)
}

/// Parses a logical name map from raw bytes, which must be UTF-8.
pub fn load_lmap_from_slice(bytes: &[u8]) -> Result<LogicalNameMap, LmapError> {
    let text = core::str::from_utf8(bytes)?;
    load_lmap_from_str(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// What an open element on the scan stack may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// `<logicalNameMap>` or `<module>`: children must be modules or entries.
    Container,
    /// An entry or anything inside it: children are not dispatched.
    Leaf,
}

/// Walks the raw event stream once, before deserialization, so that errors can
/// name the offending tag instead of surfacing as generic schema errors.
fn scan_structure(xml_content: &str) -> Result<(), LmapError> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Scope> = Vec::new();
    // Open `<module>` elements, not counting the root.
    let mut modules = 0usize;
    let mut root_closed = false;

    loop {
        let (tag, is_empty) = match reader.read_event()? {
            Event::Start(e) => (tag_name(e.name().as_ref()), false),
            Event::Empty(e) => (tag_name(e.name().as_ref()), true),
            Event::End(_) => {
                if stack.pop() == Some(Scope::Container) && !stack.is_empty() {
                    modules -= 1;
                }
                root_closed = stack.is_empty();
                continue;
            }
            Event::Eof => break,
            // Text, comments, CDATA, declaration, processing instructions, doctype.
            _ => continue,
        };

        let scope = match stack.last() {
            None if root_closed => {
                return Err(Malformed::TrailingElement { tag }.into());
            }
            None if tag == ROOT_TAG => Scope::Container,
            None => return Err(Malformed::UnexpectedRoot { tag }.into()),
            Some(Scope::Container) => dispatch(&tag)?,
            Some(Scope::Leaf) => Scope::Leaf,
        };

        let is_module = scope == Scope::Container && !stack.is_empty();
        if stack.len() >= MAX_ELEMENT_DEPTH || (is_module && modules >= MAX_DEPTH) {
            return Err(Malformed::TooDeep.into());
        }

        if is_empty {
            root_closed = stack.is_empty();
        } else {
            stack.push(scope);
            if is_module {
                modules += 1;
            }
        }
    }

    if !stack.is_empty() {
        return Err(Malformed::UnexpectedEof.into());
    }
    if !root_closed {
        return Err(Malformed::MissingRoot.into());
    }
    Ok(())
}

/// Classifies a child of a container by its tag name.
fn dispatch(tag: &str) -> Result<Scope, LmapError> {
    if tag == MODULE_TAG {
        return Ok(Scope::Container);
    }
    match TargetType::from_tag(tag) {
        Some(_) => Ok(Scope::Leaf),
        None => Err(LmapError::UnknownTargetType { tag: String::from(tag) }),
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
