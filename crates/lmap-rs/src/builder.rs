// crates/lmap-rs/src/builder.rs

use crate::error::LmapError;
use crate::map::LogicalNameMap;
use crate::model;
use crate::types::{INTEGER_VALUE_TYPE, Node, Target};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use log::trace;
use serde::Serialize;

/// Output settings for [`save_lmap_to_string_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    /// Character used for indentation.
    pub indent_char: char,
    /// Indentation characters per nesting level. `0` writes everything on one line.
    pub indent_size: usize,
    /// Whether to start the output with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub xml_declaration: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_size: 2,
            xml_declaration: false,
        }
    }
}

/// Serializes a `LogicalNameMap` into an xlmap XML `String` with default options.
///
/// # Errors
/// Returns an `LmapError` if serialization fails.
pub fn save_lmap_to_string(map: &LogicalNameMap) -> Result<String, LmapError> {
    save_lmap_to_string_with(map, &SaveOptions::default())
}

/// Serializes a `LogicalNameMap` into an xlmap XML `String`.
///
/// Modules become `<module name="...">` elements and entries become elements
/// named after their target type, holding exactly the fields of that type.
/// Unset optional fields are left out. Indentation only goes between elements,
/// never into a field's text.
pub fn save_lmap_to_string_with(
    map: &LogicalNameMap,
    options: &SaveOptions,
) -> Result<String, LmapError> {
    // 1. Convert to the schema model.
    let root = model::LogicalNameMap {
        children: build_children(&map.root().children),
    };

    // 2. Serialize
    let mut buffer = String::new();
    if options.xml_declaration {
        buffer.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        if options.indent_size > 0 {
            buffer.push('\n');
        }
    }

    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    if options.indent_size > 0 {
        serializer.indent(options.indent_char, options.indent_size);
    }
    root.serialize(serializer)?;

    if options.indent_size > 0 {
        writeln!(&mut buffer)?;
    }
    trace!("Serialized logical name map ({} bytes)", buffer.len());
    Ok(buffer)
}

fn build_children(children: &[Node]) -> Vec<model::Element> {
    children.iter().map(build_element).collect()
}

fn build_element(node: &Node) -> model::Element {
    let entry = match node {
        Node::Module(m) => {
            return model::Element::Module(model::Module {
                name: m.name.clone(),
                children: build_children(&m.children),
            });
        }
        Node::Entry(entry) => entry,
    };

    let name = entry.name.clone();
    match &entry.target {
        Target::RedirectedRegister {
            target_device,
            target_register,
            target_start_index,
            number_of_elements,
        } => model::Element::RedirectedRegister(model::RedirectedRegister {
            name,
            target_device: target_device.clone(),
            target_register: target_register.clone(),
            target_start_index: *target_start_index,
            number_of_elements: *number_of_elements,
        }),
        Target::RedirectedChannel {
            target_device,
            target_register,
            target_channel,
        } => model::Element::RedirectedChannel(model::RedirectedChannel {
            name,
            target_device: target_device.clone(),
            target_register: target_register.clone(),
            target_channel: *target_channel,
        }),
        Target::Constant { value } => model::Element::Constant(integer_value(name, *value)),
        Target::Variable { value } => model::Element::Variable(integer_value(name, *value)),
    }
}

fn integer_value(name: String, value: i32) -> model::IntegerValue {
    model::IntegerValue {
        name,
        value,
        value_type: INTEGER_VALUE_TYPE.into(),
    }
}
