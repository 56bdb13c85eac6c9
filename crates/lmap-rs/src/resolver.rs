// crates/lmap-rs/src/resolver.rs

//! Maps the deserialized `model` onto the public document types, enforcing the
//! naming rules and value-type constraints the schema structs cannot express.

use crate::error::{LmapError, Malformed};
use crate::map::{self, LogicalNameMap};
use crate::model;
use crate::path::RegisterPath;
use crate::types::{Entry, INTEGER_VALUE_TYPE, Module, Node, Target};
use alloc::string::String;
use alloc::vec::Vec;
use log::trace;

/// Resolves the final `LogicalNameMap` from the raw deserialized root element.
pub(crate) fn resolve_map(raw: model::LogicalNameMap) -> Result<LogicalNameMap, LmapError> {
    let root_path = RegisterPath::root();
    let children = resolve_children(raw.children, &root_path)?;
    Ok(LogicalNameMap::from_root(Module {
        name: String::new(),
        children,
    }))
}

/// Resolves the children of one container, rejecting duplicate sibling names.
fn resolve_children(
    elements: Vec<model::Element>,
    parent: &RegisterPath,
) -> Result<Vec<Node>, LmapError> {
    let mut children: Vec<Node> = Vec::with_capacity(elements.len());
    for element in elements {
        let node = resolve_element(element, parent)?;
        map::validate_name(node.name())?;
        if children.iter().any(|c| c.name() == node.name()) {
            return Err(LmapError::NameConflict {
                parent: parent.clone(),
                name: node.name().into(),
            });
        }
        children.push(node);
    }
    Ok(children)
}

fn resolve_element(element: model::Element, parent: &RegisterPath) -> Result<Node, LmapError> {
    let node = match element {
        model::Element::Module(m) => {
            let path = parent.join(&m.name);
            trace!("Resolving module {}", path);
            let children = resolve_children(m.children, &path)?;
            Node::Module(Module {
                name: m.name,
                children,
            })
        }
        model::Element::RedirectedRegister(r) => Node::Entry(Entry {
            name: r.name,
            target: Target::RedirectedRegister {
                target_device: r.target_device,
                target_register: r.target_register,
                target_start_index: r.target_start_index,
                number_of_elements: r.number_of_elements,
            },
        }),
        model::Element::RedirectedChannel(c) => Node::Entry(Entry {
            name: c.name,
            target: Target::RedirectedChannel {
                target_device: c.target_device,
                target_register: c.target_register,
                target_channel: c.target_channel,
            },
        }),
        model::Element::Constant(v) => {
            let value = integer_value(&v)?;
            Node::Entry(Entry {
                name: v.name,
                target: Target::Constant { value },
            })
        }
        model::Element::Variable(v) => {
            let value = integer_value(&v)?;
            Node::Entry(Entry {
                name: v.name,
                target: Target::Variable { value },
            })
        }
    };
    Ok(node)
}

/// Only integer constants and variables are supported.
fn integer_value(v: &model::IntegerValue) -> Result<i32, LmapError> {
    if v.value_type.trim() != INTEGER_VALUE_TYPE {
        return Err(Malformed::UnsupportedValueType {
            name: v.name.clone(),
            value_type: v.value_type.clone(),
        }
        .into());
    }
    Ok(v.value)
}
