// crates/lmap-rs/src/model.rs

//! Internal `serde` data structures that map directly to the xlmap XML schema.
//! These are used for raw deserialization and serialization.

#![allow(clippy::pedantic)] // XML schema names are not idiomatic Rust

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// The root element of an xlmap file.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename = "logicalNameMap")]
pub struct LogicalNameMap {
    /// Modules and entries in document order.
    #[serde(rename = "$value", default)]
    pub children: Vec<Element>,
}

/// A child of `<logicalNameMap>` or `<module>`, dispatched by tag name.
#[derive(Debug, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "module")]
    Module(Module),
    #[serde(rename = "redirectedRegister")]
    RedirectedRegister(RedirectedRegister),
    #[serde(rename = "redirectedChannel")]
    RedirectedChannel(RedirectedChannel),
    #[serde(rename = "constant")]
    Constant(IntegerValue),
    #[serde(rename = "variable")]
    Variable(IntegerValue),
}

/// `<module name="...">` wrapping further modules and entries.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Module {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "$value", default)]
    pub children: Vec<Element>,
}

/// `<redirectedRegister name="...">`
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RedirectedRegister {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "targetDevice")]
    pub target_device: String,

    #[serde(rename = "targetRegister")]
    pub target_register: String,

    /// First element of the target register to map. Absent means "from the start".
    #[serde(
        rename = "targetStartIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_start_index: Option<u32>,

    /// Number of elements to map. Absent means "all remaining".
    #[serde(
        rename = "numberOfElements",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub number_of_elements: Option<u32>,
}

/// `<redirectedChannel name="...">`
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct RedirectedChannel {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "targetDevice")]
    pub target_device: String,

    #[serde(rename = "targetRegister")]
    pub target_register: String,

    #[serde(rename = "targetChannel")]
    pub target_channel: u32,
}

/// `<constant name="...">` and `<variable name="...">` share this layout.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct IntegerValue {
    #[serde(rename = "@name")]
    pub name: String,

    #[serde(rename = "value")]
    pub value: i32,

    /// The value type tag, e.g. "integer".
    #[serde(rename = "type")]
    pub value_type: String,
}
