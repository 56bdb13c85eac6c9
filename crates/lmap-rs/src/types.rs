// crates/lmap-rs/src/types.rs

//! Public, ergonomic data structures for the nodes of a logical name map.

use crate::error::LmapError;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

/// The value type tag written next to the value of constants and variables.
/// It is the only one the format supports.
pub const INTEGER_VALUE_TYPE: &str = "integer";

// --- Target Types ---

/// The kind of an [`Entry`]. The XML tag of an entry element is its target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetType {
    /// `<redirectedRegister>`: forwards to a (range of a) register of a target device.
    RedirectedRegister,
    /// `<redirectedChannel>`: forwards to one channel of a 2D register.
    RedirectedChannel,
    /// `<constant>`: a fixed integer.
    Constant,
    /// `<variable>`: an integer held by the map itself.
    Variable,
}

impl TargetType {
    pub const ALL: [TargetType; 4] = [
        TargetType::RedirectedRegister,
        TargetType::RedirectedChannel,
        TargetType::Constant,
        TargetType::Variable,
    ];

    /// The XML tag name of this target type.
    pub fn tag(self) -> &'static str {
        match self {
            TargetType::RedirectedRegister => "redirectedRegister",
            TargetType::RedirectedChannel => "redirectedChannel",
            TargetType::Constant => "constant",
            TargetType::Variable => "variable",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// The fields an entry of this type carries, in document order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            TargetType::RedirectedRegister => &[
                Field::TargetDevice,
                Field::TargetRegister,
                Field::TargetStartIndex,
                Field::NumberOfElements,
            ],
            TargetType::RedirectedChannel => &[
                Field::TargetDevice,
                Field::TargetRegister,
                Field::TargetChannel,
            ],
            TargetType::Constant | TargetType::Variable => &[Field::Value],
        }
    }

    pub fn has_field(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for TargetType {
    type Err = LmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| LmapError::UnknownTargetType { tag: s.into() })
    }
}

// --- Fields ---

/// A type-specific field of an entry, named after its XML element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// `<targetDevice>`
    TargetDevice,
    /// `<targetRegister>`
    TargetRegister,
    /// `<targetStartIndex>` (optional)
    TargetStartIndex,
    /// `<numberOfElements>` (optional)
    NumberOfElements,
    /// `<targetChannel>`
    TargetChannel,
    /// `<value>`
    Value,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::TargetDevice,
        Field::TargetRegister,
        Field::TargetStartIndex,
        Field::NumberOfElements,
        Field::TargetChannel,
        Field::Value,
    ];

    /// The XML element name of this field.
    pub fn tag(self) -> &'static str {
        match self {
            Field::TargetDevice => "targetDevice",
            Field::TargetRegister => "targetRegister",
            Field::TargetStartIndex => "targetStartIndex",
            Field::NumberOfElements => "numberOfElements",
            Field::TargetChannel => "targetChannel",
            Field::Value => "value",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Optional fields may be unset; they are then omitted from the XML.
    pub fn is_optional(self) -> bool {
        matches!(self, Field::TargetStartIndex | Field::NumberOfElements)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Field {
    type Err = LmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| LmapError::UnknownField { name: s.into() })
    }
}

/// A value read from or written to a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// `targetDevice`, `targetRegister`
    Text(String),
    /// `targetStartIndex`, `numberOfElements`, `targetChannel`
    Unsigned(u32),
    /// `value`
    Integer(i32),
    /// An optional field without a value.
    Unset,
}

impl FieldValue {
    /// Parses user input for `field`, e.g. from a text box or a command line.
    ///
    /// The literal `unset` (or an empty string) clears optional fields.
    pub fn parse_for(field: Field, input: &str) -> Result<Self, LmapError> {
        let input = input.trim();
        let invalid = || LmapError::InvalidValue { field };
        match field {
            Field::TargetDevice | Field::TargetRegister => Ok(FieldValue::Text(input.into())),
            _ if field.is_optional() && (input.is_empty() || input == "unset") => {
                Ok(FieldValue::Unset)
            }
            Field::TargetStartIndex | Field::NumberOfElements | Field::TargetChannel => input
                .parse()
                .map(FieldValue::Unsigned)
                .map_err(|_| invalid()),
            Field::Value => input.parse().map(FieldValue::Integer).map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Unsigned(v) => write!(f, "{}", v),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Unset => f.write_str("unset"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.into())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Unsigned(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<Option<u32>> for FieldValue {
    fn from(v: Option<u32>) -> Self {
        v.map_or(FieldValue::Unset, FieldValue::Unsigned)
    }
}

// --- Targets ---

/// The type-dependent payload of an entry.
///
/// Each variant holds exactly the fields of its target type, so an entry can
/// never carry (or emit) fields belonging to another type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    RedirectedRegister {
        target_device: String,
        target_register: String,
        target_start_index: Option<u32>,
        number_of_elements: Option<u32>,
    },
    RedirectedChannel {
        target_device: String,
        target_register: String,
        target_channel: u32,
    },
    Constant {
        value: i32,
    },
    Variable {
        value: i32,
    },
}

impl Target {
    /// A target of the given type with all fields at their defaults
    /// (empty text, unset optionals, zero).
    pub fn new(target_type: TargetType) -> Self {
        match target_type {
            TargetType::RedirectedRegister => Target::RedirectedRegister {
                target_device: String::new(),
                target_register: String::new(),
                target_start_index: None,
                number_of_elements: None,
            },
            TargetType::RedirectedChannel => Target::RedirectedChannel {
                target_device: String::new(),
                target_register: String::new(),
                target_channel: 0,
            },
            TargetType::Constant => Target::Constant { value: 0 },
            TargetType::Variable => Target::Variable { value: 0 },
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            Target::RedirectedRegister { .. } => TargetType::RedirectedRegister,
            Target::RedirectedChannel { .. } => TargetType::RedirectedChannel,
            Target::Constant { .. } => TargetType::Constant,
            Target::Variable { .. } => TargetType::Variable,
        }
    }

    /// The device alias this target forwards to, if it forwards at all.
    pub fn target_device(&self) -> Option<&str> {
        match self {
            Target::RedirectedRegister { target_device, .. }
            | Target::RedirectedChannel { target_device, .. } => Some(target_device),
            Target::Constant { .. } | Target::Variable { .. } => None,
        }
    }

    /// Reads a field. Returns `None` if the field does not apply to this target type.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        let value = match (self, field) {
            (
                Target::RedirectedRegister { target_device, .. }
                | Target::RedirectedChannel { target_device, .. },
                Field::TargetDevice,
            ) => FieldValue::Text(target_device.clone()),
            (
                Target::RedirectedRegister {
                    target_register, ..
                }
                | Target::RedirectedChannel {
                    target_register, ..
                },
                Field::TargetRegister,
            ) => FieldValue::Text(target_register.clone()),
            (
                Target::RedirectedRegister {
                    target_start_index, ..
                },
                Field::TargetStartIndex,
            ) => FieldValue::from(*target_start_index),
            (
                Target::RedirectedRegister {
                    number_of_elements, ..
                },
                Field::NumberOfElements,
            ) => FieldValue::from(*number_of_elements),
            (Target::RedirectedChannel { target_channel, .. }, Field::TargetChannel) => {
                FieldValue::Unsigned(*target_channel)
            }
            (Target::Constant { value } | Target::Variable { value }, Field::Value) => {
                FieldValue::Integer(*value)
            }
            _ => return None,
        };
        Some(value)
    }

    /// All applicable fields with their current values, in document order.
    pub fn fields(&self) -> Vec<(Field, FieldValue)> {
        self.target_type()
            .fields()
            .iter()
            .filter_map(|&field| self.get(field).map(|value| (field, value)))
            .collect()
    }

    /// Writes a single field.
    ///
    /// Fails with `InvalidField` if the field does not apply to this target type
    /// and with `InvalidValue` if `value` is of the wrong kind for the field.
    /// The target is left untouched on failure.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), LmapError> {
        let target_type = self.target_type();
        if !target_type.has_field(field) {
            return Err(LmapError::InvalidField { field, target_type });
        }
        let invalid = LmapError::InvalidValue { field };

        match (self, field, value) {
            (
                Target::RedirectedRegister { target_device, .. }
                | Target::RedirectedChannel { target_device, .. },
                Field::TargetDevice,
                FieldValue::Text(text),
            ) => *target_device = text,
            (
                Target::RedirectedRegister {
                    target_register, ..
                }
                | Target::RedirectedChannel {
                    target_register, ..
                },
                Field::TargetRegister,
                FieldValue::Text(text),
            ) => *target_register = text,
            (
                Target::RedirectedRegister {
                    target_start_index, ..
                },
                Field::TargetStartIndex,
                value,
            ) => *target_start_index = optional_unsigned(value).ok_or(invalid)?,
            (
                Target::RedirectedRegister {
                    number_of_elements, ..
                },
                Field::NumberOfElements,
                value,
            ) => *number_of_elements = optional_unsigned(value).ok_or(invalid)?,
            (
                Target::RedirectedChannel { target_channel, .. },
                Field::TargetChannel,
                FieldValue::Unsigned(v),
            ) => *target_channel = v,
            (
                Target::Constant { value } | Target::Variable { value },
                Field::Value,
                FieldValue::Integer(v),
            ) => *value = v,
            _ => return Err(invalid),
        }
        Ok(())
    }
}

/// `Some(None)` for unset, `Some(Some(v))` for a value, `None` for a wrong kind.
fn optional_unsigned(value: FieldValue) -> Option<Option<u32>> {
    match value {
        FieldValue::Unset => Some(None),
        FieldValue::Unsigned(v) => Some(Some(v)),
        _ => None,
    }
}

// --- Nodes ---

/// A leaf of the map: a named target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub target: Target,
}

impl Entry {
    /// A new entry with default fields for `target_type`.
    pub fn new(name: impl Into<String>, target_type: TargetType) -> Self {
        Self {
            name: name.into(),
            target: Target::new(target_type),
        }
    }

    pub fn target_type(&self) -> TargetType {
        self.target.target_type()
    }
}

/// A named group of entries and sub-modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    /// Children in document order.
    pub children: Vec<Node>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|n| n.name() == name)
    }

    /// Index of the child called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|n| n.name() == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Either kind of node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Module(Module),
    Entry(Entry),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Module(m) => &m.name,
            Node::Entry(e) => &e.name,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Node::Module(m) => m.name = name,
            Node::Entry(e) => e.name = name,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Node::Module(m) => Some(m),
            Node::Entry(_) => None,
        }
    }

    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Node::Entry(e) => Some(e),
            Node::Module(_) => None,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Node::Module(_))
    }
}

impl From<Module> for Node {
    fn from(m: Module) -> Self {
        Node::Module(m)
    }
}

impl From<Entry> for Node {
    fn from(e: Entry) -> Self {
        Node::Entry(e)
    }
}
