// crates/lmap-rs/src/path.rs

//! Addressing of nodes inside a logical name map.

use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

/// Separator between the segments of a [`RegisterPath`].
pub const SEPARATOR: char = '/';

/// The location of a node, as the sequence of names leading to it from the root.
///
/// Sibling names are unique, so a path identifies at most one node. The empty
/// path is the (unnamed) root module and is displayed as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterPath {
    segments: Vec<String>,
}

impl RegisterPath {
    /// The path of the root module.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, i.e. the node's own name. `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The path of the enclosing module. `None` for the root.
    pub fn parent(&self) -> Option<RegisterPath> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Returns a new path with `name` appended.
    pub fn join(&self, name: &str) -> RegisterPath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// `true` if `self` equals `ancestor` or lies below it.
    pub fn starts_with(&self, ancestor: &RegisterPath) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }
}

impl fmt::Display for RegisterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{}", SEPARATOR);
        }
        for segment in &self.segments {
            write!(f, "{}{}", SEPARATOR, segment)?;
        }
        Ok(())
    }
}

/// Parses `/M1/R1`, `M1/R1` and `/` alike. Empty segments are skipped.
impl FromStr for RegisterPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for RegisterPath {
    fn from(s: &str) -> Self {
        Self {
            segments: s
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for RegisterPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}
