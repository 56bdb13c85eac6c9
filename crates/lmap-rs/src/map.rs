// crates/lmap-rs/src/map.rs

//! The logical name map document and its editing operations.

use crate::error::LmapError;
use crate::path::{RegisterPath, SEPARATOR};
use crate::types::{Entry, Field, FieldValue, Module, Node, Target, TargetType};
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::slice;
use log::{debug, warn};

/// Deepest allowed module nesting. Top-level modules are at depth 1.
/// Applies to parsed files as well as to edits.
pub const MAX_DEPTH: usize = 64;

/// An in-memory logical name map: the unnamed root module and everything below it.
///
/// All nodes are owned by their parent module, so the tree is acyclic by
/// construction. Nodes are addressed by [`RegisterPath`]. Every mutating
/// operation either applies completely or fails without changing the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalNameMap {
    root: Module,
}

impl LogicalNameMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already validated root module. Used by the resolver.
    pub(crate) fn from_root(root: Module) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Module {
        &self.root
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    // --- Queries ---

    /// Returns the node at `path`. The root is not a node; use [`Self::module`] for it.
    pub fn get(&self, path: &RegisterPath) -> Option<&Node> {
        let name = path.name()?;
        self.module(&path.parent()?)?.child(name)
    }

    /// Returns the module at `path`, including the root for the empty path.
    pub fn module(&self, path: &RegisterPath) -> Option<&Module> {
        self.resolve_module(path).ok()
    }

    /// Returns the entry at `path`.
    pub fn entry(&self, path: &RegisterPath) -> Option<&Entry> {
        self.get(path).and_then(Node::as_entry)
    }

    /// Iterates over every entry with its full path, depth-first in document order.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            stack: alloc::vec![(RegisterPath::root(), self.root.children.iter())],
        }
    }

    /// The set of device aliases referenced by redirected registers and channels.
    /// Entries whose device is still empty are skipped.
    pub fn target_devices(&self) -> BTreeSet<&str> {
        self.entries()
            .filter_map(|(_, entry)| entry.target.target_device())
            .filter(|device| !device.is_empty())
            .collect()
    }

    // --- Structural Operations ---

    /// Appends a new, empty module called `name` under `parent`.
    pub fn create_module(
        &mut self,
        parent: &RegisterPath,
        name: &str,
    ) -> Result<RegisterPath, LmapError> {
        self.append(parent, Node::Module(Module::new(name)))
            .inspect(|path| debug!("Created module {}", path))
            .inspect_err(|e| warn!("Cannot create module '{}': {}", name, e))
    }

    /// Appends a new entry called `name` under `parent`, with default fields
    /// for `target_type`.
    pub fn create_entry(
        &mut self,
        parent: &RegisterPath,
        name: &str,
        target_type: TargetType,
    ) -> Result<RegisterPath, LmapError> {
        self.append(parent, Node::Entry(Entry::new(name, target_type)))
            .inspect(|path| debug!("Created {} {}", target_type, path))
            .inspect_err(|e| warn!("Cannot create {} '{}': {}", target_type, name, e))
    }

    /// Renames the node at `path` and returns its new path.
    ///
    /// Renaming a node to its current name is a no-op.
    pub fn set_name(&mut self, path: &RegisterPath, name: &str) -> Result<RegisterPath, LmapError> {
        self.rename(path, name)
            .inspect(|new_path| debug!("Renamed {} to {}", path, new_path))
            .inspect_err(|e| warn!("Cannot rename {}: {}", path, e))
    }

    /// Changes the target type of the entry at `path`.
    ///
    /// All type-specific fields are reset to their defaults, also when the
    /// type does not change. Previous field values are discarded.
    pub fn set_target_type(
        &mut self,
        path: &RegisterPath,
        target_type: TargetType,
    ) -> Result<(), LmapError> {
        let entry = self
            .entry_mut(path)
            .inspect_err(|e| warn!("Cannot change target type of {}: {}", path, e))?;
        entry.target = Target::new(target_type);
        debug!("Changed target type of {} to {}", path, target_type);
        Ok(())
    }

    /// Sets one type-specific field of the entry at `path`.
    pub fn set_field(
        &mut self,
        path: &RegisterPath,
        field: Field,
        value: impl Into<FieldValue>,
    ) -> Result<(), LmapError> {
        let value = value.into();
        self.entry_mut(path)
            .and_then(|entry| entry.target.set(field, value.clone()))
            .inspect(|_| debug!("Set {} of {} to {}", field, path, value))
            .inspect_err(|e| warn!("Cannot set {} of {}: {}", field, path, e))
    }

    /// Removes the node at `path` and returns it.
    ///
    /// Modules are removed together with their whole subtree; asking the user
    /// for confirmation first is up to the caller.
    pub fn delete_node(&mut self, path: &RegisterPath) -> Result<Node, LmapError> {
        self.detach(path)
            .inspect(|node| debug!("Deleted {} ({})", path, kind(node)))
            .inspect_err(|e| warn!("Cannot delete {}: {}", path, e))
    }

    /// Moves the node at `path` below `new_parent`, at index `position` of
    /// `new_parent`'s children (counted after the node has been detached;
    /// positions past the end append). Returns the node's new path.
    pub fn move_node(
        &mut self,
        path: &RegisterPath,
        new_parent: &RegisterPath,
        position: usize,
    ) -> Result<RegisterPath, LmapError> {
        self.relocate(path, new_parent, position)
            .inspect(|new_path| debug!("Moved {} to {}", path, new_path))
            .inspect_err(|e| warn!("Cannot move {}: {}", path, e))
    }

    // --- Internals ---

    fn append(&mut self, parent: &RegisterPath, node: Node) -> Result<RegisterPath, LmapError> {
        validate_name(node.name())?;
        if node.is_module() && parent.depth() >= MAX_DEPTH {
            return Err(LmapError::TooDeep {
                path: parent.join(node.name()),
            });
        }
        let module = self.module_mut(parent)?;
        if module.has_child(node.name()) {
            return Err(LmapError::NameConflict {
                parent: parent.clone(),
                name: node.name().into(),
            });
        }
        let path = parent.join(node.name());
        module.children.push(node);
        Ok(path)
    }

    fn rename(&mut self, path: &RegisterPath, name: &str) -> Result<RegisterPath, LmapError> {
        validate_name(name)?;
        let (parent_path, old_name) = split(path).ok_or_else(|| LmapError::InvalidName {
            name: String::new(),
        })?;
        let parent = self.module_mut(&parent_path)?;
        let index = parent
            .position(old_name)
            .ok_or_else(|| LmapError::NodeNotFound { path: path.clone() })?;
        if old_name != name {
            if parent.has_child(name) {
                return Err(LmapError::NameConflict {
                    parent: parent_path,
                    name: name.into(),
                });
            }
            parent.children[index].set_name(name.into());
        }
        Ok(parent_path.join(name))
    }

    fn detach(&mut self, path: &RegisterPath) -> Result<Node, LmapError> {
        let not_found = || LmapError::NodeNotFound { path: path.clone() };
        let (parent_path, name) = split(path).ok_or_else(not_found)?;
        let parent = self.module_mut(&parent_path)?;
        let index = parent.position(name).ok_or_else(not_found)?;
        Ok(parent.children.remove(index))
    }

    fn relocate(
        &mut self,
        path: &RegisterPath,
        new_parent: &RegisterPath,
        position: usize,
    ) -> Result<RegisterPath, LmapError> {
        // Covers the root as well: every path starts with the empty path.
        if new_parent.starts_with(path) {
            return Err(LmapError::CycleError {
                node: path.clone(),
                new_parent: new_parent.clone(),
            });
        }
        let (old_parent, name) = split(path).ok_or_else(|| LmapError::NodeNotFound {
            path: path.clone(),
        })?;

        // Validate everything before touching the tree.
        if !self.resolve_module(&old_parent)?.has_child(name) {
            return Err(LmapError::NodeNotFound { path: path.clone() });
        }
        let target = self.resolve_module(new_parent)?;
        if old_parent != *new_parent && target.has_child(name) {
            return Err(LmapError::NameConflict {
                parent: new_parent.clone(),
                name: name.into(),
            });
        }
        if let Some(Node::Module(module)) = self.get(path) {
            if new_parent.depth() + 1 + module_height(module) > MAX_DEPTH {
                return Err(LmapError::TooDeep {
                    path: new_parent.join(name),
                });
            }
        }

        let node = self.detach(path)?;
        // `new_parent` is outside the detached subtree, so it still resolves.
        let target = self.module_mut(new_parent)?;
        let position = position.min(target.children.len());
        target.children.insert(position, node);
        Ok(new_parent.join(name))
    }

    fn resolve_module(&self, path: &RegisterPath) -> Result<&Module, LmapError> {
        let mut current = &self.root;
        for segment in path.segments() {
            match current.child(segment) {
                Some(Node::Module(module)) => current = module,
                Some(Node::Entry(_)) => return Err(LmapError::NotAModule { path: path.clone() }),
                None => return Err(LmapError::NodeNotFound { path: path.clone() }),
            }
        }
        Ok(current)
    }

    fn module_mut(&mut self, path: &RegisterPath) -> Result<&mut Module, LmapError> {
        let mut current = &mut self.root;
        for segment in path.segments() {
            let node = current
                .children
                .iter_mut()
                .find(|n| n.name() == segment.as_str())
                .ok_or_else(|| LmapError::NodeNotFound { path: path.clone() })?;
            match node {
                Node::Module(module) => current = module,
                Node::Entry(_) => return Err(LmapError::NotAModule { path: path.clone() }),
            }
        }
        Ok(current)
    }

    fn entry_mut(&mut self, path: &RegisterPath) -> Result<&mut Entry, LmapError> {
        let (parent_path, name) = split(path).ok_or_else(|| LmapError::NotAnEntry {
            path: path.clone(),
        })?;
        let node = self
            .module_mut(&parent_path)?
            .children
            .iter_mut()
            .find(|n| n.name() == name)
            .ok_or_else(|| LmapError::NodeNotFound { path: path.clone() })?;
        match node {
            Node::Entry(entry) => Ok(entry),
            Node::Module(_) => Err(LmapError::NotAnEntry { path: path.clone() }),
        }
    }
}

/// Checks a new node name: non-empty and free of the path separator.
pub(crate) fn validate_name(name: &str) -> Result<(), LmapError> {
    if name.is_empty() || name.contains(SEPARATOR) {
        return Err(LmapError::InvalidName { name: name.into() });
    }
    Ok(())
}

/// Number of module levels below `module`; 0 if it has no sub-modules.
fn module_height(module: &Module) -> usize {
    module
        .children
        .iter()
        .filter_map(Node::as_module)
        .map(|m| 1 + module_height(m))
        .max()
        .unwrap_or(0)
}

/// Splits a non-root path into its parent path and its own name.
fn split(path: &RegisterPath) -> Option<(RegisterPath, &str)> {
    Some((path.parent()?, path.name()?))
}

fn kind(node: &Node) -> &'static str {
    match node {
        Node::Module(_) => "module",
        Node::Entry(entry) => entry.target_type().tag(),
    }
}

/// Depth-first iterator over all entries of a map, see [`LogicalNameMap::entries`].
pub struct Entries<'a> {
    stack: Vec<(RegisterPath, slice::Iter<'a, Node>)>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (RegisterPath, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (prefix, children) = self.stack.last_mut()?;
            match children.next() {
                Some(Node::Entry(entry)) => return Some((prefix.join(&entry.name), entry)),
                Some(Node::Module(module)) => {
                    let path = prefix.join(&module.name);
                    self.stack.push((path, module.children.iter()));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn p(s: &str) -> RegisterPath {
        RegisterPath::from(s)
    }

    fn names(module: &Module) -> Vec<&str> {
        module.children.iter().map(Node::name).collect()
    }

    /// /A{ /A/x, /A/B{ /A/B/y } }, /z
    fn sample() -> LogicalNameMap {
        let mut map = LogicalNameMap::new();
        map.create_module(&p("/"), "A").unwrap();
        map.create_entry(&p("/A"), "x", TargetType::Constant).unwrap();
        map.create_module(&p("/A"), "B").unwrap();
        map.create_entry(&p("/A/B"), "y", TargetType::Variable).unwrap();
        map.create_entry(&p("/"), "z", TargetType::RedirectedRegister).unwrap();
        map
    }

    #[test]
    fn test_create_returns_path() {
        let mut map = LogicalNameMap::new();
        let m1 = map.create_module(&RegisterPath::root(), "M1").unwrap();
        assert_eq!(m1.to_string(), "/M1");
        let r1 = map.create_entry(&m1, "R1", TargetType::RedirectedChannel).unwrap();
        assert_eq!(r1.to_string(), "/M1/R1");
        assert_eq!(
            map.entry(&r1).unwrap().target,
            Target::new(TargetType::RedirectedChannel)
        );
    }

    #[test]
    fn test_create_module_name_conflict() {
        let mut map = LogicalNameMap::new();
        map.create_module(&p("/"), "M1").unwrap();
        let result = map.create_module(&p("/"), "M1");
        assert!(matches!(
            result,
            Err(LmapError::NameConflict { ref name, .. }) if name == "M1"
        ));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_create_entry_conflicts_with_module() {
        let mut map = sample();
        let before = map.clone();
        assert!(matches!(
            map.create_entry(&p("/A"), "B", TargetType::Constant),
            Err(LmapError::NameConflict { .. })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_same_name_in_different_parents() {
        let mut map = sample();
        map.create_entry(&p("/A/B"), "x", TargetType::Constant).unwrap();
        map.create_entry(&p("/"), "x", TargetType::Constant).unwrap();
        assert_eq!(map.entries().count(), 5);
    }

    #[test]
    fn test_invalid_names() {
        let mut map = LogicalNameMap::new();
        assert!(matches!(
            map.create_module(&p("/"), ""),
            Err(LmapError::InvalidName { .. })
        ));
        assert!(matches!(
            map.create_entry(&p("/"), "a/b", TargetType::Constant),
            Err(LmapError::InvalidName { .. })
        ));
        assert!(map.is_empty());
    }

    #[test]
    fn test_create_under_entry_or_missing_parent() {
        let mut map = sample();
        assert!(matches!(
            map.create_module(&p("/z"), "M"),
            Err(LmapError::NotAModule { .. })
        ));
        assert!(matches!(
            map.create_module(&p("/nope"), "M"),
            Err(LmapError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_set_name() {
        let mut map = sample();
        let renamed = map.set_name(&p("/A/B"), "C").unwrap();
        assert_eq!(renamed, p("/A/C"));
        assert!(map.get(&p("/A/C/y")).is_some());
        assert!(map.get(&p("/A/B")).is_none());
        // Order is kept.
        assert_eq!(names(map.module(&p("/A")).unwrap()), ["x", "C"]);
    }

    #[test]
    fn test_set_name_to_itself() {
        let mut map = sample();
        let before = map.clone();
        assert_eq!(map.set_name(&p("/A/x"), "x").unwrap(), p("/A/x"));
        assert_eq!(map, before);
    }

    #[test]
    fn test_set_name_conflict() {
        let mut map = sample();
        let before = map.clone();
        assert!(matches!(
            map.set_name(&p("/A/x"), "B"),
            Err(LmapError::NameConflict { .. })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_set_target_type_resets_fields() {
        let mut map = sample();
        let z = p("/z");
        map.set_field(&z, Field::TargetDevice, "dev").unwrap();
        map.set_field(&z, Field::NumberOfElements, 4u32).unwrap();

        // Same type: still reset.
        map.set_target_type(&z, TargetType::RedirectedRegister).unwrap();
        assert_eq!(
            map.entry(&z).unwrap().target,
            Target::new(TargetType::RedirectedRegister)
        );

        map.set_field(&z, Field::TargetDevice, "dev").unwrap();
        map.set_target_type(&z, TargetType::RedirectedChannel).unwrap();
        let target = &map.entry(&z).unwrap().target;
        assert_eq!(target.target_device(), Some(""));
        assert_eq!(target.get(Field::TargetChannel), Some(FieldValue::Unsigned(0)));
    }

    #[test]
    fn test_set_target_type_on_module() {
        let mut map = sample();
        assert!(matches!(
            map.set_target_type(&p("/A"), TargetType::Constant),
            Err(LmapError::NotAnEntry { .. })
        ));
        assert!(matches!(
            map.set_target_type(&RegisterPath::root(), TargetType::Constant),
            Err(LmapError::NotAnEntry { .. })
        ));
    }

    #[test]
    fn test_set_field_invalid_for_type() {
        let mut map = sample();
        let before = map.clone();
        assert!(matches!(
            map.set_field(&p("/A/x"), Field::TargetDevice, "dev"),
            Err(LmapError::InvalidField {
                field: Field::TargetDevice,
                target_type: TargetType::Constant
            })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_delete_entry_keeps_order() {
        let mut map = sample();
        map.create_entry(&p("/"), "w", TargetType::Constant).unwrap();
        let removed = map.delete_node(&p("/z")).unwrap();
        assert_eq!(removed.name(), "z");
        assert_eq!(names(map.root()), ["A", "w"]);
    }

    #[test]
    fn test_delete_module_recursive() {
        let mut map = sample();
        let removed = map.delete_node(&p("/A")).unwrap();
        assert_eq!(removed.as_module().unwrap().len(), 2);
        assert_eq!(names(map.root()), ["z"]);
        assert!(map.get(&p("/A/B/y")).is_none());
        assert_eq!(map.entries().count(), 1);
    }

    #[test]
    fn test_delete_missing_or_root() {
        let mut map = sample();
        assert!(matches!(
            map.delete_node(&p("/A/q")),
            Err(LmapError::NodeNotFound { .. })
        ));
        assert!(matches!(
            map.delete_node(&RegisterPath::root()),
            Err(LmapError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_move_into_other_module() {
        let mut map = sample();
        let new_path = map.move_node(&p("/z"), &p("/A/B"), 0).unwrap();
        assert_eq!(new_path, p("/A/B/z"));
        assert_eq!(names(map.module(&p("/A/B")).unwrap()), ["z", "y"]);
        assert_eq!(names(map.root()), ["A"]);
    }

    #[test]
    fn test_move_within_parent() {
        let mut map = sample();
        map.create_entry(&p("/"), "w", TargetType::Constant).unwrap();
        // [A, z, w] -> detach A -> [z, w] -> insert at 2 -> [z, w, A]
        map.move_node(&p("/A"), &p("/"), 2).unwrap();
        assert_eq!(names(map.root()), ["z", "w", "A"]);
        // Past the end appends.
        map.move_node(&p("/z"), &p("/"), 99).unwrap();
        assert_eq!(names(map.root()), ["w", "A", "z"]);
    }

    #[test]
    fn test_move_cycle() {
        let mut map = sample();
        let before = map.clone();
        assert!(matches!(
            map.move_node(&p("/A"), &p("/A"), 0),
            Err(LmapError::CycleError { .. })
        ));
        assert!(matches!(
            map.move_node(&p("/A"), &p("/A/B"), 0),
            Err(LmapError::CycleError { .. })
        ));
        assert!(matches!(
            map.move_node(&RegisterPath::root(), &p("/A"), 0),
            Err(LmapError::CycleError { .. })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_move_name_conflict() {
        let mut map = sample();
        map.create_entry(&p("/A/B"), "x", TargetType::Variable).unwrap();
        let before = map.clone();
        assert!(matches!(
            map.move_node(&p("/A/x"), &p("/A/B"), 0),
            Err(LmapError::NameConflict { .. })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_move_into_entry() {
        let mut map = sample();
        let before = map.clone();
        assert!(matches!(
            map.move_node(&p("/A/x"), &p("/z"), 0),
            Err(LmapError::NotAModule { .. })
        ));
        assert_eq!(map, before);
    }

    #[test]
    fn test_entries_document_order() {
        let map = sample();
        let paths: Vec<_> = map.entries().map(|(path, _)| path.to_string()).collect();
        assert_eq!(paths, vec!["/A/x", "/A/B/y", "/z"]);
    }

    #[test]
    fn test_target_devices() {
        let mut map = sample();
        map.set_field(&p("/z"), Field::TargetDevice, "BOARD").unwrap();
        map.create_entry(&p("/A"), "c", TargetType::RedirectedChannel).unwrap();
        map.set_field(&p("/A/c"), Field::TargetDevice, "ADC").unwrap();
        map.create_entry(&p("/A"), "d", TargetType::RedirectedChannel).unwrap();
        map.set_field(&p("/A/d"), Field::TargetDevice, "BOARD").unwrap();
        let devices: Vec<_> = map.target_devices().into_iter().collect();
        assert_eq!(devices, ["ADC", "BOARD"]);
    }

    #[test]
    fn test_target_devices_skips_empty() {
        let mut map = sample();
        map.create_entry(&p("/"), "new", TargetType::RedirectedChannel).unwrap();
        assert!(map.target_devices().is_empty());
        map.set_field(&p("/new"), Field::TargetDevice, "ADC").unwrap();
        let devices: Vec<_> = map.target_devices().into_iter().collect();
        assert_eq!(devices, ["ADC"]);
    }

    /// Creates `count` modules named `m`, each inside the previous one.
    fn chain(map: &mut LogicalNameMap, mut parent: RegisterPath, count: usize) -> RegisterPath {
        for _ in 0..count {
            parent = map.create_module(&parent, "m").unwrap();
        }
        parent
    }

    #[test]
    fn test_create_module_depth_limit() {
        let mut map = LogicalNameMap::new();
        let deepest = chain(&mut map, RegisterPath::root(), MAX_DEPTH);
        assert_eq!(deepest.depth(), MAX_DEPTH);

        let before = map.clone();
        assert!(matches!(
            map.create_module(&deepest, "m"),
            Err(LmapError::TooDeep { ref path }) if path.depth() == MAX_DEPTH + 1
        ));
        assert_eq!(map, before);

        // Entries do not count as a level.
        map.create_entry(&deepest, "x", TargetType::Constant).unwrap();
        assert_eq!(map.entries().count(), 1);
    }

    #[test]
    fn test_move_depth_limit() {
        let mut map = LogicalNameMap::new();
        chain(&mut map, p("/"), MAX_DEPTH - 2);
        let a = map.create_module(&p("/"), "a").unwrap();
        let b = chain(&mut map, a, 2);
        map.create_entry(&b, "x", TargetType::Variable).unwrap();

        // /a holds two more levels, so it fits under a module at depth MAX_DEPTH - 3 only.
        let too_deep: RegisterPath = core::iter::repeat_n("m", MAX_DEPTH - 2).collect();
        let before = map.clone();
        assert!(matches!(
            map.move_node(&p("/a"), &too_deep, 0),
            Err(LmapError::TooDeep { .. })
        ));
        assert_eq!(map, before);

        let fits = too_deep.parent().unwrap();
        let moved = map.move_node(&p("/a"), &fits, 0).unwrap();
        assert_eq!(moved.depth(), MAX_DEPTH - 2);
        assert!(map.entry(&moved.join("m").join("m").join("x")).is_some());
    }
}
