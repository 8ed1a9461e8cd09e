//! Node handles over an arena-backed JSON tree.
//!
//! A [`Container`] points at one node. Clones alias the same node, and every
//! handle derived from a container shares its arena, so a write through one
//! handle is visible through all others.
//!
//! Containers are `!Send` and `!Sync`: access to one tree is confined to a
//! single thread, and nothing inside the tree locks.
//!
//! `set`, `delete` and the array writers are all-or-nothing. The path is
//! validated before the first write, so a failing call leaves the tree as it
//! was.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use generational_arena::Index;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::arena::{Creation, JsonKind, Resolved, Slot, TreeArena};
use crate::codec;
use crate::errors::{TreeError, TreeResult};
use crate::path::{join_path, split_path};

#[derive(Clone)]
pub struct Container {
    tree: Rc<RefCell<TreeArena>>,
    node: Index,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("node", &self.node)
            .field("data", &self.data())
            .finish()
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes()))
    }
}

impl Container {
    /// A fresh tree whose root is an empty object.
    pub fn new() -> Self {
        Self::consume(Value::Object(serde_json::Map::new()))
    }

    /// Wrap an already built value as the root of a fresh tree.
    pub fn consume(value: Value) -> Self {
        let mut tree = TreeArena::new();
        let node = tree.install_root(value);
        Self {
            tree: Rc::new(RefCell::new(tree)),
            node,
        }
    }

    fn handle(&self, node: Index) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            node,
        }
    }

    /// Handle to the root of the tree this container belongs to.
    pub fn root(&self) -> Self {
        let root = self.tree.borrow().root().unwrap_or(self.node);
        self.handle(root)
    }

    /// Deep copy of the value under this handle.
    pub fn data(&self) -> Value {
        self.tree.borrow().to_value(self.node)
    }

    pub fn kind(&self) -> JsonKind {
        self.tree.borrow().slot(self.node).kind()
    }

    pub fn is_null(&self) -> bool {
        self.tree.borrow().slot(self.node).is_null()
    }

    /// True when both handles address the same node of the same tree.
    pub fn same_node(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree) && self.node == other.node
    }

    // ---------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------

    /// Walk `path` from this node.
    ///
    /// Crossing an array applies the rest of the path to every element and
    /// gathers the matches, in element order, into a new array. `None` means
    /// nothing was found; a found JSON null is `Some`.
    #[instrument(level = "trace", skip(self))]
    pub fn search(&self, path: &[&str]) -> Option<Container> {
        let found = self.tree.borrow_mut().search(self.node, path)?;
        Some(self.handle(found))
    }

    /// Shorthand for [`Container::search`].
    pub fn s(&self, path: &[&str]) -> Option<Container> {
        self.search(path)
    }

    /// [`Container::search`] with a dotted path.
    pub fn path(&self, path: &str) -> Option<Container> {
        self.search(&split_path(path))
    }

    pub fn exists(&self, path: &[&str]) -> bool {
        self.tree.borrow().resolves(self.node, path)
    }

    pub fn exists_p(&self, path: &str) -> bool {
        self.exists(&split_path(path))
    }

    /// Element `index` of an array. Anything else yields a null handle in a
    /// tree of its own, so misses never grow this tree.
    pub fn index(&self, index: usize) -> Container {
        let element = match self.tree.borrow().slot(self.node) {
            Slot::Array(items) => items.get(index).copied(),
            _ => None,
        };
        match element {
            Some(node) => self.handle(node),
            None => Self::consume(Value::Null),
        }
    }

    /// Elements of an array, or values of an object in no particular order.
    pub fn children(&self) -> TreeResult<Vec<Container>> {
        let nodes: Vec<Index> = match self.tree.borrow().slot(self.node) {
            Slot::Array(items) => items.clone(),
            Slot::Object(map) => map.values().copied().collect(),
            _ => return Err(TreeError::NotObjectOrArray),
        };
        Ok(nodes.into_iter().map(|node| self.handle(node)).collect())
    }

    pub fn child_map(&self) -> TreeResult<HashMap<String, Container>> {
        let entries: Vec<(String, Index)> = match self.tree.borrow().slot(self.node) {
            Slot::Object(map) => map.iter().map(|(k, &v)| (k.clone(), v)).collect(),
            _ => return Err(TreeError::NotObject),
        };
        Ok(entries
            .into_iter()
            .map(|(key, node)| (key, self.handle(node)))
            .collect())
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Write `value` at `path`, creating intermediate objects as needed.
    ///
    /// An empty path replaces this node's value in place. A null node, or a
    /// missing or null intermediate, becomes an empty object. Any other
    /// non-object on the way fails with `PathCollision` and nothing is written.
    #[instrument(level = "debug", skip(self, value))]
    pub fn set(&self, value: Value, path: &[&str]) -> TreeResult<Container> {
        self.set_with(value, path, Creation::CreateMissing)
    }

    pub fn set_p(&self, value: Value, path: &str) -> TreeResult<Container> {
        self.set(value, &split_path(path))
    }

    /// Like [`Container::set`], but every intermediate must already be an object.
    #[instrument(level = "debug", skip(self, value))]
    pub fn set_existing(&self, value: Value, path: &[&str]) -> TreeResult<Container> {
        self.set_with(value, path, Creation::Strict)
    }

    pub fn set_existing_p(&self, value: Value, path: &str) -> TreeResult<Container> {
        self.set_existing(value, &split_path(path))
    }

    fn set_with(&self, value: Value, path: &[&str], creation: Creation) -> TreeResult<Container> {
        let mut tree = self.tree.borrow_mut();
        tree.check_path(self.node, path, creation)?;
        let slot = tree.slot_from_value(value);
        let written = tree.write_path(self.node, path, slot)?;
        Ok(self.handle(written))
    }

    /// Validate, then write a prebuilt slot. Used by the array writers.
    fn write_slot(&self, tree: &mut TreeArena, path: &[&str], slot: Slot) -> TreeResult<Index> {
        tree.check_path(self.node, path, Creation::CreateMissing)?;
        tree.write_path(self.node, path, slot)
    }

    /// Replace element `index` of this array.
    ///
    /// `index == len` is out of bounds; this never appends.
    pub fn set_index(&self, value: Value, index: usize) -> TreeResult<Container> {
        let mut tree = self.tree.borrow_mut();
        let len = match tree.slot(self.node) {
            Slot::Array(items) => items.len(),
            _ => return Err(TreeError::NotArray),
        };
        if index >= len {
            return Err(TreeError::OutOfBounds { index, len });
        }
        let element = tree.insert_value(value);
        if let Some(items) = tree.array_mut(self.node) {
            items[index] = element;
        }
        Ok(self.handle(element))
    }

    /// Write an empty array at `path`.
    pub fn array(&self, path: &[&str]) -> TreeResult<Container> {
        self.set(Value::Array(Vec::new()), path)
    }

    pub fn array_p(&self, path: &str) -> TreeResult<Container> {
        self.array(&split_path(path))
    }

    /// Write an array of `size` nulls at `path`.
    pub fn array_of_size(&self, size: usize, path: &[&str]) -> TreeResult<Container> {
        self.set(Value::Array(vec![Value::Null; size]), path)
    }

    pub fn array_of_size_p(&self, size: usize, path: &str) -> TreeResult<Container> {
        self.array_of_size(size, &split_path(path))
    }

    /// Remove the key at `path`. Arrays are never traversed.
    ///
    /// A missing final key, a non-object on the way, an empty path and a null
    /// node all fail with `NotObject`.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, path: &[&str]) -> TreeResult<()> {
        self.tree.borrow_mut().delete_path(self.node, path)
    }

    pub fn delete_p(&self, path: &str) -> TreeResult<()> {
        self.delete(&split_path(path))
    }

    // ---------------------------------------------------------------
    // Array operations
    // ---------------------------------------------------------------

    /// Append `value` to the array at `path`.
    ///
    /// A scalar or object already at `path` becomes the first element of a new
    /// two element array; a missing or null `path` becomes `[value]`.
    #[instrument(level = "debug", skip(self, value))]
    pub fn array_append(&self, value: Value, path: &[&str]) -> TreeResult<()> {
        let mut tree = self.tree.borrow_mut();
        let found = match tree.resolve(self.node, path) {
            Some(Resolved::FanOut { at, .. }) => return Err(Resolved::collision(path, at)),
            Some(Resolved::Node(idx)) => Some(idx),
            None => None,
        };
        tree.check_path(self.node, path, Creation::CreateMissing)?;
        let appended = tree.insert_value(value);
        let slot = match found.map(|idx| (idx, tree.slot(idx).clone())) {
            Some((_, Slot::Array(mut items))) => {
                items.push(appended);
                Slot::Array(items)
            }
            Some((_, Slot::Null)) | None => Slot::Array(vec![appended]),
            Some((idx, existing)) => {
                // Writing in place at an empty path must not nest the node in itself.
                let existing = if path.is_empty() {
                    tree.insert_slot(existing)
                } else {
                    idx
                };
                Slot::Array(vec![existing, appended])
            }
        };
        tree.write_path(self.node, path, slot)?;
        debug!("appended to {}", join_path(path));
        Ok(())
    }

    pub fn array_append_p(&self, value: Value, path: &str) -> TreeResult<()> {
        self.array_append(value, &split_path(path))
    }

    /// Remove element `index` of the array at `path`, keeping the order of the rest.
    #[instrument(level = "debug", skip(self))]
    pub fn array_remove(&self, index: usize, path: &[&str]) -> TreeResult<()> {
        let mut tree = self.tree.borrow_mut();
        let mut items = match tree.resolve(self.node, path) {
            Some(Resolved::Node(idx)) => match tree.slot(idx) {
                Slot::Array(items) => items.clone(),
                _ => return Err(TreeError::NotArray),
            },
            Some(Resolved::FanOut { at, matches }) => {
                let len = matches.len();
                if index >= len {
                    return Err(TreeError::OutOfBounds { index, len });
                }
                return Err(Resolved::collision(path, at));
            }
            None => return Err(TreeError::NotArray),
        };
        if index >= items.len() {
            return Err(TreeError::OutOfBounds {
                index,
                len: items.len(),
            });
        }
        items.remove(index);
        self.write_slot(&mut tree, path, Slot::Array(items))?;
        Ok(())
    }

    pub fn array_remove_p(&self, index: usize, path: &str) -> TreeResult<()> {
        self.array_remove(index, &split_path(path))
    }

    /// Element `index` of the array at `path`.
    ///
    /// Over a fan-out path the elements are the matches, and only a nested
    /// fan-out match allocates a node for the returned handle.
    pub fn array_element(&self, index: usize, path: &[&str]) -> TreeResult<Container> {
        let element = {
            let mut tree = self.tree.borrow_mut();
            let element = match tree.resolve(self.node, path) {
                Some(Resolved::Node(idx)) => match tree.slot(idx) {
                    Slot::Array(items) => match items.get(index) {
                        Some(&element) => Resolved::Node(element),
                        None => {
                            return Err(TreeError::OutOfBounds {
                                index,
                                len: items.len(),
                            })
                        }
                    },
                    _ => return Err(TreeError::NotArray),
                },
                Some(Resolved::FanOut { matches, .. }) => {
                    let len = matches.len();
                    matches
                        .into_iter()
                        .nth(index)
                        .ok_or(TreeError::OutOfBounds { index, len })?
                }
                None => return Err(TreeError::NotArray),
            };
            tree.materialize(element)
        };
        Ok(self.handle(element))
    }

    pub fn array_element_p(&self, index: usize, path: &str) -> TreeResult<Container> {
        self.array_element(index, &split_path(path))
    }

    pub fn array_count(&self, path: &[&str]) -> TreeResult<usize> {
        let tree = self.tree.borrow();
        match tree.resolve(self.node, path) {
            Some(Resolved::FanOut { matches, .. }) => Ok(matches.len()),
            Some(Resolved::Node(idx)) => match tree.slot(idx) {
                Slot::Array(items) => Ok(items.len()),
                _ => Err(TreeError::NotArray),
            },
            None => Err(TreeError::NotArray),
        }
    }

    pub fn array_count_p(&self, path: &str) -> TreeResult<usize> {
        self.array_count(&split_path(path))
    }

    // ---------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------

    /// Compact JSON. A null node or an encoding failure yields `{}`.
    pub fn bytes(&self) -> Vec<u8> {
        let tree = self.tree.borrow();
        if tree.slot(self.node).is_null() {
            return codec::EMPTY_OBJECT.to_vec();
        }
        codec::encode(&tree.view(self.node))
    }

    /// Indented JSON; lines after the first start with `prefix`.
    pub fn bytes_indent(&self, prefix: &str, indent: &str) -> Vec<u8> {
        let tree = self.tree.borrow();
        if tree.slot(self.node).is_null() {
            return codec::EMPTY_OBJECT.to_vec();
        }
        codec::encode_indent(&tree.view(self.node), prefix, indent)
    }

    pub fn string_indent(&self, prefix: &str, indent: &str) -> String {
        String::from_utf8_lossy(&self.bytes_indent(prefix, indent)).into_owned()
    }

    /// Free arena nodes no longer reachable from the root.
    ///
    /// Handles to freed nodes, including detached search results, read as
    /// null afterwards.
    pub fn sweep(&self) -> usize {
        self.tree.borrow_mut().sweep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_alias_the_same_node() {
        let root = Container::consume(json!({"a": {"b": 1}}));
        let a = root.search(&["a"]).unwrap();
        let alias = a.clone();

        a.set(json!(2), &["b"]).unwrap();

        assert!(alias.same_node(&a));
        assert_eq!(alias.data(), json!({"b": 2}));
        assert_eq!(root.data(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_empty_path_set_replaces_in_place() {
        let root = Container::consume(json!({"a": {"b": 1}}));
        let a = root.search(&["a"]).unwrap();

        a.set(json!([1, 2]), &[]).unwrap();

        assert_eq!(root.data(), json!({"a": [1, 2]}));
    }

    #[test]
    fn test_root_of_derived_handle() {
        let root = Container::consume(json!({"a": {"b": 1}}));
        let b = root.path("a.b").unwrap();
        assert!(b.root().same_node(&root));
    }

    #[test]
    fn test_append_in_place_does_not_nest_node_in_itself() {
        let root = Container::consume(json!({"a": 1}));

        root.array_append(json!(2), &[]).unwrap();

        assert_eq!(root.data(), json!([{"a": 1}, 2]));
    }
}
