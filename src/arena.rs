use std::collections::HashMap;

use generational_arena::{Arena, Index};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};

/// Content of one arena node.
///
/// Scalars are stored inline; arrays and objects hold the arena indices of
/// their children, so two parents may point at the same child node.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Index>),
    Object(HashMap<String, Index>),
}

static NULL_SLOT: Slot = Slot::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Array,
}

impl Slot {
    pub fn kind(&self) -> JsonKind {
        match self {
            Slot::Null => JsonKind::Null,
            Slot::Bool(_) => JsonKind::Bool,
            Slot::Number(_) => JsonKind::Number,
            Slot::String(_) => JsonKind::String,
            Slot::Array(_) => JsonKind::Array,
            Slot::Object(_) => JsonKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }

    fn empty_object() -> Self {
        Slot::Object(HashMap::new())
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The path ends on an existing node.
    Node(Index),
    /// The path crossed an array at segment `at`; one entry per matching element.
    FanOut { at: usize, matches: Vec<Resolved> },
}

impl Resolved {
    /// Writes cannot go through an array, so a fan-out path collides where it
    /// first meets one.
    pub fn collision(segments: &[&str], at: usize) -> TreeError {
        TreeError::PathCollision {
            segment: segments.get(at).map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

/// Whether writes may create missing intermediate objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    /// Missing or null intermediates become empty objects.
    CreateMissing,
    /// Every intermediate must already be an object.
    Strict,
}

/// Arena-backed JSON tree.
///
/// Every node lives in a generational arena and is addressed by `Index`.
/// Nodes detached by writes stay allocated until [`TreeArena::sweep`] runs or
/// the arena is dropped. Reading a freed index yields null.
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<Slot>,
    /// Index of the document root, None until a root is installed
    root: Option<Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Create an arena whose root holds `value`.
    pub fn with_root(value: Value) -> Self {
        let mut tree = Self::new();
        tree.install_root(value);
        tree
    }

    /// Allocate `value` and make it the root that `sweep` keeps alive.
    pub fn install_root(&mut self, value: Value) -> Index {
        let root = self.insert_value(value);
        self.root = Some(root);
        root
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn insert_slot(&mut self, slot: Slot) -> Index {
        self.arena.insert(slot)
    }

    /// Allocate `value` and all of its descendants, returning the top node.
    pub fn insert_value(&mut self, value: Value) -> Index {
        let slot = self.slot_from_value(value);
        self.arena.insert(slot)
    }

    /// Allocate the children of `value` and return the slot for its top node.
    pub fn slot_from_value(&mut self, value: Value) -> Slot {
        match value {
            Value::Null => Slot::Null,
            Value::Bool(b) => Slot::Bool(b),
            Value::Number(n) => Slot::Number(n),
            Value::String(s) => Slot::String(s),
            Value::Array(items) => Slot::Array(
                items
                    .into_iter()
                    .map(|item| self.insert_value(item))
                    .collect(),
            ),
            Value::Object(map) => Slot::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.insert_value(v)))
                    .collect(),
            ),
        }
    }

    /// Content of `idx`; freed indices read as null.
    pub fn slot(&self, idx: Index) -> &Slot {
        self.arena.get(idx).unwrap_or(&NULL_SLOT)
    }

    /// Overwrite the content of `idx` in place, visible to every alias.
    pub fn replace(&mut self, idx: Index, slot: Slot) {
        if let Some(existing) = self.arena.get_mut(idx) {
            *existing = slot;
        }
    }

    pub fn array_mut(&mut self, idx: Index) -> Option<&mut Vec<Index>> {
        match self.arena.get_mut(idx) {
            Some(Slot::Array(items)) => Some(items),
            _ => None,
        }
    }

    fn object_mut(&mut self, idx: Index) -> Option<&mut HashMap<String, Index>> {
        match self.arena.get_mut(idx) {
            Some(Slot::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Resolve `segments` from `start` without allocating.
    ///
    /// Crossing an array applies the remaining segments to every element and
    /// keeps the matches in element order. Returns `None` when nothing matches.
    pub fn resolve(&self, start: Index, segments: &[&str]) -> Option<Resolved> {
        let mut cur = start;
        for (pos, segment) in segments.iter().enumerate() {
            match self.slot(cur) {
                Slot::Object(map) => cur = *map.get(*segment)?,
                Slot::Array(items) => {
                    let matches: Vec<Resolved> = items
                        .iter()
                        .filter_map(|&item| self.resolve(item, &segments[pos..]))
                        .collect();
                    if matches.is_empty() {
                        return None;
                    }
                    return Some(Resolved::FanOut { at: pos, matches });
                }
                _ => return None,
            }
        }
        Some(Resolved::Node(cur))
    }

    /// Turn a resolution into one node, allocating an array node per fan-out.
    pub fn materialize(&mut self, resolved: Resolved) -> Index {
        match resolved {
            Resolved::Node(idx) => idx,
            Resolved::FanOut { matches, .. } => {
                let items = matches
                    .into_iter()
                    .map(|m| self.materialize(m))
                    .collect();
                self.insert_slot(Slot::Array(items))
            }
        }
    }

    /// [`TreeArena::resolve`], with fan-out matches gathered into a freshly
    /// allocated array node.
    #[instrument(level = "trace", skip(self))]
    pub fn search(&mut self, start: Index, segments: &[&str]) -> Option<Index> {
        let resolved = self.resolve(start, segments)?;
        Some(self.materialize(resolved))
    }

    /// Same answer as `search(..).is_some()` without allocating fan-out nodes.
    pub fn resolves(&self, start: Index, segments: &[&str]) -> bool {
        let mut cur = start;
        for (pos, segment) in segments.iter().enumerate() {
            match self.slot(cur) {
                Slot::Object(map) => match map.get(*segment) {
                    Some(&child) => cur = child,
                    None => return false,
                },
                Slot::Array(items) => {
                    return items
                        .iter()
                        .any(|&item| self.resolves(item, &segments[pos..]))
                }
                _ => return false,
            }
        }
        true
    }

    /// Check that a write of `segments` below `start` can succeed.
    ///
    /// Performs no writes. Collisions can only happen on nodes that already
    /// exist, so once a missing or null slot is reached the rest of the path
    /// is guaranteed to be creatable.
    pub fn check_path(&self, start: Index, segments: &[&str], creation: Creation) -> TreeResult<()> {
        let mut cur = start;
        for (pos, segment) in segments.iter().enumerate() {
            let last = pos + 1 == segments.len();
            match self.slot(cur) {
                Slot::Object(map) => {
                    if last {
                        return Ok(());
                    }
                    match map.get(*segment) {
                        Some(&child) if !self.slot(child).is_null() => cur = child,
                        _ => return creatable(segment, creation),
                    }
                }
                Slot::Null => return creatable(segment, creation),
                _ => {
                    return Err(TreeError::PathCollision {
                        segment: segment.to_string(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Write `slot` at `segments` below `start` and return the written node.
    ///
    /// An empty path overwrites `start` in place. Callers run
    /// [`TreeArena::check_path`] first so that a failing write leaves the tree
    /// untouched.
    #[instrument(level = "trace", skip(self, slot))]
    pub fn write_path(&mut self, start: Index, segments: &[&str], slot: Slot) -> TreeResult<Index> {
        let Some((last, intermediates)) = segments.split_last() else {
            self.replace(start, slot);
            return Ok(start);
        };

        let mut cur = start;
        if self.slot(cur).is_null() {
            self.replace(cur, Slot::empty_object());
        }
        for segment in intermediates {
            let existing = match self.slot(cur) {
                Slot::Object(map) => map.get(*segment).copied(),
                _ => {
                    return Err(TreeError::PathCollision {
                        segment: segment.to_string(),
                    })
                }
            };
            cur = match existing {
                Some(child) if !self.slot(child).is_null() => child,
                _ => {
                    let child = self.insert_slot(Slot::empty_object());
                    if let Some(map) = self.object_mut(cur) {
                        map.insert(segment.to_string(), child);
                    }
                    child
                }
            };
        }

        let written = self.insert_slot(slot);
        match self.object_mut(cur) {
            Some(map) => {
                map.insert(last.to_string(), written);
                Ok(written)
            }
            None => Err(TreeError::PathCollision {
                segment: last.to_string(),
            }),
        }
    }

    /// Remove the key addressed by `segments`. Does not fan out over arrays.
    #[instrument(level = "trace", skip(self))]
    pub fn delete_path(&mut self, start: Index, segments: &[&str]) -> TreeResult<()> {
        let Some((last, intermediates)) = segments.split_last() else {
            return Err(TreeError::NotObject);
        };
        let mut cur = start;
        for segment in intermediates {
            cur = match self.slot(cur) {
                Slot::Object(map) => *map.get(*segment).ok_or(TreeError::NotObject)?,
                _ => return Err(TreeError::NotObject),
            };
        }
        let map = self.object_mut(cur).ok_or(TreeError::NotObject)?;
        map.remove(*last).map(|_| ()).ok_or(TreeError::NotObject)
    }

    /// Deep copy of the subtree at `idx` as an owned value.
    pub fn to_value(&self, idx: Index) -> Value {
        match self.slot(idx) {
            Slot::Null => Value::Null,
            Slot::Bool(b) => Value::Bool(*b),
            Slot::Number(n) => Value::Number(n.clone()),
            Slot::String(s) => Value::String(s.clone()),
            Slot::Array(items) => Value::Array(items.iter().map(|&i| self.to_value(i)).collect()),
            Slot::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, &v)| (k.clone(), self.to_value(v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    pub fn view(&self, idx: Index) -> NodeView<'_> {
        NodeView { arena: self, idx }
    }

    /// Free every node not reachable from the root. Returns the number freed.
    #[instrument(level = "debug", skip(self))]
    pub fn sweep(&mut self) -> usize {
        let mut reachable = vec![false; self.arena.capacity()];
        let mut stack: Vec<Index> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let (slot_pos, _) = idx.into_raw_parts();
            if reachable[slot_pos] || !self.arena.contains(idx) {
                continue;
            }
            reachable[slot_pos] = true;
            match self.slot(idx) {
                Slot::Array(items) => stack.extend(items.iter().copied()),
                Slot::Object(map) => stack.extend(map.values().copied()),
                _ => {}
            }
        }

        let before = self.arena.len();
        self.arena.retain(|idx, _| reachable[idx.into_raw_parts().0]);
        let freed = before - self.arena.len();
        debug!("swept {} unreachable nodes", freed);
        freed
    }
}

fn creatable(segment: &str, creation: Creation) -> TreeResult<()> {
    match creation {
        Creation::CreateMissing => Ok(()),
        Creation::Strict => Err(TreeError::MissingSegment {
            segment: segment.to_string(),
        }),
    }
}

/// Borrowed view of a subtree that serializes straight from the arena.
pub struct NodeView<'a> {
    arena: &'a TreeArena,
    idx: Index,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.arena.slot(self.idx) {
            Slot::Null => serializer.serialize_unit(),
            Slot::Bool(b) => serializer.serialize_bool(*b),
            Slot::Number(n) => n.serialize(serializer),
            Slot::String(s) => serializer.serialize_str(s),
            Slot::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for &item in items {
                    seq.serialize_element(&self.arena.view(item))?;
                }
                seq.end()
            }
            Slot::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, &child) in map {
                    out.serialize_entry(key, &self.arena.view(child))?;
                }
                out.end()
            }
        }
    }
}
