//! Face group registry.
//!
//! Groups are named, colored classifications applied to mesh faces. Each
//! object owns one ordered registry; the list order is display order only
//! and carries no semantics.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::CoreError;

/// Stable identifier of a group within one registry.
///
/// Ids start at 1 and are never reused while the object lives; the raw
/// value 0 is reserved for untagged faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(u32);

impl GroupId {
    /// Returns the raw tag value stored in the face tag layer.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// A named, colored face group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub color: Rgb,
}

/// Direction for reordering groups in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Ordered collection of groups with a monotonic id counter and an
/// active (UI-selected) index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    next_id: u32,
    active_index: usize,
}

impl GroupRegistry {
    /// Creates an empty registry. Ids start counting from 1.
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            next_id: 1,
            active_index: 0,
        }
    }

    /// Adds a group and makes it active.
    ///
    /// The name is disambiguated against existing groups, so two groups in
    /// the same registry never share a name.
    pub fn add(&mut self, name: impl Into<String>, color: Rgb) -> GroupId {
        let id = GroupId(self.next_id);
        self.next_id += 1;

        let name = self.disambiguate(name.into(), id);
        self.groups.push(Group { id, name, color });
        self.active_index = self.groups.len() - 1;
        id
    }

    /// Removes the group at `index` and returns it.
    ///
    /// The caller is responsible for clearing face tags referencing the
    /// removed id. The active index shifts down by one when the removal
    /// happened at or before it.
    pub fn remove(&mut self, index: usize) -> Result<Group, CoreError> {
        self.check_index(index)?;
        let group = self.groups.remove(index);

        if index <= self.active_index {
            self.active_index = self.active_index.saturating_sub(1);
        }
        self.clamp_active();

        Ok(group)
    }

    /// Swaps the group at `index` with its neighbor in `direction`.
    ///
    /// Returns `false` (without changes) when the move would cross a list
    /// boundary. The active index follows a swap it took part in.
    pub fn move_group(&mut self, index: usize, direction: MoveDirection) -> Result<bool, CoreError> {
        self.check_index(index)?;

        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.groups.len() => index + 1,
            _ => return Ok(false),
        };

        self.groups.swap(index, target);

        if self.active_index == index {
            self.active_index = target;
        } else if self.active_index == target {
            self.active_index = index;
        }

        Ok(true)
    }

    /// Renames the group at `index`, disambiguating against all other
    /// groups' names.
    pub fn rename(&mut self, index: usize, new_name: impl Into<String>) -> Result<(), CoreError> {
        self.check_index(index)?;
        let id = self.groups[index].id;
        self.groups[index].name = self.disambiguate(new_name.into(), id);
        Ok(())
    }

    /// Finds a group by its stable id.
    pub fn find_by_id(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Finds a group by the raw tag value stored in a face tag layer.
    /// Stale tags (no matching group) yield `None`.
    pub fn find_by_tag(&self, tag: u32) -> Option<&Group> {
        self.groups.iter().find(|g| g.id.raw() == tag)
    }

    /// Finds the list index of a group by raw tag value.
    pub fn index_of_tag(&self, tag: u32) -> Option<usize> {
        self.groups.iter().position(|g| g.id.raw() == tag)
    }

    /// The group at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    /// The currently active group, if the registry is non-empty.
    pub fn active(&self) -> Option<&Group> {
        self.groups.get(self.active_index)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Sets the active index, clamping it into range.
    pub fn set_active(&mut self, index: usize) {
        self.active_index = index;
        self.clamp_active();
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    fn check_index(&self, index: usize) -> Result<(), CoreError> {
        if index >= self.groups.len() {
            return Err(CoreError::InvalidIndex {
                index,
                len: self.groups.len(),
            });
        }
        Ok(())
    }

    fn clamp_active(&mut self) {
        if !self.groups.is_empty() && self.active_index >= self.groups.len() {
            self.active_index = self.groups.len() - 1;
        }
        if self.groups.is_empty() {
            self.active_index = 0;
        }
    }

    /// Makes `candidate` unique among all groups except the one named `id`.
    ///
    /// A colliding name ending in `_<number>` gets that number incremented,
    /// otherwise `_1` is appended; this repeats until the name is free. Each
    /// step strictly increases the counter against a finite collision set,
    /// so termination is bounded by the registry size.
    fn disambiguate(&self, candidate: String, id: GroupId) -> String {
        let mut name = candidate;
        while self
            .groups
            .iter()
            .any(|g| g.id != id && g.name == name)
        {
            name = bump_suffix(&name);
        }
        name
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn bump_suffix(name: &str) -> String {
    if let Some(pos) = name.rfind('_') {
        let suffix = &name[pos + 1..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = suffix.parse::<u64>() {
                return format!("{}_{}", &name[..pos], n + 1);
            }
        }
    }
    format!("{name}_1")
}
