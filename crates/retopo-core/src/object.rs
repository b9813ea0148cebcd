//! Per-object overlay state and user-facing operations.
//!
//! Each mesh object owns its group registry, face tag layer and display
//! settings; nothing is registered globally. Operations that mutate tags
//! follow the edit-mode protocol: enter edit mode, mutate, restore the
//! prior mode.

use glam::Mat4;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Rgb;
use crate::error::CoreError;
use crate::group::{Group, GroupId, GroupRegistry, MoveDirection};
use crate::mesh::{MirrorAxis, TopoMesh, UNGROUPED_TAG};

/// Interaction mode of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectMode {
    #[default]
    Object,
    Edit,
}

/// Per-object overlay display settings. Pure view state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Whether the overlay is drawn for this object.
    pub enabled: bool,
    /// Cull back faces of the fill overlay.
    pub backface_culling: bool,
    /// Mirror group assignment across the X plane.
    pub use_x_mirror: bool,
    /// Draw the group-restricted wireframe.
    pub show_wireframe: bool,
    /// Draw pole markers (vertices with more than four incident edges).
    pub show_poles: bool,
    /// Draw the overlay on top of all geometry.
    pub draw_in_front: bool,
    /// Overlay opacity factor in [0, 1].
    pub overlay_alpha: f32,
    /// Pole spike length factor in [0, 2].
    pub pole_size: f32,
    /// Pole marker color.
    pub pole_color: Rgb,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            backface_culling: false,
            use_x_mirror: false,
            show_wireframe: false,
            show_poles: false,
            draw_in_front: false,
            overlay_alpha: 1.0,
            pole_size: 1.0,
            pole_color: Rgb::WHITE,
        }
    }
}

impl DisplaySettings {
    pub fn set_overlay_alpha(&mut self, alpha: f32) {
        self.overlay_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_pole_size(&mut self, size: f32) {
        self.pole_size = size.clamp(0.0, 2.0);
    }
}

/// A mesh object bundling geometry, groups and overlay view state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub id: Uuid,
    pub name: String,
    pub mesh: TopoMesh,
    pub groups: GroupRegistry,
    pub display: DisplaySettings,
    pub mode: ObjectMode,
    /// World transform applied when rendering.
    pub transform: Mat4,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, mesh: TopoMesh) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            mesh,
            groups: GroupRegistry::new(),
            display: DisplaySettings::default(),
            mode: ObjectMode::default(),
            transform: Mat4::IDENTITY,
        }
    }

    /// Adds a group and makes it active.
    ///
    /// Adding the first group attaches the tag layer and enables the
    /// overlay; the render side picks this up and starts a session.
    pub fn add_group(&mut self, name: impl Into<String>, color: Rgb) -> GroupId {
        let id = self.groups.add(name, color);
        self.mesh.ensure_tag_layer();
        if self.groups.len() == 1 {
            self.display.enabled = true;
        }
        id
    }

    /// Removes the group at `index`, clearing its tag from all faces.
    ///
    /// Tag clearing runs under a temporary edit-mode switch; the prior mode
    /// is restored afterwards. Removing the last group disables the overlay.
    pub fn remove_group(&mut self, index: usize) -> Result<Group, CoreError> {
        let id = self
            .groups
            .get(index)
            .ok_or(CoreError::InvalidIndex {
                index,
                len: self.groups.len(),
            })?
            .id;

        if let Ok(prior) = self.enter_edit() {
            self.mesh.clear_tags_for_group(id.raw());
            self.mode = prior;
        }

        let group = self.groups.remove(index)?;

        if self.groups.is_empty() {
            self.display.enabled = false;
        }
        Ok(group)
    }

    /// Toggles the overlay on or off, attaching the tag layer when enabling.
    pub fn toggle_overlay(&mut self) {
        self.display.enabled = !self.display.enabled;
        if self.display.enabled {
            self.mesh.ensure_tag_layer();
        }
    }

    /// Tags all selected faces with the active group (or untags them when
    /// `remove` is set), honoring the X-mirror setting.
    ///
    /// A no-op without groups or when edit mode cannot be entered.
    pub fn assign_selection_to_active(&mut self, remove: bool) {
        let Some(active) = self.groups.active() else {
            return;
        };
        let tag = if remove { UNGROUPED_TAG } else { active.id.raw() };
        let mirror = self.display.use_x_mirror.then_some(MirrorAxis::X);

        let Ok(prior) = self.enter_edit() else {
            return;
        };
        self.mesh.assign_tag_to_selected(tag, mirror);
        self.mode = prior;
    }

    /// Selects (or deselects) every face tagged with the active group.
    /// Only meaningful in edit mode; a no-op otherwise.
    pub fn select_active_group_faces(&mut self, deselect: bool) {
        if self.mode != ObjectMode::Edit {
            return;
        }
        let Some(active) = self.groups.active() else {
            return;
        };
        self.mesh.select_faces_by_tag(active.id.raw(), deselect);
    }

    /// Makes the group owning the first selected tagged face active.
    ///
    /// Returns the found group id; `None` when nothing matched, outside edit
    /// mode, or with a stale tag whose group no longer exists.
    pub fn find_parent_group(&mut self) -> Option<GroupId> {
        if self.mode != ObjectMode::Edit || self.groups.is_empty() {
            return None;
        }
        let tag = self.mesh.first_selected_group()?;
        let index = self.groups.index_of_tag(tag)?;
        self.groups.set_active(index);
        self.groups.active().map(|g| g.id)
    }

    pub fn move_group(&mut self, index: usize, direction: MoveDirection) -> Result<bool, CoreError> {
        self.groups.move_group(index, direction)
    }

    pub fn rename_group(&mut self, index: usize, name: impl Into<String>) -> Result<(), CoreError> {
        self.groups.rename(index, name)
    }

    pub fn set_active_group(&mut self, index: usize) {
        self.groups.set_active(index);
    }

    /// Switches to edit mode, returning the prior mode for restoration.
    /// Fails when the mesh has nothing to edit.
    fn enter_edit(&mut self) -> Result<ObjectMode, CoreError> {
        if self.mesh.faces.is_empty() {
            return Err(CoreError::ModeSwitch);
        }
        let prior = self.mode;
        self.mode = ObjectMode::Edit;
        Ok(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::quad_grid;

    fn object() -> MeshObject {
        MeshObject::new("test", quad_grid(2, 2))
    }

    #[test]
    fn test_first_group_enables_overlay() {
        let mut obj = object();
        assert!(!obj.display.enabled);

        let id = obj.add_group("Group", Rgb::random_hue());
        assert_eq!(id.raw(), 1);
        assert_eq!(obj.groups.active_index(), 0);
        assert!(obj.display.enabled);
        assert!(obj.mesh.tag_layer().is_some());

        // a second group does not re-trigger the enable side effect
        obj.display.enabled = false;
        obj.add_group("Other", Rgb::random_hue());
        assert!(!obj.display.enabled);
    }

    #[test]
    fn test_remove_group_clears_tags_and_restores_mode() {
        let mut obj = object();
        let id = obj.add_group("Group", Rgb::WHITE);
        obj.mesh.set_face_tag(0, id.raw());
        obj.mesh.set_face_tag(3, id.raw());

        obj.remove_group(0).unwrap();

        assert_eq!(obj.mesh.face_tag(0), UNGROUPED_TAG);
        assert_eq!(obj.mesh.face_tag(3), UNGROUPED_TAG);
        assert_eq!(obj.mode, ObjectMode::Object);
        assert!(!obj.display.enabled);
    }

    #[test]
    fn test_remove_group_invalid_index() {
        let mut obj = object();
        obj.add_group("Group", Rgb::WHITE);
        assert!(matches!(
            obj.remove_group(1),
            Err(CoreError::InvalidIndex { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_assign_selection_to_active() {
        let mut obj = object();
        let id = obj.add_group("Group", Rgb::WHITE);
        obj.mesh.faces[1].selected = true;
        obj.mesh.faces[2].selected = true;

        obj.assign_selection_to_active(false);
        assert_eq!(obj.mesh.face_tag(1), id.raw());
        assert_eq!(obj.mesh.face_tag(2), id.raw());
        // mode restored after the temporary switch
        assert_eq!(obj.mode, ObjectMode::Object);

        obj.assign_selection_to_active(true);
        assert_eq!(obj.mesh.face_tag(1), UNGROUPED_TAG);
    }

    #[test]
    fn test_assign_is_noop_without_groups() {
        let mut obj = object();
        obj.mesh.faces[0].selected = true;
        obj.assign_selection_to_active(false);
        assert_eq!(obj.mesh.face_tag(0), UNGROUPED_TAG);
    }

    #[test]
    fn test_assign_is_noop_when_edit_mode_unavailable() {
        let mut obj = MeshObject::new("empty", TopoMesh::new());
        obj.add_group("Group", Rgb::WHITE);
        // no faces to edit: the operation must return without mutation
        obj.assign_selection_to_active(false);
        assert_eq!(obj.mode, ObjectMode::Object);
    }

    #[test]
    fn test_select_active_group_faces_requires_edit_mode() {
        let mut obj = object();
        let id = obj.add_group("Group", Rgb::WHITE);
        obj.mesh.set_face_tag(2, id.raw());

        obj.select_active_group_faces(false);
        assert!(!obj.mesh.faces[2].selected);

        obj.mode = ObjectMode::Edit;
        obj.select_active_group_faces(false);
        assert!(obj.mesh.faces[2].selected);

        obj.select_active_group_faces(true);
        assert!(!obj.mesh.faces[2].selected);
    }

    #[test]
    fn test_find_parent_group_sets_active() {
        let mut obj = object();
        let first = obj.add_group("A", Rgb::WHITE);
        obj.add_group("B", Rgb::WHITE);
        obj.mesh.set_face_tag(1, first.raw());
        obj.mesh.faces[1].selected = true;
        obj.mode = ObjectMode::Edit;

        assert_eq!(obj.find_parent_group(), Some(first));
        assert_eq!(obj.groups.active_index(), 0);
    }

    #[test]
    fn test_find_parent_group_ignores_stale_tag() {
        let mut obj = object();
        obj.add_group("A", Rgb::WHITE);
        obj.mesh.set_face_tag(0, 99);
        obj.mesh.faces[0].selected = true;
        obj.mode = ObjectMode::Edit;

        assert_eq!(obj.find_parent_group(), None);
    }

    #[test]
    fn test_display_settings_clamp() {
        let mut settings = DisplaySettings::default();
        settings.set_overlay_alpha(1.8);
        assert_eq!(settings.overlay_alpha, 1.0);
        settings.set_overlay_alpha(-0.3);
        assert_eq!(settings.overlay_alpha, 0.0);
        settings.set_pole_size(5.0);
        assert_eq!(settings.pole_size, 2.0);
    }
}
