//! Scene container for mesh objects.

use std::collections::HashMap;

use retopo_core::MeshObject;
use uuid::Uuid;

/// Scene containing all mesh objects visible to the viewport.
#[derive(Default)]
pub struct Scene {
    objects: HashMap<Uuid, MeshObject>,
    selected: Option<Uuid>,
    dirty: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object to the scene and returns its id.
    pub fn add_object(&mut self, object: MeshObject) -> Uuid {
        let id = object.id;
        tracing::debug!("Adding object to scene: {} ({})", object.name, id);
        self.objects.insert(id, object);
        self.dirty = true;
        id
    }

    /// Removes an object from the scene.
    pub fn remove_object(&mut self, id: &Uuid) -> Option<MeshObject> {
        let removed = self.objects.remove(id);
        if removed.is_some() {
            self.dirty = true;
            if self.selected == Some(*id) {
                self.selected = None;
            }
        }
        removed
    }

    pub fn get_object(&self, id: &Uuid) -> Option<&MeshObject> {
        self.objects.get(id)
    }

    /// Mutable access marks the scene dirty: callers get it to edit.
    pub fn get_object_mut(&mut self, id: &Uuid) -> Option<&mut MeshObject> {
        let object = self.objects.get_mut(id);
        if object.is_some() {
            self.dirty = true;
        }
        object
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.objects.contains_key(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &MeshObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.selected = None;
        self.dirty = true;
    }

    /// The id of the object currently selected in the viewport.
    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    /// Selects an object; ids not present in the scene clear the selection.
    pub fn set_selected(&mut self, id: Option<Uuid>) {
        self.selected = id.filter(|id| self.objects.contains_key(id));
        self.dirty = true;
    }

    pub fn selected_object(&self) -> Option<&MeshObject> {
        self.selected.and_then(|id| self.objects.get(&id))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retopo_core::TopoMesh;

    fn scene_with_object() -> (Scene, Uuid) {
        let mut scene = Scene::new();
        let id = scene.add_object(MeshObject::new("cube", TopoMesh::new()));
        (scene, id)
    }

    #[test]
    fn test_add_and_get_object() {
        let (scene, id) = scene_with_object();
        assert!(scene.contains(&id));
        assert_eq!(scene.get_object(&id).unwrap().name, "cube");
        assert!(scene.is_dirty());
    }

    #[test]
    fn test_remove_clears_selection() {
        let (mut scene, id) = scene_with_object();
        scene.set_selected(Some(id));
        assert_eq!(scene.selected(), Some(id));

        scene.remove_object(&id);
        assert_eq!(scene.selected(), None);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_select_unknown_id_clears_selection() {
        let (mut scene, _) = scene_with_object();
        scene.set_selected(Some(Uuid::new_v4()));
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn test_mutable_access_marks_dirty() {
        let (mut scene, id) = scene_with_object();
        scene.clear_dirty();
        scene.get_object_mut(&id).unwrap().display.show_poles = true;
        assert!(scene.is_dirty());
    }
}
