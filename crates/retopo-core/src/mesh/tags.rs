//! Face tag layer: the per-face group attribute and its selection-coupled
//! operations.

use serde::{Deserialize, Serialize};

use super::{MirrorAxis, TopoMesh};

/// Tag value of faces that belong to no group.
pub const UNGROUPED_TAG: u32 = 0;

/// Face centers closer than this are considered mirror images.
const MIRROR_MATCH_EPSILON: f32 = 1e-5;

/// Integer attribute layer parallel to the mesh's face list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaceTagLayer {
    values: Vec<u32>,
}

impl FaceTagLayer {
    fn new(face_count: usize) -> Self {
        Self {
            values: vec![UNGROUPED_TAG; face_count],
        }
    }

    /// Grows or shrinks the layer to match the face count. New faces start
    /// untagged; existing tag data is preserved.
    pub(crate) fn resize(&mut self, face_count: usize) {
        self.values.resize(face_count, UNGROUPED_TAG);
    }

    pub fn get(&self, face: usize) -> u32 {
        self.values.get(face).copied().unwrap_or(UNGROUPED_TAG)
    }

    fn set(&mut self, face: usize, tag: u32) {
        if let Some(value) = self.values.get_mut(face) {
            *value = tag;
        }
    }
}

impl TopoMesh {
    /// Attaches the face tag layer if absent. Idempotent: repeated calls
    /// never destroy existing tag data.
    pub fn ensure_tag_layer(&mut self) {
        match &mut self.tags {
            Some(layer) => layer.resize(self.faces.len()),
            None => self.tags = Some(FaceTagLayer::new(self.faces.len())),
        }
    }

    /// Returns the tag layer, if one has been attached.
    pub fn tag_layer(&self) -> Option<&FaceTagLayer> {
        self.tags.as_ref()
    }

    /// The tag of one face; untagged when no layer is attached.
    pub fn face_tag(&self, face: usize) -> u32 {
        self.tags
            .as_ref()
            .map(|layer| layer.get(face))
            .unwrap_or(UNGROUPED_TAG)
    }

    /// Tags one face, attaching the layer if needed. Out-of-range face
    /// indices are ignored.
    pub fn set_face_tag(&mut self, face: usize, tag: u32) {
        self.ensure_tag_layer();
        if let Some(layer) = &mut self.tags {
            layer.set(face, tag);
        }
    }

    /// Resets every face carrying `tag` back to untagged. Used when the
    /// corresponding group is removed.
    pub fn clear_tags_for_group(&mut self, tag: u32) {
        if tag == UNGROUPED_TAG {
            return;
        }
        if let Some(layer) = &mut self.tags {
            for value in &mut layer.values {
                if *value == tag {
                    *value = UNGROUPED_TAG;
                }
            }
        }
    }

    /// Sets the selection flag of every face carrying `tag`.
    pub fn select_faces_by_tag(&mut self, tag: u32, deselect: bool) {
        for face in 0..self.faces.len() {
            if self.face_tag(face) == tag {
                self.faces[face].selected = !deselect;
            }
        }
    }

    /// The tag of the first selected face (in index order) with a nonzero
    /// tag, used to find the parent group of a selection.
    pub fn first_selected_group(&self) -> Option<u32> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.selected)
            .map(|(i, _)| self.face_tag(i))
            .find(|&tag| tag != UNGROUPED_TAG)
    }

    /// Tags all currently selected faces.
    ///
    /// With a mirror axis the selection is first extended with the mirror
    /// image of each selected face, every selected face is tagged, and the
    /// selection is then restored to exactly the pre-call snapshot.
    pub fn assign_tag_to_selected(&mut self, tag: u32, mirror: Option<MirrorAxis>) {
        self.ensure_tag_layer();

        let snapshot: Vec<bool> = self.faces.iter().map(|f| f.selected).collect();

        if let Some(axis) = mirror {
            self.extend_selection_mirrored(axis);
        }

        for face in 0..self.faces.len() {
            if !self.faces[face].selected {
                continue;
            }
            self.set_face_tag(face, tag);

            // faces selected only for mirroring are released again
            if mirror.is_some() && !snapshot[face] {
                self.faces[face].selected = false;
            }
        }
    }

    /// Extends the selection with, for every selected face, the face whose
    /// center is its mirror image across the axis plane.
    pub fn extend_selection_mirrored(&mut self, axis: MirrorAxis) {
        let centers: Vec<_> = (0..self.faces.len()).map(|f| self.face_center(f)).collect();

        let mut added = Vec::new();
        for (face, center) in centers.iter().enumerate() {
            if !self.faces[face].selected {
                continue;
            }
            let mirrored = axis.mirror(*center);
            for (other, other_center) in centers.iter().enumerate() {
                if other != face && mirrored.distance(*other_center) < MIRROR_MATCH_EPSILON {
                    added.push(other);
                    break;
                }
            }
        }

        for face in added {
            self.faces[face].selected = true;
        }
    }
}
