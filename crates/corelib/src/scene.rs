//! Flat scene: a list of independently transformed mesh instances.
//! No parenting; each object carries its own model matrix.

use crate::{
    EulerRot, Mat4, Quat, Vec3,
    error::{CoreError, CoreResult},
};

/// Object id (dense index into the scene list).
pub type ObjectId = u32;

/// Translation, Euler XYZ rotation (radians) and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation_euler: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation_euler: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// T * R * S.
    pub fn matrix(&self) -> Mat4 {
        let [x, y, z] = self.rotation_euler.to_array();
        let q = Quat::from_euler(EulerRot::XYZ, x, y, z);
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One drawable instance. `mesh` is a slot in whatever mesh store the
/// renderer keeps; the scene never looks inside it.
#[derive(Clone, Copy, Debug)]
pub struct SceneObject {
    pub transform: Transform,
    pub mesh: usize,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, mesh: usize, transform: Transform) -> ObjectId {
        let id = self.objects.len() as ObjectId;
        self.objects.push(SceneObject {
            transform,
            mesh,
            visible: true,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> CoreResult<&mut SceneObject> {
        self.objects
            .get_mut(id as usize)
            .ok_or(CoreError::UnknownObject(id))
    }

    /// Flip visibility; returns the new state.
    pub fn toggle_visible(&mut self, id: ObjectId) -> CoreResult<bool> {
        let obj = self.get_mut(id)?;
        obj.visible = !obj.visible;
        Ok(obj.visible)
    }

    /// Visible objects with their model matrices, in spawn order.
    pub fn visible(&self) -> impl Iterator<Item = (ObjectId, &SceneObject, Mat4)> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, obj)| obj.visible)
            .map(|(i, obj)| (i as ObjectId, obj, obj.transform.matrix()))
    }
}
