//! Local node transformation: position, rotation and scale.
//!
//! The rotation is kept both as a quaternion (what animation tracks write)
//! and as XYZ Euler angles (what the panel and auto-rotation edit). Setting
//! either one re-derives the other so they never drift apart.

use cgmath::{Euler, Matrix4, One, Quaternion, Rad, Vector3};

#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    rotation: Quaternion<f32>,
    euler: Euler<Rad<f32>>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            euler: Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_trs(
        position: Vector3<f32>,
        rotation: Quaternion<f32>,
        scale: Vector3<f32>,
    ) -> Self {
        let mut transform = Self {
            position,
            scale,
            ..Self::new()
        };
        transform.set_rotation(rotation);
        transform
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) {
        self.rotation = rotation;
        self.euler = rotation.into();
    }

    /// Intrinsic XYZ angles of the rotation.
    pub fn euler(&self) -> Euler<Rad<f32>> {
        self.euler
    }

    pub fn set_euler(&mut self, euler: Euler<Rad<f32>>) {
        self.euler = euler;
        self.rotation = euler.into();
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
