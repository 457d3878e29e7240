//! Euler rotations as the pose codec stores them.
//!
//! Bone rotations travel through the crate as [`Euler`] angles in radians with
//! the order of their bone. A scene graph that keeps quaternions converts with
//! [`Euler::to_quaternion`], which composes the elemental rotations around
//! [`Axis::unit`] in that order.

use std::fmt;

use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// One of the three Euler components of a bone rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Unit<Vector3<f32>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Order in which the three elemental rotations of an [`Euler`] are applied.
///
/// The naming follows the usual scene-graph convention: `Xyz` builds the
/// rotation matrix as `Rx * Ry * Rz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl RotationOrder {
    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotationOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            RotationOrder::Xzy => [Axis::X, Axis::Z, Axis::Y],
            RotationOrder::Yxz => [Axis::Y, Axis::X, Axis::Z],
            RotationOrder::Yzx => [Axis::Y, Axis::Z, Axis::X],
            RotationOrder::Zxy => [Axis::Z, Axis::X, Axis::Y],
            RotationOrder::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }
}

/// Euler angles in radians together with their application order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: RotationOrder,
}

impl Euler {
    pub fn new(x: f32, y: f32, z: f32, order: RotationOrder) -> Self {
        Self { x, y, z, order }
    }

    /// Builds an Euler from a vector of angles, as the pose codec stores them.
    pub fn from_vector(angles: Vector3<f32>, order: RotationOrder) -> Self {
        Self::new(angles.x, angles.y, angles.z, order)
    }

    /// Raw angle components, independent of the order.
    pub fn to_vector(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn angle(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set_angle(&mut self, axis: Axis, angle: f32) {
        match axis {
            Axis::X => self.x = angle,
            Axis::Y => self.y = angle,
            Axis::Z => self.z = angle,
        }
    }

    /// Composes the three elemental rotations in `order`.
    ///
    /// [`LiveBone`](crate::rig::LiveBone) implementations backed by a
    /// quaternion scene graph call this in `set_rotation`.
    ///
    /// # Returns
    ///
    /// The local rotation a scene graph would apply to the bone.
    pub fn to_quaternion(&self) -> UnitQuaternion<f32> {
        self.order
            .axes()
            .iter()
            .fold(UnitQuaternion::identity(), |rotation, axis| {
                rotation * UnitQuaternion::from_axis_angle(&axis.unit(), self.angle(*axis))
            })
    }

    pub fn to_degrees(&self) -> [f32; 3] {
        [self.x.to_degrees(), self.y.to_degrees(), self.z.to_degrees()]
    }
}
