//! Whole-pose codec.
//!
//! [`PoseCodec`] owns the discretized pose of one marionette: one digit
//! vector per configured bone plus the double precision model position.
//! Live values are always rounded toward this state, which is the exact
//! content of the pose string.

use nalgebra::Vector3;

use crate::bones::{BoneAxisTable, BoneSpec};
use crate::codec::{Codec, RoundTo};
use crate::error::{PoseError, Result};
use crate::euler::Euler;
use crate::vector::{DiscreteVector, DoubleDiscreteVector, NEUTRAL_DOUBLE_VECTOR, NEUTRAL_VECTOR};

#[derive(Debug, Clone)]
pub struct PoseCodec<'a> {
    table: &'a BoneAxisTable,
    /// Indexed like `table.bones()`.
    bone_rotations: Vec<DiscreteVector>,
    position: DoubleDiscreteVector,
}

impl<'a> PoseCodec<'a> {
    /// Neutral pose: every digit at the mid point, model at the origin.
    pub fn new(table: &'a BoneAxisTable) -> Self {
        Self {
            table,
            bone_rotations: vec![NEUTRAL_VECTOR; table.bones().len()],
            position: NEUTRAL_DOUBLE_VECTOR,
        }
    }

    pub fn table(&self) -> &'a BoneAxisTable {
        self.table
    }

    // ─── String form ──────────────────────────────────────────────────────────

    /// Replaces the whole discretized state with the content of `pose`.
    ///
    /// Nothing is written unless every field decodes.
    ///
    /// # Arguments
    ///
    /// * `pose` - A string of exactly [`BoneAxisTable::expected_length`]
    ///   alphabet characters
    pub fn from_string(&mut self, pose: &str) -> Result<()> {
        let expected = self.table.expected_length();
        let actual = pose.chars().count();
        if actual != expected {
            return Err(PoseError::LengthMismatch { expected, actual });
        }
        if !pose.is_ascii() {
            return Err(PoseError::serialization(format!(
                "pose string contains characters outside the alphabet: {pose}"
            )));
        }

        let mut bone_rotations = Vec::with_capacity(self.bone_rotations.len());
        let mut offset = 0;
        for spec in self.table.bones() {
            let codec = spec.codec();
            let end = offset + codec.width();
            bone_rotations.push(codec.read_discrete(&pose[offset..end])?);
            offset = end;
        }
        let position = self.table.position_codec().read_discrete(&pose[offset..])?;

        self.bone_rotations = bone_rotations;
        self.position = position;
        tracing::debug!("loaded pose {pose}");
        Ok(())
    }

    /// Bones in table order, active axes only, then the position block.
    pub fn to_string(&self) -> Result<String> {
        let mut out = String::with_capacity(self.table.expected_length());
        for (spec, digits) in self.table.bones().iter().zip(&self.bone_rotations) {
            spec.codec().write_discrete(digits, &mut out)?;
        }
        self.table
            .position_codec()
            .write_discrete(&self.position, &mut out)?;
        Ok(out)
    }

    // ─── Bone rotations ───────────────────────────────────────────────────────

    /// Decoded rotation of every configured bone, in table order.
    pub fn get_bones_rotation(&self) -> Vec<(&'a str, Euler)> {
        self.table
            .bones()
            .iter()
            .zip(&self.bone_rotations)
            .map(|(spec, digits)| (spec.name(), rotation_of(spec, digits)))
            .collect()
    }

    pub fn get_bone_rotation(&self, name: &str) -> Result<Euler> {
        let (spec, digits) = self.entry(name)?;
        Ok(rotation_of(spec, digits))
    }

    /// Re-discretizes one bone from a live rotation. Disabled axes of the
    /// rotation are ignored.
    pub fn load_bone_rotation(&mut self, name: &str, rotation: &Euler) -> Result<()> {
        let index = self.index_of(name)?;
        let spec = &self.table.bones()[index];
        let digits = spec.codec().discretize(rotation.to_vector(), RoundTo::Nearest);
        tracing::debug!("captured bone {name}: {digits:?}");
        self.bone_rotations[index] = digits;
        Ok(())
    }

    /// Snaps raw angles of bone `name` onto the grid its rotation is stored on.
    pub fn round_bone_rotation(&self, name: &str, angles: Vector3<f32>) -> Result<Vector3<f32>> {
        Ok(self.table.lookup(name)?.codec().round(angles))
    }

    pub fn bone_digits(&self, name: &str) -> Result<DiscreteVector> {
        let (_, digits) = self.entry(name)?;
        Ok(*digits)
    }

    // ─── Model position ───────────────────────────────────────────────────────

    pub fn get_model_position(&self) -> Vector3<f32> {
        self.table.position_codec().make_continuous(&self.position)
    }

    /// Re-discretizes the model position. Components outside the position
    /// cube are clamped.
    pub fn load_model_position(&mut self, position: Vector3<f32>) {
        self.position = self
            .table
            .position_codec()
            .discretize(position, RoundTo::Nearest);
        tracing::debug!("captured position: {:?}", self.position);
    }

    pub fn position_digits(&self) -> DoubleDiscreteVector {
        self.position
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.table
            .index_of(name)
            .ok_or_else(|| PoseError::BoneNotFound(name.to_string()))
    }

    fn entry(&self, name: &str) -> Result<(&'a BoneSpec, &DiscreteVector)> {
        let index = self.index_of(name)?;
        Ok((&self.table.bones()[index], &self.bone_rotations[index]))
    }
}

fn rotation_of(spec: &BoneSpec, digits: &DiscreteVector) -> Euler {
    Euler::from_vector(spec.codec().make_continuous(digits), spec.rotation_order())
}
