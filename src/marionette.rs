//! Pose application layer.
//!
//! Moves rotations between the discretized pose and a live skeleton. Every
//! capture writes the rounded value back onto the live object so that what
//! is displayed is always what would be serialized.

use nalgebra::Vector3;

use crate::bones::BoneAxisTable;
use crate::error::{PoseError, Result};
use crate::euler::Axis;
use crate::rig::{LiveBone, LiveSkeleton};
use crate::serializer::PoseCodec;

/// Writes every decoded bone rotation onto `skeleton`.
///
/// All live bones are resolved before the first write, so a missing bone
/// leaves the skeleton untouched.
pub fn apply_decoded_pose<S: LiveSkeleton>(codec: &PoseCodec<'_>, skeleton: &mut S) -> Result<()> {
    let table = codec.table();
    let rotations = codec.get_bones_rotation();

    let live_names = rotations
        .iter()
        .map(|(name, _)| {
            let live_name = table.live_name(name);
            match skeleton.bone(&live_name) {
                Some(_) => Ok(live_name),
                None => Err(PoseError::BoneNotFound(live_name)),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    for (live_name, (_, rotation)) in live_names.iter().zip(rotations) {
        if let Some(bone) = skeleton.bone_mut(live_name) {
            bone.set_rotation(rotation);
        }
    }
    Ok(())
}

/// Stores the live rotation of `bone` and snaps the bone to the stored value.
pub fn capture_live_bone<B: LiveBone>(codec: &mut PoseCodec<'_>, bone: &mut B) -> Result<()> {
    let table = codec.table();
    let name = table
        .config_name(bone.name())
        .filter(|name| table.try_lookup(name).is_some())
        .ok_or_else(|| PoseError::BoneNotFound(bone.name().to_string()))?;

    codec.load_bone_rotation(name, &bone.rotation())?;
    let snapped = codec.get_bone_rotation(name)?;
    bone.set_rotation(snapped);
    Ok(())
}

/// Stores the live model position and snaps it to the stored value.
pub fn capture_live_position(codec: &mut PoseCodec<'_>, position: &mut Vector3<f32>) {
    codec.load_model_position(*position);
    *position = codec.get_model_position();
}

// ─── Marionette ───────────────────────────────────────────────────────────────

/// One posable figure: its discretized pose, its live skeleton and its live
/// model position.
#[derive(Debug, Clone)]
pub struct Marionette<'a, S: LiveSkeleton> {
    codec: PoseCodec<'a>,
    skeleton: S,
    position: Vector3<f32>,
}

impl<'a, S: LiveSkeleton> Marionette<'a, S> {
    /// Creates the figure in the neutral pose and writes that pose onto
    /// `skeleton`, so the live bones match the stored digits from the start.
    pub fn new(table: &'a BoneAxisTable, mut skeleton: S) -> Result<Self> {
        let codec = PoseCodec::new(table);
        apply_decoded_pose(&codec, &mut skeleton)?;
        let position = codec.get_model_position();
        Ok(Self {
            codec,
            skeleton,
            position,
        })
    }

    pub fn codec(&self) -> &PoseCodec<'a> {
        &self.codec
    }

    pub fn skeleton(&self) -> &S {
        &self.skeleton
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Decodes `pose` and applies it to the live skeleton and position.
    ///
    /// On error neither the stored pose nor the skeleton change.
    pub fn load_from_string(&mut self, pose: &str) -> Result<()> {
        let mut decoded = self.codec.clone();
        decoded.from_string(pose)?;
        apply_decoded_pose(&decoded, &mut self.skeleton)?;

        self.position = decoded.get_model_position();
        self.codec = decoded;
        Ok(())
    }

    pub fn to_pose_string(&mut self) -> Result<String> {
        capture_live_position(&mut self.codec, &mut self.position);
        let pose = self.codec.to_string()?;
        tracing::debug!("encoded pose {pose}");
        Ok(pose)
    }

    /// Drags bone `name` by `delta` radians on the axis selected by
    /// `axis_modifier`, within the bone bounds.
    ///
    /// # Arguments
    ///
    /// * `name` - Table name of the bone
    /// * `delta` - Raw drag amount, negated for reversed bones
    /// * `axis_modifier` - Index into the bone's drag axes; past the end the
    ///   drag is ignored
    pub fn rotate_bone(&mut self, name: &str, delta: f32, axis_modifier: usize) -> Result<()> {
        let table = self.codec.table();
        let spec = table.lookup(name)?;
        let Some(axis) = spec.drag_axis(axis_modifier) else {
            return Ok(());
        };

        let min = self.codec.round_bone_rotation(name, spec.min_angle())?[axis.index()];
        let max = self.codec.round_bone_rotation(name, spec.max_angle())?[axis.index()];
        let delta = if spec.reverse_direction() { -delta } else { delta };

        let live_name = table.live_name(name);
        let bone = self
            .skeleton
            .bone_mut(&live_name)
            .ok_or(PoseError::BoneNotFound(live_name))?;

        let mut rotation = bone.rotation();
        rotation.order = spec.rotation_order();
        rotation.set_angle(axis, (rotation.angle(axis) + delta).max(min).min(max));
        bone.set_rotation(rotation);

        capture_live_bone(&mut self.codec, bone)
    }

    /// Turns the whole figure by `delta` radians around `axis`. The root
    /// angle wraps around its bounds instead of stopping at them.
    pub fn rotate_root(&mut self, delta: f32, axis: Axis) -> Result<()> {
        let table = self.codec.table();
        let spec = table.lookup(table.root())?;
        let min = spec.min_angle()[axis.index()];
        let range = spec.max_angle()[axis.index()] - min;
        if !spec.slot(axis).is_active() || range <= 0.0 {
            return Ok(());
        }

        let live_name = table.live_name(table.root());
        let bone = self
            .skeleton
            .bone_mut(&live_name)
            .ok_or(PoseError::BoneNotFound(live_name))?;

        let mut rotation = bone.rotation();
        rotation.order = spec.rotation_order();
        rotation.set_angle(axis, min + (rotation.angle(axis) + delta - min).rem_euclid(range));
        bone.set_rotation(rotation);

        capture_live_bone(&mut self.codec, bone)
    }

    /// Moves the figure, staying inside the position cube.
    pub fn translate(&mut self, delta: Vector3<f32>) {
        let position_codec = self.codec.table().position_codec();
        self.position = position_codec.clamp(self.position + delta);
        capture_live_position(&mut self.codec, &mut self.position);
    }

    /// Captures live bone `live_name` if the table knows it.
    ///
    /// # Returns
    ///
    /// `false` when the table has no entry for the bone.
    pub fn try_capture_live_bone(&mut self, live_name: &str) -> Result<bool> {
        let table = self.codec.table();
        let configured = table
            .config_name(live_name)
            .and_then(|name| table.try_lookup(name))
            .is_some();
        if !configured {
            tracing::warn!("bone {live_name} is not posable, skipping capture");
            return Ok(false);
        }

        let bone = self
            .skeleton
            .bone_mut(live_name)
            .ok_or_else(|| PoseError::BoneNotFound(live_name.to_string()))?;
        capture_live_bone(&mut self.codec, bone)?;
        Ok(true)
    }
}
