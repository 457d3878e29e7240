//! Read-only per-bone axis configuration.
//!
//! The table order and each bone's active axes fix the column layout of the
//! pose string. A table is built once from a [`BoneTableConfig`] and shared by
//! reference afterwards.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::codec::BoundedValueCodec;
use crate::config::BoneTableConfig;
use crate::error::{PoseError, Result};
use crate::euler::{Axis, RotationOrder};
use crate::rig::LiveSkeleton;
use crate::vector::{DoubleVectorCodec, VectorCodec};

/// Width of the position block at the end of a pose string.
pub const POSITION_WIDTH: usize = 6;

/// Serialization state of one Euler axis of a bone. Bounds are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisSlot {
    Active { min: f32, max: f32 },
    Disabled,
}

impl AxisSlot {
    pub fn is_active(&self) -> bool {
        matches!(self, AxisSlot::Active { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoneSpec {
    name: String,
    axes: [AxisSlot; 3],
    drag_axes: Vec<Axis>,
    rotation_order: RotationOrder,
    reverse_direction: bool,
    codec: VectorCodec,
}

impl BoneSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slots in X, Y, Z order.
    pub fn axes(&self) -> &[AxisSlot; 3] {
        &self.axes
    }

    pub fn slot(&self, axis: Axis) -> AxisSlot {
        self.axes[axis.index()]
    }

    pub fn active_count(&self) -> usize {
        self.codec.active_count()
    }

    /// Axis driven by the given drag modifier, if the bone has that many axes.
    pub fn drag_axis(&self, modifier: usize) -> Option<Axis> {
        self.drag_axes.get(modifier).copied()
    }

    pub fn rotation_order(&self) -> RotationOrder {
        self.rotation_order
    }

    pub fn reverse_direction(&self) -> bool {
        self.reverse_direction
    }

    /// Lower angle bounds; disabled axes report 0.
    pub fn min_angle(&self) -> Vector3<f32> {
        Vector3::from_fn(|index, _| match self.axes[index] {
            AxisSlot::Active { min, .. } => min,
            AxisSlot::Disabled => 0.0,
        })
    }

    /// Upper angle bounds; disabled axes report 0.
    pub fn max_angle(&self) -> Vector3<f32> {
        Vector3::from_fn(|index, _| match self.axes[index] {
            AxisSlot::Active { max, .. } => max,
            AxisSlot::Disabled => 0.0,
        })
    }

    /// Codec of the active axes of this bone.
    pub fn codec(&self) -> &VectorCodec {
        &self.codec
    }
}

#[derive(Debug, Clone)]
pub struct BoneAxisTable {
    bones: Vec<BoneSpec>,
    index: HashMap<String, usize>,
    root: String,
    name_prefix: String,
    position_codec: DoubleVectorCodec,
    active_axis_count: usize,
}

impl BoneAxisTable {
    /// Validates `config` and converts its degree bounds to radians.
    pub fn from_config(config: &BoneTableConfig) -> Result<Self> {
        if !(config.position_bound > 0.0) {
            return Err(PoseError::InvalidTable(format!(
                "position bound must be positive but is {}",
                config.position_bound
            )));
        }

        let mut bones = Vec::with_capacity(config.bones.len());
        let mut index = HashMap::with_capacity(config.bones.len());

        for bone in &config.bones {
            if index.insert(bone.name.clone(), bones.len()).is_some() {
                return Err(PoseError::DuplicateBone(bone.name.clone()));
            }

            let mut axes = [AxisSlot::Disabled; 3];
            for axis in &bone.axes {
                let slot = &mut axes[axis.index()];
                if slot.is_active() {
                    return Err(PoseError::InvalidTable(format!(
                        "axis {axis} of bone {} is listed twice",
                        bone.name
                    )));
                }

                let min = bone.min_deg[axis.index()].to_radians();
                let max = bone.max_deg[axis.index()].to_radians();
                if !(min < max) {
                    return Err(PoseError::InvalidBounds {
                        bone: bone.name.clone(),
                        axis: *axis,
                        min: bone.min_deg[axis.index()],
                        max: bone.max_deg[axis.index()],
                    });
                }
                *slot = AxisSlot::Active { min, max };
            }

            let codec = VectorCodec::new(axes.map(|slot| match slot {
                AxisSlot::Active { min, max } => Some(BoundedValueCodec::new(min, max)),
                AxisSlot::Disabled => None,
            }));

            bones.push(BoneSpec {
                name: bone.name.clone(),
                axes,
                drag_axes: bone.axes.clone(),
                rotation_order: bone.rotation_order,
                reverse_direction: bone.reverse,
                codec,
            });
        }

        if !index.contains_key(&config.root) {
            return Err(PoseError::InvalidTable(format!(
                "root bone {} is not configured",
                config.root
            )));
        }

        let active_axis_count = bones.iter().map(BoneSpec::active_count).sum();

        Ok(Self {
            bones,
            index,
            root: config.root.clone(),
            name_prefix: config.name_prefix.clone(),
            position_codec: DoubleVectorCodec::cube(config.position_bound),
            active_axis_count,
        })
    }

    pub fn bones(&self) -> &[BoneSpec] {
        &self.bones
    }

    pub fn lookup(&self, name: &str) -> Result<&BoneSpec> {
        self.try_lookup(name)
            .ok_or_else(|| PoseError::BoneNotFound(name.to_string()))
    }

    /// Lookup for callers that skip unconfigured bones on purpose.
    pub fn try_lookup(&self, name: &str) -> Option<&BoneSpec> {
        self.index.get(name).map(|index| &self.bones[*index])
    }

    /// Position of bone `name` in the table, which is its column in the pose.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Name of the configured bone `name` in the live skeleton.
    pub fn live_name(&self, name: &str) -> String {
        format!("{}{}", self.name_prefix, name)
    }

    /// Inverse of [`BoneAxisTable::live_name`].
    pub fn config_name<'a>(&self, live_name: &'a str) -> Option<&'a str> {
        live_name.strip_prefix(self.name_prefix.as_str())
    }

    pub fn position_codec(&self) -> &DoubleVectorCodec {
        &self.position_codec
    }

    /// Number of rotation characters in a pose string.
    pub fn active_axis_count(&self) -> usize {
        self.active_axis_count
    }

    pub fn expected_length(&self) -> usize {
        self.active_axis_count + POSITION_WIDTH
    }

    /// Calls `f` for every configured bone except the root, with the matching
    /// live bone. Fails on the first configured bone missing from `skeleton`.
    pub fn for_each_enabled_bone<S, F>(&self, skeleton: &S, mut f: F) -> Result<()>
    where
        S: LiveSkeleton,
        F: FnMut(&BoneSpec, &S::Bone),
    {
        for spec in self.bones.iter().filter(|spec| spec.name != self.root) {
            let live_name = self.live_name(&spec.name);
            let bone = skeleton
                .bone(&live_name)
                .ok_or(PoseError::BoneNotFound(live_name))?;
            f(spec, bone);
        }
        Ok(())
    }

    /// Names of configured bones (root excluded) the skeleton lacks.
    pub fn check_rig<S: LiveSkeleton>(&self, skeleton: &S) -> Vec<String> {
        self.bones
            .iter()
            .filter(|spec| spec.name != self.root)
            .map(|spec| self.live_name(&spec.name))
            .filter(|live_name| skeleton.bone(live_name).is_none())
            .collect()
    }

    /// Names of every table bone, root first, that the skeleton lacks. An
    /// empty result means a decoded pose can be applied to `skeleton`.
    pub fn missing_pose_bones<S: LiveSkeleton>(&self, skeleton: &S) -> Vec<String> {
        let root = self.live_name(&self.root);
        let mut missing = Vec::new();
        if skeleton.bone(&root).is_none() {
            missing.push(root);
        }
        missing.extend(self.check_rig(skeleton));
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoneConfig;
    use crate::rig::{LiveBone, Rig};

    fn default_table() -> BoneAxisTable {
        BoneAxisTable::from_config(&BoneTableConfig::default()).expect("default table")
    }

    fn small_config() -> BoneTableConfig {
        BoneTableConfig {
            name_prefix: "rig:".to_string(),
            root: "Root".to_string(),
            position_bound: 1.0,
            bones: vec![
                BoneConfig {
                    name: "Root".to_string(),
                    axes: vec![Axis::X, Axis::Y, Axis::Z],
                    rotation_order: RotationOrder::Xyz,
                    reverse: false,
                    min_deg: [-180.0; 3],
                    max_deg: [180.0; 3],
                },
                BoneConfig {
                    name: "Knee".to_string(),
                    axes: vec![Axis::X],
                    rotation_order: RotationOrder::Zyx,
                    reverse: true,
                    min_deg: [0.0, 0.0, 0.0],
                    max_deg: [150.0, 0.0, 0.0],
                },
            ],
        }
    }

    #[test]
    fn given_default_table_when_counting_axes_then_length_is_98() {
        let table = default_table();
        assert_eq!(table.active_axis_count(), 92);
        assert_eq!(table.expected_length(), 98);
    }

    #[test]
    fn given_bounds_in_degrees_when_building_then_they_are_stored_in_radians() {
        let table = default_table();
        let leg = table.lookup("LeftLeg").expect("left leg");
        assert_eq!(leg.slot(Axis::X), AxisSlot::Active { min: 0.0, max: 150f32.to_radians() });
        assert_eq!(leg.slot(Axis::Y), AxisSlot::Disabled);
        assert_eq!(leg.active_count(), 1);
        assert_eq!(leg.max_angle(), Vector3::new(150f32.to_radians(), 0.0, 0.0));
    }

    #[test]
    fn given_unknown_name_when_looking_up_then_bone_not_found() {
        let table = default_table();
        assert_eq!(
            table.lookup("Tail").unwrap_err(),
            PoseError::BoneNotFound("Tail".to_string())
        );
        assert!(table.try_lookup("Tail").is_none());
    }

    #[test]
    fn given_drag_order_when_querying_modifier_then_axis_follows_config_order() {
        let table = default_table();
        let up_leg = table.lookup("RightUpLeg").expect("up leg");
        assert_eq!(up_leg.drag_axis(0), Some(Axis::X));
        assert_eq!(up_leg.drag_axis(1), Some(Axis::Z));
        assert_eq!(up_leg.drag_axis(2), Some(Axis::Y));
        assert_eq!(up_leg.drag_axis(3), None);
        assert!(up_leg.reverse_direction());
    }

    #[test]
    fn given_duplicate_bone_when_building_then_error() {
        let mut config = small_config();
        config.bones.push(config.bones[1].clone());
        assert_eq!(
            BoneAxisTable::from_config(&config).unwrap_err(),
            PoseError::DuplicateBone("Knee".to_string())
        );
    }

    #[test]
    fn given_inverted_bounds_on_active_axis_when_building_then_invalid_bounds() {
        let mut config = small_config();
        config.bones[1].max_deg = [0.0, 0.0, 0.0];
        assert!(matches!(
            BoneAxisTable::from_config(&config),
            Err(PoseError::InvalidBounds { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn given_missing_root_or_bad_cube_when_building_then_invalid_table() {
        let mut config = small_config();
        config.root = "Pelvis".to_string();
        assert!(matches!(
            BoneAxisTable::from_config(&config),
            Err(PoseError::InvalidTable(_))
        ));

        let mut config = small_config();
        config.position_bound = 0.0;
        assert!(matches!(
            BoneAxisTable::from_config(&config),
            Err(PoseError::InvalidTable(_))
        ));

        let mut config = small_config();
        config.bones[1].axes = vec![Axis::X, Axis::X];
        assert!(matches!(
            BoneAxisTable::from_config(&config),
            Err(PoseError::InvalidTable(_))
        ));
    }

    #[test]
    fn given_complete_rig_when_iterating_enabled_bones_then_root_is_skipped() {
        let table = BoneAxisTable::from_config(&small_config()).expect("table");
        let rig = Rig::from_table(&table);

        let mut visited = Vec::new();
        table
            .for_each_enabled_bone(&rig, |spec, bone| {
                visited.push((spec.name().to_string(), bone.name().to_string()));
            })
            .expect("all bones present");

        assert_eq!(visited, vec![("Knee".to_string(), "rig:Knee".to_string())]);
    }

    #[test]
    fn given_rig_missing_a_bone_when_iterating_then_bone_not_found() {
        let table = default_table();
        let mut rig = Rig::new();
        rig.add_bone("mixamorigSpine");

        let err = table.for_each_enabled_bone(&rig, |_, _| {}).unwrap_err();
        assert_eq!(err, PoseError::BoneNotFound("mixamorigSpine1".to_string()));
        assert_eq!(table.check_rig(&rig).len(), 50);
    }

    #[test]
    fn given_rig_without_root_when_checking_pose_bones_then_root_is_reported() {
        let table = default_table();
        let mut rig = Rig::new();
        for spec in table.bones().iter().filter(|spec| spec.name() != "Hips") {
            rig.add_bone(table.live_name(spec.name()));
        }

        assert!(table.check_rig(&rig).is_empty());
        assert_eq!(table.missing_pose_bones(&rig), vec!["mixamorigHips".to_string()]);
        assert!(table.missing_pose_bones(&Rig::from_table(&table)).is_empty());
    }

    #[test]
    fn given_prefixed_name_when_converting_then_config_name_is_recovered() {
        let table = default_table();
        assert_eq!(table.live_name("Head"), "mixamorigHead");
        assert_eq!(table.config_name("mixamorigHead"), Some("Head"));
        assert_eq!(table.config_name("Head"), None);
    }
}
