use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::euler::{
    Axis::{self, X, Y, Z},
    RotationOrder,
};

/// Serialized description of one posable bone.
///
/// `axes` lists the active axes in drag order: the first entry is driven
/// without modifier, the second with the first modifier and so on. Axes not
/// listed are not serialized. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneConfig {
    pub name: String,
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub rotation_order: RotationOrder,
    #[serde(default)]
    pub reverse: bool,
    pub min_deg: [f32; 3],
    pub max_deg: [f32; 3],
}

/// Persisted rig table. The bone order defines the pose string layout, so
/// editing this file changes the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneTableConfig {
    /// Prefix the loaded rig puts in front of every bone name.
    pub name_prefix: String,
    /// Bone moved by whole-body rotation rather than by per-bone dragging.
    pub root: String,
    /// Half size of the cube the model position is quantized over.
    pub position_bound: f32,
    pub bones: Vec<BoneConfig>,
}

impl Default for BoneTableConfig {
    fn default() -> Self {
        Self {
            name_prefix: "mixamorig".to_string(),
            root: "Hips".to_string(),
            position_bound: 2.0,
            bones: humanoid_bones(),
        }
    }
}

fn bone(name: &str, axes: &[Axis], reverse: bool, min_deg: [f32; 3], max_deg: [f32; 3]) -> BoneConfig {
    BoneConfig {
        name: name.to_string(),
        axes: axes.to_vec(),
        rotation_order: RotationOrder::Xyz,
        reverse,
        min_deg,
        max_deg,
    }
}

// ─── Built-in humanoid (mixamo x-bot) ─────────────────────────────────────────

#[rustfmt::skip]
fn humanoid_bones() -> Vec<BoneConfig> {
    let mut bones = vec![
        bone("Hips", &[X, Y, Z], false, [-360.0, -360.0, -360.0], [360.0, 360.0, 360.0]),
        bone("Spine", &[X, Y, Z], false, [-85.0, -35.0, -30.0], [85.0, 35.0, 30.0]),
        bone("Spine1", &[X, Y, Z], false, [-30.0, -35.0, -30.0], [55.0, 35.0, 30.0]),
        bone("Spine2", &[X, Y, Z], false, [-30.0, -35.0, -30.0], [55.0, 35.0, 30.0]),
        bone("Neck", &[X, Y, Z], false, [-50.0, -45.0, -40.0], [30.0, 45.0, 40.0]),
        bone("Head", &[X, Y, Z], false, [-50.0, -45.0, -40.0], [30.0, 45.0, 40.0]),
    ];

    for side in ["Left", "Right"] {
        bones.extend([
            bone(&format!("{side}UpLeg"), &[X, Z, Y], true, [-155.0, -30.0, -15.0], [85.0, 30.0, 2.0]),
            bone(&format!("{side}Leg"), &[X], false, [0.0, 0.0, 0.0], [150.0, 0.0, 0.0]),
            bone(&format!("{side}Foot"), &[X, Y], false, [-45.0, -85.0, 0.0], [55.0, 40.0, 0.0]),
            bone(&format!("{side}ToeBase"), &[X], false, [-15.0, 0.0, 0.0], [65.0, 0.0, 0.0]),
        ]);
    }

    bones.extend([
        bone("LeftShoulder", &[Z, Y, X], false, [-40.0, -60.0, -40.0], [40.0, 50.0, 40.0]),
        bone("LeftArm", &[Z, Y, X], true, [-180.0, -90.0, -105.0], [0.0, 90.0, 40.0]),
        bone("LeftForeArm", &[Z], true, [0.0, 0.0, 0.0], [0.0, 0.0, 160.0]),
        bone("LeftHand", &[Z, Y, X], true, [-20.0, -35.0, -90.0], [180.0, 40.0, 90.0]),
        bone("RightShoulder", &[Z, Y, X], false, [-40.0, -60.0, -40.0], [40.0, 50.0, 40.0]),
        bone("RightArm", &[Z, Y, X], false, [-180.0, -90.0, -40.0], [0.0, 90.0, 105.0]),
        bone("RightForeArm", &[Z], false, [0.0, 0.0, -160.0], [0.0, 0.0, 0.0]),
        bone("RightHand", &[Z, Y, X], false, [-20.0, -40.0, -90.0], [180.0, 35.0, 90.0]),
    ]);

    for side in ["Left", "Right"] {
        bones.extend([
            bone(&format!("{side}HandThumb1"), &[Y, X], true, [-60.0, -40.0, 0.0], [20.0, 20.0, 0.0]),
            bone(&format!("{side}HandThumb2"), &[Y], true, [0.0, -10.0, 0.0], [0.0, 80.0, 0.0]),
            bone(&format!("{side}HandThumb3"), &[Y], true, [0.0, -50.0, 0.0], [0.0, 90.0, 0.0]),
        ]);
        for finger in ["Index", "Middle", "Ring", "Pinky"] {
            let (min_y, max_x, max_y) = match finger {
                "Index" | "Middle" => (-30.0, 30.0, 15.0),
                _ => (-15.0, 0.0, 30.0),
            };
            bones.extend([
                bone(&format!("{side}Hand{finger}1"), &[Z, Y], true, [0.0, min_y, -90.0], [max_x, max_y, 20.0]),
                bone(&format!("{side}Hand{finger}2"), &[Z], true, [0.0, 0.0, -110.0], [0.0, 0.0, 0.0]),
                bone(&format!("{side}Hand{finger}3"), &[Z], true, [0.0, 0.0, -80.0], [0.0, 0.0, 0.0]),
            ]);
        }
    }

    bones
}

/// Save a bone table configuration to a JSON file.
pub fn save_bone_table_config(path: &Path, config: &BoneTableConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .context("failed to serialize bone table configuration as JSON")?;
    fs::write(path, content)
        .with_context(|| format!("failed to save bone table configuration: {}", path.display()))?;
    Ok(())
}

/// Load a bone table configuration from a JSON file.
pub fn load_bone_table_config(path: &Path) -> Result<BoneTableConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to load bone table configuration: {}", path.display()))?;
    let config: BoneTableConfig = serde_json::from_str(&content)
        .context("failed to parse bone table configuration JSON")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_table_when_counting_then_humanoid_layout_is_fixed() {
        let config = BoneTableConfig::default();
        assert_eq!(config.bones.len(), 52);
        let active: usize = config.bones.iter().map(|bone| bone.axes.len()).sum();
        assert_eq!(active, 92);
        assert_eq!(config.bones[0].name, "Hips");
        assert_eq!(config.bones.last().map(|bone| bone.name.as_str()), Some("RightHandPinky3"));
    }

    #[test]
    fn given_default_table_when_looking_at_fingers_then_bounds_follow_finger_kind() {
        let config = BoneTableConfig::default();
        let ring = config
            .bones
            .iter()
            .find(|bone| bone.name == "LeftHandRing1")
            .expect("ring finger configured");
        assert_eq!(ring.min_deg, [0.0, -15.0, -90.0]);
        assert_eq!(ring.max_deg, [0.0, 30.0, 20.0]);
        assert_eq!(ring.axes, vec![Z, Y]);
        assert!(ring.reverse);
    }

    #[test]
    fn given_default_settings_when_serialize_then_json_uses_lowercase_axes() {
        let config = BoneTableConfig::default();
        let json = serde_json::to_string(&config).expect("serialize table");
        assert!(json.contains("\"axes\":[\"x\",\"z\",\"y\"]"));
        assert!(json.contains("\"rotation_order\":\"XYZ\""));
    }

    #[test]
    fn given_saved_table_when_loading_then_configuration_is_identical() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bones.json");
        let config = BoneTableConfig::default();

        save_bone_table_config(&path, &config).expect("save table");
        let loaded = load_bone_table_config(&path).expect("load table");

        assert_eq!(loaded, config);
    }

    #[test]
    fn given_missing_file_when_loading_then_error_names_the_path() {
        let err = load_bone_table_config(Path::new("/nonexistent/bones.json"))
            .expect_err("missing file must fail");
        assert!(err.to_string().contains("/nonexistent/bones.json"));
    }

    #[test]
    fn given_minimal_json_when_loading_then_optional_fields_default() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bones.json");
        fs::write(
            &path,
            r#"{"name_prefix":"","root":"Root","position_bound":1.0,
                "bones":[{"name":"Root","axes":["y"],"min_deg":[0,-90,0],"max_deg":[0,90,0]}]}"#,
        )
        .expect("write json");

        let loaded = load_bone_table_config(&path).expect("load table");
        assert_eq!(loaded.bones[0].rotation_order, RotationOrder::Xyz);
        assert!(!loaded.bones[0].reverse);
    }
}
