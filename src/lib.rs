//! Marionette Pose Library
//!
//! Quantizes the pose of a humanoid marionette (bone rotations within
//! per-axis bounds plus the model position) into a short URL-safe string,
//! and applies such strings back onto a live skeleton.

pub mod bones;
pub mod codec;
pub mod config;
pub mod error;
pub mod euler;
pub mod marionette;
pub mod query;
pub mod rig;
pub mod serializer;
pub mod vector;

pub use bones::{AxisSlot, BoneAxisTable, BoneSpec};
pub use config::{BoneConfig, BoneTableConfig, load_bone_table_config, save_bone_table_config};
pub use error::{PoseError, Result};
pub use euler::{Axis, Euler, RotationOrder};
pub use marionette::{Marionette, apply_decoded_pose, capture_live_bone, capture_live_position};
pub use rig::{LiveBone, LiveSkeleton, Rig};
pub use serializer::PoseCodec;
