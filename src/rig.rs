//! Live skeleton seam.
//!
//! The scene that renders the marionette owns the real bones; the pose code
//! only needs to find a bone by name and read or overwrite its local Euler
//! rotation. [`Rig`] is a self-contained implementation used by the CLI and
//! by tests, and can be populated from a glTF/GLB model.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result, bail};
use gltf::Document;

use crate::bones::BoneAxisTable;
use crate::euler::Euler;

/// A bone of the rendered skeleton.
pub trait LiveBone {
    fn name(&self) -> &str;
    fn rotation(&self) -> Euler;
    fn set_rotation(&mut self, rotation: Euler);
}

/// Name-addressable view of the rendered skeleton.
pub trait LiveSkeleton {
    type Bone: LiveBone;

    fn bone(&self, name: &str) -> Option<&Self::Bone>;
    fn bone_mut(&mut self, name: &str) -> Option<&mut Self::Bone>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigBone {
    name: String,
    rotation: Euler,
}

impl RigBone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rotation: Euler::default(),
        }
    }
}

impl LiveBone for RigBone {
    fn name(&self) -> &str {
        &self.name
    }

    fn rotation(&self) -> Euler {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Euler) {
        self.rotation = rotation;
    }
}

/// Ordered set of bones addressed by their full (prefixed) name.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    bones: Vec<RigBone>,
    index: HashMap<String, usize>,
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bone at rest. Adding an existing name keeps the first bone.
    pub fn add_bone(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.index.contains_key(&name) {
            return;
        }
        self.index.insert(name.clone(), self.bones.len());
        self.bones.push(RigBone::new(name));
    }

    /// Builds a rig at rest holding exactly the bones of `table`.
    pub fn from_table(table: &BoneAxisTable) -> Self {
        let mut rig = Self::new();
        for spec in table.bones() {
            rig.add_bone(table.live_name(spec.name()));
        }
        rig
    }

    /// Imports the joints of the first skin of a glTF/GLB model, or every
    /// named node when the model has no skin.
    pub fn from_gltf(path: &Path) -> Result<Self> {
        let gltf = gltf::Gltf::open(path)
            .with_context(|| format!("failed to read glTF model: {}", path.display()))?;

        let names = collect_joint_names(&gltf.document);
        if names.is_empty() {
            bail!("no named bones found in model: {}", path.display());
        }

        let mut rig = Self::new();
        for name in names {
            rig.add_bone(name);
        }
        tracing::debug!("imported {} bones from {}", rig.len(), path.display());
        Ok(rig)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[RigBone] {
        &self.bones
    }
}

impl LiveSkeleton for Rig {
    type Bone = RigBone;

    fn bone(&self, name: &str) -> Option<&RigBone> {
        self.index.get(name).map(|index| &self.bones[*index])
    }

    fn bone_mut(&mut self, name: &str) -> Option<&mut RigBone> {
        let index = *self.index.get(name)?;
        self.bones.get_mut(index)
    }
}

fn collect_joint_names(document: &Document) -> Vec<String> {
    let skin_joints: Vec<String> = document
        .skins()
        .next()
        .map(|skin| {
            skin.joints()
                .filter_map(|node| node.name().map(ToOwned::to_owned))
                .collect()
        })
        .unwrap_or_default();

    if !skin_joints.is_empty() {
        return skin_joints;
    }

    document
        .nodes()
        .filter_map(|node| node.name().map(ToOwned::to_owned))
        .collect()
}
