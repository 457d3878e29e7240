use std::{collections::BTreeMap, fs, path::PathBuf, process};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use marionette_pose::{
    BoneAxisTable, BoneTableConfig, Euler, PoseCodec, Rig, load_bone_table_config,
};

#[derive(Parser)]
#[command(name = "marionette-pose")]
#[command(about = "Encode, decode and check marionette pose strings")]
#[command(version)]
struct Cli {
    /// Bone table JSON (defaults to the built-in humanoid rig)
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the neutral pose string
    Neutral,

    /// Print the bone angles (degrees) and position stored in a pose string
    Decode {
        /// Pose string
        pose: String,
    },

    /// Build a pose string from a JSON pose document
    Encode {
        /// JSON file with `bones` (degrees per axis) and `position`
        input: PathBuf,
    },

    /// Verify that a model has every bone a pose is applied to, root included
    Check {
        /// glTF/GLB model
        model: PathBuf,
    },

    /// Print the effective bone table as JSON
    DumpTable,
}

/// Human readable pose, angles in degrees.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PoseDocument {
    #[serde(default)]
    bones: BTreeMap<String, [f32; 3]>,
    #[serde(default)]
    position: [f32; 3],
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.table {
        Some(path) => load_bone_table_config(path)?,
        None => BoneTableConfig::default(),
    };
    let table = BoneAxisTable::from_config(&config).context("invalid bone table")?;

    match cli.command {
        Commands::Neutral => {
            println!("{}", PoseCodec::new(&table).to_string()?);
        }
        Commands::Decode { pose } => {
            let mut codec = PoseCodec::new(&table);
            codec.from_string(&pose).context("failed to decode pose string")?;

            let document = PoseDocument {
                bones: codec
                    .get_bones_rotation()
                    .into_iter()
                    .map(|(name, rotation)| (name.to_string(), rotation.to_degrees()))
                    .collect(),
                position: codec.get_model_position().into(),
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Encode { input } => {
            let content = fs::read_to_string(&input)
                .with_context(|| format!("failed to read pose document: {}", input.display()))?;
            let document: PoseDocument =
                serde_json::from_str(&content).context("failed to parse pose document JSON")?;

            let mut codec = PoseCodec::new(&table);
            for (name, [x, y, z]) in &document.bones {
                let spec = table.lookup(name)?;
                let rotation = Euler::new(
                    x.to_radians(),
                    y.to_radians(),
                    z.to_radians(),
                    spec.rotation_order(),
                );
                codec.load_bone_rotation(name, &rotation)?;
            }
            codec.load_model_position(Vector3::from(document.position));
            println!("{}", codec.to_string()?);
        }
        Commands::Check { model } => {
            let rig = Rig::from_gltf(&model)?;
            let missing = table.missing_pose_bones(&rig);
            if !missing.is_empty() {
                bail!(
                    "{} is missing {} posable bones: {}",
                    model.display(),
                    missing.len(),
                    missing.join(", ")
                );
            }
            tracing::info!("{} bones found, model is posable", rig.len());
            println!("OK: {}", model.display());
        }
        Commands::DumpTable => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
