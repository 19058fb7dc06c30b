//! Bakes a glTF character into a `.mesh` file and plays its first clip.
//!
//! ```text
//! cargo run --example bake_skinned --features gltf -- character.glb [out.mesh] [options.json]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use sunday::assets::MESH_FILE_EXTENSION;
use sunday::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(
        args.next()
            .context("usage: bake_skinned <model.gltf|glb> [out.mesh] [options.json]")?,
    );
    let output = args
        .next()
        .map_or_else(|| input.with_extension(MESH_FILE_EXTENSION), PathBuf::from);
    let options = match args.next() {
        Some(path) => SkinnedImportOptions::from_json_str(&std::fs::read_to_string(&path)?)?,
        None => SkinnedImportOptions::default(),
    };

    let model_name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model")
        .to_string();

    println!("Loading glTF model from: {}", input.display());
    let scene = load_gltf_scene(&input)?;
    let asset = bake_skinned_asset(&scene, &model_name, &options)?;

    write_mesh_file(&output, &asset.data)?;
    println!(
        "Baked {} submeshes, {} vertices, {} bones into {}",
        asset.data.skinned_meshes.len(),
        asset.data.total_vertex_count(),
        asset.data.bone_count(),
        output.display()
    );

    verify(&output, &asset.data)?;

    let Some(clip) = asset.clips.into_iter().next() else {
        println!("Model has no animations");
        return Ok(());
    };

    println!(
        "Playing animation: {} ({:.2}s at {} ticks/s)",
        clip.name(),
        clip.duration_seconds(),
        clip.ticks_per_second()
    );
    let mut animator = Animator::with_clip(Arc::new(clip));
    for frame in 0..5 {
        animator.update_animation(1.0 / 30.0);
        let moved = animator
            .final_bone_matrices()
            .iter()
            .filter(|m| **m != glam::Mat4::IDENTITY)
            .count();
        println!("frame {frame}: t = {:.3} ticks, {moved} posed bones", animator.current_time());
    }

    Ok(())
}

fn verify(path: &Path, expected: &SkinnedMeshData) -> anyhow::Result<()> {
    let loaded = read_mesh_file(path)?;
    anyhow::ensure!(&loaded == expected, "{} does not read back identically", path.display());
    Ok(())
}
