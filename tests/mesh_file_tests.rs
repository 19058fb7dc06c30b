//! Mesh File Tests
//!
//! Tests for:
//! - Binary round trips for both layout versions (in memory and on disk)
//! - Submeshes without material
//! - Rejection of truncated, corrupt and unknown-version files
//! - Baked assets surviving a write/read cycle

use std::io::Cursor;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use sunday::SundayError;
use sunday::animation::BoneInfoTable;
use sunday::assets::{
    MeshFileVersion, SkinnedImportOptions, bake_skinned_asset, read_mesh_file, read_skinned_mesh,
    write_mesh_file, write_mesh_file_with_version, write_skinned_mesh,
};
use sunday::core::math::ROW_MAJOR_IDENTITY;
use sunday::core::scene::{ImportedBone, ImportedMesh, ImportedNode, ImportedScene, VertexWeight};
use sunday::resources::{Material, SkinnedMesh, SkinnedMeshData, SkinnedVertex};

fn vertex(i: u32) -> SkinnedVertex {
    let f = i as f32;
    let mut v = SkinnedVertex {
        position: Vec3::new(f, f * 0.5, -f),
        tex_coords: Vec2::new(f * 0.25, 1.0 - f * 0.25),
        normal: Vec3::Y,
        tangent: Vec3::X,
        bitangent: Vec3::Z,
        ..SkinnedVertex::new()
    };
    v.set_bone_data(0, 0.75);
    v.set_bone_data(1, 0.25);
    v
}

fn sample_data() -> SkinnedMeshData {
    let mut bone_info = BoneInfoTable::new();
    bone_info.register("Hip", Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)));
    bone_info.register(
        "Knee",
        Mat4::from_scale_rotation_translation(
            Vec3::splat(0.5),
            Quat::from_rotation_x(0.3),
            Vec3::Z,
        ),
    );

    let mut material = Material::from_texture_paths(
        "hero_skin",
        [
            "textures/albedo.png".to_string(),
            "textures/normal.png".to_string(),
            String::new(),
            "textures/roughness.png".to_string(),
            String::new(),
        ],
    );
    material.is_default = true;

    SkinnedMeshData {
        name: "hero".to_string(),
        skinned_meshes: vec![
            SkinnedMesh::new(
                "body",
                (0..4).map(vertex).collect(),
                vec![0, 1, 2, 2, 1, 3],
                Some(Arc::new(material)),
            ),
            SkinnedMesh::new("eyes", (4..7).map(vertex).collect(), vec![0, 1, 2], None),
        ],
        num_animations: 3,
        bone_info,
    }
}

fn encode(data: &SkinnedMeshData, version: MeshFileVersion) -> Vec<u8> {
    let mut bytes = Vec::new();
    write_skinned_mesh(&mut bytes, data, version).expect("encode");
    bytes
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn counted_layout_round_trips() {
    let data = sample_data();
    let bytes = encode(&data, MeshFileVersion::Counted);

    assert_eq!(&bytes[..2], &[0x02, 0x00]);
    let decoded = read_skinned_mesh(&mut Cursor::new(bytes)).expect("decode");
    assert_eq!(decoded, data);
}

#[test]
fn legacy_layout_round_trips() {
    let data = sample_data();
    let bytes = encode(&data, MeshFileVersion::Legacy);

    assert_eq!(&bytes[..2], &[0x01, 0x00]);
    let decoded = read_skinned_mesh(&mut Cursor::new(bytes)).expect("decode");
    assert_eq!(decoded, data);
}

#[test]
fn counted_layout_adds_only_the_submesh_count() {
    let data = sample_data();

    let legacy = encode(&data, MeshFileVersion::Legacy);
    let counted = encode(&data, MeshFileVersion::Counted);

    assert_eq!(counted.len(), legacy.len() + 4);
}

#[test]
fn empty_model_round_trips() {
    let data = SkinnedMeshData::new("empty");

    for version in [MeshFileVersion::Legacy, MeshFileVersion::Counted] {
        let decoded = read_skinned_mesh(&mut Cursor::new(encode(&data, version))).expect("decode");
        assert_eq!(decoded, data);
        assert!(decoded.skinned_meshes.is_empty());
    }
}

#[test]
fn submesh_without_material_reads_back_as_none() {
    let data = sample_data();
    let bytes = encode(&data, MeshFileVersion::CURRENT);
    let decoded = read_skinned_mesh(&mut Cursor::new(bytes)).expect("decode");

    assert!(decoded.skinned_meshes[1].material.is_none());
    let material = decoded.skinned_meshes[0].material.as_deref().expect("material kept");
    assert_eq!(material.name, "hero_skin");
    assert!(material.is_default);
}

#[test]
fn bone_offsets_survive_bit_exact() {
    let data = sample_data();
    let bytes = encode(&data, MeshFileVersion::CURRENT);
    let decoded = read_skinned_mesh(&mut Cursor::new(bytes)).expect("decode");

    let knee = decoded.bone_info.get("Knee").expect("knee stored");
    assert_eq!(knee.id, 1);
    let original = data.bone_info.get("Knee").expect("knee in source");
    assert_eq!(knee.offset.to_cols_array(), original.offset.to_cols_array());
    assert_eq!(decoded.bone_count(), 2);
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn truncated_counted_file_is_rejected() {
    let mut bytes = encode(&sample_data(), MeshFileVersion::Counted);
    bytes.truncate(bytes.len() - 10);

    let err = read_skinned_mesh(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, SundayError::TruncatedMeshFile { .. }), "got {err}");
}

#[test]
fn legacy_file_cut_inside_a_record_is_rejected() {
    let mut bytes = encode(&sample_data(), MeshFileVersion::Legacy);
    // Leaves one byte of the last material string's length prefix.
    bytes.truncate(bytes.len() - 3);

    let err = read_skinned_mesh(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, SundayError::TruncatedMeshFile { .. }), "got {err}");
}

#[test]
fn legacy_file_cut_inside_vertex_data_is_rejected() {
    let data = sample_data();
    let full = encode(&data, MeshFileVersion::Legacy);
    let bones_only = SkinnedMeshData {
        skinned_meshes: Vec::new(),
        ..data.clone()
    };
    let mut header = encode(&bones_only, MeshFileVersion::Legacy);
    // Header, then the first submesh up to the middle of its second vertex.
    let cut = header.len() + 4 + "body".len() + 4 + SkinnedVertex::SIZE + 40;
    header.extend_from_slice(&full[header.len()..cut]);

    let err = read_skinned_mesh(&mut Cursor::new(header)).unwrap_err();
    assert!(matches!(err, SundayError::TruncatedMeshFile { .. }), "got {err}");
}

#[test]
fn unknown_version_is_rejected() {
    let mut bytes = encode(&sample_data(), MeshFileVersion::CURRENT);
    bytes[0] = 0x09;

    let err = read_skinned_mesh(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, SundayError::UnsupportedMeshFileVersion(0x0009)));
}

#[test]
fn invalid_utf8_name_is_rejected() {
    let mut bytes = vec![0x02, 0x00];
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&[0xff, 0xfe]);

    let err = read_skinned_mesh(&mut Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, SundayError::InvalidString { .. }), "got {err}");
}

#[test]
fn empty_input_is_truncated() {
    let err = read_skinned_mesh(&mut Cursor::new(Vec::new())).unwrap_err();
    assert!(matches!(err, SundayError::TruncatedMeshFile { .. }));
}

// ============================================================================
// Files on Disk
// ============================================================================

#[test]
fn mesh_file_round_trips_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hero.mesh");
    let data = sample_data();

    write_mesh_file(&path, &data)?;
    assert_eq!(read_mesh_file(&path)?, data);

    // Overwriting replaces the file.
    write_mesh_file_with_version(&path, &SkinnedMeshData::new("other"), MeshFileVersion::Legacy)?;
    assert_eq!(read_mesh_file(&path)?.name, "other");
    Ok(())
}

#[test]
fn writing_leaves_no_staging_files_behind() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hero.mesh");

    write_mesh_file(&path, &sample_data())?;
    write_mesh_file(&path, &sample_data())?;

    let names: Vec<_> = std::fs::read_dir(dir.path())?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<Result<_, _>>()?;
    assert_eq!(names, vec![std::ffi::OsString::from("hero.mesh")]);
    Ok(())
}

#[test]
fn failed_write_keeps_the_target_and_cleans_up() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    // A directory cannot be replaced by the finished file.
    let target = dir.path().join("hero.mesh");
    std::fs::create_dir(&target)?;

    let err = write_mesh_file(&target, &sample_data()).unwrap_err();
    assert!(matches!(err, SundayError::IoError(_)), "got {err}");

    assert!(target.is_dir());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let err = read_mesh_file(dir.path().join("missing.mesh")).unwrap_err();
    assert!(matches!(err, SundayError::IoError(_)));
    Ok(())
}

#[test]
fn baked_asset_survives_the_file_format() -> anyhow::Result<()> {
    let mesh = ImportedMesh {
        name: "body".to_string(),
        positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        faces: vec![vec![0, 1, 2]],
        bones: vec![ImportedBone {
            name: "Hip".to_string(),
            offset_matrix: ROW_MAJOR_IDENTITY,
            weights: vec![VertexWeight { vertex_id: 1, weight: 1.0 }],
        }],
        ..ImportedMesh::default()
    };
    let mut scene = ImportedScene::new(ImportedNode::new("Root").with_meshes(vec![0]));
    scene.meshes.push(mesh);

    let asset = bake_skinned_asset(&scene, "hero", &SkinnedImportOptions::default())?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hero.mesh");
    write_mesh_file(&path, &asset.data)?;

    let loaded = read_mesh_file(&path)?;
    assert_eq!(loaded, asset.data);
    assert_eq!(loaded.skinned_meshes[0].vertices[1].bone_ids[0], 0);
    Ok(())
}
