//! Skinned model import.
//!
//! Turns an [`ImportedScene`] into [`SkinnedMeshData`]: vertices with up to
//! [`MAX_BONE_INFLUENCE`](sunday_resources::MAX_BONE_INFLUENCE) bone
//! influences each, triangle indices, materials, and the bone table shared by
//! the model and its animations.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use sunday_animation::{AnimationClip, BoneInfoTable};
use sunday_core::{
    errors::{Result, SundayError},
    math::mat4_from_row_major,
    scene::{ImportedMesh, ImportedNode, ImportedScene},
};
use sunday_resources::{Material, SkinnedMesh, SkinnedMeshData, SkinnedVertex};

use crate::options::{InfluenceOrder, SkinnedImportOptions};

/// Assigns bone ids and per-vertex bone weights while a model is imported.
///
/// The bone table grows across all meshes of the model: a bone name gets an
/// id the first time any mesh mentions it.
#[derive(Debug, Clone, Default)]
pub struct SkeletonBuilder {
    bone_info: BoneInfoTable,
    influence_order: InfluenceOrder,
}

impl SkeletonBuilder {
    #[must_use]
    pub fn new(influence_order: InfluenceOrder) -> Self {
        Self {
            bone_info: BoneInfoTable::new(),
            influence_order,
        }
    }

    /// Clears all influence slots of `vertex`. Call once per vertex before
    /// assigning weights.
    pub fn set_vertex_bone_data_to_default(vertex: &mut SkinnedVertex) {
        vertex.set_bone_data_to_default();
    }

    /// Stores one influence in the first free slot of `vertex`.
    ///
    /// Zero weights, bones already present on the vertex and influences
    /// beyond the slot budget are dropped silently.
    pub fn set_vertex_bone_data(vertex: &mut SkinnedVertex, bone_id: i32, weight: f32) -> bool {
        vertex.set_bone_data(bone_id, weight)
    }

    /// Registers every bone of `mesh` and writes its weights into
    /// `vertices`.
    pub fn extract_bone_weight_for_vertices(
        &mut self,
        vertices: &mut [SkinnedVertex],
        mesh: &ImportedMesh,
    ) {
        // (vertex, bone, weight), only collected when sorting by weight
        let mut pending: Vec<(usize, i32, f32)> = Vec::new();

        for bone in &mesh.bones {
            let bone_id = self
                .bone_info
                .register(&bone.name, mat4_from_row_major(&bone.offset_matrix)) as i32;

            for vertex_weight in &bone.weights {
                let vertex_id = vertex_weight.vertex_id as usize;
                let Some(vertex) = vertices.get_mut(vertex_id) else {
                    log::warn!(
                        "Mesh '{}': bone '{}' references vertex {vertex_id} of {}, skipping",
                        mesh.name,
                        bone.name,
                        vertices.len()
                    );
                    continue;
                };

                match self.influence_order {
                    InfluenceOrder::SourceOrder => {
                        Self::set_vertex_bone_data(vertex, bone_id, vertex_weight.weight);
                    }
                    InfluenceOrder::HeaviestFirst => {
                        pending.push((vertex_id, bone_id, vertex_weight.weight));
                    }
                }
            }
        }

        if pending.is_empty() {
            return;
        }
        // Stable: equal weights keep source order.
        pending.sort_by(|a, b| a.0.cmp(&b.0).then(b.2.total_cmp(&a.2)));
        for (vertex_id, bone_id, weight) in pending {
            Self::set_vertex_bone_data(&mut vertices[vertex_id], bone_id, weight);
        }
    }

    #[must_use]
    pub fn bone_info(&self) -> &BoneInfoTable {
        &self.bone_info
    }

    #[must_use]
    pub fn bone_count(&self) -> u32 {
        self.bone_info.bone_count()
    }

    #[must_use]
    pub fn into_bone_info(self) -> BoneInfoTable {
        self.bone_info
    }
}

/// Imports every mesh reachable from the scene root as a skinned submesh.
pub fn import_skinned_model(
    scene: &ImportedScene,
    model_name: &str,
    options: &SkinnedImportOptions,
) -> Result<SkinnedMeshData> {
    let mut importer = SkinnedModelImporter {
        scene,
        model_name,
        options,
        builder: SkeletonBuilder::new(options.influence_order),
        meshes: Vec::new(),
    };
    importer.process_node(&scene.root)?;

    let SkinnedModelImporter { builder, meshes, .. } = importer;
    log::info!(
        "Imported skinned model '{model_name}': {} meshes, {} bones, {} animations",
        meshes.len(),
        builder.bone_count(),
        scene.animations.len()
    );

    Ok(SkinnedMeshData {
        name: model_name.to_string(),
        skinned_meshes: meshes,
        num_animations: scene.animations.len() as u32,
        bone_info: builder.into_bone_info(),
    })
}

/// A skinned model together with its animations, bone table already extended
/// by every clip.
#[derive(Debug, Clone)]
pub struct SkinnedAsset {
    pub data: SkinnedMeshData,
    pub clips: Vec<AnimationClip>,
}

/// Imports the model, then loads all of its clips against the model's bone
/// table. The returned data is what gets written to a mesh file.
pub fn bake_skinned_asset(
    scene: &ImportedScene,
    model_name: &str,
    options: &SkinnedImportOptions,
) -> Result<SkinnedAsset> {
    let mut data = import_skinned_model(scene, model_name, options)?;

    let clips = (0..scene.animations.len())
        .map(|index| {
            AnimationClip::load_with_default_rate(
                scene,
                &mut data.bone_info,
                index,
                options.default_ticks_per_second,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SkinnedAsset { data, clips })
}

struct SkinnedModelImporter<'a> {
    scene: &'a ImportedScene,
    model_name: &'a str,
    options: &'a SkinnedImportOptions,
    builder: SkeletonBuilder,
    meshes: Vec<SkinnedMesh>,
}

impl SkinnedModelImporter<'_> {
    fn process_node(&mut self, node: &ImportedNode) -> Result<()> {
        for &mesh_index in &node.meshes {
            let mesh = self.scene.meshes.get(mesh_index).ok_or_else(|| {
                SundayError::ImportError(format!(
                    "node '{}' references mesh {mesh_index}, scene has {}",
                    node.name,
                    self.scene.meshes.len()
                ))
            })?;
            let processed = self.process_mesh(mesh)?;
            self.meshes.push(processed);
        }

        for child in &node.children {
            self.process_node(child)?;
        }
        Ok(())
    }

    fn process_mesh(&mut self, mesh: &ImportedMesh) -> Result<SkinnedMesh> {
        let vertex_count = mesh.positions.len();
        check_attribute(mesh, "normals", mesh.normals.len())?;
        check_attribute(mesh, "tangents", mesh.tangents.len())?;
        check_attribute(mesh, "bitangents", mesh.bitangents.len())?;
        check_attribute(mesh, "tex_coords", mesh.tex_coords.len())?;

        let mut vertices: Vec<SkinnedVertex> = (0..vertex_count)
            .map(|i| SkinnedVertex {
                position: mesh.positions[i],
                tex_coords: mesh.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO),
                normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO),
                tangent: mesh.tangents.get(i).copied().unwrap_or(Vec3::ZERO),
                bitangent: mesh.bitangents.get(i).copied().unwrap_or(Vec3::ZERO),
                ..SkinnedVertex::new()
            })
            .collect();

        let indices: Vec<u32> = mesh.faces.iter().flatten().copied().collect();
        if let Some(&bad) = indices.iter().find(|&&index| index as usize >= vertex_count) {
            return Err(SundayError::ImportError(format!(
                "mesh '{}' has index {bad} but only {vertex_count} vertices",
                mesh.name
            )));
        }

        self.builder.extract_bone_weight_for_vertices(&mut vertices, mesh);

        let material = self.process_material(mesh)?;
        Ok(SkinnedMesh::new(mesh.name.clone(), vertices, indices, material))
    }

    fn process_material(&self, mesh: &ImportedMesh) -> Result<Option<Arc<Material>>> {
        if !self.options.import_materials {
            return Ok(None);
        }
        let Some(material_index) = mesh.material_index else {
            return Ok(None);
        };
        let src = self.scene.materials.get(material_index).ok_or_else(|| {
            SundayError::ImportError(format!(
                "mesh '{}' references material {material_index}, scene has {}",
                mesh.name,
                self.scene.materials.len()
            ))
        })?;

        let name = if src.name.is_empty() {
            format!("{}_mat{material_index}", self.model_name)
        } else {
            src.name.clone()
        };

        let mut material = Material::from_texture_paths(
            name,
            [
                src.albedo.clone(),
                src.normal.clone(),
                src.metallic.clone(),
                src.roughness.clone(),
                src.ao.clone(),
            ],
        );
        material.is_default = true;
        Ok(Some(Arc::new(material)))
    }
}

fn check_attribute(mesh: &ImportedMesh, attribute: &str, len: usize) -> Result<()> {
    if len == 0 || len == mesh.positions.len() {
        return Ok(());
    }
    Err(SundayError::ImportError(format!(
        "mesh '{}' has {len} {attribute} for {} positions",
        mesh.name,
        mesh.positions.len()
    )))
}
