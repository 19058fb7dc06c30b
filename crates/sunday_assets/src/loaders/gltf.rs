use std::collections::BTreeMap;
use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3};
use gltf::animation::{Interpolation, Property};
use gltf::animation::util::ReadOutputs;
use sunday_core::{
    errors::{Result, SundayError},
    math::mat4_to_row_major,
    scene::{
        ImportedAnimation, ImportedBone, ImportedChannel, ImportedMaterial, ImportedMesh,
        ImportedNode, ImportedScene, QuatKey, VectorKey, VertexWeight,
    },
};

/// Name of the synthetic node holding the scene's top-level nodes.
pub const ROOT_NODE_NAME: &str = "RootNode";

/// glTF keys are in seconds, so one tick is one second.
const GLTF_TICKS_PER_SECOND: f64 = 1.0;

/// Reads a `.gltf` / `.glb` file into an [`ImportedScene`].
///
/// Every primitive becomes its own mesh. Skinned primitives carry one
/// [`ImportedBone`] per joint of the node's skin, named after the joint node.
pub fn load_gltf_scene(path: impl AsRef<Path>) -> Result<ImportedScene> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| SundayError::GltfError(format!("{}: {e}", path.display())))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| {
            SundayError::GltfError(format!("{}: file contains no scene", path.display()))
        })?;

    let mut loader = GltfSceneLoader {
        buffers: &buffers,
        meshes: Vec::new(),
    };

    let mut root = ImportedNode::new(ROOT_NODE_NAME);
    for node in scene.nodes() {
        root.children.push(loader.load_node(&node)?);
    }

    let animations = document
        .animations()
        .map(|animation| loader.load_animation(&animation))
        .collect::<Result<Vec<_>>>()?;

    let materials = document.materials().map(|m| load_material(&m)).collect();

    let imported = ImportedScene {
        root,
        meshes: loader.meshes,
        materials,
        animations,
    };

    log::info!(
        "Loaded glTF {}: {} meshes, {} materials, {} animations",
        path.display(),
        imported.meshes.len(),
        imported.materials.len(),
        imported.animations.len()
    );
    Ok(imported)
}

struct GltfSceneLoader<'a> {
    buffers: &'a [gltf::buffer::Data],
    meshes: Vec<ImportedMesh>,
}

impl GltfSceneLoader<'_> {
    fn buffer(&self, buffer: &gltf::Buffer<'_>) -> Option<&[u8]> {
        self.buffers.get(buffer.index()).map(|data| data.0.as_slice())
    }

    fn load_node(&mut self, node: &gltf::Node<'_>) -> Result<ImportedNode> {
        let local = Mat4::from_cols_array_2d(&node.transform().matrix());
        let mut imported =
            ImportedNode::new(node_name(node)).with_transformation(mat4_to_row_major(&local));

        if let Some(mesh) = node.mesh() {
            let skin = node.skin();
            let primitive_count = mesh.primitives().len();
            for primitive in mesh.primitives() {
                let name = match (mesh.name(), primitive_count) {
                    (Some(name), 1) => name.to_string(),
                    (Some(name), _) => format!("{name}_{}", primitive.index()),
                    (None, _) => format!("mesh_{}_{}", mesh.index(), primitive.index()),
                };
                let loaded = self.load_primitive(name, &primitive, skin.as_ref())?;
                imported.meshes.push(self.meshes.len());
                self.meshes.push(loaded);
            }
        }

        for child in node.children() {
            imported.children.push(self.load_node(&child)?);
        }
        Ok(imported)
    }

    fn load_primitive(
        &self,
        name: String,
        primitive: &gltf::Primitive<'_>,
        skin: Option<&gltf::Skin<'_>>,
    ) -> Result<ImportedMesh> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(SundayError::GltfError(format!(
                "mesh '{name}' uses {:?} primitives, only triangles are supported",
                primitive.mode()
            )));
        }

        let reader = primitive.reader(|buffer| self.buffer(&buffer));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| SundayError::GltfError(format!("mesh '{name}' has no positions")))?
            .map(Vec3::from_array)
            .collect();

        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|iter| iter.map(Vec3::from_array).collect())
            .unwrap_or_default();

        let mut tangents = Vec::new();
        let mut bitangents = Vec::new();
        if let Some(iter) = reader.read_tangents() {
            for (i, [x, y, z, w]) in iter.enumerate() {
                let tangent = Vec3::new(x, y, z);
                let normal = normals.get(i).copied().unwrap_or(Vec3::Z);
                tangents.push(tangent);
                bitangents.push(normal.cross(tangent) * w);
            }
        }

        let tex_coords: Vec<Vec2> = reader
            .read_tex_coords(0)
            .map(|iter| iter.into_f32().map(Vec2::from_array).collect())
            .unwrap_or_default();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let faces = indices.chunks_exact(3).map(<[u32]>::to_vec).collect();

        let bones = match skin {
            Some(skin) => {
                let joints: Vec<[u16; 4]> = reader
                    .read_joints(0)
                    .map(|iter| iter.into_u16().collect())
                    .unwrap_or_default();
                let weights: Vec<[f32; 4]> = reader
                    .read_weights(0)
                    .map(|iter| iter.into_f32().collect())
                    .unwrap_or_default();
                self.load_bones(&name, skin, &joints, &weights)
            }
            None => Vec::new(),
        };

        Ok(ImportedMesh {
            name,
            positions,
            normals,
            tangents,
            bitangents,
            tex_coords,
            faces,
            bones,
            material_index: primitive.material().index(),
        })
    }

    fn load_bones(
        &self,
        mesh_name: &str,
        skin: &gltf::Skin<'_>,
        vertex_joints: &[[u16; 4]],
        vertex_weights: &[[f32; 4]],
    ) -> Vec<ImportedBone> {
        let joints: Vec<gltf::Node<'_>> = skin.joints().collect();
        let inverse_binds: Vec<Mat4> = skin
            .reader(|buffer| self.buffer(&buffer))
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_else(|| vec![Mat4::IDENTITY; joints.len()]);

        let mut bones: Vec<ImportedBone> = joints
            .iter()
            .enumerate()
            .map(|(i, joint)| ImportedBone {
                name: node_name(joint),
                offset_matrix: mat4_to_row_major(inverse_binds.get(i).unwrap_or(&Mat4::IDENTITY)),
                weights: Vec::new(),
            })
            .collect();

        let vertices = vertex_joints.iter().zip(vertex_weights).enumerate();
        for (vertex_id, (joint_set, weight_set)) in vertices {
            for (&joint, &weight) in joint_set.iter().zip(weight_set) {
                if weight <= 0.0 {
                    continue;
                }
                let Some(bone) = bones.get_mut(usize::from(joint)) else {
                    log::warn!(
                        "Mesh '{mesh_name}': vertex {vertex_id} uses joint {joint} outside the skin"
                    );
                    continue;
                };
                bone.weights.push(VertexWeight {
                    vertex_id: vertex_id as u32,
                    weight,
                });
            }
        }

        bones
    }

    fn load_animation(&self, animation: &gltf::Animation<'_>) -> Result<ImportedAnimation> {
        let name = animation
            .name()
            .map_or_else(|| format!("animation_{}", animation.index()), str::to_string);

        let mut channels: BTreeMap<usize, ImportedChannel> = BTreeMap::new();
        let mut duration = 0.0f64;

        for channel in animation.channels() {
            let target = channel.target();
            let node = target.node();
            let reader = channel.reader(|buffer| self.buffer(&buffer));

            let Some(inputs) = reader.read_inputs() else {
                log::warn!(
                    "Animation '{name}': channel on '{}' has no key times",
                    node_name(&node)
                );
                continue;
            };
            let times: Vec<f64> = inputs.map(f64::from).collect();
            if let Some(&last) = times.last() {
                duration = duration.max(last);
            }

            let interpolation = channel.sampler().interpolation();
            let cubic = interpolation == Interpolation::CubicSpline;
            if interpolation != Interpolation::Linear {
                log::warn!(
                    "Animation '{name}': {:?} sampler on '{}' is played back linearly",
                    interpolation,
                    node_name(&node)
                );
            }

            let entry = channels.entry(node.index()).or_insert_with(|| ImportedChannel {
                node_name: node_name(&node),
                ..ImportedChannel::default()
            });

            match (target.property(), reader.read_outputs()) {
                (Property::Translation, Some(ReadOutputs::Translations(values))) => {
                    entry.position_keys = vector_keys(&times, keyframe_values(values, cubic));
                }
                (Property::Scale, Some(ReadOutputs::Scales(values))) => {
                    entry.scaling_keys = vector_keys(&times, keyframe_values(values, cubic));
                }
                (Property::Rotation, Some(ReadOutputs::Rotations(values))) => {
                    entry.rotation_keys = times
                        .iter()
                        .zip(keyframe_values(values.into_f32(), cubic))
                        .map(|(&time, xyzw)| QuatKey {
                            time,
                            value: Quat::from_array(xyzw),
                        })
                        .collect();
                }
                (Property::MorphTargetWeights, _) => {
                    log::debug!("Animation '{name}': skipping morph target weights");
                }
                (property, _) => {
                    return Err(SundayError::GltfError(format!(
                        "animation '{name}': {property:?} channel has mismatched output data"
                    )));
                }
            }
        }

        Ok(ImportedAnimation {
            name,
            duration,
            ticks_per_second: GLTF_TICKS_PER_SECOND,
            channels: channels.into_values().collect(),
        })
    }
}

/// Cubic spline samplers store (in-tangent, value, out-tangent) per key.
fn keyframe_values<T>(values: impl Iterator<Item = T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.skip(1).step_by(3).collect()
    } else {
        values.collect()
    }
}

fn vector_keys(times: &[f64], values: Vec<[f32; 3]>) -> Vec<VectorKey> {
    times
        .iter()
        .zip(values)
        .map(|(&time, value)| VectorKey {
            time,
            value: Vec3::from_array(value),
        })
        .collect()
}

fn load_material(material: &gltf::Material<'_>) -> ImportedMaterial {
    let pbr = material.pbr_metallic_roughness();
    let metallic_roughness = pbr
        .metallic_roughness_texture()
        .map(|info| texture_uri(&info.texture()))
        .unwrap_or_default();

    ImportedMaterial {
        name: material.name().unwrap_or_default().to_string(),
        albedo: pbr
            .base_color_texture()
            .map(|info| texture_uri(&info.texture()))
            .unwrap_or_default(),
        normal: material
            .normal_texture()
            .map(|info| texture_uri(&info.texture()))
            .unwrap_or_default(),
        // glTF packs metallic (B) and roughness (G) into one image.
        metallic: metallic_roughness.clone(),
        roughness: metallic_roughness,
        ao: material
            .occlusion_texture()
            .map(|info| texture_uri(&info.texture()))
            .unwrap_or_default(),
    }
}

/// Embedded images have no path and map to "no texture".
fn texture_uri(texture: &gltf::Texture<'_>) -> String {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } => uri.to_string(),
        gltf::image::Source::View { .. } => String::new(),
    }
}

fn node_name(node: &gltf::Node<'_>) -> String {
    node.name()
        .map_or_else(|| format!("node_{}", node.index()), str::to_string)
}
