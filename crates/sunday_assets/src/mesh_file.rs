//! Binary skinned mesh file (`.mesh`).
//!
//! Layout, all integers and floats little-endian, strings as a `u32` byte
//! length followed by UTF-8 bytes:
//!
//! ```text
//! u16        version              0x0001 legacy, 0x0002 counted
//! string     model name
//! u32        animation count
//! u32        bone entry count
//!   string   bone name
//!   u32      bone id
//!   f32[16]  offset matrix, column-major
//! u32        total bone count
//! u32        submesh count        (0x0002 only)
//! submeshes, until the count is reached (0x0002) or end of file (0x0001):
//!   string   mesh name
//!   u32      vertex count
//!   vertex[] 88 bytes each, see SkinnedVertex
//!   u32      index count
//!   u32[]    indices
//!   string   material name
//!   string   albedo, normal, metallic, roughness, ao texture paths
//! ```
//!
//! A submesh without material stores six empty strings.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::{Mat4, Vec2, Vec3};
use sunday_animation::{BoneInfo, BoneInfoTable};
use sunday_core::errors::{Result, SundayError};
use sunday_resources::{
    MAX_BONE_INFLUENCE, Material, ParameterType, SkinnedMesh, SkinnedMeshData, SkinnedVertex,
};
use tempfile::NamedTempFile;

pub const MESH_FILE_EXTENSION: &str = "mesh";

/// Upper bound for speculative allocations driven by counts read from disk.
const PREALLOCATION_LIMIT: usize = 1 << 16;

/// On-disk layout revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MeshFileVersion {
    /// Submeshes run until end of file.
    Legacy = 0x0001,
    /// An explicit submesh count follows the bone count.
    Counted = 0x0002,
}

impl MeshFileVersion {
    pub const CURRENT: MeshFileVersion = MeshFileVersion::Counted;

    #[inline]
    #[must_use]
    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn from_tag(tag: u16) -> Result<Self> {
        match tag {
            0x0001 => Ok(MeshFileVersion::Legacy),
            0x0002 => Ok(MeshFileVersion::Counted),
            other => Err(SundayError::UnsupportedMeshFileVersion(other)),
        }
    }
}

// ============================================================================
// File entry points
// ============================================================================

/// Writes `data` to `path` in the current layout, replacing any existing file.
pub fn write_mesh_file(path: impl AsRef<Path>, data: &SkinnedMeshData) -> Result<()> {
    write_mesh_file_with_version(path, data, MeshFileVersion::CURRENT)
}

/// Encodes into a temporary file next to `path` and renames it into place
/// once every byte is flushed, so a failed write leaves any existing file
/// untouched.
pub fn write_mesh_file_with_version(
    path: impl AsRef<Path>,
    data: &SkinnedMeshData,
    version: MeshFileVersion,
) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        log::warn!("Overwriting existing mesh file: {}", path.display());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(dir).inspect_err(|e| {
        log::error!("Failed to create staging file for {}: {e}", path.display());
    })?;

    let mut writer = BufWriter::new(staging.as_file_mut());
    write_skinned_mesh(&mut writer, data, version)
        .and_then(|()| writer.flush().map_err(SundayError::from))
        .inspect_err(|e| log::error!("Failed to write mesh file {}: {e}", path.display()))?;
    drop(writer);

    staging
        .persist(path)
        .map_err(|e| SundayError::from(e.error))
        .inspect_err(|e| log::error!("Failed to replace mesh file {}: {e}", path.display()))?;

    log::debug!(
        "Wrote mesh file {} ({} submeshes, {} bones)",
        path.display(),
        data.skinned_meshes.len(),
        data.bone_count()
    );
    Ok(())
}

/// Reads a mesh file written by [`write_mesh_file`], any supported version.
pub fn read_mesh_file(path: impl AsRef<Path>) -> Result<SkinnedMeshData> {
    let path = path.as_ref();
    let file = File::open(path).inspect_err(|e| {
        log::error!("Failed to open mesh file {}: {e}", path.display());
    })?;

    read_skinned_mesh(&mut BufReader::new(file))
        .inspect_err(|e| log::error!("Failed to read mesh file {}: {e}", path.display()))
}

// ============================================================================
// Encoding
// ============================================================================

pub fn write_skinned_mesh<W: Write>(
    writer: &mut W,
    data: &SkinnedMeshData,
    version: MeshFileVersion,
) -> Result<()> {
    writer.write_u16::<LittleEndian>(version.tag())?;
    write_string(writer, &data.name)?;
    writer.write_u32::<LittleEndian>(data.num_animations)?;

    writer.write_u32::<LittleEndian>(length_u32(data.bone_info.len(), "bone table")?)?;
    for (name, info) in data.bone_info.iter() {
        write_string(writer, name)?;
        writer.write_u32::<LittleEndian>(info.id)?;
        write_mat4(writer, &info.offset)?;
    }
    writer.write_u32::<LittleEndian>(data.bone_info.bone_count())?;

    if version == MeshFileVersion::Counted {
        writer.write_u32::<LittleEndian>(length_u32(data.skinned_meshes.len(), "submesh list")?)?;
    }

    for mesh in &data.skinned_meshes {
        write_submesh(writer, mesh)?;
    }
    Ok(())
}

fn write_submesh<W: Write>(writer: &mut W, mesh: &SkinnedMesh) -> Result<()> {
    write_string(writer, &mesh.name)?;

    writer.write_u32::<LittleEndian>(length_u32(mesh.vertices.len(), "vertex buffer")?)?;
    for vertex in &mesh.vertices {
        write_vertex(writer, vertex)?;
    }

    writer.write_u32::<LittleEndian>(length_u32(mesh.indices.len(), "index buffer")?)?;
    for &index in &mesh.indices {
        writer.write_u32::<LittleEndian>(index)?;
    }

    match mesh.material.as_deref() {
        Some(material) => {
            write_string(writer, &material.name)?;
            for path in material.texture_paths() {
                write_string(writer, path)?;
            }
        }
        None => {
            for _ in 0..=ParameterType::COUNT {
                write_string(writer, "")?;
            }
        }
    }
    Ok(())
}

fn write_vertex<W: Write>(writer: &mut W, vertex: &SkinnedVertex) -> io::Result<()> {
    write_vec3(writer, vertex.position)?;
    writer.write_f32::<LittleEndian>(vertex.tex_coords.x)?;
    writer.write_f32::<LittleEndian>(vertex.tex_coords.y)?;
    write_vec3(writer, vertex.normal)?;
    write_vec3(writer, vertex.tangent)?;
    write_vec3(writer, vertex.bitangent)?;
    for id in vertex.bone_ids {
        writer.write_i32::<LittleEndian>(id)?;
    }
    for weight in vertex.weights {
        writer.write_f32::<LittleEndian>(weight)?;
    }
    Ok(())
}

fn write_vec3<W: Write>(writer: &mut W, v: Vec3) -> io::Result<()> {
    writer.write_f32::<LittleEndian>(v.x)?;
    writer.write_f32::<LittleEndian>(v.y)?;
    writer.write_f32::<LittleEndian>(v.z)
}

fn write_mat4<W: Write>(writer: &mut W, m: &Mat4) -> io::Result<()> {
    for value in m.to_cols_array() {
        writer.write_f32::<LittleEndian>(value)?;
    }
    Ok(())
}

fn write_string<W: Write>(writer: &mut W, s: &str) -> Result<()> {
    writer.write_u32::<LittleEndian>(length_u32(s.len(), "string")?)?;
    writer.write_all(s.as_bytes())?;
    Ok(())
}

fn length_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        SundayError::IoError(io::Error::new(
            ErrorKind::InvalidInput,
            format!("{what} too large for the mesh file format ({len})"),
        ))
    })
}

// ============================================================================
// Decoding
// ============================================================================

pub fn read_skinned_mesh<R: Read>(reader: &mut R) -> Result<SkinnedMeshData> {
    let mut r = MeshFileReader { inner: reader };

    let version = MeshFileVersion::from_tag(r.u16("version")?)?;
    let name = r.string("model name")?;
    let num_animations = r.u32("animation count")?;

    let bone_entries = r.u32("bone table size")? as usize;
    let mut bones = BTreeMap::new();
    for _ in 0..bone_entries {
        let bone_name = r.string("bone name")?;
        let id = r.u32("bone id")?;
        let offset = r.mat4("bone offset")?;
        if bones.insert(bone_name.clone(), BoneInfo { id, offset }).is_some() {
            log::warn!("Mesh file lists bone '{bone_name}' twice, keeping the last entry");
        }
    }
    let bone_count = r.u32("bone count")?;
    let bone_info = BoneInfoTable::from_parts(bones, bone_count);

    let mut skinned_meshes = Vec::new();
    match version {
        MeshFileVersion::Counted => {
            let count = r.u32("submesh count")? as usize;
            skinned_meshes.reserve(count.min(PREALLOCATION_LIMIT));
            for _ in 0..count {
                let name_len = r.u32("mesh name")?;
                skinned_meshes.push(r.submesh(name_len)?);
            }
        }
        MeshFileVersion::Legacy => {
            while let Some(name_len) = r.u32_or_eof("mesh name")? {
                skinned_meshes.push(r.submesh(name_len)?);
            }
        }
    }

    Ok(SkinnedMeshData {
        name,
        skinned_meshes,
        num_animations,
        bone_info,
    })
}

struct MeshFileReader<'a, R: Read> {
    inner: &'a mut R,
}

impl<R: Read> MeshFileReader<'_, R> {
    fn submesh(&mut self, name_len: u32) -> Result<SkinnedMesh> {
        let name = self.string_of_len(name_len, "mesh name")?;

        let vertex_count = self.u32("vertex count")? as usize;
        let mut vertices = Vec::with_capacity(vertex_count.min(PREALLOCATION_LIMIT));
        for _ in 0..vertex_count {
            vertices.push(self.vertex()?);
        }

        let index_count = self.u32("index count")? as usize;
        let mut indices = Vec::with_capacity(index_count.min(PREALLOCATION_LIMIT));
        for _ in 0..index_count {
            indices.push(self.u32("indices")?);
        }

        let material_name = self.string("material name")?;
        let paths: [String; ParameterType::COUNT] = [
            self.string("albedo path")?,
            self.string("normal path")?,
            self.string("metallic path")?,
            self.string("roughness path")?,
            self.string("ao path")?,
        ];

        let material = if material_name.is_empty() && paths.iter().all(String::is_empty) {
            None
        } else {
            let mut material = Material::from_texture_paths(material_name, paths);
            material.is_default = true;
            Some(Arc::new(material))
        };

        Ok(SkinnedMesh::new(name, vertices, indices, material))
    }

    fn vertex(&mut self) -> Result<SkinnedVertex> {
        let position = self.vec3("vertex position")?;
        let tex_coords = Vec2::new(self.f32("vertex uv")?, self.f32("vertex uv")?);
        let normal = self.vec3("vertex normal")?;
        let tangent = self.vec3("vertex tangent")?;
        let bitangent = self.vec3("vertex bitangent")?;

        let mut bone_ids = [0i32; MAX_BONE_INFLUENCE];
        for id in &mut bone_ids {
            *id = self.inner.read_i32::<LittleEndian>().map_err(eof_as("vertex bone ids"))?;
        }
        let mut weights = [0f32; MAX_BONE_INFLUENCE];
        for weight in &mut weights {
            *weight = self.f32("vertex weights")?;
        }

        Ok(SkinnedVertex {
            position,
            tex_coords,
            normal,
            tangent,
            bitangent,
            bone_ids,
            weights,
        })
    }

    fn u16(&mut self, context: &str) -> Result<u16> {
        self.inner.read_u16::<LittleEndian>().map_err(eof_as(context))
    }

    fn u32(&mut self, context: &str) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(eof_as(context))
    }

    /// `None` when the stream ends cleanly before the first byte.
    fn u32_or_eof(&mut self, context: &str) -> Result<Option<u32>> {
        let mut buf = [0u8; 4];
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            4 => Ok(Some(u32::from_le_bytes(buf))),
            _ => Err(SundayError::truncated(context)),
        }
    }

    fn f32(&mut self, context: &str) -> Result<f32> {
        self.inner.read_f32::<LittleEndian>().map_err(eof_as(context))
    }

    fn vec3(&mut self, context: &str) -> Result<Vec3> {
        Ok(Vec3::new(self.f32(context)?, self.f32(context)?, self.f32(context)?))
    }

    fn mat4(&mut self, context: &str) -> Result<Mat4> {
        let mut cols = [0f32; 16];
        for value in &mut cols {
            *value = self.f32(context)?;
        }
        Ok(Mat4::from_cols_array(&cols))
    }

    fn string(&mut self, context: &str) -> Result<String> {
        let len = self.u32(context)?;
        self.string_of_len(len, context)
    }

    fn string_of_len(&mut self, len: u32, context: &str) -> Result<String> {
        let mut bytes = Vec::with_capacity((len as usize).min(PREALLOCATION_LIMIT));
        self.inner.by_ref().take(u64::from(len)).read_to_end(&mut bytes)?;
        if bytes.len() != len as usize {
            return Err(SundayError::truncated(context));
        }
        String::from_utf8(bytes).map_err(|_| SundayError::InvalidString {
            context: context.to_string(),
        })
    }
}

fn eof_as(context: &str) -> impl FnOnce(io::Error) -> SundayError + '_ {
    move |e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            SundayError::truncated(context)
        } else {
            SundayError::IoError(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn strings_are_length_prefixed() {
        let mut bytes = Vec::new();
        write_string(&mut bytes, "hip").unwrap();
        write_string(&mut bytes, "").unwrap();
        assert_eq!(bytes, [3, 0, 0, 0, b'h', b'i', b'p', 0, 0, 0, 0]);

        let mut cursor = Cursor::new(bytes);
        let mut r = MeshFileReader { inner: &mut cursor };
        assert_eq!(r.string("first").unwrap(), "hip");
        assert_eq!(r.string("second").unwrap(), "");
        assert!(r.u32_or_eof("end").unwrap().is_none());
    }

    #[test]
    fn vertex_encoding_matches_struct_size() {
        let mut bytes = Vec::new();
        write_vertex(&mut bytes, &SkinnedVertex::new()).unwrap();
        assert_eq!(bytes.len(), SkinnedVertex::SIZE);
        assert_eq!(SkinnedVertex::SIZE, 88);
    }

    #[test]
    fn partial_length_prefix_is_truncation() {
        let mut cursor = Cursor::new(vec![1u8, 0]);
        let mut r = MeshFileReader { inner: &mut cursor };
        assert!(matches!(
            r.u32_or_eof("mesh name"),
            Err(SundayError::TruncatedMeshFile { .. })
        ));
    }
}
