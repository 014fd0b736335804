//! Mesh file writers: binary and ASCII STL, Wavefront OBJ and GLB.

use std::fmt::Write as _;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

const STL_HEADER_LEN: usize = 80;

/// Summary of a mesh for debugging exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshInspection {
    pub vertices: usize,
    pub faces: usize,
    pub bounds_min: Option<[f64; 3]>,
    pub bounds_max: Option<[f64; 3]>,
    pub is_watertight: bool,
}

pub fn inspect(mesh: &Mesh) -> MeshInspection {
    let bounds = mesh.bounds();
    MeshInspection {
        vertices: mesh.vertex_count(),
        faces: mesh.triangle_count(),
        bounds_min: bounds.map(|(lo, _)| lo.to_array()),
        bounds_max: bounds.map(|(_, hi)| hi.to_array()),
        is_watertight: mesh.is_watertight(),
    }
}

/// Binary STL: 80-byte header, triangle count, 50 bytes per triangle.
pub fn stl_binary(mesh: &Mesh, name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(STL_HEADER_LEN + 4 + mesh.triangle_count() * 50);

    let mut header = [0u8; STL_HEADER_LEN];
    let label = name.as_bytes();
    let len = label.len().min(STL_HEADER_LEN);
    header[..len].copy_from_slice(&label[..len]);
    // a binary header must not start with "solid"
    if header.starts_with(b"solid") {
        header[..5].copy_from_slice(b"SOLID");
    }
    out.extend_from_slice(&header);
    out.extend_from_slice(&(mesh.triangle_count() as u32).to_le_bytes());

    for (normal, corners) in triangles(mesh) {
        for v in std::iter::once(normal).chain(corners) {
            for c in v.to_array() {
                out.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}

pub fn stl_ascii(mesh: &Mesh, name: &str) -> String {
    let name = sanitize_name(name);
    let mut out = String::new();
    let _ = writeln!(out, "solid {name}");
    for (n, corners) in triangles(mesh) {
        let _ = writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z);
        out.push_str("    outer loop\n");
        for p in corners {
            let _ = writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z);
        }
        out.push_str("    endloop\n  endfacet\n");
    }
    let _ = writeln!(out, "endsolid {name}");
    out
}

/// Wavefront OBJ with 1-based face indices and vertex normals when present.
pub fn obj(mesh: &Mesh) -> String {
    let mut out = String::new();
    for p in mesh.vertices() {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    let normals = mesh.normals();
    if let Some(normals) = normals {
        for n in normals {
            let _ = writeln!(out, "vn {} {} {}", n.x, n.y, n.z);
        }
    }
    for &[a, b, c] in mesh.faces() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        if normals.is_some() {
            let _ = writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}");
        } else {
            let _ = writeln!(out, "f {a} {b} {c}");
        }
    }
    out
}

/// Build a complete GLB (binary glTF) file.
///
/// Each named mesh becomes a separate node/mesh in the scene. Empty meshes
/// are skipped; if nothing remains the result is empty.
pub fn glb(meshes: &[(&str, &Mesh)]) -> Vec<u8> {
    // ── Phase 1: Build binary buffer ─────────────────────────
    let mut bin_data: Vec<u8> = Vec::new();

    struct MeshMeta {
        name: String,
        vertex_count: usize,
        index_count: usize,
        pos_offset: usize,
        pos_length: usize,
        norm_offset: usize,
        norm_length: usize,
        idx_offset: usize,
        idx_length: usize,
        pos_min: [f32; 3],
        pos_max: [f32; 3],
    }

    let mut metas: Vec<MeshMeta> = Vec::new();

    for &(name, mesh) in meshes {
        if mesh.is_empty() {
            continue;
        }

        let normals = match mesh.normals() {
            Some(n) => n.to_vec(),
            None => mesh.compute_vertex_normals(),
        };
        let positions: Vec<f32> = mesh
            .vertices()
            .iter()
            .flat_map(|p| p.as_vec3().to_array())
            .collect();
        let normals: Vec<f32> = normals.iter().flat_map(|n| n.as_vec3().to_array()).collect();
        let indices: Vec<u32> = mesh.faces().iter().flatten().copied().collect();

        let (lo, hi) = mesh.bounds().unwrap_or((DVec3::ZERO, DVec3::ZERO));

        // Positions
        let pos_offset = bin_data.len();
        let pos_bytes = floats_to_bytes(&positions);
        let pos_length = pos_bytes.len();
        bin_data.extend_from_slice(&pos_bytes);

        // Normals
        let norm_offset = bin_data.len();
        let norm_bytes = floats_to_bytes(&normals);
        let norm_length = norm_bytes.len();
        bin_data.extend_from_slice(&norm_bytes);

        // Indices
        let idx_offset = bin_data.len();
        let idx_bytes = u32s_to_bytes(&indices);
        let idx_length = idx_bytes.len();
        bin_data.extend_from_slice(&idx_bytes);

        metas.push(MeshMeta {
            name: name.to_string(),
            vertex_count: mesh.vertex_count(),
            index_count: indices.len(),
            pos_offset,
            pos_length,
            norm_offset,
            norm_length,
            idx_offset,
            idx_length,
            pos_min: lo.as_vec3().to_array(),
            pos_max: hi.as_vec3().to_array(),
        });
    }

    if metas.is_empty() {
        return Vec::new();
    }

    // ── Phase 2: Build glTF JSON ─────────────────────────────
    // 3 bufferViews and 3 accessors per mesh (positions, normals, indices)
    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut gltf_meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut node_indices: Vec<usize> = Vec::new();

    for (i, meta) in metas.iter().enumerate() {
        let base = i * 3;

        for (offset, length, target) in [
            (meta.pos_offset, meta.pos_length, ARRAY_BUFFER),
            (meta.norm_offset, meta.norm_length, ARRAY_BUFFER),
            (meta.idx_offset, meta.idx_length, ELEMENT_ARRAY_BUFFER),
        ] {
            buffer_views.push(serde_json::json!({
                "buffer": 0,
                "byteOffset": offset,
                "byteLength": length,
                "target": target
            }));
        }

        accessors.push(serde_json::json!({
            "bufferView": base,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": meta.vertex_count,
            "type": "VEC3",
            "min": meta.pos_min,
            "max": meta.pos_max
        }));
        accessors.push(serde_json::json!({
            "bufferView": base + 1,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": meta.vertex_count,
            "type": "VEC3"
        }));
        accessors.push(serde_json::json!({
            "bufferView": base + 2,
            "byteOffset": 0,
            "componentType": UNSIGNED_INT,
            "count": meta.index_count,
            "type": "SCALAR"
        }));

        gltf_meshes.push(serde_json::json!({
            "name": meta.name,
            "primitives": [{
                "attributes": {
                    "POSITION": base,
                    "NORMAL": base + 1
                },
                "indices": base + 2,
                "material": 0
            }]
        }));

        nodes.push(serde_json::json!({
            "name": meta.name,
            "mesh": i
        }));
        node_indices.push(i);
    }

    let gltf_json = serde_json::json!({
        "asset": {
            "version": "2.0",
            "generator": concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"))
        },
        "scene": 0,
        "scenes": [{
            "name": "Scene",
            "nodes": node_indices
        }],
        "nodes": nodes,
        "meshes": gltf_meshes,
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{
            "byteLength": bin_data.len()
        }],
        "materials": [{
            "name": "Default",
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.7, 0.7, 0.72, 1.0],
                "metallicFactor": 0.3,
                "roughnessFactor": 0.5
            }
        }]
    });

    let mut json_bytes = serde_json::to_vec(&gltf_json).unwrap_or_default();

    // Pad JSON with spaces and BIN with zeros to 4-byte alignment
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }
    while bin_data.len() % 4 != 0 {
        bin_data.push(0);
    }

    // ── Phase 3: Assemble GLB ────────────────────────────────
    let json_chunk_length = json_bytes.len() as u32;
    let bin_chunk_length = bin_data.len() as u32;

    let total_length: u32 = 12 // header
        + 8 + json_chunk_length  // JSON chunk header + data
        + 8 + bin_chunk_length; // BIN chunk header + data

    let mut out = Vec::with_capacity(total_length as usize);

    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&total_length.to_le_bytes());

    out.extend_from_slice(&json_chunk_length.to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    out.extend_from_slice(&json_bytes);

    out.extend_from_slice(&bin_chunk_length.to_le_bytes());
    out.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    out.extend_from_slice(&bin_data);

    out
}

/// Face normal and corner positions of every triangle.
fn triangles(mesh: &Mesh) -> impl Iterator<Item = (DVec3, [DVec3; 3])> + '_ {
    let vertices = mesh.vertices();
    mesh.faces().iter().map(move |&[a, b, c]| {
        let corners = [
            vertices[a as usize],
            vertices[b as usize],
            vertices[c as usize],
        ];
        let normal = (corners[1] - corners[0])
            .cross(corners[2] - corners[0])
            .normalize_or_zero();
        (normal, corners)
    })
}

/// File-safe form of a model name.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "mesh".to_string()
    } else {
        cleaned
    }
}

fn floats_to_bytes(data: &[f32]) -> Vec<u8> {
    data.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn u32s_to_bytes(data: &[u32]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_le_bytes()).collect()
}
