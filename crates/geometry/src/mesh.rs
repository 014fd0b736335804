//! Triangle mesh: vertices, index triples and optional per-vertex normals.
//!
//! The constructor checks that every face index is within the vertex list, so
//! any `Mesh` that exists is safe to hand to exporters and renderers. Meshes may
//! still be open or non-manifold.

use std::collections::HashMap;

use glam::{DAffine3, DMat3, DVec3};
use shared::GeometryRecord;

use crate::error::MeshError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    vertices: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
    normals: Option<Vec<DVec3>>,
}

impl Mesh {
    /// Build a mesh, rejecting faces that point past the vertex list.
    pub fn new(vertices: Vec<DVec3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let vertex_count = vertices.len();
        for (face, tri) in faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertices,
            faces,
            normals: None,
        })
    }

    /// Attach per-vertex normals (one per vertex).
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Result<Self, MeshError> {
        if normals.len() != self.vertices.len() {
            return Err(MeshError::NormalCountMismatch {
                normals: normals.len(),
                vertices: self.vertices.len(),
            });
        }
        self.normals = Some(normals);
        Ok(self)
    }

    /// Axis-aligned unit cube centred on the origin, outward winding.
    pub fn unit_cube() -> Self {
        let h = 0.5;
        let vertices = vec![
            DVec3::new(-h, -h, -h),
            DVec3::new(h, -h, -h),
            DVec3::new(h, h, -h),
            DVec3::new(-h, h, -h),
            DVec3::new(-h, -h, h),
            DVec3::new(h, -h, h),
            DVec3::new(h, h, h),
            DVec3::new(-h, h, h),
        ];
        let faces = vec![
            [0, 2, 1], [0, 3, 2], // -Z
            [4, 5, 6], [4, 6, 7], // +Z
            [0, 1, 5], [0, 5, 4], // -Y
            [3, 7, 6], [3, 6, 2], // +Y
            [0, 4, 7], [0, 7, 3], // -X
            [1, 2, 6], [1, 6, 5], // +X
        ];
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Mean of all vertex positions (origin for an empty mesh).
    pub fn centroid(&self) -> DVec3 {
        if self.vertices.is_empty() {
            return DVec3::ZERO;
        }
        self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len() as f64
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Apply an affine transform to positions and normals.
    ///
    /// A transform with negative determinant (a reflection) flips the face
    /// winding so that outward faces stay outward.
    pub fn transformed(&self, transform: DAffine3) -> Mesh {
        let vertices = self
            .vertices
            .iter()
            .map(|&p| transform.transform_point3(p))
            .collect();

        let linear: DMat3 = transform.matrix3;
        let reflects = linear.determinant() < 0.0;
        let faces = if reflects {
            self.faces.iter().map(|&[a, b, c]| [a, c, b]).collect()
        } else {
            self.faces.clone()
        };

        let normal_matrix = linear.inverse().transpose();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|&n| (normal_matrix * n).try_normalize().unwrap_or(n))
                .collect()
        });

        Mesh {
            vertices,
            faces,
            normals,
        }
    }

    pub fn translated(&self, offset: DVec3) -> Mesh {
        self.transformed(DAffine3::from_translation(offset))
    }

    /// Reflect across the x-z plane (negate Y).
    pub fn mirrored_y(&self) -> Mesh {
        self.transformed(DAffine3::from_mat3(DMat3::from_diagonal(DVec3::new(
            1.0, -1.0, 1.0,
        ))))
    }

    /// Concatenate meshes, renumbering face indices into the combined vertex list.
    ///
    /// No vertex welding is performed. Normals survive only when every input
    /// carries them. Fails when the combined vertex count is beyond `u32`
    /// face indices.
    pub fn merge(meshes: &[Mesh]) -> Result<Mesh, MeshError> {
        let vertex_total: usize = meshes.iter().map(|m| m.vertices.len()).sum();
        index_limit(vertex_total)?;
        let face_total: usize = meshes.iter().map(|m| m.faces.len()).sum();

        let mut vertices = Vec::with_capacity(vertex_total);
        let mut faces = Vec::with_capacity(face_total);
        let keep_normals = !meshes.is_empty() && meshes.iter().all(|m| m.normals.is_some());
        let mut normals = Vec::with_capacity(if keep_normals { vertex_total } else { 0 });

        for mesh in meshes {
            // bounded by index_limit above
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&mesh.vertices);
            faces.extend(
                mesh.faces
                    .iter()
                    .map(|&[a, b, c]| [a + base, b + base, c + base]),
            );
            if let (true, Some(n)) = (keep_normals, &mesh.normals) {
                normals.extend_from_slice(n);
            }
        }

        Ok(Mesh {
            vertices,
            faces,
            normals: keep_normals.then_some(normals),
        })
    }

    /// Signed enclosed volume (positive for outward winding).
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|&[a, b, c]| {
                let p0 = self.vertices[a as usize];
                let p1 = self.vertices[b as usize];
                let p2 = self.vertices[c as usize];
                p0.dot(p1.cross(p2))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Every directed edge is matched by exactly one reversed edge.
    pub fn is_watertight(&self) -> bool {
        if self.faces.is_empty() {
            return false;
        }

        let mut directed: HashMap<(u32, u32), u32> = HashMap::with_capacity(self.faces.len() * 3);
        for &[a, b, c] in &self.faces {
            if a == b || b == c || c == a {
                return false;
            }
            for edge in [(a, b), (b, c), (c, a)] {
                let count = directed.entry(edge).or_insert(0);
                *count += 1;
                if *count > 1 {
                    return false;
                }
            }
        }

        directed.keys().all(|&(a, b)| directed.contains_key(&(b, a)))
    }

    /// Area-weighted per-vertex normals.
    pub fn compute_vertex_normals(&self) -> Vec<DVec3> {
        let mut accum = vec![DVec3::ZERO; self.vertices.len()];
        for &[a, b, c] in &self.faces {
            let p0 = self.vertices[a as usize];
            let p1 = self.vertices[b as usize];
            let p2 = self.vertices[c as usize];
            let n = (p1 - p0).cross(p2 - p0);
            accum[a as usize] += n;
            accum[b as usize] += n;
            accum[c as usize] += n;
        }
        accum
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(DVec3::Z))
            .collect()
    }

    /// Fill in vertex normals if the mesh has none.
    pub fn ensure_normals(mut self) -> Mesh {
        if self.normals.is_none() {
            self.normals = Some(self.compute_vertex_normals());
        }
        self
    }

    /// Flip every face if the surface is wound inward.
    pub(crate) fn oriented_outward(mut self) -> Mesh {
        if self.signed_volume() < 0.0 {
            for face in &mut self.faces {
                face.swap(1, 2);
            }
        }
        self
    }

    /// Flatten into the transport form.
    pub fn to_record(&self) -> GeometryRecord {
        GeometryRecord {
            vertices: flatten(&self.vertices),
            indices: self.faces.iter().flatten().copied().collect(),
            normals: self.normals.as_deref().map(flatten),
        }
    }

    /// Rebuild from the transport form, checking strides and index bounds.
    pub fn from_record(record: &GeometryRecord) -> Result<Mesh, MeshError> {
        let vertices = unflatten("vertices", &record.vertices)?;

        if record.indices.len() % 3 != 0 {
            return Err(MeshError::BadStride {
                array: "indices",
                len: record.indices.len(),
            });
        }
        let faces = record
            .indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        let mesh = Mesh::new(vertices, faces)?;
        match &record.normals {
            Some(normals) => mesh.with_normals(unflatten("normals", normals)?),
            None => Ok(mesh),
        }
    }
}

fn flatten(points: &[DVec3]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

fn unflatten(array: &'static str, data: &[f64]) -> Result<Vec<DVec3>, MeshError> {
    if data.len() % 3 != 0 {
        return Err(MeshError::BadStride {
            array,
            len: data.len(),
        });
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0], c[1], c[2]))
        .collect())
}

/// Largest vertex index of a mesh with `count` vertices must fit in `u32`.
fn index_limit(count: usize) -> Result<u32, MeshError> {
    u32::try_from(count).map_err(|_| MeshError::TooManyVertices { count })
}
