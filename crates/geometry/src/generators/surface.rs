//! Ring lofting helpers shared by the built-in generators.
//!
//! Rings are closed loops with the same point count. Stitching consecutive
//! rings and capping both ends yields a closed surface with consistent
//! winding; `build` then flips it outward if needed.

use glam::DVec3;

use crate::error::MeshError;
use crate::mesh::Mesh;

#[derive(Default)]
pub(crate) struct SurfaceBuilder {
    vertices: Vec<DVec3>,
    faces: Vec<[u32; 3]>,
}

/// Handle to a ring already pushed into the builder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ring {
    base: u32,
    len: u32,
}

impl SurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point(&mut self, p: DVec3) -> u32 {
        self.vertices.push(p);
        (self.vertices.len() - 1) as u32
    }

    pub fn ring(&mut self, points: &[DVec3]) -> Ring {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(points);
        Ring {
            base,
            len: points.len() as u32,
        }
    }

    /// Quad strip between two rings of equal length.
    pub fn stitch(&mut self, a: Ring, b: Ring) {
        debug_assert_eq!(a.len, b.len);
        for i in 0..a.len {
            let j = (i + 1) % a.len;
            let (a0, a1) = (a.base + i, a.base + j);
            let (b0, b1) = (b.base + i, b.base + j);
            self.faces.push([a0, a1, b1]);
            self.faces.push([a0, b1, b0]);
        }
    }

    /// Stitch a sequence of rings, optionally closing the loop back to the first.
    pub fn stitch_all(&mut self, rings: &[Ring], closed: bool) {
        for pair in rings.windows(2) {
            self.stitch(pair[0], pair[1]);
        }
        if closed {
            if let (Some(&last), Some(&first)) = (rings.last(), rings.first()) {
                self.stitch(last, first);
            }
        }
    }

    /// Fan from `apex` closing the first ring of a stitched sequence.
    pub fn cap_start(&mut self, apex: u32, ring: Ring) {
        for i in 0..ring.len {
            let j = (i + 1) % ring.len;
            self.faces.push([apex, ring.base + j, ring.base + i]);
        }
    }

    /// Fan from `apex` closing the last ring of a stitched sequence.
    pub fn cap_end(&mut self, apex: u32, ring: Ring) {
        for i in 0..ring.len {
            let j = (i + 1) % ring.len;
            self.faces.push([apex, ring.base + i, ring.base + j]);
        }
    }

    /// Centre point of a ring, pushed as a new vertex.
    pub fn ring_center(&mut self, ring: Ring) -> u32 {
        let start = ring.base as usize;
        let end = start + ring.len as usize;
        let center = self.vertices[start..end].iter().copied().sum::<DVec3>() / ring.len as f64;
        self.point(center)
    }

    pub fn build(self) -> Result<Mesh, MeshError> {
        Ok(Mesh::new(self.vertices, self.faces)?.oriented_outward())
    }
}

/// Circle of `segments` points around the axis `axis` (X or Y) at `station`.
pub(crate) fn circle(axis: Axis, station: f64, radius: f64, segments: u32) -> Vec<DVec3> {
    (0..segments)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / segments as f64;
            let (s, c) = theta.sin_cos();
            match axis {
                Axis::X => DVec3::new(station, radius * c, radius * s),
                Axis::Y => DVec3::new(radius * c, station, radius * s),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Axis {
    X,
    Y,
}
