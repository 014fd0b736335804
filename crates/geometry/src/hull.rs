//! 3D convex hull via QuickHull.
//!
//! Used to approximate the volume of open (non-watertight) meshes.
//!
//! 1. Build an initial tetrahedron from extreme points
//! 2. Assign every remaining point to one face it lies outside of
//! 3. Repeatedly take the farthest outside point of a pending face, flood-fill
//!    the faces it can see through edge adjacency and stitch the horizon to it
//! 4. Stop when no face has outside points

use std::collections::{HashMap, HashSet};

use glam::DVec3;

use crate::error::MeshError;
use crate::mesh::Mesh;

/// Distance tolerance relative to the point cloud extent.
const RELATIVE_EPSILON: f64 = 1e-10;

/// Convex hull of a point set as an outward-wound mesh.
pub fn convex_hull(points: &[DVec3]) -> Result<Mesh, MeshError> {
    let extent = bounds_extent(points);
    let epsilon = RELATIVE_EPSILON * extent.max(1.0);

    let unique = remove_duplicates(points, epsilon);
    if unique.len() < 4 {
        return Err(MeshError::degenerate(format!(
            "convex hull needs 4 distinct points, got {}",
            unique.len()
        )));
    }

    let faces = build_initial_simplex(&unique, epsilon)?;
    let faces = expand(faces, &unique, epsilon);
    faces_to_mesh(&faces, &unique)
}

/// Volume of the convex hull, or `None` when the points span no volume.
pub fn convex_hull_volume(points: &[DVec3]) -> Option<f64> {
    match convex_hull(points) {
        Ok(hull) => Some(hull.signed_volume().abs()),
        Err(e) => {
            tracing::debug!("convex hull unavailable: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: DVec3,
    offset: f64,
    outside: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[DVec3]) -> Self {
        let p0 = points[v0];
        let normal = (points[v1] - p0).cross(points[v2] - p0).normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            normal,
            offset: normal.dot(p0),
            outside: Vec::new(),
        }
    }

    /// Face oriented so that `interior` lies behind it.
    fn facing_away_from(v0: usize, v1: usize, v2: usize, interior: DVec3, points: &[DVec3]) -> Self {
        let face = Self::new(v0, v1, v2, points);
        if face.distance(interior) > 0.0 {
            Self::new(v0, v2, v1, points)
        } else {
            face
        }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    fn farthest_outside(&self, points: &[DVec3]) -> Option<usize> {
        self.outside
            .iter()
            .copied()
            .max_by(|&a, &b| {
                self.distance(points[a])
                    .partial_cmp(&self.distance(points[b]))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

fn bounds_extent(points: &[DVec3]) -> f64 {
    let Some(&first) = points.first() else {
        return 0.0;
    };
    let (lo, hi) = points
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    (hi - lo).length()
}

/// Collapse points that fall into the same epsilon-sized cell.
fn remove_duplicates(points: &[DVec3], epsilon: f64) -> Vec<DVec3> {
    let mut seen: HashSet<(i64, i64, i64)> = HashSet::with_capacity(points.len());
    points
        .iter()
        .filter(|p| p.is_finite())
        .filter(|p| {
            let q = **p / epsilon;
            seen.insert((q.x.round() as i64, q.y.round() as i64, q.z.round() as i64))
        })
        .copied()
        .collect()
}

fn build_initial_simplex(points: &[DVec3], epsilon: f64) -> Result<Vec<HullFace>, MeshError> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[axis * 2]][axis] {
                extremes[axis * 2] = i;
            }
            if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                extremes[axis * 2 + 1] = i;
            }
        }
    }

    let mut best = (extremes[0], extremes[1]);
    let mut best_dist = 0.0;
    for (i, &a) in extremes.iter().enumerate() {
        for &b in &extremes[i + 1..] {
            let d = points[a].distance_squared(points[b]);
            if d > best_dist {
                best_dist = d;
                best = (a, b);
            }
        }
    }
    let (p0, p1) = best;
    if best_dist.sqrt() <= epsilon {
        return Err(MeshError::degenerate("all points coincide"));
    }

    let dir = (points[p1] - points[p0]).normalize();
    let p2 = farthest_by(points, &[p0, p1], epsilon, |p| {
        let v = p - points[p0];
        (v - v.dot(dir) * dir).length()
    })
    .ok_or_else(|| MeshError::degenerate("all points are collinear"))?;

    let plane = (points[p1] - points[p0])
        .cross(points[p2] - points[p0])
        .normalize();
    let p3 = farthest_by(points, &[p0, p1, p2], epsilon, |p| {
        plane.dot(p - points[p0]).abs()
    })
    .ok_or_else(|| MeshError::degenerate("all points are coplanar"))?;

    let interior = (points[p0] + points[p1] + points[p2] + points[p3]) / 4.0;
    let mut faces = vec![
        HullFace::facing_away_from(p0, p1, p2, interior, points),
        HullFace::facing_away_from(p0, p2, p3, interior, points),
        HullFace::facing_away_from(p0, p3, p1, interior, points),
        HullFace::facing_away_from(p1, p3, p2, interior, points),
    ];

    let used = [p0, p1, p2, p3];
    let remaining: Vec<usize> = (0..points.len()).filter(|i| !used.contains(i)).collect();
    assign_outside(&mut faces, &remaining, points, epsilon);

    Ok(faces)
}

fn farthest_by(
    points: &[DVec3],
    exclude: &[usize],
    epsilon: f64,
    metric: impl Fn(DVec3) -> f64,
) -> Option<usize> {
    let mut best = None;
    let mut best_dist = epsilon;
    for (i, &p) in points.iter().enumerate() {
        if exclude.contains(&i) {
            continue;
        }
        let d = metric(p);
        if d > best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best
}

fn assign_outside(faces: &mut [HullFace], candidates: &[usize], points: &[DVec3], epsilon: f64) {
    for &idx in candidates {
        if let Some(face) = faces.iter_mut().find(|f| f.distance(points[idx]) > epsilon) {
            face.outside.push(idx);
        }
    }
}

fn expand(mut faces: Vec<HullFace>, points: &[DVec3], epsilon: f64) -> Vec<HullFace> {
    let mut alive = vec![true; faces.len()];
    let mut visited = vec![0usize; faces.len()];
    let mut round = 0usize;

    // directed edge -> owning face; the neighbour across (u, v) owns (v, u)
    let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
    for (id, face) in faces.iter().enumerate() {
        for edge in face.edges() {
            edges.insert(edge, id);
        }
    }

    let mut pending: Vec<usize> = (0..faces.len())
        .filter(|&id| !faces[id].outside.is_empty())
        .collect();

    while let Some(seed) = pending.pop() {
        if !alive[seed] {
            continue;
        }
        let Some(apex) = faces[seed].farthest_outside(points) else {
            continue;
        };
        let apex_point = points[apex];
        round += 1;

        // flood fill the faces that see the apex, collecting the horizon
        // in the winding of the visible side
        let mut visible = vec![seed];
        let mut horizon = Vec::new();
        visited[seed] = round;
        let mut cursor = 0;
        while cursor < visible.len() {
            let id = visible[cursor];
            cursor += 1;
            for (u, v) in faces[id].edges() {
                match edges.get(&(v, u)).copied() {
                    Some(next) if alive[next] => {
                        if visited[next] == round {
                            continue;
                        }
                        if faces[next].distance(apex_point) > epsilon {
                            visited[next] = round;
                            visible.push(next);
                        } else {
                            horizon.push((u, v));
                        }
                    }
                    _ => horizon.push((u, v)),
                }
            }
        }

        let mut orphans = Vec::new();
        for &id in &visible {
            alive[id] = false;
            for edge in faces[id].edges() {
                if edges.get(&edge) == Some(&id) {
                    edges.remove(&edge);
                }
            }
            orphans.extend(faces[id].outside.drain(..).filter(|&p| p != apex));
        }

        let first_new = faces.len();
        for (u, v) in horizon {
            let id = faces.len();
            let face = HullFace::new(u, v, apex, points);
            for edge in face.edges() {
                edges.insert(edge, id);
            }
            faces.push(face);
            alive.push(true);
            visited.push(0);
        }

        assign_outside(&mut faces[first_new..], &orphans, points, epsilon);
        pending.extend((first_new..faces.len()).filter(|&id| !faces[id].outside.is_empty()));
    }

    faces
        .into_iter()
        .zip(alive)
        .filter_map(|(face, alive)| alive.then_some(face))
        .collect()
}

fn faces_to_mesh(faces: &[HullFace], points: &[DVec3]) -> Result<Mesh, MeshError> {
    let mut remap: HashMap<usize, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut tris = Vec::with_capacity(faces.len());

    for face in faces {
        let mut tri = [0u32; 3];
        for (slot, &v) in tri.iter_mut().zip(&face.vertices) {
            *slot = *remap.entry(v).or_insert_with(|| {
                vertices.push(points[v]);
                (vertices.len() - 1) as u32
            });
        }
        tris.push(tri);
    }

    Ok(Mesh::new(vertices, tris)?.oriented_outward())
}
