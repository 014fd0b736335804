//! Geometry record validation.
//!
//! `MeshValidator` checks the flat transport form before it leaves the crate:
//! array strides, in-range indices, finite coordinates, unit normals and
//! bounding-box dimensions.

use shared::GeometryRecord;

/// Allowed deviation of a normal's length from 1.
pub const NORMAL_TOLERANCE: f64 = 0.1;

/// Validator for `GeometryRecord` integrity checks.
pub struct MeshValidator<'a> {
    record: &'a GeometryRecord,
}

impl<'a> MeshValidator<'a> {
    pub fn new(record: &'a GeometryRecord) -> Self {
        Self { record }
    }

    /// Number of vertices (vertex array length / 3).
    pub fn vertex_count(&self) -> usize {
        self.record.vertices.len() / 3
    }

    /// Number of triangles (index array length / 3).
    pub fn triangle_count(&self) -> usize {
        self.record.indices.len() / 3
    }

    pub fn is_stride_valid(&self) -> bool {
        self.record.vertices.len() % 3 == 0
    }

    pub fn is_index_stride_valid(&self) -> bool {
        self.record.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.vertex_count() as u32;
        self.record.indices.iter().all(|&i| i < max_idx)
    }

    pub fn are_coordinates_finite(&self) -> bool {
        self.record.vertices.iter().all(|v| v.is_finite())
    }

    /// Normals match the vertex count and have unit length (within epsilon).
    /// A record without normals passes.
    pub fn are_normals_normalized(&self, epsilon: f64) -> bool {
        let Some(normals) = &self.record.normals else {
            return true;
        };
        if normals.len() != self.record.vertices.len() {
            return false;
        }
        normals.chunks_exact(3).all(|n| {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            (len - 1.0).abs() <= epsilon
        })
    }

    /// Triangles with a repeated vertex index.
    pub fn degenerate_triangle_count(&self) -> usize {
        self.record
            .indices
            .chunks_exact(3)
            .filter(|t| t[0] == t[1] || t[1] == t[2] || t[0] == t[2])
            .count()
    }

    /// Axis-aligned bounds as (min, max); `None` when there are no vertices.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let mut points = self.record.vertices.chunks_exact(3);
        let first = points.next()?;
        let init = ([first[0], first[1], first[2]], [first[0], first[1], first[2]]);
        Some(points.fold(init, |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }

    /// Bounding box extent (x, y, z); zero for an empty record.
    pub fn dimensions(&self) -> [f64; 3] {
        match self.bounds() {
            Some((lo, hi)) => [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]],
            None => [0.0; 3],
        }
    }

    /// Check that the bounding-box dimensions are approximately `expected`.
    pub fn assert_dimensions_approx(&self, expected: [f64; 3], tolerance: f64) -> bool {
        let dims = self.dimensions();
        dims.iter()
            .zip(expected)
            .all(|(d, e)| (d - e).abs() < tolerance)
    }

    /// Problems that make the record unusable as a mesh: strides, index
    /// range and coordinates. Normals are not checked.
    pub fn structural_problems(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.is_stride_valid() {
            errors.push(format!(
                "Vertex array length {} is not a multiple of 3",
                self.record.vertices.len()
            ));
        }

        if !self.is_index_stride_valid() {
            errors.push(format!(
                "Index array length {} is not a multiple of 3",
                self.record.indices.len()
            ));
        }

        if !self.are_indices_in_range() {
            let max_idx = self.vertex_count() as u32;
            let out_of_range: Vec<_> = self
                .record
                .indices
                .iter()
                .filter(|&&i| i >= max_idx)
                .take(5)
                .collect();
            errors.push(format!(
                "Indices out of range (vertex_count={}): {:?}",
                max_idx, out_of_range
            ));
        }

        if !self.are_coordinates_finite() {
            errors.push("Vertex array contains NaN or infinite values".to_string());
        }

        errors
    }

    /// Run all checks and return a list of error messages.
    /// An empty list means the record is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = self.structural_problems();

        if !self.are_normals_normalized(NORMAL_TOLERANCE) {
            errors.push(format!(
                "Normals missing for some vertices or not unit-length (epsilon={NORMAL_TOLERANCE})"
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_triangle() -> GeometryRecord {
        GeometryRecord {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
            normals: Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
        }
    }

    #[test]
    fn test_counts() {
        let record = simple_triangle();
        let v = MeshValidator::new(&record);
        assert_eq!(v.vertex_count(), 3);
        assert_eq!(v.triangle_count(), 1);
    }

    #[test]
    fn test_stride_invalid() {
        let bad = GeometryRecord {
            vertices: vec![0.0; 10],
            indices: vec![],
            normals: None,
        };
        assert!(!MeshValidator::new(&bad).is_stride_valid());
    }

    #[test]
    fn test_indices_out_of_range() {
        let bad = GeometryRecord {
            vertices: vec![0.0; 3],
            indices: vec![0, 1, 2],
            normals: None,
        };
        assert!(!MeshValidator::new(&bad).are_indices_in_range());
    }

    #[test]
    fn test_normals_not_normalized() {
        let mut bad = simple_triangle();
        bad.normals = Some(vec![0.0, 0.0, 5.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let v = MeshValidator::new(&bad);
        assert!(!v.are_normals_normalized(0.01));
        assert!(MeshValidator::new(&simple_triangle()).are_normals_normalized(0.01));
    }

    #[test]
    fn test_normals_wrong_length() {
        let mut bad = simple_triangle();
        bad.normals = Some(vec![0.0, 0.0, 1.0]);
        assert!(!MeshValidator::new(&bad).are_normals_normalized(0.1));
        assert!(MeshValidator::new(&bad).structural_problems().is_empty());
        assert_eq!(MeshValidator::new(&bad).validate_all().len(), 1);
    }

    #[test]
    fn test_degenerate_triangles() {
        let mut record = simple_triangle();
        record.indices = vec![0, 1, 2, 0, 0, 1];
        assert_eq!(MeshValidator::new(&record).degenerate_triangle_count(), 1);
    }

    #[test]
    fn test_dimensions() {
        let record = simple_triangle();
        let v = MeshValidator::new(&record);
        assert!(v.assert_dimensions_approx([1.0, 1.0, 0.0], 0.001));
        assert!(!v.assert_dimensions_approx([2.0, 1.0, 0.0], 0.01));
        assert_eq!(MeshValidator::new(&GeometryRecord::default()).dimensions(), [0.0; 3]);
    }

    #[test]
    fn test_validate_all_ok() {
        let record = simple_triangle();
        let errors = MeshValidator::new(&record).validate_all();
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_validate_all_catches_nan() {
        let mut bad = simple_triangle();
        bad.vertices[4] = f64::NAN;
        let errors = MeshValidator::new(&bad).validate_all();
        assert!(errors.iter().any(|e| e.contains("NaN")));
    }

    #[test]
    fn test_validate_all_catches_bad_indices() {
        let mut bad = simple_triangle();
        bad.indices = vec![0, 5, 2];
        let errors = MeshValidator::new(&bad).validate_all();
        assert!(errors.iter().any(|e| e.contains("out of range")));
    }
}
