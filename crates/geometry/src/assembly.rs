//! Aircraft assembly.
//!
//! Components arrive in their local frames and are placed by fixed rules:
//! the fuselage stays at the origin, wings and engines are instanced in
//! symmetric pairs about the x-z plane using the attachment offsets. Instances
//! are concatenated without welding or boolean union.

use std::f64::consts::FRAC_PI_2;

use glam::{DAffine3, DVec3};
use shared::{AttachmentOffsets, ComponentCategory, Offset3};

use crate::error::MeshError;
use crate::mesh::Mesh;

/// One placed copy of a component mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub label: &'static str,
    pub category: ComponentCategory,
    pub mesh: Mesh,
}

/// Place every component.
///
/// Output order is fixed: fuselage, wing right, wing left, engine left, engine
/// right. When a category is supplied more than once the last one is used.
pub fn place(
    components: &[(ComponentCategory, Mesh)],
    offsets: &AttachmentOffsets,
) -> Vec<PlacedInstance> {
    let mut fuselage = None;
    let mut wing = None;
    let mut engine = None;

    for (category, mesh) in components {
        let slot = match category {
            ComponentCategory::Fuselage => &mut fuselage,
            ComponentCategory::Wing => &mut wing,
            ComponentCategory::Engine => &mut engine,
        };
        if slot.replace(mesh).is_some() {
            tracing::warn!(%category, "component supplied twice, keeping the later one");
        }
    }

    let mut instances = Vec::with_capacity(5);

    if let Some(mesh) = fuselage {
        instances.push(PlacedInstance {
            label: "fuselage",
            category: ComponentCategory::Fuselage,
            mesh: mesh.clone(),
        });
    }

    if let Some(mesh) = wing {
        let right = to_vec(offsets.wing);
        instances.push(PlacedInstance {
            label: "wing_right",
            category: ComponentCategory::Wing,
            mesh: mesh.translated(right),
        });
        instances.push(PlacedInstance {
            label: "wing_left",
            category: ComponentCategory::Wing,
            mesh: mesh.mirrored_y().translated(mirror(right)),
        });
    }

    if let Some(mesh) = engine {
        let rotated = mesh.transformed(DAffine3::from_rotation_z(FRAC_PI_2));
        let position = to_vec(offsets.engine);
        instances.push(PlacedInstance {
            label: "engine_left",
            category: ComponentCategory::Engine,
            mesh: rotated.translated(position),
        });
        instances.push(PlacedInstance {
            label: "engine_right",
            category: ComponentCategory::Engine,
            mesh: rotated.translated(mirror(position)),
        });
    }

    instances
}

/// Place and merge. An empty component list yields [`placeholder`].
pub fn compile(
    components: &[(ComponentCategory, Mesh)],
    offsets: &AttachmentOffsets,
) -> Result<Mesh, MeshError> {
    let instances = place(components, offsets);
    if instances.is_empty() {
        tracing::warn!("no components to assemble, returning placeholder cube");
        return Ok(placeholder());
    }

    let meshes: Vec<Mesh> = instances.into_iter().map(|i| i.mesh).collect();
    Mesh::merge(&meshes)
}

/// Unit cube standing in for an aircraft with no geometry.
pub fn placeholder() -> Mesh {
    Mesh::unit_cube()
}

fn to_vec(offset: Offset3) -> DVec3 {
    DVec3::new(offset.x, offset.y, offset.z)
}

fn mirror(v: DVec3) -> DVec3 {
    DVec3::new(v.x, -v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn offsets(wing: Offset3, engine: Offset3) -> AttachmentOffsets {
        AttachmentOffsets { wing, engine }
    }

    #[test]
    fn test_wing_pair_placed_symmetrically() {
        let wing = Mesh::unit_cube();
        let instances = place(
            &[(ComponentCategory::Wing, wing)],
            &offsets(Offset3::new(2.0, 3.0, 0.0), Offset3::default()),
        );
        assert_eq!(instances.len(), 2);

        let right = instances[0].mesh.centroid();
        assert_relative_eq!(right.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(right.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(right.z, 0.0, epsilon = 1e-12);

        let left = instances[1].mesh.centroid();
        assert_relative_eq!(left.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(left.y, -3.0, epsilon = 1e-12);
        assert!(instances[1].mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_left_wing_is_mirror_of_right() {
        let wing = Mesh::unit_cube()
            .transformed(DAffine3::from_scale(DVec3::new(1.0, 4.0, 0.2)))
            .translated(DVec3::new(0.0, 2.0, 0.0));
        let instances = place(&[(ComponentCategory::Wing, wing)], &AttachmentOffsets::default());
        let (_, right_hi) = instances[0].mesh.bounds().unwrap();
        let (left_lo, _) = instances[1].mesh.bounds().unwrap();
        assert_relative_eq!(right_hi.y, 4.0, epsilon = 1e-12);
        assert_relative_eq!(left_lo.y, -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_engine_rotated_onto_flight_axis() {
        // long along Y in the local frame
        let nacelle = Mesh::unit_cube().transformed(DAffine3::from_scale(DVec3::new(1.0, 4.0, 1.0)));
        let instances = place(
            &[(ComponentCategory::Engine, nacelle)],
            &offsets(Offset3::default(), Offset3::new(1.0, 5.0, -1.0)),
        );
        assert_eq!(instances[0].label, "engine_left");
        assert_eq!(instances[1].label, "engine_right");

        let (lo, hi) = instances[0].mesh.bounds().unwrap();
        assert_relative_eq!(hi.x - lo.x, 4.0, epsilon = 1e-9);
        assert_relative_eq!(hi.y - lo.y, 1.0, epsilon = 1e-9);

        let left = instances[0].mesh.centroid();
        let right = instances[1].mesh.centroid();
        assert_relative_eq!(left.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(right.y, -5.0, epsilon = 1e-9);
        assert_relative_eq!(right.z, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_instance_order_is_fixed() {
        let instances = place(
            &[
                (ComponentCategory::Engine, Mesh::unit_cube()),
                (ComponentCategory::Wing, Mesh::unit_cube()),
                (ComponentCategory::Fuselage, Mesh::unit_cube()),
            ],
            &AttachmentOffsets::default(),
        );
        let labels: Vec<&str> = instances.iter().map(|i| i.label).collect();
        assert_eq!(
            labels,
            ["fuselage", "wing_right", "wing_left", "engine_left", "engine_right"]
        );
    }

    #[test]
    fn test_later_duplicate_wins() {
        let small = Mesh::unit_cube();
        let large = Mesh::unit_cube().transformed(DAffine3::from_scale(DVec3::splat(2.0)));
        let instances = place(
            &[
                (ComponentCategory::Fuselage, small),
                (ComponentCategory::Fuselage, large.clone()),
            ],
            &AttachmentOffsets::default(),
        );
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].mesh, large);
    }

    #[test]
    fn test_compile_renumbers_indices() {
        let mesh = compile(
            &[
                (ComponentCategory::Fuselage, Mesh::unit_cube()),
                (ComponentCategory::Wing, Mesh::unit_cube()),
            ],
            &AttachmentOffsets::default(),
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 36);
        let max = mesh.faces().iter().flatten().copied().max().unwrap();
        assert_eq!(max, 23);
    }

    #[test]
    fn test_empty_input_gives_placeholder() {
        let mesh = compile(&[], &AttachmentOffsets::default()).unwrap();
        assert!(!mesh.is_empty());
        assert_eq!(mesh, placeholder());
    }
}
