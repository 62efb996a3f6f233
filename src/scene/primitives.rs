//! Procedural geometry for helper objects (ground planes, reticle) and tests.

use glam::Vec3;
use std::f32::consts::TAU;

use crate::scene::mesh::Geometry;

/// Axis-aligned box centred on the origin.
#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 24 vertices (4 per face) so faces stay independent
    let positions = vec![
        // Front face (+Z)
        Vec3::new(-w, -h, d),
        Vec3::new(w, -h, d),
        Vec3::new(w, h, d),
        Vec3::new(-w, h, d),
        // Back face (-Z)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, -h, -d),
        // Top face (+Y)
        Vec3::new(-w, h, -d),
        Vec3::new(-w, h, d),
        Vec3::new(w, h, d),
        Vec3::new(w, h, -d),
        // Bottom face (-Y)
        Vec3::new(-w, -h, -d),
        Vec3::new(w, -h, -d),
        Vec3::new(w, -h, d),
        Vec3::new(-w, -h, d),
        // Right face (+X)
        Vec3::new(w, -h, -d),
        Vec3::new(w, h, -d),
        Vec3::new(w, h, d),
        Vec3::new(w, -h, d),
        // Left face (-X)
        Vec3::new(-w, -h, -d),
        Vec3::new(-w, -h, d),
        Vec3::new(-w, h, d),
        Vec3::new(-w, h, -d),
    ];

    let indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [[base, base + 1, base + 2], [base, base + 2, base + 3]]
        })
        .collect();

    Geometry::new(positions, indices)
}

/// Horizontal plane in XZ, facing +Y.
#[must_use]
pub fn create_plane(width: f32, depth: f32) -> Geometry {
    let w = width / 2.0;
    let d = depth / 2.0;
    let positions = vec![
        Vec3::new(-w, 0.0, d),
        Vec3::new(w, 0.0, d),
        Vec3::new(w, 0.0, -d),
        Vec3::new(-w, 0.0, -d),
    ];
    Geometry::new(positions, vec![[0, 1, 2], [0, 2, 3]])
}

/// Flat horizontal ring in XZ, used for the placement reticle.
#[must_use]
pub fn create_ring(inner_radius: f32, outer_radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);
    let mut positions = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        let angle = i as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        positions.push(Vec3::new(cos * inner_radius, 0.0, sin * inner_radius));
        positions.push(Vec3::new(cos * outer_radius, 0.0, sin * outer_radius));
    }

    let mut indices = Vec::with_capacity(segments as usize * 2);
    for i in 0..segments {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = ((i + 1) % segments) * 2;
        let next_outer = next_inner + 1;
        indices.push([inner, outer, next_outer]);
        indices.push([inner, next_outer, next_inner]);
    }

    Geometry::new(positions, indices)
}
