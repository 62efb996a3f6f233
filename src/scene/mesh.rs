use std::borrow::Cow;

use glam::{Affine3A, Vec3, Vec4};
use uuid::Uuid;

use crate::math::{Ray, ray_aabb, ray_triangle};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Radius of the sphere through the corners.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box enclosing the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);
        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self { min: new_min, max: new_max }
    }
}

/// Indexed triangle geometry kept on the CPU for hit testing and bounds.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,
    positions: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    bounding_box: Option<BoundingBox>,
}

impl Geometry {
    /// Builds geometry from vertex positions and triangle indices.
    ///
    /// Triangles referencing out-of-range vertices are dropped.
    #[must_use]
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        let count = positions.len() as u32;
        let indices: Vec<[u32; 3]> = indices
            .into_iter()
            .filter(|tri| tri.iter().all(|&i| i < count))
            .collect();
        let bounding_box = BoundingBox::from_points(positions.iter().copied());
        Self {
            uuid: Uuid::new_v4(),
            positions,
            indices,
            bounding_box,
        }
    }

    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Nearest triangle hit for a ray expressed in this geometry's local space.
    #[must_use]
    pub fn raycast(&self, local_ray: &Ray) -> Option<f32> {
        let bbox = self.bounding_box?;
        ray_aabb(local_ray, bbox.min, bbox.max)?;

        self.indices
            .iter()
            .filter_map(|&[a, b, c]| {
                ray_triangle(
                    local_ray,
                    self.positions[a as usize],
                    self.positions[b as usize],
                    self.positions[c as usize],
                )
            })
            .min_by(f32::total_cmp)
    }
}

/// A renderable part: geometry plus a base colour.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Cow<'static, str>,
    pub geometry: Geometry,
    /// Linear RGBA base colour
    pub color: Vec4,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            color: Vec4::ONE,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}
