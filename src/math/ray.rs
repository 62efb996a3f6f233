use glam::{Affine3A, Vec3};

/// A ray in 3D space.
///
/// Rays built with [`Ray::new`] carry a normalized direction, so the ray
/// parameter equals world distance. [`Ray::transformed`] keeps the mapped
/// direction unnormalized: the parameter of a hit found in the target space is
/// then the same as in the source space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with normalized direction.
    #[inline]
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Returns the point at parameter `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Maps the ray into another space without renormalizing the direction.
    #[must_use]
    pub fn transformed(&self, matrix: &Affine3A) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// An infinite plane through `point` with unit `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    #[must_use]
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Intersects a ray with the plane, returning the hit point.
    ///
    /// Rays parallel to the plane or pointing away from it miss.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.point - ray.origin).dot(self.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }
}

/// Möller–Trumbore ray/triangle test, double-sided.
///
/// Returns the ray parameter of the hit.
#[must_use]
pub fn ray_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Slab test against an axis-aligned box.
///
/// Returns the entry parameter, or 0 when the origin is inside the box.
#[must_use]
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv = ray.direction.recip();
    let t1 = (min - ray.origin) * inv;
    let t2 = (max - ray.origin) * inv;

    let t_near = t1.min(t2).max_element();
    let t_far = t1.max(t2).min_element();

    if t_near > t_far || t_far < 0.0 {
        return None;
    }
    Some(t_near.max(0.0))
}
