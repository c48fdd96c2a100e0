use crate::consts::{ PARALLEL_EPSILON, GLASS_RI };
use crate::error::Result;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::material::Material;

/// The primitives a `Shape` can be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeType {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The object-space XZ plane, with its normal along +Y.
    Plane,

    /// A 2-by-2-by-2 cube with its center at the object-space origin.
    Cube,
}

/// A handle to a shape owned by a `World`.
///
/// Intersections refer to shapes through this handle, so two intersections
/// are with the same shape exactly when their handles are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeId(pub usize);

/// A primitive with a transform and a material.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
    transform: Transform,
}

impl Default for Shape {
    fn default() -> Shape {
        Shape {
            ty: ShapeType::Sphere,
            material: Default::default(),
            transform: Default::default(),
        }
    }
}

impl Shape {
    /// Creates a unit sphere.
    pub fn sphere() -> Shape {
        Shape { ty: ShapeType::Sphere, ..Default::default() }
    }

    /// Creates an infinite plane.
    pub fn plane() -> Shape {
        Shape { ty: ShapeType::Plane, ..Default::default() }
    }

    /// Creates a cube.
    pub fn cube() -> Shape {
        Shape { ty: ShapeType::Cube, ..Default::default() }
    }

    /// Creates a unit sphere of clear glass.
    pub fn glass_sphere() -> Shape {
        let mut s = Shape::sphere();
        s.material.transparency = 1.0;
        s.material.refractive_index = GLASS_RI;
        s
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Sets the object-to-world transform.
    ///
    /// A singular matrix is rejected and the current transform is kept.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// Builder form of `set_transform`.
    pub fn with_transform(mut self, m: Matrix4D) -> Result<Shape> {
        self.set_transform(m)?;
        Ok(self)
    }

    /// Returns a reference to this Shape's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Returns a mutable reference to this Shape's material.
    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Intersects a world-space ray with this shape.
    ///
    /// Returns the `t` values along `ray` in ascending order; a miss is an
    /// empty vector.
    pub fn intersect(&self, ray: &Ray4D) -> Vec<f64> {
        let local_ray = ray.transform(self.transform.inverse());
        self.local_intersect(&local_ray)
    }

    /// The world-space surface normal at a world-space point on this shape.
    pub fn normal_at(&self, world_point: Tuple4D) -> Tuple4D {
        let local_point = self.transform.to_local(world_point);
        let local_normal = self.local_normal_at(&local_point);
        self.transform.normal_to_world(local_normal)
    }

    /// Intersects an object-space ray with this shape.
    pub fn local_intersect(&self, ray: &Ray4D) -> Vec<f64> {
        match self.ty {
            ShapeType::Sphere => Self::intersect_sphere(ray),
            ShapeType::Plane => Self::intersect_plane(ray),
            ShapeType::Cube => Self::intersect_cube(ray),
        }
    }

    /// The object-space normal at an object-space point.
    pub fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D {
        match self.ty {
            ShapeType::Sphere => Self::normal_at_sphere(at),
            ShapeType::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeType::Cube => Self::normal_at_cube(at),
        }
    }

    /// Checks whether a ray intersects the unit sphere.
    ///
    /// Either no roots or two; a tangent ray produces two equal roots.
    fn intersect_sphere(ray: &Ray4D) -> Vec<f64> {
        // Subtracting a point removes the 'w' part of the ray origin.
        let sphere_to_ray = ray.origin - Tuple4D::point(0.0, 0.0, 0.0);

        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * ray.direction.dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

        let discriminant = b.powi(2) - (4.0 * a * c);

        if discriminant < 0.0 {
            return Vec::new()
        }

        let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

        vec![t1, t2]
    }

    /// A normal vector on the unit sphere is the point minus the origin.
    fn normal_at_sphere(at: &Tuple4D) -> Tuple4D {
        Tuple4D { w: 0.0, ..*at }
    }

    /// Intersects a ray with the XZ plane.
    ///
    /// Rays parallel to the plane, including coplanar ones, miss.
    fn intersect_plane(ray: &Ray4D) -> Vec<f64> {
        if ray.direction.y.abs() < PARALLEL_EPSILON {
            return Vec::new();
        }

        vec![-ray.origin.y / ray.direction.y]
    }

    fn intersect_cube(ray: &Ray4D) -> Vec<f64> {
        let (xtmin, xtmax)
            = Self::check_cube_axis(ray.origin.x, ray.direction.x);
        let (ytmin, ytmax)
            = Self::check_cube_axis(ray.origin.y, ray.direction.y);
        let (ztmin, ztmax)
            = Self::check_cube_axis(ray.origin.z, ray.direction.z);

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        if tmin > tmax {
            return Vec::new()
        }

        vec![tmin, tmax]
    }

    /// The face is picked by the component with the largest magnitude.
    fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
        let xa = p.x.abs();
        let ya = p.y.abs();
        let za = p.z.abs();

        let max_component = xa.max(ya).max(za);
        if max_component == xa {
            Tuple4D::vector(p.x.signum(), 0.0, 0.0)
        } else if max_component == ya {
            Tuple4D::vector(0.0, p.y.signum(), 0.0)
        } else {
            Tuple4D::vector(0.0, 0.0, p.z.signum())
        }
    }

    /// Takes one axis of a ray (for example `origin.x` and `direction.x`) and
    /// returns where it enters and leaves the slab `[-1, 1]` on that axis.
    ///
    /// The smaller `t` is first in the tuple, the larger `t` is second. A
    /// direction of (nearly) zero projects both to infinity instead of
    /// dividing by zero.
    fn check_cube_axis(origin: f64, direction: f64) -> (f64, f64) {
        let tmin_numerator = -1.0 - origin;
        let tmax_numerator =  1.0 - origin;

        let (tmin, tmax) = if direction.abs() >= PARALLEL_EPSILON {
            (tmin_numerator / direction, tmax_numerator / direction)
        } else {
            (tmin_numerator * std::f64::INFINITY,
             tmax_numerator * std::f64::INFINITY)
        };

        if tmin > tmax {
            (tmax, tmin)
        } else {
            (tmin, tmax)
        }
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn ray_through_sphere_center() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(Shape::sphere().intersect(&r), vec![4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(Shape::sphere().intersect(&r), vec![5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 2.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(Shape::sphere().intersect(&r).is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(Shape::sphere().intersect(&r), vec![-1.0, 1.0]);
}

#[test]
fn sphere_is_behind_ray() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(Shape::sphere().intersect(&r), vec![-6.0, -4.0]);
}

#[test]
fn intersect_scaled_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .unwrap();

    assert_eq!(s.intersect(&r), vec![3.0, 7.0]);
}

#[test]
fn intersect_translated_sphere() {
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let s = Shape::sphere().with_transform(Matrix4D::translation(5.0, 0.0, 0.0))
        .unwrap();

    assert!(s.intersect(&r).is_empty());
}

#[test]
fn rigid_transforms_preserve_t() {
    let rigid = [
        Matrix4D::translation(3.0, -2.0, 7.5),
        Matrix4D::rotation_y(PI / 3.0) * Matrix4D::translation(1.0, 0.0, 0.0),
        Matrix4D::translation(0.0, 4.0, 0.0) * Matrix4D::rotation_x(PI / 5.0)
            * Matrix4D::rotation_z(-PI / 7.0),
    ];
    let base = Matrix4D::translation(0.25, 0.5, 0.0)
        * Matrix4D::scaling(1.5, 1.5, 1.5);
    let r = Ray4D::new(
        Tuple4D::point(-0.5, 0.25, -6.0),
        Tuple4D::vector(0.1, 0.05, 1.0).normalize()
    );
    let s = Shape::sphere().with_transform(base).unwrap();
    let expected = s.intersect(&r);
    assert_eq!(expected.len(), 2);

    for m in rigid.iter() {
        let moved = Shape::sphere().with_transform(*m * base).unwrap();
        let xs = moved.intersect(&r.transform(m));

        assert_eq!(xs.len(), 2);
        for (t, e) in xs.iter().zip(expected.iter()) {
            assert!(crate::feq(*t, *e), "{} != {}", t, e);
        }
    }
}

#[test]
fn normal_on_sphere_axes() {
    let s = Shape::sphere();
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(s.normal_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 1.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(s.normal_at(Tuple4D::point(k, k, k)), Tuple4D::vector(k, k, k));
}

#[test]
fn compute_normal_on_translated_sphere() {
    let s = Shape::sphere().with_transform(Matrix4D::translation(0.0, 1.0, 0.0))
        .unwrap();

    let n = s.normal_at(Tuple4D::point(0.0, 1.70711, -0.70711));
    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn compute_normal_on_transformed_sphere() {
    let s = Shape::sphere().with_transform(
        Matrix4D::scaling(1.0, 0.5, 1.0) * Matrix4D::rotation_z(PI / 5.0)
    ).unwrap();

    let p = Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt()) / 2.0);
    assert_eq!(s.normal_at(p), Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn normal_on_plane_is_constant() {
    let p = Shape::plane();

    for point in [
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0),
    ].iter() {
        assert_eq!(p.normal_at(*point), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_to_plane() {
    let p = Shape::plane();
    let above = Ray4D::new(
        Tuple4D::point(0.0, 10.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let coplanar = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(p.intersect(&above).is_empty());
    assert!(p.intersect(&coplanar).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Shape::plane();
    let above = Ray4D::new(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(0.0, -1.0, 0.0)
    );
    let below = Ray4D::new(
        Tuple4D::point(0.0, -1.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );

    assert_eq!(p.intersect(&above), vec![1.0]);
    assert_eq!(p.intersect(&below), vec![1.0]);
}

#[test]
fn ray_intersects_cube() {
    let c = Shape::cube();
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), 4.0, 6.0),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), 4.0, 6.0),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), 4.0, 6.0),
        ((0.5, -5.0, 0.0), (0.0, 1.0, 0.0), 4.0, 6.0),
        ((0.5, 0.0, 5.0), (0.0, 0.0, -1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for (o, d, t1, t2) in cases.iter() {
        let r = Ray4D::new(
            Tuple4D::point(o.0, o.1, o.2),
            Tuple4D::vector(d.0, d.1, d.2)
        );

        assert_eq!(c.intersect(&r), vec![*t1, *t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        ((-2.0, 0.0, 0.0), (0.2673, 0.5345, 0.8018)),
        ((0.0, -2.0, 0.0), (0.8018, 0.2673, 0.5345)),
        ((0.0, 0.0, -2.0), (0.5345, 0.8018, 0.2673)),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0)),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0)),
        ((2.0, 2.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for (o, d) in cases.iter() {
        let r = Ray4D::new(
            Tuple4D::point(o.0, o.1, o.2),
            Tuple4D::vector(d.0, d.1, d.2)
        );

        assert!(c.intersect(&r).is_empty());
    }
}

#[test]
fn normal_on_cube() {
    let c = Shape::cube();
    let cases = [
        ((1.0, 0.5, -0.8), (1.0, 0.0, 0.0)),
        ((-1.0, -0.2, 0.9), (-1.0, 0.0, 0.0)),
        ((-0.4, 1.0, -0.1), (0.0, 1.0, 0.0)),
        ((0.3, -1.0, -0.7), (0.0, -1.0, 0.0)),
        ((-0.6, 0.3, 1.0), (0.0, 0.0, 1.0)),
        ((0.4, 0.4, -1.0), (0.0, 0.0, -1.0)),
        ((1.0, 1.0, 1.0), (1.0, 0.0, 0.0)),
        ((-1.0, -1.0, -1.0), (-1.0, 0.0, 0.0)),
    ];

    for (p, n) in cases.iter() {
        assert_eq!(c.local_normal_at(&Tuple4D::point(p.0, p.1, p.2)),
            Tuple4D::vector(n.0, n.1, n.2));
    }
}

#[test]
fn singular_transform_is_rejected() {
    let mut s = Shape::sphere();
    s.set_transform(Matrix4D::translation(1.0, 0.0, 0.0)).unwrap();

    assert!(s.set_transform(Matrix4D::scaling(0.0, 0.0, 0.0)).is_err());
    assert_eq!(*s.transform().matrix(), Matrix4D::translation(1.0, 0.0, 0.0));
}

#[test]
fn glass_sphere_material() {
    let s = Shape::glass_sphere();

    assert_eq!(s.ty, ShapeType::Sphere);
    assert_eq!(s.material().transparency, 1.0);
    assert_eq!(s.material().refractive_index, 1.5);
    assert_eq!(*s.transform().matrix(), Matrix4D::identity());
}
