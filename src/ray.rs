use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;

/// A ray with a point origin and a vector direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray4D {
    pub origin: Tuple4D,
    pub direction: Tuple4D,
}

impl Ray4D {
    /// Creates a ray.
    ///
    /// # Panics
    ///
    /// Panics if `origin` is not a point or `direction` is not a vector.
    pub fn new(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
        assert!(origin.is_point(), "ray origin must be a point: {:?}", origin);
        assert!(direction.is_vector(),
            "ray direction must be a vector: {:?}", direction);

        Ray4D { origin, direction }
    }

    /// The point at distance `t` along the ray.
    pub fn position(&self, t: f64) -> Tuple4D {
        self.origin + (t * self.direction)
    }

    /// Applies `m` to both the origin and the direction.
    pub fn transform(&self, m: &Matrix4D) -> Ray4D {
        Ray4D::new(*m * self.origin, *m * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray4D::new(
                Tuple4D::point(2.0, 3.0, 4.0),
                Tuple4D::vector(1.0, 0.0, 0.0)
            );

    assert_eq!(r.position(0.0), Tuple4D::point(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Tuple4D::point(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Tuple4D::point(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Tuple4D::point(4.5, 3.0, 4.0));
}

#[test]
fn ray_translation() {
    let r = Ray4D::new(
                Tuple4D::point(1.0, 2.0, 3.0),
                Tuple4D::vector(0.0, 1.0, 0.0)
            );
    let t = r.transform(&Matrix4D::translation(3.0, 4.0, 5.0));

    assert_eq!(t.origin, Tuple4D::point(4.0, 6.0, 8.0));
    assert_eq!(t.direction, Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_scaling() {
    let r = Ray4D::new(
                Tuple4D::point(1.0, 2.0, 3.0),
                Tuple4D::vector(0.0, 1.0, 0.0)
            );
    let t = r.transform(&Matrix4D::scaling(2.0, 3.0, 4.0));

    assert_eq!(t.origin, Tuple4D::point(2.0, 6.0, 12.0));
    assert_eq!(t.direction, Tuple4D::vector(0.0, 3.0, 0.0));
}

#[test]
#[should_panic(expected = "origin must be a point")]
fn vector_origin_is_rejected() {
    Ray4D::new(Tuple4D::vector(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
}

#[test]
#[should_panic(expected = "direction must be a vector")]
fn point_direction_is_rejected() {
    Ray4D::new(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::point(0.0, 0.0, 1.0));
}
