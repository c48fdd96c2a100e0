use crate::consts::{ SURFACE_EPSILON, VACUUM_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::{ Shape, ShapeId };

/// An intersection.
///
/// Parameter `t` is analogous to `t` for a ray (the offset from the ray
/// origin). `object` is the handle of the shape that was hit; two
/// intersections are equal when both the offset and the shape are.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub object: ShapeId,
}

impl Intersection {
    pub fn new(t: f64, object: ShapeId) -> Intersection {
        Intersection { t, object }
    }
}

/// A collection of intersections, always sorted by ascending `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    intersections: Vec<Intersection>,
}

impl Intersections {
    /// Creates a list of intersections, sorting them by `t`.
    pub fn new(mut intersections: Vec<Intersection>) -> Intersections {
        intersections.sort_by(|a, b| a.t.total_cmp(&b.t));

        Intersections { intersections }
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection> {
        self.intersections.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Intersection> {
        self.intersections.get(index)
    }

    /// The visible hit: the finite intersection with the smallest
    /// non-negative `t`.
    ///
    /// If every intersection lies behind the ray origin (or there are none),
    /// this returns `None`; the ray sees nothing.
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .find(|i| i.t.is_finite() && i.t >= 0.0)
            .copied()
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Copy, Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub object: ShapeId,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the surface. Shadow and reflection rays start
    /// here so the surface does not shadow itself.
    pub over_point: Tuple4D,

    /// A point slightly below the surface, where refraction rays start.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector, flipped to face the eye.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the ray started inside the object.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl IntersectionComputation {
    /// Prepares shading data for `hit`.
    ///
    /// `xs` must hold every intersection of `r` with the scene (including
    /// `hit`) so the refractive indices on both sides of the surface can be
    /// found. `shapes` resolves the handles in `xs`.
    pub fn new(r: &Ray4D, hit: &Intersection, xs: &Intersections,
        shapes: &[Shape]) -> IntersectionComputation {
        let t = hit.t;
        let object = hit.object;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = shapes[object.0].normal_at(point);

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * SURFACE_EPSILON;
        let under_point = point - normalv * SURFACE_EPSILON;

        let reflectv = r.direction.reflect(&normalv);
        let (n1, n2) = Self::refraction_indices(hit, xs, shapes);

        IntersectionComputation {
            t, object,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// Walks `xs` in order, tracking which shapes the ray is currently
    /// inside. Entering a shape pushes it, leaving it removes it.
    fn refraction_indices(hit: &Intersection, xs: &Intersections,
        shapes: &[Shape]) -> (f64, f64) {
        let top = |containers: &[ShapeId]| containers.last()
            .map(|id| shapes[id.0].material.refractive_index)
            .unwrap_or(VACUUM_RI);

        let mut containers: Vec<ShapeId> = Vec::new();

        for i in xs.iter() {
            let is_hit = i == hit;
            let n1 = top(&containers);

            if let Some(j) = containers.iter().position(|&id| id == i.object) {
                containers.remove(j);
            } else {
                containers.push(i.object);
            }

            if is_hit {
                return (n1, top(&containers));
            }
        }

        (VACUUM_RI, VACUUM_RI)
    }

    /// Calculates the reflectance of a hit using Schlick's approximation.
    ///
    /// The reflectance is a number between 0 and 1, representing what fraction
    /// of the light is reflected for the hit. Under total internal reflection
    /// it is exactly 1.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));

            if sin2_t > 1.0 {
                return 1.0
            }

            // Use the cosine of the transmitted angle instead.
            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
use crate::matrix::Matrix4D;

#[cfg(test)]
fn xs_of(ts: &[f64], object: ShapeId) -> Intersections {
    Intersections::new(ts.iter().map(|&t| Intersection::new(t, object)).collect())
}

#[test]
fn intersections_are_sorted() {
    let xs = xs_of(&[5.0, 7.0, -3.0, 2.0], ShapeId(0));
    let ts: Vec<f64> = xs.iter().map(|i| i.t).collect();

    assert_eq!(ts, vec![-3.0, 2.0, 5.0, 7.0]);
}

#[test]
fn hit_with_all_positive() {
    let xs = xs_of(&[1.0, 2.0], ShapeId(0));

    assert_eq!(xs.hit(), Some(Intersection::new(1.0, ShapeId(0))));
}

#[test]
fn hit_with_some_negative() {
    let xs = xs_of(&[-1.0, 1.0], ShapeId(0));

    assert_eq!(xs.hit(), Some(Intersection::new(1.0, ShapeId(0))));
}

#[test]
fn hit_with_all_negative() {
    assert_eq!(xs_of(&[-2.0, -1.0], ShapeId(0)).hit(), None);
    assert_eq!(Intersections::default().hit(), None);
}

#[test]
fn hit_multiple() {
    let xs = xs_of(&[5.0, 7.0, -3.0, 2.0], ShapeId(0));

    assert_eq!(xs.hit().unwrap().t, 2.0);
}

#[test]
fn hit_at_zero_counts() {
    let xs = xs_of(&[-1.0, 0.0, 3.0], ShapeId(0));

    assert_eq!(xs.hit().unwrap().t, 0.0);
}

#[test]
fn hit_skips_infinite_t() {
    let xs = xs_of(&[std::f64::INFINITY, std::f64::NAN, 4.0], ShapeId(0));

    assert_eq!(xs.hit().unwrap().t, 4.0);
}

#[test]
fn intersections_with_different_shapes_differ() {
    assert_ne!(Intersection::new(1.0, ShapeId(0)),
        Intersection::new(1.0, ShapeId(1)));
    assert_eq!(Intersection::new(1.0, ShapeId(1)),
        Intersection::new(1.0, ShapeId(1)));
}

#[test]
fn precompute_outside_hit() {
    let shapes = vec![Shape::sphere()];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, ShapeId(0));
    let comps = IntersectionComputation::new(&r, &i,
        &Intersections::new(vec![i]), &shapes);

    assert_eq!(comps.t, 4.0);
    assert_eq!(comps.object, ShapeId(0));
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_hit() {
    let shapes = vec![Shape::sphere()];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(1.0, ShapeId(0));
    let comps = IntersectionComputation::new(&r, &i,
        &Intersections::new(vec![i]), &shapes);

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
    // Flipped to face the eye
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn over_and_under_points_straddle_the_surface() {
    let shapes = vec![
        Shape::glass_sphere()
            .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap()
    ];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(5.0, ShapeId(0));
    let comps = IntersectionComputation::new(&r, &i,
        &Intersections::new(vec![i]), &shapes);

    assert!(comps.over_point.z < -SURFACE_EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > SURFACE_EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precompute_reflection_vector() {
    let shapes = vec![Shape::plane()];
    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, -1.0),
        Tuple4D::vector(0.0, -r2, r2)
    );
    let i = Intersection::new(2.0f64.sqrt(), ShapeId(0));
    let comps = IntersectionComputation::new(&r, &i,
        &Intersections::new(vec![i]), &shapes);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, r2, r2));
}

#[test]
fn n1_and_n2_at_various_intersections() {
    let mut a = Shape::glass_sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    a.material.refractive_index = 1.5;
    let mut b = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -0.25)).unwrap();
    b.material.refractive_index = 2.0;
    let mut c = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.25)).unwrap();
    c.material.refractive_index = 2.5;
    let shapes = vec![a, b, c];

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -4.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = Intersections::new(vec![
        Intersection::new(2.0, ShapeId(0)),
        Intersection::new(2.75, ShapeId(1)),
        Intersection::new(3.25, ShapeId(2)),
        Intersection::new(4.75, ShapeId(1)),
        Intersection::new(5.25, ShapeId(2)),
        Intersection::new(6.0, ShapeId(0)),
    ]);
    let expected = [
        (1.0, 1.5),
        (1.5, 2.0),
        (2.0, 2.5),
        (2.5, 2.5),
        (2.5, 1.5),
        (1.5, 1.0),
    ];

    for (i, (n1, n2)) in xs.iter().zip(expected.iter()) {
        let comps = IntersectionComputation::new(&r, i, &xs, &shapes);

        assert_eq!(comps.n1, *n1, "n1 at t = {}", i.t);
        assert_eq!(comps.n2, *n2, "n2 at t = {}", i.t);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let shapes = vec![Shape::glass_sphere()];
    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, r2),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs = xs_of(&[-r2, r2], ShapeId(0));
    let comps = IntersectionComputation::new(&r, xs.get(1).unwrap(), &xs,
        &shapes);

    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_perpendicular_viewing_angle() {
    let shapes = vec![Shape::glass_sphere()];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs = xs_of(&[-1.0, 1.0], ShapeId(0));
    let comps = IntersectionComputation::new(&r, xs.get(1).unwrap(), &xs,
        &shapes);

    assert!((comps.schlick() - 0.04).abs() < 0.00001);
}

#[test]
fn schlick_with_small_angle_and_n2_greater() {
    let shapes = vec![Shape::glass_sphere()];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.99, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = xs_of(&[1.8589], ShapeId(0));
    let comps = IntersectionComputation::new(&r, xs.get(0).unwrap(), &xs,
        &shapes);

    assert!(crate::feq(comps.schlick(), 0.48873));
}
