use crate::error::Result;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::shape::{ Shape, ShapeId };
use crate::light::{ Light, PointLight, AreaLight, SampleRng };
use crate::intersect::{ Intersection, Intersections, IntersectionComputation };

/// A world with objects and light.
///
/// Worlds own every shape and light in a scene and perform most of the
/// tracing: intersection, shadows and the recursive color computation.
/// Shapes are stored in insertion order and addressed by `ShapeId`.
#[derive(Clone, Debug, Default)]
pub struct World {
    shapes: Vec<Shape>,
    point_lights: Vec<PointLight>,
    area_lights: Vec<AreaLight>,
}

impl World {
    /// Creates an empty world with no objects and no lights.
    pub fn new() -> World {
        Default::default()
    }

    /// The standard two-sphere test scene.
    ///
    /// A white point light at (-10, 10, -10), a unit sphere colored
    /// (0.8, 1.0, 0.6) with diffuse 0.7 and specular 0.2, and a default
    /// sphere scaled by one half inside it.
    pub fn default_world() -> Result<World> {
        let mut s1 = Shape::sphere();
        s1.material.color = Color::rgb(0.8, 1.0, 0.6);
        s1.material.diffuse = 0.7;
        s1.material.specular = 0.2;

        let s2 = Shape::sphere()
            .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;

        let mut w = World::new();
        w.add_light(PointLight::new(
            Color::white(),
            Tuple4D::point(-10.0, 10.0, -10.0)
        ));
        w.add_shape(s1);
        w.add_shape(s2);
        Ok(w)
    }

    /// Adds a shape, returning its handle.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id.0)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Adds a point or area light.
    pub fn add_light<L: Into<Light>>(&mut self, light: L) {
        match light.into() {
            Light::Point(l) => self.point_lights.push(l),
            Light::Area(l) => self.area_lights.push(l),
        }
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    pub fn area_lights(&self) -> &[AreaLight] {
        &self.area_lights
    }

    /// Every light, point lights first.
    pub fn lights(&self) -> impl Iterator<Item = Light> + '_ {
        self.point_lights.iter().copied().map(Light::from)
            .chain(self.area_lights.iter().copied().map(Light::from))
    }

    /// Intersects a ray against all objects in a world, sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        let mut intersections = Vec::new();
        for (i, shape) in self.shapes.iter().enumerate() {
            intersections.extend(
                shape.intersect(r).into_iter()
                    .map(|t| Intersection::new(t, ShapeId(i)))
            );
        }

        Intersections::new(intersections)
    }

    /// Determines whether something lies between `point` and a light at
    /// `light_position`.
    pub fn is_shadowed(&self, light_position: Tuple4D, point: Tuple4D) -> bool {
        let v = light_position - point;
        let distance = v.magnitude();
        let direction = v.normalize();

        let r = Ray4D::new(point, direction);
        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// The fraction of `light` that reaches `point`.
    ///
    /// A point light is either visible (1.0) or not (0.0). An area light
    /// gives the fraction of its samples that are unshadowed.
    pub fn intensity_at(&self, light: &Light, point: Tuple4D,
        rng: &mut SampleRng) -> f64 {
        match light {
            Light::Point(l) => {
                if self.is_shadowed(l.position, point) { 0.0 } else { 1.0 }
            },
            Light::Area(l) => {
                let visible = l.sample_points(rng)
                    .into_iter()
                    .filter(|p| !self.is_shadowed(*p, point))
                    .count();

                visible as f64 / l.samples() as f64
            },
        }
    }

    /// Calculates the color for a hit from every light, plus any reflected
    /// and refracted light.
    ///
    /// `remaining` bounds the number of further reflection or refraction
    /// rays; at 0 only direct lighting is computed.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize,
        rng: &mut SampleRng) -> Color {
        let shape = &self.shapes[comps.object.0];
        let material = shape.material();

        let mut surface = Color::black();
        for light in self.lights() {
            let visibility = self.intensity_at(&light, comps.over_point, rng);
            surface = surface + material.lighting(
                shape.transform().inverse(), &light,
                comps.over_point, comps.eyev, comps.normalv,
                visibility, rng
            );
        }

        let reflected = self.reflected_color(comps, remaining, rng);
        let refracted = self.refracted_color(comps, remaining, rng);

        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// The color seen along the reflection vector, scaled by reflectivity.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize, rng: &mut SampleRng) -> Color {
        let reflective = self.shapes[comps.object.0].material.reflective;
        if remaining < 1 || reflective <= 0.0 {
            return Color::black();
        }

        let r = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&r, remaining - 1, rng) * reflective
    }

    /// The color seen through a transparent surface, scaled by transparency.
    ///
    /// Black under total internal reflection.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize, rng: &mut SampleRng) -> Color {
        let transparency = self.shapes[comps.object.0].material.transparency;
        if remaining < 1 || transparency <= 0.0 {
            return Color::black();
        }

        // Snell's law
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));

        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let r = Ray4D::new(comps.under_point, direction);
        self.color_at(&r, remaining - 1, rng) * transparency
    }

    /// Determines the color seen along a ray. Black if nothing is hit.
    pub fn color_at(&self, r: &Ray4D, remaining: usize, rng: &mut SampleRng)
        -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Color::black(),
            Some(hit) => {
                let comps = IntersectionComputation::new(r, &hit, &xs,
                    &self.shapes);
                self.shade_hit(&comps, remaining, rng)
            },
        }
    }
}

#[cfg(test)]
use crate::light::sample_rng;

#[cfg(test)]
fn floor_and_ball(w: &mut World, reflective: f64) -> ShapeId {
    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    floor.material.reflective = reflective;
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    let floor = w.add_shape(floor);

    let mut ball = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap();
    ball.material.color = Color::rgb(1.0, 0.0, 0.0);
    ball.material.ambient = 0.5;
    w.add_shape(ball);

    floor
}

#[test]
fn default_world_contents() {
    let w = World::default_world().unwrap();

    assert_eq!(w.shapes().len(), 2);
    assert_eq!(w.point_lights().len(), 1);
    assert!(w.area_lights().is_empty());
    assert_eq!(w.point_lights()[0].position, Tuple4D::point(-10.0, 10.0, -10.0));
    assert_eq!(w.shape(ShapeId(0)).unwrap().material.color,
        Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.shape(ShapeId(1)).unwrap().transform().matrix(),
        Matrix4D::scaling(0.5, 0.5, 0.5));
}

#[test]
fn add_shape_returns_sequential_handles() {
    let mut w = World::new();

    assert_eq!(w.add_shape(Shape::sphere()), ShapeId(0));
    assert_eq!(w.add_shape(Shape::plane()), ShapeId(1));
    assert!(w.shape(ShapeId(2)).is_none());
}

#[test]
fn lights_are_split_by_kind() {
    let mut w = World::new();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 1.0, 0.0)));
    w.add_light(AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0), 2,
        Tuple4D::vector(0.0, 1.0, 0.0), 2,
        false
    ).unwrap());

    assert_eq!(w.point_lights().len(), 1);
    assert_eq!(w.area_lights().len(), 1);
    assert_eq!(w.lights().count(), 2);
}

#[test]
fn intersect_world_with_ray() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let ts: Vec<f64> = w.intersect(&r).iter().map(|i| i.t).collect();

    assert_eq!(ts, vec![4.0, 4.5, 5.5, 6.0]);
}

#[test]
fn point_light_visibility() {
    let w = World::default_world().unwrap();
    let light = Light::Point(w.point_lights()[0]);
    let mut rng = sample_rng(0);

    let cases = [
        (Tuple4D::point(0.0, 1.0001, 0.0), 1.0),
        (Tuple4D::point(-1.0001, 0.0, 0.0), 1.0),
        (Tuple4D::point(0.0, 0.0, -1.0001), 1.0),
        (Tuple4D::point(0.0, 0.0, 1.0001), 0.0),
        (Tuple4D::point(1.0001, 0.0, 0.0), 0.0),
        (Tuple4D::point(0.0, -1.0001, 0.0), 0.0),
        (Tuple4D::point(0.0, 0.0, 0.0), 0.0),
    ];

    for (point, expected) in cases.iter() {
        assert_eq!(w.intensity_at(&light, *point, &mut rng), *expected,
            "{:?}", point);
    }
}

#[test]
fn no_shadow_when_object_behind_light() {
    let w = World::default_world().unwrap();
    let light = w.point_lights()[0].position;

    assert!(!w.is_shadowed(light, Tuple4D::point(-20.0, 20.0, -20.0)));
    assert!(!w.is_shadowed(light, Tuple4D::point(-2.0, 2.0, -2.0)));
    assert!(w.is_shadowed(light, Tuple4D::point(10.0, -10.0, 10.0)));
}

#[cfg(test)]
fn overhead_area_light() -> Light {
    AreaLight::new(
        Color::white(),
        Tuple4D::point(-1.0, 2.0, -1.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 2,
        Tuple4D::vector(0.0, 0.0, 2.0), 2,
        false
    ).unwrap().into()
}

#[test]
fn area_light_fully_visible() {
    let w = World::new();
    let light = overhead_area_light();

    assert_eq!(w.intensity_at(&light, Tuple4D::point(0.0, 0.0, 0.0),
        &mut sample_rng(0)), 1.0);
}

#[test]
fn area_light_fully_occluded() {
    let mut w = World::new();
    w.add_shape(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap());
    let light = overhead_area_light();

    assert_eq!(w.intensity_at(&light, Tuple4D::point(0.0, 0.0, 0.0),
        &mut sample_rng(0)), 0.0);
}

#[test]
fn area_light_partially_occluded() {
    let mut w = World::new();
    for (x, z) in [(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25)].iter() {
        w.add_shape(Shape::cube().with_transform(
            Matrix4D::translation(*x, 1.0, *z) * Matrix4D::scaling(0.1, 0.1, 0.1)
        ).unwrap());
    }
    let light = overhead_area_light();

    assert_eq!(w.intensity_at(&light, Tuple4D::point(0.0, 0.0, 0.0),
        &mut sample_rng(0)), 0.25);
}

#[test]
fn color_when_ray_misses() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );

    assert_eq!(w.color_at(&r, 5, &mut sample_rng(0)), Color::black());
}

#[test]
fn color_when_ray_hits() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(w.color_at(&r, 5, &mut sample_rng(0)),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w = World::default_world().unwrap();
    w.shape_mut(ShapeId(0)).unwrap().material.ambient = 1.0;
    w.shape_mut(ShapeId(1)).unwrap().material.ambient = 1.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    let inner = w.shape(ShapeId(1)).unwrap().material.color;
    assert_eq!(w.color_at(&r, 5, &mut sample_rng(0)), inner);
}

#[test]
fn shade_hit_in_shadow() {
    let mut w = World::new();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0)));
    w.add_shape(Shape::sphere());
    let s2 = w.add_shape(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = w.intersect(&r);
    let i = xs.hit().unwrap();
    assert_eq!(i.object, s2);
    let comps = IntersectionComputation::new(&r, &i, &xs, w.shapes());

    assert_eq!(w.shade_hit(&comps, 5, &mut sample_rng(0)),
        Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let mut w = World::default_world().unwrap();
    w.shape_mut(ShapeId(1)).unwrap().material.ambient = 1.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = w.intersect(&r);
    let i = Intersection::new(1.0, ShapeId(1));
    let comps = IntersectionComputation::new(&r, &i, &xs, w.shapes());

    assert_eq!(w.reflected_color(&comps, 5, &mut sample_rng(0)), Color::black());
}

#[test]
fn reflected_color_at_maximum_depth() {
    let mut w = World::default_world().unwrap();
    let mut plane = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    plane.material.reflective = 0.5;
    let plane = w.add_shape(plane);

    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -r2, r2)
    );
    let xs = w.intersect(&r);
    let i = xs.hit().unwrap();
    assert_eq!(i.object, plane);
    let comps = IntersectionComputation::new(&r, &i, &xs, w.shapes());

    assert_eq!(w.reflected_color(&comps, 0, &mut sample_rng(0)), Color::black());
    assert!(w.reflected_color(&comps, 1, &mut sample_rng(0)).r > 0.0);
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::new();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 0.0)));

    let mut lower = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap();
    lower.material.reflective = 1.0;
    w.add_shape(lower);

    let mut upper = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();
    upper.material.reflective = 1.0;
    w.add_shape(upper);

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let c = w.color_at(&r, 5, &mut sample_rng(0));

    assert!(c.r.is_finite() && c.r > 0.0);
}

#[test]
fn refracted_color_of_opaque_surface() {
    let w = World::default_world().unwrap();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = w.intersect(&r);
    let comps = IntersectionComputation::new(&r, xs.get(0).unwrap(), &xs,
        w.shapes());

    assert_eq!(w.refracted_color(&comps, 5, &mut sample_rng(0)), Color::black());
}

#[test]
fn refracted_color_at_maximum_depth() {
    let mut w = World::default_world().unwrap();
    {
        let m = &mut w.shape_mut(ShapeId(0)).unwrap().material;
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs = w.intersect(&r);
    let comps = IntersectionComputation::new(&r, xs.get(0).unwrap(), &xs,
        w.shapes());

    assert_eq!(w.refracted_color(&comps, 0, &mut sample_rng(0)), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w = World::default_world().unwrap();
    {
        let m = &mut w.shape_mut(ShapeId(0)).unwrap().material;
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    }
    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, r2),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let xs = Intersections::new(vec![
        Intersection::new(-r2, ShapeId(0)),
        Intersection::new(r2, ShapeId(0)),
    ]);
    let comps = IntersectionComputation::new(&r, xs.get(1).unwrap(), &xs,
        w.shapes());

    assert_eq!(w.refracted_color(&comps, 5, &mut sample_rng(0)), Color::black());
}

#[test]
fn shade_hit_with_transparent_material() {
    let mut w = World::default_world().unwrap();
    let floor = floor_and_ball(&mut w, 0.0);

    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -r2, r2)
    );
    let xs = w.intersect(&r);
    let i = xs.hit().unwrap();
    assert_eq!(i.object, floor);
    assert!(crate::feq(i.t, 2.0f64.sqrt()));
    let comps = IntersectionComputation::new(&r, &i, &xs, w.shapes());

    assert_eq!(w.shade_hit(&comps, 5, &mut sample_rng(0)),
        Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    let mut w = World::default_world().unwrap();
    let floor = floor_and_ball(&mut w, 0.5);

    let r2 = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -3.0),
        Tuple4D::vector(0.0, -r2, r2)
    );
    let xs = w.intersect(&r);
    let i = xs.hit().unwrap();
    assert_eq!(i.object, floor);
    assert!(crate::feq(i.t, 2.0f64.sqrt()));
    let comps = IntersectionComputation::new(&r, &i, &xs, w.shapes());

    assert_eq!(w.shade_hit(&comps, 5, &mut sample_rng(0)),
        Color::rgb(0.93391, 0.69643, 0.69243));
    assert_eq!(w.color_at(&r, 5, &mut sample_rng(0)),
        Color::rgb(0.93391, 0.69643, 0.69243));
}
