use rand::{ Rng, SeedableRng };
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{ Error, Result };
use crate::color::Color;
use crate::tuple::Tuple4D;
use crate::material::Material;

/// The random source used for jittered area light samples.
///
/// Passed explicitly to everything that may sample a light, so a render is
/// reproducible for a given seed regardless of how it is scheduled.
pub type SampleRng = Xoshiro256Plus;

/// Seeds a `SampleRng`.
pub fn sample_rng(seed: u64) -> SampleRng {
    SampleRng::seed_from_u64(seed)
}

/// The diffuse and specular terms for one light position.
///
/// Ambient light is not included; every light type adds it exactly once.
fn diffuse_specular(m: &Material, effective_color: Color, light_intensity: Color,
    light_position: Tuple4D, point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D)
    -> Color {
    let lightv = (light_position - point).normalize();

    // The light is on the other side of the surface
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return Color::black();
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);

    if reflect_dot_eye <= 0.0 {
        diffuse
    } else {
        let factor = reflect_dot_eye.powf(m.shininess);
        diffuse + light_intensity * m.specular * factor
    }
}

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        if !position.is_point() {
            position.w = 1.0;
        }

        PointLight { intensity, position }
    }

    /// Phong shading for a single light position.
    ///
    /// `visibility` scales the diffuse and specular terms; `0.0` leaves only
    /// ambient light.
    pub fn lighting(&self, m: &Material, effective_color: Color, point: Tuple4D,
        eyev: Tuple4D, normalv: Tuple4D, visibility: f64) -> Color {
        let ambient = effective_color * m.ambient;
        let direct = diffuse_specular(m, effective_color, self.intensity,
            self.position, point, eyev, normalv);

        ambient + direct * visibility
    }
}

/// A rectangular light.
///
/// The rectangle spanned by `corner`, `corner + full_u` and `corner + full_v`
/// is split into `usteps` by `vsteps` cells, each contributing one sample.
/// Shading and shadows average over the samples, producing soft shadows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AreaLight {
    pub intensity: Color,
    pub corner: Tuple4D,

    /// One cell's edge along `u`.
    pub uvec: Tuple4D,
    pub usteps: usize,

    /// One cell's edge along `v`.
    pub vvec: Tuple4D,
    pub vsteps: usize,

    /// Sample within each cell at random instead of at its center.
    pub jitter: bool,

    samples: usize,
    center: Tuple4D,
}

impl AreaLight {
    /// Creates an area light. Fails if either step count is zero.
    pub fn new(intensity: Color, corner: Tuple4D, full_u: Tuple4D, usteps: usize,
        full_v: Tuple4D, vsteps: usize, jitter: bool) -> Result<AreaLight> {
        if usteps == 0 || vsteps == 0 {
            return Err(Error::NoLightSamples { usteps, vsteps });
        }

        Ok(AreaLight {
            intensity,
            corner,
            uvec: full_u / usteps as f64,
            usteps,
            vvec: full_v / vsteps as f64,
            vsteps,
            jitter,
            samples: usteps * vsteps,
            center: corner + full_u / 2.0 + full_v / 2.0,
        })
    }

    /// The number of samples, `usteps * vsteps`.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The centroid of the rectangle.
    pub fn center(&self) -> Tuple4D {
        self.center
    }

    /// A point inside cell `(u, v)`.
    ///
    /// Without jitter this is the center of the cell and `rng` is untouched.
    pub fn sample(&self, u: usize, v: usize, rng: &mut SampleRng) -> Tuple4D {
        let (du, dv) = if self.jitter {
            (rng.gen::<f64>(), rng.gen::<f64>())
        } else {
            (0.5, 0.5)
        };

        self.corner +
            self.uvec * (u as f64 + du) +
            self.vvec * (v as f64 + dv)
    }

    /// Every sample position, row by row.
    pub fn sample_points(&self, rng: &mut SampleRng) -> Vec<Tuple4D> {
        let mut points = Vec::with_capacity(self.samples);
        for v in 0..self.vsteps {
            for u in 0..self.usteps {
                points.push(self.sample(u, v, rng));
            }
        }

        points
    }

    /// Phong shading averaged over every sample, plus one ambient term.
    pub fn lighting(&self, m: &Material, effective_color: Color, point: Tuple4D,
        eyev: Tuple4D, normalv: Tuple4D, visibility: f64, rng: &mut SampleRng)
        -> Color {
        let ambient = effective_color * m.ambient;

        let direct = self.sample_points(rng)
            .into_iter()
            .fold(Color::black(), |sum, position| {
                sum + diffuse_specular(m, effective_color, self.intensity,
                    position, point, eyev, normalv)
            });

        ambient + direct / self.samples as f64 * visibility
    }
}

/// Any light a `World` can hold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Light {
        Light::Point(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Light {
        Light::Area(light)
    }
}

impl Light {
    pub fn intensity(&self) -> Color {
        match self {
            Light::Point(l) => l.intensity,
            Light::Area(l) => l.intensity,
        }
    }

    /// The contribution of this light at `point`; see `PointLight::lighting`
    /// and `AreaLight::lighting`.
    pub fn lighting(&self, m: &Material, effective_color: Color, point: Tuple4D,
        eyev: Tuple4D, normalv: Tuple4D, visibility: f64, rng: &mut SampleRng)
        -> Color {
        match self {
            Light::Point(l) =>
                l.lighting(m, effective_color, point, eyev, normalv, visibility),
            Light::Area(l) =>
                l.lighting(m, effective_color, point, eyev, normalv, visibility,
                    rng),
        }
    }
}

#[test]
fn point_light_position_is_forced_to_a_point() {
    let light = PointLight::new(Color::white(), Tuple4D::vector(1.0, 2.0, 3.0));

    assert!(light.position.is_point());
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material::default();
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = light.lighting(&m, Color::white(), Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), 1.0);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_opposite_from_surface_in_reflection() {
    let m = Material::default();
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 10.0, -10.0));
    let r2 = 2.0f64.sqrt() / 2.0;

    let res = light.lighting(&m, Color::white(), Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, -r2, -r2), Tuple4D::vector(0.0, 0.0, -1.0), 1.0);
    assert_eq!(res, Color::rgb(1.6364, 1.6364, 1.6364));
}

#[test]
fn light_behind_surface_leaves_only_ambient() {
    let m = Material::default();
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 10.0));

    let res = light.lighting(&m, Color::white(), Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), 1.0);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn zero_visibility_leaves_only_ambient() {
    let m = Material::default();
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = light.lighting(&m, Color::white(), Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0), 0.0);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn area_light_geometry() {
    let light = AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        false
    ).unwrap();

    assert_eq!(light.uvec, Tuple4D::vector(0.5, 0.0, 0.0));
    assert_eq!(light.vvec, Tuple4D::vector(0.0, 0.0, 0.5));
    assert_eq!(light.samples(), 8);
    assert_eq!(light.center(), Tuple4D::point(1.0, 0.0, 0.5));
}

#[test]
fn area_light_samples_cell_centers() {
    let light = AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        false
    ).unwrap();
    let mut rng = sample_rng(0);

    let cases = [
        ((0, 0), Tuple4D::point(0.25, 0.0, 0.25)),
        ((1, 0), Tuple4D::point(0.75, 0.0, 0.25)),
        ((0, 1), Tuple4D::point(0.25, 0.0, 0.75)),
        ((2, 0), Tuple4D::point(1.25, 0.0, 0.25)),
        ((3, 1), Tuple4D::point(1.75, 0.0, 0.75)),
    ];

    for ((u, v), expected) in cases.iter() {
        assert_eq!(light.sample(*u, *v, &mut rng), *expected);
    }
}

#[test]
fn jittered_samples_stay_inside_their_cell() {
    let light = AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 4,
        Tuple4D::vector(0.0, 0.0, 1.0), 2,
        true
    ).unwrap();
    let mut rng = sample_rng(7);

    for _ in 0..100 {
        let p = light.sample(2, 1, &mut rng);
        assert!(p.x >= 1.0 && p.x <= 1.5);
        assert!(p.z >= 0.5 && p.z <= 1.0);
        assert_eq!(p.y, 0.0);
    }
}

#[test]
fn jitter_is_reproducible_per_seed() {
    let light = AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0), 3,
        Tuple4D::vector(0.0, 1.0, 0.0), 3,
        true
    ).unwrap();

    let a = light.sample_points(&mut sample_rng(42));
    let b = light.sample_points(&mut sample_rng(42));
    assert_eq!(a, b);
}

#[test]
fn area_light_needs_samples() {
    let res = AreaLight::new(
        Color::white(),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0), 0,
        Tuple4D::vector(0.0, 1.0, 0.0), 2,
        false
    );

    assert!(matches!(res, Err(Error::NoLightSamples { usteps: 0, vsteps: 2 })));
}

#[test]
fn area_light_lighting_averages_samples() {
    let light = AreaLight::new(
        Color::white(),
        Tuple4D::point(-0.5, -0.5, -5.0),
        Tuple4D::vector(1.0, 0.0, 0.0), 2,
        Tuple4D::vector(0.0, 1.0, 0.0), 2,
        false
    ).unwrap();
    let m = Material {
        ambient: 0.1,
        diffuse: 0.9,
        specular: 0.0,
        color: Color::white(),
        ..Default::default()
    };
    let eye = Tuple4D::point(0.0, 0.0, -5.0);
    let mut rng = sample_rng(0);

    let cases = [
        (Tuple4D::point(0.0, 0.0, -1.0), 0.9965),
        (Tuple4D::point(0.0, 0.7071, -0.7071), 0.6232),
    ];

    for (point, expected) in cases.iter() {
        let eyev = (eye - *point).normalize();
        let normalv = Tuple4D::vector(point.x, point.y, point.z);
        let res = light.lighting(&m, Color::white(), *point, eyev, normalv, 1.0,
            &mut rng);

        assert_eq!(res, Color::rgb(*expected, *expected, *expected));
    }
}

#[test]
fn light_enum_dispatches() {
    let point: Light = PointLight::new(Color::rgb(0.5, 0.5, 0.5),
        Tuple4D::point(0.0, 0.0, -10.0)).into();

    assert_eq!(point.intensity(), Color::rgb(0.5, 0.5, 0.5));

    let res = point.lighting(&Material::default(), Color::rgb(0.5, 0.5, 0.5),
        Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 0.0, -1.0), 1.0, &mut sample_rng(0));
    assert_eq!(res, Color::rgb(0.95, 0.95, 0.95));
}
