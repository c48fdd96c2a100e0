use std::sync::Arc;

use crate::color::Color;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::pattern::Texture;
use crate::light::{ Light, SampleRng };

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. A material with a `texture` ignores `color`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub texture: Option<Arc<Texture>>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub transparency: f64,
    pub refractive_index: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            texture: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            transparency: 0.0,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// The surface color at a world-space point, before lighting.
    pub fn color_at(&self, object_inverse: &Matrix4D, point: Tuple4D) -> Color {
        match &self.texture {
            Some(texture) => texture.color_at_object(object_inverse, point),
            None => self.color,
        }
    }

    /// Calculates the lighting of a point from a single light.
    ///
    /// The surface color is combined with the light's color, then the light
    /// does the Phong accumulation itself. `visibility` is the fraction of
    /// the light that reaches `point`; ambient light is never shadowed.
    pub fn lighting(&self, object_inverse: &Matrix4D, light: &Light,
        point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D, visibility: f64,
        rng: &mut SampleRng) -> Color {
        let effective_color = self.color_at(object_inverse, point) *
            light.intensity();

        light.lighting(self, effective_color, point, eyev, normalv, visibility,
            rng)
    }
}

#[cfg(test)]
use crate::light::{ PointLight, sample_rng };
#[cfg(test)]
use crate::pattern::{ Pattern, UvMapping };

#[test]
fn default_material() {
    let m = Material::default();

    assert_eq!(m.color, Color::white());
    assert_eq!(m.ambient, 0.1);
    assert_eq!(m.diffuse, 0.9);
    assert_eq!(m.specular, 0.9);
    assert_eq!(m.shininess, 200.0);
    assert_eq!(m.reflective, 0.0);
    assert_eq!(m.transparency, 0.0);
    assert_eq!(m.refractive_index, 1.0);
    assert!(m.texture.is_none());
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let m = Material::default();
    let light: Light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 10.0, -10.0)).into();

    let res = m.lighting(&Matrix4D::identity(), &light,
        Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 0.0, -1.0), 1.0, &mut sample_rng(0));
    assert_eq!(res, Color::rgb(0.7364, 0.7364, 0.7364));
}

#[test]
fn visibility_attenuates_color() {
    let m = Material {
        ambient: 0.1,
        diffuse: 0.9,
        specular: 0.0,
        color: Color::white(),
        ..Default::default()
    };
    let light: Light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).into();
    let mut rng = sample_rng(0);

    for (visibility, expected) in [(1.0, 1.0), (0.5, 0.55), (0.0, 0.1)].iter() {
        let res = m.lighting(&Matrix4D::identity(), &light,
            Tuple4D::point(0.0, 0.0, -1.0), Tuple4D::vector(0.0, 0.0, -1.0),
            Tuple4D::vector(0.0, 0.0, -1.0), *visibility, &mut rng);

        assert_eq!(res, Color::rgb(*expected, *expected, *expected));
    }
}

#[test]
fn lighting_with_texture() {
    let texture = Texture::new(
        Pattern::stripe(Color::white(), Color::black()),
        UvMapping::Planar
    );
    let m = Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        texture: Some(Arc::new(texture)),

        // Only ambient light, so the texture color comes through unchanged
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,

        ..Default::default()
    };
    let light: Light = PointLight::new(Color::white(),
        Tuple4D::point(0.0, 0.0, -10.0)).into();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let mut rng = sample_rng(0);

    assert_eq!(
        m.lighting(&Matrix4D::identity(), &light, Tuple4D::point(0.25, 0.0, 0.0),
            eyev, normalv, 1.0, &mut rng),
        Color::white()
    );
    assert_eq!(
        m.lighting(&Matrix4D::identity(), &light, Tuple4D::point(0.75, 0.0, 0.0),
            eyev, normalv, 1.0, &mut rng),
        Color::black()
    );
}

#[test]
fn light_color_tints_the_surface() {
    let m = Material {
        color: Color::rgb(1.0, 0.5, 0.0),
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        ..Default::default()
    };
    let light: Light = PointLight::new(Color::rgb(0.5, 1.0, 1.0),
        Tuple4D::point(0.0, 0.0, -10.0)).into();

    let res = m.lighting(&Matrix4D::identity(), &light,
        Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 0.0, -1.0), 1.0, &mut sample_rng(0));
    assert_eq!(res, Color::rgb(0.5, 0.5, 0.0));
}
