use std::f64::consts::PI;
use std::sync::Arc;

use crate::feq;
use crate::error::{ Error, Result };
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::color::Color;
use crate::canvas::Canvas;

/// A 2D texture coordinate. Both components usually lie in `[0, 1]`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl PartialEq for Uv {
    fn eq(&self, other: &Uv) -> bool {
        feq(self.u, other.u) && feq(self.v, other.v)
    }
}

impl Uv {
    pub fn new(u: f64, v: f64) -> Uv {
        Uv { u, v }
    }
}

/// The face of the unit cube a point lies on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Left,
    Right,
    Front,
    Back,
    Up,
    Down,
}

impl CubeFace {
    /// The face whose axis has the largest absolute coordinate.
    pub fn from_point(p: &Tuple4D) -> CubeFace {
        let coord = p.x.abs().max(p.y.abs()).max(p.z.abs());

        if coord == p.x {
            CubeFace::Right
        } else if coord == -p.x {
            CubeFace::Left
        } else if coord == p.y {
            CubeFace::Up
        } else if coord == -p.y {
            CubeFace::Down
        } else if coord == p.z {
            CubeFace::Front
        } else {
            CubeFace::Back
        }
    }

    /// Maps a point on this face of the cube `[-1, 1]^3` to `[0, 1]^2`.
    pub fn uv(&self, p: &Tuple4D) -> Uv {
        let wrap = |x: f64| x.rem_euclid(2.0) / 2.0;

        match self {
            CubeFace::Front => Uv::new(wrap(p.x + 1.0), wrap(p.y + 1.0)),
            CubeFace::Back => Uv::new(wrap(1.0 - p.x), wrap(p.y + 1.0)),
            CubeFace::Left => Uv::new(wrap(p.z + 1.0), wrap(p.y + 1.0)),
            CubeFace::Right => Uv::new(wrap(1.0 - p.z), wrap(p.y + 1.0)),
            CubeFace::Up => Uv::new(wrap(p.x + 1.0), wrap(1.0 - p.z)),
            CubeFace::Down => Uv::new(wrap(p.x + 1.0), wrap(p.z + 1.0)),
        }
    }
}

/// Projects a 3D texture-space point onto a 2D `Uv`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UvMapping {
    /// Tiles the XZ plane with unit squares.
    Planar,

    /// Longitude/latitude around the origin.
    Spherical,

    /// The same square mapped onto each face of the unit cube.
    Cubic,
}

impl UvMapping {
    pub fn map(&self, p: &Tuple4D) -> Uv {
        match self {
            UvMapping::Planar => Uv::new(p.x - p.x.floor(), p.z - p.z.floor()),
            UvMapping::Spherical => {
                let theta = p.x.atan2(p.z);
                let radius = Tuple4D::vector(p.x, p.y, p.z).magnitude();
                let phi = (p.y / radius).acos();

                let raw_u = theta / (2.0 * PI);
                Uv::new(1.0 - (raw_u + 0.5), 1.0 - phi / PI)
            },
            UvMapping::Cubic => CubeFace::from_point(p).uv(p),
        }
    }
}

/// A 2D color function.
#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// Alternates every half unit of `u`.
    Stripe(Color, Color),

    /// Linear blend from the first to the second color across `u`.
    Gradient(Color, Color),

    /// Concentric unit-width rings around `(0, 0)`.
    Ring(Color, Color),

    /// A `width` by `height` checkerboard over the unit square.
    Checkers { width: usize, height: usize, a: Color, b: Color },

    /// A sampled image; `v == 0` is the bottom row.
    Image(Arc<Canvas>),
}

impl Pattern {
    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::Stripe(a, b)
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::Gradient(a, b)
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::Ring(a, b)
    }

    pub fn checkers(width: usize, height: usize, a: Color, b: Color) -> Pattern {
        Pattern::Checkers { width, height, a, b }
    }

    /// Wraps a loaded image. Fails for an image without pixels.
    pub fn image(canvas: Arc<Canvas>) -> Result<Pattern> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(Error::EmptyImage);
        }

        Ok(Pattern::Image(canvas))
    }

    pub fn color_at(&self, uv: Uv) -> Color {
        match self {
            Pattern::Stripe(a, b) => {
                if (2.0 * uv.u).floor().rem_euclid(2.0) == 0.0 { *a } else { *b }
            },
            Pattern::Gradient(a, b) => {
                let fraction = uv.u - uv.u.floor();
                *a + (*b - *a) * fraction
            },
            Pattern::Ring(a, b) => {
                let distance = (uv.u.powi(2) + uv.v.powi(2)).sqrt().floor();
                if distance.rem_euclid(2.0) == 0.0 { *a } else { *b }
            },
            Pattern::Checkers { width, height, a, b } => {
                let u2 = (uv.u * *width as f64).floor();
                let v2 = (uv.v * *height as f64).floor();
                if (u2 + v2).rem_euclid(2.0) == 0.0 { *a } else { *b }
            },
            Pattern::Image(canvas) => {
                // Nearest pixel, with v flipped so that v == 1 is the top row.
                let v = 1.0 - uv.v;
                let x = (uv.u * (canvas.width - 1) as f64).round().max(0.0);
                let y = (v * (canvas.height - 1) as f64).round().max(0.0);

                canvas.read_pixel(x as usize, y as usize).unwrap_or_default()
            },
        }
    }
}

/// A pattern, a UV mapping and a texture-space transform.
///
/// Textures are shared between materials through `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub pattern: Pattern,
    pub mapping: UvMapping,
    transform: Transform,
}

impl Texture {
    pub fn new(pattern: Pattern, mapping: UvMapping) -> Texture {
        Texture { pattern, mapping, transform: Transform::default() }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Sets the texture transform. Fails for a singular matrix.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// The texture color at a world-space point on an object.
    ///
    /// The point goes through the object's inverse transform, then the
    /// texture's, then the UV mapping.
    pub fn color_at_object(&self, object_inverse: &Matrix4D, world_point: Tuple4D)
        -> Color {
        let object_point = *object_inverse * world_point;
        let texture_point = self.transform.to_local(object_point);

        self.pattern.color_at(self.mapping.map(&texture_point))
    }
}

#[test]
fn spherical_mapping() {
    let map = UvMapping::Spherical;
    let r2 = 2.0f64.sqrt() / 2.0;

    assert_eq!(map.map(&Tuple4D::point(0.0, 0.0, -1.0)), Uv::new(0.0, 0.5));
    assert_eq!(map.map(&Tuple4D::point(1.0, 0.0, 0.0)), Uv::new(0.25, 0.5));
    assert_eq!(map.map(&Tuple4D::point(0.0, 0.0, 1.0)), Uv::new(0.5, 0.5));
    assert_eq!(map.map(&Tuple4D::point(-1.0, 0.0, 0.0)), Uv::new(0.75, 0.5));
    assert_eq!(map.map(&Tuple4D::point(0.0, 1.0, 0.0)), Uv::new(0.5, 1.0));
    assert_eq!(map.map(&Tuple4D::point(0.0, -1.0, 0.0)), Uv::new(0.5, 0.0));
    assert_eq!(map.map(&Tuple4D::point(r2, r2, 0.0)), Uv::new(0.25, 0.75));
}

#[test]
fn planar_mapping() {
    let map = UvMapping::Planar;

    assert_eq!(map.map(&Tuple4D::point(0.25, 0.0, 0.5)), Uv::new(0.25, 0.5));
    assert_eq!(map.map(&Tuple4D::point(0.25, 0.0, -0.25)), Uv::new(0.25, 0.75));
    assert_eq!(map.map(&Tuple4D::point(0.25, 0.5, -0.25)), Uv::new(0.25, 0.75));
    assert_eq!(map.map(&Tuple4D::point(1.25, 0.0, 0.5)), Uv::new(0.25, 0.5));
    assert_eq!(map.map(&Tuple4D::point(0.25, 0.0, -1.75)), Uv::new(0.25, 0.25));
    assert_eq!(map.map(&Tuple4D::point(1.0, 0.0, -1.0)), Uv::new(0.0, 0.0));
    assert_eq!(map.map(&Tuple4D::point(0.0, 0.0, 0.0)), Uv::new(0.0, 0.0));
}

#[test]
fn cube_face_from_point() {
    assert_eq!(CubeFace::from_point(&Tuple4D::point(-1.0, 0.5, -0.25)),
        CubeFace::Left);
    assert_eq!(CubeFace::from_point(&Tuple4D::point(1.1, -0.75, 0.8)),
        CubeFace::Right);
    assert_eq!(CubeFace::from_point(&Tuple4D::point(0.1, 0.6, 0.9)),
        CubeFace::Front);
    assert_eq!(CubeFace::from_point(&Tuple4D::point(-0.7, 0.0, -2.0)),
        CubeFace::Back);
    assert_eq!(CubeFace::from_point(&Tuple4D::point(0.5, 1.0, 0.9)),
        CubeFace::Up);
    assert_eq!(CubeFace::from_point(&Tuple4D::point(-0.2, -1.3, 1.1)),
        CubeFace::Down);
}

#[test]
fn cube_face_uv() {
    let cases = [
        (CubeFace::Front, (-0.5, 0.5, 1.0), (0.5, -0.5, 1.0)),
        (CubeFace::Back, (0.5, 0.5, -1.0), (-0.5, -0.5, -1.0)),
        (CubeFace::Left, (-1.0, 0.5, -0.5), (-1.0, -0.5, 0.5)),
        (CubeFace::Right, (1.0, 0.5, 0.5), (1.0, -0.5, -0.5)),
        (CubeFace::Up, (-0.5, 1.0, -0.5), (0.5, 1.0, 0.5)),
        (CubeFace::Down, (-0.5, -1.0, 0.5), (0.5, -1.0, -0.5)),
    ];

    for (face, upper_left, lower_right) in cases.iter() {
        let p1 = Tuple4D::point(upper_left.0, upper_left.1, upper_left.2);
        let p2 = Tuple4D::point(lower_right.0, lower_right.1, lower_right.2);

        assert_eq!(face.uv(&p1), Uv::new(0.25, 0.75), "{:?}", face);
        assert_eq!(face.uv(&p2), Uv::new(0.75, 0.25), "{:?}", face);
    }
}

#[test]
fn cubic_mapping_picks_the_face() {
    let map = UvMapping::Cubic;

    assert_eq!(map.map(&Tuple4D::point(-0.5, 0.5, 1.0)), Uv::new(0.25, 0.75));
    assert_eq!(map.map(&Tuple4D::point(0.5, 1.0, 0.5)), Uv::new(0.75, 0.25));
}

#[test]
fn stripe_alternates_in_u() {
    let p = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(p.color_at(Uv::new(0.0, 0.0)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.4, 0.0)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.4, 0.9)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.8, 0.0)), Color::black());
    assert_eq!(p.color_at(Uv::new(0.9, 0.0)), Color::black());
}

#[test]
fn gradient_interpolates() {
    let p = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(p.color_at(Uv::new(0.0, 0.0)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.25, 0.0)), Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(p.color_at(Uv::new(0.5, 0.0)), Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(p.color_at(Uv::new(0.75, 0.0)), Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn checkers_in_2d() {
    let p = Pattern::checkers(2, 2, Color::black(), Color::white());

    assert_eq!(p.color_at(Uv::new(0.0, 0.0)), Color::black());
    assert_eq!(p.color_at(Uv::new(0.5, 0.0)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.0, 0.5)), Color::white());
    assert_eq!(p.color_at(Uv::new(0.5, 0.5)), Color::black());
    assert_eq!(p.color_at(Uv::new(1.0, 1.0)), Color::black());
}

#[test]
fn ring_extends_in_u_and_v() {
    let p = Pattern::ring(Color::white(), Color::black());

    assert_eq!(p.color_at(Uv::new(0.0, 0.0)), Color::white());
    assert_eq!(p.color_at(Uv::new(1.0, 0.0)), Color::black());
    assert_eq!(p.color_at(Uv::new(0.0, 1.0)), Color::black());
    assert_eq!(p.color_at(Uv::new(0.708, 0.708)), Color::black());
}

#[test]
fn image_pattern_samples_nearest_pixel_with_v_flipped() {
    let mut canvas = Canvas::new(10, 10);
    for y in 0..10 {
        for x in 0..10 {
            let value = (x + y) as f64 / 100.0;
            canvas.write_pixel(x, y, &Color::rgb(value, value, value));
        }
    }

    let p = Pattern::image(Arc::new(canvas)).unwrap();
    let grey = |c: f64| Color::rgb(c, c, c);

    assert_eq!(p.color_at(Uv::new(0.0, 0.0)), grey(0.09));
    assert_eq!(p.color_at(Uv::new(0.3, 0.0)), grey(0.12));
    assert_eq!(p.color_at(Uv::new(0.6, 0.3)), grey(0.11));
    assert_eq!(p.color_at(Uv::new(1.0, 1.0)), grey(0.09));
}

#[test]
fn empty_image_is_rejected() {
    assert!(matches!(Pattern::image(Arc::new(Canvas::new(0, 4))),
        Err(Error::EmptyImage)));
}

#[test]
fn texture_with_object_transform() {
    let texture = Texture::new(
        Pattern::stripe(Color::white(), Color::black()),
        UvMapping::Spherical
    );
    let object = Transform::new(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    assert_eq!(
        texture.color_at_object(object.inverse(), Tuple4D::point(1.5, 0.0, 0.0)),
        Color::white()
    );
}

#[test]
fn texture_with_texture_transform() {
    let mut texture = Texture::new(
        Pattern::stripe(Color::white(), Color::black()),
        UvMapping::Spherical
    );
    texture.set_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    assert_eq!(
        texture.color_at_object(&Matrix4D::identity(),
            Tuple4D::point(1.5, 0.0, 0.0)),
        Color::white()
    );
}

#[test]
fn texture_with_both_transforms() {
    let mut texture = Texture::new(
        Pattern::stripe(Color::white(), Color::black()),
        UvMapping::Spherical
    );
    texture.set_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let object = Transform::new(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    assert_eq!(
        texture.color_at_object(object.inverse(), Tuple4D::point(2.5, 0.0, 0.0)),
        Color::white()
    );
}

#[test]
fn texture_rejects_singular_transform() {
    let mut texture = Texture::new(
        Pattern::stripe(Color::white(), Color::black()),
        UvMapping::Planar
    );

    assert!(texture.set_transform(Matrix4D::scaling(1.0, 1.0, 0.0)).is_err());
    assert_eq!(*texture.transform().matrix(), Matrix4D::identity());
}
