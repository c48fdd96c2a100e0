use std::time::Instant;

use log::{ info, trace };

use crate::consts::{ DEFAULT_MAX_BOUNCES, DEFAULT_SEED };
use crate::error::{ Error, Result };
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::transform::Transform;
use crate::color::Color;
use crate::world::World;
use crate::canvas::Canvas;
use crate::light::{ SampleRng, sample_rng };

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. Based on camera parameters,
/// different perspectives can be produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    pub field_of_view: f64,

    /// How the world is oriented relative to the camera (typically a view
    /// transformation).
    transform: Transform,

    /// Reflection and refraction budget for every primary ray.
    pub max_bounces: usize,

    /// Seed for area light jitter.
    pub seed: u64,
}

impl Camera {
    /// Creates a camera at the origin looking down -Z.
    ///
    /// Fails if either dimension is zero.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64)
        -> Result<Camera> {
        if hsize == 0 || vsize == 0 {
            return Err(Error::EmptyResolution { width: hsize, height: vsize });
        }

        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Ok(Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform: Transform::default(),
            max_bounces: DEFAULT_MAX_BOUNCES,
            seed: DEFAULT_SEED,
        })
    }

    /// The world-space size of one pixel on the canvas plane at z = -1.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Sets the view transform. A singular matrix is rejected.
    pub fn set_transform(&mut self, m: Matrix4D) -> Result<()> {
        self.transform = Transform::new(m)?;
        Ok(())
    }

    /// The ray from the camera through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.transform.to_local(Tuple4D::point(world_x, world_y, -1.0));
        let origin = self.transform.to_local(Tuple4D::point(0.0, 0.0, 0.0));
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }

    /// The sample generator for row `y`.
    ///
    /// Every renderer draws row `y` with this generator, so the output does
    /// not depend on which thread renders which row.
    pub fn row_rng(&self, y: usize) -> SampleRng {
        sample_rng(self.seed.wrapping_add(y as u64))
    }

    /// Traces every pixel of row `y` into `row`.
    pub fn render_row(&self, world: &World, y: usize, row: &mut [Color]) {
        let mut rng = self.row_rng(y);

        for (x, pixel) in row.iter_mut().enumerate() {
            let ray = self.ray_for_pixel(x, y);
            *pixel = world.color_at(&ray, self.max_bounces, &mut rng);
        }

        trace!("rendered row {}/{}", y + 1, self.vsize);
    }

    /// Renders `world` one row at a time on the calling thread.
    pub fn render(&self, world: &World) -> Canvas {
        info!("rendering {}x{} on one thread, {} bounces",
            self.hsize, self.vsize, self.max_bounces);
        let start = Instant::now();

        let mut image = Canvas::new(self.hsize, self.vsize);
        for (y, row) in image.pixels_mut().chunks_mut(self.hsize).enumerate() {
            self.render_row(world, y, row);
        }

        info!("render finished in {:.2?}", start.elapsed());
        image
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn pixel_size_for_horizontal_canvas() {
    let c = Camera::new(200, 125, PI / 2.0).unwrap();

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn pixel_size_for_vertical_canvas() {
    let c = Camera::new(125, 200, PI / 2.0).unwrap();

    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn empty_resolution_is_rejected() {
    assert!(matches!(Camera::new(0, 10, PI / 2.0),
        Err(Error::EmptyResolution { width: 0, height: 10 })));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, PI / 2.0).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, PI / 2.0).unwrap();
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction, Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let mut c = Camera::new(201, 101, PI / 2.0).unwrap();
    c.set_transform(Matrix4D::rotation_y(PI / 4.0)
        * Matrix4D::translation(0.0, -2.0, 5.0)).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction,
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn singular_view_transform_is_rejected() {
    let mut c = Camera::new(10, 10, PI / 2.0).unwrap();

    assert!(c.set_transform(Matrix4D::scaling(1.0, 0.0, 1.0)).is_err());
    assert_eq!(*c.transform().matrix(), Matrix4D::identity());
}

#[test]
fn render_world_with_camera() {
    let w = World::default_world().unwrap();
    let mut c = Camera::new(11, 11, PI / 2.0).unwrap();

    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);
    c.set_transform(Matrix4D::view_transform(from, to, up)).unwrap();

    let image = c.render(&w);
    assert_eq!(image.width, 11);
    assert_eq!(image.height, 11);
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
