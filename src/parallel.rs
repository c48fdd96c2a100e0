use std::time::Instant;

use log::info;
use rayon::prelude::*;

use crate::error::Result;
use crate::world::World;
use crate::camera::Camera;
use crate::canvas::Canvas;

/// Renders `world` with rows spread over a `rayon` thread pool.
///
/// `threads` defaults to one thread per logical CPU. Each row is traced with
/// the camera's generator for that row, so the image is identical to
/// `Camera::render` for the same seed.
pub fn render(camera: &Camera, world: &World, threads: Option<usize>)
    -> Result<Canvas> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build()?;

    info!("rendering {}x{} on {} threads, {} bounces",
        camera.hsize, camera.vsize, pool.current_num_threads(),
        camera.max_bounces);
    let start = Instant::now();

    let mut canvas = Canvas::new(camera.hsize, camera.vsize);
    pool.install(|| {
        canvas.pixels_mut()
            .par_chunks_mut(camera.hsize)
            .enumerate()
            .for_each(|(y, row)| camera.render_row(world, y, row));
    });

    info!("render finished in {:.2?}", start.elapsed());
    Ok(canvas)
}

#[cfg(test)]
use crate::tuple::Tuple4D;
#[cfg(test)]
use crate::matrix::Matrix4D;
#[cfg(test)]
use crate::color::Color;
#[cfg(test)]
use crate::light::AreaLight;
#[cfg(test)]
use crate::shape::Shape;

#[cfg(test)]
fn soft_shadow_scene() -> (Camera, World) {
    let mut w = World::new();
    w.add_light(AreaLight::new(
        Color::white(),
        Tuple4D::point(-1.0, 4.0, -1.0),
        Tuple4D::vector(2.0, 0.0, 0.0), 3,
        Tuple4D::vector(0.0, 0.0, 2.0), 3,
        true
    ).unwrap());
    w.add_shape(Shape::plane());
    w.add_shape(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap());

    let mut c = Camera::new(16, 12, std::f64::consts::PI / 3.0).unwrap();
    c.set_transform(Matrix4D::view_transform(
        Tuple4D::point(0.0, 3.0, -6.0),
        Tuple4D::point(0.0, 0.5, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    )).unwrap();
    c.seed = 1234;

    (c, w)
}

#[test]
fn parallel_render_matches_serial_render() {
    let (c, w) = soft_shadow_scene();

    let serial = c.render(&w);
    let parallel = render(&c, &w, Some(3)).unwrap();

    for y in 0..c.vsize {
        for x in 0..c.hsize {
            let s = serial.read_pixel(x, y).unwrap();
            let p = parallel.read_pixel(x, y).unwrap();
            assert_eq!((s.r, s.g, s.b), (p.r, p.g, p.b), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn parallel_render_of_default_world() {
    let w = World::default_world().unwrap();
    let mut c = Camera::new(11, 11, std::f64::consts::PI / 2.0).unwrap();
    c.set_transform(Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    )).unwrap();

    let image = render(&c, &w, None).unwrap();
    assert_eq!(image.read_pixel(5, 5).unwrap(),
        Color::rgb(0.38066, 0.47583, 0.2855));
}
