use std::fs::File;
use std::io::{ BufWriter, Write };
use std::path::Path;

use image::{ Rgb, RgbImage };
use log::debug;

use crate::error::{ Error, Result };
use crate::color::Color;
use crate::canvas::Canvas;

fn is_ppm(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("ppm"))
}

/// Converts a canvas to 8-bit RGB, clamping every channel to `[0, 1]`.
pub fn to_rgb_image(canvas: &Canvas) -> RgbImage {
    RgbImage::from_fn(canvas.width as u32, canvas.height as u32, |x, y| {
        let c = canvas.read_pixel(x as usize, y as usize).unwrap_or_default();
        Rgb(c.to_rgb8())
    })
}

/// Converts an 8-bit RGB image to a canvas, mapping `0..=255` to `[0, 1]`.
pub fn from_rgb_image(img: &RgbImage) -> Canvas {
    let mut canvas = Canvas::new(img.width() as usize, img.height() as usize);
    for (x, y, pixel) in img.enumerate_pixels() {
        canvas.write_pixel(x as usize, y as usize, &Color::from_rgb8(pixel.0));
    }

    canvas
}

/// Saves a canvas. `.ppm` files are written as plain PPM; every other
/// extension goes through the `image` crate, which picks the format.
pub fn save<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<()> {
    let path = path.as_ref();

    if is_ppm(path) {
        let mut out = BufWriter::new(File::create(path)?);
        canvas.write_ppm(&mut out)?;
        out.flush()?;
    } else {
        to_rgb_image(canvas).save(path)?;
    }

    debug!("saved {}x{} image to {}", canvas.width, canvas.height,
        path.display());
    Ok(())
}

/// Loads an image file (PNG or JPEG) into a canvas for use as a texture.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Canvas> {
    let path = path.as_ref();
    let canvas = from_rgb_image(&image::open(path)?.to_rgb8());

    if canvas.width == 0 || canvas.height == 0 {
        return Err(Error::EmptyImage);
    }

    debug!("loaded {}x{} texture from {}", canvas.width, canvas.height,
        path.display());
    Ok(canvas)
}

#[cfg(test)]
fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("whitted-{}-{}", std::process::id(), name))
}

#[test]
fn rgb_image_conversion_clamps() {
    let mut c = Canvas::new(2, 1);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.5, -1.0));
    c.write_pixel(1, 0, &Color::rgb(0.2, 0.0, 1.0));

    let img = to_rgb_image(&c);
    assert_eq!(img.get_pixel(0, 0).0, [255, 128, 0]);
    assert_eq!(img.get_pixel(1, 0).0, [51, 0, 255]);
}

#[test]
fn png_round_trip() {
    let mut c = Canvas::new(3, 2);
    c.write_pixel(0, 0, &Color::rgb(1.0, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.2, 0.4, 0.6));
    let path = temp_path("round-trip.png");

    save(&c, &path).unwrap();
    let loaded = load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.width, 3);
    assert_eq!(loaded.height, 2);
    assert_eq!(loaded.read_pixel(0, 0), Some(Color::rgb(1.0, 0.0, 0.0)));
    assert_eq!(loaded.read_pixel(2, 1), Some(Color::rgb(0.2, 0.4, 0.6)));
    assert_eq!(loaded.read_pixel(1, 1), Some(Color::black()));
}

#[test]
fn ppm_extension_writes_plain_ppm() {
    let mut c = Canvas::new(2, 1);
    c.write_pixel(1, 0, &Color::white());
    let path = temp_path("plain.PPM");

    save(&c, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(text, "P3\n2 1\n255\n0 0 0 255 255 255\n");
}

#[test]
fn missing_image_is_an_error() {
    let res = load(temp_path("does-not-exist.png"));

    assert!(matches!(res, Err(Error::Image(_))));
}
