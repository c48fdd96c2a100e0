pub mod consts;
pub mod error;

pub mod tuple;
pub mod matrix;
pub mod transform;
pub mod ray;

pub mod color;
pub mod canvas;
pub mod pattern;
pub mod material;
pub mod light;

pub mod shape;
pub mod intersect;
pub mod world;
pub mod camera;
pub mod parallel;

pub mod scene;
pub mod imageio;

pub use error::{ Error, Result };

use consts::FEQ_EPSILON;

/// Approximate floating point equality, used by every `PartialEq` on the
/// geometric and color types.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
