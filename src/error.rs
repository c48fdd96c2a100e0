use thiserror::Error;

/// Errors produced while building or rendering a scene.
///
/// Misses, absent hits and fully shadowed points are not errors; they are
/// ordinary empty or zero results.
#[derive(Debug, Error)]
pub enum Error {
    /// A transform with a zero determinant was supplied to a shape, texture or
    /// camera.
    #[error("transform is not invertible (determinant is zero)")]
    NonInvertible,

    #[error("camera resolution must be non-zero, got {width}x{height}")]
    EmptyResolution { width: usize, height: usize },

    #[error("area light needs at least one step along each edge, got {usteps}x{vsteps}")]
    NoLightSamples { usteps: usize, vsteps: usize },

    #[error("texture image has no pixels")]
    EmptyImage,

    #[error("scene references unknown material `{0}`")]
    UnknownMaterial(String),

    #[error("scene references unknown texture `{0}`")]
    UnknownTexture(String),

    #[error("image texture `{0}` has no `imagePath`")]
    MissingImagePath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("could not build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
