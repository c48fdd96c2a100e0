use crate::error::{ Error, Result };
use crate::matrix::Matrix4D;
use crate::tuple::Tuple4D;

/// A transformation matrix paired with its inverse.
///
/// Shapes, textures and the camera invert their transform on every ray, so
/// the inverse (and the inverse transpose used for normals) is computed once,
/// when the transform is assigned. A `Transform` can only be built from an
/// invertible matrix.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    matrix: Matrix4D,
    inverse: Matrix4D,
    inverse_transpose: Matrix4D,
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            matrix: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            inverse_transpose: Matrix4D::identity(),
        }
    }
}

impl Transform {
    /// Pairs `matrix` with its inverse.
    ///
    /// Fails with `Error::NonInvertible` if the determinant is zero.
    pub fn new(matrix: Matrix4D) -> Result<Transform> {
        let inverse = matrix.inverse().ok_or(Error::NonInvertible)?;

        Ok(Transform {
            matrix,
            inverse,
            inverse_transpose: inverse.transposition(),
        })
    }

    pub fn matrix(&self) -> &Matrix4D {
        &self.matrix
    }

    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    /// Maps a world-space (or parent-space) tuple into local space.
    pub fn to_local(&self, t: Tuple4D) -> Tuple4D {
        self.inverse * t
    }

    /// Maps a local-space normal back out, renormalized with `w` forced to 0.
    pub fn normal_to_world(&self, normal: Tuple4D) -> Tuple4D {
        let mut world = self.inverse_transpose * normal;
        world.w = 0.0;
        world.normalize()
    }
}

#[test]
fn default_is_identity() {
    let t = Transform::default();

    assert_eq!(*t.matrix(), Matrix4D::identity());
    assert_eq!(*t.inverse(), Matrix4D::identity());
}

#[test]
fn inverse_is_computed_on_construction() {
    let t = Transform::new(Matrix4D::translation(1.0, 2.0, 3.0)).unwrap();

    assert_eq!(*t.inverse(), Matrix4D::translation(-1.0, -2.0, -3.0));
    assert_eq!(t.to_local(Tuple4D::point(1.0, 2.0, 3.0)),
        Tuple4D::point(0.0, 0.0, 0.0));
}

#[test]
fn singular_matrix_is_rejected() {
    let res = Transform::new(Matrix4D::scaling(0.0, 1.0, 1.0));

    assert!(matches!(res, Err(Error::NonInvertible)));
}

#[test]
fn normals_ignore_translation() {
    let t = Transform::new(Matrix4D::translation(0.0, 5.0, 0.0)).unwrap();
    let n = t.normal_to_world(Tuple4D::vector(0.0, 2.0, 0.0));

    assert_eq!(n, Tuple4D::vector(0.0, 1.0, 0.0));
}
