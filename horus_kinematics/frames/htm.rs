//! Homogeneous transformation matrices
//!
//! A `HomogeneousTM` is a 4x4 matrix holding a 3x3 rotation block, a 3x1
//! translation column and the fixed bottom row `[0, 0, 0, 1]`.

use super::error::{KinematicsError, KinematicsResult};
use nalgebra::{DMatrix, Matrix3, Matrix4, Point3, Vector3};
use std::fmt;
use std::ops::Mul;

/// Rigid-body pose as a 4x4 homogeneous transform
///
/// Instances are never mutated in place: composition and inversion return
/// new transforms. `Clone` is a deep copy of the matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomogeneousTM {
    matrix: Matrix4<f64>,
}

impl Default for HomogeneousTM {
    fn default() -> Self {
        Self::identity()
    }
}

impl HomogeneousTM {
    /// Identity transform (no rotation, no translation)
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Build a transform from standard Denavit-Hartenberg parameters
    ///
    /// * `a` - link length along the new x axis
    /// * `alpha` - link twist about the new x axis (radians)
    /// * `d` - link offset along the previous z axis
    /// * `theta` - joint angle about the previous z axis (radians)
    pub fn from_dh(a: f64, alpha: f64, d: f64, theta: f64) -> Self {
        let (st, ct) = theta.sin_cos();
        let (sa, ca) = alpha.sin_cos();

        #[rustfmt::skip]
        let matrix = Matrix4::new(
            ct,  -st * ca,  st * sa, a * ct,
            st,   ct * ca, -ct * sa, a * st,
            0.0,  sa,       ca,      d,
            0.0,  0.0,      0.0,     1.0,
        );

        Self { matrix }
    }

    /// Build a transform from a dynamically sized rotation and translation
    ///
    /// `rotation` must be 3x3 and `translation` must be 3x1, otherwise
    /// `DimensionMismatch` is returned. The rotation is taken as given; use
    /// [`HomogeneousTM::is_rigid`] to check it.
    pub fn from_rotation_translation(
        rotation: &DMatrix<f64>,
        translation: &DMatrix<f64>,
    ) -> KinematicsResult<Self> {
        if rotation.shape() != (3, 3) {
            return Err(KinematicsError::dimension_mismatch(
                "rotation",
                (3, 3),
                rotation.shape(),
            ));
        }
        if translation.shape() != (3, 1) {
            return Err(KinematicsError::dimension_mismatch(
                "translation",
                (3, 1),
                translation.shape(),
            ));
        }

        let r = Matrix3::from_fn(|i, j| rotation[(i, j)]);
        let t = Vector3::new(translation[0], translation[1], translation[2]);
        Ok(Self::from_parts(&r, &t))
    }

    /// Build a transform from a fixed-size rotation and translation
    pub fn from_parts(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Self {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
        Self { matrix }
    }

    /// Wrap an existing 4x4 matrix as is
    ///
    /// The matrix is trusted to be in homogeneous rigid form; nothing is
    /// checked. Use [`HomogeneousTM::is_rigid`] when that is not known.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Pure translation
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_parts(&Matrix3::identity(), &Vector3::new(x, y, z))
    }

    /// Pure rotation
    pub fn from_rotation(rotation: &Matrix3<f64>) -> Self {
        Self::from_parts(rotation, &Vector3::zeros())
    }

    /// The underlying 4x4 matrix
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Top-left 3x3 rotation block
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Top-right 3x1 translation column
    pub fn translation(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Map a point from this transform's child frame into its parent frame
    ///
    /// The point is lifted to `[x, y, z, 1]`; no perspective divide is done
    /// since the bottom row is always `[0, 0, 0, 1]`.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let h = self.matrix * point.to_homogeneous();
        Point3::new(h.x, h.y, h.z)
    }

    /// Like [`HomogeneousTM::transform_point`], for callers holding an optional point
    pub fn try_transform_point(
        &self,
        point: Option<&Point3<f64>>,
    ) -> KinematicsResult<Point3<f64>> {
        point
            .map(|p| self.transform_point(p))
            .ok_or(KinematicsError::NullArgument("point"))
    }

    /// Rotate a direction vector (translation is not applied)
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation() * vector
    }

    /// Inverse of a rigid transform: rotation `Rᵗ`, translation `-Rᵗ·t`
    ///
    /// Only valid while the rotation block is orthonormal.
    pub fn inverse(&self) -> Self {
        let rt = self.rotation().transpose();
        let t = -(rt * self.translation());
        Self::from_parts(&rt, &t)
    }

    /// Compose two transforms: `self · other`
    ///
    /// Applied to a point, `other` acts first and `self` second.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Check the homogeneous form and orthonormality of the rotation block
    pub fn is_rigid(&self, tolerance: f64) -> bool {
        let bottom_ok = self.matrix[(3, 0)].abs() <= tolerance
            && self.matrix[(3, 1)].abs() <= tolerance
            && self.matrix[(3, 2)].abs() <= tolerance
            && (self.matrix[(3, 3)] - 1.0).abs() <= tolerance;
        if !bottom_ok {
            return false;
        }

        let r = self.rotation();
        let gram = r.transpose() * r - Matrix3::identity();
        gram.amax() <= tolerance && (r.determinant() - 1.0).abs() <= tolerance
    }

    /// Check if this is approximately the identity transform
    pub fn is_identity(&self, tolerance: f64) -> bool {
        (self.matrix - Matrix4::identity()).amax() <= tolerance
    }
}

impl Mul for HomogeneousTM {
    type Output = HomogeneousTM;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

impl<'a> Mul<&'a HomogeneousTM> for &'a HomogeneousTM {
    type Output = HomogeneousTM;

    fn mul(self, rhs: &'a HomogeneousTM) -> Self::Output {
        self.compose(rhs)
    }
}

impl fmt::Display for HomogeneousTM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matrix)
    }
}
