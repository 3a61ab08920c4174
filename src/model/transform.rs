//! Affine transforms and their 3MF wire representation
//!
//! In memory a transform is a 4x4 matrix acting on column vectors, with the
//! translation in the last column, so `T_total = T_parent * T_child`.
//!
//! 3MF stores the transposed convention: a `transform` attribute holds the
//! first three columns of each row of `transpose(T)`, flattened row-major:
//!
//! ```text
//! m00 m10 m20  m01 m11 m21  m02 m12 m22  m03 m13 m23
//! ```
//!
//! The homogeneous row `[0 0 0 1]` is implicit and never written.

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use nalgebra::{Matrix4, Point3};

use crate::error::{Error, Result};

/// Number of values in a serialized 3MF transform (4 rows x 3 columns)
pub const TRANSFORM_MATRIX_SIZE: usize = 12;

/// A 4x4 affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    /// The identity transform
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap a 4x4 matrix with the translation in its last column
    ///
    /// Only the affine part survives serialization; the last row is always
    /// written back as `[0 0 0 1]`.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// A pure translation
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            matrix: Matrix4::new_translation(&nalgebra::Vector3::new(x, y, z)),
        }
    }

    /// A uniform or non-uniform scale about the origin
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&nalgebra::Vector3::new(x, y, z)),
        }
    }

    /// The underlying matrix
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Translation component (last column)
    pub fn translation_part(&self) -> (f64, f64, f64) {
        (self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// Whether this is exactly the identity
    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix4::identity()
    }

    /// Apply the transform to a point
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    /// The 12 values written to a `transform` attribute
    pub fn to_wire(&self) -> [f64; TRANSFORM_MATRIX_SIZE] {
        let transposed = self.matrix.transpose();
        let mut values = [0.0; TRANSFORM_MATRIX_SIZE];
        for row in 0..4 {
            for col in 0..3 {
                values[row * 3 + col] = transposed[(row, col)];
            }
        }
        values
    }

    /// Rebuild a transform from the 12 values of a `transform` attribute
    pub fn from_wire(values: &[f64]) -> Result<Self> {
        if values.len() != TRANSFORM_MATRIX_SIZE {
            return Err(Error::InvalidTransform(format!(
                "expected exactly {} values, got {}",
                TRANSFORM_MATRIX_SIZE,
                values.len()
            )));
        }

        if let Some((idx, val)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidTransform(format!(
                "value at index {} must be finite (got {})",
                idx, val
            )));
        }

        let mut transposed = Matrix4::zeros();
        for row in 0..4 {
            for col in 0..3 {
                transposed[(row, col)] = values[row * 3 + col];
            }
        }
        transposed[(3, 3)] = 1.0;

        Ok(Self {
            matrix: transposed.transpose(),
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Transform {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self::from_matrix(matrix)
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, child: Transform) -> Transform {
        Transform {
            matrix: self.matrix * child.matrix,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_wire();
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl FromStr for Transform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    Error::InvalidTransform(format!("'{}' is not a number in \"{}\"", token, s))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Self::from_wire(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_wire_format() {
        assert_eq!(Transform::identity().to_string(), "1 0 0 0 1 0 0 0 1 0 0 0");
    }

    #[test]
    fn test_translation_lands_in_last_row() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let wire = t.to_wire();
        assert_eq!(&wire[9..], &[10.0, 20.0, 30.0]);
        assert_eq!(t.to_string(), "1 0 0 0 1 0 0 0 1 10 20 30");
    }

    #[test]
    fn test_wire_order_is_transposed() {
        #[rustfmt::skip]
        let m = Matrix4::new(
            1.0, 2.0, 3.0, 4.0,
            5.0, 6.0, 7.0, 8.0,
            9.0, 10.0, 11.0, 12.0,
            0.0, 0.0, 0.0, 1.0,
        );
        let t = Transform::from_matrix(m);
        assert_eq!(
            t.to_wire(),
            [1.0, 5.0, 9.0, 2.0, 6.0, 10.0, 3.0, 7.0, 11.0, 4.0, 8.0, 12.0]
        );
        assert_eq!(Transform::from_wire(&t.to_wire()).unwrap(), t);
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        let err = "1 0 0 0 1 0 0 0 1".parse::<Transform>().unwrap_err();
        assert!(matches!(err, Error::InvalidTransform(_)));
        assert!(err.to_string().contains("got 9"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_parse_rejects_garbage_and_nan() {
        assert!("1 0 0 0 1 0 0 0 1 0 0 x".parse::<Transform>().is_err());
        assert!("1 0 0 0 1 0 0 0 1 0 0 NaN".parse::<Transform>().is_err());
    }

    #[test]
    fn test_composition_order() {
        let parent = Transform::translation(5.0, 0.0, 0.0);
        let child = Transform::scale(2.0, 2.0, 2.0);
        let total = parent * child;
        let p = total.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Point3::new(7.0, 2.0, 2.0));
    }

    #[test]
    fn test_fractional_values_round_trip_exactly() {
        let t = Transform::translation(0.1, -2.5e-7, 123456.789);
        let parsed: Transform = t.to_string().parse().unwrap();
        assert_eq!(parsed, t);
    }
}
