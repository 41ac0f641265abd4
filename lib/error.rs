//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;
use crate::basis::BasisTag;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        Self::check_len(a.len(), b.len())
    }

    pub(crate) fn check_len(na: usize, nb: usize) -> Result<(), Self> {
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned when a grid-generation parameter is non-positive or infinite.
#[derive(Debug, Error)]
#[error("{name} must be positive and finite; got {value}")]
pub struct DomainError {
    /// Name of the offending parameter.
    pub name: &'static str,
    /// Value of the offending parameter.
    pub value: f64,
}

impl DomainError {
    pub(crate) fn check(name: &'static str, value: f64) -> Result<(), Self> {
        (value > 0.0 && value.is_finite()).then_some(())
            .ok_or(Self { name, value })
    }
}

/// Returned from basis construction and operator functions.
#[derive(Debug, Error)]
pub enum BasisError {
    /// Returned when two bases that do not share identical discretization
    /// nodes, knot sets, or quadrature grids are combined.
    #[error("incompatible bases: {left} and {right} do not share a discretization")]
    Incompatible {
        left: BasisTag,
        right: BasisTag,
    },

    /// [`DomainError`]
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Returned for invalid arguments, e.g. a singular-origin correction on a
    /// grid that does not start at index 1.
    #[error("argument error: {0}")]
    Argument(String),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

impl BasisError {
    pub(crate) fn argument<S: Into<String>>(msg: S) -> Self {
        Self::Argument(msg.into())
    }

    pub(crate) fn incompatible(left: BasisTag, right: BasisTag) -> Self {
        Self::Incompatible { left, right }
    }
}

pub type BasisResult<T> = Result<T, BasisError>;
