//! Finite differences on a uniform grid.
//!
//! The basis functions are tents `φ_j(x) = max(0, 1 - |x - jΔx| / Δx)`, one per
//! grid index `j` in a contiguous range. With the lumped (nodal) inner product
//! the tents are orthogonal, so the mass matrix is `Δx I` and the expansion
//! coefficients of a function are simply its values on the grid.
//!
//! ```
//! use radbasis::{ Basis, FiniteDifferences, ops };
//!
//! let fd = FiniteDifferences::new(1..101, 0.01).unwrap();
//! let c = ops::interpolate(&fd, |x| x * x).unwrap();
//! assert!((c[49] - 0.25).abs() < 1e-15);
//! assert_eq!(fd.domain().0, 0.0);
//! ```

use std::ops::Range;
use ndarray as nd;
use crate::{
    basis::{ Basis, Kind },
    error::{ BasisError, BasisResult, DomainError },
    utils::tridiagonal,
};

/// Uniform grid `x_j = j Δx` for `j` in a contiguous index range.
#[derive(Clone, Debug, PartialEq)]
pub struct FiniteDifferences {
    j: Range<usize>,
    dx: f64,
}

impl FiniteDifferences {
    /// Create a new grid over the indices `j` with step `dx`.
    ///
    /// Returns [`BasisError::Domain`] if `dx` is non-positive or infinite, and
    /// [`BasisError::Argument`] if `j` is empty.
    pub fn new(j: Range<usize>, dx: f64) -> BasisResult<Self> {
        DomainError::check("dx", dx)?;
        if j.is_empty() {
            return Err(BasisError::argument("finite-difference grids need at least one node"));
        }
        log::debug!(
            "finite differences: {} nodes, dx = {dx}, j = {:?}", j.len(), j);
        Ok(Self { j, dx })
    }

    /// Create a radial grid of `n` nodes, `x_j = j Δx` for `j = 1, ..., n`,
    /// such that the (implicit) node `j = 0` sits at the origin.
    pub fn radial(n: usize, dx: f64) -> BasisResult<Self> {
        Self::new(1..n + 1, dx)
    }

    /// Grid step.
    pub fn step(&self) -> f64 { self.dx }

    /// Grid index range.
    pub fn indices(&self) -> Range<usize> { self.j.clone() }

    // position of global index j
    pub(crate) fn loc(&self, j: usize) -> f64 { j as f64 * self.dx }

    pub(crate) fn mass_diagonal(&self) -> nd::Array1<f64> {
        nd::Array1::from_elem(self.j.len(), self.dx)
    }

    /// Return the central-difference approximation to the `order`-th
    /// derivative in coefficient space, for `order` 1 or 2.
    ///
    /// Values beyond either end of the grid are taken to be zero.
    pub fn derivative_matrix(&self, order: usize) -> BasisResult<nd::Array2<f64>> {
        let n = self.j.len();
        match order {
            1 => Ok(tridiagonal(n, -1.0, 0.0, 1.0) / (2.0 * self.dx)),
            2 => Ok(tridiagonal(n, 1.0, -2.0, 1.0) / self.dx.powi(2)),
            _ => Err(BasisError::argument(format!(
                "finite-difference derivatives are available for orders 1 \
                and 2; got {order}"
            ))),
        }
    }
}

impl Basis for FiniteDifferences {
    fn kind(&self) -> Kind<'_> { Kind::FiniteDifferences(self) }

    fn range(&self) -> Range<usize> { self.j.clone() }

    fn domain(&self) -> (f64, f64) {
        ((self.j.start as f64 - 1.0) * self.dx, self.loc(self.j.end))
    }

    fn locs(&self) -> nd::Array1<f64> {
        self.j.clone().map(|j| self.loc(j)).collect()
    }

    fn weights(&self) -> nd::Array1<f64> {
        nd::Array1::ones(self.j.len())
    }

    fn inverse_weights(&self) -> nd::Array1<f64> { self.weights() }

    fn evaluate(&self, x: f64, i: usize) -> f64 {
        assert!(i < self.j.len(), "function index {i} out of bounds");
        let xi = self.loc(self.j.start + i);
        (1.0 - (x - xi).abs() / self.dx).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn grid_geometry() {
        let fd = FiniteDifferences::new(3..8, 0.5).unwrap();
        assert_eq!(fd.len(), 5);
        assert_eq!(fd.range(), 3..8);
        assert_eq!(fd.locs(), nd::array![1.5, 2.0, 2.5, 3.0, 3.5]);
        assert_eq!(fd.domain(), (1.0, 4.0));
        assert_eq!(fd.weights(), nd::Array1::ones(5));
    }

    #[test]
    fn tents() {
        let fd = FiniteDifferences::radial(4, 0.25).unwrap();
        assert_eq!(fd.evaluate(0.25, 0), 1.0);
        assert_abs_diff_eq!(fd.evaluate(0.125, 0), 0.5, epsilon = 1e-15);
        assert_eq!(fd.evaluate(0.0, 0), 0.0);
        assert_eq!(fd.evaluate(0.5, 0), 0.0);
        assert_abs_diff_eq!(fd.evaluate(0.9, 3), 0.6, epsilon = 1e-14);
        // partition of unity between nodes
        let x = 0.61;
        let s: f64 = (0..4).map(|i| fd.evaluate(x, i)).sum();
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn central_differences() {
        let dx = 1e-3;
        let fd = FiniteDifferences::radial(999, dx).unwrap();
        let x = fd.locs();
        let f = x.mapv(|xk| (std::f64::consts::PI * xk).sin());
        let d1 = fd.derivative_matrix(1).unwrap().dot(&f);
        let d2 = fd.derivative_matrix(2).unwrap().dot(&f);
        let pi = std::f64::consts::PI;
        for k in 1..998 {
            assert_abs_diff_eq!(d1[k], pi * (pi * x[k]).cos(), epsilon = 1e-5);
            assert_abs_diff_eq!(d2[k], -pi * pi * f[k], epsilon = 1e-4);
        }
        assert!(matches!(fd.derivative_matrix(3), Err(BasisError::Argument(_))));
    }

    #[test]
    fn invalid_grids() {
        assert!(matches!(
            FiniteDifferences::new(1..5, 0.0), Err(BasisError::Domain(_))));
        assert!(matches!(
            FiniteDifferences::new(1..5, f64::INFINITY), Err(BasisError::Domain(_))));
        assert!(matches!(
            FiniteDifferences::new(4..4, 0.1), Err(BasisError::Argument(_))));
    }
}
