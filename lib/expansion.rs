//! Functions expanded in a basis.

use ndarray as nd;
use ndarray_linalg::{ Lapack, Scalar };
use crate::{
    Arr1,
    basis::Basis,
    density::Density,
    error::{ BasisResult, LengthError },
    ops,
};

/// A function `f ≈ Σ_i c_i φ_i`, holding a borrowed basis and one coefficient
/// per basis function.
pub struct Expansion<'a, B, A>
where B: Basis + ?Sized
{
    basis: &'a B,
    coeffs: nd::Array1<A>,
}

impl<'a, B, A> Clone for Expansion<'a, B, A>
where
    B: Basis + ?Sized,
    A: Clone,
{
    fn clone(&self) -> Self {
        Self { basis: self.basis, coeffs: self.coeffs.clone() }
    }
}

impl<'a, B, A> Expansion<'a, B, A>
where
    B: Basis + ?Sized,
    A: Scalar<Real = f64>,
{
    /// Create a new expansion from coefficients.
    ///
    /// Returns [`BasisError::Length`][crate::BasisError::Length] if the number
    /// of coefficients does not match the size of the basis.
    pub fn new(basis: &'a B, coeffs: nd::Array1<A>) -> BasisResult<Self> {
        LengthError::check_len(basis.len(), coeffs.len())?;
        Ok(Self { basis, coeffs })
    }

    /// Expand `f` in `basis`. See [`ops::interpolate`].
    pub fn interpolate<F>(basis: &'a B, f: F) -> BasisResult<Self>
    where
        A: Lapack,
        F: Fn(f64) -> A,
    {
        let coeffs = ops::interpolate(basis, f)?;
        Ok(Self { basis, coeffs })
    }

    pub fn basis(&self) -> &'a B { self.basis }

    pub fn coeffs(&self) -> nd::ArrayView1<'_, A> { self.coeffs.view() }

    pub fn into_coeffs(self) -> nd::Array1<A> { self.coeffs }

    /// Evaluate the expansion at a single point.
    pub fn evaluate(&self, x: f64) -> A {
        self.coeffs.iter().enumerate()
            .fold(A::zero(), |acc, (i, ci)| {
                acc + ci.mul_real(self.basis.evaluate(x, i))
            })
    }

    /// Evaluate the expansion at each point of `x`.
    pub fn values<S>(&self, x: &Arr1<S>) -> nd::Array1<A>
    where S: nd::Data<Elem = f64>
    {
        x.iter().map(|xk| self.evaluate(*xk)).collect()
    }

    /// Compute the density `self · other` re-expanded in `target`.
    pub fn density<R, T>(&self, other: &Expansion<'_, R, A>, target: &T)
        -> BasisResult<Density<A>>
    where
        A: Lapack,
        R: Basis + ?Sized,
        T: Basis + ?Sized,
    {
        Density::mixed(target, self.basis, &self.coeffs, other.basis, &other.coeffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::{
        error::BasisError,
        fd::FiniteDifferences,
        fedvr::FEDVR,
    };

    #[test]
    fn evaluate_fedvr_expansion() {
        let b = FEDVR::linear(0.0, 3.0, 6, 8).unwrap();
        let f = Expansion::interpolate(&b, |x| x.sin()).unwrap();
        assert_eq!(f.coeffs().len(), b.len());
        for x in [0.05, 0.7, 1.333, 2.9] {
            assert_abs_diff_eq!(f.evaluate(x), x.sin(), epsilon = 1e-6);
        }
        let xs = nd::array![0.5, 1.5];
        let v = f.values(&xs);
        assert_abs_diff_eq!(v[1], 1.5_f64.sin(), epsilon = 1e-6);
        // outside the domain every function vanishes
        assert_eq!(f.evaluate(3.5), 0.0);
    }

    #[test]
    fn expansion_density() {
        let fd = FiniteDifferences::radial(40, 0.05).unwrap();
        let f = Expansion::interpolate(&fd, |x| x).unwrap();
        let g = Expansion::interpolate(&fd, |x| x + 1.0).unwrap();
        let rho = f.density(&g, &fd).unwrap();
        for (rk, xk) in rho.rho().iter().zip(&fd.locs()) {
            assert_abs_diff_eq!(*rk, xk * (xk + 1.0), epsilon = 1e-14);
        }
        let inner = fd.restrict(5..30).unwrap();
        let h = Expansion::interpolate(&inner, |x| 2.0 * x).unwrap();
        let mixed = f.density(&h, &fd).unwrap();
        assert_eq!(mixed.rho()[0], 0.0);
        assert_abs_diff_eq!(mixed.rho()[10], 2.0 * 0.55 * 0.55, epsilon = 1e-14);
    }

    #[test]
    fn coefficient_length() {
        let fd = FiniteDifferences::radial(4, 0.5).unwrap();
        assert!(matches!(
            Expansion::new(&fd, nd::array![1.0, 2.0]),
            Err(BasisError::Length(_))
        ));
        let f = Expansion::new(&fd, nd::array![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(f.evaluate(1.0), 2.0);
        assert_eq!(f.clone().into_coeffs()[3], 4.0);
    }
}
