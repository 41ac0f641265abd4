//! High-order implicit (compact) finite differences on a uniform grid.
//!
//! Derivatives are represented in the form `D = c M⁻¹ Δ`, where `Δ` and `M`
//! are tridiagonal. For the first and second derivatives this gives fourth-order
//! accuracy from a three-point stencil:
//! ```text
//! D₁ = (3 / Δx)  · tridiag(1, 4, 1)⁻¹ · tridiag(-1, 0, 1)
//! D₂ = (12 / Δx²) · tridiag(1, 10, 1)⁻¹ · tridiag(1, -2, 1)
//! ```
//! Grids starting next to a singular origin (the radial Coulomb problem with
//! `u(0) = 0`) use modified first rows:
//! ```text
//! Δ₁₁ = λ, M₁₁ = 4 + λ          λ = √3 - 2
//! Δ₁₁ = -2(1 + δβ₁), M₁₁ = 10 - 2δβ₁    δβ₁ = -ZΔx / (12 - 10ZΔx)
//! ```
//!
//! ```
//! use radbasis::{ Basis, ImplicitFiniteDifferences };
//!
//! let dx = 0.01;
//! let grid = ImplicitFiniteDifferences::new(1..100, dx, false, 0.0).unwrap();
//! let x = grid.locs();
//! let f = x.mapv(|xk| (std::f64::consts::PI * xk).sin());
//! let d2 = grid.derivative(2).unwrap();
//! let d2f = d2.apply(&f).unwrap();
//! let pi2 = std::f64::consts::PI.powi(2);
//! assert!(d2f.iter().zip(&f).all(|(d, fk)| (d + pi2 * fk).abs() < 1e-6));
//! ```

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;
use ndarray::{ self as nd, ShapeBuilder };
use ndarray_linalg::{
    FactorizeTridiagonal,
    LUFactorizedTridiagonal,
    SolveTridiagonalInplace,
    Factorize,
    LUFactorized,
    Solve,
};
use crate::{
    Arr1,
    Arr2,
    basis::{ Basis, Kind },
    error::{ BasisError, BasisResult, LengthError },
    fd::FiniteDifferences,
    utils::{ is_banded, tridiagonal },
};

/// Uniform finite-difference grid carrying the boundary parameters of its
/// implicit derivatives.
#[derive(Clone, Debug, PartialEq)]
pub struct ImplicitFiniteDifferences {
    grid: FiniteDifferences,
    lambda: f64,
    dbeta1: f64,
}

impl ImplicitFiniteDifferences {
    /// Create a new grid over indices `j` with step `dx`.
    ///
    /// If `singular_origin` is `true`, the first rows of the derivative
    /// operators are corrected for a Coulomb singularity of charge `Z` at
    /// `x = 0`; this requires `j` to start at 1 and returns
    /// [`BasisError::Argument`] otherwise. `Z` is ignored for regular grids.
    pub fn new(j: Range<usize>, dx: f64, singular_origin: bool, Z: f64)
        -> BasisResult<Self>
    {
        let start = j.start;
        let grid = FiniteDifferences::new(j, dx)?;
        let (lambda, dbeta1)
            = if singular_origin {
                if start != 1 {
                    return Err(BasisError::argument(format!(
                        "singular-origin corrections require a grid starting \
                        at j = 1; got j = {start}"
                    )));
                }
                (3.0_f64.sqrt() - 2.0, -Z * dx / (12.0 - 10.0 * Z * dx))
            } else {
                (0.0, 0.0)
            };
        Ok(Self { grid, lambda, dbeta1 })
    }

    /// The underlying uniform grid.
    pub fn grid(&self) -> &FiniteDifferences { &self.grid }

    /// First-derivative boundary parameter `λ`.
    pub fn lambda(&self) -> f64 { self.lambda }

    /// Second-derivative boundary parameter `δβ₁`.
    pub fn boundary_correction(&self) -> f64 { self.dbeta1 }

    /// Build the implicit `order`-th derivative, for `order` 1 or 2.
    pub fn derivative(&self, order: usize) -> BasisResult<ImplicitDerivative> {
        let n = self.grid.len();
        let dx = self.grid.step();
        match order {
            1 => {
                let mut delta = tridiagonal(n, -1.0, 0.0, 1.0);
                let mut m = tridiagonal(n, 1.0, 4.0, 1.0);
                delta[[0, 0]] = self.lambda;
                m[[0, 0]] += self.lambda;
                Ok(ImplicitDerivative::new(delta, m, 3.0 / dx))
            },
            2 => {
                let mut delta = tridiagonal(n, 1.0, -2.0, 1.0);
                let mut m = tridiagonal(n, 1.0, 10.0, 1.0);
                delta[[0, 0]] = -2.0 * (1.0 + self.dbeta1);
                m[[0, 0]] -= 2.0 * self.dbeta1;
                Ok(ImplicitDerivative::new(delta, m, 12.0 / dx.powi(2)))
            },
            _ => Err(BasisError::argument(format!(
                "implicit derivatives are available for orders 1 and 2; got \
                {order}"
            ))),
        }
    }
}

impl Basis for ImplicitFiniteDifferences {
    fn kind(&self) -> Kind<'_> { Kind::Implicit(self) }

    fn range(&self) -> Range<usize> { self.grid.range() }

    fn domain(&self) -> (f64, f64) { self.grid.domain() }

    fn locs(&self) -> nd::Array1<f64> { self.grid.locs() }

    fn weights(&self) -> nd::Array1<f64> { self.grid.weights() }

    fn inverse_weights(&self) -> nd::Array1<f64> { self.grid.inverse_weights() }

    fn evaluate(&self, x: f64, i: usize) -> f64 { self.grid.evaluate(x, i) }
}

/// Implicit derivative operator `c M⁻¹ Δ`.
///
/// The tridiagonal factorization of `M` is computed on first use and reused
/// afterward; it always belongs to the `M` stored beside it. Two threads racing
/// on first use may both compute it, in which case only one result is kept.
pub struct ImplicitDerivative {
    delta: nd::Array2<f64>,
    m: nd::Array2<f64>,
    c: f64,
    m_fact: OnceLock<LUFactorizedTridiagonal<f64>>,
}

impl fmt::Debug for ImplicitDerivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplicitDerivative")
            .field("delta", &self.delta)
            .field("m", &self.m)
            .field("c", &self.c)
            .field("factorized", &self.m_fact.get().is_some())
            .finish()
    }
}

impl ImplicitDerivative {
    fn new(delta: nd::Array2<f64>, m: nd::Array2<f64>, c: f64) -> Self {
        Self { delta, m, c, m_fact: OnceLock::new() }
    }

    /// Right-hand side matrix `Δ`.
    pub fn delta(&self) -> nd::ArrayView2<'_, f64> { self.delta.view() }

    /// Left-hand side tridiagonal matrix `M`.
    pub fn m(&self) -> nd::ArrayView2<'_, f64> { self.m.view() }

    /// Overall scale `c`.
    pub fn scale(&self) -> f64 { self.c }

    pub fn len(&self) -> usize { self.m.nrows() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    fn m_factorized(&self) -> BasisResult<&LUFactorizedTridiagonal<f64>> {
        if let Some(fact) = self.m_fact.get() { return Ok(fact); }
        let fact = self.m.factorize_tridiagonal()?;
        // a racing thread may have stored its own factorization of the same M
        Ok(self.m_fact.get_or_init(|| fact))
    }

    /// Compute `c M⁻¹ Δ x`.
    pub fn apply<S>(&self, x: &Arr1<S>) -> BasisResult<nd::Array1<f64>>
    where S: nd::Data<Elem = f64>
    {
        LengthError::check_len(self.len(), x.len())?;
        let fact = self.m_factorized()?;
        let mut y: nd::Array2<f64> = nd::Array2::zeros((self.len(), 1).f());
        y.column_mut(0).assign(&self.delta.dot(x));
        fact.solve_tridiagonal_inplace(&mut y)?;
        let mut y = y.index_axis_move(nd::Axis(1), 0);
        y *= self.c;
        Ok(y)
    }

    /// Return the dense matrix `c M⁻¹ Δ`.
    pub fn to_dense(&self) -> BasisResult<nd::Array2<f64>> {
        let fact = self.m_factorized()?;
        let mut d: nd::Array2<f64> = nd::Array2::zeros(self.delta.raw_dim().f());
        d.assign(&self.delta);
        fact.solve_tridiagonal_inplace(&mut d)?;
        d *= self.c;
        Ok(d)
    }

    fn shifted<S>(&self, b: &Arr2<S>, sign: f64) -> BasisResult<Self>
    where S: nd::Data<Elem = f64>
    {
        LengthError::check_len(self.len(), b.nrows())?;
        if !is_banded(b, 1) {
            return Err(BasisError::argument(
                "only diagonal or tridiagonal matrices can be added to an \
                implicit derivative"
            ));
        }
        let delta = &self.delta + &(self.m.dot(b) * (sign / self.c));
        Ok(Self::new(delta, self.m.clone(), self.c))
    }

    /// Return the operator `c M⁻¹ Δ + B` for diagonal or tridiagonal `B`,
    /// i.e. `Δ → Δ + M B / c` with `c` and `M` unchanged.
    ///
    /// Returns [`BasisError::Argument`] if `B` has non-zero elements outside
    /// its three central diagonals.
    pub fn add_banded<S>(&self, b: &Arr2<S>) -> BasisResult<Self>
    where S: nd::Data<Elem = f64>
    {
        self.shifted(b, 1.0)
    }

    /// Return the operator `c M⁻¹ Δ - B` for diagonal or tridiagonal `B`.
    pub fn sub_banded<S>(&self, b: &Arr2<S>) -> BasisResult<Self>
    where S: nd::Data<Elem = f64>
    {
        self.shifted(b, -1.0)
    }

    /// Return the operator plus `s` times the identity.
    pub fn add_diagonal(&self, s: f64) -> BasisResult<Self> {
        self.add_banded(&nd::Array2::from_diag_elem(self.len(), s))
    }

    /// Factorize the operator for solving `c M⁻¹ Δ y = b`.
    pub fn factorize(&self) -> BasisResult<ImplicitFactorization> {
        let delta_lu = self.delta.factorize()?;
        Ok(ImplicitFactorization { delta_lu, m: self.m.clone(), c: self.c })
    }
}

/// Factorized implicit derivative, for solving `c M⁻¹ Δ y = b` as
/// `y = Δ⁻¹ M b / c`.
pub struct ImplicitFactorization {
    delta_lu: LUFactorized<nd::OwnedRepr<f64>>,
    m: nd::Array2<f64>,
    c: f64,
}

impl fmt::Debug for ImplicitFactorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplicitFactorization")
            .field("m", &self.m)
            .field("c", &self.c)
            .finish_non_exhaustive()
    }
}

impl ImplicitFactorization {
    /// Solve for `y` in `c M⁻¹ Δ y = b`.
    pub fn solve<S>(&self, b: &Arr1<S>) -> BasisResult<nd::Array1<f64>>
    where S: nd::Data<Elem = f64>
    {
        LengthError::check_len(self.m.nrows(), b.len())?;
        let rhs = self.m.dot(b) / self.c;
        Ok(self.delta_lu.solve(&rhs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn max_err(a: &nd::Array1<f64>, b: &nd::Array1<f64>) -> f64 {
        a.iter().zip(b).map(|(ak, bk)| (ak - bk).abs()).fold(0.0, f64::max)
    }

    fn second_derivative_error(n: usize) -> f64 {
        let dx = 1.0 / (n + 1) as f64;
        let g = ImplicitFiniteDifferences::new(1..n + 1, dx, false, 0.0).unwrap();
        let x = g.locs();
        let f = x.mapv(|xk| (PI * xk).sin());
        let d2f = g.derivative(2).unwrap().apply(&f).unwrap();
        max_err(&d2f, &(-PI * PI * &f))
    }

    #[test]
    fn second_derivative_is_fourth_order() {
        let e1 = second_derivative_error(49);
        let e2 = second_derivative_error(99);
        assert!(e2 < 1e-6);
        assert!(e1 / e2 > 12.0);
    }

    #[test]
    fn first_derivative() {
        let n = 199;
        let dx = 1.0 / (n + 1) as f64;
        let g = ImplicitFiniteDifferences::new(1..n + 1, dx, false, 0.0).unwrap();
        let x = g.locs();
        let f = x.mapv(|xk| (PI * xk).sin().powi(2));
        let df = g.derivative(1).unwrap().apply(&f).unwrap();
        let expected = x.mapv(|xk| PI * (2.0 * PI * xk).sin());
        assert!(max_err(&df, &expected) < 1e-5);
    }

    #[test]
    fn dense_matches_apply() {
        let g = ImplicitFiniteDifferences::new(1..21, 0.1, true, 1.0).unwrap();
        let d = g.derivative(2).unwrap();
        let x: nd::Array1<f64> = (0..20).map(|k| (k as f64 * 0.3).cos()).collect();
        let y = d.apply(&x).unwrap();
        let yd = d.to_dense().unwrap().dot(&x);
        for (a, b) in y.iter().zip(&yd) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn factorization_inverts_apply() {
        let g = ImplicitFiniteDifferences::new(1..31, 0.05, false, 0.0).unwrap();
        let d = g.derivative(2).unwrap();
        let x: nd::Array1<f64> = (0..30).map(|k| (k as f64).sin()).collect();
        let y = d.apply(&x).unwrap();
        let xx = d.factorize().unwrap().solve(&y).unwrap();
        for (a, b) in x.iter().zip(&xx) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn banded_shift_matches_dense() {
        let g = ImplicitFiniteDifferences::new(1..16, 0.2, true, 2.0).unwrap();
        let d = g.derivative(2).unwrap();
        let v: nd::Array1<f64> = (0..15).map(|k| -1.0 / (0.2 * (k + 1) as f64)).collect();
        let b = nd::Array2::from_diag(&v);
        let h = d.sub_banded(&b).unwrap();
        let expected = d.to_dense().unwrap() - &b;
        let computed = h.to_dense().unwrap();
        for (a, e) in computed.iter().zip(&expected) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-9);
        }
        assert_eq!(h.m(), d.m());
        assert_eq!(h.scale(), d.scale());

        let s = d.add_diagonal(0.5).unwrap();
        let expected = d.to_dense().unwrap() + nd::Array2::<f64>::eye(15) * 0.5;
        for (a, e) in s.to_dense().unwrap().iter().zip(&expected) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-9);
        }

        let mut dense = nd::Array2::<f64>::zeros((15, 15));
        dense[[0, 5]] = 1.0;
        assert!(matches!(d.add_banded(&dense), Err(BasisError::Argument(_))));
    }

    #[test]
    fn singular_origin() {
        let dx = 0.1;
        let g = ImplicitFiniteDifferences::new(1..11, dx, true, 1.0).unwrap();
        assert_abs_diff_eq!(g.lambda(), 3.0_f64.sqrt() - 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(
            g.boundary_correction(), -0.1 / (12.0 - 1.0), epsilon = 1e-15);
        let d1 = g.derivative(1).unwrap();
        assert_abs_diff_eq!(d1.m()[[0, 0]], 4.0 + g.lambda(), epsilon = 1e-15);
        assert_eq!(d1.delta()[[0, 0]], g.lambda());
        let d2 = g.derivative(2).unwrap();
        assert_abs_diff_eq!(
            d2.delta()[[0, 0]], -2.0 * (1.0 + g.boundary_correction()),
            epsilon = 1e-15);
        assert_abs_diff_eq!(
            d2.m()[[0, 0]], 10.0 - 2.0 * g.boundary_correction(),
            epsilon = 1e-15);

        assert!(matches!(
            ImplicitFiniteDifferences::new(2..11, dx, true, 1.0),
            Err(BasisError::Argument(_))
        ));
        let r = ImplicitFiniteDifferences::new(2..11, dx, false, 1.0).unwrap();
        assert_eq!(r.lambda(), 0.0);
        assert_eq!(r.boundary_correction(), 0.0);
        assert!(matches!(g.derivative(3), Err(BasisError::Argument(_))));
    }

    #[test]
    fn length_mismatch() {
        let g = ImplicitFiniteDifferences::new(1..11, 0.1, false, 0.0).unwrap();
        let d = g.derivative(1).unwrap();
        assert!(matches!(
            d.apply(&nd::Array1::<f64>::zeros(5)), Err(BasisError::Length(_))));
    }
}
