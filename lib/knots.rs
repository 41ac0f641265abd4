//! Knot sets for B-spline bases.
//!
//! A knot set is an ordered sequence of breakpoints together with a polynomial
//! order `k` and the multiplicities of the first and last breakpoints. Interior
//! breakpoints always have multiplicity 1. With full multiplicity (`ml = mr =
//! k`) the first and last spline functions are non-zero at the boundaries;
//! lower multiplicities drop functions from the corresponding edge, which is
//! how Dirichlet conditions are usually imposed.

use std::ops::Range;
use ndarray as nd;
use crate::error::{ BasisError, BasisResult, DomainError };

/// Ordered breakpoints with boundary multiplicities and a polynomial order.
#[derive(Clone, Debug, PartialEq)]
pub struct KnotSet {
    k: usize,
    ml: usize,
    mr: usize,
    breakpoints: nd::Array1<f64>,
    // knot sequence with full multiplicity k on both ends
    padded: nd::Array1<f64>,
}

impl KnotSet {
    /// Create a new knot set of order `k` from strictly increasing breakpoints
    /// and boundary multiplicities `ml`, `mr ≤ k`.
    pub fn new(k: usize, breakpoints: nd::Array1<f64>, ml: usize, mr: usize)
        -> BasisResult<Self>
    {
        if k == 0 {
            return Err(BasisError::argument("knot set order must be at least 1"));
        }
        if ml > k || mr > k {
            return Err(BasisError::argument(format!(
                "boundary multiplicities must not exceed the order {k}; \
                got {ml} and {mr}"
            )));
        }
        let nb = breakpoints.len();
        if nb < 2 {
            return Err(BasisError::argument(format!(
                "knot sets need at least two breakpoints; got {nb}"
            )));
        }
        if breakpoints.iter().any(|b| !b.is_finite())
            || breakpoints.iter().zip(breakpoints.iter().skip(1))
                .any(|(l, r)| l >= r)
        {
            return Err(BasisError::argument(
                "breakpoints must be finite and strictly increasing"
            ));
        }
        if ml + mr + nb - 2 <= k {
            return Err(BasisError::argument(format!(
                "knot set of order {k} with {nb} breakpoints and \
                multiplicities ({ml}, {mr}) has no basis functions"
            )));
        }
        let a = breakpoints[0];
        let b = breakpoints[nb - 1];
        let padded: nd::Array1<f64>
            = std::iter::repeat(a).take(k)
            .chain(breakpoints.iter().skip(1).take(nb - 2).copied())
            .chain(std::iter::repeat(b).take(k))
            .collect();
        Ok(Self { k, ml, mr, breakpoints, padded })
    }

    /// Create a knot set of order `k` with `n` equally sized intervals over
    /// `[a, b]` and full boundary multiplicity.
    pub fn linear(k: usize, a: f64, b: f64, n: usize) -> BasisResult<Self> {
        DomainError::check("b - a", b - a)?;
        if n == 0 {
            return Err(BasisError::argument("knot sets need at least one interval"));
        }
        Self::new(k, nd::Array1::linspace(a, b, n + 1), k, k)
    }

    /// Create a knot set of order `k` with `n` intervals over `[a, b]` whose
    /// sizes grow geometrically by the factor `base` (> 0), with full boundary
    /// multiplicity.
    pub fn exponential(k: usize, a: f64, b: f64, n: usize, base: f64)
        -> BasisResult<Self>
    {
        DomainError::check("b - a", b - a)?;
        DomainError::check("base", base)?;
        if n == 0 {
            return Err(BasisError::argument("knot sets need at least one interval"));
        }
        let total: f64 = (0..n).map(|j| base.powi(j as i32)).sum();
        let mut acc = 0.0;
        let mut breakpoints: nd::Array1<f64> = nd::Array1::zeros(n + 1);
        breakpoints[0] = a;
        for (j, bj) in breakpoints.iter_mut().enumerate().skip(1) {
            acc += base.powi(j as i32 - 1);
            *bj = a + (b - a) * acc / total;
        }
        breakpoints[n] = b;
        Self::new(k, breakpoints, k, k)
    }

    /// Return a copy of `self` with new boundary multiplicities.
    pub fn with_multiplicities(&self, ml: usize, mr: usize)
        -> BasisResult<Self>
    {
        Self::new(self.k, self.breakpoints.clone(), ml, mr)
    }

    /// Polynomial order (degree + 1).
    pub fn order(&self) -> usize { self.k }

    /// Multiplicity of the first breakpoint.
    pub fn left_multiplicity(&self) -> usize { self.ml }

    /// Multiplicity of the last breakpoint.
    pub fn right_multiplicity(&self) -> usize { self.mr }

    pub fn breakpoints(&self) -> nd::ArrayView1<'_, f64> {
        self.breakpoints.view()
    }

    /// Number of (non-empty) intervals between breakpoints.
    pub fn num_intervals(&self) -> usize { self.breakpoints.len() - 1 }

    /// Number of spline functions spanned by the knot set.
    pub fn num_functions(&self) -> usize {
        self.ml + self.mr + self.breakpoints.len() - 2 - self.k
    }

    /// `[first breakpoint, last breakpoint]`.
    pub fn domain(&self) -> (f64, f64) {
        (self.breakpoints[0], self.breakpoints[self.breakpoints.len() - 1])
    }

    /// Full knot sequence, with the boundary multiplicities applied.
    pub fn knots(&self) -> nd::Array1<f64> {
        let lo = self.offset();
        let hi = self.padded.len() - (self.k - self.mr);
        self.padded.slice(nd::s![lo..hi]).to_owned()
    }

    // knot sequence with full multiplicity on both ends; function i of this
    // set is function i + offset() of the padded sequence
    pub(crate) fn padded(&self) -> nd::ArrayView1<'_, f64> {
        self.padded.view()
    }

    pub(crate) fn offset(&self) -> usize { self.k - self.ml }

    /// Return the index `j` of the interval `[b[j], b[j + 1])` containing `x`,
    /// counting the right end of the domain as part of the last interval.
    ///
    /// Returns `None` if `x` lies outside the knot span.
    pub fn interval(&self, x: f64) -> Option<usize> {
        let (a, b) = self.domain();
        if !(a..=b).contains(&x) { return None; }
        let j = self.breakpoints.iter().rposition(|bj| *bj <= x)?;
        Some(j.min(self.num_intervals() - 1))
    }

    /// Range of functions that are non-zero on interval `j`.
    pub fn functions_on(&self, j: usize) -> Range<usize> {
        let off = self.offset();
        let nf = self.num_functions();
        let lo = j.max(off) - off;
        let hi = (j + self.k).min(off + nf) - off;
        lo..hi.max(lo)
    }

    /// Greville abscissae, i.e. the averages of the `k - 1` knots interior to
    /// each function's support.
    ///
    /// These are the coefficients of the identity function `x` in the spline
    /// basis. Piecewise-constant splines have no interior knots and cannot
    /// represent `x`, so `k = 1` returns [`BasisError::Argument`].
    pub fn greville(&self) -> BasisResult<nd::Array1<f64>> {
        if self.k < 2 {
            return Err(BasisError::argument(
                "Greville abscissae are undefined for order-1 knot sets"));
        }
        let off = self.offset();
        let km1 = (self.k - 1) as f64;
        let g
            = (0..self.num_functions())
            .map(|i| {
                let p = i + off;
                self.padded.slice(nd::s![p + 1..p + self.k]).sum() / km1
            })
            .collect();
        Ok(g)
    }
}
