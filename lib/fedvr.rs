//! Finite-element discrete-variable representation.
//!
//! The domain is split into elements `[t_e, t_{e+1}]`, each carrying an
//! `n`-point Gauss-Lobatto grid. Within an element the basis functions are the
//! Lagrange cardinal polynomials of its nodes; the functions of the last node
//! of one element and the first node of the next are joined into a single
//! *bridge* function spanning both, so that `E` elements carry `E(n - 1) + 1`
//! functions in total. Normalized by the square roots of the (bridge-summed)
//! quadrature weights,
//! ```text
//! χ_i(x) = L_i(x) / √w_i
//! ```
//! the functions are orthonormal under Lobatto quadrature, and the
//! coefficients of a function `f` are `f(x_i) √w_i`.
//!
//! Dirichlet conditions are imposed by [restricting][crate::basis::Restricted]
//! the basis to drop the first and/or last function.

use std::ops::Range;
use ndarray as nd;
use crate::{
    basis::{ Basis, Kind },
    error::{ BasisError, BasisResult },
    interp::{ dlagrange_cardinal, lagrange_cardinal },
    quadrature::element_grid_real,
    utils::array_diff,
};

/// FEDVR basis over a set of finite elements.
#[derive(Clone, Debug, PartialEq)]
pub struct FEDVR {
    t: nd::Array1<f64>,
    n: usize,
    // element-local nodes and weights, one row per element
    xe: nd::Array2<f64>,
    we: nd::Array2<f64>,
    x: nd::Array1<f64>,
    w: nd::Array1<f64>,
}

impl FEDVR {
    /// Create a new basis on elements bounded by `t` with `n` Gauss-Lobatto
    /// points per element.
    ///
    /// Returns [`BasisError::Argument`] if `n < 2`, there are fewer than two
    /// boundaries, or the boundaries are not finite and strictly increasing.
    pub fn new(t: nd::Array1<f64>, n: usize) -> BasisResult<Self> {
        if n < 2 {
            return Err(BasisError::argument(format!(
                "FEDVR elements need at least two points; got {n}"
            )));
        }
        if t.len() < 2
            || t.iter().any(|te| !te.is_finite())
            || array_diff(&t).iter().any(|h| *h <= 0.0)
        {
            return Err(BasisError::argument(
                "FEDVR element boundaries must be finite and strictly \
                increasing, with at least one element"
            ));
        }
        let ne = t.len() - 1;
        let ng = ne * (n - 1) + 1;
        let mut xe: nd::Array2<f64> = nd::Array2::zeros((ne, n));
        let mut we: nd::Array2<f64> = nd::Array2::zeros((ne, n));
        let mut x: nd::Array1<f64> = nd::Array1::zeros(ng);
        let mut w: nd::Array1<f64> = nd::Array1::zeros(ng);
        let elements
            = t.iter().zip(t.iter().skip(1)).enumerate()
            .zip(xe.outer_iter_mut().zip(we.outer_iter_mut()));
        for ((e, (&a, &b)), (mut xr, mut wr)) in elements {
            let (xs, ws) = element_grid_real(n, a, b);
            let off = e * (n - 1);
            x.slice_mut(nd::s![off..off + n]).assign(&xs);
            w.slice_mut(nd::s![off..off + n]).zip_mut_with(&ws, |wg, wk| *wg += wk);
            xr.assign(&xs);
            wr.assign(&ws);
        }
        // element edges are exact
        t.iter().enumerate().for_each(|(e, te)| { x[e * (n - 1)] = *te; });
        log::debug!(
            "FEDVR: {ne} elements on [{}, {}], {n} points per element, {ng} \
            functions",
            t[0], t[ne],
        );
        Ok(Self { t, n, xe, we, x, w })
    }

    /// Create a basis of `ne` equally sized elements over `[a, b]`.
    pub fn linear(a: f64, b: f64, ne: usize, n: usize) -> BasisResult<Self> {
        Self::new(nd::Array1::linspace(a, b, ne + 1), n)
    }

    /// Element boundaries.
    pub fn boundaries(&self) -> nd::ArrayView1<'_, f64> { self.t.view() }

    /// Number of Gauss-Lobatto points per element.
    pub fn order(&self) -> usize { self.n }

    pub fn num_elements(&self) -> usize { self.t.len() - 1 }

    /// Bridge-summed quadrature weights `w_i`.
    pub fn quadrature_weights(&self) -> nd::ArrayView1<'_, f64> {
        self.w.view()
    }

    pub(crate) fn mass_diagonal(&self) -> nd::Array1<f64> {
        nd::Array1::ones(self.x.len())
    }

    // element containing x, if any
    fn element(&self, x: f64) -> Option<usize> {
        let ne = self.num_elements();
        if !(self.t[0]..=self.t[ne]).contains(&x) { return None; }
        self.t.iter().rposition(|te| *te <= x).map(|e| e.min(ne - 1))
    }

    /// Return the Galerkin matrix `⟨χ_i|∂ᵒ χ_j⟩` of the `order`-th derivative,
    /// for `order` 1 or 2.
    ///
    /// The second derivative is computed in the weak form `-⟨χ_i'|χ_j'⟩`,
    /// which omits surface terms at the edges of the domain; it is exact for
    /// functions whose derivative vanishes there, or whose edge functions
    /// have been dropped by restriction.
    pub fn derivative_matrix(&self, order: usize) -> BasisResult<nd::Array2<f64>> {
        if !(1..=2).contains(&order) {
            return Err(BasisError::argument(format!(
                "FEDVR derivatives are available for orders 1 and 2; got \
                {order}"
            )));
        }
        let n = self.n;
        let ng = self.x.len();
        let sw = self.w.mapv(f64::sqrt);
        let mut d: nd::Array2<f64> = nd::Array2::zeros((ng, ng));
        for (e, (xs, ws)) in self.xe.outer_iter().zip(self.we.outer_iter()).enumerate() {
            let off = e * (n - 1);
            // dl[[q, j]] = L_j'(x_q)
            let dl: nd::Array2<f64>
                = nd::Array2::from_shape_fn(
                    (n, n), |(q, j)| dlagrange_cardinal(&xs, j, xs[q]));
            let mut block = d.slice_mut(nd::s![off..off + n, off..off + n]);
            for ((i, j), dij) in block.indexed_iter_mut() {
                let elem
                    = if order == 1 {
                        ws[i] * dl[[i, j]]
                    } else {
                        -(0..n).map(|q| ws[q] * dl[[q, i]] * dl[[q, j]])
                            .sum::<f64>()
                    };
                *dij += elem / (sw[off + i] * sw[off + j]);
            }
        }
        Ok(d)
    }
}

impl Basis for FEDVR {
    fn kind(&self) -> Kind<'_> { Kind::Fedvr(self) }

    fn range(&self) -> Range<usize> { 0..self.x.len() }

    fn domain(&self) -> (f64, f64) { (self.t[0], self.t[self.t.len() - 1]) }

    fn locs(&self) -> nd::Array1<f64> { self.x.clone() }

    fn weights(&self) -> nd::Array1<f64> {
        self.w.mapv(|wk| wk.sqrt().recip())
    }

    fn inverse_weights(&self) -> nd::Array1<f64> { self.w.mapv(f64::sqrt) }

    fn evaluate(&self, x: f64, i: usize) -> f64 {
        assert!(i < self.x.len(), "function index {i} out of bounds");
        let Some(e) = self.element(x) else { return 0.0; };
        let off = e * (self.n - 1);
        if !(off..off + self.n).contains(&i) { return 0.0; }
        lagrange_cardinal(&self.xe.row(e), i - off, x) / self.w[i].sqrt()
    }
}
