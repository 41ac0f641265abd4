//! B-spline bases on polynomial knot sets.
//!
//! A [`BSpline`] basis pairs a [`KnotSet`] with a quadrature rule covering the
//! knot span (by default Gauss-Legendre points in every knot interval, see
//! [`lgwt`]). At construction, every function that is non-zero on a knot
//! interval is evaluated at every quadrature point in it via de Boor's
//! recursion, and the results are kept in a row-banded [`SplineTable`]. Matrix
//! elements of quasi-diagonal operators `f(x)` then follow as
//! ```text
//! ⟨B_i|f|B_j⟩ = Σ_q B_i(x_q) w_q f(x_q) B_j(x_q)
//! ```
//! which is banded, `|i - j| ≤ k - 1`. The overlap matrix `S` (`f = 1`) is
//! precomputed.
//!
//! ```
//! use radbasis::{ Basis, BSpline, KnotSet, ops };
//!
//! let t = KnotSet::linear(4, 0.0, 1.0, 10).unwrap();
//! let b = BSpline::auto(t, 0).unwrap();
//! let c = ops::interpolate(&b, |x| x.powi(3)).unwrap();
//! let x = 0.4321;
//! let fx: f64 = (0..b.len()).map(|i| c[i] * b.evaluate(x, i)).sum();
//! assert!((fx - x.powi(3)).abs() < 1e-12);
//! ```

use std::ops::Range;
use ndarray as nd;
use ndarray_linalg::Scalar;
use crate::{
    Arr1,
    basis::{ Basis, BasisTag, Kind },
    error::{ BasisError, BasisResult, LengthError },
    knots::KnotSet,
    quadrature::{ lgwt, num_quadrature_points },
};

// de Boor's recursion on the k local coefficients `d` of the functions
// p = interval..interval + k (padded indices), for the m-th derivative;
// the result is left in d[k - 1]
fn deboor_local(
    tau: &nd::ArrayView1<f64>,
    k: usize,
    d: &mut [f64],
    x: f64,
    interval: usize,
    m: usize,
) -> f64
{
    if m >= k { return 0.0; }
    for j in 1..=m {
        for i in (j..k).rev() {
            let p = interval + i;
            let gap = tau[p + k - j] - tau[p];
            d[i] = (k - j) as f64 * (d[i] - d[i - 1]) / gap;
        }
    }
    for j in m + 1..k {
        for i in (j..k).rev() {
            let p = interval + i;
            let a = (x - tau[p]) / (tau[p + k - j] - tau[p]);
            d[i] = (1.0 - a) * d[i - 1] + a * d[i];
        }
    }
    d[k - 1]
}

/// Evaluate the `m`-th derivative of the spline `Σ_i c_i B_i` at `x`, which
/// must lie in knot interval `interval` (see [`KnotSet::interval`]).
///
/// Coefficients of functions dropped by reduced boundary multiplicities are
/// treated as zero. Derivatives of order `m ≥ k` vanish.
///
/// *Panics if `c` is shorter than the number of functions in `t` or `interval`
/// is out of bounds*.
pub fn deboor<S>(t: &KnotSet, c: &Arr1<S>, x: f64, interval: usize, m: usize)
    -> f64
where S: nd::Data<Elem = f64>
{
    let k = t.order();
    let off = t.offset();
    let nf = t.num_functions();
    let mut d: Vec<f64>
        = (interval..interval + k)
        .map(|p| {
            if (off..off + nf).contains(&p) { c[p - off] } else { 0.0 }
        })
        .collect();
    deboor_local(&t.padded(), k, &mut d, x, interval, m)
}

/// Like [`deboor`], but locate the knot interval of `x` first, returning zero
/// outside the knot span.
pub fn deboor_at<S>(t: &KnotSet, c: &Arr1<S>, x: f64, m: usize) -> f64
where S: nd::Data<Elem = f64>
{
    t.interval(x)
        .map(|j| deboor(t, c, x, j, m))
        .unwrap_or(0.0)
}

/// Values of all basis functions (or their derivatives) at a set of points,
/// stored as one contiguous band of at most `k` columns per row.
#[derive(Clone, Debug, PartialEq)]
pub struct SplineTable {
    cols: Vec<Range<usize>>,
    values: nd::Array2<f64>,
    ncols: usize,
}

impl SplineTable {
    // evaluate the m-th derivative of every function of `t` at the points `x`
    fn new<S>(t: &KnotSet, x: &Arr1<S>, m: usize) -> BasisResult<Self>
    where S: nd::Data<Elem = f64>
    {
        let k = t.order();
        let off = t.offset();
        let tau = t.padded();
        let mut cols: Vec<Range<usize>> = Vec::with_capacity(x.len());
        let mut values: nd::Array2<f64> = nd::Array2::zeros((x.len(), k));
        let mut d: Vec<f64> = vec![0.0; k];
        for (&xq, mut row) in x.iter().zip(values.outer_iter_mut()) {
            let j = t.interval(xq)
                .ok_or_else(|| {
                    let (a, b) = t.domain();
                    BasisError::argument(format!(
                        "quadrature point {xq} lies outside the knot span \
                        [{a}, {b}]"
                    ))
                })?;
            let fns = t.functions_on(j);
            for (l, i) in fns.clone().enumerate() {
                d.iter_mut().for_each(|dk| { *dk = 0.0; });
                d[i + off - j] = 1.0;
                row[l] = deboor_local(&tau, k, &mut d, xq, j, m);
            }
            cols.push(fns);
        }
        Ok(Self { cols, values, ncols: t.num_functions() })
    }

    /// Number of points.
    pub fn nrows(&self) -> usize { self.cols.len() }

    /// Number of functions.
    pub fn ncols(&self) -> usize { self.ncols }

    /// Functions that are non-zero at point `q`, and their values.
    pub fn row(&self, q: usize) -> (Range<usize>, nd::ArrayView1<'_, f64>) {
        let cols = self.cols[q].clone();
        let n = cols.len();
        (cols, self.values.slice(nd::s![q, ..n]))
    }

    /// Return the value of function `i` at point `q`.
    pub fn get(&self, q: usize, i: usize) -> f64 {
        let cols = &self.cols[q];
        if cols.contains(&i) { self.values[[q, i - cols.start]] } else { 0.0 }
    }

    /// Expand to a dense `points × functions` matrix.
    pub fn to_dense(&self) -> nd::Array2<f64> {
        let mut v: nd::Array2<f64> = nd::Array2::zeros((self.nrows(), self.ncols));
        for (q, mut vq) in v.outer_iter_mut().enumerate() {
            let (cols, vals) = self.row(q);
            vq.slice_mut(nd::s![cols]).assign(&vals);
        }
        v
    }

    // Σ_q L[q, i] w_q R[q, j] for two tables on the same points
    pub(crate) fn overlap<A>(&self, w: &nd::Array1<A>, other: &Self)
        -> nd::Array2<A>
    where A: Scalar<Real = f64>
    {
        let mut s: nd::Array2<A> = nd::Array2::zeros((self.ncols, other.ncols));
        for (q, wq) in w.iter().enumerate() {
            let (lcols, lvals) = self.row(q);
            let (rcols, rvals) = other.row(q);
            for (i, li) in lcols.zip(&lvals) {
                let lw = wq.mul_real(*li);
                for (j, rj) in rcols.clone().zip(&rvals) {
                    s[[i, j]] += lw.mul_real(*rj);
                }
            }
        }
        s
    }
}

/// B-spline basis with its quadrature rule and evaluation tables.
#[derive(Clone, Debug, PartialEq)]
pub struct BSpline {
    t: KnotSet,
    x: nd::Array1<f64>,
    w: nd::Array1<f64>,
    table: SplineTable,
    overlap: nd::Array2<f64>,
}

impl BSpline {
    /// Create a new basis with `n` Gauss-Legendre points per knot interval.
    pub fn new(t: KnotSet, n: usize) -> BasisResult<Self> {
        let (x, w) = lgwt(&t, n);
        Self::with_quadrature(t, x, w)
    }

    /// Create a new basis with the minimal number of quadrature points per
    /// knot interval that integrates matrix elements of polynomial operators
    /// of order `k_op` exactly (see [`num_quadrature_points`]).
    pub fn auto(t: KnotSet, k_op: usize) -> BasisResult<Self> {
        let n = num_quadrature_points(t.order(), k_op);
        Self::new(t, n)
    }

    /// Create a new basis with an explicit quadrature rule.
    ///
    /// Returns [`BasisError::Argument`] if any point lies outside the knot
    /// span, and [`BasisError::Length`] if `x` and `w` differ in length.
    pub fn with_quadrature(t: KnotSet, x: nd::Array1<f64>, w: nd::Array1<f64>)
        -> BasisResult<Self>
    {
        LengthError::check(&x, &w)?;
        let table = SplineTable::new(&t, &x, 0)?;
        let overlap = table.overlap(&w, &table);
        log::debug!(
            "B-splines: order {}, {} functions, {} quadrature points",
            t.order(), t.num_functions(), x.len(),
        );
        Ok(Self { t, x, w, table, overlap })
    }

    pub fn knots(&self) -> &KnotSet { &self.t }

    /// Order `k` of the splines.
    pub fn order(&self) -> usize { self.t.order() }

    /// Values of all functions at the quadrature points.
    pub fn table(&self) -> &SplineTable { &self.table }

    /// Overlap matrix `S_ij = ⟨B_i|B_j⟩`.
    pub fn overlap(&self) -> nd::ArrayView2<'_, f64> { self.overlap.view() }

    /// Dense evaluation matrix `V_qi = B_i(x_q)`.
    pub fn evaluation_matrix(&self) -> nd::Array2<f64> { self.table.to_dense() }

    /// Return `⟨B_i|w_f|B_j⟩` for quadrature weights already multiplied by a
    /// function, `w_f[q] = w_q f(x_q)`.
    pub(crate) fn weighted_overlap<A>(&self, wf: &nd::Array1<A>) -> nd::Array2<A>
    where A: Scalar<Real = f64>
    {
        self.table.overlap(wf, &self.table)
    }

    /// Return the matrix `⟨B_i|∂ᵒ B_j⟩` of the `order`-th derivative.
    pub fn derivative_matrix(&self, order: usize) -> BasisResult<nd::Array2<f64>> {
        if order == 0 { return Ok(self.overlap.clone()); }
        let dtable = SplineTable::new(&self.t, &self.x, order)?;
        Ok(self.table.overlap(&self.w, &dtable))
    }
}

impl Basis for BSpline {
    fn kind(&self) -> Kind<'_> { Kind::BSpline(self) }

    fn range(&self) -> Range<usize> { 0..self.t.num_functions() }

    fn domain(&self) -> (f64, f64) { self.t.domain() }

    fn locs(&self) -> nd::Array1<f64> { self.x.clone() }

    fn weights(&self) -> nd::Array1<f64> { self.w.clone() }

    fn evaluate(&self, x: f64, i: usize) -> f64 {
        let nf = self.t.num_functions();
        assert!(i < nf, "function index {i} out of bounds");
        let Some(j) = self.t.interval(x) else { return 0.0; };
        if !self.t.functions_on(j).contains(&i) { return 0.0; }
        let k = self.t.order();
        let mut d: Vec<f64> = vec![0.0; k];
        d[i + self.t.offset() - j] = 1.0;
        deboor_local(&self.t.padded(), k, &mut d, x, j, 0)
    }
}

/// Return `Ok(())` if `a` and `b` share knot sets and quadrature rules, and
/// [`BasisError::Incompatible`] otherwise.
pub fn assert_compatible_bases(a: &BSpline, b: &BSpline) -> BasisResult<()> {
    let same
        = std::ptr::eq(a, b)
        || (a.t == b.t && a.x == b.x && a.w == b.w);
    same.then_some(())
        .ok_or_else(|| BasisError::incompatible(BasisTag::BSpline, BasisTag::BSpline))
}
