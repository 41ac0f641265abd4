//! Finite differences on a staggered, possibly non-uniform radial grid.
//!
//! Nodes `r_1 < r_2 < ... < r_N` start half a step from the origin, where the
//! function is required to vanish. The three-point stencil of the radial second
//! derivative is derived variationally, which gives per-node coefficients
//! `α_j, β_j, δ_j` for the forward, central and backward neighbours:
//! ```text
//! u''(r_j) ≈ [α_j u_{j+1} / h⁺_j + δ_j u_{j-1} / h⁻_j - 2 β_j u_j / h̄_j] / h̄_j
//! ```
//! (with `h̄_j = (h⁺_j + h⁻_j) / 2`, and `h⁺ = h⁻ = h̄` on uniform grids). The
//! central coefficient of the first node carries an additional correction
//! `δβ₁` that restores the accuracy of the Coulomb ground state for charge `Z`.
//!
//! The basis functions are tents scaled by `1/√h̄_j`, which makes them
//! orthonormal under the lumped inner product.

use std::ops::Range;
use ndarray as nd;
use crate::{
    basis::{ Basis, Kind },
    error::{ BasisError, BasisResult, DomainError },
    utils::array_diff,
};

/// Default boundary correction `Zρ/8 · (1 + Zρ)` for first-node spacing `ρ`.
pub fn default_boundary_correction(Z: f64, rho: f64) -> f64 {
    Z * rho / 8.0 * (1.0 + Z * rho)
}

/// Generate a grid that is linear near the origin with spacing `rho_min` and
/// tends to spacing `rho_max` far from it, on the length scale `1/alpha`:
/// ```text
/// r_1 = ρmin / 2
/// r_j = r_{j-1} + ρmin + (1 - exp(-α r_{j-1})) (ρmax - ρmin)
/// ```
/// All nodes are strictly less than `rmax`.
///
/// Returns [`BasisError::Domain`] if any parameter is non-positive or
/// infinite, and [`BasisError::Argument`] if no node is less than `rmax`.
pub fn log_lin_grid(rho_min: f64, rho_max: f64, alpha: f64, rmax: f64)
    -> BasisResult<nd::Array1<f64>>
{
    DomainError::check("rho_min", rho_min)?;
    DomainError::check("rho_max", rho_max)?;
    DomainError::check("alpha", alpha)?;
    DomainError::check("rmax", rmax)?;
    let next = |r: f64| {
        r + rho_min + (1.0 - (-alpha * r).exp()) * (rho_max - rho_min)
    };
    let mut r: nd::Array1<f64> = nd::Array1::zeros(100);
    r[0] = rho_min / 2.0;
    let mut filled: usize = 1;
    loop {
        let n = r.len();
        for j in filled..n { r[j] = next(r[j - 1]); }
        filled = n;
        if r[n - 1] >= rmax { break; }
        r = nd::concatenate![nd::Axis(0), r, nd::Array1::zeros(n)];
    }
    let m = r.iter().position(|rj| *rj >= rmax).unwrap_or(r.len());
    if m == 0 {
        return Err(BasisError::argument(format!(
            "log-linear grid with rho_min = {rho_min} has no nodes below \
            rmax = {rmax}"
        )));
    }
    r.slice_collapse(nd::s![..m]);
    Ok(r)
}

#[derive(Copy, Clone, Debug)]
struct Window(f64, f64, f64);

impl Window {
    fn push(&mut self, val: f64) { self.0 = self.1; self.1 = self.2; self.2 = val; }
}

/// Staggered finite-difference grid with Dirichlet conditions at `r = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredFiniteDifferences {
    r: nd::Array1<f64>,
    Z: f64,
    dbeta1: f64,
    alpha: nd::Array1<f64>,
    beta: nd::Array1<f64>,
    delta: nd::Array1<f64>,
    hp: nd::Array1<f64>,
    hm: nd::Array1<f64>,
    hbar: nd::Array1<f64>,
}

impl StaggeredFiniteDifferences {
    /// Create a uniform grid of `n` nodes `r_j = (j - 1/2) ρ` for charge `Z`,
    /// using the closed-form stencil
    /// ```text
    /// α_j = j² / (j² - 1/4)
    /// β_j = (j² - j + 1/2) / (j² - j + 1/4)
    /// δ_j = α_{j-1}, δ_1 = 0
    /// ```
    ///
    /// If `dbeta1` is `None`, [`default_boundary_correction`] is used.
    pub fn uniform(n: usize, rho: f64, Z: f64, dbeta1: Option<f64>)
        -> BasisResult<Self>
    {
        DomainError::check("rho", rho)?;
        if n == 0 {
            return Err(BasisError::argument("staggered grids need at least one node"));
        }
        let r: nd::Array1<f64>
            = (1..=n).map(|j| (j as f64 - 0.5) * rho).collect();
        let alpha: nd::Array1<f64>
            = (1..=n).map(|j| { let j2 = (j * j) as f64; j2 / (j2 - 0.25) })
            .collect();
        let mut beta: nd::Array1<f64>
            = (1..=n)
            .map(|j| {
                let jj = (j * j - j) as f64;
                (jj + 0.5) / (jj + 0.25)
            })
            .collect();
        let delta: nd::Array1<f64>
            = std::iter::once(0.0)
            .chain(alpha.iter().take(n - 1).copied())
            .collect();
        let dbeta1 = dbeta1.unwrap_or_else(|| default_boundary_correction(Z, rho));
        beta[0] += dbeta1;
        let h = nd::Array1::from_elem(n, rho);
        log::debug!(
            "staggered finite differences (uniform): {n} nodes, rho = {rho}, \
            Z = {Z}, dbeta1 = {dbeta1}"
        );
        Ok(Self {
            r, Z, dbeta1, alpha, beta, delta,
            hp: h.clone(), hm: h.clone(), hbar: h,
        })
    }

    /// Create a grid on arbitrary nodes `r` for charge `Z`.
    ///
    /// The stencil is derived from a sliding window over the nodes, with the
    /// mirror node `r_0 = -r_1` on the left and the extrapolated node
    /// `r_{N+1} = 2 r_N - r_{N-1}` on the right. With midpoints
    /// `m_j = (r_j + r_{j+1}) / 2`,
    /// ```text
    /// α_j = m_j² / (r_j r_{j+1})
    /// δ_j = m_{j-1}² / (r_j r_{j-1})
    /// β_j = h̄_j (m_j² / h⁺_j + m_{j-1}² / h⁻_j) / (2 r_j²)
    /// ```
    /// which reproduces [`Self::uniform`] on uniform grids. If `dbeta1` is
    /// `None`, [`default_boundary_correction`] is used with `ρ = 2 r_1`.
    ///
    /// Returns [`BasisError::Argument`] if there are fewer than two nodes, or
    /// the nodes are not positive, finite and strictly increasing.
    pub fn new(r: nd::Array1<f64>, Z: f64, dbeta1: Option<f64>)
        -> BasisResult<Self>
    {
        let n = r.len();
        if n < 2 {
            return Err(BasisError::argument(format!(
                "non-uniform staggered grids need at least two nodes; got {n}"
            )));
        }
        if r[0] <= 0.0
            || r.iter().any(|rj| !rj.is_finite())
            || array_diff(&r).iter().any(|h| *h <= 0.0)
        {
            return Err(BasisError::argument(
                "staggered grid nodes must be positive, finite, and strictly \
                increasing"
            ));
        }
        let mut alpha: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut beta: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut delta: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut hp: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut hm: nd::Array1<f64> = nd::Array1::zeros(n);
        let mut hbar: nd::Array1<f64> = nd::Array1::zeros(n);
        let rext = 2.0 * r[n - 1] - r[n - 2];
        let mut win = Window(-r[0], r[0], r[1]);
        let nexts = r.iter().skip(2).copied().chain(std::iter::once(rext));
        for (j, rnext) in nexts.map(Some).chain(std::iter::once(None)).enumerate() {
            let Window(rm, rj, rp) = win;
            let h_p = rp - rj;
            let h_m = rj - rm;
            let h_bar = (h_p + h_m) / 2.0;
            let m_p = (rj + rp) / 2.0;
            let m_m = if j == 0 { 0.0 } else { (rj + rm) / 2.0 };
            alpha[j] = m_p.powi(2) / (rj * rp);
            delta[j] = if j == 0 { 0.0 } else { m_m.powi(2) / (rj * rm) };
            beta[j]
                = h_bar * (m_p.powi(2) / h_p + m_m.powi(2) / h_m)
                / (2.0 * rj.powi(2));
            hp[j] = h_p;
            hm[j] = h_m;
            hbar[j] = h_bar;
            if let Some(rn) = rnext { win.push(rn); }
        }
        let dbeta1
            = dbeta1.unwrap_or_else(|| default_boundary_correction(Z, 2.0 * r[0]));
        beta[0] += dbeta1;
        log::debug!(
            "staggered finite differences: {n} nodes on [{}, {}], Z = {Z}, \
            dbeta1 = {dbeta1}",
            r[0], r[n - 1],
        );
        Ok(Self { r, Z, dbeta1, alpha, beta, delta, hp, hm, hbar })
    }

    /// Create a grid on the nodes of [`log_lin_grid`].
    pub fn log_lin(
        rho_min: f64,
        rho_max: f64,
        alpha: f64,
        rmax: f64,
        Z: f64,
        dbeta1: Option<f64>,
    ) -> BasisResult<Self>
    {
        let r = log_lin_grid(rho_min, rho_max, alpha, rmax)?;
        if r.len() < 2 {
            Self::uniform(1, rho_min, Z, dbeta1)
        } else {
            Self::new(r, Z, dbeta1)
        }
    }

    pub fn nodes(&self) -> nd::ArrayView1<'_, f64> { self.r.view() }

    /// Nuclear charge.
    pub fn charge(&self) -> f64 { self.Z }

    /// Correction `δβ₁` applied to the first central coefficient.
    pub fn boundary_correction(&self) -> f64 { self.dbeta1 }

    /// Forward stencil coefficients `α_j`.
    pub fn alpha(&self) -> nd::ArrayView1<'_, f64> { self.alpha.view() }

    /// Central stencil coefficients `β_j`, including `δβ₁`.
    pub fn beta(&self) -> nd::ArrayView1<'_, f64> { self.beta.view() }

    /// Backward stencil coefficients `δ_j`.
    pub fn delta(&self) -> nd::ArrayView1<'_, f64> { self.delta.view() }

    /// Average spacings `h̄_j`.
    pub fn spacings(&self) -> nd::ArrayView1<'_, f64> { self.hbar.view() }

    // the node past the end of the grid
    fn rext(&self) -> f64 {
        let n = self.r.len();
        self.r[n - 1] + self.hp[n - 1]
    }

    pub(crate) fn mass_diagonal(&self) -> nd::Array1<f64> {
        self.hbar.iter().zip(self.weights())
            .map(|(h, w)| h * w * w)
            .collect()
    }

    /// Return the radial second derivative in coefficient space.
    ///
    /// The node-space stencil `L` is transformed by the function weights `W`
    /// as `W⁻¹ L W`, which is symmetric.
    pub fn laplacian(&self) -> nd::Array2<f64> {
        let n = self.r.len();
        let w = self.weights();
        let mut lap: nd::Array2<f64> = nd::Array2::zeros((n, n));
        for j in 0..n {
            lap[[j, j]] = -2.0 * self.beta[j] / self.hbar[j].powi(2);
            if j + 1 < n {
                lap[[j, j + 1]]
                    = self.alpha[j] / (self.hp[j] * self.hbar[j])
                    * w[j + 1] / w[j];
            }
            if j > 0 {
                lap[[j, j - 1]]
                    = self.delta[j] / (self.hm[j] * self.hbar[j])
                    * w[j - 1] / w[j];
            }
        }
        lap
    }
}

impl Basis for StaggeredFiniteDifferences {
    fn kind(&self) -> Kind<'_> { Kind::Staggered(self) }

    fn range(&self) -> Range<usize> { 1..self.r.len() + 1 }

    fn domain(&self) -> (f64, f64) { (0.0, self.rext()) }

    fn locs(&self) -> nd::Array1<f64> { self.r.clone() }

    fn weights(&self) -> nd::Array1<f64> {
        self.hbar.mapv(|h| h.sqrt().recip())
    }

    fn inverse_weights(&self) -> nd::Array1<f64> {
        self.hbar.mapv(f64::sqrt)
    }

    fn evaluate(&self, x: f64, i: usize) -> f64 {
        let n = self.r.len();
        assert!(i < n, "function index {i} out of bounds");
        let ri = self.r[i];
        let left = if i == 0 { 0.0 } else { self.r[i - 1] };
        let right = if i == n - 1 { self.rext() } else { self.r[i + 1] };
        let tent
            = if !(left..=right).contains(&x) {
                0.0
            } else if x <= ri {
                (x - left) / (ri - left)
            } else {
                (right - x) / (right - ri)
            };
        tent / self.hbar[i].sqrt()
    }
}
