//! Gauss-Legendre and Gauss-Lobatto quadrature rules, and their mapping onto
//! (optionally complex-rotated) sub-intervals.
//!
//! ```
//! use radbasis::quadrature::{ gauss_legendre, change_interval };
//!
//! // integrate x³ - x over [0, 2] exactly with two points
//! let (x, w) = gauss_legendre(2);
//! let (x, w) = change_interval(&x, &w, 0.0, 2.0);
//! let integral: f64
//!     = x.iter().zip(&w).map(|(xk, wk)| wk * (xk.powi(3) - xk)).sum();
//! assert!((integral - 2.0).abs() < 1e-12);
//! ```

use std::f64::consts::PI;
use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    error::{ BasisError, BasisResult },
    knots::KnotSet,
    DEF_NEWTON_EPSILON,
    DEF_NEWTON_MAXITERS,
};

/// Linear interpolation `a + t (b - a)`, computed with fused multiply-adds.
///
/// Implemented for real endpoints with a real or complex parameter, and for
/// complex endpoints with a real parameter. Complex cases are split into
/// independent real and imaginary interpolations.
pub trait Lerp<T>: Sized {
    type Output;

    fn lerp(self, b: Self, t: T) -> Self::Output;
}

impl Lerp<f64> for f64 {
    type Output = f64;

    fn lerp(self, b: f64, t: f64) -> f64 {
        t.mul_add(b, (-t).mul_add(self, self))
    }
}

impl Lerp<C64> for f64 {
    type Output = C64;

    fn lerp(self, b: f64, t: C64) -> C64 {
        C64::new(self.lerp(b, t.re), t.im.mul_add(b, -(t.im * self)))
    }
}

impl Lerp<f64> for C64 {
    type Output = C64;

    fn lerp(self, b: C64, t: f64) -> C64 {
        C64::new(self.re.lerp(b.re, t), self.im.lerp(b.im, t))
    }
}

// Legendre polynomial P_n and its derivative via the three-term recurrence
fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 { return (1.0, 0.0); }
    let (mut p0, mut p1) = (1.0, x);
    let (mut dp0, mut dp1) = (0.0, 1.0);
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        let dp2
            = ((2.0 * kf - 1.0) * (p1 + x * dp1) - (kf - 1.0) * dp0) / kf;
        p0 = p1;
        p1 = p2;
        dp0 = dp1;
        dp1 = dp2;
    }
    (p1, dp1)
}

fn newton<F>(mut z: f64, mut step: F) -> f64
where F: FnMut(f64) -> f64
{
    for _ in 0..DEF_NEWTON_MAXITERS {
        let dz = step(z);
        z -= dz;
        if dz.abs() <= DEF_NEWTON_EPSILON { break; }
    }
    z
}

/// Compute the `n`-point Gauss-Legendre rule on `[-1, 1]`, with nodes in
/// ascending order.
///
/// The rule integrates polynomials of degree `2n - 1` exactly. `n = 0` gives
/// an empty rule.
pub fn gauss_legendre(n: usize) -> (nd::Array1<f64>, nd::Array1<f64>) {
    let mut x: nd::Array1<f64> = nd::Array1::zeros(n);
    let mut w: nd::Array1<f64> = nd::Array1::zeros(n);
    for i in 0..(n + 1) / 2 {
        let z0 = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let z = newton(z0, |z| {
            let (p, dp) = legendre_and_derivative(n, z);
            p / dp
        });
        let (_, dp) = legendre_and_derivative(n, z);
        let wi = 2.0 / ((1.0 - z * z) * dp * dp);
        x[i] = -z;
        x[n - 1 - i] = z;
        w[i] = wi;
        w[n - 1 - i] = wi;
    }
    // odd rules have an exact zero at the center
    if n % 2 == 1 { x[n / 2] = 0.0; }
    (x, w)
}

/// Compute the `n`-point Gauss-Lobatto rule on `[-1, 1]`, with nodes in
/// ascending order and including both endpoints.
///
/// The rule integrates polynomials of degree `2n - 3` exactly.
///
/// *Panics if `n < 2`*.
pub fn gauss_lobatto(n: usize) -> (nd::Array1<f64>, nd::Array1<f64>) {
    assert!(n >= 2, "Gauss-Lobatto rules need at least two points; got {n}");
    let m = n - 1;
    let mf = m as f64;
    let edge = 2.0 / (n as f64 * mf);
    let mut x: nd::Array1<f64> = nd::Array1::zeros(n);
    let mut w: nd::Array1<f64> = nd::Array1::from_elem(n, edge);
    x[0] = -1.0;
    x[m] = 1.0;
    // interior nodes are the roots of P'_m
    for i in 1..=(m / 2) {
        let z0 = (PI * i as f64 / mf).cos();
        let z = newton(z0, |z| {
            let (p, dp) = legendre_and_derivative(m, z);
            let ddp = (2.0 * z * dp - mf * (mf + 1.0) * p) / (1.0 - z * z);
            dp / ddp
        });
        let (p, _) = legendre_and_derivative(m, z);
        let wi = edge / (p * p);
        x[i] = -z;
        x[m - i] = z;
        w[i] = wi;
        w[m - i] = wi;
    }
    if n % 2 == 1 {
        let (p, _) = legendre_and_derivative(m, 0.0);
        x[n / 2] = 0.0;
        w[n / 2] = edge / (p * p);
    }
    (x, w)
}

/// Map a reference rule `(x, w)` on `[-1, 1]` to the interval `[a, b]`.
pub fn change_interval<S, T>(x: &Arr1<S>, w: &Arr1<T>, a: f64, b: f64)
    -> (nd::Array1<f64>, nd::Array1<f64>)
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    let xs = x.mapv(|xk| a.lerp(b, (xk + 1.0) / 2.0));
    let ws = w.mapv(|wk| (b - a) / 2.0 * wk);
    (xs, ws)
}

fn check_rotation(gamma: C64) -> BasisResult<()> {
    ((gamma.norm() - 1.0).abs() < 1e-12).then_some(())
        .ok_or_else(|| {
            BasisError::argument(format!(
                "complex rotation factors must have unit magnitude; got {gamma}"
            ))
        })
}

/// Like [`change_interval`], but additionally rotate the node positions about
/// the origin into the complex plane by the unit-magnitude factor `gamma`,
/// i.e. `x → γ x`. Rotate about another point `c` by shifting the interval to
/// `[a - c, b - c]` and adding `c` back to the nodes.
///
/// Weights are scaled to `[a, b]` but left real and unrotated. Returns
/// [`BasisError::Argument`] if `|γ| ≠ 1`.
pub fn change_interval_rotated<S, T>(
    x: &Arr1<S>,
    w: &Arr1<T>,
    a: f64,
    b: f64,
    gamma: C64,
) -> BasisResult<(nd::Array1<C64>, nd::Array1<f64>)>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    check_rotation(gamma)?;
    let xs = x.mapv(|xk| gamma * a.lerp(b, (xk + 1.0) / 2.0));
    let ws = w.mapv(|wk| (b - a) / 2.0 * wk);
    Ok((xs, ws))
}

/// Return the minimal number of Gauss-Legendre points `N` needed to integrate
/// the product of two order-`k` polynomials with an order-`k_op` operator
/// exactly, i.e. the smallest `N` with `2N - 1 ≥ 2(k - 1) + k_op`.
pub fn num_quadrature_points(k: usize, k_op: usize) -> usize {
    let m = 2 * k.saturating_sub(1) + k_op + 1;
    (m >> 1) + (m & 1)
}

/// Place `n` Gauss-Legendre points in every interval of a knot set,
/// concatenating them into a single rule spanning the whole set.
///
/// A warning is logged if the rule cannot integrate the overlap of two
/// basis functions exactly; the rule is still returned.
pub fn lgwt(t: &KnotSet, n: usize) -> (nd::Array1<f64>, nd::Array1<f64>) {
    let k = t.order();
    if 2 * n < 2 * k - 1 {
        log::warn!(
            "lgwt: {n} points per interval cannot integrate overlaps of \
            order-{k} splines exactly; need at least {}",
            num_quadrature_points(k, 0),
        );
    }
    if n == 0 { return (nd::Array1::zeros(0), nd::Array1::zeros(0)); }
    let (x, w) = gauss_legendre(n);
    let bp = t.breakpoints();
    let m = t.num_intervals();
    let mut xs: nd::Array1<f64> = nd::Array1::zeros(m * n);
    let mut ws: nd::Array1<f64> = nd::Array1::zeros(m * n);
    let chunks
        = bp.iter().zip(bp.iter().skip(1))
        .zip(xs.exact_chunks_mut(n).into_iter()
            .zip(ws.exact_chunks_mut(n)));
    for ((&a, &b), (mut xj, mut wj)) in chunks {
        let (xi, wi) = change_interval(&x, &w, a, b);
        xj.assign(&xi);
        wj.assign(&wi);
    }
    (xs, ws)
}

/// Compute a Gauss-Lobatto grid of `order` points for a single finite element
/// `[a, b]`, with node positions rotated into the complex plane about `c` by
/// the unit-magnitude factor `gamma`, i.e. `x → c + γ (x - c)`.
///
/// This is the element grid used for exterior complex scaling, where `c` is
/// the scaling radius. Weights are returned real and unrotated.
///
/// Returns [`BasisError::Argument`] if `order < 2` or `|γ| ≠ 1`.
pub fn element_grid(order: usize, a: f64, b: f64, c: f64, gamma: C64)
    -> BasisResult<(nd::Array1<C64>, nd::Array1<f64>)>
{
    if order < 2 {
        return Err(BasisError::argument(format!(
            "element grids need at least 2 Gauss-Lobatto points; got {order}"
        )));
    }
    let (x, w) = gauss_lobatto(order);
    let (xs, ws) = change_interval_rotated(&x, &w, a - c, b - c, gamma)?;
    Ok((xs.mapv_into(|z| z + c), ws))
}

/// Real-valued Gauss-Lobatto element grid on `[a, b]`.
///
/// *Panics if `order < 2`*.
pub fn element_grid_real(order: usize, a: f64, b: f64)
    -> (nd::Array1<f64>, nd::Array1<f64>)
{
    let (x, w) = gauss_lobatto(order);
    change_interval(&x, &w, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn integrate<F>(x: &nd::Array1<f64>, w: &nd::Array1<f64>, f: F) -> f64
    where F: Fn(f64) -> f64
    {
        x.iter().zip(w).map(|(xk, wk)| wk * f(*xk)).sum()
    }

    // ∫_{-1}^{1} x^p dx
    fn monomial(p: i32) -> f64 {
        if p % 2 == 1 { 0.0 } else { 2.0 / (p as f64 + 1.0) }
    }

    #[test]
    fn legendre_is_exact_to_degree() {
        for n in 1..=12 {
            let (x, w) = gauss_legendre(n);
            assert!(x.iter().zip(x.iter().skip(1)).all(|(l, r)| l < r));
            for p in 0..(2 * n as i32) {
                assert_abs_diff_eq!(
                    integrate(&x, &w, |xk| xk.powi(p)), monomial(p),
                    epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn lobatto_includes_endpoints_and_is_exact() {
        for n in 2..=12 {
            let (x, w) = gauss_lobatto(n);
            assert_eq!(x[0], -1.0);
            assert_eq!(x[n - 1], 1.0);
            assert!(x.iter().zip(x.iter().skip(1)).all(|(l, r)| l < r));
            for p in 0..(2 * n as i32 - 2) {
                assert_abs_diff_eq!(
                    integrate(&x, &w, |xk| xk.powi(p)), monomial(p),
                    epsilon = 1e-13);
            }
        }
    }

    #[test]
    fn quadrature_point_count_is_minimal() {
        for k in 1..=10 {
            for k_op in 0..=4 {
                let n = num_quadrature_points(k, k_op);
                let m = 2 * (k - 1) + k_op;
                assert!(2 * n - 1 >= m);
                assert!(n == 1 || 2 * (n - 1) - 1 < m);
            }
        }
        assert_eq!(num_quadrature_points(4, 0), 4);
        assert_eq!(num_quadrature_points(7, 3), 8);
    }

    #[test]
    fn lerp_variants() {
        assert_eq!(1.0_f64.lerp(3.0, 0.0), 1.0);
        assert_eq!(1.0_f64.lerp(3.0, 1.0), 3.0);
        assert_abs_diff_eq!(1.0_f64.lerp(3.0, 0.25), 1.5, epsilon = 1e-15);

        let z = 1.0_f64.lerp(3.0, C64::new(0.5, 0.5));
        assert_abs_diff_eq!(z.re, 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(z.im, 1.0, epsilon = 1e-15);

        let z = C64::new(0.0, 1.0).lerp(C64::new(2.0, -1.0), 0.5);
        assert_abs_diff_eq!(z.re, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(z.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn rotated_interval() {
        let (x, w) = gauss_legendre(5);
        let gamma = C64::from_polar(1.0, 0.3);
        let (xs, ws) = change_interval_rotated(&x, &w, 1.0, 3.0, gamma)
            .unwrap();
        let (xr, wr) = change_interval(&x, &w, 1.0, 3.0);
        for ((xsk, xrk), (wsk, wrk)) in xs.iter().zip(&xr).zip(ws.iter().zip(&wr)) {
            let expected = gamma * xrk;
            assert_abs_diff_eq!(xsk.re, expected.re, epsilon = 1e-14);
            assert_abs_diff_eq!(xsk.im, expected.im, epsilon = 1e-14);
            assert_eq!(wsk, wrk);
        }
        assert!(
            change_interval_rotated(&x, &w, 0.0, 1.0, C64::new(2.0, 0.0))
                .is_err()
        );
    }

    #[test]
    fn element_grid_rotates_about_origin_offset() {
        let gamma = C64::from_polar(1.0, 0.5);
        let (x, w) = element_grid(6, 2.0, 4.0, 2.0, gamma).unwrap();
        assert_abs_diff_eq!(x[0].re, 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(x[0].im, 0.0, epsilon = 1e-14);
        let end = 2.0 + gamma * 2.0;
        assert_abs_diff_eq!(x[5].re, end.re, epsilon = 1e-14);
        assert_abs_diff_eq!(x[5].im, end.im, epsilon = 1e-14);
        assert_abs_diff_eq!(w.sum(), 2.0, epsilon = 1e-14);

        let (xr, _) = element_grid_real(6, 2.0, 4.0);
        let (xu, _) = element_grid(6, 2.0, 4.0, 0.0, C64::new(1.0, 0.0))
            .unwrap();
        for (a, b) in xr.iter().zip(&xu) {
            assert_abs_diff_eq!(*a, b.re, epsilon = 1e-14);
            assert_eq!(b.im, 0.0);
        }
    }

    #[test]
    fn element_grid_is_shifted_rotated_interval() {
        let gamma = C64::from_polar(1.0, 0.3);
        let c = 8.0;
        let (x, w) = element_grid(4, 10.0, 12.0, c, gamma).unwrap();
        let (xl, wl) = gauss_lobatto(4);
        let (xs, ws) = change_interval_rotated(&xl, &wl, 10.0 - c, 12.0 - c, gamma)
            .unwrap();
        for (z, zs) in x.iter().zip(&xs) {
            let expected = zs + c;
            assert_abs_diff_eq!(z.re, expected.re, epsilon = 1e-14);
            assert_abs_diff_eq!(z.im, expected.im, epsilon = 1e-14);
        }
        assert_eq!(w, ws);
        // element starting past the scaling radius is already off the real axis
        assert!(x[0].im > 0.0);
        assert_abs_diff_eq!((x[0] - c).arg(), 0.3, epsilon = 1e-14);
    }

    #[test]
    fn element_grid_rejects_short_orders() {
        let gamma = C64::from_polar(1.0, 0.3);
        for order in [0, 1] {
            assert!(matches!(
                element_grid(order, 0.0, 1.0, 0.0, gamma),
                Err(BasisError::Argument(_))
            ));
        }
        assert!(element_grid(2, 0.0, 1.0, 0.0, gamma).is_ok());
    }

    #[test]
    fn lgwt_spans_knot_set() {
        let _ = env_logger::builder().is_test(true).try_init();
        let t = KnotSet::linear(4, 0.0, 3.0, 6).unwrap();
        let (x, w) = lgwt(&t, 4);
        assert_eq!(x.len(), 24);
        assert_abs_diff_eq!(w.sum(), 3.0, epsilon = 1e-13);
        assert!(x.iter().zip(x.iter().skip(1)).all(|(l, r)| l < r));
        // too few points: warns, but still integrates constants
        let (x, w) = lgwt(&t, 2);
        assert_eq!(x.len(), 12);
        assert_abs_diff_eq!(w.sum(), 3.0, epsilon = 1e-13);
    }
}
