//! Mass matrices, quasi-diagonal operators, and interpolation.
//!
//! Every function here takes a left and/or right basis and dispatches on their
//! [`Kind`]s. Both must be views of the same discretization (see
//! [`Kind::compatible`]); rows and columns of the returned matrices are then
//! indexed by the local function indices of the left and right bases.
//!
//! For the nodal bases (all finite-difference variants and FEDVR) functions
//! with different global indices do not overlap, so a multiplicative operator
//! `f(x)` is diagonal in the global index:
//! ```text
//! ⟨φ_i|f|φ_j⟩ = δ_ij m_i f(x_i)
//! ```
//! where `m_i` is the lumped mass of function `i` (`Δx` on uniform grids and 1
//! otherwise). For B-splines, `f` is folded into the quadrature weights before
//! computing the banded overlap of the spline tables.
//!
//! ```
//! use radbasis::{ Basis, FiniteDifferences, ops };
//!
//! let fd = FiniteDifferences::new(1..11, 0.1).unwrap();
//! let inner = fd.restrict(1..9).unwrap();
//! let m = ops::mass_matrix(&fd, &inner).unwrap();
//! assert_eq!(m.dim(), (10, 8));
//! assert_eq!(m[[1, 0]], 0.1);
//! assert_eq!(m[[0, 0]], 0.0);
//! ```

use ndarray as nd;
use ndarray_linalg::{ Lapack, LeastSquaresSvd, Scalar };
use crate::{
    Arr1,
    basis::{ Basis, Kind },
    error::{ BasisError, BasisResult, LengthError },
};

// ⟨φ_i|f|φ_j⟩ for compatible bases
fn quasi_diagonal<L, R, A, F>(l: &L, f: F, r: &R) -> BasisResult<nd::Array2<A>>
where
    L: Basis + ?Sized,
    R: Basis + ?Sized,
    A: Scalar<Real = f64>,
    F: Fn(f64) -> A,
{
    let (kl, kr) = (l.kind(), r.kind());
    kl.check_compatible(&kr)?;
    let (rl, rr) = (l.range(), r.range());
    match kl {
        Kind::BSpline(b) => {
            let wf: nd::Array1<A>
                = b.locs().iter().zip(&b.weights())
                .map(|(x, w)| f(*x).mul_real(*w))
                .collect();
            let full = b.weighted_overlap(&wf);
            Ok(full.slice(nd::s![rl, rr]).to_owned())
        },
        nodal => {
            let full = nodal.full();
            let p0 = full.range().start;
            let locs = full.locs();
            let mass = nodal.mass_diagonal();
            let mut m: nd::Array2<A> = nd::Array2::zeros((rl.len(), rr.len()));
            let lo = rl.start.max(rr.start);
            let hi = rl.end.min(rr.end);
            for g in lo..hi {
                m[[g - rl.start, g - rr.start]]
                    = f(locs[g - p0]).mul_real(mass[g - p0]);
            }
            Ok(m)
        },
    }
}

/// Compute the mass (overlap) matrix `⟨φ_i|φ_j⟩` between two bases.
///
/// Returns [`BasisError::Incompatible`] if the bases do not share a
/// discretization.
pub fn mass_matrix<L, R>(l: &L, r: &R) -> BasisResult<nd::Array2<f64>>
where
    L: Basis + ?Sized,
    R: Basis + ?Sized,
{
    match (l.kind(), r.kind()) {
        (Kind::BSpline(b), kr) => {
            l.kind().check_compatible(&kr)?;
            Ok(b.overlap().slice(nd::s![l.range(), r.range()]).to_owned())
        },
        _ => quasi_diagonal(l, |_| 1.0, r),
    }
}

/// Compute the matrix elements `⟨φ_i|f|φ_j⟩` of the multiplicative operator
/// `f(x)` between two bases.
///
/// Returns [`BasisError::Incompatible`] if the bases do not share a
/// discretization.
pub fn operator_matrix<L, R, A, F>(l: &L, f: F, r: &R)
    -> BasisResult<nd::Array2<A>>
where
    L: Basis + ?Sized,
    R: Basis + ?Sized,
    A: Scalar<Real = f64>,
    F: Fn(f64) -> A,
{
    quasi_diagonal(l, f, r)
}

/// Compute the matrix elements `⟨φ_i|f g|φ_j⟩` of the product of two
/// multiplicative operators between two bases.
///
/// Returns [`BasisError::Incompatible`] if the bases do not share a
/// discretization.
pub fn operator_product_matrix<L, R, A, F, G>(l: &L, f: F, g: G, r: &R)
    -> BasisResult<nd::Array2<A>>
where
    L: Basis + ?Sized,
    R: Basis + ?Sized,
    A: Scalar<Real = f64>,
    F: Fn(f64) -> A,
    G: Fn(f64) -> A,
{
    quasi_diagonal(l, |x| f(x) * g(x), r)
}

/// Compute the expansion coefficients of `f` in a basis.
///
/// For nodal bases these are `f(x_i) / w_i`. For B-splines, `f` is sampled at
/// the quadrature points and the coefficients are the least-squares solution of
/// `V c = f(x)`, with `V` the evaluation matrix of the (possibly restricted)
/// basis.
pub fn interpolate<B, A, F>(b: &B, f: F) -> BasisResult<nd::Array1<A>>
where
    B: Basis + ?Sized,
    A: Scalar<Real = f64> + Lapack,
    F: Fn(f64) -> A,
{
    match b.kind() {
        Kind::BSpline(bs) => {
            let v: nd::Array2<A>
                = bs.evaluation_matrix()
                .slice(nd::s![.., b.range()])
                .mapv(A::from_real);
            let fx: nd::Array1<A> = bs.locs().mapv(&f);
            Ok(v.least_squares(&fx)?.solution)
        },
        _ => {
            let c: nd::Array1<A>
                = b.locs().iter().zip(&b.inverse_weights())
                .map(|(x, iw)| f(*x).mul_real(*iw))
                .collect();
            Ok(c)
        },
    }
}

/// Like [`interpolate`], for a function known only on `domain`.
///
/// Returns [`BasisError::Argument`] unless `domain` covers the domain of the
/// basis.
pub fn interpolate_on<B, A, F>(b: &B, domain: (f64, f64), f: F)
    -> BasisResult<nd::Array1<A>>
where
    B: Basis + ?Sized,
    A: Scalar<Real = f64> + Lapack,
    F: Fn(f64) -> A,
{
    let (a, z) = b.domain();
    if domain.0 > a || domain.1 < z {
        return Err(BasisError::argument(format!(
            "function domain [{}, {}] does not cover the basis domain \
            [{a}, {z}]",
            domain.0, domain.1,
        )));
    }
    interpolate(b, f)
}

/// Evaluate the expansion `Σ_i c_i φ_i` at each point of `x`.
///
/// Returns [`BasisError::Length`] if `c` does not have one coefficient per
/// function.
pub fn evaluate_expansion<B, S, T, A>(b: &B, c: &Arr1<S>, x: &Arr1<T>)
    -> BasisResult<nd::Array1<A>>
where
    B: Basis + ?Sized,
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = f64>,
    A: Scalar<Real = f64>,
{
    LengthError::check_len(b.len(), c.len())?;
    let values: nd::Array1<A>
        = x.iter()
        .map(|xk| {
            c.iter().enumerate()
                .fold(A::zero(), |acc, (i, ci)| {
                    acc + ci.mul_real(b.evaluate(*xk, i))
                })
        })
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64 as C64;
    use crate::{
        basis::BasisTag,
        bspline::BSpline,
        fd::FiniteDifferences,
        fedvr::FEDVR,
        knots::KnotSet,
        staggered::StaggeredFiniteDifferences,
    };

    #[test]
    fn uniform_mass_is_scaled_identity() {
        let dx = 0.037;
        let fd = FiniteDifferences::radial(50, dx).unwrap();
        let m = mass_matrix(&fd, &fd).unwrap();
        for ((i, j), mij) in m.indexed_iter() {
            let expected = if i == j { dx } else { 0.0 };
            assert_abs_diff_eq!(*mij, expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn nodal_operators_are_diagonal_in_global_index() {
        let s = StaggeredFiniteDifferences::uniform(8, 0.25, 1.0, None).unwrap();
        let left = s.restrict(0..5).unwrap();
        let right = s.restrict(2..8).unwrap();
        let v = operator_matrix(&left, |r| -1.0 / r, &right).unwrap();
        assert_eq!(v.dim(), (5, 6));
        let r = s.locs();
        for ((i, j), vij) in v.indexed_iter() {
            if i == j + 2 {
                assert_abs_diff_eq!(*vij, -1.0 / r[i], epsilon = 1e-14);
            } else {
                assert_eq!(*vij, 0.0);
            }
        }
        let vv = operator_product_matrix(&s, |r| r, |r| r, &s).unwrap();
        for k in 0..8 {
            assert_abs_diff_eq!(vv[[k, k]], r[k] * r[k], epsilon = 1e-14);
        }
    }

    #[test]
    fn complex_operator() {
        let b = FEDVR::linear(0.0, 2.0, 2, 5).unwrap();
        let v = operator_matrix(&b, |x| C64::new(0.0, x), &b).unwrap();
        let x = b.locs();
        for k in 0..b.len() {
            assert_eq!(v[[k, k]].re, 0.0);
            assert_abs_diff_eq!(v[[k, k]].im, x[k], epsilon = 1e-15);
        }
    }

    #[test]
    fn bspline_operators() {
        let t = KnotSet::linear(5, 0.0, 2.0, 6).unwrap();
        let b = BSpline::auto(t, 2).unwrap();
        let s = mass_matrix(&b, &b).unwrap();
        let s1 = operator_matrix(&b, |_| 1.0, &b).unwrap();
        for (a, e) in s.iter().zip(&s1) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-15);
        }
        // ⟨1|x²|1⟩ = 8/3
        let ones = nd::Array1::ones(b.len());
        let x2 = operator_product_matrix(&b, |x| x, |x| x, &b).unwrap();
        assert_abs_diff_eq!(ones.dot(&x2.dot(&ones)), 8.0 / 3.0, epsilon = 1e-13);

        let inner = b.restrict(1..b.len() - 1).unwrap();
        let si = mass_matrix(&inner, &b).unwrap();
        assert_eq!(si.dim(), (b.len() - 2, b.len()));
        assert_eq!(si.row(0), s.row(1));
    }

    #[test]
    fn incompatible_bases() {
        let a = FiniteDifferences::radial(10, 0.1).unwrap();
        let b = FiniteDifferences::radial(10, 0.11).unwrap();
        assert!(matches!(
            mass_matrix(&a, &b),
            Err(BasisError::Incompatible {
                left: BasisTag::FiniteDifferences,
                right: BasisTag::FiniteDifferences,
            })
        ));
        let t = KnotSet::linear(3, 0.0, 1.0, 4).unwrap();
        let s = BSpline::new(t.clone(), 3).unwrap();
        assert!(matches!(
            mass_matrix(&s, &a),
            Err(BasisError::Incompatible { left: BasisTag::BSpline, .. })
        ));
        let s4 = BSpline::new(t, 4).unwrap();
        assert!(matches!(
            operator_matrix(&s, |x| x, &s4),
            Err(BasisError::Incompatible { .. })
        ));
    }

    #[test]
    fn interpolation_round_trip() {
        let fd = FiniteDifferences::radial(20, 0.05).unwrap();
        let stag = StaggeredFiniteDifferences::new(
            nd::Array1::linspace(0.1, 2.0, 20).mapv(|r| r * r), 0.0, None).unwrap();
        let fedvr = FEDVR::linear(0.0, 1.0, 4, 6).unwrap();
        let bases: [&dyn Basis; 3] = [&fd, &stag, &fedvr];
        for b in bases {
            let c: nd::Array1<f64>
                = (0..b.len()).map(|i| (i as f64 * 0.7).sin()).collect();
            let x = b.locs();
            let values = evaluate_expansion(b, &c, &x).unwrap();
            let table: std::collections::HashMap<u64, f64>
                = x.iter().zip(&values).map(|(xk, vk)| (xk.to_bits(), *vk)).collect();
            let cc = interpolate(b, |xk| table[&xk.to_bits()]).unwrap();
            for (a, e) in cc.iter().zip(&c) {
                assert_abs_diff_eq!(a, e, epsilon = 1e-12);
            }
        }

        let t = KnotSet::linear(4, 0.0, 1.0, 5).unwrap();
        let b = BSpline::auto(t, 0).unwrap();
        let c: nd::Array1<f64>
            = (0..b.len()).map(|i| 1.0 + (i as f64 * 0.7).sin()).collect();
        let values = evaluate_expansion(&b, &c, &b.locs()).unwrap();
        let x = b.locs();
        let cc = interpolate(&b, |xk| {
            let q = x.iter().position(|xq| *xq == xk).unwrap();
            values[q]
        })
        .unwrap();
        for (a, e) in cc.iter().zip(&c) {
            assert_abs_diff_eq!(a, e, epsilon = 1e-10);
        }
    }

    #[test]
    fn interpolation_domain() {
        let fd = FiniteDifferences::radial(10, 0.1).unwrap();
        assert!(interpolate_on(&fd, (0.0, 2.0), |x| x).is_ok());
        assert!(matches!(
            interpolate_on(&fd, (0.0, 0.5), |x| x), Err(BasisError::Argument(_))));
        assert!(matches!(
            evaluate_expansion(&fd, &nd::Array1::<f64>::zeros(3), &fd.locs()),
            Err(BasisError::Length(_))
        ));
    }
}
