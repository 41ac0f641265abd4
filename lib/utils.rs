//! Miscellaneous tools.

use std::ops::Range;
use ndarray::{ self as nd, Ix1, Ix2 };
use ndarray_linalg::{ JobSvd, Scalar, SVDDC };
use num_traits::Zero;
use crate::error::{ BasisError, BasisResult };

/// Construct a dense `n × n` tridiagonal matrix with constant bands.
pub fn tridiagonal(n: usize, lower: f64, diag: f64, upper: f64)
    -> nd::Array2<f64>
{
    let mut a: nd::Array2<f64> = nd::Array2::from_diag_elem(n, diag);
    a.slice_mut(nd::s![1.., ..n.saturating_sub(1)]).diag_mut().fill(lower);
    a.slice_mut(nd::s![..n.saturating_sub(1), 1..]).diag_mut().fill(upper);
    a
}

/// Return `true` if every element of the square matrix `a` farther than `p`
/// places from the main diagonal is zero.
pub fn is_banded<S, A>(a: &nd::ArrayBase<S, Ix2>, p: usize) -> bool
where
    S: nd::Data<Elem = A>,
    A: Zero,
{
    a.is_square()
        && a.indexed_iter()
            .all(|((i, j), aij)| i.abs_diff(j) <= p || aij.is_zero())
}

/// Forward differences `a[k + 1] - a[k]`.
pub fn array_diff<S>(a: &nd::ArrayBase<S, Ix1>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    a.iter().skip(1).zip(a)
        .map(|(akp1, ak)| *akp1 - *ak)
        .collect()
}

// 0/1 matrix mapping coefficients on the global index range `cols` onto the
// global index range `rows`; indices outside the overlap are dropped
pub(crate) fn selection_matrix(rows: Range<usize>, cols: Range<usize>)
    -> nd::Array2<f64>
{
    let mut s: nd::Array2<f64> = nd::Array2::zeros((rows.len(), cols.len()));
    let lo = rows.start.max(cols.start);
    let hi = rows.end.min(cols.end);
    (lo..hi).for_each(|g| { s[[g - rows.start, g - cols.start]] = 1.0; });
    s
}

// real matrix times a real or complex vector
pub(crate) fn real_matvec<S, A>(m: &nd::Array2<f64>, v: &nd::ArrayBase<S, Ix1>)
    -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Scalar<Real = f64>,
{
    m.outer_iter()
        .map(|row| {
            row.iter().zip(v)
                .fold(A::zero(), |acc, (mij, vj)| acc + vj.mul_real(*mij))
        })
        .collect()
}

/// Moore-Penrose pseudo-inverse of a real `m × n` matrix via a thin SVD.
///
/// Singular values below `σ_max · ε · max(m, n)` are treated as zero. Only
/// the `min(m, n)` leading singular vectors are ever formed, so the memory
/// used scales as `max(m, n) · min(m, n)`.
pub fn pseudo_inverse<S>(a: &nd::ArrayBase<S, Ix2>) -> BasisResult<nd::Array2<f64>>
where S: nd::Data<Elem = f64>
{
    let (m, n) = a.dim();
    if m == 0 || n == 0 { return Ok(nd::Array2::zeros((n, m))); }
    let (Some(u), s, Some(vt)) = a.svddc(JobSvd::Some)? else {
        return Err(BasisError::argument("thin SVD returned no singular vectors"));
    };
    let smax = s.iter().copied().fold(0.0, f64::max);
    let cutoff = smax * f64::EPSILON * m.max(n) as f64;
    // Σ⁺ Uᵀ, then V Σ⁺ Uᵀ
    let mut sut: nd::Array2<f64> = u.t().to_owned();
    sut.outer_iter_mut().zip(&s)
        .for_each(|(mut row, sk)| {
            if *sk > cutoff { row /= *sk; } else { row.fill(0.0); }
        });
    Ok(vt.t().dot(&sut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn tridiagonal_bands() {
        let a = tridiagonal(4, 1.0, -2.0, 3.0);
        assert_eq!(
            a,
            array![
                [-2.0,  3.0,  0.0,  0.0],
                [ 1.0, -2.0,  3.0,  0.0],
                [ 0.0,  1.0, -2.0,  3.0],
                [ 0.0,  0.0,  1.0, -2.0],
            ]
        );
        assert!(is_banded(&a, 1));
        assert!(!is_banded(&a, 0));
        assert_eq!(tridiagonal(1, 1.0, 5.0, 1.0), array![[5.0]]);
    }

    #[test]
    fn band_check_rejects_fill() {
        let mut a = tridiagonal(5, 1.0, 1.0, 1.0);
        assert!(is_banded(&a, 1));
        a[[0, 3]] = 1e-3;
        assert!(!is_banded(&a, 1));
        assert!(is_banded(&a, 3));
        assert!(!is_banded(&nd::Array2::<f64>::zeros((2, 3)), 5));
    }

    #[test]
    fn forward_difference() {
        assert_eq!(array_diff(&array![1.0, 2.0, 4.0, 7.0]), array![1.0, 2.0, 3.0]);
        assert_eq!(array_diff(&array![1.0]).len(), 0);
    }

    #[test]
    fn complex_matvec() {
        use num_complex::Complex64 as C64;
        let m = array![[1.0, 2.0], [0.0, -1.0]];
        let v = array![C64::new(1.0, 1.0), C64::new(0.0, 2.0)];
        let mv: nd::Array1<C64> = real_matvec(&m, &v);
        assert_eq!(mv, array![C64::new(1.0, 5.0), C64::new(0.0, -2.0)]);
    }

    #[test]
    fn pseudo_inverse_of_tall_matrix() {
        let a = array![
            [1.0, 0.0],
            [1.0, 1.0],
            [1.0, 2.0],
            [0.0, 3.0],
        ];
        let p = pseudo_inverse(&a).unwrap();
        assert_eq!(p.dim(), (2, 4));
        let pa = p.dot(&a);
        for ((i, j), pij) in pa.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((pij - expected).abs() < 1e-13);
        }
        // rank-deficient: A A⁺ A = A
        let r = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let pr = pseudo_inverse(&r).unwrap();
        let rpr = r.dot(&pr).dot(&r);
        for (x, y) in rpr.iter().zip(&r) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn selection_overlap() {
        let s = selection_matrix(2..5, 1..4);
        assert_eq!(
            s,
            array![
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, 0.0],
            ]
        );
    }
}
