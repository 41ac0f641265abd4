//! Lagrange interpolating polynomials on arbitrary node sets.
//!
//! The cardinal polynomial `L_j` of a node set `{x_0, ..., x_{n-1}}` is the
//! unique polynomial of degree `n - 1` with `L_j(x_i) = δ_ij`. These are the
//! building blocks of the [FEDVR][crate::fedvr] basis.
//!
//! ```
//! use ndarray as nd;
//! use radbasis::interp::lagrange;
//!
//! let x: nd::Array1<f64> = nd::array![-1.0, 0.0, 0.5, 2.0];
//! let y = x.mapv(|xk| (xk + 3.0) * (xk - 0.5) * (xk - 2.0));
//! let at = lagrange(&x, &y, 1.0).unwrap();
//! assert!((at - (4.0 * 0.5 * -1.0)).abs() < 1e-12);
//! ```

use ndarray as nd;
use crate::{ Arr1, error::LengthError };

/// Compute the value of a sampled function via a Lagrange polynomial.
pub fn lagrange<S, T>(data_x: &Arr1<S>, data_y: &Arr1<T>, x: f64)
    -> Result<f64, LengthError>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    LengthError::check(data_x, data_y)?;
    let res: f64
        = data_y.iter().enumerate()
        .map(|(j, yj)| *yj * lagrange_cardinal(data_x, j, x))
        .sum();
    Ok(res)
}

/// Compute the value of the `j`-th cardinal polynomial of `nodes` at `x`.
///
/// *Panics if `j` is out of bounds*.
pub fn lagrange_cardinal<S>(nodes: &Arr1<S>, j: usize, x: f64) -> f64
where S: nd::Data<Elem = f64>
{
    let xj = nodes[j];
    nodes.iter().enumerate()
        .filter(|(m, _)| *m != j)
        .map(|(_, xm)| (x - *xm) / (xj - *xm))
        .product()
}

/// Compute the derivative of the `j`-th cardinal polynomial of `nodes` at `x`.
///
/// *Panics if `j` is out of bounds*.
pub fn dlagrange_cardinal<S>(nodes: &Arr1<S>, j: usize, x: f64) -> f64
where S: nd::Data<Elem = f64>
{
    let xj = nodes[j];
    nodes.iter().enumerate()
        .filter(|(i, _)| *i != j)
        .map(|(i, xi)| {
            nodes.iter().enumerate()
                .filter(|(m, _)| *m != j && *m != i)
                .map(|(_, xm)| (x - *xm) / (xj - *xm))
                .product::<f64>()
                / (xj - *xi)
        })
        .sum()
}
