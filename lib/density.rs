//! Densities, i.e. pointwise products of two expansions re-expanded in a
//! target basis.
//!
//! For expansions `f = Σ c^f_i φ^L_i` and `g = Σ c^g_j φ^R_j`, the coefficients
//! of `h = f g` in the target basis `T` are computed as
//! ```text
//! c^h = C · ((LV · c^f) ∘ (RV · c^g))
//! ```
//! where `∘` is the elementwise product. For nodal bases, `LV` and `RV` select
//! the target's global indices from the left and right coefficient vectors and
//! `C = diag(w^T)` rescales the product of two weighted values; this is exact
//! at the nodes. For B-splines, `LV` and `RV` evaluate the expansions at the
//! shared quadrature points and `C = V_T⁺` is the least-squares pseudo-inverse
//! of the target's evaluation matrix, so accuracy is limited by how well the
//! product is represented on the quadrature grid.
//!
//! ```
//! use radbasis::{ Basis, Density, FiniteDifferences, ops };
//!
//! let fd = FiniteDifferences::radial(100, 0.01).unwrap();
//! let cf = ops::interpolate(&fd, |x| x).unwrap();
//! let cg = ops::interpolate(&fd, |x| 1.0 - x).unwrap();
//! let rho = Density::new(&fd, &cf, &cg).unwrap();
//! let x = fd.locs();
//! assert!((rho.rho()[20] - x[20] * (1.0 - x[20])).abs() < 1e-15);
//! ```

use ndarray as nd;
use ndarray_linalg::{ Lapack, Scalar };
use crate::{
    Arr1,
    basis::{ Basis, Kind },
    error::{ BasisResult, LengthError },
    utils::{ pseudo_inverse, real_matvec, selection_matrix },
};

/// Coefficients of a density in a target basis, together with the matrices
/// used to compute them.
#[derive(Clone, Debug, PartialEq)]
pub struct Density<A> {
    rho: nd::Array1<A>,
    lv: nd::Array2<f64>,
    rv: nd::Array2<f64>,
    c: nd::Array2<f64>,
}

impl<A> Density<A>
where A: Scalar<Real = f64> + Lapack
{
    /// Compute the density of two expansions in the same basis, re-expanded in
    /// that basis.
    pub fn new<B, S, T>(basis: &B, cf: &Arr1<S>, cg: &Arr1<T>)
        -> BasisResult<Self>
    where
        B: Basis + ?Sized,
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = A>,
    {
        Self::mixed(basis, basis, cf, basis, cg)
    }

    /// Compute the density of expansions in `left` and `right`, re-expanded in
    /// `target`.
    ///
    /// All three bases must be views of the same discretization; otherwise
    /// [`BasisError::Incompatible`][crate::BasisError::Incompatible] is
    /// returned.
    pub fn mixed<B, L, R, S, T>(
        target: &B,
        left: &L,
        cf: &Arr1<S>,
        right: &R,
        cg: &Arr1<T>,
    ) -> BasisResult<Self>
    where
        B: Basis + ?Sized,
        L: Basis + ?Sized,
        R: Basis + ?Sized,
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = A>,
    {
        let kt = target.kind();
        kt.check_compatible(&left.kind())?;
        kt.check_compatible(&right.kind())?;
        LengthError::check_len(left.len(), cf.len())?;
        LengthError::check_len(right.len(), cg.len())?;
        let (lv, rv, c)
            = match kt {
                Kind::BSpline(b) => {
                    let v = b.evaluation_matrix();
                    let lv = v.slice(nd::s![.., left.range()]).to_owned();
                    let rv = v.slice(nd::s![.., right.range()]).to_owned();
                    let c = pseudo_inverse(&v.slice(nd::s![.., target.range()]))?;
                    (lv, rv, c)
                },
                _ => {
                    let lv = selection_matrix(target.range(), left.range());
                    let rv = selection_matrix(target.range(), right.range());
                    let c = nd::Array2::from_diag(&target.weights());
                    (lv, rv, c)
                },
            };
        let rho = Self::combine(&lv, &rv, &c, cf, cg);
        Ok(Self { rho, lv, rv, c })
    }

    fn combine<S, T>(
        lv: &nd::Array2<f64>,
        rv: &nd::Array2<f64>,
        c: &nd::Array2<f64>,
        cf: &Arr1<S>,
        cg: &Arr1<T>,
    ) -> nd::Array1<A>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = A>,
    {
        let f: nd::Array1<A> = real_matvec(lv, cf);
        let g: nd::Array1<A> = real_matvec(rv, cg);
        real_matvec(c, &(f * g))
    }

    /// Recompute the density for new coefficient vectors, reusing the basis
    /// matrices.
    pub fn product<S, T>(&self, cf: &Arr1<S>, cg: &Arr1<T>)
        -> BasisResult<nd::Array1<A>>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = A>,
    {
        LengthError::check_len(self.lv.ncols(), cf.len())?;
        LengthError::check_len(self.rv.ncols(), cg.len())?;
        Ok(Self::combine(&self.lv, &self.rv, &self.c, cf, cg))
    }

    /// Coefficients of the density in the target basis.
    pub fn rho(&self) -> nd::ArrayView1<'_, A> { self.rho.view() }

    pub fn into_rho(self) -> nd::Array1<A> { self.rho }

    /// Change-of-basis matrix applied to the left coefficients.
    pub fn lv(&self) -> nd::ArrayView2<'_, f64> { self.lv.view() }

    /// Change-of-basis matrix applied to the right coefficients.
    pub fn rv(&self) -> nd::ArrayView2<'_, f64> { self.rv.view() }

    /// Matrix taking the pointwise product to target coefficients.
    pub fn c(&self) -> nd::ArrayView2<'_, f64> { self.c.view() }
}
