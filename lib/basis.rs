//! The common interface to all bases, plus restricted views of them.
//!
//! Every basis exposes its functions through a contiguous range of *global*
//! indices. For the finite-difference variants these are the grid indices `j`
//! of the nodes `x_j`; for FEDVR and B-spline bases they start at 0. A
//! [`Restricted`] view selects a sub-range of a parent basis without copying
//! anything, which is how boundary conditions (dropped edge functions) and
//! mixed-range operators are expressed.
//!
//! Functions combining two bases (mass matrices, operators, densities) dispatch
//! on the pair of [`Kind`]s and fail with [`BasisError::Incompatible`] unless
//! both bases are views of the same discretization.

use std::fmt;
use std::ops::Range;
use ndarray as nd;
use crate::{
    bspline::{ self, BSpline },
    error::{ BasisError, BasisResult },
    fd::FiniteDifferences,
    fedvr::FEDVR,
    implicit::ImplicitFiniteDifferences,
    staggered::StaggeredFiniteDifferences,
};

/// Capability set shared by all bases.
pub trait Basis {
    /// Borrow the concrete discretization underlying `self`.
    fn kind(&self) -> Kind<'_>;

    /// Global indices of the functions in `self`.
    fn range(&self) -> Range<usize>;

    /// Number of functions.
    fn len(&self) -> usize { self.range().len() }

    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Interval on which the functions are supported.
    fn domain(&self) -> (f64, f64);

    /// Node positions for nodal bases, quadrature points otherwise.
    fn locs(&self) -> nd::Array1<f64>;

    /// Function scaling at each node for nodal bases, quadrature weights
    /// otherwise.
    fn weights(&self) -> nd::Array1<f64>;

    fn inverse_weights(&self) -> nd::Array1<f64> {
        self.weights().mapv(f64::recip)
    }

    /// Evaluate the `i`-th function (local index) at `x`.
    ///
    /// *Panics if `i` is out of bounds*.
    fn evaluate(&self, x: f64, i: usize) -> f64;

    /// Restrict `self` to the functions with local indices in `range`.
    fn restrict(&self, range: Range<usize>) -> BasisResult<Restricted<'_, Self>>
    where Self: Sized
    {
        Restricted::new(self, range)
    }
}

/// Identifies a basis variant, e.g. in error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BasisTag {
    FiniteDifferences,
    StaggeredFiniteDifferences,
    ImplicitFiniteDifferences,
    FEDVR,
    BSpline,
}

impl fmt::Display for BasisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FiniteDifferences => "finite differences",
            Self::StaggeredFiniteDifferences => "staggered finite differences",
            Self::ImplicitFiniteDifferences => "implicit finite differences",
            Self::FEDVR => "FEDVR",
            Self::BSpline => "B-splines",
        };
        f.write_str(name)
    }
}

/// Borrowed concrete discretization behind a [`Basis`].
#[derive(Copy, Clone, Debug)]
pub enum Kind<'a> {
    FiniteDifferences(&'a FiniteDifferences),
    Staggered(&'a StaggeredFiniteDifferences),
    Implicit(&'a ImplicitFiniteDifferences),
    Fedvr(&'a FEDVR),
    BSpline(&'a BSpline),
}

impl<'a> Kind<'a> {
    pub fn tag(&self) -> BasisTag {
        match self {
            Self::FiniteDifferences(_) => BasisTag::FiniteDifferences,
            Self::Staggered(_) => BasisTag::StaggeredFiniteDifferences,
            Self::Implicit(_) => BasisTag::ImplicitFiniteDifferences,
            Self::Fedvr(_) => BasisTag::FEDVR,
            Self::BSpline(_) => BasisTag::BSpline,
        }
    }

    /// Return `true` if expansion coefficients are (scaled) function values
    /// at the nodes.
    pub fn is_nodal(&self) -> bool { !matches!(self, Self::BSpline(_)) }

    /// Return `true` if functions with different indices do not overlap.
    pub fn is_orthogonal(&self) -> bool { self.is_nodal() }

    /// Return `true` if both kinds are the same discretization, i.e. share
    /// nodes, knots and quadrature.
    pub fn compatible(&self, other: &Kind<'_>) -> bool {
        match (self, other) {
            (Kind::FiniteDifferences(l), Kind::FiniteDifferences(r)) => l == r,
            (Kind::Staggered(l), Kind::Staggered(r)) => l == r,
            (Kind::Implicit(l), Kind::Implicit(r)) => l == r,
            (Kind::Fedvr(l), Kind::Fedvr(r)) => l == r,
            (Kind::BSpline(l), Kind::BSpline(r))
                => bspline::assert_compatible_bases(l, r).is_ok(),
            _ => false,
        }
    }

    /// Like [`Self::compatible`], but return [`BasisError::Incompatible`] on
    /// failure.
    pub fn check_compatible(&self, other: &Kind<'_>) -> BasisResult<()> {
        self.compatible(other).then_some(())
            .ok_or_else(|| BasisError::incompatible(self.tag(), other.tag()))
    }

    /// The unrestricted basis.
    pub fn full(&self) -> &'a dyn Basis {
        match *self {
            Self::FiniteDifferences(b) => b,
            Self::Staggered(b) => b,
            Self::Implicit(b) => b,
            Self::Fedvr(b) => b,
            Self::BSpline(b) => b,
        }
    }

    /// Diagonal of the mass matrix over the full index range; the whole mass
    /// matrix for nodal bases.
    pub fn mass_diagonal(&self) -> nd::Array1<f64> {
        match self {
            Self::FiniteDifferences(b) => b.mass_diagonal(),
            Self::Staggered(b) => b.mass_diagonal(),
            Self::Implicit(b) => b.grid().mass_diagonal(),
            Self::Fedvr(b) => b.mass_diagonal(),
            Self::BSpline(b) => b.overlap().diag().to_owned(),
        }
    }
}

/// A contiguous subset of the functions of a parent basis.
///
/// All queries are forwarded to the parent with an index offset. Node
/// positions and weights of nodal bases are sliced to the restricted range;
/// quadrature points and weights of B-spline bases are shared unchanged.
#[derive(Clone, Debug)]
pub struct Restricted<'a, B> {
    parent: &'a B,
    range: Range<usize>,
}

impl<'a, B> Restricted<'a, B>
where B: Basis
{
    /// Restrict `parent` to the functions with local indices in `range`.
    ///
    /// Returns [`BasisError::Argument`] if `range` is empty or exceeds the
    /// parent's size.
    pub fn new(parent: &'a B, range: Range<usize>) -> BasisResult<Self> {
        if range.is_empty() || range.end > parent.len() {
            return Err(BasisError::argument(format!(
                "cannot restrict a basis of {} functions to {:?}",
                parent.len(), range,
            )));
        }
        Ok(Self { parent, range })
    }

    pub fn parent(&self) -> &'a B { self.parent }

    /// Index of the first selected function in the parent.
    pub fn offset(&self) -> usize { self.range.start }

    fn slice(&self, a: nd::Array1<f64>) -> nd::Array1<f64> {
        if self.parent.kind().is_nodal() {
            a.slice(nd::s![self.range.clone()]).to_owned()
        } else {
            a
        }
    }
}

impl<'a, B> Basis for Restricted<'a, B>
where B: Basis
{
    fn kind(&self) -> Kind<'_> { self.parent.kind() }

    fn range(&self) -> Range<usize> {
        let start = self.parent.range().start;
        start + self.range.start .. start + self.range.end
    }

    fn domain(&self) -> (f64, f64) { self.parent.domain() }

    fn locs(&self) -> nd::Array1<f64> { self.slice(self.parent.locs()) }

    fn weights(&self) -> nd::Array1<f64> { self.slice(self.parent.weights()) }

    fn inverse_weights(&self) -> nd::Array1<f64> {
        self.slice(self.parent.inverse_weights())
    }

    fn evaluate(&self, x: f64, i: usize) -> f64 {
        assert!(i < self.range.len(), "function index {i} out of bounds");
        self.parent.evaluate(x, self.range.start + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knots::KnotSet;

    #[test]
    fn restricted_offsets_indices() {
        let fd = FiniteDifferences::new(1..11, 0.1).unwrap();
        let r = fd.restrict(2..5).unwrap();
        assert_eq!(r.range(), 3..6);
        assert_eq!(r.len(), 3);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.locs(), fd.locs().slice(nd::s![2..5]).to_owned());
        assert_eq!(r.evaluate(0.4, 0), fd.evaluate(0.4, 2));
        assert_eq!(r.kind().tag(), BasisTag::FiniteDifferences);

        let rr = r.restrict(1..3).unwrap();
        assert_eq!(rr.range(), 4..6);
        assert_eq!(rr.evaluate(0.5, 1), fd.evaluate(0.5, 4));
    }

    #[test]
    fn bad_restrictions() {
        let fd = FiniteDifferences::new(1..11, 0.1).unwrap();
        assert!(matches!(fd.restrict(3..3), Err(BasisError::Argument(_))));
        assert!(matches!(fd.restrict(5..11), Err(BasisError::Argument(_))));
    }

    #[test]
    fn bspline_restriction_keeps_quadrature() {
        let t = KnotSet::linear(3, 0.0, 1.0, 4).unwrap();
        let b = BSpline::new(t, 3).unwrap();
        let r = b.restrict(1..b.len() - 1).unwrap();
        assert_eq!(r.locs(), b.locs());
        assert_eq!(r.weights(), b.weights());
        assert_eq!(r.len(), b.len() - 2);
    }

    #[test]
    fn compatibility() {
        let a = FiniteDifferences::new(1..11, 0.1).unwrap();
        let b = FiniteDifferences::new(1..11, 0.2).unwrap();
        let s = StaggeredFiniteDifferences::uniform(10, 0.1, 0.0, None).unwrap();
        assert!(a.kind().compatible(&a.restrict(0..4).unwrap().kind()));
        assert!(!a.kind().compatible(&b.kind()));
        assert!(!a.kind().compatible(&s.kind()));
        let err = a.kind().check_compatible(&s.kind()).unwrap_err();
        assert!(matches!(
            err,
            BasisError::Incompatible {
                left: BasisTag::FiniteDifferences,
                right: BasisTag::StaggeredFiniteDifferences,
            }
        ));
        assert!(format!("{err}").contains("staggered"));
    }

    #[test]
    fn compatibility_across_borrows() {
        let a = FiniteDifferences::new(1..11, 0.1).unwrap();
        let ka = a.kind();
        let same = {
            let b = FiniteDifferences::new(1..11, 0.1).unwrap();
            let kb = b.kind();
            ka.compatible(&kb) && kb.compatible(&ka)
        };
        assert!(same);
        let t = KnotSet::linear(3, 0.0, 1.0, 4).unwrap();
        let s = BSpline::new(t.clone(), 3).unwrap();
        let ks = s.kind();
        let checked = {
            let s2 = BSpline::new(t, 3).unwrap();
            ks.check_compatible(&s2.kind()).is_ok()
        };
        assert!(checked);
        assert!(!ks.compatible(&ka));
    }
}
