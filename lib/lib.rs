#![allow(non_snake_case)]

//! Provides discretization bases for functions and operators on finite or
//! semi-infinite one-dimensional intervals, for use in spectral and
//! pseudo-spectral solvers of, e.g., the radial Schrödinger equation.
//!
//! Provides implementations for the following bases:
//! - Finite differences:
//!     - Uniform grids
//!     - Staggered, non-uniform grids with a variationally derived stencil for
//!       Dirichlet conditions at the origin[^1]
//!     - Implicit (compact) high-order derivatives[^2]
//! - Finite-element discrete-variable representation (FEDVR)[^3]
//! - B-splines on polynomial knot sets[^4]
//!
//! All bases implement [`Basis`][basis::Basis]. Mass matrices, matrix elements
//! of multiplicative operators, interpolation of functions, and densities
//! (products of two expanded functions re-expanded in a basis) are computed by
//! the functions in [`ops`] and [`density`].
//!
//! See [`docs`] for theoretical background.
//!
//! [^1]: M. Krause and K. J. Schafer, "Numerical solution of the Schrödinger
//! equation on a non-uniform, staggered grid." J. Phys. Chem. A **103** 10118
//! (1999).
//!
//! [^2]: H. G. Muller, "An efficient propagation scheme for the time-dependent
//! Schrödinger equation in the velocity gauge." Laser Physics **9** 138 (1999).
//!
//! [^3]: T. N. Rescigno and C. W. McCurdy, "Numerical grid methods for
//! quantum-mechanical scattering problems." Phys. Rev. A **62** 032706 (2000).
//!
//! [^4]: C. de Boor, *A Practical Guide to Splines* (Springer, 1978).

pub mod error;
pub mod interp;
pub mod utils;
pub mod quadrature;
pub mod knots;
pub mod basis;
pub mod fd;
pub mod staggered;
pub mod implicit;
pub mod fedvr;
pub mod bspline;
pub mod ops;
pub mod expansion;
pub mod density;

pub mod docs;

pub(crate) const DEF_NEWTON_EPSILON: f64 = 1e-15;
pub(crate) const DEF_NEWTON_MAXITERS: usize = 100;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;

pub use basis::{ Basis, BasisTag, Kind, Restricted };
pub use bspline::BSpline;
pub use density::Density;
pub use error::{ BasisError, BasisResult };
pub use expansion::Expansion;
pub use fd::FiniteDifferences;
pub use fedvr::FEDVR;
pub use implicit::{ ImplicitDerivative, ImplicitFactorization, ImplicitFiniteDifferences };
pub use knots::KnotSet;
pub use staggered::StaggeredFiniteDifferences;
