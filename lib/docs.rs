//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Finite differences](#finite-differences)
//! - [Compact derivatives](#compact-derivatives)
//! - [FEDVR](#fedvr)
//! - [B-splines](#b-splines)
//! - [Densities](#densities)
//! - [Complex scaling](#complex-scaling)
//!
//! # Background
//! Numerical solution of, e.g., the radial Schrödinger equation
//! ```text
//!    1 ∂²u    l (l + 1)
//! - --- --- + --------- u(r) + V(r) u(r) = E u(r)
//!    2 ∂r²       2 r²
//! ```
//! begins by choosing a finite set of functions *φ*<sub>*i*</sub>, the
//! *basis*, and approximating every function of interest as an expansion
//! ```text
//! f(x) ≈ Σ_i c_i φ_i(x)
//! ```
//! The equation is then replaced by a matrix problem in the coefficients
//! *c*<sub>*i*</sub>. Three kinds of objects arise in doing so:
//! ```text
//! S[i, j] = ⟨φ_i|φ_j⟩           (mass or overlap matrix)
//! V[i, j] = ⟨φ_i|f|φ_j⟩         (multiplicative operators)
//! D[i, j] = ⟨φ_i|∂ᵒ φ_j⟩        (derivative operators)
//! ```
//! The bases in this crate differ in which of these are simple. For the
//! *nodal* bases (finite differences and FEDVR), every function is attached to
//! a node *x*<sub>*i*</sub> and all functions but one vanish at each node.
//! Evaluating integrals with a quadrature rule on the nodes themselves makes
//! both *S* and *V* diagonal,
//! ```text
//! ⟨φ_i|f|φ_j⟩ ≈ δ_ij m_i f(x_i)
//! ```
//! with *m*<sub>*i*</sub> a lumped mass. The coefficients of a function are
//! then just its scaled values at the nodes, `c_i = f(x_i) / w_i`, where
//! *w*<sub>*i*</sub> is the value of *φ*<sub>*i*</sub> at its own node.
//!
//! B-splines are not nodal: neighboring functions overlap, *S* is banded rather
//! than diagonal, and coefficients are found by solving a linear system.
//! In exchange, B-splines represent smooth functions to high order with few
//! parameters and admit arbitrary knot placement.
//!
//! Boundary conditions are imposed by discarding functions. A basis restricted
//! to a contiguous sub-range of its functions (a [`Restricted`] view) keeps the
//! global numbering of its parent, so matrices between two views of the same
//! discretization are sub-blocks of a single matrix.
//!
//! # Finite differences
//! On a uniform grid *x*<sub>*j*</sub> = *j* *Δx* the basis functions are tents
//! of unit height, and
//! ```text
//! S = Δx I
//! ∂² ≈ (I{-1} - 2 I{0} + I{+1}) / Δx²
//! ```
//! where *I*{*k*} is the matrix with ones on the *k*-th diagonal.
//!
//! Radial problems with Coulomb-like potentials favor grids that are dense near
//! the origin and sparse far from it. A non-uniform grid breaks the symmetry of
//! the naive three-point Laplacian, and for *l* = 0 the *r*⁻¹ singularity
//! spoils the convergence of the lowest states. Following Krause and
//! Schafer[^1], the grid is *staggered* (the origin sits halfway between a
//! mirror node *r*₀ = -*r*₁ and the first node) and the stencil is derived
//! variationally: with midpoints *m*<sub>*j*</sub> = (*r*<sub>*j*</sub> +
//! *r*<sub>*j*+1</sub>) / 2 and steps *h*<sup>±</sup>,
//! ```text
//! α_j = m_j² / (r_j r_{j+1})
//! δ_j = m_{j-1}² / (r_j r_{j-1})
//! β_j = h̄_j (m_j²/h⁺_j + m_{j-1}²/h⁻_j) / (2 r_j²)
//! ```
//! On the uniform grid *r*<sub>*j*</sub> = (*j* - ½) *ρ* these reduce to closed
//! forms in *j*. The first diagonal element receives a correction *δβ*₁ that
//! makes the ground state of hydrogen-like potentials (charge *Z*) exact to
//! leading order in *Zρ*,
//! ```text
//! δβ₁ = Zρ/8 (1 + Zρ)
//! ```
//! Scaling the functions by 1/√*h̄*<sub>*j*</sub> makes the Laplacian symmetric
//! and the mass matrix the identity.
//!
//! Grids that are linear near the origin and logarithmic far from it (or the
//! reverse) are built from
//! ```text
//! r_j = r_{j-1} + ρ_min + (1 - exp(-α r_{j-1})) (ρ_max - ρ_min)
//! ```
//! which interpolates smoothly between the spacings *ρ*<sub>min</sub> and
//! *ρ*<sub>max</sub>.
//!
//! # Compact derivatives
//! Higher accuracy without wider stencils is obtained from *implicit* (compact)
//! schemes[^2], which represent a derivative as the ratio of two tridiagonal
//! matrices,
//! ```text
//! ∂ᵒ ≈ c M⁻¹ Δ
//! ```
//! For the second derivative, `Δ = I{-1} - 2 I{0} + I{+1}`,
//! `M = I{-1} + 10 I{0} + I{+1}` and `c = 12/Δx²`, which is the matrix form of
//! Numerov's method and carries an *O*(*Δx*⁴) error. The first derivative uses
//! `Δ = I{+1} - I{-1}`, `M = I{-1} + 4 I{0} + I{+1}` and `c = 3/Δx`. Applying
//! the operator costs one tridiagonal solve, and its inverse (needed e.g. for
//! implicit time steps) costs one tridiagonal multiplication and one solve:
//! ```text
//! (c M⁻¹ Δ)⁻¹ b = (1/c) Δ⁻¹ M b
//! ```
//! A potential term *B* is added to the operator without leaving this form by
//! folding it into the numerator, `Δ' = Δ + (1/c) M B`, which remains
//! tridiagonal as long as *B* is.
//!
//! Near a singular origin, the first rows of *Δ* and *M* are corrected so that
//! the scheme stays fourth-order for *u*(*r*) ~ *r* - *Z* *r*²: with *λ* = √3 -
//! 2 in the first derivative and
//! ```text
//! δβ₁ = -Z Δx / (12 - 10 Z Δx)
//! ```
//! in the second.
//!
//! # FEDVR
//! The finite-element discrete-variable representation[^3] splits the domain
//! into elements, each with an *n*-point Gauss-Lobatto grid, and uses the
//! Lagrange cardinal polynomials of each element's nodes as basis functions.
//! Functions belonging to the shared node of two adjacent elements are joined
//! into a single *bridge* function. Normalized as
//! ```text
//! χ_i(x) = L_i(x) / √w_i
//! ```
//! with *w*<sub>*i*</sub> the Lobatto weights (summed over both elements for
//! bridge functions), the basis is orthonormal under the Lobatto quadrature and
//! every multiplicative operator is diagonal. Kinetic-energy matrices are dense
//! within each element and computed exactly by the same quadrature:
//! ```text
//! ⟨χ_i|∂²|χ_j⟩ = -Σ_q w_q L_i'(x_q) L_j'(x_q) / √(w_i w_j)
//! ```
//!
//! # B-splines
//! B-splines of order *k* (polynomial degree *k* - 1) on a knot sequence
//! *t*<sub>*i*</sub> are defined by the recursion[^4]
//! ```text
//! B_{i,1}(x) = 1 if t_i ≤ x < t_{i+1} else 0
//!
//!              x - t_i                    t_{i+k} - x
//! B_{i,k}(x) = ----------- B_{i,k-1}(x) + --------------- B_{i+1,k-1}(x)
//!              t_{i+k-1} - t_i            t_{i+k} - t_{i+1}
//! ```
//! Each *B*<sub>*i*,*k*</sub> is non-zero only on *k* consecutive knot
//! intervals, and on a clamped knot set (end knots repeated *k* times) they sum
//! to one everywhere. In practice they are evaluated with de Boor's algorithm,
//! which evaluates a linear combination directly from the *k* coefficients that
//! are non-zero on the interval containing *x*.
//!
//! Matrix elements are computed with a Gauss-Legendre rule of *N* points per
//! knot interval. Products of two splines of order *k* and an operator of order
//! *k'* are polynomials of degree 2(*k* - 1) + *k'*, so
//! ```text
//! 2N - 1 ≥ 2(k - 1) + k'
//! ```
//! points suffice for exact integration. All functions are tabulated once on
//! the quadrature points; overlaps of multiplicative operators are then
//! ```text
//! ⟨B_i|f|B_j⟩ = Σ_q B_i(x_q) w_q f(x_q) B_j(x_q)
//! ```
//! which is banded with bandwidth *k* - 1.
//!
//! # Densities
//! Given two expansions *f* = Σ *c*<sup>*f*</sup><sub>*i*</sub>
//! *φ*<sup>*L*</sup><sub>*i*</sub> and *g* = Σ *c*<sup>*g*</sup><sub>*j*</sub>
//! *φ*<sup>*R*</sup><sub>*j*</sub> in two (restrictions of the same) bases, the
//! product *h* = *f* *g* is expanded in a target basis *T* as
//! ```text
//! c^h = C ((LV c^f) ∘ (RV c^g))
//! ```
//! *LV* and *RV* take the coefficients of *f* and *g* to a common
//! representation in which the pointwise product is a simple elementwise
//! product, and *C* takes the result to coefficients in *T*. For nodal bases the
//! common representation is the values at the target nodes, so *LV* and *RV*
//! only select indices and *C* is diagonal; the result is exact at the nodes.
//! For B-splines it is the values at the quadrature points, and *C* is the
//! least-squares pseudo-inverse of the target's evaluation matrix.
//!
//! # Complex scaling
//! Outgoing-wave boundary conditions can be imposed by rotating the coordinate
//! into the complex plane beyond some point *c*,
//! ```text
//! x → c + e^{iθ} (x - c),  x > c
//! ```
//! which turns outgoing waves into decaying ones. Quadrature grids for
//! elements or knot intervals past *c* are produced by rotating the real nodes
//! about *c* while keeping the weights real; the Jacobian *e*<sup>*iθ*</sup> is
//! left to the operator. See
//! [`quadrature::element_grid`][crate::quadrature::element_grid].
//!
//! [`Restricted`]: crate::basis::Restricted
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
