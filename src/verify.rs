//! Verification equations
//!
//! Each function checks one pairing-product identity. Division-form
//! equations are checked literally as `LHS_num · LHS_den⁻¹ == RHS` through
//! [`crate::group::gt_div`] — never rewritten — and equality is tested on
//! the target-field element itself.
//!
//! The composite range-proof verifier re-derives every Fiat–Shamir
//! challenge from `(Ĉ, V̂, C_y, ℓ)`, rebuilds the four left-hand sides,
//! raises them to the δ's, and checks the single aggregated identity
//! against `e(π_agg, ĝ)`.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, One, Zero};

use crate::group::{g1_multiexp, g2_multiexp, gt_div, gt_pow, pairing};
use crate::proofs::{
    range_challenge_deltas, range_challenge_t, range_challenge_y, ProofError, RangeProof,
};
use crate::{Crs, F, G1, G2, Gt};

fn check_len(expected: usize, actual: usize) -> Result<(), ProofError> {
    if expected != actual {
        return Err(ProofError::LengthMismatch { expected, actual });
    }
    Ok(())
}

fn check_pos(i: usize, n: usize) -> Result<(), ProofError> {
    if i < 1 || i > n {
        return Err(ProofError::PositionOutOfRange { index: i, n });
    }
    Ok(())
}

/// `e(g_1, ĝ_n)` — the recurring "inner-product slot" of the RHS terms.
fn corner(crs: &Crs) -> Result<Gt, ProofError> {
    Ok(pairing(crs.g_i(1)?, crs.g_hat_i(crs.n())?))
}

// ============================================================================
// Aggregated opening
// ============================================================================

/// Aggregated-opening check:
/// `e(C, ∏_i ĝ_{n+1−i}^{t_i}) = e(π, ĝ) · e(g_1, ĝ_n)^x`
/// where `π = ∏_i π_i^{t_i}` and `x = ∑_i m_i t_i` is the claimed result.
pub fn verify_aggregated_opening(
    c: &G1,
    pi: &G1,
    t: &[F],
    x: &F,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_len(n, t.len())?;

    let mut bases = Vec::with_capacity(n);
    for i in 1..=n {
        bases.push(*crs.g_hat_rev(i)?);
    }
    let g_hat_prod = g2_multiexp(&bases, t);

    let lhs = pairing(c, &g_hat_prod);
    let rhs = pairing(pi, crs.g_hat()) * gt_pow(&corner(crs)?, x);
    Ok(lhs == rhs)
}

// ============================================================================
// Per-coordinate checks
// ============================================================================

/// Per-coordinate check for `C_y`:
/// `e(C_y, ĝ_i) = e(g_i^{γ_y} · ∏_{j≠i} g_{n+1−j+i}^{y_j x_j}, ĝ) ·
///  e(g_1, ĝ_n)^{y_i x_i}`.
pub fn verify_cy_coordinate(
    c_y: &G1,
    i: usize,
    x: &[F],
    y: &[F],
    gamma_y: &F,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_pos(i, n)?;
    check_len(n, x.len())?;
    check_len(n, y.len())?;

    let lhs = pairing(c_y, crs.g_hat_i(i)?);

    let mut term = crs.g_i(i)?.into_group() * *gamma_y;
    for j in 1..=n {
        if j == i {
            continue;
        }
        let e = y[j - 1] * x[j - 1];
        if e.is_zero() {
            continue;
        }
        term += crs.g_i(n + 1 - j + i)?.into_group() * e;
    }
    let rhs = pairing(&term.into_affine(), crs.g_hat())
        * gt_pow(&corner(crs)?, &(y[i - 1] * x[i - 1]));
    Ok(lhs == rhs)
}

/// Per-coordinate check for `Ĉ`:
/// `e(g_{n+1−i}, Ĉ) = e(g_{n+1−i}^γ · ∏_{j≠i} g_{n+1−i+j}^{x_j}, ĝ) ·
///  e(g_1, ĝ_n)^{x_i}`.
pub fn verify_chat_coordinate(
    c_hat: &G2,
    i: usize,
    x: &[F],
    gamma: &F,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_pos(i, n)?;
    check_len(n, x.len())?;

    let lhs = pairing(crs.g_rev(i)?, c_hat);

    let mut term = crs.g_rev(i)?.into_group() * *gamma;
    for j in 1..=n {
        if j == i || x[j - 1].is_zero() {
            continue;
        }
        term += crs.g_i(n + 1 - i + j)?.into_group() * x[j - 1];
    }
    let rhs = pairing(&term.into_affine(), crs.g_hat()) * gt_pow(&corner(crs)?, &x[i - 1]);
    Ok(lhs == rhs)
}

// ============================================================================
// Equality / orthogonality
// ============================================================================

/// Equality check (division form):
/// `[e(∏_i g_{n+1−i}^{t_i y_i}, Ĉ)] / [e(C_y, ∏_i ĝ_i^{t_i})] = e(π_eq, ĝ)`.
pub fn verify_equality(
    c_hat: &G2,
    c_y: &G1,
    t: &[F],
    y: &[F],
    pi_eq: &G1,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_len(n, t.len())?;
    check_len(n, y.len())?;

    let mut rev_bases = Vec::with_capacity(n);
    let mut ty = Vec::with_capacity(n);
    let mut fwd_bases = Vec::with_capacity(n);
    for i in 1..=n {
        rev_bases.push(*crs.g_rev(i)?);
        ty.push(t[i - 1] * y[i - 1]);
        fwd_bases.push(*crs.g_hat_i(i)?);
    }

    let num = pairing(&g1_multiexp(&rev_bases, &ty), c_hat);
    let den = pairing(c_y, &g2_multiexp(&fwd_bases, t));
    let lhs = gt_div(&num, &den);

    Ok(lhs == pairing(pi_eq, crs.g_hat()))
}

/// Orthogonality check:
/// `e(C_y · ∏_j g_{n+1−j}^{−y_j}, Ĉ) = e(π_y, ĝ)`.
pub fn verify_orthogonality(
    c_hat: &G2,
    c_y: &G1,
    y: &[F],
    pi_y: &G1,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_len(n, y.len())?;

    let mut term = c_y.into_group();
    for j in 1..=n {
        if y[j - 1].is_zero() {
            continue;
        }
        term += crs.g_rev(j)?.into_group() * (-y[j - 1]);
    }
    let lhs = pairing(&term.into_affine(), c_hat);
    Ok(lhs == pairing(pi_y, crs.g_hat()))
}

// ============================================================================
// Range-proof checks
// ============================================================================

/// Range-sum check (division form):
/// `[e(∏_{i=1}^ℓ g_{n+1−i}^{2^{i−1}}, Ĉ)] / [e(g_n, V̂)] = e(π_x, ĝ)`.
pub fn verify_range_sum(
    c_hat: &G2,
    v_hat: &G2,
    pi_x: &G1,
    ell: usize,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    if ell == 0 || ell > n {
        return Err(ProofError::BitLengthTooLarge { ell, n });
    }

    let mut term = crate::G1P::zero();
    let mut weight = F::one();
    for i in 1..=ell {
        term += crs.g_rev(i)?.into_group() * weight;
        weight.double_in_place();
    }
    let num = pairing(&term.into_affine(), c_hat);
    let den = pairing(crs.g_i(n)?, v_hat);
    let lhs = gt_div(&num, &den);

    Ok(lhs == pairing(pi_x, crs.g_hat()))
}

/// Aggregated equality-plus-orthogonality check (division form):
/// `[e(C_y^{δ_y} · ∏_i g_{n+1−i}^{(δ_eq t_i − δ_y) y_i}, Ĉ)] /
///  [e(C_y, ∏_i ĝ_i^{δ_eq t_i})] = e(π, ĝ)`.
pub fn verify_eq_orth_aggregate(
    c_hat: &G2,
    c_y: &G1,
    pi: &G1,
    delta_eq: &F,
    delta_y: &F,
    t: &[F],
    y: &[F],
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_len(n, t.len())?;
    check_len(n, y.len())?;

    let mut term = c_y.into_group() * *delta_y;
    for i in 1..=n {
        let e = (*delta_eq * t[i - 1] - delta_y) * y[i - 1];
        if e.is_zero() {
            continue;
        }
        term += crs.g_rev(i)?.into_group() * e;
    }
    let num = pairing(&term.into_affine(), c_hat);

    let mut bases = Vec::with_capacity(n);
    let mut exps = Vec::with_capacity(n);
    for i in 1..=n {
        bases.push(*crs.g_hat_i(i)?);
        exps.push(*delta_eq * t[i - 1]);
    }
    let den = pairing(c_y, &g2_multiexp(&bases, &exps));

    Ok(gt_div(&num, &den) == pairing(pi, crs.g_hat()))
}

/// First-coordinate-only check:
/// `e(∏_{i=2}^n g_{n+1−i}^{s_i}, V̂) = e(π_v, ĝ)`.
pub fn verify_first_coordinate(
    v_hat: &G2,
    s: &[F],
    pi_v: &G1,
    crs: &Crs,
) -> Result<bool, ProofError> {
    let n = crs.n();
    check_len(n - 1, s.len())?;

    let mut term = crate::G1P::zero();
    for i in 2..=n {
        if s[i - 2].is_zero() {
            continue;
        }
        term += crs.g_rev(i)?.into_group() * s[i - 2];
    }
    let lhs = pairing(&term.into_affine(), v_hat);
    Ok(lhs == pairing(pi_v, crs.g_hat()))
}

// ============================================================================
// Composite range-proof verifier
// ============================================================================

/// Verify a composite range proof for `x̂ ∈ [0, 2^ℓ − 1]`.
///
/// Re-derives every challenge from the transcript `(Ĉ, V̂, C_y, ℓ)`, builds
/// the four left-hand sides in their stated (division) forms, and checks
/// `LHS_range^{δ_x} · LHS_eq^{δ_eq} · LHS_orth^{δ_y} · LHS_first^{δ_v}
///  = e(π_agg, ĝ)`.
pub fn verify_range_proof(proof: &RangeProof, ell: usize, crs: &Crs) -> Result<bool, ProofError> {
    let n = crs.n();
    if ell != proof.ell {
        return Ok(false);
    }
    if ell == 0 || ell > n {
        return Err(ProofError::BitLengthTooLarge { ell, n });
    }

    // Re-derive the transcript.
    let y = range_challenge_y(&proof.c_hat, &proof.v_hat);
    let mut y_vec = vec![F::zero(); n];
    y_vec[0] = y;
    let t = range_challenge_t(&y, &proof.c_hat, &proof.c_y);
    let mut t_vec = vec![F::zero(); n];
    t_vec[0] = t;
    let (d_x, d_eq, d_y, d_v) = range_challenge_deltas(&proof.c_hat, &proof.v_hat, &proof.c_y);

    // LHS of the range-sum check.
    let mut term = crate::G1P::zero();
    let mut weight = F::one();
    for i in 1..=ell {
        term += crs.g_rev(i)?.into_group() * weight;
        weight.double_in_place();
    }
    let lhs_range = gt_div(
        &pairing(&term.into_affine(), &proof.c_hat),
        &pairing(crs.g_i(n)?, &proof.v_hat),
    );

    // LHS of the equality check.
    let mut rev_bases = Vec::with_capacity(n);
    let mut ty = Vec::with_capacity(n);
    let mut fwd_bases = Vec::with_capacity(n);
    for i in 1..=n {
        rev_bases.push(*crs.g_rev(i)?);
        ty.push(t_vec[i - 1] * y_vec[i - 1]);
        fwd_bases.push(*crs.g_hat_i(i)?);
    }
    let lhs_eq = gt_div(
        &pairing(&g1_multiexp(&rev_bases, &ty), &proof.c_hat),
        &pairing(&proof.c_y, &g2_multiexp(&fwd_bases, &t_vec)),
    );

    // LHS of the orthogonality check.
    let mut term = proof.c_y.into_group();
    for j in 1..=n {
        if y_vec[j - 1].is_zero() {
            continue;
        }
        term += crs.g_rev(j)?.into_group() * (-y_vec[j - 1]);
    }
    let lhs_orth = pairing(&term.into_affine(), &proof.c_hat);

    // LHS of the first-coordinate check; the s-vector is the t-vector tail.
    let mut term = crate::G1P::zero();
    for i in 2..=n {
        if t_vec[i - 1].is_zero() {
            continue;
        }
        term += crs.g_rev(i)?.into_group() * t_vec[i - 1];
    }
    let lhs_first = pairing(&term.into_affine(), &proof.v_hat);

    let lhs = gt_pow(&lhs_range, &d_x)
        * gt_pow(&lhs_eq, &d_eq)
        * gt_pow(&lhs_orth, &d_y)
        * gt_pow(&lhs_first, &d_v);
    let rhs = pairing(&proof.pi_agg, crs.g_hat());
    Ok(lhs == rhs)
}
