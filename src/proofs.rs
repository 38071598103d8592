//! Proof generators
//!
//! Every proof here is a single 𝔾₁ element built **from the published CRS
//! powers only** — the trapdoor view `(C / g_i^{m_i})^{α^{n+1−i}}` explains
//! the formulas but is never the construction. The aggregated-opening and
//! equality proofs assemble their exponent polynomials explicitly and let
//! [`crate::poly`] raise the CRS to the coefficients; the remaining proofs
//! are direct multi-exponentiations.
//!
//! The composite range proof at the bottom chains the pieces: bit
//! commitments, per-bit openings folded into the sum-of-weights proof,
//! Fiat–Shamir-derived equality/orthogonality layer, and a four-way
//! δ-aggregation into one group element.

#![allow(clippy::too_many_arguments)]

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, One, PrimeField, UniformRand, Zero};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::commit::{self, CommitError};
use crate::crs::{Crs, CrsError};
use crate::poly::{Poly, PolyError};
use crate::wire;
use crate::{F, G1, G1P, G2};

/// Errors raised by proof generation.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// An input vector does not have the required length.
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// A 1-indexed position falls outside `[1, n]`.
    #[error("position {index} out of range [1, {n}]")]
    PositionOutOfRange {
        /// The offending position.
        index: usize,
        /// The CRS dimension.
        n: usize,
    },

    /// The requested bit length exceeds the CRS dimension.
    #[error("bit length {ell} exceeds dimension {n}")]
    BitLengthTooLarge {
        /// Requested bit length ℓ.
        ell: usize,
        /// The CRS dimension.
        n: usize,
    },

    /// The value to range-prove does not fit in ℓ bits.
    #[error("value does not fit in {0} bits")]
    OutOfRange(usize),

    /// Polynomial assembly failure (reserved-degree coefficient, degree cap).
    #[error(transparent)]
    Poly(#[from] PolyError),

    /// CRS access failure.
    #[error(transparent)]
    Crs(#[from] CrsError),

    /// Commitment construction failure.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

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

// ============================================================================
// Point opening
// ============================================================================

/// Point opening `π_i = g_{n+1−i}^γ · ∏_{j≠i} g_{n+1−i+j}^{m_j}`.
///
/// Opens position `i` (1-indexed) of a base commitment to `m` with blinding
/// `γ`. The same product serves commitments living in 𝔾₁ (`C`, checked by
/// the aggregated-opening equation) and in 𝔾₂ (`Ĉ`, checked per-coordinate):
/// the proof element is always on the 𝔾₁ side, and every base it touches
/// (`n+1−i+j`, `j ≠ i`) exists in the CRS precisely because `j = i` is
/// excluded.
pub fn prove_point_open(m: &[F], gamma: &F, i: usize, crs: &Crs) -> Result<G1, ProofError> {
    let n = crs.n();
    check_len(n, m.len())?;
    check_pos(i, n)?;

    let mut acc: G1P = crs.g_rev(i)?.into_group() * *gamma;
    for (j0, m_j) in m.iter().enumerate() {
        let j = j0 + 1;
        if j == i || m_j.is_zero() {
            continue;
        }
        acc += crs.g_i(n + 1 - i + j)?.into_group() * *m_j;
    }
    Ok(acc.into_affine())
}

// ============================================================================
// Aggregated opening
// ============================================================================

/// Aggregated opening `π_S = ∏_{i∈S} π_i^{t_i}` over positions `positions`
/// with weights `t`.
///
/// Instead of materialising each `π_i`, assemble
/// `P(X) = ∑_{i∈S} t_i · X^{n+1−i} · (γ + ∑_{j≠i} m_j X^j)` and raise the
/// CRS to its coefficients; the coefficient at degree `n+1` vanishes by
/// construction because `j = i` is excluded from every inner sum.
pub fn prove_agg_open(
    m: &[F],
    gamma: &F,
    positions: &[usize],
    t: &[F],
    crs: &Crs,
) -> Result<G1, ProofError> {
    let n = crs.n();
    check_len(n, m.len())?;
    check_len(positions.len(), t.len())?;

    // M(X) = ∑_j m_j X^j
    let mut m_coeffs = vec![F::zero(); n + 1];
    for (j0, m_j) in m.iter().enumerate() {
        m_coeffs[j0 + 1] = *m_j;
    }
    let m_poly = Poly::from_coeffs(m_coeffs);

    let mut p = Poly::zero();
    for (k, &i) in positions.iter().enumerate() {
        check_pos(i, n)?;
        let t_i = t[k];
        if t_i.is_zero() {
            continue;
        }
        // γ + M(X) − m_i X^i, then shift by X^{n+1−i} and scale by t_i.
        let inner = m_poly
            .sub(&Poly::monomial(i, m[i - 1]))
            .add(&Poly::constant(*gamma));
        p = p.add(&inner.shift(n + 1 - i).scale(&t_i));
    }

    Ok(p.eval_in_g1(crs)?)
}

// ============================================================================
// Equality proof
// ============================================================================

/// Equality proof `π_eq` linking `(Ĉ, γ)` and `(C_y, γ_y)` through weights
/// `t` and vector `y`.
///
/// Builds `P_num(X) = ∑_i t_i y_i · X^{n+1−i} (γ + ∑_{j≠i} x_j X^j)` and
/// `P_den(X) = ∑_i t_i · X^i (γ_y + ∑_{j≠i} y_j x_j X^{n+1−j})`, then
/// evaluates `P_num − P_den` in the exponent. Both sides leave degree `n+1`
/// empty; a non-zero coefficient there means the inputs were malformed and
/// surfaces as a [`PolyError::DanglingCoefficient`].
pub fn prove_eq(
    t: &[F],
    y: &[F],
    x: &[F],
    gamma: &F,
    gamma_y: &F,
    crs: &Crs,
) -> Result<G1, ProofError> {
    let n = crs.n();
    check_len(n, t.len())?;
    check_len(n, y.len())?;
    check_len(n, x.len())?;

    // M(X) = ∑_j x_j X^j
    let mut m_coeffs = vec![F::zero(); n + 1];
    for (j0, x_j) in x.iter().enumerate() {
        m_coeffs[j0 + 1] = *x_j;
    }
    let m_poly = Poly::from_coeffs(m_coeffs);

    let mut p_num = Poly::zero();
    for i in 1..=n {
        let w = t[i - 1] * y[i - 1];
        if w.is_zero() {
            continue;
        }
        let inner = m_poly
            .sub(&Poly::monomial(i, x[i - 1]))
            .add(&Poly::constant(*gamma));
        p_num = p_num.add(&inner.shift(n + 1 - i).scale(&w));
    }

    // YX(X) = ∑_j y_j x_j X^{n+1−j}
    let mut yx_coeffs = vec![F::zero(); n + 1];
    for j in 1..=n {
        yx_coeffs[n + 1 - j] = y[j - 1] * x[j - 1];
    }
    let yx_poly = Poly::from_coeffs(yx_coeffs);

    let mut p_den = Poly::zero();
    for i in 1..=n {
        let t_i = t[i - 1];
        if t_i.is_zero() {
            continue;
        }
        let inner = yx_poly
            .sub(&Poly::monomial(n + 1 - i, y[i - 1] * x[i - 1]))
            .add(&Poly::constant(*gamma_y));
        p_den = p_den.add(&inner.shift(i).scale(&t_i));
    }

    Ok(p_num.sub(&p_den).eval_in_g1(crs)?)
}

// ============================================================================
// Orthogonality proof
// ============================================================================

/// Orthogonality proof
/// `π_y = g^{γ γ_y} · ∏_j g_{n+1−j}^{γ y_j (x_j−1)} ·
///  ∏_i (g_i^{γ_y} · ∏_{j≠i} g_{n+1−j+i}^{y_j (x_j−1)})^{x_i}`.
///
/// Combined with its verification equation this enforces
/// `∑_i y_i x_i (x_i − 1) = 0`, i.e. binary `x` wherever `y` selects.
pub fn prove_y(x: &[F], y: &[F], gamma: &F, gamma_y: &F, crs: &Crs) -> Result<G1, ProofError> {
    let n = crs.n();
    check_len(n, x.len())?;
    check_len(n, y.len())?;

    let one = F::one();
    let mut acc: G1P = crs.g().into_group() * (*gamma * gamma_y);

    for j in 1..=n {
        let e = *gamma * y[j - 1] * (x[j - 1] - one);
        if e.is_zero() {
            continue;
        }
        acc += crs.g_rev(j)?.into_group() * e;
    }

    for i in 1..=n {
        if x[i - 1].is_zero() {
            continue;
        }
        let mut inner: G1P = crs.g_i(i)?.into_group() * *gamma_y;
        for j in 1..=n {
            if j == i {
                continue;
            }
            let e = y[j - 1] * (x[j - 1] - one);
            if e.is_zero() {
                continue;
            }
            inner += crs.g_i(n + 1 - j + i)?.into_group() * e;
        }
        acc += inner * x[i - 1];
    }

    Ok(acc.into_affine())
}

// ============================================================================
// Range-proof components
// ============================================================================

/// Sum-of-weights proof `π_x = (∏_{i=1}^ℓ π_i^{2^{i−1}}) · g_n^{−r}` from
/// the ℓ per-bit openings of `Ĉ` and the blinding `r` of `V̂`.
pub fn prove_x(bit_proofs: &[G1], r: &F, crs: &Crs) -> Result<G1, ProofError> {
    let n = crs.n();
    if bit_proofs.len() > n {
        return Err(ProofError::BitLengthTooLarge { ell: bit_proofs.len(), n });
    }
    let mut acc = G1P::zero();
    let mut weight = F::one();
    for pi in bit_proofs {
        acc += pi.into_group() * weight;
        weight.double_in_place();
    }
    acc += crs.g_i(n)?.into_group() * (-*r);
    Ok(acc.into_affine())
}

/// First-coordinate-only proof
/// `π_v = ∏_{i=2}^n (g_{n+1−i}^r · g_{n+2−i}^{x̂})^{s_i}`, with the `s_i`
/// supplied by the caller (H_s, or the t-vector inside the composite range
/// proof).
pub fn prove_v(x_hat: &F, r: &F, s: &[F], crs: &Crs) -> Result<G1, ProofError> {
    let n = crs.n();
    check_len(n - 1, s.len())?;
    let mut acc = G1P::zero();
    for i in 2..=n {
        let s_i = s[i - 2];
        if s_i.is_zero() {
            continue;
        }
        let inner: G1P =
            crs.g_rev(i)?.into_group() * *r + crs.g_i(n + 2 - i)?.into_group() * *x_hat;
        acc += inner * s_i;
    }
    Ok(acc.into_affine())
}

/// Aggregate `π = π_eq^{δ_eq} · π_y^{δ_y}`.
pub fn aggregate_pi(pi_eq: &G1, pi_y: &G1, delta_eq: &F, delta_y: &F) -> G1 {
    (pi_eq.into_group() * *delta_eq + pi_y.into_group() * *delta_y).into_affine()
}

// ============================================================================
// Composite range proof
// ============================================================================

/// A complete range proof for `x̂ ∈ [0, 2^ℓ − 1]`: the three commitments the
/// verifier re-derives challenges from, the δ-aggregated proof element, and
/// the bit length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeProof {
    /// Commitment `Ĉ` to the (padded) bit vector.
    pub c_hat: G2,
    /// Integer commitment `V̂` to `x̂`.
    pub v_hat: G2,
    /// Hadamard commitment `C_y` over `y ∘ bits`.
    pub c_y: G1,
    /// δ-aggregation of `π_x`, `π_eq`, `π_y`, `π_v`.
    pub pi_agg: G1,
    /// Bit length ℓ.
    pub ell: usize,
}

/// Challenge `y` for the range proof: SHA-256 over `Ĉ ‖ V̂`.
pub(crate) fn range_challenge_y(c_hat: &G2, v_hat: &G2) -> F {
    let mut h = Sha256::new();
    h.update(wire::g2_bytes(c_hat));
    h.update(wire::g2_bytes(v_hat));
    F::from_be_bytes_mod_order(h.finalize().as_slice())
}

/// Challenge `t` for the range proof: SHA-256 over `y ‖ Ĉ ‖ C_y`.
pub(crate) fn range_challenge_t(y: &F, c_hat: &G2, c_y: &G1) -> F {
    let mut h = Sha256::new();
    h.update(wire::scalar_bytes(y));
    h.update(wire::g2_bytes(c_hat));
    h.update(wire::g1_bytes(c_y));
    F::from_be_bytes_mod_order(h.finalize().as_slice())
}

/// Aggregation challenges `(δ_x, δ_eq, δ_y, δ_v)`: disjoint 8-byte windows
/// of SHA-256 over `Ĉ ‖ V̂ ‖ C_y`.
pub(crate) fn range_challenge_deltas(c_hat: &G2, v_hat: &G2, c_y: &G1) -> (F, F, F, F) {
    let mut h = Sha256::new();
    h.update(wire::g2_bytes(c_hat));
    h.update(wire::g2_bytes(v_hat));
    h.update(wire::g1_bytes(c_y));
    let digest = h.finalize();
    let digest = digest.as_slice();
    let window = |range: std::ops::Range<usize>| {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&digest[range]);
        F::from(u64::from_be_bytes(buf))
    };
    (window(0..8), window(8..16), window(16..24), window(24..32))
}

/// Produce a composite zero-knowledge range proof for `x̂ ∈ [0, 2^ℓ − 1]`.
///
/// Refuses out-of-range inputs (`x̂ ≥ 2^ℓ`) and bit lengths beyond the CRS
/// dimension. The s-vector of the `π_v` layer is the t-vector — the
/// coupling is part of the transcript format and is matched by the
/// verifier.
pub fn prove_range<R: RngCore + CryptoRng>(
    x_hat: &F,
    ell: usize,
    crs: &Crs,
    rng: &mut R,
) -> Result<RangeProof, ProofError> {
    let n = crs.n();
    if ell == 0 || ell > n {
        return Err(ProofError::BitLengthTooLarge { ell, n });
    }
    let bits = commit::scalar_to_bits(x_hat, ell).ok_or(ProofError::OutOfRange(ell))?;

    // Bit vector padded to dimension n.
    let mut x_bits = vec![F::zero(); n];
    for (i, b) in bits.iter().enumerate() {
        if *b {
            x_bits[i] = F::one();
        }
    }

    let gamma = F::rand(rng);
    let r = F::rand(rng);

    let c_hat = commit::commit_ghat(&x_bits, &gamma, crs)?;
    let v_hat = commit::commit_v(x_hat, &r, crs)?;

    // Per-bit openings of Ĉ, folded into the sum-of-weights proof.
    let mut bit_proofs = Vec::with_capacity(ell);
    for i in 1..=ell {
        bit_proofs.push(prove_point_open(&x_bits, &gamma, i, crs)?);
    }
    let pi_x = prove_x(&bit_proofs, &r, crs)?;

    // Fiat–Shamir: y from (Ĉ, V̂), embedded as the vector (y, 0, …, 0).
    let y = range_challenge_y(&c_hat, &v_hat);
    let mut y_vec = vec![F::zero(); n];
    y_vec[0] = y;

    let gamma_y = F::rand(rng);
    let c_y = commit::commit_cy(&y_vec, &x_bits, &gamma_y, crs)?;

    // Fiat–Shamir: t from (y, Ĉ, C_y), embedded the same way.
    let t = range_challenge_t(&y, &c_hat, &c_y);
    let mut t_vec = vec![F::zero(); n];
    t_vec[0] = t;

    let pi_eq = prove_eq(&t_vec, &y_vec, &x_bits, &gamma, &gamma_y, crs)?;
    let pi_y = prove_y(&x_bits, &y_vec, &gamma, &gamma_y, crs)?;
    // The s-vector is the tail of the t-vector.
    let pi_v = prove_v(x_hat, &r, &t_vec[1..], crs)?;

    let (d_x, d_eq, d_y, d_v) = range_challenge_deltas(&c_hat, &v_hat, &c_y);
    let pi_agg = (pi_x.into_group() * d_x
        + pi_eq.into_group() * d_eq
        + pi_y.into_group() * d_y
        + pi_v.into_group() * d_v)
        .into_affine();

    Ok(RangeProof { c_hat, v_hat, c_y, pi_agg, ell })
}
