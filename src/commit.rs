//! Commitment constructors
//!
//! Four commitments, all 1-indexed against the CRS:
//!
//! - `commit_g`     — `C  = g^γ · ∏ g_j^{m_j}` in 𝔾₁ (data columns)
//! - `commit_ghat`  — `Ĉ  = ĝ^γ · ∏ ĝ_j^{x_j}` in 𝔾₂ (time vector, range bits)
//! - `commit_cy`    — `C_y = g^{γ_y} · ∏ g_{n+1−j}^{y_j x_j}` in 𝔾₁, the
//!   reverse-indexed Hadamard commitment. The reversal is what makes the
//!   equality proof's numerator and denominator polynomials line up.
//! - `commit_v`     — `V̂ = ĝ^r · ĝ_1^{x̂}` in 𝔾₂ (integer commitment for
//!   range proofs, `x̂ = ∑ x_i 2^{i−1}`)
//!
//! plus the pure little-endian bit↔scalar conversions used by the range
//! proof.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, Field, PrimeField, Zero};

use crate::crs::{Crs, CrsError};
use crate::{F, G1, G1P, G2, G2P};

/// Errors raised by commitment construction.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// An input vector does not have the CRS dimension.
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required length (the CRS dimension n).
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// CRS access failure.
    #[error(transparent)]
    Crs(#[from] CrsError),
}

fn check_len(crs: &Crs, v: &[F]) -> Result<(), CommitError> {
    if v.len() != crs.n() {
        return Err(CommitError::LengthMismatch { expected: crs.n(), actual: v.len() });
    }
    Ok(())
}

/// Base commitment `C = g^γ · ∏_{j=1}^n g_j^{m_j} ∈ 𝔾₁`.
pub fn commit_g(m: &[F], gamma: &F, crs: &Crs) -> Result<G1, CommitError> {
    check_len(crs, m)?;
    let mut acc: G1P = crs.g().into_group() * *gamma;
    for (j0, m_j) in m.iter().enumerate() {
        if m_j.is_zero() {
            continue;
        }
        acc += crs.g_i(j0 + 1)?.into_group() * *m_j;
    }
    Ok(acc.into_affine())
}

/// Base commitment `Ĉ = ĝ^γ · ∏_{j=1}^n ĝ_j^{x_j} ∈ 𝔾₂`.
pub fn commit_ghat(x: &[F], gamma: &F, crs: &Crs) -> Result<G2, CommitError> {
    check_len(crs, x)?;
    let mut acc: G2P = crs.g_hat().into_group() * *gamma;
    for (j0, x_j) in x.iter().enumerate() {
        if x_j.is_zero() {
            continue;
        }
        acc += crs.g_hat_i(j0 + 1)?.into_group() * *x_j;
    }
    Ok(acc.into_affine())
}

/// Reverse-indexed Hadamard commitment
/// `C_y = g^{γ_y} · ∏_{j=1}^n g_{n+1−j}^{y_j x_j} ∈ 𝔾₁`.
pub fn commit_cy(y: &[F], x: &[F], gamma_y: &F, crs: &Crs) -> Result<G1, CommitError> {
    check_len(crs, y)?;
    check_len(crs, x)?;
    let mut acc: G1P = crs.g().into_group() * *gamma_y;
    for j in 1..=crs.n() {
        let e = y[j - 1] * x[j - 1];
        if e.is_zero() {
            continue;
        }
        acc += crs.g_rev(j)?.into_group() * e;
    }
    Ok(acc.into_affine())
}

/// Integer commitment `V̂ = ĝ^r · ĝ_1^{x̂} ∈ 𝔾₂`.
pub fn commit_v(x_hat: &F, r: &F, crs: &Crs) -> Result<G2, CommitError> {
    let mut acc: G2P = crs.g_hat().into_group() * *r;
    acc += crs.g_hat_i(1)?.into_group() * *x_hat;
    Ok(acc.into_affine())
}

/// Weighted sum of a little-endian bit vector: `x̂ = ∑ b_i 2^{i−1}`.
pub fn bits_to_scalar(bits: &[bool]) -> F {
    let mut acc = F::zero();
    let mut weight = F::from(1u64);
    for b in bits {
        if *b {
            acc += weight;
        }
        weight.double_in_place();
    }
    acc
}

/// Little-endian bit decomposition of a scalar into `ell` bits.
///
/// Returns `None` when the scalar does not fit in `ell` bits — the caller
/// asked to range-prove an out-of-range value.
pub fn scalar_to_bits(x: &F, ell: usize) -> Option<Vec<bool>> {
    let repr = x.into_bigint();
    if repr.num_bits() as usize > ell {
        return None;
    }
    Some((0..ell).map(|i| repr.get_bit(i)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::from_seed([31u8; 32])
    }

    #[test]
    fn commitments_reject_wrong_lengths() {
        let mut rng = rng();
        let crs = Crs::keygen(4, &mut rng);
        let gamma = F::rand(&mut rng);
        let short = vec![F::from(1u64); 3];
        assert!(matches!(
            commit_g(&short, &gamma, &crs),
            Err(CommitError::LengthMismatch { expected: 4, actual: 3 })
        ));
        assert!(commit_ghat(&short, &gamma, &crs).is_err());
        let ok = vec![F::from(1u64); 4];
        assert!(commit_cy(&ok, &short, &gamma, &crs).is_err());
    }

    #[test]
    fn commitment_is_binding_to_inputs() {
        let mut rng = rng();
        let crs = Crs::keygen(4, &mut rng);
        let gamma = F::rand(&mut rng);
        let m1: Vec<F> = (0..4).map(|_| F::rand(&mut rng)).collect();
        let mut m2 = m1.clone();
        m2[2] += F::from(1u64);
        let c1 = commit_g(&m1, &gamma, &crs).unwrap();
        let c2 = commit_g(&m2, &gamma, &crs).unwrap();
        assert_ne!(c1, c2);
        // Same message, fresh blinding: different commitment (hiding).
        let c3 = commit_g(&m1, &F::rand(&mut rng), &crs).unwrap();
        assert_ne!(c1, c3);
    }

    #[test]
    fn cy_uses_reverse_bases() {
        // With y = e_1 (first unit vector), C_y must involve g_n, not g_1:
        // C_y = g^{γ_y} · g_n^{x_1}.
        let mut rng = rng();
        let crs = Crs::keygen(4, &mut rng);
        let gamma_y = F::rand(&mut rng);
        let mut y = vec![F::zero(); 4];
        y[0] = F::from(1u64);
        let x: Vec<F> = (0..4).map(|_| F::rand(&mut rng)).collect();
        let cy = commit_cy(&y, &x, &gamma_y, &crs).unwrap();
        let expected = (crs.g().into_group() * gamma_y
            + crs.g_i(4).unwrap().into_group() * x[0])
            .into_affine();
        assert_eq!(cy, expected);
    }

    #[test]
    fn bit_conversions_round_trip() {
        let x = F::from(0b1011u64);
        let bits = scalar_to_bits(&x, 8).unwrap();
        assert_eq!(bits[..4], [true, true, false, true]);
        assert_eq!(bits_to_scalar(&bits), x);
        // 13 needs 4 bits; 3 are not enough.
        assert!(scalar_to_bits(&F::from(13u64), 3).is_none());
        assert!(scalar_to_bits(&F::from(13u64), 4).is_some());
        // Zero decomposes at any width.
        assert_eq!(bits_to_scalar(&scalar_to_bits(&F::zero(), 5).unwrap()), F::zero());
    }
}
