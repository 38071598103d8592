//! Pairing-group helpers
//!
//! Thin, explicit wrappers over the Arkworks BN254 backend: multi-
//! exponentiation in 𝔾₁/𝔾₂, the bilinear map with its output taken directly
//! in the target field, 𝔾_T division as multiplication-by-inverse, and the
//! two hash primitives (hash-to-scalar, hash-to-𝔾₁).
//!
//! 𝔾_T division deserves a note: every division-form verification equation
//! in [`crate::verify`] is checked as `numerator · denominator⁻¹ == rhs`.
//! [`gt_div`] is the only implementation of that division and no caller
//! rewrites the equations around it.

use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField, UniformRand, Zero};
use rand::{CryptoRng, RngCore};

use crate::{F, G1, G1P, G2, G2P, Gt};

/// Sample a uniform 𝔾₁ element (never the identity).
pub fn rand_g1<R: RngCore + CryptoRng>(rng: &mut R) -> G1 {
    loop {
        let p = G1P::rand(rng).into_affine();
        if !p.is_zero() {
            return p;
        }
    }
}

/// Sample a uniform 𝔾₂ element (never the identity).
pub fn rand_g2<R: RngCore + CryptoRng>(rng: &mut R) -> G2 {
    loop {
        let p = G2P::rand(rng).into_affine();
        if !p.is_zero() {
            return p;
        }
    }
}

/// Compute the bilinear map `e: 𝔾₁ × 𝔾₂ → 𝔾_T`.
#[inline]
pub fn pairing(a: &G1, b: &G2) -> Gt {
    ark_bn254::Bn254::pairing(*a, *b).0
}

/// 𝔾_T division: `num / den = num · den⁻¹`.
///
/// Pairing outputs are roots of unity in the target field and are never
/// zero, so the inverse always exists.
#[inline]
pub fn gt_div(num: &Gt, den: &Gt) -> Gt {
    let inv = den.inverse().expect("GT element is non-zero");
    *num * inv
}

/// Raise a 𝔾_T element to a scalar power.
#[inline]
pub fn gt_pow(base: &Gt, e: &F) -> Gt {
    base.pow(e.into_bigint())
}

/// Multi-exponentiation in 𝔾₁: `∏ bases[i]^{exps[i]}`.
///
/// Empty input yields the identity. Length mismatch is a caller bug.
pub fn g1_multiexp(bases: &[G1], exps: &[F]) -> G1 {
    assert_eq!(bases.len(), exps.len(), "multiexp length mismatch");
    let mut acc = G1P::zero();
    for (b, e) in bases.iter().zip(exps.iter()) {
        if e.is_zero() {
            continue;
        }
        acc += b.into_group() * *e;
    }
    acc.into_affine()
}

/// Multi-exponentiation in 𝔾₂: `∏ bases[i]^{exps[i]}`.
pub fn g2_multiexp(bases: &[G2], exps: &[F]) -> G2 {
    assert_eq!(bases.len(), exps.len(), "multiexp length mismatch");
    let mut acc = G2P::zero();
    for (b, e) in bases.iter().zip(exps.iter()) {
        if e.is_zero() {
            continue;
        }
        acc += b.into_group() * *e;
    }
    acc.into_affine()
}

/// Single exponentiation in 𝔾₁, returned in affine form.
#[inline]
pub fn g1_mul(base: &G1, e: &F) -> G1 {
    (base.into_group() * *e).into_affine()
}

/// Single exponentiation in 𝔾₂, returned in affine form.
#[inline]
pub fn g2_mul(base: &G2, e: &F) -> G2 {
    (base.into_group() * *e).into_affine()
}

/// Hash arbitrary bytes into 𝔽_p under an explicit domain tag.
///
/// BLAKE3 with a length-delimited absorb and a 64-byte XOF output reduced
/// modulo p; the wide output keeps the reduction bias negligible.
pub fn hash_to_scalar(domain: &[u8], data: &[u8]) -> F {
    let mut h = blake3::Hasher::new();
    h.update(b"vdstream.h2f.v1");
    h.update(&(domain.len() as u64).to_be_bytes());
    h.update(domain);
    h.update(&(data.len() as u64).to_be_bytes());
    h.update(data);
    let mut buf = [0u8; 64];
    h.finalize_xof().fill(&mut buf);
    F::from_le_bytes_mod_order(&buf)
}

/// Hash arbitrary bytes to a point of 𝔾₁ (try-and-increment).
///
/// Each attempt derives candidate x-coordinate bytes from the input and a
/// counter; BN254's 𝔾₁ has cofactor one, so any curve point is in the prime
/// subgroup.
pub fn hash_to_g1(data: &[u8]) -> G1 {
    let mut ctr: u32 = 0;
    loop {
        let mut h = blake3::Hasher::new();
        h.update(b"vdstream.h2c.g1.v1");
        h.update(&(data.len() as u64).to_be_bytes());
        h.update(data);
        h.update(&ctr.to_be_bytes());
        let mut buf = [0u8; 64];
        h.finalize_xof().fill(&mut buf);
        if let Some(p) = G1::from_random_bytes(&buf) {
            if !p.is_zero() {
                return p;
            }
        }
        ctr = ctr.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, UniformRand};
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::from_seed([7u8; 32])
    }

    #[test]
    fn gt_div_is_multiplication_by_inverse() {
        let mut rng = rng();
        let a = rand_g1(&mut rng);
        let b = rand_g2(&mut rng);
        let x = pairing(&a, &b);
        assert!(gt_div(&x, &x).is_one());
        let y = gt_pow(&x, &F::from(3u64));
        assert_eq!(gt_div(&y, &x), gt_pow(&x, &F::from(2u64)));
    }

    #[test]
    fn pairing_is_bilinear() {
        let mut rng = rng();
        let a = rand_g1(&mut rng);
        let b = rand_g2(&mut rng);
        let s = F::rand(&mut rng);
        let lhs = pairing(&g1_mul(&a, &s), &b);
        let rhs = gt_pow(&pairing(&a, &b), &s);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn multiexp_matches_naive_product() {
        let mut rng = rng();
        let bases: Vec<G1> = (0..5).map(|_| rand_g1(&mut rng)).collect();
        let exps: Vec<F> = (0..5).map(|_| F::rand(&mut rng)).collect();
        let fast = g1_multiexp(&bases, &exps);
        let mut naive = G1P::zero();
        for (b, e) in bases.iter().zip(exps.iter()) {
            naive += b.into_group() * *e;
        }
        assert_eq!(fast, naive.into_affine());
    }

    #[test]
    fn empty_multiexp_is_identity() {
        assert!(g1_multiexp(&[], &[]).is_zero());
        assert!(g2_multiexp(&[], &[]).is_zero());
    }

    #[test]
    fn hash_to_scalar_separates_domains() {
        let a = hash_to_scalar(b"A", b"payload");
        let b = hash_to_scalar(b"B", b"payload");
        assert_ne!(a, b);
        assert_eq!(a, hash_to_scalar(b"A", b"payload"));
    }

    #[test]
    fn hash_to_g1_lands_on_curve() {
        let p = hash_to_g1(b"some item");
        assert!(p.is_on_curve());
        assert!(!p.is_zero());
        assert_eq!(p, hash_to_g1(b"some item"));
        assert_ne!(p, hash_to_g1(b"another item"));
    }
}
