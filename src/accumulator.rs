//! Bilinear-map accumulator (revocation blacklist)
//!
//! A dynamic accumulator over the asymmetric pairing, used as the VDS
//! revocation blacklist. Accumulator values and witnesses live in 𝔾₁; the
//! verification key `ĝ^s` lives in 𝔾₂, giving the one-pairing check
//!
//! ```text
//! e(w, ĝ^y · ĝ^s) = e(f · g^u, ĝ)
//! ```
//!
//! for a non-membership witness `(w, u)` of an item hashing to `y`.
//!
//! State machine over the number of revocations `k`:
//!
//! - initially `f = g`, `server_keys = (g,)`, blacklist empty;
//! - each revocation maps `f ← f^{H(item)+s}`, appends the item to the
//!   blacklist, and extends `server_keys` by `(last)^s`.
//!
//! Witness generation never touches the secret `s`: the storage server
//! reconstructs the blacklist polynomial `f_X(κ) = ∏_{x∈X}(H(x)+κ)`,
//! shifts it by `u_y = −f_X(−y)`, divides exactly by `(κ + y)`, and raises
//! the server keys `g^{s^i}` to the quotient coefficients. Soundness
//! therefore requires `|server_keys| ≥ |X|` before any witness is answered
//! for the updated blacklist; a shortfall is a sync bug between owner and
//! server, not a recoverable condition.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, UniformRand, Zero};
use rand::{CryptoRng, RngCore};

use crate::group::{g2_mul, pairing, rand_g1, rand_g2};
use crate::poly::Poly;
use crate::{F, G1, G1P, G2};

/// Errors raised by the accumulator.
#[derive(Debug, thiserror::Error)]
pub enum AccumulatorError {
    /// The queried item is a member of the blacklist; no non-membership
    /// witness exists.
    #[error("item is in the blacklist")]
    ItemInBlacklist,
}

/// The accumulator trapdoor `s`, held only by the data owner.
#[derive(Clone)]
pub struct AccumulatorSecretKey(F);

impl std::fmt::Debug for AccumulatorSecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the trapdoor.
        f.write_str("AccumulatorSecretKey(..)")
    }
}

/// Public verification key `(g, ĝ, ĝ^s)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorPublicKey {
    /// 𝔾₁ generator used by accumulator values and witnesses.
    pub g: G1,
    /// 𝔾₂ generator.
    pub g_hat: G2,
    /// `ĝ^s`.
    pub g_hat_s: G2,
}

/// Non-membership witness `(w, u)`.
///
/// The degenerate empty-blacklist pair is `(1_{𝔾₁}, −1)`; the deliberately
/// failing dummy pair for revoked items is `(1_{𝔾₁}, 0)`. Both are ordinary
/// values of this type and serialize through the reserved identity
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonMembershipWitness {
    /// Witness group element.
    pub w: G1,
    /// Auxiliary scalar.
    pub u: F,
}

impl NonMembershipWitness {
    /// The dummy witness `(1_{𝔾₁}, 0)` substituted for revoked items so
    /// that the verifier sees a clean rejection instead of a server error.
    pub fn dummy() -> Self {
        NonMembershipWitness { w: G1::identity(), u: F::zero() }
    }
}

/// Output of [`setup`]: the owner-side secret plus everything that is
/// handed out.
#[derive(Debug, Clone)]
pub struct AccumulatorSetup {
    /// Trapdoor `s` (owner only).
    pub sk: AccumulatorSecretKey,
    /// Public key for verifiers.
    pub pk: AccumulatorPublicKey,
    /// Initial accumulator value `f = g` (empty blacklist).
    pub f_initial: G1,
    /// Initial server keys `(g,)`.
    pub server_keys: Vec<G1>,
}

/// Sample fresh generators and a trapdoor; start from the empty blacklist.
///
/// The generators are sampled here, independent of the CRS generators.
pub fn setup<R: RngCore + CryptoRng>(rng: &mut R) -> AccumulatorSetup {
    let g = rand_g1(rng);
    let g_hat = rand_g2(rng);
    let s = F::rand(rng);
    let pk = AccumulatorPublicKey { g, g_hat, g_hat_s: g2_mul(&g_hat, &s) };
    AccumulatorSetup {
        sk: AccumulatorSecretKey(s),
        pk,
        f_initial: g,
        server_keys: vec![g],
    }
}

/// Hash item bytes to a non-zero scalar.
///
/// On the (negligible) zero outcome, a NUL byte is appended and the input
/// rehashed until the scalar is non-zero, so the map never lands on the
/// forbidden value.
pub fn hash_item(item: &[u8]) -> F {
    let mut buf = item.to_vec();
    loop {
        let h = crate::group::hash_to_scalar(b"vdstream.acc.item.v1", &buf);
        if !h.is_zero() {
            return h;
        }
        buf.push(0);
    }
}

/// Owner-side blacklist update: `f_new = f^{H(item)+s}`.
pub fn add_to_blacklist(sk: &AccumulatorSecretKey, f_current: &G1, item: &[u8]) -> G1 {
    let e_i = hash_item(item);
    (f_current.into_group() * (e_i + sk.0)).into_affine()
}

/// Owner-side server-key extension: appends `(last)^s = g^{s^{k+1}}` and
/// returns the appended key for forwarding to the storage server.
pub fn expand_server_keys(sk: &AccumulatorSecretKey, server_keys: &mut Vec<G1>) -> G1 {
    let last = server_keys.last().expect("server keys are never empty");
    let next = (last.into_group() * sk.0).into_affine();
    server_keys.push(next);
    next
}

/// Server-side non-membership witness generation for `item` against the
/// blacklist `blacklist`, using the trapdoor-free `server_keys` powers.
///
/// Returns [`AccumulatorError::ItemInBlacklist`] when the item is a member;
/// the storage server substitutes [`NonMembershipWitness::dummy`] in that
/// case rather than surfacing the error to its caller.
pub fn prove_non_membership(
    server_keys: &[G1],
    _f_current: &G1,
    item: &[u8],
    blacklist: &[Vec<u8>],
) -> Result<NonMembershipWitness, AccumulatorError> {
    if blacklist.is_empty() {
        // Empty blacklist: (1, −1) satisfies the check against f = g.
        return Ok(NonMembershipWitness { w: G1::identity(), u: -F::one() });
    }

    assert!(
        server_keys.len() > blacklist.len(),
        "server keys out of sync with blacklist: {} keys for {} items",
        server_keys.len(),
        blacklist.len()
    );

    let y = hash_item(item);
    let members: Vec<F> = blacklist.iter().map(|x| hash_item(x)).collect();

    // u_y = −∏(H(x) − y); zero iff the item is a member.
    let mut u = F::one();
    for x in &members {
        u *= *x - y;
    }
    u = -u;
    if u.is_zero() {
        return Err(AccumulatorError::ItemInBlacklist);
    }

    // f_X(κ) = ∏ (H(x) + κ); h_X(κ) = f_X(κ) + u_y; q̂_X = h_X / (κ + y).
    let mut f_x = Poly::constant(F::one());
    for x in &members {
        f_x = f_x.mul(&Poly::from_coeffs(vec![*x, F::one()]));
    }
    let h_x = f_x.add(&Poly::constant(u));
    let (q_hat, rem) = h_x.divide_by_linear(&y);
    debug_assert!(rem.is_zero(), "blacklist quotient must divide exactly");

    let mut w = G1P::zero();
    for (i, v_i) in q_hat.coeffs().iter().enumerate() {
        if v_i.is_zero() {
            continue;
        }
        assert!(
            i < server_keys.len(),
            "server keys too short for quotient degree {i}"
        );
        w += server_keys[i].into_group() * *v_i;
    }

    Ok(NonMembershipWitness { w: w.into_affine(), u })
}

/// Verifier-side check: `(w, u)` accepts iff
/// `e(w, ĝ^y · ĝ^s) = e(f · g^u, ĝ)` where `y = H(item)`.
pub fn verify_non_membership(
    pk: &AccumulatorPublicKey,
    f_current: &G1,
    item: &[u8],
    witness: &NonMembershipWitness,
) -> bool {
    let y = hash_item(item);
    let rhs_key = (pk.g_hat.into_group() * y + pk.g_hat_s.into_group()).into_affine();
    let lhs = pairing(&witness.w, &rhs_key);
    let f_g_u = (f_current.into_group() + pk.g.into_group() * witness.u).into_affine();
    let rhs = pairing(&f_g_u, &pk.g_hat);
    lhs == rhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::from_seed([67u8; 32])
    }

    /// Owner-side revocation applied to a local mirror of the state.
    fn revoke(
        sk: &AccumulatorSecretKey,
        f: &mut G1,
        server_keys: &mut Vec<G1>,
        blacklist: &mut Vec<Vec<u8>>,
        item: &[u8],
    ) {
        *f = add_to_blacklist(sk, f, item);
        blacklist.push(item.to_vec());
        expand_server_keys(sk, server_keys);
    }

    #[test]
    fn empty_blacklist_witness_is_degenerate_and_verifies() {
        let mut rng = rng();
        let setup = setup(&mut rng);
        let wit =
            prove_non_membership(&setup.server_keys, &setup.f_initial, b"item", &[]).unwrap();
        assert!(wit.w.is_zero());
        assert_eq!(wit.u, -F::one());
        assert!(verify_non_membership(&setup.pk, &setup.f_initial, b"item", &wit));
    }

    #[test]
    fn non_member_witness_verifies_after_revocations() {
        let mut rng = rng();
        let s = setup(&mut rng);
        let mut f = s.f_initial;
        let mut keys = s.server_keys.clone();
        let mut blacklist = Vec::new();

        for item in [b"sig-a".as_slice(), b"sig-b", b"sig-c"] {
            revoke(&s.sk, &mut f, &mut keys, &mut blacklist, item);
        }
        assert_eq!(keys.len(), 4);
        assert_eq!(blacklist.len(), 3);

        let wit = prove_non_membership(&keys, &f, b"sig-d", &blacklist).unwrap();
        assert!(verify_non_membership(&s.pk, &f, b"sig-d", &wit));

        // A stale accumulator value no longer matches the witness.
        assert!(!verify_non_membership(&s.pk, &s.f_initial, b"sig-d", &wit));
    }

    #[test]
    fn member_witness_generation_is_refused() {
        let mut rng = rng();
        let s = setup(&mut rng);
        let mut f = s.f_initial;
        let mut keys = s.server_keys.clone();
        let mut blacklist = Vec::new();
        revoke(&s.sk, &mut f, &mut keys, &mut blacklist, b"revoked-sig");

        assert!(matches!(
            prove_non_membership(&keys, &f, b"revoked-sig", &blacklist),
            Err(AccumulatorError::ItemInBlacklist)
        ));
    }

    #[test]
    fn dummy_witness_fails_verification_on_nonempty_blacklist() {
        let mut rng = rng();
        let s = setup(&mut rng);
        let mut f = s.f_initial;
        let mut keys = s.server_keys.clone();
        let mut blacklist = Vec::new();
        revoke(&s.sk, &mut f, &mut keys, &mut blacklist, b"revoked-sig");

        let dummy = NonMembershipWitness::dummy();
        assert!(!verify_non_membership(&s.pk, &f, b"revoked-sig", &dummy));
    }

    #[test]
    fn witnesses_are_item_specific() {
        let mut rng = rng();
        let s = setup(&mut rng);
        let mut f = s.f_initial;
        let mut keys = s.server_keys.clone();
        let mut blacklist = Vec::new();
        revoke(&s.sk, &mut f, &mut keys, &mut blacklist, b"x1");
        revoke(&s.sk, &mut f, &mut keys, &mut blacklist, b"x2");

        let wit = prove_non_membership(&keys, &f, b"good", &blacklist).unwrap();
        assert!(verify_non_membership(&s.pk, &f, b"good", &wit));
        // The same witness presented for a different item fails.
        assert!(!verify_non_membership(&s.pk, &f, b"other", &wit));
    }

    #[test]
    fn hash_item_is_deterministic_and_nonzero() {
        let a = hash_item(b"payload");
        assert_eq!(a, hash_item(b"payload"));
        assert!(!a.is_zero());
        assert_ne!(a, hash_item(b"payload2"));
    }
}
