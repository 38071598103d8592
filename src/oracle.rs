//! Fiat–Shamir oracles with domain separation
//!
//! Three random oracles turn the interactive protocols non-interactive:
//!
//! - [`h_t`]   — challenge weight vector `(t_1, …, t_n)` for aggregated
//!   openings and the auditor's non-interactive challenge; prefix `"HT"`.
//! - [`h_agg`] — aggregation pair `(δ_eq, δ_y)`; prefix `"HAGG"`.
//! - [`h_s`]   — per-index scalar `s_i` for the first-coordinate-only proof;
//!   prefix `"HS"`.
//!
//! Every absorb is the **canonical wire encoding** of the element, length
//! delimited, so prover and verifier replay byte-identical transcripts;
//! identity elements use the reserved sentinel and are therefore
//! unambiguous (the auditor's challenge deliberately absorbs two
//! identities). Challenges are expanded per counter through a BLAKE3 XOF
//! and reduced into 𝔽_p.

use ark_ff::PrimeField;

use crate::wire;
use crate::{F, G1, G2};

fn absorb(h: &mut blake3::Hasher, bytes: &[u8]) {
    h.update(&(bytes.len() as u64).to_be_bytes());
    h.update(bytes);
}

fn squeeze(h: &blake3::Hasher, counter: u32) -> F {
    let mut h = h.clone();
    h.update(b":ctr:");
    h.update(&counter.to_be_bytes());
    let mut buf = [0u8; 64];
    h.finalize_xof().fill(&mut buf);
    F::from_le_bytes_mod_order(&buf)
}

/// `H_t(C, Ĉ, C_y, n, ctx) → (t_1, …, t_n)`.
///
/// Callers without a real `Ĉ`/`C_y` in their transcript (the auditor path)
/// pass the group identities; `ctx` is the caller's domain string.
pub fn h_t(c: &G1, c_hat: &G2, c_y: &G1, n: usize, ctx: &[u8]) -> Vec<F> {
    let mut h = blake3::Hasher::new();
    h.update(b"HT");
    absorb(&mut h, &wire::g1_bytes(c));
    absorb(&mut h, &wire::g2_bytes(c_hat));
    absorb(&mut h, &wire::g1_bytes(c_y));
    absorb(&mut h, ctx);
    (1..=n as u32).map(|i| squeeze(&h, i)).collect()
}

/// `H_agg(C, Ĉ, C_y) → (δ_eq, δ_y)`.
pub fn h_agg(c: &G1, c_hat: &G2, c_y: &G1) -> (F, F) {
    let mut h = blake3::Hasher::new();
    h.update(b"HAGG");
    absorb(&mut h, &wire::g1_bytes(c));
    absorb(&mut h, &wire::g2_bytes(c_hat));
    absorb(&mut h, &wire::g1_bytes(c_y));
    (squeeze(&h, 0), squeeze(&h, 1))
}

/// `H_s(i, domain, V̂, Ĉ, C_y) → s_i` for one index of the domain.
pub fn h_s(i: usize, domain: &[usize], v_hat: &G2, c_hat: &G2, c_y: &G1) -> F {
    let mut h = blake3::Hasher::new();
    h.update(b"HS");
    let mut domain_bytes = Vec::with_capacity(domain.len() * 4);
    for idx in domain {
        domain_bytes.extend_from_slice(&(*idx as u32).to_be_bytes());
    }
    absorb(&mut h, &domain_bytes);
    absorb(&mut h, &wire::g2_bytes(v_hat));
    absorb(&mut h, &wire::g2_bytes(c_hat));
    absorb(&mut h, &wire::g1_bytes(c_y));
    squeeze(&h, i as u32)
}

/// All of `[s_i for i in domain]` in one call.
pub fn h_s_batch(domain: &[usize], v_hat: &G2, c_hat: &G2, c_y: &G1) -> Vec<F> {
    domain.iter().map(|i| h_s(*i, domain, v_hat, c_hat, c_y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{rand_g1, rand_g2};
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> (G1, G2, G1) {
        let mut rng = StdRng::from_seed([5u8; 32]);
        (rand_g1(&mut rng), rand_g2(&mut rng), rand_g1(&mut rng))
    }

    #[test]
    fn h_t_is_deterministic_and_context_separated() {
        let (c, c_hat, c_y) = sample();
        let a = h_t(&c, &c_hat, &c_y, 8, b"");
        let b = h_t(&c, &c_hat, &c_y, 8, b"");
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        let ctxed = h_t(&c, &c_hat, &c_y, 8, b"VDS-DA-AUDIT-ZK");
        assert_ne!(a, ctxed);
        // Components are pairwise distinct with overwhelming probability.
        assert_ne!(a[0], a[1]);
    }

    #[test]
    fn h_t_accepts_identity_placeholders() {
        let (c, _, _) = sample();
        let t = h_t(&c, &G2::identity(), &G1::identity(), 4, b"VDS-DA-AUDIT-ZK");
        assert_eq!(t.len(), 4);
        // Binding: a different commitment changes every component.
        let mut rng = StdRng::from_seed([6u8; 32]);
        let c2 = rand_g1(&mut rng);
        let t2 = h_t(&c2, &G2::identity(), &G1::identity(), 4, b"VDS-DA-AUDIT-ZK");
        assert_ne!(t, t2);
    }

    #[test]
    fn oracles_are_mutually_domain_separated() {
        let (c, c_hat, c_y) = sample();
        let t = h_t(&c, &c_hat, &c_y, 1, b"");
        let (d_eq, d_y) = h_agg(&c, &c_hat, &c_y);
        assert_ne!(t[0], d_eq);
        assert_ne!(d_eq, d_y);
    }

    #[test]
    fn h_s_batch_matches_single_calls() {
        let (_, c_hat, c_y) = sample();
        let v_hat = c_hat;
        let domain: Vec<usize> = (2..=8).collect();
        let batch = h_s_batch(&domain, &v_hat, &c_hat, &c_y);
        assert_eq!(batch.len(), domain.len());
        for (k, i) in domain.iter().enumerate() {
            assert_eq!(batch[k], h_s(*i, &domain, &v_hat, &c_hat, &c_y));
        }
    }
}
