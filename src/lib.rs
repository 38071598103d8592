//! Crate root: public surface, core aliases, and protocol-wide invariants
//!
//! `vdstream` is the cryptographic core of a verifiable data streaming (VDS)
//! system. A resource-constrained *data owner* publishes short batches of
//! vectorised data to an untrusted *storage server*; any *consumer* can ask
//! the server for a weighted inner product over a stored batch and receive a
//! constant-size proof, and any *auditor* can audit a batch non-interactively.
//! The owner can revoke a batch, after which no proof for it verifies.
//!
//! The crate is organised leaves-first:
//!
//! - [`crs`] — structured public parameters `{g^{α^i}}`, `{ĝ^{α^i}}` with the
//!   index `n+1` absent from the 𝔾₁ side **by construction**.
//! - [`commit`] — the four commitment constructors (data, data-in-𝔾₂,
//!   reverse-indexed Hadamard, integer).
//! - [`oracle`] — the three domain-separated Fiat–Shamir oracles.
//! - [`poly`] — dense 𝔽_p\[X\] arithmetic and evaluation in the exponent.
//! - [`proofs`] / [`verify`] — proof generators and the eight pairing-product
//!   verification equations, plus the composite range proof.
//! - [`accumulator`] — the bilinear-map revocation blacklist with succinct
//!   non-membership witnesses.
//! - [`sign`] — the ECDSA binding signature over a curve independent of the
//!   pairing curve.
//! - [`owner`], [`server`], [`verifier`] — the three protocol roles.
//! - [`wire`] — canonical byte encodings, including the reserved identity
//!   sentinel.
//!
//! ## Invariants
//!
//! - **Field & curves.** The pairing curve is BN254 (`F = ark_bn254::Fr`,
//!   `G1`/`G2` affine). The pairing is asymmetric (type-3); nothing in this
//!   crate assumes 𝔾₁ = 𝔾₂. The binding signature lives on secp256k1.
//! - **No trapdoor at runtime.** Every proof is built from the published CRS
//!   powers only. The CRS trapdoor α exists transiently inside key
//!   generation and is discarded; retaining it requires the `dev-trapdoor`
//!   feature, which is insecure and loudly flagged.
//! - **Division-form checks.** 𝔾_T division is multiplication by inverse,
//!   and division-form equations are checked exactly as stated — no
//!   algebraic rewrites.
//! - **Canonical bytes.** Every hash and every signature consumes the wire
//!   encoding from [`wire`]; two peers can never disagree on the bytes of a
//!   group element, identity elements included.
//!
//! Violating an invariant at runtime yields a precise typed error, never UB.

#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms)]

/// Bilinear-map accumulator used as the revocation blacklist.
pub mod accumulator;
/// Commitment constructors (C, Ĉ, C_y, V̂) and bit↔scalar helpers.
pub mod commit;
/// CRS generation, validation, accessors, and byte-level IO.
pub mod crs;
/// Pairing-group helpers: multi-exponentiation, 𝔾_T division, hashing.
pub mod group;
/// Domain-separated Fiat–Shamir oracles H_t, H_agg, H_s.
pub mod oracle;
/// Data Owner role: batch creation, revocation, update.
pub mod owner;
/// Dense 𝔽_p\[X\] polynomials and evaluation in the exponent.
pub mod poly;
/// Proof generators (point opening through composite range proof).
pub mod proofs;
/// Storage Server role: batch store and proof generation.
pub mod server;
/// ECDSA binding signature over secp256k1.
pub mod sign;
/// Verification equations and the composite range-proof verifier.
pub mod verify;
/// Verifier role: pre-check plus vector-commitment and range checks.
pub mod verifier;
/// Canonical wire encodings for group elements, scalars, and headers.
pub mod wire;

// ============================================================================
// Canonical aliases (centralized; downstream code imports from the root)
// ============================================================================

/// Scalar field of the pairing groups.
pub type F = ark_bn254::Fr;

/// 𝔾₁ group element (affine).
pub type G1 = ark_bn254::G1Affine;

/// 𝔾₂ group element (affine).
pub type G2 = ark_bn254::G2Affine;

/// 𝔾₁ in projective coordinates (internal accumulation form).
pub type G1P = ark_bn254::G1Projective;

/// 𝔾₂ in projective coordinates (internal accumulation form).
pub type G2P = ark_bn254::G2Projective;

/// Target-group element, compared directly as a field element.
pub type Gt = <ark_bn254::Bn254 as ark_ec::pairing::Pairing>::TargetField;

// ============================================================================
// Root-level re-exports
// ============================================================================

pub use crate::accumulator::{AccumulatorPublicKey, AccumulatorSecretKey, NonMembershipWitness};
pub use crate::crs::{Crs, CrsError};
pub use crate::owner::{
    BatchHeader, BatchSecrets, BatchUpdate, DataOwner, GlobalPublicKey, Revocation,
};
pub use crate::proofs::{ProofError, RangeProof};
pub use crate::server::{DaProof, DcProof, ServerError, StorageServer, TimeRangeProof};
pub use crate::sign::{DoSigningKey, DoVerifyingKey};
pub use crate::verifier::{Verifier, VerifierError};
pub use crate::wire::WireError;
