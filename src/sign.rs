//! Binding signature (ECDSA over secp256k1)
//!
//! The data owner signs each batch header so that its data commitments and
//! its time commitment become one inseparable object — swapping a
//! commitment between batches invalidates the signature. The signing curve
//! is secp256k1, deliberately independent of the pairing curve.
//!
//! The signed message is `SHA-256(C_time ‖ C_data[0] ‖ … ‖ C_data[d−1])`
//! over **canonical wire bytes**; the raw 64-byte `r ‖ s` signature is both
//! the wire form and, verbatim, the accumulator item — any re-encoding
//! would break the blacklist check.

use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::wire;
use crate::{G1, G2};

/// Errors raised by the signature layer.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// Signature bytes do not parse as a secp256k1 ECDSA signature.
    #[error("malformed signature bytes")]
    MalformedSignature,

    /// Verifying-key bytes do not parse as a SEC1 point.
    #[error("malformed verifying key bytes")]
    MalformedKey,
}

/// The owner's long-lived signing key. Never leaves the owner.
#[derive(Clone)]
pub struct DoSigningKey(SigningKey);

impl std::fmt::Debug for DoSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DoSigningKey(..)")
    }
}

/// The owner's published verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoVerifyingKey(VerifyingKey);

/// Generate a fresh long-lived key pair for the owner.
pub fn generate_signing_keys<R: RngCore + CryptoRng>(rng: &mut R) -> (DoSigningKey, DoVerifyingKey) {
    let sk = SigningKey::random(rng);
    let vk = VerifyingKey::from(&sk);
    (DoSigningKey(sk), DoVerifyingKey(vk))
}

/// Canonical serialization of the signed material:
/// `C_time ‖ C_data[0] ‖ … ‖ C_data[d−1]`.
pub fn serialize_for_signing(c_data_list: &[G1], c_time: &G2) -> Vec<u8> {
    let mut out = wire::g2_bytes(c_time);
    for c in c_data_list {
        out.extend_from_slice(&wire::g1_bytes(c));
    }
    out
}

/// SHA-256 digest of the signed material. Deterministic; the batch id and
/// the signature both derive from it.
pub fn hash_for_signing(c_data_list: &[G1], c_time: &G2) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(serialize_for_signing(c_data_list, c_time));
    h.finalize().into()
}

/// Batch id: SHA-256 of the signed message, truncated to 16 hex characters.
pub fn batch_id(c_data_list: &[G1], c_time: &G2) -> String {
    let digest = Sha256::digest(hash_for_signing(c_data_list, c_time));
    let mut id = hex::encode(digest);
    id.truncate(16);
    id
}

impl DoSigningKey {
    /// Sign a batch header; returns the raw 64-byte `r ‖ s` signature.
    pub fn sign_batch(&self, c_data_list: &[G1], c_time: &G2) -> Vec<u8> {
        let digest = hash_for_signing(c_data_list, c_time);
        let sig: Signature = self.0.sign(&digest);
        sig.to_bytes().to_vec()
    }
}

impl DoVerifyingKey {
    /// Verify a batch signature over `(C_time ‖ C_data_list)`.
    pub fn verify_batch(&self, c_data_list: &[G1], c_time: &G2, sigma: &[u8]) -> bool {
        let Ok(sig) = Signature::from_slice(sigma) else {
            return false;
        };
        let digest = hash_for_signing(c_data_list, c_time);
        self.0.verify(&digest, &sig).is_ok()
    }

    /// Compressed SEC1 bytes of the key.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_sec1_bytes().to_vec()
    }

    /// Parse a key from SEC1 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(DoVerifyingKey)
            .map_err(|_| SignError::MalformedKey)
    }
}

/// Parse-check signature bytes; used by the owner before mutating any
/// revocation state.
pub fn check_signature_bytes(sigma: &[u8]) -> Result<(), SignError> {
    Signature::from_slice(sigma)
        .map(|_| ())
        .map_err(|_| SignError::MalformedSignature)
}
