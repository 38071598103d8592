//! Storage Server (SS)
//!
//! The untrusted, computationally powerful role: it stores every batch
//! (header and secrets), mirrors the owner's revocation state (server keys
//! plus blacklist copy), and generates all proofs on demand — interactive
//! consumer proofs, non-interactive audit proofs, and per-entry time range
//! proofs.
//!
//! A server cannot cheat profitably: tampered data or a stale challenge
//! fails the pairing checks, and for a revoked batch the server substitutes
//! the deliberately failing dummy witness so the verifier sees a clean
//! rejection rather than a server error.

use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;

use crate::accumulator::{self, AccumulatorError, NonMembershipWitness};
use crate::crs::Crs;
use crate::group::g1_multiexp;
use crate::oracle::h_t;
use crate::owner::{BatchHeader, BatchSecrets};
use crate::proofs::{self, ProofError, RangeProof};
use crate::{F, G1, G2};

/// Domain string of the auditor's non-interactive challenge.
pub const DA_AUDIT_CONTEXT: &[u8] = b"VDS-DA-AUDIT-ZK";

/// Bit length used for time-entry range proofs.
pub const TIME_RANGE_BITS: usize = 32;

/// Errors raised by storage-server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No batch under the given id.
    #[error("batch {0} not found")]
    BatchNotFound(String),

    /// A batch with this id is already stored; overwriting is not
    /// permitted.
    #[error("batch {0} already stored")]
    DuplicateBatch(String),

    /// The requested column does not exist in the batch.
    #[error("column {index} out of range for {count} columns")]
    ColumnOutOfRange {
        /// Requested column index (0-based).
        index: usize,
        /// Number of columns in the batch.
        count: usize,
    },

    /// A challenge vector does not have the CRS dimension.
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// Proof generation failure.
    #[error(transparent)]
    Proof(#[from] ProofError),
}

/// Response to a consumer query: the inner product, the aggregated opening,
/// and the revocation witness.
#[derive(Debug, Clone)]
pub struct DcProof {
    /// Claimed result `x = ∑ m_i t_i`.
    pub x: F,
    /// Aggregated opening proof.
    pub pi: G1,
    /// Non-membership witness for the batch signature.
    pub witness: NonMembershipWitness,
}

/// Response to an audit request: as [`DcProof`] plus the Fiat–Shamir
/// challenge the server used, for the verifier to recompute and compare.
#[derive(Debug, Clone)]
pub struct DaProof {
    /// Claimed result under the derived challenge.
    pub x: F,
    /// Aggregated opening proof.
    pub pi: G1,
    /// The derived challenge vector.
    pub t_challenge: Vec<F>,
    /// Non-membership witness for the batch signature.
    pub witness: NonMembershipWitness,
}

/// One time-entry range proof plus the shared revocation witness.
#[derive(Debug, Clone)]
pub struct TimeRangeProof {
    /// The time value being range-proved.
    pub value: F,
    /// The composite range proof.
    pub proof: RangeProof,
    /// Non-membership witness (shared across the batch's entries).
    pub witness: NonMembershipWitness,
}

/// The Storage Server role.
pub struct StorageServer {
    crs: Arc<Crs>,
    storage: HashMap<String, (BatchHeader, BatchSecrets)>,
    server_keys: Vec<G1>,
    blacklist: Vec<Vec<u8>>,
}

impl std::fmt::Debug for StorageServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageServer")
            .field("batches", &self.storage.len())
            .field("server_keys", &self.server_keys.len())
            .field("blacklist", &self.blacklist.len())
            .finish()
    }
}

impl StorageServer {
    /// Set up a server from the CRS and the owner's initial server keys.
    pub fn new(crs: Arc<Crs>, initial_server_keys: Vec<G1>) -> Self {
        StorageServer {
            crs,
            storage: HashMap::new(),
            server_keys: initial_server_keys,
            blacklist: Vec::new(),
        }
    }

    /// Store a batch. Overwriting an existing id is refused.
    pub fn store_batch(
        &mut self,
        batch_id: &str,
        header: BatchHeader,
        secrets: BatchSecrets,
    ) -> Result<(), ServerError> {
        if self.storage.contains_key(batch_id) {
            return Err(ServerError::DuplicateBatch(batch_id.to_string()));
        }
        self.storage.insert(batch_id.to_string(), (header, secrets));
        Ok(())
    }

    /// Mirror an owner revocation: append the forwarded server key.
    pub fn add_server_key(&mut self, key: G1) {
        self.server_keys.push(key);
    }

    /// Mirror an owner revocation: append the blacklisted signature bytes.
    pub fn add_revoked_item(&mut self, sigma_bytes: Vec<u8>) {
        self.blacklist.push(sigma_bytes);
    }

    /// Mirror an owner batch update. Order matters: the server key and the
    /// blacklist item land before the old batch is dropped and the new one
    /// inserted, so no proof is ever generated against a half-applied
    /// revocation.
    pub fn update_batch(
        &mut self,
        old_batch_id: &str,
        server_key: G1,
        sigma_bytes: Vec<u8>,
        new_batch_id: &str,
        header: BatchHeader,
        secrets: BatchSecrets,
    ) -> Result<(), ServerError> {
        self.add_server_key(server_key);
        self.add_revoked_item(sigma_bytes);
        self.storage.remove(old_batch_id);
        self.store_batch(new_batch_id, header, secrets)
    }

    fn lookup(&self, batch_id: &str) -> Result<&(BatchHeader, BatchSecrets), ServerError> {
        self.storage
            .get(batch_id)
            .ok_or_else(|| ServerError::BatchNotFound(batch_id.to_string()))
    }

    fn column<'a>(
        secrets: &'a BatchSecrets,
        index: usize,
    ) -> Result<(&'a [F], &'a F), ServerError> {
        let count = secrets.m_matrix.len();
        if index >= count {
            return Err(ServerError::ColumnOutOfRange { index, count });
        }
        Ok((&secrets.m_matrix[index], &secrets.gamma_data_list[index]))
    }

    /// Witness generation with the revoked-item substitution: a batch whose
    /// signature is already blacklisted gets the dummy `(1, 0)` witness so
    /// that verification — not the proof RPC — is what fails.
    fn witness_for(&self, f_current: &G1, sigma: &[u8]) -> NonMembershipWitness {
        match accumulator::prove_non_membership(
            &self.server_keys,
            f_current,
            sigma,
            &self.blacklist,
        ) {
            Ok(w) => w,
            Err(AccumulatorError::ItemInBlacklist) => {
                tracing::debug!("batch signature is blacklisted; issuing dummy witness");
                NonMembershipWitness::dummy()
            }
        }
    }

    /// Generate a proof for an interactive consumer query: the weighted
    /// inner product of the chosen column under the consumer's challenge.
    pub fn generate_dc_data_proof(
        &self,
        batch_id: &str,
        t_challenge: &[F],
        f_current: &G1,
        column_index: usize,
    ) -> Result<DcProof, ServerError> {
        let (header, secrets) = self.lookup(batch_id)?;
        let (m, gamma) = Self::column(secrets, column_index)?;
        let n = self.crs.n();
        if t_challenge.len() != n {
            return Err(ServerError::LengthMismatch { expected: n, actual: t_challenge.len() });
        }

        let x: F = m.iter().zip(t_challenge.iter()).map(|(a, b)| *a * b).sum();

        // Per-position openings, aggregated under the challenge weights.
        let mut pis = Vec::with_capacity(n);
        for i in 1..=n {
            pis.push(proofs::prove_point_open(m, gamma, i, &self.crs)?);
        }
        let pi = g1_multiexp(&pis, t_challenge);

        let witness = self.witness_for(f_current, &header.sigma);
        Ok(DcProof { x, pi, witness })
    }

    /// Generate a non-interactive audit proof: as the consumer path, but
    /// the challenge is derived from the column commitment so the server
    /// cannot choose it.
    pub fn generate_da_audit_proof(
        &self,
        batch_id: &str,
        f_current: &G1,
        column_index: usize,
    ) -> Result<DaProof, ServerError> {
        let (header, secrets) = self.lookup(batch_id)?;
        let (m, gamma) = Self::column(secrets, column_index)?;
        let n = self.crs.n();

        let c_data = header.c_data_list[column_index];
        let t_challenge = h_t(&c_data, &G2::identity(), &G1::identity(), n, DA_AUDIT_CONTEXT);

        let x: F = m.iter().zip(t_challenge.iter()).map(|(a, b)| *a * b).sum();

        let mut pis = Vec::with_capacity(n);
        for i in 1..=n {
            pis.push(proofs::prove_point_open(m, gamma, i, &self.crs)?);
        }
        let pi = g1_multiexp(&pis, &t_challenge);

        let witness = self.witness_for(f_current, &header.sigma);
        Ok(DaProof { x, pi, t_challenge, witness })
    }

    /// Generate one composite range proof per time-vector entry (ℓ = 32),
    /// sharing a single revocation witness across them.
    pub fn generate_time_range_proofs<R: RngCore + CryptoRng>(
        &self,
        batch_id: &str,
        f_current: &G1,
        rng: &mut R,
    ) -> Result<Vec<TimeRangeProof>, ServerError> {
        let (header, secrets) = self.lookup(batch_id)?;
        let witness = self.witness_for(f_current, &header.sigma);

        let mut out = Vec::with_capacity(secrets.t_vector.len());
        for t_i in &secrets.t_vector {
            let proof = proofs::prove_range(t_i, TIME_RANGE_BITS, &self.crs, rng)?;
            out.push(TimeRangeProof { value: *t_i, proof, witness: witness.clone() });
        }
        Ok(out)
    }
}
