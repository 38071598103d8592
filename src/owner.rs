//! Data Owner (DO)
//!
//! The owner is the lightweight role: it commits, signs, and manages
//! revocation. All heavy proof work is offloaded to the storage server.
//!
//! The owner's mutable state (accumulator value, server keys, blacklist
//! copy, update counter) is an explicit value threaded through `&mut self`
//! operations — there is no hidden singleton, and callers serialise access.
//! `revoke_batch` computes its entire successor state before committing any
//! of it, so a failure leaves the owner exactly as it was.

use ark_ff::UniformRand;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;

use crate::accumulator::{self, AccumulatorPublicKey, AccumulatorSecretKey};
use crate::commit::{commit_g, commit_ghat, CommitError};
use crate::crs::Crs;
use crate::sign::{self, DoSigningKey, DoVerifyingKey, SignError};
use crate::wire::{self, WireError};
use crate::{F, G1, G2};

/// Errors raised by owner operations.
#[derive(Debug, thiserror::Error)]
pub enum OwnerError {
    /// A data column or the time vector does not have the CRS dimension.
    #[error("vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Required length (the CRS dimension n).
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// A batch needs at least one data column.
    #[error("batch requires at least one data column")]
    EmptyMatrix,

    /// The signature to revoke does not parse; nothing was mutated.
    #[error(transparent)]
    MalformedSignature(#[from] SignError),

    /// The signature was already revoked; nothing was mutated.
    #[error("signature is already revoked")]
    AlreadyRevoked,

    /// Commitment construction failure.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Public batch header: the per-column data commitments, the shared time
/// commitment, and the binding signature over all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    /// One data commitment per column, in 𝔾₁.
    pub c_data_list: Vec<G1>,
    /// The time commitment shared by every column, in 𝔾₂.
    pub c_time: G2,
    /// Binding signature over `C_time ‖ C_data_list`.
    pub sigma: Vec<u8>,
}

impl BatchHeader {
    /// Wire encoding: the triple (data-commitment list, time commitment,
    /// signature), length-delimited.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u32(&mut out, self.c_data_list.len() as u32);
        for c in &self.c_data_list {
            wire::put_chunk(&mut out, &wire::g1_bytes(c));
        }
        wire::put_chunk(&mut out, &wire::g2_bytes(&self.c_time));
        wire::put_chunk(&mut out, &self.sigma);
        out
    }

    /// Decode a header from its wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cur = bytes;
        let d = wire::take_u32(&mut cur)? as usize;
        let mut c_data_list = Vec::with_capacity(d);
        for _ in 0..d {
            c_data_list.push(wire::g1_from_bytes(wire::take_chunk(&mut cur)?)?);
        }
        let c_time = wire::g2_from_bytes(wire::take_chunk(&mut cur)?)?;
        let sigma = wire::take_chunk(&mut cur)?.to_vec();
        if !cur.is_empty() {
            return Err(WireError::BadLength);
        }
        Ok(BatchHeader { c_data_list, c_time, sigma })
    }
}

/// Batch secrets handed to the storage server for proof generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSecrets {
    /// Data columns (d × n scalars).
    pub m_matrix: Vec<Vec<F>>,
    /// Time vector (n scalars).
    pub t_vector: Vec<F>,
    /// One blinding scalar per data column.
    pub gamma_data_list: Vec<F>,
    /// Blinding scalar of the time commitment.
    pub gamma_time: F,
}

/// The dynamic public key: fetched by every verifier before verification,
/// refreshed by the owner on every revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPublicKey {
    /// The owner's signature verification key (static).
    pub vk: DoVerifyingKey,
    /// Accumulator public key `(g, ĝ, ĝ^s)` (static).
    pub acc_pk: AccumulatorPublicKey,
    /// Current accumulator value (dynamic; changes on every revocation).
    pub f_current: G1,
}

impl GlobalPublicKey {
    /// Wire encoding: `(vk bytes, (g, ĝ, ĝ^s) bytes, f_current bytes)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_chunk(&mut out, &self.vk.to_bytes());
        wire::put_chunk(&mut out, &wire::g1_bytes(&self.acc_pk.g));
        wire::put_chunk(&mut out, &wire::g2_bytes(&self.acc_pk.g_hat));
        wire::put_chunk(&mut out, &wire::g2_bytes(&self.acc_pk.g_hat_s));
        wire::put_chunk(&mut out, &wire::g1_bytes(&self.f_current));
        out
    }

    /// Decode a dynamic public key from its wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cur = bytes;
        let vk = DoVerifyingKey::from_bytes(wire::take_chunk(&mut cur)?)
            .map_err(|_| WireError::BadPoint)?;
        let g = wire::g1_from_bytes(wire::take_chunk(&mut cur)?)?;
        let g_hat = wire::g2_from_bytes(wire::take_chunk(&mut cur)?)?;
        let g_hat_s = wire::g2_from_bytes(wire::take_chunk(&mut cur)?)?;
        let f_current = wire::g1_from_bytes(wire::take_chunk(&mut cur)?)?;
        if !cur.is_empty() {
            return Err(WireError::BadLength);
        }
        Ok(GlobalPublicKey {
            vk,
            acc_pk: AccumulatorPublicKey { g, g_hat, g_hat_s },
            f_current,
        })
    }
}

/// Everything a revocation emits: the fresh server key for the storage
/// server, the refreshed dynamic public key for verifiers, and the exact
/// item bytes that entered the blacklist.
#[derive(Debug, Clone)]
pub struct Revocation {
    /// Newly appended server key `g^{s^k}`.
    pub server_key: G1,
    /// Refreshed dynamic public key.
    pub global_pk: GlobalPublicKey,
    /// Canonical signature bytes added to the blacklist.
    pub sigma_bytes: Vec<u8>,
}

/// Output of a one-shot batch update (revoke old + create new).
#[derive(Debug, Clone)]
pub struct BatchUpdate {
    /// The revocation of the old batch.
    pub revocation: Revocation,
    /// Id of the replacement batch.
    pub batch_id: String,
    /// Header of the replacement batch.
    pub header: BatchHeader,
    /// Secrets of the replacement batch, for the storage server.
    pub secrets: BatchSecrets,
}

/// The Data Owner role.
pub struct DataOwner {
    crs: Arc<Crs>,
    sk: DoSigningKey,
    vk: DoVerifyingKey,
    acc_sk: AccumulatorSecretKey,
    acc_pk: AccumulatorPublicKey,
    f_current: G1,
    server_keys: Vec<G1>,
    /// The owner's own blacklist copy, kept to refuse duplicate
    /// revocations and to make `f` recomputable.
    blacklist: Vec<Vec<u8>>,
    update_count: u64,
}

impl std::fmt::Debug for DataOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataOwner")
            .field("n", &self.crs.n())
            .field("update_count", &self.update_count)
            .finish_non_exhaustive()
    }
}

impl DataOwner {
    /// Set up a fresh owner: signing keys, accumulator, empty blacklist.
    pub fn new<R: RngCore + CryptoRng>(crs: Arc<Crs>, rng: &mut R) -> Self {
        let (sk, vk) = sign::generate_signing_keys(rng);
        let acc = accumulator::setup(rng);
        DataOwner {
            crs,
            sk,
            vk,
            acc_sk: acc.sk,
            acc_pk: acc.pk,
            f_current: acc.f_initial,
            server_keys: acc.server_keys,
            blacklist: Vec::new(),
            update_count: 0,
        }
    }

    /// The current dynamic public key. Publish after every revocation.
    pub fn global_pk(&self) -> GlobalPublicKey {
        GlobalPublicKey {
            vk: self.vk.clone(),
            acc_pk: self.acc_pk.clone(),
            f_current: self.f_current,
        }
    }

    /// Initial server keys, handed to the storage server once at setup.
    pub fn initial_server_keys(&self) -> Vec<G1> {
        self.server_keys.clone()
    }

    /// Number of revocations performed so far.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Create and sign a batch from `d ≥ 1` data columns sharing one time
    /// vector. Pure with respect to owner state.
    ///
    /// All columns share `C_time` and the signature — the signature binds
    /// the whole commitment *list*, so a header cannot be reassembled from
    /// pieces of different batches.
    pub fn create_batch<R: RngCore + CryptoRng>(
        &self,
        m_matrix: &[Vec<F>],
        t_vector: &[F],
        rng: &mut R,
    ) -> Result<(String, BatchHeader, BatchSecrets), OwnerError> {
        let n = self.crs.n();
        if m_matrix.is_empty() {
            return Err(OwnerError::EmptyMatrix);
        }
        for column in m_matrix {
            if column.len() != n {
                return Err(OwnerError::LengthMismatch { expected: n, actual: column.len() });
            }
        }
        if t_vector.len() != n {
            return Err(OwnerError::LengthMismatch { expected: n, actual: t_vector.len() });
        }

        let gamma_time = F::rand(rng);
        let c_time = commit_ghat(t_vector, &gamma_time, &self.crs)?;

        let mut gamma_data_list = Vec::with_capacity(m_matrix.len());
        let mut c_data_list = Vec::with_capacity(m_matrix.len());
        for column in m_matrix {
            let gamma = F::rand(rng);
            c_data_list.push(commit_g(column, &gamma, &self.crs)?);
            gamma_data_list.push(gamma);
        }

        let sigma = self.sk.sign_batch(&c_data_list, &c_time);
        let id = sign::batch_id(&c_data_list, &c_time);

        let header = BatchHeader { c_data_list, c_time, sigma };
        let secrets = BatchSecrets {
            m_matrix: m_matrix.to_vec(),
            t_vector: t_vector.to_vec(),
            gamma_data_list,
            gamma_time,
        };
        Ok((id, header, secrets))
    }

    /// Single-column convenience adapter around [`DataOwner::create_batch`].
    pub fn create_batch_single<R: RngCore + CryptoRng>(
        &self,
        column: &[F],
        t_vector: &[F],
        rng: &mut R,
    ) -> Result<(String, BatchHeader, BatchSecrets), OwnerError> {
        self.create_batch(std::slice::from_ref(&column.to_vec()), t_vector, rng)
    }

    /// Revoke a batch by blacklisting its signature.
    ///
    /// Validates the signature bytes and refuses duplicates **before**
    /// touching any state; the successor state (accumulator value, server
    /// key, counter) is then computed in full and committed at once, so the
    /// operation either completes or leaves the owner untouched.
    pub fn revoke_batch(&mut self, sigma: &[u8]) -> Result<Revocation, OwnerError> {
        sign::check_signature_bytes(sigma)?;
        if self.blacklist.iter().any(|x| x == sigma) {
            return Err(OwnerError::AlreadyRevoked);
        }

        let sigma_bytes = sigma.to_vec();
        let new_f = accumulator::add_to_blacklist(&self.acc_sk, &self.f_current, &sigma_bytes);
        let mut new_keys = self.server_keys.clone();
        let server_key = accumulator::expand_server_keys(&self.acc_sk, &mut new_keys);

        // Commit the successor state.
        self.f_current = new_f;
        self.server_keys = new_keys;
        self.blacklist.push(sigma_bytes.clone());
        self.update_count += 1;

        tracing::info!(update_count = self.update_count, "batch revoked");
        Ok(Revocation { server_key, global_pk: self.global_pk(), sigma_bytes })
    }

    /// One-shot revoke-then-create: retires `old_header`'s batch and signs
    /// a replacement, yielding a new batch id.
    ///
    /// The replacement inputs are validated before the revocation mutates
    /// anything, so a bad update cannot half-apply.
    pub fn update_batch<R: RngCore + CryptoRng>(
        &mut self,
        old_header: &BatchHeader,
        m_matrix: &[Vec<F>],
        t_vector: &[F],
        rng: &mut R,
    ) -> Result<BatchUpdate, OwnerError> {
        let n = self.crs.n();
        if m_matrix.is_empty() {
            return Err(OwnerError::EmptyMatrix);
        }
        for column in m_matrix {
            if column.len() != n {
                return Err(OwnerError::LengthMismatch { expected: n, actual: column.len() });
            }
        }
        if t_vector.len() != n {
            return Err(OwnerError::LengthMismatch { expected: n, actual: t_vector.len() });
        }

        let revocation = self.revoke_batch(&old_header.sigma)?;
        let (batch_id, header, secrets) = self.create_batch(m_matrix, t_vector, rng)?;
        Ok(BatchUpdate { revocation, batch_id, header, secrets })
    }
}
