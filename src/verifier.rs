//! Verifier (consumer and auditor paths)
//!
//! One verifier serves both reader roles. Every verification runs the same
//! pre-check first — binding signature, then accumulator non-membership
//! against the **current** dynamic public key — and only then the
//! vector-commitment or range check for the specific query.
//!
//! The dynamic public key must be refreshed via
//! [`Verifier::update_global_pk`] before verifying anything created after a
//! revocation; skipping the refresh is exactly the rollback window the
//! accumulator exists to close.
//!
//! Cryptographic failures surface as `Ok(false)` — a rejection carries no
//! protocol meaning beyond "rejected", and only the logs distinguish the
//! failing sub-check. Input-validation problems (bad column index, wrong
//! challenge length) are typed errors and safe to retry corrected.

use std::sync::Arc;

use crate::accumulator;
use crate::crs::Crs;
use crate::oracle::h_t;
use crate::owner::{BatchHeader, GlobalPublicKey};
use crate::proofs::ProofError;
use crate::server::{TimeRangeProof, DA_AUDIT_CONTEXT, TIME_RANGE_BITS};
use crate::verify::{verify_aggregated_opening, verify_range_proof};
use crate::{F, G1, G2, NonMembershipWitness};

use ark_ec::AffineRepr;

/// Input-validation errors from the verifier; retryable with corrected
/// inputs, unlike a `false` verdict.
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// The requested column does not exist in the header.
    #[error("column {index} out of range for {count} columns")]
    ColumnOutOfRange {
        /// Requested column index (0-based).
        index: usize,
        /// Number of columns in the header.
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

    /// Malformed proof material (bit lengths, CRS access).
    #[error(transparent)]
    Proof(#[from] ProofError),
}

/// The Verifier role.
pub struct Verifier {
    crs: Arc<Crs>,
    global_pk: GlobalPublicKey,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier").field("n", &self.crs.n()).finish_non_exhaustive()
    }
}

impl Verifier {
    /// Set up a verifier from the CRS and the owner's published key.
    pub fn new(crs: Arc<Crs>, initial_global_pk: GlobalPublicKey) -> Self {
        Verifier { crs, global_pk: initial_global_pk }
    }

    /// Install a refreshed dynamic public key.
    ///
    /// Must happen before any verification of state later than the key;
    /// verifying against a stale key accepts rollbacks.
    pub fn update_global_pk(&mut self, new_pk: GlobalPublicKey) {
        self.global_pk = new_pk;
    }

    /// Shared pre-check: (1) the binding signature over
    /// `C_time ‖ C_data_list` under the owner's key, (2) the non-membership
    /// witness against the current accumulator value. Returns the
    /// data-commitment list for column selection on success.
    fn precheck<'h>(
        &self,
        header: &'h BatchHeader,
        witness: &NonMembershipWitness,
    ) -> Option<&'h [G1]> {
        if !self
            .global_pk
            .vk
            .verify_batch(&header.c_data_list, &header.c_time, &header.sigma)
        {
            tracing::debug!("pre-check rejected: binding signature invalid");
            return None;
        }
        if !accumulator::verify_non_membership(
            &self.global_pk.acc_pk,
            &self.global_pk.f_current,
            &header.sigma,
            witness,
        ) {
            tracing::debug!("pre-check rejected: accumulator non-membership invalid");
            return None;
        }
        Some(&header.c_data_list)
    }

    fn select_column(list: &[G1], index: usize) -> Result<&G1, VerifierError> {
        list.get(index)
            .ok_or(VerifierError::ColumnOutOfRange { index, count: list.len() })
    }

    /// Verify a consumer query result against the chosen column:
    /// pre-check, then the aggregated-opening equation
    /// `e(C, ∏ ĝ_{n+1−i}^{t_i}) = e(π, ĝ) · e(g_1, ĝ_n)^x`.
    pub fn verify_dc_query(
        &self,
        header: &BatchHeader,
        t_challenge: &[F],
        x: &F,
        pi: &G1,
        witness: &NonMembershipWitness,
        column_index: usize,
    ) -> Result<bool, VerifierError> {
        let n = self.crs.n();
        if t_challenge.len() != n {
            return Err(VerifierError::LengthMismatch { expected: n, actual: t_challenge.len() });
        }
        let Some(list) = self.precheck(header, witness) else {
            return Ok(false);
        };
        let c_data = Self::select_column(list, column_index)?;

        let ok = verify_aggregated_opening(c_data, pi, t_challenge, x, &self.crs)?;
        if !ok {
            tracing::debug!("consumer query rejected: aggregated opening check failed");
        }
        Ok(ok)
    }

    /// Verify an audit proof: pre-check, re-derive the Fiat–Shamir
    /// challenge from the column commitment, compare it componentwise with
    /// what the server claims to have used, then run the aggregated-opening
    /// equation under the re-derived challenge.
    pub fn verify_da_audit(
        &self,
        header: &BatchHeader,
        n: usize,
        x: &F,
        pi: &G1,
        t_provided: &[F],
        witness: &NonMembershipWitness,
        column_index: usize,
    ) -> Result<bool, VerifierError> {
        if n != self.crs.n() {
            return Err(VerifierError::LengthMismatch { expected: self.crs.n(), actual: n });
        }
        let Some(list) = self.precheck(header, witness) else {
            return Ok(false);
        };
        let c_data = Self::select_column(list, column_index)?;

        let t_local = h_t(c_data, &G2::identity(), &G1::identity(), n, DA_AUDIT_CONTEXT);
        if t_local.len() != t_provided.len() || t_local != t_provided {
            // A mismatch means the server picked its own challenge.
            tracing::debug!("audit rejected: challenge mismatch");
            return Ok(false);
        }

        let ok = verify_aggregated_opening(c_data, pi, &t_local, x, &self.crs)?;
        if !ok {
            tracing::debug!("audit rejected: aggregated opening check failed");
        }
        Ok(ok)
    }

    /// Verify one time-entry range proof: pre-check with the shared
    /// witness, then the composite range-proof verifier at ℓ = 32.
    pub fn verify_time_range_proof(
        &self,
        header: &BatchHeader,
        proof: &TimeRangeProof,
        _f_current: &G1,
    ) -> Result<bool, VerifierError> {
        if self.precheck(header, &proof.witness).is_none() {
            return Ok(false);
        }
        let ok = verify_range_proof(&proof.proof, TIME_RANGE_BITS, &self.crs)?;
        if !ok {
            tracing::debug!("time range proof rejected");
        }
        Ok(ok)
    }
}
