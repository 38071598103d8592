//! Common Reference String (CRS) — generation, validation, and IO
//!
//! # What is in the CRS?
//!
//! For vector dimension `n` the CRS carries powers of a secret α:
//!
//! - 𝔾₁ side: `g_i = g^{α^i}` for `i ∈ [1..2n] \ {n+1}`
//! - 𝔾₂ side: `ĝ_i = ĝ^{α^i}` for `i ∈ [1..n]`
//!
//! The index `n+1` is **absent from the 𝔾₁ side by construction**; knowing
//! `g^{α^{n+1}}` would let anyone forge openings, so any code path that asks
//! for it is a bug and gets [`CrsError::IndexAbsent`].
//!
//! # Trust model
//!
//! The trapdoor α must be sampled and destroyed by an external ceremony; a
//! production deployment only ever sees the powers. [`Crs::keygen`] samples
//! α locally, exponentiates, and drops it — nothing in this crate can
//! recover it afterwards.
//!
//! With the `dev-trapdoor` feature a CRS *may* retain α so that a test peer
//! can re-derive an identical CRS. This is insecure by definition: the
//! feature is off by default, the retaining constructor is separate, and
//! every use emits a warning.
//!
//! # Validation layers
//!
//! Loading a CRS from bytes performs, in order: framing/deserialization,
//! per-point curve/subgroup checks (via the compressed decoder), and the
//! structural checks of [`Crs::validate`] (element counts, index coverage,
//! `n+1` absent).

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, UniformRand};
use rand::{CryptoRng, RngCore};
use std::path::Path;

use crate::wire::{self, WireError};
use crate::{F, G1, G2};

/// Errors raised by CRS construction, access, and IO.
#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    /// Access to the index that is skipped by construction. Always a caller
    /// bug, never a data problem.
    #[error("CRS index {0} is absent by construction")]
    IndexAbsent(usize),

    /// The requested index lies outside the CRS range for this dimension.
    #[error("CRS index {index} out of range for dimension {n}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The CRS dimension.
        n: usize,
    },

    /// A structural defect found during validation; carries the first bad
    /// index (0 encodes a defect in the element counts).
    #[error("malformed CRS at index {0}")]
    Malformed(usize),

    /// File IO failure while loading or saving.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Byte-level decoding failure.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),
}

/// The structured reference string for vector dimension `n`.
///
/// Immutable after construction; read-only sharing across threads is safe.
#[derive(Debug, Clone)]
pub struct Crs {
    n: usize,
    g: G1,
    g_hat: G2,
    /// `g^{α^i}` for `i ∈ [1..2n] \ {n+1}`, stored densely (2n−1 slots).
    g_list: Vec<G1>,
    /// `ĝ^{α^i}` for `i ∈ [1..n]`.
    g_hat_list: Vec<G2>,
    /// Retained trapdoor; only with `dev-trapdoor`, only via the dedicated
    /// constructor, never serialized into the production wire format.
    #[cfg(feature = "dev-trapdoor")]
    trapdoor: Option<F>,
}

impl Crs {
    /// Generate a fresh CRS of dimension `n` with a locally sampled, then
    /// discarded, trapdoor.
    pub fn keygen<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Self {
        assert!(n >= 2, "dimension must be at least 2");
        let alpha = F::rand(rng);
        let g = crate::group::rand_g1(rng);
        let g_hat = crate::group::rand_g2(rng);
        Self::from_trapdoor(n, &alpha, &g, &g_hat)
    }

    /// Generate a CRS from an explicit trapdoor and retain the trapdoor so a
    /// peer can re-derive the identical CRS. **Insecure**; test-only.
    #[cfg(feature = "dev-trapdoor")]
    pub fn keygen_with_trapdoor(n: usize, alpha: &F, g: &G1, g_hat: &G2) -> Self {
        tracing::warn!(
            n,
            "generating CRS with a RETAINED trapdoor; this build is insecure \
             and must never ship"
        );
        let mut crs = Self::from_trapdoor(n, alpha, g, g_hat);
        crs.trapdoor = Some(*alpha);
        crs
    }

    /// Retained trapdoor, if this CRS was built by
    /// [`Crs::keygen_with_trapdoor`].
    #[cfg(feature = "dev-trapdoor")]
    pub fn trapdoor(&self) -> Option<&F> {
        if self.trapdoor.is_some() {
            tracing::warn!("reading a retained CRS trapdoor");
        }
        self.trapdoor.as_ref()
    }

    fn from_trapdoor(n: usize, alpha: &F, g: &G1, g_hat: &G2) -> Self {
        // α^i for i ∈ [1..2n], computed incrementally.
        let mut alpha_pows = Vec::with_capacity(2 * n);
        let mut acc = F::ONE;
        for _ in 0..2 * n {
            acc *= alpha;
            alpha_pows.push(acc);
        }

        let mut g_list = Vec::with_capacity(2 * n - 1);
        for (idx0, pow) in alpha_pows.iter().enumerate() {
            let i = idx0 + 1;
            if i == n + 1 {
                continue;
            }
            g_list.push((g.into_group() * *pow).into_affine());
        }

        let mut g_hat_list = Vec::with_capacity(n);
        for pow in alpha_pows.iter().take(n) {
            g_hat_list.push((g_hat.into_group() * *pow).into_affine());
        }

        Crs {
            n,
            g: *g,
            g_hat: *g_hat,
            g_list,
            g_hat_list,
            #[cfg(feature = "dev-trapdoor")]
            trapdoor: None,
        }
    }

    /// Vector dimension `n`.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Generator `g ∈ 𝔾₁` (the α⁰ base).
    #[inline]
    pub fn g(&self) -> &G1 {
        &self.g
    }

    /// Generator `ĝ ∈ 𝔾₂`.
    #[inline]
    pub fn g_hat(&self) -> &G2 {
        &self.g_hat
    }

    /// Dense slot for 𝔾₁ index `i ∈ [1..2n] \ {n+1}`.
    fn slot(&self, i: usize) -> Result<usize, CrsError> {
        if i == self.n + 1 {
            return Err(CrsError::IndexAbsent(i));
        }
        if i < 1 || i > 2 * self.n {
            return Err(CrsError::OutOfRange { index: i, n: self.n });
        }
        Ok(if i <= self.n { i - 1 } else { i - 2 })
    }

    /// `g_i = g^{α^i}` for `i ∈ [1..2n] \ {n+1}` (1-indexed).
    pub fn g_i(&self, i: usize) -> Result<&G1, CrsError> {
        Ok(&self.g_list[self.slot(i)?])
    }

    /// `ĝ_i = ĝ^{α^i}` for `i ∈ [1..n]` (1-indexed).
    pub fn g_hat_i(&self, i: usize) -> Result<&G2, CrsError> {
        if i < 1 || i > self.n {
            return Err(CrsError::OutOfRange { index: i, n: self.n });
        }
        Ok(&self.g_hat_list[i - 1])
    }

    /// Reverse-index helper `g_{n+1-i}`, the pattern every opening uses.
    #[inline]
    pub fn g_rev(&self, i: usize) -> Result<&G1, CrsError> {
        if i < 1 || i > self.n {
            return Err(CrsError::OutOfRange { index: i, n: self.n });
        }
        self.g_i(self.n + 1 - i)
    }

    /// Reverse-index helper `ĝ_{n+1-i}`.
    #[inline]
    pub fn g_hat_rev(&self, i: usize) -> Result<&G2, CrsError> {
        if i < 1 || i > self.n {
            return Err(CrsError::OutOfRange { index: i, n: self.n });
        }
        self.g_hat_i(self.n + 1 - i)
    }

    /// Structural validation: element counts, full index coverage, `n+1`
    /// absent, and non-identity bases.
    pub fn validate(&self) -> Result<(), CrsError> {
        if self.n < 2 || self.g.is_zero() || self.g_hat.is_zero() {
            return Err(CrsError::Malformed(0));
        }
        if self.g_list.len() != 2 * self.n - 1 {
            return Err(CrsError::Malformed(0));
        }
        if self.g_hat_list.len() != self.n {
            return Err(CrsError::Malformed(0));
        }
        for i in 1..=2 * self.n {
            if i == self.n + 1 {
                // Must be unreachable through the accessor.
                if self.g_i(i).is_ok() {
                    return Err(CrsError::Malformed(i));
                }
                continue;
            }
            let p = self.g_i(i)?;
            if p.is_zero() {
                return Err(CrsError::Malformed(i));
            }
        }
        for i in 1..=self.n {
            if self.g_hat_i(i)?.is_zero() {
                return Err(CrsError::Malformed(i));
            }
        }
        Ok(())
    }

    /// Short digest over the canonical CRS bytes, for cross-peer comparison
    /// and audit logs.
    pub fn digest(&self) -> [u8; 32] {
        let mut h = blake3::Hasher::new();
        h.update(b"vdstream.crs.digest.v1");
        h.update(&self.to_bytes());
        *h.finalize().as_bytes()
    }

    // ------------------------------------------------------------------
    // Byte-level IO
    // ------------------------------------------------------------------

    /// Canonical CRS bytes: `n`, `g`, `ĝ`, then the two base lists as
    /// ordered `(index, bytes)` pairs. The trapdoor is never included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::put_u32(&mut out, self.n as u32);
        wire::put_chunk(&mut out, &wire::g1_bytes(&self.g));
        wire::put_chunk(&mut out, &wire::g2_bytes(&self.g_hat));
        wire::put_u32(&mut out, self.g_list.len() as u32);
        for i in 1..=2 * self.n {
            if i == self.n + 1 {
                continue;
            }
            let p = self.g_list[if i <= self.n { i - 1 } else { i - 2 }];
            wire::put_u32(&mut out, i as u32);
            wire::put_chunk(&mut out, &wire::g1_bytes(&p));
        }
        wire::put_u32(&mut out, self.g_hat_list.len() as u32);
        for (idx0, p) in self.g_hat_list.iter().enumerate() {
            wire::put_u32(&mut out, (idx0 + 1) as u32);
            wire::put_chunk(&mut out, &wire::g2_bytes(p));
        }
        out
    }

    /// Decode and validate a CRS from its canonical bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CrsError> {
        let mut cur = bytes;
        let n = wire::take_u32(&mut cur)? as usize;
        if n < 2 {
            return Err(CrsError::Malformed(0));
        }
        let g = wire::g1_from_bytes(wire::take_chunk(&mut cur)?)?;
        let g_hat = wire::g2_from_bytes(wire::take_chunk(&mut cur)?)?;

        let g_count = wire::take_u32(&mut cur)? as usize;
        if g_count != 2 * n - 1 {
            return Err(CrsError::Malformed(0));
        }
        let mut g_list = Vec::with_capacity(g_count);
        let mut expect = 1usize;
        for _ in 0..g_count {
            let i = wire::take_u32(&mut cur)? as usize;
            if expect == n + 1 {
                expect += 1;
            }
            if i != expect {
                return Err(CrsError::Malformed(i));
            }
            expect += 1;
            g_list.push(wire::g1_from_bytes(wire::take_chunk(&mut cur)?)?);
        }

        let g_hat_count = wire::take_u32(&mut cur)? as usize;
        if g_hat_count != n {
            return Err(CrsError::Malformed(0));
        }
        let mut g_hat_list = Vec::with_capacity(g_hat_count);
        for want in 1..=g_hat_count {
            let i = wire::take_u32(&mut cur)? as usize;
            if i != want {
                return Err(CrsError::Malformed(i));
            }
            g_hat_list.push(wire::g2_from_bytes(wire::take_chunk(&mut cur)?)?);
        }

        if !cur.is_empty() {
            return Err(CrsError::Malformed(0));
        }

        let crs = Crs {
            n,
            g,
            g_hat,
            g_list,
            g_hat_list,
            #[cfg(feature = "dev-trapdoor")]
            trapdoor: None,
        };
        crs.validate()?;
        Ok(crs)
    }

    /// Development-profile encoding: the canonical bytes followed by the
    /// retained trapdoor, so a test peer can reconstruct the identical CRS.
    /// **Insecure by definition**; refuses to run on a CRS without a
    /// retained trapdoor.
    #[cfg(feature = "dev-trapdoor")]
    pub fn to_dev_bytes(&self) -> Option<Vec<u8>> {
        let alpha = self.trapdoor?;
        tracing::warn!("serializing CRS WITH its trapdoor; dev profile only");
        let mut out = self.to_bytes();
        wire::put_chunk(&mut out, &wire::scalar_bytes(&alpha));
        Some(out)
    }

    /// Decode a development-profile CRS, re-deriving every power from the
    /// embedded trapdoor and checking the result against the carried bases.
    #[cfg(feature = "dev-trapdoor")]
    pub fn from_dev_bytes(bytes: &[u8]) -> Result<Self, CrsError> {
        // The trapdoor chunk is the trailing 4 + 32 bytes.
        let split = bytes
            .len()
            .checked_sub(4 + wire::SCALAR_BYTES)
            .ok_or(CrsError::Malformed(0))?;
        let carried = Self::from_bytes(&bytes[..split])?;
        let mut cur = &bytes[split..];
        let alpha = wire::scalar_from_bytes(wire::take_chunk(&mut cur)?)?;
        let rederived = Self::keygen_with_trapdoor(carried.n, &alpha, &carried.g, &carried.g_hat);
        if rederived.to_bytes() != carried.to_bytes() {
            return Err(CrsError::Malformed(0));
        }
        Ok(rederived)
    }

    /// Save the canonical CRS bytes to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CrsError> {
        std::fs::write(path.as_ref(), self.to_bytes())?;
        Ok(())
    }

    /// Load and validate a CRS from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CrsError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }
}
