//! Canonical wire encodings
//!
//! Every hash, signature, and cross-role byte exchange in this crate goes
//! through the encoders below; if two peers could disagree on the bytes of a
//! group element, Fiat–Shamir and the binding signature would both break.
//!
//! Layout rules:
//!
//! - A group element is a one-byte tag followed by the Arkworks compressed
//!   encoding. The identity element gets its own reserved tag and **no**
//!   payload — the library's default infinity encoding is never relied on,
//!   so "identity" can never collide with "uninitialised".
//! - A scalar is big-endian, fixed width (32 bytes for BN254), and must be a
//!   canonical representative (< p) on decode.
//! - Composite structures use `u32` big-endian length prefixes.

use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::{F, G1, G2};

/// Tag byte preceding a compressed non-identity point.
const TAG_POINT: u8 = 0x00;
/// Reserved tag for the group identity; carries no payload.
const TAG_IDENTITY: u8 = 0x01;

/// Fixed scalar width in bytes.
pub const SCALAR_BYTES: usize = 32;

/// Errors raised while encoding or decoding wire bytes.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before the declared structure was complete.
    #[error("truncated input: needed {needed} more bytes")]
    Truncated {
        /// How many additional bytes were required.
        needed: usize,
    },
    /// Unknown leading tag byte for a group element.
    #[error("unknown group-element tag {0:#04x}")]
    BadTag(u8),
    /// The compressed point bytes did not decode to a valid group element.
    #[error("invalid group element encoding")]
    BadPoint,
    /// The scalar bytes were not a canonical representative modulo p.
    #[error("non-canonical scalar encoding")]
    BadScalar,
    /// A declared length prefix was inconsistent with the payload.
    #[error("invalid length prefix")]
    BadLength,
}

// ============================================================================
// Group elements
// ============================================================================

/// Canonical bytes of a 𝔾₁ element.
pub fn g1_bytes(p: &G1) -> Vec<u8> {
    if p.is_zero() {
        return vec![TAG_IDENTITY];
    }
    let mut out = vec![TAG_POINT];
    p.serialize_compressed(&mut out)
        .expect("G1 serialization is infallible");
    out
}

/// Decode a 𝔾₁ element from its canonical bytes, consuming the whole slice.
pub fn g1_from_bytes(bytes: &[u8]) -> Result<G1, WireError> {
    match bytes.split_first() {
        None => Err(WireError::Truncated { needed: 1 }),
        Some((&TAG_IDENTITY, rest)) => {
            if rest.is_empty() {
                Ok(G1::identity())
            } else {
                Err(WireError::BadLength)
            }
        }
        Some((&TAG_POINT, rest)) => {
            let p = G1::deserialize_compressed(rest).map_err(|_| WireError::BadPoint)?;
            if p.is_zero() {
                // The infinity flag must not masquerade as a regular point.
                return Err(WireError::BadPoint);
            }
            Ok(p)
        }
        Some((&tag, _)) => Err(WireError::BadTag(tag)),
    }
}

/// Canonical bytes of a 𝔾₂ element.
pub fn g2_bytes(p: &G2) -> Vec<u8> {
    if p.is_zero() {
        return vec![TAG_IDENTITY];
    }
    let mut out = vec![TAG_POINT];
    p.serialize_compressed(&mut out)
        .expect("G2 serialization is infallible");
    out
}

/// Decode a 𝔾₂ element from its canonical bytes, consuming the whole slice.
pub fn g2_from_bytes(bytes: &[u8]) -> Result<G2, WireError> {
    match bytes.split_first() {
        None => Err(WireError::Truncated { needed: 1 }),
        Some((&TAG_IDENTITY, rest)) => {
            if rest.is_empty() {
                Ok(G2::identity())
            } else {
                Err(WireError::BadLength)
            }
        }
        Some((&TAG_POINT, rest)) => {
            let p = G2::deserialize_compressed(rest).map_err(|_| WireError::BadPoint)?;
            if p.is_zero() {
                return Err(WireError::BadPoint);
            }
            Ok(p)
        }
        Some((&tag, _)) => Err(WireError::BadTag(tag)),
    }
}

// ============================================================================
// Scalars
// ============================================================================

/// Big-endian fixed-width bytes of a scalar.
pub fn scalar_bytes(x: &F) -> [u8; SCALAR_BYTES] {
    let v = x.into_bigint().to_bytes_be();
    let mut out = [0u8; SCALAR_BYTES];
    out[SCALAR_BYTES - v.len()..].copy_from_slice(&v);
    out
}

/// Decode a canonical big-endian scalar.
pub fn scalar_from_bytes(bytes: &[u8]) -> Result<F, WireError> {
    if bytes.len() != SCALAR_BYTES {
        return Err(WireError::BadScalar);
    }
    let x = F::from_be_bytes_mod_order(bytes);
    // Reject non-canonical representatives (values ≥ p).
    if scalar_bytes(&x) != bytes {
        return Err(WireError::BadScalar);
    }
    Ok(x)
}

// ============================================================================
// Length-delimited framing
// ============================================================================

/// Append a `u32`-length-prefixed chunk.
pub fn put_chunk(out: &mut Vec<u8>, chunk: &[u8]) {
    out.extend_from_slice(&(chunk.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk);
}

/// Read a `u32`-length-prefixed chunk, advancing the cursor.
pub fn take_chunk<'a>(cursor: &mut &'a [u8]) -> Result<&'a [u8], WireError> {
    if cursor.len() < 4 {
        return Err(WireError::Truncated { needed: 4 - cursor.len() });
    }
    let (len_bytes, rest) = cursor.split_at(4);
    let len = u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;
    if rest.len() < len {
        return Err(WireError::Truncated { needed: len - rest.len() });
    }
    let (chunk, tail) = rest.split_at(len);
    *cursor = tail;
    Ok(chunk)
}

/// Append a `u32` big-endian counter.
pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Read a `u32` big-endian counter, advancing the cursor.
pub fn take_u32(cursor: &mut &[u8]) -> Result<u32, WireError> {
    if cursor.len() < 4 {
        return Err(WireError::Truncated { needed: 4 - cursor.len() });
    }
    let (head, tail) = cursor.split_at(4);
    *cursor = tail;
    Ok(u32::from_be_bytes([head[0], head[1], head[2], head[3]]))
}
