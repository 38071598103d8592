//! Dense 𝔽_p[X] polynomials
//!
//! The proof generators build their 𝔾₁ elements by assembling a polynomial
//! over the scalar field and evaluating it *in the exponent* against the CRS
//! powers, and the accumulator divides blacklist polynomials by degree-1
//! divisors. All arithmetic happens directly in 𝔽_p — coefficients are a
//! contiguous vector indexed by degree, reduced at every step by the field
//! type itself.
//!
//! Multiplication is schoolbook; the dimensions involved (n ≤ 64, blacklists
//! of at most a few thousand entries) keep it comfortably fast.

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::Zero;

use crate::crs::{Crs, CrsError};
use crate::{F, G1, G1P};

/// Errors raised by the polynomial engine.
#[derive(Debug, thiserror::Error)]
pub enum PolyError {
    /// A coefficient sits at the reserved degree `n+1`, which has no CRS
    /// base. The caller assembled a malformed polynomial.
    #[error("non-zero coefficient at reserved degree {0}")]
    DanglingCoefficient(usize),

    /// The polynomial degree exceeds what the CRS can evaluate.
    #[error("degree {degree} exceeds CRS capacity {max}")]
    DegreeTooLarge {
        /// Actual degree of the polynomial.
        degree: usize,
        /// Largest degree the CRS supports (2n).
        max: usize,
    },

    /// CRS access failure while exponentiating.
    #[error(transparent)]
    Crs(#[from] CrsError),
}

/// A dense polynomial over 𝔽_p, coefficients in ascending degree order.
///
/// The zero polynomial is the empty coefficient vector; all constructors
/// trim trailing zeros so representations are unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Poly {
    coeffs: Vec<F>,
}

impl Poly {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Poly { coeffs: Vec::new() }
    }

    /// Build from ascending-degree coefficients (trailing zeros trimmed).
    pub fn from_coeffs(mut coeffs: Vec<F>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Poly { coeffs }
    }

    /// The constant polynomial `c`.
    pub fn constant(c: F) -> Self {
        Self::from_coeffs(vec![c])
    }

    /// The monomial `c · X^deg`.
    pub fn monomial(deg: usize, c: F) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![F::zero(); deg + 1];
        coeffs[deg] = c;
        Poly { coeffs }
    }

    /// True iff this is the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; zero for the zero polynomial.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Coefficient of `X^k` (zero beyond the stored degree).
    pub fn coeff(&self, k: usize) -> F {
        self.coeffs.get(k).copied().unwrap_or_else(F::zero)
    }

    /// Ascending-degree coefficient slice.
    pub fn coeffs(&self) -> &[F] {
        &self.coeffs
    }

    /// Sum of two polynomials.
    pub fn add(&self, other: &Poly) -> Poly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(len);
        for k in 0..len {
            out.push(self.coeff(k) + other.coeff(k));
        }
        Poly::from_coeffs(out)
    }

    /// Difference of two polynomials.
    pub fn sub(&self, other: &Poly) -> Poly {
        let len = self.coeffs.len().max(other.coeffs.len());
        let mut out = Vec::with_capacity(len);
        for k in 0..len {
            out.push(self.coeff(k) - other.coeff(k));
        }
        Poly::from_coeffs(out)
    }

    /// Scale every coefficient by `c`.
    pub fn scale(&self, c: &F) -> Poly {
        if c.is_zero() {
            return Poly::zero();
        }
        Poly::from_coeffs(self.coeffs.iter().map(|a| *a * c).collect())
    }

    /// Multiply by `X^k`.
    pub fn shift(&self, k: usize) -> Poly {
        if self.is_zero() {
            return Poly::zero();
        }
        let mut out = vec![F::zero(); k + self.coeffs.len()];
        out[k..].copy_from_slice(&self.coeffs);
        Poly { coeffs: out }
    }

    /// Schoolbook product.
    pub fn mul(&self, other: &Poly) -> Poly {
        if self.is_zero() || other.is_zero() {
            return Poly::zero();
        }
        let mut out = vec![F::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] += *a * b;
            }
        }
        Poly::from_coeffs(out)
    }

    /// Evaluate at `x` (Horner).
    pub fn eval(&self, x: &F) -> F {
        let mut acc = F::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Long division by the degree-1 divisor `(X + y)`.
    ///
    /// Returns `(quotient, remainder)` with
    /// `self = quotient · (X + y) + remainder`; the remainder equals
    /// `self(−y)`. Callers that require exactness check the remainder.
    pub fn divide_by_linear(&self, y: &F) -> (Poly, F) {
        if self.is_zero() {
            return (Poly::zero(), F::zero());
        }
        // Synthetic division at the root −y, top coefficient first.
        let root = -*y;
        let mut quotient = vec![F::zero(); self.coeffs.len() - 1];
        let mut carry = F::zero();
        for k in (0..self.coeffs.len()).rev() {
            let b = self.coeffs[k] + root * carry;
            if k == 0 {
                return (Poly::from_coeffs(quotient), b);
            }
            quotient[k - 1] = b;
            carry = b;
        }
        unreachable!("loop returns at k == 0");
    }

    /// Evaluate in the exponent: `g^{ν_0} · ∏_{k≥1, k≠n+1} g_k^{ν_k}`.
    ///
    /// The constant term rides on the bare generator. A non-zero coefficient
    /// at degree `n+1` has no base to ride on and is rejected — the caller
    /// assembled a polynomial the CRS cannot express.
    pub fn eval_in_g1(&self, crs: &Crs) -> Result<G1, PolyError> {
        let n = crs.n();
        if !self.is_zero() && self.degree() > 2 * n {
            return Err(PolyError::DegreeTooLarge { degree: self.degree(), max: 2 * n });
        }
        if !self.coeff(n + 1).is_zero() {
            return Err(PolyError::DanglingCoefficient(n + 1));
        }
        let mut acc = G1P::zero();
        for (k, c) in self.coeffs.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let base = if k == 0 { crs.g() } else { crs.g_i(k)? };
            acc += base.into_group() * *c;
        }
        Ok(acc.into_affine())
    }
}
