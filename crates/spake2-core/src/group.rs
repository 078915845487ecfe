//! Twisted Edwards curve group arithmetic over Ed25519.
//!
//! Four point representations, mirroring `ed25519.c`'s `ge_p2`/`ge_p3`/
//! `ge_p1p1`/`ge_cached`/`ge_precomp`:
//!
//! - [`ProjectivePoint`] `(X:Y:Z)`
//! - [`ExtendedPoint`] `(X:Y:Z:T)`, `T = XY/Z`
//! - [`CompletedPoint`], the four-field intermediate an addition or
//!   doubling produces before it collapses back to one of the above
//! - [`CachedPoint`] `(Y+X, Y-X, Z, 2dT)`, a precomputed operand for the
//!   unified addition formula
//! - [`AffinePrecomp`], the `Z = 1` specialization of `CachedPoint` a
//!   fixed-base table would use (reserved for that; this crate's scalar
//!   multiplication is variable-base only, per spec)
//!
//! `ed25519.c`'s `x25519_ge_sub` contains a debug `printf` dumping `r->T`
//! before and after the subtraction. That is diagnostic residue, not part
//! of the subtraction's defined behavior, and is not reproduced here.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::constants::{d, d2, sqrt_m1, BASEPOINT_BYTES};
use crate::field::{Fe, FeLoose};

/// A point in projective `(X:Y:Z)` coordinates; affine `(x,y) = (X/Z, Y/Z)`.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub x: Fe,
    pub y: Fe,
    pub z: Fe,
}

/// A point in extended `(X:Y:Z:T)` coordinates, `T = XY/Z`.
#[derive(Clone, Copy, Debug)]
pub struct ExtendedPoint {
    pub x: Fe,
    pub y: Fe,
    pub z: Fe,
    pub t: Fe,
}

/// The result of an addition or doubling before it is collapsed into one
/// of the other representations. Fields are loose (not yet fully reduced).
#[derive(Clone, Copy, Debug)]
pub struct CompletedPoint {
    pub x: FeLoose,
    pub y: FeLoose,
    pub z: FeLoose,
    pub t: FeLoose,
}

/// A precomputed operand for the unified addition formula:
/// `(Y+X, Y-X, Z, 2dT)`.
#[derive(Clone, Copy, Debug)]
pub struct CachedPoint {
    pub y_plus_x: Fe,
    pub y_minus_x: Fe,
    pub z: Fe,
    pub t2d: Fe,
}

/// The `Z = 1` specialization of [`CachedPoint`], for a fixed-base table.
/// Not used by this crate's variable-base scalar multiplication; kept for
/// API parity with the data model and any future fixed-base optimization.
#[derive(Clone, Copy, Debug)]
pub struct AffinePrecomp {
    pub y_plus_x: Fe,
    pub y_minus_x: Fe,
    pub xy2d: Fe,
}

impl ExtendedPoint {
    /// The neutral element `(0:1:1:0)`.
    pub fn identity() -> ExtendedPoint {
        ExtendedPoint {
            x: Fe::zero(),
            y: Fe::one(),
            z: Fe::one(),
            t: Fe::zero(),
        }
    }

    /// The standard Ed25519 base point.
    pub fn basepoint() -> ExtendedPoint {
        decompress(&BASEPOINT_BYTES).expect("standard base point encoding is always valid")
    }

    pub fn to_projective(&self) -> ProjectivePoint {
        ProjectivePoint {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    pub fn to_cached(&self) -> CachedPoint {
        let y_plus_x = self.y.add(&self.x).carry();
        let y_minus_x = self.y.sub(&self.x).carry();
        let t2d = self.t.mul(&d2());
        CachedPoint {
            y_plus_x,
            y_minus_x,
            z: self.z,
            t2d,
        }
    }

    /// `self + self`.
    pub fn double(&self) -> ExtendedPoint {
        self.to_projective().double().to_extended()
    }

    /// `self + other`.
    pub fn add(&self, other: &CachedPoint) -> CompletedPoint {
        add_or_sub(self, other, false)
    }

    /// `self - other`.
    pub fn sub(&self, other: &CachedPoint) -> CompletedPoint {
        add_or_sub(self, other, true)
    }

    /// Compress to the standard 32-byte encoding: the `y` coordinate with
    /// the sign of `x` folded into the top bit.
    pub fn compress(&self) -> [u8; 32] {
        let recip = self.z.invert();
        let x = self.x.mul(&recip);
        let y = self.y.mul(&recip);
        let mut s = y.to_bytes();
        s[31] ^= x.is_negative().unwrap_u8() << 7;
        s
    }

    pub fn conditional_select(a: &ExtendedPoint, b: &ExtendedPoint, choice: Choice) -> ExtendedPoint {
        ExtendedPoint {
            x: Fe::conditional_select(&a.x, &b.x, choice),
            y: Fe::conditional_select(&a.y, &b.y, choice),
            z: Fe::conditional_select(&a.z, &b.z, choice),
            t: Fe::conditional_select(&a.t, &b.t, choice),
        }
    }
}

impl ProjectivePoint {
    pub fn to_extended(&self) -> ExtendedPoint {
        // Recompute T via a throwaway extended-form doubling trick is
        // unnecessary here: callers that need T always come through
        // CompletedPoint::to_extended, which has it directly. For a plain
        // projective point lacking T, fall back to computing it from the
        // affine ratio.
        let recip = self.z.invert();
        let x_affine = self.x.mul(&recip);
        let y_affine = self.y.mul(&recip);
        let t = x_affine.mul(&y_affine);
        ExtendedPoint {
            x: self.x,
            y: self.y,
            z: self.z,
            t: t.mul(&self.z),
        }
    }

    /// `self + self`, the `dbl-2008-hwcd` doubling formula specialized to
    /// `a = -1`.
    pub fn double(&self) -> CompletedPoint {
        let a = self.x.square();
        let b = self.y.square();
        let c = {
            let zz = self.z.square();
            zz.add(&zz)
        };
        let xy_sum = self.x.add(&self.y).carry();
        let e = xy_sum.square().sub(&a).carry().sub(&b);
        let g = b.sub(&a).carry();
        let f = g.sub(&c.carry());
        let h = a.add(&b).carry().negate();

        CompletedPoint {
            x: e,
            y: h,
            z: g.into(),
            t: f,
        }
    }
}

impl CompletedPoint {
    pub fn to_projective(&self) -> ProjectivePoint {
        let x = self.x.carry();
        let t = self.t.carry();
        let y = self.y.carry();
        let z = self.z.carry();
        ProjectivePoint {
            x: x.mul(&t),
            y: y.mul(&z),
            z: z.mul(&t),
        }
    }

    pub fn to_extended(&self) -> ExtendedPoint {
        let x = self.x.carry();
        let y = self.y.carry();
        let z = self.z.carry();
        let t = self.t.carry();
        ExtendedPoint {
            x: x.mul(&t),
            y: y.mul(&z),
            z: z.mul(&t),
            t: x.mul(&y),
        }
    }
}

impl CachedPoint {
    /// The cached form of the identity point: a neutral operand for the
    /// unified addition formula.
    pub fn identity() -> CachedPoint {
        CachedPoint {
            y_plus_x: Fe::one(),
            y_minus_x: Fe::one(),
            z: Fe::one(),
            t2d: Fe::zero(),
        }
    }

    /// `(x,y) -> (-x,y)`: swap `Y+X`/`Y-X` and negate `2dT`.
    pub fn conditional_negate(&self, choice: Choice) -> CachedPoint {
        let swapped_plus = Fe::conditional_select(&self.y_plus_x, &self.y_minus_x, choice);
        let swapped_minus = Fe::conditional_select(&self.y_minus_x, &self.y_plus_x, choice);
        let negated_t2d = Fe::conditional_select(&self.t2d, &self.t2d.negate().carry(), choice);
        CachedPoint {
            y_plus_x: swapped_plus,
            y_minus_x: swapped_minus,
            z: self.z,
            t2d: negated_t2d,
        }
    }

    pub fn conditional_select(a: &CachedPoint, b: &CachedPoint, choice: Choice) -> CachedPoint {
        CachedPoint {
            y_plus_x: Fe::conditional_select(&a.y_plus_x, &b.y_plus_x, choice),
            y_minus_x: Fe::conditional_select(&a.y_minus_x, &b.y_minus_x, choice),
            z: Fe::conditional_select(&a.z, &b.z, choice),
            t2d: Fe::conditional_select(&a.t2d, &b.t2d, choice),
        }
    }
}

/// Unified add (`negate_q = false`) or subtract (`negate_q = true`).
fn add_or_sub(p: &ExtendedPoint, q: &CachedPoint, negate_q: bool) -> CompletedPoint {
    let (q_plus, q_minus) = if negate_q {
        (q.y_minus_x, q.y_plus_x)
    } else {
        (q.y_plus_x, q.y_minus_x)
    };
    let t2d = if negate_q { q.t2d.negate().carry() } else { q.t2d };

    let y_minus_x = p.y.sub(&p.x).carry();
    let y_plus_x = p.y.add(&p.x).carry();
    let a = y_minus_x.mul(&q_minus);
    let b = y_plus_x.mul(&q_plus);
    let c = p.t.mul(&t2d);
    let d_val = {
        let zz = p.z.mul(&q.z);
        zz.add(&zz)
    };

    let e = b.sub(&a);
    let h = b.add(&a).carry();
    let d_tight = d_val.carry();
    let f = d_tight.sub(&c);
    let g = d_tight.add(&c).carry();

    CompletedPoint {
        x: e,
        y: h.into(),
        z: g.into(),
        t: f,
    }
}

/// Decode a compressed point, verifying it lies on the curve. Mirrors
/// `x25519_ge_frombytes_vartime`.
pub fn decompress(s: &[u8; 32]) -> Option<ExtendedPoint> {
    let sign = (s[31] >> 7) & 1;
    let y = Fe::from_bytes(s);
    let z = Fe::one();
    let yy = y.square();
    let u = yy.sub(&z).carry();
    let v = yy.mul(&d()).add(&z).carry();

    let v3 = v.square().mul(&v);
    let v7 = v3.square().mul(&v);
    let mut x = u.mul(&v7).pow_p58();
    x = x.mul(&v3).mul(&u);

    let vxx = x.square().mul(&v);
    let mut check = vxx.sub(&u).carry();
    if !bool::from(check.ct_eq_zero()) {
        check = vxx.add(&u).carry();
        if !bool::from(check.ct_eq_zero()) {
            return None;
        }
        x = x.mul(&sqrt_m1());
    }

    let x_is_negative = x.is_negative().unwrap_u8();
    if x_is_negative == 0 && sign == 0 {
        // fine
    } else if x_is_negative == 1 && sign == 1 {
        // fine
    } else if x_is_negative != sign {
        if bool::from(x.ct_eq(&Fe::zero())) {
            return None;
        }
        x = x.negate().carry();
    }

    let t = x.mul(&y);
    Some(ExtendedPoint { x, y, z, t })
}

impl Fe {
    fn ct_eq_zero(&self) -> Choice {
        self.ct_eq(&Fe::zero())
    }
}

/// Recode a 32-byte scalar into 64 signed base-16 digits in `[-8, 8]`,
/// with the final digit possibly `8` to absorb the last carry. Standard
/// technique for windowed scalar multiplication.
fn to_radix16(a: &[u8; 32]) -> [i8; 64] {
    let mut e = [0i8; 64];
    for i in 0..32 {
        e[2 * i] = (a[i] & 0x0f) as i8;
        e[2 * i + 1] = ((a[i] >> 4) & 0x0f) as i8;
    }
    let mut carry = 0i8;
    for i in 0..63 {
        e[i] += carry;
        carry = (e[i] + 8) >> 4;
        e[i] -= carry << 4;
    }
    e[63] += carry;
    e
}

/// Build the 9-entry lookup table `{0*P, 1*P, ..., 8*P}` used by
/// [`scalar_mult`]'s constant-time digit select.
fn build_table(point: &ExtendedPoint) -> [CachedPoint; 9] {
    let mut table = [CachedPoint::identity(); 9];
    let base_cached = point.to_cached();
    table[1] = base_cached;
    let mut acc = *point;
    for i in 2..9 {
        acc = acc.add(&base_cached).to_extended();
        table[i] = acc.to_cached();
    }
    table
}

/// Constant-time select of `table[|digit|]`, negated when `digit < 0`.
fn select_cached(table: &[CachedPoint; 9], digit: i8) -> CachedPoint {
    let sign = Choice::from((digit < 0) as u8);
    let abs = digit.unsigned_abs();
    let mut out = CachedPoint::identity();
    for (j, entry) in table.iter().enumerate() {
        let matches = (j as u8).ct_eq(&abs);
        out = CachedPoint::conditional_select(&out, entry, matches);
    }
    out.conditional_negate(sign)
}

/// Variable-base scalar multiplication: `scalar * point`.
///
/// Recodes `scalar` into 64 signed radix-16 digits, builds an 8-point
/// (plus identity) cached table of small multiples of `point`, and walks
/// the digits most-significant first, quadrupling and selecting the
/// matching table entry (constant-time in the digit's value) at each step.
pub fn scalar_mult(point: &ExtendedPoint, scalar: &[u8; 32]) -> ExtendedPoint {
    let digits = to_radix16(scalar);
    let table = build_table(point);

    let mut r = ExtendedPoint::identity();
    for i in (0..64).rev() {
        r = r.double();
        r = r.double();
        r = r.double();
        r = r.double();
        let addend = select_cached(&table, digits[i]);
        r = r.add(&addend).to_extended();
    }
    r
}

/// `scalar * basepoint`.
pub fn scalar_mult_base(scalar: &[u8; 32]) -> ExtendedPoint {
    scalar_mult(&ExtendedPoint::basepoint(), scalar)
}
