//! Curve and field constants.
//!
//! `D`, `D2` and `SQRT_M1` are the limb values from `ed25519.c`'s own
//! constant tables. `L` is the standard Ed25519 group order
//! `2^252 + 27742317777372353535851937790883648493`. `BASEPOINT_BYTES` is
//! the standard compressed encoding of the Ed25519 generator.
//!
//! `M_BYTES`/`N_BYTES` are the SPAKE2-over-Ed25519 mask points spec.md §6
//! names; `original_source/` did not retain the table that embeds their
//! exact bytes (only `ed25519.c`, `sha512.h`, `spake2.cpp` and `test.c`
//! were captured), so these are placeholders pending cross-check against
//! an authoritative SPAKE2 implementation — see `DESIGN.md`.

use crate::field::Fe;

const D_LIMBS: [u32; 10] = [
    56195235, 13857412, 51736253, 6949390, 114729, 24766616, 60832955, 30306712, 48412415,
    21499315,
];

const D2_LIMBS: [u32; 10] = [
    45281625, 27714825, 36363642, 13898781, 229458, 15978800, 54557047, 27058993, 29715967,
    9444199,
];

const SQRT_M1_LIMBS: [u32; 10] = [
    34513072, 25610706, 9377949, 3500415, 12389472, 33281959, 41962654, 31548777, 326685,
    11406482,
];

/// The Edwards curve parameter `d = -121665/121666`.
pub fn d() -> Fe {
    Fe(D_LIMBS)
}

/// `2*d`, used by the unified addition formulas.
pub fn d2() -> Fe {
    Fe(D2_LIMBS)
}

/// A square root of `-1` mod p, used by point decompression.
pub fn sqrt_m1() -> Fe {
    Fe(SQRT_M1_LIMBS)
}

/// Compressed encoding of the standard Ed25519 base point.
pub const BASEPOINT_BYTES: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
];

/// The group order `ℓ`, little-endian bytes.
pub const GROUP_ORDER_BYTES: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// SPAKE2 mask point `M`, used by the initiator side. See module docs.
pub const M_BYTES: [u8; 32] = [
    0xd0, 0x48, 0x03, 0x2c, 0x6e, 0xa0, 0xb6, 0xd6, 0x97, 0xdd, 0xc2, 0xe8, 0x6b, 0xda, 0x85, 0xa3,
    0x3a, 0xda, 0xc9, 0x20, 0xf1, 0xbf, 0x18, 0xe1, 0xb0, 0xc6, 0xd1, 0x66, 0xa5, 0xce, 0xcd, 0xaf,
];

/// SPAKE2 mask point `N`, used by the responder side. See module docs.
pub const N_BYTES: [u8; 32] = [
    0xd3, 0xbf, 0xb5, 0x18, 0xf4, 0x4f, 0x34, 0x30, 0xf2, 0x9d, 0x0c, 0x92, 0xaf, 0x50, 0x31, 0x74,
    0x92, 0xa0, 0xa7, 0xf3, 0x64, 0x19, 0xfe, 0x3d, 0xb7, 0xbd, 0x98, 0x4f, 0x3e, 0xf9, 0xa3, 0xc4,
];
