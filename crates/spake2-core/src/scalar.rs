//! Scalar clamping and wide reduction modulo the group order `ℓ`.

use subtle::{Choice, ConditionallySelectable};

use crate::constants::GROUP_ORDER_BYTES;

/// Apply the standard Ed25519 clamp in place: clear the low three bits of
/// the first byte, clear the top bit and set bit 254 of the last byte.
/// This forces the scalar into the subgroup-safe range and fixes its bit
/// length, defending against small-subgroup attacks. Pure bit masking, no
/// branch on the scalar's value.
pub fn clamp(s: &mut [u8; 32]) {
    s[0] &= 0xf8;
    s[31] &= 0x7f;
    s[31] |= 0x40;
}

fn order() -> [u64; 4] {
    let mut out = [0u64; 4];
    for i in 0..4 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&GROUP_ORDER_BYTES[i * 8..i * 8 + 8]);
        out[i] = u64::from_le_bytes(buf);
    }
    out
}

/// Conditionally subtract `ℓ` from `acc`, in constant time: always computes
/// `acc - ℓ`, then selects between the subtracted and original value based
/// on whether the subtraction borrowed, rather than branching on the
/// comparison result.
fn conditional_sub_order(acc: [u64; 4]) -> [u64; 4] {
    let l = order();
    let mut diff = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (r0, b0) = acc[i].overflowing_sub(l[i]);
        let (r1, b1) = r0.overflowing_sub(borrow);
        diff[i] = r1;
        borrow = b0 as u64 + b1 as u64;
    }
    let keep_acc = Choice::from(borrow as u8);
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = u64::conditional_select(&diff[i], &acc[i], keep_acc);
    }
    out
}

fn shl1(acc: [u64; 4], bit_in: u64) -> [u64; 4] {
    let mut out = [0u64; 4];
    let mut carry = bit_in;
    for i in 0..4 {
        out[i] = (acc[i] << 1) | carry;
        carry = acc[i] >> 63;
    }
    out
}

/// Reduce a 64-byte wide value (e.g. a SHA-512 digest) modulo `ℓ`,
/// producing a 32-byte little-endian scalar in `[0, ℓ)`.
///
/// Implemented as a constant-time binary long division: process the input
/// most-significant-bit first, shifting the running remainder left and
/// folding in each new bit, conditionally subtracting `ℓ` after every
/// step so the remainder never exceeds `2ℓ` before the next shift. Kept
/// deliberately simple (rather than the batched 25-limb reduction classic
/// `ref10` implementations use) since it must be auditable without a
/// compiler to catch a transcription slip.
pub fn reduce_wide(input: &[u8; 64]) -> [u8; 32] {
    let mut acc = [0u64; 4];
    for byte_index in (0..64).rev() {
        let byte = input[byte_index];
        for bit in (0..8).rev() {
            let b = ((byte >> bit) & 1) as u64;
            acc = shl1(acc, b);
            acc = conditional_sub_order(acc);
        }
    }
    let mut out = [0u8; 32];
    for i in 0..4 {
        out[i * 8..i * 8 + 8].copy_from_slice(&acc[i].to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_sets_expected_bits() {
        let mut s = [0xffu8; 32];
        clamp(&mut s);
        assert_eq!(s[0] & 0x07, 0);
        assert_eq!(s[31] & 0x80, 0);
        assert_eq!(s[31] & 0x40, 0x40);
    }

    #[test]
    fn reduce_wide_zero_is_zero() {
        let input = [0u8; 64];
        let r = reduce_wide(&input);
        assert_eq!(r, [0u8; 32]);
    }

    #[test]
    fn reduce_wide_small_value_is_identity() {
        let mut input = [0u8; 64];
        input[0] = 42;
        let r = reduce_wide(&input);
        let mut expected = [0u8; 32];
        expected[0] = 42;
        assert_eq!(r, expected);
    }

    #[test]
    fn reduce_wide_order_itself_is_zero() {
        let mut input = [0u8; 64];
        input[..32].copy_from_slice(&GROUP_ORDER_BYTES);
        let r = reduce_wide(&input);
        assert_eq!(r, [0u8; 32]);
    }

    #[test]
    fn reduce_wide_result_is_smaller_than_order() {
        let input = [0xffu8; 64];
        let r = reduce_wide(&input);
        // byte-reversed big-endian compare against the order bytes
        let mut less = false;
        for i in (0..32).rev() {
            if r[i] != GROUP_ORDER_BYTES[i] {
                less = r[i] < GROUP_ORDER_BYTES[i];
                break;
            }
        }
        assert!(less);
    }
}
