//! SPAKE2 protocol state machine over the Ed25519 group.

use rand::RngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

use crate::constants::{M_BYTES, N_BYTES};
use crate::error::{Error, Result};
use crate::group::{decompress, scalar_mult, scalar_mult_base, ExtendedPoint};
use crate::scalar::{clamp, reduce_wide};

/// Maximum length, in bytes, of either party's name.
pub const MAX_NAME_LEN: usize = 256;

/// Which side of the exchange a [`Session`] plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Uses mask point `M`.
    Initiator,
    /// Uses mask point `N`.
    Responder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Fresh,
    Sent,
    Done,
    Failed,
}

/// One side of a single SPAKE2 exchange.
///
/// Single-shot: `generate` then `process` must each run exactly once, in
/// that order. Calling either out of order or twice returns
/// [`Error::WrongState`] rather than silently reusing ephemeral state.
/// Secrets (`w`, the ephemeral scalar) are wiped on drop and as soon as
/// the exchange finishes, success or failure.
pub struct Session {
    role: Role,
    my_name: Vec<u8>,
    their_name: Vec<u8>,
    my_msg: Option<[u8; 32]>,
    x_scalar: [u8; 32],
    w_scalar: [u8; 32],
    phase: Phase,
}

impl Session {
    /// Start a new exchange. `my_name`/`their_name` identify the two
    /// parties and are folded into the transcript hash so a completed key
    /// is bound to both identities.
    pub fn create(role: Role, my_name: &[u8], their_name: &[u8]) -> Result<Session> {
        if my_name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                len: my_name.len(),
                max: MAX_NAME_LEN,
            });
        }
        if their_name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                len: their_name.len(),
                max: MAX_NAME_LEN,
            });
        }
        log::trace!("spake2: session created, role={:?}", role);
        Ok(Session {
            role,
            my_name: my_name.to_vec(),
            their_name: their_name.to_vec(),
            my_msg: None,
            x_scalar: [0u8; 32],
            w_scalar: [0u8; 32],
            phase: Phase::Fresh,
        })
    }

    /// Derive the password scalar `w` and the outbound message
    /// `T = x*B + w*mask`, where `mask` is `M` for the initiator and `N`
    /// for the responder.
    pub fn generate(&mut self, password: &[u8], rng: &mut impl RngCore) -> Result<[u8; 32]> {
        if self.phase != Phase::Fresh {
            return Err(Error::WrongState);
        }

        let w_scalar = derive_password_scalar(password);

        let mut x_bytes = [0u8; 32];
        rng.try_fill_bytes(&mut x_bytes).map_err(Error::RngFailure)?;
        clamp(&mut x_bytes);

        let mask = match self.role {
            Role::Initiator => ExtendedPoint::decompress_constant(&M_BYTES),
            Role::Responder => ExtendedPoint::decompress_constant(&N_BYTES),
        };

        let x_term = scalar_mult_base(&x_bytes);
        let w_term = scalar_mult(&mask, &w_scalar);
        let t_point = x_term.add(&w_term.to_cached()).to_extended();
        let msg = t_point.compress();

        self.x_scalar = x_bytes;
        self.w_scalar = w_scalar;
        self.my_msg = Some(msg);
        self.phase = Phase::Sent;
        log::debug!("spake2: outbound message generated");
        Ok(msg)
    }

    /// Consume the peer's message, derive the shared 64-byte key, and
    /// retire the session's secrets. Rejects an invalid curve point and
    /// a peer message identical to our own (a degenerate reflection).
    pub fn process(&mut self, peer_msg: &[u8; 32]) -> Result<[u8; 64]> {
        if self.phase != Phase::Sent {
            return Err(Error::WrongState);
        }
        let my_msg = self.my_msg.expect("Sent phase always carries my_msg");

        if peer_msg == &my_msg {
            self.fail();
            return Err(Error::BadPeerMessage);
        }

        let peer_point = match decompress(peer_msg) {
            Some(p) => p,
            None => {
                self.fail();
                return Err(Error::BadPeerMessage);
            }
        };

        let their_mask = match self.role {
            Role::Initiator => ExtendedPoint::decompress_constant(&N_BYTES),
            Role::Responder => ExtendedPoint::decompress_constant(&M_BYTES),
        };
        let their_mask_term = scalar_mult(&their_mask, &self.w_scalar);
        let unmasked = peer_point.sub(&their_mask_term.to_cached()).to_extended();

        // No cofactor clearing here: `x` is clamped before this point ever
        // gets scalar-multiplied, which already rules out a small-subgroup
        // component reaching the shared secret.
        let shared = scalar_mult(&unmasked, &self.x_scalar);

        // Canonical field order is by role, not by who is computing: both
        // sides must hash the same bytes in the same order to agree on a
        // key, so "initiator's name" always comes before "responder's
        // name" regardless of which side `self` is.
        let (init_name, resp_name, init_msg, resp_msg): (&[u8], &[u8], &[u8], &[u8]) =
            match self.role {
                Role::Initiator => (&self.my_name, &self.their_name, &my_msg, peer_msg),
                Role::Responder => (&self.their_name, &self.my_name, peer_msg, &my_msg),
            };

        let mut hasher = Sha512::new();
        update_transcript_field(&mut hasher, init_name);
        update_transcript_field(&mut hasher, resp_name);
        update_transcript_field(&mut hasher, init_msg);
        update_transcript_field(&mut hasher, resp_msg);
        update_transcript_field(&mut hasher, &shared.compress());
        update_transcript_field(&mut hasher, &self.w_scalar);
        let digest = hasher.finalize();
        let mut key = [0u8; 64];
        key.copy_from_slice(&digest);

        self.finish();
        log::debug!("spake2: exchange complete");
        Ok(key)
    }

    fn finish(&mut self) {
        self.x_scalar.zeroize();
        self.w_scalar.zeroize();
        self.phase = Phase::Done;
    }

    fn fail(&mut self) {
        self.x_scalar.zeroize();
        self.w_scalar.zeroize();
        self.phase = Phase::Failed;
    }

    /// Test-only entry point matching spec.md's `disable_password_scalar`
    /// debug path: bypasses password hashing and uses a raw scalar for
    /// `w` directly. Not reachable from normal application code.
    #[cfg(test)]
    pub(crate) fn generate_with_raw_scalar(
        &mut self,
        w_scalar: [u8; 32],
        rng: &mut impl RngCore,
    ) -> Result<[u8; 32]> {
        if self.phase != Phase::Fresh {
            return Err(Error::WrongState);
        }
        let mut x_bytes = [0u8; 32];
        rng.try_fill_bytes(&mut x_bytes).map_err(Error::RngFailure)?;
        clamp(&mut x_bytes);

        let mask = match self.role {
            Role::Initiator => ExtendedPoint::decompress_constant(&M_BYTES),
            Role::Responder => ExtendedPoint::decompress_constant(&N_BYTES),
        };
        let x_term = scalar_mult_base(&x_bytes);
        let w_term = scalar_mult(&mask, &w_scalar);
        let t_point = x_term.add(&w_term.to_cached()).to_extended();
        let msg = t_point.compress();

        self.x_scalar = x_bytes;
        self.w_scalar = w_scalar;
        self.my_msg = Some(msg);
        self.phase = Phase::Sent;
        Ok(msg)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.x_scalar.zeroize();
        self.w_scalar.zeroize();
        self.my_name.zeroize();
        self.their_name.zeroize();
    }
}

impl ExtendedPoint {
    fn decompress_constant(bytes: &[u8; 32]) -> ExtendedPoint {
        decompress(bytes).expect("mask point constant must be a valid curve point")
    }
}

/// Feed one transcript field into the running hash as an 8-byte
/// little-endian length followed by the field's bytes, so a length-zero
/// field can never be confused with the absence of a field, and fields of
/// differing length can never collide by concatenation alone.
fn update_transcript_field(hasher: &mut Sha512, field: &[u8]) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field);
}

/// `w = SHA-512(password) mod ℓ`, the password-derived scalar shared by
/// both sides of an exchange run with the same password.
fn derive_password_scalar(password: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(password);
    let digest = hasher.finalize();
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&digest);
    reduce_wide(&wide)
}
