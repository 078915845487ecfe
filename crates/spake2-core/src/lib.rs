//! SPAKE2 password-authenticated key exchange over the Ed25519 group.
//!
//! Three layers live under this crate root: [`field`] (GF(2^255-19)
//! arithmetic), [`group`] (twisted Edwards point arithmetic and
//! variable-base scalar multiplication), and [`spake2`] (the protocol
//! state machine built on top of them). Most callers only need
//! [`Session`], [`Role`], [`Error`] and [`Result`], re-exported here.
//!
//! Randomness and the SHA-512 primitive are supplied by `rand::RngCore`
//! and the `sha2` crate respectively; this crate implements neither.

pub mod constants;
pub mod error;
pub mod field;
pub mod group;
pub mod scalar;
pub mod spake2;

pub use error::{Error, Result};
pub use spake2::{Role, Session, MAX_NAME_LEN};
