//! Consensus address derivation for Cosmos validators.
//!
//! The staking API returns a validator's consensus public key as base64. The slashing module
//! keys its signing infos by the bech32 `valcons` address derived from that key, so the two
//! can only be joined after this conversion.

use base64::{Engine, engine::general_purpose::STANDARD};
use bech32::{Bech32, Hrp};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a raw Ed25519 public key.
const ED25519_KEY_LEN: usize = 32;
/// Length of a compressed secp256k1 public key.
const SECP256K1_COMPRESSED_LEN: usize = 33;
/// Length of an Amino-prefixed key as returned by some legacy endpoints.
const AMINO_PREFIXED_LEN: usize = 36;
/// Size of the Amino type prefix stripped from [`AMINO_PREFIXED_LEN`] keys.
const AMINO_PREFIX_LEN: usize = 4;
/// Number of hash bytes that make up the address payload.
const ADDRESS_LEN: usize = 20;

/// Reasons a consensus address could not be derived.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    /// The public key was not valid base64.
    #[error("invalid base64 public key: {0}")]
    InvalidBase64(String),
    /// The decoded key did not match any supported layout.
    #[error("unrecognized public key format ({len} bytes)")]
    UnrecognizedKeyFormat {
        /// Decoded key length in bytes
        len: usize,
    },
    /// The prefix or payload could not be bech32 encoded.
    #[error("bech32 encoding failed: {0}")]
    Encoding(String),
}

/// Extract the raw key bytes from a decoded public key.
fn raw_key_bytes(decoded: &[u8]) -> Result<&[u8], DerivationError> {
    match decoded.len() {
        ED25519_KEY_LEN => Ok(decoded),
        AMINO_PREFIXED_LEN => Ok(&decoded[AMINO_PREFIX_LEN..]),
        SECP256K1_COMPRESSED_LEN if matches!(decoded[0], 0x02 | 0x03) => Ok(decoded),
        len => Err(DerivationError::UnrecognizedKeyFormat { len }),
    }
}

/// Derive the bech32 consensus address for a base64-encoded public key.
///
/// The payload is the first 20 bytes of `SHA-256(raw_key)`, regrouped from 8-bit to 5-bit
/// words and encoded with `valcons_prefix` as the human-readable part.
pub fn pubkey_to_consensus_address(
    pubkey_b64: &str,
    valcons_prefix: &str,
) -> Result<String, DerivationError> {
    let decoded =
        STANDARD.decode(pubkey_b64).map_err(|e| DerivationError::InvalidBase64(e.to_string()))?;
    let raw = raw_key_bytes(&decoded)?;

    let digest = Sha256::digest(raw);
    let hrp = Hrp::parse(valcons_prefix).map_err(|e| DerivationError::Encoding(e.to_string()))?;

    bech32::encode::<Bech32>(hrp, &digest[..ADDRESS_LEN])
        .map_err(|e| DerivationError::Encoding(e.to_string()))
}

/// Returns `true` if `prefix` is usable as a bech32 human-readable part.
pub fn is_valid_prefix(prefix: &str) -> bool {
    Hrp::parse(prefix).is_ok()
}
