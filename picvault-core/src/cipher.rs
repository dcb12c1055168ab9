//! Authenticated encryption of image payloads.
//!
//! Payloads are sealed with AES-256-GCM under the repository key. Every call
//! draws a fresh 96-bit nonce, stored in front of the ciphertext:
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! Any modification of those bytes, or decryption under a different key,
//! fails authentication and yields `VaultError::Integrity`; no partial
//! plaintext is ever returned.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{Result, VaultError};
use crate::key::EncryptionKey;

/// Nonce length for AES-GCM.
pub const NONCE_LEN: usize = 12;

/// Authentication tag length appended by AES-GCM.
pub const TAG_LEN: usize = 16;

/// Smallest well-formed ciphertext (empty plaintext).
pub const MIN_CIPHERTEXT_LEN: usize = NONCE_LEN + TAG_LEN;

fn cipher_for(key: &EncryptionKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt a raw payload into an opaque, self-contained blob.
pub fn encrypt(plaintext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let sealed = cipher_for(key)
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| VaultError::format("payload", format!("AES-GCM encrypt failed: {e}")))?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt a blob produced by [`encrypt`] under the same key.
pub fn decrypt(ciphertext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
    if ciphertext.len() < MIN_CIPHERTEXT_LEN {
        return Err(VaultError::format(
            "ciphertext",
            format!(
                "{} bytes is shorter than the {MIN_CIPHERTEXT_LEN}-byte minimum",
                ciphertext.len()
            ),
        ));
    }

    let (nonce, sealed) = ciphertext.split_at(NONCE_LEN);
    cipher_for(key)
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| {
            VaultError::Integrity("ciphertext was altered or sealed under a different key".into())
        })
}
