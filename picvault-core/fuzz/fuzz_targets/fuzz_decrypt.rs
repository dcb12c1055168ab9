#![no_main]

//! Fuzz target for payload decryption
//!
//! Arbitrary bytes must come back as a format or integrity error, never a panic
//! and never a successful decryption.
//!
//! Run with: cargo +nightly fuzz run fuzz_decrypt

use libfuzzer_sys::fuzz_target;
use picvault_core::{cipher, EncryptionKey, KEY_LEN};

fuzz_target!(|data: &[u8]| {
    let Some(key) = EncryptionKey::from_slice(&[7u8; KEY_LEN]) else {
        return;
    };
    assert!(cipher::decrypt(data, &key).is_err());
});
