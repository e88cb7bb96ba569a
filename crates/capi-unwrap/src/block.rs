//! AES-128 block envelope: independent per-block decryption plus PKCS7 unpadding.
//!
//! The target protocol uses electronic-codebook mode, so every 16-byte block is
//! decrypted on its own with no IV and no chaining.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Block};

use crate::error::{EnvelopeError, EnvelopeResult};

/// Cipher block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Required key length in bytes.
pub const KEY_SIZE: usize = 16;

/// Decrypt `ciphertext` block by block with `key` and strip PKCS7 padding.
pub fn decode(ciphertext: &[u8], key: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let mut plain = decrypt_blocks(ciphertext, key)?;
    let keep = unpadded_len(&plain)?;
    plain.truncate(keep);
    Ok(plain)
}

/// PKCS7-pad `plaintext` and encrypt it block by block with `key`.
///
/// Used to build envelopes for fixtures and round-trip checks.
pub fn seal(plaintext: &[u8], key: &[u8]) -> EnvelopeResult<Vec<u8>> {
    let cipher = new_cipher(key)?;

    let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut buf = Vec::with_capacity(plaintext.len() + pad);
    buf.extend_from_slice(plaintext);
    buf.resize(plaintext.len() + pad, pad as u8);

    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let block = Block::from_mut_slice(chunk);
        cipher.encrypt_block(block);
    }
    Ok(buf)
}

fn decrypt_blocks(ciphertext: &[u8], key: &[u8]) -> EnvelopeResult<Vec<u8>> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(EnvelopeError::Format(format!(
            "ciphertext length {} is not a multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }
    let cipher = new_cipher(key)?;

    let mut out = ciphertext.to_vec();
    for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
        let block = Block::from_mut_slice(chunk);
        cipher.decrypt_block(block);
    }
    Ok(out)
}

fn new_cipher(key: &[u8]) -> EnvelopeResult<Aes128> {
    if key.len() != KEY_SIZE {
        return Err(EnvelopeError::Format(format!(
            "key length {} is not {KEY_SIZE}",
            key.len()
        )));
    }
    Aes128::new_from_slice(key).map_err(|e| EnvelopeError::Format(format!("Invalid key: {e}")))
}

/// Length of `data` once its PKCS7 padding is removed.
fn unpadded_len(data: &[u8]) -> EnvelopeResult<usize> {
    let Some(&last) = data.last() else {
        return Err(EnvelopeError::Padding("no data to unpad".into()));
    };

    let pad = last as usize;
    if pad == 0 || pad > BLOCK_SIZE || pad > data.len() {
        return Err(EnvelopeError::Padding(format!("invalid pad length {pad}")));
    }

    let tail = &data[data.len() - pad..];
    if tail.iter().any(|&b| b != last) {
        return Err(EnvelopeError::Padding(format!(
            "trailing bytes do not all equal pad length {pad}"
        )));
    }

    Ok(data.len() - pad)
}
