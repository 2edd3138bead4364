//! Encrypted blob container.
//!
//! Encrypted blobs start with a 12-byte header:
//!   - 5 bytes magic `IOSCh`
//!   - 1 byte XOR key
//!   - 6 bytes padding
//!
//! The rest of the file is XORed byte-wise with the key and then
//! raw-deflated (no zlib header or trailer).  Blobs without the magic are
//! already decrypted and are returned as-is.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::error::TextureError;

pub const ENCRYPTED_MAGIC: &[u8; 5] = b"IOSCh";
pub const ENCRYPTED_HEADER_SIZE: usize = 12;

/// Returns the XOR key when `data` carries an encryption header.
pub fn encryption_key(data: &[u8]) -> Option<u8> {
    if data.len() < ENCRYPTED_HEADER_SIZE || &data[..ENCRYPTED_MAGIC.len()] != ENCRYPTED_MAGIC {
        return None;
    }
    Some(data[ENCRYPTED_MAGIC.len()])
}

/// Decrypt and inflate `data` if it is encrypted, otherwise borrow it unchanged.
pub fn decrypt_and_decompress(data: &[u8]) -> Result<Cow<'_, [u8]>, TextureError> {
    let Some(key) = encryption_key(data) else {
        return Ok(Cow::Borrowed(data));
    };

    let decrypted: Vec<u8> = data[ENCRYPTED_HEADER_SIZE..]
        .iter()
        .map(|byte| byte ^ key)
        .collect();

    let mut inflated = Vec::with_capacity(decrypted.len() * 4);
    DeflateDecoder::new(&decrypted[..])
        .read_to_end(&mut inflated)
        .map_err(TextureError::StreamCorrupt)?;
    log::debug!(
        "Decrypted blob with key 0x{key:02X}: {} -> {} bytes",
        data.len(),
        inflated.len()
    );
    Ok(Cow::Owned(inflated))
}
