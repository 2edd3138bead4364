//! Synthetic blob builder shared by unit tests.

use crate::reader::{
    BLOCK_ALIGNMENT, BLOCK_HEADER_SIZE, MANIFEST_SIZE, PVR_FOOTER_SIZE, PVR_HEADER_SIZE,
    TEXTURE_BLOCK_MAGIC,
};

pub(crate) struct Entry {
    pub identifier: u8,
    pub width: u16,
    pub height: u16,
    pub name: String,
    pub payload: Vec<u8>,
    /// `Some` lays the name field out as a 20-byte name plus a u32 length.
    pub raw_length: Option<u32>,
    pub trailer: Vec<u8>,
}

impl Entry {
    pub fn new(identifier: u8, width: u16, height: u16, name: &str, payload: Vec<u8>) -> Self {
        Self {
            identifier,
            width,
            height,
            name: name.to_string(),
            payload,
            raw_length: None,
            trailer: Vec::new(),
        }
    }

    pub fn raw(name: &str, payload: Vec<u8>) -> Self {
        let length = payload.len() as u32;
        Self {
            raw_length: Some(length),
            ..Self::new(0xD, 0, 0, name, payload)
        }
    }

    pub fn with_identifier(mut self, identifier: u8) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn with_trailer(mut self, trailer: &[u8]) -> Self {
        self.trailer = trailer.to_vec();
        self
    }
}

fn pad_to_alignment(out: &mut Vec<u8>) {
    while out.len() % BLOCK_ALIGNMENT != 0 {
        out.push(0);
    }
}

/// Build one `TEX` block.  Payloads follow the manifests, each starting on a
/// 16-byte boundary; a trailer is written directly after its payload.
pub(crate) fn texture_block(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(TEXTURE_BLOCK_MAGIC);
    out.push(0);
    out.push(entries.len() as u8);
    out.resize(BLOCK_HEADER_SIZE, 0);

    let manifests_start = out.len();
    out.resize(manifests_start + MANIFEST_SIZE * entries.len(), 0);
    pad_to_alignment(&mut out);

    for (index, entry) in entries.iter().enumerate() {
        let starting_offset = out.len() as u32;
        let is_pvr = entry.identifier == 0xB || entry.identifier == 0xC;
        if is_pvr {
            out.resize(out.len() + PVR_HEADER_SIZE, 0);
        }
        out.extend_from_slice(&entry.payload);
        if is_pvr {
            out.resize(out.len() + PVR_FOOTER_SIZE, 0);
        }
        out.extend_from_slice(&entry.trailer);
        pad_to_alignment(&mut out);

        let mut manifest = Vec::with_capacity(MANIFEST_SIZE);
        manifest.extend_from_slice(&starting_offset.to_le_bytes());
        let packed_width = (u16::from(entry.identifier) << 12) | (entry.width & 0x0FFF);
        manifest.extend_from_slice(&packed_width.to_le_bytes());
        manifest.extend_from_slice(&(entry.height & 0x0FFF).to_le_bytes());
        let mut name = entry.name.as_bytes().to_vec();
        match entry.raw_length {
            Some(length) => {
                name.resize(20, 0);
                name.extend_from_slice(&length.to_le_bytes());
            }
            None => name.resize(24, 0),
        }
        manifest.extend_from_slice(&name);

        let at = manifests_start + MANIFEST_SIZE * index;
        out[at..at + MANIFEST_SIZE].copy_from_slice(&manifest);
    }

    out
}

/// Pack RGBA8888 pixels the way the blob stores them (big-endian words).
pub(crate) fn rgba8888(pixels: &[[u8; 4]]) -> Vec<u8> {
    pixels.iter().flat_map(|p| p.iter().copied()).collect()
}
