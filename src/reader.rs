//! Texture block walker.
//!
//! A decrypted blob is scanned in 16-byte steps for block headers:
//!   - 3 bytes magic (`TEX` for textures, `ISC` for an animation index)
//!   - 1 byte padding
//!   - 1 byte texture count
//!   - 11 bytes padding
//!
//! A `TEX` header is followed by `count` manifest entries of 32 bytes each:
//!   - u32 LE starting offset, relative to the block header
//!   - u16 LE packed width: encoding identifier in the top nibble, width in
//!     the low 12 bits
//!   - u16 LE packed height: height in the low 12 bits
//!   - 24 bytes NUL-padded name; raw entries split this into a 20-byte name
//!     and a u32 LE byte count

use std::io::{self, Cursor, Read};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::blob;
use crate::encoding::Encoding;
use crate::error::{TextureError, Warning};

pub const TEXTURE_BLOCK_MAGIC: &[u8; 3] = b"TEX";
pub const ANIMATION_BLOCK_MAGIC: &[u8; 3] = b"ISC";
pub const BLOCK_HEADER_SIZE: usize = 16;
pub const BLOCK_ALIGNMENT: usize = 16;
pub const MANIFEST_SIZE: usize = 32;
const NAME_SIZE: usize = 24;
const RAW_NAME_SIZE: usize = 20;

/// Unknown prefix in front of PVR pixel data.
pub const PVR_HEADER_SIZE: usize = 52;
/// Unknown suffix behind PVR pixel data.
pub const PVR_FOOTER_SIZE: usize = 12;
/// Size of the record trailing RGBA4444 textures that carries trim bounds.
pub const TRIM_HINT_SIZE: usize = 16;

/// A single texture sliced out of a blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    /// Upper bound for the trimming search; never larger than `width`.
    pub given_width: u32,
    pub given_height: u32,
    pub name: String,
    pub buffer: Vec<u8>,
    pub encoding: Encoding,
}

impl Texture {
    /// A zero `given_width`/`given_height` falls back to the full size.
    pub fn new(
        width: u32,
        height: u32,
        name: String,
        buffer: Vec<u8>,
        encoding: Encoding,
        given_width: u32,
        given_height: u32,
    ) -> Self {
        Self {
            width,
            height,
            given_width: if given_width == 0 { width } else { given_width },
            given_height: if given_height == 0 { height } else { given_height },
            name,
            buffer,
            encoding,
        }
    }
}

/// Everything the walker found in one blob.
#[derive(Debug, Default)]
pub struct TextureBlob {
    pub textures: Vec<Texture>,
    /// Set when an animation index block was seen.
    pub is_animated: bool,
    pub warnings: Vec<Warning>,
}

struct ManifestEntry {
    starting_offset: u32,
    packed_width: u16,
    packed_height: u16,
    name: [u8; NAME_SIZE],
}

impl ManifestEntry {
    fn read(cur: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let starting_offset = cur.read_u32::<LittleEndian>()?;
        let packed_width = cur.read_u16::<LittleEndian>()?;
        let packed_height = cur.read_u16::<LittleEndian>()?;
        let mut name = [0u8; NAME_SIZE];
        cur.read_exact(&mut name)?;
        Ok(Self {
            starting_offset,
            packed_width,
            packed_height,
            name,
        })
    }

    fn encoding_identifier(&self) -> u8 {
        (self.packed_width >> 12) as u8
    }

    fn width(&self) -> u32 {
        u32::from(self.packed_width & 0x0FFF)
    }

    fn height(&self) -> u32 {
        u32::from(self.packed_height & 0x0FFF)
    }
}

fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Read the speculative `(8 bytes, width, height, frames, unknown)` record at
/// `offset`.  Returns `None` when it does not fit or either size is zero.
fn read_trim_hint(data: &[u8], offset: usize) -> Option<(u32, u32)> {
    let end = offset.checked_add(TRIM_HINT_SIZE)?;
    let record = data.get(offset..end)?;
    let width = LittleEndian::read_u16(&record[8..10]);
    let height = LittleEndian::read_u16(&record[10..12]);
    if width == 0 || height == 0 {
        return None;
    }
    Some((u32::from(width), u32::from(height)))
}

/// Decrypt `data` if needed and walk it for textures.
pub fn extract_textures(data: &[u8]) -> Result<TextureBlob, TextureError> {
    let blob = blob::decrypt_and_decompress(data)?;
    Ok(read_textures(&blob))
}

/// Walk an already-decrypted blob for texture blocks.
pub fn read_textures(data: &[u8]) -> TextureBlob {
    let mut result = TextureBlob::default();
    let mut offset = 0usize;

    while offset + BLOCK_HEADER_SIZE < data.len() {
        let magic = &data[offset..offset + 3];
        if magic == TEXTURE_BLOCK_MAGIC {
            let block_start = offset;
            let texture_count = usize::from(data[block_start + 4]);
            log::debug!("Texture block at 0x{block_start:X} with {texture_count} entries");

            for index in 0..texture_count {
                let manifest_start = block_start + BLOCK_HEADER_SIZE + MANIFEST_SIZE * index;
                let Some(raw_manifest) = data.get(manifest_start..manifest_start + MANIFEST_SIZE) else {
                    result.warnings.push(Warning::TruncatedManifest {
                        block_offset: block_start,
                        index,
                    });
                    break;
                };
                let entry = match ManifestEntry::read(&mut Cursor::new(raw_manifest)) {
                    Ok(entry) => entry,
                    Err(_) => {
                        result.warnings.push(Warning::TruncatedManifest {
                            block_offset: block_start,
                            index,
                        });
                        break;
                    }
                };

                let (texture, next_offset) = read_texture(data, block_start, offset, &entry, &mut result.warnings);
                offset = next_offset;
                result.textures.push(texture);
            }
        } else if magic == ANIMATION_BLOCK_MAGIC {
            result.is_animated = true;
        }
        offset += BLOCK_ALIGNMENT;
    }

    result
}

/// Slice one manifest entry's payload.  Returns the texture and the scan
/// offset to continue from.
fn read_texture(
    data: &[u8],
    block_start: usize,
    offset: usize,
    entry: &ManifestEntry,
    warnings: &mut Vec<Warning>,
) -> (Texture, usize) {
    let identifier = entry.encoding_identifier();
    let width = entry.width();
    let height = entry.height();
    let known = Encoding::from_identifier(identifier);
    let encoding = known.unwrap_or(Encoding::Raw);

    let (name, byte_count) = match encoding.byte_count(width, height) {
        Some(count) => (decode_name(&entry.name), count),
        None => {
            let count = LittleEndian::read_u32(&entry.name[RAW_NAME_SIZE..]) as usize;
            (decode_name(&entry.name[..RAW_NAME_SIZE]), count)
        }
    };

    if known.is_none() {
        warnings.push(Warning::UnknownEncoding {
            name: name.clone(),
            identifier,
        });
    }
    if byte_count == 0 {
        warnings.push(Warning::EmptyPayload { name: name.clone() });
    }

    let mut image_data_start = block_start.saturating_add(entry.starting_offset as usize);
    if encoding.is_pvr() {
        image_data_start = image_data_start.saturating_add(PVR_HEADER_SIZE);
    }
    let image_data_end = image_data_start.saturating_add(byte_count);

    let mut next_offset = offset.max(image_data_end & !(BLOCK_ALIGNMENT - 1));
    if encoding.is_pvr() {
        next_offset = next_offset.saturating_add(PVR_FOOTER_SIZE);
    }

    // Monster sheets mostly carry their real size in a trailer.
    let (mut given_width, mut given_height) = (width, height);
    if encoding == Encoding::Rgba4444 {
        if let Some((hint_width, hint_height)) = read_trim_hint(data, next_offset) {
            given_width = width.min(hint_width);
            given_height = height.min(hint_height);
        }
    }

    let start = image_data_start.min(data.len());
    let end = image_data_end.min(data.len());
    let buffer = data[start..end].to_vec();
    if buffer.len() < byte_count {
        warnings.push(Warning::TruncatedPayload {
            name: name.clone(),
            expected: byte_count,
            actual: buffer.len(),
        });
    }

    let texture = Texture::new(width, height, name, buffer, encoding, given_width, given_height);
    (texture, next_offset)
}
