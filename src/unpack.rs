//! Expands packed pixel payloads into 8-bit-per-channel samples.

use std::sync::LazyLock;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::encoding::Encoding;
use crate::error::TextureError;
use crate::reader::Texture;

pub const TARGET_BIT_DEPTH: u8 = 8;

/// `convert(from, to, v) = round(v * (2^to - 1) / (2^from - 1))` for every
/// `1 <= from <= to <= 8`.
pub struct BitDepthTable {
    table: Box<[[[u8; 256]; 9]; 9]>,
}

impl BitDepthTable {
    fn build() -> Self {
        let mut table = Box::new([[[0u8; 256]; 9]; 9]);
        for current in 1..=8u32 {
            let current_max = (1u32 << current) - 1;
            for new in current..=8u32 {
                let new_max = (1u32 << new) - 1;
                for value in 0..=current_max {
                    // None of these ratios land exactly on .5, so half-up is exact.
                    let scaled = (2 * value * new_max + current_max) / (2 * current_max);
                    table[current as usize][new as usize][value as usize] = scaled as u8;
                }
            }
        }
        Self { table }
    }

    pub fn row(&self, from: u8, to: u8) -> &[u8; 256] {
        &self.table[usize::from(from)][usize::from(to)]
    }

    pub fn convert(&self, from: u8, to: u8, value: u8) -> u8 {
        self.row(from, to)[usize::from(value)]
    }
}

pub static BIT_DEPTH_TABLE: LazyLock<BitDepthTable> = LazyLock::new(BitDepthTable::build);

/// Split `buffer` into one packed value per pixel.
///
/// 32-bit strides are big-endian words, 16-bit strides little-endian, and
/// strides under 8 bits hold several pixels per byte, most significant first.
fn packed_values(name: &str, buffer: &[u8], stride_in_bits: u32, pixel_count: usize) -> Result<Vec<u32>, TextureError> {
    let expected = pixel_count * stride_in_bits as usize / 8;
    if buffer.len() < expected {
        return Err(TextureError::PayloadTooShort {
            name: name.to_string(),
            expected,
            actual: buffer.len(),
        });
    }
    let buffer = &buffer[..expected];

    let values = match stride_in_bits {
        32 => buffer.chunks_exact(4).map(BigEndian::read_u32).collect(),
        16 => buffer
            .chunks_exact(2)
            .map(|c| u32::from(LittleEndian::read_u16(c)))
            .collect(),
        8 => buffer.iter().map(|&b| u32::from(b)).collect(),
        stride @ (1 | 2 | 4) => {
            let mask = (1u32 << stride) - 1;
            let per_byte = 8 / stride;
            let mut values = Vec::with_capacity(buffer.len() * per_byte as usize);
            for &byte in buffer {
                for i in 0..per_byte {
                    values.push((u32::from(byte) >> (stride * (per_byte - i - 1))) & mask);
                }
            }
            values
        }
        _ => {
            return Err(TextureError::NotUnpackable {
                name: name.to_string(),
            })
        }
    };
    Ok(values)
}

/// Split packed values into channels and rescale each to `target_bit_depth`.
pub fn unpack_channels(packed: &[u32], channels: &[u8], target_bit_depth: u8) -> Vec<u8> {
    let shifts: Vec<u32> = (0..channels.len())
        .map(|i| channels[i + 1..].iter().map(|&b| u32::from(b)).sum())
        .collect();
    let masks: Vec<u32> = channels
        .iter()
        .zip(&shifts)
        .map(|(&bits, &shift)| ((1u32 << bits) - 1) << shift)
        .collect();
    let rows: Vec<&[u8; 256]> = channels
        .iter()
        .map(|&bits| BIT_DEPTH_TABLE.row(bits, target_bit_depth))
        .collect();

    let mut out = Vec::with_capacity(packed.len() * channels.len());
    for &value in packed {
        for ((&shift, &mask), row) in shifts.iter().zip(&masks).zip(&rows) {
            out.push(row[((value & mask) >> shift) as usize]);
        }
    }
    out
}

/// Unpack a texture into a flat `width * height * channels` sample array.
pub fn unpack_pixels(texture: &Texture) -> Result<Vec<u8>, TextureError> {
    let stride = match texture.encoding {
        Encoding::Raw => {
            return Err(TextureError::NotUnpackable {
                name: texture.name.clone(),
            })
        }
        Encoding::Pvrtc4 | Encoding::Pvrtc2 => {
            return Err(TextureError::UnsupportedCompressedEncoding {
                name: texture.name.clone(),
            })
        }
        encoding => encoding.stride_in_bits().unwrap_or_default(),
    };

    let pixel_count = texture.width as usize * texture.height as usize;
    let packed = packed_values(&texture.name, &texture.buffer, stride, pixel_count)?;
    let count = pixel_count.min(packed.len());
    Ok(unpack_channels(
        &packed[..count],
        texture.encoding.channels(),
        TARGET_BIT_DEPTH,
    ))
}
