//! PNG export.
//!
//! Images with at most 256 distinct colors are written as indexed PNGs;
//! everything else (and every greyscale image) is written channel-for-channel
//! at 8 bits.  A `tEXt` "Software" chunk is inserted in front of `IEND`.

use std::collections::HashMap;

use crate::encoding::Encoding;
use crate::error::TextureError;
use crate::postprocess::{blacken_transparent_pixels, trim_transparent_edges};
use crate::reader::Texture;
use crate::settings::Settings;
use crate::unpack::unpack_pixels;

pub const SOFTWARE_KEYWORD: &str = "Software";
pub const SOFTWARE_TEXT: &str =
    "Exported using the Puzzle & Dragons Texture Tool! (https://github.com/TsubakiBotPad/padtexturetool)";
/// `IEND` is always 12 bytes: zero length, type, CRC.
const IEND_CHUNK_SIZE: usize = 12;
const MAX_PALETTE_SIZE: usize = 256;

/// The bytes to write for one texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Distinct colors of an image plus one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Vec<u8>>,
    pub indices: Vec<u8>,
}

/// Collect the distinct colors of `pixels`, or `None` if there are more than 256.
///
/// Colors keep first-occurrence order, then are stably sorted by their last
/// channel (alpha, for encodings that have one) so translucent entries come
/// first and the `tRNS` chunk stays as short as possible.
pub fn build_palette(pixels: &[u8], channels_per_pixel: usize) -> Option<Palette> {
    if channels_per_pixel == 0 {
        return None;
    }
    let mut first_seen: Vec<&[u8]> = Vec::new();
    let mut lookup: HashMap<&[u8], usize> = HashMap::new();
    for pixel in pixels.chunks_exact(channels_per_pixel) {
        if !lookup.contains_key(pixel) {
            if first_seen.len() == MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(pixel, first_seen.len());
            first_seen.push(pixel);
        }
    }

    let mut order: Vec<usize> = (0..first_seen.len()).collect();
    order.sort_by_key(|&i| first_seen[i][channels_per_pixel - 1]);
    let mut remap = vec![0u8; first_seen.len()];
    for (index, &original) in order.iter().enumerate() {
        remap[original] = index as u8;
    }

    let colors = order.iter().map(|&i| first_seen[i].to_vec()).collect();
    let indices = pixels
        .chunks_exact(channels_per_pixel)
        .map(|pixel| remap[lookup[pixel]])
        .collect();
    Some(Palette { colors, indices })
}

/// Build a PNG `tEXt` chunk: length, type, `keyword\0text`, CRC-32.
pub fn text_chunk(keyword: &str, text: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(4 + keyword.len() + 1 + text.len());
    body.extend_from_slice(b"tEXt");
    body.extend_from_slice(keyword.as_bytes());
    body.push(0);
    body.extend_from_slice(text.as_bytes());

    let mut crc = flate2::Crc::new();
    crc.update(&body);

    let mut chunk = Vec::with_capacity(body.len() + 8);
    chunk.extend_from_slice(&((body.len() - 4) as u32).to_be_bytes());
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc.sum().to_be_bytes());
    chunk
}

/// Insert a serialized chunk right before the final (`IEND`) chunk.
pub fn insert_penultimate_chunk(png: &[u8], chunk: &[u8]) -> Vec<u8> {
    let split = png.len().saturating_sub(IEND_CHUNK_SIZE);
    let mut out = Vec::with_capacity(png.len() + chunk.len());
    out.extend_from_slice(&png[..split]);
    out.extend_from_slice(chunk);
    out.extend_from_slice(&png[split..]);
    out
}

/// Encode 8-bit samples laid out per `encoding` as a PNG with the software chunk.
pub fn encode_png(pixels: &[u8], width: u32, height: u32, encoding: Encoding) -> Result<Vec<u8>, TextureError> {
    let cpp = encoding.channels_per_pixel();
    let palette = if encoding.is_greyscale() {
        None
    } else {
        build_palette(pixels, cpp)
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);

        let image_data = match palette {
            Some(palette) => {
                let mut rgb = Vec::with_capacity(palette.colors.len() * 3);
                for color in &palette.colors {
                    match color.as_slice() {
                        [grey] => rgb.extend_from_slice(&[*grey, *grey, *grey]),
                        channels => rgb.extend_from_slice(&channels[..3]),
                    }
                }
                // Opaque entries sort last, so only the leading ones need alpha.
                let trns: Vec<u8> = if encoding.has_alpha() {
                    palette
                        .colors
                        .iter()
                        .map(|color| color[cpp - 1])
                        .take_while(|&alpha| alpha < 0xFF)
                        .collect()
                } else {
                    Vec::new()
                };

                encoder.set_color(png::ColorType::Indexed);
                encoder.set_palette(rgb);
                if !trns.is_empty() {
                    encoder.set_trns(trns);
                }
                palette.indices
            }
            None => {
                let color_type = if encoding.has_alpha() {
                    png::ColorType::Rgba
                } else if encoding.is_greyscale() {
                    png::ColorType::Grayscale
                } else {
                    png::ColorType::Rgb
                };
                encoder.set_color(color_type);
                pixels.to_vec()
            }
        };

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image_data)?;
        writer.finish()?;
    }

    Ok(insert_penultimate_chunk(&out, &text_chunk(SOFTWARE_KEYWORD, SOFTWARE_TEXT)))
}

/// Run one texture through unpack, trim, blacken and encode.
///
/// Raw textures are passed through untouched.  Returns `Ok(None)` when
/// there is nothing to write: an empty or all-zero raw payload, or pixels
/// that are all zero after post-processing.
pub fn export_texture(texture: &Texture, settings: &Settings) -> Result<Option<EncodedImage>, TextureError> {
    if texture.encoding == Encoding::Raw {
        if texture.buffer.iter().all(|&b| b == 0) {
            return Ok(None);
        }
        return Ok(Some(EncodedImage {
            width: texture.width,
            height: texture.height,
            data: texture.buffer.clone(),
        }));
    }

    let encoding = texture.encoding;
    let (mut width, mut height) = (texture.width, texture.height);
    let mut pixels = unpack_pixels(texture)?;

    if encoding.has_alpha() {
        let cpp = encoding.channels_per_pixel();
        if settings.trimming_enabled {
            (width, height, pixels) = trim_transparent_edges(
                pixels,
                width,
                height,
                cpp,
                texture.given_width,
                texture.given_height,
            );
        }
        if settings.blackening_enabled {
            blacken_transparent_pixels(&mut pixels, cpp);
        }
    }

    if pixels.iter().all(|&sample| sample == 0) {
        log::debug!("{} is empty after post-processing", texture.name);
        return Ok(None);
    }

    let data = encode_png(&pixels, width, height, encoding)?;
    Ok(Some(EncodedImage { width, height, data }))
}
