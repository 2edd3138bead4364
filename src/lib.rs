//! Texture extraction for Puzzle & Dragons binary asset blobs.
//!
//! `decode_blob` is the whole core: decrypt, walk texture blocks, unpack,
//! trim/blacken and encode every texture.  The `extract` module wraps it
//! with file reading, archive handling and output naming.

pub mod blob;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod postprocess;
pub mod reader;
pub mod settings;
pub mod unpack;
pub mod writer;

#[cfg(test)]
mod test_utils;

pub use encoding::Encoding;
pub use error::{ExtractError, TextureError, Warning};
pub use extract::{extract, ExtractSummary};
pub use reader::{extract_textures, Texture, TextureBlob};
pub use settings::Settings;
pub use writer::{export_texture, EncodedImage};

/// One texture's output.  `data == None` means there is nothing to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
  pub name: String,
  pub width: u32,
  pub height: u32,
  pub encoding: Encoding,
  pub data: Option<Vec<u8>>,
}

/// Result of decoding a single blob.
#[derive(Debug, Default)]
pub struct DecodedBlob {
  pub images: Vec<DecodedImage>,
  /// The blob contains an animation index; callers decide whether to keep it.
  pub is_animated: bool,
  pub warnings: Vec<Warning>,
}

/// Decode every texture in `data`.
///
/// Only a corrupt encrypted stream fails the call.  Textures that cannot be
/// encoded are returned without data and with a warning explaining why.
pub fn decode_blob(data: &[u8], settings: &Settings) -> Result<DecodedBlob, TextureError> {
  let TextureBlob { textures, is_animated, mut warnings } = extract_textures(data)?;

  let mut images = Vec::with_capacity(textures.len());
  for texture in &textures {
    let (width, height, data) = match export_texture(texture, settings) {
      Ok(Some(image)) => (image.width, image.height, Some(image.data)),
      Ok(None) => (texture.width, texture.height, None),
      Err(TextureError::UnsupportedCompressedEncoding { name }) => {
        warnings.push(Warning::UnsupportedCompressedEncoding { name });
        (texture.width, texture.height, None)
      }
      Err(err) => {
        warnings.push(Warning::ExportFailed { name: texture.name.clone(), reason: err.to_string() });
        (texture.width, texture.height, None)
      }
    };
    images.push(DecodedImage {
      name: texture.name.clone(),
      width,
      height,
      encoding: texture.encoding,
      data,
    });
  }

  Ok(DecodedBlob { images, is_animated, warnings })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{rgba8888, texture_block, Entry};

  const CLEAR: [u8; 4] = [0, 0, 0, 0];
  const RED: [u8; 4] = [255, 0, 0, 255];

  #[test]
  fn test_transparent_row_is_trimmed_to_single_color_palette() {
    let blob = texture_block(&[Entry::new(0x0, 2, 2, "CARD.PNG", rgba8888(&[CLEAR, CLEAR, RED, RED]))]);
    let decoded = decode_blob(&blob, &Settings::default()).unwrap();

    assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
    assert_eq!(decoded.images.len(), 1);
    let image = &decoded.images[0];
    assert_eq!(image.name, "CARD.PNG");
    assert_eq!((image.width, image.height), (2, 1));

    let png_bytes = image.data.as_ref().unwrap();
    let mut decoder = png::Decoder::new(&png_bytes[..]);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).unwrap();
    assert_eq!(frame.color_type, png::ColorType::Indexed);
    assert_eq!((frame.width, frame.height), (2, 1));
    assert_eq!(&buf[..frame.buffer_size()], &[0, 0]);
    assert_eq!(reader.info().palette.as_deref(), Some(&[255u8, 0, 0][..]));
  }

  #[test]
  fn test_zero_byte_manifest_yields_no_output() {
    let blob = texture_block(&[Entry::new(0x0, 0, 0, "EMPTY.PNG", Vec::new())]);
    let decoded = decode_blob(&blob, &Settings::default()).unwrap();
    assert_eq!(decoded.images.len(), 1);
    assert_eq!(decoded.images[0].data, None);
    assert_eq!(decoded.warnings, vec![Warning::EmptyPayload { name: "EMPTY.PNG".into() }]);
  }

  #[test]
  fn test_unknown_encoding_is_passed_through() {
    let blob = texture_block(&[Entry::raw("ODD.BIN", vec![1, 2, 3]).with_identifier(0xF)]);
    let decoded = decode_blob(&blob, &Settings::default()).unwrap();
    assert_eq!(decoded.images[0].encoding, Encoding::Raw);
    assert_eq!(decoded.images[0].data.as_deref(), Some(&[1u8, 2, 3][..]));
    assert!(matches!(decoded.warnings[..], [Warning::UnknownEncoding { identifier: 0xF, .. }]));
  }

  #[test]
  fn test_pvr_texture_is_flagged() {
    let blob = texture_block(&[
      Entry::new(0xC, 8, 8, "PVR.PNG", vec![0x55; 16]),
      Entry::new(0x0, 1, 1, "OK.PNG", rgba8888(&[RED])),
    ]);
    let decoded = decode_blob(&blob, &Settings::default()).unwrap();
    assert_eq!(decoded.images[0].data, None);
    assert_eq!(
      decoded.warnings,
      vec![Warning::UnsupportedCompressedEncoding { name: "PVR.PNG".into() }]
    );
    assert!(decoded.images[1].data.is_some());
  }

  #[test]
  fn test_truncated_payload_becomes_export_warning() {
    let mut blob = texture_block(&[Entry::new(0x0, 4, 4, "CUT.PNG", vec![0xFF; 64])]);
    blob.truncate(blob.len() - 32);
    let decoded = decode_blob(&blob, &Settings::default()).unwrap();
    assert_eq!(decoded.images[0].data, None);
    assert!(decoded.warnings.iter().any(|w| matches!(w, Warning::TruncatedPayload { .. })));
    assert!(decoded.warnings.iter().any(|w| matches!(w, Warning::ExportFailed { .. })));
  }

  #[test]
  fn test_corrupt_stream_is_fatal() {
    let mut blob = b"IOSCh\x00\x00\x00\x00\x00\x00\x00".to_vec();
    blob.extend_from_slice(&[0xFF; 8]);
    assert!(matches!(decode_blob(&blob, &Settings::default()), Err(TextureError::StreamCorrupt(_))));
  }

  #[test]
  fn test_sequential_and_reordered_exports_match() {
    let blob = texture_block(&[
      Entry::new(0x0, 2, 1, "A.PNG", rgba8888(&[RED, CLEAR])),
      Entry::new(0x3, 2, 2, "B.PNG", vec![0x0F, 0xF0, 0xFF, 0xFF, 0x00, 0x00, 0x12, 0x34]),
    ]);
    let settings = Settings::default();
    let whole = decode_blob(&blob, &settings).unwrap();
    let textures = extract_textures(&blob).unwrap().textures;
    for (texture, image) in textures.iter().rev().zip(whole.images.iter().rev()) {
      let alone = export_texture(texture, &settings).unwrap().map(|i| i.data);
      assert_eq!(alone, image.data);
    }
  }
}
