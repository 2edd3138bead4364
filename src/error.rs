//! Error and warning types.
//!
//! Only [`TextureError::StreamCorrupt`] aborts a blob.  Everything else the
//! core runs into is reported as a [`Warning`] next to the decoded data.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the decoding core.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("corrupt stream: {0}")]
    StreamCorrupt(#[source] io::Error),

    #[error("{name} is encoded using PVR texture compression, which is not supported")]
    UnsupportedCompressedEncoding { name: String },

    #[error("{name} holds raw data and has no pixels to unpack")]
    NotUnpackable { name: String },

    #[error("{name} has {actual} bytes of pixel data, expected {expected}")]
    PayloadTooShort {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Non-fatal conditions found while decoding a blob.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("{name} is encoded with unrecognized encoding \"0x{identifier:X}\"")]
    UnknownEncoding { name: String, identifier: u8 },

    #[error("{name} has no associated image data")]
    EmptyPayload { name: String },

    #[error("{name} is encoded using PVR texture compression; its pixels were not decoded")]
    UnsupportedCompressedEncoding { name: String },

    #[error("{name} declares {expected} bytes of data but only {actual} are present")]
    TruncatedPayload {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("manifest entry {index} of the block at 0x{block_offset:X} runs past the end of the data")]
    TruncatedManifest { block_offset: usize, index: usize },

    #[error("{name} could not be exported: {reason}")]
    ExportFailed { name: String, reason: String },
}

/// Errors raised while extracting files from disk.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("cannot walk input directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid settings file: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("the input path you specified (\"{}\") does not exist", .0.display())]
    MissingInput(PathBuf),

    #[error("unable to rename non-monster file {0}")]
    NotAMonsterFile(String),
}
