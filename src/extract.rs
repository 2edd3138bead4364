//! File-level extraction: reads blobs (or the blob inside an `.apk`), decodes
//! them and writes each texture next to its source or into an output folder.

use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::encoding::Encoding;
use crate::error::ExtractError;
use crate::settings::Settings;

/// Location of the texture blob inside an Android package.
pub const APK_BLOB_PATH: &str = "assets/DATA001.BIN";

static MONSTER_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)^(MONS_)(\d+)(\..+)$").expect("valid monster name pattern"));
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid number pattern"));

// ── Data structures ──────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
  pub files_read: usize,
  /// Inputs that failed or were skipped as animations.
  pub files_skipped: usize,
  pub images_written: usize,
}

// ── Input discovery ──────────────────────────────────────

/// Expand `input` into the list of files to process.
///
/// Directories are walked recursively in file-name order.
pub fn collect_input_files(input: &Path) -> Result<Vec<PathBuf>, ExtractError> {
  if !input.exists() {
    return Err(ExtractError::MissingInput(input.to_path_buf()));
  }
  if input.is_file() {
    return Ok(vec![input.to_path_buf()]);
  }
  let mut files = Vec::new();
  for entry in WalkDir::new(input).sort_by_file_name() {
    let entry = entry?;
    if entry.file_type().is_file() {
      files.push(entry.into_path());
    }
  }
  Ok(files)
}

/// Read the blob for one input: the `DATA001.BIN` member of a ZIP archive,
/// or the whole file otherwise.
pub fn read_blob(path: &Path) -> Result<Vec<u8>, ExtractError> {
  let contents = fs::read(path)?;
  if let Ok(mut archive) = zip::ZipArchive::new(Cursor::new(contents.as_slice())) {
    let mut member = archive.by_name(APK_BLOB_PATH)?;
    let mut blob = Vec::with_capacity(member.size() as usize);
    member.read_to_end(&mut blob)?;
    return Ok(blob);
  }
  Ok(contents)
}

// ── Output naming ────────────────────────────────────────

fn split_extension(name: &str) -> (&str, &str) {
  match name.rfind('.') {
    Some(i) if !name[..i].trim_start_matches('.').is_empty() => (&name[..i], &name[i..]),
    _ => (name, ""),
  }
}

/// Pick the file name for a texture.
///
/// Monster ids are zero-padded to five digits (`MONS_12.PNG` →
/// `MONS_00012.PNG`) and repeated names within one blob get a ` (n)` suffix.
pub fn output_file_name(suggested: &str, files_written: &mut HashMap<String, u32>) -> String {
  let mut name = match MONSTER_NAME.captures(suggested) {
    Some(caps) => format!("{}{:0>5}{}", &caps[1], &caps[2], &caps[3]),
    None => suggested.to_string(),
  };

  if let Some(count) = files_written.get_mut(&name) {
    *count += 1;
    let (stem, extension) = split_extension(&name);
    name = format!("{stem} ({count}){extension}");
  } else {
    files_written.insert(name.clone(), 0);
  }
  name
}

/// Old-style name for frame `index` of an animated monster blob.
fn animation_file_name(input_path: &Path, index: usize) -> Result<String, ExtractError> {
  let basename = input_path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  let id: u64 = FIRST_NUMBER
    .find(&basename)
    .and_then(|m| m.as_str().parse().ok())
    .ok_or_else(|| ExtractError::NotAMonsterFile(basename.clone()))?;
  Ok(format!("MONS_{id:04}_{index:03}.PNG"))
}

// ── Extraction ───────────────────────────────────────────

/// Returns the number of images written, or `None` if the blob was skipped.
fn extract_file(input_path: &Path, output_directory: Option<&Path>, settings: &Settings) -> Result<Option<usize>, ExtractError> {
  let output_dir = match output_directory {
    Some(dir) => dir.to_path_buf(),
    None => input_path.parent().map(Path::to_path_buf).unwrap_or_default(),
  };

  log::info!("Reading {}...", input_path.display());
  let blob = read_blob(input_path)?;
  let decoded = crate::decode_blob(&blob, settings)?;

  let count = decoded.images.len();
  if count == 0 {
    log::info!("No textures found.");
  } else {
    log::info!("{count} texture{} found.", if count == 1 { "" } else { "s" });
  }

  for warning in &decoded.warnings {
    log::warn!("{warning}");
  }

  if decoded.is_animated && !settings.animations_enabled {
    log::warn!("Skipping; animations not enabled");
    return Ok(None);
  }

  let mut files_written = HashMap::new();
  let mut written = 0usize;
  for (index, image) in decoded.images.iter().enumerate() {
    let mut file_name = output_file_name(&image.name, &mut files_written);
    if decoded.is_animated && settings.rename_enabled {
      file_name = animation_file_name(input_path, index + 1)?;
    }

    log::info!("Writing {file_name} ({} x {})...", image.width, image.height);
    if matches!(image.encoding, Encoding::Pvrtc4 | Encoding::Pvrtc2) {
      log::warn!(
        "{file_name} is encoded using PVR texture compression. \
         This format is not yet supported by the Puzzle & Dragons Texture Tool."
      );
    }

    let Some(data) = image.data.as_deref() else {
      continue;
    };
    if !output_dir.as_os_str().is_empty() && !output_dir.exists() {
      fs::create_dir_all(&output_dir)?;
    }
    fs::write(output_dir.join(&file_name), data)?;
    written += 1;
  }
  Ok(Some(written))
}

/// Extract every texture from `input` (a blob, an `.apk`, or a directory of them).
///
/// A failure on one file is logged and does not stop the remaining files.
pub fn extract(input: &Path, output_directory: Option<&Path>, settings: &Settings) -> Result<ExtractSummary, ExtractError> {
  let mut summary = ExtractSummary::default();
  for path in collect_input_files(input)? {
    match extract_file(&path, output_directory, settings) {
      Ok(Some(written)) => {
        summary.files_read += 1;
        summary.images_written += written;
      }
      Ok(None) => summary.files_skipped += 1,
      Err(err) => {
        log::error!("{}: {err}", path.display());
        summary.files_skipped += 1;
      }
    }
  }
  Ok(summary)
}
