//! Decoding, encoding and writing image files
//!
//! Images are always encoded into memory before anything touches the
//! destination, and the bytes land through a temporary file in the same
//! directory that is renamed over the target. A failed operation therefore
//! never leaves a half-written output behind.

use image::{DynamicImage, ImageError, ImageReader, RgbaImage};
use std::fs::{self, Permissions};
use std::io::{Cursor, Write};
use std::path::Path;

use crate::error::{PicError, Result};
use crate::format::TargetFormat;

/// Load an image from disk, sniffing the container before trusting the extension
pub fn decode(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| decode_error(path, ImageError::IoError(e)))?;

    let img = reader.decode().map_err(|e| decode_error(path, e))?;
    log::debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

fn decode_error(path: &Path, source: ImageError) -> PicError {
    PicError::Decode {
        path: path.to_path_buf(),
        source,
    }
}

/// Encode an image into `format`, entirely in memory
pub fn encode(img: &DynamicImage, format: TargetFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format.image_format())
        .map_err(|source| PicError::Encode { format, source })?;
    Ok(buffer.into_inner())
}

/// Encode image as PNG bytes (for preview/transfer without file I/O)
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|source| PicError::Encode {
            format: TargetFormat::Png,
            source,
        })?;
    Ok(buffer.into_inner())
}

/// Write `bytes` to `path` all-or-nothing, replacing any existing file
///
/// The file gets `permissions` when given, otherwise the mode a plain create
/// would get under the current umask.
pub fn write_atomic(path: &Path, bytes: &[u8], permissions: Option<Permissions>) -> Result<()> {
    let dir = parent_dir(path);

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pic-convert-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Masked by the umask at creation, like `File::create`
        builder.permissions(Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(|e| PicError::fs(dir, e))?;

    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PicError::fs(tmp.path(), e))?;

    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| PicError::fs(tmp.path(), e))?;
    }

    // The temp file is removed when the persist error is dropped
    tmp.persist(path).map_err(|e| PicError::fs(path, e.error))?;
    Ok(())
}

/// Permissions of an existing file, to carry over onto a file derived from it
pub fn permissions_of(path: &Path) -> Result<Permissions> {
    fs::metadata(path)
        .map(|meta| meta.permissions())
        .map_err(|e| PicError::fs(path, e))
}

/// Directory holding `path`; bare file names live in the working directory
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
