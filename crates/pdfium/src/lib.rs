//! PDF engine backend over PDFium.
//!
//! The PDFium shared library is bound at runtime; see [`bind_pdfium`].

pub mod document;
pub mod extract;

pub use document::{PdfiumDocument, PdfiumPage};
pub use pdfium_render::prelude::Pdfium;

use pdfdeck_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Bind the PDFium shared library.
///
/// Searches `extra_dir` (when given), then the current directory, then the
/// system library path.
pub fn bind_pdfium(extra_dir: Option<&Path>) -> Result<Pdfium> {
    let mut dirs: Vec<PathBuf> = extra_dir.map(Path::to_path_buf).into_iter().collect();
    dirs.push(PathBuf::from("./"));

    let local = dirs.iter().find_map(|dir| {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            .map_err(|e| log::debug!("No PDFium library in {}: {}", dir.display(), e))
            .ok()
    });

    let bindings = match local {
        Some(bindings) => bindings,
        None => Pdfium::bind_to_system_library().map_err(|e| {
            Error::DocumentError(format!(
                "Failed to load the PDFium library (install libpdfium or pass its directory): {}",
                e
            ))
        })?,
    };

    Ok(Pdfium::new(bindings))
}
