//! PDF header sniffing.
//!
//! Inputs are rejected before lopdf sees them when they do not start with a
//! `%PDF-x.y` header, so undecodable data fails fast with a clear error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Version information read from a PDF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}.{}", self.major, self.minor)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_LEN: usize = PDF_MAGIC.len() + 3;

/// Read the PDF header of a file.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfVersion> {
    let mut file = File::open(path)?;
    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::UnknownFormat,
        _ => Error::Io(e),
    })?;
    sniff_bytes(&header)
}

/// Read the PDF header from the start of a byte buffer.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfVersion> {
    if data.len() < HEADER_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC.len()..HEADER_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            let version = PdfVersion {
                major: major - b'0',
                minor: minor - b'0',
            };
            if version.major == 0 || version.major > 2 {
                return Err(Error::UnsupportedVersion(format!(
                    "{}.{}",
                    version.major, version.minor
                )));
            }
            Ok(version)
        }
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).to_string(),
        )),
    }
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}
