use anyhow::{Result, Context};
use log::debug;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::SubtitleError;

// @module: File and directory utilities

/// Magic bytes opening every EBML document
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Element id of the EBML DocType field
const DOCTYPE_ID: [u8; 2] = [0x42, 0x82];

/// DocType of Matroska files
const MATROSKA_DOCTYPE: &str = "matroska";

/// Bytes read when sniffing a container header
const HEADER_PROBE_LEN: usize = 4096;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path `<stem>.<language>.<extension>` inside output_dir
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        language: &str,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();
        let output_filename = format!("{}.{}.{}", stem.to_string_lossy(), language, extension);
        output_dir.as_ref().join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let wanted = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let matches = path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted));
            if path.is_file() && matches {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Read the EBML DocType of a file, `None` if it is not an EBML document
    pub fn read_doc_type<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
        let mut header = Vec::with_capacity(HEADER_PROBE_LEN);
        File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?
            .take(HEADER_PROBE_LEN as u64)
            .read_to_end(&mut header)
            .with_context(|| format!("Failed to read file header: {:?}", path.as_ref()))?;

        Ok(parse_doc_type(&header))
    }

    /// Fail with `UnsupportedFileType` unless the file is a Matroska container
    pub fn check_file_type<P: AsRef<Path>>(path: P) -> Result<(), SubtitleError> {
        match Self::read_doc_type(&path) {
            Ok(Some(doc_type)) if doc_type == MATROSKA_DOCTYPE => Ok(()),
            Ok(doc_type) => {
                debug!("Rejected {:?}: DocType {:?}", path.as_ref(), doc_type);
                Err(SubtitleError::UnsupportedFileType)
            }
            Err(e) => {
                debug!("Rejected {:?}: {}", path.as_ref(), e);
                Err(SubtitleError::UnsupportedFileType)
            }
        }
    }
}

/// Decode an EBML variable-length integer, returning the value and its width
fn read_vint(bytes: &[u8]) -> Option<(u64, usize)> {
    let first = *bytes.first()?;
    if first == 0 {
        return None;
    }

    let width = first.leading_zeros() as usize + 1;
    let tail = bytes.get(1..width)?;
    let marker_mask = 0xFFu8.checked_shr(width as u32).unwrap_or(0);
    let value = tail
        .iter()
        .fold(u64::from(first & marker_mask), |acc, b| (acc << 8) | u64::from(*b));

    Some((value, width))
}

/// Extract the DocType string out of the EBML header at the start of `header`
fn parse_doc_type(header: &[u8]) -> Option<String> {
    if !header.starts_with(&EBML_MAGIC) {
        return None;
    }

    let (header_size, width) = read_vint(&header[EBML_MAGIC.len()..])?;
    let body_start = EBML_MAGIC.len() + width;
    let body_end = body_start.saturating_add(usize::try_from(header_size).ok()?).min(header.len());
    let mut body = header.get(body_start..body_end)?;

    // Walk the header's child elements: 2-byte ids, vint sizes
    while body.len() > DOCTYPE_ID.len() {
        let id = &body[..2];
        let (size, width) = read_vint(&body[2..])?;
        let start = 2 + width;
        let end = start.checked_add(usize::try_from(size).ok()?)?;
        let value = body.get(start..end)?;

        if id == DOCTYPE_ID {
            let text = String::from_utf8_lossy(value);
            return Some(text.trim_end_matches('\0').to_string());
        }
        body = &body[end..];
    }

    None
}
