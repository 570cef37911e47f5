use anyhow::{Result, Context};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

// @module: File and compression utilities

/// Magic bytes at the start of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Path of the compressed sibling, `<file>.gz`
    pub fn gzip_sibling<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut name = path.as_ref().as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Write bytes gzip-compressed to a file, creating parent directories
    pub fn write_gzip<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity((content.len() / 4).max(256)),
            Compression::default(),
        );
        encoder.write_all(content).context("gzip encoding failed")?;
        let compressed = encoder.finish().context("gzip finalize failed")?;

        Self::write_to_file(path, &compressed)
    }

    /// Whether a payload starts with the gzip magic bytes
    pub fn is_gzip(content: &[u8]) -> bool {
        content.starts_with(&GZIP_MAGIC)
    }

    /// Decompress a gzip payload
    pub fn gunzip(content: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(content);
        let mut out = Vec::with_capacity(content.len() * 4);
        decoder.read_to_end(&mut out)?;
        Ok(out)
    }
}
