use bytes::Bytes;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::error::{Result, ZvError};
use crate::io::{MemoryReader, ReadAt};
use crate::model::{FileRecord, MAX_ENTRY_SIZE};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl ZipExtractor<MemoryReader> {
    /// Extractor over an archive fetched into memory
    pub fn from_bytes(data: Bytes) -> Self {
        Self::new(Arc::new(MemoryReader::new(data)))
    }
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List the non-directory entries in archive order
    pub async fn file_entries(&self) -> Result<Vec<ZipFileEntry>> {
        let entries = self
            .parser
            .list_files()
            .await
            .map_err(|e| ZvError::Parse(format!("{e:#}")))?;

        Ok(entries.into_iter().filter(|e| !e.is_directory).collect())
    }

    /// Turn one entry into a cached file record.
    ///
    /// Oversized entries are marked `too_large` without reading their data.
    pub async fn materialize(&self, entry: &ZipFileEntry) -> Result<FileRecord> {
        if entry.uncompressed_size > MAX_ENTRY_SIZE {
            return Ok(FileRecord::too_large(entry.name.clone()));
        }

        let content = self
            .extract_to_memory(entry)
            .await
            .map_err(|e| ZvError::Read(format!("{}: {e:#}", entry.name)))?;

        Ok(FileRecord::with_content(entry.name.clone(), content))
    }

    /// Extract file data to memory, verifying length and CRC-32
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> anyhow::Result<Vec<u8>> {
        if let CompressionMethod::Unknown(method) = entry.compression_method {
            anyhow::bail!(
                "Unsupported compression method: {} (only STORED and DEFLATE are supported)",
                method
            );
        }

        let data_offset = self.parser.get_data_offset(entry).await?;

        let size = self.parser.reader().size();
        if data_offset.saturating_add(entry.compressed_size) > size {
            anyhow::bail!(
                "Compressed data extends beyond archive bounds (offset {} + size {} > size {})",
                data_offset,
                entry.compressed_size,
                size
            );
        }

        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_at(data_offset, &mut compressed)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Deflate => {
                // Read one byte past the declared size so overruns are caught
                let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
                DeflateDecoder::new(compressed.as_slice())
                    .take(entry.uncompressed_size + 1)
                    .read_to_end(&mut out)?;
                out
            }
            _ => compressed,
        };

        if data.len() as u64 != entry.uncompressed_size {
            anyhow::bail!(
                "Size mismatch: expected {} bytes, got {}",
                entry.uncompressed_size,
                data.len()
            );
        }

        let mut crc = flate2::Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            anyhow::bail!(
                "CRC-32 mismatch: expected {:#010x}, got {:#010x}",
                entry.crc32,
                crc.sum()
            );
        }

        Ok(data)
    }
}
