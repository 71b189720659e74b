use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;

use super::ReadAt;

/// Random access reader over an archive already held in memory
pub struct MemoryReader {
    data: Bytes,
}

impl MemoryReader {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let size = self.data.len() as u64;
        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|end| *end <= size);
        let Some(end) = end else {
            bail!(
                "Read of {} bytes at offset {} is out of bounds (size {})",
                buf.len(),
                offset,
                size
            );
        };

        buf.copy_from_slice(&self.data[offset as usize..end as usize]);
        Ok(buf.len())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
