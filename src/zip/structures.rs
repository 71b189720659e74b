use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use anyhow::{Result, bail};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// Where the Central Directory lives and how many headers it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryLocation {
    pub offset: u64,
    pub size: u64,
    pub entries: u64,
}

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid End of Central Directory");
        }

        let mut cursor = Cursor::new(&data[4..]);

        let disk_number = cursor.read_u16::<LittleEndian>()?;
        let disk_with_cd = cursor.read_u16::<LittleEndian>()?;
        if disk_number != 0 || disk_with_cd != 0 {
            bail!("Multi-disk archives are not supported");
        }

        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }

    pub fn location(&self) -> DirectoryLocation {
        DirectoryLocation {
            offset: self.cd_offset as u64,
            size: self.cd_size as u64,
            entries: self.total_entries as u64,
        }
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EOCDLocator {
    pub eocd64_offset: u64,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid ZIP64 format");
        }

        let mut cursor = Cursor::new(&data[4..]);
        let _disk_with_eocd64 = cursor.read_u32::<LittleEndian>()?;

        Ok(Self {
            eocd64_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EOCD {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            bail!("Invalid ZIP64 format");
        }

        // Skip record size, versions and disk numbers
        let mut cursor = Cursor::new(&data[4..]);
        cursor.set_position(8 + 2 + 2 + 4 + 4);

        let _disk_entries = cursor.read_u64::<LittleEndian>()?;

        Ok(Self {
            total_entries: cursor.read_u64::<LittleEndian>()?,
            cd_size: cursor.read_u64::<LittleEndian>()?,
            cd_offset: cursor.read_u64::<LittleEndian>()?,
        })
    }

    pub fn location(&self) -> DirectoryLocation {
        DirectoryLocation {
            offset: self.cd_offset,
            size: self.cd_size,
            entries: self.total_entries,
        }
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Host systems whose external attributes carry a Unix mode in the high 16 bits
const CREATOR_UNIX: u8 = 3;
const CREATOR_MACOSX: u8 = 19;

/// Host systems whose external attributes carry MS-DOS attribute bits
const CREATOR_FAT: u8 = 0;
const CREATOR_NTFS: u8 = 11;
const CREATOR_VFAT: u8 = 14;

const UNIX_S_IFMT: u32 = 0o170000;
const UNIX_S_IFDIR: u32 = 0o040000;
const MSDOS_DIR: u32 = 0x10;

/// One entry as described by the Central Directory
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub name: String,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
    /// Upper byte of "version made by"
    pub creator: u8,
    pub external_attrs: u32,
    pub is_directory: bool,
}

/// Whether an entry names a directory.
///
/// A trailing `/` always marks one. Otherwise the external attributes decide,
/// read as a Unix mode or as MS-DOS bits depending on the creating system.
pub fn is_directory_entry(name: &str, creator: u8, external_attrs: u32) -> bool {
    if name.ends_with('/') {
        return true;
    }

    match creator {
        CREATOR_UNIX | CREATOR_MACOSX => (external_attrs >> 16) & UNIX_S_IFMT == UNIX_S_IFDIR,
        CREATOR_FAT | CREATOR_NTFS | CREATOR_VFAT => external_attrs & MSDOS_DIR != 0,
        _ => false,
    }
}
