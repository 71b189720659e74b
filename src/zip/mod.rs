//! ZIP archive parsing and extraction.
//!
//! - [`structures`]: ZIP format records (EOCD, ZIP64 EOCD, header constants)
//! - [`parser`]: reads those records through [`ReadAt`](crate::io::ReadAt)
//! - [`extractor`]: lists file entries and materializes them into
//!   [`FileRecord`](crate::model::FileRecord)s
//!
//! The EOCD is read first, then the Central Directory, which lists every
//! entry without touching the entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format and ZIP64 extensions
//! - STORED and DEFLATE compression methods
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
