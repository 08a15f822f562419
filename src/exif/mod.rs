//! EXIF tag-directory decoding.
//!
//! | Step | Function |
//! |---|---|
//! | Find the metadata blob in a JPEG / TIFF file | [`container::find_exif_blob`] |
//! | Decode the blob into a [`TagDirectory`] | [`parse_tag_directory`] |
//! | Typed lookups for the resolver | [`TagDirectory::text`], [`TagDirectory::rational`], [`TagDirectory::unsigned`] |
//!
//! The blob is a TIFF structure: byte-order mark, magic `42`, and a chain of
//! IFDs (image file directories). Four of them are decoded, each into its own
//! [`Directory`] namespace:
//!
//! ```text
//! IFD0 ──────────────► Primary
//!  ├─ 0x8769 pointer ─► Capture   (exposure, lens, timestamps)
//!  ├─ 0x8825 pointer ─► GPS
//!  └─ next-IFD link ──► Thumbnail (IFD1)
//! ```
//!
//! Structural problems (truncated tables, payloads past the end of the blob)
//! fail the whole decode with [`ExifError::MalformedDirectory`]. Missing tags
//! are never an error; text that is not valid UTF-8 is only reported when the
//! field is read, so one bad string cannot take the rest of the record down.

pub mod container;
mod directory;
mod parser;

pub use directory::{Directory, RawTagValue, TagDirectory, tag};
pub use parser::parse_tag_directory;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExifError {
    #[error("malformed {directory} directory: {reason}")]
    MalformedDirectory { directory: Directory, reason: String },
    #[error("tag 0x{tag:04X} in {directory} directory is not valid text")]
    InvalidEncoding { directory: Directory, tag: u16 },
}
