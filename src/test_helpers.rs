//! Shared test utilities for the framemark test suite.
//!
//! [`TiffBuilder`] assembles EXIF blobs byte by byte so decoder and resolver
//! tests can describe exactly the tags a camera would have written:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let blob = TiffBuilder::new(false)
//!     .ascii(Directory::Primary, tag::MAKE, "FUJIFILM")
//!     .rational(Directory::Capture, tag::F_NUMBER, 2, 1)
//!     .build();
//! let dir = parse_tag_directory(&blob).unwrap();
//! ```

use crate::exif::{Directory, TagDirectory, parse_tag_directory, tag};

// =========================================================================
// TIFF blob builder
// =========================================================================

#[derive(Clone)]
enum Value {
    Ascii(Vec<u8>),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    Rationals(Vec<(u32, u32)>),
    SRationals(Vec<(i32, i32)>),
    Undefined(Vec<u8>),
    Raw {
        field_type: u16,
        count: u32,
        bytes: Vec<u8>,
    },
}

impl Value {
    fn field_type(&self) -> u16 {
        match self {
            Value::Ascii(_) => 2,
            Value::Shorts(_) => 3,
            Value::Longs(_) => 4,
            Value::Rationals(_) => 5,
            Value::SRationals(_) => 10,
            Value::Undefined(_) => 7,
            Value::Raw { field_type, .. } => *field_type,
        }
    }

    fn count(&self) -> u32 {
        let n = match self {
            Value::Ascii(b) | Value::Undefined(b) => b.len(),
            Value::Shorts(v) => v.len(),
            Value::Longs(v) => v.len(),
            Value::Rationals(v) => v.len(),
            Value::SRationals(v) => v.len(),
            Value::Raw { count, .. } => return *count,
        };
        n as u32
    }

    fn encode(&self, be: bool) -> Vec<u8> {
        let u16b = |v: u16| if be { v.to_be_bytes() } else { v.to_le_bytes() };
        let u32b = |v: u32| if be { v.to_be_bytes() } else { v.to_le_bytes() };
        match self {
            Value::Ascii(b) | Value::Undefined(b) => b.clone(),
            Value::Raw { bytes, .. } => bytes.clone(),
            Value::Shorts(v) => v.iter().flat_map(|&x| u16b(x)).collect(),
            Value::Longs(v) => v.iter().flat_map(|&x| u32b(x)).collect(),
            Value::Rationals(v) => v
                .iter()
                .flat_map(|&(n, d)| u32b(n).into_iter().chain(u32b(d)))
                .collect(),
            Value::SRationals(v) => v
                .iter()
                .flat_map(|&(n, d)| u32b(n as u32).into_iter().chain(u32b(d as u32)))
                .collect(),
        }
    }
}

/// Builds a TIFF-structured EXIF blob.
///
/// Layout: header, IFD0, Exif IFD, GPS IFD, IFD1, then every out-of-line
/// payload in the same order. Sub-directory pointers are added to IFD0
/// automatically when the sub-directory has entries.
pub struct TiffBuilder {
    big_endian: bool,
    entries: Vec<(Directory, u16, Value)>,
}

impl TiffBuilder {
    pub fn new(big_endian: bool) -> Self {
        Self {
            big_endian,
            entries: Vec::new(),
        }
    }

    fn push(mut self, directory: Directory, tag_id: u16, value: Value) -> Self {
        self.entries.push((directory, tag_id, value));
        self
    }

    /// NUL-terminated ASCII.
    pub fn ascii(self, directory: Directory, tag_id: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        self.push(directory, tag_id, Value::Ascii(bytes))
    }

    /// ASCII field with arbitrary bytes (for encoding failures).
    pub fn ascii_bytes(self, directory: Directory, tag_id: u16, bytes: &[u8]) -> Self {
        self.push(directory, tag_id, Value::Ascii(bytes.to_vec()))
    }

    pub fn short(self, directory: Directory, tag_id: u16, value: u16) -> Self {
        self.push(directory, tag_id, Value::Shorts(vec![value]))
    }

    pub fn shorts(self, directory: Directory, tag_id: u16, values: &[u16]) -> Self {
        self.push(directory, tag_id, Value::Shorts(values.to_vec()))
    }

    pub fn long(self, directory: Directory, tag_id: u16, value: u32) -> Self {
        self.push(directory, tag_id, Value::Longs(vec![value]))
    }

    pub fn rational(self, directory: Directory, tag_id: u16, n: u32, d: u32) -> Self {
        self.push(directory, tag_id, Value::Rationals(vec![(n, d)]))
    }

    pub fn srational(self, directory: Directory, tag_id: u16, n: i32, d: i32) -> Self {
        self.push(directory, tag_id, Value::SRationals(vec![(n, d)]))
    }

    pub fn undefined(self, directory: Directory, tag_id: u16, bytes: &[u8]) -> Self {
        self.push(directory, tag_id, Value::Undefined(bytes.to_vec()))
    }

    pub fn raw(
        self,
        directory: Directory,
        tag_id: u16,
        field_type: u16,
        count: u32,
        bytes: &[u8],
    ) -> Self {
        self.push(
            directory,
            tag_id,
            Value::Raw {
                field_type,
                count,
                bytes: bytes.to_vec(),
            },
        )
    }

    fn in_directory(&self, directory: Directory) -> Vec<(u16, Value)> {
        let mut list: Vec<(u16, Value)> = self
            .entries
            .iter()
            .filter(|(d, _, _)| *d == directory)
            .map(|(_, t, v)| (*t, v.clone()))
            .collect();
        list.sort_by_key(|(t, _)| *t);
        list
    }

    pub fn build(self) -> Vec<u8> {
        let be = self.big_endian;
        let u16b = |v: u16| if be { v.to_be_bytes() } else { v.to_le_bytes() };
        let u32b = |v: u32| if be { v.to_be_bytes() } else { v.to_le_bytes() };

        let capture = self.in_directory(Directory::Capture);
        let gps = self.in_directory(Directory::Gps);
        let thumbnail = self.in_directory(Directory::Thumbnail);
        let mut primary = self.in_directory(Directory::Primary);

        let ifd_size = |n: usize| 2 + 12 * n + 4;
        let primary_len = primary.len()
            + usize::from(!capture.is_empty())
            + usize::from(!gps.is_empty());
        let primary_at = 8;
        let capture_at = primary_at + ifd_size(primary_len);
        let gps_at = capture_at + if capture.is_empty() { 0 } else { ifd_size(capture.len()) };
        let thumbnail_at = gps_at + if gps.is_empty() { 0 } else { ifd_size(gps.len()) };
        let data_at = thumbnail_at
            + if thumbnail.is_empty() {
                0
            } else {
                ifd_size(thumbnail.len())
            };

        if !capture.is_empty() {
            primary.push((tag::EXIF_IFD_POINTER, Value::Longs(vec![capture_at as u32])));
        }
        if !gps.is_empty() {
            primary.push((tag::GPS_IFD_POINTER, Value::Longs(vec![gps_at as u32])));
        }
        primary.sort_by_key(|(t, _)| *t);

        let mut out = Vec::new();
        out.extend_from_slice(if be { b"MM" } else { b"II" });
        out.extend_from_slice(&u16b(42));
        out.extend_from_slice(&u32b(primary_at as u32));

        let mut data: Vec<u8> = Vec::new();
        let next_for_primary = if thumbnail.is_empty() { 0 } else { thumbnail_at as u32 };
        let ifds = [
            (primary, next_for_primary),
            (capture, 0),
            (gps, 0),
            (thumbnail, 0),
        ];
        for (entries, next) in ifds {
            if entries.is_empty() && next == 0 && out.len() > 8 {
                continue;
            }
            out.extend_from_slice(&u16b(entries.len() as u16));
            for (tag_id, value) in &entries {
                let payload = value.encode(be);
                out.extend_from_slice(&u16b(*tag_id));
                out.extend_from_slice(&u16b(value.field_type()));
                out.extend_from_slice(&u32b(value.count()));
                if payload.len() <= 4 {
                    let mut field = payload.clone();
                    field.resize(4, 0);
                    out.extend_from_slice(&field);
                } else {
                    out.extend_from_slice(&u32b((data_at + data.len()) as u32));
                    data.extend_from_slice(&payload);
                    if data.len() % 2 == 1 {
                        data.push(0);
                    }
                }
            }
            out.extend_from_slice(&u32b(next));
        }

        out.extend_from_slice(&data);
        out
    }

    /// Build and decode in one step.
    pub fn directory(self) -> TagDirectory {
        parse_tag_directory(&self.build()).unwrap()
    }
}

// =========================================================================
// JPEG helpers
// =========================================================================

/// Wrap an EXIF blob in a minimal JPEG marker stream (SOI, APP1, SOS, EOI).
///
/// Not decodable as an image; enough for segment scanning.
pub fn jpeg_with_exif(blob: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    // An unrelated APP0 segment first, as real files have.
    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x07]);
    out.extend_from_slice(b"JFIF\0");
    let len = (2 + 6 + blob.len()) as u16;
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(blob);
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x12, 0x34, 0xFF, 0xD9]);
    out
}

#[test]
fn builder_round_trips_through_parser() {
    let dir = TiffBuilder::new(false)
        .ascii(Directory::Primary, tag::MAKE, "Canon")
        .short(Directory::Capture, tag::ISO_SPEED_RATINGS, 100)
        .directory();
    assert_eq!(dir.len(), 3); // make, ISO, Exif pointer
}
