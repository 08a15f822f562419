//! Decoded tag values, keyed by `(Directory, tag id)`.

use super::ExifError;
use crate::layout::Dimensions;
use crate::rational::Rational;
use std::collections::BTreeMap;
use std::fmt;

/// Tag identifiers the resolver and the renderer care about.
///
/// Any other identifier is still decoded and kept in the directory.
pub mod tag {
    pub const MAKE: u16 = 0x010F;
    pub const MODEL: u16 = 0x0110;
    pub const X_RESOLUTION: u16 = 0x011A;
    pub const Y_RESOLUTION: u16 = 0x011B;
    pub const EXPOSURE_TIME: u16 = 0x829A;
    pub const F_NUMBER: u16 = 0x829D;
    pub const EXIF_IFD_POINTER: u16 = 0x8769;
    pub const ISO_SPEED_RATINGS: u16 = 0x8827;
    pub const GPS_IFD_POINTER: u16 = 0x8825;
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
    pub const FOCAL_LENGTH: u16 = 0x920A;
    pub const PIXEL_X_DIMENSION: u16 = 0xA002;
    pub const PIXEL_Y_DIMENSION: u16 = 0xA003;
    pub const LENS_MAKE: u16 = 0xA433;
    pub const LENS_MODEL: u16 = 0xA434;
}

/// The four sub-directories of an EXIF block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Directory {
    /// IFD0: make, model, resolution.
    Primary,
    /// Exif sub-IFD: exposure, lens, capture time.
    Capture,
    Gps,
    /// IFD1, the embedded thumbnail's own tags.
    Thumbnail,
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Directory::Primary => "Primary",
            Directory::Capture => "Capture",
            Directory::Gps => "GPS",
            Directory::Thumbnail => "Thumbnail",
        };
        f.write_str(name)
    }
}

/// A decoded tag value.
///
/// Single-element `SHORT`, `LONG` and `RATIONAL` fields decode to the scalar
/// variants; longer ones to the sequence variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTagValue {
    /// `ASCII` bytes as stored, NUL terminator included.
    Ascii(Vec<u8>),
    Short(u16),
    Shorts(Vec<u16>),
    Long(u32),
    Longs(Vec<u32>),
    /// `RATIONAL` or `SRATIONAL`.
    Rational(Rational),
    Rationals(Vec<Rational>),
    /// `BYTE`, `SBYTE` and `UNDEFINED`.
    Bytes(Vec<u8>),
    /// Any other field type, payload kept verbatim in file byte order.
    Other { field_type: u16, count: u32, bytes: Vec<u8> },
}

/// All tags of one EXIF block. Built once by the parser, read-only after.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectory {
    entries: BTreeMap<(Directory, u16), RawTagValue>,
}

impl TagDirectory {
    pub fn from_entries(
        entries: impl IntoIterator<Item = ((Directory, u16), RawTagValue)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, directory: Directory, tag: u16) -> Option<&RawTagValue> {
        self.entries.get(&(directory, tag))
    }

    pub fn contains(&self, directory: Directory, tag: u16) -> bool {
        self.entries.contains_key(&(directory, tag))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Directory, u16), &RawTagValue)> {
        self.entries.iter()
    }

    /// Number of tags decoded into one sub-directory.
    pub fn count_in(&self, directory: Directory) -> usize {
        self.entries.keys().filter(|(d, _)| *d == directory).count()
    }

    /// Text value with trailing NULs removed.
    ///
    /// `Ok(None)` when the tag is absent or not an `ASCII` field.
    pub fn text(&self, directory: Directory, tag: u16) -> Result<Option<String>, ExifError> {
        let Some(RawTagValue::Ascii(bytes)) = self.get(directory, tag) else {
            return Ok(None);
        };
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        std::str::from_utf8(&bytes[..end])
            .map(|s| Some(s.to_string()))
            .map_err(|_| ExifError::InvalidEncoding { directory, tag })
    }

    /// First rational of a `RATIONAL`/`SRATIONAL` field.
    pub fn rational(&self, directory: Directory, tag: u16) -> Option<Rational> {
        match self.get(directory, tag)? {
            RawTagValue::Rational(r) => Some(*r),
            RawTagValue::Rationals(rs) => rs.first().copied(),
            _ => None,
        }
    }

    /// First value of a `SHORT`/`LONG` field.
    pub fn unsigned(&self, directory: Directory, tag: u16) -> Option<u32> {
        match self.get(directory, tag)? {
            RawTagValue::Short(v) => Some(u32::from(*v)),
            RawTagValue::Shorts(vs) => vs.first().map(|&v| u32::from(v)),
            RawTagValue::Long(v) => Some(*v),
            RawTagValue::Longs(vs) => vs.first().copied(),
            _ => None,
        }
    }

    /// Copy of this directory describing a re-encoded output image.
    ///
    /// Sets `PixelXDimension`/`PixelYDimension` to the output size and the
    /// primary resolution to 300 dpi. Everything else is carried over as-is.
    pub fn for_output(&self, size: Dimensions) -> TagDirectory {
        let mut entries = self.entries.clone();
        let dpi = RawTagValue::Rational(Rational::new(300, 1));
        entries.insert((Directory::Primary, tag::X_RESOLUTION), dpi.clone());
        entries.insert((Directory::Primary, tag::Y_RESOLUTION), dpi);
        entries.insert(
            (Directory::Capture, tag::PIXEL_X_DIMENSION),
            RawTagValue::Long(size.width),
        );
        entries.insert(
            (Directory::Capture, tag::PIXEL_Y_DIMENSION),
            RawTagValue::Long(size.height),
        );
        TagDirectory { entries }
    }
}
