//! TIFF-structured EXIF blob → [`TagDirectory`].
//!
//! IFD entry format (12 bytes each, in the blob's byte order):
//!   Bytes 0-1:  Tag id
//!   Bytes 2-3:  Field type (1=BYTE, 2=ASCII, 3=SHORT, 4=LONG, 5=RATIONAL, ...)
//!   Bytes 4-7:  Count (number of values, not bytes)
//!   Bytes 8-11: The value itself when it fits in 4 bytes, otherwise an
//!               offset (from the TIFF header) to the value
//!
//! A directory is a u16 entry count, the entries, then a u32 offset of the
//! next directory (0 = none).

use super::directory::{Directory, RawTagValue, TagDirectory, tag};
use super::ExifError;
use crate::rational::Rational;
use std::collections::BTreeMap;

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Decode an EXIF blob.
///
/// Accepts the bare TIFF structure or the APP1 payload that still carries
/// the `Exif\0\0` prefix.
pub fn parse_tag_directory(blob: &[u8]) -> Result<TagDirectory, ExifError> {
    let data = blob.strip_prefix(EXIF_HEADER).unwrap_or(blob);
    let reader = Reader::from_header(data)?;
    let mut entries = BTreeMap::new();

    let ifd0 = reader
        .u32_at(4)
        .ok_or_else(|| malformed(Directory::Primary, "truncated TIFF header"))?;
    let thumbnail_offset = reader.read_ifd(ifd0, Directory::Primary, &mut entries)?;

    let pointers = [
        (tag::EXIF_IFD_POINTER, Directory::Capture),
        (tag::GPS_IFD_POINTER, Directory::Gps),
    ];
    for (pointer_tag, directory) in pointers {
        let offset = match entries.get(&(Directory::Primary, pointer_tag)) {
            Some(RawTagValue::Long(offset)) => *offset,
            Some(RawTagValue::Short(offset)) => u32::from(*offset),
            _ => continue,
        };
        reader.read_ifd(offset, directory, &mut entries)?;
    }

    if thumbnail_offset != 0 {
        reader.read_ifd(thumbnail_offset, Directory::Thumbnail, &mut entries)?;
    }

    let directory = TagDirectory::from_entries(entries);
    tracing::debug!(
        tags = directory.len(),
        primary = directory.count_in(Directory::Primary),
        capture = directory.count_in(Directory::Capture),
        gps = directory.count_in(Directory::Gps),
        thumbnail = directory.count_in(Directory::Thumbnail),
        "decoded tag directory"
    );
    Ok(directory)
}

fn malformed(directory: Directory, reason: impl Into<String>) -> ExifError {
    ExifError::MalformedDirectory {
        directory,
        reason: reason.into(),
    }
}

/// Size in bytes of one value of a TIFF field type, `None` if unknown.
fn type_size(field_type: u16) -> Option<usize> {
    match field_type {
        1 | 2 | 6 | 7 => Some(1),   // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => Some(2),           // SHORT, SSHORT
        4 | 9 | 11 | 13 => Some(4), // LONG, SLONG, FLOAT, IFD
        5 | 10 | 12 => Some(8),     // RATIONAL, SRATIONAL, DOUBLE
        _ => None,
    }
}

struct Reader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> Reader<'a> {
    fn from_header(data: &'a [u8]) -> Result<Self, ExifError> {
        if data.len() < 8 {
            return Err(malformed(Directory::Primary, "truncated TIFF header"));
        }
        let big_endian = match &data[0..2] {
            b"MM" => true,
            b"II" => false,
            _ => return Err(malformed(Directory::Primary, "unknown byte-order mark")),
        };
        let reader = Self { data, big_endian };
        if reader.u16_at(2) != Some(42) {
            return Err(malformed(Directory::Primary, "missing TIFF magic number"));
        }
        Ok(reader)
    }

    fn bytes_at(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes_at(offset, 2)?.try_into().ok()?;
        Some(self.u16_from(b))
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes_at(offset, 4)?.try_into().ok()?;
        Some(self.u32_from(b))
    }

    fn u16_from(&self, b: [u8; 2]) -> u16 {
        if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        }
    }

    fn u32_from(&self, b: [u8; 4]) -> u32 {
        if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        }
    }

    /// Decode one IFD into `entries`, returning the next-IFD offset.
    fn read_ifd(
        &self,
        offset: u32,
        directory: Directory,
        entries: &mut BTreeMap<(Directory, u16), RawTagValue>,
    ) -> Result<u32, ExifError> {
        let offset = offset as usize;
        let count = self.u16_at(offset).ok_or_else(|| {
            malformed(
                directory,
                format!("directory offset {offset} is past the end of the data"),
            )
        })? as usize;
        let table_start = offset + 2;
        if self.bytes_at(table_start, count * 12).is_none() {
            return Err(malformed(
                directory,
                format!("{count} entries at offset {offset} run past the end of the data"),
            ));
        }

        for i in 0..count {
            let entry = table_start + i * 12;
            let (tag_id, value) = self.read_entry(entry, directory)?;
            entries.entry((directory, tag_id)).or_insert(value);
        }

        // A missing next-IFD link is common in trimmed blobs; treat as "none".
        Ok(self.u32_at(table_start + count * 12).unwrap_or(0))
    }

    fn read_entry(
        &self,
        entry: usize,
        directory: Directory,
    ) -> Result<(u16, RawTagValue), ExifError> {
        let truncated = || malformed(directory, format!("entry at offset {entry} is truncated"));
        let tag_id = self.u16_at(entry).ok_or_else(truncated)?;
        let field_type = self.u16_at(entry + 2).ok_or_else(truncated)?;
        let count = self.u32_at(entry + 4).ok_or_else(truncated)?;
        let value_field = self.bytes_at(entry + 8, 4).ok_or_else(truncated)?;

        let Some(size) = type_size(field_type) else {
            // Unknown type: the value length is unknowable, keep the raw field.
            return Ok((
                tag_id,
                RawTagValue::Other {
                    field_type,
                    count,
                    bytes: value_field.to_vec(),
                },
            ));
        };

        let byte_len = (count as usize).checked_mul(size).ok_or_else(|| {
            malformed(directory, format!("tag 0x{tag_id:04X} declares an impossible length"))
        })?;
        let payload = if byte_len <= 4 {
            &value_field[..byte_len]
        } else {
            let value_offset = self.u32_from([
                value_field[0],
                value_field[1],
                value_field[2],
                value_field[3],
            ]) as usize;
            self.bytes_at(value_offset, byte_len).ok_or_else(|| {
                malformed(
                    directory,
                    format!(
                        "tag 0x{tag_id:04X} needs {byte_len} bytes at offset {value_offset}, \
                         past the end of the data"
                    ),
                )
            })?
        };

        Ok((tag_id, self.decode_value(field_type, count, payload)))
    }

    fn decode_value(&self, field_type: u16, count: u32, payload: &[u8]) -> RawTagValue {
        match field_type {
            1 | 6 | 7 => RawTagValue::Bytes(payload.to_vec()),
            2 => RawTagValue::Ascii(payload.to_vec()),
            3 => {
                let mut values: Vec<u16> = payload
                    .chunks_exact(2)
                    .map(|c| self.u16_from([c[0], c[1]]))
                    .collect();
                if values.len() == 1 {
                    RawTagValue::Short(values.remove(0))
                } else {
                    RawTagValue::Shorts(values)
                }
            }
            // IFD offsets (type 13) are LONGs with a different name.
            4 | 13 => {
                let mut values: Vec<u32> = payload
                    .chunks_exact(4)
                    .map(|c| self.u32_from([c[0], c[1], c[2], c[3]]))
                    .collect();
                if values.len() == 1 {
                    RawTagValue::Long(values.remove(0))
                } else {
                    RawTagValue::Longs(values)
                }
            }
            5 | 10 => {
                let signed = field_type == 10;
                let mut values: Vec<Rational> = payload
                    .chunks_exact(8)
                    .map(|c| {
                        let n = self.u32_from([c[0], c[1], c[2], c[3]]);
                        let d = self.u32_from([c[4], c[5], c[6], c[7]]);
                        if signed {
                            Rational::new(i64::from(n as i32), i64::from(d as i32))
                        } else {
                            Rational::new(i64::from(n), i64::from(d))
                        }
                    })
                    .collect();
                if values.len() == 1 {
                    RawTagValue::Rational(values.remove(0))
                } else {
                    RawTagValue::Rationals(values)
                }
            }
            _ => RawTagValue::Other {
                field_type,
                count,
                bytes: payload.to_vec(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TiffBuilder;

    fn camera_blob(big_endian: bool) -> Vec<u8> {
        TiffBuilder::new(big_endian)
            .ascii(Directory::Primary, tag::MAKE, "FUJIFILM")
            .ascii(Directory::Primary, tag::MODEL, "X-T4")
            .rational(Directory::Capture, tag::F_NUMBER, 28, 10)
            .rational(Directory::Capture, tag::EXPOSURE_TIME, 1, 250)
            .short(Directory::Capture, tag::ISO_SPEED_RATINGS, 400)
            .ascii(Directory::Capture, tag::DATE_TIME_ORIGINAL, "2023:05:01 10:20:30")
            .ascii(Directory::Capture, tag::LENS_MAKE, "FUJIFILM")
            .ascii(Directory::Capture, tag::LENS_MODEL, "XF23mmF1.4 R")
            .rational(Directory::Gps, 0x0006, 1200, 10)
            .long(Directory::Thumbnail, 0x0201, 4096)
            .build()
    }

    #[test]
    fn decodes_all_four_directories_little_endian() {
        let dir = parse_tag_directory(&camera_blob(false)).unwrap();
        assert_eq!(
            dir.text(Directory::Primary, tag::MAKE).unwrap().as_deref(),
            Some("FUJIFILM")
        );
        assert_eq!(
            dir.rational(Directory::Capture, tag::F_NUMBER),
            Some(Rational::new(28, 10))
        );
        assert_eq!(dir.unsigned(Directory::Capture, tag::ISO_SPEED_RATINGS), Some(400));
        assert_eq!(
            dir.rational(Directory::Gps, 0x0006),
            Some(Rational::new(1200, 10))
        );
        assert_eq!(dir.unsigned(Directory::Thumbnail, 0x0201), Some(4096));
    }

    #[test]
    fn decodes_big_endian() {
        let le = parse_tag_directory(&camera_blob(false)).unwrap();
        let be = parse_tag_directory(&camera_blob(true)).unwrap();
        assert_eq!(le, be);
    }

    #[test]
    fn accepts_exif_prefix() {
        let mut blob = EXIF_HEADER.to_vec();
        blob.extend(camera_blob(false));
        let dir = parse_tag_directory(&blob).unwrap();
        assert!(dir.contains(Directory::Capture, tag::LENS_MODEL));
    }

    #[test]
    fn keeps_unknown_tags() {
        let blob = TiffBuilder::new(false)
            .ascii(Directory::Primary, tag::MAKE, "RICOH")
            .undefined(Directory::Capture, 0x927C, &[1, 2, 3, 4, 5, 6, 7, 8, 9])
            .raw(Directory::Primary, 0xC000, 99, 1, &[0xAA, 0xBB, 0xCC, 0xDD])
            .build();
        let dir = parse_tag_directory(&blob).unwrap();
        assert_eq!(
            dir.get(Directory::Capture, 0x927C),
            Some(&RawTagValue::Bytes(vec![1, 2, 3, 4, 5, 6, 7, 8, 9]))
        );
        assert_eq!(
            dir.get(Directory::Primary, 0xC000),
            Some(&RawTagValue::Other {
                field_type: 99,
                count: 1,
                bytes: vec![0xAA, 0xBB, 0xCC, 0xDD],
            })
        );
    }

    #[test]
    fn signed_rationals_keep_sign() {
        let blob = TiffBuilder::new(true)
            .srational(Directory::Capture, 0x9204, -2, 3)
            .build();
        let dir = parse_tag_directory(&blob).unwrap();
        assert_eq!(dir.rational(Directory::Capture, 0x9204), Some(Rational::new(-2, 3)));
    }

    #[test]
    fn multi_value_fields_decode_as_sequences() {
        let blob = TiffBuilder::new(false)
            .shorts(Directory::Capture, tag::ISO_SPEED_RATINGS, &[200, 400])
            .build();
        let dir = parse_tag_directory(&blob).unwrap();
        assert_eq!(
            dir.get(Directory::Capture, tag::ISO_SPEED_RATINGS),
            Some(&RawTagValue::Shorts(vec![200, 400]))
        );
    }

    #[test]
    fn follows_capture_pointer_stored_as_ifd_type() {
        // IFD0 at 8: one entry, 0x8769 of type 13 (IFD) pointing at 26.
        // Capture IFD at 26: ISOSpeedRatings = 400.
        let mut blob = b"II\x2A\0\x08\0\0\0".to_vec();
        blob.extend(1u16.to_le_bytes());
        blob.extend(tag::EXIF_IFD_POINTER.to_le_bytes());
        blob.extend(13u16.to_le_bytes());
        blob.extend(1u32.to_le_bytes());
        blob.extend(26u32.to_le_bytes());
        blob.extend(0u32.to_le_bytes());
        assert_eq!(blob.len(), 26);
        blob.extend(1u16.to_le_bytes());
        blob.extend(tag::ISO_SPEED_RATINGS.to_le_bytes());
        blob.extend(3u16.to_le_bytes());
        blob.extend(1u32.to_le_bytes());
        blob.extend([0x90, 0x01, 0, 0]);
        blob.extend(0u32.to_le_bytes());

        let dir = parse_tag_directory(&blob).unwrap();
        assert_eq!(
            dir.get(Directory::Primary, tag::EXIF_IFD_POINTER),
            Some(&RawTagValue::Long(26))
        );
        assert_eq!(dir.count_in(Directory::Capture), 1);
        assert_eq!(dir.unsigned(Directory::Capture, tag::ISO_SPEED_RATINGS), Some(400));
    }

    #[test]
    fn missing_capture_directory_is_not_an_error() {
        let blob = TiffBuilder::new(false)
            .ascii(Directory::Primary, tag::MAKE, "NIKON CORPORATION")
            .build();
        let dir = parse_tag_directory(&blob).unwrap();
        assert_eq!(dir.count_in(Directory::Capture), 0);
        assert_eq!(dir.count_in(Directory::Primary), 1);
    }

    #[test]
    fn invalid_text_does_not_fail_decode() {
        let blob = TiffBuilder::new(false)
            .ascii_bytes(Directory::Primary, tag::MODEL, &[0xC3, 0x28, 0x00])
            .ascii(Directory::Primary, tag::MAKE, "Canon")
            .build();
        let dir = parse_tag_directory(&blob).unwrap();
        assert!(dir.text(Directory::Primary, tag::MODEL).is_err());
        assert_eq!(
            dir.text(Directory::Primary, tag::MAKE).unwrap().as_deref(),
            Some("Canon")
        );
    }

    #[test]
    fn rejects_bad_header() {
        assert!(matches!(
            parse_tag_directory(b"XX*\0\x08\0\0\0"),
            Err(ExifError::MalformedDirectory { .. })
        ));
        assert!(matches!(
            parse_tag_directory(b"II"),
            Err(ExifError::MalformedDirectory { .. })
        ));
        assert!(matches!(
            parse_tag_directory(b"II\x2B\0\x08\0\0\0"),
            Err(ExifError::MalformedDirectory { .. })
        ));
    }

    #[test]
    fn rejects_payload_past_end() {
        let mut blob = camera_blob(false);
        // Cut into the out-of-line payload area of the last directory.
        blob.truncate(blob.len() - 3);
        let err = parse_tag_directory(&blob).unwrap_err();
        assert!(matches!(err, ExifError::MalformedDirectory { .. }), "{err}");
    }

    #[test]
    fn rejects_entry_table_past_end() {
        // Header + IFD0 claiming 5 entries with no table behind it.
        let blob = b"II*\0\x08\0\0\0\x05\0";
        let err = parse_tag_directory(blob).unwrap_err();
        assert_eq!(
            err,
            ExifError::MalformedDirectory {
                directory: Directory::Primary,
                reason: "5 entries at offset 8 run past the end of the data".to_string(),
            }
        );
    }

    #[test]
    fn rejects_dangling_sub_directory_pointer() {
        let blob = TiffBuilder::new(false)
            .long(Directory::Primary, tag::EXIF_IFD_POINTER, 10_000)
            .build();
        let err = parse_tag_directory(&blob).unwrap_err();
        assert!(matches!(
            err,
            ExifError::MalformedDirectory {
                directory: Directory::Capture,
                ..
            }
        ));
    }
}
