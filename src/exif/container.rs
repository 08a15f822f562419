//! Locating the EXIF blob inside an image file.
//!
//! For JPEG: the APP1 segment whose payload starts with `Exif\0\0`.
//! For TIFF: the whole file is already a TIFF structure.
//!
//! Nothing here decodes pixels; only the marker stream is walked.

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Return the TIFF-structured EXIF bytes of a JPEG or TIFF file, if any.
pub fn find_exif_blob(data: &[u8]) -> Option<&[u8]> {
    if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        return Some(data);
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        return find_jpeg_app1_exif(data);
    }
    None
}

/// Walk JPEG marker segments until APP1/Exif or start-of-scan.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2; // past SOI
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) means entropy-coded data starts; EOI ends the stream
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        // Standalone markers carry no length field
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xE1 {
            if let Some(tiff) = data[seg_start..seg_end].strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }
        pos += 2 + seg_len;
    }
    None
}
