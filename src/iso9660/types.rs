/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use std::fmt;

/// Standard identifier at byte 1 of an ISO 9660 / CD-i volume descriptor.
pub const ISO_IDENTIFIER: &[u8; 5] = b"CD001";
pub const CDI_IDENTIFIER: &[u8; 5] = b"CD-I ";
/// High Sierra identifier, found at byte 9 (after the 8-byte LBN field).
pub const HIGH_SIERRA_IDENTIFIER: &[u8; 5] = b"CDROM";

/// First sector of the volume descriptor sequence.
pub const VOLUME_DESCRIPTORS_SECTOR: u64 = 16;

pub const DESCRIPTOR_TYPE_BOOT: u8 = 0;
pub const DESCRIPTOR_TYPE_PRIMARY: u8 = 1;
pub const DESCRIPTOR_TYPE_SUPPLEMENTARY: u8 = 2;
pub const DESCRIPTOR_TYPE_PARTITION: u8 = 3;
pub const DESCRIPTOR_TYPE_TERMINATOR: u8 = 255;

pub const EL_TORITO_SYSTEM_ID: &[u8] = b"EL TORITO SPECIFICATION";

// Directory record file flags.
pub const FLAG_HIDDEN: u8 = 0x01;
pub const FLAG_DIRECTORY: u8 = 0x02;
pub const FLAG_ASSOCIATED: u8 = 0x04;
pub const FLAG_RECORD: u8 = 0x08;
pub const FLAG_PROTECTION: u8 = 0x10;
pub const FLAG_MULTI_EXTENT: u8 = 0x80;

/// Which dialect of the on-disc structures the volume uses. Latched from
/// the first descriptor sector and fixed for the whole volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFlavor {
    Iso9660,
    HighSierra,
    Cdi,
}

/// A decoded volume or directory timestamp. Unspecified timestamps (leading
/// byte '0', NUL, or out of digit range in the text form; all-zero in the
/// packed form) are represented as `None` at the decode sites, never as a
/// zero date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 15-minute intervals from GMT, -48..=52; 0 when the format has none.
    pub gmt_offset: i8,
}

impl fmt::Display for IsoTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

fn ascii_digits_to_u16(s: &[u8]) -> Option<u16> {
    let mut value: u16 = 0;
    for &b in s {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u16);
    }
    Some(value)
}

/// Decodes the 17-byte text timestamp of ISO 9660 volume descriptors
/// ("YYYYMMDDHHMMSScc" + timezone byte), or the 16-byte High Sierra form
/// without the timezone. A leading '0' year digit or non-digit content
/// means "not specified".
pub fn decode_text_timestamp(bytes: &[u8]) -> Option<IsoTimestamp> {
    if bytes.len() < 16 {
        return None;
    }
    if bytes[0] == b'0' || bytes[0] == 0 || !bytes[0].is_ascii_digit() {
        return None;
    }
    let year = ascii_digits_to_u16(&bytes[0..4])?;
    let month = ascii_digits_to_u16(&bytes[4..6])? as u8;
    let day = ascii_digits_to_u16(&bytes[6..8])? as u8;
    let hour = ascii_digits_to_u16(&bytes[8..10])? as u8;
    let minute = ascii_digits_to_u16(&bytes[10..12])? as u8;
    let second = ascii_digits_to_u16(&bytes[12..14])? as u8;
    let gmt_offset = if bytes.len() >= 17 { bytes[16] as i8 - 48 } else { 0 };
    Some(IsoTimestamp { year, month, day, hour, minute, second, gmt_offset })
}

/// Decodes the packed directory-record timestamp: 7 bytes for ISO 9660
/// (with timezone), 6 for High Sierra (without). All-zero means "not
/// specified".
pub fn decode_record_timestamp(bytes: &[u8]) -> Option<IsoTimestamp> {
    if bytes.len() < 6 {
        return None;
    }
    if bytes[..6].iter().all(|&b| b == 0) {
        return None;
    }
    Some(IsoTimestamp {
        year: 1900 + bytes[0] as u16,
        month: bytes[1],
        day: bytes[2],
        hour: bytes[3],
        minute: bytes[4],
        second: bytes[5],
        gmt_offset: if bytes.len() >= 7 { bytes[6] as i8 } else { 0 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_timestamp_decodes() {
        let ts = decode_text_timestamp(b"1999123123595900\x04").unwrap();
        assert_eq!(ts.year, 1999);
        assert_eq!(ts.month, 12);
        assert_eq!(ts.second, 59);
        assert_eq!(ts.gmt_offset, -44);
        assert_eq!(format!("{}", ts), "1999-12-31 23:59:59");
    }

    #[test]
    fn unspecified_text_timestamp_is_none() {
        assert!(decode_text_timestamp(b"0000000000000000\x00").is_none());
        assert!(decode_text_timestamp(&[0u8; 17]).is_none());
        assert!(decode_text_timestamp(b"ABCD000000000000\x00").is_none());
    }

    #[test]
    fn record_timestamp_decodes() {
        let ts = decode_record_timestamp(&[99, 12, 31, 23, 59, 58, 0]).unwrap();
        assert_eq!(ts.year, 1999);
        assert_eq!(ts.day, 31);
        assert!(decode_record_timestamp(&[0u8; 7]).is_none());
    }

    #[test]
    fn high_sierra_six_byte_form() {
        let ts = decode_record_timestamp(&[90, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(ts.year, 1990);
        assert_eq!(ts.gmt_offset, 0);
    }
}
