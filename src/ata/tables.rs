/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Standards-version bookkeeping and fixed lookup tables for the IDENTIFY
//! report. Several rendering decisions are gated on the minimum/maximum
//! standard a device claims, so the 11-point ATA-1..ACS-4 scale is an
//! ordered enum compared directly.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AtaLevel {
    Ata1,
    Ata2,
    Ata3,
    Ata4,
    Ata5,
    Ata6,
    Ata7,
    Ata8Acs,
    Acs2,
    Acs3,
    Acs4,
}

impl AtaLevel {
    /// Word 80 bit positions, ATA-1 in bit 1 through ACS-4 in bit 11.
    pub const ALL: [AtaLevel; 11] = [
        AtaLevel::Ata1,
        AtaLevel::Ata2,
        AtaLevel::Ata3,
        AtaLevel::Ata4,
        AtaLevel::Ata5,
        AtaLevel::Ata6,
        AtaLevel::Ata7,
        AtaLevel::Ata8Acs,
        AtaLevel::Acs2,
        AtaLevel::Acs3,
        AtaLevel::Acs4,
    ];

    pub fn major_version_bit(self) -> u16 {
        1 << (self as u16 + 1)
    }

    /// Numeric gate used by the report: CHS fields render below 6,
    /// minor-version info from 3 up, and so on.
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for AtaLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            AtaLevel::Ata1 => "ATA-1",
            AtaLevel::Ata2 => "ATA-2",
            AtaLevel::Ata3 => "ATA-3",
            AtaLevel::Ata4 => "ATA/ATAPI-4",
            AtaLevel::Ata5 => "ATA/ATAPI-5",
            AtaLevel::Ata6 => "ATA/ATAPI-6",
            AtaLevel::Ata7 => "ATA/ATAPI-7",
            AtaLevel::Ata8Acs => "ATA8-ACS",
            AtaLevel::Acs2 => "ATA8-ACS2",
            AtaLevel::Acs3 => "ATA8-ACS3",
            AtaLevel::Acs4 => "ATA8-ACS4",
        };
        f.write_str(s)
    }
}

/// Word 81 minor revision codes, per ACS-4 table 45 and its predecessors.
const MINOR_VERSIONS: &[(u16, &str)] = &[
    (0x0001, "ATA (ATA-1) X3T9.2/781D prior to revision 4"),
    (0x0002, "ATA-1 published, ANSI X3.221-1994"),
    (0x0003, "ATA (ATA-1) X3T9.2/781D revision 4"),
    (0x0004, "ATA-2 published, ANSI X3.279-1996"),
    (0x0005, "ATA-2 X3T10/948D prior to revision 2k"),
    (0x0006, "ATA-3 X3T10/2008D revision 1"),
    (0x0007, "ATA-2 X3T10/948D revision 2k"),
    (0x0008, "ATA-3 X3T10/2008D revision 0"),
    (0x0009, "ATA-2 X3T10/948D revision 3"),
    (0x000a, "ATA-3 published, ANSI X3.298-1997"),
    (0x000b, "ATA-3 X3T10/2008D revision 6"),
    (0x000c, "ATA-3 X3T13/2008D revision 7.0"),
    (0x000d, "ATA/ATAPI-4 X3T13/1153D revision 6"),
    (0x000e, "ATA/ATAPI-4 T13/1153D revision 13"),
    (0x000f, "ATA/ATAPI-4 X3T13/1153D revision 7"),
    (0x0010, "ATA/ATAPI-4 T13/1153D revision 18"),
    (0x0011, "ATA/ATAPI-4 T13/1153D revision 15"),
    (0x0012, "ATA/ATAPI-4 published, ANSI NCITS 317-1998"),
    (0x0013, "ATA/ATAPI-5 T13/1321D revision 3"),
    (0x0014, "ATA/ATAPI-4 T13/1153D revision 14"),
    (0x0015, "ATA/ATAPI-5 T13/1321D revision 1"),
    (0x0016, "ATA/ATAPI-5 published, ANSI NCITS 340-2000"),
    (0x0017, "ATA/ATAPI-4 T13/1153D revision 17"),
    (0x0018, "ATA/ATAPI-6 T13/1410D revision 0"),
    (0x0019, "ATA/ATAPI-6 T13/1410D revision 3a"),
    (0x001a, "ATA/ATAPI-7 T13/1532D revision 1"),
    (0x001b, "ATA/ATAPI-6 T13/1410D revision 2"),
    (0x001c, "ATA/ATAPI-6 T13/1410D revision 1"),
    (0x001d, "ATA/ATAPI-7 published, ANSI INCITS 397-2005"),
    (0x001e, "ATA/ATAPI-7 T13/1532D revision 0"),
    (0x001f, "ACS-3 revision 3b"),
    (0x0021, "ATA/ATAPI-7 T13/1532D revision 4a"),
    (0x0022, "ATA/ATAPI-6 published, ANSI INCITS 361-2002"),
    (0x0027, "ATA8-ACS revision 3c"),
    (0x0028, "ATA8-ACS revision 6"),
    (0x0029, "ATA8-ACS revision 4"),
    (0x0031, "ACS-2 revision 2"),
    (0x0033, "ATA8-ACS revision 3e"),
    (0x0039, "ATA8-ACS revision 4c"),
    (0x0042, "ATA8-ACS revision 3f"),
    (0x0052, "ATA8-ACS revision 3b"),
    (0x005e, "ACS-4 revision 5"),
    (0x006d, "ACS-3 revision 5"),
    (0x0082, "ACS-2 published, ANSI INCITS 482-2012"),
    (0x0107, "ATA8-ACS revision 2d"),
    (0x010a, "ACS-3 published, ANSI INCITS 522-2014"),
    (0x0110, "ACS-2 revision 3"),
    (0x011b, "ACS-3 revision 4"),
];

pub fn minor_version_str(code: u16) -> String {
    match MINOR_VERSIONS.iter().find(|(c, _)| *c == code) {
        Some((_, s)) => (*s).to_string(),
        None => format!("Unknown ATA revision 0x{:04x}", code),
    }
}

/// Word 222 low bits when the transport nibble says Serial ATA.
pub const SATA_TRANSPORT_REVISIONS: &[(u16, &str)] = &[
    (0x0001, "ATA8-AST"),
    (0x0002, "SATA-1.0a"),
    (0x0004, "SATA-II-Ext"),
    (0x0008, "SATA-2.5"),
    (0x0010, "SATA-2.6"),
    (0x0020, "SATA-3.0"),
    (0x0040, "SATA-3.1"),
];

pub fn transport_type_str(transport_major: u16) -> &'static str {
    match transport_major >> 12 {
        0x0 => "Parallel ATA",
        0x1 => "Serial ATA",
        0xe => "SATA Express",
        _ => "unknown transport",
    }
}

/// Word 0 bits 6:5 for ATAPI devices: DRQ assertion timing for PACKET.
pub fn drq_timing_str(code: u16) -> String {
    match code {
        0 => "Device shall set DRQ within 3 ms of receiving PACKET".to_string(),
        1 => "Device shall assert INTRQ when DRQ is set to one".to_string(),
        2 => "Device shall set DRQ within 50 us of receiving PACKET".to_string(),
        n => format!("Unknown DRQ timing code {}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AtaLevel::Ata1 < AtaLevel::Acs4);
        assert!(AtaLevel::Ata5 < AtaLevel::Ata6);
        assert_eq!(AtaLevel::Ata1.major_version_bit(), 0x0002);
        assert_eq!(AtaLevel::Acs4.major_version_bit(), 0x0800);
        assert_eq!(AtaLevel::Ata5.ordinal(), 5);
    }

    #[test]
    fn unknown_minor_version_is_not_fatal() {
        assert!(minor_version_str(0xbeef).contains("Unknown ATA revision"));
        assert_eq!(minor_version_str(0x001f), "ACS-3 revision 3b");
    }

    #[test]
    fn transport_nibble() {
        assert_eq!(transport_type_str(0x1020), "Serial ATA");
        assert_eq!(transport_type_str(0x0000), "Parallel ATA");
        assert_eq!(transport_type_str(0xe000), "SATA Express");
        assert_eq!(transport_type_str(0x7000), "unknown transport");
    }
}
