/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Directory records, path tables and the System Use Sharing Protocol
//! scanner. Record iteration is defensive throughout: a zero length byte
//! is sector padding, a name length that overruns the record is clamped,
//! and neither can loop forever.

use crate::iso9660::types::{
    decode_record_timestamp, IsoTimestamp, VolumeFlavor, FLAG_ASSOCIATED, FLAG_DIRECTORY,
    FLAG_MULTI_EXTENT,
};
use crate::reader;
use crate::types::{Error, Result};
use crate::util;

/// A directory record as stored, before any name-space interpretation.
#[derive(Debug, Clone)]
pub struct RawDirectoryRecord {
    pub length: u8,
    pub ext_attr_length: u8,
    pub extent: u32,
    pub size: u32,
    pub timestamp: Option<IsoTimestamp>,
    pub flags: u8,
    pub file_unit_size: u8,
    pub interleave_gap: u8,
    pub volume_sequence: u16,
    pub name_bytes: Vec<u8>,
    pub system_use: Vec<u8>,
}

impl RawDirectoryRecord {
    pub fn is_special(&self) -> bool {
        self.name_bytes.len() == 1 && (self.name_bytes[0] == 0x00 || self.name_bytes[0] == 0x01)
    }
}

/// Decodes one directory record at the start of `buf`. Returns `None` for
/// a zero length byte (sector padding) or a record that does not fit the
/// fixed header.
pub fn decode_record(buf: &[u8], flavor: VolumeFlavor) -> Option<RawDirectoryRecord> {
    let length = *buf.first()?;
    if length == 0 || buf.len() < 33 {
        return None;
    }
    // The fixed part is 33 bytes plus at least one name byte; a shorter
    // length byte is corruption and is treated as padding.
    if length < 34 {
        log::debug!("directory record length {} below the fixed header, skipping", length);
        return None;
    }
    let record = &buf[..(length as usize).min(buf.len())];

    // CD-i records only carry the big-endian halves of the both-order
    // fields; High Sierra shifts the flags byte and shortens the datetime.
    let (extent, size) = match flavor {
        VolumeFlavor::Cdi => {
            (reader::u32_be_at(record, 6).ok()?, reader::u32_be_at(record, 14).ok()?)
        }
        _ => (reader::u32_le_at(record, 2).ok()?, reader::u32_le_at(record, 10).ok()?),
    };
    let (timestamp, flags_offset) = match flavor {
        VolumeFlavor::HighSierra => (decode_record_timestamp(&record[18..24]), 24usize),
        _ => (decode_record_timestamp(&record[18..25]), 25usize),
    };

    let name_len = record[32] as usize;
    let name_end = (33 + name_len).min(record.len());
    if 33 + name_len > record.len() {
        log::debug!(
            "directory record name length {} overruns record length {}, clamping",
            name_len,
            length
        );
    }
    let name_bytes = record[33..name_end].to_vec();

    // The name field is padded to an even offset before the system use area.
    let mut su_start = name_end;
    if name_len % 2 == 0 && su_start < record.len() {
        su_start += 1;
    }
    let system_use = record[su_start.min(record.len())..].to_vec();

    Some(RawDirectoryRecord {
        length,
        ext_attr_length: record[1],
        extent,
        size,
        timestamp,
        flags: record[flags_offset],
        file_unit_size: *record.get(26).unwrap_or(&0),
        interleave_gap: *record.get(27).unwrap_or(&0),
        volume_sequence: reader::u16_lsb_msb_at(record, 28).unwrap_or(0),
        name_bytes,
        system_use,
    })
}

/// Iterates every record in a directory extent. Records never straddle a
/// logical block, so a zero length byte skips to the next block boundary.
pub fn decode_directory(buf: &[u8], block_size: usize, flavor: VolumeFlavor) -> Vec<RawDirectoryRecord> {
    let mut records = Vec::new();
    let block_size = block_size.max(1);
    let mut pos = 0usize;
    while pos < buf.len() {
        match decode_record(&buf[pos..], flavor) {
            Some(record) => {
                let advance = record.length as usize;
                records.push(record);
                pos += advance;
            }
            None => {
                // Padding: resume at the next block boundary.
                let next = (pos / block_size + 1) * block_size;
                if next <= pos {
                    break;
                }
                pos = next;
            }
        }
    }
    records
}

/// How raw names are turned into the names a caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// ASCII with the ";version" suffix stripped.
    Iso,
    /// ASCII keeping the version suffix, VMS style.
    Vms,
    /// Big-endian UCS-2, version stripped.
    Joliet,
    /// Rock Ridge NM records where present, ISO otherwise.
    RockRidge,
    /// ASCII verbatim (long names recorded directly in the primary tree).
    Romeo,
}

fn strip_version(name: &str) -> String {
    match name.rfind(';') {
        Some(n) => name[..n].to_string(),
        None => name.to_string(),
    }
}

fn rock_ridge_name(system_use: &[u8]) -> Option<String> {
    let mut name = String::new();
    let mut found = false;
    for entry in scan_system_use(system_use) {
        if &entry.signature == b"NM" && !entry.data.is_empty() {
            name.push_str(&String::from_utf8_lossy(&entry.data[1..]));
            found = true;
            // Flag bit 0 means the name continues in another NM record.
            if entry.data[0] & 0x01 == 0 {
                break;
            }
        }
    }
    if found && !name.is_empty() {
        Some(name)
    } else {
        None
    }
}

pub fn decode_name(record: &RawDirectoryRecord, style: NameStyle) -> String {
    match style {
        NameStyle::Iso => strip_version(&util::space_padded_to_string(&record.name_bytes)),
        NameStyle::Vms => {
            let name = util::space_padded_to_string(&record.name_bytes);
            if name.contains(';') {
                name
            } else {
                format!("{};1", name)
            }
        }
        NameStyle::Joliet => strip_version(&util::ucs2_to_string(&record.name_bytes)),
        NameStyle::RockRidge => rock_ridge_name(&record.system_use)
            .unwrap_or_else(|| strip_version(&util::space_padded_to_string(&record.name_bytes))),
        NameStyle::Romeo => util::space_padded_to_string(&record.name_bytes),
    }
}

/// One logical name in a directory. Multi-extent files carry more than one
/// `(extent, size)` segment, accumulated from their continuation records.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub extents: Vec<(u32, u64)>,
    pub associated_extents: Vec<(u32, u64)>,
    pub flags: u8,
    pub timestamp: Option<IsoTimestamp>,
    pub ext_attr_length: u8,
    pub volume_sequence: u16,
    pub system_use: Vec<u8>,
}

impl DirectoryEntry {
    pub fn is_directory(&self) -> bool {
        self.flags & FLAG_DIRECTORY != 0
    }

    pub fn size(&self) -> u64 {
        self.extents.iter().map(|(_, size)| size).sum()
    }
}

/// Groups raw records into logical entries. The first occurrence of a name
/// wins; later records with the same name are either multi-extent
/// continuations (appended as extra segments while the previous record had
/// the multi-extent flag), associated-file records (kept separately), or
/// duplicates (dropped).
pub fn build_entries(records: &[RawDirectoryRecord], style: NameStyle) -> Vec<DirectoryEntry> {
    let mut entries: Vec<DirectoryEntry> = Vec::new();
    // Index into `entries` plus whether that entry still expects more
    // extents, keyed by position found via linear scan (directories are
    // small enough that this stays cheap).
    let mut continuing: Option<usize> = None;

    for record in records {
        if record.is_special() {
            continue;
        }
        let name = decode_name(record, style);
        if name.is_empty() {
            continue;
        }
        let segment = (record.extent, record.size as u64);

        if record.flags & FLAG_ASSOCIATED != 0 {
            match entries.iter_mut().find(|e| e.name == name) {
                Some(entry) => entry.associated_extents.push(segment),
                None => {
                    // Associated data before the real record; create the
                    // entry and let the real record fill in the rest.
                    entries.push(DirectoryEntry {
                        name,
                        extents: Vec::new(),
                        associated_extents: vec![segment],
                        flags: record.flags,
                        timestamp: record.timestamp,
                        ext_attr_length: record.ext_attr_length,
                        volume_sequence: record.volume_sequence,
                        system_use: record.system_use.clone(),
                    });
                }
            }
            continue;
        }

        if let Some(index) = continuing {
            if entries[index].name == name {
                entries[index].extents.push(segment);
                continuing = if record.flags & FLAG_MULTI_EXTENT != 0 { Some(index) } else { None };
                continue;
            }
            continuing = None;
        }

        match entries.iter().position(|e| e.name == name) {
            Some(index) if entries[index].extents.is_empty() => {
                // Entry created by an associated record; attach the data.
                entries[index].extents.push(segment);
                entries[index].flags = record.flags;
                entries[index].timestamp = record.timestamp;
                if record.flags & FLAG_MULTI_EXTENT != 0 {
                    continuing = Some(index);
                }
            }
            Some(_) => {
                // Duplicate name without a multi-extent chain: first wins.
                log::debug!("duplicate directory entry for {}, keeping first", name);
            }
            None => {
                entries.push(DirectoryEntry {
                    name,
                    extents: vec![segment],
                    associated_extents: Vec::new(),
                    flags: record.flags,
                    timestamp: record.timestamp,
                    ext_attr_length: record.ext_attr_length,
                    volume_sequence: record.volume_sequence,
                    system_use: record.system_use.clone(),
                });
                if record.flags & FLAG_MULTI_EXTENT != 0 {
                    continuing = Some(entries.len() - 1);
                }
            }
        }
    }
    entries
}

#[derive(Debug, Clone)]
pub struct PathTableEntry {
    pub name: String,
    pub ext_attr_length: u8,
    pub extent: u32,
    pub parent: u16,
}

/// Decodes an L-type (little-endian) or M-type (big-endian) path table.
/// Entries with an odd name length consume one padding byte; a zero name
/// length terminates the table.
pub fn decode_path_table(buf: &[u8], big_endian: bool, joliet: bool) -> Result<Vec<PathTableEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos < buf.len() {
        let name_len = buf[pos] as usize;
        if name_len == 0 {
            break;
        }
        if pos + 8 + name_len > buf.len() {
            return Err(Error::CorruptPathTable(entries.len()));
        }
        let extent = if big_endian {
            reader::u32_be_at(buf, pos + 2)?
        } else {
            reader::u32_le_at(buf, pos + 2)?
        };
        let parent = if big_endian {
            reader::u16_be_at(buf, pos + 6)?
        } else {
            reader::u16_le_at(buf, pos + 6)?
        };
        let name_bytes = &buf[pos + 8..pos + 8 + name_len];
        let name = if joliet {
            util::ucs2_to_string(name_bytes)
        } else {
            util::space_padded_to_string(name_bytes)
        };
        entries.push(PathTableEntry { name, ext_attr_length: buf[pos + 1], extent, parent });
        pos += 8 + name_len + (name_len & 1);
    }
    Ok(entries)
}

/// One System Use Sharing Protocol entry: a 2-byte signature, a version
/// and the payload after the 4-byte header.
#[derive(Debug, Clone)]
pub struct SuspEntry {
    pub signature: [u8; 2],
    pub version: u8,
    pub data: Vec<u8>,
}

/// A `CE` continuation area: block, offset within block, length.
#[derive(Debug, Clone, Copy)]
pub struct ContinuationArea {
    pub block: u32,
    pub offset: u32,
    pub length: u32,
}

const KNOWN_SIGNATURES: &[&[u8; 2]] = &[
    b"SP", b"CE", b"PD", b"ST", b"ER", b"ES", // SUSP core
    b"RR", b"PX", b"PN", b"SL", b"NM", b"CL", b"PL", b"RE", b"TF", b"SF", // Rock Ridge
    b"ZF", // zisofs
    b"XA", // CD-ROM XA
    b"AA", b"AB", // Apple ProDOS/HFS, old and new
    b"AS", // Amiga
    b"AL", // AAIP
];

/// Walks a system use area collecting signature entries. Stops at an `ST`
/// terminator, an unrecognized signature, or a length byte that cannot
/// advance the scan.
pub fn scan_system_use(area: &[u8]) -> Vec<SuspEntry> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos + 4 <= area.len() {
        let signature = [area[pos], area[pos + 1]];
        let length = area[pos + 2] as usize;
        if !KNOWN_SIGNATURES.iter().any(|s| **s == signature) {
            break;
        }
        if length < 4 || pos + length > area.len() {
            break;
        }
        entries.push(SuspEntry {
            signature,
            version: area[pos + 3],
            data: area[pos + 4..pos + length].to_vec(),
        });
        if signature == *b"ST" {
            break;
        }
        pos += length;
    }
    entries
}

/// Extracts the continuation areas referenced by `CE` entries; the caller
/// is responsible for fetching and re-scanning those sectors.
pub fn continuation_areas(entries: &[SuspEntry]) -> Vec<ContinuationArea> {
    let mut areas = Vec::new();
    for entry in entries {
        if &entry.signature == b"CE" && entry.data.len() >= 24 {
            let block = reader::u32_lsb_msb_at(&entry.data, 0).unwrap_or(0);
            let offset = reader::u32_lsb_msb_at(&entry.data, 8).unwrap_or(0);
            let length = reader::u32_lsb_msb_at(&entry.data, 16).unwrap_or(0);
            areas.push(ContinuationArea { block, offset, length });
        }
    }
    areas
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn make_record(name: &[u8], extent: u32, size: u32, flags: u8) -> Vec<u8> {
        let name_len = name.len();
        let pad = if name_len % 2 == 0 { 1 } else { 0 };
        let length = 33 + name_len + pad;
        let mut rec = vec![0u8; length];
        rec[0] = length as u8;
        rec[2..6].copy_from_slice(&extent.to_le_bytes());
        rec[6..10].copy_from_slice(&extent.to_be_bytes());
        rec[10..14].copy_from_slice(&size.to_le_bytes());
        rec[14..18].copy_from_slice(&size.to_be_bytes());
        rec[18] = 99; // 1999
        rec[19] = 1;
        rec[20] = 1;
        rec[25] = flags;
        rec[28] = 1; // volume sequence 1, LSB half
        rec[32] = name_len as u8;
        rec[33..33 + name_len].copy_from_slice(name);
        rec
    }

    #[test]
    fn zero_length_terminates_block() {
        let mut buf = vec![0u8; 2048];
        let rec = make_record(b"FILE.TXT;1", 100, 42, 0);
        buf[..rec.len()].copy_from_slice(&rec);
        // Everything after the record stays zero: padding.
        let records = decode_directory(&buf, 2048, VolumeFlavor::Iso9660);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].extent, 100);
        assert_eq!(records[0].size, 42);
    }

    #[test]
    fn records_resume_after_block_padding() {
        let mut buf = vec![0u8; 4096];
        let first = make_record(b"A;1", 10, 1, 0);
        let second = make_record(b"B;1", 20, 2, 0);
        buf[..first.len()].copy_from_slice(&first);
        buf[2048..2048 + second.len()].copy_from_slice(&second);
        let records = decode_directory(&buf, 2048, VolumeFlavor::Iso9660);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].extent, 20);
    }

    #[test]
    fn overlong_name_is_clamped_not_panicking() {
        let mut rec = make_record(b"X;1", 1, 1, 0);
        rec[32] = 0xff;
        let decoded = decode_record(&rec, VolumeFlavor::Iso9660).unwrap();
        assert!(decoded.name_bytes.len() < 0xff);
    }

    #[test]
    fn undersized_length_byte_is_treated_as_padding() {
        // A length byte below the fixed header must not index past the
        // clamped record.
        let mut buf = vec![0u8; 2048];
        let rec = make_record(b"FILE.TXT;1", 100, 42, 0);
        buf[..rec.len()].copy_from_slice(&rec);
        buf[0] = 20;
        let records = decode_directory(&buf, 2048, VolumeFlavor::Iso9660);
        assert!(records.is_empty());

        let mut rec = make_record(b"X;1", 1, 1, 0);
        rec[0] = 28;
        assert!(decode_record(&rec, VolumeFlavor::Iso9660).is_none());
        assert!(decode_record(&rec, VolumeFlavor::HighSierra).is_none());
    }

    #[test]
    fn multi_extent_records_accumulate_segments() {
        let records = vec![
            decode_record(&make_record(b"BIG.DAT;1", 100, 1024, FLAG_MULTI_EXTENT), VolumeFlavor::Iso9660)
                .unwrap(),
            decode_record(&make_record(b"BIG.DAT;1", 200, 1024, 0), VolumeFlavor::Iso9660).unwrap(),
        ];
        let entries = build_entries(&records, NameStyle::Iso);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].extents, vec![(100, 1024), (200, 1024)]);
        assert_eq!(entries[0].size(), 2048);
    }

    #[test]
    fn duplicate_names_first_wins() {
        let records = vec![
            decode_record(&make_record(b"F.TXT;1", 100, 10, 0), VolumeFlavor::Iso9660).unwrap(),
            decode_record(&make_record(b"F.TXT;1", 200, 20, 0), VolumeFlavor::Iso9660).unwrap(),
        ];
        let entries = build_entries(&records, NameStyle::Iso);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].extents, vec![(100, 10)]);
    }

    #[test]
    fn special_entries_are_skipped() {
        let records = vec![
            decode_record(&make_record(&[0x00], 16, 2048, FLAG_DIRECTORY), VolumeFlavor::Iso9660)
                .unwrap(),
            decode_record(&make_record(&[0x01], 16, 2048, FLAG_DIRECTORY), VolumeFlavor::Iso9660)
                .unwrap(),
            decode_record(&make_record(b"DIR", 30, 2048, FLAG_DIRECTORY), VolumeFlavor::Iso9660)
                .unwrap(),
        ];
        let entries = build_entries(&records, NameStyle::Iso);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "DIR");
        assert!(entries[0].is_directory());
    }

    #[test]
    fn name_styles() {
        let record =
            decode_record(&make_record(b"README.TXT;1", 50, 100, 0), VolumeFlavor::Iso9660).unwrap();
        assert_eq!(decode_name(&record, NameStyle::Iso), "README.TXT");
        assert_eq!(decode_name(&record, NameStyle::Vms), "README.TXT;1");
        assert_eq!(decode_name(&record, NameStyle::Romeo), "README.TXT;1");

        // Joliet names are UCS-2 big-endian.
        let ucs2: Vec<u8> = "Read Me.txt".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        let record = decode_record(&make_record(&ucs2, 50, 100, 0), VolumeFlavor::Iso9660).unwrap();
        assert_eq!(decode_name(&record, NameStyle::Joliet), "Read Me.txt");
    }

    #[test]
    fn rock_ridge_nm_overrides_name() {
        let mut rec = make_record(b"LONGNA~1.TXT;1", 50, 100, 0);
        let nm = [b'N', b'M', 5 + 9, 1, 0x00];
        rec.extend_from_slice(&nm);
        rec.extend_from_slice(b"long name");
        rec[0] = rec.len() as u8;
        let record = decode_record(&rec, VolumeFlavor::Iso9660).unwrap();
        assert_eq!(decode_name(&record, NameStyle::RockRidge), "long name");
        // Without RRIP the short name is used.
        assert_eq!(decode_name(&record, NameStyle::Iso), "LONGNA~1.TXT");
    }

    #[test]
    fn path_table_round() {
        // root + one child, L-type
        let mut buf = Vec::new();
        buf.extend_from_slice(&[1, 0]);
        buf.extend_from_slice(&20u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.push(0x00); // root name
        buf.push(0x00); // pad (odd name length)
        buf.extend_from_slice(&[3, 0]);
        buf.extend_from_slice(&30u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(b"DIR");
        buf.push(0x00); // pad
        buf.push(0x00); // terminator (name_len 0)

        let entries = decode_path_table(&buf, false, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name, "DIR");
        assert_eq!(entries[1].extent, 30);
        assert_eq!(entries[1].parent, 1);
    }

    #[test]
    fn truncated_path_table_is_an_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&[8, 0]);
        buf.extend_from_slice(&30u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(b"DI"); // claims 8 bytes of name, has 2
        assert!(matches!(
            decode_path_table(&buf, false, false),
            Err(Error::CorruptPathTable(0))
        ));
    }

    #[test]
    fn susp_scan_stops_at_garbage() {
        let mut area = Vec::new();
        area.extend_from_slice(&[b'X', b'A', 14, 1]);
        area.extend_from_slice(&[0u8; 10]);
        area.extend_from_slice(&[b'Q', b'Q', 4, 1]); // unknown signature
        let entries = scan_system_use(&area);
        assert_eq!(entries.len(), 1);
        assert_eq!(&entries[0].signature, b"XA");
    }

    #[test]
    fn continuation_area_extraction() {
        let mut area = Vec::new();
        area.extend_from_slice(&[b'C', b'E', 28, 1]);
        area.extend_from_slice(&19u32.to_le_bytes());
        area.extend_from_slice(&19u32.to_be_bytes());
        area.extend_from_slice(&0u32.to_le_bytes());
        area.extend_from_slice(&0u32.to_be_bytes());
        area.extend_from_slice(&256u32.to_le_bytes());
        area.extend_from_slice(&256u32.to_be_bytes());
        let entries = scan_system_use(&area);
        let areas = continuation_areas(&entries);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].block, 19);
        assert_eq!(areas[0].length, 256);
    }
}
