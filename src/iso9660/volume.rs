/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Volume descriptor sequence scan. The dialect (ISO 9660, High Sierra or
//! CD-i) is latched from the identifier in sector 16 and applied to every
//! descriptor after it; mixing dialects ends the scan.

use crate::iso9660::directory::{decode_record, RawDirectoryRecord};
use crate::iso9660::sector;
use crate::iso9660::types::{
    decode_text_timestamp, IsoTimestamp, VolumeFlavor, CDI_IDENTIFIER, DESCRIPTOR_TYPE_BOOT,
    DESCRIPTOR_TYPE_PARTITION, DESCRIPTOR_TYPE_PRIMARY, DESCRIPTOR_TYPE_SUPPLEMENTARY,
    DESCRIPTOR_TYPE_TERMINATOR, EL_TORITO_SYSTEM_ID, HIGH_SIERRA_IDENTIFIER, ISO_IDENTIFIER,
    VOLUME_DESCRIPTORS_SECTOR,
};
use crate::iso9660::image::SectorSource;
use crate::reader;
use crate::types::{Error, Result};
use crate::util;

// Runaway guard; real volumes have a handful of descriptors.
const MAX_DESCRIPTORS: u64 = 32;

/// The three Joliet UCS-2 escape sequences, in level order.
const JOLIET_ESCAPES: [[u8; 3]; 3] = [[0x25, 0x2f, 0x40], [0x25, 0x2f, 0x43], [0x25, 0x2f, 0x45]];

/// A primary or supplementary volume descriptor, decoded to native types.
/// Field positions differ per dialect; the decoded form does not.
#[derive(Debug, Clone)]
pub struct PrimaryDescriptor {
    pub descriptor_type: u8,
    pub version: u8,
    pub system_id: String,
    pub volume_id: String,
    pub volume_space_size: u32,
    pub volume_set_size: u16,
    pub volume_sequence_number: u16,
    pub logical_block_size: u16,
    pub path_table_size: u32,
    pub path_table_lsb: u32,
    pub path_table_msb: u32,
    pub root_directory: RawDirectoryRecord,
    pub volume_set_id: String,
    pub publisher_id: String,
    pub preparer_id: String,
    pub application_id: String,
    pub creation: Option<IsoTimestamp>,
    pub modification: Option<IsoTimestamp>,
    pub expiration: Option<IsoTimestamp>,
    pub effective: Option<IsoTimestamp>,
    /// Joliet level 1-3 for a supplementary descriptor carrying a UCS-2
    /// escape sequence; `None` otherwise.
    pub joliet_level: Option<u8>,
    /// The raw 2048-byte user data, kept for debug inspection.
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct BootRecord {
    pub system_id: String,
    pub boot_id: String,
    pub el_torito: bool,
    /// Boot catalog sector for El Torito records.
    pub catalog_sector: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct PartitionDescriptor {
    pub system_id: String,
    pub partition_id: String,
    pub location: u32,
    pub size: u32,
}

/// Everything learned from the descriptor sequence.
#[derive(Debug, Clone)]
pub struct DecodedVolume {
    pub flavor: VolumeFlavor,
    pub primary: PrimaryDescriptor,
    pub joliet: Option<PrimaryDescriptor>,
    pub other_supplementary: Vec<PrimaryDescriptor>,
    pub boot: Option<BootRecord>,
    pub partitions: Vec<PartitionDescriptor>,
}

fn identify(sector: &[u8]) -> Option<(VolumeFlavor, u8)> {
    if sector.len() < 16 {
        return None;
    }
    if &sector[1..6] == ISO_IDENTIFIER {
        Some((VolumeFlavor::Iso9660, sector[0]))
    } else if &sector[1..6] == CDI_IDENTIFIER {
        Some((VolumeFlavor::Cdi, sector[0]))
    } else if &sector[9..14] == HIGH_SIERRA_IDENTIFIER {
        Some((VolumeFlavor::HighSierra, sector[8]))
    } else {
        None
    }
}

fn joliet_level(escape_sequences: &[u8]) -> Option<u8> {
    for (n, escape) in JOLIET_ESCAPES.iter().enumerate() {
        if escape_sequences.starts_with(escape) {
            return Some(n as u8 + 1);
        }
    }
    None
}

// CD-i volumes record only the big-endian half of the both-order fields.
fn both_u16(buf: &[u8], offset: usize, flavor: VolumeFlavor) -> Result<u16> {
    match flavor {
        VolumeFlavor::Cdi => reader::u16_be_at(buf, offset + 2),
        _ => reader::u16_lsb_msb_at(buf, offset),
    }
}

fn both_u32(buf: &[u8], offset: usize, flavor: VolumeFlavor) -> Result<u32> {
    match flavor {
        VolumeFlavor::Cdi => reader::u32_be_at(buf, offset + 4),
        _ => reader::u32_lsb_msb_at(buf, offset),
    }
}

fn decode_primary(buf: &[u8], flavor: VolumeFlavor) -> Result<PrimaryDescriptor> {
    reader::check(buf, 0, 2048)?;
    let (descriptor_type, version) = match flavor {
        VolumeFlavor::HighSierra => (buf[8], buf[14]),
        _ => (buf[0], buf[6]),
    };

    // High Sierra shifts every field by 8 bytes (its descriptors open with
    // an 8-byte logical block number) and has wider path table slots.
    let p = match flavor {
        VolumeFlavor::HighSierra => PrimaryDescriptor {
            descriptor_type,
            version,
            system_id: util::space_padded_to_string(&buf[16..48]),
            volume_id: util::space_padded_to_string(&buf[48..80]),
            volume_space_size: reader::u32_lsb_msb_at(buf, 88)?,
            volume_set_size: reader::u16_lsb_msb_at(buf, 128)?,
            volume_sequence_number: reader::u16_lsb_msb_at(buf, 132)?,
            logical_block_size: reader::u16_lsb_msb_at(buf, 136)?,
            path_table_size: reader::u32_lsb_msb_at(buf, 140)?,
            path_table_lsb: reader::u32_le_at(buf, 148)?,
            path_table_msb: reader::u32_be_at(buf, 164)?,
            root_directory: decode_record(&buf[180..214], flavor)
                .ok_or(Error::NoPrimaryDescriptor)?,
            volume_set_id: util::space_padded_to_string(&buf[214..342]),
            publisher_id: util::space_padded_to_string(&buf[342..470]),
            preparer_id: util::space_padded_to_string(&buf[470..598]),
            application_id: util::space_padded_to_string(&buf[598..726]),
            creation: decode_text_timestamp(&buf[790..806]),
            modification: decode_text_timestamp(&buf[806..822]),
            expiration: decode_text_timestamp(&buf[822..838]),
            effective: decode_text_timestamp(&buf[838..854]),
            joliet_level: None,
            raw: buf[..2048].to_vec(),
        },
        _ => PrimaryDescriptor {
            descriptor_type,
            version,
            system_id: util::space_padded_to_string(&buf[8..40]),
            volume_id: util::space_padded_to_string(&buf[40..72]),
            volume_space_size: both_u32(buf, 80, flavor)?,
            volume_set_size: both_u16(buf, 120, flavor)?,
            volume_sequence_number: both_u16(buf, 124, flavor)?,
            logical_block_size: both_u16(buf, 128, flavor)?,
            path_table_size: both_u32(buf, 132, flavor)?,
            path_table_lsb: reader::u32_le_at(buf, 140)?,
            path_table_msb: reader::u32_be_at(buf, 148)?,
            root_directory: decode_record(&buf[156..190], flavor)
                .ok_or(Error::NoPrimaryDescriptor)?,
            volume_set_id: util::space_padded_to_string(&buf[190..318]),
            publisher_id: util::space_padded_to_string(&buf[318..446]),
            preparer_id: util::space_padded_to_string(&buf[446..574]),
            application_id: util::space_padded_to_string(&buf[574..702]),
            creation: decode_text_timestamp(&buf[813..830]),
            modification: decode_text_timestamp(&buf[830..847]),
            expiration: decode_text_timestamp(&buf[847..864]),
            effective: decode_text_timestamp(&buf[864..881]),
            joliet_level: None,
            raw: buf[..2048].to_vec(),
        },
    };
    Ok(p)
}

fn decode_supplementary(buf: &[u8], flavor: VolumeFlavor) -> Result<PrimaryDescriptor> {
    let mut descriptor = decode_primary(buf, flavor)?;
    if flavor == VolumeFlavor::Iso9660 {
        descriptor.joliet_level = joliet_level(&buf[88..120]);
        if let Some(level) = descriptor.joliet_level {
            // UCS-2 identifiers in a Joliet descriptor.
            descriptor.system_id = util::ucs2_to_string(&buf[8..40]);
            descriptor.volume_id = util::ucs2_to_string(&buf[40..72]);
            descriptor.volume_set_id = util::ucs2_to_string(&buf[190..318]);
            descriptor.publisher_id = util::ucs2_to_string(&buf[318..446]);
            descriptor.preparer_id = util::ucs2_to_string(&buf[446..574]);
            descriptor.application_id = util::ucs2_to_string(&buf[574..702]);
            log::debug!("joliet level {} supplementary descriptor", level);
        }
    }
    Ok(descriptor)
}

fn decode_boot(buf: &[u8]) -> Result<BootRecord> {
    reader::check(buf, 0, 128)?;
    let system_bytes = &buf[7..39];
    let el_torito = system_bytes.starts_with(EL_TORITO_SYSTEM_ID);
    let catalog_sector = if el_torito { Some(reader::u32_le_at(buf, 71)?) } else { None };
    Ok(BootRecord {
        system_id: util::space_padded_to_string(system_bytes),
        boot_id: util::space_padded_to_string(&buf[39..71]),
        el_torito,
        catalog_sector,
    })
}

fn decode_partition(buf: &[u8], flavor: VolumeFlavor) -> Result<PartitionDescriptor> {
    reader::check(buf, 0, 88)?;
    Ok(PartitionDescriptor {
        system_id: util::space_padded_to_string(&buf[8..40]),
        partition_id: util::space_padded_to_string(&buf[40..72]),
        location: both_u32(buf, 72, flavor)?,
        size: both_u32(buf, 80, flavor)?,
    })
}

/// Walks the descriptor sequence starting at sector 16. Fails with
/// `NoPrimaryDescriptor` when no usable primary descriptor turns up.
pub fn scan_volume_descriptors(source: &mut dyn SectorSource) -> Result<DecodedVolume> {
    let mut flavor: Option<VolumeFlavor> = None;
    let mut primary: Option<PrimaryDescriptor> = None;
    let mut joliet: Option<PrimaryDescriptor> = None;
    let mut other_supplementary = Vec::new();
    let mut boot = None;
    let mut partitions = Vec::new();

    for n in 0..MAX_DESCRIPTORS {
        let lba = VOLUME_DESCRIPTORS_SECTOR + n;
        let raw = source.read_sector(lba)?;
        let data = sector::unwrap_user_data(&raw);

        let (sector_flavor, descriptor_type) = match identify(data) {
            Some(id) => id,
            None => break,
        };
        let volume_flavor = match flavor {
            Some(f) => {
                if f != sector_flavor {
                    log::warn!("descriptor at sector {} changes dialect, stopping scan", lba);
                    break;
                }
                f
            }
            None => {
                flavor = Some(sector_flavor);
                sector_flavor
            }
        };

        match descriptor_type {
            DESCRIPTOR_TYPE_TERMINATOR => break,
            DESCRIPTOR_TYPE_PRIMARY => {
                let descriptor = decode_primary(data, volume_flavor)?;
                if primary.is_none() {
                    primary = Some(descriptor);
                } else {
                    log::warn!("extra primary descriptor at sector {}, keeping first", lba);
                }
            }
            DESCRIPTOR_TYPE_SUPPLEMENTARY => {
                let descriptor = decode_supplementary(data, volume_flavor)?;
                if descriptor.joliet_level.is_some() && joliet.is_none() {
                    joliet = Some(descriptor);
                } else {
                    other_supplementary.push(descriptor);
                }
            }
            DESCRIPTOR_TYPE_BOOT => {
                let record = decode_boot(data)?;
                if record.el_torito {
                    log::debug!(
                        "el torito boot record, catalog at sector {:?}",
                        record.catalog_sector
                    );
                }
                boot = Some(record);
            }
            DESCRIPTOR_TYPE_PARTITION => {
                partitions.push(decode_partition(data, volume_flavor)?);
            }
            n => {
                log::debug!("unhandled volume descriptor type {} at sector {}", n, lba);
            }
        }
    }

    let flavor = flavor.ok_or(Error::NoPrimaryDescriptor)?;
    let primary = primary.ok_or(Error::NoPrimaryDescriptor)?;
    Ok(DecodedVolume { flavor, primary, joliet, other_supplementary, boot, partitions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iso9660::image::RawImage;
    use std::io::Cursor;

    fn root_record(extent: u32, size: u32) -> [u8; 34] {
        let mut rec = [0u8; 34];
        rec[0] = 34;
        rec[2..6].copy_from_slice(&extent.to_le_bytes());
        rec[6..10].copy_from_slice(&extent.to_be_bytes());
        rec[10..14].copy_from_slice(&size.to_le_bytes());
        rec[14..18].copy_from_slice(&size.to_be_bytes());
        rec[25] = 0x02;
        rec[32] = 1;
        rec[33] = 0x00;
        rec
    }

    pub fn make_pvd(descriptor_type: u8, volume_id: &str) -> Vec<u8> {
        let mut sector = vec![0u8; 2048];
        sector[0] = descriptor_type;
        sector[1..6].copy_from_slice(ISO_IDENTIFIER);
        sector[6] = 1;
        sector[8..40].copy_from_slice(&[b' '; 32]);
        let mut id = [b' '; 32];
        id[..volume_id.len()].copy_from_slice(volume_id.as_bytes());
        sector[40..72].copy_from_slice(&id);
        sector[80..84].copy_from_slice(&1000u32.to_le_bytes());
        sector[84..88].copy_from_slice(&1000u32.to_be_bytes());
        sector[120..122].copy_from_slice(&1u16.to_le_bytes());
        sector[122..124].copy_from_slice(&1u16.to_be_bytes());
        sector[124..126].copy_from_slice(&1u16.to_le_bytes());
        sector[126..128].copy_from_slice(&1u16.to_be_bytes());
        sector[128..130].copy_from_slice(&2048u16.to_le_bytes());
        sector[130..132].copy_from_slice(&2048u16.to_be_bytes());
        sector[132..136].copy_from_slice(&10u32.to_le_bytes());
        sector[136..140].copy_from_slice(&10u32.to_be_bytes());
        sector[140..144].copy_from_slice(&18u32.to_le_bytes());
        sector[148..152].copy_from_slice(&19u32.to_be_bytes());
        sector[156..190].copy_from_slice(&root_record(20, 2048));
        for range in [190..318, 318..446, 446..574, 574..702] {
            for b in &mut sector[range] {
                *b = b' ';
            }
        }
        sector[813..830].copy_from_slice(b"1999063012000000\x00");
        sector
    }

    fn terminator() -> Vec<u8> {
        let mut sector = vec![0u8; 2048];
        sector[0] = DESCRIPTOR_TYPE_TERMINATOR;
        sector[1..6].copy_from_slice(ISO_IDENTIFIER);
        sector[6] = 1;
        sector
    }

    fn image_with(descriptors: &[Vec<u8>]) -> RawImage<Cursor<Vec<u8>>> {
        let mut data = vec![0u8; 16 * 2048];
        for descriptor in descriptors {
            data.extend_from_slice(descriptor);
        }
        RawImage::new(Cursor::new(data), 2048).unwrap()
    }

    #[test]
    fn finds_primary_descriptor() {
        let mut image = image_with(&[make_pvd(DESCRIPTOR_TYPE_PRIMARY, "TESTVOL"), terminator()]);
        let volume = scan_volume_descriptors(&mut image).unwrap();
        assert_eq!(volume.flavor, VolumeFlavor::Iso9660);
        assert_eq!(volume.primary.volume_id, "TESTVOL");
        assert_eq!(volume.primary.volume_space_size, 1000);
        assert_eq!(volume.primary.logical_block_size, 2048);
        assert_eq!(volume.primary.root_directory.extent, 20);
        assert_eq!(volume.primary.creation.unwrap().year, 1999);
        assert!(volume.joliet.is_none());
    }

    #[test]
    fn classifies_joliet_supplementary() {
        let mut svd = make_pvd(DESCRIPTOR_TYPE_SUPPLEMENTARY, "");
        svd[88..91].copy_from_slice(&[0x25, 0x2f, 0x45]);
        let ucs2: Vec<u8> = "JolietVol".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        svd[40..72].fill(0);
        svd[40..40 + ucs2.len()].copy_from_slice(&ucs2);
        let mut image =
            image_with(&[make_pvd(DESCRIPTOR_TYPE_PRIMARY, "PLAIN"), svd, terminator()]);
        let volume = scan_volume_descriptors(&mut image).unwrap();
        let joliet = volume.joliet.unwrap();
        assert_eq!(joliet.joliet_level, Some(3));
        assert_eq!(joliet.volume_id, "JolietVol");
        assert_eq!(volume.primary.volume_id, "PLAIN");
    }

    #[test]
    fn supplementary_without_escapes_is_not_joliet() {
        let svd = make_pvd(DESCRIPTOR_TYPE_SUPPLEMENTARY, "OTHER");
        let mut image =
            image_with(&[make_pvd(DESCRIPTOR_TYPE_PRIMARY, "PLAIN"), svd, terminator()]);
        let volume = scan_volume_descriptors(&mut image).unwrap();
        assert!(volume.joliet.is_none());
        assert_eq!(volume.other_supplementary.len(), 1);
    }

    #[test]
    fn missing_primary_is_an_error() {
        let mut image = image_with(&[terminator()]);
        assert!(matches!(
            scan_volume_descriptors(&mut image),
            Err(Error::NoPrimaryDescriptor)
        ));
    }

    #[test]
    fn garbage_sector_16_is_an_error() {
        let mut image = image_with(&[vec![0u8; 2048]]);
        assert!(matches!(
            scan_volume_descriptors(&mut image),
            Err(Error::NoPrimaryDescriptor)
        ));
    }

    #[test]
    fn el_torito_boot_record() {
        let mut boot = vec![0u8; 2048];
        boot[0] = DESCRIPTOR_TYPE_BOOT;
        boot[1..6].copy_from_slice(ISO_IDENTIFIER);
        boot[6] = 1;
        boot[7..7 + EL_TORITO_SYSTEM_ID.len()].copy_from_slice(EL_TORITO_SYSTEM_ID);
        boot[71..75].copy_from_slice(&40u32.to_le_bytes());
        let mut image =
            image_with(&[boot, make_pvd(DESCRIPTOR_TYPE_PRIMARY, "BOOTED"), terminator()]);
        let volume = scan_volume_descriptors(&mut image).unwrap();
        let record = volume.boot.unwrap();
        assert!(record.el_torito);
        assert_eq!(record.catalog_sector, Some(40));
    }

    #[test]
    fn high_sierra_descriptor() {
        let mut sector = vec![0u8; 2048];
        sector[8] = DESCRIPTOR_TYPE_PRIMARY;
        sector[9..14].copy_from_slice(HIGH_SIERRA_IDENTIFIER);
        sector[14] = 1;
        for b in &mut sector[16..80] {
            *b = b' ';
        }
        sector[48..50].copy_from_slice(b"HS");
        sector[88..92].copy_from_slice(&500u32.to_le_bytes());
        sector[92..96].copy_from_slice(&500u32.to_be_bytes());
        sector[136..138].copy_from_slice(&2048u16.to_le_bytes());
        sector[138..140].copy_from_slice(&2048u16.to_be_bytes());
        let mut root = root_record(21, 2048);
        // High Sierra keeps the flags one byte earlier
        root[25] = 0;
        root[24] = 0x02;
        sector[180..214].copy_from_slice(&root);
        for b in &mut sector[214..726] {
            *b = b' ';
        }

        let mut terminator_hs = vec![0u8; 2048];
        terminator_hs[8] = DESCRIPTOR_TYPE_TERMINATOR;
        terminator_hs[9..14].copy_from_slice(HIGH_SIERRA_IDENTIFIER);

        let mut image = image_with(&[sector, terminator_hs]);
        let volume = scan_volume_descriptors(&mut image).unwrap();
        assert_eq!(volume.flavor, VolumeFlavor::HighSierra);
        assert_eq!(volume.primary.volume_id, "HS");
        assert_eq!(volume.primary.volume_space_size, 500);
        assert_eq!(volume.primary.root_directory.extent, 21);
        assert!(volume.primary.root_directory.flags & 0x02 != 0);
    }
}
