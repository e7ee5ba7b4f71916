/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Human-readable report over a decoded IDENTIFY response. Every block is
//! gated the way the standard gates it: a field whose validity sentinel is
//! all-zero or all-ones is not reported at all rather than rendered as a
//! bogus value. Flag cascades are table-driven; each row carries the mask
//! and the message.

use std::fmt::Write as _;

use crate::ata::identify::{IdentifyDevice, GENERAL_CONFIG_CFA};
use crate::ata::tables::{self, AtaLevel};
use crate::scsi::tables::peripheral_device_type_str;
use crate::util;

macro_rules! outln {
    ($out:expr) => {{ let _ = writeln!($out); }};
    ($out:expr, $($arg:tt)*) => {{ let _ = writeln!($out, $($arg)*); }};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Ata,
    Atapi,
    CompactFlash,
}

// Word 0 bits.
const GC_NON_MAGNETIC: u16 = 0x8000;
const GC_REMOVABLE: u16 = 0x0080;
const GC_FIXED: u16 = 0x0040;
const GC_SOFT_SECTORED: u16 = 0x0004;
const GC_HARD_SECTORED: u16 = 0x0002;
const GC_NOT_MFM: u16 = 0x0008;
const GC_SPEED_UNDER_5MBS: u16 = 0x0100;
const GC_SPEED_5_TO_10MBS: u16 = 0x0200;
const GC_SPEED_OVER_10MBS: u16 = 0x0400;
const GC_LEGACY_SPEED_MASK: u16 =
    GC_SPEED_UNDER_5MBS | GC_SPEED_5_TO_10MBS | GC_SPEED_OVER_10MBS;

// Word 53 validity bits.
const VALID_CHS_CURRENT: u16 = 0x0001;
const VALID_WORDS_64_70: u16 = 0x0002;
const VALID_WORD_88: u16 = 0x0004;

// Word 49 bits.
const CAP_LBA: u16 = 0x0200;
const CAP_DMA: u16 = 0x0100;
const CAP_IORDY_SUPPORTED: u16 = 0x0800;
const CAP_IORDY_DISABLE: u16 = 0x0400;

pub fn device_class(id: &IdentifyDevice) -> DeviceClass {
    if id.general_configuration == GENERAL_CONFIG_CFA {
        DeviceClass::CompactFlash
    } else if id.general_configuration & GC_NON_MAGNETIC != 0 {
        DeviceClass::Atapi
    } else {
        DeviceClass::Ata
    }
}

pub struct LevelInfo {
    pub supported: Vec<AtaLevel>,
    pub min: AtaLevel,
    pub max: AtaLevel,
    pub inferred: bool,
}

/// Computes the supported standards set from word 80, or infers it from
/// legacy bits when the device is too old to report versions (word 80 is
/// all-zero or all-ones).
pub fn ata_levels(id: &IdentifyDevice, class: DeviceClass) -> LevelInfo {
    let mut supported = Vec::new();
    let mut inferred = false;

    if id.major_version == 0x0000 || id.major_version == 0xffff {
        inferred = true;
        // CFA devices postdate ATA-1/ATA-2; do not infer those for them.
        if class != DeviceClass::CompactFlash {
            if id.general_configuration & GC_LEGACY_SPEED_MASK != 0 {
                supported.push(AtaLevel::Ata1);
            }
            if id.valid_words & VALID_WORDS_64_70 != 0 {
                supported.push(AtaLevel::Ata2);
            }
        }
        match class {
            DeviceClass::Atapi => supported.push(AtaLevel::Ata4),
            DeviceClass::CompactFlash => supported.push(AtaLevel::Ata3),
            DeviceClass::Ata => {
                if supported.is_empty() {
                    supported.push(AtaLevel::Ata2);
                }
            }
        }
    } else {
        for level in AtaLevel::ALL {
            if id.major_version & level.major_version_bit() != 0 {
                supported.push(level);
            }
        }
        if supported.is_empty() {
            // Word 80 has only reserved bits set; treat as unreported.
            inferred = true;
            supported.push(AtaLevel::Ata2);
        }
    }

    let min = *supported.iter().min().unwrap_or(&AtaLevel::Ata2);
    let max = *supported.iter().max().unwrap_or(&AtaLevel::Ata2);
    LevelInfo { supported, min, max, inferred }
}

fn valid_word(value: u16) -> bool {
    value != 0x0000 && value != 0xffff
}

/// Words 83/84/86/87/119/120 carry a bit-14-set/bit-15-clear validity marker.
fn valid_marked_word(value: u16) -> bool {
    value & 0xc000 == 0x4000
}

/// Derives logical and physical sector sizes from word 106, defaulting both
/// to 512 bytes when the word's meaningful-bit pattern is absent.
pub fn sector_sizes(id: &IdentifyDevice) -> (u32, u64) {
    if !valid_marked_word(id.phys_log_sector_size) {
        return (512, 512);
    }
    let w = id.phys_log_sector_size;
    let logical = if w & 0x1000 != 0 && id.logical_sector_words > 255 {
        id.logical_sector_words * 2
    } else {
        512
    };
    let physical = if w & 0x2000 != 0 {
        logical as u64 * (1u64 << (w & 0x000f))
    } else {
        logical as u64
    };
    (logical, physical)
}

struct FlagRow {
    mask: u16,
    message: &'static str,
}

const fn row(mask: u16, message: &'static str) -> FlagRow {
    FlagRow { mask, message }
}

const COMMAND_SET1_ROWS: &[FlagRow] = &[
    row(0x8000, "NOP command"),
    row(0x4000, "READ BUFFER command"),
    row(0x2000, "WRITE BUFFER command"),
    row(0x0800, "Host Protected Area feature set"),
    row(0x0400, "DEVICE RESET command"),
    row(0x0200, "SERVICE interrupt"),
    row(0x0100, "release interrupt"),
    row(0x0080, "look-ahead"),
    row(0x0040, "write cache"),
    row(0x0020, "PACKET command feature set"),
    row(0x0010, "Power Management feature set"),
    row(0x0008, "Removable Media feature set"),
    row(0x0004, "Security Mode feature set"),
    row(0x0002, "SMART feature set"),
];

const COMMAND_SET2_ROWS: &[FlagRow] = &[
    row(0x2000, "FLUSH CACHE EXT command"),
    row(0x1000, "FLUSH CACHE command"),
    row(0x0800, "Device Configuration Overlay feature set"),
    row(0x0400, "48-bit Address feature set"),
    row(0x0200, "Automatic Acoustic Management feature set"),
    row(0x0100, "SET MAX security extension"),
    row(0x0040, "SET FEATURES required to spin up"),
    row(0x0020, "Power-Up In Standby feature set"),
    row(0x0010, "Removable Media Status Notification feature set"),
    row(0x0008, "Advanced Power Management feature set"),
    row(0x0004, "CFA feature set"),
    row(0x0002, "READ/WRITE DMA QUEUED commands"),
    row(0x0001, "DOWNLOAD MICROCODE command"),
];

const COMMAND_SET3_ROWS: &[FlagRow] = &[
    row(0x2000, "IDLE IMMEDIATE with UNLOAD feature"),
    row(0x0400, "URG bit for WRITE STREAM DMA EXT"),
    row(0x0200, "URG bit for READ STREAM DMA EXT"),
    row(0x0100, "64-bit World Wide Name"),
    row(0x0080, "WRITE DMA QUEUED FUA EXT command"),
    row(0x0040, "WRITE DMA/MULTIPLE FUA EXT commands"),
    row(0x0020, "General Purpose Logging feature set"),
    row(0x0010, "Streaming feature set"),
    row(0x0008, "Media Card Pass Through Command feature set"),
    row(0x0004, "Media serial number"),
    row(0x0002, "SMART self-test"),
    row(0x0001, "SMART error logging"),
];

const COMMAND_SET4_ROWS: &[FlagRow] = &[
    row(0x0200, "DSN feature set"),
    row(0x0100, "Accessible Max Address Configuration feature set"),
    row(0x0080, "Extended Power Conditions feature set"),
    row(0x0040, "Sense Data Reporting feature set"),
    row(0x0020, "Free-fall Control feature set"),
    row(0x0010, "DOWNLOAD MICROCODE with offsets"),
    row(0x0008, "READ/WRITE LOG DMA EXT commands"),
    row(0x0004, "WRITE UNCORRECTABLE EXT command"),
    row(0x0002, "Write/Read/Verify feature set"),
];

const SATA_CAPABILITY_ROWS: &[FlagRow] = &[
    row(0x0002, "SATA Gen1 signaling speed (1.5 Gb/s)"),
    row(0x0004, "SATA Gen2 signaling speed (3.0 Gb/s)"),
    row(0x0008, "SATA Gen3 signaling speed (6.0 Gb/s)"),
    row(0x0100, "Native Command Queuing"),
    row(0x0200, "receiving host-initiated power management requests"),
    row(0x0400, "Phy Event Counters"),
    row(0x0800, "unload while NCQ commands are outstanding"),
    row(0x1000, "NCQ priority information"),
    row(0x2000, "host automatic partial to slumber transitions"),
    row(0x4000, "device automatic partial to slumber transitions"),
    row(0x8000, "READ LOG DMA EXT as equivalent to READ LOG EXT"),
];

const SATA_FEATURE_ROWS: &[FlagRow] = &[
    row(0x0002, "non-zero buffer offsets"),
    row(0x0004, "DMA Setup auto-activation"),
    row(0x0008, "device-initiated power management"),
    row(0x0010, "in-order data delivery"),
    row(0x0040, "software settings preservation"),
];

fn render_flag_rows(out: &mut String, rows: &[FlagRow], supported: u16, enabled: Option<u16>) {
    for r in rows {
        if supported & r.mask == 0 {
            continue;
        }
        match enabled {
            Some(e) if e & r.mask != 0 => outln!(out, "   {} (enabled)", r.message),
            Some(_) => outln!(out, "   {}", r.message),
            None => outln!(out, "   {}", r.message),
        }
    }
}

fn render_dma_word(out: &mut String, label: &str, word: u16) {
    let supported = word & 0x00ff;
    let active = word >> 8;
    if supported == 0 {
        return;
    }
    let mut modes = String::new();
    for n in 0..8 {
        if supported & (1 << n) != 0 {
            let _ = write!(modes, " {}", n);
        }
    }
    let mut active_s = String::new();
    for n in 0..8 {
        if active & (1 << n) != 0 {
            let _ = write!(active_s, " {}", n);
        }
    }
    if active_s.is_empty() {
        outln!(out, "{} modes supported:{}", label, modes);
    } else {
        outln!(out, "{} modes supported:{}; active:{}", label, modes, active_s);
    }
}

fn render_versions(out: &mut String, id: &IdentifyDevice, levels: &LevelInfo) {
    let tokens: Vec<String> = levels.supported.iter().map(|l| l.to_string()).collect();
    if levels.inferred {
        outln!(out, "Supported ATA versions (inferred): {}", tokens.join(" "));
    } else {
        outln!(out, "Supported ATA versions: {}", tokens.join(" "));
    }
    outln!(out, "Maximum supported ATA version: {}", levels.max);

    if levels.max.ordinal() >= 3 && valid_word(id.minor_version) {
        outln!(out, "Specification revision: {}", tables::minor_version_str(id.minor_version));
    }

    if valid_word(id.transport_major_version) {
        let ttype = tables::transport_type_str(id.transport_major_version);
        let mut revs = String::new();
        if id.transport_major_version >> 12 == 0x1 {
            for (mask, name) in tables::SATA_TRANSPORT_REVISIONS {
                if id.transport_major_version & mask != 0 {
                    let _ = write!(revs, " {}", name);
                }
            }
        }
        if revs.is_empty() {
            outln!(out, "Transport: {}", ttype);
        } else {
            outln!(out, "Transport: {}, supports{}", ttype, revs);
        }
    }
}

fn render_atapi(out: &mut String, id: &IdentifyDevice) {
    let ptype = (id.general_configuration >> 8) & 0x1f;
    outln!(out, "ATAPI device type: {}", peripheral_device_type_str(ptype as u8));
    outln!(out, "{}", tables::drq_timing_str((id.general_configuration >> 5) & 3));
    match id.general_configuration & 0x0003 {
        0 => outln!(out, "PACKET commands are 12 bytes long"),
        1 => outln!(out, "PACKET commands are 16 bytes long"),
        n => outln!(out, "Unknown PACKET command size code {}", n),
    }
}

fn render_media_bits(out: &mut String, id: &IdentifyDevice, levels: &LevelInfo) {
    if levels.min.ordinal() <= 5 {
        if id.general_configuration & GC_REMOVABLE != 0 {
            outln!(out, "Device is removable");
        }
        if id.general_configuration & GC_FIXED != 0 {
            outln!(out, "Device is fixed");
        }
    }
    // Legacy encoding/speed bits only mean anything on ATA-1 devices.
    if levels.max == AtaLevel::Ata1 {
        if id.general_configuration & GC_SOFT_SECTORED != 0 {
            outln!(out, "Device is soft sectored");
        }
        if id.general_configuration & GC_HARD_SECTORED != 0 {
            outln!(out, "Device is hard sectored");
        }
        if id.general_configuration & GC_NOT_MFM != 0 {
            outln!(out, "Device is not MFM encoded");
        }
        if id.general_configuration & GC_SPEED_UNDER_5MBS != 0 {
            outln!(out, "Transfer rate is <= 5 Mb/s");
        }
        if id.general_configuration & GC_SPEED_5_TO_10MBS != 0 {
            outln!(out, "Transfer rate is > 5 Mb/s but <= 10 Mb/s");
        }
        if id.general_configuration & GC_SPEED_OVER_10MBS != 0 {
            outln!(out, "Transfer rate is > 10 Mb/s");
        }
    }
}

fn render_rotation(out: &mut String, id: &IdentifyDevice) {
    match id.nominal_rotation_rate {
        0x0000 | 0xffff => {}
        0x0001 => outln!(out, "Device does not rotate (solid state)"),
        rpm => outln!(out, "Nominal rotation rate: {} rpm", rpm),
    }
    if valid_word(id.form_factor) {
        let ff = match id.form_factor & 0x000f {
            1 => "5.25\"".to_string(),
            2 => "3.5\"".to_string(),
            3 => "2.5\"".to_string(),
            4 => "1.8\"".to_string(),
            5 => "less than 1.8\"".to_string(),
            n => format!("unknown code {}", n),
        };
        outln!(out, "Nominal form factor: {}", ff);
    }
}

fn render_capacities(out: &mut String, id: &IdentifyDevice, levels: &LevelInfo, logical: u32) {
    if levels.min.ordinal() <= 5 {
        let (c, h, s) = if id.valid_words & VALID_CHS_CURRENT != 0 {
            (id.current_cylinders, id.current_heads, id.current_sectors)
        } else {
            (id.cylinders, id.heads, id.sectors_per_track)
        };
        if c != 0 && h != 0 && s != 0 {
            let sectors = c as u64 * h as u64 * s as u64;
            outln!(
                out,
                "CHS geometry: {} cylinders, {} heads, {} sectors ({} sectors, {})",
                c,
                h,
                s,
                sectors,
                util::format_capacity(sectors * logical as u64)
            );
        }
    }

    if id.capabilities1 & CAP_LBA != 0 && id.lba_sectors != 0 {
        outln!(
            out,
            "28-bit LBA: {} sectors ({})",
            id.lba_sectors,
            util::format_capacity(id.lba_sectors as u64 * logical as u64)
        );
    }

    if id.command_set2 & 0x0400 != 0 {
        // Prefer the ACS extended count when its support bit is set.
        let sectors = if id.additional_supported & 0x0008 != 0 && id.extended_user_sectors != 0 {
            id.extended_user_sectors
        } else {
            id.lba48_sectors
        };
        if sectors != 0 {
            outln!(
                out,
                "48-bit LBA: {} sectors ({})",
                sectors,
                util::format_capacity(sectors * logical as u64)
            );
        }
    }
}

fn render_timings(out: &mut String, id: &IdentifyDevice) {
    if valid_word(id.pio_transfer_timing) {
        outln!(out, "PIO transfer timing mode: {}", id.pio_transfer_timing >> 8);
    }
    if valid_word(id.dma_transfer_timing) {
        outln!(out, "DMA transfer timing mode: {}", id.dma_transfer_timing >> 8);
    }
    if id.valid_words & VALID_WORDS_64_70 != 0 {
        if id.advanced_pio & 0x00ff != 0 {
            let mut modes = String::new();
            for n in 0..8u16 {
                if id.advanced_pio & (1 << n) != 0 {
                    let _ = write!(modes, " PIO{}", n + 3);
                }
            }
            outln!(out, "Advanced PIO modes supported:{}", modes);
        }
        if id.min_mdma_cycle != 0 {
            outln!(out, "Minimum multi-word DMA cycle time: {} ns", id.min_mdma_cycle);
        }
        if id.recommended_mdma_cycle != 0 {
            outln!(out, "Recommended multi-word DMA cycle time: {} ns", id.recommended_mdma_cycle);
        }
        if id.min_pio_cycle != 0 {
            outln!(out, "Minimum PIO cycle time without flow control: {} ns", id.min_pio_cycle);
        }
        if id.min_pio_cycle_iordy != 0 {
            outln!(out, "Minimum PIO cycle time with IORDY: {} ns", id.min_pio_cycle_iordy);
        }
    }
    render_dma_word(out, "Single-word DMA", id.singleword_dma);
    render_dma_word(out, "Multi-word DMA", id.multiword_dma);
    if id.valid_words & VALID_WORD_88 != 0 {
        render_dma_word(out, "Ultra DMA", id.udma_modes);
    }
    if id.capabilities1 & CAP_DMA != 0 {
        outln!(out, "Device supports DMA");
    }
    if id.capabilities1 & CAP_IORDY_SUPPORTED != 0 {
        if id.capabilities1 & CAP_IORDY_DISABLE != 0 {
            outln!(out, "IORDY is supported and can be disabled");
        } else {
            outln!(out, "IORDY is supported");
        }
    }
}

fn render_sata(out: &mut String, id: &IdentifyDevice) {
    if !valid_word(id.sata_capabilities) {
        return;
    }
    outln!(out, "SATA capabilities:");
    render_flag_rows(out, SATA_CAPABILITY_ROWS, id.sata_capabilities, None);
    if valid_word(id.sata_features_supported) {
        outln!(out, "SATA features:");
        render_flag_rows(
            out,
            SATA_FEATURE_ROWS,
            id.sata_features_supported,
            Some(id.sata_features_enabled),
        );
    }
    if id.queue_depth & 0x001f != 0 {
        outln!(out, "Maximum queue depth: {} commands", (id.queue_depth & 0x001f) + 1);
    }
}

fn render_command_sets(out: &mut String, id: &IdentifyDevice) {
    let cs1 = valid_word(id.command_set1);
    let cs2 = valid_marked_word(id.command_set2);
    let cs3 = valid_marked_word(id.command_set3);
    let cs4 = valid_marked_word(id.command_set4);
    if !(cs1 || cs2 || cs3 || cs4) {
        return;
    }
    outln!(out, "Command sets and features:");
    if cs1 {
        let enabled = valid_word(id.enabled_command_set1).then_some(id.enabled_command_set1);
        render_flag_rows(out, COMMAND_SET1_ROWS, id.command_set1, enabled);
    }
    if cs2 {
        let enabled =
            valid_marked_word(id.enabled_command_set2).then_some(id.enabled_command_set2);
        render_flag_rows(out, COMMAND_SET2_ROWS, id.command_set2, enabled);
    }
    if cs3 {
        let enabled =
            valid_marked_word(id.enabled_command_set3).then_some(id.enabled_command_set3);
        render_flag_rows(out, COMMAND_SET3_ROWS, id.command_set3, enabled);
    }
    if cs4 {
        let enabled =
            valid_marked_word(id.enabled_command_set4).then_some(id.enabled_command_set4);
        render_flag_rows(out, COMMAND_SET4_ROWS, id.command_set4, enabled);
    }
    if cs3 && id.command_set3 & 0x0004 != 0 && !id.media_serial.is_empty() {
        outln!(out, "Media serial number: {}", id.media_serial);
    }
    if cs3 && id.command_set3 & 0x0100 != 0 && id.wwn != 0 {
        outln!(out, "World Wide Name: {:016x}", id.wwn);
    }
}

fn render_security(out: &mut String, id: &IdentifyDevice) {
    if !valid_word(id.security_status) || id.security_status & 0x0001 == 0 {
        return;
    }
    outln!(out, "Security:");
    outln!(out, "   Security Mode feature set is supported");
    if id.security_status & 0x0002 != 0 {
        outln!(out, "   Security is enabled");
    }
    if id.security_status & 0x0004 != 0 {
        outln!(out, "   Security is locked");
    }
    if id.security_status & 0x0008 != 0 {
        outln!(out, "   Security is frozen");
    }
    if id.security_status & 0x0010 != 0 {
        outln!(out, "   Security count has expired");
    }
    if id.security_status & 0x0020 != 0 {
        outln!(out, "   Enhanced security erase is supported");
    }
    match id.security_status & 0x0100 {
        0 => outln!(out, "   Master password capability: high"),
        _ => outln!(out, "   Master password capability: maximum"),
    }
    if valid_word(id.master_password_revision) {
        outln!(out, "   Master password revision code: {}", id.master_password_revision);
    }
    if id.security_erase_time != 0 {
        outln!(out, "   Security erase time: {} minutes", (id.security_erase_time & 0x7fff) * 2);
    }
    if id.enhanced_security_erase_time != 0 {
        outln!(
            out,
            "   Enhanced security erase time: {} minutes",
            (id.enhanced_security_erase_time & 0x7fff) * 2
        );
    }
}

fn render_streaming(out: &mut String, id: &IdentifyDevice) {
    if !valid_marked_word(id.command_set3) || id.command_set3 & 0x0010 == 0 {
        return;
    }
    outln!(out, "Streaming:");
    if id.stream_min_request_size != 0 {
        outln!(out, "   Minimum request size: {} sectors", id.stream_min_request_size);
    }
    if id.stream_transfer_time_dma != 0 {
        outln!(out, "   Transfer time (DMA): {}", id.stream_transfer_time_dma);
    }
    if id.stream_transfer_time_pio != 0 {
        outln!(out, "   Transfer time (PIO): {}", id.stream_transfer_time_pio);
    }
    if id.stream_access_latency != 0 {
        outln!(out, "   Access latency: {}", id.stream_access_latency);
    }
    if id.stream_performance_granularity != 0 {
        outln!(out, "   Performance granularity: {}", id.stream_performance_granularity);
    }
}

fn render_sct(out: &mut String, id: &IdentifyDevice) {
    if id.sct_command_transport & 0x0001 == 0 {
        return;
    }
    outln!(out, "SCT Command Transport is supported");
    if id.sct_command_transport & 0x0004 != 0 {
        outln!(out, "   SCT Write Same is supported");
    }
    if id.sct_command_transport & 0x0008 != 0 {
        outln!(out, "   SCT Error Recovery Control is supported");
    }
    if id.sct_command_transport & 0x0010 != 0 {
        outln!(out, "   SCT Features Control is supported");
    }
    if id.sct_command_transport & 0x0020 != 0 {
        outln!(out, "   SCT Data Tables are supported");
    }
}

fn render_nv_cache(out: &mut String, id: &IdentifyDevice, logical: u32) {
    if !valid_word(id.nv_cache_capabilities) {
        return;
    }
    if id.nv_cache_capabilities & 0x0010 != 0 {
        outln!(out, "Non-volatile cache feature set is supported");
        if id.nv_cache_size != 0 {
            outln!(
                out,
                "   Non-volatile cache size: {} blocks ({})",
                id.nv_cache_size,
                util::format_capacity(id.nv_cache_size as u64 * logical as u64)
            );
        }
    }
    if id.nv_cache_capabilities & 0x0001 != 0 {
        if id.nv_cache_capabilities & 0x0002 != 0 {
            outln!(out, "Non-volatile cache power mode is supported and enabled");
        } else {
            outln!(out, "Non-volatile cache power mode is supported");
        }
    }
}

fn render_buffer(out: &mut String, id: &IdentifyDevice) {
    if valid_word(id.buffer_type) {
        let t = match id.buffer_type {
            1 => "single ported single sector".to_string(),
            2 => "dual ported multi sector".to_string(),
            3 => "dual ported multi sector with read caching".to_string(),
            n => format!("unknown code {}", n),
        };
        outln!(out, "Buffer type: {}", t);
    }
    if valid_word(id.buffer_size) {
        outln!(out, "Buffer size: {} bytes", id.buffer_size as u32 * 512);
    }
    if valid_word(id.ecc_bytes) {
        outln!(out, "READ/WRITE LONG ECC bytes: {}", id.ecc_bytes);
    }
}

// Words with no named field; dumped at debug level when they carry a value
// that differs from both "not reported" sentinels.
const UNUSED_WORD_RANGES: &[(usize, usize)] = &[
    (9, 9),
    (47, 47),
    (51, 52),
    (64, 64),
    (70, 70),
    (73, 74),
    (116, 116),
    (121, 128),
    (129, 159),
    (161, 175),
    (207, 208),
    (219, 221),
    (224, 255),
];

fn debug_dump_unused(id: &IdentifyDevice) {
    for &(first, last) in UNUSED_WORD_RANGES {
        for word in first..=last {
            let v = id.words[word];
            if v != 0x0000 && v != 0xffff {
                log::debug!("identify word {}: 0x{:04x}", word, v);
            }
        }
    }
}

pub fn render_identify(id: &IdentifyDevice) -> String {
    let mut out = String::new();
    let class = device_class(id);
    let levels = ata_levels(id, class);
    let (logical, physical) = sector_sizes(id);

    match class {
        DeviceClass::Ata => outln!(out, "ATA device"),
        DeviceClass::Atapi => outln!(out, "ATAPI device"),
        DeviceClass::CompactFlash => outln!(out, "CompactFlash device"),
    }
    if !id.model.is_empty() {
        outln!(out, "Model: {}", id.model);
    }
    if !id.serial_number.is_empty() {
        outln!(out, "Serial number: {}", id.serial_number);
    }
    if !id.firmware_revision.is_empty() {
        outln!(out, "Firmware revision: {}", id.firmware_revision);
    }

    render_versions(&mut out, id, &levels);
    if class == DeviceClass::Atapi {
        render_atapi(&mut out, id);
    } else {
        render_media_bits(&mut out, id, &levels);
    }
    render_rotation(&mut out, id);
    outln!(out, "Logical sector size: {} bytes", logical);
    if physical != logical as u64 {
        outln!(out, "Physical sector size: {} bytes", physical);
    }
    render_capacities(&mut out, id, &levels, logical);
    render_buffer(&mut out, id);
    render_timings(&mut out, id);
    render_sata(&mut out, id);
    render_command_sets(&mut out, id);
    render_security(&mut out, id);
    render_streaming(&mut out, id);
    render_sct(&mut out, id);
    render_nv_cache(&mut out, id, logical);

    debug_dump_unused(id);
    out
}
