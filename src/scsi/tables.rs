/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Flat code-to-meaning tables. Medium and density codes are reused across
//! device classes with unrelated meanings, so those lookups take the class
//! as context. Unknown codes always render as text, never panic.

/// SCSI peripheral device types per SPC-5. Also consumed by the ATA report
/// for the ATAPI device-type field.
pub fn peripheral_device_type_str(code: u8) -> String {
    match code {
        0x00 => "Direct-access device".to_string(),
        0x01 => "Sequential-access device".to_string(),
        0x02 => "Printer device".to_string(),
        0x03 => "Processor device".to_string(),
        0x04 => "Write-once device".to_string(),
        0x05 => "CD-ROM/DVD device".to_string(),
        0x06 => "Scanner device".to_string(),
        0x07 => "Optical memory device".to_string(),
        0x08 => "Medium changer device".to_string(),
        0x09 => "Communications device".to_string(),
        0x0a | 0x0b => "Graphics arts pre-press device".to_string(),
        0x0c => "Storage array controller device".to_string(),
        0x0d => "Enclosure services device".to_string(),
        0x0e => "Simplified direct-access device".to_string(),
        0x0f => "Optical card reader/writer device".to_string(),
        0x10 => "Bridging expander".to_string(),
        0x11 => "Object-based storage device".to_string(),
        0x12 => "Automation/drive interface".to_string(),
        0x13 => "Security manager device".to_string(),
        0x14 => "Host managed zoned block device".to_string(),
        0x1e => "Well known logical unit".to_string(),
        0x1f => "Unknown or no device type".to_string(),
        n => format!("unknown code {}", n),
    }
}

/// Device-class context for medium/density lookups; the same code value
/// means different things per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClassContext {
    DirectAccess,
    Sequential,
    Optical,
    Multimedia,
}

impl DeviceClassContext {
    pub fn from_peripheral_type(code: u8) -> DeviceClassContext {
        match code {
            0x01 => DeviceClassContext::Sequential,
            0x04 | 0x07 | 0x0f => DeviceClassContext::Optical,
            0x05 => DeviceClassContext::Multimedia,
            _ => DeviceClassContext::DirectAccess,
        }
    }
}

pub fn medium_type_str(class: DeviceClassContext, code: u8) -> String {
    use DeviceClassContext::*;
    match (class, code) {
        (_, 0x00) => "Default medium type".to_string(),

        (DirectAccess, 0x01) => "Flexible disk, single-sided, unspecified medium".to_string(),
        (DirectAccess, 0x02) => "Flexible disk, double-sided, unspecified medium".to_string(),
        (DirectAccess, 0x05) => "Flexible disk, single-sided, 200mm, 48 tpi".to_string(),
        (DirectAccess, 0x06) => "Flexible disk, double-sided, 200mm, 48 tpi".to_string(),
        (DirectAccess, 0x09) => "Flexible disk, single-sided, 130mm, 48 tpi".to_string(),
        (DirectAccess, 0x0a) => "Flexible disk, double-sided, 130mm, 48 tpi".to_string(),
        (DirectAccess, 0x0d) => "Flexible disk, single-sided, 130mm, 96 tpi".to_string(),
        (DirectAccess, 0x0e) => "Flexible disk, double-sided, 130mm, 96 tpi".to_string(),
        (DirectAccess, 0x12) => "Flexible disk, double-sided, 90mm, 135 tpi".to_string(),
        (DirectAccess, 0x16) => "Flexible disk, double-sided, 90mm, high density".to_string(),
        (DirectAccess, 0x1a) => "Flexible disk, double-sided, 90mm, extra density".to_string(),

        (Sequential, 0x01) => "Tape, 12.7mm, 9 tracks".to_string(),
        (Sequential, 0x02) => "Tape, 12.7mm, 9 tracks, 1600 bpi".to_string(),
        (Sequential, 0x03) => "Tape, 12.7mm, 9 tracks, 6250 bpi".to_string(),
        (Sequential, 0x40) => "Tape, DDS".to_string(),
        (Sequential, 0x44) => "Tape, DDS-2".to_string(),
        (Sequential, 0x45) => "Tape, DDS-3".to_string(),
        (Sequential, 0x46) => "Tape, DDS-4".to_string(),

        (Optical, 0x01) => "Optical, read-only medium".to_string(),
        (Optical, 0x02) => "Optical, write-once medium".to_string(),
        (Optical, 0x03) => "Optical, erasable medium".to_string(),
        (Optical, 0x04) => "Optical, combination read-only/write-once medium".to_string(),
        (Optical, 0x05) => "Optical, combination read-only/erasable medium".to_string(),
        (Optical, 0x06) => "Optical, combination write-once/erasable medium".to_string(),

        (Multimedia, 0x01) => "120mm CD-ROM, data only".to_string(),
        (Multimedia, 0x02) => "120mm CD, audio only".to_string(),
        (Multimedia, 0x03) => "120mm CD, data and audio".to_string(),
        (Multimedia, 0x04) => "120mm CD, photo CD".to_string(),
        (Multimedia, 0x05) => "80mm CD-ROM, data only".to_string(),
        (Multimedia, 0x06) => "80mm CD, audio only".to_string(),
        (Multimedia, 0x07) => "80mm CD, data and audio".to_string(),
        (Multimedia, 0x80) => "CD-R, 120mm, data only".to_string(),
        (Multimedia, 0x81) => "CD-R, 120mm, audio only".to_string(),

        (_, n) => format!("unknown code {}", n),
    }
}

pub fn density_type_str(class: DeviceClassContext, code: u8) -> String {
    use DeviceClassContext::*;
    match (class, code) {
        (_, 0x00) => "Default density".to_string(),

        (DirectAccess, 0x01) => "Flexible disk, single density".to_string(),
        (DirectAccess, 0x02) => "Flexible disk, double density".to_string(),

        (Sequential, 0x01) => "9-track, 12.7mm, 800 bpi".to_string(),
        (Sequential, 0x02) => "9-track, 12.7mm, 1600 bpi".to_string(),
        (Sequential, 0x03) => "9-track, 12.7mm, 6250 bpi".to_string(),
        (Sequential, 0x07) => "4-track, 6.3mm, 6400 bpi".to_string(),
        (Sequential, 0x09) => "18-track, 12.7mm, 37871 bpi".to_string(),
        (Sequential, 0x0b) => "4-track, 6.3mm, 1600 bpi".to_string(),
        (Sequential, 0x13) => "DDS".to_string(),
        (Sequential, 0x24) => "DDS-2".to_string(),
        (Sequential, 0x25) => "DDS-3".to_string(),
        (Sequential, 0x26) => "DDS-4".to_string(),
        (Sequential, 0x40) => "LTO-1".to_string(),
        (Sequential, 0x42) => "LTO-2".to_string(),
        (Sequential, 0x44) => "LTO-3".to_string(),
        (Sequential, 0x46) => "LTO-4".to_string(),
        (Sequential, 0x58) => "LTO-5".to_string(),
        (Sequential, 0x5a) => "LTO-6".to_string(),

        (Optical, 0x01) => "86mm read-only optical".to_string(),
        (Optical, 0x02) => "89mm read-only optical".to_string(),
        (Optical, 0x03) => "130mm read-only optical".to_string(),
        (Optical, 0x04) => "300mm read-only optical".to_string(),
        (Optical, 0x05) => "86mm write-once optical".to_string(),
        (Optical, 0x06) => "89mm write-once optical".to_string(),
        (Optical, 0x07) => "130mm write-once optical".to_string(),
        (Optical, 0x08) => "300mm write-once optical".to_string(),
        (Optical, 0x09) => "86mm erasable optical".to_string(),
        (Optical, 0x0a) => "89mm erasable optical".to_string(),
        (Optical, 0x0b) => "130mm erasable optical".to_string(),
        (Optical, 0x0c) => "300mm erasable optical".to_string(),

        (Multimedia, 0x01) => "User data only".to_string(),
        (Multimedia, 0x02) => "User data plus auxiliary data".to_string(),
        (Multimedia, 0x03) => "4-byte tag, user data plus auxiliary data".to_string(),
        (Multimedia, 0x04) => "Audio information only".to_string(),

        (_, n) => format!("unknown code {}", n),
    }
}
