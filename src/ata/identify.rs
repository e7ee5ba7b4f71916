/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! IDENTIFY (PACKET) DEVICE response decoding. The response carries no
//! self-describing length or signature, so the only structural check
//! possible is the 512-byte length; everything else is "trust the offset".

use std::fmt;

use crate::types::IDENTIFY_SIZE;
use crate::util;

// Word 0 sentinel marking a CompactFlash Association device.
pub const GENERAL_CONFIG_CFA: u16 = 0x848a;

#[derive(Clone)]
pub struct IdentifyDevice {
    /// Raw word copy, little-endian decoded. Kept for the debug dump of
    /// reserved/vendor words and for embedding checks.
    pub words: [u16; 256],

    pub general_configuration: u16,
    pub cylinders: u16,
    pub specific_configuration: u16,
    pub heads: u16,
    pub sectors_per_track: u16,
    pub serial_number: String,
    pub buffer_type: u16,
    pub buffer_size: u16,
    pub ecc_bytes: u16,
    pub firmware_revision: String,
    pub model: String,
    pub multiple_max_sectors: u16,
    pub capabilities1: u16,
    pub capabilities2: u16,
    pub pio_transfer_timing: u16,
    pub dma_transfer_timing: u16,
    pub valid_words: u16,
    pub current_cylinders: u16,
    pub current_heads: u16,
    pub current_sectors: u16,
    pub current_capacity: u32,
    pub multiple_sector_number: u16,
    pub lba_sectors: u32,
    pub singleword_dma: u16,
    pub multiword_dma: u16,
    pub advanced_pio: u16,
    pub min_mdma_cycle: u16,
    pub recommended_mdma_cycle: u16,
    pub min_pio_cycle: u16,
    pub min_pio_cycle_iordy: u16,
    pub additional_supported: u16,
    pub packet_bus_release: u16,
    pub service_busy_clear: u16,
    pub queue_depth: u16,
    pub sata_capabilities: u16,
    pub sata_capabilities2: u16,
    pub sata_features_supported: u16,
    pub sata_features_enabled: u16,
    pub major_version: u16,
    pub minor_version: u16,
    pub command_set1: u16,
    pub command_set2: u16,
    pub command_set3: u16,
    pub enabled_command_set1: u16,
    pub enabled_command_set2: u16,
    pub enabled_command_set3: u16,
    pub udma_modes: u16,
    pub security_erase_time: u16,
    pub enhanced_security_erase_time: u16,
    pub current_apm: u16,
    pub master_password_revision: u16,
    pub hardware_reset_result: u16,
    pub current_acoustic: u8,
    pub recommended_acoustic: u8,
    pub stream_min_request_size: u16,
    pub stream_transfer_time_dma: u16,
    pub stream_access_latency: u16,
    pub stream_performance_granularity: u32,
    pub lba48_sectors: u64,
    pub stream_transfer_time_pio: u16,
    pub max_dsm_blocks: u16,
    pub phys_log_sector_size: u16,
    pub interseek_delay: u16,
    pub wwn: u64,
    pub logical_sector_words: u32,
    pub command_set4: u16,
    pub enabled_command_set4: u16,
    pub removable_status: u16,
    pub security_status: u16,
    pub cfa_power_mode: u16,
    pub form_factor: u16,
    pub data_set_management: u16,
    pub media_serial: String,
    pub sct_command_transport: u16,
    pub logical_alignment: u16,
    pub wrv_sector_count_mode3: u32,
    pub wrv_sector_count_mode2: u32,
    pub nv_cache_capabilities: u16,
    pub nv_cache_size: u32,
    pub nominal_rotation_rate: u16,
    pub nv_cache_options: u16,
    pub wrv_mode: u16,
    pub transport_major_version: u16,
    pub transport_minor_version: u16,
    pub extended_user_sectors: u64,
    pub min_microcode_blocks: u16,
    pub max_microcode_blocks: u16,
    pub integrity_word: u16,
}

impl fmt::Display for IdentifyDevice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "model \"{}\" serial \"{}\" firmware \"{}\"",
            self.model, self.serial_number, self.firmware_revision
        )
    }
}

pub fn decode_identify(buffer: &[u8]) -> Option<IdentifyDevice> {
    if buffer.len() != IDENTIFY_SIZE {
        return None;
    }

    let mut words = [0u16; 256];
    for (n, word) in words.iter_mut().enumerate() {
        *word = u16::from_le_bytes([buffer[n * 2], buffer[n * 2 + 1]]);
    }

    let u32_words = |lo: usize| (words[lo + 1] as u32) << 16 | words[lo] as u32;
    let u64_words = |lo: usize| {
        (words[lo + 3] as u64) << 48
            | (words[lo + 2] as u64) << 32
            | (words[lo + 1] as u64) << 16
            | words[lo] as u64
    };

    Some(IdentifyDevice {
        general_configuration: words[0],
        cylinders: words[1],
        specific_configuration: words[2],
        heads: words[3],
        sectors_per_track: words[6],
        serial_number: util::ata_string(&buffer[20..40]),
        buffer_type: words[20],
        buffer_size: words[21],
        ecc_bytes: words[22],
        firmware_revision: util::ata_string(&buffer[46..54]),
        model: util::ata_string(&buffer[54..94]),
        multiple_max_sectors: words[47],
        capabilities1: words[49],
        capabilities2: words[50],
        pio_transfer_timing: words[51],
        dma_transfer_timing: words[52],
        valid_words: words[53],
        current_cylinders: words[54],
        current_heads: words[55],
        current_sectors: words[56],
        current_capacity: u32_words(57),
        multiple_sector_number: words[59],
        lba_sectors: u32_words(60),
        singleword_dma: words[62],
        multiword_dma: words[63],
        advanced_pio: words[64],
        min_mdma_cycle: words[65],
        recommended_mdma_cycle: words[66],
        min_pio_cycle: words[67],
        min_pio_cycle_iordy: words[68],
        additional_supported: words[69],
        packet_bus_release: words[71],
        service_busy_clear: words[72],
        queue_depth: words[75],
        sata_capabilities: words[76],
        sata_capabilities2: words[77],
        sata_features_supported: words[78],
        sata_features_enabled: words[79],
        major_version: words[80],
        minor_version: words[81],
        command_set1: words[82],
        command_set2: words[83],
        command_set3: words[84],
        enabled_command_set1: words[85],
        enabled_command_set2: words[86],
        enabled_command_set3: words[87],
        udma_modes: words[88],
        security_erase_time: words[89],
        enhanced_security_erase_time: words[90],
        current_apm: words[91],
        master_password_revision: words[92],
        hardware_reset_result: words[93],
        current_acoustic: (words[94] & 0xff) as u8,
        recommended_acoustic: (words[94] >> 8) as u8,
        stream_min_request_size: words[95],
        stream_transfer_time_dma: words[96],
        stream_access_latency: words[97],
        stream_performance_granularity: u32_words(98),
        lba48_sectors: u64_words(100),
        stream_transfer_time_pio: words[104],
        max_dsm_blocks: words[105],
        phys_log_sector_size: words[106],
        interseek_delay: words[107],
        wwn: (words[108] as u64) << 48
            | (words[109] as u64) << 32
            | (words[110] as u64) << 16
            | words[111] as u64,
        logical_sector_words: u32_words(117),
        command_set4: words[119],
        enabled_command_set4: words[120],
        removable_status: words[127],
        security_status: words[128],
        cfa_power_mode: words[160],
        form_factor: words[168],
        data_set_management: words[169],
        media_serial: util::ata_string(&buffer[352..412]),
        sct_command_transport: words[206],
        logical_alignment: words[209],
        wrv_sector_count_mode3: u32_words(210),
        wrv_sector_count_mode2: u32_words(212),
        nv_cache_capabilities: words[214],
        nv_cache_size: (words[215] as u32) << 16 | words[216] as u32,
        nominal_rotation_rate: words[217],
        nv_cache_options: words[219],
        wrv_mode: words[220],
        transport_major_version: words[222],
        transport_minor_version: words[223],
        extended_user_sectors: u64_words(230),
        min_microcode_blocks: words[234],
        max_microcode_blocks: words[235],
        integrity_word: words[255],
        words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_word(buf: &mut [u8], word: usize, value: u16) {
        buf[word * 2..word * 2 + 2].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(decode_identify(&[0u8; 511]).is_none());
        assert!(decode_identify(&[0u8; 513]).is_none());
        assert!(decode_identify(&[]).is_none());
    }

    #[test]
    fn decodes_strings_and_geometry() {
        let mut buf = vec![0u8; IDENTIFY_SIZE];
        set_word(&mut buf, 1, 16383);
        set_word(&mut buf, 3, 16);
        set_word(&mut buf, 6, 63);
        // serial "SN12" in swapped pairs
        buf[20..24].copy_from_slice(b"NS21");
        // model "AB" swapped
        buf[54..56].copy_from_slice(b"BA");
        set_word(&mut buf, 60, 0x5678);
        set_word(&mut buf, 61, 0x1234);

        let id = decode_identify(&buf).unwrap();
        assert_eq!(id.cylinders, 16383);
        assert_eq!(id.heads, 16);
        assert_eq!(id.sectors_per_track, 63);
        assert_eq!(id.serial_number, "SN12");
        assert_eq!(id.model, "AB");
        assert_eq!(id.lba_sectors, 0x12345678);
    }

    #[test]
    fn decodes_lba48_and_wwn_word_order() {
        let mut buf = vec![0u8; IDENTIFY_SIZE];
        set_word(&mut buf, 100, 0x0001);
        set_word(&mut buf, 101, 0x0002);
        set_word(&mut buf, 108, 0x5000);
        set_word(&mut buf, 111, 0x0001);

        let id = decode_identify(&buf).unwrap();
        assert_eq!(id.lba48_sectors, 0x0002_0001);
        assert_eq!(id.wwn, 0x5000_0000_0000_0001);
    }
}
