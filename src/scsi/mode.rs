/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! MODE SENSE(6) parameter data: the 4-byte header and the block
//! descriptors that follow it. Medium and density codes are looked up
//! through the class-scoped tables; any mode pages after the descriptors
//! are kept as opaque bytes.

use std::fmt::Write as _;

use crate::scsi::tables::{density_type_str, medium_type_str, DeviceClassContext};

macro_rules! outln {
    ($out:expr) => {{ let _ = writeln!($out); }};
    ($out:expr, $($arg:tt)*) => {{ let _ = writeln!($out, $($arg)*); }};
}

#[derive(Debug, Clone)]
pub struct BlockDescriptor {
    pub density_code: u8,
    pub number_of_blocks: u32,
    pub block_length: u32,
}

#[derive(Debug, Clone)]
pub struct ModeSense6 {
    pub medium_type: u8,
    pub device_specific: u8,
    pub descriptors: Vec<BlockDescriptor>,
    pub mode_page_bytes: usize,
}

/// Decodes MODE SENSE(6) parameter data. The mode data length byte counts
/// everything after itself, so it must equal the buffer length minus one.
pub fn decode_mode_sense6(buffer: &[u8]) -> Option<ModeSense6> {
    if buffer.len() < 4 {
        return None;
    }
    if buffer[0] as usize + 1 != buffer.len() {
        return None;
    }
    let descriptor_len = buffer[3] as usize;
    if descriptor_len % 8 != 0 || 4 + descriptor_len > buffer.len() {
        return None;
    }

    let mut descriptors = Vec::new();
    for chunk in buffer[4..4 + descriptor_len].chunks_exact(8) {
        descriptors.push(BlockDescriptor {
            density_code: chunk[0],
            number_of_blocks: u32::from_be_bytes([0, chunk[1], chunk[2], chunk[3]]),
            block_length: u32::from_be_bytes([0, chunk[5], chunk[6], chunk[7]]),
        });
    }
    Some(ModeSense6 {
        medium_type: buffer[1],
        device_specific: buffer[2],
        descriptors,
        mode_page_bytes: buffer.len() - 4 - descriptor_len,
    })
}

pub fn render_mode_sense6(page: &ModeSense6, class: DeviceClassContext) -> String {
    let mut out = String::new();
    outln!(out, "Medium type: {}", medium_type_str(class, page.medium_type));
    if page.device_specific != 0 {
        outln!(out, "Device specific parameter: {:#04x}", page.device_specific);
    }
    for descriptor in &page.descriptors {
        outln!(out, "Density: {}", density_type_str(class, descriptor.density_code));
        if descriptor.number_of_blocks != 0 {
            outln!(
                out,
                "  {} blocks of {} bytes",
                descriptor.number_of_blocks,
                descriptor.block_length
            );
        } else {
            outln!(out, "  all remaining blocks of {} bytes", descriptor.block_length);
        }
    }
    if page.mode_page_bytes != 0 {
        outln!(out, "Mode pages: {} bytes not decoded", page.mode_page_bytes);
    }
    out
}
