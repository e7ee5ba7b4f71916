/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Sector payload extraction. Raw CD dumps wrap the 2048-byte user data in
//! sync, header, subheader and error correction fields; the filesystem
//! layer only ever wants the user data. Unwrapping keys off the stored
//! sector length and the header mode byte, never off file extensions.

use crate::types::{SECTOR_SIZE, SECTOR_SIZE_MODE2, SECTOR_SIZE_RAW};

const SYNC_PATTERN: [u8; 12] =
    [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];

/// Mode 2 subheader submode bit marking a Form 2 sector.
const SUBMODE_FORM2: u8 = 0x20;

/// Extracts the user data from a stored sector.
///
/// - 2048 bytes: already user data, returned as-is.
/// - 2352 bytes: full raw sector; the mode byte after the sync pattern
///   selects Mode 1 (2048 bytes at offset 16) or Mode 2, where the
///   subheader submode picks Form 1 (2048 at offset 24) or Form 2 (2324
///   at offset 24).
/// - 2336 bytes: Mode 2 without sync/header; the subheader sits at offset
///   0 and the same form split applies.
///
/// Anything unrecognized is passed through untouched so a caller can still
/// look at the bytes.
pub fn unwrap_user_data(sector: &[u8]) -> &[u8] {
    match sector.len() {
        SECTOR_SIZE => sector,
        SECTOR_SIZE_RAW => {
            if sector[..12] != SYNC_PATTERN {
                log::debug!("raw sector without sync pattern, passing through");
                return sector;
            }
            match sector[15] {
                1 => &sector[16..16 + SECTOR_SIZE],
                2 => {
                    // Subheader is stored twice; byte 2 is the submode.
                    if sector[18] & SUBMODE_FORM2 != 0 {
                        &sector[24..2348]
                    } else {
                        &sector[24..24 + SECTOR_SIZE]
                    }
                }
                mode => {
                    log::debug!("raw sector with unknown mode {}, passing through", mode);
                    sector
                }
            }
        }
        SECTOR_SIZE_MODE2 => {
            if sector[2] & SUBMODE_FORM2 != 0 {
                &sector[8..2332]
            } else {
                &sector[8..8 + SECTOR_SIZE]
            }
        }
        _ => sector,
    }
}
