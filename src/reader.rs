/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Bounds-checked fixed-layout field extraction. Every decoder in the crate
//! goes through these helpers instead of overlaying structs on raw memory;
//! a short buffer yields `Error::TruncatedBuffer`, never an out-of-bounds
//! read.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::types::{Error, Result};

pub fn check(buf: &[u8], offset: usize, need: usize) -> Result<()> {
    if offset.checked_add(need).map_or(true, |end| end > buf.len()) {
        return Err(Error::TruncatedBuffer { offset, need, have: buf.len() });
    }
    Ok(())
}

pub fn bytes_at<'a>(buf: &'a [u8], offset: usize, len: usize) -> Result<&'a [u8]> {
    check(buf, offset, len)?;
    Ok(&buf[offset..offset + len])
}

pub fn u8_at(buf: &[u8], offset: usize) -> Result<u8> {
    check(buf, offset, 1)?;
    Ok(buf[offset])
}

pub fn u16_le_at(buf: &[u8], offset: usize) -> Result<u16> {
    check(buf, offset, 2)?;
    Ok(LittleEndian::read_u16(&buf[offset..]))
}

pub fn u16_be_at(buf: &[u8], offset: usize) -> Result<u16> {
    check(buf, offset, 2)?;
    Ok(BigEndian::read_u16(&buf[offset..]))
}

pub fn u32_le_at(buf: &[u8], offset: usize) -> Result<u32> {
    check(buf, offset, 4)?;
    Ok(LittleEndian::read_u32(&buf[offset..]))
}

pub fn u32_be_at(buf: &[u8], offset: usize) -> Result<u32> {
    check(buf, offset, 4)?;
    Ok(BigEndian::read_u32(&buf[offset..]))
}

pub fn u64_le_at(buf: &[u8], offset: usize) -> Result<u64> {
    check(buf, offset, 8)?;
    Ok(LittleEndian::read_u64(&buf[offset..]))
}

pub fn u64_be_at(buf: &[u8], offset: usize) -> Result<u64> {
    check(buf, offset, 8)?;
    Ok(BigEndian::read_u64(&buf[offset..]))
}

/// ISO 9660 "both byte orders" 16-bit field: LSB copy followed by MSB copy.
pub fn u16_lsb_msb_at(buf: &[u8], offset: usize) -> Result<u16> {
    check(buf, offset, 4)?;
    Ok(LittleEndian::read_u16(&buf[offset..]))
}

/// ISO 9660 "both byte orders" 32-bit field: LSB copy followed by MSB copy.
pub fn u32_lsb_msb_at(buf: &[u8], offset: usize) -> Result<u32> {
    check(buf, offset, 8)?;
    Ok(LittleEndian::read_u32(&buf[offset..]))
}
