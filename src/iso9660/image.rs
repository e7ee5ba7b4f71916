/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! The sector source collaborator. Sources hand back raw sector payloads
//! exactly as stored (2048, 2336 or 2352 bytes); normalizing those shapes
//! is the filesystem layer's job, never the source's.

use std::io::{Read, Seek, SeekFrom};

use crate::types::{Error, Result, SECTOR_SIZE, SECTOR_SIZE_MODE2, SECTOR_SIZE_RAW};

pub trait SectorSource {
    fn read_sector(&mut self, lba: u64) -> Result<Vec<u8>>;

    fn read_sectors(&mut self, lba: u64, count: u32) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        for n in 0..count {
            data.extend_from_slice(&self.read_sector(lba + n as u64)?);
        }
        Ok(data)
    }

    /// Stored sector size; used by the filesystem layer to pick the unwrap.
    fn sector_size(&self) -> usize;
}

/// A flat image backed by anything seekable: a plain .iso (2048 bytes per
/// sector), a Mode 2 dump (2336) or a raw .bin (2352).
pub struct RawImage<T: Read + Seek> {
    inner: T,
    sector_size: usize,
}

impl<T: Read + Seek> RawImage<T> {
    pub fn new(inner: T, sector_size: usize) -> Result<RawImage<T>> {
        match sector_size {
            SECTOR_SIZE | SECTOR_SIZE_MODE2 | SECTOR_SIZE_RAW => {
                Ok(RawImage { inner, sector_size })
            }
            n => Err(Error::InvalidArgument(format!("unsupported sector size {}", n))),
        }
    }
}

impl<T: Read + Seek> SectorSource for RawImage<T> {
    fn read_sector(&mut self, lba: u64) -> Result<Vec<u8>> {
        self.inner.seek(SeekFrom::Start(lba * self.sector_size as u64))?;
        let mut sector = vec![0u8; self.sector_size];
        self.inner.read_exact(&mut sector)?;
        Ok(sector)
    }

    fn sector_size(&self) -> usize {
        self.sector_size
    }
}
