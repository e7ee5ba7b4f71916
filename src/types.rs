/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use thiserror::Error;

/// Size of a cooked ISO 9660 data sector.
pub const SECTOR_SIZE: usize = 2048;
/// Mode 2 formless sector as delivered by some drives/images.
pub const SECTOR_SIZE_MODE2: usize = 2336;
/// Full raw CD sector including sync and header.
pub const SECTOR_SIZE_RAW: usize = 2352;

/// An ATA IDENTIFY (PACKET) DEVICE response is always 256 words.
pub const IDENTIFY_SIZE: usize = 512;

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("buffer truncated: need {need} bytes at offset {offset}, have {have}")]
    TruncatedBuffer { offset: usize, need: usize, have: usize },

    #[error("no filesystem mounted")]
    NotMounted,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no such file or directory: {0}")]
    NoSuchFile(String),

    #[error("is a directory: {0}")]
    IsDirectory(String),

    #[error("not a directory: {0}")]
    NotDirectory(String),

    #[error("no such extended attribute: {0}")]
    NoSuchExtendedAttribute(String),

    #[error("no primary volume descriptor found")]
    NoPrimaryDescriptor,

    #[error("path table corrupt at entry {0}")]
    CorruptPathTable(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
