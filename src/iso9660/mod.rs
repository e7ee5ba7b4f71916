/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
pub mod directory;
pub mod image;
pub mod sector;
pub mod session;
pub mod types;
pub mod volume;

pub use image::{RawImage, SectorSource};
pub use session::{mount, MountOptions, Namespace, Session};
