/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
pub mod types;
pub mod util;
pub mod reader;
pub mod ata;
pub mod scsi;
pub mod iso9660;
pub mod shell_cli;
