/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
pub mod identify;
pub mod report;
pub mod tables;

pub use identify::{decode_identify, IdentifyDevice};
pub use report::render_identify;
