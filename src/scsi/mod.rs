/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
pub mod evpd;
pub mod mode;
pub mod render;
pub mod tables;
pub mod vendor;

pub use vendor::VendorHint;

/// Tries every known VPD page decoder against a buffer and returns the
/// rendered text of the first that accepts it. Standard pages are tried
/// before the vendor candidates.
pub fn render_vpd(buffer: &[u8], hint: Option<VendorHint>) -> Option<String> {
    if let Some(page) = evpd::decode_page_00(buffer) {
        return Some(render::render_page_00(&page));
    }
    if let Some(page) = evpd::decode_page_80(buffer) {
        return Some(render::render_page_80(&page));
    }
    if let Some(page) = evpd::decode_page_81(buffer) {
        return Some(render::render_page_81(&page));
    }
    if let Some(page) = evpd::decode_page_82(buffer) {
        return Some(render::render_page_82(&page));
    }
    if let Some(page) = evpd::decode_page_83(buffer) {
        return Some(render::render_page_83(&page));
    }
    if let Some(page) = evpd::decode_page_84(buffer) {
        return Some(render::render_page_84(&page));
    }
    if let Some(page) = evpd::decode_page_85(buffer) {
        return Some(render::render_page_85(&page));
    }
    if let Some(page) = evpd::decode_page_86(buffer) {
        return Some(render::render_page_86(&page));
    }
    if let Some(page) = evpd::decode_page_89(buffer) {
        return Some(render::render_page_89(&page));
    }
    if let Some(page) = evpd::decode_page_b1(buffer) {
        return Some(render::render_page_b1(&page));
    }
    vendor::probe(buffer, hint)
}
