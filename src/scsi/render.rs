/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Renderers over the decoded VPD pages. A renderer never fails on a
//! decoded value; enumerated codes outside the known tables render as
//! "unknown code {n}" text.

use std::fmt::Write as _;

use crate::ata;
use crate::scsi::evpd::*;
use crate::scsi::tables::peripheral_device_type_str;
use crate::util;

macro_rules! outln {
    ($out:expr) => {{ let _ = writeln!($out); }};
    ($out:expr, $($arg:tt)*) => {{ let _ = writeln!($out, $($arg)*); }};
}

fn render_header(out: &mut String, header: &PeripheralHeader) {
    outln!(out, "Device type: {}", peripheral_device_type_str(header.device_type));
    if header.qualifier != 0 {
        outln!(out, "Peripheral qualifier: {}", header.qualifier);
    }
}

pub fn render_page_00(page: &Page00) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "Supported VPD pages:");
    for code in &page.pages {
        outln!(&mut out, "   0x{:02x}", code);
    }
    out
}

pub fn render_page_80(page: &Page80) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "Unit serial number: {}", page.serial);
    out
}

fn operating_definition_str(code: u8) -> String {
    match code {
        0 => "Use current".to_string(),
        1 => "SCSI-1".to_string(),
        2 => "CCS".to_string(),
        3 => "SCSI-2".to_string(),
        4 => "SCSI-3".to_string(),
        n => format!("unknown code {}", n),
    }
}

pub fn render_page_81(page: &Page81) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "Current operating definition: {}", operating_definition_str(page.current));
    outln!(&mut out, "Default operating definition: {}", operating_definition_str(page.default));
    if !page.supported.is_empty() {
        let list: Vec<String> =
            page.supported.iter().map(|&c| operating_definition_str(c)).collect();
        outln!(&mut out, "Supported operating definitions: {}", list.join(", "));
    }
    out
}

pub fn render_page_82(page: &Page82) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "ASCII operating definition: {}", page.definition);
    out
}

// Code sets from SPC: 1 = binary, 2 = ASCII, 3 = UTF-8.
fn identifier_text(descriptor: &IdentificationDescriptor, concatenated: bool) -> String {
    match descriptor.code_set {
        2 | 3 => util::space_padded_to_string(&descriptor.identifier),
        _ if concatenated => util::hex_string(&descriptor.identifier, ""),
        _ => util::hex_string(&descriptor.identifier, ":"),
    }
}

fn render_identification_descriptor(out: &mut String, d: &IdentificationDescriptor) {
    let association = match d.association {
        0 => "logical unit",
        1 => "target port",
        2 => "target device",
        _ => "reserved association",
    };
    match d.identifier_type {
        0 => outln!(
            out,
            "Vendor-specific identifier ({}): {}",
            association,
            identifier_text(d, false)
        ),
        1 => outln!(
            out,
            "T10 vendor identification ({}): {}",
            association,
            identifier_text(d, false)
        ),
        2 => outln!(out, "EUI-64 identifier ({}): {}", association, identifier_text(d, true)),
        3 => outln!(out, "NAA identifier ({}): {}", association, identifier_text(d, true)),
        4 => {
            let port = if d.identifier.len() >= 4 {
                ((d.identifier[2] as u32) << 8) + d.identifier[3] as u32
            } else {
                0
            };
            outln!(out, "Relative target port: {}", port);
        }
        5 => {
            let group = if d.identifier.len() >= 4 {
                ((d.identifier[2] as u32) << 8) + d.identifier[3] as u32
            } else {
                0
            };
            outln!(out, "Target port group: {}", group);
        }
        6 => {
            let group = if d.identifier.len() >= 4 {
                ((d.identifier[2] as u32) << 8) + d.identifier[3] as u32
            } else {
                0
            };
            outln!(out, "Logical unit group: {}", group);
        }
        7 => outln!(out, "MD5 logical unit identifier: {}", identifier_text(d, true)),
        8 => outln!(out, "SCSI name string: {}", util::space_padded_to_string(&d.identifier)),
        9 => outln!(
            out,
            "Protocol-specific port identifier (protocol {}): {}",
            d.protocol_id,
            identifier_text(d, false)
        ),
        n => outln!(
            out,
            "Identifier of unknown code {} ({}): {}",
            n,
            association,
            identifier_text(d, false)
        ),
    }
}

pub fn render_page_83(page: &Page83) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    for descriptor in &page.descriptors {
        render_identification_descriptor(&mut out, descriptor);
    }
    out
}

pub fn render_page_84(page: &Page84) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    for id in &page.identifiers {
        outln!(&mut out, "Software interface identifier: {}", util::hex_string(id, ":"));
    }
    out
}

pub fn render_page_85(page: &Page85) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    for d in &page.descriptors {
        let association = match d.association {
            0 => "logical unit",
            2 => "target device",
            _ => "reserved association",
        };
        let service = match d.service_type {
            0 => "unspecified".to_string(),
            1 => "storage configuration service".to_string(),
            2 => "diagnostics".to_string(),
            3 => "status".to_string(),
            4 => "logging".to_string(),
            5 => "code download".to_string(),
            6 => "copy service".to_string(),
            7 => "administrative configuration service".to_string(),
            n => format!("unknown code {}", n),
        };
        outln!(
            &mut out,
            "Network address ({}, {}): {}",
            association,
            service,
            util::space_padded_to_string(&d.address)
        );
    }
    out
}

pub fn render_page_86(page: &Page86) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "Extended INQUIRY data:");
    if page.grd_chk {
        outln!(&mut out, "   Device checks protection guard field");
    }
    if page.app_chk {
        outln!(&mut out, "   Device checks protection application tag");
    }
    if page.ref_chk {
        outln!(&mut out, "   Device checks protection reference tag");
    }
    if page.spt != 0 {
        outln!(&mut out, "   Protection type support code: {}", page.spt);
    }
    if page.uask_sup {
        outln!(&mut out, "   Unit attention sense key specific data is supported");
    }
    if page.group_sup {
        outln!(&mut out, "   Grouping is supported");
    }
    if page.prior_sup {
        outln!(&mut out, "   Priority is supported");
    }
    if page.headsup {
        outln!(&mut out, "   Head of queue is supported");
    }
    if page.ordsup {
        outln!(&mut out, "   Ordered queueing is supported");
    }
    if page.simpsup {
        outln!(&mut out, "   Simple queueing is supported");
    }
    if page.wu_sup {
        outln!(&mut out, "   Write uncorrectable is supported");
    }
    if page.crd_sup {
        outln!(&mut out, "   Correction disable is supported");
    }
    if page.nv_sup {
        outln!(&mut out, "   Non-volatile cache is present");
    }
    if page.v_sup {
        outln!(&mut out, "   Volatile cache is present");
    }
    if page.luiclr {
        outln!(&mut out, "   Unit attentions are cleared per logical unit");
    }
    if page.cbcs {
        outln!(&mut out, "   Capability-based command security is supported");
    }
    if page.extended_self_test_minutes != 0 {
        outln!(
            &mut out,
            "   Extended self-test completion time: {} minutes",
            page.extended_self_test_minutes
        );
    }
    if page.max_sense_length != 0 {
        outln!(&mut out, "   Maximum sense data length: {} bytes", page.max_sense_length);
    }
    out
}

/// Page 0x89 embeds a verbatim IDENTIFY response; this is the one place
/// the ATA and SCSI decoder families compose.
pub fn render_page_89(page: &Page89) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    outln!(&mut out, "SAT vendor: {}", page.sat_vendor);
    outln!(&mut out, "SAT product: {}", page.sat_product);
    outln!(&mut out, "SAT revision: {}", page.sat_revision);
    match page.command_code {
        0xec => outln!(&mut out, "Contains response to IDENTIFY DEVICE"),
        0xa1 => outln!(&mut out, "Contains response to IDENTIFY PACKET DEVICE"),
        n => outln!(&mut out, "Contains response to command 0x{:02x}", n),
    }
    match ata::decode_identify(&page.identify_data) {
        Some(identify) => {
            outln!(&mut out);
            out.push_str(&ata::render_identify(&identify));
        }
        None => outln!(&mut out, "Embedded IDENTIFY data is malformed"),
    }
    out
}

pub fn render_page_b1(page: &PageB1) -> String {
    let mut out = String::new();
    render_header(&mut out, &page.header);
    match page.rotation_rate {
        0x0000 | 0xffff => {}
        0x0001 => outln!(&mut out, "Device does not rotate (solid state)"),
        rpm => outln!(&mut out, "Nominal rotation rate: {} rpm", rpm),
    }
    let ff = match page.form_factor {
        0 => None,
        1 => Some("5.25\"".to_string()),
        2 => Some("3.5\"".to_string()),
        3 => Some("2.5\"".to_string()),
        4 => Some("1.8\"".to_string()),
        5 => Some("less than 1.8\"".to_string()),
        n => Some(format!("unknown code {}", n)),
    };
    if let Some(ff) = ff {
        outln!(&mut out, "Nominal form factor: {}", ff);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scsi::evpd::{make_page, make_page16};

    #[test]
    fn unknown_identifier_type_renders_unknown_with_value() {
        let mut body = vec![0x01, 0x0f, 0x00, 0x02];
        body.extend_from_slice(&[0xaa, 0xbb]);
        let page = make_page(0x83, &body);
        let decoded = decode_page_83(&page).unwrap();
        let text = render_page_83(&decoded);
        assert!(text.contains("unknown"));
        assert!(text.contains("15"));
        assert!(text.contains("aa:bb"));
    }

    #[test]
    fn ascii_descriptors_render_as_text_binary_as_hex() {
        let mut body = vec![0x02, 0x01, 0x00, 0x04];
        body.extend_from_slice(b"ACME");
        body.extend_from_slice(&[0x01, 0x02, 0x00, 0x08]);
        body.extend_from_slice(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
        let page = make_page(0x83, &body);
        let text = render_page_83(&decode_page_83(&page).unwrap());
        assert!(text.contains("T10 vendor identification (logical unit): ACME"));
        assert!(text.contains("EUI-64 identifier (logical unit): 0001020304050607"));
    }

    #[test]
    fn page_89_renders_embedded_identify() {
        let mut body = vec![0u8; 0x238];
        body[4..10].copy_from_slice(b"VENDOR");
        body[52] = 0xec;
        // model "AB" swapped, word 27 at identify offset 54
        body[56 + 54] = b'B';
        body[56 + 55] = b'A';
        let page = make_page16(0x89, &body);
        let decoded = decode_page_89(&page).unwrap();
        let text = render_page_89(&decoded);
        assert!(text.contains("SAT vendor: VENDOR"));
        assert!(text.contains("Contains response to IDENTIFY DEVICE"));
        assert!(text.contains("Model: AB"));
    }

    #[test]
    fn b1_sentinels_are_omitted() {
        let mut body = vec![0u8; 60];
        let page = make_page(0xb1, &body);
        let text = render_page_b1(&decode_page_b1(&page).unwrap());
        assert!(!text.contains("rotat"));

        body[1] = 0x01;
        let page = make_page(0xb1, &body);
        let text = render_page_b1(&decode_page_b1(&page).unwrap());
        assert!(text.contains("does not rotate"));
    }
}
