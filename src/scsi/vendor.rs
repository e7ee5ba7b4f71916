/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Vendor VPD pages. The 0xC0-0xDF range is reused by multiple vendors
//! with unrelated layouts, so there is no dispatch on the page-code byte:
//! `probe` tries each candidate in a fixed order (Quantum, Certance, HP,
//! Seagate, IBM) and a caller that knows the vendor can pass a hint to
//! short-circuit the search.

use std::sync::OnceLock;

use regex::Regex;

use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorHint {
    Quantum,
    Certance,
    Hp,
    Seagate,
    Ibm,
}

fn frame_8bit(buffer: &[u8], page_code: u8) -> Option<&[u8]> {
    if buffer.len() < 4 || buffer[1] != page_code {
        return None;
    }
    if buffer.len() != buffer[3] as usize + 4 {
        return None;
    }
    Some(&buffer[4..])
}

#[derive(Debug, Clone)]
pub struct QuantumPageC0 {
    pub firmware_major: u8,
    pub firmware_minor: u8,
    pub eeprom_major: u8,
    pub eeprom_minor: u8,
}

/// Quantum page 0xC0: firmware build information, fixed offsets.
pub fn decode_quantum_c0(buffer: &[u8]) -> Option<QuantumPageC0> {
    let body = frame_8bit(buffer, 0xc0)?;
    if body.len() < 4 {
        return None;
    }
    Some(QuantumPageC0 {
        firmware_major: body[0],
        firmware_minor: body[1],
        eeprom_major: body[2],
        eeprom_minor: body[3],
    })
}

pub fn render_quantum_c0(page: &QuantumPageC0) -> String {
    format!(
        "Quantum firmware version: {}.{}\nQuantum EEPROM format version: {}.{}\n",
        page.firmware_major, page.firmware_minor, page.eeprom_major, page.eeprom_minor
    )
}

#[derive(Debug, Clone)]
pub struct CertancePage {
    pub page_code: u8,
    pub component_serial: String,
}

/// Certance pages 0xC2-0xC6 carry one component serial number each.
pub fn decode_certance_serial(buffer: &[u8]) -> Option<CertancePage> {
    if buffer.len() < 4 {
        return None;
    }
    let page_code = buffer[1];
    if !(0xc2..=0xc6).contains(&page_code) {
        return None;
    }
    let body = frame_8bit(buffer, page_code)?;
    if !util::is_printable(body) {
        return None;
    }
    Some(CertancePage { page_code, component_serial: util::space_padded_to_string(body) })
}

pub fn render_certance_serial(page: &CertancePage) -> String {
    let component = match page.page_code {
        0xc2 => "Head assembly",
        0xc3 => "Reel motor 1",
        0xc4 => "Reel motor 2",
        0xc5 => "Board",
        0xc6 => "Base mechanical",
        _ => "Unknown component",
    };
    format!("Certance {} serial number: {}\n", component, page.component_serial)
}

#[derive(Debug, Clone)]
pub enum HpField {
    FirmwareRevision { revision: String, build_date: String },
    ServoRevision { revision: String },
    FirmwareConfiguration { value: u32 },
    Other(String),
}

#[derive(Debug, Clone)]
pub struct HpPage {
    pub page_code: u8,
    pub fields: Vec<HpField>,
}

/// HP pages 0xC0-0xC5 do not use fixed offsets; the body is a run of
/// NUL-terminated ASCII sub-fields classified by pattern matching. This is
/// best-effort metadata extraction, not a correctness-critical path.
pub fn decode_hp(buffer: &[u8]) -> Option<HpPage> {
    if buffer.len() < 4 {
        return None;
    }
    let page_code = buffer[1];
    if !(0xc0..=0xc5).contains(&page_code) {
        return None;
    }
    let body = frame_8bit(buffer, page_code)?;

    static PATTERNS: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    let (firmware_re, servo_re, fw_conf_re) = PATTERNS.get_or_init(|| {
        (
            Regex::new(r"^Firmware Rev\s*=\s*(\S+)\s+Build date\s*=\s*(.*)$").unwrap(),
            Regex::new(r"^Servo Rev\s*=\s*(\S+)").unwrap(),
            Regex::new(r"^FW_CONF\s*=\s*0x([0-9A-Fa-f]{8})").unwrap(),
        )
    });

    let mut fields = Vec::new();
    let mut any_match = false;
    for chunk in body.split(|&b| b == 0) {
        if chunk.is_empty() {
            continue;
        }
        if !util::is_printable(chunk) {
            // Binary sub-field; HP mixes those in on some pages.
            continue;
        }
        let text = util::space_padded_to_string(chunk);
        if let Some(caps) = firmware_re.captures(&text) {
            fields.push(HpField::FirmwareRevision {
                revision: caps[1].to_string(),
                build_date: caps[2].trim().to_string(),
            });
            any_match = true;
        } else if let Some(caps) = servo_re.captures(&text) {
            fields.push(HpField::ServoRevision { revision: caps[1].to_string() });
            any_match = true;
        } else if let Some(caps) = fw_conf_re.captures(&text) {
            let value = u32::from_str_radix(&caps[1], 16).unwrap_or(0);
            fields.push(HpField::FirmwareConfiguration { value });
            any_match = true;
        } else {
            fields.push(HpField::Other(text));
        }
    }
    if !any_match {
        return None;
    }
    Some(HpPage { page_code, fields })
}

pub fn render_hp(page: &HpPage) -> String {
    let mut out = String::new();
    for field in &page.fields {
        match field {
            HpField::FirmwareRevision { revision, build_date } => {
                out.push_str(&format!(
                    "HP firmware revision: {} (built {})\n",
                    revision, build_date
                ));
            }
            HpField::ServoRevision { revision } => {
                out.push_str(&format!("HP servo revision: {}\n", revision));
            }
            HpField::FirmwareConfiguration { value } => {
                out.push_str(&format!("HP firmware configuration: 0x{:08x}\n", value));
            }
            HpField::Other(text) => {
                out.push_str(&format!("HP: {}\n", text));
            }
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct SeagatePageC3 {
    pub servo_firmware: String,
    pub servo_rom: String,
    pub sap_firmware: String,
}

/// Seagate page 0xC3: firmware numbers, three fixed 8-byte ASCII fields.
pub fn decode_seagate_c3(buffer: &[u8]) -> Option<SeagatePageC3> {
    let body = frame_8bit(buffer, 0xc3)?;
    if body.len() < 24 || !util::is_printable(&body[..24]) {
        return None;
    }
    Some(SeagatePageC3 {
        servo_firmware: util::space_padded_to_string(&body[0..8]),
        servo_rom: util::space_padded_to_string(&body[8..16]),
        sap_firmware: util::space_padded_to_string(&body[16..24]),
    })
}

pub fn render_seagate_c3(page: &SeagatePageC3) -> String {
    format!(
        "Seagate servo firmware: {}\nSeagate servo ROM: {}\nSeagate SAP firmware: {}\n",
        page.servo_firmware, page.servo_rom, page.sap_firmware
    )
}

#[derive(Debug, Clone)]
pub struct IbmPageC0 {
    pub load_id: String,
    pub ru_name: String,
}

/// IBM page 0xC0: drive component revision levels.
pub fn decode_ibm_c0(buffer: &[u8]) -> Option<IbmPageC0> {
    let body = frame_8bit(buffer, 0xc0)?;
    if body.len() < 8 || !util::is_printable(&body[..8]) {
        return None;
    }
    let ru_name = if body.len() >= 16 && util::is_printable(&body[8..16]) {
        util::space_padded_to_string(&body[8..16])
    } else {
        String::new()
    };
    Some(IbmPageC0 { load_id: util::space_padded_to_string(&body[..8]), ru_name })
}

pub fn render_ibm_c0(page: &IbmPageC0) -> String {
    let mut out = format!("IBM load id: {}\n", page.load_id);
    if !page.ru_name.is_empty() {
        out.push_str(&format!("IBM RU name: {}\n", page.ru_name));
    }
    out
}

/// Tries the vendor candidates against a page buffer and returns the
/// rendered text of the first decoder that accepts it.
pub fn probe(buffer: &[u8], hint: Option<VendorHint>) -> Option<String> {
    let try_vendor = |vendor: VendorHint| -> Option<String> {
        match vendor {
            VendorHint::Quantum => decode_quantum_c0(buffer).map(|p| render_quantum_c0(&p)),
            VendorHint::Certance => {
                decode_certance_serial(buffer).map(|p| render_certance_serial(&p))
            }
            VendorHint::Hp => decode_hp(buffer).map(|p| render_hp(&p)),
            VendorHint::Seagate => decode_seagate_c3(buffer).map(|p| render_seagate_c3(&p)),
            VendorHint::Ibm => decode_ibm_c0(buffer).map(|p| render_ibm_c0(&p)),
        }
    };

    if let Some(vendor) = hint {
        return try_vendor(vendor);
    }
    for vendor in [
        VendorHint::Quantum,
        VendorHint::Certance,
        VendorHint::Hp,
        VendorHint::Seagate,
        VendorHint::Ibm,
    ] {
        if let Some(text) = try_vendor(vendor) {
            return Some(text);
        }
    }
    None
}
