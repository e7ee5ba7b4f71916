/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Standard VPD page decoders. Every decoder validates the page-code byte
//! and the declared page length against the buffer before extracting
//! anything; a mismatch means "not this page" and yields `None` so the
//! caller can probe the next candidate. Pages 0x85 and 0x89 use a 16-bit
//! length field; the rest use the 8-bit field in byte 3.

use crate::util;

/// Qualifier and device type from byte 0, common to every page.
#[derive(Debug, Clone, Copy)]
pub struct PeripheralHeader {
    pub qualifier: u8,
    pub device_type: u8,
}

fn peripheral_header(buffer: &[u8]) -> PeripheralHeader {
    PeripheralHeader { qualifier: buffer[0] >> 5, device_type: buffer[0] & 0x1f }
}

/// Checks framing for pages with an 8-bit length in byte 3. Returns the
/// page body on success.
fn frame_8bit(buffer: &[u8], page_code: u8) -> Option<&[u8]> {
    if buffer.len() < 4 || buffer[1] != page_code {
        return None;
    }
    if buffer.len() != buffer[3] as usize + 4 {
        return None;
    }
    Some(&buffer[4..])
}

/// Checks framing for pages with a 16-bit length in bytes 2..4.
fn frame_16bit(buffer: &[u8], page_code: u8) -> Option<&[u8]> {
    if buffer.len() < 4 || buffer[1] != page_code {
        return None;
    }
    let declared = ((buffer[2] as usize) << 8) + buffer[3] as usize;
    if buffer.len() != declared + 4 {
        return None;
    }
    Some(&buffer[4..])
}

#[derive(Debug, Clone)]
pub struct Page00 {
    pub header: PeripheralHeader,
    pub pages: Vec<u8>,
}

/// Page 0x00: the body is the list of supported page codes itself.
pub fn decode_page_00(buffer: &[u8]) -> Option<Page00> {
    let body = frame_8bit(buffer, 0x00)?;
    Some(Page00 { header: peripheral_header(buffer), pages: body.to_vec() })
}

#[derive(Debug, Clone)]
pub struct Page80 {
    pub header: PeripheralHeader,
    pub serial: String,
}

/// Page 0x80: unit serial number. The body must be printable ASCII (a
/// trailing NUL is tolerated) or this is not a valid serial page.
pub fn decode_page_80(buffer: &[u8]) -> Option<Page80> {
    let body = frame_8bit(buffer, 0x80)?;
    if !util::is_printable(body) {
        return None;
    }
    Some(Page80 {
        header: peripheral_header(buffer),
        serial: util::space_padded_to_string(body),
    })
}

#[derive(Debug, Clone)]
pub struct Page81 {
    pub header: PeripheralHeader,
    pub current: u8,
    pub default: u8,
    pub supported: Vec<u8>,
}

/// Page 0x81: implemented operating definitions (SCSI-2).
pub fn decode_page_81(buffer: &[u8]) -> Option<Page81> {
    let body = frame_8bit(buffer, 0x81)?;
    if body.len() < 2 {
        return None;
    }
    Some(Page81 {
        header: peripheral_header(buffer),
        current: body[0] & 0x7f,
        default: body[1] & 0x7f,
        supported: body[2..].iter().map(|b| b & 0x7f).collect(),
    })
}

#[derive(Debug, Clone)]
pub struct Page82 {
    pub header: PeripheralHeader,
    pub definition: String,
}

/// Page 0x82: ASCII implemented operating definition.
pub fn decode_page_82(buffer: &[u8]) -> Option<Page82> {
    let body = frame_8bit(buffer, 0x82)?;
    Some(Page82 {
        header: peripheral_header(buffer),
        definition: util::space_padded_to_string(body),
    })
}

#[derive(Debug, Clone)]
pub struct IdentificationDescriptor {
    pub protocol_id: u8,
    pub code_set: u8,
    pub piv: bool,
    pub association: u8,
    pub identifier_type: u8,
    pub identifier: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Page83 {
    pub header: PeripheralHeader,
    pub descriptors: Vec<IdentificationDescriptor>,
}

/// Page 0x83: device identification. Descriptors advance by 4 + length;
/// a descriptor whose declared length overruns the page is clamped to the
/// remaining bytes rather than read out of bounds.
pub fn decode_page_83(buffer: &[u8]) -> Option<Page83> {
    let body = frame_8bit(buffer, 0x83)?;
    let mut descriptors = Vec::new();
    let mut pos = 0usize;
    while pos + 4 <= body.len() {
        let declared = body[pos + 3] as usize;
        let available = body.len() - pos - 4;
        let length = declared.min(available);
        if declared > available {
            log::debug!(
                "identification descriptor at {} declares {} bytes, only {} remain",
                pos,
                declared,
                available
            );
        }
        descriptors.push(IdentificationDescriptor {
            protocol_id: body[pos] >> 4,
            code_set: body[pos] & 0x0f,
            piv: body[pos + 1] & 0x80 != 0,
            association: (body[pos + 1] >> 4) & 0x03,
            identifier_type: body[pos + 1] & 0x0f,
            identifier: body[pos + 4..pos + 4 + length].to_vec(),
        });
        // Always advances by at least the 4-byte descriptor header, so a
        // zero-length descriptor cannot loop forever.
        pos += 4 + length;
    }
    Some(Page83 { header: peripheral_header(buffer), descriptors })
}

#[derive(Debug, Clone)]
pub struct Page84 {
    pub header: PeripheralHeader,
    pub identifiers: Vec<[u8; 6]>,
}

/// Page 0x84: software interface identification (EUI-48 identifiers).
pub fn decode_page_84(buffer: &[u8]) -> Option<Page84> {
    let body = frame_8bit(buffer, 0x84)?;
    if body.len() % 6 != 0 {
        return None;
    }
    let identifiers = body
        .chunks_exact(6)
        .map(|c| {
            let mut id = [0u8; 6];
            id.copy_from_slice(c);
            id
        })
        .collect();
    Some(Page84 { header: peripheral_header(buffer), identifiers })
}

#[derive(Debug, Clone)]
pub struct NetworkDescriptor {
    pub association: u8,
    pub service_type: u8,
    pub address: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Page85 {
    pub header: PeripheralHeader,
    pub descriptors: Vec<NetworkDescriptor>,
}

/// Page 0x85: management network addresses. 16-bit page length.
pub fn decode_page_85(buffer: &[u8]) -> Option<Page85> {
    let body = frame_16bit(buffer, 0x85)?;
    let mut descriptors = Vec::new();
    let mut pos = 0usize;
    while pos + 4 <= body.len() {
        let declared = ((body[pos + 2] as usize) << 8) + body[pos + 3] as usize;
        let available = body.len() - pos - 4;
        let length = declared.min(available);
        descriptors.push(NetworkDescriptor {
            association: (body[pos] >> 5) & 0x03,
            service_type: body[pos] & 0x1f,
            address: body[pos + 4..pos + 4 + length].to_vec(),
        });
        pos += 4 + length;
    }
    Some(Page85 { header: peripheral_header(buffer), descriptors })
}

#[derive(Debug, Clone)]
pub struct Page86 {
    pub header: PeripheralHeader,
    pub activate_microcode: u8,
    pub spt: u8,
    pub grd_chk: bool,
    pub app_chk: bool,
    pub ref_chk: bool,
    pub uask_sup: bool,
    pub group_sup: bool,
    pub prior_sup: bool,
    pub headsup: bool,
    pub ordsup: bool,
    pub simpsup: bool,
    pub wu_sup: bool,
    pub crd_sup: bool,
    pub nv_sup: bool,
    pub v_sup: bool,
    pub luiclr: bool,
    pub cbcs: bool,
    pub extended_self_test_minutes: u16,
    pub max_sense_length: u8,
}

/// Page 0x86: extended INQUIRY data.
pub fn decode_page_86(buffer: &[u8]) -> Option<Page86> {
    let body = frame_8bit(buffer, 0x86)?;
    if body.len() < 60 {
        return None;
    }
    Some(Page86 {
        header: peripheral_header(buffer),
        activate_microcode: body[0] >> 6,
        spt: (body[0] >> 3) & 0x07,
        grd_chk: body[0] & 0x04 != 0,
        app_chk: body[0] & 0x02 != 0,
        ref_chk: body[0] & 0x01 != 0,
        uask_sup: body[1] & 0x20 != 0,
        group_sup: body[1] & 0x10 != 0,
        prior_sup: body[1] & 0x08 != 0,
        headsup: body[1] & 0x04 != 0,
        ordsup: body[1] & 0x02 != 0,
        simpsup: body[1] & 0x01 != 0,
        wu_sup: body[2] & 0x08 != 0,
        crd_sup: body[2] & 0x04 != 0,
        nv_sup: body[2] & 0x02 != 0,
        v_sup: body[2] & 0x01 != 0,
        luiclr: body[3] & 0x01 != 0,
        cbcs: body[4] & 0x01 != 0,
        extended_self_test_minutes: ((body[6] as u16) << 8) + body[7] as u16,
        max_sense_length: body[9],
    })
}

#[derive(Debug, Clone)]
pub struct Page89 {
    pub header: PeripheralHeader,
    pub sat_vendor: String,
    pub sat_product: String,
    pub sat_revision: String,
    pub device_signature: Vec<u8>,
    pub command_code: u8,
    pub identify_data: Vec<u8>,
}

/// Page 0x89: ATA information. 16-bit page length, fixed 0x238 body, with
/// a verbatim 512-byte IDENTIFY response at offset 56 of the body.
pub fn decode_page_89(buffer: &[u8]) -> Option<Page89> {
    let body = frame_16bit(buffer, 0x89)?;
    if body.len() != 0x238 {
        return None;
    }
    Some(Page89 {
        header: peripheral_header(buffer),
        sat_vendor: util::space_padded_to_string(&body[4..12]),
        sat_product: util::space_padded_to_string(&body[12..28]),
        sat_revision: util::space_padded_to_string(&body[28..32]),
        device_signature: body[32..52].to_vec(),
        command_code: body[52],
        identify_data: body[56..568].to_vec(),
    })
}

#[derive(Debug, Clone)]
pub struct PageB1 {
    pub header: PeripheralHeader,
    pub rotation_rate: u16,
    pub form_factor: u8,
}

/// Page 0xB1: block device characteristics.
pub fn decode_page_b1(buffer: &[u8]) -> Option<PageB1> {
    let body = frame_8bit(buffer, 0xb1)?;
    if body.len() < 60 {
        return None;
    }
    Some(PageB1 {
        header: peripheral_header(buffer),
        rotation_rate: ((body[0] as u16) << 8) + body[1] as u16,
        form_factor: body[3] & 0x0f,
    })
}

#[cfg(test)]
pub(crate) fn make_page(page_code: u8, body: &[u8]) -> Vec<u8> {
    let mut page = vec![0x00, page_code, 0x00, body.len() as u8];
    page.extend_from_slice(body);
    page
}

#[cfg(test)]
pub(crate) fn make_page16(page_code: u8, body: &[u8]) -> Vec<u8> {
    let mut page = vec![0x00, page_code, (body.len() >> 8) as u8, body.len() as u8];
    page.extend_from_slice(body);
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_code_mismatch_is_not_an_error() {
        let page = make_page(0x80, b"SERIAL01");
        assert!(decode_page_83(&page).is_none());
        assert!(decode_page_00(&page).is_none());
        assert!(decode_page_80(&page).is_some());
    }

    #[test]
    fn declared_length_must_match_buffer() {
        let mut page = make_page(0x80, b"SERIAL01");
        page[3] += 1;
        assert!(decode_page_80(&page).is_none());

        let mut page16 = make_page16(0x85, &[]);
        page16[3] = 4;
        assert!(decode_page_85(&page16).is_none());
    }

    #[test]
    fn serial_page_requires_printable_body() {
        let page = make_page(0x80, &[0x53, 0x01, 0x52]);
        assert!(decode_page_80(&page).is_none());
        let page = make_page(0x80, b"SER123\0");
        assert_eq!(decode_page_80(&page).unwrap().serial, "SER123");
    }

    #[test]
    fn supported_pages_body_is_the_list() {
        let page = make_page(0x00, &[0x00, 0x80, 0x83]);
        let decoded = decode_page_00(&page).unwrap();
        assert_eq!(decoded.pages, vec![0x00, 0x80, 0x83]);
    }

    #[test]
    fn identification_descriptors_iterate_and_clamp() {
        // Two descriptors: an ASCII T10 id and a binary NAA id.
        let mut body = vec![0x02, 0x01, 0x00, 0x04];
        body.extend_from_slice(b"ACME");
        body.extend_from_slice(&[0x01, 0x03, 0x00, 0x08]);
        body.extend_from_slice(&[0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let page = make_page(0x83, &body);
        let decoded = decode_page_83(&page).unwrap();
        assert_eq!(decoded.descriptors.len(), 2);
        assert_eq!(decoded.descriptors[0].identifier, b"ACME");
        assert_eq!(decoded.descriptors[1].identifier_type, 3);

        // Overlong declared length clamps instead of overrunning.
        let mut body = vec![0x02, 0x01, 0x00, 0x40];
        body.extend_from_slice(b"SHORT");
        let page = make_page(0x83, &body);
        let decoded = decode_page_83(&page).unwrap();
        assert_eq!(decoded.descriptors.len(), 1);
        assert_eq!(decoded.descriptors[0].identifier, b"SHORT");
    }

    #[test]
    fn ata_information_embeds_identify() {
        let mut body = vec![0u8; 0x238];
        body[56] = 0x12;
        body[57] = 0x34;
        let page = make_page16(0x89, &body);
        let decoded = decode_page_89(&page).unwrap();
        assert_eq!(decoded.identify_data.len(), 512);
        assert_eq!(decoded.identify_data[0], 0x12);

        // Wrong body size fails framing even with matching length field
        let body = vec![0u8; 0x100];
        let page = make_page16(0x89, &body);
        assert!(decode_page_89(&page).is_none());
    }

    #[test]
    fn b1_rotation_rate_is_big_endian() {
        let mut body = vec![0u8; 60];
        body[0] = 0x1c;
        body[1] = 0x20; // 7200 rpm
        body[3] = 0x02;
        let page = make_page(0xb1, &body);
        let decoded = decode_page_b1(&page).unwrap();
        assert_eq!(decoded.rotation_rate, 7200);
        assert_eq!(decoded.form_factor, 2);
    }
}
