/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

pub fn asciiz_to_string(s: &[u8]) -> String {
    let mut s = String::from_utf8_lossy(s).to_string();
    if let Some(n) = s.find(char::from(0)) {
        s.truncate(n);
    }
    s
}

/// Fixed-width identifier fields are space padded; some writers pad with NULs.
pub fn space_padded_to_string(s: &[u8]) -> String {
    let s = String::from_utf8_lossy(s);
    s.trim_end_matches(|c: char| c == ' ' || c == '\0').to_string()
}

/// ATA strings store two characters per 16-bit word with the bytes swapped.
pub fn ata_string(s: &[u8]) -> String {
    let mut swapped = Vec::with_capacity(s.len());
    for pair in s.chunks_exact(2) {
        swapped.push(pair[1]);
        swapped.push(pair[0]);
    }
    space_padded_to_string(&swapped)
}

/// Big-endian UCS-2 text, as used by Joliet identifiers and names.
pub fn ucs2_to_string(s: &[u8]) -> String {
    let units: Vec<u16> = s
        .chunks_exact(2)
        .map(|pair| ((pair[0] as u16) << 8) | pair[1] as u16)
        .collect();
    let s = String::from_utf16_lossy(&units);
    s.trim_end_matches(|c: char| c == ' ' || c == '\0').to_string()
}

/// True when every byte is printable ASCII, allowing trailing NUL padding.
pub fn is_printable(s: &[u8]) -> bool {
    let trimmed = match s.iter().position(|&b| b == 0) {
        Some(n) => {
            if s[n..].iter().any(|&b| b != 0) {
                return false;
            }
            &s[..n]
        }
        None => s,
    };
    trimmed.iter().all(|&b| b >= 0x20 && b < 0x7f)
}

pub fn hex_string(s: &[u8], separator: &str) -> String {
    s.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(separator)
}

/// Renders a byte count with its decimal and binary magnitude, picking the
/// unit tier from the MiB-scaled value (>= 1000000 MiB -> terabytes,
/// >= 1000 MiB -> gigabytes, otherwise megabytes).
pub fn format_capacity(bytes: u64) -> String {
    let mib = bytes / (1024 * 1024);
    if mib >= 1_000_000 {
        format!(
            "{} bytes, {:.2} Tb, {:.2} TiB",
            bytes,
            bytes as f64 / 1e12,
            bytes as f64 / (1u64 << 40) as f64
        )
    } else if mib >= 1000 {
        format!(
            "{} bytes, {:.2} Gb, {:.2} GiB",
            bytes,
            bytes as f64 / 1e9,
            bytes as f64 / (1u64 << 30) as f64
        )
    } else {
        format!(
            "{} bytes, {:.2} Mb, {:.2} MiB",
            bytes,
            bytes as f64 / 1e6,
            bytes as f64 / (1u64 << 20) as f64
        )
    }
}
