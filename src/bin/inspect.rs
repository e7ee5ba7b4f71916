/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use std::fs;
use anyhow::{anyhow, Result};
use clap::Parser;

use discprobe::{ata, scsi};
use discprobe::types::IDENTIFY_SIZE;

/// Inspect ATA IDENTIFY and SCSI VPD data dumps
#[derive(Parser)]
struct Cli {
    /// File holding the raw response bytes
    file: String,
    /// Force interpretation as an ATA IDENTIFY DEVICE response
    #[clap(long, short)]
    identify: bool,
    /// Vendor hint for VPD pages: quantum, certance, hp, seagate, ibm
    #[clap(long)]
    vendor: Option<String>,
    /// Interpret the file as MODE SENSE(6) parameter data
    #[clap(long, short)]
    mode_sense: bool,
    /// SCSI peripheral device type, scopes medium/density code lookups
    #[clap(long, default_value = "0")]
    device_type: u8,
}

fn parse_vendor(name: &str) -> Result<scsi::VendorHint> {
    match name.to_ascii_lowercase().as_str() {
        "quantum" => Ok(scsi::VendorHint::Quantum),
        "certance" => Ok(scsi::VendorHint::Certance),
        "hp" => Ok(scsi::VendorHint::Hp),
        "seagate" => Ok(scsi::VendorHint::Seagate),
        "ibm" => Ok(scsi::VendorHint::Ibm),
        n => Err(anyhow!("unknown vendor '{}'", n)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let data = fs::read(&args.file)?;

    if args.mode_sense {
        let page = scsi::mode::decode_mode_sense6(&data)
            .ok_or_else(|| anyhow!("not MODE SENSE(6) parameter data ({} bytes)", data.len()))?;
        let class = scsi::tables::DeviceClassContext::from_peripheral_type(args.device_type);
        print!("{}", scsi::mode::render_mode_sense6(&page, class));
        return Ok(());
    }

    if args.identify || data.len() == IDENTIFY_SIZE {
        let identify = ata::decode_identify(&data)
            .ok_or_else(|| anyhow!("not an IDENTIFY DEVICE response ({} bytes)", data.len()))?;
        println!("{}", identify);
        println!();
        print!("{}", ata::render_identify(&identify));
        return Ok(());
    }

    let hint = match &args.vendor {
        Some(name) => Some(parse_vendor(name)?),
        None => None,
    };
    match scsi::render_vpd(&data, hint) {
        Some(text) => {
            print!("{}", text);
            Ok(())
        }
        None => Err(anyhow!("no decoder recognized this buffer")),
    }
}
