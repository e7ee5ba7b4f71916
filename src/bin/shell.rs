/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use std::fs::File;
use anyhow::{anyhow, Result};
use clap::Parser;

use discprobe::iso9660::{mount, MountOptions, Namespace, RawImage, Session};
use discprobe::shell_cli;
use discprobe::util;

/// Interactive shell over a CD-ROM image
#[derive(Parser)]
struct Cli {
    /// Image file (.iso, .bin or Mode 2 dump)
    image: String,
    /// Stored sector size: 2048, 2336 or 2352
    #[clap(long, short, default_value = "2048")]
    sector_size: usize,
    /// Name-space: normal, vms, joliet, rrip, romeo
    #[clap(long, short, default_value = "joliet")]
    namespace: String,
    /// Resolve directories through the path table
    #[clap(long)]
    path_table: bool,
    /// Substitute names from TRANS.TBL files
    #[clap(long)]
    trans_tbl: bool,
    /// Mount from an enhanced volume descriptor
    #[clap(long)]
    enhanced: bool,
    /// Expose $PVD and path table pseudo-files
    #[clap(long, short)]
    debug: bool,
}

fn parse_namespace(name: &str) -> Result<Namespace> {
    match name.to_ascii_lowercase().as_str() {
        "normal" => Ok(Namespace::Normal),
        "vms" => Ok(Namespace::Vms),
        "joliet" => Ok(Namespace::Joliet),
        "rrip" => Ok(Namespace::Rrip),
        "romeo" => Ok(Namespace::Romeo),
        n => Err(anyhow!("unknown name-space '{}'", n)),
    }
}

struct IsoShell {
    session: Session,
}

impl shell_cli::ShellImpl for IsoShell {
    fn get_volume_name(&self) -> String {
        self.session.volume_id()
    }

    fn dir(&mut self, path: &str) {
        match self.session.read_dir(path) {
            Ok(entries) => {
                println!("<type> Name                         Size Timestamp");
                for entry in entries {
                    let kind = if entry.is_directory { " dir  " } else { " file " };
                    let timestamp = entry
                        .timestamp
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{} {:24} {:10} {}", kind, entry.name, entry.size, timestamp);
                }
            }
            Err(e) => println!("error: {}", e),
        }
    }

    fn is_directory(&mut self, path: &str) -> bool {
        self.session.stat(path).map(|info| info.is_directory).unwrap_or(false)
    }

    fn retrieve_file_content(&mut self, path: &str) -> Result<Vec<u8>> {
        Ok(self.session.read(path)?)
    }

    fn handle_command(&mut self, path: &str, fields: &Vec<&str>) -> bool {
        match *fields.first().unwrap_or(&"") {
            "info" => {
                let descriptor = &self.session.volume().primary;
                println!("Volume id: {}", descriptor.volume_id);
                println!("System id: {}", descriptor.system_id);
                println!(
                    "Capacity: {} blocks of {} bytes ({})",
                    descriptor.volume_space_size,
                    descriptor.logical_block_size,
                    util::format_capacity(
                        descriptor.volume_space_size as u64 * descriptor.logical_block_size as u64
                    )
                );
                if let Some(created) = &descriptor.creation {
                    println!("Created: {}", created);
                }
                true
            }
            "xattr" => {
                if fields.len() != 2 {
                    println!("usage: xattr file");
                    return true;
                }
                let target = format!("{}/{}", path, fields[1]);
                match self.session.list_xattr(&target) {
                    Ok(names) if names.is_empty() => println!("no extended attributes"),
                    Ok(names) => {
                        for name in names {
                            println!("{}", name);
                        }
                    }
                    Err(e) => println!("error: {}", e),
                }
                true
            }
            _ => false,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let f = File::open(&args.image)?;

    let image = RawImage::new(f, args.sector_size)?;
    let options = MountOptions {
        namespace: parse_namespace(&args.namespace)?,
        use_path_table: args.path_table,
        use_trans_tbl: args.trans_tbl,
        use_enhanced_descriptor: args.enhanced,
        debug: args.debug,
    };
    let session = mount(image, options)?;

    let mut shell = IsoShell { session };
    shell_cli::run(&mut shell)
}
