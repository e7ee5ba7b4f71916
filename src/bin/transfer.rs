/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use anyhow::{anyhow, Result};
use clap::Parser;

use discprobe::iso9660::{mount, MountOptions, Namespace, RawImage, Session};

/// Transfer the contents of a CD-ROM image to a local directory
#[derive(Parser)]
struct Cli {
    /// Image file (.iso, .bin or Mode 2 dump)
    image: String,
    /// Destination directory
    output: String,
    /// Stored sector size: 2048, 2336 or 2352
    #[clap(long, short, default_value = "2048")]
    sector_size: usize,
    /// Name-space: normal, vms, joliet, rrip, romeo
    #[clap(long, short, default_value = "joliet")]
    namespace: String,
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

fn sanitize(name: &str) -> String {
    name.chars().map(|c| if c == '/' || c == '\\' { '_' } else { c }).collect()
}

fn copy_tree(session: &mut Session, iso_path: &str, dest: &Path) -> Result<(usize, usize)> {
    fs::create_dir_all(dest)?;
    let mut files = 0;
    let mut directories = 0;
    for entry in session.read_dir(iso_path)? {
        let child_iso = format!("{}/{}", iso_path, entry.name);
        let child_dest = dest.join(sanitize(&entry.name));
        if entry.is_directory {
            let (f, d) = copy_tree(session, &child_iso, &child_dest)?;
            files += f;
            directories += d + 1;
        } else {
            match session.read(&child_iso) {
                Ok(data) => {
                    File::create(&child_dest).and_then(|mut f| f.write_all(&data))?;
                    files += 1;
                }
                Err(e) => {
                    log::warn!("skipping {}: {}", child_iso, e);
                }
            }
        }
    }
    Ok((files, directories))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();
    let f = File::open(&args.image)?;

    let image = RawImage::new(f, args.sector_size)?;
    let options =
        MountOptions { namespace: parse_namespace(&args.namespace)?, ..MountOptions::default() };
    let mut session = mount(image, options)?;

    println!("Transferring volume '{}'", session.volume_id());
    let (files, directories) = copy_tree(&mut session, "", Path::new(&args.output))?;
    println!("{} files in {} directories copied", files, directories);
    Ok(())
}
