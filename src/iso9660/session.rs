/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! Mounted-volume sessions. A `Session` owns a sector source plus the
//! decoded descriptors and answers path-based queries: directory listing,
//! stat, whole-file reads, extended attributes and block mapping. Lookups
//! are case-insensitive and directory listings are cached per path.

use std::collections::HashMap;

use crate::iso9660::directory::{
    build_entries, continuation_areas, decode_directory, decode_path_table, scan_system_use,
    DirectoryEntry, NameStyle, PathTableEntry,
};
use crate::iso9660::image::SectorSource;
use crate::iso9660::sector;
use crate::iso9660::types::{VolumeFlavor, FLAG_DIRECTORY};
use crate::iso9660::volume::{scan_volume_descriptors, DecodedVolume, PrimaryDescriptor};
use crate::types::{Error, Result, SECTOR_SIZE};

pub const XATTR_EA: &str = "org.iso9660.ea";
pub const XATTR_ASSOCIATED: &str = "org.iso9660.AssociatedFile";

const TRANS_TBL_NAME: &str = "TRANS.TBL";

const PSEUDO_PVD: &str = "$PVD";
const PSEUDO_PATH_TABLE_LSB: &str = "$PATH_TABLE.LSB";
const PSEUDO_PATH_TABLE_MSB: &str = "$PATH_TABLE.MSB";

/// Which name-space the session presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Namespace {
    /// ISO names with the version suffix stripped.
    Normal,
    /// ISO names with the version suffix kept.
    Vms,
    /// UCS-2 names from the Joliet supplementary descriptor.
    #[default]
    Joliet,
    /// Rock Ridge NM names where recorded.
    Rrip,
    /// Names from the primary tree taken verbatim.
    Romeo,
}

#[derive(Debug, Clone, Default)]
pub struct MountOptions {
    pub namespace: Namespace,
    /// Resolve directories through the path table instead of walking
    /// directory extents.
    pub use_path_table: bool,
    /// Substitute names from TRANS.TBL files.
    pub use_trans_tbl: bool,
    /// Mount from a non-Joliet supplementary (enhanced) descriptor.
    pub use_enhanced_descriptor: bool,
    /// Expose $PVD and path table pseudo-files in the root directory.
    pub debug: bool,
}

/// What `stat` reports about a name.
#[derive(Debug, Clone)]
pub struct FileEntryInfo {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub flags: u8,
    pub timestamp: Option<crate::iso9660::types::IsoTimestamp>,
    pub extents: Vec<(u32, u64)>,
    pub ext_attr_length: u8,
}

pub struct Session {
    source: Box<dyn SectorSource>,
    volume: DecodedVolume,
    namespace: Namespace,
    options: MountOptions,
    block_size: u32,
    /// Directory extent of the tree being presented.
    root_extent: u32,
    root_size: u32,
    path_table: Option<Vec<PathTableEntry>>,
    dir_cache: HashMap<String, Vec<DirectoryEntry>>,
}

pub fn mount<S: SectorSource + 'static>(source: S, options: MountOptions) -> Result<Session> {
    Session::new(Box::new(source), options)
}

impl Session {
    pub fn new(mut source: Box<dyn SectorSource>, options: MountOptions) -> Result<Session> {
        if options.use_path_table && options.use_trans_tbl {
            return Err(Error::InvalidArgument(
                "path table and TRANS.TBL modes are mutually exclusive".to_string(),
            ));
        }
        let volume = scan_volume_descriptors(source.as_mut())?;

        let mut namespace = options.namespace;
        if namespace == Namespace::Joliet {
            let joliet_available = volume.flavor == VolumeFlavor::Iso9660 && volume.joliet.is_some();
            if !joliet_available {
                log::warn!("no joliet descriptor on this volume, falling back to normal names");
                namespace = Namespace::Normal;
            }
        }

        let descriptor = Self::pick_descriptor(&volume, namespace, &options)?;
        let block_size = match descriptor.logical_block_size {
            0 => {
                log::warn!("descriptor reports block size 0, assuming 2048");
                SECTOR_SIZE as u32
            }
            n => n as u32,
        };
        let root_extent = descriptor.root_directory.extent;
        let root_size = descriptor.root_directory.size;

        let mut session = Session {
            source,
            volume,
            namespace,
            options,
            block_size,
            root_extent,
            root_size,
            path_table: None,
            dir_cache: HashMap::new(),
        };
        if session.options.use_path_table {
            session.path_table = Some(session.load_path_table()?);
        }
        log::info!(
            "mounted volume '{}' ({:?} names, block size {})",
            session.active_descriptor().volume_id,
            session.namespace,
            session.block_size
        );
        Ok(session)
    }

    fn pick_descriptor<'a>(
        volume: &'a DecodedVolume,
        namespace: Namespace,
        options: &MountOptions,
    ) -> Result<&'a PrimaryDescriptor> {
        if namespace == Namespace::Joliet {
            return volume.joliet.as_ref().ok_or(Error::NoPrimaryDescriptor);
        }
        if options.use_enhanced_descriptor {
            return volume
                .other_supplementary
                .first()
                .ok_or_else(|| Error::InvalidArgument("volume has no enhanced descriptor".to_string()));
        }
        Ok(&volume.primary)
    }

    fn active_descriptor(&self) -> &PrimaryDescriptor {
        if self.namespace == Namespace::Joliet {
            if let Some(joliet) = &self.volume.joliet {
                return joliet;
            }
        }
        if self.options.use_enhanced_descriptor {
            if let Some(enhanced) = self.volume.other_supplementary.first() {
                return enhanced;
            }
        }
        &self.volume.primary
    }

    pub fn volume(&self) -> &DecodedVolume {
        &self.volume
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn volume_id(&self) -> String {
        self.active_descriptor().volume_id.clone()
    }

    fn name_style(&self) -> NameStyle {
        match self.namespace {
            Namespace::Normal => NameStyle::Iso,
            Namespace::Vms => NameStyle::Vms,
            Namespace::Joliet => NameStyle::Joliet,
            Namespace::Rrip => NameStyle::RockRidge,
            Namespace::Romeo => NameStyle::Romeo,
        }
    }

    /// Reads `length` bytes starting at a logical block number. Logical
    /// blocks can be smaller than the 2048-byte sector payload, so the
    /// byte range is mapped onto sectors first.
    fn read_at_block(&mut self, block: u32, length: usize) -> Result<Vec<u8>> {
        let byte_start = block as u64 * self.block_size as u64;
        let first_sector = byte_start / SECTOR_SIZE as u64;
        let skip = (byte_start % SECTOR_SIZE as u64) as usize;

        let mut data = Vec::with_capacity(length);
        let mut collected = 0usize;
        let mut lba = first_sector;
        while collected < skip + length {
            let raw = self.source.read_sector(lba)?;
            let user = sector::unwrap_user_data(&raw);
            collected += user.len();
            data.extend_from_slice(user);
            lba += 1;
        }
        Ok(data[skip..skip + length].to_vec())
    }

    fn load_path_table(&mut self) -> Result<Vec<PathTableEntry>> {
        let descriptor = self.active_descriptor();
        let size = descriptor.path_table_size as usize;
        // CD-i volumes only record the big-endian table.
        let (location, big_endian) = if self.volume.flavor == VolumeFlavor::Cdi {
            (descriptor.path_table_msb, true)
        } else {
            (descriptor.path_table_lsb, false)
        };
        let joliet = self.namespace == Namespace::Joliet;
        let data = self.read_at_block(location, size)?;
        decode_path_table(&data, big_endian, joliet)
    }

    fn raw_path_table(&mut self, big_endian: bool) -> Result<Vec<u8>> {
        let descriptor = self.active_descriptor();
        let size = descriptor.path_table_size as usize;
        let location =
            if big_endian { descriptor.path_table_msb } else { descriptor.path_table_lsb };
        if location == 0 {
            return Err(Error::NoSuchFile(
                if big_endian { PSEUDO_PATH_TABLE_MSB } else { PSEUDO_PATH_TABLE_LSB }.to_string(),
            ));
        }
        self.read_at_block(location, size)
    }

    fn load_directory(&mut self, extent: u32, size: u32) -> Result<Vec<DirectoryEntry>> {
        let data = self.read_at_block(extent, size as usize)?;
        let records = decode_directory(&data, self.block_size as usize, self.volume.flavor);
        let mut entries = build_entries(&records, self.name_style());
        if self.options.use_trans_tbl {
            self.apply_trans_tbl(&mut entries)?;
        }
        if self.options.debug {
            for entry in &entries {
                let susp = scan_system_use(&entry.system_use);
                if susp.is_empty() {
                    continue;
                }
                let signatures: Vec<String> = susp
                    .iter()
                    .map(|e| String::from_utf8_lossy(&e.signature).into_owned())
                    .collect();
                log::debug!("{}: system use entries {}", entry.name, signatures.join(" "));
                for area in continuation_areas(&susp) {
                    log::debug!(
                        "{}: continuation area at block {} offset {} length {}",
                        entry.name,
                        area.block,
                        area.offset,
                        area.length
                    );
                }
            }
        }
        Ok(entries)
    }

    /// Rewrites entry names from the directory's TRANS.TBL, when present.
    /// Each line is "type iso-name real-name"; unparsable lines are skipped.
    fn apply_trans_tbl(&mut self, entries: &mut [DirectoryEntry]) -> Result<()> {
        let table = match entries
            .iter()
            .find(|e| !e.is_directory() && e.name.eq_ignore_ascii_case(TRANS_TBL_NAME))
        {
            Some(entry) => entry.extents.clone(),
            None => return Ok(()),
        };
        let mut data = Vec::new();
        for (extent, size) in table {
            data.extend_from_slice(&self.read_at_block(extent, size as usize)?);
        }
        let text = String::from_utf8_lossy(&data).into_owned();

        let mut renames: HashMap<String, String> = HashMap::new();
        for line in text.lines() {
            let mut parts = line.splitn(3, char::is_whitespace).filter(|p| !p.is_empty());
            let _kind = match parts.next() {
                Some(k) if k.len() == 1 => k,
                _ => continue,
            };
            let iso_name = match parts.next() {
                Some(n) => n,
                None => continue,
            };
            let real_name = match parts.next() {
                Some(n) => n.trim(),
                None => continue,
            };
            if real_name.is_empty() {
                continue;
            }
            let key = iso_name.split(';').next().unwrap_or(iso_name).to_ascii_uppercase();
            renames.insert(key, real_name.to_string());
        }

        for entry in entries.iter_mut() {
            let key = entry.name.split(';').next().unwrap_or(&entry.name).to_ascii_uppercase();
            if let Some(real) = renames.get(&key) {
                entry.name = real.clone();
            }
        }
        Ok(())
    }

    fn normalize(path: &str) -> Vec<String> {
        path.split('/').filter(|c| !c.is_empty()).map(|c| c.to_string()).collect()
    }

    fn cached_directory(&mut self, key: &str, extent: u32, size: u32) -> Result<Vec<DirectoryEntry>> {
        if let Some(entries) = self.dir_cache.get(key) {
            return Ok(entries.clone());
        }
        let entries = self.load_directory(extent, size)?;
        self.dir_cache.insert(key.to_string(), entries.clone());
        Ok(entries)
    }

    /// Resolves a directory path to its extent and size, either by walking
    /// directory records or through the path table.
    fn resolve_directory(&mut self, components: &[String]) -> Result<(u32, u32)> {
        if self.path_table.is_some() {
            return self.resolve_directory_path_table(components);
        }
        let mut extent = self.root_extent;
        let mut size = self.root_size;
        let mut key = String::new();
        for component in components {
            let entries = self.cached_directory(&key.clone(), extent, size)?;
            let entry = entries
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(component))
                .ok_or_else(|| Error::NoSuchFile(component.clone()))?;
            if !entry.is_directory() {
                return Err(Error::NotDirectory(component.clone()));
            }
            let (e, s) = entry.extents.first().copied().unwrap_or((0, 0));
            extent = e;
            size = s as u32;
            key.push('/');
            key.push_str(&component.to_ascii_uppercase());
        }
        Ok((extent, size))
    }

    fn resolve_directory_path_table(&mut self, components: &[String]) -> Result<(u32, u32)> {
        let table = match &self.path_table {
            Some(t) => t.clone(),
            None => return Err(Error::CorruptPathTable(0)),
        };
        // Entry 1 is the root; children reference their parent by index.
        let mut index = 1usize;
        for component in components {
            let mut found = None;
            for (n, entry) in table.iter().enumerate() {
                if entry.parent as usize == index && entry.name.eq_ignore_ascii_case(component) {
                    found = Some(n + 1);
                    break;
                }
            }
            index = found.ok_or_else(|| Error::NoSuchFile(component.clone()))?;
        }
        let entry =
            table.get(index - 1).ok_or(Error::CorruptPathTable(index - 1))?;
        if index == 1 {
            return Ok((self.root_extent, self.root_size));
        }
        // The path table does not record directory sizes; read the
        // directory's own record from its first block.
        let extent = entry.extent;
        let data = self.read_at_block(extent, self.block_size as usize)?;
        let records = decode_directory(&data, self.block_size as usize, self.volume.flavor);
        let size = records
            .iter()
            .find(|r| r.name_bytes == [0x00])
            .map(|r| r.size)
            .unwrap_or(self.block_size);
        Ok((extent, size))
    }

    fn find_entry(&mut self, path: &str) -> Result<DirectoryEntry> {
        let components = Self::normalize(path);
        let (name, parents) = match components.split_last() {
            Some((name, parents)) => (name.clone(), parents.to_vec()),
            None => {
                // The root itself.
                let descriptor = self.active_descriptor();
                let root = &descriptor.root_directory;
                return Ok(DirectoryEntry {
                    name: String::new(),
                    extents: vec![(root.extent, root.size as u64)],
                    associated_extents: Vec::new(),
                    flags: FLAG_DIRECTORY,
                    timestamp: root.timestamp,
                    ext_attr_length: root.ext_attr_length,
                    volume_sequence: root.volume_sequence,
                    system_use: root.system_use.clone(),
                });
            }
        };
        let (extent, size) = self.resolve_directory(&parents)?;
        let key = parents
            .iter()
            .map(|c| format!("/{}", c.to_ascii_uppercase()))
            .collect::<String>();
        let entries = self.cached_directory(&key, extent, size)?;
        entries
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(&name))
            .ok_or_else(|| Error::NoSuchFile(path.to_string()))
    }

    fn pseudo_file(&mut self, path: &str) -> Option<Result<Vec<u8>>> {
        if !self.options.debug {
            return None;
        }
        match Self::normalize(path).as_slice() {
            [name] if name == PSEUDO_PVD => Some(Ok(self.active_descriptor().raw.clone())),
            [name] if name == PSEUDO_PATH_TABLE_LSB => Some(self.raw_path_table(false)),
            [name] if name == PSEUDO_PATH_TABLE_MSB => Some(self.raw_path_table(true)),
            _ => None,
        }
    }

    /// Lists a directory. With the debug option the root listing also
    /// carries the descriptor and path table pseudo-files.
    pub fn read_dir(&mut self, path: &str) -> Result<Vec<FileEntryInfo>> {
        let components = Self::normalize(path);
        let (extent, size) = self.resolve_directory(&components)?;
        let key = components
            .iter()
            .map(|c| format!("/{}", c.to_ascii_uppercase()))
            .collect::<String>();
        let entries = self.cached_directory(&key, extent, size)?;
        let mut infos: Vec<FileEntryInfo> = entries.iter().map(entry_info).collect();
        if self.options.debug && components.is_empty() {
            for name in [PSEUDO_PVD, PSEUDO_PATH_TABLE_LSB, PSEUDO_PATH_TABLE_MSB] {
                if let Some(Ok(data)) = self.pseudo_file(name) {
                    infos.push(FileEntryInfo {
                        name: name.to_string(),
                        size: data.len() as u64,
                        is_directory: false,
                        flags: 0,
                        timestamp: None,
                        extents: Vec::new(),
                        ext_attr_length: 0,
                    });
                }
            }
        }
        Ok(infos)
    }

    pub fn stat(&mut self, path: &str) -> Result<FileEntryInfo> {
        if let Some(data) = self.pseudo_file(path) {
            let data = data?;
            let name = Self::normalize(path).pop().unwrap_or_default();
            return Ok(FileEntryInfo {
                name,
                size: data.len() as u64,
                is_directory: false,
                flags: 0,
                timestamp: None,
                extents: Vec::new(),
                ext_attr_length: 0,
            });
        }
        let entry = self.find_entry(path)?;
        Ok(entry_info(&entry))
    }

    /// Reads a whole file; multi-extent files are concatenated in record
    /// order. An extended attribute record at the head of the first extent
    /// is skipped.
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        if let Some(data) = self.pseudo_file(path) {
            return data;
        }
        let entry = self.find_entry(path)?;
        if entry.is_directory() {
            return Err(Error::IsDirectory(path.to_string()));
        }
        self.read_segments(&entry.extents, entry.ext_attr_length)
    }

    /// Reads `size` bytes starting at byte `offset` of a file. A range
    /// past the end of the file is truncated; only the covering sectors
    /// are read.
    pub fn read_at(&mut self, path: &str, offset: u64, size: usize) -> Result<Vec<u8>> {
        if let Some(data) = self.pseudo_file(path) {
            let data = data?;
            let start = (offset as usize).min(data.len());
            let end = start.saturating_add(size).min(data.len());
            return Ok(data[start..end].to_vec());
        }
        let entry = self.find_entry(path)?;
        if entry.is_directory() {
            return Err(Error::IsDirectory(path.to_string()));
        }
        self.read_segments_at(&entry.extents, entry.ext_attr_length, offset, size)
    }

    fn read_segments(&mut self, segments: &[(u32, u64)], ext_attr_length: u8) -> Result<Vec<u8>> {
        let total: u64 = segments.iter().map(|(_, size)| *size).sum();
        self.read_segments_at(segments, ext_attr_length, 0, total as usize)
    }

    fn read_segments_at(
        &mut self,
        segments: &[(u32, u64)],
        ext_attr_length: u8,
        mut offset: u64,
        size: usize,
    ) -> Result<Vec<u8>> {
        let block_size = (self.block_size as u64).max(1);
        let mut data = Vec::new();
        for (n, (extent, seg_size)) in segments.iter().enumerate() {
            if data.len() >= size {
                break;
            }
            let skip = if n == 0 { ext_attr_length as u64 } else { 0 };
            if offset >= *seg_size {
                offset -= *seg_size;
                continue;
            }
            let want = (size - data.len()).min((*seg_size - offset) as usize);
            let block = *extent as u64 + skip + offset / block_size;
            let in_block = (offset % block_size) as usize;
            let chunk = self.read_at_block(block as u32, in_block + want)?;
            data.extend_from_slice(&chunk[in_block..]);
            offset = 0;
        }
        Ok(data)
    }

    pub fn list_xattr(&mut self, path: &str) -> Result<Vec<String>> {
        let entry = self.find_entry(path)?;
        let mut names = Vec::new();
        if entry.ext_attr_length > 0 {
            names.push(XATTR_EA.to_string());
        }
        if !entry.associated_extents.is_empty() {
            names.push(XATTR_ASSOCIATED.to_string());
        }
        Ok(names)
    }

    pub fn get_xattr(&mut self, path: &str, name: &str) -> Result<Vec<u8>> {
        let entry = self.find_entry(path)?;
        match name {
            XATTR_EA if entry.ext_attr_length > 0 => {
                let (extent, _) = entry
                    .extents
                    .first()
                    .copied()
                    .ok_or_else(|| Error::NoSuchFile(path.to_string()))?;
                let length = entry.ext_attr_length as usize * self.block_size as usize;
                self.read_at_block(extent, length)
            }
            XATTR_ASSOCIATED if !entry.associated_extents.is_empty() => {
                let segments = entry.associated_extents.clone();
                self.read_segments(&segments, 0)
            }
            _ => Err(Error::NoSuchExtendedAttribute(name.to_string())),
        }
    }

    /// Maps a logical block of a file to its absolute logical block number
    /// on the volume.
    pub fn map_block(&mut self, path: &str, block: u64) -> Result<u32> {
        let entry = self.find_entry(path)?;
        let block_size = self.block_size as u64;
        let mut remaining = block;
        for (n, (extent, size)) in entry.extents.iter().enumerate() {
            let skip = if n == 0 { entry.ext_attr_length as u64 } else { 0 };
            let blocks = (size + block_size - 1) / block_size;
            if remaining < blocks {
                return Ok(*extent + skip as u32 + remaining as u32);
            }
            remaining -= blocks;
        }
        Err(Error::InvalidArgument(format!("block {} beyond end of {}", block, path)))
    }
}

fn entry_info(entry: &DirectoryEntry) -> FileEntryInfo {
    FileEntryInfo {
        name: entry.name.clone(),
        size: entry.size(),
        is_directory: entry.is_directory(),
        flags: entry.flags,
        timestamp: entry.timestamp,
        extents: entry.extents.clone(),
        ext_attr_length: entry.ext_attr_length,
    }
}
