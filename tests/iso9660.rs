/*-
 * SPDX-License-Identifier: GPL-3.0-or-later
 *
 * Copyright (c) 2022, 2024 Rink Springer <rink@rink.nu>
 * For conditions of distribution and use, see LICENSE file
 */

//! End-to-end tests over synthetic disc images: descriptor scan, directory
//! walk, file reads and the raw-sector unwrap, all through the mount API.

use std::io::Cursor;

use discprobe::iso9660::{mount, MountOptions, Namespace, RawImage};
use discprobe::types::Error;

const BLOCK: usize = 2048;

struct ImageBuilder {
    data: Vec<u8>,
}

impl ImageBuilder {
    fn new(sectors: usize) -> ImageBuilder {
        ImageBuilder { data: vec![0u8; sectors * BLOCK] }
    }

    fn put(&mut self, lba: usize, bytes: &[u8]) {
        self.data[lba * BLOCK..lba * BLOCK + bytes.len()].copy_from_slice(bytes);
    }

    fn cooked(self) -> RawImage<Cursor<Vec<u8>>> {
        RawImage::new(Cursor::new(self.data), 2048).unwrap()
    }

    /// Rewraps every sector as a raw Mode 1 sector (sync, header, payload,
    /// zeroed error correction).
    fn raw_mode1(self) -> RawImage<Cursor<Vec<u8>>> {
        let sync = [0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00];
        let mut raw = Vec::with_capacity(self.data.len() / BLOCK * 2352);
        for sector in self.data.chunks(BLOCK) {
            let mut wrapped = vec![0u8; 2352];
            wrapped[..12].copy_from_slice(&sync);
            wrapped[15] = 1;
            wrapped[16..16 + BLOCK].copy_from_slice(sector);
            raw.extend_from_slice(&wrapped);
        }
        RawImage::new(Cursor::new(raw), 2352).unwrap()
    }
}

fn dir_record(name: &[u8], extent: u32, size: u32, flags: u8) -> Vec<u8> {
    let pad = if name.len() % 2 == 0 { 1 } else { 0 };
    let length = 33 + name.len() + pad;
    let mut rec = vec![0u8; length];
    rec[0] = length as u8;
    rec[2..6].copy_from_slice(&extent.to_le_bytes());
    rec[6..10].copy_from_slice(&extent.to_be_bytes());
    rec[10..14].copy_from_slice(&size.to_le_bytes());
    rec[14..18].copy_from_slice(&size.to_be_bytes());
    rec[18..25].copy_from_slice(&[99, 6, 30, 12, 0, 0, 0]);
    rec[25] = flags;
    rec[28..30].copy_from_slice(&1u16.to_le_bytes());
    rec[30..32].copy_from_slice(&1u16.to_be_bytes());
    rec[32] = name.len() as u8;
    rec[33..33 + name.len()].copy_from_slice(name);
    rec
}

fn ucs2(name: &str) -> Vec<u8> {
    name.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
}

fn directory_sector(records: &[Vec<u8>]) -> Vec<u8> {
    let mut sector = vec![0u8; BLOCK];
    let mut pos = 0;
    for rec in records {
        sector[pos..pos + rec.len()].copy_from_slice(rec);
        pos += rec.len();
    }
    sector
}

/// Self and parent records every directory extent opens with.
fn dot_records(extent: u32, size: u32) -> Vec<Vec<u8>> {
    vec![dir_record(&[0x00], extent, size, 0x02), dir_record(&[0x01], 20, BLOCK as u32, 0x02)]
}

fn descriptor(descriptor_type: u8, volume_id: &[u8], root_extent: u32) -> Vec<u8> {
    let mut sector = vec![0u8; BLOCK];
    sector[0] = descriptor_type;
    sector[1..6].copy_from_slice(b"CD001");
    sector[6] = 1;
    for b in &mut sector[8..72] {
        *b = b' ';
    }
    sector[40..40 + volume_id.len()].copy_from_slice(volume_id);
    sector[80..84].copy_from_slice(&400u32.to_le_bytes());
    sector[84..88].copy_from_slice(&400u32.to_be_bytes());
    sector[120..122].copy_from_slice(&1u16.to_le_bytes());
    sector[122..124].copy_from_slice(&1u16.to_be_bytes());
    sector[124..126].copy_from_slice(&1u16.to_le_bytes());
    sector[126..128].copy_from_slice(&1u16.to_be_bytes());
    sector[128..130].copy_from_slice(&2048u16.to_le_bytes());
    sector[130..132].copy_from_slice(&2048u16.to_be_bytes());
    let root = dir_record(&[0x00], root_extent, BLOCK as u32, 0x02);
    sector[156..156 + root.len()].copy_from_slice(&root);
    for b in &mut sector[190..702] {
        *b = b' ';
    }
    sector
}

fn terminator() -> Vec<u8> {
    let mut sector = vec![0u8; BLOCK];
    sector[0] = 255;
    sector[1..6].copy_from_slice(b"CD001");
    sector[6] = 1;
    sector
}

/// A volume with a plain primary tree at sector 20 and a Joliet tree at
/// sector 30, sharing the file data at sector 40.
fn joliet_volume() -> ImageBuilder {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"PLAINVOL", 20));
    let mut svd = descriptor(2, &[], 30);
    svd[88..91].copy_from_slice(&[0x25, 0x2f, 0x45]);
    // UCS-2 identifiers: zero-fill, space padding would decode as U+2020.
    svd[40..72].fill(0);
    let id = ucs2("Joliet Volume");
    svd[40..40 + id.len()].copy_from_slice(&id);
    image.put(17, &svd);
    image.put(18, &terminator());

    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"README.TXT;1", 40, 13, 0));
    image.put(20, &directory_sector(&root));

    let mut joliet_root = dot_records(30, BLOCK as u32);
    joliet_root.push(dir_record(&ucs2("Read Me.txt"), 40, 13, 0));
    image.put(30, &directory_sector(&joliet_root));

    image.put(40, b"Hello, disc!\n");
    image
}

#[test]
fn joliet_namespace_is_preferred() {
    let mut session = mount(joliet_volume().cooked(), MountOptions::default()).unwrap();
    assert_eq!(session.namespace(), Namespace::Joliet);
    assert_eq!(session.volume_id(), "Joliet Volume");

    let entries = session.read_dir("/").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Read Me.txt");
    assert_eq!(session.read("/Read Me.txt").unwrap(), b"Hello, disc!\n");
}

#[test]
fn normal_namespace_uses_the_primary_tree() {
    let options = MountOptions { namespace: Namespace::Normal, ..MountOptions::default() };
    let mut session = mount(joliet_volume().cooked(), options).unwrap();
    assert_eq!(session.volume_id(), "PLAINVOL");

    let entries = session.read_dir("/").unwrap();
    assert_eq!(entries[0].name, "README.TXT");
    // Lookups are case-insensitive.
    assert_eq!(session.read("/readme.txt").unwrap(), b"Hello, disc!\n");
}

#[test]
fn joliet_falls_back_without_a_supplementary_descriptor() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"ONLYPVD", 20));
    image.put(17, &terminator());
    image.put(20, &directory_sector(&dot_records(20, BLOCK as u32)));

    let session = mount(image.cooked(), MountOptions::default()).unwrap();
    assert_eq!(session.namespace(), Namespace::Normal);
}

#[test]
fn subdirectory_walk() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"NESTED", 20));
    image.put(17, &terminator());

    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"SUB", 21, BLOCK as u32, 0x02));
    image.put(20, &directory_sector(&root));

    let mut sub = dot_records(21, BLOCK as u32);
    sub.push(dir_record(b"DATA.BIN;1", 40, 4, 0));
    image.put(21, &directory_sector(&sub));
    image.put(40, &[1, 2, 3, 4]);

    let mut session = mount(image.cooked(), MountOptions::default()).unwrap();
    let info = session.stat("/SUB").unwrap();
    assert!(info.is_directory);
    assert_eq!(session.read("/SUB/DATA.BIN").unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(session.map_block("/SUB/DATA.BIN", 0).unwrap(), 40);
}

#[test]
fn multi_extent_files_concatenate() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"BIGFILE", 20));
    image.put(17, &terminator());

    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"BIG.DAT;1", 41, 1024, 0x80));
    root.push(dir_record(b"BIG.DAT;1", 42, 1024, 0));
    image.put(20, &directory_sector(&root));
    image.put(41, &vec![0xaa; 1024]);
    image.put(42, &vec![0xbb; 1024]);

    let mut session = mount(image.cooked(), MountOptions::default()).unwrap();
    let info = session.stat("/BIG.DAT").unwrap();
    assert_eq!(info.size, 2048);
    assert_eq!(info.extents, vec![(41, 1024), (42, 1024)]);

    let data = session.read("/BIG.DAT").unwrap();
    assert_eq!(data.len(), 2048);
    assert!(data[..1024].iter().all(|&b| b == 0xaa));
    assert!(data[1024..].iter().all(|&b| b == 0xbb));
    // The second segment maps past the first one.
    assert_eq!(session.map_block("/BIG.DAT", 1).unwrap(), 42);
}

#[test]
fn ranged_reads_span_extent_boundaries() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"BIGFILE", 20));
    image.put(17, &terminator());

    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"BIG.DAT;1", 41, 1024, 0x80));
    root.push(dir_record(b"BIG.DAT;1", 42, 1024, 0));
    image.put(20, &directory_sector(&root));
    image.put(41, &vec![0xaa; 1024]);
    image.put(42, &vec![0xbb; 1024]);

    let mut session = mount(image.cooked(), MountOptions::default()).unwrap();
    let data = session.read_at("/BIG.DAT", 1000, 48).unwrap();
    assert_eq!(data.len(), 48);
    assert!(data[..24].iter().all(|&b| b == 0xaa));
    assert!(data[24..].iter().all(|&b| b == 0xbb));

    // A range past the end of the file is truncated, not an error.
    assert_eq!(session.read_at("/BIG.DAT", 2040, 100).unwrap().len(), 8);
    assert!(session.read_at("/BIG.DAT", 5000, 1).unwrap().is_empty());
}

#[test]
fn raw_mode1_image_reads_like_a_cooked_one() {
    let mut session = mount(joliet_volume().raw_mode1(), MountOptions::default()).unwrap();
    assert_eq!(session.volume_id(), "Joliet Volume");
    assert_eq!(session.read("/Read Me.txt").unwrap(), b"Hello, disc!\n");
}

#[test]
fn error_paths() {
    let mut session = mount(joliet_volume().cooked(), MountOptions::default()).unwrap();
    assert!(matches!(session.read("/MISSING.TXT"), Err(Error::NoSuchFile(_))));
    assert!(matches!(session.read("/"), Err(Error::IsDirectory(_))));
    assert!(matches!(
        session.read("/Read Me.txt/deeper"),
        Err(Error::NotDirectory(_))
    ));
    assert!(matches!(
        session.get_xattr("/Read Me.txt", "org.example.nope"),
        Err(Error::NoSuchExtendedAttribute(_))
    ));
}

#[test]
fn no_descriptors_fails_to_mount() {
    let image = ImageBuilder::new(20);
    assert!(matches!(
        mount(image.cooked(), MountOptions::default()),
        Err(Error::NoPrimaryDescriptor)
    ));
}

#[test]
fn debug_pseudo_files() {
    let options = MountOptions { debug: true, ..MountOptions::default() };
    let mut session = mount(joliet_volume().cooked(), options).unwrap();

    let names: Vec<String> =
        session.read_dir("/").unwrap().into_iter().map(|e| e.name).collect();
    assert!(names.contains(&"$PVD".to_string()));

    let pvd = session.read("/$PVD").unwrap();
    assert_eq!(pvd.len(), 2048);
    assert_eq!(&pvd[1..6], b"CD001");
}

#[test]
fn trans_tbl_renames_entries() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"TRANSVOL", 20));
    image.put(17, &terminator());

    let table = b"F README.TXT;1                  A much longer readme name.txt\n";
    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"README.TXT;1", 40, 13, 0));
    root.push(dir_record(b"TRANS.TBL;1", 41, table.len() as u32, 0));
    image.put(20, &directory_sector(&root));
    image.put(40, b"Hello, disc!\n");
    image.put(41, table);

    let options = MountOptions {
        namespace: Namespace::Normal,
        use_trans_tbl: true,
        ..MountOptions::default()
    };
    let mut session = mount(image.cooked(), options).unwrap();
    let names: Vec<String> =
        session.read_dir("/").unwrap().into_iter().map(|e| e.name).collect();
    assert!(names.contains(&"A much longer readme name.txt".to_string()));
    assert_eq!(
        session.read("/A much longer readme name.txt").unwrap(),
        b"Hello, disc!\n"
    );
}

#[test]
fn path_table_directory_resolution() {
    let mut image = ImageBuilder::new(64);
    let mut pvd = descriptor(1, b"PATHTBL", 20);
    // L-type path table at sector 19
    let mut table = Vec::new();
    table.extend_from_slice(&[1, 0]);
    table.extend_from_slice(&20u32.to_le_bytes());
    table.extend_from_slice(&1u16.to_le_bytes());
    table.extend_from_slice(&[0x00, 0x00]);
    table.extend_from_slice(&[3, 0]);
    table.extend_from_slice(&21u32.to_le_bytes());
    table.extend_from_slice(&1u16.to_le_bytes());
    table.extend_from_slice(b"SUB");
    table.push(0x00);
    pvd[132..136].copy_from_slice(&(table.len() as u32).to_le_bytes());
    pvd[136..140].copy_from_slice(&(table.len() as u32).to_be_bytes());
    pvd[140..144].copy_from_slice(&19u32.to_le_bytes());
    image.put(16, &pvd);
    image.put(17, &terminator());
    image.put(19, &table);

    let mut root = dot_records(20, BLOCK as u32);
    root.push(dir_record(b"SUB", 21, BLOCK as u32, 0x02));
    image.put(20, &directory_sector(&root));

    let mut sub = dot_records(21, BLOCK as u32);
    sub.push(dir_record(b"DATA.BIN;1", 40, 4, 0));
    image.put(21, &directory_sector(&sub));
    image.put(40, &[9, 8, 7, 6]);

    let options = MountOptions {
        namespace: Namespace::Normal,
        use_path_table: true,
        ..MountOptions::default()
    };
    let mut session = mount(image.cooked(), options).unwrap();
    assert_eq!(session.read("/SUB/DATA.BIN").unwrap(), vec![9, 8, 7, 6]);
}

#[test]
fn mounts_from_a_file_on_disk() {
    use std::io::Write as _;
    let image = joliet_volume();
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&image.data).unwrap();
    tmp.flush().unwrap();

    let f = std::fs::File::open(tmp.path()).unwrap();
    let mut session =
        mount(RawImage::new(f, 2048).unwrap(), MountOptions::default()).unwrap();
    assert_eq!(session.read("/Read Me.txt").unwrap(), b"Hello, disc!\n");
}

#[test]
fn associated_file_xattr() {
    let mut image = ImageBuilder::new(64);
    image.put(16, &descriptor(1, b"ASSOC", 20));
    image.put(17, &terminator());

    let mut root = dot_records(20, BLOCK as u32);
    // Associated record first, as written by mastering tools.
    root.push(dir_record(b"FILE.TXT;1", 41, 8, 0x04));
    root.push(dir_record(b"FILE.TXT;1", 40, 5, 0));
    image.put(20, &directory_sector(&root));
    image.put(40, b"hello");
    image.put(41, b"resource");

    let options = MountOptions { namespace: Namespace::Normal, ..MountOptions::default() };
    let mut session = mount(image.cooked(), options).unwrap();
    assert_eq!(session.read("/FILE.TXT").unwrap(), b"hello");
    let names = session.list_xattr("/FILE.TXT").unwrap();
    assert_eq!(names, vec!["org.iso9660.AssociatedFile".to_string()]);
    assert_eq!(
        session.get_xattr("/FILE.TXT", "org.iso9660.AssociatedFile").unwrap(),
        b"resource"
    );
}
