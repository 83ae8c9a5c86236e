//! Testes do despacho por ponto de montagem.

#![cfg(test)]

use super::fresh_vfs;
use crate::fs::fat32::Fat32Error;
use crate::fs::procfs::ProcFs;
use crate::fs::vfs::{FsHandler, FsKind, VfsError};

#[test]
fn test_longest_prefix_dispatch() {
    let (mut vfs, _, _) = fresh_vfs();

    // "/dev/stdout" cai no devfs, não no volume raiz
    let fd = vfs.open("/dev/stdout", 1).unwrap();
    assert_eq!(vfs.write(fd, 1, b"x").unwrap(), 1);

    // "/devx" compartilha prefixo com "/dev" mas pertence à raiz
    vfs.mkfile("/devx").unwrap();
    let stat = vfs.stat("/devx").unwrap();
    assert!(!stat.is_directory);
}

#[test]
fn test_child_mounts_spliced_into_root() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.mkdir("/real").unwrap();

    let listing = vfs.dirstat("/").unwrap();
    let names: alloc::vec::Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"real"));
    assert!(names.contains(&"dev"), "montagem filha costurada: {:?}", names);
    assert!(names.contains(&"proc"));
    for entry in &listing {
        if entry.name == "dev" || entry.name == "proc" {
            assert!(entry.is_directory);
        }
    }

    // stat da raiz: 1 diretório real + 2 montagens
    assert_eq!(vfs.stat("/").unwrap().size, 3);
}

#[test]
fn test_file_table_slot_reuse() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.mkfile("/f").unwrap();

    let first = vfs.open("/f", 1).unwrap();
    let second = vfs.open("/f", 1).unwrap();
    assert_ne!(first, second);
    vfs.close(first, 1).unwrap();
    let third = vfs.open("/f", 1).unwrap();
    assert_eq!(third, first, "índice liberado é reutilizado");
}

#[test]
fn test_file_table_owner_enforced() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.mkfile("/f").unwrap();
    let fd = vfs.open("/f", 1).unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(vfs.read(fd, 2, &mut buf), Err(VfsError::BadFileTable));
    assert_eq!(vfs.close(fd, 2), Err(VfsError::BadFileTable));
    assert!(vfs.close(fd, 1).is_ok());
    assert_eq!(vfs.read(fd, 1, &mut buf), Err(VfsError::BadFileTable));
}

#[test]
fn test_unsupported_capability() {
    let (mut vfs, _, _) = fresh_vfs();
    assert_eq!(vfs.mkdir("/dev/novo"), Err(VfsError::Unsupported));
    assert_eq!(vfs.delete("/proc/1"), Err(VfsError::Unsupported));
}

#[test]
fn test_no_handler_without_root() {
    let mut vfs = crate::fs::vfs::Vfs::new();
    vfs.mount("/proc", FsHandler::Proc(ProcFs::new())).unwrap();
    assert_eq!(vfs.stat("/qualquer"), Err(VfsError::NoHandler));
}

#[test]
fn test_mount_table_capacity() {
    let (mut vfs, _, _) = fresh_vfs();
    // 3 montagens já ocupadas pelo helper
    for i in 3..8 {
        let path = alloc::format!("/m{}", i);
        vfs.mount(&path, FsHandler::Proc(ProcFs::new())).unwrap();
    }
    assert_eq!(
        vfs.mount("/sobra", FsHandler::Proc(ProcFs::new())),
        Err(VfsError::MountTableFull)
    );
}

#[test]
fn test_unmount_checks_path_and_kind() {
    let (mut vfs, _, _) = fresh_vfs();

    // tipo errado não desmonta nada
    assert_eq!(
        vfs.unmount("/dev", FsKind::Proc),
        Err(VfsError::NoHandler)
    );
    assert!(vfs.stat("/dev").is_ok());

    vfs.unmount("/dev", FsKind::Dev).unwrap();
    assert_eq!(vfs.stat("/dev/stdout"), Err(VfsError::Fs(Fat32Error::NotFound)));
    assert_eq!(vfs.unmount("/dev", FsKind::Dev), Err(VfsError::NoHandler));

    // o slot liberado aceita montagem nova
    vfs.mount("/outra", FsHandler::Proc(ProcFs::new())).unwrap();
    assert!(vfs.stat("/outra").is_ok());
}

#[test]
fn test_close_all_for_releases_everything() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.mkfile("/a").unwrap();
    vfs.mkfile("/b").unwrap();
    let fa = vfs.open("/a", 7).unwrap();
    let _fb = vfs.open("/b", 7).unwrap();
    let f_other = vfs.open("/a", 8).unwrap();

    vfs.close_all_for(7);
    let mut buf = [0u8; 1];
    assert_eq!(vfs.read(fa, 7, &mut buf), Err(VfsError::BadFileTable));
    // o fd de outro processo sobrevive
    assert!(vfs.read(f_other, 8, &mut buf).is_ok());
}

#[test]
fn test_seek_survives_table_roundtrip() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.rootfs_mut()
        .unwrap()
        .write_file("seq.bin", b"0123456789")
        .unwrap();

    let fd = vfs.open("/seq.bin", 1).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(vfs.read(fd, 1, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"0123");
    assert_eq!(vfs.read(fd, 1, &mut buf).unwrap(), 4);
    assert_eq!(&buf, b"4567");
}

#[test]
fn test_vfs_errors_map_to_fs_codes() {
    let (vfs, _, _) = fresh_vfs();
    assert_eq!(
        vfs.stat("/nada"),
        Err(VfsError::Fs(Fat32Error::NotFound))
    );
}
