//! Testes do `/proc`.

#![cfg(test)]

use super::fresh_vfs;
use crate::fs::fat32::Fat32Error;
use crate::fs::vfs::VfsError;

#[test]
fn test_registry_drives_listing() {
    let (mut vfs, _, _) = fresh_vfs();
    {
        let procfs = vfs.procfs_mut().unwrap();
        procfs.register(1, "shell");
        procfs.register(2, "editor");
    }

    assert_eq!(vfs.stat("/proc").unwrap().size, 2);
    let listing = vfs.dirstat("/proc").unwrap();
    let names: alloc::vec::Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["1", "2"]);

    let stat = vfs.stat("/proc/1").unwrap();
    assert!(!stat.is_directory);
    assert_eq!(stat.size, 5, "tamanho é o nome do processo");
}

#[test]
fn test_read_process_name_with_seek() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.procfs_mut().unwrap().register(3, "compilador");

    let fd = vfs.open("/proc/3", 9).unwrap();
    let mut buf = [0u8; 6];
    assert_eq!(vfs.read(fd, 9, &mut buf).unwrap(), 6);
    assert_eq!(&buf, b"compil");
    assert_eq!(vfs.read(fd, 9, &mut buf).unwrap(), 4);
    assert_eq!(&buf[..4], b"ador");
    assert_eq!(vfs.read(fd, 9, &mut buf).unwrap(), 0);
}

#[test]
fn test_unregister_removes_entry() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.procfs_mut().unwrap().register(4, "efemero");
    assert!(vfs.stat("/proc/4").is_ok());

    vfs.procfs_mut().unwrap().unregister(4);
    assert_eq!(
        vfs.stat("/proc/4"),
        Err(VfsError::Fs(Fat32Error::NotFound))
    );
    assert_eq!(vfs.stat("/proc").unwrap().size, 0);
}

#[test]
fn test_bogus_names_rejected() {
    let (vfs, _, _) = fresh_vfs();
    assert_eq!(
        vfs.stat("/proc/abc"),
        Err(VfsError::Fs(Fat32Error::NotFound))
    );
}
