//! Testes do `/dev`.

#![cfg(test)]

use super::fresh_vfs;
use crate::fs::devfs::{self, STDIN_BUFFER_SIZE};
use crate::fs::fat32::Fat32Error;
use crate::fs::vfs::VfsError;

#[test]
fn test_stdout_reaches_console() {
    let (mut vfs, console, _) = fresh_vfs();
    let fd = vfs.open("/dev/stdout", 1).unwrap();
    vfs.write(fd, 1, b"ola mundo").unwrap();
    assert_eq!(console.contents(), b"ola mundo");
}

#[test]
fn test_stdin_blocks_until_input() {
    let (mut vfs, _, input) = fresh_vfs();
    let fd = vfs.open("/dev/stdin", 1).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(vfs.read(fd, 1, &mut buf), Err(VfsError::WouldBlock));

    devfs::push_input(&input, b'k');
    devfs::push_input(&input, b'b');
    assert_eq!(vfs.read(fd, 1, &mut buf).unwrap(), 2);
    assert_eq!(&buf[..2], b"kb");
    // fila drenada volta a bloquear
    assert_eq!(vfs.read(fd, 1, &mut buf), Err(VfsError::WouldBlock));
}

#[test]
fn test_double_open_same_pid_refused() {
    let (mut vfs, _, _) = fresh_vfs();
    vfs.open("/dev/stdin", 1).unwrap();
    assert_eq!(
        vfs.open("/dev/stdin", 1),
        Err(VfsError::Fs(Fat32Error::AlreadyExists))
    );
}

#[test]
fn test_foreground_stack_ordering() {
    let (mut vfs, _, input) = fresh_vfs();
    let fd1 = vfs.open("/dev/stdin", 1).unwrap();
    let fd2 = vfs.open("/dev/stdin", 2).unwrap();
    devfs::push_input(&input, b'z');

    let mut buf = [0u8; 1];
    // pid 2 está no topo; pid 1 espera
    assert_eq!(vfs.read(fd1, 1, &mut buf), Err(VfsError::WouldBlock));
    assert_eq!(vfs.read(fd2, 2, &mut buf).unwrap(), 1);
    assert_eq!(buf[0], b'z');

    // fechar devolve o foreground para o pid 1
    vfs.close(fd2, 2).unwrap();
    devfs::push_input(&input, b'w');
    assert_eq!(vfs.read(fd1, 1, &mut buf).unwrap(), 1);
    assert_eq!(buf[0], b'w');
}

#[test]
fn test_ring_drops_oldest_on_overflow() {
    let (mut vfs, _, input) = fresh_vfs();
    let fd = vfs.open("/dev/stdin", 1).unwrap();

    for i in 0..(STDIN_BUFFER_SIZE + 4) {
        devfs::push_input(&input, b'a' + (i % 26) as u8);
    }
    let mut buf = [0u8; 32];
    let got = vfs.read(fd, 1, &mut buf).unwrap();
    assert_eq!(got, STDIN_BUFFER_SIZE);
    // os 4 primeiros bytes foram descartados
    assert_eq!(buf[0], b'a' + 4);
}

#[test]
fn test_stdin_readable_predicate() {
    let (mut vfs, _, input) = fresh_vfs();
    vfs.open("/dev/stdin", 5).unwrap();

    assert!(!vfs.devfs().unwrap().stdin_readable(5), "fila vazia");
    devfs::push_input(&input, b'1');
    assert!(vfs.devfs().unwrap().stdin_readable(5));
    assert!(
        !vfs.devfs().unwrap().stdin_readable(6),
        "só o foreground enxerga a fila"
    );
}

#[test]
fn test_dev_listing_and_write_to_stdin() {
    let (mut vfs, _, _) = fresh_vfs();
    let listing = vfs.dirstat("/dev").unwrap();
    let names: alloc::vec::Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["stdin", "stdout"]);
    assert_eq!(vfs.stat("/dev").unwrap().size, 2);

    let fd = vfs.open("/dev/stdin", 1).unwrap();
    assert_eq!(vfs.write(fd, 1, b"x"), Err(VfsError::Unsupported));
}
