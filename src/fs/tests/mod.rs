//! Testes do filesystem (driver, VFS e filesystems sintéticos).

#![cfg(test)]

mod devfs;
mod integration;
mod procfs;
mod vfs;

use crate::drivers::block::RamDisk;
use crate::drivers::console::BufferConsole;
use crate::fs::devfs::{DevFs, InputQueue};
use crate::fs::fat32::{Fat32Driver, Fat32Handler};
use crate::fs::procfs::ProcFs;
use crate::fs::vfs::{FsHandler, Vfs};
use alloc::boxed::Box;
use alloc::sync::Arc;

/// Blocos suficientes para os 512 clusters endereçáveis do volume.
pub const TEST_DISK_BLOCKS: u32 = 2048;

pub fn fresh_driver() -> Fat32Driver {
    let mut driver = Fat32Driver::new(Box::new(RamDisk::new(TEST_DISK_BLOCKS)));
    driver.initialize().unwrap();
    driver
}

/// VFS completo: volume em `/`, devfs em `/dev`, procfs em `/proc`.
/// Devolve também o console e a fila de entrada para inspeção.
pub fn fresh_vfs() -> (Vfs, Arc<BufferConsole>, InputQueue) {
    let console = Arc::new(BufferConsole::new());
    let input = crate::fs::devfs::new_input_queue();
    let mut vfs = Vfs::new();
    vfs.mount("/", FsHandler::Cluster(Fat32Handler::new(fresh_driver())))
        .unwrap();
    vfs.mount(
        "/dev",
        FsHandler::Dev(DevFs::new(Box::new(console.clone()), input.clone())),
    )
    .unwrap();
    vfs.mount("/proc", FsHandler::Proc(ProcFs::new())).unwrap();
    (vfs, console, input)
}
