//! Filesystem - camada de armazenamento e VFS
//!
//! `fat32` implementa o driver do volume em clusters, `vfs` faz o
//! despacho por ponto de montagem, `devfs` e `procfs` são os
//! filesystems sintéticos montados em `/dev` e `/proc`.

pub mod devfs;
pub mod fat32;
pub mod procfs;
pub mod vfs;

#[cfg(test)]
mod tests;
