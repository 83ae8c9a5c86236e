//! VFS - despacho por ponto de montagem
//!
//! Camada fina e sem política: resolve o prefixo mais longo entre as
//! montagens, entrega a operação ao handler responsável e mantém a tabela
//! global de arquivos abertos. Montagens filhas aparecem costuradas no
//! `stat` e no `dirstat` do diretório pai.

pub mod file;
pub mod mount;
pub mod path;

pub use file::{FileNode, FileTableEntry, FILE_TABLE_SIZE};
pub use mount::{FsHandler, FsKind, MountPoint, VFS_MOUNT_MAX};

use crate::fs::fat32::Fat32Error;
use crate::sys::Pid;
use crate::{kinfo, kwarn};
use alloc::string::String;
use alloc::vec::Vec;

/// Erros próprios da camada de despacho. Erros do volume passam
/// embrulhados sem tradução.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsError {
    /// Nenhuma montagem cobre o caminho.
    NoHandler,
    /// O handler existe mas não implementa a operação.
    Unsupported,
    /// Índice de arquivo inválido, liberado ou de outro dono.
    BadFileTable,
    /// A operação bloquearia; o chamador instala um notifier.
    WouldBlock,
    /// Tabela de montagens cheia.
    MountTableFull,
    Fs(Fat32Error),
}

impl From<Fat32Error> for VfsError {
    fn from(err: Fat32Error) -> Self {
        Self::Fs(err)
    }
}

/// Entrada de stat/dirstat entregue a userspace. Para diretórios `size` é
/// o número de filhos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: u32,
}

pub struct Vfs {
    mounts: [Option<MountPoint>; VFS_MOUNT_MAX],
    files: [Option<FileTableEntry>; FILE_TABLE_SIZE],
}

impl Vfs {
    pub fn new() -> Self {
        Self {
            mounts: core::array::from_fn(|_| None),
            files: [None; FILE_TABLE_SIZE],
        }
    }

    /// Registra um handler no primeiro slot livre.
    pub fn mount(&mut self, mount_path: &str, handler: FsHandler) -> Result<(), VfsError> {
        let slot = self
            .mounts
            .iter()
            .position(|m| m.is_none())
            .ok_or(VfsError::MountTableFull)?;
        self.mounts[slot] = Some(MountPoint::new(mount_path, handler));
        kinfo!("vfs: montado '{}' no slot {}", mount_path, slot);
        Ok(())
    }

    /// Remove uma montagem. Caminho e tipo do handler precisam conferir
    /// com os registrados.
    pub fn unmount(&mut self, mount_path: &str, kind: mount::FsKind) -> Result<(), VfsError> {
        let normalized = path::normalize(mount_path);
        let slot = self
            .mounts
            .iter()
            .position(|m| {
                matches!(m, Some(m) if m.path == normalized && m.handler.kind() == kind)
            })
            .ok_or(VfsError::NoHandler)?;
        self.mounts[slot] = None;
        kinfo!("vfs: desmontado '{}' do slot {}", normalized, slot);
        Ok(())
    }

    /// Prefixo mais longo entre as montagens. Retorna o índice da montagem
    /// e o caminho relativo a ela.
    fn resolve<'p>(&self, full_path: &'p str) -> Result<(usize, &'p str), VfsError> {
        let full = path::normalize(full_path);
        let mut best: Option<(usize, usize)> = None;
        for (i, mount) in self.mounts.iter().enumerate() {
            let Some(mount) = mount else { continue };
            let matched = path::count_match(&mount.path, full);
            if matched < mount.path.len() {
                continue;
            }
            // o prefixo precisa terminar em borda de componente
            let rest = &full[mount.path.len()..];
            if !(rest.is_empty() || rest.starts_with('/') || mount.path == "/") {
                continue;
            }
            if best.map_or(true, |(_, len)| mount.path.len() > len) {
                best = Some((i, mount.path.len()));
            }
        }
        let (index, prefix_len) = best.ok_or(VfsError::NoHandler)?;
        Ok((index, full[prefix_len..].trim_start_matches('/')))
    }

    fn handler(&self, index: usize) -> &FsHandler {
        // resolve só devolve índices ocupados
        &self.mounts[index].as_ref().unwrap().handler
    }

    fn handler_mut(&mut self, index: usize) -> &mut FsHandler {
        &mut self.mounts[index].as_mut().unwrap().handler
    }

    /// Montagens cujo diretório pai é `parent`.
    fn child_mounts<'s>(&'s self, parent: &'s str) -> impl Iterator<Item = &'s MountPoint> {
        self.mounts.iter().flatten().filter(move |m| {
            m.path != "/" && m.dirname == parent
        })
    }

    pub fn stat(&self, full_path: &str) -> Result<VfsEntry, VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let mut entry = match self.handler(index) {
            FsHandler::Cluster(h) => h.stat(rel)?,
            FsHandler::Dev(h) => h.stat(rel)?,
            FsHandler::Proc(h) => h.stat(rel)?,
        };
        if entry.is_directory {
            let full = path::normalize(full_path);
            entry.size += self.child_mounts(full).count() as u32;
        }
        Ok(entry)
    }

    pub fn dirstat(&self, full_path: &str) -> Result<Vec<VfsEntry>, VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let mut listing = match self.handler(index) {
            FsHandler::Cluster(h) => h.dirstat(rel)?,
            FsHandler::Dev(h) => {
                if !rel.is_empty() {
                    return Err(Fat32Error::NotADirectory.into());
                }
                h.dirstat()
            }
            FsHandler::Proc(h) => {
                if !rel.is_empty() {
                    return Err(Fat32Error::NotADirectory.into());
                }
                h.dirstat()
            }
        };
        // montagens filhas aparecem como diretórios na listagem do pai
        let full = path::normalize(full_path);
        for mount in self.child_mounts(full) {
            listing.push(VfsEntry {
                name: mount.basename.clone(),
                is_directory: true,
                size: 0,
            });
        }
        Ok(listing)
    }

    /// Abre um caminho e devolve o índice na tabela global.
    pub fn open(&mut self, full_path: &str, pid: Pid) -> Result<usize, VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let rel_owned = String::from(rel);
        let node = match self.handler_mut(index) {
            FsHandler::Cluster(h) => FileNode::Cluster(h.open(&rel_owned)?),
            FsHandler::Dev(h) => FileNode::Dev(h.open(&rel_owned, pid)?),
            FsHandler::Proc(h) => FileNode::Proc(h.open(&rel_owned)?),
        };
        let slot = self
            .files
            .iter()
            .position(|f| f.is_none())
            .ok_or(VfsError::BadFileTable)?;
        self.files[slot] = Some(FileTableEntry {
            mount: index,
            owner: pid,
            node,
        });
        Ok(slot)
    }

    fn entry_for(&self, fd: usize, pid: Pid) -> Result<FileTableEntry, VfsError> {
        let entry = self
            .files
            .get(fd)
            .copied()
            .flatten()
            .ok_or(VfsError::BadFileTable)?;
        if entry.owner != pid {
            return Err(VfsError::BadFileTable);
        }
        Ok(entry)
    }

    pub fn close(&mut self, fd: usize, pid: Pid) -> Result<(), VfsError> {
        let entry = self.entry_for(fd, pid)?;
        if let FileNode::Dev(handle) = entry.node {
            if let FsHandler::Dev(h) = self.handler_mut(entry.mount) {
                h.close(handle, pid);
            }
        }
        self.files[fd] = None;
        Ok(())
    }

    pub fn read(&mut self, fd: usize, pid: Pid, buf: &mut [u8]) -> Result<usize, VfsError> {
        let entry = self.entry_for(fd, pid)?;
        let mut node = entry.node;
        let result = match (&mut node, self.handler_mut(entry.mount)) {
            (FileNode::Cluster(n), FsHandler::Cluster(h)) => h.read(n, buf).map_err(VfsError::from),
            (FileNode::Dev(n), FsHandler::Dev(h)) => h.read(*n, pid, buf),
            (FileNode::Proc(n), FsHandler::Proc(h)) => h.read(n, buf),
            _ => Err(VfsError::BadFileTable),
        };
        match result {
            Ok(count) => {
                // regrava o seek avançado
                if let Some(slot) = self.files[fd].as_mut() {
                    slot.node = node;
                }
                Ok(count)
            }
            Err(err) => Err(err),
        }
    }

    pub fn write(&mut self, fd: usize, pid: Pid, data: &[u8]) -> Result<usize, VfsError> {
        let entry = self.entry_for(fd, pid)?;
        let mut node = entry.node;
        let result = match (&mut node, self.handler_mut(entry.mount)) {
            (FileNode::Cluster(n), FsHandler::Cluster(h)) => {
                h.write(n, data).map_err(VfsError::from)
            }
            (FileNode::Dev(n), FsHandler::Dev(h)) => h.write(*n, data),
            (FileNode::Proc(_), FsHandler::Proc(_)) => Err(VfsError::Unsupported),
            _ => Err(VfsError::BadFileTable),
        };
        match result {
            Ok(count) => {
                if let Some(slot) = self.files[fd].as_mut() {
                    slot.node = node;
                }
                Ok(count)
            }
            Err(err) => Err(err),
        }
    }

    pub fn mkfile(&mut self, full_path: &str) -> Result<(), VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let rel_owned = String::from(rel);
        match self.handler_mut(index) {
            FsHandler::Cluster(h) => Ok(h.mkfile(&rel_owned)?),
            _ => Err(VfsError::Unsupported),
        }
    }

    pub fn mkdir(&mut self, full_path: &str) -> Result<(), VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let rel_owned = String::from(rel);
        match self.handler_mut(index) {
            FsHandler::Cluster(h) => Ok(h.mkdir(&rel_owned)?),
            _ => Err(VfsError::Unsupported),
        }
    }

    pub fn delete(&mut self, full_path: &str) -> Result<(), VfsError> {
        let (index, rel) = self.resolve(full_path)?;
        let rel_owned = String::from(rel);
        match self.handler_mut(index) {
            FsHandler::Cluster(h) => Ok(h.delete(&rel_owned)?),
            _ => Err(VfsError::Unsupported),
        }
    }

    /// Fecha tudo que `pid` deixou aberto. Chamado na destruição do
    /// processo.
    pub fn close_all_for(&mut self, pid: Pid) {
        for fd in 0..FILE_TABLE_SIZE {
            let owned = matches!(self.files[fd], Some(e) if e.owner == pid);
            if owned {
                if self.close(fd, pid).is_err() {
                    kwarn!("vfs: close forçado falhou para fd {}", fd);
                }
            }
        }
    }

    /// Acesso direto ao handler do devfs, para o notifier e o teclado.
    pub fn devfs(&self) -> Option<&crate::fs::devfs::DevFs> {
        self.mounts.iter().flatten().find_map(|m| match &m.handler {
            FsHandler::Dev(h) => Some(h),
            _ => None,
        })
    }

    pub fn devfs_mut(&mut self) -> Option<&mut crate::fs::devfs::DevFs> {
        self.mounts
            .iter_mut()
            .flatten()
            .find_map(|m| match &mut m.handler {
                FsHandler::Dev(h) => Some(h),
                _ => None,
            })
    }

    /// Acesso direto ao registro do procfs, para o gerente de processos.
    pub fn procfs_mut(&mut self) -> Option<&mut crate::fs::procfs::ProcFs> {
        self.mounts
            .iter_mut()
            .flatten()
            .find_map(|m| match &mut m.handler {
                FsHandler::Proc(h) => Some(h),
                _ => None,
            })
    }

    /// Handler do volume raiz, para carga de executáveis e ferramentas de
    /// boot.
    pub fn rootfs_mut(&mut self) -> Option<&mut crate::fs::fat32::Fat32Handler> {
        self.mounts
            .iter_mut()
            .flatten()
            .find_map(|m| match &mut m.handler {
                FsHandler::Cluster(h) if m.path == "/" => Some(h),
                _ => None,
            })
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}
