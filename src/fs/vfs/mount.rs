//! Pontos de montagem.

use super::path;
use crate::fs::devfs::DevFs;
use crate::fs::fat32::Fat32Handler;
use crate::fs::procfs::ProcFs;
use alloc::string::String;

/// Quantidade máxima de montagens simultâneas.
pub const VFS_MOUNT_MAX: usize = 8;

/// União etiquetada dos filesystems montáveis. Capacidades ausentes viram
/// `VfsError::Unsupported` no despacho, nunca ponteiro nulo.
pub enum FsHandler {
    Cluster(Fat32Handler),
    Dev(DevFs),
    Proc(ProcFs),
}

/// Tipo do handler, para a desmontagem conferir caminho e tipo juntos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    Cluster,
    Dev,
    Proc,
}

impl FsHandler {
    pub fn kind(&self) -> FsKind {
        match self {
            Self::Cluster(_) => FsKind::Cluster,
            Self::Dev(_) => FsKind::Dev,
            Self::Proc(_) => FsKind::Proc,
        }
    }
}

pub struct MountPoint {
    /// Caminho absoluto normalizado ("/", "/dev", ...).
    pub path: String,
    /// Diretório que contém o ponto de montagem.
    pub dirname: String,
    /// Último componente do caminho ("" para a raiz).
    pub basename: String,
    pub handler: FsHandler,
}

impl MountPoint {
    pub fn new(mount_path: &str, handler: FsHandler) -> Self {
        let normalized = path::normalize(mount_path);
        let (dirname, basename) = path::split(normalized);
        Self {
            path: String::from(normalized),
            dirname: String::from(dirname),
            basename: String::from(basename),
            handler,
        }
    }
}
