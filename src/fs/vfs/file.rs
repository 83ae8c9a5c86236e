//! Tabela global de arquivos abertos.

use crate::fs::devfs::DevHandle;
use crate::fs::fat32::node::OpenNode;
use crate::fs::procfs::ProcHandle;
use crate::sys::Pid;

/// Slots na tabela global. Índices são reutilizados após close.
pub const FILE_TABLE_SIZE: usize = 128;

/// Estado por-handler de um arquivo aberto.
#[derive(Debug, Clone, Copy)]
pub enum FileNode {
    Cluster(OpenNode),
    Dev(DevHandle),
    Proc(ProcHandle),
}

/// Entrada da tabela global: em qual montagem o arquivo vive, quem abriu
/// e o estado do handle.
#[derive(Debug, Clone, Copy)]
pub struct FileTableEntry {
    pub mount: usize,
    pub owner: Pid,
    pub node: FileNode,
}
