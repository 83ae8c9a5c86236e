//! Memory Management - páginas de 4MB e heap do kernel

pub mod heap;
pub mod paging;


pub use paging::{DirId, PageDirectory, PageManager};

/// Erros do gerente de páginas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Nenhum frame físico livre.
    OutOfFrames,
    /// O endereço virtual não está mapeado no diretório.
    NotMapped,
    /// O pool de diretórios acabou.
    PoolExhausted,
}
