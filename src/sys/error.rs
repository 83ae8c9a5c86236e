//! Códigos de status retornados pela fronteira de syscall.
//!
//! Internamente cada camada usa o seu enum de erro (`Fat32Error`, `VfsError`,
//! `MmError`, `ProcError`) com `Result` + `?`. Na borda com userspace tudo
//! vira um código pequeno e negativo em eax; sucesso é >= 0. Sem exceções,
//! sem unwinding, sem retry: cada operação é tentada exatamente uma vez.

use crate::fs::fat32::Fat32Error;
use crate::fs::vfs::VfsError;
use crate::mm::MmError;
use crate::sched::process::ProcError;

/// Código de status plano entregue a userspace.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,

    // Filesystem
    NotFound = 1,
    AlreadyExists = 2,
    NotAFile = 3,
    NotADirectory = 4,
    BufferTooSmall = 5,
    ParentInvalid = 6,
    OutOfSpace = 7,
    DirectoryNotEmpty = 8,
    DiskFailure = 9,

    // VFS
    NoHandler = 16,
    Unsupported = 17,
    BadFileTable = 18,
    WouldBlock = 19,

    // Paging
    OutOfFrames = 32,
    NotMapped = 33,

    // Processo
    MaxProcessesExceeded = 48,
    NotEnoughMemory = 49,
    InvalidEntrypoint = 50,
    FsReadFailure = 51,
    CannotKillSelf = 52,
    NoSuchProcess = 53,

    // Genérico
    InvalidSyscall = 64,
}

impl ErrorCode {
    /// Valor negativo para o registrador de retorno.
    pub const fn as_i32(self) -> i32 {
        -(self as i32)
    }
}

impl From<Fat32Error> for ErrorCode {
    fn from(err: Fat32Error) -> Self {
        match err {
            Fat32Error::NotFound => Self::NotFound,
            Fat32Error::AlreadyExists => Self::AlreadyExists,
            Fat32Error::NotAFile => Self::NotAFile,
            Fat32Error::NotADirectory => Self::NotADirectory,
            Fat32Error::BufferTooSmall => Self::BufferTooSmall,
            Fat32Error::ParentInvalid => Self::ParentInvalid,
            Fat32Error::OutOfSpace => Self::OutOfSpace,
            Fat32Error::DirectoryNotEmpty => Self::DirectoryNotEmpty,
            Fat32Error::Disk(_) => Self::DiskFailure,
        }
    }
}

impl From<VfsError> for ErrorCode {
    fn from(err: VfsError) -> Self {
        match err {
            VfsError::NoHandler => Self::NoHandler,
            VfsError::Unsupported => Self::Unsupported,
            VfsError::BadFileTable => Self::BadFileTable,
            VfsError::WouldBlock => Self::WouldBlock,
            VfsError::MountTableFull => Self::NoHandler,
            VfsError::Fs(inner) => inner.into(),
        }
    }
}

impl From<MmError> for ErrorCode {
    fn from(err: MmError) -> Self {
        match err {
            MmError::OutOfFrames | MmError::PoolExhausted => Self::OutOfFrames,
            MmError::NotMapped => Self::NotMapped,
        }
    }
}

impl From<ProcError> for ErrorCode {
    fn from(err: ProcError) -> Self {
        match err {
            ProcError::MaxProcessesExceeded => Self::MaxProcessesExceeded,
            ProcError::NotEnoughMemory => Self::NotEnoughMemory,
            ProcError::InvalidEntrypoint => Self::InvalidEntrypoint,
            ProcError::FsReadFailure => Self::FsReadFailure,
            ProcError::CannotKillSelf => Self::CannotKillSelf,
            ProcError::NotFound => Self::NoSuchProcess,
        }
    }
}
