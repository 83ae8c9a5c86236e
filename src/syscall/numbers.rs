//! Números de syscall e layout dos registros trocados com userspace.

/// Vetor de software dedicado a syscalls.
pub const SYSCALL_VECTOR: u32 = 0x30;

// VFS
pub const SYS_OPEN: u32 = 0;
pub const SYS_CLOSE: u32 = 1;
pub const SYS_READ: u32 = 2;
pub const SYS_WRITE: u32 = 3;
pub const SYS_STAT: u32 = 4;
pub const SYS_DIRSTAT: u32 = 5;
pub const SYS_MKFILE: u32 = 6;
pub const SYS_MKDIR: u32 = 7;
pub const SYS_DELETE: u32 = 8;

// Console
pub const SYS_GETCHAR: u32 = 16;
pub const SYS_GETCHAR_NONBLOCK: u32 = 17;
pub const SYS_PUTCHAR: u32 = 18;

// Processos
pub const SYS_EXEC: u32 = 32;
pub const SYS_EXIT: u32 = 33;
pub const SYS_KILL: u32 = 34;
pub const SYS_GETPID: u32 = 35;

/// Registro de stat copiado para userspace: tamanho e flags, cada um u32
/// little-endian. Bit 0 das flags marca diretório.
pub const STAT_RECORD_SIZE: usize = 8;

/// Registro de dirstat: nome nul-terminado em 16 bytes, tamanho u32,
/// flags u32.
pub const DIRSTAT_NAME_LEN: usize = 16;
pub const DIRSTAT_RECORD_SIZE: usize = DIRSTAT_NAME_LEN + 8;

/// Bit de diretório nos registros acima.
pub const RECORD_FLAG_DIRECTORY: u32 = 1;
