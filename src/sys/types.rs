//! Tipos fundamentais do sistema.

/// ID do processo. PIDs começam em 1; 0 nunca é emitido.
pub type Pid = u32;

/// Endereço virtual de 32 bits (protected mode, sem PAE).
pub type VirtAddr = u32;

/// Endereço físico de 32 bits.
pub type PhysAddr = u32;

/// Tamanho máximo do nome registrado em entradas do VFS.
pub const MAX_VFS_NAME: usize = 255;
