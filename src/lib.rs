//! Ember Kernel Library.
//!
//! Ponto central de exportação dos módulos do kernel.
//!
//! O crate é uma biblioteca: o binário de boot (entry multiboot, GDT/IDT,
//! remap do PIC) vive fora e linka contra `Kernel` + `handle_interrupt`.
//! Em testes compilamos hosted (com std) contra um ramdisk e um HAL stub.

#![cfg_attr(not(test), no_std)]

// Alocação dinâmica (Vec/Box/VecDeque)
extern crate alloc;

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // HAL (CPU, TLB, troca de diretório)
pub mod drivers; // Dispositivo de bloco + ramdisk

// --- Módulos Centrais ---
pub mod klib; // Utilitários internos (bitmap, align)
pub mod logging; // Macros de log com sink plugável
pub mod mm; // Paging 4MB + heap
pub mod sys; // Tipos e códigos de erro

// --- Subsistemas ---
pub mod fs; // FAT32 + VFS + devfs + procfs
pub mod kernel; // Dono top-level e entrada de interrupção
pub mod sched; // Processos e scheduler
pub mod syscall; // Interface com userspace

pub use kernel::Kernel;
