//! # Camada de Abstração de Dispositivos de Bloco
//!
//! Fornece a trait que o driver de filesystem consome.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              FILESYSTEM (FAT32)             │
//! └─────────────────────────────────────────────┘
//!                       ↓
//! ┌─────────────────────────────────────────────┐
//! │              BlockDevice Trait              │
//! │    read_block() write_block() block_size()  │
//! └─────────────────────────────────────────────┘
//!                       ↓
//! ┌─────────────────────────────────────────────┐
//! │         DRIVERS (ATA via shim, RamDisk)     │
//! └─────────────────────────────────────────────┘
//! ```

pub mod ramdisk;

pub use ramdisk::RamDisk;

/// Tamanho de bloco fixado pelo formato em disco.
pub const BLOCK_SIZE: usize = 512;

/// Tipos de erro para dispositivos de bloco
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// Endereço de bloco fora do intervalo do dispositivo
    InvalidBlock,
    /// Tamanho do buffer não é múltiplo do bloco
    InvalidBuffer,
    /// Erro de I/O durante leitura/escrita
    IoError,
}

/// Trait para dispositivos de bloco
///
/// Acesso síncrono, endereçado por LBA, blocos de 512 bytes.
pub trait BlockDevice: Send + Sync {
    /// Lê um único bloco do dispositivo
    fn read_block(&self, lba: u32, buf: &mut [u8]) -> Result<(), BlockError>;

    /// Escreve um único bloco no dispositivo
    fn write_block(&self, lba: u32, buf: &[u8]) -> Result<(), BlockError>;

    /// Número total de blocos no dispositivo
    fn total_blocks(&self) -> u32;

    /// Lê múltiplos blocos contíguos
    fn read_blocks(&self, start_lba: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(BlockError::InvalidBuffer);
        }
        for (i, chunk) in buf.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            self.read_block(start_lba + i as u32, chunk)?;
        }
        Ok(())
    }

    /// Escreve múltiplos blocos contíguos
    fn write_blocks(&self, start_lba: u32, buf: &[u8]) -> Result<(), BlockError> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(BlockError::InvalidBuffer);
        }
        for (i, chunk) in buf.chunks_exact(BLOCK_SIZE).enumerate() {
            self.write_block(start_lba + i as u32, chunk)?;
        }
        Ok(())
    }
}

impl<T: BlockDevice> BlockDevice for alloc::sync::Arc<T> {
    fn read_block(&self, lba: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        (**self).read_block(lba, buf)
    }

    fn write_block(&self, lba: u32, buf: &[u8]) -> Result<(), BlockError> {
        (**self).write_block(lba, buf)
    }

    fn total_blocks(&self) -> u32 {
        (**self).total_blocks()
    }
}
