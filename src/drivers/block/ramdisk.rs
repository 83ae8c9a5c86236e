//! Disco em memória.
//!
//! Faz o papel do disco ATA nos testes e em shims de boot que embutem a
//! imagem do volume. Interior mutability via spinlock porque a trait de
//! bloco é `&self` (o dispositivo é compartilhado pelo handler do FS).

use super::{BlockDevice, BlockError, BLOCK_SIZE};
use alloc::vec;
use alloc::vec::Vec;
use spin::Mutex;

pub struct RamDisk {
    blocks: Mutex<Vec<u8>>,
    total_blocks: u32,
}

impl RamDisk {
    /// Cria um disco zerado com `total_blocks` blocos de 512 bytes.
    pub fn new(total_blocks: u32) -> Self {
        Self {
            blocks: Mutex::new(vec![0u8; total_blocks as usize * BLOCK_SIZE]),
            total_blocks,
        }
    }

    /// Cria um disco a partir de uma imagem existente (arredonda para cima
    /// para múltiplo de bloco).
    pub fn from_image(image: &[u8]) -> Self {
        let total_blocks = crate::klib::div_ceil(image.len(), BLOCK_SIZE) as u32;
        let mut data = vec![0u8; total_blocks as usize * BLOCK_SIZE];
        data[..image.len()].copy_from_slice(image);
        Self {
            blocks: Mutex::new(data),
            total_blocks,
        }
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, lba: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        if lba >= self.total_blocks {
            return Err(BlockError::InvalidBlock);
        }
        if buf.len() < BLOCK_SIZE {
            return Err(BlockError::InvalidBuffer);
        }
        let offset = lba as usize * BLOCK_SIZE;
        buf[..BLOCK_SIZE].copy_from_slice(&self.blocks.lock()[offset..offset + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, lba: u32, buf: &[u8]) -> Result<(), BlockError> {
        if lba >= self.total_blocks {
            return Err(BlockError::InvalidBlock);
        }
        if buf.len() < BLOCK_SIZE {
            return Err(BlockError::InvalidBuffer);
        }
        let offset = lba as usize * BLOCK_SIZE;
        self.blocks.lock()[offset..offset + BLOCK_SIZE].copy_from_slice(&buf[..BLOCK_SIZE]);
        Ok(())
    }

    fn total_blocks(&self) -> u32 {
        self.total_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_image_rounds_up_and_pads() {
        let disk = RamDisk::from_image(&[0xAA; 700]);
        assert_eq!(disk.total_blocks(), 2);

        let mut block = [0u8; BLOCK_SIZE];
        disk.read_block(1, &mut block).unwrap();
        assert_eq!(&block[..188], &[0xAA; 188]);
        assert_eq!(&block[188..], &[0u8; 324]);
    }

    #[test]
    fn test_bounds_are_checked() {
        let disk = RamDisk::new(4);
        let mut block = [0u8; BLOCK_SIZE];
        assert_eq!(disk.read_block(4, &mut block), Err(BlockError::InvalidBlock));
        assert_eq!(
            disk.write_block(0, &[0u8; 100]),
            Err(BlockError::InvalidBuffer)
        );
    }
}
