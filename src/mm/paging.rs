//! Paginação com páginas de 4MB (PSE).
//!
//! Cada processo enxerga um diretório de 1024 entradas onde cada entrada
//! mapeia 4MB direto, sem tabelas de segundo nível. Os diretórios vêm de um
//! pool fixo; o diretório 0 é o do kernel e serve de template para os
//! demais: código do kernel em 0x300 (0xC0000000) e pilha na última
//! entrada. A entrada identidade 0 existe só no diretório do kernel, para
//! o trampolim de boot.

use crate::arch::Hal;
use crate::klib::Bitmap;
use crate::sys::types::{PhysAddr, VirtAddr};
use crate::{kdebug, ktrace};
use alloc::boxed::Box;
use alloc::vec::Vec;
use bitflags::bitflags;

use super::MmError;

/// Tamanho de um frame/página: 4MB.
pub const PAGE_FRAME_SIZE: u32 = 0x40_0000;

/// Entradas por diretório.
pub const PAGE_ENTRY_COUNT: usize = 1024;

/// Frames físicos gerenciados (128MB endereçáveis).
pub const PAGE_FRAME_MAX_COUNT: usize = 32;

/// Diretórios no pool: o do kernel mais um por processo possível.
pub const PAGE_DIRECTORY_POOL: usize = 33;

/// Base virtual do kernel (entrada 0x300).
pub const KERNEL_VIRTUAL_ADDRESS_BASE: u32 = 0xC000_0000;

const KERNEL_CODE_ENTRY: usize = (KERNEL_VIRTUAL_ADDRESS_BASE >> 22) as usize;
const KERNEL_STACK_ENTRY: usize = PAGE_ENTRY_COUNT - 1;

/// Frame físico da pilha do kernel (logo acima do código).
const KERNEL_STACK_FRAME: u32 = (PAGE_FRAME_SIZE >> 22) & 0x3FF;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageEntryFlags: u32 {
        const PRESENT  = 1 << 0;
        const WRITE    = 1 << 1;
        const USER     = 1 << 2;
        const PAGE_4MB = 1 << 7;
    }
}

/// Entrada crua de diretório: endereço físico nos bits 31:22, flags
/// embaixo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDirEntry(u32);

impl PageDirEntry {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn new(frame_index: u32, flags: PageEntryFlags) -> Self {
        Self((frame_index << 22) | flags.bits())
    }

    pub const fn is_present(self) -> bool {
        self.0 & PageEntryFlags::PRESENT.bits() != 0
    }

    pub const fn frame_index(self) -> u32 {
        self.0 >> 22
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Diretório de páginas, alinhado como o hardware exige.
#[repr(C, align(4096))]
pub struct PageDirectory {
    pub entries: [PageDirEntry; PAGE_ENTRY_COUNT],
}

impl PageDirectory {
    fn zeroed() -> Box<Self> {
        Box::new(Self {
            entries: [PageDirEntry::zero(); PAGE_ENTRY_COUNT],
        })
    }
}

/// Identificador de diretório dentro do pool. O 0 é sempre o do kernel.
pub type DirId = usize;

pub const KERNEL_DIR: DirId = 0;

pub struct PageManager {
    pool: Vec<Option<Box<PageDirectory>>>,
    /// Frames físicos livres/ocupados, busca sempre do índice mais baixo.
    frames: Bitmap<1>,
    /// Mapa reverso frame -> (diretório, endereço virtual) para liberar
    /// tudo de um processo sem varrer diretórios.
    reverse: [Option<(DirId, VirtAddr)>; PAGE_FRAME_MAX_COUNT],
}

impl PageManager {
    pub fn new() -> Self {
        let mut pool: Vec<Option<Box<PageDirectory>>> = Vec::with_capacity(PAGE_DIRECTORY_POOL);
        for _ in 0..PAGE_DIRECTORY_POOL {
            pool.push(None);
        }

        let mut kernel = PageDirectory::zeroed();
        let kflags = PageEntryFlags::PRESENT | PageEntryFlags::WRITE | PageEntryFlags::PAGE_4MB;
        // identidade para o trampolim, só no diretório do kernel
        kernel.entries[0] = PageDirEntry::new(0, kflags);
        kernel.entries[KERNEL_CODE_ENTRY] = PageDirEntry::new(0, kflags);
        kernel.entries[KERNEL_STACK_ENTRY] = PageDirEntry::new(KERNEL_STACK_FRAME, kflags);
        pool[KERNEL_DIR] = Some(kernel);

        let mut frames = Bitmap::new(PAGE_FRAME_MAX_COUNT);
        frames.set(0); // código do kernel
        frames.set(KERNEL_STACK_FRAME as usize); // pilha do kernel

        Self {
            pool,
            frames,
            reverse: [None; PAGE_FRAME_MAX_COUNT],
        }
    }

    pub fn kernel_dir(&self) -> &PageDirectory {
        self.dir(KERNEL_DIR)
    }

    pub fn dir(&self, id: DirId) -> &PageDirectory {
        self.pool[id].as_ref().unwrap()
    }

    /// Cria um diretório de usuário a partir do template do kernel, sem a
    /// entrada identidade.
    pub fn create_directory(&mut self) -> Result<DirId, MmError> {
        let id = (1..PAGE_DIRECTORY_POOL)
            .find(|&i| self.pool[i].is_none())
            .ok_or(MmError::PoolExhausted)?;
        let mut dir = PageDirectory::zeroed();
        let template = self.pool[KERNEL_DIR].as_ref().unwrap();
        dir.entries[KERNEL_CODE_ENTRY] = template.entries[KERNEL_CODE_ENTRY];
        dir.entries[KERNEL_STACK_ENTRY] = template.entries[KERNEL_STACK_ENTRY];
        self.pool[id] = Some(dir);
        ktrace!("mm: diretório {} criado", id);
        Ok(id)
    }

    /// Devolve o diretório ao pool, liberando antes todos os frames que o
    /// mapa reverso atribui a ele.
    pub fn free_directory(&mut self, id: DirId) {
        debug_assert_ne!(id, KERNEL_DIR);
        for frame in 0..PAGE_FRAME_MAX_COUNT {
            if let Some((owner, _)) = self.reverse[frame] {
                if owner == id {
                    self.frames.clear(frame);
                    self.reverse[frame] = None;
                }
            }
        }
        self.pool[id] = None;
        kdebug!("mm: diretório {} liberado", id);
    }

    /// Mapeia o frame físico livre de índice mais baixo em `virtual_addr`
    /// dentro do diretório `id`, invalidando a entrada de TLB
    /// correspondente. Retorna o endereço físico escolhido.
    pub fn allocate_user_frame(
        &mut self,
        id: DirId,
        virtual_addr: VirtAddr,
        hal: &dyn Hal,
    ) -> Result<PhysAddr, MmError> {
        let frame = self.frames.find_first_zero().ok_or(MmError::OutOfFrames)?;
        self.frames.set(frame);

        let entry = (virtual_addr >> 22) as usize;
        let flags = PageEntryFlags::PRESENT
            | PageEntryFlags::WRITE
            | PageEntryFlags::USER
            | PageEntryFlags::PAGE_4MB;
        self.pool[id].as_mut().unwrap().entries[entry] = PageDirEntry::new(frame as u32, flags);
        self.reverse[frame] = Some((id, virtual_addr));
        hal.flush_tlb(virtual_addr);
        ktrace!("mm: frame {} -> dir {} vaddr {:#x}", frame, id, virtual_addr);
        Ok((frame as u32) << 22)
    }

    /// Desfaz um mapeamento, devolve o frame ao bitmap e invalida a entrada
    /// de TLB, para que o endereço não continue alcançável já sem dono.
    pub fn free_user_frame(
        &mut self,
        id: DirId,
        virtual_addr: VirtAddr,
        hal: &dyn Hal,
    ) -> Result<(), MmError> {
        let index = (virtual_addr >> 22) as usize;
        let dir = self.pool[id].as_mut().ok_or(MmError::NotMapped)?;
        let entry = dir.entries[index];
        if !entry.is_present() {
            return Err(MmError::NotMapped);
        }
        dir.entries[index] = PageDirEntry::zero();
        let frame = entry.frame_index() as usize;
        self.frames.clear(frame);
        self.reverse[frame] = None;
        hal.flush_tlb(virtual_addr);
        Ok(())
    }

    /// Verificação pura: dá para alocar `count` frames agora?
    pub fn allocate_check(&self, count: usize) -> bool {
        self.frames.free_count() >= count
    }

    pub fn free_frame_count(&self) -> usize {
        self.frames.free_count()
    }
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new()
    }
}
