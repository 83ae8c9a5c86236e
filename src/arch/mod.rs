//! HAL - Hardware Abstraction Layer.
//!
//! O core assume apenas que interrupções podem ser ligadas/desligadas, que a
//! CPU sabe esperar pela próxima interrupção, e que existe um mecanismo para
//! ativar diretórios de página e copiar bytes de/para o espaço do usuário.
//! Tudo isso passa por esta trait: a implementação x86 usa asm, os testes
//! usam um stub com memória de usuário simulada.

use crate::mm::paging::PageDirectory;
use crate::sys::types::VirtAddr;

pub trait Hal: Send + Sync {
    fn enable_interrupts(&self);
    fn disable_interrupts(&self);

    /// Espera de baixo consumo até a próxima interrupção de hardware
    /// (sti; hlt; cli). Usada pelo scheduler quando todo mundo está Waiting.
    fn wait_for_interrupt(&self);

    /// Invalida a entrada de TLB do endereço virtual dado.
    fn flush_tlb(&self, virtual_addr: VirtAddr);

    /// Ativa o diretório de páginas dado (carrega CR3).
    ///
    /// O diretório precisa permanecer vivo e imóvel enquanto estiver ativo;
    /// o pool de diretórios do gerenciador de páginas garante isso.
    fn load_page_directory(&self, dir: &PageDirectory);

    /// Copia bytes do kernel para o endereço virtual do usuário.
    ///
    /// O diretório de destino precisa estar ativo e o intervalo mapeado.
    fn copy_to_user(&self, virtual_addr: VirtAddr, data: &[u8]);

    /// Copia bytes do espaço do usuário para o buffer do kernel.
    fn copy_from_user(&self, virtual_addr: VirtAddr, dest: &mut [u8]);
}

impl<T: Hal> Hal for alloc::sync::Arc<T> {
    fn enable_interrupts(&self) {
        (**self).enable_interrupts()
    }

    fn disable_interrupts(&self) {
        (**self).disable_interrupts()
    }

    fn wait_for_interrupt(&self) {
        (**self).wait_for_interrupt()
    }

    fn flush_tlb(&self, virtual_addr: VirtAddr) {
        (**self).flush_tlb(virtual_addr)
    }

    fn load_page_directory(&self, dir: &PageDirectory) {
        (**self).load_page_directory(dir)
    }

    fn copy_to_user(&self, virtual_addr: VirtAddr, data: &[u8]) {
        (**self).copy_to_user(virtual_addr, data)
    }

    fn copy_from_user(&self, virtual_addr: VirtAddr, dest: &mut [u8]) {
        (**self).copy_from_user(virtual_addr, dest)
    }
}

#[cfg(target_arch = "x86")]
pub mod x86;

#[cfg(test)]
pub mod test_hal;
