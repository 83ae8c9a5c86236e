//! Implementação x86 (protected mode) do HAL.

use super::Hal;
use crate::mm::paging::{PageDirectory, KERNEL_VIRTUAL_ADDRESS_BASE};
use crate::sys::types::VirtAddr;
use core::arch::asm;

pub struct X86Hal;

impl Hal for X86Hal {
    fn enable_interrupts(&self) {
        unsafe { asm!("sti", options(nomem, nostack)) };
    }

    fn disable_interrupts(&self) {
        unsafe { asm!("cli", options(nomem, nostack)) };
    }

    fn wait_for_interrupt(&self) {
        unsafe {
            asm!("sti", "hlt", "cli", options(nomem, nostack));
        }
    }

    fn flush_tlb(&self, virtual_addr: VirtAddr) {
        unsafe {
            asm!("invlpg [{0}]", in(reg) virtual_addr, options(nostack));
        }
    }

    fn load_page_directory(&self, dir: &PageDirectory) {
        let mut physical_addr = dir as *const PageDirectory as u32;
        // Rede de segurança: o pool vive no mapeamento alto do kernel.
        if physical_addr > KERNEL_VIRTUAL_ADDRESS_BASE {
            physical_addr -= KERNEL_VIRTUAL_ADDRESS_BASE;
        }
        unsafe {
            asm!("mov cr3, {0}", in(reg) physical_addr, options(nostack));
        }
    }

    fn copy_to_user(&self, virtual_addr: VirtAddr, data: &[u8]) {
        unsafe {
            core::ptr::copy_nonoverlapping(
                data.as_ptr(),
                virtual_addr as *mut u8,
                data.len(),
            );
        }
    }

    fn copy_from_user(&self, virtual_addr: VirtAddr, dest: &mut [u8]) {
        unsafe {
            core::ptr::copy_nonoverlapping(
                virtual_addr as *const u8,
                dest.as_mut_ptr(),
                dest.len(),
            );
        }
    }
}
