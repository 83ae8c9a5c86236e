//! HAL stub para testes hosted.
//!
//! Simula a memória de usuário como um vetor plano e grava cada troca de
//! diretório. `wait_for_interrupt` roda um hook opcional (para injetar
//! entrada de teclado) e estoura depois de um limite para transformar
//! deadlock de scheduler em falha de teste.

use super::Hal;
use crate::mm::paging::PageDirectory;
use crate::sys::types::VirtAddr;
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use spin::Mutex;

pub const TEST_USER_MEM_SIZE: usize = 1 << 20;
const HALT_LIMIT: usize = 64;

type HaltHook = Box<dyn FnMut() + Send>;

pub struct TestHal {
    user_mem: Mutex<Vec<u8>>,
    loaded_dirs: Mutex<Vec<usize>>,
    flushed: Mutex<Vec<VirtAddr>>,
    /// Diretório ativo no momento de cada `copy_to_user`.
    copy_dirs: Mutex<Vec<usize>>,
    halt_hook: Mutex<Option<HaltHook>>,
    halt_count: AtomicUsize,
}

impl TestHal {
    pub fn new() -> Self {
        Self {
            user_mem: Mutex::new(vec![0u8; TEST_USER_MEM_SIZE]),
            loaded_dirs: Mutex::new(Vec::new()),
            flushed: Mutex::new(Vec::new()),
            copy_dirs: Mutex::new(Vec::new()),
            halt_hook: Mutex::new(None),
            halt_count: AtomicUsize::new(0),
        }
    }

    /// Escreve bytes na "memória de usuário" simulada.
    pub fn poke(&self, addr: VirtAddr, data: &[u8]) {
        let addr = addr as usize;
        self.user_mem.lock()[addr..addr + data.len()].copy_from_slice(data);
    }

    /// Escreve uma string C (terminada em NUL) na memória simulada.
    pub fn poke_cstr(&self, addr: VirtAddr, s: &str) {
        self.poke(addr, s.as_bytes());
        self.poke(addr + s.len() as u32, &[0]);
    }

    /// Lê bytes da memória simulada.
    pub fn peek(&self, addr: VirtAddr, len: usize) -> Vec<u8> {
        let addr = addr as usize;
        self.user_mem.lock()[addr..addr + len].to_vec()
    }

    /// Número de trocas de diretório realizadas.
    pub fn dir_switch_count(&self) -> usize {
        self.loaded_dirs.lock().len()
    }

    /// Último diretório carregado, como ponteiro.
    pub fn last_loaded_dir(&self) -> Option<usize> {
        self.loaded_dirs.lock().last().copied()
    }

    /// Diretório que estava ativo no último `copy_to_user`.
    pub fn last_copy_dir(&self) -> Option<usize> {
        self.copy_dirs.lock().last().copied()
    }

    /// Endereços virtuais invalidados via `flush_tlb`, na ordem.
    pub fn flushed(&self) -> Vec<VirtAddr> {
        self.flushed.lock().clone()
    }

    pub fn halt_count(&self) -> usize {
        self.halt_count.load(Ordering::Relaxed)
    }

    /// Hook executado a cada `wait_for_interrupt` (simula o efeito da
    /// interrupção de hardware, ex.: empurrar um byte na fila de entrada).
    pub fn set_halt_hook(&self, hook: HaltHook) {
        *self.halt_hook.lock() = Some(hook);
    }
}

impl Hal for TestHal {
    fn enable_interrupts(&self) {}

    fn disable_interrupts(&self) {}

    fn wait_for_interrupt(&self) {
        let n = self.halt_count.fetch_add(1, Ordering::Relaxed);
        assert!(
            n < HALT_LIMIT,
            "scheduler halted {} times with no runnable process",
            HALT_LIMIT
        );
        if let Some(hook) = self.halt_hook.lock().as_mut() {
            hook();
        }
    }

    fn flush_tlb(&self, virtual_addr: VirtAddr) {
        self.flushed.lock().push(virtual_addr);
    }

    fn load_page_directory(&self, dir: &PageDirectory) {
        self.loaded_dirs
            .lock()
            .push(dir as *const PageDirectory as usize);
    }

    fn copy_to_user(&self, virtual_addr: VirtAddr, data: &[u8]) {
        let active = self.loaded_dirs.lock().last().copied().unwrap_or(0);
        self.copy_dirs.lock().push(active);
        self.poke(virtual_addr, data);
    }

    fn copy_from_user(&self, virtual_addr: VirtAddr, dest: &mut [u8]) {
        let addr = virtual_addr as usize;
        dest.copy_from_slice(&self.user_mem.lock()[addr..addr + dest.len()]);
    }
}
