//! Heap do kernel.
//!
//! Alocador first-fit com coalescência de blocos livres. Em teste o crate
//! roda hospedado e usa o alocador do sistema.

#[cfg(not(test))]
use linked_list_allocator::LockedHeap;

#[cfg(not(test))]
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Inicializa o heap sobre a região dada.
///
/// # Safety
/// A região precisa estar mapeada, fora de uso e só pode ser entregue uma
/// vez.
#[cfg(not(test))]
pub unsafe fn init(start: *mut u8, size: usize) {
    ALLOCATOR.lock().init(start, size);
    crate::kinfo!("heap: {} KiB em {:p}", size / 1024, start);
}
