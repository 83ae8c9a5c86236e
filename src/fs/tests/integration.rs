//! Cenários ponta a ponta: kernel completo sobre ramdisk e HAL de teste.

#![cfg(test)]

use crate::arch::test_hal::TestHal;
use crate::drivers::block::RamDisk;
use crate::drivers::console::BufferConsole;
use crate::fs::devfs;
use crate::kernel::{Kernel, TIMER_VECTOR};
use crate::sched::context::InterruptFrame;
use crate::sched::process::ProcessState;
use crate::syscall::numbers::*;
use alloc::boxed::Box;
use alloc::sync::Arc;

pub fn boot() -> (Kernel, Arc<TestHal>, Arc<BufferConsole>) {
    let hal = Arc::new(TestHal::new());
    let console = Arc::new(BufferConsole::new());
    let kernel = Kernel::new(
        Box::new(hal.clone()),
        Box::new(RamDisk::new(super::TEST_DISK_BLOCKS)),
        Box::new(console.clone()),
    )
    .unwrap();
    (kernel, hal, console)
}

/// Kernel com um executável `/prog` já gravado no volume.
pub fn boot_with_program() -> (Kernel, Arc<TestHal>, Arc<BufferConsole>) {
    let (mut kernel, hal, console) = boot();
    let image: alloc::vec::Vec<u8> = (0..64u8).collect();
    kernel
        .vfs_mut()
        .rootfs_mut()
        .unwrap()
        .write_file("prog", &image)
        .unwrap();
    (kernel, hal, console)
}

pub fn timer_frame() -> InterruptFrame {
    InterruptFrame {
        int_number: TIMER_VECTOR,
        ..InterruptFrame::default()
    }
}

pub fn syscall_frame(eax: u32, ebx: u32, ecx: u32, edx: u32) -> InterruptFrame {
    InterruptFrame {
        int_number: SYSCALL_VECTOR,
        eax,
        ebx,
        ecx,
        edx,
        ..InterruptFrame::default()
    }
}

#[test]
fn test_end_to_end_volume_scenario() {
    // format -> write -> mkdir -> listagem -> delete -> stat, tudo pela
    // superfície do VFS
    let (mut kernel, _, _) = boot();
    let vfs = kernel.vfs_mut();

    vfs.mkdir("/docs").unwrap();
    vfs.rootfs_mut()
        .unwrap()
        .write_file("docs/nota.txt", b"lembrete")
        .unwrap();

    let listing = vfs.dirstat("/docs").unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "nota.txt");
    assert_eq!(listing[0].size, 8);

    vfs.delete("/docs/nota.txt").unwrap();
    vfs.delete("/docs").unwrap();
    assert!(vfs.stat("/docs").is_err());
    assert_eq!(vfs.stat("/").unwrap().size, 2, "restam só dev e proc");
}

#[test]
fn test_exec_loads_image_into_user_memory() {
    let (mut kernel, hal, _) = boot_with_program();
    let pid = kernel.exec("/prog").unwrap();
    assert_eq!(pid, 1);

    // a imagem foi copiada para o endereço virtual 0 com o diretório do
    // processo ativo (e o do kernel restaurado depois)
    let expected: alloc::vec::Vec<u8> = (0..64u8).collect();
    assert_eq!(hal.peek(0, 64), expected);
    assert_eq!(hal.dir_switch_count(), 2);
    assert_eq!(kernel.process_state(pid), ProcessState::Ready);
}

#[test]
fn test_round_robin_alternates_processes() {
    let (mut kernel, _, _) = boot_with_program();
    let p1 = kernel.exec("/prog").unwrap();
    let p2 = kernel.exec("/prog").unwrap();

    let mut observed = alloc::vec::Vec::new();
    let mut frame = timer_frame();
    for _ in 0..6 {
        kernel.handle_interrupt(&mut frame);
        observed.push(kernel.current_pid().unwrap());
        frame.int_number = TIMER_VECTOR;
    }
    assert_eq!(observed, [p1, p2, p1, p2, p1, p2]);
}

#[test]
fn test_blocking_getchar_parks_and_resumes() {
    let (mut kernel, hal, _) = boot_with_program();
    kernel.exec("/prog").unwrap();

    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(1));

    // abre /dev/stdin (vira foreground)
    hal.poke_cstr(0x1000, "/dev/stdin");
    let mut frame = syscall_frame(SYS_OPEN, 0x1000, 0, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 0, "primeiro fd local");

    // sem entrada: estaciona; o halt simula a IRQ do teclado
    let queue = kernel.input_queue();
    hal.set_halt_hook(Box::new(move || devfs::push_input(&queue, b'r')));
    let mut frame = syscall_frame(SYS_GETCHAR, 0, 0, 0);
    kernel.handle_interrupt(&mut frame);

    assert_eq!(frame.eax, b'r' as u32, "syscall retomada entrega o byte");
    assert_eq!(kernel.current_pid(), Some(1));
    assert!(hal.halt_count() > 0, "o scheduler chegou a estacionar");
}

#[test]
fn test_resumed_read_targets_woken_address_space() {
    let (mut kernel, hal, _) = boot_with_program();
    let p1 = kernel.exec("/prog").unwrap();
    let p2 = kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p1));

    hal.poke_cstr(0x1000, "/dev/stdin");
    let mut frame = syscall_frame(SYS_OPEN, 0x1000, 0, 0);
    kernel.handle_interrupt(&mut frame);
    let fd = frame.eax;

    // leitura bloqueante sem entrada: p1 estaciona e p2 assume
    let mut frame = syscall_frame(SYS_READ, fd, 0x2000, 1);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p2));

    kernel.push_input(b'k');
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p1));
    assert_eq!(frame.eax, 1, "a leitura retomada entregou um byte");
    assert_eq!(hal.peek(0x2000, 1), [b'k']);

    // a cópia da retomada aconteceu com o diretório de p1 ativo, não com
    // o de p2 que rodava antes do tick
    let p1_dir = kernel.mm.dir(kernel.procs.get(p1).unwrap().dir) as *const _ as usize;
    assert_eq!(hal.last_copy_dir(), Some(p1_dir));
}

#[test]
fn test_exec_syscall_returns_to_caller_space() {
    let (mut kernel, hal, _) = boot_with_program();
    let p1 = kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p1));

    hal.poke_cstr(0x1000, "/prog");
    let mut frame = syscall_frame(SYS_EXEC, 0x1000, 0, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 2, "novo pid");

    // o iret de volta para p1 precisa do diretório dele, não do kernel
    let p1_dir = kernel.mm.dir(kernel.procs.get(p1).unwrap().dir) as *const _ as usize;
    assert_eq!(hal.last_loaded_dir(), Some(p1_dir));
}

#[test]
fn test_putchar_and_stdout_syscalls() {
    let (mut kernel, hal, console) = boot_with_program();
    kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);

    let mut frame = syscall_frame(SYS_PUTCHAR, b'e' as u32, 0, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 0);

    // e também pelo caminho de fd
    hal.poke_cstr(0x1000, "/dev/stdout");
    let mut frame = syscall_frame(SYS_OPEN, 0x1000, 0, 0);
    kernel.handle_interrupt(&mut frame);
    let fd = frame.eax;
    hal.poke(0x2000, b"mber");
    let mut frame = syscall_frame(SYS_WRITE, fd, 0x2000, 4);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 4);

    assert_eq!(console.contents(), b"ember");
}

#[test]
fn test_exit_frees_process_and_idles() {
    let (mut kernel, _, _) = boot_with_program();
    kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);

    let mut frame = syscall_frame(SYS_EXIT, 0, 0, 0);
    kernel.handle_interrupt(&mut frame);

    assert_eq!(kernel.current_pid(), None);
    assert_eq!(kernel.process_state(1), ProcessState::Inactive);
    assert_eq!(kernel.vfs().stat("/proc").unwrap().size, 0);
}

#[test]
fn test_kill_other_but_not_self() {
    let (mut kernel, _, _) = boot_with_program();
    let p1 = kernel.exec("/prog").unwrap();
    let p2 = kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p1));

    let mut frame = syscall_frame(SYS_KILL, p1, 0, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(
        frame.eax as i32,
        crate::sys::ErrorCode::CannotKillSelf.as_i32(),
        "self-kill recusado"
    );

    let mut frame = syscall_frame(SYS_KILL, p2, 0, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 0);
    assert_eq!(kernel.process_state(p2), ProcessState::Inactive);
}

#[test]
fn test_page_fault_destroys_current() {
    let (mut kernel, _, _) = boot_with_program();
    let p1 = kernel.exec("/prog").unwrap();
    let p2 = kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);
    assert_eq!(kernel.current_pid(), Some(p1));

    frame.int_number = crate::kernel::PAGE_FAULT_VECTOR;
    kernel.handle_interrupt(&mut frame);

    assert_eq!(kernel.process_state(p1), ProcessState::Inactive);
    assert_eq!(kernel.current_pid(), Some(p2), "o sobrevivente assume");
}

#[test]
fn test_stat_syscall_record_layout() {
    let (mut kernel, hal, _) = boot_with_program();
    kernel.exec("/prog").unwrap();
    let mut frame = timer_frame();
    kernel.handle_interrupt(&mut frame);

    hal.poke_cstr(0x1000, "/prog");
    let mut frame = syscall_frame(SYS_STAT, 0x1000, 0x3000, 0);
    kernel.handle_interrupt(&mut frame);
    assert_eq!(frame.eax, 0);

    let rec = hal.peek(0x3000, STAT_RECORD_SIZE);
    let size = u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
    let flags = u32::from_le_bytes([rec[4], rec[5], rec[6], rec[7]]);
    assert_eq!(size, 64);
    assert_eq!(flags & RECORD_FLAG_DIRECTORY, 0);
}
