//! Despacho de syscalls.
//!
//! O despacho é em duas fases: `Complete` carrega o resultado para eax,
//! `WouldBlock` devolve o notifier que o escalonador instala antes de
//! estacionar o processo. Quando o notifier dispara, a mesma syscall é
//! reexecutada a partir do frame salvo no PCB.

use crate::arch::Hal;
use crate::fs::devfs::DevHandle;
use crate::fs::vfs::{VfsEntry, VfsError};
use crate::kernel::Kernel;
use crate::sched::Notifier;
use crate::sched::context::InterruptFrame;
use crate::sys::types::MAX_VFS_NAME;
use crate::sys::{ErrorCode, Pid};
use crate::kwarn;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use super::numbers::*;

/// Resultado de uma syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysOutcome {
    /// Terminou; o valor vai para eax (negativo é `ErrorCode`).
    Complete(i32),
    /// Bloquearia; estacionar o processo atrás do notifier.
    WouldBlock(Notifier),
}

fn complete_err(code: ErrorCode) -> SysOutcome {
    SysOutcome::Complete(code.as_i32())
}

/// Lê uma C-string de userspace, limitada a `MAX_VFS_NAME` bytes.
fn read_user_cstr(hal: &dyn Hal, addr: u32) -> Option<String> {
    let mut bytes: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 32];
    let mut offset = 0u32;
    while bytes.len() <= MAX_VFS_NAME {
        hal.copy_from_user(addr + offset, &mut chunk);
        for &b in chunk.iter() {
            if b == 0 {
                return String::from_utf8(bytes).ok();
            }
            bytes.push(b);
        }
        offset += chunk.len() as u32;
    }
    None
}

fn stat_record(entry: &VfsEntry) -> [u8; STAT_RECORD_SIZE] {
    let mut rec = [0u8; STAT_RECORD_SIZE];
    rec[0..4].copy_from_slice(&entry.size.to_le_bytes());
    let flags = if entry.is_directory {
        RECORD_FLAG_DIRECTORY
    } else {
        0
    };
    rec[4..8].copy_from_slice(&flags.to_le_bytes());
    rec
}

fn dirstat_record(entry: &VfsEntry) -> [u8; DIRSTAT_RECORD_SIZE] {
    let mut rec = [0u8; DIRSTAT_RECORD_SIZE];
    let name = entry.name.as_bytes();
    let take = name.len().min(DIRSTAT_NAME_LEN - 1);
    rec[..take].copy_from_slice(&name[..take]);
    rec[DIRSTAT_NAME_LEN..DIRSTAT_NAME_LEN + 4].copy_from_slice(&entry.size.to_le_bytes());
    let flags = if entry.is_directory {
        RECORD_FLAG_DIRECTORY
    } else {
        0
    };
    rec[DIRSTAT_NAME_LEN + 4..].copy_from_slice(&flags.to_le_bytes());
    rec
}

fn vfs_result(err: VfsError) -> SysOutcome {
    match err {
        VfsError::WouldBlock => SysOutcome::WouldBlock(Notifier::StdinReadable),
        other => SysOutcome::Complete(ErrorCode::from(other).as_i32()),
    }
}

/// Executa a syscall descrita pelo frame em nome de `pid`.
pub fn dispatch(kernel: &mut Kernel, pid: Pid, frame: &InterruptFrame) -> SysOutcome {
    let number = frame.eax;
    let arg1 = frame.ebx;
    let arg2 = frame.ecx;
    let arg3 = frame.edx;

    match number {
        SYS_OPEN => sys_open(kernel, pid, arg1),
        SYS_CLOSE => sys_close(kernel, pid, arg1),
        SYS_READ => sys_read(kernel, pid, arg1, arg2, arg3),
        SYS_WRITE => sys_write(kernel, pid, arg1, arg2, arg3),
        SYS_STAT => sys_stat(kernel, arg1, arg2),
        SYS_DIRSTAT => sys_dirstat(kernel, arg1, arg2, arg3),
        SYS_MKFILE => sys_path_op(kernel, arg1, |vfs, path| vfs.mkfile(path)),
        SYS_MKDIR => sys_path_op(kernel, arg1, |vfs, path| vfs.mkdir(path)),
        SYS_DELETE => sys_path_op(kernel, arg1, |vfs, path| vfs.delete(path)),
        SYS_GETCHAR => sys_getchar(kernel, pid, true),
        SYS_GETCHAR_NONBLOCK => sys_getchar(kernel, pid, false),
        SYS_PUTCHAR => sys_putchar(kernel, arg1),
        SYS_EXEC => sys_exec(kernel, arg1),
        SYS_EXIT => sys_exit(kernel, pid),
        SYS_KILL => sys_kill(kernel, pid, arg1),
        SYS_GETPID => SysOutcome::Complete(pid as i32),
        other => {
            kwarn!("syscall: número {} desconhecido (pid {})", other, pid);
            complete_err(ErrorCode::InvalidSyscall)
        }
    }
}

fn sys_open(kernel: &mut Kernel, pid: Pid, path_ptr: u32) -> SysOutcome {
    let Some(path) = read_user_cstr(kernel.hal.as_ref(), path_ptr) else {
        return complete_err(ErrorCode::NotFound);
    };
    let global = match kernel.vfs.open(&path, pid) {
        Ok(fd) => fd,
        Err(err) => return vfs_result(err),
    };
    let Some(pcb) = kernel.procs.get_mut(pid) else {
        return complete_err(ErrorCode::NoSuchProcess);
    };
    match pcb.alloc_fd(global) {
        Some(local) => SysOutcome::Complete(local as i32),
        None => {
            // tabela local cheia: desfaz o open global
            let _ = kernel.vfs.close(global, pid);
            complete_err(ErrorCode::BadFileTable)
        }
    }
}

fn sys_close(kernel: &mut Kernel, pid: Pid, local_fd: u32) -> SysOutcome {
    let Some(pcb) = kernel.procs.get_mut(pid) else {
        return complete_err(ErrorCode::NoSuchProcess);
    };
    match pcb.take_fd(local_fd as usize) {
        Some(global) => match kernel.vfs.close(global, pid) {
            Ok(()) => SysOutcome::Complete(0),
            Err(err) => vfs_result(err),
        },
        None => complete_err(ErrorCode::BadFileTable),
    }
}

fn sys_read(kernel: &mut Kernel, pid: Pid, local_fd: u32, buf_ptr: u32, len: u32) -> SysOutcome {
    let Some(global) = kernel
        .procs
        .get(pid)
        .and_then(|p| p.global_fd(local_fd as usize))
    else {
        return complete_err(ErrorCode::BadFileTable);
    };
    let mut buf = vec![0u8; len as usize];
    match kernel.vfs.read(global, pid, &mut buf) {
        Ok(count) => {
            kernel.hal.copy_to_user(buf_ptr, &buf[..count]);
            SysOutcome::Complete(count as i32)
        }
        Err(err) => vfs_result(err),
    }
}

fn sys_write(kernel: &mut Kernel, pid: Pid, local_fd: u32, buf_ptr: u32, len: u32) -> SysOutcome {
    let Some(global) = kernel
        .procs
        .get(pid)
        .and_then(|p| p.global_fd(local_fd as usize))
    else {
        return complete_err(ErrorCode::BadFileTable);
    };
    let mut buf = vec![0u8; len as usize];
    kernel.hal.copy_from_user(buf_ptr, &mut buf);
    match kernel.vfs.write(global, pid, &buf) {
        Ok(count) => SysOutcome::Complete(count as i32),
        Err(err) => vfs_result(err),
    }
}

fn sys_stat(kernel: &mut Kernel, path_ptr: u32, out_ptr: u32) -> SysOutcome {
    let Some(path) = read_user_cstr(kernel.hal.as_ref(), path_ptr) else {
        return complete_err(ErrorCode::NotFound);
    };
    match kernel.vfs.stat(&path) {
        Ok(entry) => {
            kernel.hal.copy_to_user(out_ptr, &stat_record(&entry));
            SysOutcome::Complete(0)
        }
        Err(err) => vfs_result(err),
    }
}

fn sys_dirstat(kernel: &mut Kernel, path_ptr: u32, out_ptr: u32, max_entries: u32) -> SysOutcome {
    let Some(path) = read_user_cstr(kernel.hal.as_ref(), path_ptr) else {
        return complete_err(ErrorCode::NotFound);
    };
    match kernel.vfs.dirstat(&path) {
        Ok(listing) => {
            let mut written = 0u32;
            for entry in listing.iter().take(max_entries as usize) {
                let rec = dirstat_record(entry);
                let at = out_ptr + written * DIRSTAT_RECORD_SIZE as u32;
                kernel.hal.copy_to_user(at, &rec);
                written += 1;
            }
            SysOutcome::Complete(written as i32)
        }
        Err(err) => vfs_result(err),
    }
}

fn sys_path_op<F>(kernel: &mut Kernel, path_ptr: u32, op: F) -> SysOutcome
where
    F: FnOnce(&mut crate::fs::vfs::Vfs, &str) -> Result<(), VfsError>,
{
    let Some(path) = read_user_cstr(kernel.hal.as_ref(), path_ptr) else {
        return complete_err(ErrorCode::NotFound);
    };
    match op(&mut kernel.vfs, &path) {
        Ok(()) => SysOutcome::Complete(0),
        Err(err) => vfs_result(err),
    }
}

/// Leitura de um byte do stdin. O chamador precisa estar com `/dev/stdin`
/// aberto (e portanto no foreground).
fn sys_getchar(kernel: &mut Kernel, pid: Pid, blocking: bool) -> SysOutcome {
    let Some(devfs) = kernel.vfs.devfs_mut() else {
        return complete_err(ErrorCode::NoHandler);
    };
    let mut byte = [0u8; 1];
    match devfs.read(DevHandle::Stdin, pid, &mut byte) {
        Ok(_) => SysOutcome::Complete(byte[0] as i32),
        Err(VfsError::WouldBlock) => {
            if blocking {
                SysOutcome::WouldBlock(Notifier::StdinReadable)
            } else {
                complete_err(ErrorCode::WouldBlock)
            }
        }
        Err(err) => vfs_result(err),
    }
}

fn sys_putchar(kernel: &mut Kernel, ch: u32) -> SysOutcome {
    let Some(devfs) = kernel.vfs.devfs_mut() else {
        return complete_err(ErrorCode::NoHandler);
    };
    match devfs.write(DevHandle::Stdout, &[ch as u8]) {
        Ok(_) => SysOutcome::Complete(0),
        Err(err) => vfs_result(err),
    }
}

fn sys_exec(kernel: &mut Kernel, path_ptr: u32) -> SysOutcome {
    let Some(path) = read_user_cstr(kernel.hal.as_ref(), path_ptr) else {
        return complete_err(ErrorCode::FsReadFailure);
    };
    match kernel.exec(&path) {
        Ok(pid) => SysOutcome::Complete(pid as i32),
        Err(err) => complete_err(err.into()),
    }
}

fn sys_exit(kernel: &mut Kernel, pid: Pid) -> SysOutcome {
    // saída voluntária: o guard de self-kill não se aplica
    kernel.sched.remove(pid);
    let _ = kernel
        .procs
        .destroy(pid, None, &mut kernel.vfs, &mut kernel.mm);
    SysOutcome::Complete(0)
}

fn sys_kill(kernel: &mut Kernel, pid: Pid, target: u32) -> SysOutcome {
    match kernel
        .procs
        .destroy(target, Some(pid), &mut kernel.vfs, &mut kernel.mm)
    {
        Ok(()) => {
            kernel.sched.remove(target);
            SysOutcome::Complete(0)
        }
        Err(err) => complete_err(err.into()),
    }
}
