//! Gerência de processos.
//!
//! Arena fixa de 32 PCBs. O PID é o índice do slot mais 1, liberado na
//! destruição e reutilizável. A criação segue uma ordem estrita com
//! rollback completo: qualquer falha devolve diretório, frames e slots
//! exatamente ao estado anterior.

use crate::arch::Hal;
use crate::fs::vfs::Vfs;
use crate::mm::paging::PAGE_FRAME_SIZE;
use crate::mm::{DirId, PageManager};
use crate::sched::context::InterruptFrame;
use crate::sys::Pid;
use crate::{kdebug, kinfo};
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

/// Máximo de processos simultâneos.
pub const PROCESS_COUNT_MAX: usize = 32;

/// Primeiro PID emitido.
pub const START_PID: Pid = 1;

/// Descritores por processo.
pub const PROCESS_MAX_FD: usize = 16;

/// Teto de frames de 4MB por processo (código/dados + pilha).
pub const PROCESS_PAGE_FRAME_COUNT_MAX: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Slot vazio.
    Inactive,
    /// Na fila, pronto para rodar.
    Ready,
    /// Dono da CPU agora.
    Running,
    /// Bloqueado atrás de um notifier.
    Waiting,
}

/// Predicado de acordar avaliado pelo escalonador antes de promover um
/// processo Waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notifier {
    /// Acorda na próxima avaliação.
    Always,
    /// Acorda quando há byte disponível em `/dev/stdin` para o processo.
    StdinReadable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcError {
    MaxProcessesExceeded,
    NotEnoughMemory,
    InvalidEntrypoint,
    FsReadFailure,
    CannotKillSelf,
    NotFound,
}

/// Process Control Block.
pub struct Pcb {
    pub pid: Pid,
    pub state: ProcessState,
    pub name: String,
    pub frame: InterruptFrame,
    pub dir: DirId,
    pub frame_count: usize,
    /// fd local -> índice na tabela global do VFS.
    pub fd: [Option<usize>; PROCESS_MAX_FD],
    pub notifier: Option<Notifier>,
}

impl Pcb {
    /// Aloca o menor fd local livre apontando para `global`.
    pub fn alloc_fd(&mut self, global: usize) -> Option<usize> {
        let local = self.fd.iter().position(|f| f.is_none())?;
        self.fd[local] = Some(global);
        Some(local)
    }

    pub fn take_fd(&mut self, local: usize) -> Option<usize> {
        self.fd.get_mut(local)?.take()
    }

    pub fn global_fd(&self, local: usize) -> Option<usize> {
        self.fd.get(local).copied().flatten()
    }
}

pub struct ProcessTable {
    slots: [Option<Pcb>; PROCESS_COUNT_MAX],
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
        }
    }

    fn slot_of(pid: Pid) -> Option<usize> {
        if pid < START_PID {
            return None;
        }
        let slot = (pid - START_PID) as usize;
        (slot < PROCESS_COUNT_MAX).then_some(slot)
    }

    pub fn get(&self, pid: Pid) -> Option<&Pcb> {
        self.slots.get(Self::slot_of(pid)?)?.as_ref()
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.slots.get_mut(Self::slot_of(pid)?)?.as_mut()
    }

    pub fn state_of(&self, pid: Pid) -> ProcessState {
        self.get(pid).map_or(ProcessState::Inactive, |p| p.state)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots.iter().flatten().map(|p| p.pid)
    }

    /// Cria um processo a partir do executável em `path`.
    ///
    /// Ordem: resolve nome, stat, checagem de frames, slot + diretório,
    /// frames de usuário, carga do binário no endereço virtual 0 com o
    /// diretório do processo ativo, frame inicial de registradores. Falha
    /// em qualquer passo desfaz tudo que já foi feito.
    ///
    /// `return_dir` é o diretório ativo do chamador, restaurado depois da
    /// carga para que o retorno da syscall caia no espaço certo.
    pub fn create(
        &mut self,
        path: &str,
        return_dir: DirId,
        vfs: &mut Vfs,
        mm: &mut PageManager,
        hal: &dyn Hal,
    ) -> Result<Pid, ProcError> {
        let (_, basename) = crate::fs::vfs::path::split(path);
        let name = if basename.is_empty() { path } else { basename };

        let stat = vfs.stat(path).map_err(|_| ProcError::FsReadFailure)?;
        if stat.is_directory || stat.size == 0 {
            return Err(ProcError::InvalidEntrypoint);
        }
        let filesize = stat.size;

        // só os frames do código são mapeados; a pilha vive no topo do
        // último. A checagem reserva um frame de folga.
        let frame_count = ((filesize + PAGE_FRAME_SIZE - 1) / PAGE_FRAME_SIZE) as usize;
        if frame_count + 1 > PROCESS_PAGE_FRAME_COUNT_MAX || !mm.allocate_check(frame_count + 1) {
            return Err(ProcError::NotEnoughMemory);
        }

        let slot = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(ProcError::MaxProcessesExceeded)?;
        let pid = slot as Pid + START_PID;

        let dir = mm.create_directory().map_err(|_| ProcError::NotEnoughMemory)?;
        for i in 0..frame_count {
            let vaddr = i as u32 * PAGE_FRAME_SIZE;
            if mm.allocate_user_frame(dir, vaddr, hal).is_err() {
                mm.free_directory(dir);
                return Err(ProcError::NotEnoughMemory);
            }
        }

        match Self::load_executable(path, filesize, pid, dir, return_dir, vfs, mm, hal) {
            Ok(()) => {}
            Err(err) => {
                mm.free_directory(dir);
                return Err(err);
            }
        }

        let pcb = Pcb {
            pid,
            state: ProcessState::Ready,
            name: String::from(name),
            frame: InterruptFrame::user_initial(frame_count as u32 * PAGE_FRAME_SIZE - 4),
            dir,
            frame_count,
            fd: [None; PROCESS_MAX_FD],
            notifier: None,
        };
        if let Some(procfs) = vfs.procfs_mut() {
            procfs.register(pid, &pcb.name);
        }
        self.slots[slot] = Some(pcb);
        kinfo!("proc: pid {} criado ('{}', {} frames)", pid, name, frame_count);
        Ok(pid)
    }

    fn load_executable(
        path: &str,
        filesize: u32,
        pid: Pid,
        dir: DirId,
        return_dir: DirId,
        vfs: &mut Vfs,
        mm: &PageManager,
        hal: &dyn Hal,
    ) -> Result<(), ProcError> {
        let mut image: Vec<u8> = vec![0; filesize as usize];
        let fd = vfs.open(path, pid).map_err(|_| ProcError::FsReadFailure)?;
        let mut total = 0usize;
        loop {
            match vfs.read(fd, pid, &mut image[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(_) => {
                    let _ = vfs.close(fd, pid);
                    return Err(ProcError::FsReadFailure);
                }
            }
            if total == image.len() {
                break;
            }
        }
        let _ = vfs.close(fd, pid);
        if total != filesize as usize {
            return Err(ProcError::FsReadFailure);
        }

        // carga com o diretório do processo ativo, voltando para o do
        // chamador em seguida
        hal.load_page_directory(mm.dir(dir));
        hal.copy_to_user(0, &image);
        hal.load_page_directory(mm.dir(return_dir));
        Ok(())
    }

    /// Destrói `pid`: fecha descritores, solta frames e diretório, libera
    /// o slot. O processo corrente não pode se destruir por aqui.
    pub fn destroy(
        &mut self,
        pid: Pid,
        current: Option<Pid>,
        vfs: &mut Vfs,
        mm: &mut PageManager,
    ) -> Result<(), ProcError> {
        if current == Some(pid) {
            return Err(ProcError::CannotKillSelf);
        }
        let slot = Self::slot_of(pid).ok_or(ProcError::NotFound)?;
        let pcb = self.slots[slot].take().ok_or(ProcError::NotFound)?;

        vfs.close_all_for(pid);
        if let Some(procfs) = vfs.procfs_mut() {
            procfs.unregister(pid);
        }
        mm.free_directory(pcb.dir);
        kdebug!("proc: pid {} destruído", pid);
        Ok(())
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}
