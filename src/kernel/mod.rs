//! Objeto central do kernel.
//!
//! Todo o estado mutável vive aqui, num único dono: VFS, gerente de
//! páginas, arena de processos e escalonador. Mutação só acontece entre a
//! entrada de um trap e o seu retorno, então nenhum subsistema precisa de
//! lock próprio. O shim de boot constrói o `Kernel`, monta os três
//! filesystems e daí em diante só encaminha interrupções para
//! `handle_interrupt`.

use crate::arch::Hal;
use crate::drivers::block::BlockDevice;
use crate::drivers::console::ConsoleOut;
use crate::fs::devfs::{self, DevFs, InputQueue};
use crate::fs::fat32::{Fat32Driver, Fat32Handler};
use crate::fs::procfs::ProcFs;
use crate::fs::vfs::{FsHandler, Vfs, VfsError};
use crate::mm::paging::KERNEL_DIR;
use crate::mm::PageManager;
use crate::sched::context::InterruptFrame;
use crate::sched::process::{ProcError, ProcessState};
use crate::sched::scheduler::Next;
use crate::sched::{Notifier, ProcessTable, Scheduler};
use crate::syscall::{self, SysOutcome};
use crate::sys::Pid;
use crate::{kerror, kinfo};
use alloc::boxed::Box;

/// Vetores tratados pelo core. O resto fica com o shim de boot.
pub const TIMER_VECTOR: u32 = 0x20;
pub const PAGE_FAULT_VECTOR: u32 = 14;

pub struct Kernel {
    pub(crate) hal: Box<dyn Hal>,
    pub(crate) vfs: Vfs,
    pub(crate) mm: PageManager,
    pub(crate) procs: ProcessTable,
    pub(crate) sched: Scheduler,
    input: InputQueue,
}

impl Kernel {
    /// Monta o kernel completo: volume de clusters em `/`, dispositivos em
    /// `/dev` e processos em `/proc`.
    pub fn new(
        hal: Box<dyn Hal>,
        disk: Box<dyn BlockDevice>,
        console: Box<dyn ConsoleOut>,
    ) -> Result<Self, VfsError> {
        let mut driver = Fat32Driver::new(disk);
        let formatted = driver.initialize()?;
        if formatted {
            kinfo!("kernel: volume raiz formatado");
        }

        let input = devfs::new_input_queue();
        let mut vfs = Vfs::new();
        vfs.mount("/", FsHandler::Cluster(Fat32Handler::new(driver)))?;
        vfs.mount(
            "/dev",
            FsHandler::Dev(DevFs::new(console, input.clone())),
        )?;
        vfs.mount("/proc", FsHandler::Proc(ProcFs::new()))?;

        kinfo!("kernel: inicializado");
        Ok(Self {
            hal,
            vfs,
            mm: PageManager::new(),
            procs: ProcessTable::new(),
            sched: Scheduler::new(),
            input,
        })
    }

    /// Entrada única de interrupções vinda do stub em assembly.
    pub fn handle_interrupt(&mut self, frame: &mut InterruptFrame) {
        match frame.int_number {
            TIMER_VECTOR => self.timer_tick(frame),
            syscall::numbers::SYSCALL_VECTOR => self.handle_syscall(frame),
            PAGE_FAULT_VECTOR => self.handle_page_fault(frame),
            _ => {}
        }
    }

    /// Cria um processo e o coloca na fila como Ready.
    pub fn exec(&mut self, path: &str) -> Result<Pid, ProcError> {
        // com um processo rodando, a carga volta para o diretório dele;
        // no boot, para o do kernel
        let return_dir = self
            .sched
            .current()
            .and_then(|pid| self.procs.get(pid))
            .map_or(KERNEL_DIR, |pcb| pcb.dir);
        let pid = self.procs.create(
            path,
            return_dir,
            &mut self.vfs,
            &mut self.mm,
            self.hal.as_ref(),
        )?;
        self.sched.enqueue(pid);
        Ok(pid)
    }

    /// Destrói um processo que não seja o corrente.
    pub fn kill(&mut self, pid: Pid) -> Result<(), ProcError> {
        self.procs
            .destroy(pid, self.sched.current(), &mut self.vfs, &mut self.mm)?;
        self.sched.remove(pid);
        Ok(())
    }

    /// Byte vindo do teclado. Chamável de dentro do tratador de IRQ.
    pub fn push_input(&self, byte: u8) {
        devfs::push_input(&self.input, byte);
    }

    /// Fila de entrada compartilhada, para o shim de boot ligar no driver
    /// de teclado.
    pub fn input_queue(&self) -> InputQueue {
        self.input.clone()
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    pub fn vfs_mut(&mut self) -> &mut Vfs {
        &mut self.vfs
    }

    pub fn current_pid(&self) -> Option<Pid> {
        self.sched.current()
    }

    pub fn process_state(&self, pid: Pid) -> ProcessState {
        self.procs.state_of(pid)
    }

    fn timer_tick(&mut self, frame: &mut InterruptFrame) {
        if let Some(pid) = self.sched.current() {
            match self.procs.state_of(pid) {
                // troca já encaminhada no bloqueio
                ProcessState::Waiting => return,
                ProcessState::Running => {
                    if let Some(pcb) = self.procs.get_mut(pid) {
                        pcb.frame = *frame;
                    }
                }
                _ => {}
            }
        }
        self.schedule(frame);
    }

    fn handle_syscall(&mut self, frame: &mut InterruptFrame) {
        let Some(pid) = self.sched.current() else {
            return;
        };
        // frame completo no PCB antes do despacho, para bloqueio/resume
        if let Some(pcb) = self.procs.get_mut(pid) {
            pcb.frame = *frame;
        }
        match syscall::dispatch(self, pid, frame) {
            SysOutcome::Complete(value) => {
                if self.sched.current() == Some(pid) && self.procs.get(pid).is_some() {
                    frame.eax = value as u32;
                } else {
                    // exit(): o corrente deixou de existir
                    self.schedule(frame);
                }
            }
            SysOutcome::WouldBlock(notifier) => {
                self.sched.block_current(&mut self.procs, notifier);
                self.schedule(frame);
            }
        }
    }

    fn handle_page_fault(&mut self, frame: &mut InterruptFrame) {
        let Some(pid) = self.sched.current() else {
            return;
        };
        kerror!("page fault em pid {}, processo destruído", pid);
        self.sched.remove(pid);
        if let Err(err) = self.procs.destroy(pid, None, &mut self.vfs, &mut self.mm) {
            kerror!("kernel: destruição pós-falta falhou: {:?}", err);
        }
        self.schedule(frame);
    }

    /// Escolhe o próximo processo e restaura o seu contexto em `frame`.
    /// Sem candidato executável, espera interrupções de porta aberta até
    /// algum notifier disparar; sem processo nenhum, devolve ao chamador.
    fn schedule(&mut self, frame: &mut InterruptFrame) {
        loop {
            let next = {
                let vfs = &self.vfs;
                self.sched
                    .switch_next(&mut self.procs, |pid, notifier| match notifier {
                        Notifier::Always => true,
                        Notifier::StdinReadable => {
                            vfs.devfs().map_or(false, |d| d.stdin_readable(pid))
                        }
                    })
            };
            match next {
                Next::Run { pid, resumed: false } => {
                    let (saved, dir) = {
                        let pcb = self.procs.get(pid).unwrap();
                        (pcb.frame, pcb.dir)
                    };
                    *frame = saved;
                    self.hal.load_page_directory(self.mm.dir(dir));
                    return;
                }
                Next::Run { pid, resumed: true } => {
                    let (saved, dir) = {
                        let pcb = self.procs.get(pid).unwrap();
                        (pcb.frame, pcb.dir)
                    };
                    // a syscall retomada copia para o espaço do acordado,
                    // então o diretório dele precisa estar ativo antes do
                    // despacho
                    self.hal.load_page_directory(self.mm.dir(dir));
                    match syscall::dispatch(self, pid, &saved) {
                        SysOutcome::Complete(value) => {
                            if let Some(pcb) = self.procs.get_mut(pid) {
                                pcb.frame.eax = value as u32;
                                *frame = pcb.frame;
                                self.hal.load_page_directory(self.mm.dir(dir));
                                return;
                            }
                            // a própria syscall retomada destruiu o processo
                            self.sched.remove(pid);
                        }
                        SysOutcome::WouldBlock(notifier) => {
                            self.sched.block_current(&mut self.procs, notifier);
                        }
                    }
                }
                Next::Idle => {
                    if self.sched.queue_len() == 0 {
                        // nada vivo para escalonar
                        return;
                    }
                    self.hal.enable_interrupts();
                    self.hal.wait_for_interrupt();
                    self.hal.disable_interrupts();
                }
            }
        }
    }
}
