//! Round-robin cooperativo-preemptivo.
//!
//! A fila é um anel de PIDs sobre a arena de PCBs: destruir um processo
//! não invalida ponteiro nenhum, só deixa um PID órfão que a rotação
//! descarta. A promoção de Waiting para Running passa pelo predicado do
//! notifier, avaliado na hora da rotação e nunca antes.

use crate::sched::process::{Notifier, ProcessState, ProcessTable};
use crate::sys::Pid;
use crate::ktrace;
use alloc::collections::VecDeque;

/// Resultado de uma rotação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Processo escolhido; `resumed` indica que ele estava bloqueado e a
    /// syscall pendente precisa ser reexecutada.
    Run { pid: Pid, resumed: bool },
    /// Ninguém pronto: o chamador deve esperar interrupção e tentar de
    /// novo.
    Idle,
}

pub struct Scheduler {
    queue: VecDeque<Pid>,
    current: Option<Pid>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn enqueue(&mut self, pid: Pid) {
        self.queue.push_back(pid);
    }

    /// Tira um PID da fila (e da CPU, se for o corrente).
    pub fn remove(&mut self, pid: Pid) {
        self.queue.retain(|&p| p != pid);
        if self.current == Some(pid) {
            self.current = None;
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Rotaciona a fila e escolhe o próximo processo executável.
    ///
    /// O corrente, se ainda Running, vira Ready e vai para o fim. Cada
    /// candidato Waiting tem seu notifier avaliado por `wake`; quem não
    /// acorda volta para o fim da fila. PIDs de processos já destruídos
    /// são descartados na passagem.
    pub fn switch_next<F>(&mut self, procs: &mut ProcessTable, wake: F) -> Next
    where
        F: Fn(Pid, Notifier) -> bool,
    {
        if let Some(pid) = self.current.take() {
            if let Some(pcb) = procs.get_mut(pid) {
                if pcb.state == ProcessState::Running {
                    pcb.state = ProcessState::Ready;
                    self.queue.push_back(pid);
                }
            }
        }

        let mut rotations = self.queue.len();
        while rotations > 0 {
            rotations -= 1;
            let Some(pid) = self.queue.pop_front() else { break };
            let Some(pcb) = procs.get_mut(pid) else {
                // destruído com PID ainda no anel
                continue;
            };
            match pcb.state {
                ProcessState::Ready => {
                    pcb.state = ProcessState::Running;
                    self.current = Some(pid);
                    ktrace!("sched: pid {} assume a CPU", pid);
                    return Next::Run { pid, resumed: false };
                }
                ProcessState::Waiting => {
                    let notifier = pcb.notifier.unwrap_or(Notifier::Always);
                    if wake(pid, notifier) {
                        let pcb = procs.get_mut(pid).unwrap();
                        pcb.state = ProcessState::Running;
                        pcb.notifier = None;
                        self.current = Some(pid);
                        ktrace!("sched: pid {} acordou", pid);
                        return Next::Run { pid, resumed: true };
                    }
                    self.queue.push_back(pid);
                }
                ProcessState::Running | ProcessState::Inactive => {}
            }
        }
        Next::Idle
    }

    /// Bloqueia o processo corrente atrás de `notifier`. O frame já deve
    /// ter sido salvo no PCB pelo chamador.
    pub fn block_current(&mut self, procs: &mut ProcessTable, notifier: Notifier) {
        if let Some(pid) = self.current {
            if let Some(pcb) = procs.get_mut(pid) {
                pcb.state = ProcessState::Waiting;
                pcb.notifier = Some(notifier);
            }
            self.queue.push_back(pid);
            self.current = None;
            ktrace!("sched: pid {} bloqueado ({:?})", pid, notifier);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
