//! Scheduling - processos, fila round-robin e contexto de interrupção

pub mod context;
pub mod process;
pub mod scheduler;


pub use context::InterruptFrame;
pub use process::{Notifier, Pcb, ProcError, ProcessState, ProcessTable};
pub use scheduler::Scheduler;
