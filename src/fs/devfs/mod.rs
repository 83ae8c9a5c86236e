//! `/dev` - dispositivos de caractere
//!
//! Dois nós: `stdin`, um ring buffer alimentado pelo teclado via
//! `push_input`, e `stdout`, que encaminha bytes para o `ConsoleOut`
//! externo. O processo que abre `stdin` entra numa pilha de foreground e
//! só o topo dela consegue ler o buffer.

use crate::drivers::console::ConsoleOut;
use crate::fs::fat32::Fat32Error;
use crate::fs::vfs::{VfsEntry, VfsError};
use crate::sys::Pid;
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

/// Capacidade do ring de stdin. Entrada além disso descarta o byte mais
/// antigo, como num terminal sem flow control.
pub const STDIN_BUFFER_SIZE: usize = 16;

/// Fila de entrada compartilhada entre o devfs e a rotina de interrupção
/// do teclado.
pub type InputQueue = Arc<Mutex<VecDeque<u8>>>;

pub fn new_input_queue() -> InputQueue {
    Arc::new(Mutex::new(VecDeque::with_capacity(STDIN_BUFFER_SIZE)))
}

/// Enfileira um byte vindo do teclado, descartando o mais antigo quando o
/// ring está cheio.
pub fn push_input(queue: &InputQueue, byte: u8) {
    let mut q = queue.lock();
    if q.len() >= STDIN_BUFFER_SIZE {
        q.pop_front();
    }
    q.push_back(byte);
}

/// Handle aberto em `/dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevHandle {
    Stdin,
    Stdout,
}

pub struct DevFs {
    console: Box<dyn ConsoleOut>,
    stdin: InputQueue,
    foreground: Vec<Pid>,
}

impl DevFs {
    pub fn new(console: Box<dyn ConsoleOut>, stdin: InputQueue) -> Self {
        Self {
            console,
            stdin,
            foreground: Vec::new(),
        }
    }

    pub fn stat(&self, rel: &str) -> Result<VfsEntry, VfsError> {
        match rel {
            "" => Ok(VfsEntry {
                name: String::from("dev"),
                is_directory: true,
                size: 2,
            }),
            "stdin" | "stdout" => Ok(VfsEntry {
                name: String::from(rel),
                is_directory: false,
                size: 0,
            }),
            _ => Err(VfsError::Fs(Fat32Error::NotFound)),
        }
    }

    pub fn dirstat(&self) -> Vec<VfsEntry> {
        let node = |name: &str| VfsEntry {
            name: String::from(name),
            is_directory: false,
            size: 0,
        };
        alloc::vec![node("stdin"), node("stdout")]
    }

    /// Abrir `stdin` coloca o chamador no topo do foreground. Abrir duas
    /// vezes sem fechar é recusado.
    pub fn open(&mut self, rel: &str, pid: Pid) -> Result<DevHandle, VfsError> {
        match rel {
            "stdin" => {
                if self.foreground.contains(&pid) {
                    return Err(VfsError::Fs(Fat32Error::AlreadyExists));
                }
                self.foreground.push(pid);
                Ok(DevHandle::Stdin)
            }
            "stdout" => Ok(DevHandle::Stdout),
            _ => Err(VfsError::Fs(Fat32Error::NotFound)),
        }
    }

    pub fn close(&mut self, handle: DevHandle, pid: Pid) {
        if handle == DevHandle::Stdin {
            self.foreground.retain(|&p| p != pid);
        }
    }

    /// Leitura de `stdin`. Só o dono do foreground lê; fila vazia ou
    /// leitor em segundo plano viram `WouldBlock` para o notifier.
    pub fn read(&mut self, handle: DevHandle, pid: Pid, buf: &mut [u8]) -> Result<usize, VfsError> {
        match handle {
            DevHandle::Stdout => Err(VfsError::Unsupported),
            DevHandle::Stdin => {
                if self.foreground.last() != Some(&pid) {
                    return Err(VfsError::WouldBlock);
                }
                let mut q = self.stdin.lock();
                if q.is_empty() {
                    return Err(VfsError::WouldBlock);
                }
                let mut copied = 0;
                while copied < buf.len() {
                    match q.pop_front() {
                        Some(b) => {
                            buf[copied] = b;
                            copied += 1;
                        }
                        None => break,
                    }
                }
                Ok(copied)
            }
        }
    }

    pub fn write(&mut self, handle: DevHandle, data: &[u8]) -> Result<usize, VfsError> {
        match handle {
            DevHandle::Stdin => Err(VfsError::Unsupported),
            DevHandle::Stdout => {
                self.console.put_bytes(data);
                Ok(data.len())
            }
        }
    }

    /// Predicado do notifier: há byte disponível para este pid?
    pub fn stdin_readable(&self, pid: Pid) -> bool {
        self.foreground.last() == Some(&pid) && !self.stdin.lock().is_empty()
    }
}
