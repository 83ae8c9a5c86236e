//! Saída de console.
//!
//! O core não desenha nada: `/dev/stdout` só encaminha bytes para quem
//! implementar esta trait (framebuffer, serial, captura em teste).

use alloc::vec::Vec;
use spin::Mutex;

pub trait ConsoleOut: Send + Sync {
    fn put_byte(&self, byte: u8);

    fn put_bytes(&self, bytes: &[u8]) {
        for &b in bytes {
            self.put_byte(b);
        }
    }
}

impl<T: ConsoleOut> ConsoleOut for alloc::sync::Arc<T> {
    fn put_byte(&self, byte: u8) {
        (**self).put_byte(byte)
    }
}

/// Console que acumula tudo em memória. Usado por testes e por ambientes
/// headless que descarregam o buffer depois.
pub struct BufferConsole {
    buf: Mutex<Vec<u8>>,
}

impl BufferConsole {
    pub const fn new() -> Self {
        Self {
            buf: Mutex::new(Vec::new()),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().clone()
    }

    pub fn take(&self) -> Vec<u8> {
        core::mem::take(&mut *self.buf.lock())
    }
}

impl Default for BufferConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleOut for BufferConsole {
    fn put_byte(&self, byte: u8) {
        self.buf.lock().push(byte);
    }
}
