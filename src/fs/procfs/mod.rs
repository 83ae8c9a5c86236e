//! `/proc` - um arquivo sintético por processo vivo
//!
//! O nome do arquivo é o PID em decimal e o conteúdo é o nome do processo.
//! O registro é explícito: o gerente de processos chama `register` e
//! `unregister` em criação e destruição.

use crate::fs::fat32::Fat32Error;
use crate::fs::vfs::{VfsEntry, VfsError};
use crate::sys::Pid;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Handle aberto em `/proc`: de qual processo e onde a leitura parou.
#[derive(Debug, Clone, Copy)]
pub struct ProcHandle {
    pub pid: Pid,
    pub seek: u32,
}

#[derive(Default)]
pub struct ProcFs {
    entries: BTreeMap<Pid, String>,
}

impl ProcFs {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, pid: Pid, name: &str) {
        self.entries.insert(pid, String::from(name));
    }

    pub fn unregister(&mut self, pid: Pid) {
        self.entries.remove(&pid);
    }

    fn lookup(&self, rel: &str) -> Result<(Pid, &String), VfsError> {
        let pid: Pid = rel.parse().map_err(|_| VfsError::Fs(Fat32Error::NotFound))?;
        self.entries
            .get(&pid)
            .map(|name| (pid, name))
            .ok_or(VfsError::Fs(Fat32Error::NotFound))
    }

    pub fn stat(&self, rel: &str) -> Result<VfsEntry, VfsError> {
        if rel.is_empty() {
            return Ok(VfsEntry {
                name: String::from("proc"),
                is_directory: true,
                size: self.entries.len() as u32,
            });
        }
        let (pid, name) = self.lookup(rel)?;
        Ok(VfsEntry {
            name: pid.to_string(),
            is_directory: false,
            size: name.len() as u32,
        })
    }

    pub fn dirstat(&self) -> Vec<VfsEntry> {
        self.entries
            .iter()
            .map(|(pid, name)| VfsEntry {
                name: pid.to_string(),
                is_directory: false,
                size: name.len() as u32,
            })
            .collect()
    }

    pub fn open(&self, rel: &str) -> Result<ProcHandle, VfsError> {
        let (pid, _) = self.lookup(rel)?;
        Ok(ProcHandle { pid, seek: 0 })
    }

    /// Copia o nome do processo a partir do seek do handle.
    pub fn read(&self, handle: &mut ProcHandle, buf: &mut [u8]) -> Result<usize, VfsError> {
        let name = self
            .entries
            .get(&handle.pid)
            .ok_or(VfsError::Fs(Fat32Error::NotFound))?;
        let bytes = name.as_bytes();
        let seek = handle.seek as usize;
        if seek >= bytes.len() {
            return Ok(0);
        }
        let take = buf.len().min(bytes.len() - seek);
        buf[..take].copy_from_slice(&bytes[seek..seek + take]);
        handle.seek += take as u32;
        Ok(take)
    }
}
