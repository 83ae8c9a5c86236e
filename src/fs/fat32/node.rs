//! Camada de caminhos sobre o driver de clusters.
//!
//! O driver enxerga apenas pares (cluster de diretório, nome 8.3). Aqui os
//! caminhos relativos ao ponto de montagem ("a/b/c") são resolvidos
//! componente a componente a partir da raiz, e ficam os handles abertos com
//! posição de leitura.

use super::cluster::{self, ClusterChain};
use super::directory::{self, DirTable};
use super::types::*;
use super::Fat32Driver;
use crate::fs::vfs::VfsEntry;
use alloc::string::String;
use alloc::vec::Vec;

/// Handle de arquivo aberto no volume de clusters.
#[derive(Debug, Clone, Copy)]
pub struct OpenNode {
    pub start_cluster: Cluster,
    pub dir_cluster: Cluster,
    pub entry_index: usize,
    pub filesize: u32,
    pub seek: u32,
}

pub struct Fat32Handler {
    driver: Fat32Driver,
}

impl Fat32Handler {
    pub fn new(driver: Fat32Driver) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Fat32Driver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Fat32Driver {
        &mut self.driver
    }

    /// Resolve um caminho de diretório para o cluster da sua tabela.
    fn resolve_dir(&self, path: &str) -> Result<Cluster, Fat32Error> {
        let mut current = ROOT_CLUSTER_NUMBER;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let (c, _) = self.driver.read_directory(current, component)?;
            current = c;
        }
        Ok(current)
    }

    /// Separa o caminho em (cluster do diretório pai, nome da folha).
    fn resolve_parent<'p>(&self, path: &'p str) -> Result<(Cluster, &'p str), Fat32Error> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Fat32Error::NotFound);
        }
        match trimmed.rfind('/') {
            Some(pos) => {
                let parent = self.resolve_dir(&trimmed[..pos])?;
                Ok((parent, &trimmed[pos + 1..]))
            }
            None => Ok((ROOT_CLUSTER_NUMBER, trimmed)),
        }
    }

    fn populated_count(table: &DirTable) -> u32 {
        table
            .entries
            .iter()
            .skip(RESERVED_ENTRY)
            .filter(|e| !e.is_empty_slot())
            .count() as u32
    }

    /// Stat de um caminho. Para diretórios o tamanho é o número de filhos.
    pub fn stat(&self, path: &str) -> Result<VfsEntry, Fat32Error> {
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            let table = self.driver.dir_table(ROOT_CLUSTER_NUMBER)?;
            return Ok(VfsEntry {
                name: String::from("/"),
                is_directory: true,
                size: Self::populated_count(&table),
            });
        }
        let (parent, leaf) = self.resolve_parent(path)?;
        let (_, entry) = self.driver.find_entry(parent, leaf)?;
        if entry.is_directory() {
            let table = self.driver.dir_table(entry.cluster())?;
            Ok(VfsEntry {
                name: entry.display_name(),
                is_directory: true,
                size: Self::populated_count(&table),
            })
        } else {
            Ok(VfsEntry {
                name: entry.display_name(),
                is_directory: false,
                size: entry.filesize,
            })
        }
    }

    /// Lista os filhos de um diretório.
    pub fn dirstat(&self, path: &str) -> Result<Vec<VfsEntry>, Fat32Error> {
        let dir = self.resolve_dir(path.trim_matches('/'))?;
        let table = self.driver.dir_table(dir)?;
        let mut out = Vec::new();
        for entry in table.entries.iter().skip(RESERVED_ENTRY) {
            if entry.is_empty_slot() {
                continue;
            }
            out.push(VfsEntry {
                name: entry.display_name(),
                is_directory: entry.is_directory(),
                size: entry.filesize,
            });
        }
        Ok(out)
    }

    /// Abre um arquivo para leitura/escrita com seek zerado.
    pub fn open(&self, path: &str) -> Result<OpenNode, Fat32Error> {
        let (parent, leaf) = self.resolve_parent(path)?;
        let (index, entry) = self.driver.find_entry(parent, leaf)?;
        if entry.is_directory() {
            return Err(Fat32Error::NotAFile);
        }
        Ok(OpenNode {
            start_cluster: entry.cluster(),
            dir_cluster: parent,
            entry_index: index,
            filesize: entry.filesize,
            seek: 0,
        })
    }

    /// Lê a partir do seek do handle, avançando-o. Retorna quantos bytes
    /// foram copiados (0 em fim de arquivo).
    pub fn read(&self, node: &mut OpenNode, buf: &mut [u8]) -> Result<usize, Fat32Error> {
        let seek = node.seek as usize;
        let filesize = node.filesize as usize;
        if seek >= filesize {
            return Ok(0);
        }
        let want = buf.len().min(filesize - seek);

        let mut raw = [0u8; CLUSTER_SIZE];
        let mut copied = 0usize;
        for (i, c) in ClusterChain::new(self.driver.fat(), node.start_cluster).enumerate() {
            let cluster_start = i * CLUSTER_SIZE;
            let cluster_end = cluster_start + CLUSTER_SIZE;
            if cluster_end <= seek {
                continue;
            }
            if copied >= want {
                break;
            }
            cluster::read_cluster(self.driver.disk(), c, &mut raw)?;
            let from = seek.max(cluster_start) - cluster_start;
            let take = (CLUSTER_SIZE - from).min(want - copied);
            buf[copied..copied + take].copy_from_slice(&raw[from..from + take]);
            copied += take;
        }
        node.seek += copied as u32;
        Ok(copied)
    }

    /// Escreve no seek do handle, estendendo a cadeia de clusters quando o
    /// fim do arquivo é ultrapassado e atualizando o filesize na entrada do
    /// diretório pai.
    pub fn write(&mut self, node: &mut OpenNode, data: &[u8]) -> Result<usize, Fat32Error> {
        if data.is_empty() {
            return Ok(0);
        }
        let seek = node.seek as usize;
        let end = seek + data.len();

        let mut chain: Vec<Cluster> =
            ClusterChain::new(self.driver.fat(), node.start_cluster).collect();
        let needed = directory::cluster_count_for(end);

        if needed > chain.len() {
            let extra = self.driver.fat().find_free(needed - chain.len());
            if extra.len() < needed - chain.len() {
                return Err(Fat32Error::OutOfSpace);
            }
            let fat = self.driver.fat_mut();
            let mut last = chain[chain.len() - 1];
            for &c in &extra {
                fat.set(last, c);
                last = c;
            }
            fat.set(last, FAT_END_OF_FILE);
            chain.extend_from_slice(&extra);
        }

        let mut raw = [0u8; CLUSTER_SIZE];
        let mut written = 0usize;
        for (i, &c) in chain.iter().enumerate() {
            let cluster_start = i * CLUSTER_SIZE;
            let cluster_end = cluster_start + CLUSTER_SIZE;
            if cluster_end <= seek {
                continue;
            }
            if cluster_start >= end {
                break;
            }
            cluster::read_cluster(self.driver.disk(), c, &mut raw)?;
            let from = seek.max(cluster_start) - cluster_start;
            let to = end.min(cluster_end) - cluster_start;
            raw[from..to].copy_from_slice(&data[written..written + (to - from)]);
            cluster::write_cluster(self.driver.disk(), c, &raw)?;
            written += to - from;
        }

        if end as u32 > node.filesize {
            node.filesize = end as u32;
            let table = self.driver.dir_table(node.dir_cluster)?;
            let mut entry = table.entries[node.entry_index];
            entry.filesize = node.filesize;
            self.driver
                .update_entry(node.dir_cluster, node.entry_index, entry)?;
        }
        self.driver.fat().persist(self.driver.disk())?;

        node.seek = end as u32;
        Ok(written)
    }

    pub fn mkfile(&mut self, path: &str) -> Result<(), Fat32Error> {
        let (parent, leaf) = self.resolve_parent(path)?;
        self.driver.mkfile(parent, leaf)
    }

    pub fn mkdir(&mut self, path: &str) -> Result<(), Fat32Error> {
        let (parent, leaf) = self.resolve_parent(path)?;
        self.driver.mkdir(parent, leaf)
    }

    pub fn delete(&mut self, path: &str) -> Result<(), Fat32Error> {
        let (parent, leaf) = self.resolve_parent(path)?;
        self.driver.delete(parent, leaf)
    }

    /// Grava um arquivo inteiro de uma vez (conveniência para exec e boot).
    pub fn write_file(&mut self, path: &str, data: &[u8]) -> Result<(), Fat32Error> {
        let (parent, leaf) = self.resolve_parent(path)?;
        self.driver.write(parent, leaf, data)
    }
}
