//! FAT32 derivado - driver do volume em clusters
//!
//! Variante didática do FAT32: blocos de 512 bytes, clusters de 4 blocos,
//! FAT única de 512 entradas no cluster 1 e tabela raiz no cluster 2. Cada
//! diretório ocupa exatamente um cluster (64 entradas).
//!
//! # Características
//! - Short names (8.3)
//! - Leitura e escrita de arquivos por cadeia de clusters
//! - Criação e remoção de arquivos e diretórios
//! - Formatação idempotente detectada pela assinatura do bloco 0
//!
//! A ordem de persistência é sempre payload primeiro, entrada de diretório
//! e FAT por último, para que um volume interrompido no meio de um write
//! continue estruturalmente válido.

pub mod cluster;
pub mod directory;
pub mod node;
pub mod types;

pub use directory::{DirEntry, DirTable};
pub use node::Fat32Handler;
pub use types::*;

use crate::drivers::block::BlockDevice;
use crate::{kdebug, kinfo};
use alloc::boxed::Box;

/// Texto gravado no bloco 0. Os dois últimos bytes do bloco são o marcador
/// `Ok` que o initialize procura.
const SIGNATURE_TEXT: &[u8] = b"EmberFS volume\n";
const SIGNATURE_MARK: [u8; 2] = [b'O', b'k'];

/// Driver do volume: dispositivo de blocos + FAT em memória.
pub struct Fat32Driver {
    disk: Box<dyn BlockDevice>,
    fat: cluster::FileAllocationTable,
}

impl Fat32Driver {
    /// Constrói o driver sem tocar o disco. `initialize` faz o mount real.
    pub fn new(disk: Box<dyn BlockDevice>) -> Self {
        Self {
            disk,
            fat: cluster::FileAllocationTable::empty(),
        }
    }

    /// Monta o volume. Se a assinatura do bloco 0 estiver ausente o volume
    /// é formatado; caso contrário a FAT existente é carregada. Retorna
    /// `true` quando houve formatação.
    pub fn initialize(&mut self) -> Result<bool, Fat32Error> {
        let mut block0 = [0u8; crate::drivers::block::BLOCK_SIZE];
        self.disk.read_block(0, &mut block0)?;

        if block0[block0.len() - 2..] == SIGNATURE_MARK {
            self.fat = cluster::FileAllocationTable::load(self.disk.as_ref())?;
            kinfo!("fat32: volume reconhecido, FAT carregada");
            return Ok(false);
        }

        kinfo!("fat32: assinatura ausente, formatando volume");
        self.format()?;
        Ok(true)
    }

    fn format(&mut self) -> Result<(), Fat32Error> {
        let mut block0 = [0u8; crate::drivers::block::BLOCK_SIZE];
        block0[..SIGNATURE_TEXT.len()].copy_from_slice(SIGNATURE_TEXT);
        let mark_at = block0.len() - 2;
        block0[mark_at..].copy_from_slice(&SIGNATURE_MARK);
        self.disk.write_block(0, &block0)?;

        let root = DirTable::for_directory(ROOT_CLUSTER_NUMBER, ROOT_CLUSTER_NUMBER);
        cluster::write_cluster(self.disk.as_ref(), ROOT_CLUSTER_NUMBER, &root.to_bytes())?;

        self.fat = cluster::FileAllocationTable::formatted();
        self.fat.persist(self.disk.as_ref())
    }

    /// Carrega e valida a tabela de diretório que vive em `dir_cluster`.
    ///
    /// A validação é estrutural: a FAT precisa marcar o cluster como fim de
    /// cadeia (tabelas ocupam um único cluster) e as duas primeiras entradas
    /// precisam ser `.` e `..`.
    pub fn dir_table(&self, dir_cluster: Cluster) -> Result<DirTable, Fat32Error> {
        if self.fat.get(dir_cluster) != FAT_END_OF_FILE {
            return Err(Fat32Error::ParentInvalid);
        }
        let mut raw = [0u8; CLUSTER_SIZE];
        cluster::read_cluster(self.disk.as_ref(), dir_cluster, &mut raw)?;
        let table = DirTable::from_bytes(&raw);
        if !table.is_valid() {
            return Err(Fat32Error::ParentInvalid);
        }
        Ok(table)
    }

    /// Localiza `name` dentro do diretório em `dir_cluster`.
    pub fn find_entry(
        &self,
        dir_cluster: Cluster,
        name: &str,
    ) -> Result<(usize, DirEntry), Fat32Error> {
        let table = self.dir_table(dir_cluster)?;
        table
            .find(name)
            .map(|(i, e)| (i, *e))
            .ok_or(Fat32Error::NotFound)
    }

    /// Lê o conteúdo do arquivo `name` do diretório `dir_cluster` inteiro
    /// para `buf`. Retorna o tamanho do arquivo.
    pub fn read(
        &self,
        dir_cluster: Cluster,
        name: &str,
        buf: &mut [u8],
    ) -> Result<usize, Fat32Error> {
        let (_, entry) = self.find_entry(dir_cluster, name)?;
        if entry.is_directory() {
            return Err(Fat32Error::NotAFile);
        }
        let filesize = entry.filesize as usize;
        if buf.len() < filesize {
            return Err(Fat32Error::BufferTooSmall);
        }

        let mut copied = 0usize;
        let mut raw = [0u8; CLUSTER_SIZE];
        for c in cluster::ClusterChain::new(&self.fat, entry.cluster()) {
            if copied >= filesize {
                break;
            }
            cluster::read_cluster(self.disk.as_ref(), c, &mut raw)?;
            let take = (filesize - copied).min(CLUSTER_SIZE);
            buf[copied..copied + take].copy_from_slice(&raw[..take]);
            copied += take;
        }
        Ok(filesize)
    }

    /// Lê a tabela do subdiretório `name`. Retorna o cluster da tabela e a
    /// tabela em si.
    pub fn read_directory(
        &self,
        dir_cluster: Cluster,
        name: &str,
    ) -> Result<(Cluster, DirTable), Fat32Error> {
        let (_, entry) = self.find_entry(dir_cluster, name)?;
        if !entry.is_directory() {
            return Err(Fat32Error::NotADirectory);
        }
        let table = self.dir_table(entry.cluster())?;
        Ok((entry.cluster(), table))
    }

    /// Cria `name` dentro de `dir_cluster`. `data` vazio cria um
    /// subdiretório, qualquer payload cria um arquivo.
    pub fn write(&mut self, dir_cluster: Cluster, name: &str, data: &[u8]) -> Result<(), Fat32Error> {
        if data.is_empty() {
            self.create(dir_cluster, name, data, true)
        } else {
            self.create(dir_cluster, name, data, false)
        }
    }

    /// Cria um arquivo vazio: um cluster alocado, filesize 0.
    pub fn mkfile(&mut self, dir_cluster: Cluster, name: &str) -> Result<(), Fat32Error> {
        self.create(dir_cluster, name, &[], false)
    }

    /// Cria um subdiretório vazio.
    pub fn mkdir(&mut self, dir_cluster: Cluster, name: &str) -> Result<(), Fat32Error> {
        self.create(dir_cluster, name, &[], true)
    }

    fn create(
        &mut self,
        dir_cluster: Cluster,
        name: &str,
        data: &[u8],
        as_dir: bool,
    ) -> Result<(), Fat32Error> {
        let mut table = self.dir_table(dir_cluster)?;
        if table.find(name).is_some() {
            return Err(Fat32Error::AlreadyExists);
        }
        let slot = table.first_free_slot().ok_or(Fat32Error::OutOfSpace)?;

        let count = directory::cluster_count_for(data.len());
        let clusters = self.fat.find_free(count);
        if clusters.len() < count {
            return Err(Fat32Error::OutOfSpace);
        }

        // payload primeiro
        if as_dir {
            let body = DirTable::for_directory(clusters[0], dir_cluster);
            cluster::write_cluster(self.disk.as_ref(), clusters[0], &body.to_bytes())?;
        } else {
            let mut raw = [0u8; CLUSTER_SIZE];
            for (i, &c) in clusters.iter().enumerate() {
                let offset = i * CLUSTER_SIZE;
                let take = data.len().saturating_sub(offset).min(CLUSTER_SIZE);
                raw.fill(0);
                raw[..take].copy_from_slice(&data[offset..offset + take]);
                cluster::write_cluster(self.disk.as_ref(), c, &raw)?;
            }
        }

        // cadeia na FAT: o último cluster sempre fecha em fim de arquivo
        for (i, &c) in clusters.iter().enumerate() {
            match clusters.get(i + 1) {
                Some(&next) => self.fat.set(c, next),
                None => self.fat.set(c, FAT_END_OF_FILE),
            }
        }

        let attribute = if as_dir { ATTR_SUBDIRECTORY } else { 0 };
        let filesize = if as_dir { 0 } else { data.len() as u32 };
        table.entries[slot] = DirEntry::new(name, clusters[0], attribute, filesize);

        cluster::write_cluster(self.disk.as_ref(), dir_cluster, &table.to_bytes())?;
        self.fat.persist(self.disk.as_ref())?;
        kdebug!(
            "fat32: criado '{}' em cluster {} ({} clusters)",
            name,
            clusters[0],
            count
        );
        Ok(())
    }

    /// Remove `name` de `dir_cluster`. Diretórios só podem ser removidos
    /// vazios.
    pub fn delete(&mut self, dir_cluster: Cluster, name: &str) -> Result<(), Fat32Error> {
        let mut table = self.dir_table(dir_cluster)?;
        let (slot, entry) = table
            .find(name)
            .map(|(i, e)| (i, *e))
            .ok_or(Fat32Error::NotFound)?;

        if entry.is_directory() {
            let body = self.dir_table(entry.cluster())?;
            if !body.is_empty_dir() {
                return Err(Fat32Error::DirectoryNotEmpty);
            }
        }

        let chain: alloc::vec::Vec<Cluster> =
            cluster::ClusterChain::new(&self.fat, entry.cluster()).collect();
        for c in chain {
            self.fat.set(c, FAT_EMPTY_ENTRY);
        }

        table.entries[slot] = DirEntry::empty();
        cluster::write_cluster(self.disk.as_ref(), dir_cluster, &table.to_bytes())?;
        self.fat.persist(self.disk.as_ref())?;
        kdebug!("fat32: removido '{}'", name);
        Ok(())
    }

    /// Regrava a entrada `slot` da tabela em `dir_cluster`. Usado pelo
    /// handler quando um write estende o filesize.
    pub(crate) fn update_entry(
        &mut self,
        dir_cluster: Cluster,
        slot: usize,
        entry: DirEntry,
    ) -> Result<(), Fat32Error> {
        let mut table = self.dir_table(dir_cluster)?;
        table.entries[slot] = entry;
        cluster::write_cluster(self.disk.as_ref(), dir_cluster, &table.to_bytes())
    }

    pub(crate) fn fat(&self) -> &cluster::FileAllocationTable {
        &self.fat
    }

    pub(crate) fn fat_mut(&mut self) -> &mut cluster::FileAllocationTable {
        &mut self.fat
    }

    pub(crate) fn disk(&self) -> &dyn BlockDevice {
        self.disk.as_ref()
    }

    /// Quantos clusters ainda estão livres.
    pub fn free_clusters(&self) -> usize {
        self.fat.free_count()
    }
}
