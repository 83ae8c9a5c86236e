//! Entradas de diretório de 32 bytes e tabelas de um cluster.

use super::types::*;
use crate::klib;

/// Layout on-disk de uma entrada (32 bytes, little-endian nos campos u16/u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; NAME_LEN],
    pub ext: [u8; EXT_LEN],
    pub attribute: u8,
    pub user_attribute: u8,
    pub undelete: u8,
    pub create_time: u16,
    pub create_date: u16,
    pub access_date: u16,
    pub cluster_high: u16,
    pub modified_time: u16,
    pub modified_date: u16,
    pub cluster_low: u16,
    pub filesize: u32,
}

/// Tamanho serializado de uma entrada.
pub const DIR_ENTRY_SIZE: usize = 32;

impl DirEntry {
    pub const fn empty() -> Self {
        Self {
            name: [0; NAME_LEN],
            ext: [0; EXT_LEN],
            attribute: 0,
            user_attribute: 0,
            undelete: 0,
            create_time: 0,
            create_date: 0,
            access_date: 0,
            cluster_high: 0,
            modified_time: 0,
            modified_date: 0,
            cluster_low: 0,
            filesize: 0,
        }
    }

    /// Monta uma entrada ocupada apontando para `cluster`.
    pub fn new(name: &str, cluster: Cluster, attribute: u8, filesize: u32) -> Self {
        let (name, ext) = pack_name(name);
        Self {
            name,
            ext,
            attribute,
            user_attribute: UATTR_NOT_EMPTY,
            cluster_high: (cluster >> 16) as u16,
            cluster_low: (cluster & 0xFFFF) as u16,
            filesize,
            ..Self::empty()
        }
    }

    /// Slot livre: a marca de ocupado não está presente.
    pub const fn is_empty_slot(&self) -> bool {
        self.user_attribute != UATTR_NOT_EMPTY
    }

    pub const fn is_directory(&self) -> bool {
        self.attribute & ATTR_SUBDIRECTORY != 0
    }

    /// Cluster inicial, remontado das metades alta e baixa.
    pub const fn cluster(&self) -> Cluster {
        ((self.cluster_high as u32) << 16) | self.cluster_low as u32
    }

    pub fn matches(&self, name: &str) -> bool {
        let (n, e) = pack_name(name);
        self.name == n && self.ext == e
    }

    /// Nome 8.3 de volta para texto (`NOME.EXT`, sem padding).
    pub fn display_name(&self) -> alloc::string::String {
        let mut out = alloc::string::String::new();
        for &b in self.name.iter().take_while(|&&b| b != b' ' && b != 0) {
            out.push(b as char);
        }
        let ext: alloc::vec::Vec<u8> = self
            .ext
            .iter()
            .copied()
            .take_while(|&b| b != b' ' && b != 0)
            .collect();
        if !ext.is_empty() {
            out.push('.');
            for b in ext {
                out.push(b as char);
            }
        }
        out
    }

    pub fn from_bytes(raw: &[u8]) -> Self {
        debug_assert!(raw.len() >= DIR_ENTRY_SIZE);
        let u16_at = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let mut name = [0u8; NAME_LEN];
        let mut ext = [0u8; EXT_LEN];
        name.copy_from_slice(&raw[0..8]);
        ext.copy_from_slice(&raw[8..11]);
        Self {
            name,
            ext,
            attribute: raw[11],
            user_attribute: raw[12],
            undelete: raw[13],
            create_time: u16_at(14),
            create_date: u16_at(16),
            access_date: u16_at(18),
            cluster_high: u16_at(20),
            modified_time: u16_at(22),
            modified_date: u16_at(24),
            cluster_low: u16_at(26),
            filesize: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut raw = [0u8; DIR_ENTRY_SIZE];
        raw[0..8].copy_from_slice(&self.name);
        raw[8..11].copy_from_slice(&self.ext);
        raw[11] = self.attribute;
        raw[12] = self.user_attribute;
        raw[13] = self.undelete;
        raw[14..16].copy_from_slice(&self.create_time.to_le_bytes());
        raw[16..18].copy_from_slice(&self.create_date.to_le_bytes());
        raw[18..20].copy_from_slice(&self.access_date.to_le_bytes());
        raw[20..22].copy_from_slice(&self.cluster_high.to_le_bytes());
        raw[22..24].copy_from_slice(&self.modified_time.to_le_bytes());
        raw[24..26].copy_from_slice(&self.modified_date.to_le_bytes());
        raw[26..28].copy_from_slice(&self.cluster_low.to_le_bytes());
        raw[28..32].copy_from_slice(&self.filesize.to_le_bytes());
        raw
    }
}

/// Tabela de diretório: 64 entradas, exatamente um cluster.
#[derive(Clone)]
pub struct DirTable {
    pub entries: [DirEntry; MAX_DIR_TABLE_ENTRY],
}

impl DirTable {
    pub const fn empty() -> Self {
        Self {
            entries: [DirEntry::empty(); MAX_DIR_TABLE_ENTRY],
        }
    }

    /// Tabela nova com as entradas reservadas `.` e `..` preenchidas.
    pub fn for_directory(own_cluster: Cluster, parent_cluster: Cluster) -> Self {
        let mut table = Self::empty();
        table.entries[0] = DirEntry::new(".", own_cluster, ATTR_SUBDIRECTORY, 0);
        table.entries[1] = DirEntry::new("..", parent_cluster, ATTR_SUBDIRECTORY, 0);
        table
    }

    /// Uma tabela é válida quando abre com as entradas `.` e `..`.
    pub fn is_valid(&self) -> bool {
        self.entries[0].matches(".")
            && self.entries[0].is_directory()
            && self.entries[1].matches("..")
            && self.entries[1].is_directory()
    }

    /// Procura a entrada ocupada com o nome dado (pulando `.` e `..`).
    pub fn find(&self, name: &str) -> Option<(usize, &DirEntry)> {
        self.entries
            .iter()
            .enumerate()
            .skip(RESERVED_ENTRY)
            .find(|(_, e)| !e.is_empty_slot() && e.matches(name))
    }

    /// Primeiro slot livre depois das entradas reservadas.
    pub fn first_free_slot(&self) -> Option<usize> {
        (RESERVED_ENTRY..MAX_DIR_TABLE_ENTRY).find(|&i| self.entries[i].is_empty_slot())
    }

    /// Diretório sem nenhuma entrada além de `.` e `..`.
    pub fn is_empty_dir(&self) -> bool {
        self.entries
            .iter()
            .skip(RESERVED_ENTRY)
            .all(|e| e.is_empty_slot())
    }

    pub fn from_bytes(raw: &[u8; CLUSTER_SIZE]) -> Self {
        let mut table = Self::empty();
        for (i, chunk) in raw.chunks_exact(DIR_ENTRY_SIZE).enumerate() {
            table.entries[i] = DirEntry::from_bytes(chunk);
        }
        table
    }

    pub fn to_bytes(&self) -> [u8; CLUSTER_SIZE] {
        let mut raw = [0u8; CLUSTER_SIZE];
        for (i, entry) in self.entries.iter().enumerate() {
            raw[i * DIR_ENTRY_SIZE..(i + 1) * DIR_ENTRY_SIZE].copy_from_slice(&entry.to_bytes());
        }
        raw
    }
}

/// Quebra um nome em 8.3 com padding de espaço. Nomes longos demais são
/// truncados, como no formato curto clássico.
pub fn pack_name(name: &str) -> ([u8; NAME_LEN], [u8; EXT_LEN]) {
    let mut n = [b' '; NAME_LEN];
    let mut e = [b' '; EXT_LEN];
    // "." e ".." são literais, não base+extensão
    if name == "." || name == ".." {
        for (dst, src) in n.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        return (n, e);
    }
    let (base, ext) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (name, ""),
    };
    for (dst, src) in n.iter_mut().zip(base.bytes()) {
        *dst = src;
    }
    for (dst, src) in e.iter_mut().zip(ext.bytes()) {
        *dst = src;
    }
    (n, e)
}

/// Quantos clusters um payload de `size` bytes ocupa (mínimo 1).
pub fn cluster_count_for(size: usize) -> usize {
    klib::div_ceil(size.max(1), CLUSTER_SIZE)
}
