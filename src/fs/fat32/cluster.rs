//! Acesso a clusters e à File Allocation Table em memória.

use super::types::*;
use crate::drivers::block::BlockDevice;

/// Lê um cluster inteiro do dispositivo.
pub fn read_cluster(
    disk: &dyn BlockDevice,
    cluster: Cluster,
    buf: &mut [u8; CLUSTER_SIZE],
) -> Result<(), Fat32Error> {
    let base = cluster * CLUSTER_BLOCK_COUNT as u32;
    disk.read_blocks(base, buf)?;
    Ok(())
}

/// Escreve um cluster inteiro no dispositivo.
pub fn write_cluster(
    disk: &dyn BlockDevice,
    cluster: Cluster,
    buf: &[u8; CLUSTER_SIZE],
) -> Result<(), Fat32Error> {
    let base = cluster * CLUSTER_BLOCK_COUNT as u32;
    disk.write_blocks(base, buf)?;
    Ok(())
}

/// Cópia em memória da FAT. Toda mutação acontece aqui e só bate no disco
/// via `persist`, depois que os clusters de payload já foram gravados.
pub struct FileAllocationTable {
    entries: [u32; CLUSTER_MAP_SIZE],
}

impl FileAllocationTable {
    pub const fn empty() -> Self {
        Self {
            entries: [FAT_EMPTY_ENTRY; CLUSTER_MAP_SIZE],
        }
    }

    /// FAT de um volume recém formatado: entradas fixas 0 e 1, raiz em 2.
    pub fn formatted() -> Self {
        let mut fat = Self::empty();
        fat.entries[0] = CLUSTER_0_VALUE;
        fat.entries[1] = CLUSTER_1_VALUE;
        fat.entries[ROOT_CLUSTER_NUMBER as usize] = FAT_END_OF_FILE;
        fat
    }

    /// Entrada crua do cluster. Números fora do mapa (entradas de
    /// diretório corrompidas) são tratados como livres, nunca indexados.
    pub fn get(&self, cluster: Cluster) -> u32 {
        self.entries
            .get(cluster as usize)
            .copied()
            .unwrap_or(FAT_EMPTY_ENTRY)
    }

    pub fn value(&self, cluster: Cluster) -> FatValue {
        FatValue::from_u32(self.get(cluster))
    }

    pub fn set(&mut self, cluster: Cluster, value: u32) {
        if let Some(entry) = self.entries.get_mut(cluster as usize) {
            *entry = value;
        }
    }

    /// Clusters livres em ordem crescente, no máximo `count`.
    pub fn find_free(&self, count: usize) -> alloc::vec::Vec<Cluster> {
        let mut free = alloc::vec::Vec::with_capacity(count);
        for i in RESERVED_ENTRY..CLUSTER_MAP_SIZE {
            if self.entries[i] == FAT_EMPTY_ENTRY {
                free.push(i as Cluster);
                if free.len() == count {
                    break;
                }
            }
        }
        free
    }

    pub fn free_count(&self) -> usize {
        self.entries
            .iter()
            .skip(RESERVED_ENTRY)
            .filter(|&&e| e == FAT_EMPTY_ENTRY)
            .count()
    }

    /// Carrega a FAT do cluster 1.
    pub fn load(disk: &dyn BlockDevice) -> Result<Self, Fat32Error> {
        let mut raw = [0u8; CLUSTER_SIZE];
        read_cluster(disk, FAT_CLUSTER_NUMBER, &mut raw)?;
        let mut fat = Self::empty();
        for (i, chunk) in raw.chunks_exact(4).enumerate() {
            fat.entries[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(fat)
    }

    /// Grava a FAT inteira de volta no cluster 1.
    pub fn persist(&self, disk: &dyn BlockDevice) -> Result<(), Fat32Error> {
        let mut raw = [0u8; CLUSTER_SIZE];
        for (i, entry) in self.entries.iter().enumerate() {
            raw[i * 4..(i + 1) * 4].copy_from_slice(&entry.to_le_bytes());
        }
        write_cluster(disk, FAT_CLUSTER_NUMBER, &raw)
    }
}

/// Iterador sobre uma cadeia de clusters. Para em EndOfChain e também em
/// qualquer entrada livre, que indicaria uma cadeia corrompida. O número
/// de passos é limitado ao tamanho do mapa, então uma FAT com ciclo não
/// trava o kernel.
pub struct ClusterChain<'a> {
    fat: &'a FileAllocationTable,
    current: Option<Cluster>,
    hops: usize,
}

impl<'a> ClusterChain<'a> {
    pub fn new(fat: &'a FileAllocationTable, start: Cluster) -> Self {
        Self {
            fat,
            current: Some(start),
            hops: 0,
        }
    }
}

impl Iterator for ClusterChain<'_> {
    type Item = Cluster;

    fn next(&mut self) -> Option<Cluster> {
        let cluster = self.current?;
        if self.hops >= CLUSTER_MAP_SIZE {
            self.current = None;
            return None;
        }
        self.hops += 1;
        self.current = match self.fat.value(cluster) {
            FatValue::Data(next) => Some(next),
            FatValue::EndOfChain | FatValue::Free => None,
        };
        Some(cluster)
    }
}
