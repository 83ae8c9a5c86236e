//! FAT32 Types - constantes e tipos do volume
//!
//! O volume é endereçado em clusters de 4 blocos. O bloco 0 carrega a
//! assinatura do formato, o cluster 1 carrega a FAT inteira e o cluster 2
//! é a tabela do diretório raiz.

use crate::drivers::block::{BlockError, BLOCK_SIZE};

/// Número de cluster dentro do volume.
pub type Cluster = u32;

/// Blocos por cluster.
pub const CLUSTER_BLOCK_COUNT: usize = 4;

/// Tamanho de um cluster em bytes.
pub const CLUSTER_SIZE: usize = BLOCK_SIZE * CLUSTER_BLOCK_COUNT;

/// Quantidade de entradas na FAT (e de clusters endereçáveis).
pub const CLUSTER_MAP_SIZE: usize = 512;

/// Cluster que guarda a FAT.
pub const FAT_CLUSTER_NUMBER: Cluster = 1;

/// Cluster da tabela do diretório raiz.
pub const ROOT_CLUSTER_NUMBER: Cluster = 2;

/// Entradas por tabela de diretório (uma tabela ocupa um cluster).
pub const MAX_DIR_TABLE_ENTRY: usize = 64;

/// Entradas 0 e 1 de toda tabela são `.` e `..`.
pub const RESERVED_ENTRY: usize = 2;

/// Bit de subdiretório no atributo padrão.
pub const ATTR_SUBDIRECTORY: u8 = 0x10;

/// Marca de slot ocupado no atributo de usuário.
pub const UATTR_NOT_EMPTY: u8 = 0b1010_1010;

/// Valores fixos das duas primeiras entradas da FAT.
pub const CLUSTER_0_VALUE: u32 = 0x0FFF_FFF0;
pub const CLUSTER_1_VALUE: u32 = 0x0FFF_FFFF;

/// Entrada de FAT livre.
pub const FAT_EMPTY_ENTRY: u32 = 0;

/// Fim de cadeia na FAT.
pub const FAT_END_OF_FILE: u32 = 0x0FFF_FFFF;

/// Nome curto 8.3.
pub const NAME_LEN: usize = 8;
pub const EXT_LEN: usize = 3;

/// Erros do driver de clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fat32Error {
    NotFound,
    AlreadyExists,
    NotAFile,
    NotADirectory,
    BufferTooSmall,
    ParentInvalid,
    OutOfSpace,
    DirectoryNotEmpty,
    Disk(BlockError),
}

impl From<BlockError> for Fat32Error {
    fn from(err: BlockError) -> Self {
        Self::Disk(err)
    }
}

/// Leitura classificada de uma entrada da FAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatValue {
    Free,
    Data(Cluster),
    EndOfChain,
}

impl FatValue {
    pub const fn from_u32(val: u32) -> Self {
        match val & 0x0FFF_FFFF {
            FAT_EMPTY_ENTRY => Self::Free,
            FAT_END_OF_FILE => Self::EndOfChain,
            n => Self::Data(n),
        }
    }
}
