//! Definições de sistema: tipos básicos e códigos de erro.

pub mod error;
pub mod types;

pub use error::ErrorCode;
pub use types::Pid;
