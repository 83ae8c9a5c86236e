//! Drivers consumidos pelo core.
//!
//! Só entra aqui o que o filesystem precisa: a abstração de dispositivo de
//! bloco com o ramdisk e o sink de console que o `/dev/stdout` alimenta.

pub mod block;
pub mod console;
