//! Fronteira de syscall: vetor 0x30, número em eax, args em ebx/ecx/edx.

pub mod dispatcher;
pub mod numbers;


pub use dispatcher::{dispatch, SysOutcome};
