//! Contexto salvo na entrada de interrupção.
//!
//! O stub em assembly empurra os registradores nesta ordem e entrega o
//! struct por referência ao kernel. A troca de contexto é cópia de valor:
//! salvar é `pcb.frame = *frame`, restaurar é o inverso. Nada aqui toca
//! hardware, o que deixa o escalonador testável sem entrega de interrupção
//! real.

use bitflags::bitflags;

/// Seletores de segmento de usuário (RPL 3).
pub const USER_CODE_SELECTOR: u32 = 0x18 | 3;
pub const USER_DATA_SELECTOR: u32 = 0x20 | 3;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Eflags: u32 {
        /// Bit 1 é fixo em 1 na arquitetura.
        const RESERVED  = 1 << 1;
        /// IF: interrupções habilitadas.
        const INTERRUPT = 1 << 9;
    }
}

/// Registradores empilhados pelo stub de interrupção, na ordem de memória.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptFrame {
    // pusha (ordem invertida na memória)
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    pub esp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    // segmentos de dados salvos pelo stub
    pub ds: u32,
    pub es: u32,
    pub fs: u32,
    pub gs: u32,

    // empurrados pelo stub por vetor
    pub int_number: u32,
    pub error_code: u32,

    // empurrados pela CPU no trap de ring 3
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    pub old_esp: u32,
    pub ss: u32,
}

impl InterruptFrame {
    /// Frame inicial de um processo de usuário: GPRs zerados, segmentos de
    /// usuário, execução a partir do endereço virtual 0 e pilha no topo da
    /// primeira página.
    pub fn user_initial(stack_top: u32) -> Self {
        Self {
            ds: USER_DATA_SELECTOR,
            es: USER_DATA_SELECTOR,
            fs: USER_DATA_SELECTOR,
            gs: USER_DATA_SELECTOR,
            ss: USER_DATA_SELECTOR,
            cs: USER_CODE_SELECTOR,
            eip: 0,
            eflags: (Eflags::RESERVED | Eflags::INTERRUPT).bits(),
            old_esp: stack_top,
            ..Self::default()
        }
    }
}
