// =============================================================================
// KERNEL LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do Ember Kernel com custo ZERO em release.
//
// - Usa features do Cargo para compile-time filtering
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - A saída passa por um `LogSink` registrado uma vez no boot: serial no
//   hardware real, captura/stdout nos testes. O core nunca toca porta.
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Erros fatais ou críticos
// - WARN:  Situações suspeitas mas recuperáveis
// - INFO:  Fluxo normal de execução
// - DEBUG: Informações de debugging
// - TRACE: Detalhes extremos (cada operação)
//
// Erros esperados (taxonomia de status do sys::error) são RETORNADOS, não
// logados; log é para progresso de init e anomalias.
//
// =============================================================================

use alloc::format;

// =============================================================================
// PREFIXOS COM CORES ANSI
// =============================================================================

pub const P_ERROR: &str = "\x1b[1;31m[ERRO]\x1b[0m ";
pub const P_WARN: &str = "\x1b[1;33m[WARN]\x1b[0m ";
pub const P_INFO: &str = "\x1b[32m[INFO]\x1b[0m ";
pub const P_DEBUG: &str = "\x1b[36m[DEBG]\x1b[0m ";
pub const P_TRACE: &str = "\x1b[35m[TRAC]\x1b[0m ";

/// Destino dos logs. Registrado uma única vez no boot.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

static SINK: spin::Once<&'static dyn LogSink> = spin::Once::new();

/// Registra o sink global. Chamadas subsequentes são ignoradas.
pub fn set_sink(sink: &'static dyn LogSink) {
    SINK.call_once(|| sink);
}

/// Emite uma linha já formatada com prefixo. Sem sink registrado, descarta.
pub fn emit(prefix: &str, args: core::fmt::Arguments) {
    if let Some(sink) = SINK.get() {
        sink.write_line(&format!("{}{}", prefix, args));
    }
}

// =============================================================================
// MACROS DE LOG
// =============================================================================
//
// kerror!/kwarn! - Sempre ativos (exceto com no_logs)
// kinfo!         - A partir de log_info
// kdebug!        - A partir de log_debug
// ktrace!        - Apenas com log_trace
//

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::P_ERROR, format_args!($($arg)*))
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::P_WARN, format_args!($($arg)*))
    };
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

#[cfg(any(feature = "log_info", feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::P_INFO, format_args!($($arg)*))
    };
}

#[cfg(not(any(feature = "log_info", feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

#[cfg(any(feature = "log_debug", feature = "log_trace"))]
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::P_DEBUG, format_args!($($arg)*))
    };
}

#[cfg(not(any(feature = "log_debug", feature = "log_trace")))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

#[cfg(feature = "log_trace")]
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {
        $crate::logging::emit($crate::logging::P_TRACE, format_args!($($arg)*))
    };
}

#[cfg(not(feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}
