//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do kernel.
//! Funciona como uma extensão da `core` library.

pub mod bitmap;

pub use bitmap::Bitmap;

/// Alinha um endereço para cima.
///
/// # Exemplo
/// `align_up(10, 4) -> 12`
#[inline]
pub const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

/// Alinha um endereço para baixo.
///
/// # Exemplo
/// `align_down(10, 4) -> 8`
#[inline]
pub const fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// Divisão com teto, usada para contagem de clusters/frames.
#[inline]
pub const fn div_ceil(value: usize, divisor: usize) -> usize {
    (value + divisor - 1) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_helpers() {
        assert_eq!(align_up(10, 4), 12);
        assert_eq!(align_down(10, 4), 8);
        assert_eq!(align_up(8, 4), 8);
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(0, 2048), 0);
        assert_eq!(div_ceil(1, 2048), 1);
        assert_eq!(div_ceil(2048, 2048), 1);
        assert_eq!(div_ceil(2049, 2048), 2);
    }
}
