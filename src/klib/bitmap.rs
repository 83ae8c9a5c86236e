//! Bitmap genérico

/// Bitmap de tamanho fixo para contabilidade de recursos (frames, slots).
///
/// A busca por bit livre é sempre do índice mais baixo para o mais alto, o
/// que dá o comportamento first-fit determinístico que o gerenciador de
/// frames exige.
pub struct Bitmap<const WORDS: usize> {
    data: [u64; WORDS],
    len: usize,
}

impl<const WORDS: usize> Bitmap<WORDS> {
    /// Cria bitmap com `bits` posições, todas livres.
    pub const fn new(bits: usize) -> Self {
        Self {
            data: [0; WORDS],
            len: bits,
        }
    }

    /// Define um bit
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.data[index / 64] |= 1 << (index % 64);
    }

    /// Limpa um bit
    pub fn clear(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.data[index / 64] &= !(1 << (index % 64));
    }

    /// Testa um bit
    pub fn test(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        (self.data[index / 64] & (1 << (index % 64))) != 0
    }

    /// Encontra primeiro bit livre (0)
    pub fn find_first_zero(&self) -> Option<usize> {
        for (i, &word) in self.data.iter().enumerate() {
            if word != u64::MAX {
                let index = i * 64 + word.trailing_ones() as usize;
                if index < self.len {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Quantidade de bits ainda livres.
    pub fn free_count(&self) -> usize {
        let used: usize = self
            .data
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum();
        self.len - used
    }
}
