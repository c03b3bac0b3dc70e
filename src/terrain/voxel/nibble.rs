// ============================================
// Nibble Array - Упакованные 4-битные значения
// ============================================
// Два значения света в одном байте: чётный индекс в младших битах

use super::constants::{CHUNK_VOLUME, MAX_LIGHT};

/// Байт на канал света
pub const NIBBLE_BYTES: usize = CHUNK_VOLUME / 2;

#[derive(Clone, PartialEq, Eq)]
pub struct NibbleArray {
    data: Box<[u8]>,
}

impl NibbleArray {
    pub fn new() -> Self {
        Self { data: vec![0u8; NIBBLE_BYTES].into_boxed_slice() }
    }

    /// Из сырых байт; None если длина не та
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != NIBBLE_BYTES {
            return None;
        }
        Some(Self { data: bytes.to_vec().into_boxed_slice() })
    }

    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 { byte & 0x0F } else { byte >> 4 }
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: u8) {
        let value = value.min(MAX_LIGHT);
        let byte = &mut self.data[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    /// Заполнить всё одним значением
    pub fn fill(&mut self, value: u8) {
        let value = value.min(MAX_LIGHT);
        self.data.fill(value | (value << 4));
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for NibbleArray {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for NibbleArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NibbleArray").field("bytes", &self.data.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_do_not_clobber() {
        let mut nibbles = NibbleArray::new();
        nibbles.set(10, 7);
        nibbles.set(11, 12);
        assert_eq!(nibbles.get(10), 7);
        assert_eq!(nibbles.get(11), 12);
        nibbles.set(10, 0);
        assert_eq!(nibbles.get(11), 12);
    }

    #[test]
    fn test_clamps_to_fifteen() {
        let mut nibbles = NibbleArray::new();
        nibbles.set(3, 200);
        assert_eq!(nibbles.get(3), 15);
        nibbles.fill(9);
        assert_eq!(nibbles.get(0), 9);
        assert_eq!(nibbles.get(CHUNK_VOLUME - 1), 9);
    }
}
