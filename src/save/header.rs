// ============================================
// Chunk Header - Заголовок payload чанка
// ============================================

use serde::{Deserialize, Serialize};

use crate::terrain::ChunkPos;

/// Магическое число "VXCH" в ASCII
pub const MAGIC_NUMBER: [u8; 4] = *b"VXCH";

/// Версия формата чанка
pub const FORMAT_VERSION: u16 = 1;

/// Заголовок перед сжатым телом (bincode, 14 байт)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkHeader {
    /// Магическое число для валидации
    pub magic: [u8; 4],
    /// Версия формата
    pub version: u16,
    pub chunk_x: i32,
    pub chunk_z: i32,
}

/// Размер заголовка после bincode
pub const HEADER_SIZE: usize = 4 + 2 + 4 + 4;

impl ChunkHeader {
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            magic: MAGIC_NUMBER,
            version: FORMAT_VERSION,
            chunk_x: pos.x,
            chunk_z: pos.z,
        }
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk_x, self.chunk_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        let header = ChunkHeader::new(ChunkPos::new(-5, 9));
        let bytes = bincode::serialize(&header).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..4], b"VXCH");
        let back: ChunkHeader = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.pos(), ChunkPos::new(-5, 9));
    }
}
