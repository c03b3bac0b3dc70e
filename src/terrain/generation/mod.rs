// ============================================
// Generation - Контракт генератора чанков
// ============================================
// Шумовая генерация живёт снаружи движка; здесь только трейт
// и плоский генератор для демо и тестов

mod flat;

pub use flat::FlatWorldGenerator;

use crate::terrain::{Chunk, ChunkPos};

/// Источник новых чанков, когда на диске ничего нет
pub trait WorldGenerator: Send + Sync {
    fn generate_chunk(&self, pos: ChunkPos) -> Chunk;
}

impl<F> WorldGenerator for F
where
    F: Fn(ChunkPos) -> Chunk + Send + Sync,
{
    #[inline]
    fn generate_chunk(&self, pos: ChunkPos) -> Chunk {
        self(pos)
    }
}
