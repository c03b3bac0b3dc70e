// ============================================
// Neighbor Sampling - Доступ к соседним чанкам
// ============================================
// Мешер читает свой чанк напрямую, а всё за его границей
// через BlockQuery в мировых координатах.

use crate::blocks::{BlockId, AIR};
use crate::terrain::voxel::constants::{in_bounds, CHUNK_HEIGHT};
use crate::terrain::voxel::Chunk;

/// Чтение блоков мира для межчанковых проверок.
/// Незагруженное = воздух.
pub trait BlockQuery: Sync {
    fn query_block(&self, world_x: i32, y: i32, world_z: i32) -> BlockId;

    /// max(sky, block) в клетке; по умолчанию полный свет
    fn query_light(&self, _world_x: i32, _y: i32, _world_z: i32) -> u8 {
        15
    }
}

impl<F> BlockQuery for F
where
    F: Fn(i32, i32, i32) -> BlockId + Sync,
{
    #[inline]
    fn query_block(&self, world_x: i32, y: i32, world_z: i32) -> BlockId {
        self(world_x, y, world_z)
    }
}

/// Нет соседей: всё вокруг воздух
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyNeighbors;

impl BlockQuery for EmptyNeighbors {
    #[inline]
    fn query_block(&self, _world_x: i32, _y: i32, _world_z: i32) -> BlockId {
        AIR
    }
}

/// Выборка блоков и света вокруг чанка по локальным координатам [x, y, z]
pub(crate) struct Sampler<'a> {
    chunk: &'a Chunk,
    neighbors: &'a dyn BlockQuery,
    origin_x: i32,
    origin_z: i32,
}

impl<'a> Sampler<'a> {
    pub fn new(chunk: &'a Chunk, neighbors: &'a dyn BlockQuery) -> Self {
        let (origin_x, origin_z) = chunk.pos().world_origin();
        Self { chunk, neighbors, origin_x, origin_z }
    }

    #[inline]
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_z)
    }

    #[inline]
    pub fn block(&self, p: [i32; 3]) -> BlockId {
        let [x, y, z] = p;
        if in_bounds(x, y, z) {
            return self.chunk.get_block_safe(x, y, z);
        }
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return AIR;
        }
        self.neighbors.query_block(self.origin_x + x, y, self.origin_z + z)
    }

    #[inline]
    pub fn light(&self, p: [i32; 3]) -> u8 {
        let [x, y, z] = p;
        if y >= CHUNK_HEIGHT {
            return 15;
        }
        if y < 0 {
            return 0;
        }
        if in_bounds(x, y, z) {
            return self.chunk.combined_light_safe(x, y, z);
        }
        self.neighbors.query_light(self.origin_x + x, y, self.origin_z + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::STONE;
    use crate::terrain::voxel::ChunkPos;

    #[test]
    fn test_sampler_routes_outside_to_query() {
        let mut chunk = Chunk::new(ChunkPos::new(1, 0));
        chunk.set_block(0, 5, 0, STONE);
        let query = |wx: i32, _y: i32, _wz: i32| if wx == 15 { STONE } else { AIR };
        let sampler = Sampler::new(&chunk, &query);

        assert_eq!(sampler.block([0, 5, 0]), STONE);
        assert_eq!(sampler.block([-1, 5, 0]), STONE);
        assert_eq!(sampler.block([16, 5, 0]), AIR);
        assert_eq!(sampler.block([0, -1, 0]), AIR);
        assert_eq!(sampler.light([0, 300, 0]), 15);
        assert_eq!(sampler.light([-1, 10, 0]), 15);
    }
}
