// ============================================
// Light Node - Элемент очереди BFS
// ============================================

use crate::terrain::voxel::constants::{CHUNK_HEIGHT, CHUNK_MASK, CHUNK_SIZE};
use crate::terrain::{BlockPos, Chunk, ChunkPos};

/// Канал света
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Sky,
    Block,
}

impl Channel {
    #[inline]
    pub fn get(self, chunk: &Chunk, x: usize, y: usize, z: usize) -> u8 {
        match self {
            Channel::Sky => chunk.sky_light(x, y, z),
            Channel::Block => chunk.block_light(x, y, z),
        }
    }

    #[inline]
    pub fn set(self, chunk: &mut Chunk, x: usize, y: usize, z: usize, level: u8) -> bool {
        match self {
            Channel::Sky => chunk.set_sky_light(x, y, z, level),
            Channel::Block => chunk.set_block_light(x, y, z, level),
        }
    }
}

/// Соседи по осям; индекс 3 = вниз
pub const NEIGHBOR_OFFSETS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Индекс направления "вниз" в NEIGHBOR_OFFSETS
pub const DOWN: usize = 3;

/// Клетка чанка + уровень света
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightNode {
    pub chunk: ChunkPos,
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub level: u8,
}

impl LightNode {
    #[inline]
    pub fn new(chunk: ChunkPos, x: usize, y: usize, z: usize, level: u8) -> Self {
        Self { chunk, x: x as u8, y: y as u8, z: z as u8, level }
    }

    /// Узел по мировой позиции; None если y вне мира
    pub fn at(pos: BlockPos, level: u8) -> Option<Self> {
        if !(0..CHUNK_HEIGHT).contains(&pos.y) {
            return None;
        }
        let (x, y, z) = pos.local();
        Some(Self::new(pos.chunk_pos(), x, y, z, level))
    }

    #[inline]
    pub fn local(&self) -> (usize, usize, usize) {
        (self.x as usize, self.y as usize, self.z as usize)
    }

    #[inline]
    pub fn with_level(self, level: u8) -> Self {
        Self { level, ..self }
    }

    /// Ключ клетки без уровня
    #[inline]
    pub fn cell(&self) -> (ChunkPos, u8, u8, u8) {
        (self.chunk, self.x, self.y, self.z)
    }

    /// Сосед по направлению; переход через границу чанка сдвигает чанк
    /// на ±1 и заворачивает локальную координату (0 <-> 15)
    pub fn neighbor(&self, dir: usize) -> Option<Self> {
        let [dx, dy, dz] = NEIGHBOR_OFFSETS[dir];
        let ny = self.y as i32 + dy;
        if !(0..CHUNK_HEIGHT).contains(&ny) {
            return None;
        }
        let nx = self.x as i32 + dx;
        let nz = self.z as i32 + dz;
        let chunk = self.chunk.neighbor(nx.div_euclid(CHUNK_SIZE), nz.div_euclid(CHUNK_SIZE));
        Some(Self {
            chunk,
            x: (nx & CHUNK_MASK) as u8,
            y: ny as u8,
            z: (nz & CHUNK_MASK) as u8,
            level: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_wraps_chunk() {
        let node = LightNode::new(ChunkPos::new(0, 0), 0, 10, 15, 9);
        let west = node.neighbor(1).unwrap();
        assert_eq!(west.chunk, ChunkPos::new(-1, 0));
        assert_eq!((west.x, west.z), (15, 15));

        let south = node.neighbor(4).unwrap();
        assert_eq!(south.chunk, ChunkPos::new(0, 1));
        assert_eq!((south.x, south.z), (0, 0));
    }

    #[test]
    fn test_vertical_bounds() {
        let bottom = LightNode::new(ChunkPos::new(0, 0), 3, 0, 3, 5);
        assert!(bottom.neighbor(DOWN).is_none());
        let top = LightNode::new(ChunkPos::new(0, 0), 3, 255, 3, 5);
        assert!(top.neighbor(2).is_none());
        assert!(LightNode::at(BlockPos::new(0, 256, 0), 1).is_none());
    }
}
