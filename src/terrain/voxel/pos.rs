// ============================================
// Positions - Координаты чанков и блоков
// ============================================

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{CHUNK_MASK, CHUNK_SHIFT};

/// Позиция чанка в сетке мира
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Упаковка в i64: x в старших 32 битах, z в младших
    #[inline]
    pub fn to_key(self) -> i64 {
        ((self.x as i64) << 32) | (self.z as u32 as i64)
    }

    #[inline]
    pub fn from_key(key: i64) -> Self {
        Self {
            x: (key >> 32) as i32,
            z: key as i32,
        }
    }

    /// Чанк, содержащий мировую колонку (арифметический сдвиг = деление вниз)
    #[inline]
    pub fn from_world(world_x: i32, world_z: i32) -> Self {
        Self {
            x: world_x >> CHUNK_SHIFT,
            z: world_z >> CHUNK_SHIFT,
        }
    }

    /// Мировые координаты угла чанка
    #[inline]
    pub fn world_origin(self) -> (i32, i32) {
        (self.x << CHUNK_SHIFT, self.z << CHUNK_SHIFT)
    }

    #[inline]
    pub fn neighbor(self, dx: i32, dz: i32) -> Self {
        Self { x: self.x + dx, z: self.z + dz }
    }

    /// Чебышёвское расстояние в чанках
    #[inline]
    pub fn distance(self, other: ChunkPos) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Все чанки квадрата радиуса `radius` вокруг центра
    pub fn square_around(self, radius: i32) -> impl Iterator<Item = ChunkPos> {
        let center = self;
        (-radius..=radius).flat_map(move |dz| (-radius..=radius).map(move |dx| center.neighbor(dx, dz)))
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}

/// Позиция блока в мире
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Чанк этого блока
    #[inline]
    pub fn chunk_pos(self) -> ChunkPos {
        ChunkPos::from_world(self.x, self.z)
    }

    /// Локальные координаты внутри чанка (младшие 4 бита x/z)
    #[inline]
    pub fn local(self) -> (usize, usize, usize) {
        ((self.x & CHUNK_MASK) as usize, self.y as usize, (self.z & CHUNK_MASK) as usize)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, z: self.z + dz }
    }
}
