// ============================================
// Region Pos - Регион 32x32 чанка
// ============================================

use serde::{Deserialize, Serialize};

use crate::terrain::ChunkPos;

use super::error::SaveError;

/// Чанков по стороне региона
pub const REGION_SIZE: i32 = 32;

/// Слотов в таблице региона
pub const REGION_SLOTS: usize = (REGION_SIZE * REGION_SIZE) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Регион чанка (floor division, корректно для отрицательных)
    #[inline]
    pub fn from_chunk_pos(pos: ChunkPos) -> Self {
        Self {
            x: pos.x.div_euclid(REGION_SIZE),
            z: pos.z.div_euclid(REGION_SIZE),
        }
    }

    /// r.<x>.<z>.mca
    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    #[inline]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        Self::from_chunk_pos(pos) == *self
    }

    /// Индекс слота 0..1023: local_x + local_z * 32
    pub fn chunk_offset(&self, pos: ChunkPos) -> Result<usize, SaveError> {
        if !self.contains(pos) {
            return Err(SaveError::ChunkOutsideRegion {
                chunk_x: pos.x,
                chunk_z: pos.z,
                region_x: self.x,
                region_z: self.z,
            });
        }
        let local_x = pos.x.rem_euclid(REGION_SIZE) as usize;
        let local_z = pos.z.rem_euclid(REGION_SIZE) as usize;
        Ok(local_x + local_z * REGION_SIZE as usize)
    }

    /// Чанк по индексу слота
    pub fn chunk_at(&self, slot: usize) -> ChunkPos {
        let size = REGION_SIZE as usize;
        ChunkPos::new(
            self.x * REGION_SIZE + (slot % size) as i32,
            self.z * REGION_SIZE + (slot / size) as i32,
        )
    }
}

impl std::fmt::Display for RegionPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r[{}, {}]", self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chunk_pos() {
        assert_eq!(RegionPos::from_chunk_pos(ChunkPos::new(-1, -1)), RegionPos::new(-1, -1));
        assert_eq!(RegionPos::from_chunk_pos(ChunkPos::new(32, 32)), RegionPos::new(1, 1));
        assert_eq!(RegionPos::from_chunk_pos(ChunkPos::new(31, 0)), RegionPos::new(0, 0));
        assert_eq!(RegionPos::from_chunk_pos(ChunkPos::new(-32, -33)), RegionPos::new(-1, -2));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(RegionPos::new(-1, 2).file_name(), "r.-1.2.mca");
    }

    #[test]
    fn test_chunk_offset() {
        let region = RegionPos::new(0, 0);
        assert_eq!(region.chunk_offset(ChunkPos::new(0, 0)).unwrap(), 0);
        assert_eq!(region.chunk_offset(ChunkPos::new(31, 0)).unwrap(), 31);
        assert_eq!(region.chunk_offset(ChunkPos::new(0, 1)).unwrap(), 32);
        assert_eq!(region.chunk_offset(ChunkPos::new(31, 31)).unwrap(), 1023);

        let negative = RegionPos::new(-1, -1);
        assert_eq!(negative.chunk_offset(ChunkPos::new(-1, -1)).unwrap(), 1023);
        assert_eq!(negative.chunk_at(1023), ChunkPos::new(-1, -1));

        assert!(matches!(
            region.chunk_offset(ChunkPos::new(32, 0)),
            Err(SaveError::ChunkOutsideRegion { .. })
        ));
    }
}
