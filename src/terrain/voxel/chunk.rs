// ============================================
// Chunk - Блоки 16x256x16 + два канала света
// ============================================
// Любое изменение значения ставит dirty (для сохранения)
// и needs_remesh (для меша). revision растёт с каждой правкой.

use crate::blocks::{BlockId, AIR};

use super::constants::{in_bounds, linear_index, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME};
use super::nibble::NibbleArray;
use super::pos::ChunkPos;

#[derive(Clone)]
pub struct Chunk {
    pos: ChunkPos,
    blocks: Box<[BlockId]>,
    sky_light: NibbleArray,
    block_light: NibbleArray,
    dirty: bool,
    needs_remesh: bool,
    revision: u64,
}

impl Chunk {
    /// Пустой чанк (весь воздух, без света), сразу dirty
    pub fn new(pos: ChunkPos) -> Self {
        Self {
            pos,
            blocks: vec![AIR; CHUNK_VOLUME].into_boxed_slice(),
            sky_light: NibbleArray::new(),
            block_light: NibbleArray::new(),
            dirty: true,
            needs_remesh: true,
            revision: 0,
        }
    }

    /// Собрать чанк из сохранённых частей. Результат чистый.
    pub fn from_parts(
        pos: ChunkPos,
        blocks: Box<[BlockId]>,
        sky_light: NibbleArray,
        block_light: NibbleArray,
    ) -> Option<Self> {
        if blocks.len() != CHUNK_VOLUME {
            return None;
        }
        Some(Self {
            pos,
            blocks,
            sky_light,
            block_light,
            dirty: false,
            needs_remesh: true,
            revision: 0,
        })
    }

    #[inline]
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    #[inline]
    fn index(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < CHUNK_SIZE as usize && y < CHUNK_HEIGHT as usize && z < CHUNK_SIZE as usize,
            "local position ({}, {}, {}) out of chunk bounds",
            x, y, z
        );
        linear_index(x, y, z)
    }

    #[inline]
    fn touch(&mut self) {
        self.dirty = true;
        self.needs_remesh = true;
        self.revision += 1;
    }

    // ============================================
    // Blocks
    // ============================================

    /// Блок по локальным координатам; вне чанка паникует
    #[inline]
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[Self::index(x, y, z)]
    }

    /// Блок по знаковым координатам; вне чанка = воздух
    #[inline]
    pub fn get_block_safe(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !in_bounds(x, y, z) {
            return AIR;
        }
        self.blocks[linear_index(x as usize, y as usize, z as usize)]
    }

    /// Поставить блок, вернуть предыдущий. Тот же id ничего не меняет.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, id: BlockId) -> BlockId {
        let index = Self::index(x, y, z);
        let previous = self.blocks[index];
        if previous != id {
            self.blocks[index] = id;
            self.touch();
        }
        previous
    }

    /// Залить весь чанк одним блоком (всегда dirty)
    pub fn fill(&mut self, id: BlockId) {
        self.blocks.fill(id);
        self.touch();
    }

    /// Залить горизонтальный слой от y_min до y_max включительно
    pub fn fill_layers(&mut self, y_min: usize, y_max: usize, id: BlockId) {
        for z in 0..CHUNK_SIZE as usize {
            for y in y_min..=y_max {
                for x in 0..CHUNK_SIZE as usize {
                    self.blocks[Self::index(x, y, z)] = id;
                }
            }
        }
        self.touch();
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Весь ли чанк из воздуха
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == AIR)
    }

    /// Самый высокий не-воздух в колонке
    pub fn highest_non_air(&self, x: usize, z: usize) -> Option<usize> {
        (0..CHUNK_HEIGHT as usize).rev().find(|&y| self.get_block(x, y, z) != AIR)
    }

    // ============================================
    // Light
    // ============================================

    #[inline]
    pub fn sky_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.sky_light.get(Self::index(x, y, z))
    }

    #[inline]
    pub fn block_light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.block_light.get(Self::index(x, y, z))
    }

    /// Записать небесный свет (обрезка до 15). true если значение изменилось.
    pub fn set_sky_light(&mut self, x: usize, y: usize, z: usize, level: u8) -> bool {
        let index = Self::index(x, y, z);
        let level = level.min(15);
        if self.sky_light.get(index) == level {
            return false;
        }
        self.sky_light.set(index, level);
        self.touch();
        true
    }

    pub fn set_block_light(&mut self, x: usize, y: usize, z: usize, level: u8) -> bool {
        let index = Self::index(x, y, z);
        let level = level.min(15);
        if self.block_light.get(index) == level {
            return false;
        }
        self.block_light.set(index, level);
        self.touch();
        true
    }

    /// max(sky, block)
    #[inline]
    pub fn combined_light(&self, x: usize, y: usize, z: usize) -> u8 {
        let index = Self::index(x, y, z);
        self.sky_light.get(index).max(self.block_light.get(index))
    }

    /// Свет по знаковым координатам; выше мира = полный небесный, вне чанка = 0
    pub fn combined_light_safe(&self, x: i32, y: i32, z: i32) -> u8 {
        if y >= CHUNK_HEIGHT {
            return 15;
        }
        if !in_bounds(x, y, z) {
            return 0;
        }
        self.combined_light(x as usize, y as usize, z as usize)
    }

    #[inline]
    pub fn sky_light_data(&self) -> &NibbleArray {
        &self.sky_light
    }

    #[inline]
    pub fn block_light_data(&self) -> &NibbleArray {
        &self.block_light
    }

    // ============================================
    // Flags
    // ============================================

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Сбросить dirty после сохранения
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Сбросить dirty только если с момента снимка не было правок
    pub fn clear_dirty_if(&mut self, revision: u64) -> bool {
        if self.revision == revision {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn needs_remesh(&self) -> bool {
        self.needs_remesh
    }

    /// Перестроить меш без пометки на сохранение (сосед изменился)
    pub fn request_remesh(&mut self) {
        self.needs_remesh = true;
    }

    /// Забрать флаг перемешивания
    pub fn take_remesh(&mut self) -> bool {
        std::mem::replace(&mut self.needs_remesh, false)
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("pos", &self.pos)
            .field("dirty", &self.dirty)
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{DIRT, STONE};

    fn clean_chunk() -> Chunk {
        let mut chunk = Chunk::new(ChunkPos::new(0, 0));
        chunk.clear_dirty();
        chunk
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut chunk = clean_chunk();
        assert_eq!(chunk.set_block(3, 100, 15, STONE), AIR);
        assert_eq!(chunk.get_block(3, 100, 15), STONE);
        assert!(chunk.is_dirty());
        assert_eq!(chunk.set_block(3, 100, 15, DIRT), STONE);
    }

    #[test]
    fn test_same_value_does_not_dirty() {
        let mut chunk = clean_chunk();
        chunk.set_block(1, 1, 1, STONE);
        chunk.clear_dirty();
        assert_eq!(chunk.set_block(1, 1, 1, STONE), STONE);
        assert!(!chunk.is_dirty());
        assert!(!chunk.set_sky_light(1, 1, 1, 0));
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_fill_always_dirty() {
        let mut chunk = clean_chunk();
        chunk.fill(AIR);
        assert!(chunk.is_dirty());
        assert!(chunk.is_empty());
        chunk.fill(STONE);
        assert!(!chunk.is_empty());
        assert_eq!(chunk.highest_non_air(0, 0), Some(255));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let chunk = clean_chunk();
        chunk.get_block(16, 0, 0);
    }

    #[test]
    fn test_safe_access_outside_is_air() {
        let mut chunk = clean_chunk();
        chunk.fill(STONE);
        assert_eq!(chunk.get_block_safe(-1, 0, 0), AIR);
        assert_eq!(chunk.get_block_safe(0, 256, 0), AIR);
        assert_eq!(chunk.get_block_safe(0, 0, 16), AIR);
        assert_eq!(chunk.get_block_safe(15, 255, 15), STONE);
    }

    #[test]
    fn test_light_channels_independent() {
        let mut chunk = clean_chunk();
        chunk.set_sky_light(4, 10, 4, 12);
        chunk.set_block_light(4, 10, 4, 20);
        assert_eq!(chunk.sky_light(4, 10, 4), 12);
        assert_eq!(chunk.block_light(4, 10, 4), 15);
        assert_eq!(chunk.sky_light(5, 10, 4), 0);
        assert_eq!(chunk.combined_light(4, 10, 4), 15);
    }

    #[test]
    fn test_clear_dirty_if_revision() {
        let mut chunk = clean_chunk();
        chunk.set_block(0, 0, 0, STONE);
        let snapshot = chunk.revision();
        chunk.set_block(0, 1, 0, STONE);
        assert!(!chunk.clear_dirty_if(snapshot));
        assert!(chunk.is_dirty());
        assert!(chunk.clear_dirty_if(chunk.revision()));
        assert!(!chunk.is_dirty());
    }
}
