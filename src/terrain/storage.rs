// ============================================
// Chunk Storage - Потокобезопасная карта чанков
// ============================================
// DashMap<i64, Arc<RwLock<Chunk>>>: шардированная карта, хэндлы
// клонируются наружу, поэтому шард не держится пока чанк в работе.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;

use crate::blocks::{BlockId, AIR};

use super::mesh::BlockQuery;
use super::voxel::constants::CHUNK_HEIGHT;
use super::voxel::{BlockPos, Chunk, ChunkPos};

/// Общий хэндл чанка
pub type ChunkHandle = Arc<RwLock<Chunk>>;

/// Чтение чанка (отравленный лок восстанавливается)
#[inline]
pub fn read_chunk(handle: &ChunkHandle) -> RwLockReadGuard<'_, Chunk> {
    handle.read().unwrap_or_else(PoisonError::into_inner)
}

/// Запись в чанк
#[inline]
pub fn write_chunk(handle: &ChunkHandle) -> RwLockWriteGuard<'_, Chunk> {
    handle.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct ChunkStorage {
    chunks: DashMap<i64, ChunkHandle>,
}

impl ChunkStorage {
    pub fn new() -> Self {
        Self { chunks: DashMap::new() }
    }

    /// Хэндл чанка
    pub fn get(&self, pos: ChunkPos) -> Option<ChunkHandle> {
        self.chunks.get(&pos.to_key()).map(|entry| Arc::clone(entry.value()))
    }

    /// Вставить чанк (позиция берётся из чанка), вернуть вытесненный
    pub fn insert(&self, chunk: Chunk) -> Option<ChunkHandle> {
        let key = chunk.pos().to_key();
        self.chunks.insert(key, Arc::new(RwLock::new(chunk)))
    }

    /// Вставить если позиция свободна; вернуть хэндл того, что в карте
    pub fn insert_if_absent(&self, chunk: Chunk) -> ChunkHandle {
        let key = chunk.pos().to_key();
        let entry = self.chunks.entry(key).or_insert_with(|| Arc::new(RwLock::new(chunk)));
        Arc::clone(entry.value())
    }

    pub fn remove(&self, pos: ChunkPos) -> Option<ChunkHandle> {
        self.chunks.remove(&pos.to_key()).map(|(_, handle)| handle)
    }

    #[inline]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos.to_key())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Снимок загруженных позиций
    pub fn positions(&self) -> Vec<ChunkPos> {
        self.chunks.iter().map(|entry| ChunkPos::from_key(*entry.key())).collect()
    }

    /// Снимок всех хэндлов
    pub fn handles(&self) -> Vec<(ChunkPos, ChunkHandle)> {
        self.chunks
            .iter()
            .map(|entry| (ChunkPos::from_key(*entry.key()), Arc::clone(entry.value())))
            .collect()
    }

    /// Позиции дальше `radius` чанков от центра
    pub fn positions_outside(&self, center: ChunkPos, radius: i32) -> Vec<ChunkPos> {
        self.chunks
            .iter()
            .map(|entry| ChunkPos::from_key(*entry.key()))
            .filter(|pos| pos.distance(center) > radius)
            .collect()
    }

    /// Прочитать чанк через замыкание
    pub fn with_chunk<R>(&self, pos: ChunkPos, f: impl FnOnce(&Chunk) -> R) -> Option<R> {
        let handle = self.get(pos)?;
        let chunk = read_chunk(&handle);
        Some(f(&chunk))
    }

    pub fn with_chunk_mut<R>(&self, pos: ChunkPos, f: impl FnOnce(&mut Chunk) -> R) -> Option<R> {
        let handle = self.get(pos)?;
        let mut chunk = write_chunk(&handle);
        Some(f(&mut chunk))
    }

    // ============================================
    // World coordinates
    // ============================================

    /// Блок по мировым координатам; не загружено или вне высоты = воздух
    pub fn get_block(&self, world_x: i32, y: i32, world_z: i32) -> BlockId {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return AIR;
        }
        let pos = BlockPos::new(world_x, y, world_z);
        let (lx, ly, lz) = pos.local();
        self.with_chunk(pos.chunk_pos(), |chunk| chunk.get_block(lx, ly, lz))
            .unwrap_or(AIR)
    }

    /// Поставить блок; None если чанк не загружен или y вне мира
    pub fn set_block(&self, world_x: i32, y: i32, world_z: i32, id: BlockId) -> Option<BlockId> {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return None;
        }
        let pos = BlockPos::new(world_x, y, world_z);
        let (lx, ly, lz) = pos.local();
        self.with_chunk_mut(pos.chunk_pos(), |chunk| chunk.set_block(lx, ly, lz, id))
    }

    /// max(sky, block) по мировым координатам; выше мира = 15
    pub fn combined_light(&self, world_x: i32, y: i32, world_z: i32) -> u8 {
        if y >= CHUNK_HEIGHT {
            return 15;
        }
        if y < 0 {
            return 0;
        }
        let pos = BlockPos::new(world_x, y, world_z);
        let (lx, ly, lz) = pos.local();
        self.with_chunk(pos.chunk_pos(), |chunk| chunk.combined_light(lx, ly, lz))
            .unwrap_or(15)
    }
}

impl BlockQuery for ChunkStorage {
    #[inline]
    fn query_block(&self, world_x: i32, y: i32, world_z: i32) -> BlockId {
        self.get_block(world_x, y, world_z)
    }

    #[inline]
    fn query_light(&self, world_x: i32, y: i32, world_z: i32) -> u8 {
        self.combined_light(world_x, y, world_z)
    }
}
