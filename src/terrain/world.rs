// ============================================
// Voxel World - Хранилище + свет + сохранения
// ============================================
// Правки блоков идут в LightEngine, загрузка и выгрузка через
// WorldSaveManager. Рендер забирает меши через remesh_dirty.

use rayon::prelude::*;

use crate::blocks::{BlockId, BlockRegistry, AIR};
use crate::core::EngineConfig;
use crate::lighting::LightEngine;
use crate::save::{ChunkSource, SaveError, WorldSaveManager};

use super::generation::WorldGenerator;
use super::mesh::{with_meshing_context, GreedyMesher, MeshBuffers};
use super::storage::{read_chunk, write_chunk, ChunkHandle, ChunkStorage};
use super::voxel::constants::{CHUNK_HEIGHT, CHUNK_MASK};
use super::voxel::{BlockPos, ChunkPos};

/// Итог одного тика мира
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldTick {
    /// Обработано узлов света
    pub light_updates: usize,
    /// Сколько чанков записало автосохранение (если сработало)
    pub autosaved: Option<usize>,
}

pub struct VoxelWorld {
    config: EngineConfig,
    registry: BlockRegistry,
    storage: ChunkStorage,
    lighting: LightEngine,
    saves: WorldSaveManager,
    generator: Box<dyn WorldGenerator>,
}

impl VoxelWorld {
    pub fn new(
        config: EngineConfig,
        registry: BlockRegistry,
        generator: Box<dyn WorldGenerator>,
    ) -> Result<Self, SaveError> {
        let saves = WorldSaveManager::from_config(&config)?;
        let lighting = LightEngine::new(config.light_updates_per_tick);
        log::info!(
            "World '{}' ready (render distance {}, {} blocks registered)",
            config.world_name,
            config.render_distance,
            registry.count()
        );
        Ok(Self {
            config,
            registry,
            storage: ChunkStorage::new(),
            lighting,
            saves,
            generator,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &ChunkStorage {
        &self.storage
    }

    pub fn lighting(&self) -> &LightEngine {
        &self.lighting
    }

    pub fn saves(&self) -> &WorldSaveManager {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut WorldSaveManager {
        &mut self.saves
    }

    // ============================================
    // Chunks
    // ============================================

    /// Чанк из памяти, с диска или из генератора.
    /// Сгенерированные освещаются целиком, загруженные только по краям.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> Result<ChunkHandle, SaveError> {
        if let Some(handle) = self.storage.get(pos) {
            return Ok(handle);
        }
        let (chunk, source) = self.saves.load_or_create_chunk(pos, self.generator.as_ref())?;
        let handle = self.storage.insert_if_absent(chunk);

        match source {
            ChunkSource::Generated => self.lighting.seed_chunk(&self.storage, &self.registry, pos),
            ChunkSource::Disk => self.lighting.seed_borders(&self.storage, &self.registry, pos),
        }
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            self.storage.with_chunk_mut(pos.neighbor(dx, dz), |chunk| chunk.request_remesh());
        }
        Ok(handle)
    }

    /// Прогрузить квадрат вокруг центра; возвращает число новых чанков
    pub fn load_area(&mut self, center: ChunkPos, radius: i32) -> Result<usize, SaveError> {
        let mut loaded = 0;
        for pos in center.square_around(radius.max(0)) {
            if !self.storage.contains(pos) {
                self.ensure_chunk(pos)?;
                loaded += 1;
            }
        }
        if loaded > 0 {
            log::debug!("Loaded {} chunks around {}", loaded, center);
        }
        Ok(loaded)
    }

    /// Сохранить и выгрузить всё дальше радиуса, закрыть дальние регионы
    pub fn unload_outside(&mut self, center: ChunkPos, radius: i32) -> Result<usize, SaveError> {
        let unloaded = self.saves.unload_chunks_outside(&self.storage, center, radius)?;
        self.saves.close_regions_outside(center, radius)?;
        Ok(unloaded)
    }

    /// Загрузка + выгрузка по render_distance вокруг позиции
    pub fn update_view(&mut self, center: BlockPos) -> Result<(usize, usize), SaveError> {
        let chunk = center.chunk_pos();
        let radius = self.config.render_distance;
        let loaded = self.load_area(chunk, radius)?;
        let unloaded = self.unload_outside(chunk, radius)?;
        Ok((loaded, unloaded))
    }

    // ============================================
    // Blocks
    // ============================================

    #[inline]
    pub fn get_block(&self, pos: BlockPos) -> BlockId {
        self.storage.get_block(pos.x, pos.y, pos.z)
    }

    /// Поставить блок и поставить свет в очередь.
    /// None если чанк не загружен или y вне мира.
    pub fn set_block(&mut self, pos: BlockPos, id: BlockId) -> Option<BlockId> {
        if !(0..CHUNK_HEIGHT).contains(&pos.y) {
            return None;
        }
        let Some(old) = self.storage.set_block(pos.x, pos.y, pos.z, id) else {
            log::warn!("Edit at ({}, {}, {}) ignored: chunk {} not loaded", pos.x, pos.y, pos.z, pos.chunk_pos());
            return None;
        };
        if old != id {
            self.lighting.on_block_changed(&self.storage, &self.registry, pos, old, id);
            self.touch_neighbors(pos);
        }
        Some(old)
    }

    /// Сломать блок (поставить воздух)
    pub fn break_block(&mut self, pos: BlockPos) -> Option<BlockId> {
        self.set_block(pos, AIR).filter(|&old| old != AIR)
    }

    /// Блок на краю чанка меняет грани соседа
    fn touch_neighbors(&self, pos: BlockPos) {
        let chunk = pos.chunk_pos();
        let (lx, lz) = (pos.x & CHUNK_MASK, pos.z & CHUNK_MASK);
        let mut sides = Vec::with_capacity(2);
        if lx == 0 {
            sides.push(chunk.neighbor(-1, 0));
        } else if lx == CHUNK_MASK {
            sides.push(chunk.neighbor(1, 0));
        }
        if lz == 0 {
            sides.push(chunk.neighbor(0, -1));
        } else if lz == CHUNK_MASK {
            sides.push(chunk.neighbor(0, 1));
        }
        for side in sides {
            self.storage.with_chunk_mut(side, |c| c.request_remesh());
        }
    }

    // ============================================
    // Update
    // ============================================

    /// Свет в пределах бюджета + автосохранение
    pub fn tick(&mut self, dt: f32) -> Result<WorldTick, SaveError> {
        let light_updates = self.lighting.update(&self.storage, &self.registry);
        let autosaved = self.saves.tick(dt, &self.storage)?;
        Ok(WorldTick { light_updates, autosaved })
    }

    /// Досчитать весь отложенный свет
    pub fn settle_lighting(&mut self) -> usize {
        self.lighting.run_to_completion(&self.storage, &self.registry)
    }

    /// Меш одного чанка с соседями из хранилища
    pub fn mesh_chunk(&self, pos: ChunkPos, mesher: &GreedyMesher<'_>) -> Option<MeshBuffers> {
        let handle = self.storage.get(pos)?;
        let chunk = read_chunk(&handle);
        Some(with_meshing_context(|ctx| mesher.mesh_with_context(&chunk, &self.storage, ctx)))
    }

    /// Забрать все чанки с needs_remesh и построить меши параллельно
    pub fn remesh_dirty(&self, mesher: &GreedyMesher<'_>) -> Vec<(ChunkPos, MeshBuffers)> {
        let pending: Vec<(ChunkPos, ChunkHandle)> = self
            .storage
            .handles()
            .into_iter()
            .filter(|(_, handle)| write_chunk(handle).take_remesh())
            .collect();

        pending
            .par_iter()
            .map(|(pos, handle)| {
                let chunk = read_chunk(handle);
                let mesh = with_meshing_context(|ctx| mesher.mesh_with_context(&chunk, &self.storage, ctx));
                (*pos, mesh)
            })
            .collect()
    }

    /// Сохранить всё и закрыть регионы
    pub fn shutdown(&mut self) -> Result<usize, SaveError> {
        self.saves.shutdown(&self.storage)
    }
}
