// ============================================
// World Save Manager - Регионы мира на диске
// ============================================
// <saves>/<world>/region/r.<x>.<z>.mca
// <saves>/<world>/metadata.json
//
// Регионы открываются лениво и держатся открытыми до close_region.
// Сериализация многих чанков идёт параллельно (rayon), запись
// последовательная.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::core::{EngineConfig, DEFAULT_SEED, REGION_DIR_NAME};
use crate::terrain::storage::{read_chunk, write_chunk, ChunkHandle, ChunkStorage};
use crate::terrain::{Chunk, ChunkPos, WorldGenerator};

use super::autosave::AutosaveTimer;
use super::chunk::ChunkSerializer;
use super::error::SaveError;
use super::metadata::WorldMetadata;
use super::region::{RegionPos, REGION_SIZE};
use super::region_file::RegionFile;

/// Откуда взялся чанк из load_or_create_chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSource {
    /// Прочитан с диска, свет уже посчитан
    Disk,
    /// Создан генератором (нет на диске или данные битые)
    Generated,
}

pub struct WorldSaveManager {
    world_dir: PathBuf,
    region_dir: PathBuf,
    serializer: ChunkSerializer,
    regions: HashMap<RegionPos, RegionFile>,
    autosave: AutosaveTimer,
    metadata: WorldMetadata,
}

impl WorldSaveManager {
    /// Создаёт папку регионов, если её нет
    pub fn new(world_dir: impl Into<PathBuf>, compression_level: i32) -> Result<Self, SaveError> {
        Self::open(world_dir.into(), compression_level, DEFAULT_SEED)
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, SaveError> {
        let mut manager = Self::open(config.world_directory(), config.compression_level, config.seed)?;
        manager.autosave = AutosaveTimer::new(config.autosave_interval_secs, config.autosave_enabled);
        Ok(manager)
    }

    /// seed идёт только в метаданные нового мира
    fn open(world_dir: PathBuf, compression_level: i32, seed: u64) -> Result<Self, SaveError> {
        let region_dir = world_dir.join(REGION_DIR_NAME);
        fs::create_dir_all(&region_dir)?;

        let metadata = match WorldMetadata::load(&world_dir) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                let mut metadata = WorldMetadata::new(seed);
                metadata.save(&world_dir)?;
                log::info!("Created world metadata (seed {})", seed);
                metadata
            }
            Err(SaveError::Metadata(e)) => {
                log::warn!("World metadata is unreadable ({}), starting with seed {}", e, seed);
                WorldMetadata::new(seed)
            }
            Err(e) => return Err(e),
        };

        log::info!("World storage at {}", world_dir.display());
        Ok(Self {
            world_dir,
            region_dir,
            serializer: ChunkSerializer::new(compression_level),
            regions: HashMap::new(),
            autosave: AutosaveTimer::default(),
            metadata,
        })
    }

    pub fn world_directory(&self) -> &Path {
        &self.world_dir
    }

    pub fn region_directory(&self) -> &Path {
        &self.region_dir
    }

    #[inline]
    pub fn serializer(&self) -> &ChunkSerializer {
        &self.serializer
    }

    pub fn autosave(&self) -> &AutosaveTimer {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut AutosaveTimer {
        &mut self.autosave
    }

    pub fn metadata(&self) -> &WorldMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut WorldMetadata {
        &mut self.metadata
    }

    pub fn save_metadata(&mut self) -> Result<(), SaveError> {
        self.metadata.save(&self.world_dir)
    }

    /// Сколько регион-файлов сейчас открыто
    pub fn open_region_count(&self) -> usize {
        self.regions.len()
    }

    // ============================================
    // Regions
    // ============================================

    fn region_mut(&mut self, pos: RegionPos) -> Result<&mut RegionFile, SaveError> {
        match self.regions.entry(pos) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let region = match RegionFile::open(&self.region_dir, pos) {
                    Ok(region) => region,
                    Err(e) if e.is_corrupt() => {
                        // Битый файл откладываем в сторону, регион начинается заново
                        let aside = RegionFile::set_aside(&self.region_dir, pos)?;
                        log::warn!("Region {} is corrupt ({}), moved to {}", pos, e, aside.display());
                        RegionFile::open(&self.region_dir, pos)?
                    }
                    Err(e) => return Err(e),
                };
                Ok(entry.insert(region))
            }
        }
    }

    /// Регион только если файл уже есть на диске
    fn existing_region(&mut self, pos: RegionPos) -> Result<Option<&mut RegionFile>, SaveError> {
        match self.regions.entry(pos) {
            Entry::Occupied(entry) => Ok(Some(entry.into_mut())),
            Entry::Vacant(entry) => match RegionFile::open_existing(&self.region_dir, pos)? {
                Some(region) => Ok(Some(entry.insert(region))),
                None => Ok(None),
            },
        }
    }

    /// Закрыть регион (flush); false если он не был открыт
    pub fn close_region(&mut self, pos: RegionPos) -> Result<bool, SaveError> {
        match self.regions.remove(&pos) {
            Some(mut region) => {
                region.flush()?;
                log::debug!("Closed region {}", pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Закрыть регионы, в которых нет чанков в радиусе от центра
    pub fn close_regions_outside(&mut self, center: ChunkPos, radius: i32) -> Result<usize, SaveError> {
        let radius = radius.max(0);
        let min_x = (center.x - radius).div_euclid(REGION_SIZE);
        let max_x = (center.x + radius).div_euclid(REGION_SIZE);
        let min_z = (center.z - radius).div_euclid(REGION_SIZE);
        let max_z = (center.z + radius).div_euclid(REGION_SIZE);

        let far: Vec<RegionPos> = self
            .regions
            .keys()
            .filter(|r| r.x < min_x || r.x > max_x || r.z < min_z || r.z > max_z)
            .copied()
            .collect();
        for pos in &far {
            self.close_region(*pos)?;
        }
        Ok(far.len())
    }

    pub fn flush_all(&mut self) -> Result<(), SaveError> {
        for region in self.regions.values_mut() {
            region.flush()?;
        }
        Ok(())
    }

    // ============================================
    // Save
    // ============================================

    pub fn save_chunk(&mut self, chunk: &Chunk) -> Result<(), SaveError> {
        let data = self.serializer.serialize(chunk)?;
        self.write_payload(chunk.pos(), &data)
    }

    fn write_payload(&mut self, pos: ChunkPos, data: &[u8]) -> Result<(), SaveError> {
        self.region_mut(RegionPos::from_chunk_pos(pos))?.write_chunk(pos, data)?;
        log::debug!("Saved chunk {} ({} bytes)", pos, data.len());
        Ok(())
    }

    /// Сохранить все чанки хранилища
    pub fn save_all(&mut self, storage: &ChunkStorage) -> Result<usize, SaveError> {
        self.save_handles(storage.handles(), false)
    }

    /// Сохранить только изменённые чанки
    pub fn save_dirty(&mut self, storage: &ChunkStorage) -> Result<usize, SaveError> {
        self.save_handles(storage.handles(), true)
    }

    fn save_handles(&mut self, handles: Vec<(ChunkPos, ChunkHandle)>, only_dirty: bool) -> Result<usize, SaveError> {
        let serializer = self.serializer;

        // Снимок ревизии под read-локом, чтобы не потерять правку во время записи
        let encoded: Vec<(ChunkPos, ChunkHandle, u64, Vec<u8>)> = handles
            .into_par_iter()
            .filter_map(|(pos, handle)| {
                let chunk = read_chunk(&handle);
                if only_dirty && !chunk.is_dirty() {
                    return None;
                }
                let revision = chunk.revision();
                let result = serializer.serialize(&chunk);
                drop(chunk);
                Some(result.map(|data| (pos, handle, revision, data)))
            })
            .collect::<Result<_, _>>()?;

        let count = encoded.len();
        for (pos, handle, revision, data) in encoded {
            self.write_payload(pos, &data)?;
            write_chunk(&handle).clear_dirty_if(revision);
        }
        Ok(count)
    }

    // ============================================
    // Load
    // ============================================

    /// Загрузить чанк; None если его нет на диске. Файлы не создаются.
    pub fn load_chunk(&mut self, pos: ChunkPos) -> Result<Option<Chunk>, SaveError> {
        let serializer = self.serializer;
        let Some(region) = self.existing_region(RegionPos::from_chunk_pos(pos))? else {
            return Ok(None);
        };
        let Some(data) = region.read_chunk(pos)? else {
            return Ok(None);
        };
        let chunk = serializer.deserialize_at(&data, pos)?;
        log::debug!("Loaded chunk {}", pos);
        Ok(Some(chunk))
    }

    /// Загрузить или сгенерировать; битые данные перегенерируются
    pub fn load_or_create_chunk(
        &mut self,
        pos: ChunkPos,
        generator: &dyn WorldGenerator,
    ) -> Result<(Chunk, ChunkSource), SaveError> {
        match self.load_chunk(pos) {
            Ok(Some(chunk)) => Ok((chunk, ChunkSource::Disk)),
            Ok(None) => Ok((generator.generate_chunk(pos), ChunkSource::Generated)),
            Err(e) if e.is_corrupt() => {
                log::warn!("Chunk {} is corrupt ({}), regenerating", pos, e);
                Ok((generator.generate_chunk(pos), ChunkSource::Generated))
            }
            Err(e) => Err(e),
        }
    }

    // ============================================
    // Lifecycle
    // ============================================

    /// Автосохранение: Some(n) когда сработало
    pub fn tick(&mut self, dt: f32, storage: &ChunkStorage) -> Result<Option<usize>, SaveError> {
        if !self.autosave.tick(dt) {
            return Ok(None);
        }
        let saved = self.save_dirty(storage)?;
        self.flush_all()?;
        self.save_metadata()?;
        log::info!("Autosave: {} chunks written", saved);
        Ok(Some(saved))
    }

    /// Сохранить и выгрузить чанки дальше радиуса
    pub fn unload_chunks_outside(
        &mut self,
        storage: &ChunkStorage,
        center: ChunkPos,
        radius: i32,
    ) -> Result<usize, SaveError> {
        let far = storage.positions_outside(center, radius);
        if far.is_empty() {
            return Ok(0);
        }
        let handles: Vec<(ChunkPos, ChunkHandle)> =
            far.iter().filter_map(|&pos| storage.get(pos).map(|handle| (pos, handle))).collect();
        self.save_handles(handles, true)?;
        for &pos in &far {
            storage.remove(pos);
        }
        log::debug!("Unloaded {} chunks outside {} (r={})", far.len(), center, radius);
        Ok(far.len())
    }

    /// Сохранить всё, сбросить на диск и закрыть регионы
    pub fn shutdown(&mut self, storage: &ChunkStorage) -> Result<usize, SaveError> {
        let saved = self.save_all(storage)?;
        self.flush_all()?;
        self.save_metadata()?;
        let closed = self.regions.len();
        self.regions.clear();
        log::info!("World saved: {} chunks, {} regions closed", saved, closed);
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{GLASS, STONE};
    use crate::terrain::FlatWorldGenerator;

    fn temp_world(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxel_world_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn chunk_with_block(pos: ChunkPos, id: u16) -> Chunk {
        let mut chunk = Chunk::new(pos);
        chunk.set_block(3, 70, 9, id);
        chunk
    }

    #[test]
    fn test_save_and_load_chunk() {
        let dir = temp_world("roundtrip");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let pos = ChunkPos::new(-40, 7);
        manager.save_chunk(&chunk_with_block(pos, STONE)).unwrap();

        let loaded = manager.load_chunk(pos).unwrap().unwrap();
        assert_eq!(loaded.get_block(3, 70, 9), STONE);
        assert!(!loaded.is_dirty());
        assert!(dir.join("region").join("r.-2.0.mca").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_creates_nothing() {
        let dir = temp_world("missing");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        assert!(manager.load_chunk(ChunkPos::new(100, 100)).unwrap().is_none());
        assert_eq!(manager.open_region_count(), 0);
        assert!(!dir.join("region").join("r.3.3.mca").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_dirty_skips_clean() {
        let dir = temp_world("dirty");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let storage = ChunkStorage::new();
        storage.insert(chunk_with_block(ChunkPos::new(0, 0), STONE));
        storage.insert(chunk_with_block(ChunkPos::new(1, 0), STONE));

        assert_eq!(manager.save_dirty(&storage).unwrap(), 2);
        assert!(!storage.with_chunk(ChunkPos::new(0, 0), |c| c.is_dirty()).unwrap());
        assert_eq!(manager.save_dirty(&storage).unwrap(), 0);

        storage.set_block(17, 5, 0, GLASS);
        assert_eq!(manager.save_dirty(&storage).unwrap(), 1);
        assert_eq!(manager.save_all(&storage).unwrap(), 2);

        let loaded = manager.load_chunk(ChunkPos::new(1, 0)).unwrap().unwrap();
        assert_eq!(loaded.get_block(1, 5, 0), GLASS);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_autosave_tick() {
        let dir = temp_world("autosave");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        manager.autosave_mut().set_interval(1.0);
        let storage = ChunkStorage::new();
        storage.insert(chunk_with_block(ChunkPos::new(2, 2), STONE));

        assert_eq!(manager.tick(0.5, &storage).unwrap(), None);
        assert_eq!(manager.tick(0.6, &storage).unwrap(), Some(1));
        assert!(manager.load_chunk(ChunkPos::new(2, 2)).unwrap().is_some());
        assert_eq!(manager.tick(1.0, &storage).unwrap(), Some(0));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_chunk_is_regenerated() {
        let dir = temp_world("corrupt");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let pos = ChunkPos::new(5, 5);
        manager.write_payload(pos, b"definitely not a chunk").unwrap();

        assert!(manager.load_chunk(pos).unwrap_err().is_corrupt());
        let generator = FlatWorldGenerator::default();
        let (chunk, source) = manager.load_or_create_chunk(pos, &generator).unwrap();
        assert_eq!(source, ChunkSource::Generated);
        assert_eq!(chunk.pos(), pos);
        assert_eq!(chunk.get_block(0, 0, 0), STONE);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_or_create_prefers_disk() {
        let dir = temp_world("prefer");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let pos = ChunkPos::new(0, -1);
        manager.save_chunk(&chunk_with_block(pos, GLASS)).unwrap();
        let (chunk, source) = manager.load_or_create_chunk(pos, &FlatWorldGenerator::default()).unwrap();
        assert_eq!(source, ChunkSource::Disk);
        assert_eq!(chunk.get_block(3, 70, 9), GLASS);
        assert_eq!(chunk.get_block(0, 0, 0), crate::blocks::AIR);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unload_and_close_regions() {
        let dir = temp_world("unload");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let storage = ChunkStorage::new();
        for pos in [ChunkPos::new(0, 0), ChunkPos::new(1, 1), ChunkPos::new(40, 0)] {
            storage.insert(chunk_with_block(pos, STONE));
        }

        assert_eq!(manager.unload_chunks_outside(&storage, ChunkPos::new(0, 0), 2).unwrap(), 1);
        assert_eq!(storage.len(), 2);
        assert!(!storage.contains(ChunkPos::new(40, 0)));
        assert_eq!(manager.open_region_count(), 1);

        assert_eq!(manager.close_regions_outside(ChunkPos::new(0, 0), 2).unwrap(), 1);
        assert_eq!(manager.open_region_count(), 0);

        let reloaded = manager.load_chunk(ChunkPos::new(40, 0)).unwrap().unwrap();
        assert_eq!(reloaded.get_block(3, 70, 9), STONE);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_shutdown_closes_everything() {
        let dir = temp_world("shutdown");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let storage = ChunkStorage::new();
        storage.insert(chunk_with_block(ChunkPos::new(-1, -1), STONE));
        storage.insert(chunk_with_block(ChunkPos::new(33, 0), STONE));

        assert_eq!(manager.shutdown(&storage).unwrap(), 2);
        assert_eq!(manager.open_region_count(), 0);
        assert!(dir.join("region").join("r.-1.-1.mca").exists());
        assert!(dir.join("region").join("r.1.0.mca").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_chunk_is_generated() {
        let dir = temp_world("generated");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        // Генератор отдаёт чистый чанк, источник всё равно Generated
        let generator = |pos: ChunkPos| {
            let mut chunk = Chunk::new(pos);
            chunk.clear_dirty();
            chunk
        };
        let (chunk, source) = manager.load_or_create_chunk(ChunkPos::new(9, 9), &generator).unwrap();
        assert_eq!(source, ChunkSource::Generated);
        assert!(!chunk.is_dirty());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_region_is_moved_aside() {
        let dir = temp_world("corrupt_region");
        let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
        let path = dir.join("region").join("r.0.0.mca");
        fs::write(&path, vec![0xAB; 100]).unwrap();

        let pos = ChunkPos::new(1, 2);
        assert!(manager.load_chunk(pos).unwrap_err().is_corrupt());
        let (_, source) = manager.load_or_create_chunk(pos, &FlatWorldGenerator::default()).unwrap();
        assert_eq!(source, ChunkSource::Generated);

        // Сохранение в тот же регион проходит, старый файл лежит рядом
        manager.save_chunk(&chunk_with_block(pos, STONE)).unwrap();
        manager.save_chunk(&chunk_with_block(ChunkPos::new(3, 3), GLASS)).unwrap();
        assert!(dir.join("region").join("r.0.0.mca.corrupt").exists());
        assert_eq!(manager.load_chunk(pos).unwrap().unwrap().get_block(3, 70, 9), STONE);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_metadata_written_and_reloaded() {
        let dir = temp_world("metadata");
        {
            let mut manager = WorldSaveManager::new(&dir, 3).unwrap();
            assert!(dir.join("metadata.json").exists());
            assert_eq!(manager.metadata().seed, DEFAULT_SEED);
            manager.metadata_mut().spawn = [8.0, 65.0, -8.0];
            manager.metadata_mut().world_time = 1200;
            manager.shutdown(&ChunkStorage::new()).unwrap();
        }
        let manager = WorldSaveManager::new(&dir, 3).unwrap();
        assert_eq!(manager.metadata().spawn, [8.0, 65.0, -8.0]);
        assert_eq!(manager.metadata().world_time, 1200);
        assert!(manager.metadata().last_saved > 0);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_seed_only_for_new_world() {
        let dir = temp_world("seed");
        let mut config = EngineConfig {
            save_directory: dir.clone(),
            seed: 777,
            ..EngineConfig::default()
        };
        assert_eq!(WorldSaveManager::from_config(&config).unwrap().metadata().seed, 777);

        config.seed = 1;
        assert_eq!(WorldSaveManager::from_config(&config).unwrap().metadata().seed, 777);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unreadable_metadata_falls_back() {
        let dir = temp_world("bad_meta");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("metadata.json"), "{ broken").unwrap();
        let manager = WorldSaveManager::new(&dir, 3).unwrap();
        assert_eq!(manager.metadata().seed, DEFAULT_SEED);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_config() {
        let dir = temp_world("config");
        let config = EngineConfig {
            save_directory: dir.clone(),
            world_name: "alpha".to_string(),
            autosave_enabled: false,
            compression_level: 5,
            ..EngineConfig::default()
        };
        let manager = WorldSaveManager::from_config(&config).unwrap();
        assert_eq!(manager.world_directory(), dir.join("alpha"));
        assert!(manager.region_directory().exists());
        assert!(!manager.autosave().is_enabled());
        assert_eq!(manager.serializer().compression_level(), 5);
        fs::remove_dir_all(&dir).ok();
    }
}
