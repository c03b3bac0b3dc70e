// ============================================
// Voxel Chunk Engine - Чанки, меши, свет и сохранение
// ============================================
// Блоки -> хранилище чанков -> greedy меши / BFS свет -> регион-файлы

pub mod core;
pub mod blocks;
pub mod biomes;
pub mod terrain;
pub mod lighting;
pub mod save;

// Re-exports
pub use crate::core::EngineConfig;
pub use blocks::{BlockId, BlockRegistry, BlockDefinition, BlockFace, TextureAtlas, GridAtlas, AIR};
pub use biomes::{BiomeId, BiomeLookup};
pub use terrain::{Chunk, ChunkPos, BlockPos, ChunkStorage, WorldGenerator, FlatWorldGenerator, VoxelWorld};
pub use terrain::mesh::{GreedyMesher, MeshBuffers, MesherOptions, BlockQuery};
pub use lighting::LightEngine;
pub use save::{ChunkSerializer, ChunkSource, RegionPos, RegionFile, WorldMetadata, WorldSaveManager, SaveError, CorruptKind};
