// ============================================
// Terrain Module - Чанки, хранилище и меши
// ============================================

pub mod voxel;
pub mod mesh;
pub mod storage;
pub mod generation;
pub mod world;

// Re-exports
pub use voxel::{BlockPos, Chunk, ChunkPos, NibbleArray, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, MAX_LIGHT};
pub use storage::{read_chunk, write_chunk, ChunkHandle, ChunkStorage};
pub use generation::{FlatWorldGenerator, WorldGenerator};
pub use world::VoxelWorld;
