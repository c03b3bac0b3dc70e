// ============================================
// Voxel Module - Воксельные данные чанка
// ============================================

pub mod constants;
pub mod nibble;

mod chunk;
mod pos;

pub use constants::{CHUNK_SIZE, CHUNK_HEIGHT, CHUNK_VOLUME, MAX_LIGHT};
pub use nibble::{NibbleArray, NIBBLE_BYTES};
pub use chunk::Chunk;
pub use pos::{ChunkPos, BlockPos};
