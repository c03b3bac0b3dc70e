// ============================================
// Save System - Чанки и регион-файлы
// ============================================
// Payload чанка: bincode заголовок + ZSTD тело + CRC32.
// Регион-файл: таблица 1024 слотов + секторы по 4 КиБ.
// metadata.json: сид, спавн и время мира.

mod error;
mod header;
mod chunk;
mod region;
mod region_file;
mod world_save;
mod metadata;
mod autosave;

pub use error::{CorruptKind, SaveError};
pub use header::{ChunkHeader, FORMAT_VERSION, MAGIC_NUMBER};
pub use chunk::{ChunkSerializer, BODY_SIZE, DEFAULT_COMPRESSION_LEVEL};
pub use region::{RegionPos, REGION_SIZE, REGION_SLOTS};
pub use region_file::{RegionFile, HEADER_BYTES, SECTOR_SIZE};
pub use world_save::{ChunkSource, WorldSaveManager};
pub use metadata::{WorldMetadata, METADATA_FILE};
pub use autosave::{AutosaveTimer, DEFAULT_AUTOSAVE_INTERVAL};
