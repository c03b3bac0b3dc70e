// ============================================
// Chunk Serializer - Чанк в байты и обратно
// ============================================
// [header bincode][zstd body][crc32 LE]
// body = блоки u16 LE x 65536 + sky nibbles + block nibbles

use crate::blocks::BlockId;
use crate::terrain::voxel::{NibbleArray, CHUNK_VOLUME, NIBBLE_BYTES};
use crate::terrain::{Chunk, ChunkPos};

use super::error::{CorruptKind, SaveError};
use super::header::{ChunkHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC_NUMBER};

/// Байт блоков в несжатом теле
pub const BLOCK_BYTES: usize = CHUNK_VOLUME * 2;

/// Полный размер несжатого тела
pub const BODY_SIZE: usize = BLOCK_BYTES + NIBBLE_BYTES * 2;

const CRC_SIZE: usize = 4;

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct ChunkSerializer {
    level: i32,
}

impl ChunkSerializer {
    /// Уровень ZSTD зажимается в 1..=22
    pub fn new(level: i32) -> Self {
        Self { level: level.clamp(1, 22) }
    }

    #[inline]
    pub fn compression_level(&self) -> i32 {
        self.level
    }

    pub fn serialize(&self, chunk: &Chunk) -> Result<Vec<u8>, SaveError> {
        let header = ChunkHeader::new(chunk.pos());
        let header_bytes = bincode::serialize(&header).map_err(|e| SaveError::Encode(e.to_string()))?;

        let mut body = Vec::with_capacity(BODY_SIZE);
        for &id in chunk.blocks() {
            body.extend_from_slice(&id.to_le_bytes());
        }
        body.extend_from_slice(chunk.sky_light_data().as_bytes());
        body.extend_from_slice(chunk.block_light_data().as_bytes());

        let compressed = zstd::encode_all(&body[..], self.level).map_err(|e| SaveError::Encode(e.to_string()))?;

        let mut out = Vec::with_capacity(header_bytes.len() + compressed.len() + CRC_SIZE);
        out.extend_from_slice(&header_bytes);
        out.extend_from_slice(&compressed);
        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_le_bytes());

        log::debug!(
            "Serialized chunk {}: {} -> {} bytes",
            chunk.pos(),
            BODY_SIZE,
            out.len()
        );
        Ok(out)
    }

    /// Разобрать payload. Порядок проверок: CRC, заголовок, тело.
    pub fn deserialize(&self, data: &[u8]) -> Result<Chunk, SaveError> {
        if data.len() < HEADER_SIZE + CRC_SIZE {
            return Err(CorruptKind::Truncated.into());
        }
        let (content, crc_bytes) = data.split_at(data.len() - CRC_SIZE);
        let stored = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        if crc32fast::hash(content) != stored {
            return Err(CorruptKind::ChecksumMismatch.into());
        }

        let header: ChunkHeader =
            bincode::deserialize(&content[..HEADER_SIZE]).map_err(|_| SaveError::Corrupt(CorruptKind::Truncated))?;
        if header.magic != MAGIC_NUMBER {
            return Err(CorruptKind::BadMagic.into());
        }
        if header.version != FORMAT_VERSION {
            return Err(SaveError::UnsupportedVersion(header.version));
        }

        // Ёмкость ограничена, поэтому раздутое тело тоже ошибка
        let body = zstd::bulk::decompress(&content[HEADER_SIZE..], BODY_SIZE)
            .map_err(|_| SaveError::Corrupt(CorruptKind::Decompression))?;
        if body.len() != BODY_SIZE {
            return Err(CorruptKind::BodySize.into());
        }

        let (block_bytes, light_bytes) = body.split_at(BLOCK_BYTES);
        let blocks: Box<[BlockId]> = block_bytes
            .chunks_exact(2)
            .map(|pair| BlockId::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let (sky_bytes, block_light_bytes) = light_bytes.split_at(NIBBLE_BYTES);
        let sky = NibbleArray::from_bytes(sky_bytes).ok_or(SaveError::Corrupt(CorruptKind::BodySize))?;
        let block_light =
            NibbleArray::from_bytes(block_light_bytes).ok_or(SaveError::Corrupt(CorruptKind::BodySize))?;

        let chunk = Chunk::from_parts(header.pos(), blocks, sky, block_light)
            .ok_or(SaveError::Corrupt(CorruptKind::BodySize))?;
        log::debug!("Deserialized chunk {} ({} bytes)", chunk.pos(), data.len());
        Ok(chunk)
    }

    /// То же, плюс проверка что в payload именно этот чанк
    pub fn deserialize_at(&self, data: &[u8], expected: ChunkPos) -> Result<Chunk, SaveError> {
        let chunk = self.deserialize(data)?;
        let found = chunk.pos();
        if found != expected {
            return Err(SaveError::PositionMismatch {
                expected_x: expected.x,
                expected_z: expected.z,
                found_x: found.x,
                found_z: found.z,
            });
        }
        Ok(chunk)
    }
}

impl Default for ChunkSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}
