// ============================================
// Save Errors - Ошибки сохранения/загрузки
// ============================================

use thiserror::Error;

/// Почему payload признан битым
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptKind {
    /// Данных меньше, чем заголовок + CRC
    Truncated,
    BadMagic,
    ChecksumMismatch,
    /// ZSTD не смог распаковать тело
    Decompression,
    /// Распакованное тело не того размера
    BodySize,
    /// Запись в таблице региона указывает за пределы файла
    BadSlot,
}

impl std::fmt::Display for CorruptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            CorruptKind::Truncated => "truncated payload",
            CorruptKind::BadMagic => "bad magic number",
            CorruptKind::ChecksumMismatch => "checksum mismatch",
            CorruptKind::Decompression => "decompression failed",
            CorruptKind::BodySize => "unexpected body size",
            CorruptKind::BadSlot => "slot points outside region file",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt chunk data: {0}")]
    Corrupt(CorruptKind),
    #[error("unsupported chunk format version {0}")]
    UnsupportedVersion(u16),
    #[error("chunk position mismatch: expected [{expected_x}, {expected_z}], found [{found_x}, {found_z}]")]
    PositionMismatch {
        expected_x: i32,
        expected_z: i32,
        found_x: i32,
        found_z: i32,
    },
    #[error("chunk [{chunk_x}, {chunk_z}] is outside region [{region_x}, {region_z}]")]
    ChunkOutsideRegion {
        chunk_x: i32,
        chunk_z: i32,
        region_x: i32,
        region_z: i32,
    },
    #[error("encode error: {0}")]
    Encode(String),
    #[error("world metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

impl SaveError {
    /// Данные на диске испорчены (в отличие от ошибок ввода-вывода)
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            SaveError::Corrupt(_) | SaveError::UnsupportedVersion(_) | SaveError::PositionMismatch { .. }
        )
    }
}

impl From<CorruptKind> for SaveError {
    fn from(kind: CorruptKind) -> Self {
        SaveError::Corrupt(kind)
    }
}
