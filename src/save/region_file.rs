// ============================================
// Region File - Файл региона 32x32 чанка
// ============================================
// [8192 байт заголовка: 1024 x (u32 offset, u32 length) LE]
// [payload секторами по 4 КиБ]
//
// Запись переиспользует секторы слота, если новый payload влезает,
// иначе дописывает в конец файла. Старое место не уплотняется.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::terrain::ChunkPos;

use super::error::{CorruptKind, SaveError};
use super::region::{RegionPos, REGION_SLOTS};

/// Размер сектора payload
pub const SECTOR_SIZE: u64 = 4096;

/// Размер таблицы слотов
pub const HEADER_BYTES: u64 = REGION_SLOTS as u64 * 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SlotEntry {
    offset: u32,
    length: u32,
}

impl SlotEntry {
    #[inline]
    fn is_empty(&self) -> bool {
        self.offset == 0 && self.length == 0
    }

    /// Сколько байт занимают секторы слота
    #[inline]
    fn capacity(&self) -> u64 {
        sectors_for(self.length as u64) * SECTOR_SIZE
    }
}

#[inline]
fn sectors_for(len: u64) -> u64 {
    len.div_ceil(SECTOR_SIZE)
}

pub struct RegionFile {
    pos: RegionPos,
    path: PathBuf,
    file: File,
    entries: Vec<SlotEntry>,
    file_len: u64,
}

impl RegionFile {
    /// Открыть или создать файл региона в папке dir
    pub fn open(dir: &Path, pos: RegionPos) -> Result<Self, SaveError> {
        let path = dir.join(pos.file_name());
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(false).open(&path)?;
        Self::from_file(file, path, pos)
    }

    /// Открыть только существующий файл; отсутствующий не создаётся
    pub fn open_existing(dir: &Path, pos: RegionPos) -> Result<Option<Self>, SaveError> {
        let path = dir.join(pos.file_name());
        if !path.exists() {
            return Ok(None);
        }
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_file(file, path, pos).map(Some)
    }

    /// Переименовать битый файл в r.<x>.<z>.mca.corrupt
    pub fn set_aside(dir: &Path, pos: RegionPos) -> Result<PathBuf, SaveError> {
        let path = dir.join(pos.file_name());
        let aside = dir.join(format!("{}.corrupt", pos.file_name()));
        fs::rename(&path, &aside)?;
        Ok(aside)
    }

    fn from_file(mut file: File, path: PathBuf, pos: RegionPos) -> Result<Self, SaveError> {
        let mut file_len = file.metadata()?.len();
        if file_len == 0 {
            file.set_len(HEADER_BYTES)?;
            file_len = HEADER_BYTES;
            log::debug!("Created region file {}", path.display());
        } else if file_len < HEADER_BYTES {
            return Err(SaveError::Corrupt(CorruptKind::Truncated));
        }

        let mut header = vec![0u8; HEADER_BYTES as usize];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut header)?;

        let entries = header
            .chunks_exact(8)
            .map(|raw| SlotEntry {
                offset: u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
                length: u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]),
            })
            .collect();

        Ok(Self { pos, path, file, entries, file_len })
    }

    #[inline]
    pub fn pos(&self) -> RegionPos {
        self.pos
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Текущий размер файла в байтах
    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.pos
            .chunk_offset(pos)
            .map(|slot| !self.entries[slot].is_empty())
            .unwrap_or(false)
    }

    /// Число занятых слотов
    pub fn chunk_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_empty()).count()
    }

    /// Позиции всех сохранённых чанков
    pub fn stored_chunks(&self) -> Vec<ChunkPos> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_empty())
            .map(|(slot, _)| self.pos.chunk_at(slot))
            .collect()
    }

    pub fn read_chunk(&mut self, pos: ChunkPos) -> Result<Option<Vec<u8>>, SaveError> {
        let slot = self.pos.chunk_offset(pos)?;
        self.read_slot(slot)
    }

    pub fn write_chunk(&mut self, pos: ChunkPos, data: &[u8]) -> Result<(), SaveError> {
        let slot = self.pos.chunk_offset(pos)?;
        self.write_slot(slot, data)
    }

    /// Прочитать payload слота; пустой слот = None
    pub fn read_slot(&mut self, slot: usize) -> Result<Option<Vec<u8>>, SaveError> {
        let entry = self.entry(slot)?;
        if entry.is_empty() {
            return Ok(None);
        }
        let start = entry.offset as u64;
        let end = start + entry.length as u64;
        if start < HEADER_BYTES || entry.length == 0 || end > self.file_len {
            return Err(SaveError::Corrupt(CorruptKind::BadSlot));
        }

        let mut data = vec![0u8; entry.length as usize];
        self.file.seek(SeekFrom::Start(start))?;
        self.file.read_exact(&mut data)?;
        Ok(Some(data))
    }

    /// Записать payload в слот
    pub fn write_slot(&mut self, slot: usize, data: &[u8]) -> Result<(), SaveError> {
        let entry = self.entry(slot)?;
        if data.is_empty() {
            return self.clear_slot(slot);
        }
        let length = u32::try_from(data.len())
            .map_err(|_| SaveError::Encode(format!("payload of {} bytes does not fit a region slot", data.len())))?;

        let needed = sectors_for(data.len() as u64) * SECTOR_SIZE;
        let fits = !entry.is_empty() && entry.capacity() >= needed;
        let offset = if fits {
            entry.offset as u64
        } else {
            // Новое место в конце, по границе сектора
            self.file_len.div_ceil(SECTOR_SIZE) * SECTOR_SIZE
        };
        let offset32 = u32::try_from(offset)
            .map_err(|_| SaveError::Encode(format!("region file {} exceeds 4 GiB", self.path.display())))?;

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        let padding = needed - data.len() as u64;
        if padding > 0 {
            self.file.write_all(&vec![0u8; padding as usize])?;
        }
        self.file_len = self.file_len.max(offset + needed);

        self.set_entry(slot, SlotEntry { offset: offset32, length })?;
        log::debug!(
            "Region {}: slot {} <- {} bytes at {} ({})",
            self.pos,
            slot,
            data.len(),
            offset,
            if fits { "reused" } else { "appended" }
        );
        Ok(())
    }

    /// Освободить слот (секторы остаются в файле)
    pub fn clear_slot(&mut self, slot: usize) -> Result<(), SaveError> {
        self.entry(slot)?;
        self.set_entry(slot, SlotEntry::default())
    }

    pub fn remove_chunk(&mut self, pos: ChunkPos) -> Result<(), SaveError> {
        let slot = self.pos.chunk_offset(pos)?;
        self.clear_slot(slot)
    }

    pub fn flush(&mut self) -> Result<(), SaveError> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    fn entry(&self, slot: usize) -> Result<SlotEntry, SaveError> {
        self.entries
            .get(slot)
            .copied()
            .ok_or(SaveError::Corrupt(CorruptKind::BadSlot))
    }

    fn set_entry(&mut self, slot: usize, entry: SlotEntry) -> Result<(), SaveError> {
        let mut raw = [0u8; 8];
        raw[..4].copy_from_slice(&entry.offset.to_le_bytes());
        raw[4..].copy_from_slice(&entry.length.to_le_bytes());
        self.file.seek(SeekFrom::Start(slot as u64 * 8))?;
        self.file.write_all(&raw)?;
        self.entries[slot] = entry;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxel_region_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn payload(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
    }

    #[test]
    fn test_new_file_has_header_only() {
        let dir = temp_dir("header");
        let region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
        assert_eq!(region.file_len(), HEADER_BYTES);
        assert_eq!(region.chunk_count(), 0);
        assert!(dir.join("r.0.0.mca").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_read_and_empty_slot() {
        let dir = temp_dir("rw");
        let mut region = RegionFile::open(&dir, RegionPos::new(-1, 0)).unwrap();
        let data = payload(5000, 1);
        region.write_chunk(ChunkPos::new(-1, 3), &data).unwrap();

        assert_eq!(region.read_chunk(ChunkPos::new(-1, 3)).unwrap(), Some(data));
        assert_eq!(region.read_chunk(ChunkPos::new(-2, 3)).unwrap(), None);
        assert!(region.has_chunk(ChunkPos::new(-1, 3)));
        assert_eq!(region.stored_chunks(), vec![ChunkPos::new(-1, 3)]);
        assert!(region.read_chunk(ChunkPos::new(0, 0)).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_slot_reuse_when_fits() {
        let dir = temp_dir("reuse");
        let mut region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
        region.write_slot(7, &payload(6000, 2)).unwrap();
        let len_after_first = region.file_len();

        let smaller = payload(3000, 3);
        region.write_slot(7, &smaller).unwrap();
        assert_eq!(region.file_len(), len_after_first);
        assert_eq!(region.read_slot(7).unwrap(), Some(smaller));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_slot_grows_by_appending() {
        let dir = temp_dir("grow");
        let mut region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
        region.write_slot(1, &payload(3000, 4)).unwrap();
        region.write_slot(2, &payload(100, 5)).unwrap();
        let before = region.file_len();

        let bigger = payload(9000, 6);
        region.write_slot(1, &bigger).unwrap();
        assert_eq!(region.file_len(), before + 3 * SECTOR_SIZE);
        assert_eq!(region.read_slot(1).unwrap(), Some(bigger));
        assert_eq!(region.read_slot(2).unwrap(), Some(payload(100, 5)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let dir = temp_dir("reopen");
        let data = payload(4096, 7);
        {
            let mut region = RegionFile::open(&dir, RegionPos::new(2, 2)).unwrap();
            region.write_chunk(ChunkPos::new(64, 95), &data).unwrap();
            region.flush().unwrap();
        }
        let mut region = RegionFile::open_existing(&dir, RegionPos::new(2, 2)).unwrap().unwrap();
        assert_eq!(region.read_chunk(ChunkPos::new(64, 95)).unwrap(), Some(data));
        assert_eq!(region.chunk_count(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_open_existing_missing() {
        let dir = temp_dir("missing");
        assert!(RegionFile::open_existing(&dir, RegionPos::new(5, 5)).unwrap().is_none());
        assert!(!dir.join("r.5.5.mca").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_slot_outside_file_is_corrupt() {
        let dir = temp_dir("badslot");
        {
            let mut region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
            region.write_slot(0, &payload(10, 8)).unwrap();
        }
        {
            let mut file = OpenOptions::new().write(true).open(dir.join("r.0.0.mca")).unwrap();
            file.seek(SeekFrom::Start(8)).unwrap();
            file.write_all(&1_000_000u32.to_le_bytes()).unwrap();
            file.write_all(&64u32.to_le_bytes()).unwrap();
        }
        let mut region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
        assert!(region.read_slot(0).unwrap().is_some());
        assert!(matches!(region.read_slot(1), Err(SaveError::Corrupt(CorruptKind::BadSlot))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clear_slot() {
        let dir = temp_dir("clear");
        let mut region = RegionFile::open(&dir, RegionPos::new(0, 0)).unwrap();
        region.write_chunk(ChunkPos::new(1, 1), &payload(50, 9)).unwrap();
        region.remove_chunk(ChunkPos::new(1, 1)).unwrap();
        assert_eq!(region.read_chunk(ChunkPos::new(1, 1)).unwrap(), None);
        std::fs::remove_dir_all(&dir).ok();
    }
}
