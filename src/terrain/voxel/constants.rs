// ============================================
// Voxel Constants - Размеры чанка
// ============================================

use ndshape::{ConstShape, ConstShape3u32};

/// Размер чанка по X/Z
pub const CHUNK_SIZE: i32 = 16;
/// Высота чанка (Y от 0 до 255)
pub const CHUNK_HEIGHT: i32 = 256;
/// Сдвиг для деления на CHUNK_SIZE
pub const CHUNK_SHIFT: i32 = 4;
/// Маска локальной координаты
pub const CHUNK_MASK: i32 = CHUNK_SIZE - 1;

/// Форма массива блоков: x быстрее всего, затем y, затем z
pub type ChunkShape = ConstShape3u32<16, 256, 16>;

/// Блоков в чанке (65 536)
pub const CHUNK_VOLUME: usize = ChunkShape::USIZE;

/// Максимальный уровень света
pub const MAX_LIGHT: u8 = 15;

/// Линейный индекс локальной позиции (без проверки границ)
#[inline]
pub fn linear_index(x: usize, y: usize, z: usize) -> usize {
    ChunkShape::linearize([x as u32, y as u32, z as u32]) as usize
}

/// Обратное преобразование индекса в (x, y, z)
#[inline]
pub fn delinearize(index: usize) -> [usize; 3] {
    let [x, y, z] = ChunkShape::delinearize(index as u32);
    [x as usize, y as usize, z as usize]
}

/// Внутри ли чанка локальная позиция
#[inline]
pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_SIZE).contains(&z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linearize_layout() {
        assert_eq!(CHUNK_VOLUME, 65_536);
        assert_eq!(linear_index(0, 0, 0), 0);
        assert_eq!(linear_index(1, 0, 0), 1);
        assert_eq!(linear_index(0, 1, 0), 16);
        assert_eq!(linear_index(0, 0, 1), 16 * 256);
        assert_eq!(delinearize(linear_index(7, 200, 9)), [7, 200, 9]);
    }
}
