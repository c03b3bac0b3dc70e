// ============================================
// Meshing Context - Zero-allocation буферы
// ============================================
//
// Контекст для генерации мешей с переиспользуемыми буферами.
// Маски выделяются один раз под самый большой слой (16x256),
// затем только очищаются.

use crate::terrain::voxel::constants::{CHUNK_HEIGHT, CHUNK_SIZE};

use super::greedy::{FaceKey, GreedyQuad};

/// Самый большой слой: вертикальная плоскость 16x256
pub const MAX_LAYER_SIZE: usize = (CHUNK_SIZE as usize) * (CHUNK_HEIGHT as usize);

/// Маски обоих направлений для одного слоя
pub struct FaceMaskBuffers {
    /// Маска положительного направления
    pub mask_pos: Vec<Option<FaceKey>>,
    /// Маска отрицательного направления
    pub mask_neg: Vec<Option<FaceKey>>,
    /// Флаги посещённых ячеек для greedy meshing
    pub visited: Vec<bool>,
}

impl FaceMaskBuffers {
    pub fn with_capacity(size: usize) -> Self {
        Self {
            mask_pos: vec![None; size],
            mask_neg: vec![None; size],
            visited: vec![false; size],
        }
    }

    /// Очищает маски, сохраняя длину
    #[inline]
    pub fn clear(&mut self, size: usize) {
        self.mask_pos[..size].fill(None);
        self.mask_neg[..size].fill(None);
    }

    #[inline]
    pub fn clear_visited(&mut self, size: usize) {
        self.visited[..size].fill(false);
    }
}

/// Переиспользуемое состояние мешера
pub struct MeshingContext {
    pub masks: FaceMaskBuffers,
    /// Временный буфер для результатов greedy meshing
    pub greedy_results: Vec<GreedyQuad>,
}

impl MeshingContext {
    pub fn new() -> Self {
        Self {
            masks: FaceMaskBuffers::with_capacity(MAX_LAYER_SIZE),
            greedy_results: Vec::with_capacity(256),
        }
    }
}

impl Default for MeshingContext {
    fn default() -> Self {
        Self::new()
    }
}
