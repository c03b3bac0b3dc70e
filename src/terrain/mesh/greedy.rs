// ============================================
// Greedy Meshing - Склейка граней в слое
// ============================================

use crate::blocks::{BlockFace, BlockId};

/// Направление грани (ось + знак)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceDir {
    PosX, NegX, PosY, NegY, PosZ, NegZ,
}

impl FaceDir {
    #[inline]
    pub fn from_axis(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => FaceDir::PosX,
            (0, false) => FaceDir::NegX,
            (1, true) => FaceDir::PosY,
            (1, false) => FaceDir::NegY,
            (_, true) => FaceDir::PosZ,
            (_, false) => FaceDir::NegZ,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, FaceDir::PosX | FaceDir::PosY | FaceDir::PosZ)
    }

    #[inline]
    pub fn normal(self) -> [f32; 3] {
        match self {
            FaceDir::PosX => [1.0, 0.0, 0.0],
            FaceDir::NegX => [-1.0, 0.0, 0.0],
            FaceDir::PosY => [0.0, 1.0, 0.0],
            FaceDir::NegY => [0.0, -1.0, 0.0],
            FaceDir::PosZ => [0.0, 0.0, 1.0],
            FaceDir::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Грань блока для текстуры и оттенка
    #[inline]
    pub fn face(self) -> BlockFace {
        match self {
            FaceDir::PosX => BlockFace::East,
            FaceDir::NegX => BlockFace::West,
            FaceDir::PosY => BlockFace::Top,
            FaceDir::NegY => BlockFace::Bottom,
            FaceDir::PosZ => BlockFace::South,
            FaceDir::NegZ => BlockFace::North,
        }
    }
}

/// Что рисуется в ячейке маски; склеиваются только равные ключи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceKey {
    pub block: BlockId,
    pub dir: FaceDir,
    pub atlas_index: u32,
}

/// Результат склейки: (u, v, width, height, key)
pub type GreedyQuad = (usize, usize, usize, usize, FaceKey);

/// Zero-allocation greedy meshing для одного слоя
///
/// Маска row-major: idx = v * size_u + u. Ширина растёт по U,
/// затем высота пока вся строка совпадает.
/// Буфер visited должен быть предварительно очищен (заполнен false).
#[inline]
pub fn greedy_mesh_layer_into(
    mask: &[Option<FaceKey>],
    visited: &mut [bool],
    size_u: usize,
    size_v: usize,
    results: &mut Vec<GreedyQuad>,
) {
    results.clear();

    for v in 0..size_v {
        for u in 0..size_u {
            let idx = v * size_u + u;
            if visited[idx] { continue; }

            let face = match mask[idx] {
                Some(f) => f,
                None => continue,
            };

            // Расширяем по U
            let mut width = 1;
            while u + width < size_u {
                let next_idx = v * size_u + (u + width);
                if visited[next_idx] || mask[next_idx] != Some(face) { break; }
                width += 1;
            }

            // Расширяем по V
            let mut height = 1;
            'outer: while v + height < size_v {
                for du in 0..width {
                    let check_idx = (v + height) * size_u + (u + du);
                    if visited[check_idx] || mask[check_idx] != Some(face) { break 'outer; }
                }
                height += 1;
            }

            for dv in 0..height {
                for du in 0..width {
                    visited[(v + dv) * size_u + (u + du)] = true;
                }
            }

            results.push((u, v, width, height, face));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(block: BlockId) -> Option<FaceKey> {
        Some(FaceKey { block, dir: FaceDir::PosY, atlas_index: 0 })
    }

    #[test]
    fn test_full_layer_single_quad() {
        let mask = vec![key(1); 16 * 16];
        let mut visited = vec![false; 16 * 16];
        let mut results = Vec::new();
        greedy_mesh_layer_into(&mask, &mut visited, 16, 16, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].2, results[0].3), (16, 16));
    }

    #[test]
    fn test_different_keys_split() {
        // 4x2: левая половина блок 1, правая блок 2
        let mut mask = vec![key(1); 8];
        for v in 0..2 {
            for u in 2..4 {
                mask[v * 4 + u] = key(2);
            }
        }
        let mut visited = vec![false; 8];
        let mut results = Vec::new();
        greedy_mesh_layer_into(&mask, &mut visited, 4, 2, &mut results);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], (0, 0, 2, 2, key(1).unwrap()));
        assert_eq!(results[1], (2, 0, 2, 2, key(2).unwrap()));
    }

    #[test]
    fn test_empty_mask() {
        let mask = vec![None; 9];
        let mut visited = vec![false; 9];
        let mut results = vec![(0, 0, 1, 1, key(1).unwrap())];
        greedy_mesh_layer_into(&mask, &mut visited, 3, 3, &mut results);
        assert!(results.is_empty());
    }
}
