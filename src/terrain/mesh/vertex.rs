// ============================================
// Mesh Buffers - Выход мешера
// ============================================
// Раздельные буферы (позиции, нормали, UV, цвета, индексы)
// плюс упаковка в Pod вершину для загрузки в GPU буфер.

/// Вершина для GPU (interleaved)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct ChunkVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// UV в тайлах (0..width, 0..height), шейдер делает fract()
    pub uv: [f32; 2],
    /// Прямоугольник тайла в атласе [u0, v0, u1, v1]
    pub uv_rect: [f32; 4],
    pub color: [f32; 4],
}

/// Меш чанка в локальных координатах чанка
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub uv_rects: Vec<[f32; 4]>,
    /// Яркость * AO * оттенок; None если затенение выключено
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Добавить quad из 4 углов. `flip` разворачивает обход для отрицательных граней.
    pub(crate) fn push_quad(
        &mut self,
        corners: [[f32; 3]; 4],
        normal: [f32; 3],
        size: (f32, f32),
        uv_rect: [f32; 4],
        colors: Option<[[f32; 4]; 4]>,
        flip: bool,
    ) {
        let base = self.positions.len() as u32;
        let (w, h) = size;

        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.uvs.extend_from_slice(&[[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]);
        self.uv_rects.extend_from_slice(&[uv_rect; 4]);
        if let (Some(out), Some(quad_colors)) = (self.colors.as_mut(), colors) {
            out.extend_from_slice(&quad_colors);
        }

        if flip {
            self.indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    /// Interleaved вершины (без цветов = белый)
    pub fn to_vertices(&self) -> Vec<ChunkVertex> {
        (0..self.positions.len())
            .map(|i| ChunkVertex {
                position: self.positions[i],
                normal: self.normals[i],
                uv: self.uvs[i],
                uv_rect: self.uv_rects[i],
                color: self
                    .colors
                    .as_ref()
                    .map_or([1.0, 1.0, 1.0, 1.0], |colors| colors[i]),
            })
            .collect()
    }

    /// Байты вершин для загрузки в буфер
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.to_vertices()).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_quad_winding() {
        let mut mesh = MeshBuffers::default();
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        mesh.push_quad(corners, [0.0, 0.0, 1.0], (1.0, 1.0), [0.0; 4], None, false);
        mesh.push_quad(corners, [0.0, 0.0, -1.0], (1.0, 1.0), [0.0; 4], None, true);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.indices[6..], &[4, 6, 5, 4, 7, 6]);
        assert_eq!(mesh.quad_count(), 2);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_vertex_bytes_size() {
        let mut mesh = MeshBuffers { colors: Some(Vec::new()), ..Default::default() };
        let corners = [[0.0; 3]; 4];
        mesh.push_quad(corners, [0.0, 1.0, 0.0], (3.0, 2.0), [0.0; 4], Some([[0.5; 4]; 4]), false);
        let vertices = mesh.to_vertices();
        assert_eq!(vertices[2].uv, [3.0, 2.0]);
        assert_eq!(vertices[0].color, [0.5; 4]);
        assert_eq!(mesh.vertex_bytes().len(), 4 * std::mem::size_of::<ChunkVertex>());
    }
}
