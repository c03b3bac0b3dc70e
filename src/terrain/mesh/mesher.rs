// ============================================
// Greedy Mesher - Воксели чанка -> quads
// ============================================
//
// Для каждой оси d (u = (d+1)%3, v = (d+2)%3) проходим плоскости
// между клетками s и s+1, s от -1 до extent-1. Положительная грань
// принадлежит ближней клетке, отрицательная дальней, и каждая
// рисуется только если её блок внутри этого чанка.

use crate::biomes::{foliage_tint, grass_tint, BiomeLookup};
use crate::blocks::{BlockId, BlockRegistry, TextureAtlas, TintKind, AIR};
use crate::terrain::voxel::constants::{CHUNK_HEIGHT, CHUNK_MASK, CHUNK_SIZE};
use crate::terrain::voxel::Chunk;

use super::context::MeshingContext;
use super::greedy::{greedy_mesh_layer_into, FaceDir, FaceKey};
use super::neighbors::{BlockQuery, Sampler};
use super::occlusion::{corner_ao, vertex_brightness};
use super::vertex::MeshBuffers;

/// Размеры чанка по осям x, y, z
const DIMS: [usize; 3] = [CHUNK_SIZE as usize, CHUNK_HEIGHT as usize, CHUNK_SIZE as usize];

/// Что считать в цветах вершин
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MesherOptions {
    pub ambient_occlusion: bool,
    pub biome_tint: bool,
    pub vertex_lighting: bool,
}

impl MesherOptions {
    /// Только геометрия, без цветов
    pub const GEOMETRY_ONLY: MesherOptions = MesherOptions {
        ambient_occlusion: false,
        biome_tint: false,
        vertex_lighting: false,
    };

    #[inline]
    fn shades(&self) -> bool {
        self.ambient_occlusion || self.biome_tint || self.vertex_lighting
    }
}

impl Default for MesherOptions {
    fn default() -> Self {
        Self {
            ambient_occlusion: true,
            biome_tint: true,
            vertex_lighting: true,
        }
    }
}

/// Greedy мешер. Не хранит состояние между вызовами кроме ссылок.
pub struct GreedyMesher<'a> {
    registry: &'a BlockRegistry,
    atlas: &'a dyn TextureAtlas,
    biomes: Option<&'a dyn BiomeLookup>,
    options: MesherOptions,
}

impl<'a> GreedyMesher<'a> {
    pub fn new(registry: &'a BlockRegistry, atlas: &'a dyn TextureAtlas) -> Self {
        Self {
            registry,
            atlas,
            biomes: None,
            options: MesherOptions::default(),
        }
    }

    pub fn with_biomes(mut self, biomes: &'a dyn BiomeLookup) -> Self {
        self.biomes = Some(biomes);
        self
    }

    pub fn with_options(mut self, options: MesherOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn options(&self) -> MesherOptions {
        self.options
    }

    /// Меш чанка с временным контекстом
    pub fn mesh(&self, chunk: &Chunk, neighbors: &dyn BlockQuery) -> MeshBuffers {
        let mut ctx = MeshingContext::new();
        self.mesh_with_context(chunk, neighbors, &mut ctx)
    }

    /// Меш чанка с переиспользуемыми буферами
    pub fn mesh_with_context(
        &self,
        chunk: &Chunk,
        neighbors: &dyn BlockQuery,
        ctx: &mut MeshingContext,
    ) -> MeshBuffers {
        let mut out = MeshBuffers::default();
        if chunk.is_empty() {
            return out;
        }
        if self.options.shades() {
            out.colors = Some(Vec::new());
        }

        let sampler = Sampler::new(chunk, neighbors);

        for d in 0..3 {
            let u = (d + 1) % 3;
            let v = (d + 2) % 3;
            let (size_u, size_v, extent) = (DIMS[u], DIMS[v], DIMS[d] as i32);
            let layer = size_u * size_v;

            for s in -1..extent {
                ctx.masks.clear(layer);
                let mut any = false;

                for iv in 0..size_v {
                    for iu in 0..size_u {
                        let mut near = [0i32; 3];
                        near[d] = s;
                        near[u] = iu as i32;
                        near[v] = iv as i32;
                        let mut far = near;
                        far[d] = s + 1;

                        let a = sampler.block(near);
                        let b = sampler.block(far);
                        let idx = iv * size_u + iu;

                        if s >= 0 && self.should_render(a, b) {
                            ctx.masks.mask_pos[idx] = Some(self.face_key(a, FaceDir::from_axis(d, true)));
                            any = true;
                        }
                        if s + 1 < extent && self.should_render(b, a) {
                            ctx.masks.mask_neg[idx] = Some(self.face_key(b, FaceDir::from_axis(d, false)));
                            any = true;
                        }
                    }
                }

                if !any {
                    continue;
                }

                for positive in [true, false] {
                    ctx.masks.clear_visited(layer);
                    let mask = if positive {
                        &ctx.masks.mask_pos[..layer]
                    } else {
                        &ctx.masks.mask_neg[..layer]
                    };
                    greedy_mesh_layer_into(
                        mask,
                        &mut ctx.masks.visited[..layer],
                        size_u,
                        size_v,
                        &mut ctx.greedy_results,
                    );
                    for &(qu, qv, w, h, key) in &ctx.greedy_results {
                        let quad = Quad { d, u, v, s, qu: qu as i32, qv: qv as i32, w: w as i32, h: h as i32, key };
                        self.emit_quad(&mut out, &sampler, &quad);
                    }
                }
            }
        }

        log::trace!(
            "Meshed chunk {}: {} quads, {} triangles",
            chunk.pos(),
            out.quad_count(),
            out.triangle_count()
        );
        out
    }

    /// Видна ли грань блока `near`, смотрящая на `far`
    #[inline]
    fn should_render(&self, near: BlockId, far: BlockId) -> bool {
        if near == AIR || near == far {
            return false;
        }
        if far == AIR {
            return true;
        }
        let far_def = self.registry.definition(far);
        !far_def.solid || far_def.transparent
    }

    #[inline]
    fn face_key(&self, block: BlockId, dir: FaceDir) -> FaceKey {
        let def = self.registry.definition(block);
        FaceKey {
            block,
            dir,
            atlas_index: self.atlas.atlas_index(def, dir.face()),
        }
    }

    fn emit_quad(&self, out: &mut MeshBuffers, sampler: &Sampler<'_>, quad: &Quad) {
        let Quad { d, u, v, s, qu, qv, w, h, key } = *quad;
        let positive = key.dir.is_positive();

        let mut c0 = [0i32; 3];
        c0[d] = s + 1;
        c0[u] = qu;
        c0[v] = qv;
        let mut c1 = c0;
        c1[u] += w;
        let mut c2 = c1;
        c2[v] += h;
        let mut c3 = c0;
        c3[v] += h;
        let corners = [c0, c1, c2, c3];

        let colors = if self.options.shades() {
            Some(self.corner_colors(sampler, quad, &corners))
        } else {
            None
        };

        out.push_quad(
            corners.map(|c| [c[0] as f32, c[1] as f32, c[2] as f32]),
            key.dir.normal(),
            (w as f32, h as f32),
            self.atlas.uv_rect(key.atlas_index),
            colors,
            !positive,
        );
    }

    fn corner_colors(&self, sampler: &Sampler<'_>, quad: &Quad, corners: &[[i32; 3]; 4]) -> [[f32; 4]; 4] {
        let Quad { d, u, v, s, key, .. } = *quad;
        let positive = key.dir.is_positive();
        // Слой клеток перед гранью
        let front = if positive { s + 1 } else { s };
        let tint = self.quad_tint(sampler, quad);

        let mut colors = [[1.0f32; 4]; 4];
        for (i, corner) in corners.iter().enumerate() {
            let low_u = i == 0 || i == 3;
            let low_v = i == 0 || i == 1;
            let (out_u, in_u) = if low_u { (corner[u] - 1, corner[u]) } else { (corner[u], corner[u] - 1) };
            let (out_v, in_v) = if low_v { (corner[v] - 1, corner[v]) } else { (corner[v], corner[v] - 1) };

            let cell = |cu: i32, cv: i32| {
                let mut p = [0i32; 3];
                p[d] = front;
                p[u] = cu;
                p[v] = cv;
                p
            };

            let ao = if self.options.ambient_occlusion {
                let solid = |p: [i32; 3]| self.registry.is_solid(sampler.block(p));
                corner_ao(solid(cell(out_u, in_v)), solid(cell(in_u, out_v)), solid(cell(out_u, out_v)))
            } else {
                1.0
            };

            let brightness = if self.options.vertex_lighting {
                vertex_brightness(sampler.light(cell(in_u, in_v)), ao)
            } else {
                ao
            };

            colors[i] = [brightness * tint[0], brightness * tint[1], brightness * tint[2], 1.0];
        }
        colors
    }

    /// Биомный оттенок по центральной колонке quad'а
    fn quad_tint(&self, sampler: &Sampler<'_>, quad: &Quad) -> [f32; 3] {
        const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
        if !self.options.biome_tint {
            return WHITE;
        }
        let tint_kind = self.registry.definition(quad.key.block).tint;
        if !tint_kind.applies_to(quad.key.dir.face()) {
            return WHITE;
        }
        let Some(biomes) = self.biomes else {
            return WHITE;
        };

        let mut cell = [0i32; 3];
        cell[quad.d] = if quad.key.dir.is_positive() { quad.s } else { quad.s + 1 };
        cell[quad.u] = quad.qu + quad.w / 2;
        cell[quad.v] = quad.qv + quad.h / 2;
        let (origin_x, origin_z) = sampler.origin();
        let world_x = origin_x + cell[0].clamp(0, CHUNK_MASK);
        let world_z = origin_z + cell[2].clamp(0, CHUNK_MASK);

        let biome = biomes.biome_at(world_x, world_z);
        match tint_kind {
            TintKind::GrassTop => grass_tint(biome),
            TintKind::Foliage => foliage_tint(biome),
            TintKind::None => WHITE,
        }
    }
}

/// Склеенный прямоугольник в слое s оси d
#[derive(Clone, Copy)]
struct Quad {
    d: usize,
    u: usize,
    v: usize,
    s: i32,
    qu: i32,
    qv: i32,
    w: i32,
    h: i32,
    key: FaceKey,
}
