// ============================================
// Light Engine - BFS распространение света
// ============================================
//
// Четыре FIFO очереди: sky-remove, sky-add, block-remove, block-add.
// update() разбирает их в этом порядке в пределах бюджета,
// остаток переходит на следующий тик. Одновременно держится
// лок только одного чанка.

use std::collections::{HashSet, VecDeque};

use crate::blocks::{BlockId, BlockRegistry, AIR};
use crate::terrain::storage::{read_chunk, write_chunk, ChunkStorage};
use crate::terrain::voxel::constants::{CHUNK_HEIGHT, CHUNK_SIZE, MAX_LIGHT};
use crate::terrain::{BlockPos, Chunk, ChunkPos};

use super::node::{Channel, LightNode, DOWN};

/// Операций света за тик по умолчанию
pub const DEFAULT_LIGHT_BUDGET: usize = 1000;

pub struct LightEngine {
    sky_remove: VecDeque<LightNode>,
    sky_add: VecDeque<LightNode>,
    block_remove: VecDeque<LightNode>,
    block_add: VecDeque<LightNode>,
    /// Ещё не разобранные источники, поставленные удалением
    pending_seeds: HashSet<(Channel, (ChunkPos, u8, u8, u8), u8)>,
    budget: usize,
}

impl LightEngine {
    pub fn new(budget: usize) -> Self {
        Self {
            sky_remove: VecDeque::new(),
            sky_add: VecDeque::new(),
            block_remove: VecDeque::new(),
            block_add: VecDeque::new(),
            pending_seeds: HashSet::new(),
            budget: budget.max(1),
        }
    }

    #[inline]
    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget.max(1);
    }

    /// Узлов в очередях
    pub fn pending(&self) -> usize {
        self.sky_remove.len() + self.sky_add.len() + self.block_remove.len() + self.block_add.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    // ============================================
    // Seeding
    // ============================================

    /// Небесный свет по колонкам: 15 над первым не-воздухом,
    /// -1 на каждый прозрачный блок ниже, 0 под непрозрачным
    pub fn initialize_skylight(&self, chunk: &mut Chunk, registry: &BlockRegistry) {
        for z in 0..CHUNK_SIZE as usize {
            for x in 0..CHUNK_SIZE as usize {
                let mut level = MAX_LIGHT;
                for y in (0..CHUNK_HEIGHT as usize).rev() {
                    let id = chunk.get_block(x, y, z);
                    if id != AIR {
                        level = if registry.is_transparent(id) { level.saturating_sub(1) } else { 0 };
                    }
                    chunk.set_sky_light(x, y, z, level);
                }
            }
        }
    }

    /// Светящиеся блоки: свет = излучение, в очередь на распространение
    pub fn initialize_block_light(&mut self, chunk: &mut Chunk, registry: &BlockRegistry) {
        let pos = chunk.pos();
        for z in 0..CHUNK_SIZE as usize {
            for y in 0..CHUNK_HEIGHT as usize {
                for x in 0..CHUNK_SIZE as usize {
                    let emission = registry.emission(chunk.get_block(x, y, z));
                    if emission > 0 {
                        chunk.set_block_light(x, y, z, emission);
                        self.block_add.push_back(LightNode::new(pos, x, y, z, emission));
                    }
                }
            }
        }
    }

    /// Полная инициализация загруженного чанка + источники на границах
    pub fn seed_chunk(&mut self, storage: &ChunkStorage, registry: &BlockRegistry, pos: ChunkPos) {
        let Some(handle) = storage.get(pos) else {
            return;
        };
        {
            let mut chunk = write_chunk(&handle);
            self.initialize_skylight(&mut chunk, registry);
            self.initialize_block_light(&mut chunk, registry);
            self.seed_interior_sky(&chunk, registry);
        }
        self.seed_borders(storage, registry, pos);
    }

    /// Освещённые клетки рядом с более тёмными прозрачными (навесы)
    fn seed_interior_sky(&mut self, chunk: &Chunk, registry: &BlockRegistry) {
        let pos = chunk.pos();
        let size = CHUNK_SIZE as usize;
        for z in 0..size {
            for y in 0..CHUNK_HEIGHT as usize {
                for x in 0..size {
                    let level = chunk.sky_light(x, y, z);
                    if level <= 1 {
                        continue;
                    }
                    let darker = [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)].iter().any(|&(dx, dz)| {
                        let nx = x as i32 + dx;
                        let nz = z as i32 + dz;
                        if nx < 0 || nz < 0 || nx >= CHUNK_SIZE || nz >= CHUNK_SIZE {
                            return false;
                        }
                        let (nx, nz) = (nx as usize, nz as usize);
                        registry.is_transparent(chunk.get_block(nx, y, nz))
                            && chunk.sky_light(nx, y, nz) + 1 < level
                    });
                    if darker {
                        self.sky_add.push_back(LightNode::new(pos, x, y, z, level));
                    }
                }
            }
        }
    }

    /// Сравнить края с загруженными соседями в обе стороны
    pub fn seed_borders(&mut self, storage: &ChunkStorage, registry: &BlockRegistry, pos: ChunkPos) {
        let Some(handle) = storage.get(pos) else {
            return;
        };
        let edge = CHUNK_SIZE as usize - 1;

        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let other_pos = pos.neighbor(dx, dz);
            let Some(other_handle) = storage.get(other_pos) else {
                continue;
            };

            // Пары клеток (наша, соседняя) вдоль общей стены
            let pairs: Vec<((usize, usize), (usize, usize))> = (0..CHUNK_SIZE as usize)
                .map(|i| match (dx, dz) {
                    (1, _) => ((edge, i), (0, i)),
                    (-1, _) => ((0, i), (edge, i)),
                    (_, 1) => ((i, edge), (i, 0)),
                    _ => ((i, 0), (i, edge)),
                })
                .collect();

            let ours = sample_wall(&read_chunk(&handle), &pairs, |p| p.0);
            let theirs = sample_wall(&read_chunk(&other_handle), &pairs, |p| p.1);

            for (i, (a, b)) in ours.iter().zip(theirs.iter()).enumerate() {
                let pair = i / CHUNK_HEIGHT as usize;
                let y = i % CHUNK_HEIGHT as usize;
                let ((ax, az), (bx, bz)) = pairs[pair];

                for (channel, la, lb) in [(Channel::Sky, a.1, b.1), (Channel::Block, a.2, b.2)] {
                    let queue = match channel {
                        Channel::Sky => &mut self.sky_add,
                        Channel::Block => &mut self.block_add,
                    };
                    if la > lb + 1 && registry.is_transparent(b.0) {
                        queue.push_back(LightNode::new(pos, ax, y, az, la));
                    } else if lb > la + 1 && registry.is_transparent(a.0) {
                        queue.push_back(LightNode::new(other_pos, bx, y, bz, lb));
                    }
                }
            }
        }
    }

    // ============================================
    // Queue API
    // ============================================

    /// Поднять небесный свет клетки и распространить от неё
    pub fn propagate_sky(&mut self, storage: &ChunkStorage, pos: BlockPos, level: u8) {
        self.raise(Channel::Sky, storage, pos, level);
    }

    pub fn propagate_block(&mut self, storage: &ChunkStorage, pos: BlockPos, level: u8) {
        self.raise(Channel::Block, storage, pos, level);
    }

    /// Погасить небесный свет в клетке и поставить удаление в очередь
    pub fn remove_sky(&mut self, storage: &ChunkStorage, pos: BlockPos) {
        self.remove_at(Channel::Sky, storage, pos);
    }

    pub fn remove_block(&mut self, storage: &ChunkStorage, pos: BlockPos) {
        self.remove_at(Channel::Block, storage, pos);
    }

    fn remove_at(&mut self, channel: Channel, storage: &ChunkStorage, pos: BlockPos) {
        let Some(node) = LightNode::at(pos, 0) else {
            return;
        };
        let (x, y, z) = node.local();
        let previous = storage
            .with_chunk_mut(node.chunk, |chunk| {
                let level = channel.get(chunk, x, y, z);
                if level > 0 {
                    channel.set(chunk, x, y, z, 0);
                }
                level
            })
            .unwrap_or(0);
        if previous > 0 {
            self.remove_queue(channel).push_back(node.with_level(previous));
        }
    }

    /// Записать уровень (если выше) и поставить клетку в очередь
    fn raise(&mut self, channel: Channel, storage: &ChunkStorage, pos: BlockPos, level: u8) {
        let level = level.min(MAX_LIGHT);
        let Some(node) = LightNode::at(pos, level) else {
            return;
        };
        let (x, y, z) = node.local();
        let raised = storage
            .with_chunk_mut(node.chunk, |chunk| {
                if channel.get(chunk, x, y, z) < level {
                    channel.set(chunk, x, y, z, level);
                    true
                } else {
                    false
                }
            })
            .unwrap_or(false);
        if raised {
            self.add_queue(channel).push_back(node);
        }
    }

    /// Реакция на правку блока: прозрачность и излучение
    pub fn on_block_changed(
        &mut self,
        storage: &ChunkStorage,
        registry: &BlockRegistry,
        pos: BlockPos,
        old: BlockId,
        new: BlockId,
    ) {
        if old == new || LightNode::at(pos, 0).is_none() {
            return;
        }
        let was_opaque = registry.is_opaque(old);
        let now_opaque = registry.is_opaque(new);
        let old_emission = registry.emission(old);
        let new_emission = registry.emission(new);

        // Блочный свет
        let removed_block = (now_opaque && !was_opaque) || old_emission > 0;
        if removed_block {
            self.remove_block(storage, pos);
        }
        if new_emission > 0 {
            self.raise(Channel::Block, storage, pos, new_emission);
        }

        // Небесный свет: ослабление клетки как в initialize_skylight
        let old_attenuation = sky_attenuation(registry, old);
        let new_attenuation = sky_attenuation(registry, new);
        if new_attenuation > old_attenuation {
            self.remove_sky(storage, pos);
        }

        if !now_opaque {
            // Свет гасимого источника не возвращаем обратно
            self.reseed_from_neighbors(storage, pos, old_attenuation != new_attenuation, !removed_block);
        }
    }

    /// Открытая клетка заливается светом соседей
    fn reseed_from_neighbors(&mut self, storage: &ChunkStorage, pos: BlockPos, sky_channel: bool, block_channel: bool) {
        if !sky_channel && !block_channel {
            return;
        }
        let Some(center) = LightNode::at(pos, 0) else {
            return;
        };
        for dir in 0..6 {
            let Some(n) = center.neighbor(dir) else {
                continue;
            };
            let (x, y, z) = n.local();
            let levels = storage.with_chunk(n.chunk, |chunk| (chunk.sky_light(x, y, z), chunk.block_light(x, y, z)));
            if let Some((sky, block)) = levels {
                if sky_channel && sky > 1 {
                    self.sky_add.push_back(n.with_level(sky));
                }
                if block_channel && block > 1 {
                    self.block_add.push_back(n.with_level(block));
                }
            }
        }
    }

    // ============================================
    // Update
    // ============================================

    /// Разобрать очереди в пределах бюджета. Возвращает число узлов.
    pub fn update(&mut self, storage: &ChunkStorage, registry: &BlockRegistry) -> usize {
        let mut processed = 0;

        while processed < self.budget {
            let Some(node) = self.sky_remove.pop_front() else { break };
            self.process_remove(Channel::Sky, node, storage, registry);
            processed += 1;
        }
        while processed < self.budget {
            let Some(node) = self.sky_add.pop_front() else { break };
            self.process_add(Channel::Sky, node, storage, registry);
            processed += 1;
        }
        while processed < self.budget {
            let Some(node) = self.block_remove.pop_front() else { break };
            self.process_remove(Channel::Block, node, storage, registry);
            processed += 1;
        }
        while processed < self.budget {
            let Some(node) = self.block_add.pop_front() else { break };
            self.process_add(Channel::Block, node, storage, registry);
            processed += 1;
        }

        processed
    }

    /// Крутить update пока очереди не опустеют
    pub fn run_to_completion(&mut self, storage: &ChunkStorage, registry: &BlockRegistry) -> usize {
        let mut total = 0;
        while !self.is_idle() {
            total += self.update(storage, registry);
        }
        total
    }

    fn add_queue(&mut self, channel: Channel) -> &mut VecDeque<LightNode> {
        match channel {
            Channel::Sky => &mut self.sky_add,
            Channel::Block => &mut self.block_add,
        }
    }

    fn remove_queue(&mut self, channel: Channel) -> &mut VecDeque<LightNode> {
        match channel {
            Channel::Sky => &mut self.sky_remove,
            Channel::Block => &mut self.block_remove,
        }
    }

    /// Уровень уже записан при постановке в очередь. Узел, чей уровень
    /// разошёлся с записанным, устарел и пропускается.
    fn process_add(&mut self, channel: Channel, node: LightNode, storage: &ChunkStorage, registry: &BlockRegistry) {
        self.pending_seeds.remove(&(channel, node.cell(), node.level));

        let (x, y, z) = node.local();
        let Some(stored) = storage.with_chunk(node.chunk, |chunk| channel.get(chunk, x, y, z)) else {
            return;
        };
        if stored != node.level || node.level <= 1 {
            return;
        }

        for dir in 0..6 {
            let Some(n) = node.neighbor(dir) else {
                continue;
            };
            let (nx, ny, nz) = n.local();
            let raised = storage.with_chunk_mut(n.chunk, |chunk| {
                let id = chunk.get_block(nx, ny, nz);
                if !registry.is_transparent(id) {
                    return None;
                }
                // Небо через воздух вниз не слабеет
                let next = if channel == Channel::Sky && dir == DOWN && id == AIR {
                    node.level
                } else {
                    node.level - 1
                };
                if channel.get(chunk, nx, ny, nz) < next {
                    channel.set(chunk, nx, ny, nz, next);
                    Some(next)
                } else {
                    None
                }
            });
            if let Some(Some(next)) = raised {
                self.add_queue(channel).push_back(n.with_level(next));
            }
        }
    }

    fn process_remove(&mut self, channel: Channel, node: LightNode, storage: &ChunkStorage, registry: &BlockRegistry) {
        for dir in 0..6 {
            let Some(n) = node.neighbor(dir) else {
                continue;
            };
            let (nx, ny, nz) = n.local();
            let outcome = storage.with_chunk_mut(n.chunk, |chunk| {
                let level = channel.get(chunk, nx, ny, nz);
                if level == 0 {
                    return Removal::Nothing;
                }
                // Небесный столб того же уровня гаснет вниз целиком
                let sky_column = channel == Channel::Sky && dir == DOWN && level == node.level;
                if level < node.level || sky_column {
                    channel.set(chunk, nx, ny, nz, 0);
                    let emission = match channel {
                        Channel::Block => registry.emission(chunk.get_block(nx, ny, nz)),
                        Channel::Sky => 0,
                    };
                    if emission > 0 {
                        chunk.set_block_light(nx, ny, nz, emission);
                    }
                    Removal::Cleared { level, emission }
                } else {
                    Removal::Seed(level)
                }
            });

            match outcome {
                Some(Removal::Cleared { level, emission }) => {
                    self.remove_queue(channel).push_back(n.with_level(level));
                    if emission > 0 {
                        self.block_add.push_back(n.with_level(emission));
                    }
                }
                Some(Removal::Seed(level)) => {
                    if self.pending_seeds.insert((channel, n.cell(), level)) {
                        self.add_queue(channel).push_back(n.with_level(level));
                    }
                }
                Some(Removal::Nothing) | None => {}
            }
        }
    }
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new(DEFAULT_LIGHT_BUDGET)
    }
}

enum Removal {
    Nothing,
    Cleared { level: u8, emission: u8 },
    Seed(u8),
}

/// Ослабление неба клеткой: воздух 0, прозрачный блок 1, непрозрачный 15
fn sky_attenuation(registry: &BlockRegistry, id: BlockId) -> u8 {
    if id == AIR {
        0
    } else if registry.is_transparent(id) {
        1
    } else {
        MAX_LIGHT
    }
}

/// (block, sky, block_light) по стене: для каждой пары все y
fn sample_wall(
    chunk: &Chunk,
    pairs: &[((usize, usize), (usize, usize))],
    pick: impl Fn(&((usize, usize), (usize, usize))) -> (usize, usize),
) -> Vec<(BlockId, u8, u8)> {
    let mut out = Vec::with_capacity(pairs.len() * CHUNK_HEIGHT as usize);
    for pair in pairs {
        let (x, z) = pick(pair);
        for y in 0..CHUNK_HEIGHT as usize {
            out.push((chunk.get_block(x, y, z), chunk.sky_light(x, y, z), chunk.block_light(x, y, z)));
        }
    }
    out
}
