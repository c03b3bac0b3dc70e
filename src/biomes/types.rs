// ============================================
// Biome Types - Типы биомов и оттенки
// ============================================

/// ID биома
pub type BiomeId = u8;

// Константы биомов
pub const BIOME_OCEAN: BiomeId = 0;
pub const BIOME_PLAINS: BiomeId = 1;
pub const BIOME_DESERT: BiomeId = 2;
pub const BIOME_FOREST: BiomeId = 3;
pub const BIOME_TAIGA: BiomeId = 4;
pub const BIOME_TUNDRA: BiomeId = 5;
pub const BIOME_SWAMP: BiomeId = 6;
pub const BIOME_MOUNTAINS: BiomeId = 7;

/// Источник биома для мировой колонки (x, z)
pub trait BiomeLookup: Send + Sync {
    fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeId;
}

impl<F> BiomeLookup for F
where
    F: Fn(i32, i32) -> BiomeId + Send + Sync,
{
    #[inline]
    fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeId {
        self(world_x, world_z)
    }
}

/// Один биом на весь мир
#[derive(Debug, Clone, Copy)]
pub struct UniformBiome(pub BiomeId);

impl BiomeLookup for UniformBiome {
    #[inline]
    fn biome_at(&self, _world_x: i32, _world_z: i32) -> BiomeId {
        self.0
    }
}

/// Оттенок травы по биому (неизвестные = равнины)
pub fn grass_tint(biome: BiomeId) -> [f32; 3] {
    match biome {
        BIOME_FOREST => [0.4, 0.8, 0.3],
        BIOME_DESERT => [0.7, 0.7, 0.4],
        BIOME_MOUNTAINS => [0.4, 0.7, 0.5],
        BIOME_TAIGA | BIOME_TUNDRA => [0.3, 0.7, 0.3],
        BIOME_SWAMP => [0.4, 0.6, 0.3],
        _ => [0.5, 0.9, 0.3],
    }
}

/// Оттенок листвы по биому
pub fn foliage_tint(biome: BiomeId) -> [f32; 3] {
    match biome {
        BIOME_FOREST => [0.2, 0.6, 0.2],
        BIOME_DESERT => [0.5, 0.6, 0.3],
        BIOME_MOUNTAINS => [0.3, 0.6, 0.4],
        BIOME_TAIGA | BIOME_TUNDRA => [0.2, 0.5, 0.2],
        BIOME_SWAMP => [0.3, 0.5, 0.2],
        _ => [0.3, 0.7, 0.2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_biome_uses_plains() {
        assert_eq!(grass_tint(200), grass_tint(BIOME_PLAINS));
        assert_eq!(foliage_tint(BIOME_OCEAN), [0.3, 0.7, 0.2]);
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |x: i32, _z: i32| if x < 0 { BIOME_DESERT } else { BIOME_FOREST };
        assert_eq!(lookup.biome_at(-5, 0), BIOME_DESERT);
        assert_eq!(lookup.biome_at(5, 0), BIOME_FOREST);
        assert_eq!(UniformBiome(BIOME_TAIGA).biome_at(100, -100), BIOME_TAIGA);
    }
}
