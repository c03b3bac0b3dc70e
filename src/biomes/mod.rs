// ============================================
// Biomes Module - Биомы для оттенков травы и листвы
// ============================================
//
// Генерация климата и выбор биома вне движка чанков:
// меш видит только BiomeLookup и таблицы оттенков.

mod types;

pub use types::*;
