// ============================================
// Lighting Module - Воксельный свет (sky + block)
// ============================================
// BFS по 6 соседям, 16 уровней, инкрементальные правки
// с бюджетом операций на тик

mod node;
mod engine;

pub use engine::{LightEngine, DEFAULT_LIGHT_BUDGET};
pub use node::{Channel, LightNode};
