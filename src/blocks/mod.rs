// ============================================
// Библиотека блоков движка чанков
// ============================================
// Data-Driven Architecture: блоки загружаются из JSON

mod types;
mod definition;
mod registry;
pub mod texture_atlas;

pub use types::*;
pub use definition::*;
pub use registry::*;
pub use texture_atlas::{TextureAtlas, GridAtlas, MISSING_TEXTURE_INDEX};
