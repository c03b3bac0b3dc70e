// ============================================
// Mesh Module - Greedy меши чанков
// ============================================

mod vertex;
mod greedy;
mod mesher;
mod neighbors;
pub mod context;
pub mod occlusion;
pub mod thread_local;

pub use vertex::{ChunkVertex, MeshBuffers};
pub use greedy::{FaceDir, FaceKey};
pub use mesher::{GreedyMesher, MesherOptions};
pub use neighbors::{BlockQuery, EmptyNeighbors};
pub use context::MeshingContext;
pub use thread_local::with_meshing_context;
