// ============================================
// Chunk Engine Demo - Прогрузка, свет, меши, сохранение
// ============================================
// RUST_LOG=debug cargo run  - подробный лог

use std::process::ExitCode;

use voxel_chunk_engine::biomes::{UniformBiome, BIOME_PLAINS};
use voxel_chunk_engine::blocks::{GLOWSTONE, TORCH};
use voxel_chunk_engine::core::CONFIG_FILE;
use voxel_chunk_engine::{
    BlockPos, BlockRegistry, EngineConfig, FlatWorldGenerator, GreedyMesher, GridAtlas, VoxelWorld,
};

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load(CONFIG_FILE)?;
    println!("=== Chunk Engine ===");
    println!("World: {}", config.world_directory().display());
    println!("Render distance: {} chunks", config.render_distance);

    let mut world = VoxelWorld::new(config, BlockRegistry::with_defaults(), Box::new(FlatWorldGenerator::default()))?;

    let [sx, sy, sz] = world.saves().metadata().spawn;
    println!("Seed: {}", world.saves().metadata().seed);
    let spawn = BlockPos::new(sx.floor() as i32, sy.floor() as i32, sz.floor() as i32);
    let (loaded, _) = world.update_view(spawn)?;
    let light_nodes = world.settle_lighting();
    println!("Loaded {} chunks, {} light updates", loaded, light_nodes);

    // Пара источников света у точки спавна
    world.set_block(spawn, TORCH);
    world.set_block(spawn.offset(4, 0, 0), GLOWSTONE);
    world.settle_lighting();

    {
        let atlas = GridAtlas::default();
        let biome = UniformBiome(BIOME_PLAINS);
        let mesher = GreedyMesher::new(world.registry(), &atlas).with_biomes(&biome);
        let meshes = world.remesh_dirty(&mesher);
        let quads: usize = meshes.iter().map(|(_, mesh)| mesh.quad_count()).sum();
        let triangles: usize = meshes.iter().map(|(_, mesh)| mesh.triangle_count()).sum();
        println!("Meshed {} chunks: {} quads, {} triangles", meshes.len(), quads, triangles);
    }

    for _ in 0..20 {
        world.tick(1.0 / 20.0)?;
    }
    world.saves_mut().metadata_mut().world_time += 20;

    let saved = world.shutdown()?;
    println!("Saved {} chunks", saved);
    Ok(())
}
