//! Load the bundled data directory and run a small factory headlessly.
//!
//! Run with: `RUST_LOG=millwork_core=debug cargo run -p millwork-data --example headless_runner`
//! An alternative data directory may be passed as the first argument.

use std::path::PathBuf;
use std::sync::Arc;

use millwork_core::engine::Engine;
use millwork_data::load_game_data;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"));
    let data = load_game_data(&dir)?;
    let catalog = Arc::new(data.catalog);
    let mut engine = Engine::new(Arc::clone(&catalog), data.config);

    // miner -> smelter -> crate, all placed as ghosts. A ghost cannot feed
    // anything, so the smelter is wired to the crate once it stands.
    let miner = engine.add_node("miner", 0.0, 0.0)?;
    let smelter = engine.add_node("smelter", 100.0, 0.0)?;
    let storage = engine.add_node("crate", 200.0, 0.0)?;
    engine.connect(miner, smelter)?;
    let mut wired = false;

    for _ in 0..200 {
        if !wired && engine.node(smelter).is_some_and(|n| !n.is_ghost()) {
            wired = engine.connect(smelter, storage)?;
        }
        for resource in engine.step().discovered {
            if let Some(def) = catalog.resource(resource) {
                println!("t={} discovered {}", engine.time(), def.key);
            }
        }
    }

    for snapshot in engine.snapshot_all_nodes() {
        let key = catalog
            .node_type(snapshot.node_type)
            .map_or("?", |def| def.key.as_str());
        print!("{key:>8} {:?}:", snapshot.state);
        for stock in &snapshot.resources {
            let name = catalog
                .resource(stock.resource)
                .map_or("?", |def| def.key.as_str());
            print!(" {name}={}/{}", stock.amount, stock.maximum);
        }
        println!();
    }
    println!("state hash {:016x}", engine.state_hash());
    Ok(())
}
