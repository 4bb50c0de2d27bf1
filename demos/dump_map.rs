use anyhow::Context;
use tiled_tmx::{LayerKind, Map};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/assets/map.tmx".to_string());

    let map = Map::from_file(&path).with_context(|| format!("Loading map {path}"))?;
    let tilesets = map
        .load_tilesets(&path)
        .with_context(|| format!("Loading tilesets of {path}"))?;

    println!("{}x{} {} map, {} tilesets", map.width, map.height, map.orientation, tilesets.len());
    for layer in &map.layers {
        match &layer.kind {
            LayerKind::Tiles(tiles) => {
                let used = tiles.data.iter().filter(|&&gid| gid != 0).count();
                println!("layer '{}': {used} tiles", layer.name);
                for &gid in tiles.data.iter().filter(|&&gid| gid != 0).take(4) {
                    let rect = map
                        .tileset_for_gid(gid)
                        .and_then(|entry| Some((entry, tilesets.get(&entry.first_gid)?)))
                        .and_then(|(entry, ts)| map.source_rect(entry, ts, gid));
                    println!("  gid {gid} -> {rect:?}");
                }
            }
            LayerKind::Objects { objects } => println!("objectgroup '{}': {} objects", layer.name, objects.len()),
            LayerKind::Image { image } => println!("imagelayer '{}': {:?}", layer.name, image.as_ref().map(|i| &i.source)),
        }
    }

    println!("{}", serde_json::to_string_pretty(&map).context("Serializing map")?);
    Ok(())
}
