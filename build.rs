use phf_codegen::Map;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    let path = Path::new(&env::var("OUT_DIR").unwrap()).join("stake_levels.rs");
    let mut file = BufWriter::new(File::create(&path).unwrap());

    // (level, small blind, big blind, ante, bring-in)
    let levels = [
        (1u32, 1u64, 2u64, 0u64, 1u64),
        (2, 2, 4, 0, 1),
        (3, 3, 6, 1, 2),
        (4, 5, 10, 1, 2),
        (5, 10, 20, 2, 5),
        (6, 15, 30, 3, 5),
        (7, 25, 50, 5, 10),
        (8, 50, 100, 10, 25),
        (9, 100, 200, 20, 50),
        (10, 150, 300, 25, 75),
    ];

    let mut map = Map::new();
    for &(level, small_blind, big_blind, ante, bring_in) in levels.iter() {
        map.entry(
            level,
            &format!(
                "Stakes {{ small_blind: {}, big_blind: {}, ante: {}, bring_in: {} }}",
                small_blind, big_blind, ante, bring_in
            ),
        );
    }

    writeln!(
        &mut file,
        "static STAKE_LEVELS: phf::Map<u32, Stakes> = {};",
        map.build()
    )
    .unwrap();
    println!("cargo:rerun-if-changed=build.rs");
}
