//! Full pipeline benchmarks

use crate::{Bench, Measurement};
use moonveil_core::{Obfuscator, ObfuscatorConfig, PassConfig};

use super::generate_script;

pub fn run_all() -> Vec<Measurement> {
    vec![
        bench_full_pipeline_small(),
        bench_full_pipeline_large(),
        bench_strings_only(),
        bench_flatten_only(),
    ]
}

fn seeded_config() -> ObfuscatorConfig {
    ObfuscatorConfig {
        seed: Some(42),
        ..ObfuscatorConfig::default()
    }
}

fn no_passes() -> PassConfig {
    PassConfig {
        strip_comments: false,
        invert_conditionals: false,
        inject_predicates: false,
        flatten_control_flow: false,
        mangle_booleans: false,
        mangle_numbers: false,
        encrypt_strings: false,
        virtualize_globals: false,
    }
}

fn bench_full_pipeline_small() -> Measurement {
    let source = generate_script(50);
    let obfuscator = Obfuscator::new(seeded_config());
    Bench::new("pipeline", 50).measure_bytes(
        "full pipeline (50 blocks)",
        source.len() as u64,
        || {
            std::hint::black_box(obfuscator.obfuscate(&source));
        },
    )
}

fn bench_full_pipeline_large() -> Measurement {
    let source = generate_script(500);
    let obfuscator = Obfuscator::new(seeded_config());
    Bench::new("pipeline", 5).measure_bytes(
        "full pipeline (500 blocks)",
        source.len() as u64,
        || {
            std::hint::black_box(obfuscator.obfuscate(&source));
        },
    )
}

fn bench_strings_only() -> Measurement {
    let source = generate_script(100);
    let mut config = seeded_config();
    config.passes = PassConfig {
        encrypt_strings: true,
        ..no_passes()
    };
    let obfuscator = Obfuscator::new(config);
    Bench::new("pipeline", 50).measure("string encryption only (100 blocks)", || {
        std::hint::black_box(obfuscator.obfuscate(&source));
    })
}

fn bench_flatten_only() -> Measurement {
    let source = generate_script(100);
    let mut config = seeded_config();
    config.passes = PassConfig {
        flatten_control_flow: true,
        ..no_passes()
    };
    let obfuscator = Obfuscator::new(config);
    Bench::new("pipeline", 50).measure("control-flow flattening only (100 blocks)", || {
        std::hint::black_box(obfuscator.obfuscate(&source));
    })
}
