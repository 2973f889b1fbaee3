#![no_main]

use libfuzzer_sys::fuzz_target;
use wirekit_core::{GraphConfig, WiringGraph};

// Arbitrary text must either be rejected or build a graph that holds every
// declared connector. Initial values are dropped since a cyclic file would
// otherwise recurse without bound.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut config) = GraphConfig::from_toml_str(text) else {
        return;
    };
    for connector in &mut config.connectors {
        connector.initial = None;
    }
    if let Ok(graph) = WiringGraph::from_config(&config) {
        for connector in &config.connectors {
            assert!(graph.contains(&connector.name));
        }
    }
});
