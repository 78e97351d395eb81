//! Fuzz harness for visualizer configuration files (heapviz.yaml / .json)
//!
//! Parsing and validation must never panic, whatever the input.

#![no_main]

use heapviz_config::VisualizerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(config) = serde_yaml::from_str::<VisualizerConfig>(input) {
        let _ = config.validate();
    }
    if let Ok(config) = serde_json::from_str::<VisualizerConfig>(input) {
        if config.validate().is_ok() {
            assert!(config.branching_factor().is_ok());
        }
    }
});
