//! Fuzz harness for the command script parser
//!
//! Any parsed command must print back to text that parses to itself.

#![no_main]

use heapviz_session::{HeapCommand, parse_script};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(commands) = parse_script(input) {
        for command in commands {
            let text = command.to_string();
            assert_eq!(text.parse::<HeapCommand>(), Ok(command));
        }
    }
});
