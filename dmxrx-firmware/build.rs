//! Build script for dmxrx-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates receiver.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted per section, mirrored from the runtime parser
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("rs485", &["enable_inverted"]),
    ("status", &["report_interval_ms", "watch_start", "watch_count"]),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate receiver.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=receiver.toml");

    let config_path = Path::new("receiver.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: receiver.toml not found!                                 ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds receiver.toml as its configuration.         ║\n\
            ║  Please create one in the dmxrx-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("\nERROR: Failed to read receiver.toml: {e}\n"),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => panic!("\nERROR: Invalid TOML syntax in receiver.toml:\n{e}\n"),
    };

    let Some(root) = config.as_table() else {
        panic!("\nERROR: receiver.toml must be a table\n");
    };

    let mut errors = Vec::new();

    for (section, value) in root {
        let Some((_, keys)) = KNOWN_KEYS.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{section}]"));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{section}] must be a table"));
            continue;
        };
        for (key, value) in table {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("unknown key {section}.{key}"));
                continue;
            }
            let valid = match key.as_str() {
                "enable_inverted" => value.is_bool(),
                _ => value.as_integer().is_some_and(|v| v >= 0),
            };
            if !valid {
                errors.push(format!("invalid value for {section}.{key}: {value}"));
            }
        }
    }

    if let Some(start) = root
        .get("status")
        .and_then(|s| s.get("watch_start"))
        .and_then(|v| v.as_integer())
    {
        if !(1..=512).contains(&start) {
            errors.push(format!("status.watch_start must be 1..=512, got {start}"));
        }
    }

    if !errors.is_empty() {
        panic!(
            "\nERROR: receiver.toml validation failed:\n  - {}\n",
            errors.join("\n  - ")
        );
    }
}
