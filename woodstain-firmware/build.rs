//! Build script for woodstain-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use woodstain_core::config::parse_config;

/// Sections `machine.toml` may contain
const SECTIONS: [&str; 6] = ["pins", "timing", "spray", "vertical", "horizontal", "stroke"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => fail("OUT_DIR is not set", &[e.to_string()]),
    };

    let memory_x = include_bytes!("memory.x");
    let written = File::create(out_dir.join("memory.x")).and_then(|mut f| f.write_all(memory_x));
    if let Err(e) = written {
        fail("Failed to write memory.x", &[e.to_string()]);
    }

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");
    if !config_path.exists() {
        fail(
            "machine.toml not found!",
            &[
                "The firmware embeds a machine.toml configuration file.".to_string(),
                "Please create one in the woodstain-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read machine.toml", &[e.to_string()]),
    };

    // Syntax first, with the full TOML parser
    let value: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in machine.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };
    validate_sections(&value);

    // Then the firmware's own parser and the semantic checks
    let config = match parse_config(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "machine.toml rejected by the firmware parser",
            &[format!("line {}: {:?}", e.line, e.kind)],
        ),
    };
    if let Err(e) = config.validate() {
        fail("Invalid machine configuration", &[format!("{:?}", e)]);
    }

    println!("cargo:warning=machine.toml validated successfully");
}

/// Every top-level entry must be a known section table
fn validate_sections(value: &toml::Value) {
    let table = match value.as_table() {
        Some(t) => t,
        None => fail("machine.toml must be a table", &[]),
    };

    let mut errors = Vec::new();
    for (name, section) in table {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
            continue;
        }
        let Some(section) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for (key, entry) in section {
            match (name.as_str(), entry) {
                ("pins", toml::Value::String(_)) => {}
                ("pins", _) => errors.push(format!("[pins] {} must be a pin string", key)),
                (_, toml::Value::Integer(n)) if *n < 0 || *n > i64::from(u32::MAX) => {
                    errors.push(format!("[{}] {} is out of range", name, key))
                }
                (_, toml::Value::Integer(_)) => {}
                _ => errors.push(format!("[{}] {} must be an integer", name, key)),
            }
        }
    }

    if !errors.is_empty() {
        fail("Invalid sections in machine.toml", &errors);
    }
}

/// Abort the build with a boxed diagnostic
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
