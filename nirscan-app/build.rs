//! Build script for nirscan-app
//!
//! Validates the embedded device.toml at compile time so a broken default
//! configuration never ships.

use std::fs;
use std::path::Path;

#[path = "build/error_box.rs"]
mod error_box;

use error_box::format_error_lines;

fn main() {
    validate_config();
}

fn fail(title: &str, body: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(body)
    );
}

fn fail_list(title: &str, errors: &[String]) {
    if !errors.is_empty() {
        let body = errors
            .iter()
            .map(|e| format!("• {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        fail(title, &body);
    }
}

/// Validate device.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=build/error_box.rs");

    let config_path = Path::new("device.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &e.to_string()),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in device.toml", &e.to_string()),
    };

    validate_backend(&config);
    validate_input(&config);
    validate_display(&config);
    validate_model(&config);

    println!("cargo:warning=device.toml validated successfully");
}

fn validate_backend(config: &toml::Value) {
    if let Some(backend) = config.get("backend") {
        match backend.as_str() {
            Some("live") | Some("simulated") => {}
            _ => fail_list(
                "Invalid backend in device.toml",
                &["backend must be 'live' or 'simulated'".to_string()],
            ),
        }
    }
}

/// Button ranges must be well-formed and pairwise disjoint
fn validate_input(config: &toml::Value) {
    let input = match config.get("input").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    let mut ranges: Vec<(&str, i64, i64)> = Vec::new();

    for name in ["enter", "up", "down", "right"] {
        let Some(range) = input.get(name) else {
            continue;
        };
        let min = range.get("min").and_then(|v| v.as_integer());
        let max = range.get("max").and_then(|v| v.as_integer());
        match (min, max) {
            (Some(min), Some(max)) if min <= max => ranges.push((name, min, max)),
            (Some(_), Some(_)) => errors.push(format!("[input] {} has min > max", name)),
            _ => errors.push(format!("[input] {} needs integer 'min' and 'max'", name)),
        }
    }

    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            if a.1 <= b.2 && b.1 <= a.2 {
                errors.push(format!("[input] ranges '{}' and '{}' overlap", a.0, b.0));
            }
        }
    }

    if let Some(interval) = input.get("poll_interval_ms").and_then(|v| v.as_integer()) {
        if interval <= 0 {
            errors.push("[input] poll_interval_ms must be positive".to_string());
        }
    }

    fail_list("Invalid [input] configuration", &errors);
}

fn validate_display(config: &toml::Value) {
    let display = match config.get("display").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    if let Some(bpp) = display.get("bits_per_pixel").and_then(|v| v.as_integer()) {
        if bpp != 16 && bpp != 32 {
            errors.push("[display] bits_per_pixel must be 16 or 32".to_string());
        }
    }
    for key in ["width", "height"] {
        if let Some(v) = display.get(key).and_then(|v| v.as_integer()) {
            if v <= 0 {
                errors.push(format!("[display] {} must be positive", key));
            }
        }
    }
    fail_list("Invalid [display] configuration", &errors);
}

fn validate_model(config: &toml::Value) {
    let model = match config.get("model").and_then(|v| v.as_table()) {
        Some(t) => t,
        None => return,
    };

    let mut errors = Vec::new();
    if let Some(threshold) = model.get("confidence_threshold").and_then(|v| v.as_float()) {
        if !(0.0..=1.0).contains(&threshold) {
            errors.push("[model] confidence_threshold must be 0.0-1.0".to_string());
        }
    }
    if let Some(classes) = model.get("classes") {
        match classes.as_array() {
            Some(list) if !list.is_empty() => {
                for class in list {
                    match class.as_str() {
                        Some(s) if !s.is_empty() && s.len() <= 16 => {}
                        _ => errors.push(format!(
                            "[model] class {} must be a 1-16 character string",
                            class
                        )),
                    }
                }
            }
            _ => errors.push("[model] classes must be a non-empty list".to_string()),
        }
    }
    fail_list("Invalid [model] configuration", &errors);
}
