//! Build script for climeter-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTIONS: &[&str] = &["matrix", "deadline", "metric", "input", "alert", "display"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml at compile time
///
/// The firmware parser only reports the first error and a line number over
/// RTT. Catching mistakes here gives a readable message before flashing.
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");
    if !config_path.exists() {
        fail("clock.toml not found", &["The firmware embeds clock.toml from the crate directory."]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read clock.toml", &[&e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail("clock.toml is not valid TOML", &[&e.to_string()]),
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_matrix(&config, &mut errors);
    let metrics = validate_metrics(&config, &mut errors);
    validate_deadline(&config, &metrics, &mut errors);
    validate_input(&config, &mut errors);
    validate_alert(&config, &mut errors);
    validate_display(&config, &metrics, &mut errors);

    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("Invalid clock configuration", &lines);
    }
}

fn fail(title: &str, lines: &[&str]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn table<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::Table> {
    config.get(name).and_then(|v| v.as_table())
}

fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("'{}' must be a section", name));
        }
    }
}

fn validate_matrix(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(matrix) = table(config, "matrix") else {
        return;
    };

    if let Some(chain) = matrix.get("chain_length") {
        match chain.as_integer() {
            Some(1..=3) => {}
            _ => errors.push("[matrix] chain_length must be 1, 2 or 3".into()),
        }
    }
    if let Some(brightness) = matrix.get("brightness") {
        match brightness.as_integer() {
            Some(1..=100) => {}
            _ => errors.push("[matrix] brightness must be 1-100".into()),
        }
    }
}

/// Returns the names of all configured metrics
fn validate_metrics(config: &toml::Value, errors: &mut Vec<String>) -> Vec<String> {
    let Some(metrics) = table(config, "metric") else {
        return Vec::new();
    };

    if metrics.len() > 4 {
        errors.push("at most 4 [metric.*] sections are supported".into());
    }

    for (name, metric) in metrics {
        let Some(metric) = metric.as_table() else {
            errors.push(format!("[metric.{}] must be a table", name));
            continue;
        };

        if !metric.get("timestamp").is_some_and(is_timestamp) {
            errors.push(format!("[metric.{}] needs an RFC 3339 'timestamp'", name));
        }
        if !metric.get("initial").is_some_and(is_number) {
            errors.push(format!("[metric.{}] needs a numeric 'initial'", name));
        }
        match (metric.get("rate"), metric.get("rate_per_year")) {
            (Some(rate), None) | (None, Some(rate)) if is_number(rate) => {}
            (Some(_), Some(_)) => {
                errors.push(format!("[metric.{}] set either 'rate' or 'rate_per_year'", name));
            }
            _ => errors.push(format!("[metric.{}] needs a numeric 'rate'", name)),
        }
        if let Some(decimals) = metric.get("decimals") {
            match decimals.as_integer() {
                Some(0..=9) => {}
                _ => errors.push(format!("[metric.{}] decimals must be 0-9", name)),
            }
        }
    }

    metrics.keys().cloned().collect()
}

fn validate_deadline(config: &toml::Value, metrics: &[String], errors: &mut Vec<String>) {
    let Some(deadline) = table(config, "deadline") else {
        return;
    };

    match (deadline.get("at"), deadline.get("metric")) {
        (Some(_), Some(_)) => errors.push("[deadline] set either 'at' or 'metric'".into()),
        (Some(at), None) if !is_timestamp(at) => {
            errors.push("[deadline] 'at' must be an RFC 3339 timestamp".into());
        }
        (None, Some(toml::Value::String(name))) if !metrics.contains(name) => {
            errors.push(format!("[deadline] references unknown metric '{}'", name));
        }
        _ => {}
    }

    if let Some(policy) = deadline.get("on_expiry") {
        match policy.as_str() {
            Some("freeze" | "alert" | "count_up") => {}
            _ => errors.push("[deadline] on_expiry must be freeze, alert or count_up".into()),
        }
    }
}

fn validate_input(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(input) = table(config, "input") else {
        return;
    };

    if let Some(pin) = input.get("toggle_pin") {
        let number = pin
            .as_str()
            .map(|s| s.trim_start_matches(['^', '!']))
            .and_then(|s| s.strip_prefix("gpio"))
            .and_then(|n| n.parse::<u8>().ok());
        match number {
            Some(0 | 1) => errors.push("[input] gpio0/gpio1 carry the matrix link".into()),
            Some(2..=29) => {}
            _ => errors.push("[input] toggle_pin must look like \"^!gpio15\"".into()),
        }
    }
}

fn validate_alert(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(alert) = table(config, "alert") else {
        return;
    };

    if let Some(threshold) = alert.get("seconds_threshold") {
        match threshold.as_integer() {
            Some(0..=59) => {}
            _ => errors.push("[alert] seconds_threshold must be 0-59".into()),
        }
    }
}

fn validate_display(config: &toml::Value, metrics: &[String], errors: &mut Vec<String>) {
    let Some(display) = table(config, "display") else {
        return;
    };

    if let Some(refresh) = display.get("refresh_ms") {
        if !refresh.as_integer().is_some_and(|ms| ms > 0) {
            errors.push("[display] refresh_ms must be positive".into());
        }
    }
    if let Some(toml::Value::String(name)) = display.get("primary_metric") {
        if !name.is_empty() && !metrics.contains(name) {
            errors.push(format!("[display] references unknown metric '{}'", name));
        }
    }
}

fn is_number(value: &toml::Value) -> bool {
    value.is_float() || value.is_integer()
}

/// Timestamps are quoted strings in clock.toml, not TOML datetimes
fn is_timestamp(value: &toml::Value) -> bool {
    value.as_str().is_some_and(|s| {
        let b = s.as_bytes();
        b.len() >= 20
            && b[10] == b'T'
            && (s.ends_with('Z') || b[19..].iter().any(|&c| c == b'+' || c == b'-'))
    })
}
