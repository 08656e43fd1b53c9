use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use schemalock_core::model::Warning;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

pub fn print_line(msg: &str) {
    println!("{msg}");
}

pub fn eprintln_line(msg: &str) {
    let _ = writeln!(io::stderr(), "{msg}");
}

/// Render warnings in text mode, one line each.
pub fn print_warnings(warnings: &[Warning]) -> anyhow::Result<()> {
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    for w in warnings {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(out, "WARN")?;
        out.reset()?;
        writeln!(out, " {} [{}] {}: {}", w.filepath, w.rule_id, w.path, w.text)?;
    }
    Ok(())
}
