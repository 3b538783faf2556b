use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

type InputResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Request body from `--input`, else piped stdin, else `None`.
///
/// An interactive terminal or an empty pipe yields `None` so the caller can
/// fall back to individual flags.
pub fn read_request(path: Option<&str>) -> InputResult<Option<Value>> {
    if let Some(path) = path {
        let resolved = resolve_path(path)?;
        let text = fs::read_to_string(&resolved)
            .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
        return parse_body(&resolved.display().to_string(), &text)?
            .map(Some)
            .ok_or_else(|| format!("Request file '{}' is empty", resolved.display()).into());
    }

    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    parse_body("stdin", &text)
}

/// Engine configuration file, deserialised into `T`.
pub fn read_config<T: DeserializeOwned>(path: &str) -> InputResult<T> {
    let resolved = resolve_path(path)?;
    let text = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let config = serde_json::from_str(&text)
        .map_err(|e| format!("Invalid configuration in '{}': {}", resolved.display(), e))?;
    Ok(config)
}

/// JSON body with surrounding whitespace ignored. Blank input is `None`.
fn parse_body(source: &str, text: &str) -> InputResult<Option<Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse request from {source}: {e}"))?;
    Ok(Some(value))
}

fn resolve_path(path: &str) -> InputResult<PathBuf> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.is_file() {
        return Err(format!("Not a readable file: {}", resolved.display()).into());
    }
    Ok(resolved)
}
