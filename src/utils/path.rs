use std::borrow::Cow;
use std::env;

use log::error;

pub fn basename(path: &str) -> Cow<'_, str> {
    if path == "/" {
        return path.into();
    }
    let mut pieces = path.trim_end_matches('/').rsplit('/');
    match pieces.next() {
        Some(p) if !p.is_empty() => p.into(),
        _ => path.into(),
    }
}

pub fn current_dir() -> String {
    let _current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("pipesh: PROMPT: env current_dir error: {}", e);
            return String::new();
        }
    };
    let current_dir = match _current_dir.to_str() {
        Some(x) => x,
        None => {
            error!("pipesh: PROMPT: to_str error");
            return String::new();
        }
    };

    current_dir.to_string()
}

/// Short directory label for the prompt: `~` for the home directory,
/// otherwise the last path component.
pub fn prompt_dir() -> String {
    let dir = current_dir();
    if dir.is_empty() {
        return "?".to_string();
    }
    if env::var("HOME").map(|home| home == dir).unwrap_or(false) {
        return "~".to_string();
    }
    basename(&dir).into_owned()
}
