//! Loading JSON arguments from files, stdin or inline text.

use std::{fs, io::Read, path::Path};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Reads and parses a `<json>` argument.
///
/// `-` reads stdin; text starting with `{` or `[` is parsed inline; anything
/// else is a file path.
pub fn read_json<T: DeserializeOwned>(source: &str, what: &str) -> Result<T> {
    let text = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| format!("Failed to read {what} from stdin"))?;
        buffer
    } else if looks_inline(source) {
        source.to_string()
    } else {
        fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read {what} file '{source}'"))?
    };

    serde_json::from_str(&text).with_context(|| format!("Invalid {what} JSON"))
}

fn looks_inline(source: &str) -> bool {
    matches!(source.trim_start().chars().next(), Some('{' | '['))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_inline_json() {
        let value: Value = read_json(r#"{"sections": []}"#, "plan").unwrap();
        assert_eq!(value["sections"], Value::Array(vec![]));

        let list: Vec<u32> = read_json(" [1, 2]", "numbers").unwrap();
        assert_eq!(list, vec![1, 2]);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(&path, r#"{"title": "Legs"}"#).unwrap();

        let value: Value = read_json(path.to_str().unwrap(), "plan").unwrap();
        assert_eq!(value["title"], "Legs");
    }

    #[test]
    fn test_errors_name_the_input() {
        let err = read_json::<Value>("/does/not/exist.json", "goals").unwrap_err();
        assert!(err.to_string().contains("Failed to read goals file"));

        let err = read_json::<Vec<u32>>("[1,", "instances").unwrap_err();
        assert!(err.to_string().contains("Invalid instances JSON"));
    }
}
