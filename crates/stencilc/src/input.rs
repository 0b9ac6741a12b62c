//! Reading template source from a file or standard input.

use std::io::Read;
use std::path::Path;

/// A template and the name diagnostics refer to it by.
#[derive(Debug)]
pub struct Input {
    pub name: String,
    pub text: String,
}

/// Read `path`, or standard input when `path` is `-`.
pub fn read_input(path: &Path) -> Result<Input, String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("Failed to read standard input: {}", e))?;
        return Ok(Input {
            name: "<stdin>".to_string(),
            text,
        });
    }

    if path.is_dir() {
        return Err(format!("'{}' is a directory", path.display()));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    Ok(Input {
        name: path.display().to_string(),
        text,
    })
}
