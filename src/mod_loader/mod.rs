//! MOD File Loader
//!
//! Reads module files from disk and hands the bytes to the MOD parser.

use crate::mod_parser::{FormatParser, ModParser};
use crate::module::Module;
use crate::{ProtrackerError, Result};
use std::fs;
use std::path::Path;

/// Loads MOD files from disk
pub struct ModFileLoader;

impl ModFileLoader {
    /// Load and parse a module file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Module> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|e| {
            ProtrackerError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read file '{}': {}", path.display(), e),
            ))
        })?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "read module file");
        ModParser.parse(&data)
    }
}

/// Convenience function to load a MOD file from disk
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Module> {
    ModFileLoader::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_file("/nonexistent/dir/song.mod").unwrap_err();
        assert!(matches!(err, ProtrackerError::Io(_)));
        assert!(err.to_string().contains("song.mod"));
    }
}
