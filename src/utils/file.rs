use crate::models::error::SError;
use camino::Utf8Path;

pub struct FileUtils;

impl FileUtils {
    /// Writes `bytes` to `path` through a sibling temp file and a rename,
    /// so readers never observe a half-written file.
    /// Creates the parent directory if needed.
    pub fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), SError> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| SError::IOError(format!("Not a file path: {path}")))?;
        let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        if let Err(e) = std::fs::write(&tmp, bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            SError::IOError(format!("Failed to move {tmp} to {path}: {e}"))
        })
    }

    /// Reads a file, mapping "not found" to `None`.
    pub fn read_optional(path: &Utf8Path) -> Result<Option<Vec<u8>>, SError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
