use std::path::PathBuf;

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(PathBuf::from(value))
}
