use std::{
    fs::{self, File},
    future::Future,
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use tokio::process::Command;

/// Unpacks a downloaded artifact archive.
pub trait Extractor: Sync {
    fn extract(&self, archive: &Path, dest: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Runs the external `unzip` utility.
pub struct UnzipCommand {
    pub program: String,
    /// Wrap the command output in a collapsible block of the Actions log.
    pub log_group: bool,
}

impl Default for UnzipCommand {
    fn default() -> Self { Self { program: "unzip".to_string(), log_group: false } }
}

impl Extractor for UnzipCommand {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        if self.log_group {
            println!("::group::Extracting {}", archive.display());
        }
        tracing::info!("$ {} -o {} -d {}", self.program, archive.display(), dest.display());
        let status = Command::new(&self.program)
            .arg("-o")
            .arg(archive)
            .arg("-d")
            .arg(dest)
            .status()
            .await;
        if self.log_group {
            println!("::endgroup::");
        }
        let status = status.with_context(|| format!("Failed to run {}", self.program))?;
        if !status.success() {
            bail!("{} {} failed: {}", self.program, archive.display(), status);
        }
        Ok(())
    }
}

/// Extracts in-process with the `zip` crate.
pub struct ZipExtractor;

impl Extractor for ZipExtractor {
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
            .await
            .context("Extraction task failed")?
    }
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Failed to read zip archive")?;
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let Some(path) = file.enclosed_name() else {
            tracing::warn!("Skipping archive entry with unsafe path {}", file.name());
            continue;
        };
        let out_path: PathBuf = dest.join(path);
        if file.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        io::copy(&mut file, &mut out)
            .with_context(|| format!("Failed to extract {}", out_path.display()))?;
        tracing::debug!("Extracted {}", out_path.display());
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Cursor, Write};

    use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

    use super::*;

    pub fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, contents) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Whether the `unzip` utility can be run on this machine.
    pub fn unzip_available() -> bool {
        std::process::Command::new("unzip").arg("-v").output().is_ok()
    }

    #[tokio::test]
    async fn test_zip_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("report.zip");
        fs::write(&archive, zip_archive(&[("report.md", "Size: 42kb"), ("data/report.json", "{}")]))
            .unwrap();

        ZipExtractor.extract(&archive, dir.path()).await.unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("report.md")).unwrap(), "Size: 42kb");
        assert_eq!(fs::read_to_string(dir.path().join("data/report.json")).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_zip_extractor_skips_unsafe_paths() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("out");
        fs::create_dir(&dest).unwrap();
        let archive = root.path().join("report.zip");
        fs::write(&archive, zip_archive(&[("../escaped.md", "nope"), ("report.md", "ok")]))
            .unwrap();

        ZipExtractor.extract(&archive, &dest).await.unwrap();

        assert!(!root.path().join("escaped.md").exists());
        assert_eq!(fs::read_to_string(dest.join("report.md")).unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_zip_extractor_invalid_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("report.zip");
        fs::write(&archive, b"not a zip").unwrap();
        assert!(ZipExtractor.extract(&archive, dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_unzip_command_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let unzip = UnzipCommand {
            program: "size-report-no-such-unzip".to_string(),
            ..Default::default()
        };
        let err = unzip.extract(&dir.path().join("report.zip"), dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to run"), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unzip_command_failure_status() {
        let dir = tempfile::tempdir().unwrap();
        let unzip = UnzipCommand { program: "false".to_string(), ..Default::default() };
        let err = unzip.extract(&dir.path().join("report.zip"), dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("failed"), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unzip_command_overwrites_report() {
        if !unzip_available() {
            eprintln!("unzip not found, skipping");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.md"), "Size: OLD").unwrap();
        let archive = dir.path().join("report.zip");
        fs::write(&archive, zip_archive(&[("report.md", "Size: 42kb")])).unwrap();

        UnzipCommand::default().extract(&archive, dir.path()).await.unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("report.md")).unwrap(), "Size: 42kb");
    }
}
