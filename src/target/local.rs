use super::{DirEntry, EntryType, ExecutionTarget, Interrupted};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs every operation in the current process.
#[derive(Default)]
pub struct LocalTarget {
    cancel: Option<Arc<AtomicBool>>,
}

impl LocalTarget {
    pub fn new() -> Self {
        Self { cancel: None }
    }

    /// Long-running operations stop once `flag` becomes true
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        Self { cancel: Some(flag) }
    }

    fn check_cancelled(&self, operation: &str) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                Err(Interrupted(operation.to_string()).into())
            }
            _ => Ok(()),
        }
    }
}

impl ExecutionTarget for LocalTarget {
    fn is_remote(&self) -> bool {
        false
    }

    fn os_name(&self) -> Result<String> {
        Ok(std::env::consts::OS.to_string())
    }

    fn os_arch(&self) -> Result<String> {
        Ok(std::env::consts::ARCH.to_string())
    }

    fn home_dir(&self) -> Result<PathBuf> {
        dirs::home_dir().context("Failed to determine the user home directory")
    }

    fn absolutize(&self, path: &Path) -> Result<PathBuf> {
        std::path::absolute(path).context(format!("Failed to absolutize path {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).context(format!("Failed to create directory {:?}", path))
    }

    fn create_temp_file(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{}{}.tmp", prefix, uuid::Uuid::new_v4()));
        fs::File::create_new(&path).context(format!("Failed to create file {:?}", path))?;
        Ok(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let file = fs::File::create(path).context(format!("Failed to create file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context(format!("Failed to delete file {:?}", path))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).context(format!("Failed to delete directory {:?}", path))
    }

    fn list_directories(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            result.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
                entry_type: EntryType::Directory,
            });
        }

        Ok(result)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).context(format!("Failed to rename {:?} to {:?}", from, to))
    }

    fn unzip(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = fs::File::open(archive).context(format!("Failed to open archive {:?}", archive))?;
        let mut zip = zip::ZipArchive::new(io::BufReader::new(file))
            .context(format!("Failed to read zip archive {:?}", archive))?;

        for i in 0..zip.len() {
            self.check_cancelled("unzip")?;

            let mut entry = zip.by_index(i).context("Failed to read zip entry")?;
            let relative = entry
                .enclosed_name()
                .ok_or_else(|| anyhow!("Zip entry escapes destination: {}", entry.name()))?;
            let out_path = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)
                    .context(format!("Failed to create directory {:?}", out_path))?;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)
                    .context(format!("Failed to create directory {:?}", parent))?;
            }
            let mut out = fs::File::create(&out_path)
                .context(format!("Failed to create file {:?}", out_path))?;
            io::copy(&mut entry, &mut out).context(format!("Failed to extract {:?}", out_path))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                    .context(format!("Failed to set permissions on {:?}", out_path))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_os_name_is_reported() {
        let target = LocalTarget::new();
        assert!(!target.is_remote());
        assert!(!target.os_name().unwrap().is_empty());
        assert!(!target.os_arch().unwrap().is_empty());
    }

    #[test]
    fn test_absolutize_relative_path() {
        let target = LocalTarget::new();
        let path = target.absolutize(Path::new("relative/dir")).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("relative/dir"));
    }

    #[test]
    fn test_create_temp_file_is_unique() {
        let temp = TempDir::new().unwrap();
        let target = LocalTarget::new();

        let first = target.create_temp_file(temp.path(), "probe").unwrap();
        let second = target.create_temp_file(temp.path(), "probe").unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        target.remove_file(&first).unwrap();
        assert!(!first.exists());
    }

    #[test]
    fn test_list_directories_skips_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("bridge-cli-bundle-1.0.0")).unwrap();
        fs::write(temp.path().join("bridge.zip"), "zip").unwrap();

        let target = LocalTarget::new();
        let dirs = target.list_directories(temp.path()).unwrap();

        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].file_name(), "bridge-cli-bundle-1.0.0");
    }

    #[test]
    fn test_unzip_extracts_nested_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(
            &archive,
            &[
                ("bridge-cli-bundle-linux64/", ""),
                ("bridge-cli-bundle-linux64/bridge-cli", "#!/bin/sh\n"),
                ("bridge-cli-bundle-linux64/versions.txt", "bridge-cli-bundle: 2.1.0\n"),
            ],
        );

        let dest = temp.path().join("out");
        let target = LocalTarget::new();
        target.unzip(&archive, &dest).unwrap();

        assert!(dest.join("bridge-cli-bundle-linux64").is_dir());
        assert_eq!(
            fs::read_to_string(dest.join("bridge-cli-bundle-linux64/versions.txt")).unwrap(),
            "bridge-cli-bundle: 2.1.0\n"
        );
    }

    #[test]
    fn test_unzip_rejects_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, "not a zip").unwrap();

        let target = LocalTarget::new();
        assert!(target.unzip(&archive, temp.path()).is_err());
    }

    #[test]
    fn test_unzip_honours_cancel_flag() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("bundle.zip");
        write_zip(&archive, &[("bridge-cli-bundle-mac/bridge-cli", "bin")]);

        let flag = Arc::new(AtomicBool::new(true));
        let target = LocalTarget::with_cancel_flag(flag);
        let err = target.unzip(&archive, temp.path()).unwrap_err();

        assert!(err.downcast_ref::<Interrupted>().is_some());
        assert!(!temp.path().join("bridge-cli-bundle-mac").exists());
    }
}
