use super::{DirEntry, EntryType, ExecutionTarget, Interrupted};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<Vec<u8>>,
    pub entry_type: EntryType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnzipFailure {
    Interrupted,
    Corrupt,
}

#[derive(Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    archives: HashMap<PathBuf, Vec<(String, String)>>,
    read_only: HashSet<PathBuf>,
    undeletable: HashSet<PathBuf>,
    unzip_failure: Option<UnzipFailure>,
}

/// In-memory target that can impersonate a remote agent of any OS.
pub struct MockTarget {
    state: Arc<RwLock<MockState>>,
    remote: bool,
    os_name: Option<String>,
    os_arch: String,
    home: PathBuf,
    cwd: PathBuf,
}

impl MockTarget {
    /// A local-looking linux target with home `/home/jenkins`
    pub fn new() -> Self {
        let target = Self {
            state: Arc::new(RwLock::new(MockState::default())),
            remote: false,
            os_name: Some("linux".to_string()),
            os_arch: "x86_64".to_string(),
            home: PathBuf::from("/home/jenkins"),
            cwd: PathBuf::from("/work"),
        };
        target.add_dir("/home/jenkins");
        target
    }

    pub fn remote(os_name: &str, os_arch: &str) -> Self {
        Self {
            remote: true,
            os_name: Some(os_name.to_string()),
            os_arch: os_arch.to_string(),
            ..Self::new()
        }
    }

    /// OS probing fails as if the agent connection dropped
    pub fn without_os_probe(mut self) -> Self {
        self.os_name = None;
        self
    }

    pub fn with_home(self, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        self.add_dir(&home);
        Self { home, ..self }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut state = self.state.write().unwrap();
        if let Some(parent) = path.parent() {
            ensure_parents(&mut state.entries, parent);
        }
        state.entries.insert(
            path,
            MockEntry {
                content: Some(content.as_bytes().to_vec()),
                entry_type: EntryType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut state = self.state.write().unwrap();
        ensure_parents(&mut state.entries, &path);
    }

    /// Register `path` as a zip archive holding `entries` (names ending in
    /// `/` are directories)
    pub fn add_archive(&self, path: impl AsRef<Path>, entries: &[(&str, &str)]) {
        let path = self.normalize_path(path.as_ref());
        self.add_file(&path, "PK");
        self.register_archive(&path, entries);
    }

    /// Describe what unzipping `path` produces once something writes it
    pub fn register_archive(&self, path: impl AsRef<Path>, entries: &[(&str, &str)]) {
        let path = self.normalize_path(path.as_ref());
        let entries = entries
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();
        self.state.write().unwrap().archives.insert(path, entries);
    }

    /// New files cannot be created inside `dir`
    pub fn deny_writes(&self, dir: impl AsRef<Path>) {
        let dir = self.normalize_path(dir.as_ref());
        self.state.write().unwrap().read_only.insert(dir);
    }

    /// Files inside `dir` cannot be deleted
    pub fn deny_deletes(&self, dir: impl AsRef<Path>) {
        let dir = self.normalize_path(dir.as_ref());
        self.state.write().unwrap().undeletable.insert(dir);
    }

    pub fn fail_unzip(&self, failure: UnzipFailure) {
        self.state.write().unwrap().unzip_failure = Some(failure);
    }

    pub fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.state
            .read()
            .unwrap()
            .entries
            .get(&path)
            .map(|e| e.entry_type == EntryType::File)
            .unwrap_or(false)
    }

    /// Every path currently present, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.state.read().unwrap().entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

impl Default for MockTarget {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_parents(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        entries.entry(current.clone()).or_insert(MockEntry {
            content: None,
            entry_type: EntryType::Directory,
        });
    }
}

struct MockWriter {
    path: PathBuf,
    state: Arc<RwLock<MockState>>,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.write().unwrap();
        let entry = state
            .entries
            .get_mut(&self.path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file was removed"))?;
        entry.content.get_or_insert_with(Vec::new).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ExecutionTarget for MockTarget {
    fn is_remote(&self) -> bool {
        self.remote
    }

    fn os_name(&self) -> Result<String> {
        self.os_name
            .clone()
            .ok_or_else(|| anyhow!("Remote call on agent channel failed"))
    }

    fn os_arch(&self) -> Result<String> {
        Ok(self.os_arch.clone())
    }

    fn home_dir(&self) -> Result<PathBuf> {
        Ok(self.home.clone())
    }

    fn absolutize(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.normalize_path(path))
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.state.read().unwrap().entries.contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.state
            .read()
            .unwrap()
            .entries
            .get(&path)
            .map(|e| e.entry_type == EntryType::Directory)
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn create_temp_file(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        let dir = self.normalize_path(dir);
        if self.state.read().unwrap().read_only.contains(&dir) {
            return Err(anyhow!("Permission denied: {:?}", dir));
        }
        let path = dir.join(format!("{}{}.tmp", prefix, uuid::Uuid::new_v4()));
        self.add_file(&path, "");
        Ok(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn Write + Send>> {
        let path = self.normalize_path(path);
        if let Some(parent) = path.parent() {
            if self.state.read().unwrap().read_only.contains(parent) {
                return Err(anyhow!("Permission denied: {:?}", path));
            }
        }
        self.add_file(&path, "");
        Ok(Box::new(MockWriter {
            path,
            state: Arc::clone(&self.state),
        }))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        let state = self.state.read().unwrap();
        let entry = state
            .entries
            .get(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        let content = entry
            .content
            .clone()
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))?;
        Ok(String::from_utf8(content)?)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        let mut state = self.state.write().unwrap();
        if let Some(parent) = path.parent() {
            if state.undeletable.contains(parent) {
                return Err(anyhow!("Permission denied: {:?}", path));
            }
        }
        match state.entries.get(&path) {
            Some(entry) if entry.entry_type == EntryType::File => {
                state.entries.remove(&path);
                Ok(())
            }
            Some(_) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        let mut state = self.state.write().unwrap();
        if !state.entries.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }
        state.entries.retain(|p, _| !p.starts_with(&path));
        Ok(())
    }

    fn list_directories(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let state = self.state.read().unwrap();
        if !state.entries.contains_key(&path) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let mut result: Vec<DirEntry> = state
            .entries
            .iter()
            .filter(|(p, e)| e.entry_type == EntryType::Directory && p.parent() == Some(&path))
            .map(|(p, e)| DirEntry {
                path: p.clone(),
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                entry_type: e.entry_type,
            })
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = self.normalize_path(from);
        let to = self.normalize_path(to);
        let mut state = self.state.write().unwrap();
        if !state.entries.contains_key(&from) {
            return Err(anyhow!("Path not found: {:?}", from));
        }
        let moved: Vec<(PathBuf, MockEntry)> = state
            .entries
            .iter()
            .filter(|(p, _)| p.starts_with(&from))
            .map(|(p, e)| (p.clone(), e.clone()))
            .collect();
        for (old, entry) in moved {
            state.entries.remove(&old);
            let suffix = old.strip_prefix(&from).unwrap_or(Path::new(""));
            state.entries.insert(to.join(suffix), entry);
        }
        Ok(())
    }

    fn unzip(&self, archive: &Path, dest: &Path) -> Result<()> {
        let archive = self.normalize_path(archive);
        let dest = self.normalize_path(dest);

        let (failure, entries) = {
            let state = self.state.read().unwrap();
            (state.unzip_failure, state.archives.get(&archive).cloned())
        };
        match failure {
            Some(UnzipFailure::Interrupted) => return Err(Interrupted("unzip".to_string()).into()),
            Some(UnzipFailure::Corrupt) => return Err(anyhow!("Invalid zip archive: {:?}", archive)),
            None => {}
        }
        if !self.exists(&archive) {
            return Err(anyhow!("Archive not found: {:?}", archive));
        }
        let entries = entries.ok_or_else(|| anyhow!("Invalid zip archive: {:?}", archive))?;

        for (name, content) in entries {
            if let Some(dir) = name.strip_suffix('/') {
                self.add_dir(dest.join(dir));
            } else {
                self.add_file(dest.join(&name), &content);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_creates_parents() {
        let target = MockTarget::new();
        target.add_file("/opt/a/b/file.txt", "content");

        assert!(target.is_dir(Path::new("/opt/a")));
        assert!(target.is_dir(Path::new("/opt/a/b")));
        assert!(target.is_file(Path::new("/opt/a/b/file.txt")));
    }

    #[test]
    fn test_remote_target_reports_os() {
        let target = MockTarget::remote("Windows Server 2022", "amd64");
        assert!(target.is_remote());
        assert_eq!(target.os_name().unwrap(), "Windows Server 2022");
    }

    #[test]
    fn test_without_os_probe_fails() {
        let target = MockTarget::remote("linux", "amd64").without_os_probe();
        assert!(target.os_name().is_err());
    }

    #[test]
    fn test_deny_writes_blocks_probe() {
        let target = MockTarget::new();
        target.add_dir("/readonly/parent");
        target.deny_writes("/readonly/parent");

        assert!(target.create_temp_file(Path::new("/readonly/parent"), "temp").is_err());
    }

    #[test]
    fn test_deny_deletes_keeps_file() {
        let target = MockTarget::new();
        target.add_dir("/readonly/parent");
        target.deny_deletes("/readonly/parent");

        let probe = target.create_temp_file(Path::new("/readonly/parent"), "temp").unwrap();
        assert!(target.remove_file(&probe).is_err());
        assert!(target.exists(&probe));
    }

    #[test]
    fn test_create_file_collects_writes() {
        let target = MockTarget::new();
        target.add_dir("/downloads");
        {
            let mut writer = target.create_file(Path::new("/downloads/bundle.zip")).unwrap();
            writer.write_all(b"PK").unwrap();
            writer.write_all(b"data").unwrap();
        }
        assert_eq!(
            target.read_to_string(Path::new("/downloads/bundle.zip")).unwrap(),
            "PKdata"
        );
    }

    #[test]
    fn test_rename_moves_subtree() {
        let target = MockTarget::new();
        target.add_file("/opt/bridge-cli-bundle-1.0.0/bridge-cli", "bin");

        target
            .rename(
                Path::new("/opt/bridge-cli-bundle-1.0.0"),
                Path::new("/opt/bridge-cli-bundle"),
            )
            .unwrap();

        assert!(!target.exists(Path::new("/opt/bridge-cli-bundle-1.0.0")));
        assert!(target.is_file(Path::new("/opt/bridge-cli-bundle/bridge-cli")));
    }

    #[test]
    fn test_unzip_registered_archive() {
        let target = MockTarget::new();
        target.add_archive(
            "/opt/bundle.zip",
            &[("bridge-cli-bundle-linux64/", ""), ("bridge-cli-bundle-linux64/bridge-cli", "bin")],
        );

        target.unzip(Path::new("/opt/bundle.zip"), Path::new("/opt")).unwrap();

        let dirs = target.list_directories(Path::new("/opt")).unwrap();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].file_name(), "bridge-cli-bundle-linux64");
    }

    #[test]
    fn test_unzip_failure_modes() {
        let target = MockTarget::new();
        target.add_archive("/opt/bundle.zip", &[]);

        target.fail_unzip(UnzipFailure::Interrupted);
        let err = target.unzip(Path::new("/opt/bundle.zip"), Path::new("/opt")).unwrap_err();
        assert!(err.downcast_ref::<Interrupted>().is_some());

        target.fail_unzip(UnzipFailure::Corrupt);
        let err = target.unzip(Path::new("/opt/bundle.zip"), Path::new("/opt")).unwrap_err();
        assert!(err.downcast_ref::<Interrupted>().is_none());
    }
}
