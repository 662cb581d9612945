//! Shared fixtures: real bundle archives, a canned downloader and a runner
//! that records what the bridge would have been given.

#![allow(dead_code)]

use scanbridge::bridge::{
    ArtifactDownloader, BridgeExit, BridgeInvocation, BridgeRunner, DownloadError, RunError,
};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use zip::write::SimpleFileOptions;

pub const LATEST_URL: &str =
    "https://repo.example/bridge-cli-bundle/latest/bridge-cli-bundle-linux64.zip";

pub fn executable_name() -> &'static str {
    if cfg!(windows) {
        "bridge-cli.exe"
    } else {
        "bridge-cli"
    }
}

/// Zip bytes holding `folders`, each a versioned bundle folder with an
/// executable and a `versions.txt` for `version`
pub fn bundle_zip(folders: &[&str], version: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for folder in folders {
        writer
            .add_directory(format!("{}/", folder), SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file(
                format!("{}/{}", folder, executable_name()),
                SimpleFileOptions::default().unix_permissions(0o755),
            )
            .unwrap();
        writer.write_all(b"#!/bin/sh\nexit 0\n").unwrap();
        writer
            .start_file(format!("{}/versions.txt", folder), SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(format!("bridge-cli-bundle: {}\n", version).as_bytes())
            .unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Serves one archive and one server-side `versions.txt`, counting downloads
pub struct CannedDownloader {
    archive: Vec<u8>,
    latest_version: Mutex<String>,
    downloads: AtomicUsize,
}

impl CannedDownloader {
    pub fn new(archive: Vec<u8>, latest_version: &str) -> Self {
        Self {
            archive,
            latest_version: Mutex::new(latest_version.to_string()),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn publish(&self, version: &str) {
        *self.latest_version.lock().unwrap() = version.to_string();
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl ArtifactDownloader for CannedDownloader {
    fn download(&self, _url: &str, mut sink: Box<dyn Write + Send>) -> Result<u64, DownloadError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        sink.write_all(&self.archive)
            .map_err(|e| DownloadError::Write(e.to_string()))?;
        Ok(self.archive.len() as u64)
    }

    fn fetch_text(&self, _url: &str) -> Result<String, DownloadError> {
        Ok(format!(
            "bridge-cli-bundle: {}\n",
            self.latest_version.lock().unwrap()
        ))
    }
}

/// Returns a fixed exit code and keeps each invocation with the input JSON
/// it pointed at
pub struct RecordingRunner {
    code: i32,
    calls: Mutex<Vec<(BridgeInvocation, serde_json::Value)>>,
}

impl RecordingRunner {
    pub fn exiting(code: i32) -> Self {
        Self {
            code,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(BridgeInvocation, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl BridgeRunner for RecordingRunner {
    fn run(&self, invocation: &BridgeInvocation) -> Result<BridgeExit, RunError> {
        let content = fs::read_to_string(&invocation.input_file).map_err(|e| RunError::Input {
            path: invocation.input_file.clone(),
            reason: e.to_string(),
        })?;
        let input: serde_json::Value = serde_json::from_str(&content).unwrap();
        self.calls.lock().unwrap().push((invocation.clone(), input));
        Ok(BridgeExit {
            code: self.code,
            message: format!("bridge-cli exited with code {}", self.code),
        })
    }
}

/// Sorted relative paths of everything under `root`
pub fn tree(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            out.push(path.strip_prefix(root).unwrap().to_path_buf());
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
