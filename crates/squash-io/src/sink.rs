//! Where finished files go.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Receives an encoded file under a suggested name.
pub trait DownloadSink {
    /// Take ownership of `bytes` as `file_name`.
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> io::Result<()>;
}

/// Writes each delivery to `<dir>/<file_name>`, creating `dir` on demand.
///
/// The file is written to a temporary name and renamed into place, so a
/// failed write never leaves a partial file under the final name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `file_name` would be written.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> io::Result<()> {
        if Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a plain file name: {file_name:?}"),
            ));
        }
        fs::create_dir_all(&self.dir)?;

        let target = self.path_for(file_name);
        let partial = self.dir.join(format!(".{file_name}.part"));
        if let Err(e) = fs::write(&partial, &bytes).and_then(|()| fs::rename(&partial, &target)) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        tracing::info!(path = %target.display(), bytes = bytes.len(), "wrote file");
        Ok(())
    }
}

/// Keeps deliveries in memory, keyed by file name. A repeated name replaces
/// the earlier file.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes delivered under `file_name`.
    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.files.get(file_name).map(Vec::as_slice)
    }

    /// Delivered names in sorted order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of distinct files held.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True before the first delivery.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> io::Result<()> {
        self.files.insert(file_name.to_string(), bytes);
        Ok(())
    }
}

impl<S: DownloadSink + ?Sized> DownloadSink for &mut S {
    fn deliver(&mut self, file_name: &str, bytes: Vec<u8>) -> io::Result<()> {
        (**self).deliver(file_name, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_sink_writes_and_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(tmp.path().join("renders"));
        sink.deliver("a.wav", vec![1, 2, 3]).unwrap();

        assert_eq!(fs::read(sink.path_for("a.wav")).unwrap(), vec![1, 2, 3]);
        let names: Vec<_> = fs::read_dir(sink.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["a.wav"]);
    }

    #[test]
    fn directory_sink_rejects_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(tmp.path());
        let err = sink.deliver("../escape.wav", vec![0]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(!tmp.path().join("../escape.wav").exists());
    }

    #[test]
    fn memory_sink_replaces_by_name() {
        let mut sink = MemorySink::new();
        sink.deliver("x.wav", vec![1]).unwrap();
        sink.deliver("x.wav", vec![2]).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("x.wav"), Some(&[2u8][..]));
        assert_eq!(sink.file_names().collect::<Vec<_>>(), vec!["x.wav"]);
    }
}
