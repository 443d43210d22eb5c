use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// File access used by the pipeline.
pub trait Store {
    /// Opens the clippings export for line-by-line reading.
    fn open_input(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;

    /// Contents of a previously written book file, `None` when absent.
    fn read_existing(&self, path: &Path) -> io::Result<Option<String>>;

    fn ensure_dir(&self, dir: &Path) -> io::Result<()>;

    /// Replaces the whole file.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;
}

pub struct DiskStore;

impl Store for DiskStore {
    fn open_input(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn read_existing(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }
}

#[cfg(test)]
pub use memory::MemoryStore;


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("books");
        let file = nested.join("a.txt");

        assert_eq!(DiskStore.read_existing(&file).unwrap(), None);
        assert!(DiskStore.write_file(&file, "x").is_err());

        DiskStore.ensure_dir(&nested).unwrap();
        DiskStore.ensure_dir(&nested).unwrap();
        DiskStore.write_file(&file, "first").unwrap();
        DiskStore.write_file(&file, "second").unwrap();
        assert_eq!(DiskStore.read_existing(&file).unwrap().as_deref(), Some("second"));

        let mut read = String::new();
        DiskStore.open_input(&file).unwrap().read_to_string(&mut read).unwrap();
        assert_eq!(read, "second");
    }

    #[test]
    fn disk_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskStore.open_input(&dir.path().join("nope.txt")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_requires_dir() {
        let store = MemoryStore::new();
        let path = Path::new("out/a.txt");
        assert!(store.write_file(path, "x").is_err());
        store.ensure_dir(Path::new("out")).unwrap();
        store.write_file(path, "x").unwrap();
        assert_eq!(store.files_in(Path::new("out")), vec![path.to_path_buf()]);
    }
}
