pub mod book;
pub mod merge;
pub mod normalize;
pub mod reader;
pub mod writer;

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ClippingsError, Result};
use crate::store::Store;
use book::{BookRecord, Books};

/// What happens to a book file left by an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keep its blocks, after the ones parsed now.
    Merge,
    /// Replace it.
    Overwrite,
}

impl Mode {
    pub fn from_merge_flag(merge: bool) -> Self {
        if merge {
            Mode::Merge
        } else {
            Mode::Overwrite
        }
    }
}

#[derive(Debug, Clone)]
pub struct Written {
    pub header: String,
    pub path: PathBuf,
    pub blocks: usize,
    /// Blocks recovered from the prior file that this run did not see.
    pub merged: usize,
}

/// Reads and groups the whole clippings export. Nothing is written.
pub fn load<S: Store>(store: &S, input: &Path) -> Result<Books> {
    let stream = store.open_input(input).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ClippingsError::InputNotFound(input.to_path_buf()),
        _ => ClippingsError::io(input, e),
    })?;
    reader::read_books(stream).map_err(|e| ClippingsError::io(input, e))
}

/// Writes one book, folding in its previous file first when merging.
pub fn write_book<S: Store>(
    store: &S,
    output_dir: &Path,
    header: &str,
    mut record: BookRecord,
    mode: Mode,
) -> Result<Written> {
    let path = writer::output_path(output_dir, header);

    let mut merged = 0;
    if mode == Mode::Merge {
        let existing = store
            .read_existing(&path)
            .map_err(|e| ClippingsError::io(&path, e))?;
        if let Some(content) = existing {
            merged = merge::merge_existing(&mut record, &content);
        }
    }

    store
        .ensure_dir(output_dir)
        .map_err(|e| ClippingsError::io(output_dir, e))?;
    store
        .write_file(&path, &writer::render(header, &record))
        .map_err(|e| ClippingsError::io(&path, e))?;

    info!(header, path = %path.display(), blocks = record.len(), merged, "book written");
    Ok(Written {
        header: header.to_string(),
        path,
        blocks: record.len(),
        merged,
    })
}

/// Full run: read `input`, write one file per book into `output_dir`.
/// Returns the number of books.
pub fn parse<S: Store>(store: &S, input: &Path, output_dir: &Path, mode: Mode) -> Result<usize> {
    parse_with(store, input, output_dir, mode, |_| {})
}

/// Same as [`parse`], calling `on_written` after each book file.
pub fn parse_with<S, F>(
    store: &S,
    input: &Path,
    output_dir: &Path,
    mode: Mode,
    mut on_written: F,
) -> Result<usize>
where
    S: Store,
    F: FnMut(&Written),
{
    let books = load(store, input)?;
    let count = books.len();

    store
        .ensure_dir(output_dir)
        .map_err(|e| ClippingsError::io(output_dir, e))?;

    let mut merged = 0;
    for (header, record) in books {
        let written = write_book(store, output_dir, &header, record, mode)?;
        merged += written.merged;
        on_written(&written);
    }

    info!(books = count, merged, ?mode, output = %output_dir.display(), "parse complete");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DiskStore, MemoryStore};

    const SAMPLE: &str = "My Book (Jane Doe)\nThis is a highlight.\n==========\n\
                          My Book (Jane Doe)\nThis is a highlight.\n==========\n";

    fn out() -> &'static Path {
        Path::new("out")
    }

    fn store_with(input: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store.insert("clippings.txt", input);
        store
    }

    fn run(store: &MemoryStore, mode: Mode) -> usize {
        parse(store, Path::new("clippings.txt"), out(), mode).unwrap()
    }

    fn book_file(store: &MemoryStore, header: &str) -> String {
        store.get(&writer::output_path(out(), header)).unwrap()
    }

    #[test]
    fn end_to_end_dedup() {
        let store = store_with(SAMPLE);
        assert_eq!(run(&store, Mode::Merge), 1);
        let files = store.files_in(out());
        assert_eq!(files.len(), 1);
        let content = store.get(&files[0]).unwrap();
        assert!(content.starts_with("My Book, Jane Doe\n\n"));
        assert_eq!(content.matches("This is a highlight.\n").count(), 1);
    }

    #[test]
    fn separate_headers_get_separate_files() {
        let store = store_with("H1\nfirst\n==========\nH2\nother\n==========\nH1\nlater\n==========\n");
        assert_eq!(run(&store, Mode::Overwrite), 2);
        assert_eq!(book_file(&store, "H1"), "H1, \n\nfirst\n\nlater\n\n");
        assert_eq!(book_file(&store, "H2"), "H2, \n\nother\n\n");
    }

    #[test]
    fn merge_keeps_old_blocks_after_new() {
        let header = "My Book (Jane Doe)";
        let store = store_with("My Book (Jane Doe)\nB_old\n==========\n");
        run(&store, Mode::Merge);

        store.insert("clippings.txt", "My Book (Jane Doe)\nB_new\n==========\n");
        run(&store, Mode::Merge);
        assert_eq!(book_file(&store, header), "My Book, Jane Doe\n\nB_new\n\nB_old\n\n");
    }

    #[test]
    fn overwrite_drops_old_blocks() {
        let header = "My Book (Jane Doe)";
        let store = store_with("My Book (Jane Doe)\nB_old\n==========\n");
        run(&store, Mode::Overwrite);

        store.insert("clippings.txt", "My Book (Jane Doe)\nB_new\n==========\n");
        run(&store, Mode::Overwrite);
        assert_eq!(book_file(&store, header), "My Book, Jane Doe\n\nB_new\n\n");
    }

    #[test]
    fn rerun_is_idempotent() {
        let store = store_with(SAMPLE);
        run(&store, Mode::Merge);
        let first = store.get(&store.files_in(out())[0]).unwrap();
        run(&store, Mode::Merge);
        let second = store.get(&store.files_in(out())[0]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn multi_line_blocks_survive_merge() {
        let store = store_with("Book (A)\n- Your Highlight on page 3\n\nQuote text.\n==========\n");
        run(&store, Mode::Merge);
        store.insert("clippings.txt", "Book (A)\nFresh.\n==========\n");
        run(&store, Mode::Merge);
        assert_eq!(
            book_file(&store, "Book (A)"),
            "Book, A\n\nFresh.\n\n- Your Highlight on page 3\nQuote text.\n\n"
        );
    }

    #[test]
    fn missing_input_writes_nothing() {
        let store = MemoryStore::new();
        let err = parse(&store, Path::new("missing.txt"), out(), Mode::Merge).unwrap_err();
        assert!(matches!(err, ClippingsError::InputNotFound(ref p) if p == Path::new("missing.txt")));
        assert!(store.files_in(out()).is_empty());
    }

    #[test]
    fn progress_callback_sees_each_book() {
        let store = store_with("A\n1\n==========\nB\n2\n==========\nA\n3\n==========\n");
        let mut seen = Vec::new();
        let n = parse_with(&store, Path::new("clippings.txt"), out(), Mode::Merge, |w| {
            seen.push((w.header.clone(), w.path.clone(), w.blocks))
        })
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            seen,
            vec![
                ("A".to_string(), writer::output_path(out(), "A"), 2),
                ("B".to_string(), writer::output_path(out(), "B"), 1),
            ]
        );
        assert!(store.get(&seen[0].1).unwrap().starts_with("A, \n\n1\n\n3\n"));
    }

    #[test]
    fn disk_pipeline_with_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("Parsed Annotations");
        let input = Path::new("tests/fixtures/my_clippings.txt");

        let n = parse(&DiskStore, input, &output, Mode::Merge).unwrap();
        assert_eq!(n, 3);

        let meditations = writer::output_path(&output, "Meditations (Marcus Aurelius)");
        let content = std::fs::read_to_string(&meditations).unwrap();
        assert!(content.starts_with("Meditations, Marcus Aurelius\n\n"));
        assert_eq!(content.matches("You have power over your mind").count(), 1);

        let again = parse(&DiskStore, input, &output, Mode::Merge).unwrap();
        assert_eq!(again, 3);
        assert_eq!(std::fs::read_to_string(&meditations).unwrap(), content);
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 3);
    }

    #[test]
    fn disk_missing_input_is_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let err = parse(&DiskStore, &dir.path().join("nope.txt"), &output, Mode::Merge).unwrap_err();
        assert!(matches!(err, ClippingsError::InputNotFound(_)));
        assert!(!output.exists());
    }
}
