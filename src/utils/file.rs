//! File handles with transparent compression
//!
//! Paths ending in `.gz` are read and written through gzip, paths ending in
//! `.bz2` through bzip2, anything else as a plain buffered file. An already
//! open handle is passed through untouched.

use crate::error::InputError;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Compression applied to a file, chosen from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gzip,
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    Write,
    Append,
}

impl FromStr for FileMode {
    type Err = InputError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "r" | "rb" | "rt" => Ok(FileMode::Read),
            "w" | "wb" | "wt" => Ok(FileMode::Write),
            "a" | "ab" | "at" => Ok(FileMode::Append),
            other => Err(InputError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// An open file handle, either side
pub enum FileHandle {
    Reader(Box<dyn BufRead + Send>),
    Writer(FileWriter),
}

impl FileHandle {
    /// Wrap a caller-provided sink so it can be passed around as a handle
    pub fn from_writer(sink: Box<dyn Write + Send>) -> Self {
        FileHandle::Writer(FileWriter::new(sink, Compression::None, "<handle>"))
    }

    pub fn is_reader(&self) -> bool {
        matches!(self, FileHandle::Reader(_))
    }

    pub fn into_reader(self) -> Option<Box<dyn BufRead + Send>> {
        match self {
            FileHandle::Reader(reader) => Some(reader),
            FileHandle::Writer(_) => None,
        }
    }

    pub fn into_writer(self) -> Option<FileWriter> {
        match self {
            FileHandle::Writer(writer) => Some(writer),
            FileHandle::Reader(_) => None,
        }
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileHandle::Reader(_) => write!(f, "FileHandle::Reader"),
            FileHandle::Writer(writer) => write!(f, "FileHandle::Writer({})", writer.label),
        }
    }
}

enum Encoder {
    Plain(BufWriter<Box<dyn Write + Send>>),
    Gzip(GzEncoder<Box<dyn Write + Send>>),
    Bzip2(BzEncoder<Box<dyn Write + Send>>),
}

/// Writer that compresses according to [`Compression`].
///
/// Call [`FileWriter::finish`] when done. Dropping the writer still ends a
/// compressed stream, but any error writing its trailer is lost.
pub struct FileWriter {
    label: String,
    encoder: Encoder,
}

impl FileWriter {
    pub fn new(
        sink: Box<dyn Write + Send>,
        compression: Compression,
        label: impl Into<String>,
    ) -> Self {
        let encoder = match compression {
            Compression::None => Encoder::Plain(BufWriter::new(sink)),
            Compression::Gzip => Encoder::Gzip(GzEncoder::new(sink, flate2::Compression::default())),
            Compression::Bzip2 => {
                Encoder::Bzip2(BzEncoder::new(sink, bzip2::Compression::default()))
            }
        };
        Self {
            label: label.into(),
            encoder,
        }
    }

    /// Write any buffered data and the compressed stream's trailer
    pub fn finish(self) -> crate::Result<()> {
        let label = self.label;
        let io_error = |source| InputError::Io {
            path: label.clone(),
            source,
        };

        let mut sink = match self.encoder {
            Encoder::Plain(writer) => writer.into_inner().map_err(|e| io_error(e.into_error()))?,
            Encoder::Gzip(encoder) => encoder.finish().map_err(io_error)?,
            Encoder::Bzip2(encoder) => encoder.finish().map_err(io_error)?,
        };
        sink.flush().map_err(io_error)?;
        Ok(())
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.encoder {
            Encoder::Plain(writer) => writer.write(buf),
            Encoder::Gzip(encoder) => encoder.write(buf),
            Encoder::Bzip2(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.encoder {
            Encoder::Plain(writer) => writer.flush(),
            Encoder::Gzip(encoder) => encoder.flush(),
            Encoder::Bzip2(encoder) => encoder.flush(),
        }
    }
}

/// Where a handle comes from: a path to open, or a handle that is already open
#[derive(Debug)]
pub enum FileSource {
    Path(PathBuf),
    Handle(FileHandle),
}

impl From<PathBuf> for FileSource {
    fn from(path: PathBuf) -> Self {
        FileSource::Path(path)
    }
}

impl From<&Path> for FileSource {
    fn from(path: &Path) -> Self {
        FileSource::Path(path.to_path_buf())
    }
}

impl From<&str> for FileSource {
    fn from(path: &str) -> Self {
        FileSource::Path(PathBuf::from(path))
    }
}

impl From<String> for FileSource {
    fn from(path: String) -> Self {
        FileSource::Path(PathBuf::from(path))
    }
}

impl From<FileHandle> for FileSource {
    fn from(handle: FileHandle) -> Self {
        FileSource::Handle(handle)
    }
}

/// Return a file handle for `source` opened in `mode`.
///
/// Handles are returned as given, whatever the mode.
pub fn get_file_handle(source: impl Into<FileSource>, mode: FileMode) -> crate::Result<FileHandle> {
    match source.into() {
        FileSource::Handle(handle) => Ok(handle),
        FileSource::Path(path) => match mode {
            FileMode::Read => open_reader(&path).map(FileHandle::Reader),
            FileMode::Write => open_writer(&path, false).map(FileHandle::Writer),
            FileMode::Append => open_writer(&path, true).map(FileHandle::Writer),
        },
    }
}

pub fn open_reader<P: AsRef<Path>>(path: P) -> crate::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_string_lossy().to_string(),
        source,
    })?;

    Ok(match Compression::from_path(path) {
        Compression::None => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::Bzip2 => Box::new(BufReader::new(MultiBzDecoder::new(file))),
    })
}

/// Open `path` for writing, truncating unless `append` is set.
///
/// Appending to a compressed file adds a new member to the stream.
pub fn open_writer<P: AsRef<Path>>(path: P, append: bool) -> crate::Result<FileWriter> {
    let path = path.as_ref();
    let label = path.to_string_lossy().to_string();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|source| InputError::Open {
            path: label.clone(),
            source,
        })?;

    Ok(FileWriter::new(Box::new(file), Compression::from_path(path), label))
}

/// Read a whole source into a string
pub fn read_to_string(source: impl Into<FileSource>, label: &str) -> crate::Result<String> {
    let mut reader = get_file_handle(source, FileMode::Read)?
        .into_reader()
        .ok_or_else(|| InputError::Io {
            path: label.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "handle is not readable"),
        })?;

    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|source| InputError::Io {
            path: label.to_string(),
            source,
        })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn write_all(path: &Path, append: bool, content: &str) {
        let mut writer = open_writer(path, append).expect("Failed to open writer");
        writer
            .write_all(content.as_bytes())
            .expect("Failed to write content");
        writer.finish().expect("Failed to finish");
    }

    /// Accepts `capacity` bytes, then fails every write
    struct FullDisk {
        capacity: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.capacity == 0 {
                return Err(std::io::Error::other("no space left on device"));
            }
            let written = buf.len().min(self.capacity);
            self.capacity -= written;
            Ok(written)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn read_all(path: &Path) -> String {
        let mut reader = open_reader(path).expect("Failed to open reader");
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .expect("Failed to read content");
        content
    }

    #[test]
    fn test_compression_from_extension() {
        assert_eq!(Compression::from_path(Path::new("a.gz")), Compression::Gzip);
        assert_eq!(
            Compression::from_path(Path::new("dir/a.txt.bz2")),
            Compression::Bzip2
        );
        assert_eq!(Compression::from_path(Path::new("a.txt")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("gz")), Compression::None);
    }

    #[test]
    fn test_file_mode_parsing() {
        assert_eq!("r".parse::<FileMode>().ok(), Some(FileMode::Read));
        assert_eq!("rb".parse::<FileMode>().ok(), Some(FileMode::Read));
        assert_eq!("wb".parse::<FileMode>().ok(), Some(FileMode::Write));
        assert_eq!("a".parse::<FileMode>().ok(), Some(FileMode::Append));
        assert!(matches!(
            "x+".parse::<FileMode>(),
            Err(InputError::InvalidMode { .. })
        ));
    }

    #[test]
    fn test_plain_file_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("plain.txt");
        write_all(&path, false, "hello\n");
        assert_eq!(read_all(&path), "hello\n");
        assert_eq!(std::fs::read_to_string(&path).ok(), Some("hello\n".to_string()));
    }

    #[test]
    fn test_gzip_file_is_compressed_on_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("data.txt.gz");
        write_all(&path, false, "compressed text");

        let raw = std::fs::read(&path).expect("Failed to read raw bytes");
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(read_all(&path), "compressed text");
    }

    #[test]
    fn test_bzip2_file_is_compressed_on_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("data.txt.bz2");
        write_all(&path, false, "compressed text");

        let raw = std::fs::read(&path).expect("Failed to read raw bytes");
        assert_eq!(&raw[..3], b"BZh");
        assert_eq!(read_all(&path), "compressed text");
    }

    #[test]
    fn test_append_to_gzip_reads_every_member() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("log.gz");
        write_all(&path, false, "one\n");
        write_all(&path, true, "two\n");
        assert_eq!(read_all(&path), "one\ntwo\n");
    }

    #[test]
    fn test_append_to_bzip2_reads_every_member() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("log.bz2");
        write_all(&path, false, "one\n");
        write_all(&path, true, "two\n");
        assert_eq!(read_all(&path), "one\ntwo\n");
    }

    #[test]
    fn test_finish_reports_failed_trailer_write() {
        let text = "a line that is too long to fit once compressed, plus its trailer";
        for compression in [Compression::Gzip, Compression::Bzip2] {
            let mut writer =
                FileWriter::new(Box::new(FullDisk { capacity: 16 }), compression, "full.out");
            writer
                .write_all(text.as_bytes())
                .expect("compressed data is buffered");
            match writer.finish() {
                Err(crate::error::AppError::Input(InputError::Io { path, .. })) => {
                    assert_eq!(path, "full.out");
                }
                other => panic!("Expected InputError::Io for {:?}, got {:?}", compression, other),
            }
        }
    }

    #[test]
    fn test_finish_reports_failed_plain_write() {
        let mut writer =
            FileWriter::new(Box::new(FullDisk { capacity: 0 }), Compression::None, "full.txt");
        writer.write_all(b"buffered").expect("plain data is buffered");
        assert!(writer.finish().is_err());
    }

    #[test]
    fn test_caller_writer_handle_passes_through() {
        let handle = FileHandle::from_writer(Box::new(FullDisk { capacity: 64 }));
        let passed = get_file_handle(handle, FileMode::Read).expect("handles pass through");
        let mut writer = passed.into_writer().expect("still a writer");
        writer.write_all(b"kept").expect("Failed to write");
        writer.finish().expect("Failed to finish");
    }

    #[test]
    fn test_write_mode_truncates() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("notes.txt");
        write_all(&path, false, "a long first version");
        write_all(&path, false, "short");
        assert_eq!(read_all(&path), "short");
    }

    #[test]
    fn test_get_file_handle_by_mode() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("handle.bz2");

        let handle = get_file_handle(path.clone(), FileMode::Write).expect("Failed to open");
        assert!(!handle.is_reader());
        let mut writer = handle.into_writer().expect("write mode gives a writer");
        writer.write_all(b"payload").expect("Failed to write");
        writer.finish().expect("Failed to finish");

        let handle = get_file_handle(path.as_path(), FileMode::Read).expect("Failed to open");
        assert!(handle.is_reader());
        let mut content = String::new();
        if let Some(mut reader) = handle.into_reader() {
            reader
                .read_to_string(&mut content)
                .expect("Failed to read");
        }
        assert_eq!(content, "payload");
    }

    #[test]
    fn test_open_handles_pass_through() {
        let handle = FileHandle::Reader(Box::new(Cursor::new(b"already open".to_vec())));
        let content = read_to_string(handle, "<memory>").expect("Failed to read handle");
        assert_eq!(content, "already open");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("missing.gz");
        match open_reader(&path) {
            Err(crate::error::AppError::Input(InputError::Open { path: reported, .. })) => {
                assert!(reported.ends_with("missing.gz"));
            }
            other => panic!("Expected InputError::Open, got {:?}", other.err()),
        }
    }
}
