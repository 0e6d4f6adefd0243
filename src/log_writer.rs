use std::{
    fs::File,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

/// Log file opened for appending. Created if it does not exist.
#[derive(Debug)]
pub struct LogFile {
    file: File,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let file = File::options().create(true).append(true).open(&path)?;
        Ok(Self { file })
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[test]
fn test_log_file() {
    let path = "/tmp/simplelog_test_log_file.log";
    std::fs::remove_file(path).ok();
    let mut log_file = LogFile::new(path).unwrap();
    log_file.write_all(b"Hello, world!\n").unwrap();
    drop(log_file);
    let mut log_file = LogFile::new(path).unwrap();
    log_file.write_all(b"rust is awesome !\n").unwrap();
    log_file.flush().unwrap();
    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "Hello, world!\nrust is awesome !\n"
    );
}

/// In-memory sink. Clones append to the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_shared_buffer() {
    let buffer = SharedBuffer::new();
    let mut writer = buffer.clone();
    assert!(buffer.is_empty());
    writer.write_all(b"lorem ").unwrap();
    writer.write_all(b"ipsum\n").unwrap();
    assert_eq!(buffer.contents(), "lorem ipsum\n");
    buffer.clear();
    assert!(writer.is_empty());
}
