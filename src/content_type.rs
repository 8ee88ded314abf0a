use crate::store::{FileStore, StoreChain};
use std::io::{self, Read};
use std::sync::Mutex;

/// Upper bound on the prefix read for content sniffing.
const SNIFF_LEN: usize = 512;

/// Buffers kept around between sniffs.
const POOL_CAP: usize = 8;

/// A pool of scratch buffers for content sniffing.
///
/// Purely an allocation saver: buffer contents carry nothing across uses, a
/// borrowed buffer is fully overwritten before any byte of it is read.
#[derive(Debug)]
pub(crate) struct SniffPool {
    buffers: Mutex<Vec<Vec<u8>>>,
}

impl SniffPool {
    pub(crate) fn new() -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
        }
    }

    fn get(&self) -> Vec<u8> {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        buffers.pop().unwrap_or_else(|| vec![0u8; SNIFF_LEN])
    }

    fn put(&self, buffer: Vec<u8>) {
        let mut buffers = self.buffers.lock().unwrap_or_else(|e| e.into_inner());
        if buffers.len() < POOL_CAP {
            buffers.push(buffer);
        }
    }
}

/// Determines the MIME type of the *uncompressed* logical resource.
///
/// Extension lookup runs first against the logical file name, so `/a.txt`
/// reports `text/plain` even when the bytes on the wire come from
/// `/a.txt.gz`. When the extension is unrecognized, the original file is
/// opened through the store chain and a bounded prefix is sniffed. `None`
/// means the type is indeterminate (no extension match and the original
/// could not be read); callers must not attach encoding headers then.
pub(crate) fn resolve_content_type(
    store: &StoreChain,
    logical_path: &str,
    pool: &SniffPool,
) -> Option<&'static str> {
    if let Some(mime) = mime_guess::from_path(logical_path).first_raw() {
        return Some(mime);
    }

    let mut file = store.open(logical_path).ok()?;
    let mut buffer = pool.get();
    buffer.resize(SNIFF_LEN, 0);
    let result = match read_prefix(&mut file, &mut buffer) {
        Ok(n) => Some(sniff(&buffer[..n])),
        Err(_) => None,
    };
    drop(file);
    pool.put(buffer);
    result
}

/// Fills `buffer` from `reader` as far as possible, returning the number of
/// bytes read. Short reads before EOF are retried.
fn read_prefix(reader: &mut dyn Read, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Guesses a MIME type from a content prefix. Always produces an answer;
/// unrecognized binary data falls back to `application/octet-stream`.
fn sniff(data: &[u8]) -> &'static str {
    let trimmed = trim_leading_whitespace(data);

    const HTML_PREFIXES: &[&str] = &[
        "<!doctype html", "<html", "<head", "<body", "<script", "<iframe", "<div", "<table", "<a",
        "<style", "<title", "<b", "<br", "<p", "<!--",
    ];
    for prefix in HTML_PREFIXES {
        if starts_with_ignore_case(trimmed, prefix.as_bytes()) {
            return "text/html; charset=utf-8";
        }
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    const MAGIC: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"%!PS-Adobe-", "application/postscript"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b\x08", "application/x-gzip"),
        (b"OggS", "application/ogg"),
        (b"\x00\x01\x00\x00", "font/ttf"),
        (b"wOFF", "font/woff"),
        (b"wOF2", "font/woff2"),
    ];
    for (magic, mime) in MAGIC {
        if data.starts_with(magic) {
            return mime;
        }
    }
    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    if data.iter().all(|&b| !is_binary_byte(b)) {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b" \t\n\r\x0c".contains(b))
        .unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Control bytes that never occur in plain text.
fn is_binary_byte(b: u8) -> bool {
    b < 0x09 || ((0x0e..0x20).contains(&b) && b != 0x1b) || b == 0x0b || b == 0x7f
}
