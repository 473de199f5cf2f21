//! Content pool: fixed-size byte chunks reused across rendered pages.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug)]
pub struct ContentPool {
    chunk_size: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl ContentPool {
    pub fn new(chunk_size: usize) -> Arc<Self> {
        Arc::new(Self {
            chunk_size: chunk_size.max(1),
            free: Mutex::new(Vec::new()),
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunks waiting for reuse.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn acquire(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.chunk_size))
    }

    fn release(&self, mut chunks: Vec<Vec<u8>>) {
        for chunk in &mut chunks {
            chunk.clear();
        }
        self.free.lock().append(&mut chunks);
    }

    /// Start accumulating one page.
    pub fn content(self: &Arc<Self>) -> PageContent {
        PageContent {
            pool: Arc::clone(self),
            chunks: Vec::new(),
        }
    }
}

/// Page output spread over pool chunks. The chunks go back to the pool
/// when the content is dropped.
#[derive(Debug)]
pub struct PageContent {
    pool: Arc<ContentPool>,
    chunks: Vec<Vec<u8>>,
}

impl PageContent {
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Copy the content out as one contiguous buffer.
    pub fn to_bytes(&self) -> Arc<[u8]> {
        let mut bytes = Vec::with_capacity(self.len());
        for chunk in &self.chunks {
            bytes.extend_from_slice(chunk);
        }
        Arc::from(bytes)
    }
}

impl io::Write for PageContent {
    fn write(&mut self, mut buf: &[u8]) -> io::Result<usize> {
        let written = buf.len();
        let chunk_size = self.pool.chunk_size;
        while !buf.is_empty() {
            let needs_chunk = self
                .chunks
                .last()
                .is_none_or(|chunk| chunk.len() >= chunk_size);
            if needs_chunk {
                self.chunks.push(self.pool.acquire());
            }
            let Some(chunk) = self.chunks.last_mut() else {
                break;
            };
            let take = (chunk_size - chunk.len()).min(buf.len());
            chunk.extend_from_slice(&buf[..take]);
            buf = &buf[take..];
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PageContent {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.chunks));
    }
}
