use crate::decoder::DecodeError;
use crate::source::ByteSource;
use crate::storage::StorageFile;

const READ_BUFFER_SIZE: usize = 256;

/// Buffered little-endian reader over a [`ByteSource`]
///
/// Running out of bytes is always reported as [`DecodeError::Truncated`].
pub(crate) struct BlockReader<'a, F: StorageFile> {
    source: &'a mut ByteSource<F>,
    buf: [u8; READ_BUFFER_SIZE],
    head: usize,
    tail: usize,
    /// File offset of the byte after `buf[tail - 1]`
    position: u32,
}

impl<'a, F: StorageFile> BlockReader<'a, F> {
    /// Wrap a source, rewinding it to the first byte
    pub(crate) fn new(source: &'a mut ByteSource<F>) -> Self {
        let position = source.seek(0);
        Self {
            source,
            buf: [0; READ_BUFFER_SIZE],
            head: 0,
            tail: 0,
            position,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill(&mut self) -> bool {
        if self.head < self.tail {
            return true;
        }
        let count = self.source.read(&mut self.buf);
        self.head = 0;
        self.tail = count;
        self.position = self.position.saturating_add(count as u32);
        count > 0
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        if !self.fill() {
            return Err(DecodeError::Truncated);
        }
        let byte = self.buf[self.head];
        self.head += 1;
        Ok(byte)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(crate) fn read_exact(&mut self, out: &mut [u8]) -> Result<(), DecodeError> {
        let mut written = 0;
        while written < out.len() {
            if !self.fill() {
                return Err(DecodeError::Truncated);
            }
            let count = (self.tail - self.head).min(out.len() - written);
            out[written..written + count].copy_from_slice(&self.buf[self.head..self.head + count]);
            self.head += count;
            written += count;
        }
        Ok(())
    }

    /// Skip `count` bytes, seeking past anything not already buffered
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn skip(&mut self, count: u32) -> Result<(), DecodeError> {
        let buffered = (self.tail - self.head) as u32;
        if count <= buffered {
            self.head += count as usize;
            return Ok(());
        }
        let target = self.position.saturating_add(count - buffered);
        self.head = 0;
        self.tail = 0;
        self.position = self.source.seek(i64::from(target));
        if self.position < target {
            return Err(DecodeError::Truncated);
        }
        Ok(())
    }

    /// Skip a chain of data sub-blocks up to and including the terminator
    pub(crate) fn skip_sub_blocks(&mut self) -> Result<(), DecodeError> {
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(());
            }
            self.skip(u32::from(len))?;
        }
    }
}
