//! Variable-width LZW decoding of GIF image data
//!
//! Codes are read LSB-first from the data sub-block chain, starting at
//! `min_code_size + 1` bits and growing up to 12 bits. Decoded strings are
//! unwound through a prefix/suffix table onto a stack and emitted one palette
//! index at a time.

use crate::decoder::DecodeError;
use crate::decoder::reader::BlockReader;
use crate::storage::StorageFile;

const MAX_CODE_BITS: u8 = 12;
const MAX_CODES: usize = 1 << MAX_CODE_BITS;

/// Dictionary storage, kept between frames to avoid re-allocating on the stack
pub(crate) struct LzwTables {
    prefix: [u16; MAX_CODES],
    suffix: [u8; MAX_CODES],
    stack: [u8; MAX_CODES + 1],
}

impl LzwTables {
    pub(crate) const fn new() -> Self {
        Self {
            prefix: [0; MAX_CODES],
            suffix: [0; MAX_CODES],
            stack: [0; MAX_CODES + 1],
        }
    }

    /// Decode one image's data sub-blocks
    ///
    /// `emit` receives every decoded index and returns `true` once it needs no
    /// more pixels. Remaining data is then skipped. Running out of data
    /// without an end code is not an error here; the caller decides whether
    /// enough pixels arrived.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn decode<F, E>(
        &mut self,
        reader: &mut BlockReader<'_, F>,
        min_code_size: u8,
        mut emit: E,
    ) -> Result<(), DecodeError>
    where
        F: StorageFile,
        E: FnMut(u8) -> bool,
    {
        if !(1..=8).contains(&min_code_size) {
            return Err(DecodeError::InvalidCodeSize(min_code_size));
        }

        let clear = 1u16 << min_code_size;
        let end = clear + 1;
        for (code, suffix) in self.suffix.iter_mut().take(usize::from(clear)).enumerate() {
            *suffix = code as u8;
        }

        let mut bits = BitReader::new();
        let mut code_size = min_code_size + 1;
        let mut next = end + 1;
        let mut prev: Option<u16> = None;

        loop {
            let Some(code) = bits.read(reader, code_size)? else {
                return Ok(());
            };

            if code == clear {
                code_size = min_code_size + 1;
                next = end + 1;
                prev = None;
                continue;
            }
            if code == end {
                return bits.drain(reader);
            }

            let Some(prev_code) = prev else {
                if code > clear {
                    return Err(DecodeError::InvalidCode(code));
                }
                prev = Some(code);
                if emit(code as u8) {
                    return bits.drain(reader);
                }
                continue;
            };

            if code > next {
                return Err(DecodeError::InvalidCode(code));
            }

            // KwKwK: the code being defined right now, its last byte is filled in below
            let mut top = 0;
            let mut current = code;
            if code == next {
                top = 1;
                current = prev_code;
            }
            while current > end {
                self.stack[top] = self.suffix[usize::from(current)];
                top += 1;
                current = self.prefix[usize::from(current)];
            }
            let first = current as u8;
            self.stack[top] = first;
            top += 1;
            if code == next {
                self.stack[0] = first;
            }

            while top > 0 {
                top -= 1;
                if emit(self.stack[top]) {
                    return bits.drain(reader);
                }
            }

            if usize::from(next) < MAX_CODES {
                self.prefix[usize::from(next)] = prev_code;
                self.suffix[usize::from(next)] = first;
                next += 1;
                if next == 1 << code_size && code_size < MAX_CODE_BITS {
                    code_size += 1;
                }
            }
            prev = Some(code);
        }
    }
}

/// LSB-first code reader over the sub-block chain
struct BitReader {
    acc: u32,
    count: u8,
    block_left: u8,
    finished: bool,
}

impl BitReader {
    const fn new() -> Self {
        Self {
            acc: 0,
            count: 0,
            block_left: 0,
            finished: false,
        }
    }

    fn next_byte<F: StorageFile>(
        &mut self,
        reader: &mut BlockReader<'_, F>,
    ) -> Result<Option<u8>, DecodeError> {
        if self.finished {
            return Ok(None);
        }
        if self.block_left == 0 {
            let len = reader.read_u8()?;
            if len == 0 {
                self.finished = true;
                return Ok(None);
            }
            self.block_left = len;
        }
        self.block_left -= 1;
        reader.read_u8().map(Some)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read<F: StorageFile>(
        &mut self,
        reader: &mut BlockReader<'_, F>,
        size: u8,
    ) -> Result<Option<u16>, DecodeError> {
        while self.count < size {
            let Some(byte) = self.next_byte(reader)? else {
                return Ok(None);
            };
            self.acc |= u32::from(byte) << self.count;
            self.count += 8;
        }
        let code = (self.acc & ((1 << size) - 1)) as u16;
        self.acc >>= size;
        self.count -= size;
        Ok(Some(code))
    }

    /// Skip whatever is left of the sub-block chain
    fn drain<F: StorageFile>(&mut self, reader: &mut BlockReader<'_, F>) -> Result<(), DecodeError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        reader.skip(u32::from(self.block_left))?;
        reader.skip_sub_blocks()
    }
}
