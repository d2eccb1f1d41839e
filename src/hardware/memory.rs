use crate::errors::LoadProgramError;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Conventional start of user programs, also the initial program counter.
pub const PROGRAM_SECTION_START: u16 = 0x3000;
/// Number of addressable words, every `u16` is a valid address.
pub const MEMORY_SIZE: usize = 1 << 16;

/// An abstraction for the LC-3 memory excluding registers.
///
/// Every `u16` is a valid address, so indexing can never be out of bounds and address
/// arithmetic done by callers wraps modulo 2^16.
pub struct Memory {
    /// Index equals memory address
    data: Box<[u16]>,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().filter(|w| **w != 0).count();
        write!(f, "Memory {{ size: {MEMORY_SIZE}, non_zero_words: {used} }}")
    }
}

impl Index<u16> for Memory {
    type Output = u16;
    fn index(&self, index: u16) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u16> for Memory {
    fn index_mut(&mut self, index: u16) -> &mut Self::Output {
        &mut self.data[usize::from(index)]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an object image ended up in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedImage {
    pub origin: u16,
    pub word_count: usize,
}

impl Memory {
    /// Zero-filled memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE].into_boxed_slice(),
        }
    }

    /// Loads an object image: big-endian words, the first being the origin address where the
    /// following words are stored consecutively.
    ///
    /// Writing past `0xFFFF` wraps around to `0x0000`, there is no length limit.
    ///
    /// # Errors
    /// - `ProgramMissingOrigHeader` if `image` is empty
    /// - `TruncatedImage` if `image` ends in the middle of a word, all complete words
    ///   before that are already written
    pub fn load_image(&mut self, image: &[u8]) -> Result<LoadedImage, LoadProgramError> {
        let mut words = image.chunks_exact(2);
        let origin = match words.next() {
            Some(header) => u16::from_be_bytes([header[0], header[1]]),
            None if image.is_empty() => return Err(LoadProgramError::ProgramMissingOrigHeader),
            None => return Err(LoadProgramError::TruncatedImage { words_loaded: 0 }),
        };
        let mut address = origin;
        let mut word_count = 0;
        for word in words.by_ref() {
            self[address] = u16::from_be_bytes([word[0], word[1]]);
            address = address.wrapping_add(1);
            word_count += 1;
        }
        if words.remainder().is_empty() {
            Ok(LoadedImage { origin, word_count })
        } else {
            Err(LoadProgramError::TruncatedImage {
                words_loaded: word_count,
            })
        }
    }

    /// Copies `data` into memory starting at `origin`, wrapping past `0xFFFF`.
    pub fn write_words(&mut self, origin: u16, data: &[u16]) {
        let mut address = origin;
        for word in data {
            self[address] = *word;
            address = address.wrapping_add(1);
        }
    }

    /// Words from `start` to `end` inclusive, wrapping past `0xFFFF`.
    pub fn words(&self, start: u16, end: u16) -> impl Iterator<Item = (u16, u16)> + '_ {
        let count = usize::from(end.wrapping_sub(start)) + 1;
        (0..count).map(move |offset| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "offsets are below 2^16, truncation wraps the address as intended"
            )]
            let address = start.wrapping_add(offset as u16);
            (address, self[address])
        })
    }
}
