use crate::hardware::keyboard::KeyboardInput;
use std::collections::VecDeque;
use std::io;
use std::io::Write;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

/// Keyboard replaying a fixed byte string, fails once it is exhausted.
pub struct FakeKeyboard {
    input: VecDeque<u8>,
}
impl FakeKeyboard {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
        }
    }
}
impl KeyboardInput for FakeKeyboard {
    fn read_char(&mut self) -> io::Result<u8> {
        self.input
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
    }
}
