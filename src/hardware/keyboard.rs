use crate::terminal;
use crossterm::event::{KeyCode, KeyModifiers, read};
use std::io;
use std::io::Read;

/// Providing blocking keyboard input independent of an implementation.
pub trait KeyboardInput {
    /// Blocks until one character is available and returns it.
    ///
    /// # Errors
    /// - input is exhausted or reading failed
    /// - input was interrupted by the user
    fn read_char(&mut self) -> io::Result<u8>;
}

/// Reads single key presses from the terminal, which is in raw mode only during the read.
#[derive(Debug, Default)]
pub struct TerminalKeyboard;

impl TerminalKeyboard {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl KeyboardInput for TerminalKeyboard {
    fn read_char(&mut self) -> io::Result<u8> {
        let _lock = terminal::set_terminal_raw()?;
        loop {
            let Some(event) = read()?.as_key_press_event() else {
                continue;
            };
            match event.code {
                KeyCode::Char('c') if event.modifiers == KeyModifiers::CONTROL => {
                    return Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "interrupted by CTRL-C",
                    ));
                }
                KeyCode::Enter => return Ok(b'\n'),
                KeyCode::Tab => return Ok(b'\t'),
                KeyCode::Backspace => return Ok(0x08),
                KeyCode::Esc => return Ok(0x1B),
                KeyCode::Char(c) => {
                    if let Ok(b) = u8::try_from(c)
                        && b.is_ascii()
                    {
                        return Ok(b);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Adapts any byte source, e.g. piped stdin, one byte per character.
#[derive(Debug)]
pub struct ReaderKeyboard<R> {
    reader: R,
}

impl<R: Read> ReaderKeyboard<R> {
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> KeyboardInput for ReaderKeyboard<R> {
    fn read_char(&mut self) -> io::Result<u8> {
        let mut b = [0; 1];
        self.reader.read_exact(&mut b)?;
        Ok(b[0])
    }
}
