use crossterm::terminal;
use std::io;

/// Restores cooked terminal mode when dropped.
pub struct RawLock {}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::error!("Error resetting terminal: {e}");
        }
    }
}

/// Puts the terminal into raw mode so single key presses are delivered without echo.
///
/// # Errors
/// - stdin is not a terminal or its mode cannot be changed
pub fn set_terminal_raw() -> io::Result<RawLock> {
    terminal::enable_raw_mode()?;
    Ok(RawLock {})
}
