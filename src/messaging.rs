//! Thread message loop.

use std::cell::Cell;
use std::io;

use tracing::debug;

use crate::platform::{
    Platform,
    PumpedMessage,
};

/// Windows thread message loop functions.
///
/// This type is not meant to be instantiated.
pub enum ThreadMessageLoop {}

impl ThreadMessageLoop {
    thread_local! {
        static RUNNING: Cell<bool> = const { Cell::new(false) };
    }

    /// Runs the thread message loop until a quit message is retrieved, returning its exit code.
    ///
    /// Blocks the thread while waiting for messages. Only a single message loop may be running per thread.
    ///
    /// # Panics
    ///
    /// Will panic if the message loop is already running.
    pub fn run<P: Platform>(platform: &P) -> io::Result<i32> {
        Self::RUNNING.with(|running| {
            if running.get() {
                panic!("Cannot run two thread message loops on the same thread");
            }
            running.set(true);
        });
        let result = Self::pump_until_quit(platform);
        Self::RUNNING.with(|running| running.set(false));
        result
    }

    fn pump_until_quit<P: Platform>(platform: &P) -> io::Result<i32> {
        loop {
            if let PumpedMessage::Quit(exit_code) = platform.pump_message()? {
                debug!(exit_code, "Thread message loop finished");
                return Ok(exit_code);
            }
        }
    }

    pub fn is_loop_running() -> bool {
        Self::RUNNING.with(|running| running.get())
    }
}
