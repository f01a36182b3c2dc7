/*!
Binding to the OS windowing and shell notification APIs.

All components take a [`Platform`] value at construction instead of calling the OS directly.
*/

use std::io;
use std::path::Path;

use crate::ui::notification::{
    NotificationDescriptor,
    ShellCommand,
};
use crate::ui::{
    IconHandle,
    RawMessage,
    WindowClass,
    WindowGeometry,
    WindowHandle,
};

#[cfg(test)]
pub(crate) mod recording;
#[cfg(windows)]
pub mod win32;

/// Window procedure logic attached to a window at creation.
pub type WindowProcHandler = Box<dyn Fn(WindowHandle, RawMessage) -> isize>;

/// Result of retrieving one message from the thread message queue.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PumpedMessage {
    /// A message was dispatched to its window procedure.
    Dispatched,
    /// A quit message was retrieved. Contains the exit code.
    Quit(i32),
}

/// The OS operations used by this crate.
///
/// Implementations are cheap to clone and shared by all components created from them.
pub trait Platform: Clone + 'static {
    /// Registers a window class using the common window procedure.
    ///
    /// Fails with OS error code 1410 if the class already exists in this process.
    fn register_window_class(&self, class_name: &str) -> io::Result<()>;

    /// Creates a top-level window. Messages to it will be passed to `handler`.
    fn create_window(
        &self,
        class: &WindowClass,
        title: &str,
        geometry: WindowGeometry,
        handler: WindowProcHandler,
    ) -> io::Result<WindowHandle>;

    fn show_window(&self, window: WindowHandle);

    fn destroy_window(&self, window: WindowHandle) -> io::Result<()>;

    /// Sends a request to the shell notification service, returning whether it was accepted.
    fn shell_notify_icon(&self, command: ShellCommand, descriptor: &NotificationDescriptor) -> bool;

    /// Loads an icon in the default size from the resources of the current executable.
    fn load_icon_from_resource(&self, resource_id: u16) -> io::Result<IconHandle>;

    /// Loads an icon in the default size from a file.
    fn load_icon_from_file(&self, path: &Path) -> io::Result<IconHandle>;

    fn destroy_icon(&self, icon: IconHandle);

    /// Default processing for messages a window procedure does not handle.
    fn default_window_proc(&self, window: WindowHandle, message: RawMessage) -> isize;

    /// Posts a quit message to the message queue of the current thread.
    fn post_quit_message(&self, exit_code: i32);

    /// Waits for the next message of the current thread and dispatches it.
    fn pump_message(&self) -> io::Result<PumpedMessage>;

    /// Hides the console window if it was created for this process.
    ///
    /// Does nothing for consoles inherited from a parent process.
    fn hide_owned_console_window(&self);
}
