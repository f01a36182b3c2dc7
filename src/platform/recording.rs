//! In-memory [`Platform`] recording all calls, for tests.

use std::cell::{
    Ref,
    RefCell,
    RefMut,
};
use std::collections::{
    HashSet,
    VecDeque,
};
use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::rc::Rc;

use super::{
    Platform,
    PumpedMessage,
    WindowProcHandler,
};
use crate::ui::messaging::{
    WM_DESTROY,
    WM_NCDESTROY,
};
use crate::ui::notification::{
    NotificationDescriptor,
    ShellCommand,
};
use crate::ui::window::ERROR_CLASS_ALREADY_EXISTS;
use crate::ui::{
    IconHandle,
    IconIdentity,
    RawMessage,
    WindowClass,
    WindowGeometry,
    WindowHandle,
};

const ERROR_FILE_NOT_FOUND: i32 = 2;
const ERROR_RESOURCE_TYPE_NOT_FOUND: i32 = 1813;
const ERROR_INVALID_WINDOW_HANDLE: i32 = 1400;

#[derive(Clone, Debug)]
pub(crate) struct ShellCall {
    pub(crate) command: ShellCommand,
    pub(crate) descriptor: NotificationDescriptor,
}

pub(crate) struct CreatedWindow {
    pub(crate) handle: WindowHandle,
    pub(crate) class_name: String,
    pub(crate) title: String,
    pub(crate) geometry: WindowGeometry,
    handler: Option<Rc<dyn Fn(WindowHandle, RawMessage) -> isize>>,
}

enum QueuedMessage {
    Window(WindowHandle, RawMessage),
    Quit(i32),
}

#[derive(Default)]
pub(crate) struct RecordingState {
    pub(crate) registered_classes: Vec<String>,
    pub(crate) windows: Vec<CreatedWindow>,
    pub(crate) shown_windows: Vec<WindowHandle>,
    pub(crate) destroyed_windows: Vec<WindowHandle>,
    pub(crate) shell_calls: Vec<ShellCall>,
    pub(crate) rejected_commands: HashSet<ShellCommand>,
    pub(crate) added_icons: HashSet<IconIdentity>,
    pub(crate) resource_icons: HashSet<u16>,
    pub(crate) file_icons: HashSet<PathBuf>,
    pub(crate) file_icon_loads: Vec<PathBuf>,
    pub(crate) live_icons: Vec<IconHandle>,
    pub(crate) destroyed_icons: Vec<IconHandle>,
    pub(crate) default_proc_calls: Vec<(WindowHandle, RawMessage)>,
    pub(crate) quit_messages: Vec<i32>,
    pub(crate) console_hide_calls: usize,
    pub(crate) class_registration_error: Option<i32>,
    pub(crate) fail_window_creation: bool,
    queue: VecDeque<QueuedMessage>,
    next_handle: usize,
}

impl RecordingState {
    fn new_raw_handle(&mut self) -> usize {
        self.next_handle += 4;
        0x1000 + self.next_handle
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingPlatform {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingPlatform {
    pub(crate) const DEFAULT_PROC_RESULT: isize = 0x5EED;

    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> Ref<'_, RecordingState> {
        self.state.borrow()
    }

    pub(crate) fn state_mut(&self) -> RefMut<'_, RecordingState> {
        self.state.borrow_mut()
    }

    pub(crate) fn shell_calls(&self) -> Vec<ShellCall> {
        self.state().shell_calls.clone()
    }

    pub(crate) fn reject(&self, command: ShellCommand) {
        self.state_mut().rejected_commands.insert(command);
    }

    pub(crate) fn add_resource_icon(&self, resource_id: u16) {
        self.state_mut().resource_icons.insert(resource_id);
    }

    pub(crate) fn add_file_icon(&self, path: impl Into<PathBuf>) {
        self.state_mut().file_icons.insert(path.into());
    }

    pub(crate) fn is_icon_live(&self, icon: IconHandle) -> bool {
        self.state().live_icons.contains(&icon)
    }

    /// Calls the window procedure of the window directly, like `SendMessage`.
    pub(crate) fn deliver(&self, window: WindowHandle, message: RawMessage) -> isize {
        let handler = self
            .state()
            .windows
            .iter()
            .find(|created| created.handle == window)
            .and_then(|created| created.handler.clone());
        match handler {
            Some(handler) => handler(window, message),
            None => self.default_window_proc(window, message),
        }
    }

    /// Queues a message for [`Platform::pump_message`], like `PostMessage`.
    pub(crate) fn post(&self, window: WindowHandle, message: RawMessage) {
        self.state_mut()
            .queue
            .push_back(QueuedMessage::Window(window, message));
    }

    fn new_icon(&self) -> IconHandle {
        let mut state = self.state_mut();
        let raw_handle = state.new_raw_handle();
        let icon = IconHandle::from_raw(raw_handle).unwrap();
        state.live_icons.push(icon);
        icon
    }
}

impl Platform for RecordingPlatform {
    fn register_window_class(&self, class_name: &str) -> io::Result<()> {
        let mut state = self.state_mut();
        if let Some(code) = state.class_registration_error {
            return Err(io::Error::from_raw_os_error(code));
        }
        if state.registered_classes.iter().any(|name| name == class_name) {
            return Err(io::Error::from_raw_os_error(ERROR_CLASS_ALREADY_EXISTS));
        }
        state.registered_classes.push(class_name.to_owned());
        Ok(())
    }

    fn create_window(
        &self,
        class: &WindowClass,
        title: &str,
        geometry: WindowGeometry,
        handler: WindowProcHandler,
    ) -> io::Result<WindowHandle> {
        let mut state = self.state_mut();
        if state.fail_window_creation {
            return Err(io::Error::from_raw_os_error(ERROR_INVALID_WINDOW_HANDLE));
        }
        let handle = WindowHandle::from_raw(state.new_raw_handle()).unwrap();
        state.windows.push(CreatedWindow {
            handle,
            class_name: class.name().to_owned(),
            title: title.to_owned(),
            geometry,
            handler: Some(Rc::from(handler)),
        });
        Ok(handle)
    }

    fn show_window(&self, window: WindowHandle) {
        self.state_mut().shown_windows.push(window);
    }

    fn destroy_window(&self, window: WindowHandle) -> io::Result<()> {
        let exists = self
            .state()
            .windows
            .iter()
            .any(|created| created.handle == window && created.handler.is_some());
        if !exists {
            return Err(io::Error::from_raw_os_error(ERROR_INVALID_WINDOW_HANDLE));
        }
        self.deliver(window, RawMessage::new(WM_DESTROY, 0, 0));
        self.deliver(window, RawMessage::new(WM_NCDESTROY, 0, 0));
        let mut state = self.state_mut();
        state.destroyed_windows.push(window);
        // Icons owned by the window disappear with it
        state.added_icons.clear();
        for created in state.windows.iter_mut().filter(|created| created.handle == window) {
            created.handler = None;
        }
        Ok(())
    }

    fn shell_notify_icon(&self, command: ShellCommand, descriptor: &NotificationDescriptor) -> bool {
        let mut state = self.state_mut();
        state.shell_calls.push(ShellCall {
            command,
            descriptor: *descriptor,
        });
        if state.rejected_commands.contains(&command) {
            return false;
        }
        let identity = descriptor.identity();
        match command {
            ShellCommand::Add => state.added_icons.insert(identity),
            ShellCommand::Modify => state.added_icons.contains(&identity),
            ShellCommand::Delete => state.added_icons.remove(&identity),
        }
    }

    fn load_icon_from_resource(&self, resource_id: u16) -> io::Result<IconHandle> {
        if self.state().resource_icons.contains(&resource_id) {
            Ok(self.new_icon())
        } else {
            Err(io::Error::from_raw_os_error(ERROR_RESOURCE_TYPE_NOT_FOUND))
        }
    }

    fn load_icon_from_file(&self, path: &Path) -> io::Result<IconHandle> {
        let found = {
            let mut state = self.state_mut();
            state.file_icon_loads.push(path.to_path_buf());
            state.file_icons.contains(path)
        };
        if found {
            Ok(self.new_icon())
        } else {
            Err(io::Error::from_raw_os_error(ERROR_FILE_NOT_FOUND))
        }
    }

    fn destroy_icon(&self, icon: IconHandle) {
        let mut state = self.state_mut();
        state.live_icons.retain(|live| *live != icon);
        state.destroyed_icons.push(icon);
    }

    fn default_window_proc(&self, window: WindowHandle, message: RawMessage) -> isize {
        self.state_mut().default_proc_calls.push((window, message));
        Self::DEFAULT_PROC_RESULT
    }

    fn post_quit_message(&self, exit_code: i32) {
        let mut state = self.state_mut();
        state.quit_messages.push(exit_code);
        state.queue.push_back(QueuedMessage::Quit(exit_code));
    }

    /// Returns [`io::ErrorKind::WouldBlock`] instead of blocking when the queue is empty.
    fn pump_message(&self) -> io::Result<PumpedMessage> {
        let next = self.state_mut().queue.pop_front();
        match next {
            Some(QueuedMessage::Window(window, message)) => {
                self.deliver(window, message);
                Ok(PumpedMessage::Dispatched)
            }
            Some(QueuedMessage::Quit(exit_code)) => Ok(PumpedMessage::Quit(exit_code)),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn hide_owned_console_window(&self) {
        self.state_mut().console_hide_calls += 1;
    }
}
