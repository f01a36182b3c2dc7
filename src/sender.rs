/*!
Fire-and-forget balloon notifications.

A [`NotificationSender`] owns a hidden message window and one notification icon attached to it.
Sending a message sets the tooltip and icon and shows a balloon, then returns immediately.

The thread message loop is not run by the send functions. A process that exits right after sending
will not observe clicks on the icon or the balloon. Use [`NotificationSender::run_message_loop`]
to keep receiving them.
*/

use std::io;
use std::path::Path;
use std::rc::Rc;

use tracing::{
    debug,
    warn,
};

use crate::error::NotifyError;
use crate::messaging::ThreadMessageLoop;
use crate::platform::Platform;
#[cfg(windows)]
use crate::platform::win32::Win32Platform;
use crate::ui::messaging::{
    EmptyWindowMessageListener,
    NOTIFY_ICON_CALLBACK_MSG,
    WindowMessageListener,
    WindowMessageRouter,
};
use crate::ui::resource::DEFAULT_APP_ICON_RESOURCE_ID;
use crate::ui::{
    LoadedIcon,
    MainWindow,
    NotificationIcon,
    WindowGeometry,
};

/// Setup parameters of a [`NotificationSender`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SenderOptions {
    /// Prefix of the window class name. Only the first prefix used in a process takes effect.
    pub class_name_prefix: String,
    pub window_title: String,
    pub geometry: WindowGeometry,
    /// Icon resource tried before the icon file given when sending.
    pub app_icon_resource_id: u16,
    /// Message used by the shell to report icon events to the window.
    pub callback_message: u32,
}

impl Default for SenderOptions {
    fn default() -> Self {
        SenderOptions {
            class_name_prefix: "NotifyIconSender".to_string(),
            window_title: "NotifyIcon".to_string(),
            geometry: WindowGeometry::OFF_SCREEN,
            app_icon_resource_id: DEFAULT_APP_ICON_RESOURCE_ID,
            callback_message: NOTIFY_ICON_CALLBACK_MSG,
        }
    }
}

/// A message window with a notification icon, ready to show balloon notifications.
#[derive(Debug)]
pub struct NotificationSender<P> {
    platform: P,
    options: SenderOptions,
    window: MainWindow<P>,
    icon: NotificationIcon<P>,
}

impl<P: Platform> NotificationSender<P> {
    pub fn create(platform: P, options: SenderOptions) -> Result<Self, NotifyError> {
        Self::create_with_listener(platform, options, Rc::new(EmptyWindowMessageListener))
    }

    /// Creates the sender, passing icon events to the given listener.
    ///
    /// The listener is only called while a message loop is running on this thread.
    pub fn create_with_listener(
        platform: P,
        options: SenderOptions,
        listener: Rc<dyn WindowMessageListener>,
    ) -> Result<Self, NotifyError> {
        let router = WindowMessageRouter::new(platform.clone(), options.callback_message, listener);
        let window = MainWindow::create(
            platform.clone(),
            &options.class_name_prefix,
            &options.window_title,
            options.geometry,
            router,
        )?;
        let icon = match NotificationIcon::create(
            platform.clone(),
            window.handle(),
            options.callback_message,
        ) {
            Ok(icon) => icon,
            Err(err) => {
                if let Err(destroy_error) = window.discard() {
                    warn!(%destroy_error, "Cannot destroy message window after failed icon setup");
                }
                return Err(err);
            }
        };
        Ok(NotificationSender {
            platform,
            options,
            window,
            icon,
        })
    }

    /// Creates the sender.
    ///
    /// # Panics
    ///
    /// Will panic if the window or the notification icon cannot be set up.
    pub fn create_or_abort(platform: P, options: SenderOptions) -> Self {
        Self::create(platform, options)
            .unwrap_or_else(|err| panic!("Cannot set up notification sender: {err}"))
    }

    /// Shows a balloon notification.
    ///
    /// If `icon_path` is given, the application icon resource is tried first and the file second.
    /// Without any icon found, a plain text notification is shown instead.
    /// The title is also used as the tooltip of the notification icon.
    pub fn send_message(&mut self, body: &str, title: &str, icon_path: Option<&Path>) -> Result<(), NotifyError> {
        self.platform.hide_owned_console_window();
        let loaded_icon = icon_path.and_then(|path| {
            LoadedIcon::load_with_fallback(&self.platform, self.options.app_icon_resource_id, path)
        });
        self.icon.set_tooltip(title)?;
        match &loaded_icon {
            Some(loaded_icon) => {
                self.icon.set_icon(loaded_icon.handle())?;
                self.icon.notify_with_icon(title, body, loaded_icon.handle())?;
            }
            None => self.icon.notify(title, body)?,
        }
        debug!(
            identity = %self.icon.identity(),
            with_icon = loaded_icon.is_some(),
            "Sent balloon notification"
        );
        Ok(())
    }

    pub fn icon_mut(&mut self) -> &mut NotificationIcon<P> {
        &mut self.icon
    }

    pub fn window(&self) -> &MainWindow<P> {
        &self.window
    }

    pub fn options(&self) -> &SenderOptions {
        &self.options
    }

    /// Runs the thread message loop until the icon is clicked or the window is destroyed.
    ///
    /// # Panics
    ///
    /// Will panic if a message loop is already running on this thread.
    pub fn run_message_loop(&self) -> io::Result<i32> {
        ThreadMessageLoop::run(&self.platform)
    }

    /// Removes the notification icon and destroys the window.
    pub fn shutdown(mut self) -> io::Result<()> {
        self.icon.dispose();
        self.window.destroy()
    }
}

/// Sets up a notification sender with default options on the real OS.
///
/// # Panics
///
/// Will panic if the window or the notification icon cannot be set up.
#[cfg(windows)]
pub fn create_sender() -> NotificationSender<Win32Platform> {
    let platform = Win32Platform::new()
        .unwrap_or_else(|err| panic!("Cannot set up notification sender: {err}"));
    NotificationSender::create_or_abort(platform, SenderOptions::default())
}

/// Shows a balloon notification using the given sender.
///
/// An empty `icon_path` means no icon.
pub fn send_message<P: Platform>(
    body: &str,
    title: &str,
    icon_path: &str,
    sender: &mut NotificationSender<P>,
) -> Result<(), NotifyError> {
    let icon_path = Some(icon_path)
        .filter(|path| !path.is_empty())
        .map(Path::new);
    sender.send_message(body, title, icon_path)
}
