//! The hidden message window hosting the notification icon.

use std::io;
use std::cell::Cell;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::OnceLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::debug;

use crate::error::NotifyError;
use crate::platform::Platform;
use crate::ui::WindowGeometry;
use crate::ui::messaging::WindowMessageRouter;

/// Win32 error code returned when registering a class name twice in one process.
pub(crate) const ERROR_CLASS_ALREADY_EXISTS: i32 = 1410;

/// A (non-null) handle to a window.
///
/// # Multithreading
///
/// This handle is not [`Send`] and [`Sync`] because window handles are only meaningful on the thread
/// that created the window, whose message queue receives the window's messages.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WindowHandle {
    raw_handle: NonZeroUsize,
    _marker: PhantomData<*mut ()>,
}

#[cfg(test)]
static_assertions::assert_not_impl_any!(WindowHandle: Send, Sync);

#[cfg_attr(not(windows), allow(dead_code))]
impl WindowHandle {
    pub(crate) fn from_raw(raw_handle: usize) -> Option<Self> {
        NonZeroUsize::new(raw_handle).map(|raw_handle| Self {
            raw_handle,
            _marker: PhantomData,
        })
    }

    pub(crate) fn as_raw(self) -> usize {
        self.raw_handle.get()
    }
}

/// Window class serving as a base for [`MainWindow`].
///
/// The class name is generated once per process from the first prefix given to [`WindowClass::register`]
/// by adding a random base64 encoded UUID. All senders in a process share that class.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct WindowClass {
    name: String,
}

impl WindowClass {
    /// Registers the process-wide class, accepting an existing registration of the same name.
    pub fn register<P: Platform>(platform: &P, class_name_prefix: &str) -> Result<Self, NotifyError> {
        let name = process_class_name(class_name_prefix);
        match platform.register_window_class(name) {
            Ok(()) => debug!(class_name = name, "Registered window class"),
            Err(err) if err.raw_os_error() == Some(ERROR_CLASS_ALREADY_EXISTS) => {
                debug!(class_name = name, "Reusing registered window class");
            }
            Err(err) => return Err(NotifyError::ClassRegistration(err)),
        }
        Ok(WindowClass {
            name: name.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn process_class_name(class_name_prefix: &str) -> &'static str {
    static CLASS_NAME: OnceLock<String> = OnceLock::new();
    CLASS_NAME.get_or_init(|| {
        let base64_uuid = URL_SAFE_NO_PAD.encode(uuid::Uuid::new_v4().as_bytes());
        class_name_prefix.to_string() + "_" + &base64_uuid
    })
}

/// A top-level window used only as the endpoint for notification icon messages.
///
/// The window is shown but sized and placed so that it is not visible. Dropping this value
/// does not destroy the window, use [`MainWindow::destroy`] for that.
#[derive(Debug)]
pub struct MainWindow<P> {
    platform: P,
    class: WindowClass,
    handle: WindowHandle,
    quit_on_destroy: Rc<Cell<bool>>,
}

impl<P: Platform> MainWindow<P> {
    /// Creates and shows a new window whose messages are handled by the given router.
    pub fn create(
        platform: P,
        class_name_prefix: &str,
        title: &str,
        geometry: WindowGeometry,
        router: WindowMessageRouter<P>,
    ) -> Result<Self, NotifyError> {
        let class = WindowClass::register(&platform, class_name_prefix)?;
        let quit_on_destroy = router.quit_on_destroy();
        let handle = platform
            .create_window(&class, title, geometry, router.into_handler())
            .map_err(NotifyError::WindowCreation)?;
        platform.show_window(handle);
        debug!(window = ?handle, "Created message window");
        Ok(MainWindow {
            platform,
            class,
            handle,
            quit_on_destroy,
        })
    }

    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    pub fn class(&self) -> &WindowClass {
        &self.class
    }

    /// Destroys the window.
    ///
    /// This will deliver a destroy message to the router, which posts a quit message.
    pub fn destroy(self) -> io::Result<()> {
        debug!(window = ?self.handle, "Destroying message window");
        self.platform.destroy_window(self.handle)
    }

    /// Destroys the window without posting a quit message.
    ///
    /// Used to clean up a window that was never put to use.
    pub fn discard(self) -> io::Result<()> {
        debug!(window = ?self.handle, "Discarding message window");
        self.quit_on_destroy.set(false);
        self.platform.destroy_window(self.handle)
    }
}
