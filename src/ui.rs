/*!
UI components: the message window, its notification icon and icon resources.
*/

pub mod messaging;
pub mod notification;
pub mod resource;
pub mod window;

pub use messaging::{
    EmptyWindowMessageListener,
    RawMessage,
    WindowMessageListener,
    WindowMessageRouter,
};
pub use notification::{
    BalloonIcon,
    BalloonNotification,
    IconIdentity,
    NotificationDescriptor,
    NotificationIcon,
};
pub use resource::{
    IconHandle,
    LoadedIcon,
};
pub use window::{
    MainWindow,
    WindowClass,
    WindowHandle,
};

/// Position and size of a window in screen coordinates.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowGeometry {
    /// A zero sized window just outside of the visible desktop area.
    pub const OFF_SCREEN: WindowGeometry = WindowGeometry {
        x: -100,
        y: -100,
        width: 0,
        height: 0,
    };
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self::OFF_SCREEN
    }
}
