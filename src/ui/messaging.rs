//! Window message routing for the notification icon window.

use std::cell::Cell;
use std::rc::Rc;

use num_enum::{
    IntoPrimitive,
    TryFromPrimitive,
};
use tracing::{
    debug,
    info,
    trace,
};

use crate::platform::{
    Platform,
    WindowProcHandler,
};
use crate::ui::WindowHandle;
use windows_missing::*;

/// The application defined message used by the shell to report notification icon events.
pub const NOTIFY_ICON_CALLBACK_MSG: u32 = WM_APP + 1;

/// A window message as delivered to a window procedure.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RawMessage {
    pub message: u32,
    pub w_param: usize,
    pub l_param: isize,
}

impl RawMessage {
    pub fn new(message: u32, w_param: usize, l_param: isize) -> Self {
        RawMessage {
            message,
            w_param,
            l_param,
        }
    }

    /// Builds a notification icon callback message carrying the given event.
    pub fn notification_icon_event(callback_message: u32, event: NotificationIconEvent) -> Self {
        Self::new(callback_message, 0, u16::from(event) as isize)
    }

    /// The low-order word of `l_param`, which carries the event code of notification icon messages.
    pub fn l_param_low_word(&self) -> u16 {
        LOWORD(self.l_param as u32)
    }
}

/// Notification icon event codes sent in the low word of `l_param` of the callback message.
#[derive(IntoPrimitive, TryFromPrimitive, Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u16)]
pub enum NotificationIconEvent {
    ContextMenu = WM_CONTEXTMENU,
    MouseMove = WM_MOUSEMOVE,
    PrimaryButtonDown = WM_LBUTTONDOWN,
    PrimaryButtonUp = WM_LBUTTONUP,
    PrimaryButtonDoubleClick = WM_LBUTTONDBLCLK,
    SecondaryButtonDown = WM_RBUTTONDOWN,
    SecondaryButtonUp = WM_RBUTTONUP,
    Select = NIN_SELECT,
    KeySelect = NIN_KEYSELECT,
    BalloonShow = NIN_BALLOONSHOW,
    BalloonHide = NIN_BALLOONHIDE,
    BalloonTimeout = NIN_BALLOONTIMEOUT,
    BalloonUserClick = NIN_BALLOONUSERCLICK,
    PopupOpen = NIN_POPUPOPEN,
    PopupClose = NIN_POPUPCLOSE,
}

/// What a message means to the router.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Route {
    /// The user clicked the balloon notification.
    BalloonClicked,
    /// The primary mouse button was pressed on the notification icon.
    IconPrimaryPressed,
    /// Any other notification icon event. Contains the raw event code.
    OtherIconEvent(u16),
    WindowDestroyed,
    /// Not a message the router knows. Goes to the default window procedure.
    Unhandled,
}

/// Classifies a raw window message.
pub fn route(message: RawMessage, callback_message: u32) -> Route {
    if message.message == callback_message {
        let event_code = message.l_param_low_word();
        match NotificationIconEvent::try_from(event_code) {
            Ok(NotificationIconEvent::BalloonUserClick) => Route::BalloonClicked,
            Ok(NotificationIconEvent::PrimaryButtonDown) => Route::IconPrimaryPressed,
            _ => Route::OtherIconEvent(event_code),
        }
    } else if message.message == WM_DESTROY {
        Route::WindowDestroyed
    } else {
        Route::Unhandled
    }
}

/// Application callbacks for notification icon events.
///
/// All methods have empty defaults. They are called from the window procedure, so they must return promptly.
pub trait WindowMessageListener {
    /// The user clicked the balloon notification.
    #[allow(unused_variables)]
    #[inline(always)]
    fn handle_balloon_click(&self, window: WindowHandle) {}
    /// The primary mouse button was pressed on the icon. A quit message has already been posted.
    #[allow(unused_variables)]
    #[inline(always)]
    fn handle_icon_primary_press(&self, window: WindowHandle) {}
    /// The window was destroyed. A quit message has already been posted, unless the window was discarded.
    #[allow(unused_variables)]
    #[inline(always)]
    fn handle_window_destroy(&self, window: WindowHandle) {}
}

/// A [`WindowMessageListener`] that leaves all handlers to their default empty impls.
#[derive(Copy, Clone, Default, Debug)]
pub struct EmptyWindowMessageListener;

impl WindowMessageListener for EmptyWindowMessageListener {}

/// The window procedure logic of the notification icon window.
pub struct WindowMessageRouter<P> {
    platform: P,
    callback_message: u32,
    listener: Rc<dyn WindowMessageListener>,
    quit_on_destroy: Rc<Cell<bool>>,
}

impl<P: Platform> WindowMessageRouter<P> {
    pub fn new(platform: P, callback_message: u32, listener: Rc<dyn WindowMessageListener>) -> Self {
        WindowMessageRouter {
            platform,
            callback_message,
            listener,
            quit_on_destroy: Rc::new(Cell::new(true)),
        }
    }

    /// Switch deciding whether destroying the window posts a quit message. Initially on.
    pub(crate) fn quit_on_destroy(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.quit_on_destroy)
    }

    /// Handles one message delivered to the window.
    ///
    /// Messages not known to the router are passed to the default window procedure and its result is returned.
    pub fn window_proc(&self, window: WindowHandle, message: RawMessage) -> isize {
        match route(message, self.callback_message) {
            Route::BalloonClicked => {
                info!("User has clicked the balloon message");
                self.listener.handle_balloon_click(window);
                0
            }
            Route::IconPrimaryPressed => {
                debug!("Notification icon clicked, posting quit message");
                self.platform.post_quit_message(0);
                self.listener.handle_icon_primary_press(window);
                0
            }
            Route::OtherIconEvent(event_code) => {
                trace!(event_code, "Ignoring notification icon event");
                0
            }
            Route::WindowDestroyed => {
                if self.quit_on_destroy.get() {
                    debug!(?window, "Window destroyed, posting quit message");
                    self.platform.post_quit_message(0);
                } else {
                    debug!(?window, "Window discarded");
                }
                self.listener.handle_window_destroy(window);
                0
            }
            Route::Unhandled => self.platform.default_window_proc(window, message),
        }
    }

    pub(crate) fn into_handler(self) -> WindowProcHandler {
        Box::new(move |window, message| self.window_proc(window, message))
    }
}

mod windows_missing {
    // Values from WinUser.h and shellapi.h, the `windows` crate is only available on Windows targets.
    pub const WM_DESTROY: u32 = 0x0002;
    pub const WM_NCDESTROY: u32 = 0x0082;
    pub const WM_USER: u32 = 0x0400;
    pub const WM_APP: u32 = 0x8000;

    pub const WM_CONTEXTMENU: u16 = 0x007B;
    pub const WM_MOUSEMOVE: u16 = 0x0200;
    pub const WM_LBUTTONDOWN: u16 = 0x0201;
    pub const WM_LBUTTONUP: u16 = 0x0202;
    pub const WM_LBUTTONDBLCLK: u16 = 0x0203;
    pub const WM_RBUTTONDOWN: u16 = 0x0204;
    pub const WM_RBUTTONUP: u16 = 0x0205;

    pub const NIN_SELECT: u16 = WM_USER as u16;
    pub const NIN_KEYSELECT: u16 = NIN_SELECT | 0x1;
    pub const NIN_BALLOONSHOW: u16 = 0x0402;
    pub const NIN_BALLOONHIDE: u16 = 0x0403;
    pub const NIN_BALLOONTIMEOUT: u16 = 0x0404;
    pub const NIN_BALLOONUSERCLICK: u16 = 0x0405;
    pub const NIN_POPUPOPEN: u16 = 0x0406;
    pub const NIN_POPUPCLOSE: u16 = 0x0407;

    #[allow(non_snake_case)]
    #[inline]
    pub fn LOWORD(l: u32) -> u16 {
        (l & 0xFFFF) as u16
    }
}

#[cfg_attr(not(any(windows, test)), allow(unused_imports))]
pub(crate) use windows_missing::{
    WM_DESTROY,
    WM_NCDESTROY,
};

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::platform::recording::RecordingPlatform;

    #[derive(Default)]
    struct CountingListener {
        balloon_clicks: Cell<u32>,
        icon_presses: Cell<u32>,
        destroys: Cell<u32>,
    }

    impl WindowMessageListener for CountingListener {
        fn handle_balloon_click(&self, _: WindowHandle) {
            self.balloon_clicks.set(self.balloon_clicks.get() + 1);
        }
        fn handle_icon_primary_press(&self, _: WindowHandle) {
            self.icon_presses.set(self.icon_presses.get() + 1);
        }
        fn handle_window_destroy(&self, _: WindowHandle) {
            self.destroys.set(self.destroys.get() + 1);
        }
    }

    fn setup() -> (
        RecordingPlatform,
        Rc<CountingListener>,
        WindowMessageRouter<RecordingPlatform>,
        WindowHandle,
    ) {
        let platform = RecordingPlatform::new();
        let listener = Rc::new(CountingListener::default());
        let router = WindowMessageRouter::new(
            platform.clone(),
            NOTIFY_ICON_CALLBACK_MSG,
            listener.clone(),
        );
        let window = WindowHandle::from_raw(0x1234).unwrap();
        (platform, listener, router, window)
    }

    #[test]
    fn callback_message_is_in_app_range() {
        assert_eq!(NOTIFY_ICON_CALLBACK_MSG, 0x8001);
    }

    #[test]
    fn low_word_ignores_high_word() {
        let message = RawMessage::new(NOTIFY_ICON_CALLBACK_MSG, 0, 0x0003_0405);
        assert_eq!(message.l_param_low_word(), NIN_BALLOONUSERCLICK);
        assert_eq!(
            route(message, NOTIFY_ICON_CALLBACK_MSG),
            Route::BalloonClicked
        );
    }

    #[test]
    fn routes() {
        let click = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::PrimaryButtonDown,
        );
        assert_eq!(
            route(click, NOTIFY_ICON_CALLBACK_MSG),
            Route::IconPrimaryPressed
        );
        let hover = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::MouseMove,
        );
        assert_eq!(
            route(hover, NOTIFY_ICON_CALLBACK_MSG),
            Route::OtherIconEvent(WM_MOUSEMOVE)
        );
        let unknown = RawMessage::new(NOTIFY_ICON_CALLBACK_MSG, 0, 0x7777);
        assert_eq!(
            route(unknown, NOTIFY_ICON_CALLBACK_MSG),
            Route::OtherIconEvent(0x7777)
        );
        let destroy = RawMessage::new(WM_DESTROY, 0, 0);
        assert_eq!(
            route(destroy, NOTIFY_ICON_CALLBACK_MSG),
            Route::WindowDestroyed
        );
        // Same event code, but not sent through the callback message
        let plain_click = RawMessage::new(u32::from(WM_LBUTTONDOWN), 0, 0);
        assert_eq!(route(plain_click, NOTIFY_ICON_CALLBACK_MSG), Route::Unhandled);
    }

    #[test]
    fn primary_press_posts_quit_once() {
        let (platform, listener, router, window) = setup();
        let click = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::PrimaryButtonDown,
        );
        assert_eq!(router.window_proc(window, click), 0);
        assert_eq!(platform.state().quit_messages, vec![0]);
        assert_eq!(listener.icon_presses.get(), 1);
        assert!(platform.state().default_proc_calls.is_empty());
    }

    #[test]
    fn other_icon_events_have_no_side_effects() {
        let (platform, listener, router, window) = setup();
        for event in [
            NotificationIconEvent::BalloonShow,
            NotificationIconEvent::BalloonTimeout,
            NotificationIconEvent::PrimaryButtonUp,
            NotificationIconEvent::SecondaryButtonDown,
            NotificationIconEvent::ContextMenu,
            NotificationIconEvent::Select,
        ] {
            let message = RawMessage::notification_icon_event(NOTIFY_ICON_CALLBACK_MSG, event);
            assert_eq!(router.window_proc(window, message), 0);
        }
        assert!(platform.state().quit_messages.is_empty());
        assert!(platform.state().default_proc_calls.is_empty());
        assert_eq!(listener.icon_presses.get(), 0);
        assert_eq!(listener.balloon_clicks.get(), 0);
    }

    #[test]
    fn balloon_click_notifies_listener_without_quit() {
        let (platform, listener, router, window) = setup();
        let message = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::BalloonUserClick,
        );
        assert_eq!(router.window_proc(window, message), 0);
        assert_eq!(listener.balloon_clicks.get(), 1);
        assert!(platform.state().quit_messages.is_empty());
    }

    #[test]
    fn destroy_posts_quit() {
        let (platform, listener, router, window) = setup();
        assert_eq!(router.window_proc(window, RawMessage::new(WM_DESTROY, 0, 0)), 0);
        assert_eq!(platform.state().quit_messages, vec![0]);
        assert_eq!(listener.destroys.get(), 1);
    }

    #[test]
    fn destroy_without_quit_when_switched_off() {
        let (platform, listener, router, window) = setup();
        router.quit_on_destroy().set(false);
        assert_eq!(router.window_proc(window, RawMessage::new(WM_DESTROY, 0, 0)), 0);
        assert!(platform.state().quit_messages.is_empty());
        assert_eq!(listener.destroys.get(), 1);
    }

    #[test]
    fn notification_icon_event_carries_code_in_low_word() {
        let message = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::BalloonUserClick,
        );
        assert_eq!(message.l_param, 0x0405);
        assert_eq!(message.l_param_low_word(), NIN_BALLOONUSERCLICK);
        let message = RawMessage::notification_icon_event(
            NOTIFY_ICON_CALLBACK_MSG,
            NotificationIconEvent::PrimaryButtonDown,
        );
        assert_eq!(message.l_param, 0x0201);
    }

    #[test]
    fn unknown_messages_use_default_proc_result() {
        let (platform, _listener, router, window) = setup();
        let message = RawMessage::new(WM_USER + 42, 7, 8);
        assert_eq!(
            router.window_proc(window, message),
            RecordingPlatform::DEFAULT_PROC_RESULT
        );
        assert_eq!(platform.state().default_proc_calls, vec![(window, message)]);
        assert!(platform.state().quit_messages.is_empty());
    }

    #[cfg(windows)]
    #[test]
    fn codes_match_windows_headers() {
        use windows::Win32::UI::Shell;
        use windows::Win32::UI::WindowsAndMessaging as wm;

        assert_eq!(WM_DESTROY, wm::WM_DESTROY);
        assert_eq!(WM_NCDESTROY, wm::WM_NCDESTROY);
        assert_eq!(WM_APP, wm::WM_APP);
        assert_eq!(u32::from(WM_LBUTTONDOWN), wm::WM_LBUTTONDOWN);
        assert_eq!(u32::from(WM_CONTEXTMENU), wm::WM_CONTEXTMENU);
        assert_eq!(u32::from(NIN_SELECT), Shell::NIN_SELECT);
        assert_eq!(u32::from(NIN_BALLOONUSERCLICK), Shell::NIN_BALLOONUSERCLICK);
        assert_eq!(u32::from(NIN_POPUPCLOSE), Shell::NIN_POPUPCLOSE);
    }
}
