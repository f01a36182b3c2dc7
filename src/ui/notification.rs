//! Notification area icon and its balloon notifications.

use std::fmt::{
    Display,
    Formatter,
};

use bitflags::bitflags;
use num_enum::IntoPrimitive;
use tracing::debug;
use uuid::Uuid;

use crate::error::{
    NotifyError,
    ShellUpdate,
};
use crate::platform::Platform;
use crate::string::{
    BALLOON_BODY_CAPACITY,
    BALLOON_TITLE_CAPACITY,
    TOOLTIP_CAPACITY,
    WideText,
};
use crate::ui::{
    IconHandle,
    WindowHandle,
};

/// The 128-bit identity the shell uses to address a notification icon.
///
/// Generated randomly once per icon.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct IconIdentity(Uuid);

impl IconIdentity {
    pub fn new_random() -> Self {
        IconIdentity(Uuid::new_v4())
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl From<Uuid> for IconIdentity {
    fn from(value: Uuid) -> Self {
        IconIdentity(value)
    }
}

impl Display for IconIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.braced())
    }
}

/// Request kinds of the shell notification service.
#[derive(IntoPrimitive, Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum ShellCommand {
    Add = 0,
    Modify = 1,
    Delete = 2,
}

bitflags! {
    /// Fields of a [`NotificationDescriptor`] that carry data. Same values as the `NIF_*` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct NotifyFlags: u32 {
        const MESSAGE = 0x01;
        const ICON = 0x02;
        const TIP = 0x04;
        const INFO = 0x10;
        const GUID = 0x20;
    }

    /// Balloon options. Same values as the corresponding `NIIF_*` flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct InfoFlags: u32 {
        /// Use a custom icon instead of a standard one.
        const USER = 0x04;
        const NOSOUND = 0x10;
        const LARGE_ICON = 0x20;
    }
}

/// Icon shown inside a balloon notification.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub enum BalloonIcon {
    #[default]
    None,
    Info,
    Warning,
    Error,
    /// A custom icon, optionally shown in the large size.
    Custom { icon: IconHandle, large: bool },
}

impl BalloonIcon {
    fn standard_icon_code(self) -> u32 {
        match self {
            BalloonIcon::None | BalloonIcon::Custom { .. } => 0,
            BalloonIcon::Info => 1,
            BalloonIcon::Warning => 2,
            BalloonIcon::Error => 3,
        }
    }
}

/// A balloon notification above the notification area.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct BalloonNotification<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub icon: BalloonIcon,
    /// Suppresses the notification sound.
    pub silent: bool,
}

/// Balloon part of a [`NotificationDescriptor`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BalloonData {
    title: WideText<BALLOON_TITLE_CAPACITY>,
    body: WideText<BALLOON_BODY_CAPACITY>,
    icon: BalloonIcon,
    flags: InfoFlags,
}

impl BalloonData {
    fn new(notification: &BalloonNotification) -> Self {
        let mut flags = InfoFlags::empty();
        if let BalloonIcon::Custom { large, .. } = notification.icon {
            flags |= InfoFlags::USER;
            flags.set(InfoFlags::LARGE_ICON, large);
        }
        flags.set(InfoFlags::NOSOUND, notification.silent);
        BalloonData {
            title: WideText::new(notification.title),
            body: WideText::new(notification.body),
            icon: notification.icon,
            flags,
        }
    }

    pub fn title(&self) -> &WideText<BALLOON_TITLE_CAPACITY> {
        &self.title
    }

    pub fn body(&self) -> &WideText<BALLOON_BODY_CAPACITY> {
        &self.body
    }

    pub fn flags(&self) -> InfoFlags {
        self.flags
    }

    pub fn custom_icon(&self) -> Option<IconHandle> {
        match self.icon {
            BalloonIcon::Custom { icon, .. } => Some(icon),
            _ => None,
        }
    }

    /// The combined `dwInfoFlags` value.
    pub fn raw_info_flags(&self) -> u32 {
        self.icon.standard_icon_code() | self.flags.bits()
    }
}

/// The owner window and identity of a notification icon.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct IconAddress {
    pub window: WindowHandle,
    pub identity: IconIdentity,
}

/// One request to the shell notification service.
///
/// Descriptors are immutable and built fresh for every request, so a request only ever carries
/// the fields given to its constructor.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NotificationDescriptor {
    address: IconAddress,
    flags: NotifyFlags,
    callback_message: Option<u32>,
    tooltip: Option<WideText<TOOLTIP_CAPACITY>>,
    icon: Option<IconHandle>,
    balloon: Option<BalloonData>,
}

impl NotificationDescriptor {
    fn base(address: IconAddress) -> Self {
        NotificationDescriptor {
            address,
            flags: NotifyFlags::GUID,
            callback_message: None,
            tooltip: None,
            icon: None,
            balloon: None,
        }
    }

    /// Registers the icon, asking for events to be sent as `callback_message` to the owner window.
    pub fn for_add(address: IconAddress, callback_message: u32) -> Self {
        NotificationDescriptor {
            flags: NotifyFlags::GUID | NotifyFlags::MESSAGE,
            callback_message: Some(callback_message),
            ..Self::base(address)
        }
    }

    pub fn for_tooltip(address: IconAddress, text: &str) -> Self {
        NotificationDescriptor {
            flags: NotifyFlags::GUID | NotifyFlags::TIP,
            tooltip: Some(WideText::new(text)),
            ..Self::base(address)
        }
    }

    pub fn for_icon(address: IconAddress, icon: IconHandle) -> Self {
        NotificationDescriptor {
            flags: NotifyFlags::GUID | NotifyFlags::ICON,
            icon: Some(icon),
            ..Self::base(address)
        }
    }

    pub fn for_balloon(address: IconAddress, notification: &BalloonNotification) -> Self {
        NotificationDescriptor {
            flags: NotifyFlags::GUID | NotifyFlags::INFO,
            balloon: Some(BalloonData::new(notification)),
            ..Self::base(address)
        }
    }

    pub fn for_delete(address: IconAddress) -> Self {
        Self::base(address)
    }

    pub fn window(&self) -> WindowHandle {
        self.address.window
    }

    pub fn identity(&self) -> IconIdentity {
        self.address.identity
    }

    pub fn flags(&self) -> NotifyFlags {
        self.flags
    }

    pub fn callback_message(&self) -> Option<u32> {
        self.callback_message
    }

    pub fn tooltip(&self) -> Option<&WideText<TOOLTIP_CAPACITY>> {
        self.tooltip.as_ref()
    }

    pub fn icon(&self) -> Option<IconHandle> {
        self.icon
    }

    pub fn balloon(&self) -> Option<&BalloonData> {
        self.balloon.as_ref()
    }
}

/// An icon in the Windows notification area.
///
/// The icon is always associated with a window, which receives its events. It stays in the notification area
/// until [`NotificationIcon::dispose`] is called or the owner window goes away.
///
/// All calls must happen on the thread that owns the window.
#[derive(Debug)]
pub struct NotificationIcon<P> {
    platform: P,
    address: IconAddress,
}

#[cfg(test)]
static_assertions::assert_not_impl_any!(NotificationIcon<crate::platform::recording::RecordingPlatform>: Send, Sync);

impl<P: Platform> NotificationIcon<P> {
    /// Adds a new icon with a fresh random identity to the notification area.
    pub fn create(platform: P, window: WindowHandle, callback_message: u32) -> Result<Self, NotifyError> {
        let address = IconAddress {
            window,
            identity: IconIdentity::new_random(),
        };
        let call_data = NotificationDescriptor::for_add(address, callback_message);
        if !platform.shell_notify_icon(ShellCommand::Add, &call_data) {
            return Err(NotifyError::ShellRegistration);
        }
        debug!(identity = %address.identity, ?window, "Added notification icon");
        Ok(NotificationIcon { platform, address })
    }

    pub fn identity(&self) -> IconIdentity {
        self.address.identity
    }

    pub fn window(&self) -> WindowHandle {
        self.address.window
    }

    /// Sets the tooltip text when hovering over the icon with the mouse.
    pub fn set_tooltip(&mut self, text: &str) -> Result<(), NotifyError> {
        let call_data = NotificationDescriptor::for_tooltip(self.address, text);
        self.modify(&call_data, ShellUpdate::Tooltip)
    }

    /// Sets the icon graphics.
    pub fn set_icon(&mut self, icon: IconHandle) -> Result<(), NotifyError> {
        let call_data = NotificationDescriptor::for_icon(self.address, icon);
        self.modify(&call_data, ShellUpdate::Icon)
    }

    /// Shows a plain text balloon notification.
    pub fn notify(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.show_balloon(&BalloonNotification {
            title,
            body,
            ..Default::default()
        })
    }

    /// Shows a balloon notification with the given icon in the large size.
    pub fn notify_with_icon(&mut self, title: &str, body: &str, icon: IconHandle) -> Result<(), NotifyError> {
        self.show_balloon(&BalloonNotification {
            title,
            body,
            icon: BalloonIcon::Custom { icon, large: true },
            silent: false,
        })
    }

    /// Triggers a balloon notification above the notification icon.
    pub fn show_balloon(&mut self, notification: &BalloonNotification) -> Result<(), NotifyError> {
        let call_data = NotificationDescriptor::for_balloon(self.address, notification);
        self.modify(&call_data, ShellUpdate::Balloon)
    }

    /// Removes the icon from the notification area.
    ///
    /// Never fails: removing an icon that is already gone is a no-op.
    pub fn dispose(&mut self) {
        let call_data = NotificationDescriptor::for_delete(self.address);
        if !self.platform.shell_notify_icon(ShellCommand::Delete, &call_data) {
            debug!(identity = %self.address.identity, "Notification icon was already removed");
        }
    }

    fn modify(&self, call_data: &NotificationDescriptor, update: ShellUpdate) -> Result<(), NotifyError> {
        if self.platform.shell_notify_icon(ShellCommand::Modify, call_data) {
            debug!(identity = %self.address.identity, %update, "Updated notification icon");
            Ok(())
        } else {
            Err(NotifyError::ShellUpdate { update })
        }
    }
}
