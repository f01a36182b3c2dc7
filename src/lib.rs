/*!
Balloon notifications through an icon in the Windows notification area.

A hidden message window is created to own a notification icon, which is then used to show balloon
notifications with an optional custom icon.

All OS calls go through a [`Platform`](platform::Platform) value passed in at construction. On Windows,
[`Win32Platform`] binds to the real windowing and shell APIs.

# Example

```no_run
# #[cfg(windows)]
# fn main() -> Result<(), balloon_notify::NotifyError> {
let mut sender = balloon_notify::create_sender();
balloon_notify::send_message("Build finished", "My tool", "", &mut sender)?;
# Ok(())
# }
# #[cfg(not(windows))]
# fn main() {}
```
*/

pub mod error;
#[cfg_attr(not(windows), allow(dead_code))]
mod internal;
pub mod messaging;
pub mod platform;
pub mod sender;
pub mod string;
pub mod ui;

pub use error::NotifyError;
#[cfg(windows)]
pub use platform::win32::Win32Platform;
#[cfg(windows)]
pub use sender::create_sender;
pub use sender::{
    NotificationSender,
    SenderOptions,
    send_message,
};
