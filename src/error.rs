//! Error type for notification setup and updates.

use std::fmt::{
    Display,
    Formatter,
};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type of this crate.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The window class for the message window could not be registered.
    #[error("Cannot register window class: {0}")]
    ClassRegistration(#[source] io::Error),

    /// The message window could not be created.
    #[error("Cannot create message window: {0}")]
    WindowCreation(#[source] io::Error),

    /// The shell rejected adding the notification icon, e.g. because the window is invalid.
    #[error("Shell rejected notification icon registration")]
    ShellRegistration,

    /// The shell rejected modifying the notification icon.
    #[error("Shell rejected notification icon update: {update}")]
    ShellUpdate { update: ShellUpdate },

    /// An icon image could not be loaded.
    #[error("Icon not found: {location}")]
    IconNotFound {
        location: IconLocation,
        #[source]
        source: io::Error,
    },
}

/// The kind of 'modify' request that was rejected by the shell.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ShellUpdate {
    Tooltip,
    Icon,
    Balloon,
}

impl Display for ShellUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShellUpdate::Tooltip => "tooltip",
            ShellUpdate::Icon => "icon",
            ShellUpdate::Balloon => "balloon notification",
        };
        f.write_str(name)
    }
}

/// Where an icon was looked up.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum IconLocation {
    Resource(u16),
    File(PathBuf),
}

impl Display for IconLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IconLocation::Resource(id) => write!(f, "resource #{id}"),
            IconLocation::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = NotifyError::ShellUpdate {
            update: ShellUpdate::Balloon,
        };
        assert_eq!(
            err.to_string(),
            "Shell rejected notification icon update: balloon notification"
        );
        let err = NotifyError::IconNotFound {
            location: IconLocation::Resource(10),
            source: io::ErrorKind::NotFound.into(),
        };
        assert_eq!(err.to_string(), "Icon not found: resource #10");
        assert!(std::error::Error::source(&err).is_some());
    }
}
