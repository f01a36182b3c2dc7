use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::path::Path;

use tracing::warn;

use crate::error::{
    IconLocation,
    NotifyError,
};
use crate::platform::Platform;

/// Resource ID of the application icon embedded by common resource compilers.
pub const DEFAULT_APP_ICON_RESOURCE_ID: u16 = 10;

/// A (non-null) handle to an icon image.
///
/// Does not own the image, see [`LoadedIcon`] for that.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct IconHandle {
    raw_handle: NonZeroUsize,
    _marker: PhantomData<*mut ()>,
}

#[cfg(test)]
static_assertions::assert_not_impl_any!(IconHandle: Send, Sync);

#[cfg_attr(not(windows), allow(dead_code))]
impl IconHandle {
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

/// An icon image loaded by this process, released again on drop.
///
/// The shell keeps its own copy of icons passed to a notification icon, so this may be dropped
/// right after the shell calls using it.
#[derive(Debug)]
pub struct LoadedIcon<P: Platform> {
    platform: P,
    handle: IconHandle,
}

impl<P: Platform> LoadedIcon<P> {
    /// Loads an icon from the resources of the current executable.
    pub fn from_resource(platform: &P, resource_id: u16) -> Result<Self, NotifyError> {
        let handle = platform
            .load_icon_from_resource(resource_id)
            .map_err(|source| NotifyError::IconNotFound {
                location: IconLocation::Resource(resource_id),
                source,
            })?;
        Ok(LoadedIcon {
            platform: platform.clone(),
            handle,
        })
    }

    /// Loads an icon from an `.ico` file.
    pub fn from_file(platform: &P, path: &Path) -> Result<Self, NotifyError> {
        let handle =
            platform
                .load_icon_from_file(path)
                .map_err(|source| NotifyError::IconNotFound {
                    location: IconLocation::File(path.to_path_buf()),
                    source,
                })?;
        Ok(LoadedIcon {
            platform: platform.clone(),
            handle,
        })
    }

    /// Tries the embedded resource first, then the file.
    ///
    /// Returns `None` if neither can be loaded, callers are expected to carry on without an icon.
    pub fn load_with_fallback(platform: &P, resource_id: u16, fallback_path: &Path) -> Option<Self> {
        let resource_error = match Self::from_resource(platform, resource_id) {
            Ok(icon) => return Some(icon),
            Err(err) => err,
        };
        warn!(%resource_error, "Falling back to icon file");
        match Self::from_file(platform, fallback_path) {
            Ok(icon) => Some(icon),
            Err(file_error) => {
                warn!(%resource_error, %file_error, "No icon available");
                None
            }
        }
    }

    pub fn handle(&self) -> IconHandle {
        self.handle
    }
}

impl<P: Platform> Drop for LoadedIcon<P> {
    fn drop(&mut self) {
        self.platform.destroy_icon(self.handle);
    }
}
