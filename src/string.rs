use std::fmt::{
    self,
    Debug,
    Formatter,
};
use std::iter::once;

/// Max. tooltip length of a notification icon, including the terminating zero.
pub const TOOLTIP_CAPACITY: usize = 128;
/// Max. balloon title length, including the terminating zero.
pub const BALLOON_TITLE_CAPACITY: usize = 64;
/// Max. balloon body length, including the terminating zero.
pub const BALLOON_BODY_CAPACITY: usize = 256;

/// Zero terminated UTF-16 text in a fixed size buffer, as used by the shell notification structures.
///
/// Text longer than the buffer is truncated. A surrogate pair is never split.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct WideText<const N: usize> {
    units: [u16; N],
}

impl<const N: usize> WideText<N> {
    pub fn new(text: &str) -> Self {
        let mut units = [0; N];
        let mut len = 0;
        for ch in text.chars() {
            let mut buffer = [0; 2];
            let encoded = ch.encode_utf16(&mut buffer);
            if len + encoded.len() > N.saturating_sub(1) {
                break;
            }
            units[len..len + encoded.len()].copy_from_slice(encoded);
            len += encoded.len();
        }
        WideText { units }
    }

    /// The text units without the terminating zero.
    pub fn as_units(&self) -> &[u16] {
        let len = self.units.iter().position(|&unit| unit == 0).unwrap_or(N);
        &self.units[..len]
    }

    /// The whole buffer including padding zeros, ready to be copied into an API struct.
    pub fn as_buffer(&self) -> &[u16; N] {
        &self.units
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.as_units())
    }
}

impl<const N: usize> Default for WideText<N> {
    fn default() -> Self {
        WideText { units: [0; N] }
    }
}

impl<const N: usize> Debug for WideText<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.to_string_lossy(), f)
    }
}

/// Zero terminated UTF-16 string of arbitrary length.
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Clone, Eq, PartialEq, Debug)]
pub(crate) struct ZeroTerminatedWideString(pub(crate) Vec<u16>);

impl ZeroTerminatedWideString {
    pub(crate) fn from_str(text: &str) -> Self {
        Self(text.encode_utf16().chain(once(0)).collect())
    }

    #[cfg(windows)]
    pub(crate) fn from_os_str(text: impl AsRef<std::ffi::OsStr>) -> Self {
        use std::os::windows::ffi::OsStrExt;
        Self(text.as_ref().encode_wide().chain(once(0)).collect())
    }

    #[cfg(windows)]
    pub(crate) fn as_raw_pcwstr(&self) -> windows::core::PCWSTR {
        windows::core::PCWSTR::from_raw(self.0.as_ptr())
    }
}
