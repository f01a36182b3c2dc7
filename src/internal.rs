use std::fmt::Display;
use std::io;
use std::panic::{
    AssertUnwindSafe,
    catch_unwind,
};
use std::process;

/// Conversions of raw API return values into [`io::Result`].
///
/// A value counts as 'null' if it equals its [`Default`], which covers `0`, `FALSE` and null handles.
pub(crate) trait ReturnValue: Copy + PartialEq + Default {
    fn if_null_to_error(self, error_gen: impl FnOnce() -> io::Error) -> io::Result<Self> {
        if self.is_null() {
            Err(error_gen())
        } else {
            Ok(self)
        }
    }

    #[inline]
    fn if_null_get_last_error(self) -> io::Result<Self> {
        self.if_null_to_error(io::Error::last_os_error)
    }

    #[inline]
    fn if_null_to_error_else_drop(self, error_gen: impl FnOnce() -> io::Error) -> io::Result<()> {
        self.if_null_to_error(error_gen).map(|_| ())
    }

    fn if_eq_to_error(self, other: Self, error_gen: impl FnOnce() -> io::Error) -> io::Result<Self> {
        if self == other {
            Err(error_gen())
        } else {
            Ok(self)
        }
    }

    #[inline]
    fn is_null(self) -> bool {
        self == Default::default()
    }
}

impl<T: Copy + PartialEq + Default> ReturnValue for T {}

pub(crate) fn custom_err_with_code<C>(err_text: &str, result_code: C) -> io::Error
where
    C: Display,
{
    io::Error::other(format!("{err_text}. Code: {result_code}"))
}

/// Runs code that is called from the OS, turning panics into a process abort.
///
/// Unwinding out of an `extern "system"` callback is undefined behavior.
pub(crate) fn catch_unwind_and_abort<F, R>(call: F) -> R
where
    F: FnOnce() -> R,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(_) => process::abort(),
    }
}
