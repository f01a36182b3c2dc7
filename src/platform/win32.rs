//! [`Platform`] implementation using the Windows API.

use std::ffi::c_void;
use std::path::Path;
use std::ptr::{
    self,
    NonNull,
};
use std::{
    io,
    mem,
};

use tracing::warn;
use windows::Win32::Foundation::{
    BOOL,
    GetLastError,
    HINSTANCE,
    HWND,
    LPARAM,
    LRESULT,
    NO_ERROR,
    SetLastError,
    WPARAM,
};
use windows::Win32::System::Console::GetConsoleWindow;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentProcessId;
use windows::Win32::UI::Shell::{
    NOTIFY_ICON_DATA_FLAGS,
    NOTIFY_ICON_INFOTIP_FLAGS,
    NOTIFY_ICON_MESSAGE,
    NOTIFYICONDATAW,
    Shell_NotifyIconW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CS_HREDRAW,
    CS_VREDRAW,
    CreateWindowExW,
    DefWindowProcW,
    DestroyIcon,
    DestroyWindow,
    DispatchMessageW,
    GWLP_USERDATA,
    GetMessageW,
    GetWindowLongPtrW,
    GetWindowThreadProcessId,
    HICON,
    IMAGE_ICON,
    LR_DEFAULTSIZE,
    LR_LOADFROMFILE,
    LoadImageW,
    MSG,
    PostQuitMessage,
    RegisterClassExW,
    SW_HIDE,
    SW_SHOW,
    SetWindowLongPtrW,
    ShowWindow,
    ShowWindowAsync,
    TranslateMessage,
    WINDOW_EX_STYLE,
    WM_QUIT,
    WNDCLASSEXW,
    WS_THICKFRAME,
};
use windows::core::{
    GUID,
    PCWSTR,
};

use super::{
    Platform,
    PumpedMessage,
    WindowProcHandler,
};
use crate::internal::{
    ReturnValue,
    catch_unwind_and_abort,
    custom_err_with_code,
};
use crate::string::ZeroTerminatedWideString;
use crate::ui::messaging::WM_NCDESTROY;
use crate::ui::notification::{
    NotificationDescriptor,
    ShellCommand,
};
use crate::ui::{
    IconHandle,
    RawMessage,
    WindowClass,
    WindowGeometry,
    WindowHandle,
};
use windows_missing::*;

/// The Windows API bound to the module of the current executable.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Win32Platform {
    instance: HINSTANCE,
}

impl Win32Platform {
    pub fn new() -> io::Result<Self> {
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }?;
        Ok(Win32Platform {
            instance: module.into(),
        })
    }
}

impl Platform for Win32Platform {
    fn register_window_class(&self, class_name: &str) -> io::Result<()> {
        let class_name_wide = ZeroTerminatedWideString::from_str(class_name);
        // No need to reserve extra window memory if we only need a single pointer
        let class_def = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>().try_into().unwrap_or_else(|_| unreachable!()),
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(generic_window_proc),
            hInstance: self.instance,
            lpszClassName: class_name_wide.as_raw_pcwstr(),
            ..Default::default()
        };
        unsafe { RegisterClassExW(&class_def) }.if_null_get_last_error()?;
        Ok(())
    }

    fn create_window(
        &self,
        class: &WindowClass,
        title: &str,
        geometry: WindowGeometry,
        handler: WindowProcHandler,
    ) -> io::Result<WindowHandle> {
        let class_name = ZeroTerminatedWideString::from_str(class.name());
        let title = ZeroTerminatedWideString::from_str(title);
        let h_wnd: HWND = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class_name.as_raw_pcwstr(),
                title.as_raw_pcwstr(),
                WS_THICKFRAME,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                None,
                None,
                Some(self.instance),
                None,
            )?
        };
        let window = window_handle_from_hwnd(h_wnd).ok_or_else(io::Error::last_os_error)?;
        let handler_ptr: *mut WindowProcHandler = Box::into_raw(Box::new(handler));
        if let Err(err) = unsafe { set_user_data_ptr(h_wnd, handler_ptr) } {
            unsafe {
                drop(Box::from_raw(handler_ptr));
                let _ = DestroyWindow(h_wnd);
            }
            return Err(err);
        }
        Ok(window)
    }

    fn show_window(&self, window: WindowHandle) {
        unsafe {
            let _ = ShowWindow(hwnd_from_window_handle(window), SW_SHOW);
        }
    }

    fn destroy_window(&self, window: WindowHandle) -> io::Result<()> {
        unsafe { DestroyWindow(hwnd_from_window_handle(window)) }?;
        Ok(())
    }

    fn shell_notify_icon(&self, command: ShellCommand, descriptor: &NotificationDescriptor) -> bool {
        let call_data = get_notification_call_data(descriptor);
        unsafe { Shell_NotifyIconW(NOTIFY_ICON_MESSAGE(command.into()), &call_data) }.as_bool()
    }

    fn load_icon_from_resource(&self, resource_id: u16) -> io::Result<IconHandle> {
        let handle = unsafe {
            LoadImageW(
                Some(self.instance),
                MAKEINTRESOURCEW(resource_id),
                IMAGE_ICON,
                0,
                0,
                LR_DEFAULTSIZE,
            )?
        };
        icon_handle_from_hicon(HICON(handle.0)).ok_or_else(io::Error::last_os_error)
    }

    fn load_icon_from_file(&self, path: &Path) -> io::Result<IconHandle> {
        let file_name = ZeroTerminatedWideString::from_os_str(path);
        let handle = unsafe {
            LoadImageW(
                None,
                file_name.as_raw_pcwstr(),
                IMAGE_ICON,
                0,
                0,
                LR_DEFAULTSIZE | LR_LOADFROMFILE,
            )?
        };
        icon_handle_from_hicon(HICON(handle.0)).ok_or_else(io::Error::last_os_error)
    }

    fn destroy_icon(&self, icon: IconHandle) {
        if let Err(err) = unsafe { DestroyIcon(hicon_from_icon_handle(icon)) } {
            warn!(%err, "Cannot destroy icon");
        }
    }

    fn default_window_proc(&self, window: WindowHandle, message: RawMessage) -> isize {
        let result = unsafe {
            DefWindowProcW(
                hwnd_from_window_handle(window),
                message.message,
                WPARAM(message.w_param),
                LPARAM(message.l_param),
            )
        };
        result.0
    }

    fn post_quit_message(&self, exit_code: i32) {
        unsafe {
            PostQuitMessage(exit_code);
        }
    }

    fn pump_message(&self) -> io::Result<PumpedMessage> {
        let mut msg: MSG = Default::default();
        unsafe {
            GetMessageW(&mut msg, None, 0, 0).if_eq_to_error(BOOL(-1), io::Error::last_os_error)?;
        }
        if msg.message == WM_QUIT {
            // The exit code given to `PostQuitMessage` is passed in `wParam`
            return Ok(PumpedMessage::Quit(msg.wParam.0 as i32));
        }
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        Ok(PumpedMessage::Dispatched)
    }

    fn hide_owned_console_window(&self) {
        let console = unsafe { GetConsoleWindow() };
        if console.is_invalid() {
            return;
        }
        let mut console_process_id: u32 = 0;
        unsafe { GetWindowThreadProcessId(console, Some(&mut console_process_id)) };
        // A console inherited from e.g. a command prompt belongs to another process and must stay visible
        if console_process_id == unsafe { GetCurrentProcessId() } {
            unsafe {
                let _ = ShowWindowAsync(console, SW_HIDE);
            }
        }
    }
}

fn get_notification_call_data(descriptor: &NotificationDescriptor) -> NOTIFYICONDATAW {
    let mut icon_data = NOTIFYICONDATAW {
        cbSize: mem::size_of::<NOTIFYICONDATAW>()
            .try_into()
            .expect("NOTIFYICONDATAW size conversion failed"),
        hWnd: hwnd_from_window_handle(descriptor.window()),
        uFlags: NOTIFY_ICON_DATA_FLAGS(descriptor.flags().bits()),
        guidItem: GUID::from_u128(descriptor.identity().as_u128()),
        ..Default::default()
    };
    if let Some(callback_message) = descriptor.callback_message() {
        icon_data.uCallbackMessage = callback_message;
    }
    if let Some(icon) = descriptor.icon() {
        icon_data.hIcon = hicon_from_icon_handle(icon);
    }
    if let Some(tooltip) = descriptor.tooltip() {
        icon_data.szTip = *tooltip.as_buffer();
    }
    if let Some(balloon) = descriptor.balloon() {
        icon_data.szInfoTitle = *balloon.title().as_buffer();
        icon_data.szInfo = *balloon.body().as_buffer();
        icon_data.dwInfoFlags = NOTIFY_ICON_INFOTIP_FLAGS(balloon.raw_info_flags());
        if let Some(icon) = balloon.custom_icon() {
            icon_data.hBalloonIcon = hicon_from_icon_handle(icon);
        }
    }
    icon_data
}

unsafe extern "system" fn generic_window_proc(
    h_wnd: HWND,
    message: u32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    let call = move || {
        // When creating a window, the handler is not set yet before the first calls to this function
        let handler_ptr = unsafe { get_user_data_ptr::<WindowProcHandler>(h_wnd) };
        let result = match (handler_ptr, window_handle_from_hwnd(h_wnd)) {
            (Some(handler), Some(window)) => {
                let raw_message = RawMessage::new(message, w_param.0, l_param.0);
                LRESULT((unsafe { handler.as_ref() })(window, raw_message))
            }
            _ => unsafe { DefWindowProcW(h_wnd, message, w_param, l_param) },
        };
        // Last message a window receives
        if message == WM_NCDESTROY {
            if let Some(handler) = handler_ptr {
                unsafe {
                    let _ = set_user_data_ptr::<WindowProcHandler>(h_wnd, ptr::null());
                    drop(Box::from_raw(handler.as_ptr()));
                }
            }
        }
        result
    };
    catch_unwind_and_abort(call)
}

unsafe fn get_user_data_ptr<T>(h_wnd: HWND) -> Option<NonNull<T>> {
    let ptr_value = unsafe { GetWindowLongPtrW(h_wnd, GWLP_USERDATA) };
    NonNull::new(ptr_value as *mut T)
}

unsafe fn set_user_data_ptr<T>(h_wnd: HWND, ptr: *const T) -> io::Result<()> {
    unsafe { SetLastError(NO_ERROR) };
    let ret_val = unsafe { SetWindowLongPtrW(h_wnd, GWLP_USERDATA, ptr as isize) };
    if ret_val == 0 {
        let err_val = unsafe { GetLastError() };
        if err_val != NO_ERROR {
            return Err(custom_err_with_code(
                "Cannot set window procedure handler",
                err_val.0,
            ));
        }
    }
    Ok(())
}

fn window_handle_from_hwnd(h_wnd: HWND) -> Option<WindowHandle> {
    WindowHandle::from_raw(h_wnd.0.expose_provenance())
}

fn hwnd_from_window_handle(window: WindowHandle) -> HWND {
    HWND(ptr::with_exposed_provenance_mut::<c_void>(window.as_raw()))
}

fn icon_handle_from_hicon(h_icon: HICON) -> Option<IconHandle> {
    IconHandle::from_raw(h_icon.0.expose_provenance())
}

fn hicon_from_icon_handle(icon: IconHandle) -> HICON {
    HICON(ptr::with_exposed_provenance_mut::<c_void>(icon.as_raw()))
}

mod windows_missing {
    use windows::core::PCWSTR;

    // Temporary function until this gets resolved: https://github.com/microsoft/windows-rs/issues/641
    #[allow(non_snake_case)]
    #[inline]
    pub fn MAKEINTRESOURCEW(i: u16) -> PCWSTR {
        PCWSTR(usize::from(i) as *const u16)
    }
}
