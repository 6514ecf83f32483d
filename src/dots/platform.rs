use anyhow::Result;
use raw_window_handle::RawWindowHandle;

/// OS-specific window styling applied once the overlay window exists.
pub trait PlatformWindowAttributes {
    /// Make `window` ignore pointer and keyboard input and keep it topmost.
    fn apply_click_through(&self, window: RawWindowHandle) -> Result<()>;

    fn supports_click_through(&self) -> bool;
}

/// Used where click-through is not implemented; the overlay still renders but
/// captures input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWindowAttributes;

impl PlatformWindowAttributes for NoopWindowAttributes {
    fn apply_click_through(&self, _window: RawWindowHandle) -> Result<()> {
        Ok(())
    }

    fn supports_click_through(&self) -> bool {
        false
    }
}

#[cfg(windows)]
pub use windows_impl::Win32WindowAttributes;

/// Attribute implementation for the current OS.
pub fn native() -> Box<dyn PlatformWindowAttributes> {
    #[cfg(windows)]
    {
        Box::new(Win32WindowAttributes)
    }
    #[cfg(not(windows))]
    {
        Box::new(NoopWindowAttributes)
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::PlatformWindowAttributes;
    use anyhow::{anyhow, Result};
    use raw_window_handle::RawWindowHandle;
    use windows::Win32::Foundation::{COLORREF, HWND};
    use windows::Win32::UI::WindowsAndMessaging::{
        GetWindowLongPtrW, SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos,
        GWL_EXSTYLE, HWND_TOPMOST, LAYERED_WINDOW_ATTRIBUTES_FLAGS, LWA_ALPHA, SWP_NOMOVE,
        SWP_NOSIZE, WINDOW_EX_STYLE, WS_EX_LAYERED, WS_EX_TRANSPARENT,
    };

    pub fn click_through_ex_style(current: WINDOW_EX_STYLE) -> WINDOW_EX_STYLE {
        current | WS_EX_LAYERED | WS_EX_TRANSPARENT
    }

    /// A layered window stays hidden until its attributes are set.
    pub fn layered_attributes() -> (COLORREF, u8, LAYERED_WINDOW_ATTRIBUTES_FLAGS) {
        (COLORREF(0), 255, LWA_ALPHA)
    }

    #[derive(Debug, Default, Clone, Copy)]
    pub struct Win32WindowAttributes;

    impl PlatformWindowAttributes for Win32WindowAttributes {
        fn apply_click_through(&self, window: RawWindowHandle) -> Result<()> {
            let hwnd = match window {
                RawWindowHandle::Win32(handle) => HWND(handle.hwnd.get() as *mut core::ffi::c_void),
                other => return Err(anyhow!("expected a Win32 window handle, got {other:?}")),
            };

            unsafe {
                let current = WINDOW_EX_STYLE(GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as u32);
                let style = click_through_ex_style(current);
                let _ = SetWindowLongPtrW(hwnd, GWL_EXSTYLE, style.0 as isize);
                let (key, alpha, flags) = layered_attributes();
                SetLayeredWindowAttributes(hwnd, key, alpha, flags)?;
                SetWindowPos(hwnd, HWND_TOPMOST, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE)?;
            }
            tracing::debug!("applied click-through window attributes");
            Ok(())
        }

        fn supports_click_through(&self) -> bool {
            true
        }
    }

    #[cfg(test)]
    mod windows_tests {
        use super::{click_through_ex_style, layered_attributes};
        use windows::Win32::Foundation::COLORREF;
        use windows::Win32::UI::WindowsAndMessaging::{
            LWA_ALPHA, LWA_COLORKEY, WINDOW_EX_STYLE, WS_EX_LAYERED, WS_EX_TOOLWINDOW,
            WS_EX_TRANSPARENT,
        };

        #[test]
        fn style_adds_layered_and_transparent_bits() {
            let style = click_through_ex_style(WS_EX_TOOLWINDOW);
            assert_ne!(style.0 & WS_EX_LAYERED.0, 0);
            assert_ne!(style.0 & WS_EX_TRANSPARENT.0, 0);
            assert_ne!(style.0 & WS_EX_TOOLWINDOW.0, 0);
            assert_eq!(click_through_ex_style(WINDOW_EX_STYLE(0)).0, 0x0008_0020);
        }

        #[test]
        fn layered_window_is_made_visible_at_full_alpha() {
            let (key, alpha, flags) = layered_attributes();
            assert_eq!(key, COLORREF(0));
            assert_eq!(alpha, 255);
            assert_eq!(flags, LWA_ALPHA);
            assert_eq!(flags.0 & LWA_COLORKEY.0, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_accepts_any_handle() {
        let handle = RawWindowHandle::Web(raw_window_handle::WebWindowHandle::new(1));
        assert!(NoopWindowAttributes.apply_click_through(handle).is_ok());
        assert!(!NoopWindowAttributes.supports_click_through());
    }

    #[test]
    fn native_reports_capability_per_os() {
        assert_eq!(native().supports_click_through(), cfg!(windows));
    }
}
