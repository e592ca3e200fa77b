use std::cell::RefCell;
use std::ffi::CString;
use std::time::Instant;

use windows::core::PCSTR;
use windows::Win32::{
    Foundation::{HWND, LPARAM, LRESULT, RECT, WPARAM},
    System::LibraryLoader::GetModuleHandleA,
    UI::Input::KeyboardAndMouse::{VIRTUAL_KEY, VK_ESCAPE, VK_LEFT, VK_RIGHT},
    UI::WindowsAndMessaging::*,
};

use super::{run_frame, Application, FrameworkError};
use crate::gfx::d3d11::{Device, Graphics};
use crate::input::Key;

/// Shared between the message loop and `wnd_proc` through `GWLP_USERDATA`.
#[derive(Default)]
struct WindowState {
    key_events: Vec<(Key, bool)>,
}

/// Destroys the window when `run` returns, including on early errors, so
/// `wnd_proc` never reaches a `WindowState` that has been dropped.
struct WindowGuard(HWND);

impl Drop for WindowGuard {
    fn drop(&mut self) {
        unsafe {
            SetWindowLongPtrA(self.0, GWLP_USERDATA, 0);
            let _ = DestroyWindow(self.0);
        }
    }
}

/// Opens a window, initializes `app` and drives it until the window closes or
/// Escape is pressed.
pub fn run<A>(config: &crate::Config, app: &mut A) -> Result<(), FrameworkError>
where
    A: Application<Device = Device>,
{
    let class_name = windows::core::s!("window");
    let title = CString::new(app.title()).unwrap_or_default();

    let instance = unsafe { GetModuleHandleA(None)? };

    let wnd_class = WNDCLASSEXA {
        cbSize: std::mem::size_of::<WNDCLASSEXA>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        lpszClassName: class_name,
        ..Default::default()
    };
    if unsafe { RegisterClassExA(&wnd_class) } == 0 {
        return Err(windows::core::Error::from_win32().into());
    }

    let mut rect = RECT {
        left: 0,
        top: 0,
        right: config.client_width() as i32,
        bottom: config.client_height() as i32,
    };

    let state = RefCell::new(WindowState::default());

    let hwnd = unsafe {
        AdjustWindowRect(&mut rect, WS_OVERLAPPEDWINDOW, false)?;

        CreateWindowExA(
            WINDOW_EX_STYLE::default(),
            class_name,
            PCSTR(title.as_ptr() as *const u8),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            rect.right - rect.left,
            rect.bottom - rect.top,
            None,
            None,
            instance,
            Some(&state as *const RefCell<WindowState> as *const std::ffi::c_void),
        )?
    };
    let window = WindowGuard(hwnd);

    let mut graphics = Graphics::new(hwnd, config)?;

    app.initialize(&graphics.device)
        .inspect_err(|e| log::error!("Failed to initialize {}: {e}", app.title()))?;
    log::info!("Successfully initialized {}", app.title());

    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
    }

    let mut last_frame = Instant::now();
    let mut msg = MSG::default();
    while msg.message != WM_QUIT {
        if unsafe { PeekMessageA(&mut msg, None, 0, 0, PM_REMOVE) }.into() {
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageA(&msg);
            }
            continue;
        }

        for (key, pressed) in state.borrow_mut().key_events.drain(..) {
            app.key_changed(key, pressed);
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        run_frame(app, &mut graphics.context, dt);
        if let Err(e) = graphics.present() {
            log::error!("Failed to present: {e}");
        }
    }

    drop(graphics);
    drop(window);
    Ok(())
}

fn translate_key(wparam: WPARAM) -> Option<Key> {
    let key = VIRTUAL_KEY(wparam.0 as u16);
    match key {
        VK_LEFT => Some(Key::Left),
        VK_RIGHT => Some(Key::Right),
        VK_ESCAPE => Some(Key::Escape),
        VIRTUAL_KEY(code) => match u8::try_from(code) {
            Ok(b'W') => Some(Key::W),
            Ok(b'A') => Some(Key::A),
            Ok(b'S') => Some(Key::S),
            Ok(b'D') => Some(Key::D),
            _ => None,
        },
    }
}

extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CREATE => {
            unsafe {
                let data: &CREATESTRUCTA = &*(lparam.0 as *const CREATESTRUCTA);
                SetWindowLongPtrA(hwnd, GWLP_USERDATA, data.lpCreateParams as _);
            }
            LRESULT::default()
        }
        WM_KEYDOWN | WM_KEYUP => {
            let pressed = msg == WM_KEYDOWN;
            if let Some(key) = translate_key(wparam) {
                if key == Key::Escape && pressed {
                    unsafe { PostQuitMessage(0) };
                }

                let user_data = unsafe { GetWindowLongPtrA(hwnd, GWLP_USERDATA) };
                let state = user_data as *const RefCell<WindowState>;
                if let Some(state) = unsafe { state.as_ref() } {
                    if let Ok(mut state) = state.try_borrow_mut() {
                        state.key_events.push((key, pressed));
                    }
                }
            }
            LRESULT::default()
        }
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT::default()
        }
        _ => unsafe { DefWindowProcA(hwnd, msg, wparam, lparam) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::core::s;

    #[test]
    fn guard_destroys_window() {
        let hwnd = unsafe {
            CreateWindowExA(
                WINDOW_EX_STYLE::default(),
                s!("STATIC"),
                s!("guard"),
                WS_OVERLAPPED,
                0,
                0,
                16,
                16,
                None,
                None,
                None,
                None,
            )
            .unwrap()
        };
        assert!(unsafe { IsWindow(hwnd) }.as_bool());

        drop(WindowGuard(hwnd));
        assert!(!unsafe { IsWindow(hwnd) }.as_bool());
    }
}
