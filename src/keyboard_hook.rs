use crate::keys::KeyCode;
use anyhow::Result;
use std::sync::Arc;

/// Whether a hook event is a press (including auto-repeat) or a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// Callback invoked for every key event seen by a hook.
pub type KeySink = Arc<dyn Fn(KeyCode, KeyState) + Send + Sync>;

const WM_KEYDOWN: u32 = 0x0100;
const WM_KEYUP: u32 = 0x0101;
const WM_SYSKEYDOWN: u32 = 0x0104;
const WM_SYSKEYUP: u32 = 0x0105;

/// Translate a low-level keyboard hook message. Injected events are passed
/// on like physical ones so keys synthesised by remapping tools still work.
pub fn translate_hook_message(msg: u32, vk_code: u32) -> Option<(KeyCode, KeyState)> {
    let state = match msg {
        WM_KEYDOWN | WM_SYSKEYDOWN => KeyState::Down,
        WM_KEYUP | WM_SYSKEYUP => KeyState::Up,
        _ => return None,
    };
    Some((KeyCode::from_vk(vk_code), state))
}

/// An OS-level keyboard listener that works regardless of window focus.
pub trait HookBackend: Send {
    /// Start delivering key-down events to `sink`. Replaces any sink from a
    /// previous install.
    fn install(&mut self, sink: KeySink) -> Result<()>;

    /// Stop delivering events. Safe to call when nothing is installed.
    fn uninstall(&mut self) -> Result<()>;

    fn is_installed(&self) -> bool;

    /// Whether this backend can watch `key` at all.
    fn supports(&self, key: KeyCode) -> bool {
        key.to_vk().is_some()
    }
}

/// Backend for platforms without a global keyboard hook.
#[derive(Debug, Default)]
pub struct UnsupportedHook;

impl HookBackend for UnsupportedHook {
    fn install(&mut self, _sink: KeySink) -> Result<()> {
        anyhow::bail!("global keyboard hooks are not supported on this platform")
    }

    fn uninstall(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_installed(&self) -> bool {
        false
    }

    fn supports(&self, _key: KeyCode) -> bool {
        false
    }
}

pub fn default_backend() -> Box<dyn HookBackend> {
    #[cfg(windows)]
    {
        Box::new(platform::LowLevelKeyboardHook::default())
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedHook)
    }
}

#[cfg(windows)]
pub use platform::LowLevelKeyboardHook;

#[cfg(windows)]
mod platform {
    use super::{HookBackend, KeySink};
    use anyhow::{anyhow, Result};
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use std::thread::JoinHandle;
    use std::time::Duration;

    // The hook procedure has no user data pointer, so the active sink lives
    // here. Only the backend that installed it clears it.
    static HOOK_SINK: Lazy<Mutex<Option<KeySink>>> = Lazy::new(|| Mutex::new(None));

    #[derive(Debug)]
    struct HookThread {
        thread_id: u32,
        join: JoinHandle<()>,
    }

    /// `WH_KEYBOARD_LL` hook running its own message loop thread.
    #[derive(Debug, Default)]
    pub struct LowLevelKeyboardHook {
        hook_thread: Option<HookThread>,
    }

    impl HookBackend for LowLevelKeyboardHook {
        fn install(&mut self, sink: KeySink) -> Result<()> {
            if let Ok(mut guard) = HOOK_SINK.lock() {
                *guard = Some(sink);
            }

            if self.hook_thread.is_some() {
                return Ok(());
            }

            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::System::Threading::GetCurrentThreadId;
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
                UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
            };

            let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<u32>>(1);

            let join = std::thread::spawn(move || {
                let mut msg = MSG::default();
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };
                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let keyboard_hook = match unsafe {
                    SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
                } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(thread_id));
                tracing::debug!(thread_id, "keyboard hook installed");

                loop {
                    let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if r.0 <= 0 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(keyboard_hook);
                }
                tracing::debug!(thread_id, "keyboard hook removed");
            });

            let thread_id = match ready_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(Ok(id)) => id,
                Ok(Err(err)) => {
                    clear_sink();
                    return Err(err);
                }
                Err(_) => {
                    clear_sink();
                    return Err(anyhow!("keyboard hook thread did not signal readiness"));
                }
            };

            self.hook_thread = Some(HookThread { thread_id, join });
            Ok(())
        }

        fn uninstall(&mut self) -> Result<()> {
            clear_sink();

            if let Some(th) = self.hook_thread.take() {
                use windows::Win32::Foundation::{LPARAM, WPARAM};
                use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
                unsafe {
                    let _ = PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
                let _ = th.join.join();
            }
            Ok(())
        }

        fn is_installed(&self) -> bool {
            self.hook_thread.is_some()
        }
    }

    impl Drop for LowLevelKeyboardHook {
        fn drop(&mut self) {
            let _ = self.uninstall();
        }
    }

    fn clear_sink() {
        if let Ok(mut guard) = HOOK_SINK.lock() {
            *guard = None;
        }
    }

    unsafe extern "system" fn keyboard_hook_proc(
        n_code: i32,
        w_param: windows::Win32::Foundation::WPARAM,
        l_param: windows::Win32::Foundation::LPARAM,
    ) -> windows::Win32::Foundation::LRESULT {
        use windows::Win32::UI::WindowsAndMessaging::{CallNextHookEx, HC_ACTION, KBDLLHOOKSTRUCT};

        if n_code == HC_ACTION as i32 {
            let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
            let event = super::translate_hook_message(w_param.0 as u32, info.vkCode);
            if let Some((key, state)) = event {
                // Clone out so the sink never runs under the lock.
                let sink = HOOK_SINK.lock().ok().and_then(|guard| guard.clone());
                if let Some(sink) = sink {
                    sink(key, state);
                }
            }
        }

        CallNextHookEx(
            windows::Win32::UI::WindowsAndMessaging::HHOOK(std::ptr::null_mut()),
            n_code,
            w_param,
            l_param,
        )
    }
}
