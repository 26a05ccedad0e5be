use crate::error::ViewerError;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Interval between automatic joystick rescans.
pub const RESCAN_INTERVAL: Duration = Duration::from_secs(5);

/// A connected joystick as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickInfo {
    pub id: u32,
    pub name: String,
    pub button_count: u32,
}

/// Platform access to joysticks.
pub trait JoystickBackend: Send {
    /// List the joysticks that are connected right now.
    fn enumerate(&mut self) -> Vec<JoystickInfo>;

    /// Current pressed state of every button on `id`, or `None` if the
    /// device cannot be read.
    fn read_buttons(&self, id: u32) -> Option<Vec<bool>>;
}

/// Pressed state of every button on every registered device.
pub type ButtonSnapshot = BTreeMap<u32, Vec<bool>>;

/// Registered joysticks, rebuilt wholesale on each rescan.
pub struct DeviceRegistry {
    backend: Box<dyn JoystickBackend>,
    devices: BTreeMap<u32, JoystickInfo>,
    last_scan: Option<Instant>,
    interval: Duration,
}

impl DeviceRegistry {
    pub fn new(backend: Box<dyn JoystickBackend>) -> Self {
        Self {
            backend,
            devices: BTreeMap::new(),
            last_scan: None,
            interval: RESCAN_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Replace the registry with the backend's current device list.
    pub fn rescan(&mut self) {
        self.rescan_at(Instant::now());
    }

    fn rescan_at(&mut self, now: Instant) {
        let fresh: BTreeMap<u32, JoystickInfo> = self
            .backend
            .enumerate()
            .into_iter()
            .map(|info| (info.id, info))
            .collect();

        for id in self.devices.keys().filter(|id| !fresh.contains_key(id)) {
            tracing::info!(joystick = id, "joystick disconnected");
        }
        for info in fresh.values().filter(|i| !self.devices.contains_key(&i.id)) {
            tracing::info!(
                joystick = info.id,
                name = %info.name,
                buttons = info.button_count,
                "joystick connected"
            );
        }

        self.devices = fresh;
        self.last_scan = Some(now);
    }

    /// Rescan if the interval has elapsed since the last scan. Returns
    /// whether a scan happened.
    pub fn rescan_if_due(&mut self, now: Instant) -> bool {
        let due = match self.last_scan {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if due {
            self.rescan_at(now);
        }
        due
    }

    pub fn contains(&self, id: u32) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<&JoystickInfo> {
        self.devices.get(&id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &JoystickInfo> {
        self.devices.values()
    }

    /// Whether `button` on joystick `id` is held.
    pub fn is_pressed(&self, id: u32, button: u32) -> Result<bool, ViewerError> {
        let info = self
            .devices
            .get(&id)
            .ok_or(ViewerError::DeviceUnavailable(id))?;
        if button >= info.button_count {
            return Ok(false);
        }
        let buttons = self
            .backend
            .read_buttons(id)
            .ok_or(ViewerError::DeviceUnavailable(id))?;
        Ok(buttons.get(button as usize).copied().unwrap_or(false))
    }

    /// Pressed state of all buttons on all registered devices. Devices that
    /// fail to read are left out.
    pub fn snapshot(&self) -> ButtonSnapshot {
        self.devices
            .values()
            .filter_map(|info| {
                let mut buttons = self.backend.read_buttons(info.id)?;
                buttons.resize(info.button_count as usize, false);
                Some((info.id, buttons))
            })
            .collect()
    }
}

/// Backend for platforms without joystick support.
#[derive(Debug, Default)]
pub struct NoJoysticks;

impl JoystickBackend for NoJoysticks {
    fn enumerate(&mut self) -> Vec<JoystickInfo> {
        Vec::new()
    }

    fn read_buttons(&self, _id: u32) -> Option<Vec<bool>> {
        None
    }
}

pub fn default_backend() -> Box<dyn JoystickBackend> {
    #[cfg(windows)]
    {
        Box::new(winmm::WinMmJoysticks::default())
    }
    #[cfg(not(windows))]
    {
        Box::new(NoJoysticks)
    }
}

#[cfg(windows)]
mod winmm {
    use super::{JoystickBackend, JoystickInfo};
    use windows::Win32::Media::Multimedia::{
        joyGetDevCapsW, joyGetNumDevs, joyGetPosEx, JOYCAPSW, JOYINFOEX,
    };

    const JOYERR_NOERROR: u32 = 0;
    const JOY_RETURNBUTTONS: u32 = 0x80;
    const MAX_BUTTONS: u32 = 32;

    /// Joysticks through the legacy multimedia API, which reports up to 32
    /// buttons per device.
    #[derive(Debug, Default)]
    pub struct WinMmJoysticks;

    impl JoystickBackend for WinMmJoysticks {
        fn enumerate(&mut self) -> Vec<JoystickInfo> {
            let slots = unsafe { joyGetNumDevs() };
            (0..slots)
                .filter_map(|id| {
                    let mut caps = JOYCAPSW::default();
                    let res = unsafe {
                        joyGetDevCapsW(
                            id as usize,
                            &mut caps,
                            std::mem::size_of::<JOYCAPSW>() as u32,
                        )
                    };
                    if res != JOYERR_NOERROR {
                        return None;
                    }
                    // Capabilities exist for unplugged slots; a position read does not.
                    self.read_buttons(id)?;
                    // Copied out: the struct is packed.
                    let pname = caps.szPname;
                    let button_count = caps.wNumButtons;
                    let name_len = pname.iter().position(|c| *c == 0).unwrap_or(pname.len());
                    Some(JoystickInfo {
                        id,
                        name: String::from_utf16_lossy(&pname[..name_len]),
                        button_count: button_count.min(MAX_BUTTONS),
                    })
                })
                .collect()
        }

        fn read_buttons(&self, id: u32) -> Option<Vec<bool>> {
            let mut info = JOYINFOEX {
                dwSize: std::mem::size_of::<JOYINFOEX>() as u32,
                dwFlags: JOY_RETURNBUTTONS,
                ..Default::default()
            };
            let res = unsafe { joyGetPosEx(id, &mut info) };
            if res != JOYERR_NOERROR {
                return None;
            }
            Some(
                (0..MAX_BUTTONS)
                    .map(|b| info.dwButtons & (1 << b) != 0)
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Scripted(Arc<Mutex<Vec<JoystickInfo>>>);

    impl JoystickBackend for Scripted {
        fn enumerate(&mut self) -> Vec<JoystickInfo> {
            self.0.lock().unwrap().clone()
        }

        fn read_buttons(&self, id: u32) -> Option<Vec<bool>> {
            let devices = self.0.lock().unwrap();
            let info = devices.iter().find(|d| d.id == id)?;
            Some((0..info.button_count).map(|b| b == 1).collect())
        }
    }

    fn pad(id: u32) -> JoystickInfo {
        JoystickInfo {
            id,
            name: format!("pad {id}"),
            button_count: 4,
        }
    }

    #[test]
    fn rescan_is_rate_limited() {
        let backend = Scripted::default();
        let mut registry = DeviceRegistry::new(Box::new(backend.clone()));
        let start = Instant::now();

        assert!(registry.rescan_if_due(start));
        backend.0.lock().unwrap().push(pad(0));
        assert!(!registry.rescan_if_due(start + Duration::from_secs(1)));
        assert!(!registry.contains(0));

        assert!(registry.rescan_if_due(start + RESCAN_INTERVAL));
        assert!(registry.contains(0));
    }

    #[test]
    fn disconnected_devices_are_dropped() {
        let backend = Scripted::default();
        backend.0.lock().unwrap().extend([pad(0), pad(1)]);
        let mut registry = DeviceRegistry::new(Box::new(backend.clone()));
        registry.rescan();
        assert_eq!(registry.devices().count(), 2);

        backend.0.lock().unwrap().retain(|d| d.id != 0);
        registry.rescan();
        assert!(!registry.contains(0));
        assert!(registry.contains(1));
        assert!(matches!(
            registry.is_pressed(0, 1),
            Err(ViewerError::DeviceUnavailable(0))
        ));
    }

    #[test]
    fn out_of_range_button_reads_as_released() {
        let backend = Scripted::default();
        backend.0.lock().unwrap().push(pad(3));
        let mut registry = DeviceRegistry::new(Box::new(backend));
        registry.rescan();

        assert_eq!(registry.is_pressed(3, 1).unwrap(), true);
        assert_eq!(registry.is_pressed(3, 0).unwrap(), false);
        assert_eq!(registry.is_pressed(3, 40).unwrap(), false);
        assert_eq!(
            registry.snapshot().get(&3),
            Some(&vec![false, true, false, false])
        );
    }
}
