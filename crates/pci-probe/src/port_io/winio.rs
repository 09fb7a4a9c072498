//! WinIo driver backend.
//!
//! WinIo ships as a user-mode DLL plus a kernel driver (`.sys`) that must sit
//! next to it. The DLL is loaded at runtime and its four exports are resolved
//! once; the driver itself is only started by `InitializeWinIo`.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use super::{PortIo, PortWidth};
use crate::errors::{ProbeError, ProbeResult};

pub const DEFAULT_WINIO_DIR: &str = r"C:\WinIo\Binaries";

#[cfg(target_pointer_width = "64")]
const WINIO_BASENAME: &str = "WinIo64";
#[cfg(not(target_pointer_width = "64"))]
const WINIO_BASENAME: &str = "WinIo32";

pub struct WinIo {
    dll_path: PathBuf,
    initialized: Cell<bool>,
    #[cfg(target_os = "windows")]
    api: ffi::WinIoApi,
}

impl WinIo {
    /// Load the WinIo DLL from `dir`. Both the DLL and its driver must exist.
    pub fn load(dir: impl AsRef<Path>) -> ProbeResult<Self> {
        let dir = dir.as_ref();
        let dll_path = dir.join(format!("{WINIO_BASENAME}.dll"));
        let sys_path = dir.join(format!("{WINIO_BASENAME}.sys"));

        for path in [&dll_path, &sys_path] {
            match std::fs::metadata(path) {
                Ok(_) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Err(ProbeError::MissingDriverFile(path.clone()));
                }
                Err(err) => return Err(err.into()),
            }
        }

        #[cfg(target_os = "windows")]
        {
            let api = ffi::WinIoApi::load(&dll_path)?;
            tracing::info!(dll = %dll_path.display(), "WinIo library loaded");
            Ok(Self {
                dll_path,
                initialized: Cell::new(false),
                api,
            })
        }
        #[cfg(not(target_os = "windows"))]
        {
            tracing::warn!(dll = %dll_path.display(), "WinIo is a stub on non-Windows");
            Err(ProbeError::CapabilityUnavailable(
                "WinIo port access requires Windows".to_string(),
            ))
        }
    }

    pub fn dll_path(&self) -> &Path {
        &self.dll_path
    }
}

impl PortIo for WinIo {
    fn init(&self) -> ProbeResult<()> {
        if self.initialized.get() {
            return Ok(());
        }

        #[cfg(target_os = "windows")]
        {
            if !self.api.initialize() {
                return Err(ProbeError::CapabilityUnavailable(
                    "InitializeWinIo failed; run as Administrator with the driver next to the DLL"
                        .to_string(),
                ));
            }
            self.initialized.set(true);
            Ok(())
        }
        #[cfg(not(target_os = "windows"))]
        {
            Err(ProbeError::CapabilityUnavailable(
                "WinIo port access requires Windows".to_string(),
            ))
        }
    }

    fn shutdown(&self) {
        if !self.initialized.replace(false) {
            return;
        }
        #[cfg(target_os = "windows")]
        self.api.shutdown();
    }

    fn write_port(&self, port: u16, value: u32, width: PortWidth) -> bool {
        if !self.initialized.get() {
            return false;
        }

        #[cfg(target_os = "windows")]
        {
            self.api.set_port_val(port, value, width.bytes())
        }
        #[cfg(not(target_os = "windows"))]
        {
            let _ = (port, value, width);
            false
        }
    }

    fn read_port(&self, port: u16, width: PortWidth) -> Option<u32> {
        if !self.initialized.get() {
            return None;
        }

        #[cfg(target_os = "windows")]
        {
            self.api.get_port_val(port, width.bytes())
        }
        #[cfg(not(target_os = "windows"))]
        {
            let _ = (port, width);
            None
        }
    }
}

impl Drop for WinIo {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(target_os = "windows")]
mod ffi {
    use std::ffi::CString;
    use std::path::Path;

    use windows::core::PCSTR;
    use windows::Win32::Foundation::{FreeLibrary, HMODULE};
    use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};

    use crate::errors::{ProbeError, ProbeResult};

    type RawProc = unsafe extern "system" fn() -> isize;
    type InitializeFn = unsafe extern "system" fn() -> i32;
    type ShutdownFn = unsafe extern "system" fn();
    type GetPortValFn = unsafe extern "system" fn(u16, *mut u32, u8) -> i32;
    type SetPortValFn = unsafe extern "system" fn(u16, u32, u8) -> i32;

    pub(super) struct WinIoApi {
        module: HMODULE,
        initialize: InitializeFn,
        shutdown: ShutdownFn,
        get_port_val: GetPortValFn,
        set_port_val: SetPortValFn,
    }

    impl WinIoApi {
        pub(super) fn load(dll_path: &Path) -> ProbeResult<Self> {
            let raw_path = CString::new(dll_path.to_string_lossy().into_owned()).map_err(|_| {
                ProbeError::CapabilityUnavailable(format!(
                    "invalid WinIo path {}",
                    dll_path.display()
                ))
            })?;

            // SAFETY: `raw_path` is NUL-terminated and outlives the call.
            let module = unsafe { LoadLibraryA(PCSTR(raw_path.as_ptr().cast())) }.map_err(|err| {
                ProbeError::CapabilityUnavailable(format!(
                    "failed to load {}: {err}",
                    dll_path.display()
                ))
            })?;

            let resolved = (|| {
                let initialize = resolve(module, "InitializeWinIo")?;
                let shutdown = resolve(module, "ShutdownWinIo")?;
                let get_port_val = resolve(module, "GetPortVal")?;
                let set_port_val = resolve(module, "SetPortVal")?;
                // SAFETY: signatures match the exports documented by WinIo.
                unsafe {
                    Ok::<_, ProbeError>((
                        std::mem::transmute::<RawProc, InitializeFn>(initialize),
                        std::mem::transmute::<RawProc, ShutdownFn>(shutdown),
                        std::mem::transmute::<RawProc, GetPortValFn>(get_port_val),
                        std::mem::transmute::<RawProc, SetPortValFn>(set_port_val),
                    ))
                }
            })();

            match resolved {
                Ok((initialize, shutdown, get_port_val, set_port_val)) => Ok(Self {
                    module,
                    initialize,
                    shutdown,
                    get_port_val,
                    set_port_val,
                }),
                Err(err) => {
                    // SAFETY: `module` came from LoadLibraryA above and is not used again.
                    let _ = unsafe { FreeLibrary(module) };
                    Err(err)
                }
            }
        }

        pub(super) fn initialize(&self) -> bool {
            // SAFETY: resolved from the loaded module, which stays loaded until drop.
            unsafe { (self.initialize)() != 0 }
        }

        pub(super) fn shutdown(&self) {
            // SAFETY: as above.
            unsafe { (self.shutdown)() }
        }

        pub(super) fn get_port_val(&self, port: u16, width: u8) -> Option<u32> {
            let mut value = 0u32;
            // SAFETY: `value` is a valid, writable u32 for the duration of the call.
            let ok = unsafe { (self.get_port_val)(port, &mut value, width) } != 0;
            ok.then_some(value)
        }

        pub(super) fn set_port_val(&self, port: u16, value: u32, width: u8) -> bool {
            // SAFETY: plain value arguments.
            unsafe { (self.set_port_val)(port, value, width) != 0 }
        }
    }

    impl Drop for WinIoApi {
        fn drop(&mut self) {
            // SAFETY: the module handle is owned by this struct.
            let _ = unsafe { FreeLibrary(self.module) };
        }
    }

    fn resolve(module: HMODULE, name: &'static str) -> ProbeResult<RawProc> {
        let symbol = CString::new(name).map_err(|_| ProbeError::MissingEntryPoint(name))?;
        // SAFETY: `symbol` is NUL-terminated and `module` is a live handle.
        unsafe { GetProcAddress(module, PCSTR(symbol.as_ptr().cast())) }
            .ok_or(ProbeError::MissingEntryPoint(name))
    }
}

#[cfg(test)]
mod tests {
    use super::{WinIo, WINIO_BASENAME};
    use crate::errors::ProbeError;

    #[test]
    fn load_reports_missing_dll_before_touching_the_loader() {
        let dir = std::env::temp_dir().join(format!(
            "hwlab-winio-missing-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));

        let err = WinIo::load(&dir).err().expect("missing dll must fail");
        match err {
            ProbeError::MissingDriverFile(path) => {
                assert_eq!(path, dir.join(format!("{WINIO_BASENAME}.dll")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_requires_driver_next_to_dll() {
        let dir = std::env::temp_dir().join(format!(
            "hwlab-winio-nosys-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or_default()
        ));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let dll = dir.join(format!("{WINIO_BASENAME}.dll"));
        std::fs::write(&dll, b"x").expect("write placeholder dll");

        let err = WinIo::load(&dir).err().expect("missing sys must fail");
        assert!(err.to_string().contains(".sys"));

        let _ = std::fs::remove_file(dll);
        let _ = std::fs::remove_dir(dir);
    }
}
