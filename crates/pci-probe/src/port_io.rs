//! Privileged I/O-port access.
//!
//! Configuration mechanism #1 needs raw `out`/`in` instructions on ports
//! 0xCF8/0xCFC, which user mode cannot issue on its own. The capability is
//! modelled as the [`PortIo`] trait so the scanner never knows which driver
//! (or fake) sits behind it.

mod winio;

pub use winio::{WinIo, DEFAULT_WINIO_DIR};

use crate::errors::ProbeResult;

/// Access width of a single port transfer, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortWidth {
    Byte = 1,
    Word = 2,
    Dword = 4,
}

impl PortWidth {
    pub fn bytes(self) -> u8 {
        self as u8
    }
}

pub trait PortIo {
    /// Bring the capability up. Failure is fatal to any scan.
    fn init(&self) -> ProbeResult<()>;

    fn shutdown(&self);

    /// Returns `false` when the driver rejects the write.
    fn write_port(&self, port: u16, value: u32, width: PortWidth) -> bool;

    /// Returns `None` when the driver rejects the read.
    fn read_port(&self, port: u16, width: PortWidth) -> Option<u32>;
}

impl<T: PortIo + ?Sized> PortIo for &T {
    fn init(&self) -> ProbeResult<()> {
        (**self).init()
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }

    fn write_port(&self, port: u16, value: u32, width: PortWidth) -> bool {
        (**self).write_port(port, value, width)
    }

    fn read_port(&self, port: u16, width: PortWidth) -> Option<u32> {
        (**self).read_port(port, width)
    }
}

impl<T: PortIo + ?Sized> PortIo for Box<T> {
    fn init(&self) -> ProbeResult<()> {
        (**self).init()
    }

    fn shutdown(&self) {
        (**self).shutdown()
    }

    fn write_port(&self, port: u16, value: u32, width: PortWidth) -> bool {
        (**self).write_port(port, value, width)
    }

    fn read_port(&self, port: u16, width: PortWidth) -> Option<u32> {
        (**self).read_port(port, width)
    }
}

/// Keeps the capability initialized for its lifetime and shuts it down on drop.
pub struct PortIoGuard<'a, P: PortIo + ?Sized> {
    io: &'a P,
}

impl<'a, P: PortIo + ?Sized> PortIoGuard<'a, P> {
    pub fn acquire(io: &'a P) -> ProbeResult<Self> {
        io.init()?;
        Ok(Self { io })
    }

    pub fn io(&self) -> &'a P {
        self.io
    }
}

impl<P: PortIo + ?Sized> Drop for PortIoGuard<'_, P> {
    fn drop(&mut self) {
        self.io.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::{PortIo, PortIoGuard, PortWidth};
    use crate::errors::{ProbeError, ProbeResult};

    #[derive(Default)]
    struct CountingIo {
        fail_init: bool,
        inits: Cell<u32>,
        shutdowns: Cell<u32>,
    }

    impl PortIo for CountingIo {
        fn init(&self) -> ProbeResult<()> {
            self.inits.set(self.inits.get() + 1);
            if self.fail_init {
                return Err(ProbeError::CapabilityUnavailable("driver refused".into()));
            }
            Ok(())
        }

        fn shutdown(&self) {
            self.shutdowns.set(self.shutdowns.get() + 1);
        }

        fn write_port(&self, _port: u16, _value: u32, _width: PortWidth) -> bool {
            true
        }

        fn read_port(&self, _port: u16, _width: PortWidth) -> Option<u32> {
            Some(0)
        }
    }

    #[test]
    fn guard_shuts_down_exactly_once_on_drop() {
        let io = CountingIo::default();
        {
            let _guard = PortIoGuard::acquire(&io).expect("init succeeds");
            assert_eq!(io.shutdowns.get(), 0);
        }
        assert_eq!(io.inits.get(), 1);
        assert_eq!(io.shutdowns.get(), 1);
    }

    #[test]
    fn failed_init_skips_shutdown() {
        let io = CountingIo {
            fail_init: true,
            ..CountingIo::default()
        };
        let err = PortIoGuard::acquire(&io).err().expect("init must fail");
        assert!(matches!(err, ProbeError::CapabilityUnavailable(_)));
        assert_eq!(io.shutdowns.get(), 0);
    }

    #[test]
    fn width_reports_byte_count() {
        assert_eq!(PortWidth::Byte.bytes(), 1);
        assert_eq!(PortWidth::Word.bytes(), 2);
        assert_eq!(PortWidth::Dword.bytes(), 4);
    }
}
