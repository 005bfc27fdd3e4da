//! Relays SIGTERM delivered to the supervisor to the runner container.
use std::{
    fs::File,
    io::{self, Read},
    os::fd::{AsRawFd, IntoRawFd, OwnedFd},
    sync::atomic::{AtomicI32, Ordering},
    thread::{self, JoinHandle},
};

use nix::{
    fcntl::{FcntlArg, FdFlag, OFlag, fcntl},
    sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction},
    unistd::pipe,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::SupervisorError,
    process::{ChildHandle, TerminationTrigger},
};

/// Write end of the self-pipe, read by the signal handler.
static RELAY_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn on_sigterm(_: libc::c_int) {
    let fd = RELAY_WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = 1u8;
        // Only async-signal-safe calls in here.
        unsafe {
            libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
        }
    }
}

fn set_cloexec(fd: i32) -> Result<(), SupervisorError> {
    fcntl(fd, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    Ok(())
}

/// Listens for SIGTERM for the rest of the process lifetime.
#[derive(Debug)]
pub struct SignalRelay {
    reader: File,
}

impl SignalRelay {
    /// Installs the SIGTERM handler. No other signal is intercepted.
    pub fn install() -> Result<Self, SupervisorError> {
        let (reader, writer): (OwnedFd, OwnedFd) = pipe()?;
        set_cloexec(reader.as_raw_fd())?;
        set_cloexec(writer.as_raw_fd())?;
        fcntl(writer.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK))?;

        // The write end lives as long as the process.
        let writer = writer.into_raw_fd();
        let previous = RELAY_WRITE_FD.swap(writer, Ordering::SeqCst);
        if previous >= 0 {
            unsafe {
                libc::close(previous);
            }
        }

        let action = SigAction::new(
            SigHandler::Handler(on_sigterm),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        unsafe { sigaction(Signal::SIGTERM, &action) }?;
        debug!("SIGTERM relay installed");

        Ok(Self {
            reader: File::from(reader),
        })
    }

    /// Blocks until the next SIGTERM delivery.
    pub fn wait(&mut self) -> io::Result<()> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "signal pipe closed",
                    ));
                }
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Runs the relay on a background thread, killing `child` on every delivery.
    pub fn spawn(mut self, child: ChildHandle) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("sigterm-relay".into())
            .spawn(move || {
                loop {
                    if let Err(err) = self.wait() {
                        error!("SIGTERM relay stopped: {err}");
                        return;
                    }

                    info!("Received SIGTERM; killing PID {}", child.pid());
                    if let Err(err) = child.terminate(TerminationTrigger::ExternalSignal) {
                        warn!("{err}");
                    }
                }
            })
    }
}
