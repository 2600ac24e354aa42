// src/os/winsize.rs

//! Window size queries against a terminal file descriptor.

use anyhow::{Context, Result};
use libc::{STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use std::fmt;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};

use log::{debug, trace};

nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, libc::winsize);
nix::ioctl_write_ptr_bad!(tiocswinsz, libc::TIOCSWINSZ, libc::winsize);

const CONTROLLING_TTY_PATH: &str = "/dev/tty";

/// Terminal dimensions as reported by the kernel.
///
/// `width_px`/`height_px` describe the text area and are 0 when the terminal
/// emulator does not fill them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub width_px: u16,
    pub height_px: u16,
}

impl From<libc::winsize> for WindowSize {
    fn from(ws: libc::winsize) -> Self {
        WindowSize {
            rows: ws.ws_row,
            cols: ws.ws_col,
            width_px: ws.ws_xpixel,
            height_px: ws.ws_ypixel,
        }
    }
}

impl From<WindowSize> for libc::winsize {
    fn from(size: WindowSize) -> Self {
        libc::winsize {
            ws_row: size.rows,
            ws_col: size.cols,
            ws_xpixel: size.width_px,
            ws_ypixel: size.height_px,
        }
    }
}

/// Where a probed window size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOrigin {
    Stdin,
    Stdout,
    Stderr,
    ControllingTerminal,
    Explicit(RawFd),
}

impl fmt::Display for ProbeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOrigin::Stdin => write!(f, "stdin"),
            ProbeOrigin::Stdout => write!(f, "stdout"),
            ProbeOrigin::Stderr => write!(f, "stderr"),
            ProbeOrigin::ControllingTerminal => write!(f, "{}", CONTROLLING_TTY_PATH),
            ProbeOrigin::Explicit(fd) => write!(f, "fd {}", fd),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub origin: ProbeOrigin,
    pub size: WindowSize,
}

/// Reads the window size of the terminal behind `fd` with `TIOCGWINSZ`.
pub fn query(fd: RawFd) -> Result<WindowSize> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    unsafe { tiocgwinsz(fd, &mut ws) }
        .with_context(|| format!("ioctl(TIOCGWINSZ) failed on fd {}", fd))?;
    let size = WindowSize::from(ws);
    trace!("winsize: fd {} reports {:?}", fd, size);
    Ok(size)
}

pub fn query_stdin() -> Result<WindowSize> {
    query(STDIN_FILENO)
}

/// Publishes `size` on `fd` with `TIOCSWINSZ`. Usually `fd` is a pty master.
pub fn apply(fd: RawFd, size: &WindowSize) -> Result<()> {
    let ws = libc::winsize::from(*size);
    unsafe { tiocswinsz(fd, &ws) }
        .with_context(|| format!("ioctl(TIOCSWINSZ) failed on fd {}", fd))?;
    trace!("winsize: set fd {} to {:?}", fd, size);
    Ok(())
}

/// Finds a terminal to ask: the standard streams first, then `/dev/tty`.
pub fn probe() -> Result<Probe> {
    let candidates = [
        (ProbeOrigin::Stdin, STDIN_FILENO),
        (ProbeOrigin::Stdout, STDOUT_FILENO),
        (ProbeOrigin::Stderr, STDERR_FILENO),
    ];

    for (origin, fd) in candidates {
        match query(fd) {
            Ok(size) => {
                debug!("winsize: using {}", origin);
                return Ok(Probe { origin, size });
            }
            Err(e) => debug!("winsize: {} is not usable: {:#}", origin, e),
        }
    }

    let tty = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NOCTTY)
        .open(CONTROLLING_TTY_PATH)
        .context("no standard stream is a terminal and /dev/tty could not be opened")?;
    let size = query(tty.as_raw_fd())?;
    debug!("winsize: using {}", ProbeOrigin::ControllingTerminal);

    Ok(Probe {
        origin: ProbeOrigin::ControllingTerminal,
        size,
    })
}
