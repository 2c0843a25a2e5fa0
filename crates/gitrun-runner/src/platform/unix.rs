use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::io;

/// SIGKILL the process group led by `pid`.
///
/// The child is spawned with `process_group(0)`, so its pid is also its pgid.
pub(super) fn kill_process_group(pid: u32) -> io::Result<()> {
    let pgid = i32::try_from(pid)
        .map(Pid::from_raw)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;

    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}
