//! Process-tree termination
//!
//! Every launched process gets a [`KillSwitch`] that hard-kills it together
//! with anything it forked: on Unix the child leads its own process group and
//! the group receives `SIGKILL`; on Windows the child is placed in a Job Object
//! that gets terminated.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows_job;

/// Cloneable handle that kills a launched process tree.
#[derive(Debug, Clone)]
pub struct KillSwitch {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    pid: Option<u32>,
    fired: AtomicBool,
    #[cfg(windows)]
    job: Option<windows_job::JobObjectHandle>,
}

impl KillSwitch {
    /// Attach to a freshly spawned child, before it has had time to fork.
    pub(crate) fn attach(child: &tokio::process::Child) -> Self {
        let pid = child.id();

        #[cfg(windows)]
        let job = match windows_job::create_job_object().and_then(|job| {
            windows_job::assign_to_job(&job, child)?;
            Ok(job)
        }) {
            Ok(job) => Some(job),
            Err(err) => {
                tracing::warn!(?pid, error = %err, "process tree tracking unavailable");
                None
            }
        };

        Self {
            inner: Arc::new(Inner {
                pid,
                fired: AtomicBool::new(false),
                #[cfg(windows)]
                job,
            }),
        }
    }

    /// A switch for a process that is already gone; `kill` is a no-op.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            inner: Arc::new(Inner {
                pid: None,
                fired: AtomicBool::new(false),
                #[cfg(windows)]
                job: None,
            }),
        }
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.inner.pid
    }

    /// Whether `kill` has been called.
    #[must_use]
    pub fn fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Hard-kill the process tree. Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the kill could not be delivered. A tree that
    /// already exited is not an error.
    pub fn kill(&self) -> io::Result<()> {
        if self.inner.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let Some(pid) = self.inner.pid else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            unix::kill_process_group(pid)
        }

        #[cfg(windows)]
        {
            windows_job::terminate_tree(self.inner.job.as_ref(), pid)
        }

        #[cfg(not(any(unix, windows)))]
        {
            let _ = pid;
            Ok(())
        }
    }
}
