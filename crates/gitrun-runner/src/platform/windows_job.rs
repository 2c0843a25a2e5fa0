use std::io;

/// Owned Job Object handle, closed on drop.
#[derive(Debug)]
pub(super) struct JobObjectHandle {
    handle: windows::Win32::Foundation::HANDLE,
}

// SAFETY: Windows HANDLEs are safe to send between threads.
// The HANDLE is an opaque kernel object reference that can be used from any thread.
unsafe impl Send for JobObjectHandle {}
// SAFETY: the handle is only passed to thread-safe kernel calls.
unsafe impl Sync for JobObjectHandle {}

impl Drop for JobObjectHandle {
    fn drop(&mut self) {
        use windows::Win32::Foundation::CloseHandle;
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Create a Job Object used to track the process tree of one git run.
///
/// No kill-on-close limit is set: detached helpers git leaves behind (e.g.
/// `gc --auto`) survive a normal exit. Only an explicit abort terminates the job.
pub(super) fn create_job_object() -> io::Result<JobObjectHandle> {
    use windows::Win32::System::JobObjects::CreateJobObjectW;

    unsafe {
        let job = CreateJobObjectW(None, None)
            .map_err(|e| io::Error::other(format!("Failed to create Job Object: {e}")))?;
        Ok(JobObjectHandle { handle: job })
    }
}

/// Put the child into the job so its descendants are tracked too.
pub(super) fn assign_to_job(
    job: &JobObjectHandle,
    child: &tokio::process::Child,
) -> io::Result<()> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::JobObjects::AssignProcessToJobObject;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};

    if let Some(pid) = child.id() {
        unsafe {
            let process_handle = OpenProcess(PROCESS_ALL_ACCESS, false, pid).map_err(|e| {
                io::Error::other(format!("Failed to open process for job assignment: {e}"))
            })?;

            let assigned = AssignProcessToJobObject(job.handle, process_handle);
            let _ = CloseHandle(process_handle);
            assigned.map_err(|e| {
                io::Error::other(format!("Failed to assign process to Job Object: {e}"))
            })?;
        }
    }

    Ok(())
}

/// Terminate the whole job, or just the process when no job is available.
pub(super) fn terminate_tree(job: Option<&JobObjectHandle>, pid: u32) -> io::Result<()> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::JobObjects::TerminateJobObject;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_TERMINATE, TerminateProcess};

    unsafe {
        if let Some(job) = job
            && TerminateJobObject(job.handle, 1).is_ok()
        {
            return Ok(());
        }

        let process_handle = OpenProcess(PROCESS_TERMINATE, false, pid)
            .map_err(|e| io::Error::other(format!("Failed to open process for termination: {e}")))?;
        let terminated = TerminateProcess(process_handle, 1);
        let _ = CloseHandle(process_handle);
        terminated.map_err(|e| io::Error::other(format!("Failed to terminate process: {e}")))
    }
}
