//! engine::interrupt
//!
//! Keeps the shell alive when the user presses Ctrl-C while a line runs.
//!
//! The terminal delivers SIGINT to the whole foreground process group, so a
//! child and the shell receive it together. While an [`InterruptGuard`] is
//! held the shell ignores SIGINT; children restore the default disposition
//! before exec (see [`restore_default_in_child`]) so they still stop.
//!
//! Guards nest. The first one in ignores the signal and the last one out
//! restores whatever disposition was there before.

use std::process::Command;
#[cfg(unix)]
use std::sync::Mutex;

#[cfg(unix)]
struct Saved {
    depth: usize,
    previous: libc::sighandler_t,
}

#[cfg(unix)]
static STATE: Mutex<Saved> = Mutex::new(Saved {
    depth: 0,
    previous: libc::SIG_DFL,
});

/// SIGINT is ignored by this process while a guard is alive.
#[must_use = "the signal is only ignored while the guard is held"]
pub struct InterruptGuard {
    _private: (),
}

impl InterruptGuard {
    #[cfg(unix)]
    pub fn ignore() -> Self {
        let mut state = STATE.lock().unwrap_or_else(|e| e.into_inner());
        if state.depth == 0 {
            // SAFETY: installing SIG_IGN has no handler code to run.
            let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
            state.previous = if previous == libc::SIG_ERR {
                libc::SIG_DFL
            } else {
                previous
            };
        }
        state.depth += 1;
        Self { _private: () }
    }

    #[cfg(not(unix))]
    pub fn ignore() -> Self {
        Self { _private: () }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            let mut state = STATE.lock().unwrap_or_else(|e| e.into_inner());
            state.depth = state.depth.saturating_sub(1);
            if state.depth == 0 {
                // SAFETY: restores the disposition saved by the first guard.
                unsafe {
                    libc::signal(libc::SIGINT, state.previous);
                }
            }
        }
    }
}

/// Reset SIGINT to its default in the child between fork and exec.
///
/// An ignored disposition survives exec, so without this a child started
/// under an [`InterruptGuard`] could not be stopped with Ctrl-C.
pub fn restore_default_in_child(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: signal(2) is async-signal-safe and the closure allocates nothing.
        unsafe {
            cmd.pre_exec(|| {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
                Ok(())
            });
        }
    }
    #[cfg(not(unix))]
    let _ = cmd;
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn current() -> libc::sighandler_t {
        // SAFETY: reading the disposition through a null new action.
        unsafe {
            let mut old: libc::sigaction = std::mem::zeroed();
            libc::sigaction(libc::SIGINT, std::ptr::null(), &mut old);
            old.sa_sigaction
        }
    }

    #[test]
    fn guards_nest() {
        let outer = InterruptGuard::ignore();
        let inner = InterruptGuard::ignore();
        assert_eq!(current(), libc::SIG_IGN);
        drop(inner);
        assert_eq!(current(), libc::SIG_IGN);
        drop(outer);
    }
}
