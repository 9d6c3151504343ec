// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin pump.
//
// A named thread polls stdin and forwards raw byte chunks over a channel, so
// the event loop can wait with `recv_timeout` and still tick while the user
// is idle. The thread wakes every `POLL_INTERVAL_MS` to check its stop flag,
// which keeps shutdown from hanging inside a blocking `read()`.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Bytes requested per `read()`. Enough for any key sequence and for most
/// pastes in a single chunk.
const CHUNK: usize = 4096;

/// Upper bound on shutdown latency.
const POLL_INTERVAL_MS: i32 = 50;

/// Handle to the stdin thread. Dropping it stops the thread.
///
/// ```no_run
/// use quill_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// if let Ok(bytes) = rx.recv() {
///     println!("{} bytes", bytes.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start the reader thread. Each message on the returned channel is a
    /// non-empty chunk; the channel closes on EOF, read error or stop.
    ///
    /// # Errors
    ///
    /// Fails when the OS refuses to create the thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("quill-stdin".into())
            .spawn(move || pump(&tx, &flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and join it. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn pump(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; CHUNK];

    while !stop.load(Ordering::Relaxed) {
        let mut pfd = libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        };
        // SAFETY: `pfd` is a valid pollfd for the duration of the call.
        let ready = unsafe { libc::poll(&raw mut pfd, 1, POLL_INTERVAL_MS) };
        if ready <= 0 {
            continue;
        }

        // SAFETY: `buf` is writable for `buf.len()` bytes.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let Ok(n) = usize::try_from(n) else {
            break;
        };
        if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
            break;
        }
    }
}

#[cfg(not(unix))]
fn pump(tx: &Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; CHUNK];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn spawn_then_stop() {
        let (mut reader, _rx) = StdinReader::spawn().unwrap();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn drop_joins_thread() {
        let (reader, _rx) = StdinReader::spawn().unwrap();
        drop(reader);
    }

    #[test]
    fn channel_disconnects_after_stop() {
        let (mut reader, rx) = StdinReader::spawn().unwrap();
        reader.stop();
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
