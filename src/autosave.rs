use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::io;
use crate::project::Project;
use crate::{log_err, log_info};

// ============================================================================
// AUTOSAVE — background periodic snapshot of the open project
// ============================================================================
//
// The sprite model itself carries no locking; edits and autosave must share
// one `Mutex<Project>`. The worker holds the lock only long enough to copy
// the pixel payloads into a `SpriteFile`, then serializes outside the lock,
// so an in-progress save never stalls editing for the duration of the disk
// write.

/// Default interval between autosave checks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

enum Control {
    Shutdown,
}

/// Handle to a running autosave worker. Dropping the handle without calling
/// [`stop`](Autosave::stop) detaches the worker for the rest of the process.
pub struct Autosave {
    tx: Sender<Control>,
    handle: Option<JoinHandle<()>>,
}

impl Autosave {
    /// Spawn the autosave worker. Every `interval` it locks the project and,
    /// if the dirty flag is set, snapshots it, clears the flag, and writes
    /// `autosave.scl` into `dir`.
    pub fn start(project: Arc<Mutex<Project>>, dir: PathBuf, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv_timeout(interval) {
                    Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => return,
                    Err(RecvTimeoutError::Timeout) => {}
                }

                // Snapshot under the lock, serialize outside it.
                let snapshot = match project.lock() {
                    Ok(mut p) => {
                        if !p.is_dirty {
                            continue;
                        }
                        let file = io::build_sprite_file(&p.sprite, p.fps);
                        p.mark_clean();
                        Some(file)
                    }
                    Err(_) => None, // poisoned: an editing thread panicked
                };

                if let Some(file) = snapshot {
                    if let Err(e) = std::fs::create_dir_all(&dir) {
                        log_err!("autosave: cannot create {}: {}", dir.display(), e);
                        continue;
                    }
                    let path = dir.join("autosave.scl");
                    match io::write_sprite_file(&file, &path) {
                        Ok(()) => log_info!("autosave: wrote {}", path.display()),
                        Err(e) => log_err!("autosave: write failed: {}", e),
                    }
                }
            }
        });
        Self {
            tx,
            handle: Some(handle),
        }
    }

    /// Signal the worker and wait for it to exit.
    pub fn stop(mut self) {
        let _ = self.tx.send(Control::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
