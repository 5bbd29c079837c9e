use futures::channel::oneshot;
use std::path::{Path, PathBuf};
use std::thread;

use super::asset::LoadedAsset;
use super::gltf::load_asset;
use crate::error::{ViewerError, ViewerResult};

pub type LoadOutcome = ViewerResult<LoadedAsset>;

/// An asset fetch that has not been collected yet.
///
/// The decode happens elsewhere; whoever owns this polls it from the event
/// loop thread, so the result is applied between frames. Dropping it
/// abandons the result.
pub struct PendingLoad {
    path: PathBuf,
    receiver: oneshot::Receiver<LoadOutcome>,
}

impl PendingLoad {
    pub fn new(path: impl Into<PathBuf>, receiver: oneshot::Receiver<LoadOutcome>) -> Self {
        Self {
            path: path.into(),
            receiver,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check. `None` while the load is still running.
    pub fn poll(&mut self) -> Option<LoadOutcome> {
        match self.receiver.try_recv() {
            Ok(Some(outcome)) => Some(outcome),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(ViewerError::LoadAbandoned {
                path: self.path.display().to_string(),
            })),
        }
    }
}

/// Decode `path` on a worker thread
pub fn spawn_load(path: impl Into<PathBuf>) -> PendingLoad {
    let path = path.into();
    let (sender, receiver) = oneshot::channel();

    let worker_path = path.clone();
    let spawned = thread::Builder::new()
        .name("asset-loader".into())
        .spawn(move || {
            let outcome = load_asset(&worker_path)
                .map_err(|e| ViewerError::load(worker_path.display().to_string(), &e));
            if sender.send(outcome).is_err() {
                log::debug!("Asset {:?} finished after the viewer went away", worker_path);
            }
        });

    // If the thread never started the sender is already dropped and the
    // first poll reports the load as abandoned.
    if let Err(e) = spawned {
        log::error!("Failed to spawn asset loader thread: {}", e);
    }

    PendingLoad::new(path, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(pending: &mut PendingLoad) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = pending.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "load never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_poll_before_completion() {
        let (_sender, receiver) = oneshot::channel();
        let mut pending = PendingLoad::new("model.glb", receiver);
        assert!(pending.poll().is_none());
        assert!(pending.poll().is_none());
    }

    #[test]
    fn test_poll_after_completion() {
        let (sender, receiver) = oneshot::channel();
        let mut pending = PendingLoad::new("model.glb", receiver);

        sender.send(Ok(LoadedAsset::empty())).ok();

        let outcome = pending.poll().expect("should be ready");
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_dropped_sender_is_abandoned() {
        let (sender, receiver) = oneshot::channel::<LoadOutcome>();
        let mut pending = PendingLoad::new("model.glb", receiver);
        drop(sender);

        match pending.poll() {
            Some(Err(ViewerError::LoadAbandoned { path })) => assert_eq!(path, "model.glb"),
            other => panic!("unexpected outcome: {:?}", other.map(|o| o.is_ok())),
        }
    }

    #[test]
    fn test_spawn_load_missing_file() {
        let mut pending = spawn_load("no/such/model.glb");
        assert_eq!(pending.path(), Path::new("no/such/model.glb"));

        match wait(&mut pending) {
            Err(ViewerError::Load { path, .. }) => assert_eq!(path, "no/such/model.glb"),
            other => panic!("unexpected outcome, ok = {}", other.is_ok()),
        }
    }
}
