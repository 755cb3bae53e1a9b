//! Asynchronous model delivery.
//!
//! A loader runs on a background thread and posts finished models into a
//! channel. The render loop drains the channel at the start of each frame
//! and never blocks on it.

use std::sync::{mpsc, Arc, Mutex};

use super::models::{procedural_skeleton, procedural_skin, ModelAsset};

/// Produces the two model assets. Runs off the render loop.
pub type LoadFn = Box<dyn FnOnce(&mpsc::Sender<ModelAsset>) + Send>;

/// Receiving end of the model loader.
pub struct AssetInbox {
    rx: mpsc::Receiver<ModelAsset>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl AssetInbox {
    /// Start `load` on a background thread. If no thread can be spawned
    /// (single-threaded targets) the load runs inline and its results are
    /// waiting on the first poll.
    #[must_use]
    pub fn spawn(load: LoadFn) -> Self {
        let (tx, rx) = mpsc::channel();
        let slot = Arc::new(Mutex::new(Some(load)));
        let thread_slot = Arc::clone(&slot);
        let thread_tx = tx.clone();

        let spawned = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let load = thread_slot.lock().ok().and_then(|mut s| s.take());
                if let Some(load) = load {
                    load(&thread_tx);
                }
            });

        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("asset loader thread unavailable ({e}); loading inline");
                let load = slot.lock().ok().and_then(|mut s| s.take());
                if let Some(load) = load {
                    load(&tx);
                }
                None
            }
        };

        Self { rx, thread }
    }

    /// Load the procedural stand-in models with the given tints.
    #[must_use]
    pub fn procedural(skin_tint: [f32; 3], skeleton_tint: [f32; 3]) -> Self {
        Self::spawn(Box::new(move |tx| {
            let _ = tx.send(procedural_skin(skin_tint));
            let _ = tx.send(procedural_skeleton(skeleton_tint));
        }))
    }

    /// An inbox pre-filled with `assets`, no thread involved.
    #[must_use]
    pub fn ready(assets: Vec<ModelAsset>) -> Self {
        let (tx, rx) = mpsc::channel();
        for asset in assets {
            let _ = tx.send(asset);
        }
        Self { rx, thread: None }
    }

    /// Take every model that has arrived since the last poll.
    pub fn poll(&mut self) -> Vec<ModelAsset> {
        let arrived: Vec<ModelAsset> = self.rx.try_iter().collect();
        if !arrived.is_empty() {
            log::debug!("asset inbox delivered {} model(s)", arrived.len());
        }
        arrived
    }

    /// Wait for the loader thread to finish.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AssetInbox {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::scene::models::ModelKind;

    #[test]
    fn procedural_inbox_delivers_both_models() {
        let mut inbox = AssetInbox::procedural([1.0; 3], [1.0; 3]);
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut kinds = Vec::new();
        while kinds.len() < 2 && Instant::now() < deadline {
            kinds.extend(inbox.poll().into_iter().map(|a| a.kind));
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(kinds.contains(&ModelKind::Skin));
        assert!(kinds.contains(&ModelKind::Skeleton));
    }

    #[test]
    fn ready_inbox_drains_once() {
        let mut inbox = AssetInbox::ready(vec![procedural_skin([1.0; 3])]);
        assert_eq!(inbox.poll().len(), 1);
        assert!(inbox.poll().is_empty());
    }
}
