// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media resource cache with asynchronous readiness.
//!
//! Loads run on a dedicated worker thread; completions are drained on
//! the control loop via [`MediaResourceCache::poll_completions`], never
//! applied from the worker. A completion whose resource has been
//! released in the meantime is discarded.

use crate::loader::{LoadError, MediaLoader};
use crate::resource::{MediaKind, MediaResource, ResourceId, ResourceState, Surface, TextureHandle};
use indexmap::IndexMap;
use tokio::sync::mpsc;

struct LoadRequest {
    id: ResourceId,
    kind: MediaKind,
    locator: String,
}

struct LoadCompletion {
    id: ResourceId,
    result: Result<Surface, LoadError>,
}

/// Outcome of a [`MediaResourceCache::request`] call.
#[derive(Debug, Clone)]
pub enum RequestStatus {
    /// The resource is decoded and usable.
    Ready(TextureHandle),
    /// A load is in flight; poll again after the next tick.
    Loading,
    /// The most recent load failed.
    Failed(String),
}

/// Tracks externally-sourced readable surfaces keyed by id.
pub struct MediaResourceCache {
    resources: IndexMap<ResourceId, MediaResource>,
    request_tx: mpsc::UnboundedSender<LoadRequest>,
    result_rx: mpsc::UnboundedReceiver<LoadCompletion>,
}

impl MediaResourceCache {
    /// Create a cache backed by `loader`, spawning its worker thread.
    pub fn new(loader: Box<dyn MediaLoader>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || loader_worker(loader, request_rx, result_tx));

        Self {
            resources: IndexMap::new(),
            request_tx,
            result_rx,
        }
    }

    /// Request a resource, starting a load on first call.
    ///
    /// Idempotent: an id that is already loading or ready returns the
    /// in-flight/existing result rather than starting a duplicate load.
    /// A failed resource is retried.
    pub fn request(&mut self, id: &ResourceId, locator: &str, kind: MediaKind) -> RequestStatus {
        let start = match self.resources.get(id) {
            Some(res) => matches!(res.state, ResourceState::Failed(_)),
            None => true,
        };

        if start {
            self.resources
                .insert(id.clone(), MediaResource::loading(id.clone(), kind));
            let sent = self.request_tx.send(LoadRequest {
                id: id.clone(),
                kind,
                locator: locator.to_string(),
            });
            if sent.is_err() {
                tracing::warn!("media loader worker is gone; {id} will never load");
            }
        }

        match &self.resources[id].state {
            ResourceState::Loading => RequestStatus::Loading,
            ResourceState::Ready(_) => {
                // handle() is always Some for a ready resource
                match self.resources[id].handle() {
                    Some(handle) => RequestStatus::Ready(handle),
                    None => RequestStatus::Loading,
                }
            }
            ResourceState::Failed(err) => RequestStatus::Failed(err.clone()),
        }
    }

    /// Drain finished loads, updating resource states.
    ///
    /// Returns the ids whose readiness changed so the caller can
    /// re-trigger propagation for their dependents. Completions for ids
    /// released since the request are discarded.
    pub fn poll_completions(&mut self) -> Vec<ResourceId> {
        let mut settled = Vec::new();
        while let Ok(completion) = self.result_rx.try_recv() {
            let Some(resource) = self.resources.get_mut(&completion.id) else {
                tracing::debug!(
                    "discarding load completion for released resource {}",
                    completion.id
                );
                continue;
            };
            if !matches!(resource.state, ResourceState::Loading) {
                // A retry has superseded this load.
                continue;
            }
            match completion.result {
                Ok(surface) => {
                    resource.state = ResourceState::Ready(surface);
                }
                Err(err) => {
                    tracing::warn!("load failed for {}: {err}", completion.id);
                    resource.state = ResourceState::Failed(err.to_string());
                }
            }
            settled.push(completion.id);
        }
        settled
    }

    /// Look up a resource by id.
    pub fn resource(&self, id: &ResourceId) -> Option<&MediaResource> {
        self.resources.get(id)
    }

    /// The decoded surface behind `id`, if ready.
    pub fn surface(&self, id: &ResourceId) -> Option<&Surface> {
        self.resources.get(id).and_then(MediaResource::surface)
    }

    /// A handle to `id`, if ready.
    pub fn handle(&self, id: &ResourceId) -> Option<TextureHandle> {
        self.resources.get(id).and_then(MediaResource::handle)
    }

    /// Drop a resource. In-flight loads for it will be discarded on
    /// completion.
    pub fn release(&mut self, id: &ResourceId) {
        self.resources.swap_remove(id);
    }

    /// Number of tracked resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the cache tracks no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn loader_worker(
    loader: Box<dyn MediaLoader>,
    mut request_rx: mpsc::UnboundedReceiver<LoadRequest>,
    result_tx: mpsc::UnboundedSender<LoadCompletion>,
) {
    while let Some(request) = request_rx.blocking_recv() {
        let result = loader.load(request.kind, &request.locator);
        let sent = result_tx.send(LoadCompletion {
            id: request.id,
            result,
        });
        if sent.is_err() {
            break; // cache dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct StubLoader;

    impl MediaLoader for StubLoader {
        fn load(&self, kind: MediaKind, locator: &str) -> Result<Surface, LoadError> {
            match kind {
                MediaKind::StillImage | MediaKind::Video => {
                    if locator == "bad" {
                        Err(LoadError::Decode("bad locator".into()))
                    } else {
                        Ok(Surface::solid(4, 4, [0, 255, 0, 255]))
                    }
                }
                MediaKind::Camera => Err(LoadError::Unsupported("no camera".into())),
            }
        }
    }

    fn wait_settled(cache: &mut MediaResourceCache) -> Vec<ResourceId> {
        for _ in 0..200 {
            let settled = cache.poll_completions();
            if !settled.is_empty() {
                return settled;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("load never completed");
    }

    #[test]
    fn request_then_ready() {
        let mut cache = MediaResourceCache::new(Box::new(StubLoader));
        let id = ResourceId::new("image-a");

        let status = cache.request(&id, "/a.png", MediaKind::StillImage);
        assert!(matches!(status, RequestStatus::Loading));

        let settled = wait_settled(&mut cache);
        assert_eq!(settled, vec![id.clone()]);
        assert!(cache.resource(&id).unwrap().is_ready());
        assert_eq!(cache.resource(&id).unwrap().dimensions(), Some((4, 4)));
    }

    #[test]
    fn second_request_does_not_duplicate_load() {
        let mut cache = MediaResourceCache::new(Box::new(StubLoader));
        let id = ResourceId::new("image-a");

        cache.request(&id, "/a.png", MediaKind::StillImage);
        wait_settled(&mut cache);

        let status = cache.request(&id, "/a.png", MediaKind::StillImage);
        assert!(matches!(status, RequestStatus::Ready(_)));
        // No new load was issued, so nothing settles again.
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.poll_completions().is_empty());
    }

    #[test]
    fn failed_load_surfaces_and_can_retry() {
        let mut cache = MediaResourceCache::new(Box::new(StubLoader));
        let id = ResourceId::new("image-a");

        cache.request(&id, "bad", MediaKind::StillImage);
        wait_settled(&mut cache);
        let status = cache.request(&id, "bad", MediaKind::StillImage);
        // The failed entry was retried, so it is loading again.
        assert!(matches!(status, RequestStatus::Loading));
        wait_settled(&mut cache);
        assert!(matches!(
            cache.request(&id, "/good.png", MediaKind::StillImage),
            RequestStatus::Loading
        ));
    }

    #[test]
    fn released_resource_discards_completion() {
        let mut cache = MediaResourceCache::new(Box::new(StubLoader));
        let id = ResourceId::new("image-a");

        cache.request(&id, "/a.png", MediaKind::StillImage);
        cache.release(&id);

        // The completion arrives but must not resurrect the entry.
        for _ in 0..50 {
            cache.poll_completions();
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(cache.resource(&id).is_none());
        assert!(cache.is_empty());
    }
}
