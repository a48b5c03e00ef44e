//! Off-thread icon resolution
//!
//! The pipeline moves onto a worker thread so cache misses never stall the
//! presentation thread. The UI shows a placeholder until the matching
//! [`ResponseMessage::IconResolved`] arrives. Requests are handled one at a
//! time and a key already queued is not queued again, so no two composes
//! for the same key ever race on the same cache file.

use crate::icon::{CacheKey, IconPipeline};
use crate::messages::{IconRequest, PrefetchMessage, ResponseMessage};
use crate::palette::{NodeId, Palette};
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct Prefetcher {
    sender: Sender<PrefetchMessage>,
    receiver: Receiver<ResponseMessage>,
    pending: HashSet<CacheKey>,
    icon_size: u32,
    padding: u32,
    _thread_handle: thread::JoinHandle<()>,
}

impl Prefetcher {
    /// Queue `request` unless its key is already pending. Returns whether it was queued.
    pub fn request(&mut self, request: IconRequest) -> bool {
        if self.pending.contains(&request.key) {
            debug!("Icon {} already queued", request.key);
            return false;
        }
        let key = request.key.clone();
        if let Err(e) = self.sender.send(PrefetchMessage::Resolve(request)) {
            error!("Failed to send prefetch request: {}", e);
            return false;
        }
        self.pending.insert(key);
        true
    }

    /// Queue every node of `palette`. Returns how many were queued.
    pub fn request_palette(&mut self, palette: &Palette) -> usize {
        let mut queued = 0;
        for id in palette.iter_depth_first() {
            if self.request(self.palette_request(palette, id)) {
                queued += 1;
            }
        }
        queued
    }

    /// Request for one palette node, keyed the way the worker's pipeline keys it
    pub fn palette_request(&self, palette: &Palette, id: NodeId) -> IconRequest {
        let node = palette.node(id);
        IconRequest {
            id: node.id.clone(),
            icon_path: node.source_icon_path.clone(),
            frame_path: node.frame_path.clone(),
            key: CacheKey::for_asset(
                &node.id,
                &node.source_icon_path,
                &node.frame_path,
                self.icon_size,
                self.padding,
            ),
        }
    }

    /// A finished response, if one is ready
    pub fn try_recv(&mut self) -> Option<ResponseMessage> {
        match self.receiver.try_recv() {
            Ok(response) => Some(self.settle(response)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Prefetch thread is gone");
                None
            }
        }
    }

    /// Wait up to `timeout` for the next response
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<ResponseMessage> {
        match self.receiver.recv_timeout(timeout) {
            Ok(response) => Some(self.settle(response)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Prefetch thread is gone");
                None
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn settle(&mut self, response: ResponseMessage) -> ResponseMessage {
        let ResponseMessage::IconResolved { key, .. } = &response;
        self.pending.remove(key);
        response
    }

    /// The worker loop: resolve requests in order until told to stop
    fn run(
        pipeline: IconPipeline,
        receiver: Receiver<PrefetchMessage>,
        sender: Sender<ResponseMessage>,
    ) {
        while let Ok(message) = receiver.recv() {
            match message {
                PrefetchMessage::Resolve(request) => {
                    let result =
                        pipeline.resolve(&request.icon_path, &request.frame_path, &request.key);
                    if let Err(e) = &result {
                        error!("Failed to resolve icon {}: {}", request.id, e);
                    }
                    let response = ResponseMessage::IconResolved {
                        id: request.id,
                        key: request.key,
                        result,
                    };
                    if sender.send(response).is_err() {
                        // Receiver dropped; nobody is waiting any more
                        break;
                    }
                }
                PrefetchMessage::Stop => break,
            }
        }
        debug!(
            "Prefetch thread exiting after {} compositions",
            pipeline.compositions()
        );
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        let _ = self.sender.send(PrefetchMessage::Stop);
    }
}

/// Move `pipeline` onto a worker thread and return the handle that feeds it
pub fn spawn_prefetcher(pipeline: IconPipeline) -> Prefetcher {
    let (sender, receiver) = mpsc::channel();
    let (response_sender, response_receiver) = mpsc::channel();
    let icon_size = pipeline.icon_size();
    let padding = pipeline.padding();
    let thread_handle = thread::spawn(move || {
        Prefetcher::run(pipeline, receiver, response_sender);
    });
    Prefetcher {
        sender,
        receiver: response_receiver,
        pending: HashSet::new(),
        icon_size,
        padding,
        _thread_handle: thread_handle,
    }
}
