//! Circular dependency detection infrastructure.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::error::{DiError, DiResult};

const MAX_DEPTH: usize = 1024;

/// One in-progress resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    /// A registry `get` for a service id
    Service(String),
    /// An autowiring `resolve` for a class name
    Class(String),
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Service(name) | Frame::Class(name) => name,
        }
    }
}

/// Per-container stacks of resolutions currently running, one per thread.
///
/// Resolution is synchronous, so each stack mirrors its thread's call stack:
/// a frame is pushed on entry and popped when its guard drops, on success and
/// on error. Threads resolving the same id concurrently never see each other.
#[derive(Default)]
pub(crate) struct ResolutionStack {
    threads: Mutex<HashMap<ThreadId, Vec<Frame>>>,
}

impl ResolutionStack {
    /// Pushes `frame`, failing if it is already in progress or the stack is too deep.
    pub(crate) fn enter(&self, frame: Frame) -> DiResult<StackGuard<'_>> {
        let thread = thread::current().id();
        let mut threads = self.threads.lock();
        let frames = threads.entry(thread).or_default();

        // Circular detection BEFORE pushing the new frame
        if frames.contains(&frame) {
            let mut path: Vec<String> = Vec::with_capacity(frames.len() + 1);
            let mut previous: Option<&Frame> = None;
            for current in frames.iter().chain(std::iter::once(&frame)) {
                // A service and the class autowired for it share a name; show it once.
                let autowired_by_previous = matches!(
                    (previous, current),
                    (Some(Frame::Service(service)), Frame::Class(class)) if service == class
                );
                if !autowired_by_previous {
                    path.push(current.name().to_string());
                }
                previous = Some(current);
            }
            return Err(DiError::Circular(path));
        }

        // Depth guard
        if frames.len() >= MAX_DEPTH {
            return Err(DiError::DepthExceeded(frames.len()));
        }

        frames.push(frame);
        Ok(StackGuard { stack: self, thread })
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.threads
            .lock()
            .get(&thread::current().id())
            .map_or(0, Vec::len)
    }
}

/// Pops its frame on drop
pub(crate) struct StackGuard<'a> {
    stack: &'a ResolutionStack,
    thread: ThreadId,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        let mut threads = self.stack.threads.lock();
        if let Some(frames) = threads.get_mut(&self.thread) {
            frames.pop();
            if frames.is_empty() {
                threads.remove(&self.thread);
            }
        }
    }
}
