// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Trait for shutdown signaling
pub trait ShutdownSignal: Clone + Send + 'static {
    fn is_cancelled(&self) -> bool;
}

/// Atomic flag, flipped from a Ctrl+C handler or another thread
#[derive(Clone, Default)]
pub struct AtomicShutdownSignal {
    flag: Arc<AtomicBool>,
}

impl AtomicShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownSignal for AtomicShutdownSignal {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Never cancels
#[derive(Clone, Copy, Default)]
pub struct NoShutdown;

impl ShutdownSignal for NoShutdown {
    fn is_cancelled(&self) -> bool {
        false
    }
}
