// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Priority-ordered chain of responsibility, safe to fire from any thread.

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard, Weak};

/// What a chain handler wants to happen after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Let lower-priority handlers see the event.
    Continue,
    /// Stop here; lower-priority handlers do not see this firing.
    Stop,
}

/// A handler that can be inserted in a [`HandlerChain`].
pub trait ChainHandler<E>: Send + Sync {
    /// Handles `event` and decides whether the chain continues.
    fn handle(&self, event: &E) -> Propagation;

    /// A name for logs.
    fn name(&self) -> &str {
        type_name::<Self>()
    }
}

impl<E, F> ChainHandler<E> for F
where
    F: Fn(&E) -> Propagation + Send + Sync,
{
    fn handle(&self, event: &E) -> Propagation {
        self(event)
    }
}

/// Identifies one registration in a [`HandlerChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerToken(u64);

/// Result of one [`HandlerChain::fire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FireOutcome {
    /// How many handlers ran.
    pub invoked: usize,
    /// The handler that stopped propagation, if any.
    pub stopped_by: Option<HandlerToken>,
}

impl FireOutcome {
    /// Returns `true` if a handler stopped propagation.
    pub fn stopped(&self) -> bool {
        self.stopped_by.is_some()
    }
}

struct ChainEntry<E> {
    token: HandlerToken,
    priority: i32,
    handler: Arc<dyn ChainHandler<E>>,
}

impl<E> Clone for ChainEntry<E> {
    fn clone(&self) -> Self {
        Self {
            token: self.token,
            priority: self.priority,
            handler: Arc::clone(&self.handler),
        }
    }
}

struct ChainInner<E> {
    entries: RwLock<Arc<[ChainEntry<E>]>>,
    next_token: AtomicU64,
}

impl<E> ChainInner<E> {
    fn snapshot(&self) -> Arc<[ChainEntry<E>]> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remove(&self, token: HandlerToken) -> bool {
        let guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.iter().any(|e| e.token == token) {
            return false;
        }
        let next: Vec<_> = guard.iter().filter(|e| e.token != token).cloned().collect();
        self.replace(guard, next);
        true
    }

    /// Publishes `next` and releases the lock before the previous list is dropped.
    ///
    /// A removed handler may own a [`ChainRegistration`] on this chain, whose
    /// destructor takes the same lock.
    fn replace(
        &self,
        mut guard: RwLockWriteGuard<'_, Arc<[ChainEntry<E>]>>,
        next: Vec<ChainEntry<E>>,
    ) {
        let previous = std::mem::replace(&mut *guard, next.into());
        drop(guard);
        drop(previous);
    }
}

/// An ordered list of handlers fired in descending priority.
///
/// Handlers with the same priority keep their registration order. Every
/// [`fire`](Self::fire) walks one immutable snapshot of the list, so a
/// concurrent [`register`](Self::register) or [`unregister`](Self::unregister)
/// is either fully visible to that firing or not at all.
///
/// Unlike the [`EventBus`](crate::event::EventBus), the chain is invoked
/// directly by whoever raises the condition, on whatever thread that is.
pub struct HandlerChain<E> {
    inner: Arc<ChainInner<E>>,
}

impl<E: 'static> HandlerChain<E> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ChainInner {
                entries: RwLock::new(Arc::from(Vec::new())),
                next_token: AtomicU64::new(1),
            }),
        }
    }

    /// Inserts `handler` at `priority`. Higher priorities run first.
    pub fn register<H>(&self, handler: H, priority: i32) -> HandlerToken
    where
        H: ChainHandler<E> + 'static,
    {
        self.register_arc(Arc::new(handler), priority)
    }

    /// Inserts an already shared handler at `priority`.
    pub fn register_arc(&self, handler: Arc<dyn ChainHandler<E>>, priority: i32) -> HandlerToken {
        let token = HandlerToken(self.inner.next_token.fetch_add(1, Ordering::Relaxed));
        log::info!(
            "HandlerChain: Registered '{}' (priority={priority})",
            handler.name()
        );

        let entry = ChainEntry {
            token,
            priority,
            handler,
        };
        let guard = self
            .inner
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let position = guard
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(guard.len());
        let mut next: Vec<_> = guard.iter().cloned().collect();
        next.insert(position, entry);
        self.inner.replace(guard, next);
        token
    }

    /// Like [`register`](Self::register), but the returned guard unregisters
    /// the handler when dropped.
    pub fn register_scoped<H>(&self, handler: H, priority: i32) -> ChainRegistration<E>
    where
        H: ChainHandler<E> + 'static,
    {
        let token = self.register(handler, priority);
        ChainRegistration {
            token,
            chain: Arc::downgrade(&self.inner),
        }
    }

    /// Removes the handler registered under `token`.
    ///
    /// Returns `false` if it was not (or no longer) registered.
    pub fn unregister(&self, token: HandlerToken) -> bool {
        let removed = self.inner.remove(token);
        if removed {
            log::debug!("HandlerChain: Unregistered {token:?}");
        }
        removed
    }

    /// Runs the handlers against `event` until one returns [`Propagation::Stop`].
    ///
    /// A handler that panics is a defect the chain does not recover from: the
    /// panic is logged and the process aborted.
    pub fn fire(&self, event: &E) -> FireOutcome {
        let snapshot = self.inner.snapshot();
        let mut outcome = FireOutcome::default();

        for entry in snapshot.iter() {
            outcome.invoked += 1;
            let result = panic::catch_unwind(AssertUnwindSafe(|| entry.handler.handle(event)));
            match result {
                Ok(Propagation::Continue) => {}
                Ok(Propagation::Stop) => {
                    outcome.stopped_by = Some(entry.token);
                    break;
                }
                Err(_) => {
                    log::error!(
                        "HandlerChain: handler '{}' panicked while handling a diagnostic; aborting.",
                        entry.handler.name()
                    );
                    std::process::abort();
                }
            }
        }
        outcome
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.inner.snapshot().len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `token` is currently registered.
    pub fn contains(&self, token: HandlerToken) -> bool {
        self.inner.snapshot().iter().any(|e| e.token == token)
    }

    /// The priorities of the registered handlers, in firing order.
    pub fn priorities(&self) -> Vec<i32> {
        self.inner.snapshot().iter().map(|e| e.priority).collect()
    }
}

impl<E: 'static> Default for HandlerChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for HandlerChain<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for HandlerChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.snapshot();
        f.debug_struct("HandlerChain")
            .field(
                "handlers",
                &snapshot
                    .iter()
                    .map(|e| (e.handler.name().to_string(), e.priority))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Keeps a handler registered in a [`HandlerChain`] until dropped.
#[must_use = "dropping a ChainRegistration immediately unregisters its handler"]
pub struct ChainRegistration<E> {
    token: HandlerToken,
    chain: Weak<ChainInner<E>>,
}

impl<E> ChainRegistration<E> {
    /// The token of the guarded registration.
    pub fn token(&self) -> HandlerToken {
        self.token
    }
}

impl<E> Drop for ChainRegistration<E> {
    fn drop(&mut self) {
        if let Some(chain) = self.chain.upgrade() {
            chain.remove(self.token);
        }
    }
}

impl<E> fmt::Debug for ChainRegistration<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainRegistration")
            .field("token", &self.token)
            .finish()
    }
}
