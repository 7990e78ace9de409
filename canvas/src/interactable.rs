//! Interactable registry — regions that opt out of background pan/tap handling.
//!
//! DESIGN
//! ======
//! A region calls [`InteractableRegistry::register`] when it mounts and gets
//! back an [`Interactable`] guard. The guard carries the id the host stamps on
//! the region's element; dropping it unregisters the region. Ownership of the
//! registration is therefore tied to the region's lifetime instead of a
//! manual unmount call.
//!
//! Guards hold only a weak reference to the registry, so a guard that outlives
//! its viewport drops without effect. A guard leaked with `mem::forget`
//! leaves a stale entry: the id stays in the map but nothing on screen carries
//! it any more, so it never matches a press.
//!
//! Each `register` call creates a distinct entry. Registering the same region
//! twice yields two independent guards; the region stays registered until
//! both are dropped.

#[cfg(test)]
#[path = "interactable_test.rs"]
mod interactable_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};
use uuid::Uuid;

/// Id stamped on a registered region's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteractableId(Uuid);

impl InteractableId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for InteractableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Entries<R> = RefCell<HashMap<InteractableId, R>>;

/// The set of mounted interactable regions for one viewport.
///
/// `R` is the back-reference to the owning region, returned to the viewport
/// when a press lands inside it.
pub struct InteractableRegistry<R> {
    entries: Rc<Entries<R>>,
}

impl<R> Default for InteractableRegistry<R> {
    fn default() -> Self {
        Self { entries: Rc::new(RefCell::new(HashMap::new())) }
    }
}

impl<R: Clone> InteractableRegistry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region. The returned guard unregisters it on drop.
    #[must_use = "dropping the guard unregisters the region immediately"]
    pub fn register(&self, region: R) -> Interactable<R> {
        let id = InteractableId::new();
        self.entries.borrow_mut().insert(id, region);
        debug!(%id, "interactable registered");
        Interactable { id, entries: Rc::downgrade(&self.entries) }
    }

    /// Unregister a region explicitly. Equivalent to dropping the guard.
    pub fn unregister(&self, handle: Interactable<R>) {
        drop(handle);
    }

    /// The region registered under `id`, if any.
    #[must_use]
    pub fn lookup(&self, id: InteractableId) -> Option<R> {
        self.entries.borrow().get(&id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: InteractableId) -> bool {
        self.entries.borrow().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Registration guard for one region. Unregisters on drop.
pub struct Interactable<R> {
    id: InteractableId,
    entries: Weak<Entries<R>>,
}

impl<R> Interactable<R> {
    #[must_use]
    pub fn id(&self) -> InteractableId {
        self.id
    }
}

impl<R> fmt::Debug for Interactable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactable").field("id", &self.id).finish()
    }
}

impl<R> Drop for Interactable<R> {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };
        // Teardown must not panic; a busy map leaves a stale, inert entry.
        match entries.try_borrow_mut() {
            Ok(mut map) => {
                if map.remove(&self.id).is_some() {
                    debug!(id = %self.id, "interactable unregistered");
                }
            }
            Err(_) => warn!(id = %self.id, "registry busy during unregister; leaving stale entry"),
        }
    }
}
