//! Shared body handles.
//!
//! The scene, the [`World`](crate::World) and the [`BodyPool`](crate::BodyPool)
//! all pass bodies around as the same [`BodyRef`], so a pooled body keeps its
//! allocation while it is being simulated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use crate::rigid_body::RigidBody;

/// Shared handle to a body owned by the scene.
pub type BodyRef = Arc<Mutex<RigidBody>>;

pub fn body_ref(body: RigidBody) -> BodyRef {
    Arc::new(Mutex::new(body))
}

/// Poison-tolerant access to a shared body.
pub trait BodyLock {
    /// Block until the body is available.
    fn lock_body(&self) -> MutexGuard<'_, RigidBody>;

    /// The body, or `None` if someone else currently holds it.
    fn try_lock_body(&self) -> Option<MutexGuard<'_, RigidBody>>;
}

impl BodyLock for Mutex<RigidBody> {
    fn lock_body(&self) -> MutexGuard<'_, RigidBody> {
        self.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_lock_body(&self) -> Option<MutexGuard<'_, RigidBody>> {
        match self.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    #[test]
    fn test_try_lock_while_held() {
        let body = body_ref(RigidBody::new(Shape::sphere(0.5, 16), 1.0));
        {
            let _held = body.lock_body();
            assert!(body.try_lock_body().is_none());
        }
        assert!(body.try_lock_body().is_some());
    }

    #[test]
    fn test_poisoned_body_is_still_usable() {
        let body = body_ref(RigidBody::new(Shape::sphere(0.5, 16), 2.0));
        let poisoner = Arc::clone(&body);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.lock_body();
            panic!("poison the body lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(body.lock_body().mass(), 2.0);
        assert!(body.try_lock_body().is_some());
    }
}
