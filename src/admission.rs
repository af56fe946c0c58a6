//! Admission control
//!
//! Bounds the number of concurrently active sessions with a counting
//! semaphore. A session holds one `Permit` from acceptance until both of its
//! relays have stopped.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::AppError;

/// Counting permit pool shared by the server loop and every session
#[derive(Debug, Clone)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One unit of admission capacity
///
/// Released when dropped, so it can only ever be returned once.
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl Admission {
    /// Create a pool with `capacity` permits
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a permit is free and take it
    pub async fn acquire(&self) -> Result<Permit, AppError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| AppError::AdmissionClosed)?;
        Ok(Permit { _permit: permit })
    }

    /// Stop handing out permits
    ///
    /// Pending and future `acquire` calls fail with `AppError::AdmissionClosed`.
    /// Permits already held stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Number of permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
