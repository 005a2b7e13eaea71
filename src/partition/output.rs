use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Caller-owned destination for algorithms that write their results in place.
///
/// Clones share the same storage. Each chunk commits to the sub-range at its
/// own offset and length, so chunks never write the same slot; the lock is
/// only held while a finished chunk is copied in.
pub struct OutputRange<U> {
    slots: Arc<Mutex<Vec<U>>>,
}

impl<U> OutputRange<U> {
    pub fn new(initial: Vec<U>) -> Self {
        Self {
            slots: Arc::new(Mutex::new(initial)),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move `values` into the slots starting at `offset`.
    ///
    /// Returns the position one past the last slot written.
    pub(crate) fn write_at(&self, offset: usize, values: Vec<U>) -> Result<usize> {
        let mut slots = self.lock();
        let end = offset + values.len();
        if end > slots.len() {
            return Err(Error::domain(format!(
                "destination holds {} element(s), write needs {}",
                slots.len(),
                end
            )));
        }
        for (slot, value) in slots[offset..end].iter_mut().zip(values) {
            *slot = value;
        }
        Ok(end)
    }

    /// The stored values, leaving clones of this range empty
    pub fn into_vec(self) -> Vec<U> {
        match Arc::try_unwrap(self.slots) {
            Ok(slots) => slots.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => std::mem::take(&mut *shared.lock().unwrap_or_else(PoisonError::into_inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<U>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<U: Clone> OutputRange<U> {
    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<U> {
        self.lock().clone()
    }
}

impl<U> Clone for OutputRange<U> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<U> std::fmt::Debug for OutputRange<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputRange").field("len", &self.len()).finish()
    }
}
