//! Owned tensor buffers with live-buffer accounting.
//!
//! Every [`NormalizedTensor`] is produced fresh for a single inference call
//! and owned by that call. Release is enforced by ownership: the inference
//! entry point takes the tensor by value, so the backing buffer drops on
//! every exit path. The ledger exists so callers (and tests) can observe
//! that nothing outlives its call.

use ndarray::{Array4, ArrayView4};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::constants::{MODEL_INPUT_CHANNELS, MODEL_INPUT_HEIGHT, MODEL_INPUT_WIDTH};

/// Rank-4 f32 tensor in [batch, height, width, channels] layout.
pub type Tensor4D = Array4<f32>;

/// Counts live normalized-tensor buffers.
///
/// Incremented when a tensor is created, decremented when its buffer drops.
/// Shared between the normalizer that mints tensors and anyone who wants to
/// assert the count, so cloning the ledger clones a handle, not the count.
#[derive(Debug, Clone, Default)]
pub struct BufferLedger {
    live: Arc<AtomicUsize>,
}

impl BufferLedger {
    /// Creates a ledger with zero live buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tensor buffers currently alive.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn track(&self) -> BufferGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        BufferGuard {
            live: Arc::clone(&self.live),
        }
    }
}

/// Decrements the ledger when the owning tensor drops.
#[derive(Debug)]
pub(crate) struct BufferGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for BufferGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A normalized model input: shape [1, 224, 224, 3], values in [0, 1].
///
/// Exclusively owned by the inference call it was produced for. There is no
/// explicit release operation; moving it into `infer` (or dropping it) frees
/// the buffer and settles the ledger.
#[derive(Debug)]
pub struct NormalizedTensor {
    data: Tensor4D,
    _guard: BufferGuard,
}

impl NormalizedTensor {
    pub(crate) fn new(data: Tensor4D, guard: BufferGuard) -> Self {
        debug_assert_eq!(
            data.shape(),
            [
                1,
                MODEL_INPUT_HEIGHT as usize,
                MODEL_INPUT_WIDTH as usize,
                MODEL_INPUT_CHANNELS
            ]
        );
        Self {
            data,
            _guard: guard,
        }
    }

    /// Borrowed view over the tensor data.
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// The tensor shape, always `[1, 224, 224, 3]`.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_tensor() -> Tensor4D {
        Array4::zeros((
            1,
            MODEL_INPUT_HEIGHT as usize,
            MODEL_INPUT_WIDTH as usize,
            MODEL_INPUT_CHANNELS,
        ))
    }

    #[test]
    fn test_ledger_counts_live_buffers() {
        let ledger = BufferLedger::new();
        assert_eq!(ledger.live(), 0);

        let a = NormalizedTensor::new(blank_tensor(), ledger.track());
        let b = NormalizedTensor::new(blank_tensor(), ledger.track());
        assert_eq!(ledger.live(), 2);

        drop(a);
        assert_eq!(ledger.live(), 1);
        drop(b);
        assert_eq!(ledger.live(), 0);
    }

    #[test]
    fn test_ledger_clone_shares_count() {
        let ledger = BufferLedger::new();
        let handle = ledger.clone();

        let tensor = NormalizedTensor::new(blank_tensor(), ledger.track());
        assert_eq!(handle.live(), 1);
        drop(tensor);
        assert_eq!(handle.live(), 0);
    }
}
