// src/launch/batch.rs

//! Pure batch planning.

use crate::errors::{Result, TaskfleetError};

/// A group of 1-based task indices processed back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based position of the batch in its pass.
    pub number: usize,
    pub indices: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn first_index(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }
}

/// Number of batches needed for `total` tasks.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    total.div_ceil(batch_size)
}

/// Split task indices `1..=total` into consecutive batches of `batch_size`.
///
/// The last batch holds the remainder. A zero batch size cannot make
/// progress and is rejected.
pub fn plan_batches(total: usize, batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(TaskfleetError::InvalidRequest(
            "batch size must be >= 1".to_string(),
        ));
    }

    let batches = (1..=total)
        .collect::<Vec<_>>()
        .chunks(batch_size)
        .enumerate()
        .map(|(i, chunk)| Batch {
            number: i + 1,
            indices: chunk.to_vec(),
        })
        .collect();

    Ok(batches)
}

/// Retry passes re-attempt every pending failure as a single batch.
pub fn retry_batch(pending: &[usize]) -> Batch {
    Batch {
        number: 1,
        indices: pending.to_vec(),
    }
}
