/// Bounded top-K selection.
///
/// Keeps the K greatest items seen so far in a min-heap of capacity K, so
/// feeding F items costs O(F log K) time and O(K) memory instead of
/// collecting and sorting all F.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Largest initial heap allocation. Large limits grow on demand.
const MAX_PREALLOCATED: usize = 4_096;

#[derive(Debug, Clone)]
pub struct TopK<T: Ord> {
    capacity: usize,
    // Min-heap: the root is the weakest item currently kept.
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> TopK<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(MAX_PREALLOCATED)),
        }
    }

    /// Offer an item. It is kept if fewer than K items are held or if it
    /// beats the weakest one held. On a tie with the weakest, the item
    /// already held stays.
    pub fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(item));
            return;
        }
        if let Some(mut weakest) = self.heap.peek_mut() {
            if item > weakest.0 {
                // Replacing through `PeekMut` re-sifts the root on drop.
                *weakest = Reverse(item);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Consume the selection, greatest item first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        // Ascending order of `Reverse<T>` is descending order of `T`.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(item)| item)
            .collect()
    }
}
