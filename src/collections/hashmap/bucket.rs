/*!
 * Bucket Lists
 * Doubly linked entry lists threaded through the node slab
 */

use super::{NodeIndex, StepMap};

/// Head of one bucket's entry list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Bucket {
    pub head: Option<NodeIndex>,
    pub tail: Option<NodeIndex>,
    pub len: usize,
}

impl Bucket {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<K, V> StepMap<K, V> {
    pub(super) fn push_front(&mut self, bucket: usize, index: NodeIndex) {
        let old_head = self.buckets[bucket].head;
        {
            let node = self.node_mut(index);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(index),
            None => self.buckets[bucket].tail = Some(index),
        }
        let list = &mut self.buckets[bucket];
        list.head = Some(index);
        list.len += 1;
    }

    pub(super) fn push_back(&mut self, bucket: usize, index: NodeIndex) {
        let old_tail = self.buckets[bucket].tail;
        {
            let node = self.node_mut(index);
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => self.node_mut(tail).next = Some(index),
            None => self.buckets[bucket].head = Some(index),
        }
        let list = &mut self.buckets[bucket];
        list.tail = Some(index);
        list.len += 1;
    }

    /// Detach an entry from its bucket, leaving the node in the slab
    pub(super) fn unlink(&mut self, index: NodeIndex) {
        let (bucket, prev, next) = {
            let node = self.node(index);
            (node.bucket, node.prev, node.next)
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.buckets[bucket].head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.buckets[bucket].tail = prev,
        }
        self.buckets[bucket].len -= 1;

        let node = self.node_mut(index);
        node.prev = None;
        node.next = None;
    }

    #[inline]
    pub(super) fn next_in_bucket(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).next
    }

    #[inline]
    pub(super) fn prev_in_bucket(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).prev
    }

    /// First entry in bucket `from` or any later bucket
    pub(super) fn first_from_bucket(&self, from: usize) -> Option<(usize, NodeIndex)> {
        self.buckets
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(bucket, list)| list.head.map(|head| (bucket, head)))
    }
}
