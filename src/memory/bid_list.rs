use std::cmp::Ordering;

use crate::core::record::{order, BidRecord};

/// Index of a node slot in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeIdx(u32);

#[derive(Debug, Clone)]
struct BidNode {
    record: BidRecord,
    prev: Option<NodeIdx>,
    next: Option<NodeIdx>,
}

/// Doubly-linked, insertion-ordered collection of bids.
///
/// Nodes live in an arena and link to each other by slot index, so the list
/// owns every node outright. Vacated slots are recycled through a free list.
/// Lookups by key are linear scans; the list itself does not enforce key
/// uniqueness.
#[derive(Debug, Clone, Default)]
pub struct BidList {
    slots: Vec<Option<BidNode>>,
    free_slots: Vec<u32>,
    head: Option<NodeIdx>,
    tail: Option<NodeIdx>,
    len: usize,
}

impl BidList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a bid at the tail
    pub fn append(&mut self, record: BidRecord) {
        let idx = self.alloc(record);
        match self.tail {
            Some(old_tail) => {
                self.node_mut(old_tail).next = Some(idx);
                self.node_mut(idx).prev = Some(old_tail);
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    /// Adds a bid at the head
    pub fn prepend(&mut self, record: BidRecord) {
        let idx = self.alloc(record);
        match self.head {
            Some(old_head) => {
                self.node_mut(old_head).prev = Some(idx);
                self.node_mut(idx).next = Some(old_head);
            }
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
    }

    /// Splices a bid in right after the first node holding `key`.
    /// Returns false and leaves the list untouched when the key is absent.
    pub fn insert_after(&mut self, key: &str, record: BidRecord) -> bool {
        let Some(anchor) = self.find(key) else {
            return false;
        };

        let idx = self.alloc(record);
        let after = self.node(anchor).next;
        {
            let node = self.node_mut(idx);
            node.prev = Some(anchor);
            node.next = after;
        }
        self.node_mut(anchor).next = Some(idx);
        match after {
            Some(n) => self.node_mut(n).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
        true
    }

    /// Unlinks the first bid holding `key` and hands it back
    pub fn remove(&mut self, key: &str) -> Option<BidRecord> {
        let idx = self.find(key)?;
        let node = self.slots[idx.0 as usize].take()?;

        match node.prev {
            Some(p) => self.node_mut(p).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.node_mut(n).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free_slots.push(idx.0);
        self.len -= 1;
        Some(node.record)
    }

    /// Returns a copy of the first bid holding `key`
    pub fn search(&self, key: &str) -> Option<BidRecord> {
        self.find(key).map(|idx| self.node(idx).record.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Copies every bid out in current link order
    pub fn get_all(&self) -> Vec<BidRecord> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Reverses the link order in place
    pub fn reverse(&mut self) {
        let mut current = self.head;
        while let Some(idx) = current {
            let node = self.node_mut(idx);
            std::mem::swap(&mut node.prev, &mut node.next);
            // the old `next` now sits in `prev`
            current = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
    }

    /// Stable merge sort over the links.
    ///
    /// Equal elements keep their relative order: the left run wins unless
    /// `compare(left, right)` is `Greater`.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&BidRecord, &BidRecord) -> Ordering,
    {
        if self.len < 2 {
            return;
        }

        self.head = self.merge_sort(self.head, &mut compare);

        // Rebuild back links and the tail from the forward chain
        let mut prev = None;
        let mut current = self.head;
        while let Some(idx) = current {
            let node = self.node_mut(idx);
            node.prev = prev;
            prev = Some(idx);
            current = node.next;
        }
        self.tail = prev;
    }

    /// Searches for `key` over key-sorted links.
    ///
    /// The list is re-sorted by key first, which discards any other order the
    /// caller set up. Each step walks to the window midpoint, so a step
    /// costs O(window) rather than O(1).
    pub fn binary_search(&mut self, key: &str) -> Option<BidRecord> {
        if self.is_empty() {
            return None;
        }
        self.sort_by(order::by_key);

        let mut start = self.head;
        let mut end = self.tail;
        while let (Some(s), Some(e)) = (start, end) {
            let stop = self.node(e).next;
            if Some(s) == stop {
                break;
            }

            let mid = self.middle(s, stop);
            let node = self.node(mid);
            match node.record.auction_id.as_str().cmp(key) {
                Ordering::Equal => return Some(node.record.clone()),
                Ordering::Less => start = node.next,
                Ordering::Greater => end = node.prev,
            }
        }
        None
    }

    /// Borrowing iterator in link order
    pub(crate) fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn find(&self, key: &str) -> Option<NodeIdx> {
        let mut current = self.head;
        while let Some(idx) = current {
            let node = self.node(idx);
            if node.record.auction_id == key {
                return Some(idx);
            }
            current = node.next;
        }
        None
    }

    fn merge_sort<F>(&mut self, head: Option<NodeIdx>, compare: &mut F) -> Option<NodeIdx>
    where
        F: FnMut(&BidRecord, &BidRecord) -> Ordering,
    {
        let first = head?;
        if self.node(first).next.is_none() {
            return head;
        }

        let middle = self.middle(first, None);
        let right = self.node_mut(middle).next.take();

        let left = self.merge_sort(Some(first), compare);
        let right = self.merge_sort(right, compare);
        self.merge(left, right, compare)
    }

    fn merge<F>(
        &mut self,
        mut left: Option<NodeIdx>,
        mut right: Option<NodeIdx>,
        compare: &mut F,
    ) -> Option<NodeIdx>
    where
        F: FnMut(&BidRecord, &BidRecord) -> Ordering,
    {
        let mut head = None;
        let mut tail: Option<NodeIdx> = None;

        loop {
            let taken = match (left, right) {
                (Some(l), Some(r)) => {
                    if compare(&self.node(l).record, &self.node(r).record) == Ordering::Greater {
                        right = self.node(r).next;
                        r
                    } else {
                        left = self.node(l).next;
                        l
                    }
                }
                (rest, None) | (None, rest) => {
                    match tail {
                        Some(t) => self.node_mut(t).next = rest,
                        None => head = rest,
                    }
                    return head;
                }
            };

            match tail {
                Some(t) => self.node_mut(t).next = Some(taken),
                None => head = Some(taken),
            }
            tail = Some(taken);
        }
    }

    /// Slow/fast pointer walk from `start`; the fast pointer stops at `stop`
    /// (exclusive). Returns the lower middle of the window.
    fn middle(&self, start: NodeIdx, stop: Option<NodeIdx>) -> NodeIdx {
        let mut slow = start;
        let mut fast = self.node(start).next;

        while let Some(f) = fast {
            if Some(f) == stop {
                break;
            }
            fast = self.node(f).next;
            if fast.is_some() && fast != stop {
                if let Some(s) = self.node(slow).next {
                    slow = s;
                }
                fast = fast.and_then(|f| self.node(f).next);
            }
        }
        slow
    }

    fn alloc(&mut self, record: BidRecord) -> NodeIdx {
        let node = BidNode {
            record,
            prev: None,
            next: None,
        };
        match self.free_slots.pop() {
            Some(free) => {
                self.slots[free as usize] = Some(node);
                NodeIdx(free)
            }
            None => {
                let idx = NodeIdx(self.slots.len() as u32);
                self.slots.push(Some(node));
                idx
            }
        }
    }

    #[inline(always)]
    fn node(&self, idx: NodeIdx) -> &BidNode {
        self.slots[idx.0 as usize]
            .as_ref()
            .expect("dangling node index")
    }

    #[inline(always)]
    fn node_mut(&mut self, idx: NodeIdx) -> &mut BidNode {
        self.slots[idx.0 as usize]
            .as_mut()
            .expect("dangling node index")
    }
}

pub(crate) struct Iter<'a> {
    list: &'a BidList,
    current: Option<NodeIdx>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a BidRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.current?;
        let node = self.list.node(idx);
        self.current = node.next;
        Some(&node.record)
    }
}
