//! Recency Index Module
//!
//! Tracks touch order for LRU eviction as an arena-backed doubly linked list.

// == Node Handle ==
/// Non-owning handle to a node in a [`RecencyIndex`].
///
/// Handed out by [`RecencyIndex::insert`] and stored next to the cached
/// value for O(1) relinking. Valid until the node is deleted; a stale
/// handle never matches a node that later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency Index ==
/// Keys ordered by touch time.
///
/// - Head = least recently touched (next eviction victim)
/// - Tail = most recently touched
///
/// The index owns every node. It performs no locking of its own; the owning
/// cache serializes access.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    slots: Vec<Option<Node>>,
    /// Bumped each time a slot is freed, parallel to `slots`
    generations: Vec<u64>,
    /// Vacant slots available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl RecencyIndex {
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Insert ==
    /// Appends `key` at the tail.
    ///
    /// The key must not already be present; the caller tracks membership.
    pub fn insert(&mut self, key: String) -> NodeId {
        let node = Node {
            key,
            prev: None,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.generations.push(0);
                self.slots.len() - 1
            }
        };

        self.link_back(idx);
        self.len += 1;
        NodeId {
            index: idx,
            generation: self.generations[idx],
        }
    }

    // == Delete ==
    /// Unlinks and frees the node, returning its key.
    ///
    /// Returns None if the handle no longer refers to a live node.
    pub fn delete(&mut self, id: NodeId) -> Option<String> {
        if !self.is_live(id) {
            return None;
        }
        self.unlink(id.index);

        let node = self.slots[id.index].take()?;
        self.generations[id.index] += 1;
        self.free.push(id.index);
        self.len -= 1;
        Some(node.key)
    }

    // == Touch ==
    /// Moves the node to the tail. The handle stays valid.
    pub fn touch(&mut self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.unlink(id.index);
        self.link_back(id.index);
        true
    }

    // == Oldest ==
    /// Returns the head node and its key, or None if the index is empty.
    pub fn oldest(&self) -> Option<(NodeId, &str)> {
        let idx = self.head?;
        self.slots[idx]
            .as_ref()
            .map(|node| {
                let id = NodeId {
                    index: idx,
                    generation: self.generations[idx],
                };
                (id, node.key.as_str())
            })
    }

    /// Returns the least recently touched key.
    pub fn oldest_key(&self) -> Option<&str> {
        self.oldest().map(|(_, key)| key)
    }

    /// Returns the most recently touched key.
    pub fn newest_key(&self) -> Option<&str> {
        let idx = self.tail?;
        self.slots[idx].as_ref().map(|node| node.key.as_str())
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iterate ==
    /// Iterates keys from head (oldest) to tail (newest).
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    /// True if `id` still names the node it was issued for.
    fn is_live(&self, id: NodeId) -> bool {
        self.generations.get(id.index) == Some(&id.generation)
            && matches!(self.slots.get(id.index), Some(Some(_)))
    }

    fn slot_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Attaches an already-stored, detached node at the tail.
    fn link_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.slot_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }

        match old_tail {
            Some(tail) => {
                if let Some(node) = self.slot_mut(tail) {
                    node.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    /// Detaches a node from its neighbours without freeing it.
    ///
    /// Covers the only-node, head, tail and interior cases through the
    /// prev/next fallbacks onto `head`/`tail`.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.slots.get(idx).and_then(Option::as_ref) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev) => {
                if let Some(node) = self.slot_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next) => {
                if let Some(node) = self.slot_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slot_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }
}

// == Iterator ==
/// Head-to-tail iterator over index keys.
pub struct Iter<'a> {
    index: &'a RecencyIndex,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.slots[self.cursor?].as_ref()?;
        self.cursor = node.next;
        Some(node.key.as_str())
    }
}
