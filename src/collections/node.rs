use core::ops::{Index, IndexMut};

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::vec::Vec;
    }
}

/// a handle to a node stored in a `NodeArena`. the generation is bumped every
/// time a slot is vacated, so a handle to a detached node never aliases a node
/// that later reuses the same slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey {
    index: usize,
    generation: u32,
}

/// a non-owning reference to a neighbor, `None` past either end of the chain
pub(crate) type Link = Option<NodeKey>;

/// a single element of the chain. `prev` and `next` never own their targets,
/// the arena owns every node
#[derive(Debug)]
pub(crate) struct ChainNode<T> {
    pub(crate) prev: Link,
    pub(crate) value: T,
    pub(crate) next: Link,
}

impl<T> ChainNode<T> {
    pub(crate) const fn new(prev: Link, value: T, next: Link) -> Self {
        Self { prev, value, next }
    }
}

enum Slot<T> {
    Occupied {
        generation: u32,
        node: ChainNode<T>,
    },
    Vacant {
        generation: u32,
        next_free: Option<usize>,
    },
}

/// backing storage for the nodes of a single chain. vacated slots are kept on
/// an intrusive free list and reused by later inserts
pub(crate) struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
}

impl<T> NodeArena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
        }
    }

    /// store `node`, reusing a vacant slot if one exists
    pub(crate) fn insert(&mut self, node: ChainNode<T>) -> NodeKey {
        match self.free_head {
            Some(index) => {
                let generation = match self.slots[index] {
                    Slot::Vacant {
                        generation,
                        next_free,
                    } => {
                        self.free_head = next_free;
                        generation
                    }
                    Slot::Occupied { .. } => {
                        unreachable!("free list only ever holds vacant slots")
                    }
                };
                log::trace!("reusing node slot {} at generation {}", index, generation);
                self.slots[index] = Slot::Occupied { generation, node };
                NodeKey { index, generation }
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot::Occupied {
                    generation: 0,
                    node,
                });
                log::trace!("node arena grew to {} slots", self.slots.len());
                NodeKey {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// vacate the slot behind `key`, handing back the node it held. returns
    /// None if `key` is stale
    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<ChainNode<T>> {
        if !self.contains(key) {
            return None;
        }

        let vacant = Slot::Vacant {
            generation: key.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        match core::mem::replace(&mut self.slots[key.index], vacant) {
            Slot::Occupied { node, .. } => {
                self.free_head = Some(key.index);
                Some(node)
            }
            Slot::Vacant { .. } => unreachable!("contains() validated the slot is occupied"),
        }
    }

    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&ChainNode<T>> {
        match self.slots.get(key.index) {
            Some(Slot::Occupied { generation, node }) if *generation == key.generation => Some(node),
            _ => None,
        }
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut ChainNode<T>> {
        match self.slots.get_mut(key.index) {
            Some(Slot::Occupied { generation, node }) if *generation == key.generation => Some(node),
            _ => None,
        }
    }

    /// mutable references to every stored value, indexed by slot. vacant
    /// slots yield None
    pub(crate) fn values_by_slot_mut(&mut self) -> Vec<Option<&mut T>> {
        self.slots
            .iter_mut()
            .map(|slot| match slot {
                Slot::Occupied { node, .. } => Some(&mut node.value),
                Slot::Vacant { .. } => None,
            })
            .collect()
    }

    /// drop every node. slots are vacated rather than forgotten so keys handed
    /// out before the clear stay stale
    pub(crate) fn clear(&mut self) {
        self.free_head = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let generation = match slot {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *slot = Slot::Vacant {
                generation,
                next_free: self.free_head,
            };
            self.free_head = Some(index);
        }
    }
}

impl NodeKey {
    /// the slot this key addresses
    pub(crate) fn slot(self) -> usize {
        self.index
    }
}

impl<T> Index<NodeKey> for NodeArena<T> {
    type Output = ChainNode<T>;

    fn index(&self, key: NodeKey) -> &Self::Output {
        match self.get(key) {
            Some(node) => node,
            None => panic!("stale node key {:?}, chain links must only name live nodes", key),
        }
    }
}

impl<T> IndexMut<NodeKey> for NodeArena<T> {
    fn index_mut(&mut self, key: NodeKey) -> &mut Self::Output {
        match self.get_mut(key) {
            Some(node) => node,
            None => panic!("stale node key {:?}, chain links must only name live nodes", key),
        }
    }
}
