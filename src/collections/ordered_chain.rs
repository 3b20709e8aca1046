use core::fmt;
use core::iter::FusedIterator;

use derive_more::Display;

use super::node::{ChainNode, Link, NodeArena, NodeKey};

cfg_if::cfg_if! {
    if #[cfg(feature = "no-std")] {
        use alloc::vec::Vec;
        use alloc::vec::IntoIter as VecIntoIter;
    } else {
        use std::vec::IntoIter as VecIntoIter;
    }
}

pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ChainError {
    /// a positional operation was handed an index outside the range it accepts
    #[display(fmt = "index {} is out of range for a chain of size {}", index, size)]
    IndexOutOfRange { index: usize, size: usize },
    /// an end-removal was attempted on an empty chain
    #[display(fmt = "cannot remove from an empty chain")]
    EmptyContainer,
}

#[cfg(not(feature = "no-std"))]
impl std::error::Error for ChainError {}

/// a doubly-linked list of owned values.
///
/// nodes live in an arena owned by the chain and refer to their neighbors by
/// generation-checked keys, so the chain never forms an ownership cycle. an
/// empty chain has no head and no tail; there are no placeholder nodes.
///
/// end operations (`push`, `pop`, `shift`, `unshift`) are O(1). positional
/// operations walk from whichever end is closer to the index.
pub struct OrderedChain<T> {
    nodes: NodeArena<T>,
    head: Link,
    tail: Link,
    len: usize,
}

impl<T> OrderedChain<T> {
    /// create an empty chain
    pub const fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// create an empty chain with room for `capacity` nodes before the node
    /// storage has to grow
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// create a chain holding `values` in order
    pub fn from_values<I: IntoIterator<Item = T>>(values: I) -> Self {
        values.into_iter().collect()
    }

    /// the number of elements in the chain
    pub fn len(&self) -> usize {
        self.len
    }

    /// alias of `len`
    pub fn size(&self) -> usize {
        self.len
    }

    /// returns true if the chain holds no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// the first value, or None if the chain is empty
    pub fn head(&self) -> Option<&T> {
        self.head.map(|key| &self.nodes[key].value)
    }

    /// the last value, or None if the chain is empty
    pub fn tail(&self) -> Option<&T> {
        self.tail.map(|key| &self.nodes[key].value)
    }

    pub fn head_mut(&mut self) -> Option<&mut T> {
        let key = self.head?;
        Some(&mut self.nodes[key].value)
    }

    pub fn tail_mut(&mut self) -> Option<&mut T> {
        let key = self.tail?;
        Some(&mut self.nodes[key].value)
    }

    /// append `value` after the current tail
    pub fn push(&mut self, value: T) -> &mut Self {
        let key = self.nodes.insert(ChainNode::new(self.tail, value, None));
        match self.tail {
            Some(old_tail) => self.nodes[old_tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.len += 1;
        self
    }

    /// prepend `value` before the current head
    pub fn unshift(&mut self, value: T) -> &mut Self {
        self.link_front(value);
        self
    }

    /// borrow the value at `index`
    pub fn get(&self, index: usize) -> ChainResult<&T> {
        let key = self.key_at(index, "get")?;
        Ok(&self.nodes[key].value)
    }

    /// mutably borrow the value at `index`
    pub fn get_mut(&mut self, index: usize) -> ChainResult<&mut T> {
        let key = self.key_at(index, "get_mut")?;
        Ok(&mut self.nodes[key].value)
    }

    /// replace the element at `index` with a new node holding `value`,
    /// returning the value that was displaced
    pub fn set(&mut self, index: usize, value: T) -> ChainResult<T> {
        let old_key = self.key_at(index, "set")?;
        let old = self.detach_node(old_key);

        let key = self.nodes.insert(ChainNode::new(old.prev, value, old.next));
        match old.prev {
            Some(prev) => self.nodes[prev].next = Some(key),
            None => self.head = Some(key),
        }
        match old.next {
            Some(next) => self.nodes[next].prev = Some(key),
            None => self.tail = Some(key),
        }

        Ok(old.value)
    }

    /// insert `value` so it becomes the element at `index`, shifting the
    /// element previously at `index` and everything after it back by one.
    ///
    /// `index` must be 0 or less than `len()`. appending at `len()` is left to
    /// `push`.
    pub fn add(&mut self, index: usize, value: T) -> ChainResult<()> {
        if index == 0 {
            self.link_front(value);
            return Ok(());
        }

        let at = self.key_at(index, "add")?;
        // index > 0, so `at` always has a predecessor
        let prev = self.nodes[at].prev;
        let key = self.nodes.insert(ChainNode::new(prev, value, Some(at)));
        self.nodes[at].prev = Some(key);
        match prev {
            Some(prev) => self.nodes[prev].next = Some(key),
            None => self.head = Some(key),
        }
        self.len += 1;
        Ok(())
    }

    /// detach the element at `index` and return its value
    pub fn remove(&mut self, index: usize) -> ChainResult<T> {
        let key = self.key_at(index, "remove")?;
        Ok(self.unlink(key))
    }

    /// detach the tail and return its value
    pub fn pop(&mut self) -> ChainResult<T> {
        match self.tail {
            Some(key) => Ok(self.unlink(key)),
            None => Err(Self::empty("pop")),
        }
    }

    /// detach the head and return its value
    pub fn shift(&mut self) -> ChainResult<T> {
        match self.head {
            Some(key) => Ok(self.unlink(key)),
            None => Err(Self::empty("shift")),
        }
    }

    /// the value following the element at `index`, or None if that element
    /// is the tail
    pub fn peek_next(&self, index: usize) -> ChainResult<Option<&T>> {
        let key = self.key_at(index, "peek_next")?;
        Ok(self.nodes[key].next.map(|next| &self.nodes[next].value))
    }

    /// the value preceding the element at `index`, or None if that element
    /// is the head
    pub fn peek_prev(&self, index: usize) -> ChainResult<Option<&T>> {
        let key = self.key_at(index, "peek_prev")?;
        Ok(self.nodes[key].prev.map(|prev| &self.nodes[prev].value))
    }

    /// detach every element
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// return an immutable iterator over the current elements, head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// return a mutable iterator over the current elements, head to tail
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let order: Vec<usize> = self.keys().map(NodeKey::slot).collect();
        IterMut {
            values: self.nodes.values_by_slot_mut(),
            order: order.into_iter(),
        }
    }

    /// call `callback` once per element, head to tail, with a copy of the
    /// value, the number of callbacks made so far, and the chain itself.
    ///
    /// the elements to visit are fixed when the traversal starts. if the
    /// callback removes or replaces (`set`) an element that has not been
    /// visited yet, that element is skipped. elements inserted by the callback
    /// are never visited. the traversal makes at most `len()` calls, counted
    /// at the start.
    pub fn for_each<F>(&mut self, mut callback: F)
    where
        T: Clone,
        F: FnMut(T, usize, &mut Self),
    {
        let visit: Vec<NodeKey> = self.keys().collect();
        let mut index = 0;
        for key in visit {
            let value = match self.nodes.get(key) {
                Some(node) => node.value.clone(),
                None => continue,
            };
            callback(value, index, self);
            index += 1;
        }
    }

    fn keys(&self) -> Keys<'_, T> {
        Keys {
            nodes: &self.nodes,
            curr: self.head,
        }
    }

    /// walk to the node at `index` from whichever end is closer
    fn key_at(&self, index: usize, op: &'static str) -> ChainResult<NodeKey> {
        if index >= self.len {
            return Err(self.out_of_range(index, op));
        }

        let found = if index <= self.len / 2 {
            let mut curr = self.head;
            for _ in 0..index {
                curr = curr.and_then(|key| self.nodes[key].next);
            }
            curr
        } else {
            let mut curr = self.tail;
            for _ in index..self.len - 1 {
                curr = curr.and_then(|key| self.nodes[key].prev);
            }
            curr
        };

        match found {
            Some(key) => Ok(key),
            None => unreachable!("a chain of size {} ends before index {}", self.len, index),
        }
    }

    fn link_front(&mut self, value: T) {
        let key = self.nodes.insert(ChainNode::new(None, value, self.head));
        match self.head {
            Some(old_head) => self.nodes[old_head].prev = Some(key),
            None => self.tail = Some(key),
        }
        self.head = Some(key);
        self.len += 1;
    }

    /// take the node out of the arena and close the gap it leaves, fixing up
    /// head and tail when it was an endpoint. the node's own links are left
    /// as they were so callers can re-splice in its place
    fn detach_node(&mut self, key: NodeKey) -> ChainNode<T> {
        let node = match self.nodes.remove(key) {
            Some(node) => node,
            None => unreachable!("chain links must only name live nodes"),
        };
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        node
    }

    fn unlink(&mut self, key: NodeKey) -> T {
        let node = self.detach_node(key);
        self.len -= 1;
        node.value
    }

    fn out_of_range(&self, index: usize, op: &'static str) -> ChainError {
        log::trace!(
            "rejected {}: index {} out of range for size {}",
            op,
            index,
            self.len
        );
        ChainError::IndexOutOfRange {
            index,
            size: self.len,
        }
    }

    fn empty(op: &'static str) -> ChainError {
        log::trace!("rejected {}: chain is empty", op);
        ChainError::EmptyContainer
    }

    /// walk the chain in both directions and panic if any link disagrees
    /// with `head`, `tail` or `len`
    #[cfg(test)]
    pub(crate) fn assert_links_consistent(&self) {
        assert_eq!(self.head.is_none(), self.len == 0);
        assert_eq!(self.tail.is_none(), self.len == 0);

        let mut count = 0;
        let mut prev: Link = None;
        let mut curr = self.head;
        while let Some(key) = curr {
            let node = &self.nodes[key];
            assert_eq!(node.prev, prev, "prev link of node {} is broken", count);
            prev = curr;
            curr = node.next;
            count += 1;
            assert!(count <= self.len, "chain is longer than its size");
        }
        assert_eq!(count, self.len);
        assert_eq!(prev, self.tail);
    }
}

impl<T> Default for OrderedChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for OrderedChain<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> FromIterator<T> for OrderedChain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = Self::new();
        chain.extend(iter);
        chain
    }
}

impl<T> Extend<T> for OrderedChain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for OrderedChain<T> {
    fn from(values: [T; N]) -> Self {
        let mut chain = Self::with_capacity(N);
        chain.extend(values);
        chain
    }
}

impl<T> IntoIterator for OrderedChain<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { chain: self }
    }
}

impl<'a, T> IntoIterator for &'a OrderedChain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut OrderedChain<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

struct Keys<'a, T> {
    nodes: &'a NodeArena<T>,
    curr: Link,
}

impl<'a, T> Iterator for Keys<'a, T> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.curr?;
        self.curr = self.nodes[key].next;
        Some(key)
    }
}

pub struct Iter<'a, T> {
    nodes: &'a NodeArena<T>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let nodes: &'a NodeArena<T> = self.nodes;
        let node = &nodes[self.front?];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let nodes: &'a NodeArena<T> = self.nodes;
        let node = &nodes[self.back?];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

pub struct IterMut<'a, T> {
    values: Vec<Option<&'a mut T>>,
    order: VecIntoIter<usize>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.order.next()?;
        self.values[slot].take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let slot = self.order.next_back()?;
        self.values[slot].take()
    }
}

impl<'a, T> ExactSizeIterator for IterMut<'a, T> {}

impl<'a, T> FusedIterator for IterMut<'a, T> {}

/// an owning iterator that drains the chain from the head
pub struct IntoIter<T> {
    chain: OrderedChain<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.chain.shift().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.chain.len(), Some(self.chain.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chain.pop().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}



#[cfg(test)]
mod for_each_tests {
    use super::*;

    #[test]
    fn visits_every_element_with_running_index() {
        let mut chain = OrderedChain::from([10, 20, 30]);
        let mut seen = Vec::new();
        chain.for_each(|value, index, chain| seen.push((value, index, chain.len())));
        assert_eq!(seen, [(10, 0, 3), (20, 1, 3), (30, 2, 3)]);
    }

    #[test]
    fn on_empty_chain_never_calls_back() {
        let mut chain = OrderedChain::<u32>::new();
        let mut calls = 0;
        chain.for_each(|_, _, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn elements_pushed_during_traversal_are_not_visited() {
        let mut chain = OrderedChain::from([1, 2]);
        let mut seen = Vec::new();
        chain.for_each(|value, _, chain| {
            seen.push(value);
            chain.push(value * 10);
        });
        assert_eq!(seen, [1, 2]);
        assert_eq!(chain.iter().copied().collect::<Vec<_>>(), [1, 2, 10, 20]);
        chain.assert_links_consistent();
    }

    #[test]
    fn elements_removed_before_they_are_reached_are_skipped() {
        let mut chain = OrderedChain::from([1, 2, 3, 4]);
        let mut seen = Vec::new();
        chain.for_each(|value, index, chain| {
            seen.push((value, index));
            if value == 1 {
                chain.remove(1).expect("index should be valid");
            }
        });
        assert_eq!(seen, [(1, 0), (3, 1), (4, 2)]);
        chain.assert_links_consistent();
    }

    #[test]
    fn removing_the_visited_element_does_not_stop_traversal() {
        let mut chain = OrderedChain::from([1, 2, 3]);
        let mut seen = Vec::new();
        chain.for_each(|value, _, chain| {
            seen.push(value);
            chain.shift().expect("chain is not empty");
        });
        assert_eq!(seen, [1, 2, 3]);
        assert!(chain.is_empty());
    }

    #[test]
    fn replaced_elements_are_skipped() {
        let mut chain = OrderedChain::from([1, 2, 3]);
        let mut seen = Vec::new();
        chain.for_each(|value, _, chain| {
            seen.push(value);
            if value == 1 {
                chain.set(2, 30).expect("index should be valid");
            }
        });
        assert_eq!(seen, [1, 2]);
        assert_eq!(chain.tail(), Some(&30));
    }

    #[test]
    fn clear_then_refill_during_traversal_stops_it() {
        let mut chain = OrderedChain::from([1, 2, 3]);
        let mut seen = Vec::new();
        chain.for_each(|value, _, chain| {
            seen.push(value);
            chain.clear();
            chain.push(7).push(8).push(9);
        });
        assert_eq!(seen, [1]);
        assert_eq!(chain.iter().copied().collect::<Vec<_>>(), [7, 8, 9]);
    }
}

// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use std::collections::VecDeque;

    use proptest::collection::vec;
    use proptest::prelude::*;
    use proptest::test_runner::Config;
    use proptest_derive::Arbitrary;
    use proptest_state_machine::{ReferenceStateMachine, StateMachineTest};
    use rand::Rng;

    use super::*;

    proptest_state_machine::prop_state_machine! {
        #![proptest_config(Config {
            failure_persistence: None,
            .. Config::default()
        })]

        #[test]
        fn ordered_chain_state_machine_test(
            sequential
            1..200
            =>
            OrderedChain<u32>
        );
    }

    #[derive(Clone, Debug)]
    pub enum Transition {
        Push(u32),
        Pop,
        Unshift(u32),
        Shift,
        Add(usize, u32),
        Remove(usize),
        Set(usize, u32),
    }

    pub struct OrderedChainStateMachine;

    // VecDeque is the model; indices range one past the end so rejected
    // calls get exercised too
    impl ReferenceStateMachine for OrderedChainStateMachine {
        type State = VecDeque<u32>;
        type Transition = Transition;

        fn init_state() -> BoxedStrategy<Self::State> {
            Just(VecDeque::new()).boxed()
        }

        fn transitions(state: &Self::State) -> BoxedStrategy<Self::Transition> {
            let index = 0..state.len() + 2;
            prop_oneof![
                3 => any::<u32>().prop_map(Transition::Push),
                1 => Just(Transition::Pop),
                2 => any::<u32>().prop_map(Transition::Unshift),
                1 => Just(Transition::Shift),
                2 => (index.clone(), any::<u32>()).prop_map(|(i, v)| Transition::Add(i, v)),
                1 => index.clone().prop_map(Transition::Remove),
                1 => (index, any::<u32>()).prop_map(|(i, v)| Transition::Set(i, v)),
            ]
            .boxed()
        }

        fn apply(mut state: Self::State, transition: &Self::Transition) -> Self::State {
            match *transition {
                Transition::Push(value) => state.push_back(value),
                Transition::Pop => {
                    state.pop_back();
                }
                Transition::Unshift(value) => state.push_front(value),
                Transition::Shift => {
                    state.pop_front();
                }
                Transition::Add(index, value) => {
                    if index == 0 || index < state.len() {
                        state.insert(index, value);
                    }
                }
                Transition::Remove(index) => {
                    state.remove(index);
                }
                Transition::Set(index, value) => {
                    if let Some(slot) = state.get_mut(index) {
                        *slot = value;
                    }
                }
            }
            state
        }
    }

    impl StateMachineTest for OrderedChain<u32> {
        type SystemUnderTest = Self;
        type Reference = OrderedChainStateMachine;

        fn init_test(
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) -> Self::SystemUnderTest {
            Self::new()
        }

        fn apply(
            mut state: Self::SystemUnderTest,
            _ref_state: &<Self::Reference as ReferenceStateMachine>::State,
            transition: Transition,
        ) -> Self::SystemUnderTest {
            let len = state.len();
            match transition {
                Transition::Push(value) => {
                    state.push(value);
                    assert_eq!(state.tail(), Some(&value));
                }
                Transition::Pop => {
                    let expected = state.tail().copied().ok_or(ChainError::EmptyContainer);
                    assert_eq!(state.pop(), expected);
                }
                Transition::Unshift(value) => {
                    state.unshift(value);
                    assert_eq!(state.head(), Some(&value));
                }
                Transition::Shift => {
                    let expected = state.head().copied().ok_or(ChainError::EmptyContainer);
                    assert_eq!(state.shift(), expected);
                }
                Transition::Add(index, value) => {
                    let previous = state.get(index).ok().copied();
                    match state.add(index, value) {
                        Ok(()) => {
                            assert_eq!(state.get(index), Ok(&value));
                            assert_eq!(state.get(index + 1).ok().copied(), previous);
                        }
                        Err(err) => {
                            assert!(index != 0 && index >= len);
                            assert_eq!(err, ChainError::IndexOutOfRange { index, size: len });
                        }
                    }
                }
                Transition::Remove(index) => {
                    let expected = state.get(index).copied();
                    assert_eq!(state.remove(index), expected);
                }
                Transition::Set(index, value) => {
                    let expected = state.get(index).copied();
                    assert_eq!(state.set(index, value), expected);
                }
            }
            state
        }

        fn check_invariants(
            state: &Self::SystemUnderTest,
            ref_state: &<Self::Reference as ReferenceStateMachine>::State,
        ) {
            state.assert_links_consistent();
            assert_eq!(state.len(), ref_state.len());
            assert!(state.iter().eq(ref_state.iter()));
            assert!(state.iter().rev().eq(ref_state.iter().rev()));
        }
    }

    #[derive(Arbitrary, Debug)]
    enum Operation {
        Push(u32),
        Unshift(u32),
        Pop,
        Shift,
        Add(u32),
        Remove,
        Set(u32),
        Iterate,
    }

    fn random_index(len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..len))
    }

    proptest! {
        #[test]
        fn pushed_values_come_back_in_order(values in vec(any::<u32>(), 0..64)) {
            let chain = OrderedChain::from_values(values.iter().copied());
            prop_assert_eq!(chain.len(), values.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(chain.get(i), Ok(v));
            }
            prop_assert_eq!(chain.head(), values.first());
            prop_assert_eq!(chain.tail(), values.last());
        }

        #[test]
        fn drain_by_pop_reverses(values in vec(any::<u32>(), 0..64)) {
            let mut chain = OrderedChain::from_values(values.iter().copied());
            let mut drained = Vec::new();
            while let Ok(v) = chain.pop() {
                drained.push(v);
            }
            drained.reverse();
            prop_assert_eq!(drained, values);
        }

        #[test]
        #[ignore]
        fn longform(ops in vec(any::<Operation>(), 2048)) {
            let mut reference = VecDeque::new();
            let mut chain = OrderedChain::new();

            for op in ops.iter() {
                match *op {
                    Operation::Push(v) => {
                        reference.push_back(v);
                        chain.push(v);
                    }
                    Operation::Unshift(v) => {
                        reference.push_front(v);
                        chain.unshift(v);
                    }
                    Operation::Pop => {
                        assert_eq!(chain.pop().ok(), reference.pop_back());
                    }
                    Operation::Shift => {
                        assert_eq!(chain.shift().ok(), reference.pop_front());
                    }
                    Operation::Add(v) => {
                        let index = random_index(reference.len()).unwrap_or(0);
                        reference.insert(index, v);
                        chain.add(index, v).expect("index was drawn from the valid range");
                    }
                    Operation::Remove => {
                        if let Some(index) = random_index(reference.len()) {
                            assert_eq!(chain.remove(index).ok(), reference.remove(index));
                        }
                    }
                    Operation::Set(v) => {
                        if let Some(index) = random_index(reference.len()) {
                            let old = std::mem::replace(&mut reference[index], v);
                            assert_eq!(chain.set(index, v), Ok(old));
                        }
                    }
                    Operation::Iterate => {
                        assert!(chain.iter().eq(reference.iter()));
                    }
                }
                chain.assert_links_consistent();
            }
        }
    }
}
