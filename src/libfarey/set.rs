// Copyright 2015 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Ordered sequence of interval-bounded nodes.
//!
//! Nodes live in an arena and the sequence holds stable handles, ascending by left bound. The structural invariant maintained by every mutation: any two intervals are disjoint or strictly nested, never partially overlapping. Parent, child and sibling relations are recomputed from intervals and sequence positions on each query; nothing is linked.
//!
//! Placement works on free gaps between existing boundaries. Each insertion locates a gap, takes two successive mediants inside it and splices at the position that keeps the sequence sorted, so the invariant holds by construction. Scans are linear and splices shift the tail of the sequence; this matches the intended complexity of the structure, which favors simplicity over balanced-tree guarantees.
//!
//! Deleting a node removes only that node. Descendants keep their bounds and remain discoverable by containment from the remaining ancestors; no rebalancing happens. The set is single-threaded: callers needing shared access must serialize around the whole structure, since a splice during a scan would tear the invariant.

use crate::errors::{FareyError, FareyResult};
use crate::fraction::Fraction;
use crate::interval::Interval;
use crate::node::Node;
use crate::ops::{Coefficient, Mediant};
use generational_arena::{Arena, Index};
use std::cmp::Ordering;
use tracing::{instrument, warn};

/// Stable handle to a node of one set. Handles survive unrelated mutations
/// and go stale on deletion: a stale handle resolves to `UnknownNode`
/// instead of aliasing a later insertion.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct NodeId(Index);

#[derive(Debug)]
pub struct NestedIntervalSet<V, T = i64>
{
  arena: Arena<Node<V, T>>,
  seq: Vec<NodeId>,
}

impl<V, T: Coefficient> Default for NestedIntervalSet<V, T>
{
  fn default() -> Self {
    NestedIntervalSet::new()
  }
}

impl<V, T: Coefficient> NestedIntervalSet<V, T>
{
  pub fn new() -> NestedIntervalSet<V, T> {
    NestedIntervalSet { arena: Arena::new(), seq: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.seq.len()
  }

  pub fn is_empty(&self) -> bool {
    self.seq.is_empty()
  }

  pub fn get(&self, id: NodeId) -> Option<&Node<V, T>> {
    self.arena.get(id.0)
  }

  /// Mutable access to a node's value; positions are never mutable from
  /// the outside.
  pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
    self.arena.get_mut(id.0).map(Node::value_mut)
  }

  /// Nodes in sequence order.
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<V, T>)> + '_ {
    self.seq.iter().filter_map(move |&id| self.arena.get(id.0).map(|n| (id, n)))
  }

  /// Snapshot copy of the ordered sequence, the interchange format of the
  /// set's consumers.
  pub fn snapshot(&self) -> Vec<Node<V, T>> where V: Clone {
    self.iter().map(|(_, n)| n.clone()).collect()
  }

  fn resolve(&self, id: NodeId) -> FareyResult<&Node<V, T>> {
    self.arena.get(id.0).ok_or(FareyError::UnknownNode(id))
  }

  fn span_of(&self, id: NodeId) -> FareyResult<Interval<T>> {
    self.resolve(id).map(Node::span)
  }

  fn index_of(&self, id: NodeId) -> FareyResult<usize> {
    self.resolve(id)?;
    self.seq.iter().position(|&n| n == id).ok_or(FareyError::UnknownNode(id))
  }

  /// Index one past the last descendant of the node at `idx`.
  fn subtree_end(&self, idx: usize) -> FareyResult<usize> {
    let span = self.span_of(self.seq[idx])?;
    let mut end = idx + 1;
    while end < self.seq.len() {
      if !span.strictly_contains(self.span_of(self.seq[end])?)? {
        break;
      }
      end += 1;
    }
    Ok(end)
  }

  fn splice(&mut self, node: Node<V, T>, at: usize) -> NodeId {
    let id = NodeId(self.arena.insert(node));
    self.seq.insert(at, id);
    id
  }

  // Two mediants into the free gap `(from, limit)`, clustered toward
  // `from`: the new interval hugs the node it extends.
  fn gap_after(from: Fraction<T>, limit: Fraction<T>) -> FareyResult<Interval<T>> {
    let right = from.mediant(&limit)?;
    let left = from.mediant(&right)?;
    Interval::try_new(left, right)
  }

  // Mirror of `gap_after`: clustered toward `upto`.
  fn gap_before(limit: Fraction<T>, upto: Fraction<T>) -> FareyResult<Interval<T>> {
    let left = limit.mediant(&upto)?;
    let right = left.mediant(&upto)?;
    Interval::try_new(left, right)
  }

  /// Root insertion on an empty set, otherwise placement between, beside
  /// or under the referenced nodes.
  ///
  /// With both references the new node brackets the mediant of the facing
  /// bounds. References given in the wrong order are swapped with a logged
  /// warning; a reference that is an ancestor of the other delegates to
  /// [`add_child`](NestedIntervalSet::add_child). Neither reference on a
  /// nonempty set is `InvalidInsert`.
  #[instrument(level = "trace", skip(self, value))]
  pub fn insert(&mut self, value: V, left: Option<NodeId>, right: Option<NodeId>)
    -> FareyResult<NodeId>
  {
    if self.seq.is_empty() {
      let node = Node::new(value, Interval::unit());
      let id = NodeId(self.arena.insert(node));
      self.seq.push(id);
      return Ok(id);
    }
    let (mut left, mut right) = match (left, right) {
      (None, None) => return Err(FareyError::InvalidInsert),
      (None, Some(r)) => return self.prepend(value, r),
      (Some(l), None) => return self.append(value, l),
      (Some(l), Some(r)) => (l, r),
    };
    if left == right {
      return self.add_child(value, left);
    }
    if self.span_of(left)?.left().gt(self.span_of(right)?.left())? {
      warn!("left and right reference nodes given in the wrong order: swapped");
      std::mem::swap(&mut left, &mut right);
    }
    let left_span = self.span_of(left)?;
    let right_span = self.span_of(right)?;
    if left_span.strictly_contains(right_span)? {
      return self.add_child(value, left);
    }
    if right_span.strictly_contains(left_span)? {
      return self.add_child(value, right);
    }
    self.insert_between(value, left, right)
  }

  // The references are mutually non-nested and ordered. The scan runs from
  // whichever reference the median's decimal is closer to; both directions
  // land in a free gap next to the entry bracketing the median.
  fn insert_between(&mut self, value: V, left: NodeId, right: NodeId) -> FareyResult<NodeId> {
    let left_span = self.span_of(left)?;
    let right_span = self.span_of(right)?;
    let median = left_span.right().mediant(&right_span.left())?;
    let lo = self.index_of(left)?;
    let hi = self.index_of(right)?;
    let toward_left = median.decimal() - left_span.right().decimal()
      < right_span.left().decimal() - median.decimal();
    if toward_left {
      self.insert_before_bracket(value, lo, hi, median)
    }
    else {
      self.insert_after_bracket(value, lo, hi, right_span, median)
    }
  }

  // Forward scan: the first entry past `lo` whose right bound reaches the
  // median; the new node fills the free gap immediately left of it. The
  // gap's lower edge is the greatest right bound at or below the bracket's
  // left bound over the whole sequence: an ancestor ending inside the gap
  // would otherwise end up straddled.
  fn insert_before_bracket(&mut self, value: V, lo: usize, hi: usize, median: Fraction<T>)
    -> FareyResult<NodeId>
  {
    let mut bracket = None;
    for i in lo + 1..=hi {
      if self.span_of(self.seq[i])?.right().ge(median)? {
        bracket = Some(i);
        break;
      }
    }
    let bracket = bracket.ok_or_else(|| FareyError::InvariantViolation(
      format!("no entry reaches the median {}", median)))?;
    let gap_hi = self.span_of(self.seq[bracket])?.left();
    let mut gap_lo: Option<Fraction<T>> = None;
    for i in 0..bracket {
      let r = self.span_of(self.seq[i])?.right();
      if r.le(gap_hi)? {
        let keep = match gap_lo {
          None => true,
          Some(cur) => r.gt(cur)?,
        };
        if keep {
          gap_lo = Some(r);
        }
      }
    }
    let gap_lo = gap_lo.ok_or_else(|| FareyError::InvariantViolation(
      format!("no free gap below {}", gap_hi)))?;
    let span = Self::gap_before(gap_lo, gap_hi)?;
    Ok(self.splice(Node::new(value, span), bracket))
  }

  // Backward scan: the last entry before `hi` whose left bound is at or
  // below the median, skipping ancestors of the right reference. The new
  // node fills the free gap right of that entry's subtree, bounded by the
  // nearest following left bound and by the right bounds of the entry's
  // ancestors.
  fn insert_after_bracket(&mut self, value: V, lo: usize, hi: usize,
    right_span: Interval<T>, median: Fraction<T>) -> FareyResult<NodeId>
  {
    let mut bracket = None;
    for i in (lo..hi).rev() {
      let candidate = self.span_of(self.seq[i])?;
      if candidate.left().le(median)? && !candidate.strictly_contains(right_span)? {
        bracket = Some(i);
        break;
      }
    }
    let bracket = bracket.ok_or_else(|| FareyError::InvariantViolation(
      format!("no entry stays below the median {}", median)))?;
    let anchor = self.seq[bracket];
    let gap_lo = self.span_of(anchor)?.right();
    let mut gap_hi: Option<Fraction<T>> = None;
    for i in bracket + 1..self.seq.len() {
      let l = self.span_of(self.seq[i])?.left();
      if l.ge(gap_lo)? {
        let keep = match gap_hi {
          None => true,
          Some(cur) => l.lt(cur)?,
        };
        if keep {
          gap_hi = Some(l);
        }
      }
    }
    for ancestor in self.ancestors(anchor)? {
      let r = self.span_of(ancestor)?.right();
      let keep = match gap_hi {
        None => true,
        Some(cur) => r.lt(cur)?,
      };
      if keep {
        gap_hi = Some(r);
      }
    }
    let gap_hi = gap_hi.ok_or_else(|| FareyError::InvariantViolation(
      format!("no free gap above {}", gap_lo)))?;
    let span = Self::gap_after(gap_lo, gap_hi)?;
    let at = self.subtree_end(bracket)?;
    Ok(self.splice(Node::new(value, span), at))
  }

  /// Insert `value` as the next sibling after `node`'s subtree.
  ///
  /// The rightmost top-level node has no free gap to its right, so it
  /// donates the tail of its own interval: its right bound shrinks to a
  /// mediant and the new node takes over the vacated range. Anchoring the
  /// shrink on the last direct child keeps every descendant strictly
  /// inside.
  #[instrument(level = "trace", skip(self, value))]
  pub fn append(&mut self, value: V, node: NodeId) -> FareyResult<NodeId> {
    let span = self.span_of(node)?;
    let idx = self.index_of(node)?;
    let end = self.subtree_end(idx)?;
    let next = if end < self.seq.len() { Some(self.seq[end]) } else { None };

    if let Some(parent) = self.parent(node)? {
      let parent_span = self.span_of(parent)?;
      let limit = match next {
        Some(next) => {
          let next_span = self.span_of(next)?;
          if parent_span.strictly_contains(next_span)? {
            next_span.left()
          }
          else {
            parent_span.right()
          }
        }
        None => parent_span.right(),
      };
      let new_span = Self::gap_after(span.right(), limit)?;
      return Ok(self.splice(Node::new(value, new_span), end));
    }
    if let Some(next) = next {
      let limit = self.span_of(next)?.left();
      let new_span = Self::gap_after(span.right(), limit)?;
      return Ok(self.splice(Node::new(value, new_span), end));
    }
    let shrunk = match self.last_direct_child(node)? {
      Some(child) => self.span_of(child)?.right().mediant(&span.right())?,
      None => span.left().mediant(&span.right())?,
    };
    let shrunk_span = Interval::try_new(span.left(), shrunk)?;
    let new_span = Interval::try_new(shrunk.mediant(&span.right())?, span.right())?;
    *self.arena.get_mut(node.0).ok_or(FareyError::UnknownNode(node))?.span_mut() = shrunk_span;
    Ok(self.splice(Node::new(value, new_span), end))
  }

  /// Mirror of [`append`](NestedIntervalSet::append): insert `value` as
  /// the sibling immediately before `node`.
  #[instrument(level = "trace", skip(self, value))]
  pub fn prepend(&mut self, value: V, node: NodeId) -> FareyResult<NodeId> {
    let span = self.span_of(node)?;
    let idx = self.index_of(node)?;
    // Greatest right bound at or below `node.left`: the edge of the free
    // gap, which is not always the nearest wholly-left node's own bound.
    let mut before: Option<Fraction<T>> = None;
    for i in (0..idx).rev() {
      let r = self.span_of(self.seq[i])?.right();
      if r.le(span.left())? {
        let keep = match before {
          None => true,
          Some(cur) => r.gt(cur)?,
        };
        if keep {
          before = Some(r);
        }
      }
    }

    if let Some(parent) = self.parent(node)? {
      let parent_span = self.span_of(parent)?;
      let limit = match before {
        None => parent_span.left(),
        Some(b) => {
          if b.ge(parent_span.left())? { b } else { parent_span.left() }
        }
      };
      let new_span = Self::gap_before(limit, span.left())?;
      return Ok(self.splice(Node::new(value, new_span), idx));
    }
    if let Some(before) = before {
      let new_span = Self::gap_before(before, span.left())?;
      return Ok(self.splice(Node::new(value, new_span), idx));
    }
    let shrunk = match self.first_direct_child(node)? {
      Some(child) => span.left().mediant(&self.span_of(child)?.left())?,
      None => span.left().mediant(&span.right())?,
    };
    let shrunk_span = Interval::try_new(shrunk, span.right())?;
    let new_span = Interval::try_new(span.left(), span.left().mediant(&shrunk)?)?;
    *self.arena.get_mut(node.0).ok_or(FareyError::UnknownNode(node))?.span_mut() = shrunk_span;
    Ok(self.splice(Node::new(value, new_span), idx))
  }

  /// Insert `value` as the last child of `node`: the first child splits
  /// the parent's interval, later children append after the previous one.
  #[instrument(level = "trace", skip(self, value))]
  pub fn add_child(&mut self, value: V, node: NodeId) -> FareyResult<NodeId> {
    match self.last_direct_child(node)? {
      Some(last) => self.append(value, last),
      None => {
        let span = self.span_of(node)?.first_child()?;
        let idx = self.index_of(node)?;
        Ok(self.splice(Node::new(value, span), idx + 1))
      }
    }
  }

  /// Remove exactly this node and return its value. Descendants keep their
  /// bounds and stay discoverable by containment from the remaining
  /// ancestors. A stale or foreign handle is a no-op.
  #[instrument(level = "trace", skip(self))]
  pub fn remove(&mut self, id: NodeId) -> Option<V> {
    let node = self.arena.remove(id.0)?;
    self.seq.retain(|&n| n != id);
    Some(node.into_value())
  }

  /// Nearest preceding node whose interval strictly contains `id`'s.
  pub fn parent(&self, id: NodeId) -> FareyResult<Option<NodeId>> {
    let idx = self.index_of(id)?;
    let span = self.span_of(id)?;
    for i in (0..idx).rev() {
      if self.span_of(self.seq[i])?.strictly_contains(span)? {
        return Ok(Some(self.seq[i]));
      }
    }
    Ok(None)
  }

  /// Ancestor chain, nearest first.
  pub fn ancestors(&self, id: NodeId) -> FareyResult<Vec<NodeId>> {
    let mut chain = vec![];
    let mut cursor = self.parent(id)?;
    while let Some(p) = cursor {
      chain.push(p);
      cursor = self.parent(p)?;
    }
    Ok(chain)
  }

  /// Every node strictly contained in `id`'s interval. Contiguity after
  /// `id` is guaranteed by the ordering invariant, so the scan stops at
  /// the first non-descendant.
  pub fn descendants(&self, id: NodeId) -> FareyResult<Vec<NodeId>> {
    let idx = self.index_of(id)?;
    let end = self.subtree_end(idx)?;
    Ok(self.seq[idx + 1..end].to_vec())
  }

  fn last_direct_child(&self, node: NodeId) -> FareyResult<Option<NodeId>> {
    for candidate in self.descendants(node)?.into_iter().rev() {
      if self.parent(candidate)? == Some(node) {
        return Ok(Some(candidate));
      }
    }
    Ok(None)
  }

  fn first_direct_child(&self, node: NodeId) -> FareyResult<Option<NodeId>> {
    // The first descendant is necessarily a direct child: an intermediate
    // ancestor would precede it as an earlier descendant.
    Ok(self.descendants(node)?.into_iter().next())
  }

  /// `(left, right)`: nearest node wholly left of `id`'s interval and
  /// nearest node wholly right of it; either may be absent.
  pub fn neighbors(&self, id: NodeId) -> FareyResult<(Option<NodeId>, Option<NodeId>)> {
    let idx = self.index_of(id)?;
    let span = self.span_of(id)?;
    let mut left = None;
    for i in (0..idx).rev() {
      if self.span_of(self.seq[i])?.right().le(span.left())? {
        left = Some(self.seq[i]);
        break;
      }
    }
    let mut right = None;
    for i in idx + 1..self.seq.len() {
      if self.span_of(self.seq[i])?.left().ge(span.right())? {
        right = Some(self.seq[i]);
        break;
      }
    }
    Ok((left, right))
  }

  /// Exact mediant of `a`'s right bound and `b`'s left bound: the pivot a
  /// between-insertion brackets. `decimal()` recovers the approximate view.
  pub fn median(&self, a: NodeId, b: NodeId) -> FareyResult<Fraction<T>> {
    let a = self.span_of(a)?;
    let b = self.span_of(b)?;
    a.right().mediant(&b.left())
  }

  /// Full check of the structural invariants: strict ascending left bounds
  /// and pairwise disjoint-or-strictly-nested intervals. Quadratic; meant
  /// for tests and debugging, any contradiction is a defect of this
  /// module, not of the caller.
  pub fn validate(&self) -> FareyResult<()> {
    for i in 1..self.seq.len() {
      let a = self.span_of(self.seq[i - 1])?;
      let b = self.span_of(self.seq[i])?;
      if a.left().try_cmp(b.left())? != Ordering::Less {
        return Err(FareyError::InvariantViolation(
          format!("sequence order broken between {} and {}", a, b)));
      }
    }
    for i in 0..self.seq.len() {
      for j in i + 1..self.seq.len() {
        let a = self.span_of(self.seq[i])?;
        let b = self.span_of(self.seq[j])?;
        let related = a.is_disjoint_from(b)?
          || a.strictly_contains(b)?
          || b.strictly_contains(a)?;
        if !related {
          return Err(FareyError::InvariantViolation(
            format!("intervals {} and {} partially overlap", a, b)));
        }
      }
    }
    Ok(())
  }
}
