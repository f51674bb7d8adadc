// Copyright 2015 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A caller value bound to a position interval.
//!
//! Value and position stay decoupled: the node carries opaque data and two fractions, nothing more. Every ordering and ancestry question is answered from the interval alone, so there are no parent or child links to keep consistent.

use crate::errors::FareyResult;
use crate::fraction::Fraction;
use crate::interval::Interval;
use crate::ops::{Bounded, Coefficient};
use serde::{Deserialize, Serialize};

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Node<V, T = i64>
{
  value: V,
  span: Interval<T>,
}

impl<V, T: Coefficient> Node<V, T>
{
  pub(crate) fn new(value: V, span: Interval<T>) -> Node<V, T> {
    Node { value, span }
  }

  pub fn value(&self) -> &V {
    &self.value
  }

  pub(crate) fn value_mut(&mut self) -> &mut V {
    &mut self.value
  }

  pub(crate) fn into_value(self) -> V {
    self.value
  }

  pub fn span(&self) -> Interval<T> {
    self.span
  }

  pub(crate) fn span_mut(&mut self) -> &mut Interval<T> {
    &mut self.span
  }

  /// `self`'s interval starts before `other`'s.
  pub fn precedes(&self, other: &Node<V, T>) -> FareyResult<bool> {
    self.span.left.lt(other.span.left)
  }

  /// `self`'s interval starts after `other`'s.
  pub fn follows(&self, other: &Node<V, T>) -> FareyResult<bool> {
    self.span.left.gt(other.span.left)
  }

  /// Strict nesting of `other`'s interval inside `self`'s. This predicate
  /// is the sole basis for every parent, child and descendant query.
  pub fn is_ancestor_of(&self, other: &Node<V, T>) -> FareyResult<bool> {
    self.span.strictly_contains(other.span)
  }
}

impl<V, T: Coefficient> Bounded for Node<V, T>
{
  type Bound = Fraction<T>;

  fn lower(&self) -> Fraction<T> {
    self.span.left
  }

  fn upper(&self) -> Fraction<T> {
    self.span.right
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  fn frac(num: i64, den: i64) -> Fraction<i64> {
    Fraction::new(num, den).unwrap()
  }

  fn node(value: &'static str, l: (i64, i64), r: (i64, i64)) -> Node<&'static str> {
    Node::new(value, Interval::try_new(frac(l.0, l.1), frac(r.0, r.1)).unwrap())
  }

  #[test]
  fn position_follows_left_bound() {
    let a = node("a", (0, 1), (1, 2));
    let b = node("b", (2, 3), (1, 1));
    assert!(a.precedes(&b).unwrap());
    assert!(b.follows(&a).unwrap());
    assert!(!a.follows(&b).unwrap());
  }

  #[test]
  fn ancestry_is_strict_nesting() {
    let root = node("root", (0, 1), (1, 1));
    let child = node("child", (1, 3), (1, 2));
    assert!(root.is_ancestor_of(&child).unwrap());
    assert!(!child.is_ancestor_of(&root).unwrap());
    assert!(!root.is_ancestor_of(&root).unwrap(), "nesting is strict, not reflexive");
  }

  #[test]
  fn bounds_expose_the_span() {
    let n = node("n", (1, 3), (1, 2));
    assert_eq!(n.lower(), frac(1, 3));
    assert_eq!(n.upper(), frac(1, 2));
    assert_eq!(n.value(), &"n");
  }
}
