// Copyright 2015 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Half-open bounding interval `[left, right)` of two fractions.
//!
//! A node's conceptual value lies strictly inside its interval without ever being stored, the way a Stern-Brocot path identifies a rational without materializing it. Ancestry is strict containment on both sides, so two intervals of a well-formed set are either disjoint or strictly nested; partial overlap never occurs.

use crate::errors::{FareyError, FareyResult};
use crate::fraction::Fraction;
use crate::ops::{Bounded, Coefficient, Mediant};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Interval<T = i64>
{
  pub(crate) left: Fraction<T>,
  pub(crate) right: Fraction<T>,
}

impl<T: Coefficient> Interval<T>
{
  /// Fails with `InvariantViolation` unless `left < right` strictly.
  pub fn try_new(left: Fraction<T>, right: Fraction<T>) -> FareyResult<Interval<T>> {
    if left.lt(right)? {
      Ok(Interval { left, right })
    }
    else {
      Err(FareyError::InvariantViolation(
        format!("interval [{}, {}) is empty", left, right)))
    }
  }

  /// `[0/1, 1/1)`, the interval of the first inserted node.
  pub fn unit() -> Interval<T> {
    Interval { left: Fraction::zero(), right: Fraction::one() }
  }

  pub fn left(self) -> Fraction<T> {
    self.left
  }

  pub fn right(self) -> Fraction<T> {
    self.right
  }

  /// Strict containment on both sides: the ancestor relation.
  pub fn strictly_contains(self, other: Interval<T>) -> FareyResult<bool> {
    Ok(self.left.lt(other.left)? && self.right.gt(other.right)?)
  }

  pub fn is_disjoint_from(self, other: Interval<T>) -> FareyResult<bool> {
    Ok(self.right.le(other.left)? || other.right.le(self.left)?)
  }

  /// Open-interval membership: strict on both sides, matching "the value
  /// lies strictly inside the bounds".
  pub fn contains(self, f: Fraction<T>) -> FareyResult<bool> {
    Ok(self.left.lt(f)? && f.lt(self.right)?)
  }

  /// Interval of a first child: two mediant steps from the left bound, so
  /// the result nests strictly on both sides.
  pub fn first_child(self) -> FareyResult<Interval<T>> {
    let right = self.left.mediant(&self.right)?;
    let left = self.left.mediant(&right)?;
    Interval::try_new(left, right)
  }
}

impl<T: Coefficient> Bounded for Interval<T>
{
  type Bound = Fraction<T>;

  fn lower(&self) -> Fraction<T> {
    self.left
  }

  fn upper(&self) -> Fraction<T> {
    self.right
  }
}

impl<T: Coefficient> fmt::Display for Interval<T>
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}, {})", self.left, self.right)
  }
}
