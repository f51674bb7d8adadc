// Copyright 2015 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error kinds shared across the crate.

use crate::set::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FareyError
{
  /// `insert` on a nonempty set needs at least one reference node.
  #[error("set is not empty: insert requires a left or right reference node")]
  InvalidInsert,

  /// A comparison reached a fraction with no defined decimal value.
  #[error("fraction {0} has no defined decimal value")]
  InvalidFraction(String),

  /// A bound computation does not fit the coefficient type. Construction
  /// fails loudly instead of wrapping; only comparisons degrade to the
  /// decimal fallback.
  #[error("coefficient overflow computing the {0}")]
  BoundOverflow(String),

  /// The handle does not resolve to a live node of this set.
  #[error("unknown or deleted node {0:?}")]
  UnknownNode(NodeId),

  /// A scan found the nesting or ordering invariant contradicted.
  #[error("interval invariant violated: {0}")]
  InvariantViolation(String),
}

pub type FareyResult<T> = Result<T, FareyError>;
