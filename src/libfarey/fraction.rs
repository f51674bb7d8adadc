// Copyright 2015 Pierre Talbot (IRCAM)

// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Exact rational bounds for the Stern-Brocot construction.
//!
//! A `Fraction` is a numerator/denominator pair that is never reduced and never materialized as a floating value except inside the comparison fallback. Comparison is exact cross-multiplication as long as the products fit the coefficient type; past that point it degrades to `f64` precision. This boundary is part of the contract: picking a narrow coefficient type trades nesting depth for an earlier fallback, which is also how the fallback is tested.
//!
//! Equality is field-wise (`1/2 != 2/4`) while [`try_cmp`](Fraction::try_cmp) compares values (`1/2` equal to `2/4`). The two views cannot be reconciled in one `PartialOrd` impl, so ordering is only available through the explicit fallible method.

use crate::errors::{FareyError, FareyResult};
use crate::ops::{Coefficient, Mediant};
use num_integer::Integer;
use num_traits::{CheckedAdd, CheckedMul, CheckedNeg, One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Fraction<T = i64>
{
  num: T,
  den: T,
}

impl<T: Coefficient> Fraction<T>
{
  /// Rejects a zero denominator with `InvalidFraction`; a negative
  /// denominator is normalized by negating both fields so `den > 0` holds
  /// from construction on.
  pub fn new(num: T, den: T) -> FareyResult<Fraction<T>> {
    if den.is_zero() {
      return Err(FareyError::InvalidFraction(format!("{}/{}", num, den)));
    }
    if den < T::zero() {
      let num = num.checked_neg()
        .ok_or_else(|| FareyError::BoundOverflow(format!("sign of {}/{}", num, den)))?;
      let den = den.checked_neg()
        .ok_or_else(|| FareyError::BoundOverflow(format!("denominator sign of {}", den)))?;
      Ok(Fraction { num, den })
    }
    else {
      Ok(Fraction { num, den })
    }
  }

  /// `0/1`, the lower bound of the root interval.
  pub fn zero() -> Fraction<T> {
    Fraction { num: T::zero(), den: T::one() }
  }

  /// `1/1`, the upper bound of the root interval.
  pub fn one() -> Fraction<T> {
    Fraction { num: T::one(), den: T::one() }
  }

  pub fn numer(self) -> T {
    self.num
  }

  pub fn denom(self) -> T {
    self.den
  }

  /// Floating approximation, used only for the comparison fallback and for
  /// tie-breaking scans; never the canonical value.
  pub fn decimal(self) -> f64 {
    let num = self.num.to_f64().unwrap_or(f64::NAN);
    let den = self.den.to_f64().unwrap_or(f64::NAN);
    num / den
  }

  /// Cross-multiplication compare; `None` when either product would
  /// overflow the coefficient type. Public so the precision boundary stays
  /// observable.
  pub fn exact_cmp(self, other: Fraction<T>) -> Option<Ordering> {
    let lhs = self.num.checked_mul(&other.den)?;
    let rhs = other.num.checked_mul(&self.den)?;
    Some(lhs.cmp(&rhs))
  }

  /// Exact comparison with decimal fallback past the overflow threshold.
  /// The fallback sacrifices exactness at extreme magnitudes: two fractions
  /// closer than `f64` resolution compare equal there.
  pub fn try_cmp(self, other: Fraction<T>) -> FareyResult<Ordering> {
    if self.den.is_zero() {
      return Err(FareyError::InvalidFraction(self.to_string()));
    }
    if other.den.is_zero() {
      return Err(FareyError::InvalidFraction(other.to_string()));
    }
    if let Some(ord) = self.exact_cmp(other) {
      return Ok(ord);
    }
    trace!("cross-multiplication overflow: comparing {} and {} by decimal approximation",
      self, other);
    let a = self.decimal();
    let b = other.decimal();
    if a.is_nan() {
      return Err(FareyError::InvalidFraction(self.to_string()));
    }
    if b.is_nan() {
      return Err(FareyError::InvalidFraction(other.to_string()));
    }
    a.partial_cmp(&b)
      .ok_or_else(|| FareyError::InvalidFraction(format!("{} <> {}", self, other)))
  }

  pub fn lt(self, other: Fraction<T>) -> FareyResult<bool> {
    Ok(self.try_cmp(other)? == Ordering::Less)
  }

  pub fn le(self, other: Fraction<T>) -> FareyResult<bool> {
    Ok(self.try_cmp(other)? != Ordering::Greater)
  }

  pub fn gt(self, other: Fraction<T>) -> FareyResult<bool> {
    Ok(self.try_cmp(other)? == Ordering::Greater)
  }

  pub fn ge(self, other: Fraction<T>) -> FareyResult<bool> {
    Ok(self.try_cmp(other)? != Ordering::Less)
  }

  /// Gcd-normalized copy. Never applied implicitly: the set stores bounds
  /// exactly as the mediant construction produced them.
  pub fn reduced(self) -> Fraction<T> {
    let g = self.num.gcd(&self.den);
    if g.is_one() {
      self
    }
    else {
      Fraction { num: self.num / g, den: self.den / g }
    }
  }

  pub fn is_reduced(self) -> bool {
    self.num.gcd(&self.den).is_one()
  }
}

impl<T: Coefficient> Mediant for Fraction<T>
{
  type Output = FareyResult<Fraction<T>>;

  /// The fraction strictly between `self` and `rhs` when the two are
  /// ordered; denominators add, so every level of nesting grows the
  /// coefficients.
  fn mediant(&self, rhs: &Fraction<T>) -> FareyResult<Fraction<T>> {
    let num = self.num.checked_add(&rhs.num)
      .ok_or_else(|| FareyError::BoundOverflow(format!("mediant of {} and {}", self, rhs)))?;
    let den = self.den.checked_add(&rhs.den)
      .ok_or_else(|| FareyError::BoundOverflow(format!("mediant of {} and {}", self, rhs)))?;
    Ok(Fraction { num, den })
  }
}

impl<T: Coefficient> fmt::Display for Fraction<T>
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.num, self.den)
  }
}

#[cfg(test)]
mod tests
{
  use super::*;
  use serde_test::{assert_tokens, Token};

  fn frac(num: i64, den: i64) -> Fraction<i64> {
    Fraction::new(num, den).unwrap()
  }

  #[test]
  fn mediant_lies_strictly_between() {
    let cases = vec![
      (1, (0, 1), (1, 1)),
      (2, (1, 3), (1, 2)),
      (3, (2, 5), (3, 7)),
      (4, (1, 1_000_000), (1, 999_999)),
      (5, (7, 9), (8, 9)),
    ];
    for (id, a, b) in cases {
      let a = frac(a.0, a.1);
      let b = frac(b.0, b.1);
      let (lo, hi) = match a.try_cmp(b).unwrap() {
        Ordering::Less => (a, b),
        _ => (b, a),
      };
      let m = lo.mediant(&hi).unwrap();
      assert!(lo.lt(m).unwrap(), "test #{}: {} is not below its mediant {}", id, lo, m);
      assert!(m.lt(hi).unwrap(), "test #{}: mediant {} is not below {}", id, m, hi);
      assert_eq!(m.denom(), lo.denom() + hi.denom(), "test #{}", id);
      assert_eq!(m.numer(), lo.numer() + hi.numer(), "test #{}", id);
    }
  }

  #[test]
  fn mediant_of_farey_neighbors_is_reduced() {
    // Adjacent fractions of a Farey sequence satisfy bc - ad = 1, so their
    // mediant is already in lowest terms.
    let neighbors = vec![
      ((0, 1), (1, 1)),
      ((1, 3), (1, 2)),
      ((2, 5), (1, 2)),
      ((3, 7), (1, 2)),
    ];
    for (a, b) in neighbors {
      let m = frac(a.0, a.1).mediant(&frac(b.0, b.1)).unwrap();
      assert!(m.is_reduced(), "{} is not in lowest terms", m);
    }
  }

  #[test]
  fn exact_comparison() {
    let cases = vec![
      (1, (1, 2), (2, 3), Ordering::Less),
      (2, (2, 3), (1, 2), Ordering::Greater),
      (3, (1, 2), (2, 4), Ordering::Equal),
      (4, (0, 1), (1, 1_000_000), Ordering::Less),
      (5, (-1, 2), (1, 2), Ordering::Less),
    ];
    for (id, a, b, expected) in cases {
      let a = frac(a.0, a.1);
      let b = frac(b.0, b.1);
      assert_eq!(a.exact_cmp(b), Some(expected), "test #{} (exact)", id);
      assert_eq!(a.try_cmp(b).unwrap(), expected, "test #{}", id);
    }
  }

  #[test]
  fn equality_is_field_wise() {
    assert_ne!(frac(1, 2), frac(2, 4));
    assert_eq!(frac(1, 2).try_cmp(frac(2, 4)).unwrap(), Ordering::Equal);
  }

  #[test]
  fn comparison_falls_back_to_decimals_on_overflow() {
    let big = i64::MAX / 2;
    let a = frac(big, 7);
    let b = frac(big, 9);
    assert!(a.exact_cmp(b).is_none(), "products of {} and {} should overflow", a, b);
    let wide = (big as i128 * 9).cmp(&(big as i128 * 7));
    assert_eq!(a.try_cmp(b).unwrap(), wide);
    assert_eq!(b.try_cmp(a).unwrap(), wide.reverse());
  }

  #[test]
  fn fallback_matches_wide_comparison_on_narrow_coefficients() {
    let a = Fraction::<i16>::new(200, 201).unwrap();
    let b = Fraction::<i16>::new(199, 200).unwrap();
    assert!(a.exact_cmp(b).is_none());
    let wide = (200i64 * 200).cmp(&(199i64 * 201));
    assert_eq!(a.try_cmp(b).unwrap(), wide);
  }

  #[test]
  fn fallback_cannot_distinguish_past_float_resolution() {
    // Documented precision boundary: the difference of these two values is
    // about 2^-124, far below what f64 resolves.
    let big = i64::MAX / 2;
    let a = frac(big, big + 1);
    let b = frac(big - 1, big);
    assert!(a.exact_cmp(b).is_none());
    assert_eq!(a.try_cmp(b).unwrap(), Ordering::Equal);
  }

  #[test]
  fn zero_denominator_is_rejected() {
    assert!(matches!(Fraction::new(1i64, 0), Err(FareyError::InvalidFraction(_))));
    let undefined = Fraction { num: 0i64, den: 0 };
    assert!(matches!(undefined.try_cmp(frac(1, 2)), Err(FareyError::InvalidFraction(_))));
    assert!(matches!(frac(1, 2).try_cmp(undefined), Err(FareyError::InvalidFraction(_))));
  }

  #[test]
  fn negative_denominator_is_normalized() {
    let f = frac(1, -2);
    assert_eq!(f.numer(), -1);
    assert_eq!(f.denom(), 2);
    assert_eq!(frac(-3, -4), frac(3, 4));
  }

  #[test]
  fn mediant_overflow_fails_loudly() {
    let a = frac(1, i64::MAX);
    let b = frac(1, i64::MAX);
    assert!(matches!(a.mediant(&b), Err(FareyError::BoundOverflow(_))));
  }

  #[test]
  fn decimal_approximation() {
    assert_eq!(frac(1, 2).decimal(), 0.5);
    assert_eq!(frac(3, 4).decimal(), 0.75);
    assert!(Fraction { num: 0i64, den: 0 }.decimal().is_nan());
  }

  #[test]
  fn reduction_is_explicit_only() {
    let f = frac(4, 6);
    assert_eq!(f.reduced(), frac(2, 3));
    assert_eq!(f, frac(4, 6), "reduced() must not mutate in place");
    assert!(!f.is_reduced());
    assert!(frac(2, 3).is_reduced());
  }

  #[test]
  fn serde_fraction_tokens() {
    let f = frac(1, 2);
    assert_tokens(&f, &[
      Token::Struct { name: "Fraction", len: 2 },
      Token::Str("num"), Token::I64(1),
      Token::Str("den"), Token::I64(2),
      Token::StructEnd,
    ]);
  }
}
