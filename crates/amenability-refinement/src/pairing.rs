//! Pairing functions: injective maps from two colors to one
//!
//! Refinement folds a node's own color and the sorted multisets of its
//! neighbors' colors into a single color with repeated pairing. Over the
//! natural numbers these maps are injective; on `u64` they are evaluated
//! modulo 2^64, so very large folds may collide. The refinement loop detects
//! a collision when it would merge two color classes.

use crate::graph::Label;

/// An injective map `N x N -> N`, evaluated with wrapping `u64` arithmetic
pub trait PairingFunction {
    fn pair(&self, a: Label, b: Label) -> Label;
}

/// Square-shell enumeration: `a^2 + a + b` when `a >= b`, else `a + b^2`.
///
/// Pairs with `max(a, b) = m` fill the range `[m^2, (m + 1)^2)`, so values
/// grow quadratically per fold and the map needs no state. This is the
/// default pairing and fixes the raw (non-normalized) color values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquareShellPairing;

impl PairingFunction for SquareShellPairing {
    #[inline]
    fn pair(&self, a: Label, b: Label) -> Label {
        if a >= b {
            a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
        } else {
            a.wrapping_add(b.wrapping_mul(b))
        }
    }
}

/// Cantor pairing: `(a + b)(a + b + 1) / 2 + b`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CantorPairing;

impl PairingFunction for CantorPairing {
    #[inline]
    fn pair(&self, a: Label, b: Label) -> Label {
        let s = a.wrapping_add(b);
        // One of s, s + 1 is even; halve it before multiplying.
        let t = if s % 2 == 0 {
            (s / 2).wrapping_mul(s.wrapping_add(1))
        } else {
            s.wrapping_mul(s.wrapping_add(1) / 2)
        };
        t.wrapping_add(b)
    }
}

/// Exact square-shell pairing, `None` when the result does not fit in `u64`
pub fn checked_pairing(a: Label, b: Label) -> Option<Label> {
    if a >= b {
        a.checked_mul(a)?.checked_add(a)?.checked_add(b)
    } else {
        b.checked_mul(b)?.checked_add(a)
    }
}
