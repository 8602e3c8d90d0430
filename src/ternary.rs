// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A ternary expression.  Rust's `if` is already an expression, but
/// `cargo fmt` spreads every one of them over five lines, and the
/// border rules of the gradient kernel and the seam lattice read far
/// better as a compact table of `cq!(at_edge, this, that)`.
macro_rules! cq {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition {
            $_true
        } else {
            $_false
        }
    };
}

pub(crate) use cq;
