//! Human readable axis labels

// crate modules
use crate::frame::{Direction, Frame};

// mdtools modules
use mdtools_utils::f;

/// Symbol used for every coefficient of the axis at the same position
pub const AXIS_SYMBOLS: [&str; 3] = ["zeta", "eta", "xi"];

/// Label for the basis vector at position `axis`
///
/// Each coefficient is written relative to the symbol of that axis, so a
/// unit coefficient is just the symbol and zero is just `0`.
///
/// ```rust
/// # use mdtools_cut::label;
/// assert_eq!(label(0, &[1.0, 0.0, 0.0]), "[zeta, 0, 0]");
/// assert_eq!(label(1, &[0.5, 1.0, 0.0]), "[0.50eta, eta, 0]");
/// assert_eq!(label(2, &[0.0, 0.0, -1.0]), "[0, 0, -xi]");
/// ```
///
/// Axes past the third reuse the last symbol.
pub fn label(axis: usize, direction: &Direction) -> String {
    let symbol = AXIS_SYMBOLS[axis.min(AXIS_SYMBOLS.len() - 1)];
    let terms = direction
        .iter()
        .map(|c| term(*c, symbol))
        .collect::<Vec<String>>();
    f!("[{}]", terms.join(", "))
}

/// Labels for all three axes of a frame
pub fn labels(frame: &Frame) -> [String; 3] {
    let [u, v, w] = frame.axes();
    [label(0, &u), label(1, &v), label(2, &w)]
}

fn term(c: f64, symbol: &str) -> String {
    if c.abs() == 1.0 {
        if c < 0.0 {
            f!("-{symbol}")
        } else {
            symbol.to_string()
        }
    } else if c == 0.0 {
        "0".to_string()
    } else {
        f!("{c:.2}{symbol}")
    }
}
