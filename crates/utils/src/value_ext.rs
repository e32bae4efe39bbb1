use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows easy definition.
    ///
    /// Works for anything that can be represented as scientific using the
    /// `LowerExp` trait, which is pretty much every numerical primitive.
    ///
    /// ```rust
    /// # use mdtools_utils::ValueExt;
    /// let number = -1.0;
    /// assert_eq!(number.sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((0.025).sci(2, 2), "2.50e-02".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// Fixed point formatting that never prints a negative zero
    ///
    /// Coordinates produced by matrix inversion are often `-0.0`, which is
    /// just noise in a summary table.
    ///
    /// ```rust
    /// # use mdtools_utils::ValueExt;
    /// assert_eq!((-0.0).fixed(3), "0.000".to_string());
    /// assert_eq!((-0.0004).fixed(3), "0.000".to_string());
    /// assert_eq!((-1.25).fixed(2), "-1.25".to_string());
    /// ```
    fn fixed(&self, precision: usize) -> String;
}

impl<T: std::fmt::LowerExp + std::fmt::Display> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", &self, precision = precision);
        // Safe to `unwrap` as `num` is guaranteed to contain `'e'`
        let exp = num.split_off(num.find('e').unwrap());
        // Make sure the exponent is signed
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        // Pad the exponent with zeros if needed and put it back on the number
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }

    fn fixed(&self, precision: usize) -> String {
        let num = f!("{:.precision$}", &self, precision = precision);
        match num.strip_prefix('-') {
            Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
                magnitude.to_string()
            }
            _ => num,
        }
    }
}
