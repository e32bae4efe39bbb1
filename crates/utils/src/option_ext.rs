use crate::f;

/// Extends Option for easy display formatting
pub trait OptionExt {
    /// Better option outputs
    ///
    /// Generic over anything that implements `Display`, this will either be the
    /// value contained within `Some()` or "none" for the `None` variant. Handy
    /// for optional axes such as the energy transfer dimension of a cut.
    ///
    /// ```rust
    /// # use mdtools_utils::OptionExt;
    /// let unit: Option<&str> = Some("meV");
    /// assert_eq!(unit.display(), "meV");
    ///
    /// let unit: Option<&str> = None;
    /// assert_eq!(unit.display(), "none");
    /// ```
    fn display(&self) -> String;
}

impl<T: std::fmt::Display> OptionExt for Option<T> {
    fn display(&self) -> String {
        match self {
            Some(value) => f!("{value}"),
            None => "none".to_string(),
        }
    }
}
