use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Consistent scientific number formatting
    ///
    /// The exponent is always signed and padded to `exp_pad` digits, which
    /// keeps columns of cross sections aligned in summaries.
    ///
    /// ```rust
    /// # use hfxs_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!(2.5e-6_f64.sci(2, 2), "2.50e-06".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// Value with a symmetric uncertainty, both in scientific notation
    ///
    /// ```rust
    /// # use hfxs_utils::ValueExt;
    /// assert_eq!(12.5_f64.pm(0.5, 2), "1.25e+01 +/- 5.00e-01".to_string());
    /// ```
    fn pm(&self, error: f64, precision: usize) -> String;
}

impl ValueExt for f64 {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let num = f!("{:.precision$e}", self, precision = precision);
        // `{:e}` always contains the 'e', mantissa keeps its own sign
        let (mantissa, exp) = num.split_once('e').unwrap_or((num.as_str(), "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }

    fn pm(&self, error: f64, precision: usize) -> String {
        f!("{} +/- {}", self.sci(precision, 2), error.sci(precision, 2))
    }
}
