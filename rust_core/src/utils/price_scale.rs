//! Fixed-point price scaling for storage.
//!
//! Prices are persisted as `i64` integers scaled by `10^precision` so the
//! database never stores floats. The precision travels with every row, so
//! decoding always uses the row's own exponent.
//!
//! Encoding truncates toward zero (integer cast), it does not round:
//!
//! ```rust
//! use coinwatch_core::utils::price_scale::{decode, encode};
//!
//! assert_eq!(encode(1.239, 2), 123);
//! assert_eq!(decode(123, 2), 1.23);
//! ```

/// `10^precision` as f64
#[inline]
pub fn scale_factor(precision: i32) -> f64 {
    10f64.powi(precision)
}

/// Scale a price to an integer, truncating toward zero
#[inline]
pub fn encode(price: f64, precision: i32) -> i64 {
    (price * scale_factor(precision)) as i64
}

/// Recover the decimal price from its scaled integer form
#[inline]
pub fn decode(scaled: i64, precision: i32) -> f64 {
    scaled as f64 / scale_factor(precision)
}
