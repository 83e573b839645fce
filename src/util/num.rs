/// Safely converts an `i64` to a `usize` if and only if it can be
/// represented exactly.
///
/// ## Errors
/// Returns `Err(error)` if the value is negative or exceeds the maximum
/// representable `usize`.
///
/// ## Parameters
/// - `value`: The integer value to convert.
/// - `error`: The error to return if conversion is not lossless.
///
/// ## Example
/// ```
/// use ints::util::num::i64_to_usize_checked;
///
/// let v = i64_to_usize_checked(42, "negative!").unwrap();
/// assert_eq!(v, 42);
///
/// assert!(i64_to_usize_checked(-1, "negative!").is_err());
/// ```
pub fn i64_to_usize_checked<E>(value: i64, error: E) -> Result<usize, E> {
    usize::try_from(value).map_err(|_| error)
}

/// Safely converts a `usize` to an `i64` if and only if it can be
/// represented exactly.
///
/// Array lengths and indices are `usize` internally but surface as ordinary
/// language values, so the conversion back must be checked as well.
///
/// ## Errors
/// Returns `Err(error)` if the value exceeds `i64::MAX`.
///
/// ## Example
/// ```
/// use ints::util::num::usize_to_i64_checked;
///
/// let v = usize_to_i64_checked(7, "too big!").unwrap();
/// assert_eq!(v, 7);
/// ```
pub fn usize_to_i64_checked<E>(value: usize, error: E) -> Result<i64, E> {
    i64::try_from(value).map_err(|_| error)
}
