/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between the machine
/// integer type of the language (`i64`) and the index type used by array
/// storage (`usize`) without silent truncation or sign loss.
///
/// All functions return a `Result`, which is `Ok` if the conversion is
/// lossless and valid, or the caller-supplied error otherwise.
pub mod num;

/// Terminal access helpers.
///
/// Wraps the platform-specific pieces the `getchar` and `clear` builtins
/// need: switching the controlling terminal into raw mode for a single-byte
/// read, and invoking the platform clear command.
pub mod term;
