//! Buffers for building wire-format output.

use std::fmt;

use wavefront_core::{pooled_newtype, pooling::Clearable};

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A growable byte buffer for building lines of output.
///
/// `LineBuilder` accumulates bytes in a single contiguous allocation, and supports writing raw bytes, strings, and
/// characters, as well as appending the textual form of integers and floating-point numbers directly, without any
/// intermediate allocation. Writes never fail.
///
/// The buffer is designed for reuse: [`reset`][Self::reset] sets the length back to zero while retaining the
/// allocation, so a single buffer can build any number of lines. It is also designed for use in object pools
/// (implements [`Clearable`]), where it is handed out as a [`LineBuffer`].
#[derive(Clone, Debug, Default)]
pub struct LineBuilder {
    buf: Vec<u8>,
}

impl LineBuilder {
    /// Creates a new, empty `LineBuilder`.
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new, empty `LineBuilder` that can hold at least `capacity` bytes without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the total number of bytes the buffer can hold without reallocating, including bytes already written.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Ensures that at least `additional` more bytes can be written without reallocating.
    ///
    /// When the buffer has to grow, its new capacity is twice the old capacity plus `additional`, which keeps the
    /// amortized cost of copying at O(1) per written byte.
    pub fn grow(&mut self, additional: usize) {
        let capacity = self.buf.capacity();
        if capacity - self.buf.len() < additional {
            let target = capacity.saturating_mul(2).saturating_add(additional);
            self.buf.reserve_exact(target - self.buf.len());
        }
    }

    /// Clears the buffer, retaining its allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Writes the given bytes, returning the number of bytes written.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        self.buf.extend_from_slice(bytes);
        bytes.len()
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Writes the UTF-8 encoding of the given character, returning the number of bytes written.
    pub fn write_rune(&mut self, c: char) -> usize {
        let mut encoded = [0; 4];
        self.write_bytes(c.encode_utf8(&mut encoded).as_bytes())
    }

    /// Writes the given string, returning the number of bytes written.
    pub fn write_string(&mut self, s: &str) -> usize {
        self.write_bytes(s.as_bytes())
    }

    /// Appends the textual form of the integer `value`, in the given base.
    ///
    /// Digits above 9 are written as lowercase letters.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not between 2 and 36, inclusive.
    pub fn append_int(&mut self, value: i64, base: u32) {
        assert!((2..=36).contains(&base), "invalid base {}: must be between 2 and 36", base);

        if base == 10 {
            let mut writer = itoa::Buffer::new();
            self.write_string(writer.format(value));
            return;
        }

        if value < 0 {
            self.write_byte(b'-');
        }
        self.append_digits(value.unsigned_abs(), u64::from(base));
    }

    /// Appends the textual form of the unsigned integer `value`, in base 10.
    pub fn append_uint(&mut self, value: u64) {
        let mut writer = itoa::Buffer::new();
        self.write_string(writer.format(value));
    }

    /// Appends the textual form of the floating-point number `value`.
    ///
    /// The shortest decimal representation that round-trips to the same value is used, without an exponent and
    /// without trailing zeros: `42422.0` is written as `42422`, and `0.1` as `0.1`. Non-finite values are written as
    /// `NaN`, `+Inf`, and `-Inf`.
    pub fn append_float(&mut self, value: f64) {
        if value.is_nan() {
            self.write_string("NaN");
        } else if value.is_infinite() {
            self.write_string(if value.is_sign_positive() { "+Inf" } else { "-Inf" });
        } else {
            // `Display` for `f64` is exactly the shortest round-trip form in positional notation. Writing to a
            // `LineBuilder` never fails.
            let _ = fmt::Write::write_fmt(self, format_args!("{}", value));
        }
    }

    /// Returns a copy of the buffer contents as an owned string.
    ///
    /// The buffer itself is left untouched. Any invalid UTF-8 written through [`write_bytes`][Self::write_bytes] or
    /// [`write_byte`][Self::write_byte] is replaced with the Unicode replacement character.
    pub fn to_owned_string(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Consumes the buffer, returning its contents as a string without copying.
    ///
    /// Any invalid UTF-8 is replaced with the Unicode replacement character.
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }

    fn append_digits(&mut self, mut value: u64, base: u64) {
        // Enough room for `u64::MAX` in base 2.
        let mut digits = [0u8; 64];
        let mut pos = digits.len();
        loop {
            pos -= 1;
            digits[pos] = DIGITS[(value % base) as usize];
            value /= base;
            if value == 0 {
                break;
            }
        }
        self.write_bytes(&digits[pos..]);
    }
}

impl fmt::Write for LineBuilder {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

impl Extend<u8> for LineBuilder {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        self.buf.extend(iter);
    }
}

impl Clearable for LineBuilder {
    fn clear(&mut self) {
        self.reset();
    }
}

pooled_newtype! {
    outer => LineBuffer,
    inner => LineBuilder,
}
