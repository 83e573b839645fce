use crate::{
    ast::{ArithmeticOp, ArrayDescriptor, CompareOp},
    error::RuntimeError,
    interpreter::evaluator::core::EvalResult,
};

/// The backing storage of an array value.
///
/// The two kinds exist because they have different assignment semantics:
/// a fixed array's length never changes, a growable array may be extended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Storage {
    /// Exactly as many elements as the value's minimum, forever.
    Fixed(Box<[i64]>),
    /// At least as many elements as the value's minimum.
    Growable(Vec<i64>),
}

/// A runtime array value: integer storage plus a declared minimum length.
///
/// Every value in the language is one of these; scalars are arrays of
/// length one. Values produced by literals, arithmetic, slicing, and
/// methods are fixed; growable values only enter the world through `[+]`
/// descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    storage: Storage,
    minimum: usize,
}

impl Value {
    /// Creates a fixed value owning the given elements.
    #[must_use]
    pub fn fixed(elements: Vec<i64>) -> Self {
        Self { minimum: elements.len(),
               storage: Storage::Fixed(elements.into_boxed_slice()), }
    }

    /// Creates the empty fixed value, the result of a call with no
    /// `return`.
    #[must_use]
    pub fn empty() -> Self {
        Self::fixed(Vec::new())
    }

    /// Creates a fixed value from raw bytes, one element per byte.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::fixed(bytes.iter().copied().map(i64::from).collect())
    }

    /// Constructs a freshly-sized value from a descriptor and an optional
    /// initial value.
    ///
    /// - `[+]` / `[N+]`: an empty growable value (with `N` reserved as
    ///   capacity); an initializer is copied in under growable assignment
    ///   rules.
    /// - `[N]`: a fixed value of `N` zeros; an initializer must then have
    ///   exactly `N` elements.
    /// - `[]`: a fixed copy of the initializer, whose presence is
    ///   mandatory.
    ///
    /// # Errors
    /// `MissingInitializer` for `[]` without a value, or any assignment
    /// error from copying the initializer in.
    pub fn from_descriptor(descriptor: &ArrayDescriptor, init: Option<Self>) -> EvalResult<Self> {
        if descriptor.can_grow {
            let mut elements = Vec::new();
            if let Some(capacity) = descriptor.size {
                elements.reserve(capacity);
            }
            let mut value = Self { storage: Storage::Growable(elements),
                                   minimum: 0, };
            if let Some(init) = init {
                value.assign(&init)?;
            }
            return Ok(value);
        }

        if let Some(size) = descriptor.size {
            let mut value = Self { storage: Storage::Fixed(vec![0; size].into_boxed_slice()),
                                   minimum: size, };
            if let Some(init) = init {
                value.assign(&init)?;
            }
            return Ok(value);
        }

        match init {
            Some(init) => Ok(Self::fixed(init.as_slice().to_vec())),
            None => Err(RuntimeError::MissingInitializer),
        }
    }

    /// The current number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the value has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// The declared minimum length.
    #[must_use]
    pub const fn minimum(&self) -> usize {
        self.minimum
    }

    /// The elements as a slice, regardless of storage kind.
    #[must_use]
    pub fn as_slice(&self) -> &[i64] {
        match &self.storage {
            Storage::Fixed(elements) => elements,
            Storage::Growable(elements) => elements,
        }
    }

    /// The elements as bytes, each element reduced modulo 256.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_slice().iter().map(|&element| element as u8).collect()
    }

    /// Copies `source` into this value under its storage rules.
    ///
    /// A growable target requires `minimum <= source.len()`; elements are
    /// copied over the existing prefix and the target is extended when the
    /// source is longer. A fixed target requires the lengths to be equal.
    ///
    /// # Errors
    /// `AssignmentBelowMinimum` or `AssignmentSizeMismatch` when the
    /// source's length violates the target's storage class.
    pub fn assign(&mut self, source: &Self) -> EvalResult<()> {
        let src = source.as_slice();
        match &mut self.storage {
            Storage::Growable(dst) => {
                if self.minimum > src.len() {
                    return Err(RuntimeError::AssignmentBelowMinimum { minimum: self.minimum,
                                                                      actual:  src.len(), });
                }
                let overlap = dst.len().min(src.len());
                dst[..overlap].copy_from_slice(&src[..overlap]);
                if src.len() > dst.len() {
                    dst.extend_from_slice(&src[overlap..]);
                }
                Ok(())
            },
            Storage::Fixed(dst) => {
                if dst.len() != src.len() {
                    return Err(RuntimeError::AssignmentSizeMismatch { expected: dst.len(),
                                                                      actual:   src.len(), });
                }
                dst.copy_from_slice(src);
                Ok(())
            },
        }
    }

    /// Combines two values element-wise.
    ///
    /// The operands must have the same length; the result is a fixed value
    /// of that length. Division truncates toward zero.
    ///
    /// # Errors
    /// `SizeMismatch` for different lengths, `DivisionByZero` for a zero
    /// divisor element, and `Overflow` when an element operation leaves the
    /// machine integer range.
    pub fn arithmetic(&self, op: ArithmeticOp, other: &Self) -> EvalResult<Self> {
        let operation = match op {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "subtract",
            ArithmeticOp::Mul => "multiply",
            ArithmeticOp::Div => "divide",
        };

        let (left, right) = (self.as_slice(), other.as_slice());
        if left.len() != right.len() {
            return Err(RuntimeError::SizeMismatch { operation,
                                                    left: left.len(),
                                                    right: right.len() });
        }

        let mut elements = Vec::with_capacity(left.len());
        for (&a, &b) in left.iter().zip(right) {
            let element = match op {
                ArithmeticOp::Add => a.checked_add(b),
                ArithmeticOp::Sub => a.checked_sub(b),
                ArithmeticOp::Mul => a.checked_mul(b),
                ArithmeticOp::Div => {
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    a.checked_div(b)
                },
            };
            elements.push(element.ok_or(RuntimeError::Overflow { operation })?);
        }
        Ok(Self::fixed(elements))
    }

    /// Compares two values element-wise.
    ///
    /// Every operator is universally quantified: the comparison holds only
    /// when it holds at each index, so `!=` means "differs everywhere",
    /// not "not equal". Values of different lengths are unequal, which
    /// makes `!=` true and the other five operators false.
    #[must_use]
    pub fn compare(&self, op: CompareOp, other: &Self) -> bool {
        let (left, right) = (self.as_slice(), other.as_slice());
        if left.len() != right.len() {
            return op == CompareOp::Ne;
        }

        let mut pairs = left.iter().zip(right);
        match op {
            CompareOp::Eq => pairs.all(|(a, b)| a == b),
            CompareOp::Ne => pairs.all(|(a, b)| a != b),
            CompareOp::Lt => pairs.all(|(a, b)| a < b),
            CompareOp::Le => pairs.all(|(a, b)| a <= b),
            CompareOp::Gt => pairs.all(|(a, b)| a > b),
            CompareOp::Ge => pairs.all(|(a, b)| a >= b),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{element}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn descriptor(size: Option<usize>, can_grow: bool) -> ArrayDescriptor {
        ArrayDescriptor { size, can_grow }
    }

    #[test]
    fn sized_descriptor_zero_fills() {
        let value = Value::from_descriptor(&descriptor(Some(3), false), None).unwrap();
        assert_eq!(value.as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn sized_descriptor_copies_matching_initializer() {
        let init = Value::fixed(vec![1, 2, 3]);
        let value = Value::from_descriptor(&descriptor(Some(3), false), Some(init)).unwrap();
        assert_eq!(value.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn sized_descriptor_rejects_wrong_length() {
        let init = Value::fixed(vec![1, 2, 3]);
        assert_eq!(Value::from_descriptor(&descriptor(Some(2), false), Some(init)),
                   Err(RuntimeError::AssignmentSizeMismatch { expected: 2,
                                                              actual:   3, }));
    }

    #[test]
    fn bare_descriptor_requires_initializer() {
        assert_eq!(Value::from_descriptor(&descriptor(None, false), None),
                   Err(RuntimeError::MissingInitializer));
        let init = Value::fixed(vec![7, 8]);
        let value = Value::from_descriptor(&descriptor(None, false), Some(init)).unwrap();
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn growable_descriptor_starts_empty_and_copies() {
        let empty = Value::from_descriptor(&descriptor(None, true), None).unwrap();
        assert!(empty.is_empty());

        let init = Value::fixed(vec![4, 5]);
        let value = Value::from_descriptor(&descriptor(Some(8), true), Some(init)).unwrap();
        assert_eq!(value.as_slice(), &[4, 5]);
    }

    #[test]
    fn growable_assignment_extends() {
        let mut value = Value::from_descriptor(&descriptor(None, true), None).unwrap();
        value.assign(&Value::fixed(vec![1])).unwrap();
        value.assign(&Value::fixed(vec![9, 2, 3])).unwrap();
        assert_eq!(value.as_slice(), &[9, 2, 3]);
    }

    #[test]
    fn growable_assignment_never_shrinks() {
        let mut value = Value::from_descriptor(&descriptor(None, true), None).unwrap();
        value.assign(&Value::fixed(vec![1, 2, 3])).unwrap();
        value.assign(&Value::fixed(vec![9])).unwrap();
        assert_eq!(value.as_slice(), &[9, 2, 3]);
    }

    #[test]
    fn fixed_assignment_requires_equal_length() {
        let mut value = Value::fixed(vec![0, 0]);
        assert_eq!(value.assign(&Value::fixed(vec![1, 2, 3])),
                   Err(RuntimeError::AssignmentSizeMismatch { expected: 2,
                                                              actual:   3, }));
        value.assign(&Value::fixed(vec![4, 5])).unwrap();
        assert_eq!(value.as_slice(), &[4, 5]);
    }

    #[test]
    fn arithmetic_is_element_wise() {
        let left = Value::fixed(vec![1, 2, 3]);
        let right = Value::fixed(vec![4, 5, 6]);
        assert_eq!(left.arithmetic(ArithmeticOp::Add, &right).unwrap().as_slice(),
                   &[5, 7, 9]);
        assert_eq!(right.arithmetic(ArithmeticOp::Sub, &left).unwrap().as_slice(),
                   &[3, 3, 3]);
        assert_eq!(left.arithmetic(ArithmeticOp::Mul, &right).unwrap().as_slice(),
                   &[4, 10, 18]);
    }

    #[test]
    fn division_truncates_toward_zero() {
        let left = Value::fixed(vec![7, -7]);
        let right = Value::fixed(vec![2, 2]);
        assert_eq!(left.arithmetic(ArithmeticOp::Div, &right).unwrap().as_slice(),
                   &[3, -3]);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let left = Value::fixed(vec![1]);
        let right = Value::fixed(vec![0]);
        assert_eq!(left.arithmetic(ArithmeticOp::Div, &right),
                   Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn arithmetic_size_mismatch_is_an_error() {
        let left = Value::fixed(vec![1, 2]);
        let right = Value::fixed(vec![1]);
        assert_eq!(left.arithmetic(ArithmeticOp::Add, &right),
                   Err(RuntimeError::SizeMismatch { operation: "add",
                                                    left:      2,
                                                    right:     1, }));
    }

    #[test]
    fn overflow_is_an_error() {
        let left = Value::fixed(vec![i64::MAX]);
        let right = Value::fixed(vec![1]);
        assert_eq!(left.arithmetic(ArithmeticOp::Add, &right),
                   Err(RuntimeError::Overflow { operation: "add" }));
    }

    #[test]
    fn comparisons_hold_at_every_index() {
        let low = Value::fixed(vec![1, 2]);
        let high = Value::fixed(vec![3, 4]);
        let mixed = Value::fixed(vec![0, 9]);

        assert!(low.compare(CompareOp::Lt, &high));
        assert!(high.compare(CompareOp::Gt, &low));
        assert!(low.compare(CompareOp::Le, &low));
        assert!(!low.compare(CompareOp::Lt, &mixed));
        assert!(!low.compare(CompareOp::Gt, &mixed));
    }

    #[test]
    fn not_equal_means_different_everywhere() {
        let left = Value::fixed(vec![1, 2]);
        assert!(left.compare(CompareOp::Ne, &Value::fixed(vec![3, 4])));
        assert!(!left.compare(CompareOp::Ne, &Value::fixed(vec![1, 4])));
    }

    #[test]
    fn length_mismatch_is_true_only_for_not_equal() {
        let left = Value::fixed(vec![1, 2]);
        let right = Value::fixed(vec![1]);
        assert!(left.compare(CompareOp::Ne, &right));
        for op in [CompareOp::Eq, CompareOp::Lt, CompareOp::Le, CompareOp::Gt, CompareOp::Ge] {
            assert!(!left.compare(op, &right));
        }
    }

    #[test]
    fn bytes_reduce_modulo_256() {
        let value = Value::fixed(vec![104, 361, -1]);
        assert_eq!(value.to_bytes(), vec![104, 105, 255]);
    }

    #[test]
    fn display_renders_brackets() {
        assert_eq!(Value::fixed(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(Value::empty().to_string(), "[]");
    }
}
