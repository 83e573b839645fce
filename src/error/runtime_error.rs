#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can be raised during evaluation.
pub enum RuntimeError {
    /// Tried to use a name that is not bound anywhere in the scope chain.
    UndefinedVariable {
        /// The name that was looked up.
        name: String,
    },
    /// Called a name that is neither a defined function nor a builtin.
    UndefinedFunction {
        /// The name that was called.
        name: String,
    },
    /// Called a name that is bound to an array value.
    NotAFunction {
        /// The name that was called.
        name: String,
    },
    /// Used a function-bound name where an array value was required.
    NotAnArray {
        /// The name that was referenced.
        name: String,
    },
    /// Assigned an array into a name bound to a function definition.
    FunctionNotAssignable {
        /// The name that was assigned to.
        name: String,
    },
    /// An element-wise operation received arrays of different lengths.
    SizeMismatch {
        /// The operation that failed (`add`, `subtract`, ...).
        operation: &'static str,
        /// Length of the left operand.
        left:      usize,
        /// Length of the right operand.
        right:     usize,
    },
    /// Assigned a value of the wrong length into a fixed array.
    AssignmentSizeMismatch {
        /// The fixed destination length.
        expected: usize,
        /// The source length.
        actual:   usize,
    },
    /// Assigned a value shorter than a growable array's minimum length.
    AssignmentBelowMinimum {
        /// The destination's declared minimum length.
        minimum: usize,
        /// The source length.
        actual:  usize,
    },
    /// Declared a `[]` array without an initializer.
    MissingInitializer,
    /// Called a function with the wrong number of arguments.
    ArityMismatch {
        /// The function name.
        name:     String,
        /// The number of parameters the function declares.
        expected: usize,
        /// The number of arguments supplied.
        actual:   usize,
    },
    /// A range's upper bound was below its lower bound.
    RangeOutOfOrder {
        /// The lower bound.
        start: usize,
        /// The upper bound.
        end:   usize,
    },
    /// A range's upper bound exceeded the array length.
    RangeOutOfBounds {
        /// The upper bound.
        end: usize,
        /// The array length.
        len: usize,
    },
    /// A range bound expression did not yield one non-negative element.
    BadRangeBound,
    /// Called a method the language does not define.
    UnknownMethod {
        /// The method name.
        name: String,
    },
    /// Divided by a zero element.
    DivisionByZero,
    /// An element-wise operation overflowed the machine integer type.
    Overflow {
        /// The operation that overflowed.
        operation: &'static str,
    },
    /// Took the square root of a negative element.
    NegativeSqrt {
        /// The offending element.
        element: i64,
    },
    /// A builtin received an argument of the wrong shape.
    BadArgument {
        /// The builtin name.
        function: &'static str,
        /// What went wrong.
        details:  String,
    },
    /// A file could not be opened or read.
    FileRead {
        /// The path that failed.
        path: String,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "{name} has not been defined."),
            Self::UndefinedFunction { name } => write!(f, "Undefined function '{name}'."),
            Self::NotAFunction { name } => write!(f, "{name} must be defined as a function."),
            Self::NotAnArray { name } => {
                write!(f, "Cannot use {name} as an array, as it is defined as a function.")
            },
            Self::FunctionNotAssignable { name } => {
                write!(f, "Cannot assign to {name}, as it is defined as a function.")
            },
            Self::SizeMismatch { operation,
                                 left,
                                 right, } => {
                write!(f,
                       "Cannot {operation} arrays with different sizes ({left} and {right}).")
            },
            Self::AssignmentSizeMismatch { expected, actual } => write!(f,
                "Cannot set value. Destination length ({expected}) is not equal to the source's length ({actual})."),
            Self::AssignmentBelowMinimum { minimum, actual } => write!(f,
                "Cannot set value. Destination minimum ({minimum}) is larger than the source's length ({actual})."),
            Self::MissingInitializer => {
                write!(f, "Static array cannot be defined without a value.")
            },
            Self::ArityMismatch { name,
                                  expected,
                                  actual, } => {
                write!(f,
                       "Function {name} expected {expected} argument(s) but received {actual}.")
            },
            Self::RangeOutOfOrder { start, end } => write!(f,
                "Array range upper bound ({end}) must be greater than or equal to the lower bound ({start})."),
            Self::RangeOutOfBounds { end, len } => write!(f,
                "Array range bounds must be smaller than the length of the array ({end} > {len})."),
            Self::BadRangeBound => write!(f,
                "Array bounds must be an integer or evaluate to an array with 1 non-negative value."),
            Self::UnknownMethod { name } => write!(f, "Unknown method {name}."),
            Self::DivisionByZero => write!(f, "Division by zero."),
            Self::Overflow { operation } => {
                write!(f, "Integer overflow while trying to {operation}.")
            },
            Self::NegativeSqrt { element } => {
                write!(f, "Cannot take the square root of negative element {element}.")
            },
            Self::BadArgument { function, details } => write!(f, "Function {function} {details}."),
            Self::FileRead { path } => write!(f, "Failed to open file: {path}."),
        }
    }
}

impl std::error::Error for RuntimeError {}
