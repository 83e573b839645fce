use std::rc::Rc;

use crate::{
    ast::{ArrayRange, MethodCall, PostfixOp, RangeBound},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            scope::Scope,
        },
        value::Value,
    },
    util::num::{i64_to_usize_checked, usize_to_i64_checked},
};

impl Interpreter {
    /// Applies a postfix chain to a value, left to right.
    ///
    /// The value is threaded through by move; each step consumes the
    /// previous result.
    pub fn apply_postfix(&mut self,
                         value: Value,
                         postfix: &[PostfixOp],
                         scope: &Rc<Scope>)
                         -> EvalResult<Value> {
        let mut result = value;
        for op in postfix {
            result = match op {
                PostfixOp::Range(range) => self.apply_range(result, range, scope)?,
                PostfixOp::Method(method) => self.apply_method(result, method, scope)?,
            };
        }
        Ok(result)
    }

    /// Resolves one range bound to an index.
    ///
    /// An expression bound must evaluate to a single non-negative element.
    fn range_bound(&mut self, bound: &RangeBound, scope: &Rc<Scope>) -> EvalResult<usize> {
        match bound {
            RangeBound::Literal(index) => Ok(*index),
            RangeBound::Expression(expression) => {
                let value = self.eval_expression(expression, scope)?;
                if value.len() != 1 {
                    return Err(RuntimeError::BadRangeBound);
                }
                i64_to_usize_checked(value.as_slice()[0], RuntimeError::BadRangeBound)
            },
        }
    }

    /// Slices a value with a `[start:end]` range.
    ///
    /// `start` defaults to 0 and `end` to the value's length; the result
    /// holds `value[start..end]` and requires `start <= end <= len`.
    fn apply_range(&mut self,
                   value: Value,
                   range: &ArrayRange,
                   scope: &Rc<Scope>)
                   -> EvalResult<Value> {
        let len = value.len();
        let start = match &range.start {
            Some(bound) => self.range_bound(bound, scope)?,
            None => 0,
        };
        let end = match &range.end {
            Some(bound) => self.range_bound(bound, scope)?,
            None => len,
        };

        if end < start {
            return Err(RuntimeError::RangeOutOfOrder { start, end });
        }
        if end > len {
            return Err(RuntimeError::RangeOutOfBounds { end, len });
        }
        Ok(Value::fixed(value.as_slice()[start..end].to_vec()))
    }

    /// Applies a built-in method to a value.
    ///
    /// The methods are `append` (concatenation), `sqrt` (element-wise
    /// truncated square root), and `size` (the length as a one-element
    /// value). Anything else is an error.
    fn apply_method(&mut self,
                    value: Value,
                    method: &MethodCall,
                    scope: &Rc<Scope>)
                    -> EvalResult<Value> {
        let mut args = Vec::with_capacity(method.arguments.len());
        for argument in &method.arguments {
            args.push(self.eval_expression(argument, scope)?);
        }

        let expect_arity = |expected: usize| -> EvalResult<()> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(RuntimeError::ArityMismatch { name: method.name.clone(),
                                                  expected,
                                                  actual: args.len() })
            }
        };

        match method.name.as_str() {
            "append" => {
                expect_arity(1)?;
                let mut elements = value.as_slice().to_vec();
                elements.extend_from_slice(args[0].as_slice());
                Ok(Value::fixed(elements))
            },
            "sqrt" => {
                expect_arity(0)?;
                let mut elements = Vec::with_capacity(value.len());
                for &element in value.as_slice() {
                    elements.push(integer_sqrt(element)?);
                }
                Ok(Value::fixed(elements))
            },
            "size" => {
                expect_arity(0)?;
                let len = usize_to_i64_checked(value.len(),
                                               RuntimeError::Overflow { operation:
                                                                            "measure the array", })?;
                Ok(Value::fixed(vec![len]))
            },
            _ => Err(RuntimeError::UnknownMethod { name: method.name.clone() }),
        }
    }
}

/// The integer truncation of a real square root.
///
/// The floating-point estimate can be off by one for elements above 2^52,
/// so it is nudged onto the exact floor.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn integer_sqrt(element: i64) -> EvalResult<i64> {
    if element < 0 {
        return Err(RuntimeError::NegativeSqrt { element });
    }

    let mut root = (element as f64).sqrt() as i64;
    while root > 0 && root.checked_mul(root).is_none_or(|square| square > element) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|square| square <= element) {
        root += 1;
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sqrt_truncates() {
        assert_eq!(integer_sqrt(0).unwrap(), 0);
        assert_eq!(integer_sqrt(1).unwrap(), 1);
        assert_eq!(integer_sqrt(8).unwrap(), 2);
        assert_eq!(integer_sqrt(9).unwrap(), 3);
        assert_eq!(integer_sqrt(120).unwrap(), 10);
    }

    #[test]
    fn integer_sqrt_is_exact_beyond_float_precision() {
        let root = 3_037_000_498i64;
        assert_eq!(integer_sqrt(root * root).unwrap(), root);
        assert_eq!(integer_sqrt(root * root - 1).unwrap(), root - 1);
        assert_eq!(integer_sqrt(i64::MAX).unwrap(), 3_037_000_499);
    }

    #[test]
    fn negative_sqrt_is_an_error() {
        assert_eq!(integer_sqrt(-4), Err(RuntimeError::NegativeSqrt { element: -4 }));
    }
}
