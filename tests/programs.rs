//! End-to-end program runs through the library entry points.

use std::{
    cell::RefCell,
    fs,
    io::{self, Write},
    rc::Rc,
};

use ints::{
    error::{Error, RuntimeError},
    interpreter::evaluator::core::Interpreter,
};

/// A `Write` sink the test keeps a handle to after the interpreter takes
/// ownership of its clone.
#[derive(Clone, Default)]
struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run(source: &str) -> (Result<(), Error>, Vec<u8>) {
    let sink = SharedOutput::default();
    let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
    let result = interpreter.run_source(source, &[]);
    let bytes = sink.0.borrow().clone();
    (result, bytes)
}

fn output(source: &str) -> Vec<u8> {
    let (result, bytes) = run(source);
    result.unwrap();
    bytes
}

#[test]
fn hello() {
    assert_eq!(output("fn main(argc: [1], argv: [+]) -> [] { print(\"hi\"); }"), b"hi");
}

#[test]
fn element_wise_addition_and_append() {
    let source = "fn main(argc: [1], argv: [+]) -> [] {
                      let x: [3] = [1, 2, 3];
                      let y: [3] = [4, 5, 6];
                      print((x + y).append([10]));
                  }";
    assert_eq!(output(source), vec![5, 7, 9, 10]);
}

#[test]
fn for_over_range() {
    let source = "fn main(a: [1], b: [+]) -> [] { for e : range([3]) { print(e); } }";
    assert_eq!(output(source), vec![0, 1, 2]);
}

#[test]
fn while_counts_to_five() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let i: [1] = [0];
                      while i < [5] { i = i + [1]; }
                      print(i);
                  }";
    assert_eq!(output(source), vec![5]);
}

#[test]
fn recursive_factorial() {
    let source = "fn fact(n: [1]) -> [1] {
                      if n <= [1] { return [1]; }
                      return fact(n - [1]) * n;
                  }
                  fn main(a: [1], b: [+]) -> [] { print(fact([5])); }";
    assert_eq!(output(source), vec![120]);
}

#[test]
fn growable_append() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let v: [+] = [];
                      v = v.append([7]);
                      print(v);
                  }";
    assert_eq!(output(source), vec![7]);
}

#[test]
fn range_sugar_matches_explicit_slice() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let v: [4] = [10, 20, 30, 40];
                      print(v[2]);
                      print(v[2:3]);
                      let i: [1] = [2];
                      print(v[i]);
                  }";
    assert_eq!(output(source), vec![30, 30, 30]);
}

#[test]
fn append_identities() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let v: [3] = [1, 2, 3];
                      print(v.append([]));
                      print([].append(v));
                  }";
    assert_eq!(output(source), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn size_and_range_identity() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let v: [3] = [1, 2, 3];
                      print(v.size());
                      print(range([9]).size());
                      print(range([0]).size());
                  }";
    assert_eq!(output(source), vec![3, 9, 0]);
}

#[test]
fn sqrt_truncates() {
    let source = "fn main(a: [1], b: [+]) -> [] { print([0, 1, 8, 9, 120].sqrt()); }";
    assert_eq!(output(source), vec![0, 1, 2, 3, 10]);
}

#[test]
fn assigning_three_elements_to_a_fixed_two_fails() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      let x: [2] = [1, 2];
                      x = [1, 2, 3];
                  }";
    let (result, _) = run(source);
    assert!(matches!(result,
                     Err(Error::Runtime(RuntimeError::AssignmentSizeMismatch { expected: 2,
                                                                               actual:   3, }))));
}

#[test]
fn wrong_arity_names_expected_and_actual() {
    let source = "fn pair(a: [1], b: [1]) -> [] { }
                  fn main(a: [1], b: [+]) -> [] { pair([1], [2], [3]); }";
    let (result, _) = run(source);
    let Err(Error::Runtime(error)) = result else {
        panic!("expected a runtime error");
    };
    let message = error.to_string();
    assert!(message.contains("pair") && message.contains('2') && message.contains('3'),
            "message was: {message}");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let (result, _) = run("fn main(a: [1], b: [+]) -> [] { print([1] / [0]); }");
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::DivisionByZero))));
}

#[test]
fn out_of_bounds_range_is_a_runtime_error() {
    let (result, _) = run("fn main(a: [1], b: [+]) -> [] { print([1, 2][0:3]); }");
    assert!(matches!(result,
                     Err(Error::Runtime(RuntimeError::RangeOutOfBounds { end: 3, len: 2 }))));
}

#[test]
fn unknown_method_is_a_runtime_error() {
    let (result, _) = run("fn main(a: [1], b: [+]) -> [] { print([1].reverse()); }");
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::UnknownMethod { name }))
                     if name == "reverse"));
}

#[test]
fn comparisons_of_unequal_lengths() {
    let source = "fn main(a: [1], b: [+]) -> [] {
                      if [1, 2] != [1] { print(\"n\"); }
                      if [1, 2] == [1] { print(\"e\"); }
                      if [1, 2] < [9] { print(\"l\"); }
                  }";
    assert_eq!(output(source), b"n");
}

#[test]
fn use_imports_definitions_but_not_effects() {
    let dir = tempfile::tempdir().unwrap();
    let lib_path = dir.path().join("lib.ints");
    fs::write(&lib_path,
              "fn triple(n: [1]) -> [1] { return n * [3]; }
               print(\"side effect\");")
        .unwrap();

    let source = format!("use \"{}\"
                          fn main(a: [1], b: [+]) -> [] {{ print(triple([20]) + [5]); }}",
                         lib_path.display());
    assert_eq!(output(&source), b"A");
}

#[test]
fn mutually_recursive_uses_load_once() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.ints");
    let second = dir.path().join("second.ints");
    fs::write(&first,
              format!("use \"{}\"
                       fn one(n: [1]) -> [1] {{ return n + [1]; }}",
                      second.display()))
        .unwrap();
    fs::write(&second,
              format!("use \"{}\"
                       fn two(n: [1]) -> [1] {{ return n + [2]; }}",
                      first.display()))
        .unwrap();

    let source = format!("use \"{}\"
                          fn main(a: [1], b: [+]) -> [] {{ print(two(one([62]))); }}",
                         first.display());
    assert_eq!(output(&source), b"A");
}

#[test]
fn read_returns_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.bin");
    fs::write(&data_path, b"bytes\x00\x01").unwrap();

    let source = format!("fn main(a: [1], b: [+]) -> [] {{ print(read(\"{}\")); }}",
                         data_path.display());
    assert_eq!(output(&source), b"bytes\x00\x01");
}

#[test]
fn missing_file_is_a_runtime_error() {
    let (result, _) = run("use \"/nonexistent/path.ints\"");
    assert!(matches!(result, Err(Error::Runtime(RuntimeError::FileRead { .. }))));
}

#[test]
fn run_file_drives_a_program_with_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let program = dir.path().join("echo.ints");
    fs::write(&program,
              "fn main(argc: [1], argv: [+]) -> [] {
                   let n: [1] = argv[0];
                   print(argv[[1] : n + [1]]);
               }")
        .unwrap();

    let sink = SharedOutput::default();
    let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));
    interpreter.run_file(&program.display().to_string(), &["hello".to_string()])
               .unwrap();
    assert_eq!(*sink.0.borrow(), b"hello");
}
