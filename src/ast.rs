use std::rc::Rc;

/// The root of a parsed source file.
///
/// A file is a flat sequence of top-level items. Nothing else may appear at
/// file scope; in particular, function definitions cannot nest.
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    /// Top-level items in source order.
    pub items: Vec<Item>,
}

/// A single top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A variable declaration or assignment.
    Binding(VarBinding),
    /// A function call evaluated for its effects.
    Call(FunctionCall),
    /// A function definition.
    ///
    /// Definitions are reference-counted so the same node can be held by
    /// the root and by any scope that binds the function's name.
    Function(Rc<FunctionDefinition>),
    /// A `use` directive folding another file's definitions into scope.
    Use(Use),
}

/// An import directive.
///
/// The payload is an array node that evaluates to the bytes of a filename.
/// `use <name>` and `use "path"` differ only in how they were written; both
/// resolve to a filename at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Use {
    /// Evaluates to the byte sequence of the filename.
    pub payload: ArrayNode,
    /// Which surface syntax produced this directive.
    pub kind:    UseKind,
}

/// The surface syntax of a `use` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseKind {
    /// `use "path"` (or any array payload).
    Path,
    /// `use <name>`.
    StandardHeader,
}

/// A function definition: name, parameters, output descriptor, and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// The function name.
    pub name:   String,
    /// The declared parameters, in order.
    pub params: Vec<Parameter>,
    /// The descriptor of the returned array.
    pub output: ArrayDescriptor,
    /// The statements executed when the function is called.
    pub body:   Body,
}

/// A single function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name.
    pub name:       String,
    /// The storage class the argument is bound with.
    pub descriptor: ArrayDescriptor,
}

/// The storage class written next to a binding: `[5]`, `[+]`, `[5+]`, `[]`.
///
/// The integer sets `size`; the trailing `+` sets `can_grow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDescriptor {
    /// Declared length for fixed arrays, capacity hint for growable ones.
    pub size:     Option<usize>,
    /// Whether the bound array may grow past its current length.
    pub can_grow: bool,
}

/// A braced sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// The statements, in source order.
    pub statements: Vec<Statement>,
}

/// A statement inside a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A variable declaration or assignment, terminated by `;`.
    Binding(VarBinding),
    /// A `for` loop.
    For(ForLoop),
    /// An `if` chain.
    If(If),
    /// A `while` loop.
    While(While),
    /// A function call evaluated for its effects, terminated by `;`.
    Call(FunctionCall),
    /// A `return` statement, terminated by `;`.
    Return(Return),
}

/// Either a declaration of a new name or an assignment to an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum VarBinding {
    /// `let name: [descriptor] = value;`
    Declaration(VariableDeclaration),
    /// `name = value;`
    Assignment(VariableAssignment),
}

/// A `let` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The declared name.
    pub name:       String,
    /// The declared storage class.
    pub descriptor: ArrayDescriptor,
    /// The optional initializer.
    pub value:      Option<Expression>,
}

/// An assignment to an already-bound name.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableAssignment {
    /// The assignment target.
    pub name:  String,
    /// The right-hand side.
    pub value: Expression,
}

/// An `if` statement with optional `else if` chain and `else` body.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    /// The branch condition.
    pub condition: Condition,
    /// Executed when the condition holds.
    pub body:      Body,
    /// The next `else if` link, if any.
    pub else_if:   Option<Box<If>>,
    /// The final `else` body, if any.
    pub else_body: Option<Body>,
}

/// A `while` loop. Shares its condition shape with `if`.
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    /// The loop condition, re-evaluated before each iteration.
    pub condition: Condition,
    /// The loop body.
    pub body:      Body,
}

/// A condition: either a comparison or a declaration used as a test.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `left <op> right`
    Compare(Compare),
    /// `let name: [descriptor] = value` used as a boolean test.
    ///
    /// The test holds when the initializer fits the descriptor; the binding
    /// is only introduced when it does.
    Declaration(VariableDeclaration),
}

/// A comparison between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    /// The comparison operator.
    pub op:    CompareOp,
    /// The left operand.
    pub left:  Expression,
    /// The right operand.
    pub right: Expression,
}

/// Comparison operators.
///
/// All six are element-wise and universally quantified: an ordering holds
/// only when it holds at every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// A `for` loop over the elements of an array.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    /// The name bound to each element in turn.
    pub element:  String,
    /// Evaluated once to produce the iterated array.
    pub iterable: Expression,
    /// The loop body.
    pub body:     Body,
}

/// A `return` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    /// The returned expression.
    pub value: Expression,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The called name.
    pub name:      String,
    /// The argument expressions, evaluated left to right.
    pub arguments: Vec<Expression>,
}

/// An expression: a primary with a postfix chain applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The value the postfix chain starts from.
    pub primary: Primary,
    /// Ranges and method calls, applied left to right.
    ///
    /// Postfix binds tighter than any arithmetic operator, so the chain
    /// always hangs off a primary, never off an arithmetic node.
    pub postfix: Vec<PostfixOp>,
}

/// The primary of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// An arithmetic combination of two subexpressions.
    Arithmetic(Box<Arithmetic>),
    /// An array literal, identifier reference, or function call.
    Array(ArrayNode),
}

/// An arithmetic node. Both children are always populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Arithmetic {
    /// The operator.
    pub op:    ArithmeticOp,
    /// The left operand.
    pub left:  Expression,
    /// The right operand.
    pub right: Expression,
}

/// Arithmetic operators. All four are element-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// The payload of an array primary.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayNode {
    /// A literal integer sequence, from `[1, 2, 3]` or a string literal
    /// (one element per byte).
    Ints(Vec<i64>),
    /// A reference to a bound name.
    Identifier(String),
    /// A call whose result is the array.
    Call(FunctionCall),
}

/// One link of a postfix chain.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// A `[start:end]` slice (or the `[i]` sugar).
    Range(ArrayRange),
    /// A `.name(args)` method call.
    Method(MethodCall),
}

/// A slice of an array value.
///
/// Absent bounds default to the start and end of the sliced value. The
/// single-index sugar `a[i]` is desugared at parse time to `a[i:i+1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRange {
    /// The inclusive lower bound.
    pub start: Option<RangeBound>,
    /// The exclusive upper bound.
    pub end:   Option<RangeBound>,
}

/// A range bound: a literal index or an expression evaluating to one.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    /// A non-negative literal index.
    Literal(usize),
    /// An expression that must evaluate to a single non-negative element.
    Expression(Box<Expression>),
}

/// A method applied to an array value.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// The method name.
    pub name:      String,
    /// The argument expressions.
    pub arguments: Vec<Expression>,
}

impl Expression {
    /// Wraps a literal integer sequence as a complete expression.
    ///
    /// Used by the parser when it desugars `a[e]` into `a[e : e + [1]]`
    /// and by the driver when it synthesizes the `main` call.
    #[must_use]
    pub fn from_ints(values: Vec<i64>) -> Self {
        Self { primary: Primary::Array(ArrayNode::Ints(values)),
               postfix: Vec::new(), }
    }

    /// Wraps an arithmetic node as a complete expression with no postfix.
    #[must_use]
    pub fn from_arithmetic(op: ArithmeticOp, left: Self, right: Self) -> Self {
        Self { primary: Primary::Arithmetic(Box::new(Arithmetic { op, left, right })),
               postfix: Vec::new(), }
    }
}

impl ArrayNode {
    /// Converts a string into its byte sequence, one element per byte.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::Ints(text.bytes().map(i64::from).collect())
    }
}

fn write_list<T: std::fmt::Display>(f: &mut std::fmt::Formatter<'_>,
                                    items: &[T])
                                    -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl std::fmt::Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binding(binding) => write!(f, "{binding};"),
            Self::Call(call) => write!(f, "{call};"),
            Self::Function(def) => write!(f, "{def}"),
            Self::Use(use_node) => write!(f, "{use_node}"),
        }
    }
}

impl std::fmt::Display for Use {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            UseKind::StandardHeader => {
                write!(f, "use <")?;
                if let ArrayNode::Ints(ints) = &self.payload {
                    let bytes: Vec<u8> = ints.iter().map(|&i| i as u8).collect();
                    write!(f, "{}", String::from_utf8_lossy(&bytes))?;
                } else {
                    write!(f, "{}", self.payload)?;
                }
                write!(f, ">")
            },
            UseKind::Path => write!(f, "use {}", self.payload),
        }
    }
}

impl std::fmt::Display for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn {}(", self.name)?;
        write_list(f, &self.params)?;
        write!(f, ") -> {} {}", self.output, self.body)
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.descriptor)
    }
}

impl std::fmt::Display for ArrayDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        if let Some(size) = self.size {
            write!(f, "{size}")?;
        }
        if self.can_grow {
            write!(f, "+")?;
        }
        write!(f, "]")
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, " {statement}")?;
        }
        write!(f, " }}")
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binding(binding) => write!(f, "{binding};"),
            Self::For(for_loop) => write!(f, "{for_loop}"),
            Self::If(if_node) => write!(f, "{if_node}"),
            Self::While(while_node) => write!(f, "{while_node}"),
            Self::Call(call) => write!(f, "{call};"),
            Self::Return(ret) => write!(f, "{ret};"),
        }
    }
}

impl std::fmt::Display for VarBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Declaration(declaration) => write!(f, "{declaration}"),
            Self::Assignment(assignment) => write!(f, "{assignment}"),
        }
    }
}

impl std::fmt::Display for VariableDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {}: {}", self.name, self.descriptor)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for VariableAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

impl std::fmt::Display for If {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if {} {}", self.condition, self.body)?;
        if let Some(else_if) = &self.else_if {
            write!(f, " else {else_if}")?;
        }
        if let Some(else_body) = &self.else_body {
            write!(f, " else {else_body}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for While {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while {} {}", self.condition, self.body)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compare(compare) => write!(f, "{compare}"),
            Self::Declaration(declaration) => write!(f, "{declaration}"),
        }
    }
}

impl std::fmt::Display for Compare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{op}")
    }
}

impl std::fmt::Display for ForLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "for {} : {} {}", self.element, self.iterable, self.body)
    }
}

impl std::fmt::Display for Return {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {}", self.value)
    }
}

impl std::fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        write_list(f, &self.arguments)?;
        write!(f, ")")
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.primary {
            Primary::Arithmetic(arithmetic) => write!(f, "{arithmetic}")?,
            Primary::Array(array) => write!(f, "{array}")?,
        }
        for postfix in &self.postfix {
            write!(f, "{postfix}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Arithmetic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.left, self.op, self.right)
    }
}

impl std::fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        };
        write!(f, "{op}")
    }
}

impl std::fmt::Display for ArrayNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ints(ints) => {
                write!(f, "[")?;
                write_list(f, ints)?;
                write!(f, "]")
            },
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Call(call) => write!(f, "{call}"),
        }
    }
}

impl std::fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range(range) => write!(f, "{range}"),
            Self::Method(method) => write!(f, "{method}"),
        }
    }
}

impl std::fmt::Display for ArrayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        if let Some(start) = &self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = &self.end {
            write!(f, "{end}")?;
        }
        write!(f, "]")
    }
}

impl std::fmt::Display for RangeBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(index) => write!(f, "{index}"),
            Self::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl std::fmt::Display for MethodCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ".{}(", self.name)?;
        write_list(f, &self.arguments)?;
        write!(f, ")")
    }
}
