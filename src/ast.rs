use std::fmt::Display;

use crate::scanner::Pos;

#[derive(Debug, PartialEq)]
pub struct Program(pub Vec<Stmt>);

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for stmt in &self.0 {
            if !first {
                f.write_str("\n")?;
            }
            first = false;
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    // Its possible defining this pos across all statements is wasteful of space
    pub pos: Pos,
    pub inner: StmtInner,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtInner {
    Let { name: String, value: Expr },
    Return(Expr),
    Expr(Expr),
}

impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            StmtInner::Let { name, value } => write!(f, "let {} = {};", name, value),
            StmtInner::Return(value) => write!(f, "return {};", value),
            StmtInner::Expr(expr) => write!(f, "{};", expr),
        }
    }
}

/// A braced statement sequence: the body of a function or an if branch.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub pos: Pos,
    pub stmts: Vec<Stmt>,
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{ ")?;
        for stmt in &self.stmts {
            write!(f, "{} ", stmt)?;
        }
        f.write_str("}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    // Its possible defining this pos across all expr types is wasteful of space
    pub pos: Pos,
    pub inner: ExprInner,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprInner {
    Integer(i64),
    // Raw source text between the quotes; escape sequences are expanded at
    // evaluation time, not here
    Str(String),
    Boolean(bool),
    Identifier(String),
    Unary {
        op: UnaryOp,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        parameters: Vec<String>,
        body: Block,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    // Pairs in source order; duplicate keys are resolved at evaluation time
    Hash(Vec<(Expr, Expr)>),
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            ExprInner::Integer(value) => write!(f, "{}", value),
            ExprInner::Str(raw) => write!(f, "\"{}\"", raw),
            ExprInner::Boolean(value) => write!(f, "{}", value),
            ExprInner::Identifier(name) => f.write_str(name),
            ExprInner::Unary { op, right } => write!(f, "({}{})", op, right),
            ExprInner::Binary { left, op, right } => write!(f, "({} {} {})", left, op, right),
            ExprInner::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            ExprInner::Function { parameters, body } => {
                write!(f, "fn({}) {}", parameters.join(", "), body)
            }
            ExprInner::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_comma_separated(f, arguments)?;
                f.write_str(")")
            }
            ExprInner::Array(elements) => {
                f.write_str("[")?;
                write_comma_separated(f, elements)?;
                f.write_str("]")
            }
            ExprInner::Index { left, index } => write!(f, "({}[{}])", left, index),
            ExprInner::Hash(pairs) => {
                f.write_str("{")?;
                let mut first = true;
                for (key, value) in pairs {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_comma_separated(f: &mut std::fmt::Formatter<'_>, exprs: &[Expr]) -> std::fmt::Result {
    let mut first = true;
    for expr in exprs {
        if !first {
            f.write_str(", ")?;
        }
        first = false;
        write!(f, "{}", expr)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Equal => f.write_str("=="),
            BinaryOp::NotEqual => f.write_str("!="),
            BinaryOp::LessThan => f.write_str("<"),
            BinaryOp::LessThanEqual => f.write_str("<="),
            BinaryOp::GreaterThan => f.write_str(">"),
            BinaryOp::GreaterThanEqual => f.write_str(">="),
            BinaryOp::Add => f.write_str("+"),
            BinaryOp::Subtract => f.write_str("-"),
            BinaryOp::Multiply => f.write_str("*"),
            BinaryOp::Divide => f.write_str("/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
            UnaryOp::Negative => f.write_str("-"),
        }
    }
}
