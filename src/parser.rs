use thiserror::Error;

use crate::ast::{BinaryOp, Block, Expr, ExprInner, Program, Stmt, StmtInner, UnaryOp};
use crate::scanner::{Keyword, Pos, Scanner, Symbol, Token, TokenType};

#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at {pos}: {message}")]
pub struct ParseError {
    pub pos: Pos,
    pub message: String,
}

/// Binding power of infix positions, weakest to strongest. The derived
/// ordering is the precedence table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(token: &TokenType<'_>) -> Precedence {
    match token {
        TokenType::Symbol(Symbol::EqualEqual) | TokenType::Symbol(Symbol::BangEqual) => {
            Precedence::Equals
        }
        TokenType::Symbol(Symbol::Less)
        | TokenType::Symbol(Symbol::Greater)
        | TokenType::Symbol(Symbol::LessEqual)
        | TokenType::Symbol(Symbol::GreaterEqual) => Precedence::LessGreater,
        TokenType::Symbol(Symbol::Plus) | TokenType::Symbol(Symbol::Minus) => Precedence::Sum,
        TokenType::Symbol(Symbol::Star) | TokenType::Symbol(Symbol::Slash) => Precedence::Product,
        TokenType::Symbol(Symbol::LeftParen) => Precedence::Call,
        TokenType::Symbol(Symbol::LeftBracket) => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

fn symbol_to_binary_op(symbol: Symbol) -> BinaryOp {
    match symbol {
        Symbol::EqualEqual => BinaryOp::Equal,
        Symbol::BangEqual => BinaryOp::NotEqual,
        Symbol::Less => BinaryOp::LessThan,
        Symbol::LessEqual => BinaryOp::LessThanEqual,
        Symbol::Greater => BinaryOp::GreaterThan,
        Symbol::GreaterEqual => BinaryOp::GreaterThanEqual,
        Symbol::Plus => BinaryOp::Add,
        Symbol::Minus => BinaryOp::Subtract,
        Symbol::Star => BinaryOp::Multiply,
        Symbol::Slash => BinaryOp::Divide,
        s => panic!("symbol was not a valid binary operator: {}", s),
    }
}

/// Parse a whole source text. The parser never panics on malformed input:
/// it accumulates descriptive errors and keeps going, so the caller either
/// gets a program or the full error list
pub fn parse(code: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(Scanner::new(code));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

pub struct Parser<'code> {
    scanner: Scanner<'code>,
    cur: Token<'code>,
    peek: Token<'code>,
    errors: Vec<ParseError>,
}

impl<'code> Parser<'code> {
    pub fn new(mut scanner: Scanner<'code>) -> Parser<'code> {
        let cur = scanner.next();
        let peek = scanner.next();
        Parser {
            scanner,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while self.cur.data != TokenType::Eof {
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            self.advance();
        }
        Program(stmts)
    }

    fn advance(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.scanner.next());
    }

    fn error(&mut self, pos: Pos, message: String) {
        self.errors.push(ParseError { pos, message });
    }

    // Consume the peek token iff it is the required symbol; record an error
    // otherwise
    fn expect_peek(&mut self, required_next: Symbol) -> bool {
        if self.peek.data == required_next {
            self.advance();
            true
        } else {
            let message = format!("expected '{}', found {}", required_next, self.peek.data);
            self.error(self.peek.pos, message);
            false
        }
    }

    fn consume_semicolon_if_present(&mut self) {
        if self.peek.data == Symbol::Semicolon {
            self.advance();
        }
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.cur.data {
            TokenType::Keyword(Keyword::Let) => self.parse_let_stmt(),
            TokenType::Keyword(Keyword::Return) => self.parse_return_stmt(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_let_stmt(&mut self) -> Option<Stmt> {
        let pos = self.cur.pos;
        let name = if let TokenType::Identifier(name) = self.peek.data {
            self.advance();
            name.to_string()
        } else {
            let message = format!("expected an identifier, found {}", self.peek.data);
            self.error(self.peek.pos, message);
            return None;
        };
        if !self.expect_peek(Symbol::Equal) {
            return None;
        }
        self.advance();
        let value = self.parse_expr(Precedence::Lowest)?;
        self.consume_semicolon_if_present();
        Some(Stmt {
            pos,
            inner: StmtInner::Let { name, value },
        })
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let pos = self.cur.pos;
        self.advance();
        let value = self.parse_expr(Precedence::Lowest)?;
        self.consume_semicolon_if_present();
        Some(Stmt {
            pos,
            inner: StmtInner::Return(value),
        })
    }

    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let pos = self.cur.pos;
        let expr = self.parse_expr(Precedence::Lowest)?;
        self.consume_semicolon_if_present();
        Some(Stmt {
            pos,
            inner: StmtInner::Expr(expr),
        })
    }

    // The Pratt loop: a prefix parse for the current token, then fold infix
    // parses over it for as long as the lookahead binds tighter
    fn parse_expr(&mut self, min: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;
        while self.peek.data != Symbol::Semicolon && min < precedence_of(&self.peek.data) {
            self.advance();
            left = self.parse_infix(left)?;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let pos = self.cur.pos;
        let inner = match self.cur.data {
            TokenType::Identifier(name) => ExprInner::Identifier(name.to_string()),
            TokenType::Int(value) => ExprInner::Integer(value),
            TokenType::String(raw) => ExprInner::Str(raw.to_string()),
            TokenType::Keyword(Keyword::True) => ExprInner::Boolean(true),
            TokenType::Keyword(Keyword::False) => ExprInner::Boolean(false),
            TokenType::Symbol(Symbol::Bang) => {
                self.advance();
                let right = self.parse_expr(Precedence::Prefix)?;
                ExprInner::Unary {
                    op: UnaryOp::Not,
                    right: Box::new(right),
                }
            }
            TokenType::Symbol(Symbol::Minus) => {
                self.advance();
                let right = self.parse_expr(Precedence::Prefix)?;
                ExprInner::Unary {
                    op: UnaryOp::Negative,
                    right: Box::new(right),
                }
            }
            TokenType::Symbol(Symbol::LeftParen) => {
                self.advance();
                let inner = self.parse_expr(Precedence::Lowest)?;
                if !self.expect_peek(Symbol::RightParen) {
                    return None;
                }
                // Grouping only shapes the tree, there is no node for it
                return Some(inner);
            }
            TokenType::Keyword(Keyword::If) => return self.parse_if_expr(),
            TokenType::Keyword(Keyword::Fn) => return self.parse_function_literal(),
            TokenType::Symbol(Symbol::LeftBracket) => {
                ExprInner::Array(self.parse_expr_list(Symbol::RightBracket)?)
            }
            TokenType::Symbol(Symbol::LeftBrace) => return self.parse_hash_literal(),
            other => {
                let message = format!("no prefix parser for {}", other);
                self.error(pos, message);
                return None;
            }
        };
        Some(Expr { pos, inner })
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let pos = self.cur.pos;
        match self.cur.data {
            TokenType::Symbol(Symbol::LeftParen) => {
                let arguments = self.parse_expr_list(Symbol::RightParen)?;
                Some(Expr {
                    pos,
                    inner: ExprInner::Call {
                        function: Box::new(left),
                        arguments,
                    },
                })
            }
            TokenType::Symbol(Symbol::LeftBracket) => {
                self.advance();
                let index = self.parse_expr(Precedence::Lowest)?;
                if !self.expect_peek(Symbol::RightBracket) {
                    return None;
                }
                Some(Expr {
                    pos,
                    inner: ExprInner::Index {
                        left: Box::new(left),
                        index: Box::new(index),
                    },
                })
            }
            TokenType::Symbol(symbol) => {
                let op = symbol_to_binary_op(symbol);
                let precedence = precedence_of(&self.cur.data);
                self.advance();
                let right = self.parse_expr(precedence)?;
                Some(Expr {
                    pos,
                    inner: ExprInner::Binary {
                        left: Box::new(left),
                        op,
                        right: Box::new(right),
                    },
                })
            }
            other => unreachable!("token without an infix parser slipped the gate: {}", other),
        }
    }

    fn parse_if_expr(&mut self) -> Option<Expr> {
        let pos = self.cur.pos;
        if !self.expect_peek(Symbol::LeftParen) {
            return None;
        }
        self.advance();
        let condition = self.parse_expr(Precedence::Lowest)?;
        if !self.expect_peek(Symbol::RightParen) {
            return None;
        }
        if !self.expect_peek(Symbol::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block();
        let alternative = if self.peek.data == Keyword::Else {
            self.advance();
            if !self.expect_peek(Symbol::LeftBrace) {
                return None;
            }
            Some(self.parse_block())
        } else {
            None
        };
        Some(Expr {
            pos,
            inner: ExprInner::If {
                condition: Box::new(condition),
                consequence,
                alternative,
            },
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        let pos = self.cur.pos;
        if !self.expect_peek(Symbol::LeftParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(Symbol::LeftBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expr {
            pos,
            inner: ExprInner::Function { parameters, body },
        })
    }

    // The opening '(' is the current token
    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek.data == Symbol::RightParen {
            self.advance();
            return Some(parameters);
        }
        loop {
            self.advance();
            if let TokenType::Identifier(name) = self.cur.data {
                parameters.push(name.to_string());
            } else {
                let message = format!("expected an identifier, found {}", self.cur.data);
                self.error(self.cur.pos, message);
                return None;
            }
            if self.peek.data != Symbol::Comma {
                break;
            }
            self.advance();
        }
        if !self.expect_peek(Symbol::RightParen) {
            return None;
        }
        Some(parameters)
    }

    // The current token is the opening brace
    fn parse_block(&mut self) -> Block {
        let pos = self.cur.pos;
        let mut stmts = Vec::new();
        self.advance();
        while self.cur.data != Symbol::RightBrace {
            if self.cur.data == TokenType::Eof {
                self.error(self.cur.pos, "expected '}', found end of input".to_string());
                break;
            }
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            self.advance();
        }
        Block { pos, stmts }
    }

    // A comma-separated expression list terminated by `end`; the opening
    // delimiter is the current token. Shared by array literals and call
    // arguments
    fn parse_expr_list(&mut self, end: Symbol) -> Option<Vec<Expr>> {
        let mut exprs = Vec::new();
        if self.peek.data == end {
            self.advance();
            return Some(exprs);
        }
        self.advance();
        exprs.push(self.parse_expr(Precedence::Lowest)?);
        while self.peek.data == Symbol::Comma {
            self.advance();
            self.advance();
            exprs.push(self.parse_expr(Precedence::Lowest)?);
        }
        if !self.expect_peek(end) {
            return None;
        }
        Some(exprs)
    }

    // The current token is the opening brace
    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let pos = self.cur.pos;
        let mut pairs = Vec::new();
        while self.peek.data != Symbol::RightBrace {
            self.advance();
            let key = self.parse_expr(Precedence::Lowest)?;
            if !self.expect_peek(Symbol::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expr(Precedence::Lowest)?;
            pairs.push((key, value));
            if self.peek.data != Symbol::RightBrace && !self.expect_peek(Symbol::Comma) {
                return None;
            }
        }
        if !self.expect_peek(Symbol::RightBrace) {
            return None;
        }
        Some(Expr {
            pos,
            inner: ExprInner::Hash(pairs),
        })
    }
}
