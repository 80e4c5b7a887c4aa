//! 递归下降语法分析与求值
//!
//! 文法（优先级由低到高）：
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '//' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := NUMBER | IDENT | IDENT '(' args ')' | '(' expr ')'
//! ```
//!
//! `**` 右结合，且比一元负号结合得更紧：`-2**2 == -4`。
//!
//! 嵌套层数和记号总数都有上限，超出时返回语法错误，递归不会耗尽栈。

use super::functions;
use super::lexer::Token;
use super::value::Value;
use crate::error::EvalError;

/// 括号、一元符号和幂指数的最大嵌套层数
const MAX_NESTING: usize = 200;
/// 单个表达式的最大记号数，同时限制了左结合链构成的语法树深度
const MAX_TOKENS: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Value),
    Name(String),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn eval(&self) -> Result<Value, EvalError> {
        match self {
            Expr::Number(v) => Ok(v.clone()),
            Expr::Name(name) => functions::constant(name),
            Expr::Neg(inner) => Ok(inner.eval()?.neg()),
            Expr::Binary { op, lhs, rhs } => {
                let (a, b) = (lhs.eval()?, rhs.eval()?);
                match op {
                    BinaryOp::Add => a.add(b),
                    BinaryOp::Sub => a.sub(b),
                    BinaryOp::Mul => a.mul(b),
                    BinaryOp::Div => a.div(b),
                    BinaryOp::FloorDiv => a.floor_div(b),
                    BinaryOp::Rem => a.rem(b),
                    BinaryOp::Pow => a.pow(b),
                }
            }
            Expr::Call { name, args } => {
                let values = args.iter().map(Expr::eval).collect::<Result<Vec<_>, _>>()?;
                functions::call(name, &values)
            }
        }
    }
}

pub fn parse(tokens: &[Token]) -> Result<Expr, EvalError> {
    if tokens.len() > MAX_TOKENS {
        return Err(EvalError::Syntax("expression too long".to_string()));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(unexpected(token)),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// 当前 `unary` 的递归层数；所有递归路径都经过 `unary`
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        if self.depth >= MAX_NESTING {
            return Err(EvalError::Syntax("expression too deeply nested".to_string()));
        }
        self.depth += 1;
        let out = self.signed();
        self.depth -= 1;
        out
    }

    fn signed(&mut self) -> Result<Expr, EvalError> {
        if self.eat(&Token::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat(&Token::DoubleStar) {
            let exp = self.unary()?;
            return Ok(binary(BinaryOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Expr::Number(v.clone())),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.args()?;
                    Ok(Expr::Call {
                        name: name.clone(),
                        args,
                    })
                } else {
                    Ok(Expr::Name(name.clone()))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("missing ')'".to_string()));
                }
                Ok(inner)
            }
            Some(token) => Err(unexpected(token)),
            None => Err(EvalError::Syntax("unexpected end of expression".to_string())),
        }
    }

    /// 已消费 `(`，读取逗号分隔的参数直到 `)`
    fn args(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            if !self.eat(&Token::Comma) {
                return Err(EvalError::Syntax("expected ',' or ')'".to_string()));
            }
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn unexpected(token: &Token) -> EvalError {
    match token {
        Token::Unknown(c) => EvalError::UnexpectedChar(*c),
        other => EvalError::Syntax(format!("unexpected token {:?}", other)),
    }
}
