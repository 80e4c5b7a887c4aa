//! 表达式词法分析
//!
//! 不认识的字符不会让分词失败，而是产出 [`Token::Unknown`]，
//! 这样白名单检查总能先看到完整的标识符集合，再由语法分析报错。

use super::value::Value;
use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Value),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
    Unknown(char),
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        {
            let (token, next) = lex_number(&chars, i);
            tokens.push(token);
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (token, width) = match (c, next) {
            ('*', Some('*')) => (Token::DoubleStar, 2),
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            (other, _) => (Token::Unknown(other), 1),
        };
        tokens.push(token);
        i += width;
    }

    tokens
}

/// 读取一个数字字面量：`12`、`1.5`、`.5`、`3.`、`1e-12`、`2E+3`
fn lex_number(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start;
    let mut is_float = false;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        is_float = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    // 只有后面确实跟着指数数字时才把 e 当作指数，否则留给标识符
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            is_float = true;
            i = j;
        }
    }

    let text: String = chars[start..i].iter().collect();
    let value = if is_float {
        Value::Float(text.parse().unwrap_or(f64::NAN))
    } else {
        // 纯数字串，总能解析
        Value::Int(text.parse::<BigInt>().unwrap_or_default())
    };
    (Token::Number(value), i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_and_numbers() {
        let tokens = tokenize("2 ** 3 // 4 % (1.5)");
        assert_eq!(
            tokens,
            vec![
                Token::Number(Value::int(2)),
                Token::DoubleStar,
                Token::Number(Value::int(3)),
                Token::DoubleSlash,
                Token::Number(Value::int(4)),
                Token::Percent,
                Token::LParen,
                Token::Number(Value::Float(1.5)),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_long_integer_literal_is_exact() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(
            tokenize("123456789012345678901234567890"),
            vec![Token::Number(Value::Int(big))]
        );
    }

    #[test]
    fn test_exponent_literal_is_not_an_identifier() {
        assert_eq!(
            tokenize("1e-12"),
            vec![Token::Number(Value::Float(1e-12))]
        );
        // 没有指数数字时 e 是标识符
        assert_eq!(
            tokenize("2e"),
            vec![Token::Number(Value::int(2)), Token::Ident("e".to_string())]
        );
    }

    #[test]
    fn test_unknown_chars_do_not_stop_lexing() {
        let tokens = tokenize("__import__('os')");
        assert_eq!(tokens[0], Token::Ident("__import__".to_string()));
        assert!(tokens.contains(&Token::Unknown('\'')));
        assert!(tokens.contains(&Token::Ident("os".to_string())));
    }
}
