//! 受限的算术表达式求值器
//!
//! 只认识数字字面量、`+ - * / // % **` 和括号，以及 [`functions`] 白名单里的
//! 数学函数和常量。求值分四步：
//!
//! 1. 预处理：`^` → `**`，数字之间的小数逗号 → `.`
//! 2. 分词（[`lexer`]）
//! 3. 白名单检查：所有标识符必须在表里，否则直接拒绝，不做任何求值
//! 4. 语法分析并求值（[`parser`]），整数保持精确，浮点近零归零、保留 6 位小数
//!
//! ```rust
//! use eh_assistant::eval::evaluate;
//!
//! assert_eq!(evaluate("2+2"), "4");
//! assert_eq!(evaluate("10/4"), "2.5");
//! assert_eq!(evaluate("2^3"), "8");
//! ```

pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

use crate::error::EvalError;
use lexer::Token;
use tracing::debug;
pub use value::Value;

/// 表达式引用了白名单之外的名字
pub const REJECTED_MESSAGE: &str = "Expresión no permitida: uso de nombres no seguros.";
/// 其他任何求值失败
pub const FAILED_MESSAGE: &str =
    "No pude resolver esa operación. Usa solo números y + - * / ( ) ^ %";

/// 求值并返回面向用户的文本，任何错误都转换为固定提示语
pub fn evaluate(expr: &str) -> String {
    match try_evaluate(expr) {
        Ok(value) => value.to_string(),
        Err(EvalError::DisallowedName(name)) => {
            debug!(expr = %expr, name = %name, "🚫 表达式包含未授权名字");
            REJECTED_MESSAGE.to_string()
        }
        Err(e) => {
            debug!(expr = %expr, error = %e, "表达式求值失败");
            FAILED_MESSAGE.to_string()
        }
    }
}

/// 求值并返回收尾后的数值
pub fn try_evaluate(expr: &str) -> Result<Value, EvalError> {
    let normalized = normalize(expr);
    let tokens = lexer::tokenize(&normalized);
    check_names(&tokens)?;
    let ast = parser::parse(&tokens)?;
    ast.eval()?.finish()
}

/// `^` 改写为幂运算，夹在两个数字之间的逗号视为小数点
pub fn normalize(expr: &str) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let mut out = String::with_capacity(expr.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '^' => out.push_str("**"),
            ',' if i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) =>
            {
                out.push('.')
            }
            other => out.push(other),
        }
    }
    out
}

/// 在语法分析之前检查全部标识符
fn check_names(tokens: &[Token]) -> Result<(), EvalError> {
    for token in tokens {
        if let Token::Ident(name) = token
            && !functions::is_allowed(name)
        {
            return Err(EvalError::DisallowedName(name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_results() {
        assert_eq!(evaluate("2+2"), "4");
        assert_eq!(evaluate("10/4"), "2.5");
        assert_eq!(evaluate("1e-12"), "0.0");
        assert_eq!(evaluate("2^3"), "8");
        assert_eq!(evaluate("1/3"), "0.333333");
        assert_eq!(evaluate("sqrt(16)"), "4.0");
        assert_eq!(evaluate("pi"), "3.141593");
        assert_eq!(evaluate("10 % 3"), "1");
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(evaluate("1,5 + 1"), "2.5");
        assert_eq!(evaluate("log(8, 2)"), "3.0");
    }

    #[test]
    fn test_near_zero_is_squashed() {
        assert_eq!(evaluate("sin(pi)"), "0.0");
        assert_eq!(evaluate("0.1 + 0.2 - 0.3"), "0.0");
    }

    #[test]
    fn test_disallowed_names_are_rejected() {
        assert_eq!(evaluate("__import__('os')"), REJECTED_MESSAGE);
        assert_eq!(evaluate("open('x')"), REJECTED_MESSAGE);
        assert_eq!(evaluate("2 + os"), REJECTED_MESSAGE);
        // 白名单检查先于语法分析
        assert_eq!(
            try_evaluate("(((eval"),
            Err(EvalError::DisallowedName("eval".to_string()))
        );
    }

    #[test]
    fn test_failures_use_fixed_message() {
        assert_eq!(evaluate("1/0"), FAILED_MESSAGE);
        assert_eq!(evaluate("2+"), FAILED_MESSAGE);
        assert_eq!(evaluate("sqrt(-1)"), FAILED_MESSAGE);
        assert_eq!(evaluate("   "), FAILED_MESSAGE);
        assert_eq!(evaluate("2 $ 3"), FAILED_MESSAGE);
    }

    #[test]
    fn test_big_integers_are_exact() {
        assert_eq!(evaluate("10^20"), "100000000000000000000");
        assert_eq!(evaluate("2^100"), "1267650600228229401496703205376");
        assert_eq!(
            evaluate("99999999999*99999999999"),
            "9999999999800000000001"
        );
        assert_eq!(evaluate("factorial(25)"), "15511210043330985984000000");
        assert_eq!(evaluate("9^9^9"), FAILED_MESSAGE);
    }

    #[test]
    fn test_pathological_input_fails_gracefully() {
        for input in [
            "(".repeat(100_000),
            "-".repeat(100_000) + "1",
            format!("{}1{}", "(".repeat(20_000), ")".repeat(20_000)),
            format!("{}1{}", "(".repeat(300), ")".repeat(300)),
        ] {
            assert_eq!(evaluate(&input), FAILED_MESSAGE);
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("2^3"), "2**3");
        assert_eq!(normalize("3,14"), "3.14");
        assert_eq!(normalize("atan2(1, 2)"), "atan2(1, 2)");
    }
}
