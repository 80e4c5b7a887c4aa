//! 数值类型与运算
//!
//! 整数与浮点分开表示：整数是任意精度的 [`BigInt`]，整数运算保持整数，
//! `/` 总是得到浮点，`//` 和 `%` 向负无穷取整。

use crate::error::EvalError;
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Pow, Signed, ToPrimitive, Zero};
use std::fmt;

/// 小于该量级的浮点结果视为 0
const ZERO_EPSILON: f64 = 1e-10;
/// 浮点结果保留的小数位
const DECIMALS: i32 = 6;
/// 中间整数结果的位数上限，超过即报错，避免 `9**9**9` 这类输入耗尽内存
pub(crate) const MAX_INT_BITS: u64 = 1 << 17;
/// 最终结果可展示的位数上限（约 4300 位十进制）
const MAX_DISPLAY_BITS: u64 = 14_284;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(BigInt),
    Float(f64),
}

impl Value {
    pub fn int(n: i64) -> Value {
        Value::Int(BigInt::from(n))
    }

    /// 转成浮点；超出 f64 范围的整数视为定义域错误
    pub fn to_float(&self) -> Result<f64, EvalError> {
        match self {
            Value::Int(n) => n
                .to_f64()
                .filter(|x| x.is_finite())
                .ok_or_else(|| EvalError::Domain("int too large to convert to float".to_string())),
            Value::Float(x) => Ok(*x),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(n) => n.is_zero(),
            Value::Float(x) => *x == 0.0,
        }
    }

    /// 求值结束后的收尾：近零浮点归零，浮点保留 6 位小数
    pub fn finish(self) -> Result<Value, EvalError> {
        match self {
            Value::Int(n) if n.bits() > MAX_DISPLAY_BITS => Err(EvalError::Domain(
                "integer too large to display".to_string(),
            )),
            Value::Int(n) => Ok(Value::Int(n)),
            Value::Float(x) if x.abs() < ZERO_EPSILON => Ok(Value::Float(0.0)),
            Value::Float(x) => Ok(Value::Float(round_to(x, DECIMALS))),
        }
    }

    pub fn neg(self) -> Value {
        match self {
            Value::Int(n) => Value::Int(-n),
            Value::Float(x) => Value::Float(-x),
        }
    }

    pub fn add(self, rhs: Value) -> Result<Value, EvalError> {
        int_or_float(self, rhs, |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(self, rhs: Value) -> Result<Value, EvalError> {
        int_or_float(self, rhs, |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(self, rhs: Value) -> Result<Value, EvalError> {
        int_or_float(self, rhs, |a, b| a * b, |a, b| a * b)
    }

    pub fn div(self, rhs: Value) -> Result<Value, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Value::Float(self.to_float()? / rhs.to_float()?))
    }

    pub fn floor_div(self, rhs: Value) -> Result<Value, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        int_or_float(self, rhs, floor_div_int, |a, b| (a / b).floor())
    }

    pub fn rem(self, rhs: Value) -> Result<Value, EvalError> {
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        int_or_float(self, rhs, floor_rem_int, floor_rem_float)
    }

    pub fn pow(self, rhs: Value) -> Result<Value, EvalError> {
        if let (Value::Int(base), Value::Int(exp)) = (&self, &rhs) {
            if !exp.is_negative() {
                return int_pow(base, exp);
            }
            if base.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
        }

        let (base, exp) = (self.to_float()?, rhs.to_float()?);
        if base == 0.0 && exp < 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        let out = base.powf(exp);
        if out.is_nan() && !base.is_nan() && !exp.is_nan() {
            return Err(EvalError::Domain("**".to_string()));
        }
        if out.is_infinite() && base.is_finite() && exp.is_finite() {
            return Err(EvalError::Domain("**".to_string()));
        }
        Ok(Value::Float(out))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
        }
    }
}

pub(crate) fn too_large() -> EvalError {
    EvalError::Domain("integer too large".to_string())
}

/// 整数结果超过 [`MAX_INT_BITS`] 时报错
pub(crate) fn checked_int(n: BigInt) -> Result<Value, EvalError> {
    if n.bits() > MAX_INT_BITS {
        Err(too_large())
    } else {
        Ok(Value::Int(n))
    }
}

/// 浮点转整数（`floor` / `round` 等），非有限值报错
pub(crate) fn float_to_int(name: &str, x: f64) -> Result<Value, EvalError> {
    BigInt::from_f64(x)
        .map(Value::Int)
        .ok_or_else(|| EvalError::Domain(name.to_string()))
}

fn int_or_float(
    lhs: Value,
    rhs: Value,
    int_op: fn(BigInt, BigInt) -> BigInt,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => checked_int(int_op(a, b)),
        (lhs, rhs) => Ok(Value::Float(float_op(lhs.to_float()?, rhs.to_float()?))),
    }
}

fn int_pow(base: &BigInt, exp: &BigInt) -> Result<Value, EvalError> {
    // 0 和 ±1 的幂只取决于指数是否为 0 及其奇偶，不受位数上限约束
    if base.is_zero() {
        return Ok(Value::int(if exp.is_zero() { 1 } else { 0 }));
    }
    let exp = if base.abs() == BigInt::from(1) {
        if (exp % &BigInt::from(2)).is_zero() { 0 } else { 1 }
    } else {
        exp.to_u32()
            .filter(|&e| base.bits().saturating_mul(u64::from(e)) <= MAX_INT_BITS)
            .ok_or_else(too_large)?
    };
    Ok(Value::Int(Pow::pow(base, exp)))
}

fn floor_div_int(a: BigInt, b: BigInt) -> BigInt {
    let q = &a / &b;
    if !(&a % &b).is_zero() && (a.is_negative() != b.is_negative()) {
        q - BigInt::from(1)
    } else {
        q
    }
}

fn floor_rem_int(a: BigInt, b: BigInt) -> BigInt {
    let r = &a % &b;
    if !r.is_zero() && (r.is_negative() != b.is_negative()) {
        r + b
    } else {
        r
    }
}

fn floor_rem_float(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}

pub(crate) fn round_to(x: f64, decimals: i32) -> f64 {
    if !x.is_finite() || x.abs() >= 1e15 {
        return x;
    }
    let factor = 10f64.powi(decimals);
    (x * factor).round_ties_even() / factor
}

/// 浮点数的展示形式：整数值带 `.0`，极大或极小值用 `1e-05` / `1e+20` 形式
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = x.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        let raw = format!("{:e}", x);
        let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }
    if x.fract() == 0.0 {
        format!("{:.1}", x)
    } else {
        format!("{}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_ops_stay_int() {
        assert_eq!(Value::int(2).add(Value::int(2)), Ok(Value::int(4)));
        assert_eq!(Value::int(7).floor_div(Value::int(2)), Ok(Value::int(3)));
        assert_eq!(Value::int(-7).floor_div(Value::int(2)), Ok(Value::int(-4)));
        assert_eq!(Value::int(-7).rem(Value::int(3)), Ok(Value::int(2)));
        assert_eq!(Value::int(7).rem(Value::int(-3)), Ok(Value::int(-2)));
        assert_eq!(Value::int(2).pow(Value::int(10)), Ok(Value::int(1024)));
    }

    #[test]
    fn test_division_is_float() {
        assert_eq!(Value::int(10).div(Value::int(4)), Ok(Value::Float(2.5)));
        assert_eq!(Value::int(1).div(Value::int(0)), Err(EvalError::DivisionByZero));
        assert_eq!(Value::int(1).rem(Value::int(0)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_large_ints_stay_exact() {
        let out = Value::int(i64::MAX).add(Value::int(1)).unwrap();
        assert_eq!(out.to_string(), "9223372036854775808");
        let out = Value::int(2).pow(Value::int(100)).unwrap();
        assert_eq!(out.to_string(), "1267650600228229401496703205376");
        let out = Value::int(10).pow(Value::int(20)).unwrap();
        assert_eq!(out.to_string(), "100000000000000000000");
    }

    #[test]
    fn test_huge_ints_are_bounded() {
        assert_eq!(Value::int(9).pow(Value::int(387_420_489)), Err(too_large()));
        // 0 和 ±1 的幂不受上限影响
        assert_eq!(Value::int(1).pow(Value::int(i64::MAX)), Ok(Value::int(1)));
        assert_eq!(Value::int(-1).pow(Value::int(i64::MAX)), Ok(Value::int(-1)));
        assert_eq!(Value::int(0).pow(Value::int(i64::MAX)), Ok(Value::int(0)));
        // 可以计算但无法展示
        let big = Value::int(2).pow(Value::int(20_000)).unwrap();
        assert!(big.finish().is_err());
    }

    #[test]
    fn test_int_too_large_for_float() {
        let big = Value::int(10).pow(Value::int(400)).unwrap();
        assert!(matches!(big.clone().add(Value::Float(0.5)), Err(EvalError::Domain(_))));
        assert!(matches!(big.div(Value::int(3)), Err(EvalError::Domain(_))));
    }

    #[test]
    fn test_negative_exponent_and_zero_base() {
        assert_eq!(Value::int(2).pow(Value::int(-1)), Ok(Value::Float(0.5)));
        assert_eq!(Value::int(0).pow(Value::int(-1)), Err(EvalError::DivisionByZero));
        assert!(Value::Float(-8.0).pow(Value::Float(0.5)).is_err());
    }

    #[test]
    fn test_finish_squashes_and_rounds() {
        assert_eq!(Value::Float(1e-12).finish(), Ok(Value::Float(0.0)));
        assert_eq!(Value::Float(-3e-11).finish(), Ok(Value::Float(0.0)));
        assert_eq!(Value::Float(1.0 / 3.0).finish(), Ok(Value::Float(0.333333)));
        assert_eq!(Value::int(5).finish(), Ok(Value::int(5)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Value::int(4).to_string(), "4");
        assert_eq!(Value::Float(4.0).to_string(), "4.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(0.0).to_string(), "0.0");
        assert_eq!(Value::Float(1e-5).to_string(), "1e-05");
        assert_eq!(Value::Float(1e20).to_string(), "1e+20");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
    }
}
