//! 允许在表达式中出现的名字
//!
//! 白名单是一张静态表：名字 → 常量或函数实现。表里没有的名字一律拒绝，
//! 新增能力必须显式加一行。

use super::value::{MAX_INT_BITS, Value, float_to_int, round_to, too_large};
use crate::error::EvalError;
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::f64::consts;

/// 函数参数个数约束
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(k) => k.to_string(),
            Arity::Range(lo, hi) => format!("{}-{}", lo, hi),
            Arity::AtLeast(lo) => format!("{}+", lo),
        }
    }
}

pub enum Builtin {
    Constant(f64),
    /// 浮点一元函数，定义域错误由 NaN / 溢出检测统一处理
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
    Custom {
        arity: Arity,
        apply: fn(&[Value]) -> Result<Value, EvalError>,
    },
}

static BUILTINS: &[(&str, Builtin)] = &[
    // 常量
    ("pi", Builtin::Constant(consts::PI)),
    ("e", Builtin::Constant(consts::E)),
    ("tau", Builtin::Constant(consts::TAU)),
    ("inf", Builtin::Constant(f64::INFINITY)),
    ("nan", Builtin::Constant(f64::NAN)),
    // 指数与对数
    ("sqrt", Builtin::Unary(f64::sqrt)),
    ("exp", Builtin::Unary(f64::exp)),
    ("expm1", Builtin::Unary(f64::exp_m1)),
    ("log10", Builtin::Unary(f64::log10)),
    ("log2", Builtin::Unary(f64::log2)),
    ("log1p", Builtin::Unary(f64::ln_1p)),
    (
        "log",
        Builtin::Custom {
            arity: Arity::Range(1, 2),
            apply: log,
        },
    ),
    ("pow", Builtin::Binary(f64::powf)),
    // 三角与双曲
    ("sin", Builtin::Unary(f64::sin)),
    ("cos", Builtin::Unary(f64::cos)),
    ("tan", Builtin::Unary(f64::tan)),
    ("asin", Builtin::Unary(f64::asin)),
    ("acos", Builtin::Unary(f64::acos)),
    ("atan", Builtin::Unary(f64::atan)),
    ("atan2", Builtin::Binary(f64::atan2)),
    ("sinh", Builtin::Unary(f64::sinh)),
    ("cosh", Builtin::Unary(f64::cosh)),
    ("tanh", Builtin::Unary(f64::tanh)),
    ("asinh", Builtin::Unary(f64::asinh)),
    ("acosh", Builtin::Unary(f64::acosh)),
    ("atanh", Builtin::Unary(f64::atanh)),
    ("hypot", Builtin::Binary(f64::hypot)),
    ("degrees", Builtin::Unary(f64::to_degrees)),
    ("radians", Builtin::Unary(f64::to_radians)),
    // 数值处理
    ("fabs", Builtin::Unary(f64::abs)),
    ("fmod", Builtin::Binary(fmod)),
    ("copysign", Builtin::Binary(f64::copysign)),
    (
        "floor",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: floor,
        },
    ),
    (
        "ceil",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: ceil,
        },
    ),
    (
        "trunc",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: trunc,
        },
    ),
    (
        "factorial",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: factorial,
        },
    ),
    (
        "gcd",
        Builtin::Custom {
            arity: Arity::AtLeast(0),
            apply: gcd,
        },
    ),
    (
        "isqrt",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: isqrt,
        },
    ),
    (
        "abs",
        Builtin::Custom {
            arity: Arity::Exact(1),
            apply: abs,
        },
    ),
    (
        "round",
        Builtin::Custom {
            arity: Arity::Range(1, 2),
            apply: round,
        },
    ),
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, builtin)| builtin)
}

pub fn is_allowed(name: &str) -> bool {
    lookup(name).is_some()
}

/// 以 `args` 调用名为 `name` 的函数
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let builtin = lookup(name).ok_or_else(|| EvalError::DisallowedName(name.to_string()))?;
    match builtin {
        Builtin::Constant(_) => Err(EvalError::NotCallable(name.to_string())),
        Builtin::Unary(f) => {
            check_arity(name, Arity::Exact(1), args.len())?;
            let x = args[0].to_float()?;
            checked_float(name, &[x], f(x))
        }
        Builtin::Binary(f) => {
            check_arity(name, Arity::Exact(2), args.len())?;
            let (x, y) = (args[0].to_float()?, args[1].to_float()?);
            checked_float(name, &[x, y], f(x, y))
        }
        Builtin::Custom { arity, apply } => {
            check_arity(name, *arity, args.len())?;
            apply(args)
        }
    }
}

/// 以名字取常量值
pub fn constant(name: &str) -> Result<Value, EvalError> {
    match lookup(name) {
        Some(Builtin::Constant(x)) => Ok(Value::Float(*x)),
        Some(_) => Err(EvalError::NotCallable(name.to_string())),
        None => Err(EvalError::DisallowedName(name.to_string())),
    }
}

fn check_arity(name: &str, arity: Arity, got: usize) -> Result<(), EvalError> {
    if arity.accepts(got) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected: arity.describe(),
            got,
        })
    }
}

/// 有限输入得到 NaN 或无穷，视为定义域错误
fn checked_float(name: &str, inputs: &[f64], out: f64) -> Result<Value, EvalError> {
    let finite_inputs = inputs.iter().all(|x| x.is_finite());
    if (out.is_nan() && !inputs.iter().any(|x| x.is_nan())) || (out.is_infinite() && finite_inputs)
    {
        return Err(EvalError::Domain(name.to_string()));
    }
    Ok(Value::Float(out))
}

fn fmod(x: f64, y: f64) -> f64 {
    x % y
}

fn log(args: &[Value]) -> Result<Value, EvalError> {
    let x = args[0].to_float()?;
    if x <= 0.0 {
        return Err(EvalError::Domain("log".to_string()));
    }
    let Some(base) = args.get(1) else {
        return checked_float("log", &[x], x.ln());
    };
    let base = base.to_float()?;
    if base <= 0.0 {
        return Err(EvalError::Domain("log".to_string()));
    }
    if base == 1.0 {
        return Err(EvalError::DivisionByZero);
    }
    checked_float("log", &[x, base], x.ln() / base.ln())
}

fn floor(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.clone())),
        Value::Float(x) => float_to_int("floor", x.floor()),
    }
}

fn ceil(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.clone())),
        Value::Float(x) => float_to_int("ceil", x.ceil()),
    }
}

fn trunc(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.clone())),
        Value::Float(x) => float_to_int("trunc", x.trunc()),
    }
}

fn expect_int<'a>(name: &str, value: &'a Value) -> Result<&'a BigInt, EvalError> {
    match value {
        Value::Int(n) => Ok(n),
        Value::Float(_) => Err(EvalError::Domain(name.to_string())),
    }
}

fn factorial(args: &[Value]) -> Result<Value, EvalError> {
    let n = expect_int("factorial", &args[0])?;
    if n.is_negative() {
        return Err(EvalError::Domain("factorial".to_string()));
    }
    let n = n.to_u64().ok_or_else(too_large)?;
    let mut acc = BigInt::from(1);
    for k in 2..=n {
        acc *= BigInt::from(k);
        if acc.bits() > MAX_INT_BITS {
            return Err(too_large());
        }
    }
    Ok(Value::Int(acc))
}

fn gcd(args: &[Value]) -> Result<Value, EvalError> {
    let mut acc = BigInt::zero();
    for arg in args {
        let mut b = expect_int("gcd", arg)?.abs();
        let mut a = acc;
        while !b.is_zero() {
            let r = &a % &b;
            (a, b) = (b, r);
        }
        acc = a;
    }
    Ok(Value::Int(acc))
}

fn isqrt(args: &[Value]) -> Result<Value, EvalError> {
    let n = expect_int("isqrt", &args[0])?;
    if n.is_negative() {
        return Err(EvalError::Domain("isqrt".to_string()));
    }
    Ok(Value::Int(n.sqrt()))
}

fn abs(args: &[Value]) -> Result<Value, EvalError> {
    Ok(match &args[0] {
        Value::Int(n) => Value::Int(n.abs()),
        Value::Float(x) => Value::Float(x.abs()),
    })
}

fn round(args: &[Value]) -> Result<Value, EvalError> {
    let Some(digits) = args.get(1) else {
        return match &args[0] {
            Value::Int(n) => Ok(Value::Int(n.clone())),
            Value::Float(x) => float_to_int("round", x.round_ties_even()),
        };
    };
    let digits = expect_int("round", digits)?;
    match &args[0] {
        Value::Int(n) if !digits.is_negative() => Ok(Value::Int(n.clone())),
        value => {
            let digits = digits
                .to_i32()
                .ok_or_else(|| EvalError::Domain("round".to_string()))?;
            Ok(Value::Float(round_to(value.to_float()?, digits)))
        }
    }
}
