//! 意图识别
//!
//! 纯关键词 / 正则匹配，按固定优先级检查，第一个命中的意图胜出。
//! 不依赖记忆状态；姓名提取是独立的一步，见 [`extract_name`]。

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// 识别出的意图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// 打招呼
    Greeting,
    /// 询问助手身份
    Identity,
    /// 询问时间
    Time,
    /// 询问日期
    Date,
    /// 用自然语言请求计算（"calcula 2+2"）
    CalculationRequest,
    /// 整句就是一个算式（"2+2"）
    DirectCalculation,
    /// 自我介绍
    Introduction,
    /// 请求帮助
    Help,
    /// 道谢
    Thanks,
    /// 以上都不是
    Free,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Greeting => "saludo",
            Intent::Identity => "identidad",
            Intent::Time => "hora",
            Intent::Date => "fecha",
            Intent::CalculationRequest => "calculo_texto",
            Intent::DirectCalculation => "calculo_directo",
            Intent::Introduction => "presentacion",
            Intent::Help => "ayuda",
            Intent::Thanks => "gracias",
            Intent::Free => "libre",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

const GREETING_KEYWORDS: &[&str] = &["hola", "buenas", "hey", "buenos dias", "buenos días"];
const IDENTITY_KEYWORDS: &[&str] = &[
    "tu nombre",
    "quien eres",
    "quién eres",
    "cómo te llamas",
    "como te llamas",
];
const TIME_KEYWORDS: &[&str] = &["hora"];
const DATE_KEYWORDS: &[&str] = &["fecha", "dia", "día"];
const CALCULATION_KEYWORDS: &[&str] = &["calcul", "resuelve", "opera"];
const INTRODUCTION_KEYWORDS: &[&str] = &["me llamo", "mi nombre es", "soy "];
const HELP_KEYWORDS: &[&str] = &["ayuda", "qué puedes hacer", "que puedes hacer"];
const THANKS_KEYWORDS: &[&str] = &["gracias"];

/// 只含数字、运算符、括号、小数点和空白的整句
static ARITHMETIC_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9+\-*/().%\s^]+$").expect("Invalid regex: arithmetic-only pattern")
});

/// 句中第一段算式字符
static ARITHMETIC_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9+\-*/().%\s^]+").expect("Invalid regex: arithmetic span pattern")
});

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:soy|me llamo|mi nombre es)\s+([A-Za-zÁÉÍÓÚáéíóúÑñ]+)")
        .expect("Invalid regex: self-introduction pattern")
});

/// 对原始输入做意图识别
pub fn classify(text: &str) -> Intent {
    let t = text.trim().to_lowercase();

    if contains_any(&t, GREETING_KEYWORDS) {
        Intent::Greeting
    } else if contains_any(&t, IDENTITY_KEYWORDS) {
        Intent::Identity
    } else if contains_any(&t, TIME_KEYWORDS) {
        Intent::Time
    } else if contains_any(&t, DATE_KEYWORDS) {
        Intent::Date
    } else if contains_any(&t, CALCULATION_KEYWORDS) {
        Intent::CalculationRequest
    } else if is_arithmetic(&t) {
        Intent::DirectCalculation
    } else if contains_any(&t, INTRODUCTION_KEYWORDS) {
        Intent::Introduction
    } else if contains_any(&t, HELP_KEYWORDS) {
        Intent::Help
    } else if contains_any(&t, THANKS_KEYWORDS) {
        Intent::Thanks
    } else {
        Intent::Free
    }
}

/// 整句（逗号视为小数点）是否完全由算式字符组成
pub fn is_arithmetic(text: &str) -> bool {
    ARITHMETIC_ONLY.is_match(&text.trim().replace(',', "."))
}

/// 取句中第一段含数字的算式片段，如 "calcula 2+2*3 por favor" → "2+2*3"
pub fn extract_expression(text: &str) -> Option<&str> {
    ARITHMETIC_SPAN
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|s| s.chars().any(|c| c.is_ascii_digit()))
}

/// 从 "soy X" / "me llamo X" / "mi nombre es X" 中提取名字
pub fn extract_name(text: &str) -> Option<String> {
    NAME_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
