use std::fmt;

/// E.H 助手的统一错误类型
#[derive(Debug)]
pub enum AssistantError {
    /// LLM 相关错误
    Llm(LlmError),
    /// 表达式求值错误
    Eval(EvalError),
    /// 记忆存储错误
    Memory(MemoryError),
    /// 配置错误
    Config(ConfigError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// LLM 相关错误
#[derive(Debug)]
pub enum LlmError {
    /// 网络请求失败
    NetworkError(String),
    /// API 返回错误状态码
    ApiError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
    /// 没有返回内容
    EmptyResponse,
    /// 未配置 API Key
    MissingApiKey,
}

/// 表达式求值错误
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// 引用了白名单之外的名字
    DisallowedName(String),
    /// 无法识别的字符
    UnexpectedChar(char),
    /// 语法错误
    Syntax(String),
    /// 除零
    DivisionByZero,
    /// 数学定义域错误（如 sqrt(-1)）
    Domain(String),
    /// 函数参数个数不符
    Arity { name: String, expected: String, got: usize },
    /// 常量被当作函数调用，或函数未被调用
    NotCallable(String),
}

/// 记忆存储错误
#[derive(Debug)]
pub enum MemoryError {
    /// 文件读写失败
    IoError(String),
    /// 序列化/反序列化失败
    SerializationError(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

impl fmt::Display for AssistantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssistantError::Llm(e) => write!(f, "LLM Error: {}", e),
            AssistantError::Eval(e) => write!(f, "Eval Error: {}", e),
            AssistantError::Memory(e) => write!(f, "Memory Error: {}", e),
            AssistantError::Config(e) => write!(f, "Config Error: {}", e),
            AssistantError::Io(e) => write!(f, "IO Error: {}", e),
            AssistantError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LlmError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::EmptyResponse => write!(f, "Empty response from LLM"),
            LlmError::MissingApiKey => write!(f, "No API key configured"),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DisallowedName(name) => write!(f, "Name '{}' is not allowed", name),
            EvalError::UnexpectedChar(c) => write!(f, "Unexpected character '{}'", c),
            EvalError::Syntax(msg) => write!(f, "Syntax error: {}", msg),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::Domain(name) => write!(f, "Math domain error in '{}'", name),
            EvalError::Arity {
                name,
                expected,
                got,
            } => write!(f, "'{}' expects {} argument(s), got {}", name, expected, got),
            EvalError::NotCallable(name) => write!(f, "'{}' cannot be used here", name),
        }
    }
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::IoError(msg) => write!(f, "IO error: {}", msg),
            MemoryError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for AssistantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssistantError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for LlmError {}
impl std::error::Error for EvalError {}
impl std::error::Error for MemoryError {}
impl std::error::Error for ConfigError {}

// From 转换实现
impl From<std::io::Error> for AssistantError {
    fn from(err: std::io::Error) -> Self {
        AssistantError::Io(err)
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AssistantError::Llm(LlmError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            AssistantError::Llm(LlmError::NetworkError(format!(
                "Connection failed: {}",
                err
            )))
        } else {
            AssistantError::Llm(LlmError::NetworkError(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        AssistantError::Memory(MemoryError::SerializationError(err.to_string()))
    }
}

impl From<serde_yaml::Error> for AssistantError {
    fn from(err: serde_yaml::Error) -> Self {
        AssistantError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<LlmError> for AssistantError {
    fn from(err: LlmError) -> Self {
        AssistantError::Llm(err)
    }
}

impl From<EvalError> for AssistantError {
    fn from(err: EvalError) -> Self {
        AssistantError::Eval(err)
    }
}

impl From<MemoryError> for AssistantError {
    fn from(err: MemoryError) -> Self {
        AssistantError::Memory(err)
    }
}

impl From<ConfigError> for AssistantError {
    fn from(err: ConfigError) -> Self {
        AssistantError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, AssistantError>;
