//! 运行配置
//!
//! 加载顺序：默认值 → YAML 配置文件（可选）→ 环境变量（含 `.env`）→ 命令行参数。
//!
//! ```yaml
//! name: "E.H"
//! display_name: "E.H (Esteban Hernandez)"
//! memory_path: "~/.eh/eh_memory.json"
//! persist: true
//! gpt:
//!   enabled: false
//!   model: gpt-4o-mini
//!   timeout_secs: 30
//! ```
//!
//! 识别的环境变量：
//! ```text
//! EH_USE_GPT=1            # 1 / true / True 开启 GPT 模式
//! OPENAI_API_KEY=sk-...
//! EH_MODEL=gpt-4o-mini
//! EH_BASE_URL=https://api.openai.com/v1/chat/completions
//! EH_MEMORY_FILE=eh_memory.json
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// 提示符前缀里的短名
    pub name: String,
    /// 回复中自称的全名
    pub display_name: String,
    pub memory_path: PathBuf,
    /// false 时记忆只保存在内存
    pub persist: bool,
    pub gpt: GptConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "E.H".to_string(),
            display_name: "E.H (Esteban Hernandez)".to_string(),
            memory_path: PathBuf::from("eh_memory.json"),
            persist: true,
            gpt: GptConfig::default(),
        }
    }
}

/// 外部 LLM（OpenAI 兼容接口）配置
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GptConfig {
    pub enabled: bool,
    pub model: String,
    /// Chat Completions 接口完整 URL
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            timeout_secs: 30,
            max_tokens: 500,
            temperature: 0.6,
        }
    }
}

impl GptConfig {
    /// 开关打开且有 API Key 时才真正启用
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let config: AppConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// 用进程环境变量覆盖
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    pub fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(flag) = var("EH_USE_GPT") {
            self.gpt.enabled = matches!(flag.as_str(), "1" | "true" | "True");
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.gpt.api_key = Some(key);
        }
        if let Some(model) = var("EH_MODEL").filter(|m| !m.is_empty()) {
            self.gpt.model = model;
        }
        if let Some(url) = var("EH_BASE_URL").filter(|u| !u.is_empty()) {
            self.gpt.base_url = url;
        }
        if let Some(path) = var("EH_MEMORY_FILE").filter(|p| !p.is_empty()) {
            self.memory_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "name".to_string(),
                message: "must not be empty".to_string(),
            }
            .into());
        }
        if self.gpt.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gpt.timeout_secs".to_string(),
                message: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.name, "E.H");
        assert_eq!(config.memory_path, PathBuf::from("eh_memory.json"));
        assert!(!config.gpt.is_active());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str(
            "display_name: Asistente\ngpt:\n  enabled: true\n  timeout_secs: 5\n",
        )
        .unwrap();
        assert_eq!(config.display_name, "Asistente");
        assert_eq!(config.name, "E.H");
        assert!(config.gpt.enabled);
        assert_eq!(config.gpt.timeout_secs, 5);
        assert_eq!(config.gpt.model, "gpt-4o-mini");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("EH_USE_GPT", "True"),
            ("OPENAI_API_KEY", "sk-test"),
            ("EH_MODEL", "gpt-4o"),
            ("EH_MEMORY_FILE", "/tmp/eh.json"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert!(config.gpt.is_active());
        assert_eq!(config.gpt.model, "gpt-4o");
        assert_eq!(config.memory_path, PathBuf::from("/tmp/eh.json"));
    }

    #[test]
    fn test_gpt_gate_needs_key() {
        let mut config = AppConfig::default();
        config.apply_vars(|k| (k == "EH_USE_GPT").then(|| "1".to_string()));
        assert!(config.gpt.enabled);
        assert!(!config.gpt.is_active());

        config.apply_vars(|k| (k == "EH_USE_GPT").then(|| "yes".to_string()));
        assert!(!config.gpt.enabled);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = AppConfig::default();
        config.gpt.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
