//! 助手主体：把命令解析、意图识别、回复生成、记忆和可选的 LLM 串起来。
//!
//! ```rust
//! use eh_assistant::assistant::Assistant;
//! use eh_assistant::memory::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut eh = Assistant::new("E.H", MemoryStore::in_memory());
//! eh.respond("me llamo Ana").await;
//! assert_eq!(eh.respond("hola").await, "Hola Ana, soy E.H. ¿En qué te ayudo?");
//! assert_eq!(eh.respond("2+2").await, "4");
//! # }
//! ```

use crate::commands::Command;
use crate::config::AppConfig;
use crate::error::Result;
use crate::eval::evaluate;
use crate::intent::{Intent, classify, extract_name};
use crate::llm::{LlmClient, OpenAiClient};
use crate::memory::{MemoryStore, Speaker, USER_NAME_PREF};
use crate::responder::{generate, local_fallback};
use chrono::{Local, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 一行输入的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reply(String),
    Exit,
}

pub struct Assistant {
    name: String,
    memory: MemoryStore,
    llm: Option<Arc<dyn LlmClient>>,
}

impl Assistant {
    pub fn new(name: impl Into<String>, memory: MemoryStore) -> Self {
        Self {
            name: name.into(),
            memory,
            llm: None,
        }
    }

    /// 开启 GPT 模式：自由输入先交给 LLM
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let memory = if config.persist {
            MemoryStore::open(&config.memory_path)
        } else {
            MemoryStore::in_memory()
        };
        let mut assistant = Self::new(config.display_name.clone(), memory);
        if config.gpt.is_active() {
            assistant = assistant.with_llm(Arc::new(OpenAiClient::new(config.gpt.clone())?));
        } else if config.gpt.enabled {
            warn!("GPT 模式已开启但没有 OPENAI_API_KEY，使用本地规则回复");
        }
        info!(
            name = %config.name,
            gpt = assistant.gpt_enabled(),
            persist = config.persist,
            "🤖 助手已启动"
        );
        Ok(assistant)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn gpt_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// 处理一行输入：先匹配快捷命令，否则走对话流程
    pub async fn handle(&mut self, line: &str) -> Outcome {
        match Command::parse(line) {
            Some(Command::Exit) => Outcome::Exit,
            Some(command) => Outcome::Reply(self.run_command(command)),
            None => Outcome::Reply(self.respond(line).await),
        }
    }

    /// 对话流程：记录输入 → 提取名字 → 识别意图 → 生成回复 → 记录回复
    pub async fn respond(&mut self, text: &str) -> String {
        self.memory.record_turn(Speaker::User, text);
        if let Some(name) = extract_name(text) {
            self.memory.set_name(name);
        }

        let intent = classify(text);
        debug!(intent = %intent, "意图识别");

        let reply = match (intent, self.llm.clone()) {
            (Intent::Free, Some(llm)) => match llm.complete(&self.system_prompt(), text).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(error = %e, "GPT 调用失败，回退到本地回复");
                    local_fallback(&self.memory)
                }
            },
            _ => generate(intent, text, &self.memory, &self.name, Local::now()),
        };

        self.memory.record_turn(Speaker::Assistant, reply.clone());
        reply
    }

    pub fn run_command(&mut self, command: Command) -> String {
        debug!(command = ?command, "执行快捷命令");
        match command {
            Command::Exit => "Adiós, sesión terminada.".to_string(),
            Command::SetName(name) => {
                self.memory.set_pref(USER_NAME_PREF, name.clone());
                format!("Listo, te llamaré {name} a partir de ahora.")
            }
            Command::Remember(text) => {
                if text.is_empty() {
                    return "La nota está vacía. Uso: recordar: <texto>".to_string();
                }
                let key = format!("note_{}", Utc::now().timestamp());
                self.memory.set_note(key.clone(), text);
                format!("He guardado tu nota con id '{key}'.")
            }
            Command::ShowNote(key) => match self.memory.note(&key) {
                Some(note) => serde_json::to_string_pretty(note).unwrap_or_default(),
                None => "No encontré esa nota.".to_string(),
            },
            Command::DeleteNote(key) => {
                if self.memory.delete_note(&key) {
                    format!("Nota '{key}' eliminada.")
                } else {
                    "No encontré esa nota.".to_string()
                }
            }
            Command::SavePref(Some((key, value))) => {
                self.memory.set_pref(key.clone(), value);
                format!("Preferencia '{key}' guardada.")
            }
            Command::SavePref(None) => {
                "Formato inválido. Uso: guardar pref <clave>=<valor>".to_string()
            }
            Command::ListNotes => self.list_notes(),
            Command::Calc(expr) => evaluate(&expr),
        }
    }

    fn list_notes(&self) -> String {
        let notes = self.memory.notes();
        if notes.is_empty() {
            return "No tienes notas guardadas.".to_string();
        }
        notes
            .iter()
            .map(|(key, note)| {
                let ts = note
                    .created_at_local()
                    .filter(|_| note.created_at > 0.0)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                format!("{key} ({ts}): {}", note.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn system_prompt(&self) -> String {
        format!(
            "Eres {}, un asistente útil y conciso. Responde en el idioma del usuario (español). \
             Si el usuario pide guardar una nota, explica cómo usar 'recordar: <texto>'.",
            self.name
        )
    }
}
