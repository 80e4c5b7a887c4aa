//! 记忆存储
//!
//! [`MemoryStore`] 是一个聚合：用户档案、对话历史、笔记和偏好。
//! 其中只有笔记和偏好会落盘，格式：
//!
//! ```json
//! {
//!   "notes": { "note_1718000000": { "text": "comprar pan", "ts": 1718000000.25 } },
//!   "prefs": { "user_name": "Ana" }
//! }
//! ```
//!
//! 每次修改笔记或偏好都整文件重写；读取失败时从空状态开始，写入失败只记日志。

use super::history::{ConversationTurn, History, Speaker};
use crate::error::{MemoryError, Result};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 偏好中保存用户名的键
pub const USER_NAME_PREF: &str = "user_name";

/// 一条笔记
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    /// 创建时间（Unix 秒，带小数）
    #[serde(rename = "ts", default)]
    pub created_at: f64,
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: now_secs(),
        }
    }

    pub fn created_at_local(&self) -> Option<DateTime<Local>> {
        let secs = self.created_at.trunc() as i64;
        let nanos = (self.created_at.fract() * 1e9) as u32;
        Local.timestamp_opt(secs, nanos).single()
    }
}

/// 落盘的文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub notes: BTreeMap<String, Note>,
    #[serde(default)]
    pub prefs: BTreeMap<String, String>,
}

/// 用户档案，只在进程内存活
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub detected_name: Option<String>,
}

pub struct MemoryStore {
    path: Option<PathBuf>,
    profile: UserProfile,
    history: History,
    document: MemoryDocument,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl MemoryStore {
    /// 纯内存存储，不落盘
    pub fn in_memory() -> Self {
        Self {
            path: None,
            profile: UserProfile::default(),
            history: History::new(),
            document: MemoryDocument::default(),
        }
    }

    /// 打开文件存储；文件不存在或无法解析时从空状态开始，不会失败
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = expand_tilde(path.as_ref());
        let document = match load_document(&path) {
            Ok(Some(doc)) => doc,
            Ok(None) => MemoryDocument::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "记忆文件无法读取，从空记忆开始");
                MemoryDocument::default()
            }
        };
        info!(
            path = %path.display(),
            notes = document.notes.len(),
            prefs = document.prefs.len(),
            "🗄️ MemoryStore 初始化"
        );
        Self {
            path: Some(path),
            profile: UserProfile::default(),
            history: History::new(),
            document,
        }
    }

    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    // ── 历史 ─────────────────────────────────────────────────────────────────

    pub fn record_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.history.push(speaker, text);
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.history.turns()
    }

    // ── 用户档案 ─────────────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        debug!(name = %name, "识别到用户名");
        self.profile.detected_name = Some(name);
    }

    pub fn name(&self) -> Option<&str> {
        self.profile.detected_name.as_deref()
    }

    /// 对话中识别到的名字优先，其次是 `setname` 保存的偏好
    pub fn known_name(&self) -> Option<&str> {
        self.name().or_else(|| self.pref(USER_NAME_PREF))
    }

    // ── 笔记 ─────────────────────────────────────────────────────────────────

    pub fn set_note(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.document.notes.insert(key.into(), Note::new(text));
        self.persist();
    }

    pub fn note(&self, key: &str) -> Option<&Note> {
        self.document.notes.get(key)
    }

    pub fn delete_note(&mut self, key: &str) -> bool {
        let found = self.document.notes.remove(key).is_some();
        if found {
            self.persist();
        }
        found
    }

    pub fn notes(&self) -> &BTreeMap<String, Note> {
        &self.document.notes
    }

    // ── 偏好 ─────────────────────────────────────────────────────────────────

    pub fn set_pref(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.document.prefs.insert(key.into(), value.into());
        self.persist();
    }

    pub fn pref(&self, key: &str) -> Option<&str> {
        self.document.prefs.get(key).map(String::as_str)
    }

    pub fn pref_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.pref(key).unwrap_or(default)
    }

    // ── 持久化 ───────────────────────────────────────────────────────────────

    /// 整文件重写；内存存储时什么都不做
    pub fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| MemoryError::IoError(format!("创建目录失败: {e}")))?;
        }
        let json = serde_json::to_string_pretty(&self.document)
            .map_err(|e| MemoryError::SerializationError(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| MemoryError::IoError(format!("写入记忆文件失败: {e}")))?;
        debug!(path = %path.display(), "💾 记忆已持久化");
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            error!(error = %e, "保存记忆失败");
        }
    }
}

fn load_document(path: &Path) -> Result<Option<MemoryDocument>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MemoryError::IoError(format!("读取记忆文件失败: {e}")))?;
    let document = serde_json::from_str(&raw)?;
    Ok(Some(document))
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/")
        && let Some(home) = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(&s[2..]);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_note_lifecycle() {
        let mut store = MemoryStore::in_memory();
        store.set_note("k", "hello");
        let note = store.note("k").unwrap();
        assert_eq!(note.text, "hello");
        assert!(note.created_at > 0.0);
        assert!(note.created_at_local().is_some());

        assert!(store.delete_note("k"));
        assert!(store.note("k").is_none());
        assert!(!store.delete_note("k"));
    }

    #[test]
    fn test_prefs_last_write_wins() {
        let mut store = MemoryStore::in_memory();
        assert_eq!(store.pref_or("tema", "claro"), "claro");
        store.set_pref("tema", "oscuro");
        store.set_pref("tema", "azul");
        assert_eq!(store.pref("tema"), Some("azul"));
    }

    #[test]
    fn test_known_name_prefers_detected() {
        let mut store = MemoryStore::in_memory();
        assert_eq!(store.known_name(), None);
        store.set_pref(USER_NAME_PREF, "Ana");
        assert_eq!(store.known_name(), Some("Ana"));
        store.set_name("Luis");
        assert_eq!(store.known_name(), Some("Luis"));
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("eh_memory.json");

        let mut store = MemoryStore::open(&path);
        store.set_note("note_1", "comprar pan");
        store.set_note("note_2", "llamar a mamá");
        store.set_pref("user_name", "Ana");
        store.delete_note("note_2");

        let reloaded = MemoryStore::open(&path);
        assert_eq!(reloaded.document(), store.document());
        assert_eq!(reloaded.notes().len(), 1);
        assert_eq!(reloaded.pref("user_name"), Some("Ana"));
    }

    #[test]
    fn test_file_format_uses_ts_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eh_memory.json");
        let mut store = MemoryStore::open(&path);
        store.set_note("k", "v");

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["notes"]["k"]["text"], "v");
        assert!(raw["notes"]["k"]["ts"].is_number());
        assert!(raw["prefs"].is_object());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eh_memory.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = MemoryStore::open(&path);
        assert!(store.notes().is_empty());
        assert!(store.document().prefs.is_empty());
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eh_memory.json");
        std::fs::write(&path, r#"{"prefs": {"user_name": "Ana"}}"#).unwrap();

        let store = MemoryStore::open(&path);
        assert!(store.notes().is_empty());
        assert_eq!(store.pref("user_name"), Some("Ana"));
    }

    #[test]
    fn test_write_failure_does_not_panic() {
        let dir = tempdir().unwrap();
        // 目录本身当作文件路径，写入必然失败
        let mut store = MemoryStore::open(dir.path());
        store.set_pref("k", "v");
        assert_eq!(store.pref("k"), Some("v"));
        assert!(store.flush().is_err());
    }
}
