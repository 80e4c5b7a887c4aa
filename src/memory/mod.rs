//! 记忆系统
//!
//! | 部分 | 实现 | 生命周期 |
//! |------|------|----------|
//! | 对话历史 | [`History`] | 进程内，超过 50 条批量裁剪 |
//! | 用户档案 | [`UserProfile`] | 进程内 |
//! | 笔记 / 偏好 | [`MemoryDocument`] | 可选 JSON 文件，每次修改整文件重写 |
//!
//! ```rust,no_run
//! use eh_assistant::memory::MemoryStore;
//!
//! let mut memory = MemoryStore::open("~/.eh/eh_memory.json");
//! memory.set_note("note_1", "comprar pan");
//! memory.set_pref("user_name", "Ana");
//! assert_eq!(memory.known_name(), Some("Ana"));
//! ```

pub mod history;
pub mod store;

pub use history::{ConversationTurn, HISTORY_CAP, HISTORY_TRIM, History, Speaker};
pub use store::{MemoryDocument, MemoryStore, Note, USER_NAME_PREF, UserProfile};
