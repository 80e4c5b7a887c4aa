//! 对话历史
//!
//! 与滑动窗口不同，这里是批量裁剪：长度超过 [`HISTORY_CAP`] 时一次性丢掉最早的
//! [`HISTORY_TRIM`] 条。

use chrono::{DateTime, Local};

/// 历史长度上限
pub const HISTORY_CAP: usize = 50;
/// 超限时一次丢弃的条数
pub const HISTORY_TRIM: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// 一轮发言
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    turns: Vec<ConversationTurn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(ConversationTurn {
            speaker,
            text: text.into(),
            at: Local::now(),
        });
        if self.turns.len() > HISTORY_CAP {
            self.turns.drain(..HISTORY_TRIM);
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
