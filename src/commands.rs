//! 会话层的快捷命令
//!
//! 在意图识别之前匹配，前缀不区分大小写：
//!
//! | 输入 | 命令 |
//! |------|------|
//! | `salir` / `exit` / `quit` | [`Command::Exit`] |
//! | `setname <nombre>` | [`Command::SetName`] |
//! | `recordar: <texto>` | [`Command::Remember`] |
//! | `nota <id>` | [`Command::ShowNote`] |
//! | `borrar nota <id>` | [`Command::DeleteNote`] |
//! | `guardar pref <k>=<v>` | [`Command::SavePref`] |
//! | `mis notas` / `listar notas` | [`Command::ListNotes`] |
//! | `calc <expr>` | [`Command::Calc`] |
//!
//! `calcular …` 不是命令：它属于计算请求意图，由 [`crate::intent`] 抽取算式。

const EXIT_KEYWORDS: &[&str] = &["salir", "exit", "quit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    SetName(String),
    Remember(String),
    ShowNote(String),
    DeleteNote(String),
    /// `None` 表示格式不对（缺少 `=` 或键为空）
    SavePref(Option<(String, String)>),
    ListNotes,
    Calc(String),
}

impl Command {
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim();
        let lower = input.to_lowercase();

        if is_exit_keyword(input) {
            return Some(Command::Exit);
        }
        if lower == "mis notas" || lower == "listar notas" {
            return Some(Command::ListNotes);
        }
        if let Some(rest) = strip_prefix_ci(input, "setname ") {
            return non_empty(rest).map(Command::SetName);
        }
        if let Some(rest) = strip_prefix_ci(input, "recordar:") {
            return Some(Command::Remember(rest.trim().to_string()));
        }
        if let Some(rest) = strip_prefix_ci(input, "borrar nota ") {
            return non_empty(rest).map(Command::DeleteNote);
        }
        if let Some(rest) = strip_prefix_ci(input, "nota ") {
            return non_empty(rest).map(Command::ShowNote);
        }
        if let Some(rest) = strip_prefix_ci(input, "guardar pref ") {
            return Some(Command::SavePref(parse_pref(rest)));
        }
        if let Some(rest) = strip_prefix_ci(input, "calc ") {
            return non_empty(rest).map(Command::Calc);
        }
        None
    }
}

pub fn is_exit_keyword(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    EXIT_KEYWORDS.contains(&lower.as_str())
}

fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    input
        .get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .map(|_| &input[prefix.len()..])
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_pref(rest: &str) -> Option<(String, String)> {
    let (key, value) = rest.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_keywords() {
        for input in ["salir", "EXIT", " Quit "] {
            assert_eq!(Command::parse(input), Some(Command::Exit));
        }
        assert!(!is_exit_keyword("salir ya"));
    }

    #[test]
    fn test_note_commands() {
        assert_eq!(
            Command::parse("recordar: comprar pan"),
            Some(Command::Remember("comprar pan".to_string()))
        );
        assert_eq!(
            Command::parse("Nota note_17"),
            Some(Command::ShowNote("note_17".to_string()))
        );
        assert_eq!(
            Command::parse("borrar nota note_17"),
            Some(Command::DeleteNote("note_17".to_string()))
        );
        assert_eq!(Command::parse("mis notas"), Some(Command::ListNotes));
        assert_eq!(Command::parse("Listar Notas"), Some(Command::ListNotes));
        assert_eq!(Command::parse("nota "), None);
    }

    #[test]
    fn test_pref_and_name_commands() {
        assert_eq!(
            Command::parse("guardar pref tema = oscuro"),
            Some(Command::SavePref(Some((
                "tema".to_string(),
                "oscuro".to_string()
            ))))
        );
        assert_eq!(
            Command::parse("guardar pref tema"),
            Some(Command::SavePref(None))
        );
        assert_eq!(
            Command::parse("setname Ana María"),
            Some(Command::SetName("Ana María".to_string()))
        );
    }

    #[test]
    fn test_calc_commands() {
        assert_eq!(
            Command::parse("calc sqrt(16)"),
            Some(Command::Calc("sqrt(16)".to_string()))
        );
        // "calcula" / "calcular" 不是命令，交给意图识别
        assert_eq!(Command::parse("calcula 2+2"), None);
        assert_eq!(Command::parse("calcular 2+2 por favor"), None);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hola"), None);
        assert_eq!(Command::parse("¿qué hora es?"), None);
    }
}
