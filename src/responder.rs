//! 按意图生成回复文本（模板替换）

use crate::eval::evaluate;
use crate::intent::{Intent, extract_expression};
use crate::memory::MemoryStore;
use chrono::{DateTime, Local};

pub const HELP_TEXT: &str = "Puedo decirte la hora y la fecha, calcular expresiones (2+2*3 o calc <expr>), \
guardar notas (recordar: <texto>), mostrarlas (mis notas, nota <id>, borrar nota <id>) \
y gestionar preferencias (guardar pref <clave>=<valor>, setname <nombre>).";

pub const THANKS_TEXT: &str = "De nada, siempre aquí para ayudar.";

/// 生成回复。`now` 由调用方传入，时间与日期意图都基于它。
pub fn generate(
    intent: Intent,
    text: &str,
    memory: &MemoryStore,
    assistant_name: &str,
    now: DateTime<Local>,
) -> String {
    let name = memory.known_name();
    match intent {
        Intent::Greeting => match name {
            Some(name) => format!("Hola {name}, soy {assistant_name}. ¿En qué te ayudo?"),
            None => format!("Hola, soy {assistant_name}. ¿Cómo te llamas y en qué te ayudo?"),
        },
        Intent::Identity => format!(
            "Soy {assistant_name}. Puedo decirte la hora/fecha y ayudarte con cálculos básicos."
        ),
        Intent::Time => format!("La hora actual es {}.", now.format("%H:%M:%S")),
        Intent::Date => format!("La fecha de hoy es {}.", now.format("%Y-%m-%d")),
        Intent::CalculationRequest => match extract_expression(text) {
            Some(expr) => evaluate(expr),
            None => "Indica la operación. Ejemplo: 2+2*3".to_string(),
        },
        Intent::DirectCalculation => evaluate(text),
        Intent::Introduction => match name {
            Some(name) => format!("Encantado, {name}. ¿Qué necesitas hoy?"),
            None => "Encantado. ¿Qué necesitas hoy?".to_string(),
        },
        Intent::Help => HELP_TEXT.to_string(),
        Intent::Thanks => THANKS_TEXT.to_string(),
        Intent::Free => local_fallback(memory),
    }
}

/// 自由输入的本地回复，GPT 模式失败时也用它
pub fn local_fallback(memory: &MemoryStore) -> String {
    match memory.known_name() {
        Some(name) => format!("Te escucho, {name}. Puedes pedirme hora, fecha o un cálculo."),
        None => "Te escucho. Puedes pedirme hora, fecha o un cálculo.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::FAILED_MESSAGE;
    use chrono::TimeZone;

    const NAME: &str = "E.H (Esteban Hernandez)";

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 3).single().unwrap()
    }

    fn reply(intent: Intent, text: &str, memory: &MemoryStore) -> String {
        generate(intent, text, memory, NAME, fixed_now())
    }

    #[test]
    fn test_greeting_with_and_without_name() {
        let mut memory = MemoryStore::in_memory();
        assert_eq!(
            reply(Intent::Greeting, "hola", &memory),
            "Hola, soy E.H (Esteban Hernandez). ¿Cómo te llamas y en qué te ayudo?"
        );
        memory.set_name("Ana");
        assert_eq!(
            reply(Intent::Greeting, "hola", &memory),
            "Hola Ana, soy E.H (Esteban Hernandez). ¿En qué te ayudo?"
        );
    }

    #[test]
    fn test_time_and_date_format() {
        let memory = MemoryStore::in_memory();
        assert_eq!(reply(Intent::Time, "hora", &memory), "La hora actual es 07:05:03.");
        assert_eq!(
            reply(Intent::Date, "fecha", &memory),
            "La fecha de hoy es 2024-03-09."
        );
    }

    #[test]
    fn test_calculation_intents() {
        let memory = MemoryStore::in_memory();
        assert_eq!(
            reply(Intent::CalculationRequest, "calcula 2+2*3 por favor", &memory),
            "8"
        );
        assert_eq!(
            reply(Intent::CalculationRequest, "calcula algo", &memory),
            "Indica la operación. Ejemplo: 2+2*3"
        );
        assert_eq!(reply(Intent::DirectCalculation, "10/4", &memory), "2.5");
        assert_eq!(reply(Intent::DirectCalculation, "1/0", &memory), FAILED_MESSAGE);
    }

    #[test]
    fn test_introduction_and_free() {
        let mut memory = MemoryStore::in_memory();
        assert_eq!(
            reply(Intent::Introduction, "soy ", &memory),
            "Encantado. ¿Qué necesitas hoy?"
        );
        assert_eq!(
            reply(Intent::Free, "algo", &memory),
            "Te escucho. Puedes pedirme hora, fecha o un cálculo."
        );
        memory.set_name("Luis");
        assert_eq!(
            reply(Intent::Introduction, "me llamo Luis", &memory),
            "Encantado, Luis. ¿Qué necesitas hoy?"
        );
        assert_eq!(
            reply(Intent::Free, "algo", &memory),
            "Te escucho, Luis. Puedes pedirme hora, fecha o un cálculo."
        );
    }

    #[test]
    fn test_identity_mentions_capabilities() {
        let memory = MemoryStore::in_memory();
        let text = reply(Intent::Identity, "quién eres", &memory);
        assert!(text.starts_with("Soy E.H (Esteban Hernandez)."));
        assert!(text.contains("hora/fecha"));
    }
}
