use clap::Parser;
use eh_assistant::prelude::{AppConfig, Assistant, Outcome};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// E.H: asistente conversacional por reglas
#[derive(Debug, Parser)]
#[command(name = "eh", version)]
struct Args {
    /// Archivo de configuración YAML
    #[arg(short, long, env = "EH_CONFIG")]
    config: Option<PathBuf>,

    /// Ruta del archivo de memoria
    #[arg(short, long)]
    memory: Option<PathBuf>,

    /// No guardar la memoria en disco
    #[arg(long)]
    no_persist: bool,

    /// Activa el modo GPT (requiere OPENAI_API_KEY)
    #[arg(long)]
    gpt: bool,

    /// Registro detallado (debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> eh_assistant::error::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.verbose {
        "eh_assistant=debug"
    } else {
        "eh_assistant=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();
    if let Some(path) = args.memory {
        config.memory_path = path;
    }
    if args.no_persist {
        config.persist = false;
    }
    if args.gpt {
        config.gpt.enabled = true;
    }
    config.validate()?;

    let mut assistant = Assistant::from_config(&config)?;
    println!(
        "[{}] Iniciado. Modo GPT={}",
        config.name,
        if assistant.gpt_enabled() { "ON" } else { "OFF" }
    );
    println!("Escribe 'salir' para terminar. Usa 'ayuda' para ver comandos básicos.");

    let mut editor = DefaultEditor::new()
        .map_err(|e| eh_assistant::error::AssistantError::Other(e.to_string()))?;

    loop {
        let line = match editor.readline("Tú: ") {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("\nAdiós.");
                break;
            }
            Err(e) => {
                tracing::error!(error = %e, "读取输入失败");
                println!("\nAdiós.");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            tracing::debug!(error = %e, "写入输入历史失败");
        }

        match assistant.handle(&line).await {
            Outcome::Exit => {
                println!("Adiós, sesión terminada.");
                break;
            }
            Outcome::Reply(reply) => println!("{}: {}", config.name, reply),
        }
    }

    Ok(())
}
