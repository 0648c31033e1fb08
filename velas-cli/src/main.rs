mod display;
mod interactive;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use velas_core::config::{load_config, save_config, VelasConfig};
use velas_core::score::ScoreInputs;
use velas_core::session::AlertSession;

use crate::display::{display_config, display_report, display_table};

#[derive(Parser)]
#[command(name = "velas", about = "Analisador de velas: dígitos faltantes, Resultado R e alertas")]
struct Cli {
    /// Arquivo de configuração (JSON)
    #[arg(short, long, global = true, default_value = "velas.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analisar um bloco rodada / vela / horário (arquivo ou entrada padrão)
    Analyze {
        /// Arquivo com as 3 linhas (padrão: entrada padrão)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        calc: CalcArgs,
    },

    /// Modo interativo (REPL) com tabela acumulada
    Interactive {
        #[command(flatten)]
        calc: CalcArgs,
    },

    /// Mostrar ou gravar a configuração padrão
    Config {
        /// Arquivo de saída
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Valores de cálculo que substituem a vela e o minuto no Resultado R.
#[derive(Args, Clone, Copy, Debug, Default)]
struct CalcArgs {
    /// Vela de cálculo (ex: 16.64)
    #[arg(long, value_parser = parse_finite)]
    calc_multiplier: Option<f64>,

    /// Minuto de cálculo (0-59)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..60))]
    calc_minute: Option<u32>,
}

fn parse_finite(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("número inválido: {}", raw))?;
    if !value.is_finite() {
        return Err(format!("valor não finito: {}", raw));
    }
    Ok(value)
}

impl From<CalcArgs> for ScoreInputs {
    fn from(args: CalcArgs) -> Self {
        ScoreInputs {
            multiplier: args.calc_multiplier,
            minute: args.calc_minute,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { file, calc } => {
            let config = resolve_config(&cli.config)?;
            cmd_analyze(config, file.as_deref(), calc.into())
        }
        Command::Interactive { calc } => {
            let config = resolve_config(&cli.config)?;
            let mut session = AlertSession::new(config);
            interactive::run_interactive(&mut session, calc.into())
        }
        Command::Config { output } => cmd_config(output.as_deref()),
    }
}

/// Falls back to the defaults when the file does not exist.
fn resolve_config(path: &Path) -> Result<VelasConfig> {
    if path.exists() {
        load_config(path)
    } else {
        println!("(Sem arquivo {}, usando a configuração padrão)", path.display());
        Ok(VelasConfig::default())
    }
}

pub(crate) fn now() -> velas_core::chrono::NaiveDateTime {
    velas_core::chrono::Local::now().naive_local()
}

fn cmd_analyze(config: VelasConfig, file: Option<&Path>, inputs: ScoreInputs) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Não foi possível ler {:?}", path))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Erro de leitura da entrada padrão")?;
            buf
        }
    };

    log::debug!("Bloco lido ({} bytes)", text.len());

    let mut session = AlertSession::new(config);
    let report = session.submit(&text, inputs, now())?;

    display_report(&report);
    display_table(&session.rows());
    Ok(())
}

fn cmd_config(output: Option<&Path>) -> Result<()> {
    let config = VelasConfig::default();
    match output {
        Some(path) => {
            save_config(&config, path)?;
            println!("Configuração padrão gravada em {}", path.display());
        }
        None => display_config(&config)?,
    }
    Ok(())
}
