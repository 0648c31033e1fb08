use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use velas_core::score::ScoreInputs;
use velas_core::session::AlertSession;

use crate::display::{display_config, display_report, display_table};

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Submit,
    Table,
    Clear,
    Config,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "enviar" | "submit" | "env" => Some(InteractiveCommand::Submit),
        "2" | "tabela" | "table" | "tab" => Some(InteractiveCommand::Table),
        "3" | "limpar" | "clear" | "reset" => Some(InteractiveCommand::Clear),
        "4" | "config" | "cfg" => Some(InteractiveCommand::Config),
        "5" | "sair" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Modo interativo ──");
    println!("  1. enviar   Colar rodada / vela / horário");
    println!("  2. tabela   Alertas consolidados");
    println!("  3. limpar   Esvaziar a tabela");
    println!("  4. config   Configuração em uso");
    println!("  5. sair     Sair");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erro de leitura")?;
    if read == 0 {
        anyhow::bail!("Fim da entrada");
    }
    Ok(input.trim().to_string())
}

/// Reads lines until a blank line follows some content, or until EOF.
fn read_block<R: BufRead>(reader: R) -> Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("Erro de leitura")?;
        if line.trim().is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn cmd_submit_interactive(session: &mut AlertSession, inputs: ScoreInputs) -> Result<()> {
    println!("Cole o bloco (rodada, vela, horário) e termine com uma linha vazia:");
    let text = read_block(io::stdin().lock())?;
    let report = session.submit(&text, inputs, crate::now())?;
    display_report(&report);
    display_table(&session.rows());
    Ok(())
}

pub fn run_interactive(session: &mut AlertSession, inputs: ScoreInputs) -> Result<()> {
    println!("Bem-vindo ao modo interativo do velas!");

    loop {
        display_menu();
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Até logo!");
                break;
            }
            Some(InteractiveCommand::Submit) => {
                if let Err(e) = cmd_submit_interactive(session, inputs) {
                    println!("Erro: {e:#}");
                }
            }
            Some(InteractiveCommand::Table) => display_table(&session.rows()),
            Some(InteractiveCommand::Clear) => {
                session.clear();
                println!("Tabela limpa.");
            }
            Some(InteractiveCommand::Config) => {
                if let Err(e) = display_config(session.config()) {
                    println!("Erro: {e:#}");
                }
            }
            None => {
                println!("Comando desconhecido: '{}'. Digite um número (1-5) ou o nome do comando.", input);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_command_by_number() {
        assert_eq!(parse_command("1"), Some(InteractiveCommand::Submit));
        assert_eq!(parse_command("2"), Some(InteractiveCommand::Table));
        assert_eq!(parse_command("3"), Some(InteractiveCommand::Clear));
        assert_eq!(parse_command("4"), Some(InteractiveCommand::Config));
        assert_eq!(parse_command("5"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_name() {
        assert_eq!(parse_command("enviar"), Some(InteractiveCommand::Submit));
        assert_eq!(parse_command("tabela"), Some(InteractiveCommand::Table));
        assert_eq!(parse_command("limpar"), Some(InteractiveCommand::Clear));
        assert_eq!(parse_command("sair"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_by_alias() {
        assert_eq!(parse_command("submit"), Some(InteractiveCommand::Submit));
        assert_eq!(parse_command("tab"), Some(InteractiveCommand::Table));
        assert_eq!(parse_command("reset"), Some(InteractiveCommand::Clear));
        assert_eq!(parse_command("cfg"), Some(InteractiveCommand::Config));
        assert_eq!(parse_command("q"), Some(InteractiveCommand::Quit));
        assert_eq!(parse_command("exit"), Some(InteractiveCommand::Quit));
    }

    #[test]
    fn test_parse_command_case_insensitive() {
        assert_eq!(parse_command("SAIR"), Some(InteractiveCommand::Quit));
        assert_eq!(parse_command("Limpar"), Some(InteractiveCommand::Clear));
    }

    #[test]
    fn test_parse_command_unknown() {
        assert_eq!(parse_command("foo"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("6"), None);
    }

    #[test]
    fn test_read_block_stops_at_blank_line() {
        let input = Cursor::new("\n3294634\n1.03x\n20:49:55\n\n2\n");
        assert_eq!(read_block(input).unwrap(), "3294634\n1.03x\n20:49:55");
    }

    #[test]
    fn test_read_block_until_eof() {
        let input = Cursor::new("3294634\n1.03x");
        assert_eq!(read_block(input).unwrap(), "3294634\n1.03x");
        assert_eq!(read_block(Cursor::new("")).unwrap(), "");
    }
}
