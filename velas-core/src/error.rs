use thiserror::Error;

/// Why a submission was rejected. The session table is never touched when
/// one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The block must hold exactly round, multiplier and time.
    #[error("Esperadas 3 linhas (rodada, vela, horário), recebidas {found}")]
    InputShape { found: usize },

    #[error("Rodada inválida: '{0}' (número inteiro esperado)")]
    Round(String),

    #[error("Vela inválida: '{0}' (ex: 1.03x ou 2,50)")]
    Multiplier(String),

    #[error("Horário inválido: '{0}' (formato HH:MM:SS ou HH:MM)")]
    Time(String),
}

impl SubmissionError {
    /// Name of the offending field, as shown to the user.
    pub fn field(&self) -> &'static str {
        match self {
            SubmissionError::InputShape { .. } => "entrada",
            SubmissionError::Round(_) => "rodada",
            SubmissionError::Multiplier(_) => "vela",
            SubmissionError::Time(_) => "horário",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_field() {
        let err = SubmissionError::Multiplier("abc".to_string());
        assert_eq!(err.field(), "vela");
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn test_input_shape_message() {
        let err = SubmissionError::InputShape { found: 2 };
        assert!(err.to_string().contains("recebidas 2"));
    }
}
