//! Registration status and the evaluation that drives it.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

use super::IntakeRecord;

/// Intake registration lifecycle.
///
/// `Pending` loops on itself until a complete record arrives; `Ok` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStatus {
    #[default]
    Pending,
    Ok,
}

impl StateMachine for IntakeStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            IntakeStatus::Pending => vec![IntakeStatus::Pending, IntakeStatus::Ok],
            IntakeStatus::Ok => vec![],
        }
    }
}

/// Form field that can be missing from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeField {
    Name,
    Age,
}

impl IntakeField {
    /// Portuguese label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            IntakeField::Name => "nome",
            IntakeField::Age => "idade",
        }
    }
}

/// Outcome of evaluating one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeEvaluation {
    pub status: IntakeStatus,
    pub missing: Vec<IntakeField>,
    pub message: String,
}

impl IntakeEvaluation {
    pub fn is_ok(&self) -> bool {
        self.status == IntakeStatus::Ok
    }
}

/// Decides whether `record` completes the registration.
///
/// The message is the system-side summary handed to the confirmation
/// synthesis and used verbatim when that synthesis is unavailable.
pub fn evaluate(record: &IntakeRecord) -> IntakeEvaluation {
    let mut missing = Vec::new();
    if !record.has_name() {
        missing.push(IntakeField::Name);
    }
    if !record.has_age() {
        missing.push(IntakeField::Age);
    }

    if record.done && missing.is_empty() {
        let message = format!(
            "CADASTRO_OK\nNome: {}\nIdade: {}",
            record.name_trimmed().unwrap_or_default(),
            record.age.map(|a| a.to_string()).unwrap_or_default(),
        );
        return IntakeEvaluation {
            status: IntakeStatus::Ok,
            missing,
            message,
        };
    }

    let missing_list = if missing.is_empty() {
        "nenhum".to_string()
    } else {
        missing
            .iter()
            .map(IntakeField::label)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let message = format!(
        "CADASTRO_PENDENTE\n\
         Concluir sinalizado: {}\n\
         Campos faltantes: {}\n\
         Parciais capturados: Nome: {} | Idade: {}\n\
         Por favor, informe os campos faltantes. Quando terminar, digite **concluir**.",
        if record.done { "sim" } else { "não" },
        missing_list,
        record.name_trimmed().unwrap_or("-"),
        record
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );

    IntakeEvaluation {
        status: IntakeStatus::Pending,
        missing,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_reach_ok_and_ok_is_terminal() {
        assert!(IntakeStatus::Pending.can_transition_to(&IntakeStatus::Ok));
        assert!(IntakeStatus::Ok.is_terminal());
        assert!(IntakeStatus::Ok.transition_to(IntakeStatus::Pending).is_err());
        assert_eq!(IntakeStatus::default(), IntakeStatus::Pending);
    }

    #[test]
    fn done_without_fields_lists_both_missing() {
        let eval = evaluate(&IntakeRecord::new(None, None, true));
        assert_eq!(eval.status, IntakeStatus::Pending);
        assert_eq!(eval.missing, vec![IntakeField::Name, IntakeField::Age]);
        assert!(eval.message.starts_with("CADASTRO_PENDENTE"));
        assert!(eval.message.contains("Campos faltantes: nome, idade"));
        assert!(eval.message.contains("Concluir sinalizado: sim"));
    }

    #[test]
    fn complete_record_is_ok() {
        let eval = evaluate(&IntakeRecord::new(Some("Ana".into()), Some(22), true));
        assert!(eval.is_ok());
        assert!(eval.missing.is_empty());
        assert_eq!(eval.message, "CADASTRO_OK\nNome: Ana\nIdade: 22");
    }

    #[test]
    fn partial_values_are_echoed() {
        let eval = evaluate(&IntakeRecord::new(Some("Ana".into()), None, false));
        assert_eq!(eval.missing, vec![IntakeField::Age]);
        assert!(eval.message.contains("Nome: Ana | Idade: -"));
        assert!(eval.message.contains("Concluir sinalizado: não"));
    }

    #[test]
    fn all_fields_without_done_stays_pending() {
        let eval = evaluate(&IntakeRecord::new(Some("Ana".into()), Some(22), false));
        assert_eq!(eval.status, IntakeStatus::Pending);
        assert!(eval.message.contains("Campos faltantes: nenhum"));
    }

    #[test]
    fn age_zero_counts_as_present() {
        let eval = evaluate(&IntakeRecord::new(Some("Bebê".into()), Some(0), true));
        assert!(eval.is_ok());
    }
}
