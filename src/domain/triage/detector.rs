//! Symptom and alarm-sign detection over free text.
//!
//! Two fixed Portuguese term lists are compiled into case-insensitive,
//! whole-word alternations. Alarm signs outrank plain symptoms when the
//! call-to-action is chosen.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const SYMPTOM_TERMS: &[&str] = &[
    r"febre(?: (?:alta|repentina))?",
    r"dor(?:es)? de cabe[çc]a",
    r"dor(?:es)? (?:no corpo|musculares|nas articula[çc][õo]es)",
    r"mialgia",
    r"artralgia",
    r"dor(?:es)? (?:atr[aá]s|retro) dos olhos",
    r"manchas (?:vermelhas|na pele)|exantema",
    r"cansa[çc]o|fadiga|prostra[çc][aã]o",
    r"n[áa]useas?|enjoo",
    r"v[oóô]mitos?",
    r"diarreia",
    r"perda de apetite",
];

const ALARM_TERMS: &[&str] = &[
    r"dor abdominal (?:intensa|forte) (?:e )?cont[ií]nua",
    r"v[oóô]mitos? persistentes?",
    r"sangramento (?:nasal|gengival|vaginal|de pele)|hematomas? f[áa]ceis|pet[eé]quias",
    r"tontura|desmaio|hipotens[aã]o|queda de press[aã]o",
    r"letargia|irritabilidade",
    r"hepatomegalia|f[íi]gado aumentado|dor no f[íi]gado",
    r"hemorragias?|hemat[êée]mese|melena",
];

fn whole_word_alternation(terms: &[&str]) -> Regex {
    let pattern = format!(r"(?i)\b(?:{})\b", terms.join("|"));
    Regex::new(&pattern).expect("static term list compiles")
}

static SYMPTOM_RE: Lazy<Regex> = Lazy::new(|| whole_word_alternation(SYMPTOM_TERMS));
static ALARM_RE: Lazy<Regex> = Lazy::new(|| whole_word_alternation(ALARM_TERMS));

/// What the detector found in a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub has_symptom: bool,
    pub has_alarm: bool,
}

/// Follow-up appended to medical answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallToAction {
    None,
    Symptom,
    Alarm,
}

impl CallToAction {
    /// Alarm wins over symptom; neither yields no call-to-action.
    pub fn from_detection(detection: Detection) -> Self {
        if detection.has_alarm {
            CallToAction::Alarm
        } else if detection.has_symptom {
            CallToAction::Symptom
        } else {
            CallToAction::None
        }
    }

    /// Text appended verbatim to the answer (empty for `None`).
    pub fn text(&self) -> &'static str {
        match self {
            CallToAction::None => "",
            CallToAction::Symptom => {
                "\n\n📝 Se você está com esses sintomas, posso **registrar seus dados** para \
                 acompanhamento. Digite seu **nome** e **idade**; ao finalizar, escreva **concluir**."
            }
            CallToAction::Alarm => {
                "\n\n⚠️ **Atenção:** há sinais que podem indicar **gravidade**. Procure avaliação \
                 **imediata** em uma UBS/UPA. Se preferir, posso **registrar seus dados** para \
                 acompanhamento: informe **nome** e **idade**, e diga **concluir** ao terminar."
            }
        }
    }
}

/// Stateless matcher over the symptom and alarm term lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymptomDetector;

impl SymptomDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scans `text` for both term lists.
    pub fn detect(&self, text: &str) -> Detection {
        Detection {
            has_symptom: SYMPTOM_RE.is_match(text),
            has_alarm: ALARM_RE.is_match(text),
        }
    }

    /// Chooses the call-to-action for an answer, looking at both the
    /// user's question and the generated answer.
    pub fn call_to_action(&self, query: &str, answer: &str) -> CallToAction {
        let combined = format!("{}\n\n{}", query, answer);
        CallToAction::from_detection(self.detect(&combined))
    }
}
