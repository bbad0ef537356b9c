//! Prompt templates and fixed user-facing texts.
//!
//! All texts are Portuguese; the assistant serves Brazilian users.

use crate::domain::conversation::{render_history, Turn};
use crate::ports::CompletionRequest;

/// Generation settings per pipeline step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl GenerationSettings {
    /// Stamps temperature and token limit onto `request`.
    pub fn apply(&self, request: CompletionRequest) -> CompletionRequest {
        let request = request.with_temperature(self.temperature);
        match self.max_tokens {
            Some(max) => request.with_max_tokens(max),
            None => request,
        }
    }
}

pub const CLASSIFIER_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.0,
    max_tokens: Some(200),
};

pub const GENERAL_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.7,
    max_tokens: Some(1024),
};

pub const RAG_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.1,
    max_tokens: None,
};

pub const EXTRACTION_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.0,
    max_tokens: Some(200),
};

pub const CONFIRMATION_SETTINGS: GenerationSettings = GenerationSettings {
    temperature: 0.2,
    max_tokens: Some(512),
};

pub const CLASSIFIER_SYSTEM: &str = r#"Você é um classificador. Escolha exatamente UMA opção:

1 = Dúvidas sobre Dengue (usar RAG)
2 = Saudações/assuntos gerais (sem RAG, resposta curta)
3 = Cadastro (coletar apenas NOME e IDADE do usuário; conclusão quando ele disser "concluir"/"finalizar")

Retorne SOMENTE um objeto JSON no formato:
{"opcao": <1, 2 ou 3>, "justificativa": "<breve justificativa>"}

[EXEMPLOS]
Usuário: "Quais os sintomas da dengue e como prevenir?"
→ 1

Usuário: "oi, tudo bem? bom dia"
→ 2

Usuário: "quero me cadastrar: meu nome é Ana"
→ 3

Usuário: "tenho 22 anos, posso continuar o cadastro?"
→ 3

Usuário: "obrigado!"
→ 2"#;

pub const GENERAL_SYSTEM: &str = "Você é um assistente simpático e breve para saudações/assuntos gerais.
Evite falar sobre temas médicos específicos; se perguntarem sobre Dengue, diga que há um modo próprio para isso.

Responda de forma calorosa e natural, mantendo um tom conversacional e amigável.";

const RAG_SYSTEM_HEAD: &str = "Você é um assistente de saúde. Responda SOMENTE com base no contexto abaixo sobre Dengue.
Se a informação não estiver no contexto, diga que não encontrou no material e oriente procurar uma UBS.
Produza uma resposta clara, **completa** e **organizada** em seções, sem referências, links, IDs de trechos ou citações de fonte.
Não mencione o material fornecido; apresente a informação diretamente.

Estrutura recomendada (use apenas as partes suportadas pelo contexto):
- **Sintomas típicos:** detalhe os principais (ex.: febre alta de início súbito, dor de cabeça, dores musculares/articulares, dor atrás dos olhos, manchas, náuseas/vômitos, etc.).
- **Evolução temporal da doença:** em linhas gerais (ex.: período febril, possíveis sinais que surgem após queda da febre, duração aproximada).
- **Sinais de alarme:** liste claramente e destaque que indicam gravidade e exigem avaliação imediata.
- **Quando procurar atendimento:** critérios práticos.
- **Cuidados em casa e hidratação:** recomendações objetivas.
- **Populações especiais:** gestantes, crianças, idosos; ressalte cuidado e procura precoce.

Contexto:
";

pub const EXTRACTION_SYSTEM: &str = r#"Você extrairá informações para um cadastro simples de pessoa.
Capture SOMENTE:
- nome
- idade (em anos)
- concluir (true/false): true quando o usuário indicar claramente "concluir", "finalizar", "enviar", "pode registrar", etc.

Regras:
- NÃO invente dados. Se não houver na mensagem, deixe nulo.
- O campo idade deve ser um número inteiro (anos).
- Se o usuário só disser "concluir" sem ter informado os dados, apenas marque concluir=true e deixe os campos ausentes como nulos.

Retorne SOMENTE um objeto JSON no formato:
{"nome": <texto ou null>, "idade": <inteiro ou null>, "concluir": <true ou false>}"#;

pub const CONFIRMATION_SYSTEM: &str = "Você é um atendente cordial. Responda de forma breve e clara.
- Se CADASTRO_OK: confirme que foi registrado com sucesso (sem citar fontes ou IDs).
- Se CADASTRO_PENDENTE: peça apenas os campos faltantes (nome e/ou idade), educadamente.
Evite textos longos e termos técnicos.";

/// Greeting shown when a chat opens.
pub const WELCOME_MESSAGE: &str = "👋 Olá! Eu sou o **Assistente Virtual sobre Dengue**.

Estou aqui para ajudar você com informações confiáveis sobre a dengue:
• Tirar dúvidas sobre sintomas, transmissão e prevenção 🦟
• Orientar sobre quando procurar atendimento médico 🏥
• Apoiar no registro de informações básicas (nome e idade) 📋

Como posso te ajudar hoje?";

/// Reply used when a turn fails for any internal reason.
pub const FALLBACK_MESSAGE: &str = "❌ **Erro ao processar sua mensagem**

💡 **Sugestões**:
• Tente reformular sua pergunta
• Seja mais específico sobre o que deseja saber
• Para dúvidas sobre dengue, use termos como: sintomas, prevenção, tratamento

🔄 Tente novamente em alguns instantes.";

/// Reply used when a completed registration could not be written.
pub const PERSISTENCE_FAILED_MESSAGE: &str = "❌ Não foi possível concluir o seu cadastro agora. \
Seus dados não foram registrados; tente novamente em alguns instantes.";

/// Fixed answer of the degraded medical responder.
pub fn rag_unavailable_message(reason: &str) -> String {
    format!(
        "⚠️ RAG indisponível no momento.\n\nMotivo: {}\nVerifique a indexação da base de conhecimento e a chave de API.",
        reason
    )
}

pub fn rag_system(context: &str) -> String {
    format!("{}{}", RAG_SYSTEM_HEAD, context)
}

pub fn classifier_user(text: &str, history: &[Turn]) -> String {
    format!(
        "Pergunta do usuário:\n{}\n\nHistórico (pode estar vazio):\n{}",
        text,
        render_history(history)
    )
}

pub fn general_user(text: &str, history: &[Turn]) -> String {
    format!(
        "Usuário: {}\n\nHistórico (pode estar vazio):\n{}",
        text,
        render_history(history)
    )
}

pub fn rag_user(text: &str, history: &[Turn]) -> String {
    format!(
        "Pergunta: {}\n\nHistórico (pode estar vazio):\n{}",
        text,
        render_history(history)
    )
}

/// History is shown for context only; values must come from the message.
pub fn extraction_user(text: &str, history: &[Turn]) -> String {
    format!(
        "Mensagem do usuário:\n{}\n\nHistórico (apenas contexto; extraia dados SOMENTE da mensagem acima):\n{}",
        text,
        render_history(history)
    )
}

pub fn confirmation_user(evaluation: &str, text: &str, history: &[Turn]) -> String {
    format!(
        "Resultado (sistema):\n{}\n\nMensagem original:\n{}\n\nHistórico:\n{}",
        evaluation,
        text,
        render_history(history)
    )
}
