//! # Fusão de Menções de Entidades
//!
//! Reconstrói menções legíveis a partir da saída token a token do modelo.
//! O modelo emite sub-words com offsets no texto original; este módulo
//! costura os fragmentos de volta em nomes completos, em uma única passada,
//! com no máximo **uma menção aberta** por vez.
//!
//! ## Regras de decisão (por token, na ordem de entrada)
//!
//! 1. Remove o marcador `##` e apara o texto do token.
//! 2. Em relação à menção aberta (se houver), calcula:
//!    - `directly_adjacent`: `start` do token == `end` da menção (sem lacuna);
//!    - `space_adjacent`: `start` == `end` + 1 (exatamente um caractere
//!      intermediário, tratado como um espaço).
//! 3. **Regra A (sub-word)**: token com `##` e diretamente adjacente sempre
//!    funde, mesmo que o rótulo seja outro. Um token fatiado pertence por
//!    definição à mesma menção.
//! 4. **Regra B (mesmo tipo adjacente)**: senão, funde quando o tipo fixo da
//!    menção é igual ao rótulo do token e há adjacência direta ou de espaço.
//! 5. Ao fundir, um único espaço é inserido apenas na adjacência de espaço;
//!    o tipo da menção nunca muda (vale o do primeiro token).
//! 6. Sem fusão: a menção aberta é emitida e uma nova começa neste token.
//!    Depois do último token, a menção ainda aberta é emitida.
//!
//! Registros malformados (sem texto, sem rótulo ou sem offsets numéricos)
//! são descartados com um `warn!` e não tocam a menção aberta.
//!
//! ## Deduplicação
//!
//! Sobre a lista emitida, a chave é o **nome aparado**: a primeira ocorrência
//! vence, inclusive o tipo, e a ordem de primeira ocorrência é preservada.
//! Menções repetidas da mesma string denotam a mesma entidade, mesmo quando
//! o modelo variou o tipo entre as ocorrências.
//!
//! # Exemplo
//!
//! `[Open(0..4, ORG), ##AI(4..6, ORG), Sam(7..10, PER)]` produz
//! `[{OpenAI, ORG}, {Sam, PER}]`.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::warn;

use crate::entity::EntityMention;
use crate::prediction::{RawPrediction, TokenPrediction};

/// A menção em construção durante a varredura.
///
/// Existe no máximo uma por vez. O tipo é fixado pelo primeiro token e
/// nunca reatribuído pelas fusões seguintes.
struct OpenMention {
    name: String,
    /// Offset final do último token fundido (exclusivo).
    end: usize,
    kind: String,
}

impl OpenMention {
    fn seed(token: &TokenPrediction) -> Self {
        Self {
            name: token.cleaned_word().to_string(),
            end: token.end,
            kind: token.label.clone(),
        }
    }

    fn close(self) -> EntityMention {
        EntityMention {
            name: self.name.trim().to_string(),
            kind: self.kind,
        }
    }
}

/// Funde uma sequência ordenada de predições em menções deduplicadas.
///
/// Entrada vazia produz saída vazia; a fusão em si nunca falha. Erros do
/// serviço NER são responsabilidade de quem buscou as predições, antes
/// desta chamada.
pub fn merge(predictions: &[RawPrediction]) -> Vec<EntityMention> {
    let mut emitted: Vec<EntityMention> = Vec::new();
    let mut open: Option<OpenMention> = None;

    for raw in predictions {
        let Some(token) = TokenPrediction::from_raw(raw) else {
            warn!(?raw, "predição malformada descartada");
            continue;
        };

        if let Some(current) = open.as_mut() {
            let directly_adjacent = token.start == current.end;
            let space_adjacent = token.start == current.end + 1;

            let folds = (token.is_subword() && directly_adjacent)
                || (current.kind == token.label && (directly_adjacent || space_adjacent));

            if folds {
                if space_adjacent {
                    current.name.push(' ');
                }
                current.name.push_str(token.cleaned_word());
                current.end = token.end;
                continue;
            }
        }

        if let Some(finished) = open.replace(OpenMention::seed(&token)) {
            emitted.push(finished.close());
        }
    }

    if let Some(finished) = open {
        emitted.push(finished.close());
    }

    dedup(emitted)
}

/// Deduplica menções pelo nome aparado, preservando a ordem de primeira
/// ocorrência. O tipo da primeira ocorrência vence; ocorrências posteriores
/// do mesmo nome com outro tipo são descartadas. Idempotente.
pub fn dedup(mentions: Vec<EntityMention>) -> Vec<EntityMention> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(mentions.len());

    for mention in mentions {
        if seen.insert(mention.name.trim().to_string()) {
            unique.push(mention);
        }
    }

    unique
}

/// Funde vários textos em paralelo (um artigo por sequência).
///
/// Cada chamada de [`merge`] é pura e independente, então o lote é
/// distribuído com Rayon. A ordem do resultado espelha a ordem da entrada.
pub fn merge_batch(batches: &[Vec<RawPrediction>]) -> Vec<Vec<EntityMention>> {
    batches.par_iter().map(|preds| merge(preds)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pred(word: &str, start: usize, end: usize, label: &str) -> RawPrediction {
        RawPrediction {
            word: Some(word.to_string()),
            entity_group: Some(label.to_string()),
            entity: None,
            score: Some(0.99),
            start: Some(start),
            end: Some(end),
        }
    }

    fn names(mentions: &[EntityMention]) -> Vec<&str> {
        mentions.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn test_subword_stitching_without_space() {
        let preds = vec![pred("Open", 0, 4, "ORG"), pred("##AI", 4, 6, "ORG")];
        let mentions = merge(&preds);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "OpenAI");
        assert_eq!(mentions[0].kind, "ORG");
    }

    #[test]
    fn test_subword_folds_even_with_label_mismatch() {
        // Regra A tem precedência sobre a checagem de tipo.
        let preds = vec![pred("Open", 0, 4, "ORG"), pred("##AI", 4, 6, "MISC")];
        let mentions = merge(&preds);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "OpenAI");
        assert_eq!(mentions[0].kind, "ORG"); // tipo do primeiro token
    }

    #[test]
    fn test_subword_with_gap_does_not_fold() {
        // Regra A exige adjacência direta; com lacuna o token abre menção nova.
        let preds = vec![pred("Open", 0, 4, "ORG"), pred("##AI", 5, 7, "MISC")];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["Open", "AI"]);
    }

    #[test]
    fn test_space_adjacent_same_type_merges() {
        let preds = vec![pred("Sam", 0, 3, "PER"), pred("Altman", 4, 10, "PER")];
        let mentions = merge(&preds);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].name, "Sam Altman");
        assert_eq!(mentions[0].kind, "PER");
    }

    #[test]
    fn test_directly_adjacent_same_type_merges_without_space() {
        let preds = vec![pred("Micro", 0, 5, "ORG"), pred("soft", 5, 9, "ORG")];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["Microsoft"]);
    }

    #[test]
    fn test_type_break_forces_new_mention() {
        let preds = vec![pred("Sam", 0, 3, "PER"), pred("OpenAI", 4, 10, "ORG")];
        let mentions = merge(&preds);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0], EntityMention { name: "Sam".into(), kind: "PER".into() });
        assert_eq!(mentions[1], EntityMention { name: "OpenAI".into(), kind: "ORG".into() });
    }

    #[test]
    fn test_non_adjacent_same_type_does_not_merge() {
        let preds = vec![pred("OpenAI", 0, 6, "ORG"), pred("Anthropic", 20, 29, "ORG")];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["OpenAI", "Anthropic"]);
    }

    #[test]
    fn test_dedup_keeps_first_type() {
        let emitted = vec![
            EntityMention { name: "OpenAI".into(), kind: "ORG".into() },
            EntityMention { name: "OpenAI".into(), kind: "MISC".into() },
        ];
        let unique = dedup(emitted);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].kind, "ORG");
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let emitted = vec![
            EntityMention { name: "OpenAI".into(), kind: "ORG".into() },
            EntityMention { name: "Sam".into(), kind: "PER".into() },
            EntityMention { name: "OpenAI".into(), kind: "MISC".into() },
        ];
        let once = dedup(emitted);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_order_of_first_appearance_preserved() {
        let preds = vec![
            pred("Anthropic", 0, 9, "ORG"),
            pred("Sam", 20, 23, "PER"),
            pred("OpenAI", 40, 46, "ORG"),
        ];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["Anthropic", "Sam", "OpenAI"]);
    }

    #[test]
    fn test_malformed_token_skipped_without_crashing() {
        let broken = RawPrediction {
            word: Some("???".to_string()),
            entity_group: Some("PER".to_string()),
            start: None, // sem offset: descartado
            ..Default::default()
        };
        // O token ruim fica entre os dois válidos e não afeta a menção aberta:
        // "Altman" continua adjacente-por-espaço a "Sam".
        let preds = vec![pred("Sam", 0, 3, "PER"), broken, pred("Altman", 4, 10, "PER")];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["Sam Altman"]);
    }

    #[test]
    fn test_label_from_tokenwise_field() {
        let preds = vec![
            RawPrediction {
                word: Some("Sam".to_string()),
                entity: Some("B-PER".to_string()),
                start: Some(0),
                end: Some(3),
                ..Default::default()
            },
            RawPrediction {
                word: Some("Altman".to_string()),
                entity: Some("B-PER".to_string()),
                start: Some(4),
                end: Some(10),
                ..Default::default()
            },
        ];
        let mentions = merge(&preds);
        assert_eq!(names(&mentions), vec!["Sam Altman"]);
        assert_eq!(mentions[0].kind, "B-PER");
    }

    #[test]
    fn test_repeated_mention_deduplicated_end_to_end() {
        let preds = vec![
            pred("OpenAI", 0, 6, "ORG"),
            pred("hoje", 10, 14, "O"),
            pred("OpenAI", 20, 26, "MISC"),
        ];
        let mentions = merge(&preds);
        // "hoje" quebra a adjacência; a segunda "OpenAI" é duplicata por nome.
        assert_eq!(names(&mentions), vec!["OpenAI", "hoje"]);
        assert_eq!(mentions[0].kind, "ORG");
    }

    #[test]
    fn test_merge_batch_mirrors_input_order() {
        let a = vec![pred("OpenAI", 0, 6, "ORG")];
        let b = vec![pred("Sam", 0, 3, "PER"), pred("Altman", 4, 10, "PER")];
        let results = merge_batch(&[a, b]);
        assert_eq!(results.len(), 2);
        assert_eq!(names(&results[0]), vec!["OpenAI"]);
        assert_eq!(names(&results[1]), vec!["Sam Altman"]);
    }
}
