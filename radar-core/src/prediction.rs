//! # Predições Token a Token do Serviço NER
//!
//! O serviço de inferência hospedado devolve uma lista JSON com **um registro
//! por token** do modelo. Como o tokenizador do modelo é sub-word (WordPiece),
//! uma palavra pode chegar fatiada em vários registros, e o fatiamento é
//! sinalizado pelo prefixo `##` no texto do token.
//!
//! ## Os dois formatos de rótulo
//!
//! A API tem duas formas de saída, dependendo da estratégia de agregação:
//!
//! | Campo          | Formato                | Exemplo   |
//! |----------------|------------------------|-----------|
//! | `entity_group` | saída agregada         | `"ORG"`   |
//! | `entity`       | saída token a token    | `"B-ORG"` |
//!
//! Os dois são aceitos e tratados como equivalentes: o rótulo vem de
//! `entity_group` quando presente, senão de `entity`. Para a fusão o rótulo
//! é uma string opaca; nenhuma semântica é atribuída ao prefixo BIO aqui.
//!
//! ## Tolerância a registros malformados
//!
//! Registros incompletos acontecem na prática (campos ausentes ou com o tipo
//! JSON errado). A política é local: um registro ruim é descartado com aviso,
//! nunca derruba a lista inteira. Por isso [`RawPrediction`] deserializa cada
//! campo de forma leniente (tipo errado equivale a ausente) e a validação de
//! verdade acontece em [`TokenPrediction::from_raw`].

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefixo que marca um token como continuação do anterior, sem espaço
/// entre eles (WordPiece do BERT). Ex: "OpenAI" chega como `Open` + `##AI`.
pub const SUBWORD_MARKER: &str = "##";

/// Um registro cru, exatamente como veio do serviço de inferência.
///
/// Todos os campos são opcionais: o deserializador aceita qualquer objeto
/// JSON e deixa como `None` o que estiver ausente **ou com tipo errado**
/// (ex: `start` como string). Assim um único elemento ruim não aborta a
/// decodificação do array inteiro.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPrediction {
    /// Texto do token, possivelmente com o prefixo [`SUBWORD_MARKER`].
    #[serde(default, deserialize_with = "lenient_string")]
    pub word: Option<String>,
    /// Rótulo no formato agregado (ex: "ORG").
    #[serde(default, deserialize_with = "lenient_string")]
    pub entity_group: Option<String>,
    /// Rótulo no formato token a token (ex: "B-ORG").
    #[serde(default, deserialize_with = "lenient_string")]
    pub entity: Option<String>,
    /// Confiança do modelo. Não participa da fusão; mantida para depuração.
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    /// Offset inicial (inclusivo) em caracteres no texto original.
    #[serde(default, deserialize_with = "lenient_offset")]
    pub start: Option<usize>,
    /// Offset final (exclusivo) em caracteres no texto original.
    #[serde(default, deserialize_with = "lenient_offset")]
    pub end: Option<usize>,
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_str().map(str::to_owned))
}

fn lenient_offset<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_u64().map(|n| n as usize))
}

fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_f64())
}

/// Uma predição validada, pronta para a fusão.
///
/// Invariantes (garantidos pelo serviço, não re-verificados aqui):
/// `start < end` e `start` não-decrescente ao longo da sequência.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPrediction {
    /// Texto do token como emitido, ainda com o eventual marcador `##`.
    pub word: String,
    /// Rótulo semântico (string opaca, em qualquer dos dois formatos).
    pub label: String,
    /// Offset inicial (inclusivo).
    pub start: usize,
    /// Offset final (exclusivo).
    pub end: usize,
}

impl TokenPrediction {
    /// Valida um registro cru.
    ///
    /// Retorna `None` quando falta o texto, o rótulo (nos dois campos) ou
    /// qualquer um dos offsets numéricos. Esses registros são descartados
    /// pelo chamador com um aviso.
    pub fn from_raw(raw: &RawPrediction) -> Option<Self> {
        let word = raw.word.clone()?;
        let label = raw.entity_group.clone().or_else(|| raw.entity.clone())?;
        Some(Self {
            word,
            label,
            start: raw.start?,
            end: raw.end?,
        })
    }

    /// Texto do token sem o marcador de sub-word e sem espaços nas bordas.
    pub fn cleaned_word(&self) -> &str {
        self.word
            .strip_prefix(SUBWORD_MARKER)
            .unwrap_or(&self.word)
            .trim()
    }

    /// O token continua o anterior sem espaço entre eles?
    pub fn is_subword(&self) -> bool {
        self.word.starts_with(SUBWORD_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_both_label_fields() {
        let grouped: RawPrediction =
            serde_json::from_str(r#"{"word":"OpenAI","entity_group":"ORG","start":0,"end":6}"#)
                .unwrap();
        let tokenwise: RawPrediction =
            serde_json::from_str(r#"{"word":"OpenAI","entity":"B-ORG","start":0,"end":6}"#)
                .unwrap();

        assert_eq!(TokenPrediction::from_raw(&grouped).unwrap().label, "ORG");
        assert_eq!(TokenPrediction::from_raw(&tokenwise).unwrap().label, "B-ORG");
    }

    #[test]
    fn test_entity_group_takes_precedence() {
        let both: RawPrediction = serde_json::from_str(
            r#"{"word":"OpenAI","entity_group":"ORG","entity":"B-ORG","start":0,"end":6}"#,
        )
        .unwrap();
        assert_eq!(TokenPrediction::from_raw(&both).unwrap().label, "ORG");
    }

    #[test]
    fn test_wrong_json_type_becomes_absent() {
        // `start` como string e `word` como número não derrubam o parse;
        // viram campos ausentes e a validação rejeita o registro.
        let raw: RawPrediction = serde_json::from_str(
            r#"{"word":42,"entity_group":"ORG","start":"zero","end":6}"#,
        )
        .unwrap();
        assert_eq!(raw.word, None);
        assert_eq!(raw.start, None);
        assert!(TokenPrediction::from_raw(&raw).is_none());
    }

    #[test]
    fn test_missing_offsets_rejected() {
        let raw: RawPrediction =
            serde_json::from_str(r#"{"word":"Sam","entity_group":"PER","start":0}"#).unwrap();
        assert!(TokenPrediction::from_raw(&raw).is_none());
    }

    #[test]
    fn test_missing_label_rejected() {
        let raw: RawPrediction =
            serde_json::from_str(r#"{"word":"Sam","start":0,"end":3}"#).unwrap();
        assert!(TokenPrediction::from_raw(&raw).is_none());
    }

    #[test]
    fn test_subword_detection_and_cleaning() {
        let token = TokenPrediction {
            word: "##AI".to_string(),
            label: "ORG".to_string(),
            start: 4,
            end: 6,
        };
        assert!(token.is_subword());
        assert_eq!(token.cleaned_word(), "AI");

        let plain = TokenPrediction {
            word: " Open ".to_string(),
            label: "ORG".to_string(),
            start: 0,
            end: 4,
        };
        assert!(!plain.is_subword());
        assert_eq!(plain.cleaned_word(), "Open");
    }
}
