//! # radar-core — Fusão de Menções de Entidades Nomeadas
//!
//! Este crate reconstrói menções de entidades legíveis a partir da saída
//! **token a token** de um serviço NER hospedado. O modelo devolve sub-words
//! (WordPiece) com offsets de caracteres; aqui os fragmentos são costurados
//! de volta em nomes completos, com tipo semântico e sem duplicatas.
//!
//! ## Fluxo de Dados
//!
//! 1. **Entrada**: texto bruto (título + corpo de um artigo), enviado ao
//!    serviço NER externo pelo chamador, fora deste crate.
//! 2. **Predições** ([`prediction`]): a resposta do serviço, um registro por
//!    token, decodificada com tolerância a registros malformados.
//! 3. **Fusão** ([`merger`]): uma passada ordenada que costura sub-words
//!    (`Open` + `##AI` → `OpenAI`), une tokens adjacentes do mesmo tipo e
//!    deduplica por nome preservando a ordem de primeira ocorrência.
//! 4. **Saída** ([`entity`]): lista de [`EntityMention`] (`{name, type}`),
//!    pronta para persistência ou exibição.
//!
//! A fusão é pura, síncrona e sem I/O: chamadas são independentes entre si
//! e podem rodar em paralelo (uma por artigo, ver [`merger::merge_batch`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use radar_core::{merge, RawPrediction};
//!
//! // Resposta do serviço NER para "OpenAI contratou Sam Altman"
//! let payload = r###"[
//!     {"word": "Open",   "entity_group": "ORG", "start": 0,  "end": 4},
//!     {"word": "##AI",   "entity_group": "ORG", "start": 4,  "end": 6},
//!     {"word": "Sam",    "entity_group": "PER", "start": 17, "end": 20},
//!     {"word": "Altman", "entity_group": "PER", "start": 21, "end": 27}
//! ]"###;
//!
//! let predictions: Vec<RawPrediction> = serde_json::from_str(payload).unwrap();
//! let mentions = merge(&predictions);
//!
//! assert_eq!(mentions.len(), 2);
//! assert_eq!(mentions[0].name, "OpenAI");
//! assert_eq!(mentions[1].name, "Sam Altman");
//! ```

pub mod entity;
pub mod merger;
pub mod prediction;

pub use entity::{EntityCategory, EntityMention};
pub use merger::{dedup, merge, merge_batch};
pub use prediction::{RawPrediction, TokenPrediction, SUBWORD_MARKER};
