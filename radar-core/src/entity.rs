//! # Menções de Entidades e Categorias
//!
//! Tipos de saída da fusão: a menção reconstruída ([`EntityMention`]) e a
//! categoria semântica de exibição ([`EntityCategory`]).
//!
//! | Categoria | Significado         | Exemplos                     |
//! |-----------|---------------------|------------------------------|
//! | PER       | Pessoa              | Sam Altman, Lula             |
//! | ORG       | Organização         | OpenAI, Petrobras, FIFA      |
//! | LOC       | Local/Geográfico    | São Paulo, Brasil            |
//! | MISC      | Miscelânea          | GPT-4, Copa do Mundo         |
//!
//! O campo `type` da menção permanece uma **string opaca**: é o rótulo que o
//! modelo emitiu, e o conjunto de rótulos é do modelo, não nosso. A categoria
//! é apenas uma leitura de exibição (cor, ícone) derivada desse rótulo.

use serde::{Deserialize, Serialize};

/// Uma menção de entidade reconstruída no texto de origem.
///
/// É o elemento de saída da fusão: o nome legível (um ou mais tokens
/// costurados) e o rótulo semântico carregado pelo **primeiro** token da
/// menção. Serializa como `{"name": ..., "type": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Texto reconstruído, sem espaços nas bordas (ex: "Sam Altman").
    pub name: String,
    /// Rótulo semântico da menção (ex: "PER", "B-ORG").
    #[serde(rename = "type")]
    pub kind: String,
}

impl EntityMention {
    /// Categoria de exibição derivada do rótulo, se reconhecida.
    pub fn category(&self) -> Option<EntityCategory> {
        EntityCategory::from_label(&self.kind)
    }
}

/// Categorias de entidade reconhecidas para fins de exibição.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// **Pessoa**: nomes de humanos. Ex: "Sam Altman".
    Per,
    /// **Organização**: empresas, instituições, times. Ex: "OpenAI", "STF".
    Org,
    /// **Localização**: países, cidades, acidentes geográficos. Ex: "Brasil".
    Loc,
    /// **Miscelânea**: eventos, produtos, obras. Ex: "GPT-4".
    Misc,
}

impl EntityCategory {
    /// Nome da categoria como string (para serialização e UI)
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Cor CSS para destaque na UI
    pub fn color(&self) -> &'static str {
        match self {
            EntityCategory::Per => "#3b82f6",  // azul
            EntityCategory::Org => "#10b981",  // verde esmeralda
            EntityCategory::Loc => "#f59e0b",  // âmbar
            EntityCategory::Misc => "#8b5cf6", // violeta
        }
    }

    /// Ícone emoji para a categoria
    pub fn icon(&self) -> &'static str {
        match self {
            EntityCategory::Per => "👤",
            EntityCategory::Org => "🏢",
            EntityCategory::Loc => "📍",
            EntityCategory::Misc => "🔖",
        }
    }

    /// Parseia um rótulo do modelo, aceitando a forma nua ("PER") e a
    /// forma com prefixo BIO ("B-PER", "I-PER").
    pub fn from_label(label: &str) -> Option<Self> {
        let bare = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(label);
        match bare {
            "PER" => Some(EntityCategory::Per),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }
}
