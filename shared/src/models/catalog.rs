//! Battery catalog models
//!
//! The catalog is a three level hierarchy (category → group → subgroup) with
//! battery SKUs attached to the leaves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// Level of a catalog node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatalogLevel {
    Category,
    Group,
    Subgroup,
}

impl CatalogLevel {
    /// Minimum trimmed length of a node name
    pub fn min_name_len(&self) -> usize {
        match self {
            CatalogLevel::Category => 3,
            CatalogLevel::Group | CatalogLevel::Subgroup => 2,
        }
    }
}

/// Category, group or subgroup create/edit form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogNodeForm {
    pub nome: String,
    pub descricao: Option<String>,
    /// Parent node (category for a group, group for a subgroup)
    pub id_pai: Option<EntityId>,
}

/// Battery SKU create/edit form
///
/// Numeric fields are optional so that an empty input can be told apart from
/// a zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryForm {
    pub codigo: String,
    pub modelo: String,
    pub amperagem: Option<f64>,
    pub garantia_meses: Option<f64>,
    pub preco_venda: Option<Decimal>,
    pub preco_custo: Option<Decimal>,
    pub id_categoria: Option<EntityId>,
    pub id_grupo: Option<EntityId>,
    pub id_subgrupo: Option<EntityId>,
}
