use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a catalog item the ledger needs: identity and price.
///
/// The catalog itself (CRUD, soft deletes, assets) lives outside this crate;
/// purchases only ever read the price through the [`TemplateCatalog`] port.
///
/// [`TemplateCatalog`]: super::ports::TemplateCatalog
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TemplateRecord {
    pub id: Uuid,
    pub name: String,
    /// Base price in CLP. Zero marks a free template.
    pub base_price_clp: Decimal,
}

impl TemplateRecord {
    pub fn is_free(&self) -> bool {
        self.base_price_clp.is_zero()
    }
}
