use shared::InventoryItem;

use crate::domain::models::inventory::DomainInventoryItem;

pub struct InventoryMapper;

impl InventoryMapper {
    pub fn to_dto(domain: DomainInventoryItem) -> InventoryItem {
        InventoryItem {
            id: domain.id,
            account_id: domain.account_id,
            name: domain.name,
            reference: domain.reference,
            quantity: domain.quantity,
            unit_price: domain.unit_price,
            min_stock: domain.min_stock,
            category: domain.category,
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_dto_list(items: Vec<DomainInventoryItem>) -> Vec<InventoryItem> {
        items.into_iter().map(Self::to_dto).collect()
    }
}
