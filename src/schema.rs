use crate::mapping::{Coercion, Field, FieldDescriptor, Schema};

pub const PRODUCT_TYPE: &str = "Product2";
pub const PRODUCT_PREFIX: &str = "Product";
pub const PRICEBOOK_ENTRY_TYPE: &str = "PricebookEntry";
pub const PRICEBOOK_ENTRY_PREFIX: &str = "PricebookEntry";

pub fn product_schema() -> Schema {
    Schema {
        record_type: PRODUCT_TYPE.into(),
        ref_prefix: PRODUCT_PREFIX.into(),
        fields: vec![
            column("ProductCode", Coercion::Trim),
            column("Name", Coercion::Trim),
            column("Family", Coercion::Trim),
            column("IsActive", Coercion::Flag),
        ],
    }
}

/// Entries for the price book `pricebook_id`. Row N links to `ProductRefN`,
/// so the input must list entries in the same order as the products.
pub fn pricebook_entry_schema(pricebook_id: &str) -> Schema {
    Schema {
        record_type: PRICEBOOK_ENTRY_TYPE.into(),
        ref_prefix: PRICEBOOK_ENTRY_PREFIX.into(),
        fields: vec![
            Field::Constant {
                key: "Pricebook2Id".into(),
                value: pricebook_id.into(),
            },
            Field::Reference {
                key: "Product2Id".into(),
                target_prefix: PRODUCT_PREFIX.into(),
            },
            column("UnitPrice", Coercion::Decimal),
            column("IsActive", Coercion::Flag),
            column("UseStandardPrice", Coercion::Flag),
        ],
    }
}

// Column and output key share a name in both schemas.
fn column(name: &str, coercion: Coercion) -> Field {
    Field::Column(FieldDescriptor::new(name, name, coercion))
}
