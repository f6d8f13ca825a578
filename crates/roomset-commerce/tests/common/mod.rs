#![allow(dead_code)]

use roomset_commerce::prelude::*;

pub fn cny(units: i64) -> Money {
    Money::from_units(units, Currency::CNY)
}

/// A living room package as the catalog service sends it.
pub const LIVING_ROOM_JSON: &str = r#"{
    "id": 1001,
    "name": "Living room essentials",
    "basePrice": "¥5,000",
    "categories": [
        {
            "key": "sofa",
            "name": "Sofa",
            "required": 2,
            "products": [
                {
                    "id": "sofa-a",
                    "name": "Cloud sofa",
                    "price": 3000,
                    "materials": { "面料": "Linen, Velvet", "legs": ["Oak", "Titanium Legs-Silver"] },
                    "materialUpgradePrices": { "Velvet": 500, "Titanium Legs-Black": 900 },
                    "materialImages": { "Velvet": "https://img.example/velvet.png" }
                },
                { "id": "sofa-b", "name": "Block sofa", "price": "3200" },
                { "id": "sofa-c", "name": "Low sofa", "price": 2800 }
            ]
        },
        {
            "key": "table",
            "name": "Coffee table",
            "count": 1,
            "products": [
                {
                    "id": "table-a",
                    "name": "Slate table",
                    "price": 1000,
                    "materials": { "tabletop": { "options": ["Ceramic", "Imported Leather"] } }
                }
            ]
        }
    ]
}"#;

pub fn living_room() -> PackagePlan {
    RawPackagePlan::from_json(LIVING_ROOM_JSON)
        .and_then(|raw| raw.normalize(Currency::CNY))
        .expect("fixture plan normalizes")
}

/// Two categories with one product each, no materials.
pub fn two_singles(base: i64) -> PackagePlan {
    PackagePlan::new("duo", "Duo", cny(base))
        .with_category(
            PackageCategory::new("bed", "Bed", 1)
                .with_product(PackageProduct::new("bed-a", "Bed A", cny(4000))),
        )
        .with_category(
            PackageCategory::new("lamp", "Lamp", 1)
                .with_product(PackageProduct::new("lamp-a", "Lamp A", cny(300))),
        )
}

pub fn lenient() -> EngineConfig {
    EngineConfig::default().with_material_selection(MaterialSelectionPolicy::DefaultToBase)
}
