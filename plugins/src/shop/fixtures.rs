use super::model::Product;

fn product(id: u32, name: &str, category: &str, price_cents: u64, stock: u32, rating: f32) -> Product {
    Product {
        id,
        name: name.to_string(),
        category: category.to_string(),
        price_cents,
        stock,
        rating,
    }
}

/// Demo catalogue. Each call returns a fresh copy so shops never share stock.
pub fn catalog() -> Vec<Product> {
    vec![
        product(1, "Pour-over Kettle", "kitchen", 3499, 8, 4.6),
        product(2, "Ceramic Mug", "kitchen", 1250, 5, 4.4),
        product(3, "Chef's Knife", "kitchen", 6900, 3, 4.8),
        product(4, "Linen Apron", "kitchen", 2400, 12, 4.1),
        product(5, "Desk Lamp", "office", 4599, 6, 4.3),
        product(6, "Notebook (A5, dotted)", "office", 899, 40, 4.7),
        product(7, "Fountain Pen", "office", 2850, 10, 4.5),
        product(8, "Monitor Stand", "office", 5200, 0, 3.9),
        product(9, "Trail Runners", "outdoor", 11900, 4, 4.2),
        product(10, "Water Bottle", "outdoor", 1999, 25, 4.6),
        product(11, "Headlamp", "outdoor", 3250, 9, 4.4),
        product(12, "Camp Stove", "outdoor", 7499, 2, 4.0),
        product(13, "Wool Beanie", "apparel", 2200, 14, 4.3),
        product(14, "Rain Shell", "apparel", 13500, 3, 4.5),
    ]
}
