use super::model::{slug, Character};

fn character(name: &str, element: &str, weapon: &str, rarity: u8) -> Character {
    Character {
        id: slug(name),
        name: name.to_string(),
        element: element.to_string(),
        weapon: weapon.to_string(),
        rarity,
    }
}

/// Offline roster used when the remote API is disabled.
pub fn roster() -> Vec<Character> {
    vec![
        character("Albedo", "Geo", "Sword", 5),
        character("Bennett", "Pyro", "Sword", 4),
        character("Diluc", "Pyro", "Claymore", 5),
        character("Fischl", "Electro", "Bow", 4),
        character("Ganyu", "Cryo", "Bow", 5),
        character("Hu Tao", "Pyro", "Polearm", 5),
        character("Kaeya", "Cryo", "Sword", 4),
        character("Mona", "Hydro", "Catalyst", 5),
        character("Raiden Shogun", "Electro", "Polearm", 5),
        character("Sucrose", "Anemo", "Catalyst", 4),
        character("Venti", "Anemo", "Bow", 5),
        character("Xiangling", "Pyro", "Polearm", 4),
        character("Xingqiu", "Hydro", "Sword", 4),
        character("Zhongli", "Geo", "Polearm", 5),
    ]
}
