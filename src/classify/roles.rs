//! NPC professions and the role data attached to each.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Profession {
    Townsman,
    Townswoman,
    Child,
    Guard,
    Shopkeeper,
    Blacksmith,
    Farmer,
    Mage,
    Sage,
    NobleMale,
    NobleFemale,
    Entertainer,
    Beggar,
    Fighter,
    Ranger,
    Paladin,
    Pirate,
    Gypsy,
    Jester,
}

/// Static description of how a profession looks, talks and behaves.
#[derive(Debug, Clone, Copy)]
pub struct RoleData {
    pub shapes: &'static [u16],
    pub dialogues: &'static [&'static str],
    pub schedule: &'static str,
}

impl Profession {
    pub fn as_str(self) -> &'static str {
        match self {
            Profession::Townsman => "townsman",
            Profession::Townswoman => "townswoman",
            Profession::Child => "child",
            Profession::Guard => "guard",
            Profession::Shopkeeper => "shopkeeper",
            Profession::Blacksmith => "blacksmith",
            Profession::Farmer => "farmer",
            Profession::Mage => "mage",
            Profession::Sage => "sage",
            Profession::NobleMale => "noble_male",
            Profession::NobleFemale => "noble_female",
            Profession::Entertainer => "entertainer",
            Profession::Beggar => "beggar",
            Profession::Fighter => "fighter",
            Profession::Ranger => "ranger",
            Profession::Paladin => "paladin",
            Profession::Pirate => "pirate",
            Profession::Gypsy => "gypsy",
            Profession::Jester => "jester",
        }
    }

    pub fn is_female(self) -> bool {
        matches!(self, Profession::Townswoman | Profession::NobleFemale)
    }

    pub fn role(self) -> RoleData {
        match self {
            Profession::Townsman => RoleData {
                shapes: &[265, 319, 452],
                dialogues: &["greeting_townsfolk", "local_rumor", "weather_talk"],
                schedule: "daytime",
            },
            Profession::Townswoman => RoleData {
                shapes: &[459],
                dialogues: &["greeting_townsfolk", "local_rumor", "market_prices"],
                schedule: "daytime",
            },
            Profession::Child => RoleData {
                shapes: &[471, 472],
                dialogues: &["greeting_child", "play_request"],
                schedule: "play",
            },
            Profession::Guard => RoleData {
                shapes: &[394],
                dialogues: &["greeting_guard", "halt_challenge", "directions"],
                schedule: "patrol",
            },
            Profession::Shopkeeper => RoleData {
                shapes: &[454, 455],
                dialogues: &["greeting_merchant", "buy_offer", "sell_offer", "haggle"],
                schedule: "shop_hours",
            },
            Profession::Blacksmith => RoleData {
                shapes: &[304],
                dialogues: &["greeting_smith", "repair_offer", "weapon_lore"],
                schedule: "work_day",
            },
            Profession::Farmer => RoleData {
                shapes: &[319, 452],
                dialogues: &["greeting_farmer", "harvest_talk", "weather_talk"],
                schedule: "dawn_to_dusk",
            },
            Profession::Mage => RoleData {
                shapes: &[154, 445, 446],
                dialogues: &["greeting_mage", "spell_offer", "arcane_lore"],
                schedule: "nocturnal",
            },
            Profession::Sage => RoleData {
                shapes: &[318, 448],
                dialogues: &["greeting_sage", "history_lore", "healing_offer"],
                schedule: "study",
            },
            Profession::NobleMale | Profession::NobleFemale => RoleData {
                shapes: &[451, 456],
                dialogues: &["greeting_noble", "court_gossip", "dismissal"],
                schedule: "court",
            },
            Profession::Entertainer => RoleData {
                shapes: &[468, 469],
                dialogues: &["greeting_bard", "song_offer", "tall_tale"],
                schedule: "evening",
            },
            Profession::Beggar => RoleData {
                shapes: &[449, 450],
                dialogues: &["greeting_beggar", "alms_plea"],
                schedule: "wander",
            },
            Profession::Fighter => RoleData {
                shapes: &[259, 462, 463],
                dialogues: &["greeting_fighter", "training_offer"],
                schedule: "patrol",
            },
            Profession::Ranger => RoleData {
                shapes: &[460, 461],
                dialogues: &["greeting_ranger", "trail_advice"],
                schedule: "wilderness",
            },
            Profession::Paladin => RoleData {
                shapes: &[247, 464],
                dialogues: &["greeting_paladin", "virtue_talk"],
                schedule: "patrol",
            },
            Profession::Pirate => RoleData {
                shapes: &[401, 458],
                dialogues: &["greeting_pirate", "treasure_rumor"],
                schedule: "evening",
            },
            Profession::Gypsy => RoleData {
                shapes: &[457],
                dialogues: &["greeting_gypsy", "fortune_offer"],
                schedule: "wander",
            },
            Profession::Jester => RoleData {
                shapes: &[467],
                dialogues: &["greeting_jester", "riddle"],
                schedule: "court",
            },
        }
    }

    /// Base `[openness, conscientiousness, extraversion, agreeableness, neuroticism]`.
    pub fn base_personality(self) -> Option<[f32; 5]> {
        let traits = match self {
            Profession::Townsman => [0.4, 0.5, 0.5, 0.6, 0.4],
            Profession::Townswoman => [0.5, 0.6, 0.5, 0.7, 0.4],
            Profession::Child => [0.8, 0.3, 0.8, 0.6, 0.5],
            Profession::Guard => [0.3, 0.8, 0.4, 0.4, 0.3],
            Profession::Shopkeeper => [0.5, 0.7, 0.7, 0.6, 0.3],
            Profession::Blacksmith => [0.4, 0.8, 0.4, 0.5, 0.3],
            Profession::Farmer => [0.3, 0.7, 0.4, 0.6, 0.4],
            Profession::Mage => [0.9, 0.6, 0.3, 0.4, 0.5],
            Profession::Sage => [0.8, 0.7, 0.3, 0.6, 0.3],
            Profession::NobleMale => [0.5, 0.6, 0.6, 0.3, 0.4],
            Profession::NobleFemale => [0.6, 0.6, 0.5, 0.4, 0.5],
            Profession::Entertainer => [0.8, 0.4, 0.9, 0.7, 0.5],
            Profession::Beggar => [0.4, 0.3, 0.4, 0.5, 0.7],
            Profession::Fighter => [0.4, 0.6, 0.5, 0.3, 0.4],
            Profession::Ranger => [0.6, 0.6, 0.3, 0.5, 0.3],
            Profession::Paladin | Profession::Pirate | Profession::Gypsy | Profession::Jester => {
                return None
            }
        };
        Some(traits)
    }

    pub fn knowledge_domains(self) -> Option<&'static [&'static str]> {
        let domains: &'static [&'static str] = match self {
            Profession::Townsman => &["local_gossip", "town_history"],
            Profession::Townswoman => &["local_gossip", "town_history", "cooking"],
            Profession::Child => &["games", "local_secrets"],
            Profession::Guard => &["combat", "law", "town_security"],
            Profession::Shopkeeper => &["commerce", "goods", "local_economy"],
            Profession::Blacksmith => &["smithing", "weapons", "armor", "metallurgy"],
            Profession::Farmer => &["agriculture", "weather", "animals"],
            Profession::Mage => &["magic", "arcana", "history", "alchemy"],
            Profession::Sage => &["history", "lore", "religion", "medicine"],
            Profession::NobleMale => &["politics", "heraldry", "etiquette"],
            Profession::NobleFemale => &["politics", "heraldry", "etiquette", "fashion"],
            Profession::Entertainer => &["music", "stories", "gossip", "performance"],
            Profession::Fighter => &["combat", "weapons", "tactics"],
            Profession::Ranger => &["nature", "tracking", "survival", "beasts"],
            Profession::Beggar
            | Profession::Paladin
            | Profession::Pirate
            | Profession::Gypsy
            | Profession::Jester => return None,
        };
        Some(domains)
    }
}
