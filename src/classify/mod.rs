//! Tag classification.
//!
//! Every string lookup on feature tags happens here. Downstream code only sees
//! the closed enums produced by [`classify`], [`terrain_for`] and
//! [`objects_for`].

mod roles;
mod shapes;

use std::collections::BTreeMap;

pub use roles::{Profession, RoleData};
pub use shapes::{ObjectKind, TerrainKind};

pub type Tags = BTreeMap<String, String>;

/// Default road width for highway values without an explicit entry.
const DEFAULT_ROAD_WIDTH: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildingType {
    House,
    Residential,
    Apartments,
    Detached,
    Terrace,
    Commercial,
    Retail,
    Shop,
    Kiosk,
    Industrial,
    Warehouse,
    Barn,
    Farm,
    Church,
    Chapel,
    Cathedral,
    Public,
    Civic,
    Government,
    Hospital,
    School,
    University,
    Castle,
    Fort,
    Tower,
    Ruins,
    Bridge,
    Tavern,
    Other(String),
}

impl BuildingType {
    pub fn from_tag(value: &str) -> Self {
        match value {
            "house" => BuildingType::House,
            "residential" => BuildingType::Residential,
            "apartments" => BuildingType::Apartments,
            "detached" => BuildingType::Detached,
            "terrace" => BuildingType::Terrace,
            "commercial" => BuildingType::Commercial,
            "retail" => BuildingType::Retail,
            "shop" => BuildingType::Shop,
            "kiosk" => BuildingType::Kiosk,
            "industrial" => BuildingType::Industrial,
            "warehouse" => BuildingType::Warehouse,
            "barn" => BuildingType::Barn,
            "farm" => BuildingType::Farm,
            "church" => BuildingType::Church,
            "chapel" => BuildingType::Chapel,
            "cathedral" => BuildingType::Cathedral,
            "public" => BuildingType::Public,
            "civic" => BuildingType::Civic,
            "government" => BuildingType::Government,
            "hospital" => BuildingType::Hospital,
            "school" => BuildingType::School,
            "university" => BuildingType::University,
            "castle" => BuildingType::Castle,
            "fort" => BuildingType::Fort,
            "tower" => BuildingType::Tower,
            "ruins" => BuildingType::Ruins,
            "bridge" => BuildingType::Bridge,
            "tavern" => BuildingType::Tavern,
            other => BuildingType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BuildingType::House => "house",
            BuildingType::Residential => "residential",
            BuildingType::Apartments => "apartments",
            BuildingType::Detached => "detached",
            BuildingType::Terrace => "terrace",
            BuildingType::Commercial => "commercial",
            BuildingType::Retail => "retail",
            BuildingType::Shop => "shop",
            BuildingType::Kiosk => "kiosk",
            BuildingType::Industrial => "industrial",
            BuildingType::Warehouse => "warehouse",
            BuildingType::Barn => "barn",
            BuildingType::Farm => "farm",
            BuildingType::Church => "church",
            BuildingType::Chapel => "chapel",
            BuildingType::Cathedral => "cathedral",
            BuildingType::Public => "public",
            BuildingType::Civic => "civic",
            BuildingType::Government => "government",
            BuildingType::Hospital => "hospital",
            BuildingType::School => "school",
            BuildingType::University => "university",
            BuildingType::Castle => "castle",
            BuildingType::Fort => "fort",
            BuildingType::Tower => "tower",
            BuildingType::Ruins => "ruins",
            BuildingType::Bridge => "bridge",
            BuildingType::Tavern => "tavern",
            BuildingType::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKind {
    Main,
    Living,
    Bedroom,
    Showroom,
    Storage,
    Kitchen,
    Throne,
    Hall,
    Office,
}

/// Object candidates keyed by structural role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectSet {
    pub walls: Option<ObjectKind>,
    pub roof: Option<ObjectKind>,
    pub door: Option<ObjectKind>,
    pub window: Option<ObjectKind>,
    pub floor: Option<ObjectKind>,
    pub main: Option<ObjectKind>,
}

impl ObjectSet {
    fn with_main(kind: ObjectKind) -> Self {
        Self {
            main: Some(kind),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn main_shapes(&self) -> &'static [u16] {
        self.main.map(ObjectKind::shapes).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highway {
    pub kind: String,
    pub terrain: TerrainKind,
    pub width: u32,
    pub bridge: bool,
}

/// How a feature is handled by generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureKind {
    Highway(Highway),
    Building(BuildingType),
    Area { terrain: TerrainKind, closed: bool },
    Waterway(TerrainKind),
    Barrier(Option<ObjectKind>),
    Unclassified,
}

/// Classify a way. Precedence: highway, building, landuse/natural, waterway,
/// barrier.
pub fn classify(tags: &Tags, closed: bool) -> FeatureKind {
    if let Some(value) = tags.get("highway") {
        return FeatureKind::Highway(Highway {
            kind: value.clone(),
            terrain: highway_terrain(value).unwrap_or(TerrainKind::Cobblestone),
            width: highway_width(value),
            bridge: tag_is(tags, "bridge", "yes") || tag_is(tags, "man_made", "bridge"),
        });
    }
    if let Some(value) = tags.get("building") {
        return FeatureKind::Building(BuildingType::from_tag(value));
    }
    if tags.contains_key("landuse") || tags.contains_key("natural") {
        return FeatureKind::Area {
            terrain: terrain_for(tags),
            closed,
        };
    }
    if let Some(value) = tags.get("waterway") {
        return FeatureKind::Waterway(waterway_terrain(value).unwrap_or(TerrainKind::Water));
    }
    if tags.contains_key("barrier") {
        return FeatureKind::Barrier(objects_for(tags).main);
    }
    FeatureKind::Unclassified
}

/// Terrain for a tag set: landuse, natural, surface, highway, waterway; the
/// first category with a mapped value wins, grass otherwise.
pub fn terrain_for(tags: &Tags) -> TerrainKind {
    let lookups: [(&str, fn(&str) -> Option<TerrainKind>); 5] = [
        ("landuse", landuse_terrain),
        ("natural", natural_terrain),
        ("surface", surface_terrain),
        ("highway", highway_terrain),
        ("waterway", waterway_terrain),
    ];
    lookups
        .iter()
        .find_map(|(key, lookup)| tags.get(*key).and_then(|value| lookup(value)))
        .unwrap_or(TerrainKind::Grass)
}

/// Objects for a tag set: building, amenity, natural, barrier, man_made.
pub fn objects_for(tags: &Tags) -> ObjectSet {
    if let Some(value) = tags.get("building") {
        return building_parts(&BuildingType::from_tag(value));
    }
    let lookups: [(&str, fn(&str) -> Option<ObjectKind>); 4] = [
        ("amenity", amenity_object),
        ("natural", natural_object),
        ("barrier", barrier_object),
        ("man_made", man_made_object),
    ];
    lookups
        .iter()
        .find_map(|(key, lookup)| tags.get(*key).and_then(|value| lookup(value)))
        .map(ObjectSet::with_main)
        .unwrap_or_default()
}

pub fn building_parts(building: &BuildingType) -> ObjectSet {
    use ObjectKind::*;
    let (walls, roof, door, window) = match building {
        BuildingType::House
        | BuildingType::Residential
        | BuildingType::Terrace
        | BuildingType::Church
        | BuildingType::Chapel
        | BuildingType::School
        | BuildingType::University => (Some(Wall), Some(RoofSlate), Some(Door), Some(Window)),
        BuildingType::Apartments
        | BuildingType::Commercial
        | BuildingType::Retail
        | BuildingType::Public
        | BuildingType::Civic
        | BuildingType::Hospital => (Some(Wall), Some(RoofTile), Some(Door), Some(Window)),
        BuildingType::Detached | BuildingType::Shop => {
            (Some(Wall), Some(RoofWood), Some(Door), Some(Window))
        }
        BuildingType::Kiosk | BuildingType::Warehouse | BuildingType::Barn | BuildingType::Farm => {
            (Some(Wall), Some(RoofWood), Some(Door), None)
        }
        BuildingType::Industrial => (Some(Wall), Some(RoofTile), Some(Door), None),
        BuildingType::Cathedral | BuildingType::Government => {
            (Some(Fortress), Some(RoofSlate), Some(Door), Some(Window))
        }
        BuildingType::Castle | BuildingType::Fort => {
            (Some(Fortress), Some(RoofSlate), Some(Portcullis), None)
        }
        BuildingType::Tower => (Some(Fortress), Some(RoofSlate), None, None),
        BuildingType::Ruins => (Some(BrokenWall), Some(BrokenRoof), None, None),
        BuildingType::Bridge => {
            return ObjectSet {
                floor: Some(ObjectKind::Bridge),
                ..ObjectSet::default()
            }
        }
        BuildingType::Tavern | BuildingType::Other(_) => {
            return building_parts(&BuildingType::House)
        }
    };
    ObjectSet {
        walls,
        roof,
        door,
        window,
        ..ObjectSet::default()
    }
}

/// Professions that may occupy a building.
pub fn professions_for(building: &BuildingType) -> &'static [Profession] {
    use Profession::*;
    match building {
        BuildingType::House => &[Townsman, Townswoman],
        BuildingType::Residential => &[Townsman, Townswoman, Child],
        BuildingType::Shop | BuildingType::Retail => &[Shopkeeper],
        BuildingType::Commercial => &[Shopkeeper, Townsman],
        BuildingType::Church | BuildingType::Hospital | BuildingType::School => &[Sage],
        BuildingType::Castle => &[Guard, NobleMale, NobleFemale],
        BuildingType::Fort => &[Guard, Fighter],
        BuildingType::Government => &[Guard, NobleMale],
        BuildingType::Tavern => &[Entertainer, Townsman, Townswoman],
        BuildingType::Farm | BuildingType::Barn => &[Farmer],
        BuildingType::Industrial => &[Blacksmith, Townsman],
        _ => &[Townsman],
    }
}

/// Furniture to place in a room, in placement order.
pub fn furniture_for(building: &BuildingType, room: RoomKind) -> &'static [ObjectKind] {
    use ObjectKind::*;
    match room {
        RoomKind::Living => &[Table, Seat, Seat, Rug, Fireplace],
        RoomKind::Bedroom => &[Bed, Nightstand, Drawers],
        RoomKind::Showroom => &[Stand, Table, Sign],
        RoomKind::Storage => &[Cask, Keg, Chest],
        RoomKind::Kitchen => &[Table, Cask, Fireplace],
        RoomKind::Throne => &[Seat, Banner, Tapestry, Rug],
        RoomKind::Hall => &[Table, Seat, Seat, Tapestry],
        RoomKind::Office => &[Desk, Seat, Drawers],
        RoomKind::Main => match building {
            BuildingType::Tavern => &[Table, Table, Seat, Seat, Keg],
            BuildingType::Church | BuildingType::Chapel | BuildingType::Cathedral => {
                &[Statue, Seat, Seat, Sconce]
            }
            BuildingType::Industrial => &[Anvil, Bellows, Cask],
            BuildingType::Farm | BuildingType::Barn => &[ChickenCoop, Cask, Cart],
            BuildingType::School | BuildingType::University => &[Desk, Desk, Seat],
            BuildingType::Hospital => &[Bed, Bed, Table],
            BuildingType::Shop | BuildingType::Retail | BuildingType::Commercial => {
                &[Stand, Table, Chest]
            }
            BuildingType::Warehouse => &[Cask, Keg, Chest, Chest],
            BuildingType::Ruins | BuildingType::Bridge => &[],
            _ => &[Table, Seat, Chest],
        },
    }
}

pub fn highway_width(value: &str) -> u32 {
    match value {
        "motorway" | "trunk" => 4,
        "primary" | "secondary" => 3,
        "tertiary" | "residential" | "pedestrian" => 2,
        "service" | "track" | "path" | "footway" | "cycleway" | "bridleway" | "steps" => 1,
        _ => DEFAULT_ROAD_WIDTH,
    }
}

fn tag_is(tags: &Tags, key: &str, expected: &str) -> bool {
    tags.get(key).map(String::as_str) == Some(expected)
}

fn landuse_terrain(value: &str) -> Option<TerrainKind> {
    use TerrainKind::*;
    let kind = match value {
        "forest" | "grass" | "meadow" | "farmland" | "orchard" | "vineyard" | "residential"
        | "cemetery" | "military" => Grass,
        "allotments" | "construction" | "brownfield" | "landfill" => Dirt,
        "beach" | "sand" => Sand,
        "wetland" | "marsh" => Swamp,
        "mud" => Mud,
        "rock" | "bare_rock" | "quarry" => RockyGrass,
        "commercial" | "industrial" | "retail" => Cobblestone,
        _ => return None,
    };
    Some(kind)
}

fn natural_terrain(value: &str) -> Option<TerrainKind> {
    use TerrainKind::*;
    let kind = match value {
        "water" => Water,
        "wetland" => Swamp,
        "beach" | "sand" => Sand,
        "mud" => Mud,
        "bare_rock" | "scree" => RockyGrass,
        "grassland" | "heath" | "scrub" | "wood" => Grass,
        _ => return None,
    };
    Some(kind)
}

fn surface_terrain(value: &str) -> Option<TerrainKind> {
    use TerrainKind::*;
    let kind = match value {
        "asphalt" | "paving_stones" | "cobblestone" => Cobblestone,
        "concrete" => StoneFloor,
        "gravel" | "unpaved" | "ground" => Dirt,
        "grass" => Grass,
        "sand" => Sand,
        "wood" => Planking,
        "metal" => Tile,
        _ => return None,
    };
    Some(kind)
}

fn highway_terrain(value: &str) -> Option<TerrainKind> {
    use TerrainKind::*;
    let kind = match value {
        "motorway" | "trunk" | "primary" | "secondary" | "tertiary" | "residential"
        | "pedestrian" => Cobblestone,
        "service" | "path" | "cycleway" | "bridleway" => Dirt,
        "track" => Rut,
        "footway" => Sidewalk,
        "steps" => StoneFloor,
        _ => return None,
    };
    Some(kind)
}

fn waterway_terrain(value: &str) -> Option<TerrainKind> {
    use TerrainKind::*;
    let kind = match value {
        "river" | "stream" | "canal" | "drain" => Water,
        "ditch" => MuddyBank,
        "dam" => StoneFloor,
        _ => return None,
    };
    Some(kind)
}

fn amenity_object(value: &str) -> Option<ObjectKind> {
    use ObjectKind::*;
    let kind = match value {
        "fountain" | "drinking_water" => Well,
        "bench" => Seat,
        "waste_basket" => Garbage,
        "post_box" => Chest,
        "clock" => GrandfatherClock,
        "shelter" => RoofWood,
        "marketplace" => Stand,
        "place_of_worship" => Statue,
        _ => return None,
    };
    Some(kind)
}

fn natural_object(value: &str) -> Option<ObjectKind> {
    use ObjectKind::*;
    let kind = match value {
        "tree" | "wood" => Tree,
        "scrub" => Brambles,
        "wetland" => Reeds,
        "water" => Waves,
        "spring" => Spring,
        "rock" | "stone" => Rock,
        "peak" => Mountain,
        "cliff" => RockOutcropping,
        _ => return None,
    };
    Some(kind)
}

fn barrier_object(value: &str) -> Option<ObjectKind> {
    use ObjectKind::*;
    let kind = match value {
        "fence" => Fence,
        "wall" | "retaining_wall" => Wall,
        "hedge" => Brambles,
        "gate" => Door,
        "bollard" => SmallRock,
        "city_wall" => Fortress,
        _ => return None,
    };
    Some(kind)
}

fn man_made_object(value: &str) -> Option<ObjectKind> {
    use ObjectKind::*;
    let kind = match value {
        "bridge" => Bridge,
        "tower" | "water_tower" | "lighthouse" => Fortress,
        "chimney" => Chimney,
        "windmill" => Mast,
        "well" => Well,
        "storage_tank" => Keg,
        _ => return None,
    };
    Some(kind)
}
