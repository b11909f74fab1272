//! Candidate id lists for terrain and objects.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainKind {
    Grass,
    Sand,
    Water,
    Swamp,
    Dirt,
    Mud,
    RockyGrass,
    SandyGrass,
    MuddyBank,
    GrassyMud,
    CaveFloor,
    Sidewalk,
    Cobblestone,
    Planking,
    Tile,
    StoneFloor,
    Carpet,
    Floor,
    Ford,
    Rut,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 20] = [
        TerrainKind::Grass,
        TerrainKind::Sand,
        TerrainKind::Water,
        TerrainKind::Swamp,
        TerrainKind::Dirt,
        TerrainKind::Mud,
        TerrainKind::RockyGrass,
        TerrainKind::SandyGrass,
        TerrainKind::MuddyBank,
        TerrainKind::GrassyMud,
        TerrainKind::CaveFloor,
        TerrainKind::Sidewalk,
        TerrainKind::Cobblestone,
        TerrainKind::Planking,
        TerrainKind::Tile,
        TerrainKind::StoneFloor,
        TerrainKind::Carpet,
        TerrainKind::Floor,
        TerrainKind::Ford,
        TerrainKind::Rut,
    ];

    pub fn ids(self) -> &'static [u16] {
        match self {
            TerrainKind::Grass => &[
                4, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 146, 147, 148,
            ],
            TerrainKind::Sand => &[10, 111],
            TerrainKind::Water => &[8],
            TerrainKind::Swamp => &[22, 113, 114, 115, 116, 117],
            TerrainKind::Dirt => &[23],
            TerrainKind::Mud => &[149],
            TerrainKind::RockyGrass => &[46],
            TerrainKind::SandyGrass => &[
                28, 118, 119, 120, 121, 122, 123, 124, 125, 126, 127, 128, 129, 130, 131, 132,
                133,
            ],
            TerrainKind::MuddyBank => &[
                29, 85, 86, 87, 88, 89, 90, 91, 92, 93, 94, 95, 96, 97, 98, 99, 100, 101, 102,
                103, 104, 105, 106, 107, 108, 109,
            ],
            TerrainKind::GrassyMud => &[134, 135, 136, 137, 138, 139, 140, 141, 142, 143, 144, 145],
            TerrainKind::CaveFloor => &[
                5, 49, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63,
            ],
            TerrainKind::Sidewalk => &[1],
            TerrainKind::Cobblestone => &[24],
            TerrainKind::Planking => &[17],
            TerrainKind::Tile => &[18],
            TerrainKind::StoneFloor => &[21],
            TerrainKind::Carpet => &[0, 27, 47, 186, 187, 190, 269, 294, 413],
            TerrainKind::Floor => &[189, 193, 367, 368, 369, 370, 441],
            TerrainKind::Ford => &[14, 15, 84, 112],
            TerrainKind::Rut => &[16, 25],
        }
    }

    /// Terrain kind owning a terrain id, if any.
    pub fn of_id(id: u16) -> Option<TerrainKind> {
        Self::ALL.into_iter().find(|kind| kind.ids().contains(&id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    // vegetation
    Tree,
    Evergreen,
    DeadTree,
    Brambles,
    Reeds,
    Weeds,
    // rocks
    SmallRock,
    Rock,
    Boulder,
    RockOutcropping,
    Mountain,
    // water features
    Well,
    Spring,
    Waves,
    // structure
    Wall,
    Door,
    Window,
    Chimney,
    Fireplace,
    RoofSlate,
    RoofWood,
    RoofTile,
    BrokenWall,
    BrokenRoof,
    Fortress,
    Portcullis,
    Fence,
    // signs
    Sign,
    Banner,
    // furniture
    Table,
    Desk,
    Drawers,
    Nightstand,
    Seat,
    Bed,
    Rug,
    Tapestry,
    Painting,
    Mirror,
    Statue,
    GrandfatherClock,
    Sconce,
    // crafting and farm
    Anvil,
    Bellows,
    Loom,
    AlchemistDevice,
    ChickenCoop,
    // transport
    Cart,
    Bridge,
    Mast,
    // storage
    Cask,
    Keg,
    Chest,
    Garbage,
    Stand,
}

impl ObjectKind {
    pub fn shapes(self) -> &'static [u16] {
        match self {
            ObjectKind::Tree => &[181, 310, 332, 453],
            ObjectKind::Evergreen => &[306],
            ObjectKind::DeadTree => &[185, 325],
            ObjectKind::Brambles => &[320],
            ObjectKind::Reeds => &[321],
            ObjectKind::Weeds => &[314],
            ObjectKind::SmallRock => &[203],
            ObjectKind::Rock => &[331, 341],
            ObjectKind::Boulder => &[342, 343],
            ObjectKind::RockOutcropping => &[163],
            ObjectKind::Mountain => &[180, 182, 183, 195, 196, 197, 324, 395, 396],
            ObjectKind::Well => &[470],
            ObjectKind::Spring => &[7, 13],
            ObjectKind::Waves => &[384],
            ObjectKind::Wall => &[
                151, 152, 205, 206, 218, 219, 220, 221, 253, 266, 273, 308, 344, 345, 346, 348,
                349, 350, 351, 355, 357, 358, 359, 362, 365, 366, 371, 374, 393, 425,
            ],
            ObjectKind::Door => &[270, 376, 432, 433],
            ObjectKind::Window => &[438],
            ObjectKind::Chimney => &[439],
            ObjectKind::Fireplace => &[442],
            ObjectKind::RoofSlate => &[164, 165, 166, 167, 169],
            ObjectKind::RoofWood => &[170, 171, 172, 173, 174, 175, 176],
            ObjectKind::RoofTile => &[156],
            ObjectKind::BrokenWall => &[216, 217, 255, 347, 356],
            ObjectKind::BrokenRoof => &[223],
            ObjectKind::Fortress => &[191, 192, 260, 263, 352],
            ObjectKind::Portcullis => &[271, 272],
            ObjectKind::Fence => &[378, 420, 421, 422],
            ObjectKind::Sign => &[360, 361, 379],
            ObjectKind::Banner => &[286],
            ObjectKind::Table => &[333],
            ObjectKind::Desk => &[283, 407],
            ObjectKind::Drawers => &[416],
            ObjectKind::Nightstand => &[406],
            ObjectKind::Seat => &[292],
            ObjectKind::Bed => &[312, 363],
            ObjectKind::Rug => &[188, 483],
            ObjectKind::Tapestry => &[293],
            ObjectKind::Painting => &[282],
            ObjectKind::Mirror => &[268],
            ObjectKind::Statue => &[486],
            ObjectKind::GrandfatherClock => &[252],
            ObjectKind::Sconce => &[481],
            ObjectKind::Anvil => &[304],
            ObjectKind::Bellows => &[431],
            ObjectKind::Loom => &[261],
            ObjectKind::AlchemistDevice => &[177],
            ObjectKind::ChickenCoop => &[210],
            ObjectKind::Cart => &[301],
            ObjectKind::Bridge => &[212, 213, 214, 215],
            ObjectKind::Mast => &[199],
            ObjectKind::Cask => &[434],
            ObjectKind::Keg => &[258],
            ObjectKind::Chest => &[76],
            ObjectKind::Garbage => &[415],
            ObjectKind::Stand => &[158],
        }
    }
}
