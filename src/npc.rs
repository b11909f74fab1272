//! NPC profiles, personalities and per-building relationships.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::classify::{BuildingType, Profession};
use crate::geo::TileCoord;
use crate::rng::RngExt;

const MALE_NAMES: &[&str] = &[
    "Gareth", "Aldric", "Cedric", "Edmund", "Roland", "Geoffrey", "Wilfred", "Oswald",
    "Reginald", "Bernard",
];

const FEMALE_NAMES: &[&str] = &[
    "Elara", "Beatrice", "Gwyneth", "Isolde", "Rowena", "Millicent", "Cordelia", "Elowen",
    "Rosalind", "Lysandra",
];

const TRAIT_NOISE: f32 = 0.15;
const NEUTRAL_TRAITS: [f32; 5] = [0.5; 5];
const GENERAL_KNOWLEDGE: &[&str] = &["general"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NpcId(pub u32);

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npc_{:04}", self.0)
    }
}

impl Serialize for NpcId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Big-five trait values, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Personality {
    pub openness: f32,
    pub conscientiousness: f32,
    pub extraversion: f32,
    pub agreeableness: f32,
    pub neuroticism: f32,
}

impl Personality {
    /// Base traits for a profession with uniform noise of ±0.15, clamped.
    pub fn roll<R: Rng>(profession: Profession, rng: &mut R) -> Self {
        let base = profession.base_personality().unwrap_or(NEUTRAL_TRAITS);
        let mut vary = |value: f32| {
            (value + rng.gen_range(-TRAIT_NOISE..=TRAIT_NOISE)).clamp(0.0, 1.0)
        };
        Self {
            openness: vary(base[0]),
            conscientiousness: vary(base[1]),
            extraversion: vary(base[2]),
            agreeableness: vary(base[3]),
            neuroticism: vary(base[4]),
        }
    }

    pub fn traits(&self) -> [f32; 5] {
        [
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NpcProfile {
    pub id: NpcId,
    pub name: String,
    pub profession: Profession,
    pub building_type: String,
    pub tile: TileCoord,
    pub shape: u16,
    pub personality: Personality,
    pub dialogues: Vec<String>,
    pub schedule: String,
    pub knowledge_domains: Vec<String>,
    pub relationships: BTreeMap<NpcId, f32>,
}

/// All NPCs of a session, in creation order.
#[derive(Debug)]
pub struct NpcRoster {
    next_id: u32,
    profiles: Vec<NpcProfile>,
}

impl NpcRoster {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            profiles: Vec::new(),
        }
    }

    /// Create and register a profile for an NPC already placed at `tile`.
    pub fn spawn<R: Rng>(
        &mut self,
        rng: &mut R,
        profession: Profession,
        building: &BuildingType,
        tile: TileCoord,
        shape: u16,
    ) -> NpcId {
        let id = NpcId(self.next_id);
        self.next_id += 1;

        let names = if profession.is_female() {
            FEMALE_NAMES
        } else {
            MALE_NAMES
        };
        let name = rng.pick(names).unwrap_or("Nameless").to_string();
        let personality = Personality::roll(profession, rng);
        let role = profession.role();
        let knowledge = profession.knowledge_domains().unwrap_or(GENERAL_KNOWLEDGE);

        self.profiles.push(NpcProfile {
            id,
            name,
            profession,
            building_type: building.as_str().to_string(),
            tile,
            shape,
            personality,
            dialogues: role.dialogues.iter().map(|s| s.to_string()).collect(),
            schedule: role.schedule.to_string(),
            knowledge_domains: knowledge.iter().map(|s| s.to_string()).collect(),
            relationships: BTreeMap::new(),
        });
        id
    }

    /// Link every occupant of one building to every other occupant.
    ///
    /// Each ordered pair gets its own draw in `[0.3, 0.7]`, so `a -> b` and
    /// `b -> a` usually differ.
    pub fn link_occupants<R: Rng>(&mut self, occupants: &[NpcId], rng: &mut R) {
        if occupants.len() < 2 {
            return;
        }
        for &from in occupants {
            for &to in occupants {
                if from == to {
                    continue;
                }
                let strength: f32 = rng.gen_range(0.3..=0.7);
                if let Some(profile) = self.get_mut(from) {
                    profile.relationships.insert(to, strength.clamp(0.0, 1.0));
                }
            }
        }
    }

    pub fn get(&self, id: NpcId) -> Option<&NpcProfile> {
        let index = id.0.checked_sub(1)? as usize;
        self.profiles.get(index)
    }

    fn get_mut(&mut self, id: NpcId) -> Option<&mut NpcProfile> {
        let index = id.0.checked_sub(1)? as usize;
        self.profiles.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn profiles(&self) -> &[NpcProfile] {
        &self.profiles
    }

    pub fn into_profiles(self) -> Vec<NpcProfile> {
        self.profiles
    }
}

impl Default for NpcRoster {
    fn default() -> Self {
        Self::new()
    }
}

/// Total directed relationship edges across all profiles.
pub fn relationship_count(profiles: &[NpcProfile]) -> usize {
    profiles.iter().map(|p| p.relationships.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SessionRng;

    fn spawn(roster: &mut NpcRoster, rng: &mut SessionRng, profession: Profession) -> NpcId {
        roster.spawn(
            rng,
            profession,
            &BuildingType::House,
            TileCoord::new(1, 1),
            265,
        )
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut rng = SessionRng::new(5);
        let mut roster = NpcRoster::new();
        let a = spawn(&mut roster, &mut rng, Profession::Townsman);
        let b = spawn(&mut roster, &mut rng, Profession::Townswoman);
        assert_eq!(a, NpcId(1));
        assert_eq!(b, NpcId(2));
        assert_eq!(a.to_string(), "npc_0001");
        assert_eq!(roster.get(b).map(|p| p.id), Some(b));
        assert!(roster.get(NpcId(0)).is_none());
    }

    #[test]
    fn female_professions_get_female_names() {
        let mut rng = SessionRng::new(11);
        let mut roster = NpcRoster::new();
        for _ in 0..10 {
            let id = spawn(&mut roster, &mut rng, Profession::NobleFemale);
            let name = roster.get(id).map(|p| p.name.clone()).unwrap_or_default();
            assert!(FEMALE_NAMES.contains(&name.as_str()));
        }
    }

    #[test]
    fn personality_stays_near_base_and_in_range() {
        let mut rng = SessionRng::new(2);
        let base = Profession::Entertainer.base_personality().expect("mapped");
        for _ in 0..200 {
            let traits = Personality::roll(Profession::Entertainer, &mut rng).traits();
            for (value, base) in traits.iter().zip(base) {
                assert!((0.0..=1.0).contains(value));
                assert!((value - base).abs() <= TRAIT_NOISE + 1e-6);
            }
        }
    }

    #[test]
    fn unmapped_profession_gets_general_knowledge() {
        let mut rng = SessionRng::new(3);
        let mut roster = NpcRoster::new();
        let id = spawn(&mut roster, &mut rng, Profession::Jester);
        let profile = roster.get(id).expect("spawned");
        assert_eq!(profile.knowledge_domains, vec!["general".to_string()]);
        assert!((0.35..=0.65).contains(&profile.personality.openness));
    }

    #[test]
    fn single_occupant_has_no_relationships() {
        let mut rng = SessionRng::new(4);
        let mut roster = NpcRoster::new();
        let id = spawn(&mut roster, &mut rng, Profession::Guard);
        roster.link_occupants(&[id], &mut rng);
        assert_eq!(relationship_count(roster.profiles()), 0);
    }

    #[test]
    fn occupants_link_in_both_directions_within_band() {
        let mut rng = SessionRng::new(4);
        let mut roster = NpcRoster::new();
        let ids: Vec<NpcId> = (0..3)
            .map(|_| spawn(&mut roster, &mut rng, Profession::Townsman))
            .collect();
        roster.link_occupants(&ids, &mut rng);
        assert_eq!(relationship_count(roster.profiles()), 6);
        for profile in roster.profiles() {
            assert!(!profile.relationships.contains_key(&profile.id));
            for strength in profile.relationships.values() {
                assert!((0.3..=0.7).contains(strength));
            }
        }
    }

    #[test]
    fn relationships_do_not_span_buildings() {
        let mut rng = SessionRng::new(8);
        let mut roster = NpcRoster::new();
        let first: Vec<NpcId> = (0..2)
            .map(|_| spawn(&mut roster, &mut rng, Profession::Townsman))
            .collect();
        roster.link_occupants(&first, &mut rng);
        let second: Vec<NpcId> = (0..2)
            .map(|_| spawn(&mut roster, &mut rng, Profession::Guard))
            .collect();
        roster.link_occupants(&second, &mut rng);
        for id in &first {
            let profile = roster.get(*id).expect("spawned");
            assert!(profile.relationships.keys().all(|k| first.contains(k)));
        }
    }

    #[test]
    fn npc_id_serializes_as_label() {
        let json = serde_json::to_string(&NpcId(12)).expect("serialize");
        assert_eq!(json, "\"npc_0012\"");
    }
}
