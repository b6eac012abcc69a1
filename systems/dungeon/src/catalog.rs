//! Room template catalog consumed by the generator.

use serde::{Deserialize, Serialize};
use swarm_td_core::{Rect, Side, Vec2};
use thiserror::Error;

/// Reasons a template catalog may be rejected at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The TOML document could not be parsed into the catalog schema.
    #[error("failed to parse template catalog: {0}")]
    Parse(#[from] toml::de::Error),
    /// The catalog lists no templates the generator may expand into.
    #[error("template catalog defines no expansion rooms")]
    NoRoomTemplates,
    /// A template has a zero dimension.
    #[error("template `{id}` has zero width or height")]
    EmptyTemplate {
        /// Identifier of the offending template.
        id: String,
    },
    /// A template places its player spawn outside its own bounds.
    #[error("template `{id}` places the player spawn outside the room")]
    SpawnOutside {
        /// Identifier of the offending template.
        id: String,
    },
    /// The boss template has no spawn point for the boss.
    #[error("boss template `{id}` defines no spawn point")]
    MissingBossSpawn {
        /// Identifier of the boss template.
        id: String,
    },
}

/// Set of sides on which a room template has an open door.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Side>", into = "Vec<Side>")]
pub struct DoorMask(u8);

impl DoorMask {
    /// Mask with every door open.
    pub const ALL: DoorMask = DoorMask(0b1111);

    /// Mask with every door closed.
    pub const NONE: DoorMask = DoorMask(0);

    /// Returns a copy with the door on `side` opened.
    #[must_use]
    pub const fn with(self, side: Side) -> Self {
        Self(self.0 | bit(side))
    }

    /// Returns a copy with the door on `side` closed.
    #[must_use]
    pub const fn without(self, side: Side) -> Self {
        Self(self.0 & !bit(side))
    }

    /// Reports whether the door on `side` is open.
    #[must_use]
    pub const fn contains(self, side: Side) -> bool {
        self.0 & bit(side) != 0
    }

    /// Open sides in [`Side::ALL`] order.
    pub fn sides(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |side| self.contains(*side))
    }
}

const fn bit(side: Side) -> u8 {
    match side {
        Side::Top => 0b0001,
        Side::Bottom => 0b0010,
        Side::Left => 0b0100,
        Side::Right => 0b1000,
    }
}

impl From<Vec<Side>> for DoorMask {
    fn from(sides: Vec<Side>) -> Self {
        sides
            .into_iter()
            .fold(DoorMask::NONE, |mask, side| mask.with(side))
    }
}

impl From<DoorMask> for Vec<Side> {
    fn from(mask: DoorMask) -> Self {
        mask.sides().collect()
    }
}

/// Fixed room layout with a door mask.
///
/// Positions are pixel offsets from the room's upper-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomTemplate {
    /// Stable identifier.
    pub id: String,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Open doors.
    pub doors: DoorMask,
    /// Where the player appears when the room is the entry room.
    pub player_spawn: Vec2,
    /// Candidate enemy spawn points.
    #[serde(default)]
    pub spawn_points: Vec<Vec2>,
    /// Solid terrain inside the room.
    #[serde(default)]
    pub obstacles: Vec<Rect>,
}

impl RoomTemplate {
    /// Pixel dimensions for the provided tile size.
    #[must_use]
    pub fn pixel_size(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.width as f32 * tile_size, self.height as f32 * tile_size)
    }

    fn validate(&self, tile_size: f32) -> Result<(), CatalogError> {
        if self.width == 0 || self.height == 0 {
            return Err(CatalogError::EmptyTemplate {
                id: self.id.clone(),
            });
        }
        let size = self.pixel_size(tile_size);
        let bounds = Rect::new(0.0, 0.0, size.x, size.y);
        if !bounds.contains_point(self.player_spawn) {
            return Err(CatalogError::SpawnOutside {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Complete set of room templates for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateCatalog {
    /// Template of the entry room.
    pub start: RoomTemplate,
    /// Templates the generator expands into.
    pub rooms: Vec<RoomTemplate>,
    /// Template of the boss arena; its first spawn point hosts the boss.
    pub boss: RoomTemplate,
}

impl TemplateCatalog {
    /// Parses a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks that every template can be instantiated at `tile_size`.
    pub fn validate(&self, tile_size: f32) -> Result<(), CatalogError> {
        if self.rooms.is_empty() {
            return Err(CatalogError::NoRoomTemplates);
        }
        self.start.validate(tile_size)?;
        self.boss.validate(tile_size)?;
        for template in &self.rooms {
            template.validate(tile_size)?;
        }
        if self.boss.spawn_points.is_empty() {
            return Err(CatalogError::MissingBossSpawn {
                id: self.boss.id.clone(),
            });
        }
        Ok(())
    }

    /// Spawn point of the boss inside the boss template.
    #[must_use]
    pub fn boss_spawn(&self) -> Option<Vec2> {
        self.boss.spawn_points.first().copied()
    }

    /// Catalog compiled into the binary, mirrored by `config/catalog.toml`.
    #[must_use]
    pub fn builtin() -> Self {
        let crossing = |id: &str, closed: Side, spawn_points: &[(f32, f32)], obstacles: Vec<Rect>| {
            RoomTemplate {
                id: id.to_owned(),
                width: 30,
                height: 20,
                doors: DoorMask::ALL.without(closed),
                player_spawn: Vec2::new(240.0, 48.0),
                spawn_points: points(spawn_points),
                obstacles,
            }
        };

        Self {
            start: RoomTemplate {
                id: "start".to_owned(),
                width: 30,
                height: 20,
                doors: DoorMask::ALL,
                player_spawn: Vec2::new(240.0, 160.0),
                spawn_points: Vec::new(),
                obstacles: Vec::new(),
            },
            rooms: vec![
                crossing(
                    "pillar-hall",
                    Side::Top,
                    &[(96.0, 80.0), (384.0, 80.0), (240.0, 240.0)],
                    vec![Rect::new(208.0, 128.0, 64.0, 64.0)],
                ),
                crossing(
                    "twin-blocks",
                    Side::Bottom,
                    &[(96.0, 240.0), (384.0, 240.0), (240.0, 80.0)],
                    vec![
                        Rect::new(144.0, 144.0, 32.0, 32.0),
                        Rect::new(304.0, 144.0, 32.0, 32.0),
                    ],
                ),
                crossing(
                    "divided-chamber",
                    Side::Left,
                    &[(96.0, 160.0), (384.0, 96.0), (384.0, 224.0)],
                    vec![Rect::new(224.0, 64.0, 32.0, 192.0)],
                ),
                crossing(
                    "open-court",
                    Side::Right,
                    &[(384.0, 160.0), (96.0, 96.0), (96.0, 224.0)],
                    Vec::new(),
                ),
                RoomTemplate {
                    id: "grand-hall".to_owned(),
                    width: 30,
                    height: 20,
                    doors: DoorMask::ALL,
                    player_spawn: Vec2::new(240.0, 160.0),
                    spawn_points: points(&[
                        (120.0, 100.0),
                        (360.0, 100.0),
                        (120.0, 220.0),
                        (360.0, 220.0),
                    ]),
                    obstacles: Vec::new(),
                },
            ],
            boss: RoomTemplate {
                id: "boss-arena".to_owned(),
                width: 40,
                height: 30,
                doors: DoorMask::NONE,
                player_spawn: Vec2::new(320.0, 400.0),
                spawn_points: points(&[(320.0, 140.0)]),
                obstacles: Vec::new(),
            },
        }
    }
}

fn points(raw: &[(f32, f32)]) -> Vec<Vec2> {
    raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_mask_round_trips_through_sides() {
        let mask = DoorMask::from(vec![Side::Left, Side::Top]);
        assert!(mask.contains(Side::Top));
        assert!(mask.contains(Side::Left));
        assert!(!mask.contains(Side::Right));
        assert_eq!(Vec::<Side>::from(mask), vec![Side::Top, Side::Left]);
    }

    #[test]
    fn shipped_catalog_matches_builtin() {
        let parsed = TemplateCatalog::from_toml_str(include_str!("../../../config/catalog.toml"))
            .expect("shipped catalog parses");
        assert_eq!(parsed, TemplateCatalog::builtin());
        assert!(parsed.validate(16.0).is_ok());
    }

    #[test]
    fn catalog_without_rooms_is_rejected() {
        let mut catalog = TemplateCatalog::builtin();
        catalog.rooms.clear();
        assert!(matches!(
            catalog.validate(16.0),
            Err(CatalogError::NoRoomTemplates)
        ));
    }

    #[test]
    fn zero_sized_template_is_rejected() {
        let mut catalog = TemplateCatalog::builtin();
        catalog.rooms[0].width = 0;
        assert!(matches!(
            catalog.validate(16.0),
            Err(CatalogError::EmptyTemplate { .. })
        ));
    }

    #[test]
    fn boss_template_needs_a_spawn_point() {
        let mut catalog = TemplateCatalog::builtin();
        catalog.boss.spawn_points.clear();
        assert!(matches!(
            catalog.validate(16.0),
            Err(CatalogError::MissingBossSpawn { .. })
        ));
    }
}
