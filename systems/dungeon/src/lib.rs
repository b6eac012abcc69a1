#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural dungeon generation over a grid of door-compatible room templates.
//!
//! The generator expands outward from the start room by repeatedly picking a
//! pending open door at random and instantiating a template whose opposite
//! door is open in the neighbouring grid cell. Sides that do not end up
//! connected to a neighbour are sealed with generated colliders, so the
//! resulting map is closed regardless of where expansion stopped.

mod catalog;

use std::collections::BTreeMap;

use rand::Rng;
use swarm_td_core::{
    ColliderTag, EnemyId, GridCoord, Rect, RoomRegistry, Side, StaticCollider, Vec2,
};
use tracing::{debug, info, warn};

pub use catalog::{CatalogError, DoorMask, RoomTemplate, TemplateCatalog};

/// Grid origin of the start room.
pub const START_COORD: GridCoord = GridCoord::new(0, 0);

/// Instantiated room placed on the dungeon grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    grid_coord: GridCoord,
    template_id: String,
    width: u32,
    height: u32,
    doors: DoorMask,
    bounds: Rect,
    visited: bool,
    cleared: bool,
    is_start: bool,
    player_spawn: Vec2,
    spawn_points: Vec<Vec2>,
    obstacles: Vec<Rect>,
    enemies: Vec<EnemyId>,
    enemies_spawned: bool,
    loot_spawned: bool,
}

impl Room {
    fn from_template(
        grid_coord: GridCoord,
        template: &RoomTemplate,
        origin: Vec2,
        tile_size: f32,
        is_start: bool,
    ) -> Self {
        let size = template.pixel_size(tile_size);
        Self {
            grid_coord,
            template_id: template.id.clone(),
            width: template.width,
            height: template.height,
            doors: template.doors,
            bounds: Rect::new(origin.x, origin.y, size.x, size.y),
            visited: false,
            cleared: is_start,
            is_start,
            player_spawn: origin + template.player_spawn,
            spawn_points: template
                .spawn_points
                .iter()
                .map(|point| origin + *point)
                .collect(),
            obstacles: template
                .obstacles
                .iter()
                .map(|obstacle| obstacle.translated(origin))
                .collect(),
            enemies: Vec::new(),
            enemies_spawned: false,
            loot_spawned: false,
        }
    }

    /// Grid cell occupied by the room.
    #[must_use]
    pub const fn grid_coord(&self) -> GridCoord {
        self.grid_coord
    }

    /// Identifier of the template the room was instantiated from.
    #[must_use]
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Open doors declared by the template.
    #[must_use]
    pub const fn doors(&self) -> DoorMask {
        self.doors
    }

    /// Pixel position of the upper-left corner.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.bounds.x(), self.bounds.y())
    }

    /// World-space bounds.
    #[must_use]
    pub const fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Reports whether the player has entered the room.
    #[must_use]
    pub const fn visited(&self) -> bool {
        self.visited
    }

    /// Reports whether the room's encounter has been defeated.
    #[must_use]
    pub const fn cleared(&self) -> bool {
        self.cleared
    }

    /// Reports whether the room is the entry room.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        self.is_start
    }

    /// World-space player spawn declared by the template.
    #[must_use]
    pub const fn player_spawn(&self) -> Vec2 {
        self.player_spawn
    }

    /// World-space enemy spawn points.
    #[must_use]
    pub fn spawn_points(&self) -> &[Vec2] {
        &self.spawn_points
    }

    /// World-space terrain rectangles.
    #[must_use]
    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    /// Enemies spawned for this room that have not been released yet.
    #[must_use]
    pub fn enemies(&self) -> &[EnemyId] {
        &self.enemies
    }

    /// Reports whether the encounter has been spawned.
    #[must_use]
    pub const fn enemies_spawned(&self) -> bool {
        self.enemies_spawned
    }

    /// Reports whether the room already rolled its loot.
    #[must_use]
    pub const fn loot_spawned(&self) -> bool {
        self.loot_spawned
    }

    /// Marks the room as visited, reporting whether this was the first visit.
    pub fn mark_visited(&mut self) -> bool {
        !std::mem::replace(&mut self.visited, true)
    }

    /// Records the roster produced by the room's encounter.
    pub fn record_spawn(&mut self, enemies: Vec<EnemyId>) {
        self.enemies = enemies;
        self.enemies_spawned = true;
    }

    /// Drops every roster entry for which `alive` returns `false`.
    pub fn retain_enemies(&mut self, mut alive: impl FnMut(EnemyId) -> bool) {
        self.enemies.retain(|enemy| alive(*enemy));
    }

    /// Marks the room as cleared.
    pub fn mark_cleared(&mut self) {
        self.cleared = true;
    }

    /// Marks the room's loot roll as consumed.
    pub fn mark_loot_spawned(&mut self) {
        self.loot_spawned = true;
    }
}

/// Rooms placed by the generator, keyed by grid coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct DungeonGraph {
    rooms: BTreeMap<GridCoord, Room>,
    start: GridCoord,
}

impl DungeonGraph {
    /// Builds a graph holding a single entry room instantiated from `template`.
    #[must_use]
    pub fn single(template: &RoomTemplate, tile_size: f32) -> Self {
        let mut rooms = BTreeMap::new();
        let _ = rooms.insert(
            START_COORD,
            Room::from_template(START_COORD, template, Vec2::ZERO, tile_size, true),
        );
        Self {
            rooms,
            start: START_COORD,
        }
    }

    /// Grid coordinate of the entry room.
    #[must_use]
    pub const fn start(&self) -> GridCoord {
        self.start
    }

    /// Entry room.
    #[must_use]
    pub fn start_room(&self) -> Option<&Room> {
        self.rooms.get(&self.start)
    }

    /// Number of placed rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Reports whether the graph holds no rooms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Looks up the room at `coord`.
    #[must_use]
    pub fn room(&self, coord: GridCoord) -> Option<&Room> {
        self.rooms.get(&coord)
    }

    /// Looks up the room at `coord` mutably.
    pub fn room_mut(&mut self, coord: GridCoord) -> Option<&mut Room> {
        self.rooms.get_mut(&coord)
    }

    /// Iterates rooms in grid-coordinate order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Pixel origin of the room at `coord`.
    #[must_use]
    pub fn position(&self, coord: GridCoord) -> Option<Vec2> {
        self.rooms.get(&coord).map(Room::origin)
    }

    /// Room whose bounds contain `point`, preferring the lowest grid coordinate.
    #[must_use]
    pub fn room_containing(&self, point: Vec2) -> Option<GridCoord> {
        self.rooms
            .values()
            .find(|room| room.bounds.contains_point(point))
            .map(Room::grid_coord)
    }

    /// Reports whether `coord` and its neighbour across `side` share an open doorway.
    #[must_use]
    pub fn connected(&self, coord: GridCoord, side: Side) -> bool {
        let Some(room) = self.rooms.get(&coord) else {
            return false;
        };
        let Some(neighbor) = self.rooms.get(&coord.neighbor(side)) else {
            return false;
        };
        room.doors.contains(side) && neighbor.doors.contains(side.opposite())
    }

    /// Every room side that is not an open doorway into a placed neighbour.
    #[must_use]
    pub fn closed_doors(&self) -> Vec<(GridCoord, Side)> {
        self.rooms
            .keys()
            .flat_map(|coord| Side::ALL.into_iter().map(move |side| (*coord, side)))
            .filter(|(coord, side)| !self.connected(*coord, *side))
            .collect()
    }

    /// Reports whether every room is reachable from the entry room through open doorways.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let mut reached = vec![self.start];
        let mut frontier = vec![self.start];
        while let Some(coord) = frontier.pop() {
            for side in Side::ALL {
                let next = coord.neighbor(side);
                if self.connected(coord, side) && !reached.contains(&next) {
                    reached.push(next);
                    frontier.push(next);
                }
            }
        }
        reached.len() == self.rooms.len()
    }

    /// Colliders that seal the map: a full-length strip along every closed
    /// side, plus strips covering the parts of a shared edge that overhang a
    /// smaller neighbour.
    ///
    /// Strips lie inside the owning room and are tagged with their side.
    #[must_use]
    pub fn seal_colliders(&self, thickness: f32) -> Vec<StaticCollider> {
        let mut seals = Vec::new();
        for room in self.rooms.values() {
            for side in Side::ALL {
                let own = edge_span(&room.bounds, side);
                if !self.connected(room.grid_coord, side) {
                    seals.push(seal(&room.bounds, side, thickness, own));
                    continue;
                }
                let Some(neighbor) = self.rooms.get(&room.grid_coord.neighbor(side)) else {
                    continue;
                };
                let shared = edge_span(&neighbor.bounds, side);
                for span in uncovered(own, shared) {
                    seals.push(seal(&room.bounds, side, thickness, span));
                }
            }
        }
        seals
    }

    /// Terrain colliders declared by the placed templates.
    #[must_use]
    pub fn terrain_colliders(&self) -> Vec<StaticCollider> {
        self.rooms
            .values()
            .flat_map(|room| room.obstacles.iter())
            .map(|rect| StaticCollider::new(*rect, ColliderTag::Terrain))
            .collect()
    }

    /// Terrain followed by seal colliders.
    #[must_use]
    pub fn static_colliders(&self, seal_thickness: f32) -> Vec<StaticCollider> {
        let mut colliders = self.terrain_colliders();
        colliders.extend(self.seal_colliders(seal_thickness));
        colliders
    }
}

impl RoomRegistry for DungeonGraph {
    fn release_enemy(&mut self, enemy: EnemyId) {
        for room in self.rooms.values_mut() {
            room.enemies.retain(|listed| *listed != enemy);
        }
    }
}

/// Interval covered by the side of `bounds` that runs along `side`.
fn edge_span(bounds: &Rect, side: Side) -> (f32, f32) {
    match side {
        Side::Top | Side::Bottom => (bounds.left(), bounds.right()),
        Side::Left | Side::Right => (bounds.top(), bounds.bottom()),
    }
}

/// Parts of `own` not covered by `other`.
fn uncovered(own: (f32, f32), other: (f32, f32)) -> impl Iterator<Item = (f32, f32)> {
    let before = (own.0, own.1.min(other.0));
    let after = (own.0.max(other.1), own.1);
    [before, after]
        .into_iter()
        .filter(|(start, end)| end > start)
}

fn seal(bounds: &Rect, side: Side, thickness: f32, span: (f32, f32)) -> StaticCollider {
    let length = span.1 - span.0;
    let rect = match side {
        Side::Top => Rect::new(span.0, bounds.top(), length, thickness),
        Side::Bottom => Rect::new(span.0, bounds.bottom() - thickness, length, thickness),
        Side::Left => Rect::new(bounds.left(), span.0, thickness, length),
        Side::Right => Rect::new(bounds.right() - thickness, span.0, thickness, length),
    };
    StaticCollider::new(rect, ColliderTag::DoorSeal(side))
}

/// Dungeon generator that reuses its work-list between runs.
#[derive(Debug, Default)]
pub struct DungeonGenerator {
    pending: Vec<(GridCoord, Side)>,
    candidates: Vec<usize>,
}

impl DungeonGenerator {
    /// Creates a generator with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands a dungeon from `start` using `templates` until `max_rooms`
    /// rooms are placed or no open door remains pending.
    ///
    /// Rooms are only placed through a doorway the chosen template can
    /// answer, so every room stays reachable from the start room. A doorway
    /// no template can answer stays closed and is sealed. Running out of
    /// doors early is not an error; the map is simply smaller.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        start: &RoomTemplate,
        templates: &[RoomTemplate],
        max_rooms: usize,
        tile_size: f32,
        rng: &mut R,
    ) -> DungeonGraph {
        let mut graph = DungeonGraph::single(start, tile_size);
        self.pending.clear();
        self.pending
            .extend(start.doors.sides().map(|side| (START_COORD, side)));

        while graph.rooms.len() < max_rooms && !self.pending.is_empty() && !templates.is_empty() {
            let pick = rng.gen_range(0..self.pending.len());
            let (coord, side) = self.pending.swap_remove(pick);
            let target = coord.neighbor(side);
            if graph.rooms.contains_key(&target) {
                continue;
            }
            let Some(parent) = graph.rooms.get(&coord) else {
                continue;
            };

            let Some(index) = self.choose_template(templates, side.opposite(), rng) else {
                continue;
            };
            let template = &templates[index];
            let origin = neighbor_origin(&parent.bounds, template, side, tile_size);
            let room = Room::from_template(target, template, origin, tile_size, false);
            debug!(
                x = target.x(),
                y = target.y(),
                template = %template.id,
                "placed room"
            );
            let _ = graph.rooms.insert(target, room);

            for next in template.doors.sides() {
                if next == side.opposite() || graph.rooms.contains_key(&target.neighbor(next)) {
                    continue;
                }
                self.pending.push((target, next));
            }
        }

        if graph.rooms.len() < max_rooms {
            warn!(
                placed = graph.rooms.len(),
                requested = max_rooms,
                "dungeon expansion ran out of open doors"
            );
        }
        info!(rooms = graph.rooms.len(), "dungeon generated");
        graph
    }

    /// Picks a template with an open door on `entry`, if any has one.
    fn choose_template<R: Rng + ?Sized>(
        &mut self,
        templates: &[RoomTemplate],
        entry: Side,
        rng: &mut R,
    ) -> Option<usize> {
        self.candidates.clear();
        self.candidates.extend(
            templates
                .iter()
                .enumerate()
                .filter(|(_, template)| template.doors.contains(entry))
                .map(|(index, _)| index),
        );
        if self.candidates.is_empty() {
            debug!(?entry, "no template matches the doorway; leaving it sealed");
            return None;
        }
        Some(self.candidates[rng.gen_range(0..self.candidates.len())])
    }
}

/// Pixel origin of a room instantiated from `template` across `side` of `parent`.
fn neighbor_origin(parent: &Rect, template: &RoomTemplate, side: Side, tile_size: f32) -> Vec2 {
    let size = template.pixel_size(tile_size);
    match side {
        Side::Left => Vec2::new(parent.left() - size.x, parent.top()),
        Side::Right => Vec2::new(parent.right(), parent.top()),
        Side::Top => Vec2::new(parent.left(), parent.top() - size.y),
        Side::Bottom => Vec2::new(parent.left(), parent.bottom()),
    }
}
