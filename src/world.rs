// Grid-world simulator - tiles, drone pose, energy, fog, snapshots
//
// All gameplay failures come back as structured values; nothing in here
// panics or returns a hard error. Once the run is won or lost the world
// refuses further mutation.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::level::Level;

pub const MOVE_COST: i32 = 2;
pub const TURN_COST: i32 = 1;
pub const COLLECT_COST: i32 = 3;
pub const SCAN_COST: i32 = 1;
pub const HAZARD_PENALTY: i32 = 10;
pub const CHARGER_BONUS: i32 = 20;
pub const ENERGY_CELL_BONUS: i32 = 10;
pub const SCAN_COOLDOWN_MAX: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Empty,
    Wall,
    Crystal,
    Data,
    EnergyCell,
    Hazard,
    Charger,
}

impl TileKind {
    pub fn name(&self) -> &'static str {
        match self {
            TileKind::Empty => "empty",
            TileKind::Wall => "wall",
            TileKind::Crystal => "crystal",
            TileKind::Data => "data",
            TileKind::EnergyCell => "energy_cell",
            TileKind::Hazard => "hazard",
            TileKind::Charger => "charger",
        }
    }

    fn resource(&self) -> Option<Resource> {
        match self {
            TileKind::Crystal => Some(Resource::Crystal),
            TileKind::Data => Some(Resource::Data),
            TileKind::EnergyCell => Some(Resource::EnergyCell),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    North,
    East,
    South,
    West,
}

impl Facing {
    pub fn left(self) -> Facing {
        match self {
            Facing::North => Facing::West,
            Facing::West => Facing::South,
            Facing::South => Facing::East,
            Facing::East => Facing::North,
        }
    }

    pub fn right(self) -> Facing {
        match self {
            Facing::North => Facing::East,
            Facing::East => Facing::South,
            Facing::South => Facing::West,
            Facing::West => Facing::North,
        }
    }

    pub fn back(self) -> Facing {
        self.right().right()
    }

    /// Unit step with +x east and +y south (origin at the top-left).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::East => (1, 0),
            Facing::South => (0, 1),
            Facing::West => (-1, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Facing::North => "north",
            Facing::East => "east",
            Facing::South => "south",
            Facing::West => "west",
        }
    }
}

/// Movement direction relative to the drone's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelDir {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDir {
    Forward,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Crystal,
    Data,
    EnergyCell,
}

impl Resource {
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Crystal => "crystal",
            Resource::Data => "data",
            Resource::EnergyCell => "energy_cell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Objective {
    Collect { resource: Resource, count: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drone {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub energy: i32,
    pub max_energy: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inventory {
    pub crystal: u32,
    pub data: u32,
    pub energy_cell: u32,
}

impl Inventory {
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Crystal => self.crystal,
            Resource::Data => self.data,
            Resource::EnergyCell => self.energy_cell,
        }
    }

    fn add(&mut self, resource: Resource) {
        match resource {
            Resource::Crystal => self.crystal += 1,
            Resource::Data => self.data += 1,
            Resource::EnergyCell => self.energy_cell += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub ticks: u32,
    pub moves: u32,
    pub turns: u32,
    pub collects: u32,
    pub scans: u32,
    pub energy_used: u32,
    pub energy_wasted: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    NotEnoughEnergy,
    WallBlocked,
    NothingHere,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub reason: FailReason,
    pub message: String,
    pub hint: Option<String>,
}

impl ActionFailure {
    fn new(reason: FailReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionReport {
    Moved { x: i32, y: i32, tile: TileKind },
    Turned { facing: Facing },
    Collected { resource: Resource },
    Waited { ticks: u32 },
}

pub type ActionResult = Result<ActionReport, ActionFailure>;

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Cooldown,
    NoEnergy,
    Tile(TileKind),
}

impl ScanOutcome {
    /// The string a script sees as the scan's return value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Cooldown => "cooldown",
            ScanOutcome::NoEnergy => "no_energy",
            ScanOutcome::Tile(tile) => tile.name(),
        }
    }
}

/// An opaque deep copy of the entire world state.
#[derive(Debug, Clone)]
pub struct WorldSnapshot(World);

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    grid: Vec<Vec<TileKind>>,
    revealed: Vec<Vec<bool>>,
    fog_of_war: bool,
    scan_radius: i32,
    drone: Drone,
    inventory: Inventory,
    scan_cooldown: u32,
    stats: Stats,
    status: Status,
    status_message: String,
    objectives: Vec<Objective>,
}

impl World {
    pub fn new(level: &Level) -> Self {
        let height = level.grid.len();
        let width = level.grid.first().map(Vec::len).unwrap_or(0);
        let mut world = Self {
            grid: level.grid.clone(),
            revealed: vec![vec![false; width]; height],
            fog_of_war: level.fog_of_war,
            scan_radius: level.scan_radius,
            drone: Drone {
                x: level.start_x,
                y: level.start_y,
                facing: level.start_facing,
                energy: level.start_energy,
                max_energy: level.max_energy,
            },
            inventory: Inventory::default(),
            scan_cooldown: 0,
            stats: Stats::default(),
            status: Status::Playing,
            status_message: String::new(),
            objectives: level.objectives.clone(),
        };
        world.reveal_around(world.drone.x, world.drone.y);
        world
    }

    /// Throw away all progress and rebuild from the level definition.
    pub fn reset(&mut self, level: &Level) {
        *self = World::new(level);
    }

    // ---- accessors -----------------------------------------------------

    pub fn drone(&self) -> &Drone {
        &self.drone
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn scan_cooldown(&self) -> u32 {
        self.scan_cooldown
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn width(&self) -> usize {
        self.grid.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Tile at a position; everything off the grid reads as wall.
    pub fn tile(&self, x: i32, y: i32) -> TileKind {
        if x < 0 || y < 0 {
            return TileKind::Wall;
        }
        self.grid
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(TileKind::Wall)
    }

    /// Whether a tile is visible to the renderer. Always true without fog.
    pub fn is_revealed(&self, x: i32, y: i32) -> bool {
        if !self.fog_of_war {
            return true;
        }
        if x < 0 || y < 0 {
            return false;
        }
        self.revealed
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(false)
    }

    // ---- primitive actions ---------------------------------------------

    pub fn execute_move(&mut self, dir: RelDir) -> ActionResult {
        self.check_playing()?;
        if self.drone.energy < MOVE_COST {
            return Err(ActionFailure::new(
                FailReason::NotEnoughEnergy,
                format!("Not enough energy to move (need {})", MOVE_COST),
            )
            .with_hint("wait to recharge"));
        }

        let heading = match dir {
            RelDir::Forward => self.drone.facing,
            RelDir::Back => self.drone.facing.back(),
            RelDir::Left => self.drone.facing.left(),
            RelDir::Right => self.drone.facing.right(),
        };
        let (dx, dy) = heading.delta();
        let (nx, ny) = (self.drone.x + dx, self.drone.y + dy);
        let target = self.tile(nx, ny);
        if target == TileKind::Wall {
            return Err(ActionFailure::new(
                FailReason::WallBlocked,
                "A wall is in the way",
            ));
        }

        self.drone.x = nx;
        self.drone.y = ny;
        self.spend(MOVE_COST);
        self.stats.moves += 1;
        self.stats.ticks += 1;
        self.scan_cooldown = self.scan_cooldown.saturating_sub(1);
        self.reveal_around(nx, ny);

        // Tile side effects apply to the tile we just stepped onto.
        match target {
            TileKind::Hazard => {
                let loss = HAZARD_PENALTY.min(self.drone.energy);
                self.drone.energy -= loss;
                self.stats.energy_used += loss as u32;
            }
            TileKind::Charger => {
                self.drone.energy =
                    (self.drone.energy + CHARGER_BONUS).min(self.drone.max_energy);
                self.grid[ny as usize][nx as usize] = TileKind::Empty;
            }
            _ => {}
        }

        if self.drone.energy == 0 {
            self.finish(Status::Lost, "Out of energy!");
        }

        Ok(ActionReport::Moved {
            x: nx,
            y: ny,
            tile: target,
        })
    }

    pub fn execute_turn(&mut self, dir: crate::ast::TurnDir) -> ActionResult {
        self.check_playing()?;
        if self.drone.energy < TURN_COST {
            return Err(ActionFailure::new(
                FailReason::NotEnoughEnergy,
                format!("Not enough energy to turn (need {})", TURN_COST),
            )
            .with_hint("wait to recharge"));
        }
        self.drone.facing = match dir {
            crate::ast::TurnDir::Left => self.drone.facing.left(),
            crate::ast::TurnDir::Right => self.drone.facing.right(),
        };
        self.spend(TURN_COST);
        self.stats.turns += 1;
        self.stats.ticks += 1;
        self.scan_cooldown = self.scan_cooldown.saturating_sub(1);
        Ok(ActionReport::Turned {
            facing: self.drone.facing,
        })
    }

    pub fn execute_collect(&mut self) -> ActionResult {
        self.check_playing()?;
        if self.drone.energy < COLLECT_COST {
            return Err(ActionFailure::new(
                FailReason::NotEnoughEnergy,
                format!("Not enough energy to collect (need {})", COLLECT_COST),
            )
            .with_hint("wait to recharge"));
        }
        let here = self.tile(self.drone.x, self.drone.y);
        let Some(resource) = here.resource() else {
            return Err(ActionFailure::new(
                FailReason::NothingHere,
                "Nothing to collect here",
            )
            .with_hint("scan first to find resources"));
        };

        self.inventory.add(resource);
        if resource == Resource::EnergyCell {
            self.drone.energy =
                (self.drone.energy + ENERGY_CELL_BONUS).min(self.drone.max_energy);
        }
        self.grid[self.drone.y as usize][self.drone.x as usize] = TileKind::Empty;
        self.spend(COLLECT_COST);
        self.stats.collects += 1;
        self.stats.ticks += 1;
        self.scan_cooldown = self.scan_cooldown.saturating_sub(1);
        self.check_objectives();

        Ok(ActionReport::Collected { resource })
    }

    /// Resting: regains `n` energy and burns `n` ticks. Always succeeds
    /// while the run is live.
    pub fn execute_wait(&mut self, ticks: u32) -> ActionResult {
        self.check_playing()?;
        self.drone.energy = (self.drone.energy + ticks as i32).min(self.drone.max_energy);
        self.stats.ticks += ticks;
        self.scan_cooldown = self.scan_cooldown.saturating_sub(ticks);
        Ok(ActionReport::Waited { ticks })
    }

    /// Peek at an adjacent tile. Costs 1 energy, sets the cooldown, and
    /// does not advance the tick counter.
    pub fn scan(&mut self, dir: ScanDir) -> ScanOutcome {
        if self.status != Status::Playing || self.scan_cooldown > 0 {
            return ScanOutcome::Cooldown;
        }
        if self.drone.energy < SCAN_COST {
            return ScanOutcome::NoEnergy;
        }
        let heading = match dir {
            ScanDir::Forward => self.drone.facing,
            ScanDir::Left => self.drone.facing.left(),
            ScanDir::Right => self.drone.facing.right(),
        };
        let (dx, dy) = heading.delta();
        let (tx, ty) = (self.drone.x + dx, self.drone.y + dy);

        self.spend(SCAN_COST);
        self.stats.scans += 1;
        self.scan_cooldown = SCAN_COOLDOWN_MAX;
        self.reveal(tx, ty);
        ScanOutcome::Tile(self.tile(tx, ty))
    }

    // ---- snapshots ----------------------------------------------------

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot(self.clone())
    }

    pub fn restore(&mut self, snapshot: &WorldSnapshot) {
        *self = snapshot.0.clone();
    }

    // ---- internals ----------------------------------------------------

    fn check_playing(&self) -> Result<(), ActionFailure> {
        if self.status == Status::Playing {
            Ok(())
        } else {
            Err(ActionFailure::new(
                FailReason::GameOver,
                "The run is already over",
            ))
        }
    }

    fn spend(&mut self, cost: i32) {
        self.drone.energy -= cost;
        self.stats.energy_used += cost as u32;
    }

    fn finish(&mut self, status: Status, message: &str) {
        debug!("world finished: {:?} ({})", status, message);
        self.status = status;
        self.status_message = message.to_string();
    }

    fn check_objectives(&mut self) {
        if self.objectives.is_empty() {
            return;
        }
        let all_met = self.objectives.iter().all(|objective| match objective {
            Objective::Collect { resource, count } => self.inventory.get(*resource) >= *count,
        });
        if all_met {
            self.finish(Status::Won, "All objectives completed!");
        }
    }

    fn reveal(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = self
            .revealed
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = true;
        }
    }

    fn reveal_around(&mut self, x: i32, y: i32) {
        let r = self.scan_radius;
        for dy in -r..=r {
            for dx in -r..=r {
                self.reveal(x + dx, y + dy);
            }
        }
    }
}
