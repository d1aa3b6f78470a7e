// Level definitions - pure data consumed by the core

use serde::{Deserialize, Serialize};

use crate::world::{Facing, Objective, TileKind};

/// An immutable level specification.
///
/// Levels are data, not code: the host ships them as JSON and the core
/// only ever reads them. `width`/`height` mirror the grid dimensions for
/// the renderer's convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lesson: String,
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<TileKind>>,
    pub start_x: i32,
    pub start_y: i32,
    pub start_facing: Facing,
    pub start_energy: i32,
    pub max_energy: i32,
    #[serde(default)]
    pub fog_of_war: bool,
    #[serde(default = "default_scan_radius")]
    pub scan_radius: i32,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default = "default_optimal")]
    pub optimal_energy: u32,
    #[serde(default = "default_optimal")]
    pub optimal_steps: u32,
    #[serde(default)]
    pub time_limit: u32,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub sample_solution: String,
}

fn default_scan_radius() -> i32 {
    1
}

fn default_optimal() -> u32 {
    1
}

impl Level {
    /// A bare level from the fields that matter to the simulator; the
    /// presentation fields default to empty.
    pub fn new(
        grid: Vec<Vec<TileKind>>,
        start_x: i32,
        start_y: i32,
        start_facing: Facing,
        start_energy: i32,
        objectives: Vec<Objective>,
    ) -> Self {
        let height = grid.len();
        let width = grid.first().map(Vec::len).unwrap_or(0);
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            lesson: String::new(),
            width,
            height,
            grid,
            start_x,
            start_y,
            start_facing,
            start_energy,
            max_energy: start_energy,
            fog_of_war: false,
            scan_radius: default_scan_radius(),
            objectives,
            optimal_energy: default_optimal(),
            optimal_steps: default_optimal(),
            time_limit: 0,
            hints: Vec::new(),
            sample_solution: String::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Level, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_with_defaults() {
        let level = Level::from_json(
            r#"{
                "id": 1,
                "name": "First Flight",
                "width": 3,
                "height": 1,
                "grid": [["wall", "empty", "crystal"]],
                "startX": 1,
                "startY": 0,
                "startFacing": "east",
                "startEnergy": 50,
                "maxEnergy": 100,
                "objectives": [{"type": "collect", "resource": "crystal", "count": 1}],
                "optimalEnergy": 5,
                "optimalSteps": 2
            }"#,
        )
        .expect("level should deserialize");
        assert_eq!(level.grid[0][2], TileKind::Crystal);
        assert_eq!(level.start_facing, Facing::East);
        assert!(!level.fog_of_war);
        assert_eq!(level.scan_radius, 1);
        assert_eq!(level.objectives.len(), 1);
        assert_eq!(level.time_limit, 0);
    }

    #[test]
    fn test_round_trips_through_json() {
        let level = Level::new(
            vec![vec![TileKind::Empty, TileKind::Data]],
            0,
            0,
            Facing::South,
            30,
            vec![],
        );
        let json = serde_json::to_string(&level).expect("serialize");
        let back = Level::from_json(&json).expect("deserialize");
        assert_eq!(level, back);
    }
}
