// Analyzer - grades a finished run and suggests improvements

use crate::event::{Event, EventKind};
use crate::level::Level;
use crate::world::{Objective, Status, World};

/// Per-axis score components; they sum to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub energy: u32,
    pub steps: u32,
    pub time: u32,
    pub completion: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub score: u32,
    pub stars: u8,
    pub breakdown: ScoreBreakdown,
    pub suggestions: Vec<String>,
}

/// Grade a terminal world state against the level's reference numbers.
pub fn analyze(world: &World, events: &[Event], level: &Level) -> Analysis {
    let stats = world.stats();
    let won = world.status() == Status::Won;

    let energy = (f64::from(level.optimal_energy) / f64::from(stats.energy_used.max(1)) * 40.0)
        .round()
        .min(40.0) as u32;
    let steps = (f64::from(level.optimal_steps) / f64::from(stats.ticks.max(1)) * 30.0)
        .round()
        .min(30.0) as u32;
    let time = 20u32.saturating_sub(stats.ticks / 10);
    let completion = if won { 10 } else { 0 };
    let score = energy + steps + time + completion;

    let mut suggestions = Vec::new();

    if !won {
        if world.drone().energy <= 0 {
            suggestions.push(
                "You ran out of energy - wait to recharge, or plan a shorter route".to_string(),
            );
        } else if let Some(unmet) = first_unmet_objective(world) {
            suggestions.push(unmet);
        }
    }

    if f64::from(stats.turns) > f64::from(stats.moves) * 0.5 {
        suggestions.push("You turned a lot - plan a straighter route".to_string());
    }
    if stats.energy_wasted > 10 {
        suggestions.push("Failed actions wasted energy - check before you act".to_string());
    }
    if f64::from(stats.scans) > f64::from(stats.moves) * 2.0 {
        suggestions.push("That was a lot of scanning - trust the map you have".to_string());
    }
    if has_consecutive_turns(events) {
        suggestions.push("Two turns in a row can usually be combined or avoided".to_string());
    }
    if stats.ticks > 100 && f64::from(stats.moves) < f64::from(stats.ticks) * 0.3 {
        suggestions.push("Most ticks went to waiting - spend more of them moving".to_string());
    }

    if score == 100 {
        suggestions = vec!["Perfect score!".to_string()];
    }

    let stars = stars_for(score);
    if stars >= 4 && suggestions.is_empty() {
        suggestions.push("Great run - only tiny optimizations left".to_string());
    }

    Analysis {
        score,
        stars,
        breakdown: ScoreBreakdown {
            energy,
            steps,
            time,
            completion,
        },
        suggestions,
    }
}

pub fn stars_for(score: u32) -> u8 {
    match score {
        90.. => 5,
        75.. => 4,
        60.. => 3,
        40.. => 2,
        20.. => 1,
        _ => 0,
    }
}

fn first_unmet_objective(world: &World) -> Option<String> {
    world.objectives().iter().find_map(|objective| {
        let Objective::Collect { resource, count } = objective;
        if world.inventory().get(*resource) < *count {
            Some(format!(
                "Objective not met: collect {} {}",
                count,
                resource.name()
            ))
        } else {
            None
        }
    })
}

fn has_consecutive_turns(events: &[Event]) -> bool {
    let mut previous_was_turn = false;
    for event in events {
        if event.kind != EventKind::Action {
            continue;
        }
        let is_turn = event.data["type"] == "TURN";
        if is_turn && previous_was_turn {
            return true;
        }
        previous_was_turn = is_turn;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::{parse, Syntax};
    use crate::runner::Runner;
    use crate::world::{Facing, Resource, TileKind};

    fn corridor() -> Level {
        let mut level = Level::new(
            vec![
                vec![TileKind::Wall; 5],
                vec![
                    TileKind::Wall,
                    TileKind::Empty,
                    TileKind::Empty,
                    TileKind::Crystal,
                    TileKind::Wall,
                ],
                vec![TileKind::Wall; 5],
            ],
            1,
            1,
            Facing::East,
            100,
            vec![Objective::Collect {
                resource: Resource::Crystal,
                count: 1,
            }],
        );
        level.optimal_energy = 7;
        level.optimal_steps = 3;
        level
    }

    fn analyze_run(source: &str) -> Analysis {
        let program = parse(source, Syntax::Keyword).expect("parse failed");
        let bytecode = compile(&program).expect("compile failed");
        let mut runner = Runner::new(bytecode, &corridor());
        runner.run_to_completion();
        analyze(&runner.world, runner.vm.events(), &corridor())
    }

    #[test]
    fn test_optimal_run_scores_perfect() {
        let analysis = analyze_run("move forward\nmove forward\ncollect");
        assert_eq!(analysis.breakdown.energy, 40);
        assert_eq!(analysis.breakdown.steps, 30);
        assert_eq!(analysis.breakdown.time, 20);
        assert_eq!(analysis.breakdown.completion, 10);
        assert_eq!(analysis.score, 100);
        assert_eq!(analysis.stars, 5);
        assert_eq!(analysis.suggestions, vec!["Perfect score!".to_string()]);
    }

    #[test]
    fn test_unfinished_run_names_the_objective() {
        let analysis = analyze_run("move forward");
        assert_eq!(analysis.breakdown.completion, 0);
        assert!(analysis.suggestions[0].contains("collect 1 crystal"));
    }

    #[test]
    fn test_star_boundaries() {
        assert_eq!(stars_for(100), 5);
        assert_eq!(stars_for(90), 5);
        assert_eq!(stars_for(89), 4);
        assert_eq!(stars_for(75), 4);
        assert_eq!(stars_for(74), 3);
        assert_eq!(stars_for(60), 3);
        assert_eq!(stars_for(59), 2);
        assert_eq!(stars_for(40), 2);
        assert_eq!(stars_for(39), 1);
        assert_eq!(stars_for(20), 1);
        assert_eq!(stars_for(19), 0);
        assert_eq!(stars_for(0), 0);
    }

    #[test]
    fn test_consecutive_turns_suggestion() {
        let analysis = analyze_run("turn left\nturn left\nmove forward\nmove forward");
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.contains("Two turns in a row")));
    }

    #[test]
    fn test_too_many_turns_suggestion() {
        let analysis = analyze_run("turn left\nturn right\nmove forward");
        assert!(analysis
            .suggestions
            .iter()
            .any(|s| s.contains("straighter route")));
    }

    #[test]
    fn test_time_score_decays_with_ticks() {
        // 52 waits burn the time budget down to 20 - 5 = 15.
        let analysis = analyze_run("wait 52\nmove forward");
        assert_eq!(analysis.breakdown.time, 20 - (53 / 10));
    }
}
