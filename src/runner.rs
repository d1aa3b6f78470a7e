// Driver - paces the VM and applies its actions to the world
//
// The host normally runs this loop off a timer so learners can watch the
// drone move; tests and headless scoring drive it to completion in one
// call. Failed actions become warning events and execution continues;
// the run stops as soon as the world leaves the `playing` state.

use serde_json::json;

use crate::ast::MoveDir;
use crate::bytecode::Bytecode;
use crate::error::RuntimeError;
use crate::level::Level;
use crate::vm::{ActionKind, Vm, VmOptions, VmState};
use crate::world::{RelDir, Status, World};

pub struct Runner {
    pub vm: Vm,
    pub world: World,
}

/// How a completed run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Won,
    Lost,
    Halted,
    Error(RuntimeError),
}

impl Runner {
    pub fn new(bytecode: Bytecode, level: &Level) -> Self {
        Self {
            vm: Vm::new(bytecode),
            world: World::new(level),
        }
    }

    pub fn with_options(bytecode: Bytecode, level: &Level, options: VmOptions) -> Self {
        Self {
            vm: Vm::with_options(bytecode, options),
            world: World::new(level),
        }
    }

    /// One paced step: tick the VM and apply any resulting action.
    /// Returns false once the machine has nothing further to do.
    pub fn step(&mut self) -> Result<bool, RuntimeError> {
        if !matches!(self.vm.state(), VmState::Running | VmState::Paused) {
            return Ok(false);
        }
        let action = self.vm.tick(&mut self.world)?;

        if let Some(action) = action {
            let result = match &action.kind {
                ActionKind::Move(dir) => self.world.execute_move(match dir {
                    MoveDir::Forward => RelDir::Forward,
                    MoveDir::Back => RelDir::Back,
                }),
                ActionKind::Turn(dir) => self.world.execute_turn(*dir),
                ActionKind::Collect => self.world.execute_collect(),
                ActionKind::Wait(ticks) => self.world.execute_wait(*ticks),
            };
            if let Err(failure) = result {
                self.vm.warn(json!({
                    "reason": format!("{:?}", failure.reason),
                    "message": failure.message,
                    "hint": failure.hint,
                    "line": action.line,
                }));
            }
            if self.world.status() != Status::Playing {
                self.vm.stop();
                return Ok(false);
            }
        }

        Ok(matches!(
            self.vm.state(),
            VmState::Running | VmState::Paused
        ))
    }

    /// Drive the program until it halts, errors, or decides the run.
    pub fn run_to_completion(&mut self) -> RunOutcome {
        self.vm.run();
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return RunOutcome::Error(err),
            }
        }
        match self.world.status() {
            Status::Won => RunOutcome::Won,
            Status::Lost => RunOutcome::Lost,
            Status::Playing => RunOutcome::Halted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::event::EventKind;
    use crate::parser::{parse, Syntax};
    use crate::world::{Facing, Objective, Resource, TileKind};

    fn corridor() -> Level {
        Level::new(
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
        )
    }

    fn run_keyword(source: &str) -> (Runner, RunOutcome) {
        let program = parse(source, Syntax::Keyword).expect("parse failed");
        let bytecode = compile(&program).expect("compile failed");
        let mut runner = Runner::new(bytecode, &corridor());
        let outcome = runner.run_to_completion();
        (runner, outcome)
    }

    #[test]
    fn test_winning_run_stops_vm() {
        let (runner, outcome) = run_keyword("move forward\nmove forward\ncollect");
        assert_eq!(outcome, RunOutcome::Won);
        assert_eq!(runner.vm.state(), VmState::Halted);
        assert_eq!(runner.world.drone().energy, 93);
    }

    #[test]
    fn test_failed_action_becomes_warning_and_run_continues() {
        let (runner, outcome) = run_keyword("move back\nmove forward");
        assert_eq!(outcome, RunOutcome::Halted);
        let warning = runner
            .vm
            .events()
            .iter()
            .find(|e| e.kind == EventKind::Warning)
            .expect("warning event");
        assert_eq!(warning.data["reason"], "WallBlocked");
        // The second move still ran.
        assert_eq!(runner.world.drone().x, 2);
    }

    #[test]
    fn test_runtime_error_surfaces() {
        let (_, outcome) = run_keyword("log mystery");
        assert!(matches!(outcome, RunOutcome::Error(_)));
    }
}
