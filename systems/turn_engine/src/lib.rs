#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine that owns a game session and advances it one command at a
//! time.
//!
//! Every command, accepted or not, starts a new turn and resets the status
//! line. The targeting machine has two states: in [`CombatState::Idle`] a
//! confirm picks a soldier as the shooter, in [`CombatState::Firing`] it picks
//! an alien as the target and resolves the shot.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use skirmish_core::{
    status, CellCoord, ChunkDimensions, CombatState, Command, Cursor, Direction, EntityKind,
    Event, RejectReason,
};
use skirmish_system_combat::{CombatConfig, CombatResolver};
use skirmish_system_generator::{Generator, GeneratorConfig};
use skirmish_world::{Chunk, ChunkArena, ChunkId, TerrainPool};

/// Everything needed to start a reproducible session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Size of the generated chunk.
    pub dimensions: ChunkDimensions,
    /// Seed for generation and every later roll.
    pub seed: u64,
    /// Population bounds handed to the generator.
    pub generator: GeneratorConfig,
    /// Tuning of the hit formula.
    pub combat: CombatConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dimensions: ChunkDimensions::REFERENCE,
            seed: 0,
            generator: GeneratorConfig::default(),
            combat: CombatConfig::default(),
        }
    }
}

/// One game session.
///
/// The session owns its chunk through an arena and its random generator, so
/// two sessions never share state and dropping one releases every entity it
/// created.
#[derive(Debug)]
pub struct Game {
    arena: ChunkArena,
    active: ChunkId,
    cursor: Cursor,
    state: CombatState,
    actor: Option<CellCoord>,
    status: &'static str,
    turn: u32,
    quit: bool,
    resolver: CombatResolver,
    ground: TerrainPool,
    rng: ChaCha8Rng,
}

impl Game {
    /// Starts a session on a freshly generated chunk.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let generated = Generator::new(config.generator).generate(config.dimensions, &mut rng);
        log::debug!(
            "session seeded with {}: soldier at {:?}, alien at {:?}",
            config.seed,
            generated.soldier,
            generated.alien
        );
        Self::assemble(generated.chunk, config.combat, rng)
    }

    /// Starts a session on a prepared chunk.
    #[must_use]
    pub fn with_chunk(chunk: Chunk, combat: CombatConfig, seed: u64) -> Self {
        Self::assemble(chunk, combat, ChaCha8Rng::seed_from_u64(seed))
    }

    fn assemble(chunk: Chunk, combat: CombatConfig, rng: ChaCha8Rng) -> Self {
        let mut arena = ChunkArena::new();
        let active = arena.insert(chunk);
        Self {
            arena,
            active,
            cursor: Cursor::default(),
            state: CombatState::Idle,
            actor: None,
            status: status::READY,
            turn: 0,
            quit: false,
            resolver: CombatResolver::new(combat),
            ground: TerrainPool::ground(),
            rng,
        }
    }

    /// Ends the session and hands back the chunk it was played on.
    ///
    /// Dropping the returned chunk releases the last entity shares.
    #[must_use]
    pub fn end(mut self) -> Chunk {
        log::trace!("ending session after {} turns", self.turn);
        self.arena
            .remove(self.active)
            .expect("the active chunk stays in the arena for the whole session")
    }

    fn chunk(&self) -> &Chunk {
        self.arena
            .get(self.active)
            .expect("the active chunk stays in the arena for the whole session")
    }

    fn dimensions(&self) -> ChunkDimensions {
        self.chunk().dimensions()
    }

    fn reject(
        &mut self,
        reason: RejectReason,
        status: &'static str,
        out_events: &mut Vec<Event>,
    ) {
        log::debug!("turn {}: rejected {reason:?}", self.turn);
        self.status = status;
        out_events.push(Event::CommandRejected { reason });
    }

    fn move_cursor(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if !self.cursor.enabled {
            self.reject(RejectReason::CursorDisabled, status::READY, out_events);
            return;
        }
        let from = self.cursor.cell;
        let to = self.dimensions().step_clamped(from, direction);
        if from != to {
            self.cursor.cell = to;
            out_events.push(Event::CursorMoved { from, to });
        }
    }

    fn toggle_cursor(&mut self, out_events: &mut Vec<Event>) {
        self.cursor.enabled = !self.cursor.enabled;
        if self.cursor.enabled {
            self.status = status::SELECT_ACTOR;
        } else {
            self.state = CombatState::Idle;
            self.actor = None;
            self.status = status::READY;
        }
        out_events.push(Event::CursorToggled {
            enabled: self.cursor.enabled,
        });
    }

    fn select_target(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.cursor.cell;
        let kind = self.chunk().kind_at(cell);
        match self.state {
            CombatState::Idle => {
                if kind != Some(EntityKind::Soldier) {
                    self.reject(RejectReason::CannotFire, status::CANNOT_FIRE, out_events);
                    return;
                }
                self.actor = Some(cell);
                self.state = CombatState::Firing;
                self.status = status::SELECT_TARGET;
                out_events.push(Event::ActorSelected { cell });
            }
            CombatState::Firing => {
                if kind != Some(EntityKind::Alien) {
                    self.reject(RejectReason::CannotTarget, status::CANNOT_TARGET, out_events);
                    return;
                }
                let actor = self
                    .actor
                    .take()
                    .expect("the firing state always carries a shooter");
                self.fire(actor, cell, out_events);
            }
        }
    }

    fn fire(&mut self, actor: CellCoord, target: CellCoord, out_events: &mut Vec<Event>) {
        let chunk = self
            .arena
            .get_mut(self.active)
            .expect("the active chunk stays in the arena for the whole session");
        let resolution = self
            .resolver
            .resolve(chunk, actor, target, &mut self.ground, &mut self.rng);

        out_events.push(Event::ShotResolved {
            actor,
            target,
            threshold: resolution.threshold,
            roll: resolution.roll,
            outcome: resolution.outcome,
        });
        if resolution.downed {
            out_events.push(Event::AlienDowned { cell: target });
        }

        self.state = CombatState::Idle;
        self.status = resolution.outcome.status();
        self.cursor.enabled = false;
        out_events.push(Event::CursorToggled { enabled: false });
        if self.cursor.cell != actor {
            out_events.push(Event::CursorMoved {
                from: self.cursor.cell,
                to: actor,
            });
            self.cursor.cell = actor;
        }
    }
}

/// Advances the session by one turn.
///
/// Once the player has quit, further commands are ignored and produce no
/// events.
pub fn apply(game: &mut Game, command: Command, out_events: &mut Vec<Event>) {
    if game.quit {
        return;
    }

    game.turn = game.turn.saturating_add(1);
    game.status = status::READY;
    out_events.push(Event::TurnAdvanced { turn: game.turn });

    match command {
        Command::Move(direction) => game.move_cursor(direction, out_events),
        Command::ToggleCursor => game.toggle_cursor(out_events),
        Command::Confirm => game.select_target(out_events),
        Command::Quit => {
            game.quit = true;
            out_events.push(Event::QuitRequested);
        }
        Command::Unknown(symbol) => game.reject(
            RejectReason::UnknownCommand(symbol),
            status::UNKNOWN_COMMAND,
            out_events,
        ),
    }
}

/// Query functions that provide read-only access to a session.
pub mod query {
    use skirmish_core::{CellCoord, CombatState, Cursor, EntityKind};
    use skirmish_world::Chunk;

    use super::Game;

    /// Chunk the session is played on.
    #[must_use]
    pub fn chunk(game: &Game) -> &Chunk {
        game.chunk()
    }

    /// Kind of every cell in raster order, for a full redraw.
    #[must_use]
    pub fn kinds(game: &Game) -> Vec<EntityKind> {
        skirmish_world::query::kinds(game.chunk())
    }

    /// Kind of a single cell, for an incremental redraw.
    #[must_use]
    pub fn kind_at(game: &Game, cell: CellCoord) -> Option<EntityKind> {
        skirmish_world::query::kind_at(game.chunk(), cell)
    }

    /// Cursor position and visibility.
    #[must_use]
    pub fn cursor(game: &Game) -> Cursor {
        game.cursor
    }

    /// Status line describing the outcome of the last command.
    #[must_use]
    pub fn status(game: &Game) -> &'static str {
        game.status
    }

    /// Number of commands processed so far.
    #[must_use]
    pub fn turn(game: &Game) -> u32 {
        game.turn
    }

    /// Current state of the targeting machine.
    #[must_use]
    pub fn state(game: &Game) -> CombatState {
        game.state
    }

    /// Cell of the soldier waiting for a target, if any.
    #[must_use]
    pub fn actor(game: &Game) -> Option<CellCoord> {
        game.actor
    }

    /// Reports whether the player asked to end the session.
    #[must_use]
    pub fn is_quit(game: &Game) -> bool {
        game.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_game() -> Game {
        Game::new(GameConfig::default())
    }

    #[test]
    fn fresh_session_is_idle_and_ready() {
        let game = default_game();
        assert_eq!(query::turn(&game), 0);
        assert_eq!(query::status(&game), status::READY);
        assert_eq!(query::state(&game), CombatState::Idle);
        assert_eq!(query::cursor(&game), Cursor::default());
        assert!(!query::is_quit(&game));
        assert_eq!(
            query::kinds(&game).len(),
            ChunkDimensions::REFERENCE.cell_count()
        );
    }

    #[test]
    fn every_command_advances_the_turn() {
        let mut game = default_game();
        let mut events = Vec::new();
        for (expected, symbol) in (1..).zip(['x', 'w', ' ', 'd', 'f', ' ']) {
            events.clear();
            apply(&mut game, Command::from_symbol(symbol), &mut events);
            assert_eq!(query::turn(&game), expected);
            assert_eq!(events.first(), Some(&Event::TurnAdvanced { turn: expected }));
        }
    }

    #[test]
    fn unknown_symbols_only_change_the_status() {
        let mut game = default_game();
        let mut events = Vec::new();
        apply(&mut game, Command::Unknown('z'), &mut events);
        assert_eq!(query::status(&game), status::UNKNOWN_COMMAND);
        assert_eq!(query::state(&game), CombatState::Idle);
        assert_eq!(
            events,
            vec![
                Event::TurnAdvanced { turn: 1 },
                Event::CommandRejected {
                    reason: RejectReason::UnknownCommand('z')
                },
            ]
        );
    }

    #[test]
    fn quit_freezes_the_session() {
        let mut game = default_game();
        let mut events = Vec::new();
        apply(&mut game, Command::Quit, &mut events);
        assert!(query::is_quit(&game));
        assert_eq!(events.last(), Some(&Event::QuitRequested));

        events.clear();
        apply(&mut game, Command::ToggleCursor, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::turn(&game), 1);
        assert!(!query::cursor(&game).enabled);
    }
}
