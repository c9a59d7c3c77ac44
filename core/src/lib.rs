#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish simulation.
//!
//! This crate defines the vocabulary that connects the input adapter, the
//! authoritative chunk state, and the pure systems. Adapters translate key
//! presses into [`Command`] values, the turn engine applies one command per
//! turn, and then broadcasts [`Event`] values that a display collaborator can
//! use for incremental redraws. Nothing in here owns state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal width the reference chunk geometry is derived from.
pub const REFERENCE_TERMINAL_WIDTH: u32 = 40;

/// Terminal height the reference chunk geometry is derived from.
pub const REFERENCE_TERMINAL_HEIGHT: u32 = 25;

/// Number of chunk columns in the reference configuration.
pub const GRID_COLUMNS: u32 = REFERENCE_TERMINAL_WIDTH - 2;

/// Number of chunk rows in the reference configuration.
pub const GRID_ROWS: u32 = REFERENCE_TERMINAL_HEIGHT - 3;

/// Hitpoints a freshly minted soldier starts with.
pub const SOLDIER_MAX_HITPOINTS: u8 = 5;

/// Hitpoints a freshly minted alien starts with.
pub const ALIEN_MAX_HITPOINTS: u8 = 4;

/// Hitpoints a freshly minted piece of cover starts with.
pub const COVER_MAX_HITPOINTS: u8 = 2;

/// Largest Manhattan distance at which a shot can still land.
pub const MAX_ENGAGEMENT_RANGE: u32 = 20;

/// Largest extent accepted on either chunk axis; coordinates live in a byte.
pub const MAX_CHUNK_EXTENT: u32 = u8::MAX as u32;

/// Status strings surfaced to the display collaborator.
pub mod status {
    /// Neutral message set at the start of every turn.
    pub const READY: &str = "ready";
    /// Shown after the cursor is enabled.
    pub const SELECT_ACTOR: &str = "select actor";
    /// Shown once a soldier has been picked as the shooter.
    pub const SELECT_TARGET: &str = "select target";
    /// Shown when the cell under the cursor holds no soldier.
    pub const CANNOT_FIRE: &str = "cannot fire";
    /// Shown when the cell under the cursor holds no alien.
    pub const CANNOT_TARGET: &str = "cannot target";
    /// Shown for symbols outside the command set.
    pub const UNKNOWN_COMMAND: &str = "unknown command";
    /// Shown when a shot misses.
    pub const MISSED: &str = "missed";
    /// Shown when a shot lands.
    pub const HIT: &str = "hit";
    /// Shown when a shot lands with a wide margin.
    pub const CRIT: &str = "crit";
}

/// Compass directions used by cursor movement and chunk neighbor links.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing row indices.
    South,
    /// Toward increasing column indices.
    East,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction, in neighbor slot order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Position of the direction inside [`Direction::ALL`].
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
        }
    }
}

/// Location of a single chunk cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Signed `(columns, rows)` offset leading from `self` to `other`.
    #[must_use]
    pub fn offset_to(self, other: CellCoord) -> (i64, i64) {
        (
            i64::from(other.column) - i64::from(self.column),
            i64::from(other.row) - i64::from(self.row),
        )
    }

    /// Cell displaced by the signed offset, or `None` when it would leave the
    /// non-negative quadrant.
    #[must_use]
    pub fn translated(self, columns: i64, rows: i64) -> Option<CellCoord> {
        let column = u32::try_from(i64::from(self.column).checked_add(columns)?).ok()?;
        let row = u32::try_from(i64::from(self.row).checked_add(rows)?).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl Default for CellCoord {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Reasons a chunk geometry cannot be used.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// The chunk cannot host two distinct actor cells.
    #[error("chunk of {columns}x{rows} cells cannot host two actors")]
    TooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// One of the axes does not fit the byte coordinate domain.
    #[error("chunk of {columns}x{rows} cells exceeds the 255 cell axis limit")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The terminal is too small to frame a chunk.
    #[error("terminal of {width}x{height} characters leaves no room for a chunk")]
    TerminalTooSmall {
        /// Terminal width in characters.
        width: u32,
        /// Terminal height in characters.
        height: u32,
    },
}

/// Size of a chunk measured in whole cells.
///
/// Deserialization goes through [`ChunkDimensions::new`], so a loaded
/// geometry obeys the same bounds as a constructed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct ChunkDimensions {
    columns: u32,
    rows: u32,
}

impl ChunkDimensions {
    /// Reference geometry derived from a 40x25 terminal.
    pub const REFERENCE: ChunkDimensions = ChunkDimensions {
        columns: GRID_COLUMNS,
        rows: GRID_ROWS,
    };

    /// Validates and creates a chunk geometry.
    pub fn new(columns: u32, rows: u32) -> Result<Self, ConfigError> {
        if columns > MAX_CHUNK_EXTENT || rows > MAX_CHUNK_EXTENT {
            return Err(ConfigError::TooLarge { columns, rows });
        }
        if columns < 2 || rows < 2 {
            return Err(ConfigError::TooSmall { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    /// Derives the chunk that fits inside a terminal of the given size.
    ///
    /// One column is lost to each side of the border, one row to the top
    /// border and two to the bottom border plus status line.
    pub fn from_terminal(width: u32, height: u32) -> Result<Self, ConfigError> {
        match (width.checked_sub(2), height.checked_sub(3)) {
            (Some(columns), Some(rows)) => Self::new(columns, rows),
            _ => Err(ConfigError::TerminalTooSmall { width, height }),
        }
    }

    /// Number of columns in the chunk.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the chunk.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the chunk.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Reports whether the cell lies inside the chunk.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of the cell, if it lies inside the chunk.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Cell stored at the row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> CellCoord {
        let width = self.columns as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }

    /// Neighbor of `cell` one step toward `direction`, clamped to the chunk.
    #[must_use]
    pub fn step_clamped(&self, cell: CellCoord, direction: Direction) -> CellCoord {
        let (column, row) = (cell.column(), cell.row());
        match direction {
            Direction::North => CellCoord::new(column, row.saturating_sub(1)),
            Direction::South => CellCoord::new(column, (row + 1).min(self.rows - 1)),
            Direction::East => CellCoord::new((column + 1).min(self.columns - 1), row),
            Direction::West => CellCoord::new(column.saturating_sub(1), row),
        }
    }

    /// Movement allowance shared by soldiers and aliens on this geometry.
    #[must_use]
    pub const fn mobility(&self) -> u8 {
        let mobility = (self.columns + self.rows) / 10;
        if mobility > u8::MAX as u32 {
            u8::MAX
        } else {
            mobility as u8
        }
    }
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl TryFrom<(u32, u32)> for ChunkDimensions {
    type Error = ConfigError;

    fn try_from((columns, rows): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(columns, rows)
    }
}

impl From<ChunkDimensions> for (u32, u32) {
    fn from(dimensions: ChunkDimensions) -> Self {
        (dimensions.columns, dimensions.rows)
    }
}

/// Kinds of cover that can be scattered across a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverKind {
    /// Freestanding cover that can be shot around.
    Open,
    /// Cover that cannot be destroyed.
    Indestructible,
    /// Low wall that only shields a crouching actor.
    Half,
}

impl CoverKind {
    /// Every cover kind, used for uniform draws.
    pub const ALL: [CoverKind; 3] = [CoverKind::Open, CoverKind::Indestructible, CoverKind::Half];

    /// Reports whether this kind of cover blocks a standing actor.
    #[must_use]
    pub const fn is_tall(self) -> bool {
        !matches!(self, Self::Half)
    }
}

/// Skills a soldier can be issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoldierSkill {
    /// Move and shoot in the same turn.
    RunAndGun,
    /// Heal an adjacent soldier.
    Cure,
    /// Throw an area explosive.
    Grenade,
    /// Extended firing range.
    Range,
}

impl SoldierSkill {
    /// Every soldier skill, used for uniform draws.
    pub const ALL: [SoldierSkill; 4] = [
        SoldierSkill::RunAndGun,
        SoldierSkill::Cure,
        SoldierSkill::Grenade,
        SoldierSkill::Range,
    ];
}

/// Skills an alien can be issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlienSkill {
    /// Turn a soldier against the squad.
    MindControl,
    /// Leap over cover.
    Jump,
    /// Hide from sight.
    Stealth,
    /// Damage over time.
    Poison,
}

impl AlienSkill {
    /// Every alien skill, used for uniform draws.
    pub const ALL: [AlienSkill; 4] = [
        AlienSkill::MindControl,
        AlienSkill::Jump,
        AlienSkill::Stealth,
        AlienSkill::Poison,
    ];
}

/// Discriminant of an entity, the only entity data that crosses into display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Bare floor.
    Ground,
    /// Concealing vegetation.
    Grass,
    /// An obstruction that shields actors.
    Cover(CoverKind),
    /// A member of the player's squad.
    Soldier,
    /// A hostile actor.
    Alien,
}

impl EntityKind {
    /// Reports whether the kind is one of the cover kinds.
    #[must_use]
    pub const fn is_cover(self) -> bool {
        matches!(self, Self::Cover(_))
    }

    /// Reports whether the kind blocks placement of anything new.
    #[must_use]
    pub const fn is_full(self) -> bool {
        !matches!(self, Self::Ground | Self::Grass)
    }
}

/// Player commands, one per turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Moves the cursor one cell.
    Move(Direction),
    /// Enables or disables the cursor.
    ToggleCursor,
    /// Picks the cell under the cursor as actor or target.
    Confirm,
    /// Ends the session.
    Quit,
    /// Any symbol outside the command set.
    Unknown(char),
}

impl Command {
    /// Maps an input symbol to a command.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Self {
        match symbol {
            'w' => Self::Move(Direction::North),
            's' => Self::Move(Direction::South),
            'd' => Self::Move(Direction::East),
            'a' => Self::Move(Direction::West),
            ' ' => Self::ToggleCursor,
            'f' => Self::Confirm,
            'q' => Self::Quit,
            other => Self::Unknown(other),
        }
    }
}

/// States of the targeting machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    /// No shooter selected.
    #[default]
    Idle,
    /// A soldier has been selected and awaits a target.
    Firing,
}

/// Cursor position and visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Cell under the cursor.
    pub cell: CellCoord,
    /// Whether the cursor is shown and accepts movement.
    pub enabled: bool,
}

/// Classification of a resolved shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// The roll did not beat the hit threshold.
    Missed,
    /// The shot landed.
    Hit,
    /// The shot landed with a wide margin.
    Crit,
}

impl ShotOutcome {
    /// Status string reported for the outcome.
    #[must_use]
    pub const fn status(self) -> &'static str {
        match self {
            Self::Missed => status::MISSED,
            Self::Hit => status::HIT,
            Self::Crit => status::CRIT,
        }
    }

    /// Hitpoints removed from the target.
    #[must_use]
    pub const fn damage(self) -> u8 {
        match self {
            Self::Missed => 0,
            Self::Hit => 1,
            Self::Crit => 2,
        }
    }
}

/// Reasons a command was turned down without changing state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Movement was requested while the cursor is hidden.
    CursorDisabled,
    /// The selected cell holds no soldier.
    CannotFire,
    /// The selected cell holds no alien.
    CannotTarget,
    /// The symbol is not part of the command set.
    UnknownCommand(char),
}

/// Events broadcast by the turn engine after processing a command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A new turn started.
    TurnAdvanced {
        /// Turn counter after the increment.
        turn: u32,
    },
    /// The cursor changed cell.
    CursorMoved {
        /// Cell the cursor occupied before moving.
        from: CellCoord,
        /// Cell the cursor occupies after moving.
        to: CellCoord,
    },
    /// The cursor was shown or hidden.
    CursorToggled {
        /// Visibility after the toggle.
        enabled: bool,
    },
    /// A soldier was picked as the shooter.
    ActorSelected {
        /// Cell holding the shooter.
        cell: CellCoord,
    },
    /// A command was turned down.
    CommandRejected {
        /// Why the command was turned down.
        reason: RejectReason,
    },
    /// A shot was resolved.
    ShotResolved {
        /// Cell holding the shooter.
        actor: CellCoord,
        /// Cell holding the target.
        target: CellCoord,
        /// Hit chance the roll was compared against.
        threshold: u8,
        /// Random byte that decided the shot.
        roll: u8,
        /// Classification of the shot.
        outcome: ShotOutcome,
    },
    /// An alien ran out of hitpoints and was cleared from its cell.
    AlienDowned {
        /// Cell the alien occupied.
        cell: CellCoord,
    },
    /// The player asked to end the session.
    QuitRequested,
}
