//! ASCII rendition of a session.

use skirmish_core::{CoverKind, EntityKind};
use skirmish_system_turn_engine::{query, Game};

/// Character drawn for an entity kind.
pub(crate) const fn glyph(kind: EntityKind) -> char {
    match kind {
        EntityKind::Ground => '.',
        EntityKind::Grass => ',',
        EntityKind::Cover(CoverKind::Open) => '#',
        EntityKind::Cover(CoverKind::Indestructible) => '|',
        EntityKind::Cover(CoverKind::Half) => '_',
        EntityKind::Soldier => 'S',
        EntityKind::Alien => 'X',
    }
}

/// Draws the bordered chunk followed by the status line.
///
/// An enabled cursor is drawn as brackets on the cells left and right of the
/// one it points at, so the board fits the terminal it was sized for.
pub(crate) fn render(game: &Game) -> String {
    let dimensions = query::chunk(game).dimensions();
    let columns = dimensions.columns() as usize;
    let kinds = query::kinds(game);
    let cursor = query::cursor(game);

    let border = format!("+{}+", "-".repeat(columns));
    let mut out = String::with_capacity((columns + 3) * (dimensions.rows() as usize + 3));
    out.push_str(&border);
    out.push('\n');

    for (row, cells) in kinds.chunks(columns).enumerate() {
        let mut line: Vec<char> = std::iter::once('|')
            .chain(cells.iter().map(|kind| glyph(*kind)))
            .chain(std::iter::once('|'))
            .collect();
        if cursor.enabled && cursor.cell.row() as usize == row {
            let at = cursor.cell.column() as usize;
            line[at] = '[';
            line[at + 2] = ']';
        }
        out.extend(line);
        out.push('\n');
    }

    out.push_str(&border);
    out.push('\n');
    out.push_str(&status_line(game));
    out
}

fn status_line(game: &Game) -> String {
    let cursor = query::cursor(game);
    let mut line = format!("turn {}: {}", query::turn(game), query::status(game));
    if cursor.enabled {
        line.push_str(&format!(" ({},{})", cursor.cell.column(), cursor.cell.row()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{ChunkDimensions, Command};
    use skirmish_system_generator::GeneratorConfig;
    use skirmish_system_turn_engine::{apply, GameConfig};

    fn small_game() -> Game {
        let dimensions = ChunkDimensions::new(6, 4).expect("valid");
        Game::new(GameConfig {
            dimensions,
            seed: 12,
            generator: GeneratorConfig::bare(),
            ..GameConfig::default()
        })
    }

    #[test]
    fn board_fits_the_terminal_it_was_sized_for() {
        let game = small_game();
        let board = render(&game);
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 4 + 3);
        for line in &lines[..6] {
            assert_eq!(line.chars().count(), 6 + 2);
        }
        assert_eq!(lines[6], "turn 0: ready");
        assert_eq!(board.matches('S').count(), 1);
        assert_eq!(board.matches('X').count(), 1);
    }

    #[test]
    fn enabled_cursor_is_bracketed() {
        let mut game = small_game();
        let mut events = Vec::new();
        for symbol in " ds".chars() {
            apply(&mut game, Command::from_symbol(symbol), &mut events);
        }
        let board = render(&game);
        let lines: Vec<&str> = board.lines().collect();
        let row: Vec<char> = lines[2].chars().collect();
        assert_eq!(row[1], '[');
        assert_eq!(row[3], ']');
        assert_eq!(lines[6], "turn 3: ready (1,1)");
    }

    #[test]
    fn glyphs_are_distinct() {
        let kinds = [
            EntityKind::Ground,
            EntityKind::Grass,
            EntityKind::Cover(CoverKind::Open),
            EntityKind::Cover(CoverKind::Indestructible),
            EntityKind::Cover(CoverKind::Half),
            EntityKind::Soldier,
            EntityKind::Alien,
        ];
        let mut glyphs: Vec<char> = kinds.iter().map(|kind| glyph(*kind)).collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), kinds.len());
    }
}
