use skirmish_core::{CellCoord, ChunkDimensions, Direction, EntityKind};
use skirmish_world::{query, Chunk, ChunkArena, EntityRef, TerrainPool};

fn reference_chunk(pool: &mut TerrainPool) -> Chunk {
    Chunk::filled(ChunkDimensions::REFERENCE, pool)
}

#[test]
fn reference_chunk_rolls_over_its_ground_pool() {
    let mut pool = TerrainPool::ground();
    let chunk = reference_chunk(&mut pool);
    let cells = ChunkDimensions::REFERENCE.cell_count();

    // The pool keeps one share of each instance it has minted.
    let per_instance = usize::from(u8::MAX) - 1;
    assert_eq!(pool.minted(), cells.div_ceil(per_instance));

    let kinds = query::kinds(&chunk);
    assert_eq!(kinds.len(), cells);
    assert!(kinds.iter().all(|kind| *kind == EntityKind::Ground));

    let mut total_shares = 0usize;
    let mut seen: Vec<&EntityRef> = Vec::new();
    for (_, entity) in chunk.iter() {
        if !seen.iter().any(|known| known.same_instance(entity)) {
            total_shares += usize::from(entity.shares());
            seen.push(entity);
        }
    }
    assert_eq!(seen.len(), pool.minted());
    assert_eq!(total_shares, cells + 1, "cells plus the pool's own share");
}

#[test]
fn releasing_all_but_one_sharer_keeps_the_instance() {
    let mut pool = TerrainPool::grass();
    let sharers: Vec<EntityRef> = (0..10).map(|_| pool.share()).collect();
    drop(pool);

    let watch = sharers[0].watch();
    let mut sharers = sharers.into_iter();
    let survivor = sharers.next().expect("ten sharers");
    for sharer in sharers {
        assert!(!sharer.release());
    }

    assert!(watch.is_alive());
    assert_eq!(survivor.shares(), 1);
    assert_eq!(survivor.kind(), EntityKind::Grass);
    assert!(survivor.release());
    assert!(!watch.is_alive());
}

#[test]
fn removing_a_chunk_clears_reciprocal_links() {
    let mut pool = TerrainPool::ground();
    let mut arena = ChunkArena::new();
    let a = arena.insert(Chunk::filled(
        ChunkDimensions::new(4, 4).expect("valid"),
        &mut pool,
    ));
    let b = arena.insert(Chunk::filled(
        ChunkDimensions::new(4, 4).expect("valid"),
        &mut pool,
    ));

    arena.link(a, Direction::East, b).expect("link");
    assert_eq!(arena.neighbor(a, Direction::East), Some(b));
    assert_eq!(arena.neighbor(b, Direction::West), Some(a));

    let removed = arena.remove(b).expect("chunk b");
    assert_eq!(removed.neighbor(Direction::West), None);
    assert_eq!(arena.neighbor(a, Direction::East), None);
    assert_eq!(arena.len(), 1);
}

#[test]
fn cells_of_lists_placed_actors() {
    let mut pool = TerrainPool::ground();
    let mut chunk = Chunk::filled(ChunkDimensions::new(5, 5).expect("valid"), &mut pool);
    let cell = CellCoord::new(3, 1);
    assert!(chunk.place_at(cell, || EntityRef::new(skirmish_world::Entity::Alien(
        skirmish_world::Actor {
            hitpoints: 4,
            mobility: 1,
            skill: skirmish_core::AlienSkill::Stealth,
        }
    ))));

    assert_eq!(query::cells_of(&chunk, EntityKind::Alien), vec![cell]);
    assert_eq!(query::kind_at(&chunk, cell), Some(EntityKind::Alien));
    assert_eq!(query::shares_at(&chunk, cell), Some(1));
}
