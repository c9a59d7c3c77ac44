//! Chunk storage with handle-based neighbor links.

use std::collections::BTreeMap;

use skirmish_core::Direction;
use thiserror::Error;

use crate::chunk::Chunk;

/// Identifier allocated to a chunk by its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    /// Creates a chunk identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a neighbor link request may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// No chunk with the identifier lives in the arena.
    #[error("chunk {0:?} is not stored in the arena")]
    MissingChunk(ChunkId),
    /// A chunk cannot neighbor itself.
    #[error("chunk {0:?} cannot be linked to itself")]
    SelfLink(ChunkId),
}

/// Owns chunks and keeps their neighbor links symmetric.
#[derive(Debug)]
pub struct ChunkArena {
    chunks: BTreeMap<ChunkId, Chunk>,
    next_chunk_id: ChunkId,
}

impl Default for ChunkArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkArena {
    /// Creates an empty arena with a reset identifier counter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunks: BTreeMap::new(),
            next_chunk_id: ChunkId::new(0),
        }
    }

    /// Stores a chunk and returns its identifier.
    ///
    /// Identifiers are never reused.
    pub fn insert(&mut self, chunk: Chunk) -> ChunkId {
        let id = self.next_chunk_id;
        self.next_chunk_id = ChunkId::new(id.get() + 1);
        let _ = self.chunks.insert(id, chunk);
        id
    }

    /// Chunk stored under the identifier.
    #[must_use]
    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    /// Mutable chunk stored under the identifier.
    #[must_use]
    pub fn get_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.chunks.get_mut(&id)
    }

    /// Number of chunks alive in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Reports whether the arena holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Neighbor of `id` toward `direction`.
    #[must_use]
    pub fn neighbor(&self, id: ChunkId, direction: Direction) -> Option<ChunkId> {
        self.get(id).and_then(|chunk| chunk.neighbor(direction))
    }

    /// Links `from` to `to` toward `direction` and `to` back to `from` toward
    /// the opposite direction. Links previously held by either slot are
    /// cleared on both ends.
    pub fn link(
        &mut self,
        from: ChunkId,
        direction: Direction,
        to: ChunkId,
    ) -> Result<(), LinkError> {
        if from == to {
            return Err(LinkError::SelfLink(from));
        }
        for id in [from, to] {
            if !self.chunks.contains_key(&id) {
                return Err(LinkError::MissingChunk(id));
            }
        }

        self.unlink(from, direction);
        self.unlink(to, direction.opposite());
        self.write_slot(from, direction, Some(to));
        self.write_slot(to, direction.opposite(), Some(from));
        Ok(())
    }

    /// Removes the chunk, clearing every reciprocal link that pointed at it.
    pub fn remove(&mut self, id: ChunkId) -> Option<Chunk> {
        let mut chunk = self.chunks.remove(&id)?;
        for direction in Direction::ALL {
            if let Some(neighbor) = chunk.set_neighbor(direction, None) {
                self.write_slot(neighbor, direction.opposite(), None);
            }
        }
        log::trace!("removed chunk {}", id.get());
        Some(chunk)
    }

    fn unlink(&mut self, id: ChunkId, direction: Direction) {
        let previous = self
            .get_mut(id)
            .and_then(|chunk| chunk.set_neighbor(direction, None));
        if let Some(previous) = previous {
            self.write_slot(previous, direction.opposite(), None);
        }
    }

    fn write_slot(&mut self, id: ChunkId, direction: Direction, value: Option<ChunkId>) {
        if let Some(chunk) = self.get_mut(id) {
            let _ = chunk.set_neighbor(direction, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TerrainPool;
    use skirmish_core::ChunkDimensions;

    fn chunk() -> Chunk {
        let dimensions = ChunkDimensions::new(3, 3).expect("valid");
        Chunk::filled(dimensions, &mut TerrainPool::ground())
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let mut arena = ChunkArena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.insert(chunk()).get(), 0);
        assert_eq!(arena.insert(chunk()).get(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn link_rejects_self_and_missing_chunks() {
        let mut arena = ChunkArena::new();
        let a = arena.insert(chunk());
        assert_eq!(arena.link(a, Direction::East, a), Err(LinkError::SelfLink(a)));
        let ghost = ChunkId::new(99);
        assert_eq!(
            arena.link(a, Direction::East, ghost),
            Err(LinkError::MissingChunk(ghost))
        );
        assert_eq!(arena.neighbor(a, Direction::East), None);
    }

    #[test]
    fn relinking_a_slot_clears_the_old_back_link() {
        let mut arena = ChunkArena::new();
        let a = arena.insert(chunk());
        let b = arena.insert(chunk());
        let c = arena.insert(chunk());

        arena.link(a, Direction::North, b).expect("link");
        arena.link(a, Direction::North, c).expect("relink");

        assert_eq!(arena.neighbor(a, Direction::North), Some(c));
        assert_eq!(arena.neighbor(c, Direction::South), Some(a));
        assert_eq!(arena.neighbor(b, Direction::South), None);
    }
}
