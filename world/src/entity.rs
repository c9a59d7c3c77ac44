//! Entity values and the counted handles that chunk cells hold.

use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
};

use rand::{seq::SliceRandom, Rng};
use skirmish_core::{
    AlienSkill, CoverKind, EntityKind, SoldierSkill, ALIEN_MAX_HITPOINTS, COVER_MAX_HITPOINTS,
    SOLDIER_MAX_HITPOINTS,
};
use thiserror::Error;

/// Failures raised while sharing an entity.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EntityError {
    /// The entity already carries as many shares as its counter can express.
    #[error("entity already carries {shares} shares")]
    ShareCeiling {
        /// Share count at the moment of the request.
        shares: u8,
    },
}

/// Soldier or alien statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor<S> {
    /// Remaining hitpoints.
    pub hitpoints: u8,
    /// Cells the actor may cover in one move.
    pub mobility: u8,
    /// Skill tag; stored, not interpreted.
    pub skill: S,
}

impl<S> Actor<S> {
    /// Removes up to `damage` hitpoints and reports what is left.
    pub fn wound(&mut self, damage: u8) -> u8 {
        self.hitpoints = self.hitpoints.saturating_sub(damage);
        self.hitpoints
    }
}

/// Obstruction statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cover {
    /// Which kind of cover this is.
    pub kind: CoverKind,
    /// Whether the cover shields a standing actor.
    pub tall: bool,
    /// Remaining hitpoints.
    pub hitpoints: u8,
}

impl Cover {
    /// Fresh cover of the provided kind.
    #[must_use]
    pub const fn new(kind: CoverKind) -> Self {
        Self {
            kind,
            tall: kind.is_tall(),
            hitpoints: COVER_MAX_HITPOINTS,
        }
    }
}

/// Everything a chunk cell can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// Bare floor.
    Ground,
    /// Concealing vegetation.
    Grass {
        /// Whether the grass is burning.
        fire: bool,
    },
    /// An obstruction.
    Cover(Cover),
    /// A squad member.
    Soldier(Actor<SoldierSkill>),
    /// A hostile.
    Alien(Actor<AlienSkill>),
}

impl Entity {
    /// Discriminant exposed to display and queries.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Ground => EntityKind::Ground,
            Self::Grass { .. } => EntityKind::Grass,
            Self::Cover(cover) => EntityKind::Cover(cover.kind),
            Self::Soldier(_) => EntityKind::Soldier,
            Self::Alien(_) => EntityKind::Alien,
        }
    }

    /// Reports whether the entity is one of the cover kinds.
    #[must_use]
    pub const fn is_cover(&self) -> bool {
        matches!(self, Self::Cover(_))
    }
}

/// Selector for [`EntityRef::make`]; the kind-specific defaults are filled in
/// by the factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Blueprint {
    /// Unlit grass.
    Grass,
    /// Cover of a uniformly drawn kind.
    Cover,
    /// Soldier with full hitpoints and a random skill.
    Soldier,
    /// Alien with full hitpoints and a random skill.
    Alien,
}

impl Blueprint {
    /// Builds the entity value with kind-specific defaults.
    pub fn build<R: Rng + ?Sized>(self, mobility: u8, rng: &mut R) -> Entity {
        match self {
            Self::Grass => Entity::Grass { fire: false },
            Self::Cover => Entity::Cover(Cover::new(pick(&CoverKind::ALL, rng))),
            Self::Soldier => Entity::Soldier(Actor {
                hitpoints: SOLDIER_MAX_HITPOINTS,
                mobility,
                skill: pick(&SoldierSkill::ALL, rng),
            }),
            Self::Alien => Entity::Alien(Actor {
                hitpoints: ALIEN_MAX_HITPOINTS,
                mobility,
                skill: pick(&AlienSkill::ALL, rng),
            }),
        }
    }
}

fn pick<T: Copy, R: Rng + ?Sized>(choices: &[T], rng: &mut R) -> T {
    *choices
        .choose(rng)
        .expect("entity tables are never empty")
}

struct Slot {
    entity: RefCell<Entity>,
    shares: Cell<u8>,
}

/// Counted handle to an entity.
///
/// Every live handle accounts for exactly one share. Shares are taken with
/// [`EntityRef::hold`] and given back by dropping the handle or calling
/// [`EntityRef::release`]; the entity is freed when the last share goes.
/// The counter is a byte, so [`EntityRef::hold`] refuses to go past
/// `u8::MAX` instead of wrapping.
pub struct EntityRef {
    slot: Rc<Slot>,
}

impl EntityRef {
    /// Allocates a fresh entity carrying a single share.
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            slot: Rc::new(Slot {
                entity: RefCell::new(entity),
                shares: Cell::new(1),
            }),
        }
    }

    /// Allocates a fresh entity from a blueprint.
    pub fn make<R: Rng + ?Sized>(blueprint: Blueprint, mobility: u8, rng: &mut R) -> Self {
        Self::new(blueprint.build(mobility, rng))
    }

    /// Takes another share of the same entity.
    pub fn hold(&self) -> Result<EntityRef, EntityError> {
        let shares = self.slot.shares.get();
        if shares == u8::MAX {
            return Err(EntityError::ShareCeiling { shares });
        }
        self.slot.shares.set(shares + 1);
        Ok(Self {
            slot: Rc::clone(&self.slot),
        })
    }

    /// Gives back this share; returns `true` when it was the last one and the
    /// entity has been freed.
    pub fn release(self) -> bool {
        let last = self.shares() == 1;
        drop(self);
        last
    }

    /// Number of live handles to this entity.
    #[must_use]
    pub fn shares(&self) -> u8 {
        self.slot.shares.get()
    }

    /// Discriminant of the entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.slot.entity.borrow().kind()
    }

    /// Reports whether the entity is one of the cover kinds.
    #[must_use]
    pub fn is_cover(&self) -> bool {
        self.slot.entity.borrow().is_cover()
    }

    /// Immutable access to the entity value.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Entity> {
        self.slot.entity.borrow()
    }

    /// Mutable access to the entity value.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Entity> {
        self.slot.entity.borrow_mut()
    }

    /// Reports whether both handles point at the same instance.
    #[must_use]
    pub fn same_instance(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    /// Non-owning observer that outlives the handle.
    #[must_use]
    pub fn watch(&self) -> EntityWatch {
        EntityWatch {
            slot: Rc::downgrade(&self.slot),
        }
    }
}

impl Drop for EntityRef {
    fn drop(&mut self) {
        let shares = self.slot.shares.get();
        debug_assert_eq!(usize::from(shares), Rc::strong_count(&self.slot));
        self.slot.shares.set(shares - 1);
        if shares == 1 {
            log::trace!("freeing {:?}", self.slot.entity.borrow().kind());
        }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("entity", &*self.slot.entity.borrow())
            .field("shares", &self.shares())
            .finish()
    }
}

/// Observer that reports whether an entity is still allocated.
#[derive(Clone, Debug)]
pub struct EntityWatch {
    slot: Weak<Slot>,
}

impl EntityWatch {
    /// Reports whether any share of the entity is still live.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.slot.strong_count() > 0
    }

    /// Share count of the entity, zero once it has been freed.
    #[must_use]
    pub fn shares(&self) -> u8 {
        self.slot.upgrade().map_or(0, |slot| slot.shares.get())
    }
}

/// Hands out shares of one stateless terrain instance, minting a new one
/// whenever the current instance reaches the share ceiling.
///
/// The pool keeps one share of the instance it is currently handing out.
#[derive(Debug)]
pub struct TerrainPool {
    template: Entity,
    current: Option<EntityRef>,
    minted: usize,
}

impl TerrainPool {
    /// Creates a pool that mints copies of `template`.
    #[must_use]
    pub const fn new(template: Entity) -> Self {
        Self {
            template,
            current: None,
            minted: 0,
        }
    }

    /// Pool of bare floor.
    #[must_use]
    pub const fn ground() -> Self {
        Self::new(Entity::Ground)
    }

    /// Pool of unlit grass.
    #[must_use]
    pub const fn grass() -> Self {
        Self::new(Entity::Grass { fire: false })
    }

    /// Returns a share of the pooled instance.
    pub fn share(&mut self) -> EntityRef {
        if let Some(current) = &self.current {
            match current.hold() {
                Ok(share) => return share,
                Err(error) => {
                    log::debug!("{:?} pool rolls over: {error}", self.template.kind());
                }
            }
        }

        let fresh = EntityRef::new(self.template);
        let share = fresh
            .hold()
            .expect("a freshly minted entity carries a single share");
        self.current = Some(fresh);
        self.minted += 1;
        share
    }

    /// Number of instances minted so far.
    #[must_use]
    pub const fn minted(&self) -> usize {
        self.minted
    }
}
