//! Collision groups
//!
//! Каждая группа — отдельный бит. Membership + filter упаковываются в
//! rapier `InteractionGroups` при создании коллайдера.
//!
//! | Group  | Bit | Collides with          |
//! |--------|-----|------------------------|
//! | Player | 1   | World, Bot             |
//! | Bot    | 2   | World, Player, Bot     |
//! | World  | 4   | Player, Bot            |
//! | Bullet | 8   | — (hitscan, без тел)   |

pub const GROUP_PLAYER: u32 = 1 << 0;
pub const GROUP_BOT: u32 = 1 << 1;
pub const GROUP_WORLD: u32 = 1 << 2;
pub const GROUP_BULLET: u32 = 1 << 3;

pub const MASK_PLAYER: u32 = GROUP_WORLD | GROUP_BOT;
pub const MASK_BOT: u32 = GROUP_WORLD | GROUP_PLAYER | GROUP_BOT;
pub const MASK_WORLD: u32 = GROUP_PLAYER | GROUP_BOT;
pub const MASK_BULLET: u32 = 0;

/// Всё, во что может попасть hitscan / LOS луч
pub const MASK_RAYCAST_ALL: u32 = GROUP_PLAYER | GROUP_BOT | GROUP_WORLD;

/// Membership + filter одного коллайдера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionGroups {
    pub membership: u32,
    pub filter: u32,
}

impl CollisionGroups {
    pub const PLAYER: Self = Self::new(GROUP_PLAYER, MASK_PLAYER);
    pub const BOT: Self = Self::new(GROUP_BOT, MASK_BOT);
    pub const WORLD: Self = Self::new(GROUP_WORLD, MASK_WORLD);
    pub const BULLET: Self = Self::new(GROUP_BULLET, MASK_BULLET);

    pub const fn new(membership: u32, filter: u32) -> Self {
        Self { membership, filter }
    }

    /// Взаимодействие двустороннее: каждый должен быть в filter другого
    pub fn interacts_with(&self, other: &Self) -> bool {
        (self.membership & other.filter) != 0 && (other.membership & self.filter) != 0
    }
}

/// Название группы для debug логов
pub fn group_name(bits: u32) -> &'static str {
    match bits {
        GROUP_PLAYER => "Player",
        GROUP_BOT => "Bot",
        GROUP_WORLD => "World",
        GROUP_BULLET => "Bullet",
        _ => "Unknown",
    }
}
