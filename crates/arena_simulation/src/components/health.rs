//! Health — damage / heal / death / respawn
//!
//! Инварианты:
//! - 0 ≤ current ≤ max
//! - `dead` выставляется ровно один раз (при достижении 0 или явном `die`)
//! - heal не воскрешает; только `respawn`
//!
//! Методы возвращают исход перехода, события пишет вызывающая система.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub dead: bool,
}

/// Исход `take_damage`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Уже мёртв — урон проигнорирован
    Ignored,
    /// Урон применён, актор жив
    Wounded { applied: f32 },
    /// Урон применён, актор умер этим ударом
    Killed { applied: f32 },
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// 0..100
    pub fn percentage(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max * 100.0
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        let amount = amount.max(0.0);
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        let applied = before - self.current;

        if self.current <= 0.0 {
            self.current = 0.0;
            self.dead = true;
            DamageOutcome::Killed { applied }
        } else {
            DamageOutcome::Wounded { applied }
        }
    }

    /// Лечение. `None` если мёртв, иначе фактически добавленное HP.
    pub fn heal(&mut self, amount: f32) -> Option<f32> {
        if self.dead {
            return None;
        }

        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        Some(self.current - before)
    }

    /// Явная смерть. `false` если уже мёртв.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.current = 0.0;
        self.dead = true;
        true
    }

    /// Полное HP, флаг смерти снят
    pub fn respawn(&mut self) {
        self.current = self.max;
        self.dead = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100.0);

        assert_eq!(health.take_damage(30.0), DamageOutcome::Wounded { applied: 30.0 });
        assert_eq!(health.current, 70.0);
        assert!(health.is_alive());

        // Overkill: применяется только остаток
        assert_eq!(health.take_damage(100.0), DamageOutcome::Killed { applied: 70.0 });
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_damage_after_death_is_noop() {
        let mut health = Health::new(50.0);
        assert!(matches!(health.take_damage(50.0), DamageOutcome::Killed { .. }));

        assert_eq!(health.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(health.current, 0.0);
        assert!(health.dead);
    }

    #[test]
    fn test_heal_clamps_and_never_revives() {
        let mut health = Health::new(100.0);
        health.take_damage(50.0);

        assert_eq!(health.heal(80.0), Some(50.0));
        assert_eq!(health.current, 100.0);

        health.die();
        assert_eq!(health.heal(10.0), None);
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_die_is_idempotent() {
        let mut health = Health::new(100.0);
        assert!(health.die());
        assert!(!health.die());
    }

    #[test]
    fn test_respawn_after_die() {
        let mut health = Health::new(120.0);
        health.die();
        health.respawn();

        assert_eq!(health.current, 120.0);
        assert!(!health.dead);
        assert_eq!(health.percentage(), 100.0);
    }

    #[test]
    fn test_negative_damage_does_not_heal() {
        let mut health = Health::new(100.0);
        health.take_damage(20.0);

        assert_eq!(health.take_damage(-50.0), DamageOutcome::Wounded { applied: 0.0 });
        assert_eq!(health.current, 80.0);
    }
}
