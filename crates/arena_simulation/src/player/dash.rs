//! DashAbility — рывок с cooldown
//!
//! Мгновенное смещение на `force` в направлении движения (вперёд, если
//! стоим). Требует grounded. Время — симуляционное (`FixedClock`).

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DashAbility {
    /// Секунды между рывками
    pub cooldown: f32,
    /// Длина смещения
    pub force: f32,
    /// Окно рывка (для анимаций / неуязвимости хоста)
    pub duration: f32,
    last_used: Option<f64>,
}

impl Default for DashAbility {
    fn default() -> Self {
        Self {
            cooldown: 5.0,
            force: 15.0,
            duration: 0.2,
            last_used: None,
        }
    }
}

impl DashAbility {
    pub fn can_use(&self, now: f64) -> bool {
        self.remaining_cooldown(now) <= 0.0
    }

    /// Попытка рывка. `Some(offset)` при успехе.
    ///
    /// `direction` проецируется на горизонталь; ноль → `forward`.
    pub fn try_use(&mut self, now: f64, grounded: bool, direction: Vec3, forward: Vec3) -> Option<Vec3> {
        if !grounded || !self.can_use(now) {
            return None;
        }

        let flat = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let dash_direction = if flat == Vec3::ZERO {
            Vec3::new(forward.x, 0.0, forward.z).normalize_or(Vec3::NEG_Z)
        } else {
            flat
        };

        self.last_used = Some(now);
        Some(dash_direction * self.force)
    }

    pub fn is_dashing(&self, now: f64) -> bool {
        self.last_used
            .is_some_and(|used| now - used < self.duration as f64)
    }

    /// Секунды до готовности
    pub fn remaining_cooldown(&self, now: f64) -> f32 {
        match self.last_used {
            Some(used) => (self.cooldown as f64 - (now - used)).max(0.0) as f32,
            None => 0.0,
        }
    }

    /// Готовность 0..100
    pub fn cooldown_percentage(&self, now: f64) -> f32 {
        if self.cooldown <= 0.0 {
            return 100.0;
        }
        (1.0 - self.remaining_cooldown(now) / self.cooldown) * 100.0
    }

    pub fn reset(&mut self) {
        self.last_used = None;
    }
}
