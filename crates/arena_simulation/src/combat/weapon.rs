//! Weapon — ammo, fire-rate gating, reload, spread
//!
//! Closed enum `WeaponKind` + таблица статов. Сам `Weapon` — не компонент,
//! им владеет `WeaponManager` (roster по слотам).
//!
//! Состояния: Idle → (fire) → CoolingDown → Idle; Idle → (reload) → Reloading → Idle.
//! Завершение reload приходит извне (scheduled event `ReloadComplete`).

use bevy::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
}

/// Статы оружия (неизменяемые)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub name: &'static str,
    pub damage: f32,
    /// Выстрелов в минуту
    pub fire_rate: f32,
    pub magazine_size: u32,
    /// Стартовый запас патронов
    pub reserve_ammo: u32,
    /// Секунды
    pub reload_time: f32,
    /// Полный угол разброса (градусы)
    pub spread_degrees: f32,
    pub range: f32,
    /// Дробин на выстрел
    pub pellets: u32,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 3] = [WeaponKind::Pistol, WeaponKind::Rifle, WeaponKind::Shotgun];

    pub const fn spec(self) -> WeaponSpec {
        match self {
            WeaponKind::Pistol => WeaponSpec {
                name: "Pistol",
                damage: 25.0,
                fire_rate: 300.0,
                magazine_size: 12,
                reserve_ammo: 60,
                reload_time: 1.5,
                spread_degrees: 2.0,
                range: 50.0,
                pellets: 1,
            },
            WeaponKind::Rifle => WeaponSpec {
                name: "Rifle",
                damage: 30.0,
                fire_rate: 600.0,
                magazine_size: 30,
                reserve_ammo: 120,
                reload_time: 2.0,
                spread_degrees: 1.0,
                range: 100.0,
                pellets: 1,
            },
            WeaponKind::Shotgun => WeaponSpec {
                name: "Shotgun",
                damage: 12.0,
                fire_rate: 70.0,
                magazine_size: 6,
                reserve_ammo: 30,
                reload_time: 2.5,
                spread_degrees: 15.0,
                range: 25.0,
                pellets: 8,
            },
        }
    }

    /// Секунды между выстрелами
    pub fn shot_interval(self) -> f32 {
        60.0 / self.spec().fire_rate
    }
}

/// Один луч выстрела (одна дробина для shotgun)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRecord {
    pub weapon: WeaponKind,
    pub origin: Vec3,
    /// Нормализованное направление после разброса
    pub direction: Vec3,
    pub damage: f32,
    pub range: f32,
}

/// Результат `Weapon::fire`
#[derive(Debug, Clone, PartialEq)]
pub enum FireOutcome {
    /// Выстрел: одна запись на пулю/дробину
    Fired(Vec<FireRecord>),
    /// Магазин пуст (патроны не тратятся)
    Empty,
    Reloading,
    CoolingDown,
}

impl FireOutcome {
    pub fn is_fired(&self) -> bool {
        matches!(self, FireOutcome::Fired(_))
    }
}

/// Результат `Weapon::start_reload`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReloadOutcome {
    Started { duration: f32 },
    AlreadyReloading,
    MagazineFull,
    NoReserve,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub current_ammo: u32,
    pub reserve_ammo: u32,
    /// Оставшийся cooldown до следующего выстрела (уменьшается до 0)
    pub cooldown_timer: f32,
    reloading: bool,
    reload_started_at: Option<f64>,
}

impl Weapon {
    /// Полный магазин, стартовый запас, готов стрелять
    pub fn new(kind: WeaponKind) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            current_ammo: spec.magazine_size,
            reserve_ammo: spec.reserve_ammo,
            cooldown_timer: 0.0,
            reloading: false,
            reload_started_at: None,
        }
    }

    pub fn spec(&self) -> WeaponSpec {
        self.kind.spec()
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    pub fn can_fire(&self) -> bool {
        !self.reloading && self.current_ammo > 0 && self.cooldown_timer <= 0.0
    }

    pub fn is_magazine_full(&self) -> bool {
        self.current_ammo >= self.spec().magazine_size
    }

    /// Уменьшить cooldown (вызывается раз в кадр)
    pub fn tick(&mut self, delta: f32) {
        if self.cooldown_timer > 0.0 {
            self.cooldown_timer = (self.cooldown_timer - delta).max(0.0);
        }
    }

    /// Нажатие спуска
    pub fn fire(&mut self, origin: Vec3, direction: Vec3, rng: &mut impl Rng) -> FireOutcome {
        if self.reloading {
            return FireOutcome::Reloading;
        }
        if self.current_ammo == 0 {
            return FireOutcome::Empty;
        }
        if self.cooldown_timer > 0.0 {
            return FireOutcome::CoolingDown;
        }

        let spec = self.spec();
        self.current_ammo -= 1;
        self.cooldown_timer = self.kind.shot_interval();

        let records = (0..spec.pellets)
            .map(|_| FireRecord {
                weapon: self.kind,
                origin,
                direction: apply_spread(direction, spec.spread_degrees, rng),
                damage: spec.damage,
                range: spec.range,
            })
            .collect();

        FireOutcome::Fired(records)
    }

    /// Начать перезарядку. `now` — время симуляции (для progress).
    pub fn start_reload(&mut self, now: f64) -> ReloadOutcome {
        if self.reloading {
            return ReloadOutcome::AlreadyReloading;
        }
        if self.is_magazine_full() {
            return ReloadOutcome::MagazineFull;
        }
        if self.reserve_ammo == 0 {
            return ReloadOutcome::NoReserve;
        }

        self.reloading = true;
        self.reload_started_at = Some(now);
        ReloadOutcome::Started {
            duration: self.spec().reload_time,
        }
    }

    /// Завершить перезарядку: reserve → magazine. Возвращает сколько перенесено.
    pub fn finish_reload(&mut self) -> u32 {
        if !self.reloading {
            return 0;
        }

        let deficit = self.spec().magazine_size.saturating_sub(self.current_ammo);
        let transfer = deficit.min(self.reserve_ammo);
        self.current_ammo += transfer;
        self.reserve_ammo -= transfer;

        self.reloading = false;
        self.reload_started_at = None;
        transfer
    }

    /// 0..1 пока идёт перезарядка
    pub fn reload_progress(&self, now: f64) -> Option<f32> {
        let started = self.reload_started_at?;
        let duration = self.spec().reload_time as f64;
        if duration <= 0.0 {
            return Some(1.0);
        }
        Some((((now - started) / duration).clamp(0.0, 1.0)) as f32)
    }

    pub fn total_ammo(&self) -> u32 {
        self.current_ammo + self.reserve_ammo
    }
}

/// Разброс: поворот вокруг мировой Y, затем мировой X
///
/// Угол по каждой оси равномерно в [-spread/2, spread/2].
pub fn apply_spread(direction: Vec3, spread_degrees: f32, rng: &mut impl Rng) -> Vec3 {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO || spread_degrees <= 0.0 {
        return direction;
    }

    let spread = spread_degrees.to_radians();
    let yaw = (rng.gen::<f32>() - 0.5) * spread;
    let pitch = (rng.gen::<f32>() - 0.5) * spread;

    (Quat::from_rotation_x(pitch) * Quat::from_rotation_y(yaw) * direction).normalize()
}
