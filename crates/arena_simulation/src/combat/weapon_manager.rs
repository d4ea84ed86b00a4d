//! WeaponManager — roster оружия + hit resolution
//!
//! # Flow
//!
//! 1. Input / AI → `WeaponControl::pull_trigger` → `Weapon::fire`
//! 2. Каждый `FireRecord` → `FireRecordEvent`
//! 3. `resolve_fire_records` (FrameSet::Resolve): raycast от origin, без коллайдера стрелка
//! 4. `HitEvent` → damage (FrameSet::Apply)
//!
//! Reload: `WeaponControl::reload` ставит таймер `ReloadComplete { slot }`
//! на владельца, `complete_reloads` (FixedTick) переносит патроны.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;

use crate::combat::weapon::{FireOutcome, FireRecord, ReloadOutcome, Weapon, WeaponKind};
use crate::core::{Clock, FixedClock, ScheduledEvents, TimerElapsed, TimerKind};
use crate::physics::{PhysicsWorld, RayFilter};

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WeaponManager {
    weapons: Vec<Weapon>,
    active: usize,
}

impl Default for WeaponManager {
    fn default() -> Self {
        Self::player_loadout()
    }
}

impl WeaponManager {
    /// Пустой roster недопустим: без оружия `WeaponManager` не нужен
    pub fn new(kinds: &[WeaponKind]) -> Self {
        let mut weapons: Vec<Weapon> = kinds.iter().copied().map(Weapon::new).collect();
        if weapons.is_empty() {
            weapons.push(Weapon::new(WeaponKind::Pistol));
        }
        Self { weapons, active: 0 }
    }

    /// Slot 0 = Pistol, 1 = Rifle, 2 = Shotgun
    pub fn player_loadout() -> Self {
        Self::new(&WeaponKind::ALL)
    }

    pub fn single(kind: WeaponKind) -> Self {
        Self::new(&[kind])
    }

    pub fn slot_count(&self) -> usize {
        self.weapons.len()
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn active_weapon(&self) -> &Weapon {
        &self.weapons[self.active]
    }

    pub fn active_weapon_mut(&mut self) -> &mut Weapon {
        &mut self.weapons[self.active]
    }

    pub fn weapon(&self, slot: usize) -> Option<&Weapon> {
        self.weapons.get(slot)
    }

    pub fn weapon_mut(&mut self, slot: usize) -> Option<&mut Weapon> {
        self.weapons.get_mut(slot)
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Переключиться на слот. `Some(from)` если слот сменился.
    pub fn switch_to(&mut self, slot: usize) -> Option<usize> {
        if slot >= self.weapons.len() || slot == self.active {
            return None;
        }
        let from = self.active;
        self.active = slot;
        Some(from)
    }

    pub fn next_weapon(&mut self) -> Option<usize> {
        let next = (self.active + 1) % self.weapons.len();
        self.switch_to(next)
    }

    pub fn previous_weapon(&mut self) -> Option<usize> {
        let count = self.weapons.len();
        let previous = (self.active + count - 1) % count;
        self.switch_to(previous)
    }

    /// Магазин + запас активного оружия
    pub fn total_ammo(&self) -> u32 {
        self.active_weapon().total_ammo()
    }

    pub fn reload_progress(&self, now: f64) -> Option<f32> {
        self.active_weapon().reload_progress(now)
    }

    /// Cooldown всех оружий (не только активного)
    pub fn tick(&mut self, delta: f32) {
        for weapon in &mut self.weapons {
            weapon.tick(delta);
        }
    }

    pub fn fire(&mut self, origin: Vec3, direction: Vec3, rng: &mut impl Rng) -> FireOutcome {
        self.active_weapon_mut().fire(origin, direction, rng)
    }
}

// ============================================================================
// Events
// ============================================================================

/// Один луч, ожидающий hit test
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FireRecordEvent {
    pub shooter: Entity,
    pub record: FireRecord,
}

/// Результат hit test (только при попадании во что-то)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub attacker: Entity,
    /// None — коллайдер без entity (не отслеживается)
    pub target: Option<Entity>,
    pub weapon: WeaponKind,
    pub damage: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Спуск нажат и выстрел состоялся (звук, muzzle flash)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponFired {
    pub shooter: Entity,
    pub weapon: WeaponKind,
    pub origin: Vec3,
    pub pellets: u32,
}

/// Щелчок пустого магазина
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponEmpty {
    pub shooter: Entity,
    pub weapon: WeaponKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponSwitched {
    pub entity: Entity,
    pub from: WeaponKind,
    pub to: WeaponKind,
    pub slot: usize,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ReloadStarted {
    pub entity: Entity,
    pub slot: usize,
    pub weapon: WeaponKind,
    pub duration: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ReloadCompleted {
    pub entity: Entity,
    pub slot: usize,
    pub weapon: WeaponKind,
    pub transferred: u32,
}

// ============================================================================
// WeaponControl (общий для игрока и ботов)
// ============================================================================

/// Всё, что нужно для выстрела/перезарядки/смены оружия из системы
#[derive(SystemParam)]
pub struct WeaponControl<'w> {
    clock: Res<'w, FixedClock>,
    timers: ResMut<'w, ScheduledEvents>,
    records: EventWriter<'w, FireRecordEvent>,
    fired: EventWriter<'w, WeaponFired>,
    empty: EventWriter<'w, WeaponEmpty>,
    switched: EventWriter<'w, WeaponSwitched>,
    reload_started: EventWriter<'w, ReloadStarted>,
}

impl<'w> WeaponControl<'w> {
    /// Время симуляции (fixed), в котором живут таймеры
    pub fn now(&self) -> f64 {
        self.clock.elapsed_secs()
    }

    pub fn timers(&mut self) -> &mut ScheduledEvents {
        &mut self.timers
    }

    /// Выстрел из активного оружия + события
    pub fn pull_trigger(
        &mut self,
        shooter: Entity,
        manager: &mut WeaponManager,
        origin: Vec3,
        direction: Vec3,
        rng: &mut impl Rng,
    ) -> FireOutcome {
        let kind = manager.active_weapon().kind;
        let outcome = manager.fire(origin, direction, rng);

        match &outcome {
            FireOutcome::Fired(records) => {
                self.fired.write(WeaponFired {
                    shooter,
                    weapon: kind,
                    origin,
                    pellets: records.len() as u32,
                });
                for record in records {
                    self.records.write(FireRecordEvent {
                        shooter,
                        record: *record,
                    });
                }
            }
            FireOutcome::Empty => {
                self.empty.write(WeaponEmpty {
                    shooter,
                    weapon: kind,
                });
            }
            FireOutcome::Reloading | FireOutcome::CoolingDown => {}
        }

        outcome
    }

    /// Перезарядка активного оружия (таймер на владельца)
    pub fn reload(&mut self, entity: Entity, manager: &mut WeaponManager) -> ReloadOutcome {
        let now = self.now();
        let slot = manager.active_slot();
        let weapon = manager.active_weapon_mut();
        let outcome = weapon.start_reload(now);

        if let ReloadOutcome::Started { duration } = outcome {
            self.timers
                .schedule(entity, TimerKind::ReloadComplete { slot }, now + duration as f64);
            self.reload_started.write(ReloadStarted {
                entity,
                slot,
                weapon: weapon.kind,
                duration,
            });
            crate::log(&format!(
                "🔄 {:?} reloading {} ({:.1}s)",
                entity,
                weapon.spec().name,
                duration
            ));
        }

        outcome
    }

    /// Смена слота + событие
    pub fn switch(&mut self, entity: Entity, manager: &mut WeaponManager, slot: usize) -> bool {
        let Some(from_slot) = manager.switch_to(slot) else {
            return false;
        };
        self.announce_switch(entity, manager, from_slot);
        true
    }

    pub fn cycle(&mut self, entity: Entity, manager: &mut WeaponManager, forward: bool) -> bool {
        let switched = if forward {
            manager.next_weapon()
        } else {
            manager.previous_weapon()
        };
        let Some(from_slot) = switched else {
            return false;
        };
        self.announce_switch(entity, manager, from_slot);
        true
    }

    fn announce_switch(&mut self, entity: Entity, manager: &WeaponManager, from_slot: usize) {
        let from = manager
            .weapon(from_slot)
            .map(|weapon| weapon.kind)
            .unwrap_or(manager.active_weapon().kind);
        let to = manager.active_weapon().kind;

        self.switched.write(WeaponSwitched {
            entity,
            from,
            to,
            slot: manager.active_slot(),
        });
        crate::log(&format!("🔫 {:?} switched {:?} → {:?}", entity, from, to));
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: weapon cooldowns (FrameSet::Weapons)
pub fn tick_weapons(mut managers: Query<&mut WeaponManager>, clock: Res<Clock>) {
    let delta = clock.delta_secs();
    for mut manager in managers.iter_mut() {
        manager.tick(delta);
    }
}

/// System: FireRecordEvent → raycast → HitEvent (FrameSet::Resolve)
///
/// Единственное место, где выстрел превращается в попадание.
pub fn resolve_fire_records(
    mut records: EventReader<FireRecordEvent>,
    physics: Res<PhysicsWorld>,
    mut hits: EventWriter<HitEvent>,
) {
    for FireRecordEvent { shooter, record } in records.read() {
        let Some(hit) = physics.raycast_filtered(
            record.origin,
            record.direction,
            record.range,
            true,
            RayFilter::excluding(*shooter),
        ) else {
            continue;
        };

        hits.write(HitEvent {
            attacker: *shooter,
            target: hit.struck,
            weapon: record.weapon,
            damage: record.damage,
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance,
        });
    }
}

/// System: ReloadComplete timer → патроны из запаса (FixedTick, после fire_due_timers)
pub fn complete_reloads(
    mut timers: EventReader<TimerElapsed>,
    mut managers: Query<&mut WeaponManager>,
    mut completed: EventWriter<ReloadCompleted>,
) {
    for timer in timers.read() {
        let TimerKind::ReloadComplete { slot } = timer.kind else {
            continue;
        };
        let Ok(mut manager) = managers.get_mut(timer.entity) else {
            continue;
        };
        let Some(weapon) = manager.weapon_mut(slot) else {
            crate::log_warning(&format!(
                "ReloadComplete for missing slot {} on {:?}",
                slot, timer.entity
            ));
            continue;
        };

        let transferred = weapon.finish_reload();
        completed.write(ReloadCompleted {
            entity: timer.entity,
            slot,
            weapon: weapon.kind,
            transferred,
        });
        crate::log(&format!(
            "✅ {:?} reloaded {} (+{}, {}/{})",
            timer.entity,
            weapon.spec().name,
            transferred,
            weapon.current_ammo,
            weapon.reserve_ammo
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_loadout_slots() {
        let manager = WeaponManager::player_loadout();
        assert_eq!(manager.slot_count(), 3);
        assert_eq!(manager.active_weapon().kind, WeaponKind::Pistol);
        assert_eq!(manager.weapon(2).map(|w| w.kind), Some(WeaponKind::Shotgun));
    }

    #[test]
    fn test_switch_and_cycle() {
        let mut manager = WeaponManager::player_loadout();

        assert_eq!(manager.switch_to(0), None); // уже активен
        assert_eq!(manager.switch_to(5), None); // нет такого слота
        assert_eq!(manager.switch_to(2), Some(0));
        assert_eq!(manager.active_weapon().kind, WeaponKind::Shotgun);

        assert_eq!(manager.next_weapon(), Some(2));
        assert_eq!(manager.active_slot(), 0);
        assert_eq!(manager.previous_weapon(), Some(0));
        assert_eq!(manager.active_slot(), 2);
    }

    #[test]
    fn test_single_weapon_cannot_cycle() {
        let mut manager = WeaponManager::single(WeaponKind::Rifle);
        assert_eq!(manager.next_weapon(), None);
        assert_eq!(manager.total_ammo(), 150);
    }

    #[test]
    fn test_empty_roster_falls_back_to_pistol() {
        let manager = WeaponManager::new(&[]);
        assert_eq!(manager.active_weapon().kind, WeaponKind::Pistol);
    }

    #[test]
    fn test_tick_cools_every_slot() {
        let mut manager = WeaponManager::player_loadout();
        for slot in 0..3 {
            if let Some(weapon) = manager.weapon_mut(slot) {
                weapon.cooldown_timer = 0.5;
            }
        }

        manager.tick(0.3);
        assert!(manager.weapons().iter().all(|w| (w.cooldown_timer - 0.2).abs() < 1e-6));
    }
}
