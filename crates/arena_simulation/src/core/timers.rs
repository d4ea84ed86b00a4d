//! Scheduled events (отложенные действия)
//!
//! Таблица `(Entity, TimerKind) → due time`, проверяется в FixedTick.
//! Один ключ = максимум одно ожидающее событие.
//!
//! Отмена:
//! - `EntityLifecycle::despawn` вызывает `cancel_all(entity)`
//! - `fire_due_timers` дополнительно отбрасывает события для несуществующих entity

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::core::FixedClock;

/// Тип отложенного действия
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum TimerKind {
    /// Завершение перезарядки оружия в слоте `slot`
    ReloadComplete { slot: usize },
    /// Сброс счётчика очереди бота
    BurstReset,
    /// Освобождение spawn point после grace window
    SpawnPointRelease,
    /// Замена мёртвого бота
    BotRespawn,
    /// Респавн игрока
    PlayerRespawn,
}

/// Событие: таймер сработал (читается профильными системами)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimerElapsed {
    pub entity: Entity,
    pub kind: TimerKind,
}

#[derive(Resource, Debug, Default)]
pub struct ScheduledEvents {
    entries: BTreeMap<(Entity, TimerKind), f64>,
}

impl ScheduledEvents {
    /// Запланировать (перезаписывает существующий due time)
    pub fn schedule(&mut self, entity: Entity, kind: TimerKind, due: f64) {
        self.entries.insert((entity, kind), due);
    }

    /// Запланировать, только если такого события ещё нет
    pub fn schedule_if_absent(&mut self, entity: Entity, kind: TimerKind, due: f64) -> bool {
        if self.entries.contains_key(&(entity, kind)) {
            return false;
        }
        self.entries.insert((entity, kind), due);
        true
    }

    pub fn cancel(&mut self, entity: Entity, kind: TimerKind) -> bool {
        self.entries.remove(&(entity, kind)).is_some()
    }

    /// Отменить все события entity, вернуть сколько было
    pub fn cancel_all(&mut self, entity: Entity) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(owner, _), _| *owner != entity);
        before - self.entries.len()
    }

    pub fn is_pending(&self, entity: Entity, kind: TimerKind) -> bool {
        self.entries.contains_key(&(entity, kind))
    }

    pub fn due_time(&self, entity: Entity, kind: TimerKind) -> Option<f64> {
        self.entries.get(&(entity, kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Извлечь все события с `due <= now`, упорядоченные по (due, key)
    pub fn take_due(&mut self, now: f64) -> Vec<(Entity, TimerKind)> {
        let mut due: Vec<(f64, Entity, TimerKind)> = self
            .entries
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|((entity, kind), at)| (*at, *entity, *kind))
            .collect();

        if due.is_empty() {
            return Vec::new();
        }

        due.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| (a.1, a.2).cmp(&(b.1, b.2)))
        });

        for (_, entity, kind) in &due {
            self.entries.remove(&(*entity, *kind));
        }

        due.into_iter().map(|(_, entity, kind)| (entity, kind)).collect()
    }
}

/// System: fire scheduled events (FixedTick, FixedSet::Timers)
///
/// События для уже despawned entity отбрасываются с warning.
pub fn fire_due_timers(
    mut table: ResMut<ScheduledEvents>,
    clock: Res<FixedClock>,
    entities: Query<Entity>,
    mut elapsed: EventWriter<TimerElapsed>,
) {
    for (entity, kind) in table.take_due(clock.elapsed_secs()) {
        if !entities.contains(entity) {
            crate::logger::log_warning(&format!(
                "⏱️ Dropped {:?} timer: entity {:?} no longer exists",
                kind, entity
            ));
            continue;
        }

        elapsed.write(TimerElapsed { entity, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_take_due_orders_by_time() {
        let ids = entities(2);
        let mut table = ScheduledEvents::default();

        table.schedule(ids[0], TimerKind::BotRespawn, 5.0);
        table.schedule(ids[1], TimerKind::BurstReset, 1.0);
        table.schedule(ids[0], TimerKind::ReloadComplete { slot: 0 }, 2.0);

        assert!(table.take_due(0.5).is_empty());

        let fired = table.take_due(2.0);
        assert_eq!(
            fired,
            vec![
                (ids[1], TimerKind::BurstReset),
                (ids[0], TimerKind::ReloadComplete { slot: 0 }),
            ]
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_schedule_if_absent_keeps_first_due_time() {
        let ids = entities(1);
        let mut table = ScheduledEvents::default();

        assert!(table.schedule_if_absent(ids[0], TimerKind::BurstReset, 1.0));
        assert!(!table.schedule_if_absent(ids[0], TimerKind::BurstReset, 3.0));
        assert_eq!(table.due_time(ids[0], TimerKind::BurstReset), Some(1.0));
    }

    #[test]
    fn test_cancel_all_removes_only_owner_entries() {
        let ids = entities(2);
        let mut table = ScheduledEvents::default();

        table.schedule(ids[0], TimerKind::BurstReset, 1.0);
        table.schedule(ids[0], TimerKind::BotRespawn, 5.0);
        table.schedule(ids[1], TimerKind::BurstReset, 1.0);

        assert_eq!(table.cancel_all(ids[0]), 2);
        assert!(!table.is_pending(ids[0], TimerKind::BotRespawn));
        assert!(table.is_pending(ids[1], TimerKind::BurstReset));
    }
}
