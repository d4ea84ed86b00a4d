//! Spawn points: occupied flag + cooldown, выбор точки для спавна
//!
//! Точка пригодна, если она свободна И с последнего использования прошло
//! не меньше cooldown. После спавна точка занята на grace window
//! (таймер `SpawnPointRelease`).

use bevy::prelude::*;
use rand::Rng;

use crate::core::{ScheduledEvents, TimerElapsed, TimerKind};

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint {
    pub position: Vec3,
    /// Угол поворота вокруг Y (радианы)
    pub facing: f32,
    pub occupied: bool,
    /// Время последнего спавна (None — ещё не использовалась)
    pub last_used: Option<f64>,
}

impl SpawnPoint {
    pub fn new(position: Vec3, facing: f32) -> Self {
        Self {
            position,
            facing,
            occupied: false,
            last_used: None,
        }
    }

    pub fn is_eligible(&self, now: f64, cooldown: f32) -> bool {
        if self.occupied {
            return false;
        }
        self.last_used
            .map_or(true, |used| now - used >= cooldown as f64)
    }

    pub fn mark_occupied(&mut self, now: f64) {
        self.occupied = true;
        self.last_used = Some(now);
    }

    pub fn mark_free(&mut self) {
        self.occupied = false;
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.facing)
    }
}

/// Параметры выбора точки
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnQuery {
    /// Позиция, от которой держимся подальше (обычно игрок)
    pub exclude: Option<Vec3>,
    pub min_distance: f32,
    pub now: f64,
    pub cooldown: f32,
}

/// Выбрать spawn point
///
/// - `exclude` задан: только точки не ближе `min_distance`, из них самая дальняя
/// - иначе: равновероятно среди пригодных
///
/// Кандидаты упорядочиваются по Entity: результат зависит только от seed.
pub fn available_spawn_point<'a>(
    points: impl IntoIterator<Item = (Entity, &'a SpawnPoint)>,
    query: SpawnQuery,
    rng: &mut impl Rng,
) -> Option<Entity> {
    let mut eligible: Vec<(Entity, &SpawnPoint)> = points
        .into_iter()
        .filter(|(_, point)| point.is_eligible(query.now, query.cooldown))
        .collect();
    eligible.sort_by_key(|(entity, _)| *entity);

    match query.exclude {
        Some(exclude) => eligible
            .into_iter()
            .map(|(entity, point)| (entity, point.position.distance(exclude)))
            .filter(|(_, distance)| *distance >= query.min_distance)
            .fold(None, |best: Option<(Entity, f32)>, candidate| match best {
                Some(current) if current.1 >= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .map(|(entity, _)| entity),
        None => {
            if eligible.is_empty() {
                return None;
            }
            let index = rng.gen_range(0..eligible.len());
            Some(eligible[index].0)
        }
    }
}

/// Занять точку и запланировать освобождение через `grace` секунд
pub fn occupy_spawn_point(
    entity: Entity,
    point: &mut SpawnPoint,
    timers: &mut ScheduledEvents,
    now: f64,
    grace: f32,
) {
    point.mark_occupied(now);
    timers.schedule(entity, TimerKind::SpawnPointRelease, now + grace as f64);
}

/// System: SpawnPointRelease timer → точка свободна (FixedTick, после fire_due_timers)
pub fn release_spawn_points(mut timers: EventReader<TimerElapsed>, mut points: Query<&mut SpawnPoint>) {
    for timer in timers.read() {
        if timer.kind != TimerKind::SpawnPointRelease {
            continue;
        }
        if let Ok(mut point) = points.get_mut(timer.entity) {
            point.mark_free();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ring(world: &mut World, radii: &[f32]) -> Vec<(Entity, SpawnPoint)> {
        radii
            .iter()
            .map(|radius| {
                let point = SpawnPoint::new(Vec3::new(*radius, 1.0, 0.0), 0.0);
                (world.spawn_empty().id(), point)
            })
            .collect()
    }

    fn query(exclude: Option<Vec3>, now: f64) -> SpawnQuery {
        SpawnQuery {
            exclude,
            min_distance: 15.0,
            now,
            cooldown: 2.0,
        }
    }

    #[test]
    fn test_grace_window_eligibility() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut point = SpawnPoint::new(Vec3::ZERO, 0.0);
        let mut timers = ScheduledEvents::default();

        occupy_spawn_point(entity, &mut point, &mut timers, 0.0, 2.0);
        assert!(!point.is_eligible(1.0, 2.0));
        assert_eq!(timers.due_time(entity, TimerKind::SpawnPointRelease), Some(2.0));

        // Таймер сработал
        point.mark_free();
        assert!(point.is_eligible(2.1, 2.0));
    }

    #[test]
    fn test_free_but_cooling_down_is_ineligible() {
        let mut point = SpawnPoint::new(Vec3::ZERO, 0.0);
        point.mark_occupied(5.0);
        point.mark_free();

        assert!(!point.is_eligible(6.0, 2.0));
        assert!(point.is_eligible(7.0, 2.0));
    }

    #[test]
    fn test_prefers_farthest_from_excluded_position() {
        let mut world = World::new();
        let points = ring(&mut world, &[16.0, 30.0, 20.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let chosen = available_spawn_point(
            points.iter().map(|(e, p)| (*e, p)),
            query(Some(Vec3::ZERO), 0.0),
            &mut rng,
        );
        assert_eq!(chosen, Some(points[1].0));
    }

    #[test]
    fn test_min_distance_filters_candidates() {
        let mut world = World::new();
        let points = ring(&mut world, &[5.0, 10.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let chosen = available_spawn_point(
            points.iter().map(|(e, p)| (*e, p)),
            query(Some(Vec3::ZERO), 0.0),
            &mut rng,
        );
        assert_eq!(chosen, None);
    }

    #[test]
    fn test_random_choice_skips_occupied() {
        let mut world = World::new();
        let mut points = ring(&mut world, &[1.0, 2.0, 3.0]);
        points[0].1.mark_occupied(0.0);
        points[2].1.mark_occupied(0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..10 {
            let chosen = available_spawn_point(
                points.iter().map(|(e, p)| (*e, p)),
                query(None, 0.5),
                &mut rng,
            );
            assert_eq!(chosen, Some(points[1].0));
        }
    }
}
