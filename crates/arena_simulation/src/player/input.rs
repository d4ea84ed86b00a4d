//! Player input state (инжектируется хостом, не глобальный)
//!
//! # Архитектура
//! - Хост: `press` / `release` / `add_mouse_delta` между кадрами
//! - FixedTick: движение читает удерживаемые клавиши
//! - FrameUpdate: look / fire / reload / switch / dash
//! - FrameEnd: `end_frame` сбрасывает just-pressed и mouse delta (и на паузе)

use std::collections::HashSet;

use bevy::prelude::*;

/// Дискретные controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Control {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Sprint,
    Jump,
    Fire,
    Reload,
    /// Слот оружия 0..2 (Digit1-3)
    WeaponSlot(u8),
    /// Колесо мыши
    WeaponNext,
    WeaponPrevious,
    Dash,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Control>,
    just_pressed: HashSet<Control>,
    mouse_delta: Vec2,
}

impl InputState {
    pub fn press(&mut self, control: Control) {
        if self.held.insert(control) {
            self.just_pressed.insert(control);
        }
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.contains(&control)
    }

    /// Нажата в этом кадре (до `end_frame`)
    pub fn just_pressed(&self, control: Control) -> bool {
        self.just_pressed.contains(&control)
    }

    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Забрать mouse delta (повторный вызов в том же кадре вернёт ноль)
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    /// Первый нажатый слот оружия в этом кадре
    pub fn pressed_weapon_slot(&self) -> Option<usize> {
        (0u8..3)
            .find(|slot| self.just_pressed(Control::WeaponSlot(*slot)))
            .map(usize::from)
    }

    /// WASD → (x: право, y: вперёд), нормализовано
    pub fn movement_axes(&self) -> Vec2 {
        let mut axes = Vec2::ZERO;
        if self.is_held(Control::MoveForward) {
            axes.y += 1.0;
        }
        if self.is_held(Control::MoveBack) {
            axes.y -= 1.0;
        }
        if self.is_held(Control::MoveLeft) {
            axes.x -= 1.0;
        }
        if self.is_held(Control::MoveRight) {
            axes.x += 1.0;
        }
        axes.normalize_or_zero()
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
    }
}

/// System: сброс per-frame input (FrameEnd)
pub fn reset_frame_input(mut input: ResMut<InputState>) {
    input.end_frame();
}
