use std::time::Duration;

use crate::config::LockConfig;
use crate::pos::Pos;
use crate::spring::Spring;
use crate::timer::Delay;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockEvent {
    /// The key reached the lock. Fired once per session.
    Unlocked,
    /// The unlock animation had time to play; show the slideshow.
    Reveal,
}

/// The draggable key and the lock it opens. The lock sits at the origin and the
/// key position is an offset from it.
#[derive(Clone, Debug)]
pub struct Lock {
    config: LockConfig,
    key: Pos,
    unlocked: bool,
    interacted: bool,
    /// Offset from the key centre to the pointer while dragging.
    grab: Option<Pos>,
    reveal: Delay,
    rotation: Spring,
}

impl Lock {
    pub fn new(config: LockConfig) -> Self {
        let rotation = Spring::new(0.0, config.spring_stiffness, config.spring_damping);
        Self {
            key: config.key_start.clamp_axes(config.drag_limit),
            unlocked: false,
            interacted: false,
            grab: None,
            reveal: Delay::default(),
            rotation,
            config,
        }
    }

    pub fn key(&self) -> Pos {
        self.key
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    /// Lock rotation in degrees.
    pub fn rotation(&self) -> f32 {
        self.rotation.value
    }

    /// Records the first user gesture. Returns true if this call opened the gate.
    pub fn interact(&mut self) -> bool {
        let first = !self.interacted;
        self.interacted = true;
        first
    }

    pub fn begin_drag(&mut self, pointer: Pos) -> bool {
        if !self.interacted || self.key.distance(&pointer) > self.config.grab_radius {
            return false;
        }
        self.grab = Some(pointer - self.key);
        true
    }

    pub fn drag_to(&mut self, pointer: Pos) -> Option<LockEvent> {
        let grab = self.grab?;
        self.set_key(pointer - grab)
    }

    pub fn end_drag(&mut self) {
        self.grab = None;
    }

    pub fn set_key(&mut self, pos: Pos) -> Option<LockEvent> {
        self.key = pos.clamp_axes(self.config.drag_limit);
        self.check_collision()
    }

    pub fn check_collision(&mut self) -> Option<LockEvent> {
        if self.unlocked || !self.interacted {
            return None;
        }
        if self.key.length() >= self.config.collision_threshold {
            return None;
        }
        self.unlocked = true;
        self.rotation.target = self.config.unlocked_angle;
        self.reveal
            .arm(Duration::from_millis(self.config.reveal_delay_ms));
        Some(LockEvent::Unlocked)
    }

    pub fn tick(&mut self, dt: Duration) -> Option<LockEvent> {
        self.rotation.step(dt);
        if self.reveal.tick(dt) {
            Some(LockEvent::Reveal)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.unlocked = false;
        self.grab = None;
        self.reveal.cancel();
        self.rotation.set(0.0);
        self.key = self.config.key_start.clamp_axes(self.config.drag_limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_lock() -> Lock {
        let mut lock = Lock::new(LockConfig::default());
        lock.interact();
        lock
    }

    #[test]
    fn starts_locked_at_start_offset() {
        let lock = Lock::new(LockConfig::default());
        assert_eq!(lock.key(), Pos::new(150.0, 50.0));
        assert!(!lock.is_unlocked());
        assert!(!lock.has_interacted());
        assert_eq!(lock.rotation(), 0.0);
    }

    #[test]
    fn stays_locked_at_or_beyond_threshold() {
        let mut lock = open_lock();
        for step in 0..=360 {
            let angle = (step as f32).to_radians();
            for radius in [50.0, 50.5, 80.0, 149.0] {
                let p = Pos::new(angle.cos() * radius, angle.sin() * radius);
                if p.length() < 50.0 {
                    continue;
                }
                assert_eq!(lock.set_key(p), None);
                assert!(!lock.is_unlocked(), "unlocked at {:?}", p);
            }
        }
    }

    #[test]
    fn unlocks_once_inside_threshold_and_stays_unlocked() {
        let mut lock = open_lock();
        assert_eq!(lock.set_key(Pos::new(30.0, 30.0)), Some(LockEvent::Unlocked));
        assert!(lock.is_unlocked());
        assert_eq!(lock.set_key(Pos::new(10.0, 0.0)), None);
        assert_eq!(lock.set_key(Pos::new(150.0, 150.0)), None);
        assert!(lock.is_unlocked());
    }

    #[test]
    fn gesture_gate_blocks_unlock_and_drag() {
        let mut lock = Lock::new(LockConfig::default());
        assert!(!lock.begin_drag(lock.key()));
        assert_eq!(lock.set_key(Pos::ORIGIN), None);
        assert!(!lock.is_unlocked());

        assert!(lock.interact());
        assert!(!lock.interact());
        assert_eq!(lock.check_collision(), Some(LockEvent::Unlocked));
    }

    #[test]
    fn drag_keeps_grab_offset_and_clamps() {
        let mut lock = open_lock();
        assert!(!lock.begin_drag(Pos::new(-100.0, -100.0)));
        assert!(lock.begin_drag(Pos::new(160.0, 50.0)));
        assert_eq!(lock.drag_to(Pos::new(110.0, 40.0)), None);
        assert_eq!(lock.key(), Pos::new(100.0, 40.0));

        lock.drag_to(Pos::new(500.0, -500.0));
        assert_eq!(lock.key(), Pos::new(150.0, -150.0));

        assert_eq!(lock.drag_to(Pos::new(10.0, 0.0)), Some(LockEvent::Unlocked));
        lock.end_drag();
        assert!(!lock.is_dragging());
        assert_eq!(lock.drag_to(Pos::new(100.0, 100.0)), None);
        assert_eq!(lock.key(), Pos::new(0.0, 0.0));
    }

    #[test]
    fn reveal_fires_once_after_delay() {
        let mut lock = open_lock();
        lock.set_key(Pos::ORIGIN);
        assert_eq!(lock.tick(Duration::from_millis(799)), None);
        assert_eq!(lock.tick(Duration::from_millis(1)), Some(LockEvent::Reveal));
        assert_eq!(lock.tick(Duration::from_millis(1000)), None);
    }

    #[test]
    fn rotation_swings_to_unlocked_angle() {
        let mut lock = open_lock();
        lock.set_key(Pos::ORIGIN);
        for _ in 0..500 {
            lock.tick(Duration::from_millis(16));
        }
        assert!((lock.rotation() - 90.0).abs() < 0.5);
    }

    #[test]
    fn reset_restores_initial_state_and_cancels_reveal() {
        let mut lock = open_lock();
        lock.begin_drag(lock.key());
        lock.drag_to(Pos::new(5.0, 5.0));
        lock.tick(Duration::from_millis(300));
        lock.reset();

        assert!(!lock.is_unlocked());
        assert!(!lock.is_dragging());
        assert!(lock.has_interacted());
        assert_eq!(lock.key(), Pos::new(150.0, 50.0));
        assert_eq!(lock.rotation(), 0.0);
        assert_eq!(lock.tick(Duration::from_secs(2)), None);

        assert_eq!(lock.set_key(Pos::ORIGIN), Some(LockEvent::Unlocked));
    }
}
