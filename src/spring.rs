use std::time::Duration;

// Integration step; larger frame deltas are split so stiff springs stay stable.
const MAX_STEP: f32 = 1.0 / 240.0;

/// Damped unit-mass spring driving a single value toward a target.
#[derive(Clone, Debug)]
pub struct Spring {
    pub value: f32,
    pub velocity: f32,
    pub target: f32,
    stiffness: f32,
    damping: f32,
}

impl Spring {
    pub fn new(value: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            stiffness,
            damping,
        }
    }

    /// Jumps to `value` at rest.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn step(&mut self, dt: Duration) {
        let mut left = dt.as_secs_f32();
        while left > 0.0 {
            let h = left.min(MAX_STEP);
            let accel = -self.stiffness * (self.value - self.target) - self.damping * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            left -= h;
        }
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < 0.01 && self.velocity.abs() < 0.01
    }
}
