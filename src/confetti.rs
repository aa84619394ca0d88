use rand::Rng;
use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use crate::config::ConfettiConfig;
use crate::pos::Pos;
use crate::timer::Interval;

pub const PALETTE: [[u8; 3]; 7] = [
    [0x26, 0xcc, 0xff],
    [0xa2, 0x5a, 0xfd],
    [0xff, 0x5e, 0x7e],
    [0x88, 0xff, 0x5a],
    [0xfc, 0xff, 0x42],
    [0xff, 0xa6, 0x2d],
    [0xff, 0x36, 0xff],
];

// Physics runs in fixed 60 Hz steps, in pixels per step.
const STEP: Duration = Duration::from_micros(16_667);
const START_VELOCITY: f32 = 45.0;
const DECAY: f32 = 0.9;
const GRAVITY: f32 = 3.0;
const LIFETIME_STEPS: u32 = 200;

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Pos,
    angle: f32,
    velocity: f32,
    pub wobble: f32,
    pub color: [u8; 3],
    steps_left: u32,
}

impl Particle {
    /// Fades out over the particle's lifetime.
    pub fn opacity(&self) -> f32 {
        self.steps_left as f32 / LIFETIME_STEPS as f32
    }
}

#[derive(Clone, Debug)]
pub struct Confetti {
    particles: Vec<Particle>,
    ticker: Interval,
}

impl Default for Confetti {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            ticker: Interval::new(STEP),
        }
    }
}

impl Confetti {
    /// Bursts upward from `origin_y` (fraction of the height from the top) at
    /// the horizontal centre of a `width` x `height` window centred on zero.
    pub fn burst(&mut self, config: &ConfettiConfig, height: f32, rng: &mut impl Rng) {
        let origin = Pos::new(0.0, height / 2.0 - config.origin_y * height);
        let spread = config.spread_degrees.to_radians();
        self.particles.extend((0..config.particle_count).map(|_| Particle {
            pos: origin,
            angle: FRAC_PI_2 + (0.5 * spread - rng.gen::<f32>() * spread),
            velocity: START_VELOCITY * 0.5 + rng.gen::<f32>() * START_VELOCITY,
            wobble: rng.gen::<f32>() * 10.0,
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            steps_left: LIFETIME_STEPS,
        }));
    }

    pub fn tick(&mut self, dt: Duration) {
        for _ in 0..self.ticker.tick(dt) {
            for p in &mut self.particles {
                p.pos.x += p.angle.cos() * p.velocity;
                p.pos.y += p.angle.sin() * p.velocity - GRAVITY;
                p.velocity *= DECAY;
                p.wobble += 0.1;
                p.steps_left = p.steps_left.saturating_sub(1);
            }
            self.particles.retain(|p| p.steps_left > 0);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.ticker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn burst() -> Confetti {
        let mut confetti = Confetti::default();
        let mut rng = SmallRng::seed_from_u64(7);
        confetti.burst(&ConfettiConfig::default(), 1000.0, &mut rng);
        confetti
    }

    #[test]
    fn burst_spawns_configured_count_at_origin() {
        let confetti = burst();
        assert_eq!(confetti.particles().len(), 100);
        for p in confetti.particles() {
            assert_eq!(p.pos, Pos::new(0.0, -100.0));
            assert!(PALETTE.contains(&p.color));
            let spread = 35f32.to_radians() + 1e-4;
            assert!((p.angle - FRAC_PI_2).abs() <= spread);
        }
    }

    #[test]
    fn particles_rise_first_then_expire() {
        let mut confetti = burst();
        confetti.tick(STEP);
        assert!(confetti.particles().iter().all(|p| p.pos.y > -100.0));
        confetti.tick(STEP * LIFETIME_STEPS);
        assert!(confetti.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let mut confetti = burst();
        confetti.clear();
        assert!(confetti.is_empty());
    }
}
