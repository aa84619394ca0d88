use rand::Rng;
use std::f32::consts::TAU;
use std::time::Duration;

use crate::pos::Pos;
use crate::timer::Interval;

const STEP: Duration = Duration::from_micros(16_667);
const MAX_SPEED: f32 = 0.15;
const MAX_DELAY_SECS: f32 = 2.0;
const FADE_IN_SECS: f32 = 1.0;

#[derive(Clone, Debug)]
pub struct Lantern {
    pub id: usize,
    pub pos: Pos,
    velocity: Pos,
    delay: Duration,
    age: Duration,
    /// Phase offset for the glow pulse.
    pub glow_phase: f32,
}

impl Lantern {
    pub fn opacity(&self) -> f32 {
        let shown = self.age.saturating_sub(self.delay).as_secs_f32();
        (shown / FADE_IN_SECS).clamp(0.0, 1.0)
    }

    pub fn age(&self) -> Duration {
        self.age
    }
}

/// Lanterns drifting inside a padded viewport centred on zero, bouncing off
/// its edges.
#[derive(Clone, Debug)]
pub struct Lanterns {
    items: Vec<Lantern>,
    ticker: Interval,
    width: f32,
    height: f32,
    padding: f32,
}

impl Lanterns {
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self {
            items: Vec::new(),
            ticker: Interval::new(STEP),
            width,
            height,
            padding,
        }
    }

    fn bounds(extent: f32, padding: f32) -> (f32, f32) {
        let half = extent / 2.0 - padding;
        if half <= 0.0 {
            (0.0, 0.0)
        } else {
            (-half, half)
        }
    }

    fn x_bounds(&self) -> (f32, f32) {
        Self::bounds(self.width, self.padding)
    }

    fn y_bounds(&self) -> (f32, f32) {
        Self::bounds(self.height, self.padding)
    }

    pub fn spawn(&mut self, count: usize, rng: &mut impl Rng) {
        let (x_lo, x_hi) = self.x_bounds();
        let (y_lo, y_hi) = self.y_bounds();
        let start = self.items.len();
        self.items.extend((start..start + count).map(|id| Lantern {
            id,
            pos: Pos::new(lerp(x_lo, x_hi, rng.gen()), lerp(y_lo, y_hi, rng.gen())),
            velocity: Pos::new(
                (rng.gen::<f32>() - 0.5) * 2.0 * MAX_SPEED,
                (rng.gen::<f32>() - 0.5) * 2.0 * MAX_SPEED,
            ),
            delay: Duration::from_secs_f32(rng.gen::<f32>() * MAX_DELAY_SECS),
            age: Duration::ZERO,
            glow_phase: rng.gen::<f32>() * TAU,
        }));
    }

    pub fn tick(&mut self, dt: Duration) {
        let (x_lo, x_hi) = self.x_bounds();
        let (y_lo, y_hi) = self.y_bounds();
        for lantern in &mut self.items {
            lantern.age += dt;
        }
        for _ in 0..self.ticker.tick(dt) {
            for lantern in &mut self.items {
                let next = lantern.pos + lantern.velocity;
                let (x, vx) = bounce(next.x, lantern.velocity.x, x_lo, x_hi);
                let (y, vy) = bounce(next.y, lantern.velocity.y, y_lo, y_hi);
                lantern.pos = Pos::new(x, y);
                lantern.velocity = Pos::new(vx, vy);
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let (x_lo, x_hi) = self.x_bounds();
        let (y_lo, y_hi) = self.y_bounds();
        for lantern in &mut self.items {
            lantern.pos = Pos::new(lantern.pos.x.clamp(x_lo, x_hi), lantern.pos.y.clamp(y_lo, y_hi));
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ticker.reset();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lantern> {
        self.items.iter()
    }
}

fn lerp(lo: f32, hi: f32, t: f32) -> f32 {
    lo + (hi - lo) * t
}

fn bounce(next: f32, velocity: f32, lo: f32, hi: f32) -> (f32, f32) {
    if next <= lo {
        (lo, -velocity)
    } else if next >= hi {
        (hi, -velocity)
    } else {
        (next, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn inside(lanterns: &Lanterns, w: f32, h: f32, pad: f32) -> bool {
        lanterns.iter().all(|l| {
            l.pos.x.abs() <= w / 2.0 - pad + 1e-3 && l.pos.y.abs() <= h / 2.0 - pad + 1e-3
        })
    }

    #[test]
    fn spawns_inside_padded_viewport() {
        let mut lanterns = Lanterns::new(800.0, 600.0, 60.0);
        lanterns.spawn(20, &mut SmallRng::seed_from_u64(1));
        assert_eq!(lanterns.iter().count(), 20);
        assert!(inside(&lanterns, 800.0, 600.0, 60.0));
        let ids: Vec<usize> = lanterns.iter().map(|l| l.id).collect();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn glow_phase_covers_full_turn() {
        let mut lanterns = Lanterns::new(800.0, 600.0, 60.0);
        lanterns.spawn(200, &mut SmallRng::seed_from_u64(3));
        assert!(lanterns.iter().all(|l| (0.0..TAU).contains(&l.glow_phase)));
        assert!(lanterns.iter().any(|l| l.glow_phase > MAX_DELAY_SECS));
    }

    #[test]
    fn drifting_never_leaves_viewport() {
        let mut lanterns = Lanterns::new(200.0, 160.0, 60.0);
        lanterns.spawn(20, &mut SmallRng::seed_from_u64(2));
        for _ in 0..2000 {
            lanterns.tick(STEP);
            assert!(inside(&lanterns, 200.0, 160.0, 60.0));
        }
    }

    #[test]
    fn bounce_reflects_velocity() {
        assert_eq!(bounce(-11.0, -0.5, -10.0, 10.0), (-10.0, 0.5));
        assert_eq!(bounce(10.5, 0.5, -10.0, 10.0), (10.0, -0.5));
        assert_eq!(bounce(3.0, 0.5, -10.0, 10.0), (3.0, 0.5));
    }

    #[test]
    fn resize_clamps_back_inside() {
        let mut lanterns = Lanterns::new(1600.0, 1200.0, 60.0);
        lanterns.spawn(20, &mut SmallRng::seed_from_u64(3));
        lanterns.resize(300.0, 300.0);
        assert!(inside(&lanterns, 300.0, 300.0, 60.0));
        lanterns.resize(100.0, 100.0);
        assert!(lanterns.iter().all(|l| l.pos == Pos::ORIGIN));
    }

    #[test]
    fn fades_in_after_delay() {
        let mut lanterns = Lanterns::new(800.0, 600.0, 60.0);
        lanterns.spawn(5, &mut SmallRng::seed_from_u64(4));
        assert!(lanterns.iter().all(|l| l.opacity() == 0.0));
        lanterns.tick(Duration::from_secs(3));
        assert!(lanterns.iter().all(|l| l.opacity() == 1.0));
    }
}
