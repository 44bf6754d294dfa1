use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// The random draws the sampler needs: uniform integers, uniform reals in
/// [0,1), and in-place shuffles. One generator is owned by the driver and
/// passed by mutable reference everywhere.
pub trait MoveRng {
    fn rand_int_inclusive(&mut self, min: u32, max: u32) -> u32;
    fn next_f64(&mut self) -> f64;
    fn shuffle_u32(&mut self, out: &mut [u32]);
}

// Standard mt19937 parameters; seeded runs reproduce the reference engine's
// word stream.
const STATE_WORDS: usize = 624;
const TWIST_OFFSET: usize = 397;
const TWIST_MATRIX: u32 = 0x9908_b0df;
const SEED_MULTIPLIER: u32 = 1_812_433_253;
const HIGH_BIT: u32 = 1 << 31;
const LOW_BITS: u32 = !HIGH_BIT;

#[derive(Debug, Clone)]
pub struct Mt19937 {
    state: [u32; STATE_WORDS],
    cursor: usize,
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; STATE_WORDS];
        state[0] = seed;
        for i in 1..STATE_WORDS {
            let prev = state[i - 1];
            state[i] = (prev ^ (prev >> 30))
                .wrapping_mul(SEED_MULTIPLIER)
                .wrapping_add(i as u32);
        }
        Self {
            state,
            cursor: STATE_WORDS,
        }
    }

    // Regenerates all state words once the cursor runs off the end.
    fn refill(&mut self) {
        for i in 0..STATE_WORDS {
            let mixed =
                (self.state[i] & HIGH_BIT) | (self.state[(i + 1) % STATE_WORDS] & LOW_BITS);
            let twisted = (mixed >> 1) ^ if mixed & 1 == 1 { TWIST_MATRIX } else { 0 };
            self.state[i] = self.state[(i + TWIST_OFFSET) % STATE_WORDS] ^ twisted;
        }
        self.cursor = 0;
    }

    pub fn next_u32(&mut self) -> u32 {
        if self.cursor == STATE_WORDS {
            self.refill();
        }
        let mut word = self.state[self.cursor];
        self.cursor += 1;

        word ^= word >> 11;
        word ^= (word << 7) & 0x9d2c_5680;
        word ^= (word << 15) & 0xefc6_0000;
        word ^ (word >> 18)
    }

    // Rejection sampling on the smallest power-of-two window covering the
    // range, so no target value is favored.
    pub fn rand_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        if min == 0 && max == u32::MAX {
            return self.next_u32();
        }

        let range = max - min + 1;
        let mask = if range > HIGH_BIT {
            u32::MAX
        } else {
            range.next_power_of_two() - 1
        };

        loop {
            let draw = self.next_u32() & mask;
            if draw < range {
                return min + draw;
            }
        }
    }

    // 53-bit resolution uniform in [0,1), two twister words per draw.
    pub fn next_f64(&mut self) -> f64 {
        let a = (self.next_u32() >> 5) as f64;
        let b = (self.next_u32() >> 6) as f64;
        (a * 67_108_864.0 + b) / 9_007_199_254_740_992.0
    }

    pub fn shuffle_u32(&mut self, out: &mut [u32]) {
        let size = out.len();
        for i in 0..size {
            let j = i + self.rand_int_inclusive(0, (size - i).saturating_sub(1) as u32) as usize;
            out.swap(i, j);
        }
    }
}

impl MoveRng for Mt19937 {
    fn rand_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        Mt19937::rand_int_inclusive(self, min, max)
    }

    fn next_f64(&mut self) -> f64 {
        Mt19937::next_f64(self)
    }

    fn shuffle_u32(&mut self, out: &mut [u32]) {
        Mt19937::shuffle_u32(self, out);
    }
}

#[derive(Debug, Clone)]
pub struct RustRng {
    rng: SmallRng,
}

impl RustRng {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed as u64),
        }
    }
}

impl MoveRng for RustRng {
    fn rand_int_inclusive(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn shuffle_u32(&mut self, out: &mut [u32]) {
        let size = out.len();
        for i in 0..size {
            let j = self.rng.gen_range(i..size);
            out.swap(i, j);
        }
    }
}
