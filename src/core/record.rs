//! Leaderboard record and synthetic handle generation
//!
//! A record is one row of the board: a display handle, two factors and a
//! product. Synthetic rows carry a deliberately wrong product, the single
//! real row carries the exact one.

use rand::Rng;
use serde::Serialize;
use uuid::{Builder, Uuid};

/// Alphabet used for synthetic handle bodies
pub const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz.";

/// Handle body length range (half-open)
pub const NAME_LEN_MIN: usize = 5;
pub const NAME_LEN_MAX: usize = 20;

/// Factor range (inclusive)
pub const FACTOR_MIN: u32 = 1;
pub const FACTOR_MAX: u32 = 999;

/// Perturbation range (half-open), added to each factor of a synthetic row
pub const NOISE_MIN: u32 = 1;
pub const NOISE_MAX: u32 = 5;

/// One board row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Present only when identifiers are enabled; the real row never has one
    pub id: Option<Uuid>,
    pub name: String,
    pub factor_one: u32,
    pub factor_two: u32,
    pub product: u32,
}

impl Record {
    /// Build a synthetic row with a perturbed product
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R, emit_id: bool) -> Self {
        let id = emit_id.then(|| random_id(rng));
        let len = rng.gen_range(NAME_LEN_MIN..NAME_LEN_MAX);
        let name = random_handle(rng, len);
        let factor_one = random_factor(rng);
        let factor_two = random_factor(rng);

        let noisy_one = factor_one + rng.gen_range(NOISE_MIN..NOISE_MAX);
        let noisy_two = factor_two + rng.gen_range(NOISE_MIN..NOISE_MAX);

        Self {
            id,
            name,
            factor_one,
            factor_two,
            product: noisy_one * noisy_two,
        }
    }

    /// Build the real row: configured handle, exact product, no id
    pub fn real<R: Rng + ?Sized>(rng: &mut R, name: &str) -> Self {
        let factor_one = random_factor(rng);
        let factor_two = random_factor(rng);

        Self {
            id: None,
            name: name.to_string(),
            factor_one,
            factor_two,
            product: factor_one * factor_two,
        }
    }

    /// Whether the product is the true product of the factors
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.product == self.factor_one * self.factor_two
    }

    /// Project into the three exported CSV columns
    pub fn csv_row(&self) -> [String; 3] {
        [
            self.id.map(|id| id.to_string()).unwrap_or_default(),
            self.name.clone(),
            self.product.to_string(),
        ]
    }
}

/// `@` followed by `len` characters from [`NAME_ALPHABET`]
pub fn random_handle<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut name = String::with_capacity(len + 1);
    name.push('@');
    for _ in 0..len {
        let idx = rng.gen_range(0..NAME_ALPHABET.len());
        name.push(NAME_ALPHABET[idx] as char);
    }
    name
}

#[inline]
fn random_factor<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(FACTOR_MIN..=FACTOR_MAX)
}

// v4 ids drawn from the caller's RNG so seeded runs stay reproducible
fn random_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}
