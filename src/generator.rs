// src/generator.rs
//! Random password generator

use rand::Rng;

use crate::aliases::GeneratedPassword;

pub const DEFAULT_LENGTH: usize = 16;

const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_-+={[}]|:;<,>.?/";

/// Character classes to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            lower: true,
            upper: true,
            digits: true,
            symbols: false,
        }
    }
}

impl GeneratorOptions {
    fn pool(&self) -> Vec<char> {
        let classes = [
            (self.lower, LOWER),
            (self.upper, UPPER),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ];
        let mut pool: Vec<char> = classes
            .iter()
            .filter(|(on, _)| *on)
            .flat_map(|(_, chars)| chars.chars())
            .collect();
        if pool.is_empty() {
            pool = LOWER.chars().chain(UPPER.chars()).chain(DIGITS.chars()).collect();
        }
        pool
    }
}

/// `length` characters drawn uniformly from the enabled classes.
/// With every class disabled, letters and digits are used.
pub fn generate_password(length: usize, options: GeneratorOptions) -> GeneratedPassword {
    let pool = options.pool();
    let mut rng = rand::rng();
    let password: String = (0..length)
        .map(|_| pool[rng.random_range(0..pool.len())])
        .collect();
    GeneratedPassword::new(password)
}
