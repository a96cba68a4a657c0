//! Tek kullanımlık arşiv parolası üretimi.
//!
//! İndirme çağrısı başına taze üretilir, çağrı sahibine hiç gösterilmez ve
//! yalnızca yoldaki PKCS#12 arşivini korur. Üretim doğrudan işletim sistemi
//! entropisinden beslenir; her karakter sınıfından en az bir karakter garanti
//! edilir.

use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()-_=+";

const CLASSES: [&[u8]; 4] = [UPPER, LOWER, DIGITS, SPECIAL];

/// One-time password generator over the OS RNG.
#[derive(Debug, Clone, Copy)]
pub struct OneTimePassword;

impl OneTimePassword {
    /// Generates a password of `length` characters with at least one character
    /// from each class (upper, lower, digit, special).
    ///
    /// # Panics
    ///
    /// Panics when `length` is smaller than the number of character classes;
    /// the class guarantee cannot hold below that.
    #[must_use]
    pub fn generate(length: usize) -> Zeroizing<String> {
        Self::generate_with(&mut OsRng, length)
    }

    /// Same as [`Self::generate`] but over a caller-supplied RNG.
    ///
    /// # Panics
    ///
    /// Panics when `length` is smaller than the number of character classes.
    #[must_use]
    pub fn generate_with(rng: &mut impl RngCore, length: usize) -> Zeroizing<String> {
        assert!(
            length >= CLASSES.len(),
            "parola uzunluğu sınıf sayısının altında olamaz"
        );

        let mut chars: Vec<u8> = Vec::with_capacity(length);
        for class in CLASSES {
            chars.push(pick(rng, class));
        }
        let all: Vec<u8> = CLASSES.concat();
        while chars.len() < length {
            chars.push(pick(rng, &all));
        }
        // Fisher-Yates, sınıf garantili ön ekin konumunu dağıtır.
        for i in (1..chars.len()).rev() {
            let j = bounded(rng, i + 1);
            chars.swap(i, j);
        }
        Zeroizing::new(String::from_utf8_lossy(&chars).into_owned())
    }
}

fn pick(rng: &mut impl RngCore, set: &[u8]) -> u8 {
    set[bounded(rng, set.len())]
}

/// Uniform sample in `[0, bound)` via rejection sampling.
#[allow(clippy::cast_possible_truncation)]
fn bounded(rng: &mut impl RngCore, bound: usize) -> usize {
    let bound = u32::try_from(bound).unwrap_or(u32::MAX);
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let value = rng.next_u32();
        if value < zone {
            return (value % bound) as usize;
        }
    }
}
