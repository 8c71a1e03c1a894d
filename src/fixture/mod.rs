//! Run-scoped sample data: names and unique e-mail addresses.

use std::cell::Cell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sha1::{Digest, Sha1};
use uuid::Uuid;

const FIRST_NAMES: &[&str] = &[
    "Anna", "Luca", "Mia", "Noah", "Lea", "Elias", "Sofia", "Leon", "Lina", "Jonas", "Nora",
    "Matteo", "Ivo", "Marta",
];

const LAST_NAMES: &[&str] = &[
    "Müller", "Meier", "Schmid", "Keller", "Weber", "Huber", "Gerber", "Brunner", "Baumann",
    "Fischer", "Ivić", "Kovač",
];

/// Generated values for one scenario run. Nothing here is persisted.
#[derive(Debug)]
pub struct FixtureData {
    run_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    issued: Cell<u32>,
}

impl FixtureData {
    pub fn new() -> Self {
        Self::from_rng(&mut rand::thread_rng(), Uuid::new_v4())
    }

    /// Deterministic fixtures for tests.
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let run_id = Uuid::from_u128(rng.r#gen());
        Self::from_rng(&mut rng, run_id)
    }

    fn from_rng(rng: &mut impl Rng, run_id: Uuid) -> Self {
        let first_name = FIRST_NAMES.choose(rng).copied().unwrap_or("Anna").to_string();
        let last_name = LAST_NAMES.choose(rng).copied().unwrap_or("Muster").to_string();
        let fixtures = Self {
            run_id,
            first_name,
            last_name,
            email: String::new(),
            issued: Cell::new(0),
        };
        let email = fixtures.unique_email();
        Self { email, ..fixtures }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// The run's primary address, stable across lookups so that
    /// e-mail and confirmation fields agree.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// A fresh `first.last.<tag>@example.com`; every call yields a new tag.
    pub fn unique_email(&self) -> String {
        let n = self.issued.get();
        self.issued.set(n + 1);

        let mut hasher = Sha1::new();
        hasher.update(self.run_id.as_bytes());
        hasher.update(n.to_be_bytes());
        let digest = format!("{:x}", hasher.finalize());

        format!(
            "{}.{}.{}@example.com",
            ascii_local_part(&self.first_name),
            ascii_local_part(&self.last_name),
            &digest[..10]
        )
    }

    /// Value for a `{{key}}` placeholder.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match key {
            "email" => Some(self.email.clone()),
            "unique_email" => Some(self.unique_email()),
            "first_name" => Some(self.first_name.clone()),
            "last_name" => Some(self.last_name.clone()),
            "run_id" => Some(self.run_id.to_string()),
            _ => None,
        }
    }
}

impl Default for FixtureData {
    fn default() -> Self {
        Self::new()
    }
}

fn ascii_local_part(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'ü' | 'Ü' => 'u',
            'ö' | 'Ö' => 'o',
            'ä' | 'Ä' => 'a',
            'ć' | 'č' | 'Ć' | 'Č' => 'c',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}
