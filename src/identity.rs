use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Mobile Safari/537.36",
];

/// How the next identification header is picked from the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderSelection {
    #[default]
    Random,
    RoundRobin,
}

pub fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
}

/// Rotating `User-Agent` values. Rotation only lowers the odds of simple
/// per-request header matching; it is not a security boundary.
#[derive(Debug, Clone)]
pub struct HeaderRotation {
    pool: Vec<String>,
    selection: HeaderSelection,
    cursor: usize,
}

impl HeaderRotation {
    pub fn new(pool: Vec<String>, selection: HeaderSelection) -> Self {
        let pool: Vec<String> = pool
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        let pool = if pool.is_empty() {
            default_user_agents()
        } else {
            pool
        };
        Self {
            pool,
            selection,
            cursor: 0,
        }
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn next_user_agent(&mut self) -> &str {
        let index = match self.selection {
            HeaderSelection::Random => rand::rng().random_range(0..self.pool.len()),
            HeaderSelection::RoundRobin => {
                let index = self.cursor % self.pool.len();
                self.cursor = (index + 1) % self.pool.len();
                index
            }
        };
        &self.pool[index]
    }
}
