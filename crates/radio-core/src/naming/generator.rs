//! Pseudonym generation

use rand::seq::SliceRandom;

/// Source of generated display names
pub trait NameGenerator: Send + Sync {
    /// A fresh "First Last" pseudonym
    fn generate(&self) -> String;
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Arthur", "Beatrice", "Caleb", "Clara", "Daniel", "Edith", "Felix", "Frances",
    "George", "Hazel", "Henry", "Iris", "Jasper", "June", "Leo", "Lillian", "Louis", "Mabel",
    "Martin", "Nora", "Oscar", "Pearl", "Ralph", "Rose", "Silas", "Stella", "Theo", "Violet",
    "Walter",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Barker", "Bishop", "Carver", "Dalton", "Ellis", "Fletcher", "Garner", "Hale",
    "Hayes", "Ingram", "Keller", "Lambert", "Marsh", "Nolan", "Osborne", "Parker", "Quinn",
    "Reyes", "Sawyer", "Shaw", "Sutton", "Tanner", "Vance", "Wade", "Walsh", "Webb", "Wilder",
    "Yates", "Young",
];

/// Picks first and last names uniformly from built-in wordlists
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Anon");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Listener");
        format!("{first} {last}")
    }
}
