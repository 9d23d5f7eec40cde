pub mod candidates;
pub mod conversations;
pub mod decisions;
pub mod game;
pub mod health;
pub mod matches;
