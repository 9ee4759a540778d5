pub mod auth;
pub mod flashcards;
pub mod tags;
pub mod users;
