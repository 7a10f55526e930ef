pub mod genre;
pub mod language;
pub mod movie;
pub mod movie_credit;
pub mod movie_genre;
pub mod partner;
pub mod stage;
