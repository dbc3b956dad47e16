pub mod distance;
pub mod ranker;
