#[cfg(feature = "seaorm")]
pub mod seaorm;

#[cfg(feature = "seaorm")]
pub use seaorm::SeaOrmRepository;
