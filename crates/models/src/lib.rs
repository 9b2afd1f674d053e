pub mod errors;
pub mod db;
pub mod geo;
pub mod user;
pub mod dog;

#[cfg(test)]
mod tests;
