pub mod errors;
pub mod db;
pub mod admin;

#[cfg(test)]
mod tests;
