mod activity;
mod time;

pub use activity::*;
pub use time::*;

#[cfg(test)]
mod tests;
