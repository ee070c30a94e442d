pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_utils;
