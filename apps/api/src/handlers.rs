pub mod audit;
pub mod authorization;
pub mod health;
pub mod projects;
pub mod roles;
pub mod tasks;
pub mod users;

use std::str::FromStr;

use tasklane_core::AppError;

/// Parses a list of wire identifiers, failing on the first malformed one.
fn parse_ids<T>(values: &[String]) -> Result<Vec<T>, AppError>
where
    T: FromStr<Err = AppError>,
{
    values.iter().map(|value| value.parse()).collect()
}

#[cfg(test)]
pub(crate) mod test_support;
