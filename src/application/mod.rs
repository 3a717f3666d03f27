pub mod error;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;
