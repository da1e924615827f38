// Kernel test module
#[cfg(test)]
mod common;
#[cfg(test)]
mod resolution_tests;
#[cfg(test)]
mod store_tests;
