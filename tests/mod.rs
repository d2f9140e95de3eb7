mod common;
mod database_tests;
