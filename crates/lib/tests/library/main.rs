mod common;
mod context_tests;
mod manifest_tests;
mod registration_tests;
