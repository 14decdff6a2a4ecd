//! Integration test suite. Requires a running server and seeded database.

mod integration {
    pub mod api_tests;
}
