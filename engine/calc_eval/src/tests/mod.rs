#![allow(clippy::unwrap_used, reason = "Tests can panic")]

mod evaluator_tests;
