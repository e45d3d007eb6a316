//! Integration tests for halving-sentinel

mod e2e_test;
mod feed_test;
