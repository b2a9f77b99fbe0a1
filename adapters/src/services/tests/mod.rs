//! Tests for adapter services
//!
//! These run the real transport against a local wiremock server.
