//! Gemini Provider Unit Tests
//!
//! Uses wiremock for HTTP mocking to test:
//! - API request formatting (path, headers, body)
//! - Response parsing (text and inline image parts)
//! - Error classification (entitlement vs generic)

mod google_tests;
