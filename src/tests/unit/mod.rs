mod providers;
mod session_tests;
