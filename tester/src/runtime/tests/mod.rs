//! Runtime tests
//!
//! Process tests drive real `sh` scripts, so they only build on unix.
