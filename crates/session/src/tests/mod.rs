//! Testsuite der Session-Schicht
//!
//! Alle Tests laufen gegen Attrappen fuer Kanal, Peer-Verbindung und
//! Capture-Hardware; echte Netzwerk- oder Audiogeraete werden nicht
//! angefasst.

mod session_tests;
mod supervisor_tests;
