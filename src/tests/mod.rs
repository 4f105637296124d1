// Tests module
// Emitter lifecycle: immediate pass, periodic re-announcement, stop/restart, mixed lists
// Discovery surface: custom record factories and source aggregation

pub mod discovery;
