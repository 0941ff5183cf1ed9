pub mod event_kit;
