//! Fuzz target: parser → `FrameDispatcher::dispatch`
//!
//! Every frame the parser accepts from arbitrary input is classified
//! against a small registry.  Dispatch must never panic, and the registry
//! must never hold more slots than its capacity or map one network address
//! to two slots.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use roomctl::config::Scaling;
use roomctl::dispatch::FrameDispatcher;
use roomctl::frame::ApiFrameParser;
use roomctl::registry::{Registry, RoomDefaults, SharedRegistry};

fuzz_target!(|data: &[u8]| {
    let registry: SharedRegistry<4> = SharedRegistry::new(Registry::new(RoomDefaults::default()));
    let dispatcher = FrameDispatcher::new(Scaling::default());
    let mut parser = ApiFrameParser::new();

    for &byte in data {
        if parser.feed(byte).is_some() {
            let _ = dispatcher.dispatch(&registry, parser.frame(), 0);
        }
    }

    registry.with(|r| {
        assert!(r.len() <= r.capacity());
        for a in r.iter() {
            let owners = r
                .iter()
                .filter(|b| b.short_address == a.short_address)
                .count();
            assert!(
                a.short_address == roomctl::registry::UNKNOWN_SHORT_ADDRESS || owners == 1,
                "network address 0x{:04X} owned by {} slots",
                a.short_address,
                owners
            );
        }
    });
});
