//! Fuzz target for [`AcknowledgmentGate`]
//!
//! Drive the gate with arbitrary acknowledgment and poll sequences, including
//! ids far outside the slot range.
//!
//! # Invariants
//!
//! - NEVER panic on an out-of-range client id
//! - An out-of-range acknowledgment leaves the slots untouched
//! - A failed poll leaves the slots untouched
//! - A successful poll resizes the gate to the requested length, all unset
//! - A poll succeeds exactly when every slot is set (empty gate included)

#![no_main]

use arbitrary::Arbitrary;
use filegate_core::AcknowledgmentGate;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum GateEvent {
    Acknowledge { peer_id: u64 },
    Poll { ledger_len: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    initial_size: u8,
    events: Vec<GateEvent>,
}

fuzz_target!(|input: FuzzInput| {
    let gate = AcknowledgmentGate::new(input.initial_size as usize);
    let mut shadow = vec![false; input.initial_size as usize];

    for event in input.events {
        match event {
            GateEvent::Acknowledge { peer_id } => {
                let accepted = gate.set_acknowledged(peer_id);
                let index = usize::try_from(peer_id).ok().filter(|i| *i < shadow.len());

                assert_eq!(accepted, index.is_some(), "acceptance must follow slot range");
                if let Some(i) = index {
                    shadow[i] = true;
                }
            },

            GateEvent::Poll { ledger_len } => {
                let expect_full = shadow.iter().all(|acked| *acked);
                let full = gate.all_acknowledged(ledger_len as usize);

                assert_eq!(full, expect_full);
                if full {
                    shadow = vec![false; ledger_len as usize];
                }
            },
        }

        assert_eq!(gate.snapshot(), shadow);
        assert_eq!(gate.len(), shadow.len());
    }
});
