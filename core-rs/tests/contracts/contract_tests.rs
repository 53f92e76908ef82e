//! Contract Tests - Reasoner and Session Invariant Protection
//!
//! This file aggregates all contract test modules.
//! Contract tests verify invariants that MUST NEVER BREAK.

// Contract test modules
mod contracts {
    // Reasoner engine contracts
    mod reasoner {
        include!("reasoner_contracts.rs");
    }

    // Query session contracts
    mod facade {
        include!("facade_contracts.rs");
    }
}
