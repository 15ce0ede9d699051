//! chain-table: a single-threaded, string-keyed table with separate
//! chaining, bounded growth, and a pluggable hash function.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative primitive whose values are opaque
//!   machine-word payloads, built in two layers so each can be reasoned
//!   about independently.
//! - Layers:
//!   - `chain`: a doubly linked collision chain threaded through a
//!     slotmap arena via embedded handles; O(1) head insertion and
//!     removal, plus a removal-safe cursor used by the rehash pass.
//!   - `table`: bucket array, capacity reconciliation, lookup, upsert,
//!     update-only, and growth-triggered rehashing.
//!
//! Constraints
//! - Single-threaded: no atomics, no interior mutability; callers that
//!   share a table across threads need an external exclusive lock.
//! - Keys are strings; each entry owns its key copy (`Box<str>`).
//! - Payloads are `Copy` word-like values returned by value; the table
//!   never interprets them.
//! - No deletion: entries live until the table is dropped.
//! - Growth is capped: `bucket_capacity` doubles up to `max_capacity`
//!   and a full table rejects new distinct keys with
//!   `CapacityExhausted` while existing keys stay updatable.
//!
//! Why this split?
//! - Localize invariants: `chain` only promises well-formed linkage and
//!   removal-safe traversal; `table` only promises key/bucket placement
//!   and counting laws on top of that.
//! - The arena makes ownership tree-shaped: the table owns the buckets,
//!   the buckets own their chains, and every entry lives in one
//!   `SlotMap`. No back-computed pointers and no reference counting.
//!
//! Hashing
//! - Buckets are indexed by `hash(key) mod (2*capacity - 1)`; the odd
//!   modulus reduces bias from hashes favoring even divisors.
//! - The default hash is 32-bit FNV-1a with the standard constants,
//!   bit-exact, so placement is deterministic; `with_hash` swaps in any
//!   reproducible `fn(&str) -> u32`.
//! - Bucket indices are not stable across a resize: the rehash pass
//!   re-derives every index under the new modulus.
//!
//! Notes and non-goals
//! - No iteration order guarantees and no iteration API.
//! - No persistence, no generic (non-string) keys.
//! - `len()` counts distinct keys, never occupied buckets.
//! - Teardown is `Drop`; there is no explicit destroy call to misuse.

mod chain;
pub mod table;
mod table_proptest;

// Public surface
pub use table::{fnv1a, HashFn, Table, TableError, TableOptions};
pub use table::{ABSOLUTE_MAX, DEFAULT_MAX, DEFAULT_SIZE};
