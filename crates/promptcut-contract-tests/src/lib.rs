//! Frozen wire-contract schemas and fixtures, validated in `tests/`.
