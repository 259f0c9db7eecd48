//! Performance smoke guardrails, exercised from `tests/`.
