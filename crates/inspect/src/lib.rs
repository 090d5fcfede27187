//! Offline validation of saved ComfyUI payloads.
//!
//! Feeds a captured `/object_info`, `/queue`, `/history`, event log or
//! settings file through the protocol validators and summarizes what was
//! accepted and what was rejected.

pub mod report;
