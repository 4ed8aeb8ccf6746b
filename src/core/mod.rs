// ─── Manifest Exporter Core ───
// Resolves a library set, filters it, hashes it and writes the installer's
// `libraries.json`; also verifies and fetches libraries from such a manifest.
//
// Architecture:
//   core/
//     maven/      — Coordinates, POM model, version ordering
//     resolve/    — Resolver trait, resolved graph, local repository resolver
//     hashing     — Chunked MD5
//     manifest/   — Descriptor model + exporter
//     config      — Export task file
//     verify      — Library directory checks against a manifest
//     downloader/ — Concurrent downloads with MD5 validation

pub mod config;
pub mod downloader;
pub mod error;
pub mod hashing;
pub mod http;
pub mod manifest;
pub mod maven;
pub mod resolve;
pub mod verify;
