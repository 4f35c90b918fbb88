//! Library surface behind the `cg-cli` binary, split out so integration
//! tests can drive `pipeline::build` and the CLI's config loading directly
//! instead of shelling out to the compiled binary.

pub mod cli;
pub mod pipeline;
