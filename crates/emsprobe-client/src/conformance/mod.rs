//! Conformance runner: replay (request, expected response) fixtures against an
//! endpoint, one fresh connection per fixture.

pub mod fixture;
pub mod runner;

pub use fixture::{BuiltinFixtures, Fixture, FixtureFile, FixtureSource};
pub use runner::{Actual, ConformanceRunner, RunReport, RunResult, RunnerTimeouts};
