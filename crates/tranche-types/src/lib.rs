//! # tranche-types
//!
//! Shared types, errors, and configuration for the **tranche ledger**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Principal`], [`DeploymentId`], [`SequenceNumber`]
//! - **Amounts**: [`Amount`] with checked arithmetic
//! - **Execution**: [`ExecutionContext`]
//! - **Events**: [`LedgerEvent`], [`EventLog`]
//! - **Deployment lifecycle**: [`DeploymentPhase`], [`deployment_label`]
//! - **Quorum model**: [`ActionType`], [`ActionParams`], [`Proposal`], [`ProposalRef`], [`QuorumOutcome`]
//! - **Configuration**: [`LedgerConfig`]
//! - **Errors**: [`TrancheError`] with `TR_ERR_` prefix codes
//! - **Constants**: schedule bands, lock-up length, defaults

pub mod amount;
pub mod config;
pub mod constants;
pub mod context;
pub mod deployment;
pub mod error;
pub mod event;
pub mod ids;
pub mod proposal;

pub use amount::*;
pub use config::*;
pub use context::*;
pub use deployment::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use proposal::*;

// Constants are accessed via `tranche_types::constants::FOO`
// (not re-exported to avoid name collisions).
