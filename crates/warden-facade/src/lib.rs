//! Warden Facade - Stable Entry Point for Validator-Set Coordination
//!
//! The facade is the long-lived identity the driver and external callers
//! know. It forwards membership changes and reports to a replaceable logic
//! and collects the logic's proposals for the driver.
//!
//! # Capabilities
//!
//! - **Owner** swaps the logic, the driver and its own ownership
//! - **Driver** is the only caller allowed to finalize
//! - **Logic** is the only caller whose proposals are accepted
//!
//! # Driver Subscription
//!
//! A driver that wants to coordinate signer rotation subscribes with
//! [`Facade::subscribe_proposals`]. While subscribed, each proposal is
//! delivered on the channel before the change commits. A driver that drops
//! its receiver makes every further add or remove fail atomically.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_facade::{Facade, FacadeConfig};
//! use warden_logic::{LogicConfig, ValidatorSetLogic};
//!
//! let (logic, _) = ValidatorSetLogic::new(LogicConfig::from_genesis(&genesis))?;
//! let (mut facade, _) = Facade::new(FacadeConfig::from_genesis(&genesis), Box::new(logic))?;
//! let mut proposals = facade.subscribe_proposals();
//!
//! facade.add_validator(&owner_ctx, new_validator)?;
//! let proposal = proposals.try_recv()?;
//! // ... rotate signers, then:
//! facade.finalize(&driver_ctx)?;
//! ```

mod config;
mod facade;
mod gateway;

pub use config::FacadeConfig;
pub use facade::Facade;
pub use gateway::Proposal;
