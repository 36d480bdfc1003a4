//! Stateless OAuth authorization broker: multi-provider redirect flows whose state rides in
//! the redirect URL, plus a layered "current token" resolver for SCM integrations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authenticator;
pub mod broker;
pub mod error;
pub mod flow;
#[cfg(feature = "reqwest")] pub mod http;
pub mod obs;
pub mod resolver;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(not(feature = "reqwest"))] use oauth2 as _;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use color_eyre as _;
#[cfg(all(test, not(feature = "reqwest")))] use httpmock as _;
