//! Generic controller layer
//!
//! [`BaseController`] implements list / get / create / update / delete once for every table
//! described by a [`Resource`]. Handlers for plain CRUD resources delegate to it and only add
//! routing and OpenAPI annotations.

pub mod base;
pub mod utils;

pub use base::{BaseController, Resource};
pub use utils::{non_blank, parse_uuid, search_term, set_if_present, Access, ListQuery};
